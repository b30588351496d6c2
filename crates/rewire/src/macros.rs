//! Build-time proxy adapter generation.

/// Declares an interceptable trait and generates its proxy adapter.
///
/// For each listed method the adapter packs the arguments into a
/// [`CallInfo`](crate::CallInfo), builds a per-call root invoker over the
/// wrapped instance (reading argument slots at invocation time, so
/// write-backs made mid-chain are honored), dispatches through the via, and
/// downcasts the outcome back to the declared return type. A `ProxyTarget`
/// impl for `dyn Trait` wires the adapter into [`Hub`](crate::Hub) proxy
/// creation.
///
/// Method shape is `fn name(&self, arg: Ty, ...) -> Ret;` where every
/// argument and return type is `Clone + Send + Sync + 'static` (the engine
/// moves erased values between handlers, recorders, and the root). Async
/// methods are expressed as methods returning a boxed future: the engine
/// passes the future through as an opaque value without awaiting it.
///
/// ```ignore
/// proxy_target! {
///     /// Demo collaborator.
///     pub trait Foo => FooProxy {
///         fn echo(&self, input: String) -> String;
///         fn count(&self) -> usize;
///     }
/// }
/// ```
#[macro_export]
macro_rules! proxy_target {
	(
		$(#[$attr:meta])*
		$vis:vis trait $trait_name:ident => $proxy:ident {
			$(
				$(#[$method_attr:meta])*
				fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)* $(,)?) -> $ret:ty;
			)+
		}
	) => {
		$(#[$attr])*
		$vis trait $trait_name: ::core::marker::Send + ::core::marker::Sync {
			$(
				$(#[$method_attr])*
				fn $method(&self $(, $arg: $arg_ty)*) -> $ret;
			)+
		}

		/// Generated proxy adapter forwarding every call through a via.
		$vis struct $proxy {
			via: ::std::sync::Arc<$crate::Via>,
			root: ::core::option::Option<::std::sync::Arc<dyn $trait_name>>,
		}

		impl $proxy {
			/// Binds a proxy to `via`, optionally wrapping a root instance.
			$vis fn new(
				via: ::std::sync::Arc<$crate::Via>,
				root: ::core::option::Option<::std::sync::Arc<dyn $trait_name>>,
			) -> Self {
				Self { via, root }
			}
		}

		impl $crate::ProxyTarget for dyn $trait_name {
			type Proxy = $proxy;
			const NAME: &'static str = ::core::stringify!($trait_name);

			fn proxy(
				via: ::std::sync::Arc<$crate::Via>,
				root: ::core::option::Option<::std::sync::Arc<Self>>,
			) -> Self::Proxy {
				$proxy::new(via, root)
			}
		}

		impl $trait_name for $proxy {
			$(
				fn $method(&self $(, $arg: $arg_ty)*) -> $ret {
					let method = $crate::MethodId::of::<dyn $trait_name, $ret>(
						::core::stringify!($trait_name),
						::core::stringify!($method),
					);
					let args = $crate::CallArguments::of([
						$($crate::CallValue::new($arg)),*
					]);
					let info = $crate::CallInfo::new(
						self.via.id().clone(),
						method,
						args,
						self.root.clone().map($crate::CallValue::new),
					);
					let invoker = self.root.clone().map(|root| {
						$crate::RootInvoker::new(move |info: &$crate::CallInfo| {
							let _ = info;
							#[allow(unused_mut, unused_variables)]
							let mut slot = 0usize;
							$(
								let $arg: $arg_ty = info
									.args()
									.arg(slot)
									.unwrap_or_else(|| ::core::panic!(
										"argument {} of {} no longer holds a {}",
										slot,
										::core::stringify!($method),
										::core::any::type_name::<$arg_ty>(),
									));
								#[allow(unused_assignments)]
								{
									slot += 1;
								}
							)*
							::core::result::Result::Ok(
								$crate::CallValue::new(root.$method($($arg),*)),
							)
						})
					});
					let outcome = self.via.dispatch(&info, invoker.as_ref());
					$crate::unpack_return::<$ret>(method, outcome)
				}
			)+
		}
	};
}
