//! Transparent runtime call redirection for trait-based test doubles.
//!
//! `rewire` produces proxies for interface traits that can be redirected at
//! runtime to alternate behavior (mocked returns, call recording, or
//! delegation chains ending at the wrapped root instance) without touching
//! production code.
//!
//! The interception engine lives in `rewire-core` and is re-exported here in
//! full. This crate adds the proxy transport: the [`proxy_target!`] macro
//! generates, at build time, a concrete adapter type that implements a trait
//! by forwarding every method through the engine. No runtime reflection is
//! involved; method identities are static and dispatch is ordinary virtual
//! dispatch.
//!
//! ```ignore
//! proxy_target! {
//!     pub trait Foo => FooProxy {
//!         fn echo(&self, input: String) -> String;
//!     }
//! }
//!
//! let hub = Hub::new();
//! let via = hub.via::<dyn Foo>();
//! let proxy = hub.proxy::<dyn Foo>(Some(Arc::new(Foo1)));
//!
//! via.redirect().via(|call: &RedirectCall| {
//!     let input: String = call.args().arg(0).unwrap();
//!     Ok(CallValue::new(format!("{input} rewired")))
//! });
//!
//! assert_eq!(proxy.echo("Hello".into()), "Hello rewired");
//! via.reset();
//! assert_eq!(proxy.echo("Hello".into()), "Foo1: Hello");
//! ```

pub use rewire_core::{
	AllOf, ArgMatch, CallArguments, CallConstraint, CallInfo, CallMatch, CallOutcome, CallValue,
	ChainSnapshot, Hub, MatchAll, MethodId, ProxyTarget, RecordHandle, Recorded, Redirect,
	RedirectBuilder, RedirectCall, RedirectHandler, RedirectRepository, RewireError, RootInvoker,
	Via, ViaId,
};

mod macros;

/// Unpacks a dispatch outcome into the proxied method's return type.
///
/// Called by generated adapters, which have no `Result` channel of their
/// own: the proxied signature is whatever the trait declares. Engine
/// configuration errors (missing root, strict rejection, wrong-typed handler
/// output) therefore surface as panics carrying the descriptive
/// [`RewireError`] message.
#[doc(hidden)]
pub fn unpack_return<R: Clone + 'static>(method: MethodId, outcome: CallOutcome) -> R {
	match outcome {
		Ok(value) => {
			let actual = value.type_name();
			match value.to::<R>() {
				Some(ret) => ret,
				None => panic!(
					"{}",
					RewireError::ReturnTypeMismatch {
						method,
						expected: method.return_type_name(),
						actual,
					}
				),
			}
		}
		Err(err) => panic!("{err}"),
	}
}
