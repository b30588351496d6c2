//! Per-invocation call descriptors.
//!
//! A [`CallInfo`] is created at the proxy boundary for every intercepted
//! invocation and threaded through the redirect chain. It is immutable apart
//! from the argument slots, which handlers may overwrite before delegating
//! onward ([`CallArguments::set`]); the root invoker reads the slots at
//! invocation time, so writes made mid-chain are visible downstream.

use std::any::{Any, TypeId, type_name};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::via::ViaId;

/// Stable identity of an interceptable method.
///
/// Proxy adapters are generated at build time, so each call site produces the
/// same identity on every invocation. Equality and hashing use the target
/// trait's [`TypeId`] plus the method name; the return type rides along for
/// return-type constraints and diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct MethodId {
	target: TypeId,
	target_name: &'static str,
	method: &'static str,
	ret: TypeId,
	ret_name: &'static str,
}

impl MethodId {
	/// Builds the identity of `method` on the trait object type `T` with
	/// return type `R`.
	pub fn of<T: ?Sized + 'static, R: 'static>(
		target_name: &'static str,
		method: &'static str,
	) -> Self {
		Self {
			target: TypeId::of::<T>(),
			target_name,
			method,
			ret: TypeId::of::<R>(),
			ret_name: type_name::<R>(),
		}
	}

	/// The [`TypeId`] of the target trait object type.
	pub fn target(&self) -> TypeId {
		self.target
	}

	/// Display name of the target trait.
	pub fn target_name(&self) -> &'static str {
		self.target_name
	}

	/// The method name.
	pub fn method(&self) -> &'static str {
		self.method
	}

	/// The [`TypeId`] of the declared return type.
	pub fn return_type(&self) -> TypeId {
		self.ret
	}

	/// Type name of the declared return type.
	pub fn return_type_name(&self) -> &'static str {
		self.ret_name
	}
}

impl PartialEq for MethodId {
	fn eq(&self, other: &Self) -> bool {
		// Rust traits cannot overload, so (target, method) is unique.
		self.target == other.target && self.method == other.method
	}
}

impl Eq for MethodId {}

impl Hash for MethodId {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.target.hash(state);
		self.method.hash(state);
	}
}

impl std::fmt::Display for MethodId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}::{}", self.target_name, self.method)
	}
}

/// A cheaply cloneable type-erased value.
///
/// Arguments, return values, and root instance references all travel through
/// the chain as `CallValue`s. Cloning is an `Arc` bump.
#[derive(Clone)]
pub struct CallValue {
	inner: Arc<dyn Any + Send + Sync>,
	type_name: &'static str,
}

impl CallValue {
	/// Erases `value`.
	pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
		Self {
			inner: Arc::new(value),
			type_name: type_name::<T>(),
		}
	}

	/// The unit value, for intercepted methods returning `()`.
	pub fn unit() -> Self {
		Self::new(())
	}

	/// Returns true if the contained value is a `T`.
	pub fn is<T: 'static>(&self) -> bool {
		self.inner.is::<T>()
	}

	/// Borrows the contained value as a `T`.
	pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
		self.inner.downcast_ref::<T>()
	}

	/// Clones the contained value out as a `T`.
	pub fn to<T: Clone + 'static>(&self) -> Option<T> {
		self.inner.downcast_ref::<T>().cloned()
	}

	/// Type name of the contained value, for diagnostics.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}
}

impl std::fmt::Debug for CallValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("CallValue").field(&self.type_name).finish()
	}
}

type ArgSlots = SmallVec<[CallValue; 4]>;

/// Positionally addressable argument slots for one invocation.
///
/// Slots are interior-mutable so a redirect handler can overwrite an argument
/// before calling onward; the lock is scoped to individual reads and writes
/// and is never held while user code runs.
pub struct CallArguments {
	slots: RwLock<ArgSlots>,
}

impl CallArguments {
	/// Builds the slot list from erased values, in positional order.
	pub fn of(values: impl IntoIterator<Item = CallValue>) -> Self {
		Self {
			slots: RwLock::new(values.into_iter().collect()),
		}
	}

	/// No arguments.
	pub fn empty() -> Self {
		Self::of([])
	}

	/// Number of argument slots.
	pub fn len(&self) -> usize {
		self.slots.read().len()
	}

	/// Returns true if the invocation carries no arguments.
	pub fn is_empty(&self) -> bool {
		self.slots.read().is_empty()
	}

	/// The erased value at `index`.
	pub fn get(&self, index: usize) -> Option<CallValue> {
		self.slots.read().get(index).cloned()
	}

	/// The value at `index`, downcast and cloned as a `T`.
	///
	/// Returns `None` for an out-of-range index or a type mismatch.
	pub fn arg<T: Clone + 'static>(&self, index: usize) -> Option<T> {
		self.slots.read().get(index)?.to::<T>()
	}

	/// Overwrites the slot at `index`. Returns false if out of range.
	///
	/// The write is visible to every later reader within the same call:
	/// downstream redirects and the root invoker.
	pub fn set(&self, index: usize, value: CallValue) -> bool {
		let mut slots = self.slots.write();
		match slots.get_mut(index) {
			Some(slot) => {
				*slot = value;
				true
			}
			None => false,
		}
	}

	/// Clones the current slot contents.
	pub fn snapshot(&self) -> Vec<CallValue> {
		self.slots.read().to_vec()
	}
}

impl std::fmt::Debug for CallArguments {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let slots = self.slots.read();
		f.debug_list().entries(slots.iter()).finish()
	}
}

/// Immutable descriptor of one intercepted invocation.
///
/// Created at call entry, discarded at call exit unless a recorder retains a
/// frozen copy. Carries the specific root instance for this proxy because
/// several proxies (each wrapping a different root) may share one via.
pub struct CallInfo {
	via: ViaId,
	method: MethodId,
	args: CallArguments,
	root: Option<CallValue>,
}

impl CallInfo {
	/// Assembles the descriptor for one invocation.
	pub fn new(via: ViaId, method: MethodId, args: CallArguments, root: Option<CallValue>) -> Self {
		Self {
			via,
			method,
			args,
			root,
		}
	}

	/// Identity of the via this call was dispatched through.
	pub fn via(&self) -> &ViaId {
		&self.via
	}

	/// Identity of the invoked method.
	pub fn method(&self) -> MethodId {
		self.method
	}

	/// The argument slots.
	pub fn args(&self) -> &CallArguments {
		&self.args
	}

	/// Returns true if a root instance was supplied at proxy creation.
	pub fn has_root(&self) -> bool {
		self.root.is_some()
	}

	/// The erased root instance, if one was supplied.
	pub fn root(&self) -> Option<&CallValue> {
		self.root.as_ref()
	}

	/// The root instance downcast as a `T` (typically `Arc<dyn Trait>`).
	pub fn root_as<T: Clone + 'static>(&self) -> Option<T> {
		self.root.as_ref()?.to::<T>()
	}

	/// Freezes the current call state into an owned copy.
	///
	/// Argument slots are snapshotted; later writes to the live call do not
	/// show through. Recorders use this to retain calls past their lifetime.
	pub fn freeze(&self) -> Self {
		Self {
			via: self.via.clone(),
			method: self.method,
			args: CallArguments::of(self.args.snapshot()),
			root: self.root.clone(),
		}
	}
}

impl std::fmt::Debug for CallInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CallInfo")
			.field("via", &self.via)
			.field("method", &self.method)
			.field("args", &self.args)
			.field("has_root", &self.root.is_some())
			.finish()
	}
}
