//! Process-wide via registry and proxy creation entry point.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::via::{Via, ViaId};

/// Implemented (by generated proxy adapters) for each interceptable trait
/// object type, wiring typed proxy creation to the erased engine.
pub trait ProxyTarget: 'static {
	/// The generated adapter type implementing the target trait.
	type Proxy;

	/// Display name of the target trait.
	const NAME: &'static str;

	/// Builds a proxy bound to `via`, optionally wrapping a root instance.
	fn proxy(via: Arc<Via>, root: Option<Arc<Self>>) -> Self::Proxy;
}

/// Owner of every via in a scope, keyed by (target type, name).
///
/// Construct one per test (or one per process) and pass it down; the engine
/// has no ambient global state.
#[derive(Default)]
pub struct Hub {
	vias: RwLock<FxHashMap<ViaId, Arc<Via>>>,
}

impl Hub {
	/// Creates an empty hub.
	pub fn new() -> Self {
		Self::default()
	}

	/// The default (unnamed) via for `T`, created on first use.
	pub fn via<T: ProxyTarget + ?Sized>(&self) -> Arc<Via> {
		self.via_entry(ViaId::of::<T>(T::NAME))
	}

	/// A named via for `T`, created on first use. Named vias are fully
	/// independent redirect sets over the same trait.
	pub fn via_named<T: ProxyTarget + ?Sized>(&self, name: &str) -> Arc<Via> {
		self.via_entry(ViaId::named::<T>(T::NAME, name))
	}

	/// Creates a proxy for `T` on the default via.
	///
	/// `root` is the pre-redirect implementation; pass `None` for a pure
	/// test double (root delegation then fails with a configuration error).
	pub fn proxy<T: ProxyTarget + ?Sized>(&self, root: Option<Arc<T>>) -> T::Proxy {
		T::proxy(self.via::<T>(), root)
	}

	/// Creates a proxy for `T` on the named via.
	pub fn proxy_named<T: ProxyTarget + ?Sized>(&self, name: &str, root: Option<Arc<T>>) -> T::Proxy {
		T::proxy(self.via_named::<T>(name), root)
	}

	/// Number of vias created so far.
	pub fn len(&self) -> usize {
		self.vias.read().len()
	}

	/// Returns true if no via was created yet.
	pub fn is_empty(&self) -> bool {
		self.vias.read().is_empty()
	}

	/// Resets every via of every (type, name).
	///
	/// The via set is copied out first so no lock is held while resetting.
	pub fn reset_all(&self) {
		let vias: Vec<Arc<Via>> = self.vias.read().values().cloned().collect();
		debug!(vias = vias.len(), "resetting all vias");
		for via in vias {
			via.reset();
		}
	}

	fn via_entry(&self, id: ViaId) -> Arc<Via> {
		if let Some(via) = self.vias.read().get(&id) {
			return via.clone();
		}
		let mut vias = self.vias.write();
		vias.entry(id.clone())
			.or_insert_with(|| Arc::new(Via::new(id)))
			.clone()
	}
}

impl std::fmt::Debug for Hub {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Hub").field("vias", &self.len()).finish()
	}
}
