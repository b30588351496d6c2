//! Per-target-type interception facade.

use std::any::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::call::CallInfo;
use crate::constraint::{CallConstraint, MatchAll};
use crate::error::RewireError;
use crate::record::{RecordHandle, recorder_redirect};
use crate::redirect::{CallOutcome, Redirect, RedirectHandler};
use crate::relay::{Relay, RelayFlags, RootInvoker};
use crate::repository::RedirectRepository;

/// Identity of a via: target trait type plus an optional instance name.
///
/// Several independent redirect sets can coexist for the same trait by
/// giving each via a distinct name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ViaId {
	target: TypeId,
	target_name: &'static str,
	name: Option<Arc<str>>,
}

impl ViaId {
	/// Identity for the unnamed (default) via of trait object type `T`.
	pub fn of<T: ?Sized + 'static>(target_name: &'static str) -> Self {
		Self {
			target: TypeId::of::<T>(),
			target_name,
			name: None,
		}
	}

	/// Identity for a named via of trait object type `T`.
	pub fn named<T: ?Sized + 'static>(target_name: &'static str, name: &str) -> Self {
		Self {
			target: TypeId::of::<T>(),
			target_name,
			name: Some(Arc::from(name)),
		}
	}

	/// The target trait's [`TypeId`].
	pub fn target(&self) -> TypeId {
		self.target
	}

	/// Display name of the target trait.
	pub fn target_name(&self) -> &'static str {
		self.target_name
	}

	/// The instance name, if this is a named via.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}
}

impl std::fmt::Debug for ViaId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "ViaId({self})")
	}
}

impl std::fmt::Display for ViaId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.name {
			Some(name) => write!(f, "{}:{name}", self.target_name),
			None => f.write_str(self.target_name),
		}
	}
}

/// One redirect set for one (type, name): owns the repository, resolves
/// chains, and dispatches intercepted calls through the relay.
///
/// A via holds no target instance of its own. Any number of proxies, each
/// wrapping a different root, can share a via; the root rides on every
/// [`CallInfo`].
pub struct Via {
	id: ViaId,
	repository: RedirectRepository,
	strict: AtomicBool,
}

impl Via {
	/// Creates a via with an empty repository.
	pub fn new(id: ViaId) -> Self {
		Self {
			id,
			repository: RedirectRepository::new(),
			strict: AtomicBool::new(false),
		}
	}

	/// This via's identity.
	pub fn id(&self) -> &ViaId {
		&self.id
	}

	/// The underlying redirect repository.
	pub fn repository(&self) -> &RedirectRepository {
		&self.repository
	}

	/// Enables or disables strict mode.
	///
	/// A strict via fails dispatch with [`RewireError::StrictNotSatisfied`]
	/// whenever a call completes without any strict-participating redirect
	/// having run.
	pub fn set_strict(&self, enabled: bool) {
		self.strict.store(enabled, Ordering::Release);
	}

	/// Returns true if strict mode is enabled.
	pub fn is_strict(&self) -> bool {
		self.strict.load(Ordering::Acquire)
	}

	/// Starts a fluent redirect registration.
	pub fn redirect(&self) -> RedirectBuilder<'_> {
		RedirectBuilder {
			via: self,
			constraint: Arc::new(MatchAll),
			weight: 0,
			opt_out_strict: false,
		}
	}

	/// Inserts a recording redirect capturing every call.
	///
	/// The recorder is an ordinary redirect: it participates in chain
	/// ordering, opts out of strict satisfaction, and [`Via::reset`] removes
	/// it like any other redirect. The returned handle stays valid (and
	/// keeps its captures) after removal.
	pub fn record(&self) -> RecordHandle {
		self.record_matching(MatchAll)
	}

	/// Inserts a recording redirect capturing calls matching `constraint`.
	pub fn record_matching(&self, constraint: impl CallConstraint + 'static) -> RecordHandle {
		let (handler, handle) = recorder_redirect();
		self.repository
			.insert(handler, Arc::new(constraint), 0, true);
		debug!(via = %self.id, "recorder attached");
		handle
	}

	/// Clears every redirect (recorders included).
	pub fn reset(&self) {
		self.repository.reset();
		debug!(via = %self.id, "via reset");
	}

	/// Dispatches one intercepted call through the current chain.
	///
	/// Resolves a frozen snapshot, runs the relay from the first position
	/// (an empty snapshot goes straight to `root`), then enforces strict
	/// mode. The outcome of the chain — including an `Err` — propagates
	/// unchanged unless strict mode rejects the call.
	pub fn dispatch(&self, call: &CallInfo, root: Option<&RootInvoker>) -> CallOutcome {
		let snapshot = self.repository.resolve(call);
		trace!(via = %self.id, method = %call.method(), chain = snapshot.len(), "dispatch");
		let flags = RelayFlags::default();
		let outcome = Relay::begin(&snapshot, root, &flags, call);
		if self.is_strict() && !flags.is_satisfied() {
			return Err(RewireError::StrictNotSatisfied {
				via: self.id.clone(),
			});
		}
		outcome
	}
}

impl std::fmt::Debug for Via {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Via")
			.field("id", &self.id)
			.field("redirects", &self.repository.len())
			.field("strict", &self.is_strict())
			.finish()
	}
}

/// Fluent registration of a single redirect.
///
/// ```ignore
/// via.redirect()
///     .weight(10)
///     .to(CallMatch::method(method_id))
///     .via(|call: &RedirectCall| Ok(CallValue::new(42u64)));
/// ```
#[must_use = "a redirect is only registered once `.via(handler)` is called"]
pub struct RedirectBuilder<'a> {
	via: &'a Via,
	constraint: Arc<dyn CallConstraint>,
	weight: i32,
	opt_out_strict: bool,
}

impl RedirectBuilder<'_> {
	/// Constrains the redirect to calls matching `constraint`.
	pub fn to(mut self, constraint: impl CallConstraint + 'static) -> Self {
		self.constraint = Arc::new(constraint);
		self
	}

	/// Sets the ordering weight (default 0, higher runs earlier).
	pub fn weight(mut self, weight: i32) -> Self {
		self.weight = weight;
		self
	}

	/// Excludes this redirect from strict-mode satisfaction.
	pub fn opt_out_strict(mut self) -> Self {
		self.opt_out_strict = true;
		self
	}

	/// Registers `handler` and returns the inserted redirect.
	pub fn via(self, handler: impl RedirectHandler + 'static) -> Arc<Redirect> {
		self.via.repository.insert(
			Arc::new(handler),
			self.constraint,
			self.weight,
			self.opt_out_strict,
		)
	}
}
