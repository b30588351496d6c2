//! Registered interception units.

use std::sync::Arc;

use crate::call::{CallInfo, CallValue};
use crate::constraint::CallConstraint;
use crate::error::RewireError;
use crate::relay::RedirectCall;

/// Result of one handler (or root) invocation.
///
/// `Err` carries engine configuration errors only. Business failures from the
/// intercepted code are ordinary values inside `Ok` (for example a proxied
/// method that itself returns `Result`).
pub type CallOutcome = Result<CallValue, RewireError>;

/// User-supplied interception behavior.
///
/// The handler receives a relay-bound [`RedirectCall`] and may produce a
/// result directly, delegate down the chain with
/// [`call_next`](RedirectCall::call_next), or jump to the root with
/// [`call_root`](RedirectCall::call_root). Handlers run without any engine
/// lock held, so they are free to register or reset redirects and to
/// re-enter the proxy.
pub trait RedirectHandler: Send + Sync {
	/// Handles one matched invocation.
	fn handle(&self, call: &RedirectCall<'_>) -> CallOutcome;
}

impl<F> RedirectHandler for F
where
	F: for<'a> Fn(&RedirectCall<'a>) -> CallOutcome + Send + Sync,
{
	fn handle(&self, call: &RedirectCall<'_>) -> CallOutcome {
		self(call)
	}
}

/// An ordered, weighted (constraint, handler) pair.
///
/// Immutable once constructed; removal means removing it from the
/// repository, never mutating it in place. Higher weight runs earlier; ties
/// run in reverse registration order (the sequence number is assigned by the
/// repository at insert).
pub struct Redirect {
	handler: Arc<dyn RedirectHandler>,
	constraint: Arc<dyn CallConstraint>,
	weight: i32,
	seq: u64,
	opt_out_strict: bool,
}

impl Redirect {
	pub(crate) fn new(
		handler: Arc<dyn RedirectHandler>,
		constraint: Arc<dyn CallConstraint>,
		weight: i32,
		seq: u64,
		opt_out_strict: bool,
	) -> Self {
		Self {
			handler,
			constraint,
			weight,
			seq,
			opt_out_strict,
		}
	}

	/// Evaluates this redirect's constraint against `call`.
	pub fn is_match(&self, call: &CallInfo) -> bool {
		self.constraint.is_match(call)
	}

	/// The interception behavior.
	pub fn handler(&self) -> &Arc<dyn RedirectHandler> {
		&self.handler
	}

	/// Ordering weight; higher runs earlier.
	pub fn weight(&self) -> i32 {
		self.weight
	}

	/// Insertion sequence number within the owning repository.
	pub fn seq(&self) -> u64 {
		self.seq
	}

	/// Returns true if this redirect does not count toward strict-mode
	/// satisfaction (recorders opt out so a wiretap alone never satisfies a
	/// strict via).
	pub fn opts_out_of_strict(&self) -> bool {
		self.opt_out_strict
	}
}

impl std::fmt::Debug for Redirect {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Redirect")
			.field("weight", &self.weight)
			.field("seq", &self.seq)
			.field("opt_out_strict", &self.opt_out_strict)
			.finish()
	}
}
