//! Passive call capture.
//!
//! A recorder is a redirect whose only effect is appending
//! `(frozen call, outcome)` to a log before handing the outcome back
//! unchanged — a wiretap. It delegates with `call_next` so downstream
//! redirects and the root still run, and it records engine errors from
//! downstream without suppressing their propagation.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::call::CallInfo;
use crate::constraint::CallConstraint;
use crate::redirect::{CallOutcome, RedirectHandler};
use crate::relay::RedirectCall;

/// One captured invocation.
#[derive(Debug)]
pub struct Recorded {
	call: CallInfo,
	outcome: CallOutcome,
}

impl Recorded {
	/// The call as it entered the recorder (argument slots frozen at entry).
	pub fn call(&self) -> &CallInfo {
		&self.call
	}

	/// The outcome the recorder propagated to its caller.
	pub fn outcome(&self) -> &CallOutcome {
		&self.outcome
	}
}

#[derive(Default)]
struct RecordStore {
	calls: Mutex<Vec<Arc<Recorded>>>,
}

impl RecordStore {
	fn push(&self, recorded: Recorded) {
		self.calls.lock().push(Arc::new(recorded));
	}
}

/// Query handle over a recorder's captured calls.
///
/// Stays valid after the recorder redirect is removed or reset away; the
/// captures made up to that point are retained.
#[derive(Clone)]
pub struct RecordHandle {
	store: Arc<RecordStore>,
}

impl RecordHandle {
	/// Number of captured calls.
	pub fn len(&self) -> usize {
		self.store.calls.lock().len()
	}

	/// Returns true if nothing was captured.
	pub fn is_empty(&self) -> bool {
		self.store.calls.lock().is_empty()
	}

	/// Every captured call, in capture order.
	pub fn calls(&self) -> Vec<Arc<Recorded>> {
		self.store.calls.lock().clone()
	}

	/// Captured calls matching `constraint`, in capture order.
	pub fn matching(&self, constraint: &dyn CallConstraint) -> Vec<Arc<Recorded>> {
		self.store
			.calls
			.lock()
			.iter()
			.filter(|r| constraint.is_match(&r.call))
			.cloned()
			.collect()
	}

	/// Discards all captures made so far.
	pub fn clear(&self) {
		self.store.calls.lock().clear();
	}
}

impl std::fmt::Debug for RecordHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RecordHandle")
			.field("captured", &self.len())
			.finish()
	}
}

/// Builds the recorder handler plus its query handle.
pub(crate) fn recorder_redirect() -> (Arc<dyn RedirectHandler>, RecordHandle) {
	let store = Arc::new(RecordStore::default());
	let sink = store.clone();
	let handler = move |call: &RedirectCall<'_>| -> CallOutcome {
		// Freeze arguments before delegating: downstream write-backs belong
		// to the call, not to the capture.
		let entry = call.info().freeze();
		let outcome = call.call_next();
		sink.push(Recorded {
			call: entry,
			outcome: outcome.clone(),
		});
		outcome
	};
	(Arc::new(handler), RecordHandle { store })
}
