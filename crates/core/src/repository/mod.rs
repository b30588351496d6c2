//! Redirect storage and chain resolution.
//!
//! The repository is the one mutable shared structure in the engine. It
//! holds an immutable redirect stack behind an [`ArcSwap`]; inserts go
//! through a compare-and-swap retry loop and reset is a plain swap, so every
//! mutation is linearizable and no lock is ever held across constraint
//! evaluation or handler execution. In-flight calls keep whatever snapshot
//! they resolved at entry.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::trace;

use crate::call::CallInfo;
use crate::constraint::CallConstraint;
use crate::redirect::{Redirect, RedirectHandler};

/// The materialized, filtered, ordered redirect list for one invocation.
///
/// Frozen at call entry: repository mutations made while the call is in
/// flight do not show through.
pub type ChainSnapshot = Arc<[Arc<Redirect>]>;

#[derive(Default)]
struct RedirectStack {
	redirects: Vec<Arc<Redirect>>,
	// Carries across resets so post-reset inserts still sort after every
	// earlier epoch.
	next_seq: u64,
}

/// Ordered, concurrently mutable set of redirects for one via.
pub struct RedirectRepository {
	stack: ArcSwap<RedirectStack>,
}

impl RedirectRepository {
	/// Creates an empty repository.
	pub fn new() -> Self {
		Self {
			stack: ArcSwap::from_pointee(RedirectStack::default()),
		}
	}

	/// Registers a redirect, assigning it the next sequence number.
	///
	/// Immediately visible to calls that resolve their chain afterwards;
	/// never visible to calls already in flight.
	pub fn insert(
		&self,
		handler: Arc<dyn RedirectHandler>,
		constraint: Arc<dyn CallConstraint>,
		weight: i32,
		opt_out_strict: bool,
	) -> Arc<Redirect> {
		loop {
			let cur = self.stack.load_full();
			let redirect = Arc::new(Redirect::new(
				handler.clone(),
				constraint.clone(),
				weight,
				cur.next_seq,
				opt_out_strict,
			));
			let mut redirects = cur.redirects.clone();
			redirects.push(redirect.clone());
			let next = Arc::new(RedirectStack {
				redirects,
				next_seq: cur.next_seq + 1,
			});
			let prev = self.stack.compare_and_swap(&cur, next);
			if Arc::ptr_eq(&prev, &cur) {
				trace!(seq = redirect.seq(), weight, "redirect inserted");
				return redirect;
			}
		}
	}

	/// Removes a previously inserted redirect. Returns false if it was not
	/// present (already removed, or cleared by a reset).
	pub fn remove(&self, redirect: &Arc<Redirect>) -> bool {
		loop {
			let cur = self.stack.load_full();
			if !cur.redirects.iter().any(|r| Arc::ptr_eq(r, redirect)) {
				return false;
			}
			let redirects = cur
				.redirects
				.iter()
				.filter(|r| !Arc::ptr_eq(r, redirect))
				.cloned()
				.collect();
			let next = Arc::new(RedirectStack {
				redirects,
				next_seq: cur.next_seq,
			});
			let prev = self.stack.compare_and_swap(&cur, next);
			if Arc::ptr_eq(&prev, &cur) {
				return true;
			}
		}
	}

	/// Atomically clears every registered redirect.
	///
	/// Calls already in flight complete against their entry snapshot.
	pub fn reset(&self) {
		loop {
			let cur = self.stack.load_full();
			let next = Arc::new(RedirectStack {
				redirects: Vec::new(),
				next_seq: cur.next_seq,
			});
			let prev = self.stack.compare_and_swap(&cur, next);
			if Arc::ptr_eq(&prev, &cur) {
				trace!(cleared = cur.redirects.len(), "repository reset");
				return;
			}
		}
	}

	/// Number of registered redirects.
	pub fn len(&self) -> usize {
		self.stack.load().redirects.len()
	}

	/// Returns true if no redirects are registered.
	pub fn is_empty(&self) -> bool {
		self.stack.load().redirects.is_empty()
	}

	/// Resolves the effective chain for `call`.
	///
	/// Filters by constraint, then stable-sorts by weight descending with
	/// sequence descending as the tie-break: equal-weight redirects run in
	/// reverse registration order, so the redirect registered last runs
	/// first. The result is materialized so concurrent mutation cannot make
	/// a redirect disappear mid-call.
	pub fn resolve(&self, call: &CallInfo) -> ChainSnapshot {
		let stack = self.stack.load();
		let mut matched: Vec<Arc<Redirect>> = stack
			.redirects
			.iter()
			.filter(|r| r.is_match(call))
			.cloned()
			.collect();
		matched.sort_by(|a, b| {
			b.weight()
				.cmp(&a.weight())
				.then_with(|| b.seq().cmp(&a.seq()))
		});
		trace!(
			method = %call.method(),
			registered = stack.redirects.len(),
			matched = matched.len(),
			"chain resolved"
		);
		matched.into()
	}
}

impl Default for RedirectRepository {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests;
