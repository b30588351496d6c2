//! The call-next / call-root state machine.
//!
//! A [`Relay`] is a cursor over a frozen [`ChainSnapshot`]. All cursor state
//! lives on the call stack and is threaded into each handler through its
//! [`RedirectCall`] parameter, never stored on the via, so nested and
//! recursive invocations each get an independent cursor with no shared
//! mutable state to corrupt.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::call::{CallArguments, CallInfo, MethodId};
use crate::error::RewireError;
use crate::redirect::{CallOutcome, Redirect};
use crate::repository::ChainSnapshot;

/// Invokes the pre-redirect (root) implementation for one call.
///
/// Supplied by the proxy adapter per invocation; it reads the argument slots
/// at invocation time, so writes made mid-chain are honored.
pub struct RootInvoker {
	invoke: Box<dyn Fn(&CallInfo) -> CallOutcome + Send + Sync>,
}

impl RootInvoker {
	/// Wraps the adapter's root dispatch closure.
	pub fn new(invoke: impl Fn(&CallInfo) -> CallOutcome + Send + Sync + 'static) -> Self {
		Self {
			invoke: Box::new(invoke),
		}
	}

	fn invoke(&self, call: &CallInfo) -> CallOutcome {
		(self.invoke)(call)
	}
}

impl std::fmt::Debug for RootInvoker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("RootInvoker")
	}
}

/// Per-call flags observed after the chain completes.
#[derive(Debug, Default)]
pub(crate) struct RelayFlags {
	satisfied: AtomicBool,
}

impl RelayFlags {
	fn mark_satisfied(&self) {
		self.satisfied.store(true, Ordering::Relaxed);
	}

	pub(crate) fn is_satisfied(&self) -> bool {
		self.satisfied.load(Ordering::Relaxed)
	}
}

/// Cursor over one call's chain snapshot.
///
/// `Copy`: each delegation constructs the follow-up cursor rather than
/// mutating this one, so a handler's own `call_next` re-enters at the
/// position after it, never at its own.
#[derive(Clone, Copy)]
pub(crate) struct Relay<'a> {
	snapshot: &'a [Arc<Redirect>],
	index: usize,
	root: Option<&'a RootInvoker>,
	flags: &'a RelayFlags,
}

impl<'a> Relay<'a> {
	/// Runs the chain for `call` from the first position.
	///
	/// An empty snapshot falls straight through to the root.
	pub(crate) fn begin(
		snapshot: &'a ChainSnapshot,
		root: Option<&'a RootInvoker>,
		flags: &'a RelayFlags,
		call: &'a CallInfo,
	) -> CallOutcome {
		let relay = Relay {
			snapshot: &**snapshot,
			index: 0,
			root,
			flags,
		};
		relay.call_next(call)
	}

	fn call_next(&self, call: &'a CallInfo) -> CallOutcome {
		match self.snapshot.get(self.index) {
			Some(redirect) => {
				if !redirect.opts_out_of_strict() {
					self.flags.mark_satisfied();
				}
				// Advance before invoking: the handler's context re-enters
				// the chain at the following position.
				let next = RedirectCall {
					info: call,
					relay: Relay {
						index: self.index + 1,
						..*self
					},
				};
				redirect.handler().handle(&next)
			}
			// Implicit chain terminator: past the end, delegate to root.
			None => self.call_root(call),
		}
	}

	fn call_root(&self, call: &'a CallInfo) -> CallOutcome {
		match self.root {
			Some(root) => root.invoke(call),
			None => Err(RewireError::MissingRoot {
				method: call.method(),
			}),
		}
	}
}

/// The relay-bound context handed to every redirect handler.
///
/// Exposes the call descriptor plus the two delegation operations: continue
/// down the current chain, or bypass it and invoke the root directly.
pub struct RedirectCall<'a> {
	pub(crate) info: &'a CallInfo,
	pub(crate) relay: Relay<'a>,
}

impl<'a> RedirectCall<'a> {
	/// The intercepted call.
	pub fn info(&self) -> &'a CallInfo {
		self.info
	}

	/// Shorthand for the invoked method's identity.
	pub fn method(&self) -> MethodId {
		self.info.method()
	}

	/// Shorthand for the argument slots.
	pub fn args(&self) -> &'a CallArguments {
		self.info.args()
	}

	/// Invokes the next matching redirect in this call's snapshot, or the
	/// root once the chain is exhausted.
	pub fn call_next(&self) -> CallOutcome {
		self.relay.call_next(self.info)
	}

	/// Bypasses every remaining redirect and invokes the root directly.
	///
	/// Fails with [`RewireError::MissingRoot`] if the proxy was created
	/// without a root instance.
	pub fn call_root(&self) -> CallOutcome {
		self.relay.call_root(self.info)
	}

	/// This handler's position in the chain snapshot (0-based).
	pub fn position(&self) -> usize {
		// The relay was advanced before this handler ran.
		self.relay.index - 1
	}

	/// Number of redirects after this one in the snapshot.
	pub fn remaining(&self) -> usize {
		self.relay.snapshot.len() - self.relay.index
	}
}

impl std::fmt::Debug for RedirectCall<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RedirectCall")
			.field("info", &self.info)
			.field("position", &self.relay.index)
			.field("chain_len", &self.relay.snapshot.len())
			.finish()
	}
}
