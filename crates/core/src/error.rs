use thiserror::Error;

use crate::call::MethodId;
use crate::via::ViaId;

/// Configuration errors raised by the interception engine itself.
///
/// These cover misconfiguration states only (missing root delegation target,
/// unsatisfied strict mode, wrong-typed handler output). Failures produced by
/// the intercepted code are never represented here: they travel through the
/// chain as ordinary return values and the engine neither catches nor wraps
/// them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewireError {
	/// Root delegation was requested but no root instance was supplied when
	/// the proxy was created.
	#[error("no root instance available to handle {method}")]
	MissingRoot {
		/// The method whose call fell through to the missing root.
		method: MethodId,
	},
	/// A strict-mode via completed a call that no strict-participating
	/// redirect handled.
	#[error("strict via {via} received a call no redirect satisfied")]
	StrictNotSatisfied {
		/// The via that enforced strict mode.
		via: ViaId,
	},
	/// A redirect handler produced a value of the wrong type for the
	/// intercepted method's signature.
	#[error("handler for {method} returned `{actual}`, expected `{expected}`")]
	ReturnTypeMismatch {
		/// The intercepted method.
		method: MethodId,
		/// Type name the proxied signature requires.
		expected: &'static str,
		/// Type name the handler actually produced.
		actual: &'static str,
	},
}
