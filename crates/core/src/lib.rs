//! Redirect-chain interception engine.
//!
//! Given a proxy adapter for a trait, this crate resolves an ordered,
//! filterable, per-type chain of redirect handlers for every invocation and
//! threads a call-next / call-root relay through it, supporting concurrent,
//! resettable mutation of the chain while calls are in flight.
//!
//! The pieces, leaf to root:
//! - [`CallInfo`] / [`CallArguments`]: immutable descriptor of one invocation.
//! - [`CallConstraint`]: pure predicates deciding which redirects apply.
//! - [`Redirect`]: a weighted (constraint, handler) pair.
//! - [`RedirectRepository`]: lock-free snapshot storage and chain resolution.
//! - [`RedirectCall`]: the per-call relay cursor handed to handlers.
//! - [`Via`]: the per-(type, name) facade owning one repository.
//! - [`RecordHandle`]: passive call capture for assertions.
//! - [`Hub`]: the scope-wide via registry and proxy entry point.
//!
//! Proxy adapters themselves are generated by the `rewire` facade crate;
//! this crate only needs "given a method and arguments, produce a result,
//! with a way to invoke the underlying implementation".

mod call;
mod constraint;
mod error;
mod hub;
mod record;
mod redirect;
mod relay;
mod repository;
mod via;

pub use call::{CallArguments, CallInfo, CallValue, MethodId};
pub use constraint::{AllOf, ArgMatch, CallConstraint, CallMatch, MatchAll};
pub use error::RewireError;
pub use hub::{Hub, ProxyTarget};
pub use record::{RecordHandle, Recorded};
pub use redirect::{CallOutcome, Redirect, RedirectHandler};
pub use relay::{RedirectCall, RootInvoker};
pub use repository::{ChainSnapshot, RedirectRepository};
pub use via::{RedirectBuilder, Via, ViaId};
