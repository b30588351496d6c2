//! Call matching predicates.
//!
//! A [`CallConstraint`] decides whether a redirect applies to a given call.
//! Constraints are pure functions of [`CallInfo`]: no side effects, no
//! panics on well-formed calls, deterministic. A type mismatch between a
//! matcher and an argument means "does not apply" (false), never an error.

use std::any::TypeId;
use std::sync::Arc;

use crate::call::{CallInfo, CallValue, MethodId};

/// Predicate over a [`CallInfo`].
pub trait CallConstraint: Send + Sync {
	/// Returns true if the constrained redirect applies to `call`.
	fn is_match(&self, call: &CallInfo) -> bool;
}

impl<F> CallConstraint for F
where
	F: Fn(&CallInfo) -> bool + Send + Sync,
{
	fn is_match(&self, call: &CallInfo) -> bool {
		self(call)
	}
}

/// Matches every call. The default constraint for unconditional redirects
/// and recorders.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchAll;

impl CallConstraint for MatchAll {
	fn is_match(&self, _call: &CallInfo) -> bool {
		true
	}
}

/// Matcher for a single argument slot.
pub struct ArgMatch {
	matcher: Box<dyn Fn(&CallValue) -> bool + Send + Sync>,
}

impl ArgMatch {
	/// Wildcard: matches any value in the slot.
	pub fn any() -> Self {
		Self {
			matcher: Box::new(|_| true),
		}
	}

	/// Matches a slot holding exactly `expected`.
	pub fn value<T>(expected: T) -> Self
	where
		T: PartialEq + Send + Sync + 'static,
	{
		Self {
			matcher: Box::new(move |v| v.downcast_ref::<T>() == Some(&expected)),
		}
	}

	/// Matches a slot of type `T` satisfying `pred`.
	pub fn matches<T, F>(pred: F) -> Self
	where
		T: 'static,
		F: Fn(&T) -> bool + Send + Sync + 'static,
	{
		Self {
			matcher: Box::new(move |v| v.downcast_ref::<T>().is_some_and(&pred)),
		}
	}

	fn is_match(&self, value: &CallValue) -> bool {
		(self.matcher)(value)
	}
}

impl std::fmt::Debug for ArgMatch {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("ArgMatch")
	}
}

/// Composite constraint over method identity, argument values, and return
/// type, with short-circuit AND semantics.
///
/// ```ignore
/// let constraint = CallMatch::method(method_id)
///     .arg(0, ArgMatch::value("Hello".to_owned()))
///     .returns::<String>();
/// ```
#[derive(Debug, Default)]
pub struct CallMatch {
	method: Option<MethodId>,
	args: Vec<(usize, ArgMatch)>,
	ret: Option<TypeId>,
}

impl CallMatch {
	/// Starts from an always-true match.
	pub fn any() -> Self {
		Self::default()
	}

	/// Starts from a method identity match.
	pub fn method(method: MethodId) -> Self {
		Self {
			method: Some(method),
			..Self::default()
		}
	}

	/// Adds a matcher for the argument slot at `index`.
	///
	/// An index past the call's actual argument count never matches.
	pub fn arg(mut self, index: usize, matcher: ArgMatch) -> Self {
		self.args.push((index, matcher));
		self
	}

	/// Requires the invoked method to declare return type `R`.
	pub fn returns<R: 'static>(mut self) -> Self {
		self.ret = Some(TypeId::of::<R>());
		self
	}
}

impl CallConstraint for CallMatch {
	fn is_match(&self, call: &CallInfo) -> bool {
		if let Some(method) = self.method
			&& call.method() != method
		{
			return false;
		}
		if let Some(ret) = self.ret
			&& call.method().return_type() != ret
		{
			return false;
		}
		for (index, matcher) in &self.args {
			match call.args().get(*index) {
				Some(value) if matcher.is_match(&value) => {}
				_ => return false,
			}
		}
		true
	}
}

/// Conjunction of arbitrary constraints; first false wins.
pub struct AllOf {
	constraints: Vec<Arc<dyn CallConstraint>>,
}

impl AllOf {
	/// Builds the conjunction.
	pub fn new(constraints: impl IntoIterator<Item = Arc<dyn CallConstraint>>) -> Self {
		Self {
			constraints: constraints.into_iter().collect(),
		}
	}
}

impl CallConstraint for AllOf {
	fn is_match(&self, call: &CallInfo) -> bool {
		self.constraints.iter().all(|c| c.is_match(call))
	}
}

#[cfg(test)]
mod tests;
