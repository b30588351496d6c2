use std::sync::Arc;

use super::*;
use crate::call::CallArguments;
use crate::via::ViaId;

trait Probe: Send + Sync {}

fn echo_id() -> MethodId {
	MethodId::of::<dyn Probe, String>("Probe", "echo")
}

fn sum_id() -> MethodId {
	MethodId::of::<dyn Probe, i64>("Probe", "sum")
}

fn call(method: MethodId, args: Vec<CallValue>) -> CallInfo {
	CallInfo::new(
		ViaId::of::<dyn Probe>("Probe"),
		method,
		CallArguments::of(args),
		None,
	)
}

#[test]
fn match_all_matches_everything() {
	assert!(MatchAll.is_match(&call(echo_id(), Vec::new())));
	assert!(MatchAll.is_match(&call(sum_id(), vec![CallValue::new(1i64)])));
}

#[test]
fn method_identity_match() {
	let constraint = CallMatch::method(echo_id());
	assert!(constraint.is_match(&call(echo_id(), Vec::new())));
	assert!(!constraint.is_match(&call(sum_id(), Vec::new())));
}

#[test]
fn argument_value_match() {
	let constraint =
		CallMatch::method(echo_id()).arg(0, ArgMatch::value("Hello".to_owned()));
	assert!(constraint.is_match(&call(echo_id(), vec![CallValue::new("Hello".to_owned())])));
	assert!(!constraint.is_match(&call(echo_id(), vec![CallValue::new("Bye".to_owned())])));
}

#[test]
fn argument_type_mismatch_is_no_match_not_an_error() {
	let constraint = CallMatch::any().arg(0, ArgMatch::value("Hello".to_owned()));
	// Slot holds an i64; the string matcher simply does not apply.
	assert!(!constraint.is_match(&call(echo_id(), vec![CallValue::new(5i64)])));
}

#[test]
fn missing_argument_slot_is_no_match() {
	let constraint = CallMatch::any().arg(3, ArgMatch::any());
	assert!(!constraint.is_match(&call(echo_id(), vec![CallValue::new(5i64)])));
}

#[test]
fn wildcard_argument_match() {
	let constraint = CallMatch::method(echo_id()).arg(0, ArgMatch::any());
	assert!(constraint.is_match(&call(echo_id(), vec![CallValue::new(5i64)])));
	assert!(constraint.is_match(&call(echo_id(), vec![CallValue::new("x".to_owned())])));
}

#[test]
fn predicate_argument_match() {
	let constraint = CallMatch::any().arg(0, ArgMatch::matches::<i64, _>(|n| *n > 10));
	assert!(constraint.is_match(&call(sum_id(), vec![CallValue::new(11i64)])));
	assert!(!constraint.is_match(&call(sum_id(), vec![CallValue::new(10i64)])));
	// Wrong type never reaches the predicate.
	assert!(!constraint.is_match(&call(sum_id(), vec![CallValue::new("11".to_owned())])));
}

#[test]
fn return_type_match() {
	let strings = CallMatch::any().returns::<String>();
	assert!(strings.is_match(&call(echo_id(), Vec::new())));
	assert!(!strings.is_match(&call(sum_id(), Vec::new())));
}

#[test]
fn conjunction_requires_all() {
	let constraint = AllOf::new([
		Arc::new(CallMatch::method(echo_id())) as Arc<dyn CallConstraint>,
		Arc::new(CallMatch::any().arg(0, ArgMatch::any())),
	]);
	assert!(constraint.is_match(&call(echo_id(), vec![CallValue::new(1i64)])));
	assert!(!constraint.is_match(&call(echo_id(), Vec::new())));
	assert!(!constraint.is_match(&call(sum_id(), vec![CallValue::new(1i64)])));
}

#[test]
fn closures_are_constraints() {
	let constraint = |call: &CallInfo| call.method().method() == "echo";
	assert!(constraint.is_match(&call(echo_id(), Vec::new())));
	assert!(!constraint.is_match(&call(sum_id(), Vec::new())));
}
