use std::sync::Arc;

use super::*;
use crate::call::{CallArguments, CallValue, MethodId};
use crate::constraint::{CallMatch, MatchAll};
use crate::redirect::CallOutcome;
use crate::relay::RedirectCall;
use crate::via::ViaId;

trait Probe: Send + Sync {}

fn echo_id() -> MethodId {
	MethodId::of::<dyn Probe, String>("Probe", "echo")
}

fn other_id() -> MethodId {
	MethodId::of::<dyn Probe, String>("Probe", "other")
}

fn probe_call(method: MethodId) -> CallInfo {
	CallInfo::new(
		ViaId::of::<dyn Probe>("Probe"),
		method,
		CallArguments::empty(),
		None,
	)
}

fn tagged(tag: &'static str) -> Arc<dyn RedirectHandler> {
	Arc::new(move |_call: &RedirectCall<'_>| -> CallOutcome { Ok(CallValue::new(tag)) })
}

fn tags(snapshot: &ChainSnapshot) -> Vec<u64> {
	snapshot.iter().map(|r| r.seq()).collect()
}

#[test]
fn insert_assigns_monotonic_sequence() {
	let repo = RedirectRepository::new();
	let a = repo.insert(tagged("a"), Arc::new(MatchAll), 0, false);
	let b = repo.insert(tagged("b"), Arc::new(MatchAll), 0, false);
	assert_eq!(a.seq(), 0);
	assert_eq!(b.seq(), 1);
	assert_eq!(repo.len(), 2);
}

#[test]
fn resolve_filters_by_constraint() {
	let repo = RedirectRepository::new();
	repo.insert(
		tagged("echo"),
		Arc::new(CallMatch::method(echo_id())),
		0,
		false,
	);
	repo.insert(
		tagged("other"),
		Arc::new(CallMatch::method(other_id())),
		0,
		false,
	);

	let snapshot = repo.resolve(&probe_call(echo_id()));
	assert_eq!(snapshot.len(), 1);
	assert_eq!(snapshot[0].seq(), 0);

	let snapshot = repo.resolve(&probe_call(other_id()));
	assert_eq!(snapshot.len(), 1);
	assert_eq!(snapshot[0].seq(), 1);
}

#[test]
fn higher_weight_runs_first_regardless_of_registration_order() {
	let repo = RedirectRepository::new();
	repo.insert(tagged("light"), Arc::new(MatchAll), 0, false); // seq 0
	repo.insert(tagged("heavy"), Arc::new(MatchAll), 10, false); // seq 1

	let snapshot = repo.resolve(&probe_call(echo_id()));
	assert_eq!(tags(&snapshot), vec![1, 0]);

	// Registration order flipped, same outcome.
	let repo = RedirectRepository::new();
	repo.insert(tagged("heavy"), Arc::new(MatchAll), 10, false); // seq 0
	repo.insert(tagged("light"), Arc::new(MatchAll), 0, false); // seq 1
	let snapshot = repo.resolve(&probe_call(echo_id()));
	assert_eq!(tags(&snapshot), vec![0, 1]);
}

#[test]
fn equal_weight_runs_last_registered_first() {
	let repo = RedirectRepository::new();
	repo.insert(tagged("first"), Arc::new(MatchAll), 0, false); // seq 0
	repo.insert(tagged("second"), Arc::new(MatchAll), 0, false); // seq 1
	repo.insert(tagged("third"), Arc::new(MatchAll), 0, false); // seq 2

	let snapshot = repo.resolve(&probe_call(echo_id()));
	assert_eq!(tags(&snapshot), vec![2, 1, 0]);
}

#[test]
fn remove_by_identity() {
	let repo = RedirectRepository::new();
	let a = repo.insert(tagged("a"), Arc::new(MatchAll), 0, false);
	let b = repo.insert(tagged("b"), Arc::new(MatchAll), 0, false);

	assert!(repo.remove(&a));
	assert!(!repo.remove(&a));
	assert_eq!(repo.len(), 1);

	let snapshot = repo.resolve(&probe_call(echo_id()));
	assert_eq!(tags(&snapshot), vec![b.seq()]);
}

#[test]
fn reset_clears_but_sequence_survives() {
	let repo = RedirectRepository::new();
	repo.insert(tagged("pre"), Arc::new(MatchAll), 0, false); // seq 0
	repo.insert(tagged("pre"), Arc::new(MatchAll), 0, false); // seq 1
	repo.reset();
	assert!(repo.is_empty());

	// Post-reset inserts continue the sequence, keeping epoch ordering
	// coherent for anything that retained a pre-reset redirect.
	let post = repo.insert(tagged("post"), Arc::new(MatchAll), 0, false);
	assert_eq!(post.seq(), 2);
}

#[test]
fn resolved_snapshot_survives_mutation() {
	let repo = RedirectRepository::new();
	repo.insert(tagged("a"), Arc::new(MatchAll), 0, false);

	let snapshot = repo.resolve(&probe_call(echo_id()));
	repo.reset();
	repo.insert(tagged("b"), Arc::new(MatchAll), 0, false);

	// The materialized chain still holds the redirect that existed at
	// resolution time.
	assert_eq!(snapshot.len(), 1);
	assert_eq!(snapshot[0].seq(), 0);

	let fresh = repo.resolve(&probe_call(echo_id()));
	assert_eq!(fresh.len(), 1);
	assert_eq!(fresh[0].seq(), 1);
}

#[test]
fn concurrent_inserts_all_land() {
	let repo = Arc::new(RedirectRepository::new());
	let threads: Vec<_> = (0..8)
		.map(|_| {
			let repo = repo.clone();
			std::thread::spawn(move || {
				for _ in 0..100 {
					repo.insert(tagged("t"), Arc::new(MatchAll), 0, false);
				}
			})
		})
		.collect();
	for t in threads {
		t.join().unwrap();
	}

	assert_eq!(repo.len(), 800);
	// Sequence numbers are unique despite contention.
	let snapshot = repo.resolve(&probe_call(echo_id()));
	let mut seqs = tags(&snapshot);
	seqs.sort_unstable();
	seqs.dedup();
	assert_eq!(seqs.len(), 800);
}
