//! Tests for Check routing
//!
//! A gate with an expected-parameter condition, a dedicated false path
//! and pass-through behaviour that never holds a transaction.

use std::sync::Arc;

use queueing_simulator_core_rs::{
    Block, BlockRef, BlockStats, Check, Hole, Parameter, SimContext, Transaction,
    TransactionHandle,
};

fn transact(id: u64) -> TransactionHandle {
    TransactionHandle::new(Transaction::new(id, 0))
}

fn counts(check: &Check) -> (u64, u64) {
    match check.report().stats {
        BlockStats::Check { cnt_true, cnt_false } => (cnt_true, cnt_false),
        other => panic!("unexpected stats {:?}", other),
    }
}

#[test]
fn test_routes_by_expected_parameter() {
    let ctx = Arc::new(SimContext::new(1));
    ctx.advance_clock();
    let accepted = Hole::new("Accepted");
    accepted.wire(vec![], &ctx);
    let rejected = Hole::new("Rejected");
    rejected.wire(vec![], &ctx);
    let gate = Check::new(
        "Gate",
        Some(rejected.clone() as BlockRef),
        vec![Parameter::assign("X", 1i64)],
    );
    gate.wire(vec![accepted.clone() as BlockRef], &ctx);

    // X = 1 goes down the true path
    let matching = transact(1);
    matching.set_parameters(vec![Parameter::assign("X", 1i64)]);
    assert!(gate.append_transact(&matching));

    // X = 2 goes down the false path
    let mismatching = transact(2);
    mismatching.set_parameters(vec![Parameter::assign("X", 2i64)]);
    assert!(gate.append_transact(&mismatching));

    // A missing X is a mismatch too
    let missing = transact(3);
    assert!(gate.append_transact(&missing));

    assert_eq!(counts(&gate), (1, 2));
    assert_eq!(accepted.killed(), 1);
    assert_eq!(rejected.killed(), 2);
}

#[test]
fn test_all_expected_parameters_must_match() {
    let ctx = Arc::new(SimContext::new(1));
    let accepted = Hole::new("Accepted");
    accepted.wire(vec![], &ctx);
    let gate = Check::new(
        "Gate",
        None,
        vec![
            Parameter::assign("Color", "red"),
            Parameter::assign("Size", 3i64),
        ],
    );
    gate.wire(vec![accepted.clone() as BlockRef], &ctx);

    let half = transact(1);
    half.set_parameters(vec![Parameter::assign("Color", "red")]);
    assert!(!gate.append_transact(&half), "one of two expected parameters is not enough");

    let full = transact(2);
    full.set_parameters(vec![
        Parameter::assign("Color", "red"),
        Parameter::assign("Size", 3i64),
    ]);
    assert!(gate.append_transact(&full));
    assert_eq!(counts(&gate), (1, 1));
}

#[test]
fn test_without_false_path_failures_stay_with_sender() {
    let ctx = Arc::new(SimContext::new(1));
    let accepted = Hole::new("Accepted");
    accepted.wire(vec![], &ctx);
    let gate = Check::new("Gate", None, vec![Parameter::assign("X", 1i64)]);
    gate.wire(vec![accepted.clone() as BlockRef], &ctx);

    let t = transact(1);
    assert!(
        !gate.append_transact(&t),
        "with no false path the sender keeps a failing transaction"
    );
    assert!(!t.is_killed());
    assert_eq!(counts(&gate), (0, 1));
}

#[test]
fn test_check_never_holds() {
    let ctx = Arc::new(SimContext::new(1));
    let gate = Check::new("Gate", None, vec![]);
    gate.wire(vec![], &ctx);

    // An empty condition is vacuously true, but there is nowhere to go
    let t = transact(1);
    assert!(!gate.append_transact(&t));
    assert!(gate.held_snapshot().is_empty());
}

#[test]
fn test_predicate_gate() {
    let ctx = Arc::new(SimContext::new(1));
    let accepted = Hole::new("Accepted");
    accepted.wire(vec![], &ctx);
    let rejected = Hole::new("Rejected");
    rejected.wire(vec![], &ctx);
    let gate = Check::with_predicate(
        "Odd",
        Box::new(|_, t| t.id() % 2 == 1),
        Some(rejected.clone() as BlockRef),
    );
    gate.wire(vec![accepted.clone() as BlockRef], &ctx);

    for id in 1..=6 {
        assert!(gate.append_transact(&transact(id)));
    }
    assert_eq!(counts(&gate), (3, 3));
    assert_eq!(accepted.killed(), 3);
    assert_eq!(rejected.killed(), 3);
}
