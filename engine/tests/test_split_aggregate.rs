//! Tests for Split fan-out and Aggregate fan-in
//!
//! Fragment labelling, copy independence, family reassembly and the
//! survivor's identity.

use std::sync::Arc;

use queueing_simulator_core_rs::{
    Aggregate, Block, BlockRef, BlockStats, Hole, ParamValue, Parameter, SimContext, Split,
    Transaction, TransactionHandle,
};

fn transact(ctx: &Arc<SimContext>) -> TransactionHandle {
    TransactionHandle::new(Transaction::new(ctx.next_transact_id(), ctx.model_time()))
}

#[test]
fn test_split_into_three_labelled_parts() {
    let ctx = Arc::new(SimContext::new(1));
    ctx.advance_clock();
    let fork = Split::new("Fork", 3, 0);
    fork.wire(vec![], &ctx);

    let original = transact(&ctx);
    let parent_id = original.id();
    original.set_parameters(vec![Parameter::assign("Order", 7i64)]);
    assert!(fork.append_transact(&original));
    assert!(original.is_killed(), "the original dies once its parts exist");

    let parts = fork.held_snapshot();
    assert_eq!(parts.len(), 3);
    for (index, part) in parts.iter().enumerate() {
        let label = part.parts();
        assert_eq!(label.part, index + 1);
        assert_eq!(label.total_parts, 3);
        assert_eq!(label.parent_id, parent_id);
        assert_ne!(part.id(), parent_id, "every part gets a fresh id");
        assert_eq!(
            part.parameter("Order"),
            Some(ParamValue::Int(7)),
            "parts inherit the parent's parameters"
        );
    }

    // All ids distinct
    let mut ids: Vec<u64> = parts.iter().map(|p| p.id()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_parts_do_not_share_parameters() {
    let ctx = Arc::new(SimContext::new(1));
    let fork = Split::new("Fork", 2, 0);
    fork.wire(vec![], &ctx);

    let original = transact(&ctx);
    original.set_parameters(vec![Parameter::assign("Color", "red")]);
    fork.append_transact(&original);

    let parts = fork.held_snapshot();
    parts[0].set_parameters(vec![Parameter::assign("Color", "blue")]);
    assert_eq!(parts[1].parameter("Color"), Some("red".into()));
}

#[test]
fn test_merge_restores_parent_identity() {
    let ctx = Arc::new(SimContext::new(1));
    ctx.advance_clock();
    let join = Aggregate::new("Join");
    join.wire(vec![], &ctx);
    let fork = Split::new("Fork", 3, 0);
    fork.wire(vec![join.clone() as BlockRef], &ctx);

    let original = transact(&ctx);
    let parent_id = original.id();
    fork.append_transact(&original);

    // The whole family arrived in one call chain, so the merge is done
    assert_eq!(join.parts_pending(), 0);
    let ready = join.held_snapshot();
    assert_eq!(ready.len(), 1);
    let survivor = &ready[0];
    assert_eq!(survivor.id(), parent_id);
    assert!(!survivor.parts().is_fragment());
    assert!(!survivor.is_killed());
}

#[test]
fn test_incomplete_family_waits() {
    let ctx = Arc::new(SimContext::new(1));
    let join = Aggregate::new("Join");
    join.wire(vec![], &ctx);

    let part1 = transact(&ctx);
    part1.set_parts(1, 3, 50);
    let part2 = transact(&ctx);
    part2.set_parts(2, 3, 50);

    assert!(join.append_transact(&part1));
    assert!(join.append_transact(&part2));
    assert_eq!(join.parts_pending(), 2);
    assert!(join.held_snapshot().is_empty(), "no survivor before the family is whole");

    match join.report().stats {
        BlockStats::Aggregate { merged, passed, parts_pending } => {
            assert_eq!(merged, 0);
            assert_eq!(passed, 0);
            assert_eq!(parts_pending, 2);
        }
        other => panic!("unexpected stats {:?}", other),
    }
}

#[test]
fn test_two_families_do_not_mix() {
    let ctx = Arc::new(SimContext::new(1));
    ctx.advance_clock();
    let join = Aggregate::new("Join");
    join.wire(vec![], &ctx);

    let a1 = transact(&ctx);
    a1.set_parts(1, 2, 100);
    let b1 = transact(&ctx);
    b1.set_parts(1, 2, 200);
    let a2 = transact(&ctx);
    a2.set_parts(2, 2, 100);

    join.append_transact(&a1);
    join.append_transact(&b1);
    assert_eq!(join.parts_pending(), 2, "two singleton families");

    join.append_transact(&a2);
    assert_eq!(join.parts_pending(), 1, "family 100 merged, family 200 waits");
    let ready = join.held_snapshot();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].id(), 100);
}

#[test]
fn test_pass_through_counts_separately() {
    let ctx = Arc::new(SimContext::new(1));
    ctx.advance_clock();
    let sink = Hole::new("Sink");
    sink.wire(vec![], &ctx);
    let join = Aggregate::new("Join");
    join.wire(vec![sink.clone() as BlockRef], &ctx);

    let plain = transact(&ctx);
    assert!(join.append_transact(&plain));
    assert!(plain.is_killed(), "a pass-through goes straight to the sink");

    match join.report().stats {
        BlockStats::Aggregate { merged, passed, .. } => {
            assert_eq!(merged, 0);
            assert_eq!(passed, 1);
        }
        other => panic!("unexpected stats {:?}", other),
    }
}
