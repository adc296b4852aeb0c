//! Tests for the Facility occupancy protocol
//!
//! One occupant at a time, a closed busy window, and utilization that
//! adds up over the run.

use std::sync::Arc;

use queueing_simulator_core_rs::{
    Block, BlockRef, BlockStats, Facility, Hole, ParamValue, Parameter, Pipeline, SimContext,
    Transaction, TransactionHandle,
};

fn transact(id: u64, born: usize) -> TransactionHandle {
    TransactionHandle::new(Transaction::new(id, born))
}

#[test]
fn test_busy_window_closes_and_reopens() {
    let mut pipeline = Pipeline::new("m", 1);
    let sink = Hole::new("Sink");
    let server = Facility::new("Server", 3, 0);
    pipeline.append(sink.clone(), vec![]);
    pipeline.append(server.clone(), vec![sink]);

    // Tick 0: the facility is free and takes the first offer
    assert!(server.append_transact(&transact(1, 0)));
    assert!(!server.append_transact(&transact(2, 0)), "busy on the entry tick");

    pipeline.step();
    assert!(!server.append_transact(&transact(3, 1)), "busy at tick 1");
    pipeline.step();
    assert!(!server.append_transact(&transact(4, 2)), "busy at tick 2");

    // The tick 2 handle phase finished the three-tick service
    pipeline.step();
    assert!(server.is_empty());
    assert!(server.append_transact(&transact(5, 3)), "free again at tick 3");
}

#[test]
fn test_rejection_leaves_no_trace() {
    let ctx = Arc::new(SimContext::new(1));
    let server = Facility::new("Server", 3, 0);
    server.wire(vec![], &ctx);

    server.append_transact(&transact(1, 0));
    let rejected = transact(2, 0);
    rejected.set_parameters(vec![Parameter::assign("Facility", "Elsewhere")]);

    for _ in 0..3 {
        assert!(!server.append_transact(&rejected));
    }

    // The rejected transaction is untouched
    assert_eq!(rejected.ticks(), 0);
    assert_eq!(rejected.advance_time(), 0);
    assert_eq!(
        rejected.parameter("Facility"),
        Some(ParamValue::Str("Elsewhere".to_string()))
    );
    match server.report().stats {
        BlockStats::Facility { entries, .. } => {
            assert_eq!(entries, 1, "rejections must not count as entries");
        }
        other => panic!("unexpected stats {:?}", other),
    }
}

#[test]
fn test_entry_stamps_facility_parameter() {
    let ctx = Arc::new(SimContext::new(1));
    let server = Facility::new("Server", 4, 0);
    server.wire(vec![], &ctx);

    let t = transact(1, 0);
    server.append_transact(&t);
    assert_eq!(t.parameter("Facility"), Some("Server".into()));
    assert_eq!(t.ticks(), 4);
    assert_eq!(t.holder_name(), "Server");
}

#[test]
fn test_full_load_utilization_is_total() {
    let ctx = Arc::new(SimContext::new(1));
    let sink = Hole::new("Sink");
    sink.wire(vec![], &ctx);
    let server = Facility::new("Server", 4, 0);
    server.wire(vec![sink.clone() as BlockRef], &ctx);

    // Back-to-back occupancies over 40 ticks: accepted at 0, 4, ..., 36
    let mut next_id = 1;
    for tick in 0..40 {
        if server.append_transact(&transact(next_id, tick)) {
            next_id += 1;
        }
        let held = server.held_snapshot();
        server.handle_transacts(tick, &held);
        ctx.advance_clock();
    }

    match server.report().stats {
        BlockStats::Facility {
            utilization_pct,
            entries,
            average_advance,
            ..
        } => {
            assert_eq!(entries, 10);
            assert!((average_advance - 4.0).abs() < 1e-9);
            assert!(
                (utilization_pct - 100.0).abs() < 1e-9,
                "a saturated facility is busy the whole run, got {}",
                utilization_pct
            );
        }
        other => panic!("unexpected stats {:?}", other),
    }
}

#[test]
fn test_partial_load_utilization_is_proportional() {
    let ctx = Arc::new(SimContext::new(1));
    let sink = Hole::new("Sink");
    sink.wire(vec![], &ctx);
    let server = Facility::new("Server", 4, 0);
    server.wire(vec![sink.clone() as BlockRef], &ctx);

    // One four-tick occupancy every eight ticks: half the run is idle
    let mut next_id = 1;
    for tick in 0..40 {
        if tick % 8 == 0 {
            assert!(server.append_transact(&transact(next_id, tick)));
            next_id += 1;
        }
        let held = server.held_snapshot();
        server.handle_transacts(tick, &held);
        ctx.advance_clock();
    }

    match server.report().stats {
        BlockStats::Facility { utilization_pct, entries, .. } => {
            assert_eq!(entries, 5);
            assert!(
                (utilization_pct - 50.0).abs() < 1e-9,
                "five four-tick occupancies over forty ticks, got {}",
                utilization_pct
            );
        }
        other => panic!("unexpected stats {:?}", other),
    }
}

#[test]
fn test_occupant_is_reported() {
    let ctx = Arc::new(SimContext::new(1));
    let server = Facility::new("Server", 3, 0);
    server.wire(vec![], &ctx);

    let t = transact(42, 0);
    t.set_parts(2, 3, 40);
    server.append_transact(&t);

    match server.report().stats {
        BlockStats::Facility { occupant, .. } => {
            let occupant = occupant.expect("facility is occupied");
            assert_eq!(occupant.transact_id, 42);
            assert_eq!(occupant.part, 2);
            assert_eq!(occupant.parent_id, 40);
        }
        other => panic!("unexpected stats {:?}", other),
    }
}
