//! Aggregate block
//!
//! Reassembly point for families made by a Split. Fragments of the same
//! parent are collected until the whole family has arrived; then one
//! survivor continues under the original parent id (part label cleared)
//! and the siblings are killed. Transactions that never were split pass
//! straight through.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::SimContext;
use crate::models::{HoldingSet, TransactionHandle};
use crate::report::{BlockReport, BlockStats};

use super::{Block, BlockBase, BlockRef};

#[derive(Default)]
struct AggregateState {
    /// Incomplete families, keyed by parent id
    families: HashMap<u64, Vec<TransactionHandle>>,
    /// Merged survivors and pass-throughs refused downstream
    ready: HoldingSet,
    merged: u64,
    passed: u64,
}

/// Fan-in block
pub struct Aggregate {
    base: BlockBase,
    state: Mutex<AggregateState>,
}

impl Aggregate {
    /// Create a new Aggregate block
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            base: BlockBase::new(name),
            state: Mutex::new(AggregateState::default()),
        })
    }

    /// Fragments currently waiting for the rest of their family
    pub fn parts_pending(&self) -> usize {
        self.state.lock().families.values().map(Vec::len).sum()
    }

    fn offer_onward(&self, transact: &TransactionHandle) {
        if !self.base.try_forward(transact) {
            self.state.lock().ready.push(transact.clone());
        }
    }
}

impl Block for Aggregate {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>) {
        self.base.wire(successors, ctx);
    }

    fn append_transact(&self, transact: &TransactionHandle) -> bool {
        trace!("Append transact {} to {}", transact.id(), self.base.name());
        transact.set_holder_name(self.base.name());
        let parts = transact.parts();
        if !parts.is_fragment() {
            self.state.lock().passed += 1;
            self.offer_onward(transact);
            return true;
        }

        let family = {
            let mut state = self.state.lock();
            let family = state.families.entry(parts.parent_id).or_default();
            family.push(transact.clone());
            if family.len() < parts.total_parts {
                return true;
            }
            state.merged += 1;
            state.families.remove(&parts.parent_id).unwrap_or_default()
        };

        let now = self.base.ctx().model_time();
        let mut members: Vec<TransactionHandle> = family;
        members.sort_by_key(|member| member.parts().part);
        let mut members = members.into_iter();
        let survivor = match members.next() {
            Some(survivor) => survivor,
            None => return true,
        };
        for sibling in members {
            sibling.kill(now);
        }
        survivor.set_id(parts.parent_id);
        survivor.set_parts(0, 0, 0);
        self.offer_onward(&survivor);
        true
    }

    fn held_snapshot(&self) -> Vec<TransactionHandle> {
        self.state.lock().ready.snapshot()
    }

    fn handle_transacts(&self, tick: usize, held: &[TransactionHandle]) {
        for transact in held {
            transact.print_info(tick);
            if self.base.try_forward(transact) {
                self.state.lock().ready.remove(transact.id());
            }
        }
    }

    fn report(&self) -> BlockReport {
        let state = self.state.lock();
        BlockReport {
            name: self.base.name().to_string(),
            stats: BlockStats::Aggregate {
                merged: state.merged,
                passed: state.passed,
                parts_pending: state.families.values().map(Vec::len).sum(),
            },
        }
    }
}
