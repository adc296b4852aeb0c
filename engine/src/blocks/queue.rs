//! Queue block
//!
//! Unbounded waiting line in front of a contended block. Always accepts.
//! Each tick every waiting transaction is offered downstream in arrival
//! order; the ones that stay get a tick added to their queue time. The
//! block exists for its statistics: content over time, zero-wait share,
//! average waiting time.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::SimContext;
use crate::models::{HoldingSet, TransactionHandle};
use crate::report::{safe_div, BlockReport, BlockStats};

use super::{Block, BlockBase, BlockRef};

struct QueueState {
    holding: HoldingSet,
    /// Largest content ever observed
    max_content: usize,
    entries: u64,
    /// Entries that left without waiting a single tick
    zero_entries: u64,
    departures: u64,
    sum_timequeue: f64,
    /// Content integrated over ticks, for the average
    sum_content: f64,
}

/// Waiting line with statistics
pub struct Queue {
    base: BlockBase,
    state: Mutex<QueueState>,
}

impl Queue {
    /// Create a new Queue block
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            base: BlockBase::new(name),
            state: Mutex::new(QueueState {
                holding: HoldingSet::new(),
                max_content: 0,
                entries: 0,
                zero_entries: 0,
                departures: 0,
                sum_timequeue: 0.0,
                sum_content: 0.0,
            }),
        })
    }

    /// Transactions currently waiting
    pub fn content(&self) -> usize {
        self.state.lock().holding.len()
    }
}

impl Block for Queue {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>) {
        self.base.wire(successors, ctx);
    }

    fn append_transact(&self, transact: &TransactionHandle) -> bool {
        trace!("Append transact {} to {}", transact.id(), self.base.name());
        transact.set_holder_name(self.base.name());
        let mut state = self.state.lock();
        state.holding.push(transact.clone());
        state.entries += 1;
        if state.holding.len() > state.max_content {
            state.max_content = state.holding.len();
        }
        true
    }

    fn held_snapshot(&self) -> Vec<TransactionHandle> {
        self.state.lock().holding.snapshot()
    }

    fn handle_transacts(&self, tick: usize, held: &[TransactionHandle]) {
        self.state.lock().sum_content += held.len() as f64;
        for transact in held {
            transact.print_info(tick);
            if self.base.try_forward(transact) {
                let waited = transact.queue_time();
                let mut state = self.state.lock();
                state.holding.remove(transact.id());
                state.departures += 1;
                if waited == 0 {
                    state.zero_entries += 1;
                }
                state.sum_timequeue += waited as f64;
                drop(state);
                transact.reset_queue_time();
            } else {
                transact.inq_queue_time();
            }
        }
    }

    fn report(&self) -> BlockReport {
        let elapsed = self.base.ctx().model_time();
        let state = self.state.lock();
        let nonzero_departures = state.departures.saturating_sub(state.zero_entries);
        BlockReport {
            name: self.base.name().to_string(),
            stats: BlockStats::Queue {
                max_content: state.max_content,
                entries: state.entries,
                zero_entries: state.zero_entries,
                percent_zero_entries: safe_div(100.0 * state.zero_entries as f64, state.entries as f64),
                current_content: state.holding.len(),
                average_content: safe_div(state.sum_content, elapsed as f64),
                average_time: safe_div(state.sum_timequeue, state.departures as f64),
                average_time_nonzero: safe_div(state.sum_timequeue, nonzero_departures as f64),
            },
        }
    }
}
