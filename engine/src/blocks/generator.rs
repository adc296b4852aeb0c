//! Generator block
//!
//! Source of transactions. Fires on its own schedule during the handle
//! phase: every `interval ± modificator` ticks it creates one transaction
//! and offers it downstream. A transaction the network refuses is parked
//! and re-offered each tick before any new one is created, so the arrival
//! order is preserved under backpressure.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::SimContext;
use crate::models::{Transaction, TransactionHandle};
use crate::report::{BlockReport, BlockStats};
use crate::rng::RngManager;

use super::{Block, BlockBase, BlockRef};

struct GeneratorState {
    rng: RngManager,
    /// Earliest tick the next transaction may be created
    next_at: usize,
    generated: u64,
    /// Created but not yet accepted downstream
    pending: Option<TransactionHandle>,
}

/// Transaction source
pub struct Generator {
    base: BlockBase,
    interval: usize,
    modificator: usize,
    start_at: usize,
    /// Total transactions to create; 0 means unlimited
    limit: u64,
    state: Mutex<GeneratorState>,
}

impl Generator {
    /// Create a Generator
    ///
    /// # Arguments
    /// * `name` - block name, unique within a pipeline
    /// * `interval` - mean ticks between creations
    /// * `modificator` - half-width of the uniform jitter around `interval`
    /// * `start_at` - tick of the first creation
    /// * `limit` - stop after this many transactions; 0 for unlimited
    pub fn new(
        name: &str,
        interval: usize,
        modificator: usize,
        start_at: usize,
        limit: u64,
    ) -> Arc<Generator> {
        Arc::new(Generator {
            base: BlockBase::new(name),
            interval,
            modificator,
            start_at,
            limit,
            state: Mutex::new(GeneratorState {
                rng: RngManager::new(0),
                next_at: start_at,
                generated: 0,
                pending: None,
            }),
        })
    }

    /// Transactions created so far
    pub fn generated(&self) -> u64 {
        self.state.lock().generated
    }

    /// Draw the gap to the next creation: mean interval plus jitter,
    /// floored at zero (a zero gap means one creation per tick)
    fn generate_interval(&self, rng: &mut RngManager) -> usize {
        let mut gap = self.interval as i64;
        if self.modificator > 0 {
            gap += rng.range(-(self.modificator as i64), self.modificator as i64);
        }
        gap.max(0) as usize
    }
}

impl Block for Generator {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>) {
        self.base.wire(successors, ctx);
        let mut state = self.state.lock();
        state.rng = ctx.rng_for(self.base.name());
        state.next_at = self.start_at;
    }

    /// A Generator is a source; it never accepts transactions.
    fn append_transact(&self, _transact: &TransactionHandle) -> bool {
        false
    }

    fn handle_transacts(&self, tick: usize, _held: &[TransactionHandle]) {
        let parked = self.state.lock().pending.clone();
        if let Some(transact) = parked {
            if self.base.try_forward(&transact) {
                let mut state = self.state.lock();
                state.pending = None;
                let next = self.generate_interval(&mut state.rng);
                state.next_at = tick + next;
            }
            // Under backpressure nothing new is created this tick.
            return;
        }

        let due = {
            let state = self.state.lock();
            (self.limit == 0 || state.generated < self.limit) && tick >= state.next_at
        };
        if !due {
            return;
        }

        let ctx = self.base.ctx();
        let transact = TransactionHandle::new(Transaction::new(ctx.next_transact_id(), tick));
        transact.set_holder_name(self.base.name());
        trace!(
            "Generated transact {} in {} at {}",
            transact.id(),
            self.base.name(),
            tick
        );
        self.state.lock().generated += 1;
        if self.base.try_forward(&transact) {
            let mut state = self.state.lock();
            let next = self.generate_interval(&mut state.rng);
            state.next_at = tick + next;
        } else {
            self.state.lock().pending = Some(transact);
        }
    }

    fn report(&self) -> BlockReport {
        BlockReport {
            name: self.base.name().to_string(),
            stats: BlockStats::Generator {
                generated: self.state.lock().generated,
            },
        }
    }
}
