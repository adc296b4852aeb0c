//! Advance block
//!
//! Delays the progress of a transaction for a generated amount of simulated
//! time: mean `interval`, uniform jitter in `[-modificator, modificator]`
//! when `modificator > 0`. Always accepts. Once a held transaction's delay
//! reaches zero it is offered downstream; on rejection it stays held and the
//! hand-off is retried next tick without re-entering the delay.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::SimContext;
use crate::models::{HoldingSet, TransactionHandle};
use crate::report::{safe_div, BlockReport, BlockStats};
use crate::rng::RngManager;

use super::{Block, BlockBase, BlockRef};

/// Pure delay block
///
/// # Example
/// ```
/// use queueing_simulator_core_rs::Advance;
///
/// // Service takes 5 ticks, give or take 2
/// let service = Advance::new("Service", 5, 2);
/// ```
pub struct Advance {
    base: BlockBase,
    /// The mean time increment
    interval: usize,
    /// The time half-range
    modificator: usize,
    state: Mutex<AdvanceState>,
}

struct AdvanceState {
    holding: HoldingSet,
    rng: RngManager,
    sum_advance: f64,
    cnt_transact: u64,
}

impl Advance {
    /// Create a new Advance block
    ///
    /// # Arguments
    /// * `name` - Block name, unique within the network
    /// * `interval` - Mean delay in ticks
    /// * `modificator` - Delay half-range; 0 means a fixed delay
    pub fn new(name: &str, interval: usize, modificator: usize) -> Arc<Self> {
        Arc::new(Self {
            base: BlockBase::new(name),
            interval,
            modificator,
            state: Mutex::new(AdvanceState {
                holding: HoldingSet::new(),
                rng: RngManager::new(0),
                sum_advance: 0.0,
                cnt_transact: 0,
            }),
        })
    }

    /// Draw the next delay: mean interval plus jitter, floored at zero
    ///
    /// A zero-interval block is a pure relay and never assigns a delay, even
    /// when a jitter half-range is configured; everything it accepts must
    /// stay ready to leave.
    fn generate_delay(&self, rng: &mut RngManager) -> usize {
        if self.interval == 0 {
            return 0;
        }
        let mut delay = self.interval as i64;
        if self.modificator > 0 {
            delay += rng.range(-(self.modificator as i64), self.modificator as i64);
        }
        delay.max(0) as usize
    }
}

impl Block for Advance {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>) {
        self.base.wire(successors, ctx);
        self.state.lock().rng = ctx.rng_for(self.base.name());
    }

    fn append_transact(&self, transact: &TransactionHandle) -> bool {
        trace!("Append transact {} to {}", transact.id(), self.base.name());
        transact.set_holder_name(self.base.name());
        let mut state = self.state.lock();
        let delay = self.generate_delay(&mut state.rng);
        state.sum_advance += delay as f64;
        transact.set_ticks(delay);
        state.holding.push(transact.clone());
        state.cnt_transact += 1;
        true
    }

    fn held_snapshot(&self) -> Vec<TransactionHandle> {
        self.state.lock().holding.snapshot()
    }

    fn handle_transacts(&self, tick: usize, held: &[TransactionHandle]) {
        for transact in held {
            // A zero-interval block does no delay bookkeeping; everything it
            // holds is already ready to leave and only needs forwarding.
            if self.interval > 0 {
                transact.dec_ticks();
                transact.print_info(tick);
            }
            if transact.is_the_end() && self.base.try_forward(transact) {
                self.state.lock().holding.remove(transact.id());
            }
        }
    }

    fn report(&self) -> BlockReport {
        let state = self.state.lock();
        BlockReport {
            name: self.base.name().to_string(),
            stats: BlockStats::Advance {
                average_advance: safe_div(state.sum_advance, state.cnt_transact as f64),
            },
        }
    }
}
