//! Hole block
//!
//! Terminal sink. Always accepts, kills the transaction on arrival and
//! keeps lifetime statistics over everything that fell in.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::SimContext;
use crate::models::TransactionHandle;
use crate::report::{safe_div, BlockReport, BlockStats};

use super::{Block, BlockBase, BlockRef};

#[derive(Default)]
struct HoleState {
    killed: u64,
    sum_advance: f64,
    sum_life: f64,
}

/// Terminal sink
pub struct Hole {
    base: BlockBase,
    state: Mutex<HoleState>,
}

impl Hole {
    /// Create a new Hole block
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            base: BlockBase::new(name),
            state: Mutex::new(HoleState::default()),
        })
    }

    /// Transactions that ended here
    pub fn killed(&self) -> u64 {
        self.state.lock().killed
    }
}

impl Block for Hole {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>) {
        self.base.wire(successors, ctx);
    }

    fn append_transact(&self, transact: &TransactionHandle) -> bool {
        trace!("Append transact {} to {}", transact.id(), self.base.name());
        transact.set_holder_name(self.base.name());
        transact.kill(self.base.ctx().model_time());
        let mut state = self.state.lock();
        state.killed += 1;
        state.sum_advance += transact.advance_time() as f64;
        state.sum_life += transact.life() as f64;
        true
    }

    fn report(&self) -> BlockReport {
        let state = self.state.lock();
        BlockReport {
            name: self.base.name().to_string(),
            stats: BlockStats::Hole {
                killed: state.killed,
                average_advance: safe_div(state.sum_advance, state.killed as f64),
                average_life: safe_div(state.sum_life, state.killed as f64),
            },
        }
    }
}
