//! Processing blocks
//!
//! This module defines the contract every station in the network implements
//! and the concrete block kinds.
//!
//! # Block contract
//!
//! A block is offered transactions by upstream blocks (or by the source)
//! through [`Block::append_transact`], which returns whether the offer was
//! accepted. A rejected offer must leave the block's own state untouched so
//! the caller can safely retry on a later tick.
//!
//! Once per tick the scheduler calls [`Block::handle_transacts`] with a
//! snapshot of the block's holdings taken at the start of the tick.
//! Transactions that arrive during the tick as a side effect of another
//! block's action are not in that snapshot and are not acted on until the
//! next tick. This is the ordering guarantee that keeps the simulation
//! deterministic with respect to tick boundaries regardless of how the
//! per-tick tasks interleave.
//!
//! # Routing
//!
//! Forwarding blocks try their successors in registration order and stop at
//! the first that accepts. When none accept, the current holder keeps the
//! transaction and re-attempts on the next tick. A transaction that no
//! successor can ever accept is a model-design defect; it shows up as a
//! permanent blockage in the reports, not as a fault.
//!
//! # Locking
//!
//! Each block guards its mutable state with one mutex, and never holds it
//! while offering a transaction to a successor. Hand-off chains, including
//! cycles in the block graph, therefore cannot deadlock.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::SimContext;
use crate::models::TransactionHandle;
use crate::report::BlockReport;

pub mod advance;
pub mod aggregate;
pub mod bifacility;
pub mod check;
pub mod facility;
pub mod generator;
pub mod hole;
pub mod queue;
pub mod split;

// Re-exports
pub use advance::Advance;
pub use aggregate::Aggregate;
pub use bifacility::{Bifacility, InFacility, OutFacility};
pub use check::{Check, CheckPredicate};
pub use facility::Facility;
pub use generator::Generator;
pub use hole::Hole;
pub use queue::Queue;
pub use split::{Split, SplitModifier};

/// Shared reference to a block in the network
pub type BlockRef = Arc<dyn Block>;

/// The capability set every processing station implements
pub trait Block: Send + Sync {
    /// Unique name of this block within the network
    fn name(&self) -> &str;

    /// Attach successor blocks and the shared simulation context
    ///
    /// Called by the scheduler when the block is registered; not part of the
    /// hot scheduling path.
    fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>);

    /// Offer a transaction to this block
    ///
    /// Returns whether the offer was accepted. A rejection has no observable
    /// effect on the block's own state (it may still touch the transaction,
    /// as the resource blocks' hand-back does).
    fn append_transact(&self, transact: &TransactionHandle) -> bool;

    /// Snapshot of the holdings this block will act on this tick
    ///
    /// Taken by the scheduler before any block acts. Blocks that never hold
    /// transactions across ticks return an empty snapshot.
    fn held_snapshot(&self) -> Vec<TransactionHandle> {
        Vec::new()
    }

    /// Act on the start-of-tick snapshot
    ///
    /// `tick` is the current model time. The default does nothing, for
    /// blocks whose whole behavior runs inside `append_transact`.
    fn handle_transacts(&self, tick: usize, held: &[TransactionHandle]) {
        let _ = (tick, held);
    }

    /// Render this block's statistics
    fn report(&self) -> BlockReport;
}

/// State common to every block: name, successors, context
///
/// Wiring is written once at registration and read on every hand-off, so it
/// sits behind a read-write lock. The lock is released before any successor
/// is called.
pub struct BlockBase {
    name: String,
    wiring: RwLock<Wiring>,
}

#[derive(Default)]
struct Wiring {
    successors: Vec<BlockRef>,
    ctx: Option<Arc<SimContext>>,
}

impl BlockBase {
    /// Base state for a named block
    ///
    /// # Panics
    /// Panics if `name` is empty.
    pub fn new(name: &str) -> Self {
        assert!(!name.is_empty(), "block name must not be empty");
        Self {
            name: name.to_string(),
            wiring: RwLock::new(Wiring::default()),
        }
    }

    /// Block name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store successors and context at registration time
    pub fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>) {
        let mut wiring = self.wiring.write();
        wiring.successors = successors;
        wiring.ctx = Some(Arc::clone(ctx));
    }

    /// Clone out the successor list
    pub fn successors(&self) -> Vec<BlockRef> {
        self.wiring.read().successors.clone()
    }

    /// Shared simulation context
    ///
    /// # Panics
    /// Panics if the block was never registered in a pipeline.
    pub fn ctx(&self) -> Arc<SimContext> {
        match &self.wiring.read().ctx {
            Some(ctx) => Arc::clone(ctx),
            None => panic!("block '{}' is not registered in a pipeline", self.name),
        }
    }

    /// Offer a transaction to the successors in order, first accept wins
    pub fn try_forward(&self, transact: &TransactionHandle) -> bool {
        for successor in self.successors() {
            if successor.append_transact(transact) {
                return true;
            }
        }
        false
    }
}
