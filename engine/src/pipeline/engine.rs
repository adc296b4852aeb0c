//! Tick loop and block registry
//!
//! # Tick anatomy
//!
//! Every tick runs in two phases. First the holdings of all blocks are
//! snapshotted sequentially, so the whole tick works against one frozen
//! view of who holds what. Then every block's handle phase runs over its
//! snapshot, in parallel across blocks. The clock only advances after the
//! slowest block finishes, so no block ever observes a tick boundary
//! mid-phase.
//!
//! Hand-offs made during the handle phase call straight into the receiving
//! block's accept path, which is why blocks guard their state with their
//! own locks and never call out while holding them.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::blocks::BlockRef;
use crate::core::SimContext;
use crate::models::TransactionHandle;
use crate::report::{BlockReport, SimulationReport};

/// Errors from pipeline assembly and control
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// `start` was called with a zero horizon
    #[error("simulation horizon must be positive")]
    ZeroHorizon,
    /// A named block is not registered
    #[error("block not found: {0}")]
    BlockNotFound(String),
}

/// A simulation network: blocks, wiring and the shared clock
///
/// # Example
/// ```
/// use queueing_simulator_core_rs::{Generator, Hole, Pipeline};
///
/// let mut pipeline = Pipeline::new("demo", 42);
/// let sink = Hole::new("Sink");
/// let source = Generator::new("Source", 3, 1, 0, 0);
/// pipeline.append(sink.clone(), vec![]);
/// pipeline.append(source, vec![sink]);
/// pipeline.start(100).unwrap();
/// assert_eq!(pipeline.model_time(), 100);
/// ```
pub struct Pipeline {
    name: String,
    ctx: Arc<SimContext>,
    /// Registered blocks by name; iteration order is lexicographic
    blocks: BTreeMap<String, BlockRef>,
}

impl Pipeline {
    /// Create an empty pipeline
    ///
    /// # Arguments
    /// * `name` - Pipeline name, used in the report header
    /// * `seed` - Master seed; every block derives its own stream from it
    pub fn new(name: &str, seed: u64) -> Self {
        Self {
            name: name.to_string(),
            ctx: Arc::new(SimContext::new(seed)),
            blocks: BTreeMap::new(),
        }
    }

    /// Pipeline name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared simulation context
    pub fn context(&self) -> &Arc<SimContext> {
        &self.ctx
    }

    /// Register a block and wire its successors
    ///
    /// Registering a second block under an existing name replaces the
    /// first one.
    pub fn append(&mut self, block: BlockRef, successors: Vec<BlockRef>) {
        block.wire(successors, &self.ctx);
        self.blocks.insert(block.name().to_string(), block);
    }

    /// Remove a block by name
    pub fn remove(&mut self, name: &str) -> Result<(), PipelineError> {
        match self.blocks.remove(name) {
            Some(_) => Ok(()),
            None => Err(PipelineError::BlockNotFound(name.to_string())),
        }
    }

    /// Look up a registered block by name
    pub fn block(&self, name: &str) -> Option<&BlockRef> {
        self.blocks.get(name)
    }

    /// Run the simulation for `sim_time` ticks
    ///
    /// Blocks until the horizon is reached or [`stop`](Self::stop) was
    /// requested from another thread.
    pub fn start(&mut self, sim_time: usize) -> Result<(), PipelineError> {
        if sim_time == 0 {
            return Err(PipelineError::ZeroHorizon);
        }
        self.ctx.set_sim_time(sim_time);
        info!(
            "Starting pipeline \"{}\" for {} ticks with seed {}",
            self.name,
            sim_time,
            self.ctx.seed()
        );
        while !self.ctx.is_stopped() {
            self.step();
        }
        Ok(())
    }

    /// Run exactly one tick
    ///
    /// Manual stepping never auto-stops; the horizon check only applies
    /// to a running [`start`](Self::start).
    pub fn step(&mut self) {
        let tick = self.ctx.model_time();
        debug!("ModelTime {}", tick);

        // Phase one: freeze every block's holdings for this tick.
        let work: Vec<(BlockRef, Vec<TransactionHandle>)> = self
            .blocks
            .values()
            .map(|block| (Arc::clone(block), block.held_snapshot()))
            .collect();

        // Phase two: all handle phases run against the frozen view.
        work.par_iter()
            .for_each(|(block, held)| block.handle_transacts(tick, held));

        let now = self.ctx.advance_clock();
        if now == self.ctx.sim_time() {
            self.stop();
        }
    }

    /// Request the running simulation to stop after the current tick
    pub fn stop(&self) {
        self.ctx.request_stop();
    }

    /// Current model time
    pub fn model_time(&self) -> usize {
        self.ctx.model_time()
    }

    /// Configured horizon
    pub fn sim_time(&self) -> usize {
        self.ctx.sim_time()
    }

    /// Collect every block's statistics, in name order
    pub fn report(&self) -> SimulationReport {
        let blocks: Vec<BlockReport> = self.blocks.values().map(|block| block.report()).collect();
        SimulationReport {
            pipeline_name: self.name.clone(),
            model_time: self.ctx.model_time(),
            blocks,
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self) {
        println!("{}", self.report());
    }
}
