//! Simulation context shared between the scheduler and all blocks
//!
//! The simulation operates in discrete ticks. The scheduler owns the clock
//! and advances it exactly once per tick, after every block has finished its
//! work for that tick; blocks only ever read it. The context also hands out
//! transaction ids and carries the cooperative stop flag, so any block can
//! end the run.
//!
//! All fields are atomics: the context is shared across the per-tick worker
//! threads behind an `Arc`, and the per-tick join is the synchronization
//! point between clock writes and block reads.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::rng::RngManager;

/// Shared clock, id source and stop flag for one simulation run
///
/// # Example
/// ```
/// use queueing_simulator_core_rs::SimContext;
///
/// let ctx = SimContext::new(12345);
/// assert_eq!(ctx.model_time(), 0);
/// assert_eq!(ctx.next_transact_id(), 1);
/// assert_eq!(ctx.next_transact_id(), 2);
/// ```
#[derive(Debug)]
pub struct SimContext {
    /// Ticks elapsed since simulation start
    model_time: AtomicUsize,
    /// Configured horizon; 0 until `start` publishes it
    sim_time: AtomicUsize,
    /// Cooperative stop flag, checked by the scheduler once per tick
    done: AtomicBool,
    /// Next free transaction id; ids start at 1, 0 is never handed out
    next_id: AtomicU64,
    /// Run seed, the root of every per-block RNG stream
    seed: u64,
}

impl SimContext {
    /// Create a fresh context for one run
    pub fn new(seed: u64) -> Self {
        Self {
            model_time: AtomicUsize::new(0),
            sim_time: AtomicUsize::new(0),
            done: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            seed,
        }
    }

    /// Current tick (total ticks since start)
    pub fn model_time(&self) -> usize {
        self.model_time.load(Ordering::Relaxed)
    }

    /// Advance the clock by one tick and return the new value
    ///
    /// Called by the scheduler only, between ticks.
    pub fn advance_clock(&self) -> usize {
        self.model_time.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Configured simulation horizon in ticks
    pub fn sim_time(&self) -> usize {
        self.sim_time.load(Ordering::Relaxed)
    }

    /// Publish the horizon at the start of a run
    pub fn set_sim_time(&self, ticks: usize) {
        self.sim_time.store(ticks, Ordering::Relaxed);
    }

    /// Has the run been asked to stop?
    pub fn is_stopped(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }

    /// Ask the run to stop after the current tick completes
    ///
    /// Callable from any thread, including a block's own tick work.
    pub fn request_stop(&self) {
        self.done.store(true, Ordering::Relaxed);
    }

    /// Allocate a fresh transaction id, unique within this run
    pub fn next_transact_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Run seed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Deterministic RNG stream for a named block
    pub fn rng_for(&self, name: &str) -> RngManager {
        RngManager::for_block(self.seed, name)
    }
}
