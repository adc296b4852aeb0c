//! Simulation pipeline
//!
//! Owns the clock and the registered blocks, and drives the tick loop.

pub mod engine;

pub use engine::{Pipeline, PipelineError};
