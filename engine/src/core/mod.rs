//! Shared simulation state
//!
//! The scheduler and every block hold the same [`SimContext`]; it carries
//! the model clock, the stop flag and the transaction id counter.

pub mod context;

pub use context::SimContext;
