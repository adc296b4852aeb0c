//! Domain models for the queueing simulator

pub mod handle;
pub mod holding;
pub mod transaction;

// Re-exports
pub use handle::TransactionHandle;
pub use holding::HoldingSet;
pub use transaction::{ParamValue, Parameter, Parts, Transaction};
