//! Deterministic random number generation
//!
//! Uses xorshift64* streams for delay and volume jitter. CRITICAL: all
//! randomness in the engine MUST go through this module, and a block draws
//! only from its own named stream, so runs replay exactly from a seed.

mod xorshift;

pub use xorshift::RngManager;
