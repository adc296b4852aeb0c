//! Shared transaction handle
//!
//! Blocks hold and hand off transactions through [`TransactionHandle`], a
//! cheaply clonable reference to one mutex-guarded [`Transaction`]. During a
//! hand-off two blocks momentarily reference the same transaction; the
//! handle's lock keeps every individual operation atomic. The lock is a leaf:
//! no handle method calls back into any block, so holding it can never
//! participate in a lock cycle.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::transaction::{ParamValue, Parameter, Parts, Transaction};

/// Shared handle to one transaction
///
/// Every method takes the inner lock for the duration of that call only.
///
/// # Example
/// ```
/// use queueing_simulator_core_rs::{Transaction, TransactionHandle};
///
/// let handle = TransactionHandle::new(Transaction::new(1, 0));
/// let alias = handle.clone();
/// alias.set_ticks(4);
/// assert_eq!(handle.ticks(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionHandle {
    inner: Arc<Mutex<Transaction>>,
}

impl TransactionHandle {
    /// Wrap a transaction in a shared handle
    pub fn new(transaction: Transaction) -> Self {
        Self {
            inner: Arc::new(Mutex::new(transaction)),
        }
    }

    /// Transaction id
    pub fn id(&self) -> u64 {
        self.inner.lock().id()
    }

    /// Overwrite the id
    pub fn set_id(&self, id: u64) {
        self.inner.lock().set_id(id);
    }

    /// Tick the transaction was created
    pub fn born(&self) -> usize {
        self.inner.lock().born()
    }

    /// Lifetime in ticks, kill tick minus birth tick
    pub fn life(&self) -> usize {
        self.inner.lock().life()
    }

    /// Stamp the kill tick
    pub fn kill(&self, tick: usize) {
        self.inner.lock().kill(tick);
    }

    /// Has this transaction been killed?
    pub fn is_killed(&self) -> bool {
        self.inner.lock().is_killed()
    }

    /// Remaining delay at the current block
    pub fn ticks(&self) -> usize {
        self.inner.lock().ticks()
    }

    /// Assign a new delay and add it to the cumulative advance time
    pub fn set_ticks(&self, interval: usize) {
        self.inner.lock().set_ticks(interval);
    }

    /// Decrement the remaining delay, flooring at zero
    pub fn dec_ticks(&self) {
        self.inner.lock().dec_ticks();
    }

    /// Is the remaining delay over?
    pub fn is_the_end(&self) -> bool {
        self.inner.lock().is_the_end()
    }

    /// Cumulative time spent delayed or queued
    pub fn advance_time(&self) -> usize {
        self.inner.lock().advance_time()
    }

    /// Account one tick of queue waiting
    pub fn inq_queue_time(&self) {
        self.inner.lock().inq_queue_time();
    }

    /// Time spent waiting in the current queue
    pub fn queue_time(&self) -> usize {
        self.inner.lock().queue_time()
    }

    /// Reset the queue time
    pub fn reset_queue_time(&self) {
        self.inner.lock().reset_queue_time();
    }

    /// Name of the block currently holding this transaction
    pub fn holder_name(&self) -> String {
        self.inner.lock().holder_name().to_string()
    }

    /// Record the holding block
    pub fn set_holder_name(&self, name: &str) {
        self.inner.lock().set_holder_name(name);
    }

    /// Split lineage
    pub fn parts(&self) -> Parts {
        self.inner.lock().parts()
    }

    /// Stamp split lineage
    pub fn set_parts(&self, part: usize, total_parts: usize, parent_id: u64) {
        self.inner.lock().set_parts(part, total_parts, parent_id);
    }

    /// Look up a parameter by name, cloned out of the transaction
    pub fn parameter(&self, name: &str) -> Option<ParamValue> {
        self.inner.lock().parameter(name).cloned()
    }

    /// Apply parameter assignments
    pub fn set_parameters(&self, parameters: Vec<Parameter>) {
        self.inner.lock().set_parameters(parameters);
    }

    /// Value copy of the whole transaction, for reporting and inspection
    pub fn snapshot(&self) -> Transaction {
        self.inner.lock().clone()
    }

    /// Fork a value-independent copy under a fresh id
    ///
    /// The copy duplicates every field including the full parameter map;
    /// mutating one side never affects the other.
    pub fn copy_with_id(&self, id: u64) -> TransactionHandle {
        let mut copy = self.inner.lock().clone();
        copy.set_id(id);
        TransactionHandle::new(copy)
    }

    /// Emit the per-transaction trace line
    ///
    /// `now` is the current model time; life is reported relative to it.
    pub fn print_info(&self, now: usize) {
        let t = self.inner.lock();
        trace!(
            "Transaction Id: {} Born: {} Advance time: {} Transaction life: {} \
             Holder Name: {} Ticks: {} Time in queue: {}",
            t.id(),
            t.born(),
            t.advance_time(),
            now.saturating_sub(t.born()),
            t.holder_name(),
            t.ticks(),
            t.queue_time()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_aliases_share_state() {
        let handle = TransactionHandle::new(Transaction::new(1, 0));
        let alias = handle.clone();

        alias.set_ticks(3);
        alias.set_holder_name("Barber");

        assert_eq!(handle.ticks(), 3);
        assert_eq!(handle.holder_name(), "Barber");
    }

    #[test]
    fn test_copy_with_id_is_independent() {
        let handle = TransactionHandle::new(Transaction::new(1, 0));
        handle.set_parameters(vec![Parameter::assign("X", 1)]);

        let copy = handle.copy_with_id(2);
        copy.set_parameters(vec![Parameter::assign("X", 2)]);

        assert_eq!(handle.id(), 1);
        assert_eq!(copy.id(), 2);
        assert_eq!(handle.parameter("X"), Some(ParamValue::Int(1)));
        assert_eq!(copy.parameter("X"), Some(ParamValue::Int(2)));
    }
}
