//! Holding set, the transaction buffer inside each block
//!
//! Keyed by transaction id, ordered by insertion so snapshot iteration (and
//! therefore queue service) is first-in first-out and deterministic.

use indexmap::IndexMap;

use super::handle::TransactionHandle;

/// Insertion-ordered buffer of transactions held by one block
#[derive(Debug, Default)]
pub struct HoldingSet {
    items: IndexMap<u64, TransactionHandle>,
}

impl HoldingSet {
    /// Empty holding set
    pub fn new() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }

    /// Insert a transaction, keyed by its id
    pub fn push(&mut self, transact: TransactionHandle) {
        self.items.insert(transact.id(), transact);
    }

    /// Remove a transaction by id, preserving the order of the rest
    pub fn remove(&mut self, id: u64) -> Option<TransactionHandle> {
        self.items.shift_remove(&id)
    }

    /// Number of held transactions
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Is the set empty?
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a held transaction by id
    pub fn get(&self, id: u64) -> Option<&TransactionHandle> {
        self.items.get(&id)
    }

    /// Oldest held transaction, if any
    pub fn first(&self) -> Option<&TransactionHandle> {
        self.items.values().next()
    }

    /// Clone out the current contents in insertion order
    ///
    /// Blocks act on a snapshot taken at the start of the tick; transactions
    /// arriving later in the same tick are not in it.
    pub fn snapshot(&self) -> Vec<TransactionHandle> {
        self.items.values().cloned().collect()
    }
}
