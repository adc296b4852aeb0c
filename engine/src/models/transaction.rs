//! Transaction model
//!
//! Represents one unit of work flowing through the block network.
//! Each transaction has:
//! - Integer id, unique within a run
//! - Birth and kill ticks (`born`, `rip`; `rip == 0` means alive)
//! - Remaining delay at the current block (`ticks`)
//! - Cumulative delay and queue time (`advance`, `timequeue`)
//! - The name of the block currently holding it
//! - Split lineage (`parts` triple; `(0, 0, 0)` means not a fragment)
//! - Named parameters (string or integer values)
//!
//! CRITICAL: All time values are whole ticks (usize)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A parameter value carried by a transaction
///
/// The value space is deliberately closed: predicates compare values by
/// exact equality, which stays well-defined only over a fixed set of kinds.
/// "No value" is expressed by the parameter key being absent, see
/// [`Transaction::set_parameters`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Text value
    Str(String),
    /// Integer value
    Int(i64),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

/// A named parameter assignment
///
/// `value: None` means "remove this parameter"; applying it deletes the key
/// so an absent parameter is observable as exactly that, absent.
///
/// # Example
/// ```
/// use queueing_simulator_core_rs::{Parameter, ParamValue};
///
/// let set = Parameter::assign("Priority", 3);
/// assert_eq!(set.value, Some(ParamValue::Int(3)));
///
/// let remove = Parameter::clear("Priority");
/// assert_eq!(remove.value, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name (unique key per transaction)
    pub name: String,

    /// New value, or `None` to remove the parameter
    pub value: Option<ParamValue>,
}

impl Parameter {
    /// Assignment that sets `name` to `value`
    pub fn assign(name: &str, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value.into()),
        }
    }

    /// Assignment that removes `name`
    pub fn clear(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }
}

/// Split lineage of a transaction
///
/// Default `(0, 0, 0)` marks a transaction that is not a split fragment.
/// After splitting into six, a fragment carries for example `part: 5,
/// total_parts: 6, parent_id: <original id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parts {
    /// Fragment number, 1-based
    pub part: usize,
    /// Number of fragments the parent was split into
    pub total_parts: usize,
    /// Id of the parent transaction; 0 means not a fragment
    pub parent_id: u64,
}

impl Parts {
    /// Is this transaction a fragment of a split?
    pub fn is_fragment(&self) -> bool {
        self.parent_id != 0
    }
}

/// One unit of work moving through the block network
///
/// Created by the scheduler-adjacent source with `born` equal to the current
/// model time, mutated by whichever block currently holds it, and terminated
/// by an explicit [`kill`](Transaction::kill) that stamps `rip`.
///
/// # Example
/// ```
/// use queueing_simulator_core_rs::Transaction;
///
/// let mut t = Transaction::new(1, 0);
/// t.set_ticks(5);
/// assert_eq!(t.ticks(), 5);
/// assert_eq!(t.advance_time(), 5);
/// assert!(!t.is_the_end());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    id: u64,

    /// Tick the transaction was created
    born: usize,

    /// Tick the transaction was killed; 0 means alive
    rip: usize,

    /// Cumulative time spent delayed or queued (monotonic non-decreasing)
    advance: usize,

    /// Remaining delay at the current block; 0 means ready to leave
    ticks: usize,

    /// Name of the block currently holding this transaction
    holder_name: String,

    /// Time spent waiting in the current queue (resettable)
    timequeue: usize,

    /// Split lineage
    parts: Parts,

    /// Named parameters
    parameters: HashMap<String, ParamValue>,
}

impl Transaction {
    /// Create a new transaction
    ///
    /// # Arguments
    /// * `id` - Unique id, allocated by the simulation context
    /// * `born` - Current model time
    pub fn new(id: u64, born: usize) -> Self {
        Self {
            id,
            born,
            rip: 0,
            advance: 0,
            ticks: 0,
            holder_name: String::new(),
            timequeue: 0,
            parts: Parts::default(),
            parameters: HashMap::new(),
        }
    }

    /// Transaction id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Overwrite the id
    ///
    /// Used when fragments are created (each copy gets a fresh id) and when
    /// a merge survivor takes back its parent's id.
    pub fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    /// Tick the transaction was created
    pub fn born(&self) -> usize {
        self.born
    }

    /// Lifetime in ticks, kill tick minus birth tick
    ///
    /// Meaningful once the transaction has been killed; 0 while alive.
    pub fn life(&self) -> usize {
        self.rip.saturating_sub(self.born)
    }

    /// Stamp the kill tick
    pub fn kill(&mut self, tick: usize) {
        self.rip = tick;
    }

    /// Has this transaction been killed?
    pub fn is_killed(&self) -> bool {
        self.rip != 0
    }

    /// Remaining delay at the current block
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Assign a new delay and add it to the cumulative advance time
    pub fn set_ticks(&mut self, interval: usize) {
        self.ticks = interval;
        self.advance += interval;
    }

    /// Decrement the remaining delay, flooring at zero
    pub fn dec_ticks(&mut self) {
        self.ticks = self.ticks.saturating_sub(1);
    }

    /// Is the remaining delay over?
    pub fn is_the_end(&self) -> bool {
        self.ticks == 0
    }

    /// Cumulative time spent delayed or queued
    pub fn advance_time(&self) -> usize {
        self.advance
    }

    /// Account one tick of queue waiting
    ///
    /// Increments both the resettable queue time and the cumulative advance
    /// time.
    pub fn inq_queue_time(&mut self) {
        self.timequeue += 1;
        self.advance += 1;
    }

    /// Time spent waiting in the current queue
    pub fn queue_time(&self) -> usize {
        self.timequeue
    }

    /// Reset the queue time, called when the transaction leaves a queue
    pub fn reset_queue_time(&mut self) {
        self.timequeue = 0;
    }

    /// Name of the block currently holding this transaction
    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    /// Record the holding block
    pub fn set_holder_name(&mut self, name: &str) {
        self.holder_name = name.to_string();
    }

    /// Split lineage
    pub fn parts(&self) -> Parts {
        self.parts
    }

    /// Stamp split lineage
    pub fn set_parts(&mut self, part: usize, total_parts: usize, parent_id: u64) {
        self.parts = Parts {
            part,
            total_parts,
            parent_id,
        };
    }

    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }

    /// Apply parameter assignments
    ///
    /// An assignment with `value: None` removes the key entirely.
    ///
    /// # Example
    /// ```
    /// use queueing_simulator_core_rs::{Parameter, ParamValue, Transaction};
    ///
    /// let mut t = Transaction::new(1, 0);
    /// t.set_parameters(vec![Parameter::assign("Color", "red")]);
    /// assert_eq!(t.parameter("Color"), Some(&ParamValue::Str("red".into())));
    ///
    /// t.set_parameters(vec![Parameter::clear("Color")]);
    /// assert_eq!(t.parameter("Color"), None);
    /// ```
    pub fn set_parameters(&mut self, parameters: Vec<Parameter>) {
        for parameter in parameters {
            match parameter.value {
                Some(value) => {
                    self.parameters.insert(parameter.name, value);
                }
                None => {
                    self.parameters.remove(&parameter.name);
                }
            }
        }
    }

    /// All parameters of this transaction
    pub fn parameters(&self) -> &HashMap<String, ParamValue> {
        &self.parameters
    }
}
