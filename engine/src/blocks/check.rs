//! Check block
//!
//! A stateless gate. Every arriving transaction is evaluated against a
//! condition and routed immediately: the true path is the ordinary
//! successor list, the false path is an optional dedicated destination.
//! A Check never holds transactions between ticks, so a rejection by the
//! destination propagates straight back to the sender.
//!
//! The condition is either a list of expected parameters (every named
//! parameter must match; an expected value of `None` means the parameter
//! must be absent) or an arbitrary caller-supplied predicate.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::SimContext;
use crate::models::{Parameter, TransactionHandle};
use crate::report::{BlockReport, BlockStats};

use super::{Block, BlockBase, BlockRef};

/// Caller-supplied test evaluated for each arriving transaction
pub type CheckPredicate = Box<dyn Fn(&Check, &TransactionHandle) -> bool + Send + Sync>;

#[derive(Default)]
struct CheckCounters {
    cnt_true: u64,
    cnt_false: u64,
}

/// Conditional router
pub struct Check {
    base: BlockBase,
    predicate: Option<CheckPredicate>,
    false_dst: Option<BlockRef>,
    expected: Vec<Parameter>,
    counters: Mutex<CheckCounters>,
}

impl Check {
    /// Create a Check matching on expected parameter values
    ///
    /// # Arguments
    /// * `name` - block name, unique within a pipeline
    /// * `false_dst` - destination for failing transactions; `None` keeps
    ///   them at the sender
    /// * `expected` - parameters that must all match for the true path
    pub fn new(name: &str, false_dst: Option<BlockRef>, expected: Vec<Parameter>) -> Arc<Check> {
        Arc::new(Check {
            base: BlockBase::new(name),
            predicate: None,
            false_dst,
            expected,
            counters: Mutex::new(CheckCounters::default()),
        })
    }

    /// Create a Check driven by an arbitrary predicate
    pub fn with_predicate(
        name: &str,
        predicate: CheckPredicate,
        false_dst: Option<BlockRef>,
    ) -> Arc<Check> {
        Arc::new(Check {
            base: BlockBase::new(name),
            predicate: Some(predicate),
            false_dst,
            expected: Vec::new(),
            counters: Mutex::new(CheckCounters::default()),
        })
    }

    /// Parameters the default condition matches against
    pub fn expected_parameters(&self) -> &[Parameter] {
        &self.expected
    }

    fn evaluate(&self, transact: &TransactionHandle) -> bool {
        if let Some(predicate) = &self.predicate {
            return predicate(self, transact);
        }
        self.expected
            .iter()
            .all(|expected| transact.parameter(&expected.name) == expected.value)
    }
}

impl Block for Check {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>) {
        self.base.wire(successors, ctx);
    }

    fn append_transact(&self, transact: &TransactionHandle) -> bool {
        trace!("Append transact {} to {}", transact.id(), self.base.name());
        transact.print_info(self.base.ctx().model_time());
        if self.evaluate(transact) {
            self.counters.lock().cnt_true += 1;
            self.base.try_forward(transact)
        } else {
            self.counters.lock().cnt_false += 1;
            match &self.false_dst {
                Some(dst) => dst.append_transact(transact),
                None => false,
            }
        }
    }

    fn report(&self) -> BlockReport {
        let counters = self.counters.lock();
        BlockReport {
            name: self.base.name().to_string(),
            stats: BlockStats::Check {
                cnt_true: counters.cnt_true,
                cnt_false: counters.cnt_false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Hole;
    use crate::models::Transaction;

    fn transact(id: u64) -> TransactionHandle {
        TransactionHandle::new(Transaction::new(id, 0))
    }

    #[test]
    fn test_matching_parameters_take_true_path() {
        let ctx = Arc::new(SimContext::new(1));
        // A kill at tick zero is not observable; move the clock off zero.
        ctx.advance_clock();
        let sink = Hole::new("Sink");
        sink.wire(vec![], &ctx);
        let check = Check::new("Gate", None, vec![Parameter::assign("X", 1)]);
        check.wire(vec![sink.clone()], &ctx);

        let t = transact(1);
        t.set_parameters(vec![Parameter::assign("X", 1)]);
        assert!(check.append_transact(&t));
        assert!(t.is_killed());
        assert_eq!(check.counters.lock().cnt_true, 1);
    }

    #[test]
    fn test_mismatch_takes_false_path() {
        let ctx = Arc::new(SimContext::new(1));
        ctx.advance_clock();
        let reject = Hole::new("Reject");
        reject.wire(vec![], &ctx);
        let check = Check::new(
            "Gate",
            Some(reject.clone() as BlockRef),
            vec![Parameter::assign("X", 1)],
        );
        check.wire(vec![], &ctx);

        let t = transact(1);
        t.set_parameters(vec![Parameter::assign("X", 2)]);
        assert!(check.append_transact(&t));
        assert!(t.is_killed());
        assert_eq!(check.counters.lock().cnt_false, 1);
    }

    #[test]
    fn test_expected_none_means_absent() {
        let ctx = Arc::new(SimContext::new(1));
        let sink = Hole::new("Sink");
        sink.wire(vec![], &ctx);
        let check = Check::new("Gate", None, vec![Parameter::clear("X")]);
        check.wire(vec![sink.clone()], &ctx);

        let without = transact(1);
        assert!(check.append_transact(&without));

        let with = transact(2);
        with.set_parameters(vec![Parameter::assign("X", 1)]);
        assert!(!check.append_transact(&with));
        assert_eq!(check.counters.lock().cnt_true, 1);
        assert_eq!(check.counters.lock().cnt_false, 1);
    }

    #[test]
    fn test_no_false_destination_bounces_to_sender() {
        let ctx = Arc::new(SimContext::new(1));
        let check = Check::new("Gate", None, vec![Parameter::assign("X", 1)]);
        check.wire(vec![], &ctx);

        let t = transact(1);
        assert!(!check.append_transact(&t), "failing transact stays with the sender");
        assert!(!t.is_killed());
    }

    #[test]
    fn test_custom_predicate() {
        let ctx = Arc::new(SimContext::new(1));
        let sink = Hole::new("Sink");
        sink.wire(vec![], &ctx);
        let check = Check::with_predicate(
            "Even",
            Box::new(|_, transact| transact.id() % 2 == 0),
            None,
        );
        check.wire(vec![sink.clone()], &ctx);

        assert!(check.append_transact(&transact(2)));
        assert!(!check.append_transact(&transact(3)));
    }
}
