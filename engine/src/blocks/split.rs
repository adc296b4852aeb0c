//! Split block
//!
//! Fans one transaction out into `cnt_split ± modificator` independent
//! fragments. Each fragment is a full copy of the original under a fresh
//! id, labelled `(part k of n, parent id)` so an Aggregate downstream can
//! reassemble the family. The original is killed once its fragments exist.
//!
//! An optional modifier hook runs on every fragment before it is offered
//! downstream, for models that vary the copies (job kinds, batch tags).

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::SimContext;
use crate::models::{HoldingSet, TransactionHandle};
use crate::report::{BlockReport, BlockStats};
use crate::rng::RngManager;

use super::{Block, BlockBase, BlockRef};

/// Hook applied to each fragment before it leaves the Split
pub type SplitModifier = Box<dyn Fn(&TransactionHandle) + Send + Sync>;

struct SplitState {
    /// Fragments refused downstream, waiting for the next tick
    holding: HoldingSet,
    rng: RngManager,
    split: u64,
    parts_created: u64,
}

/// Fan-out block
pub struct Split {
    base: BlockBase,
    /// Mean number of fragments per arrival
    cnt_split: usize,
    /// Fragment-count half-range
    modificator: usize,
    modifier: Option<SplitModifier>,
    state: Mutex<SplitState>,
}

impl Split {
    /// Create a new Split block
    ///
    /// # Arguments
    /// * `name` - Block name, unique within the network
    /// * `cnt_split` - Mean number of fragments per arriving transaction
    /// * `modificator` - Fragment-count half-range; 0 means a fixed count
    pub fn new(name: &str, cnt_split: usize, modificator: usize) -> Arc<Self> {
        Self::build(name, cnt_split, modificator, None)
    }

    /// Create a Split that runs `modifier` on every fragment
    pub fn with_modifier(
        name: &str,
        cnt_split: usize,
        modificator: usize,
        modifier: SplitModifier,
    ) -> Arc<Self> {
        Self::build(name, cnt_split, modificator, Some(modifier))
    }

    fn build(
        name: &str,
        cnt_split: usize,
        modificator: usize,
        modifier: Option<SplitModifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            base: BlockBase::new(name),
            cnt_split,
            modificator,
            modifier,
            state: Mutex::new(SplitState {
                holding: HoldingSet::new(),
                rng: RngManager::new(0),
                split: 0,
                parts_created: 0,
            }),
        })
    }

    /// Draw the fragment count: mean plus jitter, at least one
    fn generate_count(&self, rng: &mut RngManager) -> usize {
        let mut count = self.cnt_split as i64;
        if self.modificator > 0 {
            count += rng.range(-(self.modificator as i64), self.modificator as i64);
        }
        count.max(1) as usize
    }
}

impl Block for Split {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>) {
        self.base.wire(successors, ctx);
        self.state.lock().rng = ctx.rng_for(self.base.name());
    }

    fn append_transact(&self, transact: &TransactionHandle) -> bool {
        trace!("Append transact {} to {}", transact.id(), self.base.name());
        transact.set_holder_name(self.base.name());
        let ctx = self.base.ctx();
        let now = ctx.model_time();
        let parent_id = transact.id();
        let count = {
            let mut state = self.state.lock();
            state.split += 1;
            self.generate_count(&mut state.rng)
        };
        for part in 1..=count {
            let fragment = transact.copy_with_id(ctx.next_transact_id());
            fragment.set_parts(part, count, parent_id);
            fragment.set_holder_name(self.base.name());
            if let Some(modifier) = &self.modifier {
                modifier(&fragment);
            }
            self.state.lock().parts_created += 1;
            if !self.base.try_forward(&fragment) {
                self.state.lock().holding.push(fragment);
            }
        }
        // The original ends here; its fragments carry on.
        transact.kill(now);
        true
    }

    fn held_snapshot(&self) -> Vec<TransactionHandle> {
        self.state.lock().holding.snapshot()
    }

    fn handle_transacts(&self, tick: usize, held: &[TransactionHandle]) {
        for fragment in held {
            fragment.print_info(tick);
            if self.base.try_forward(fragment) {
                self.state.lock().holding.remove(fragment.id());
            }
        }
    }

    fn report(&self) -> BlockReport {
        let state = self.state.lock();
        BlockReport {
            name: self.base.name().to_string(),
            stats: BlockStats::Split {
                split: state.split,
                parts_created: state.parts_created,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Hole;
    use crate::models::{Parameter, Transaction};

    fn transact(ctx: &Arc<SimContext>) -> TransactionHandle {
        TransactionHandle::new(Transaction::new(ctx.next_transact_id(), 0))
    }

    #[test]
    fn test_fixed_count_produces_labelled_fragments() {
        let ctx = Arc::new(SimContext::new(1));
        // A kill at tick zero is not observable; move the clock off zero.
        ctx.advance_clock();
        let split = Split::new("Fork", 3, 0);
        // No successors: fragments land in the holding set.
        split.wire(vec![], &ctx);

        let original = transact(&ctx);
        let parent_id = original.id();
        assert!(split.append_transact(&original));
        assert!(original.is_killed());

        let fragments = split.held_snapshot();
        assert_eq!(fragments.len(), 3);
        for (index, fragment) in fragments.iter().enumerate() {
            let parts = fragment.parts();
            assert_eq!(parts.part, index + 1);
            assert_eq!(parts.total_parts, 3);
            assert_eq!(parts.parent_id, parent_id);
            assert_ne!(fragment.id(), parent_id);
        }
    }

    #[test]
    fn test_fragments_are_independent_copies() {
        let ctx = Arc::new(SimContext::new(1));
        let split = Split::new("Fork", 2, 0);
        split.wire(vec![], &ctx);

        let original = transact(&ctx);
        original.set_parameters(vec![Parameter::assign("Color", "red")]);
        split.append_transact(&original);

        let fragments = split.held_snapshot();
        fragments[0].set_parameters(vec![Parameter::assign("Color", "blue")]);
        assert_eq!(
            fragments[1].parameter("Color"),
            Some("red".into()),
            "mutating one fragment must not touch its sibling"
        );
    }

    #[test]
    fn test_modifier_runs_on_each_fragment() {
        let ctx = Arc::new(SimContext::new(1));
        let split = Split::with_modifier(
            "Fork",
            2,
            0,
            Box::new(|fragment| {
                fragment.set_parameters(vec![Parameter::assign("Kind", fragment.parts().part as i64)]);
            }),
        );
        split.wire(vec![], &ctx);

        split.append_transact(&transact(&ctx));
        let fragments = split.held_snapshot();
        assert_eq!(fragments[0].parameter("Kind"), Some(1i64.into()));
        assert_eq!(fragments[1].parameter("Kind"), Some(2i64.into()));
    }

    #[test]
    fn test_fragments_forward_when_accepted() {
        let ctx = Arc::new(SimContext::new(1));
        let sink = Hole::new("Sink");
        sink.wire(vec![], &ctx);
        let split = Split::new("Fork", 3, 0);
        split.wire(vec![sink.clone() as BlockRef], &ctx);

        split.append_transact(&transact(&ctx));
        assert!(split.held_snapshot().is_empty());
        let state = split.state.lock();
        assert_eq!(state.split, 1);
        assert_eq!(state.parts_created, 3);
    }
}
