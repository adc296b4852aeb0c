//! Facility block
//!
//! Grants at most one transaction exclusive occupancy, with a built-in
//! service delay. An offer while occupied is rejected with no side effects;
//! the caller holds the transaction and retries on a later tick.
//!
//! On entry the transaction's prior "Facility" parameter is archived (it may
//! already be inside an outer facility) and replaced with this block's name.
//! When the service delay runs out the archived value is restored, absent
//! restored as absent, and the transaction is offered downstream. Only a
//! successful hand-off releases the occupancy; on failure the parameter is
//! stamped back to this block's name, so an occupant is never observed
//! carrying a foreign or empty "Facility" parameter while it still occupies
//! the resource.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::SimContext;
use crate::models::{HoldingSet, ParamValue, Parameter, TransactionHandle};
use crate::report::{safe_div, BlockReport, BlockStats, Occupant};
use crate::rng::RngManager;

use super::{Block, BlockBase, BlockRef};

/// Exclusive resource with a service delay
///
/// # Example
/// ```
/// use queueing_simulator_core_rs::Facility;
///
/// // One barber, a haircut takes 15 ticks, give or take 3
/// let barber = Facility::new("Barber", 15, 3);
/// assert!(barber.is_empty());
/// ```
pub struct Facility {
    base: BlockBase,
    /// The mean time increment
    interval: usize,
    /// The time half-range
    modificator: usize,
    state: Mutex<FacilityState>,
}

struct FacilityState {
    holding: HoldingSet,
    rng: RngManager,
    /// Id of the transaction owning the resource; `None` means free
    holded_transact_id: Option<u64>,
    /// "Facility" parameter archived at the current occupant's entry;
    /// `None` records that the occupant had no such parameter
    captured_facility: Option<ParamValue>,
    sum_advance: f64,
    cnt_transact: u64,
}

impl Facility {
    /// Create a new Facility block
    ///
    /// # Arguments
    /// * `name` - Block name, unique within the network
    /// * `interval` - Mean service delay in ticks
    /// * `modificator` - Delay half-range; 0 means a fixed delay
    pub fn new(name: &str, interval: usize, modificator: usize) -> Arc<Self> {
        Arc::new(Self {
            base: BlockBase::new(name),
            interval,
            modificator,
            state: Mutex::new(FacilityState {
                holding: HoldingSet::new(),
                rng: RngManager::new(0),
                holded_transact_id: None,
                captured_facility: None,
                sum_advance: 0.0,
                cnt_transact: 0,
            }),
        })
    }

    /// Is the resource free?
    pub fn is_empty(&self) -> bool {
        self.state.lock().holding.is_empty()
    }

    fn generate_delay(&self, rng: &mut RngManager) -> usize {
        let mut delay = self.interval as i64;
        if self.modificator > 0 {
            delay += rng.range(-(self.modificator as i64), self.modificator as i64);
        }
        delay.max(0) as usize
    }
}

impl Block for Facility {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>) {
        self.base.wire(successors, ctx);
        self.state.lock().rng = ctx.rng_for(self.base.name());
    }

    fn append_transact(&self, transact: &TransactionHandle) -> bool {
        let mut state = self.state.lock();
        if !state.holding.is_empty() {
            // Facility is busy
            return false;
        }
        trace!("Append transact {} to {}", transact.id(), self.base.name());
        transact.set_holder_name(self.base.name());
        let delay = self.generate_delay(&mut state.rng);
        state.sum_advance += delay as f64;
        transact.set_ticks(delay);
        state.captured_facility = transact.parameter("Facility");
        transact.set_parameters(vec![Parameter::assign("Facility", self.base.name())]);
        state.holded_transact_id = Some(transact.id());
        state.holding.push(transact.clone());
        state.cnt_transact += 1;
        true
    }

    fn held_snapshot(&self) -> Vec<TransactionHandle> {
        self.state.lock().holding.snapshot()
    }

    fn handle_transacts(&self, tick: usize, held: &[TransactionHandle]) {
        for transact in held {
            transact.dec_ticks();
            transact.print_info(tick);
            if !transact.is_the_end() {
                continue;
            }
            // Restore the archived parameter, absent restored as absent.
            let captured = self.state.lock().captured_facility.clone();
            transact.set_parameters(vec![Parameter {
                name: "Facility".to_string(),
                value: captured,
            }]);
            if self.base.try_forward(transact) {
                let mut state = self.state.lock();
                state.holding.remove(transact.id());
                state.holded_transact_id = None;
            } else {
                // Still occupying: the transaction must keep carrying this
                // facility's name until it actually leaves.
                transact
                    .set_parameters(vec![Parameter::assign("Facility", self.base.name())]);
            }
        }
    }

    fn report(&self) -> BlockReport {
        let elapsed = self.base.ctx().model_time();
        let state = self.state.lock();
        let occupant = state
            .holded_transact_id
            .and_then(|id| state.holding.get(id))
            .map(|transact| {
                let parts = transact.parts();
                Occupant {
                    transact_id: transact.id(),
                    part: parts.part,
                    parent_id: parts.parent_id,
                }
            });
        BlockReport {
            name: self.base.name().to_string(),
            stats: BlockStats::Facility {
                average_advance: safe_div(state.sum_advance, state.cnt_transact as f64),
                utilization_pct: safe_div(100.0 * state.sum_advance, elapsed as f64),
                entries: state.cnt_transact,
                occupant,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;

    fn transact(id: u64) -> TransactionHandle {
        TransactionHandle::new(Transaction::new(id, 0))
    }

    #[test]
    fn test_accepts_when_free_rejects_when_busy() {
        let ctx = Arc::new(SimContext::new(3));
        let facility = Facility::new("Barber", 3, 0);
        facility.wire(vec![], &ctx);

        let first = transact(1);
        let second = transact(2);
        assert!(facility.append_transact(&first));
        assert!(!facility.is_empty());
        assert!(!facility.append_transact(&second));
    }

    #[test]
    fn test_rejection_has_no_side_effects() {
        let ctx = Arc::new(SimContext::new(3));
        let facility = Facility::new("Barber", 3, 0);
        facility.wire(vec![], &ctx);

        let first = transact(1);
        facility.append_transact(&first);

        let second = transact(2);
        second.set_holder_name("Upstream");
        assert!(!facility.append_transact(&second));
        assert!(!facility.append_transact(&second));

        assert_eq!(second.holder_name(), "Upstream");
        assert_eq!(second.ticks(), 0);
        assert_eq!(second.parameter("Facility"), None);

        let report = facility.report();
        match report.stats {
            BlockStats::Facility { entries, .. } => assert_eq!(entries, 1),
            _ => panic!("wrong stats variant"),
        }
    }

    #[test]
    fn test_entry_stamps_facility_parameter() {
        let ctx = Arc::new(SimContext::new(3));
        let facility = Facility::new("Barber", 3, 0);
        facility.wire(vec![], &ctx);

        let t = transact(1);
        facility.append_transact(&t);
        assert_eq!(t.parameter("Facility"), Some(ParamValue::Str("Barber".into())));
        assert_eq!(t.ticks(), 3);
    }

    #[test]
    fn test_failed_handoff_keeps_parameter_and_occupancy() {
        let ctx = Arc::new(SimContext::new(3));
        // no successors: every hand-off fails
        let facility = Facility::new("Barber", 1, 0);
        facility.wire(vec![], &ctx);

        let t = transact(1);
        facility.append_transact(&t);

        let held = facility.held_snapshot();
        facility.handle_transacts(1, &held);

        assert!(!facility.is_empty());
        assert_eq!(
            t.parameter("Facility"),
            Some(ParamValue::Str("Barber".into())),
            "occupant must keep carrying the facility name"
        );
    }
}
