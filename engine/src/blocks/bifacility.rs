//! Bifacility block pair
//!
//! The same exclusive-occupancy contract as [`Facility`](super::Facility),
//! split across two network positions sharing one occupancy record. The
//! entry half claims the resource with no delay of its own and immediately
//! pushes the transaction onward; the occupancy then lasts for whatever
//! happens in the network between entry and exit. The exit half releases
//! the resource, and accepts only the one transaction that is validly
//! exiting this specific occupancy.
//!
//! The entry half carries all statistics; the exit half reports nothing.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::SimContext;
use crate::models::{HoldingSet, ParamValue, Parameter, TransactionHandle};
use crate::report::{safe_div, BlockReport, BlockStats, Occupant};

use super::{Block, BlockBase, BlockRef};

/// Occupancy record shared by the entry and exit halves
struct BifacilityState {
    /// The transaction owning the resource, entry to exit; `None` means free
    occupant: Option<TransactionHandle>,
    /// Entered but not yet accepted by any of the entry half's successors
    pending: HoldingSet,
    /// "Facility" parameter archived at the current occupant's entry;
    /// `None` records that the occupant had no such parameter
    captured_facility: Option<ParamValue>,
    /// Tick the current occupant claimed the resource
    entered_at: usize,
    sum_advance: f64,
    cnt_transact: u64,
}

/// Constructor for the entry/exit pair
///
/// # Example
/// ```
/// use queueing_simulator_core_rs::Bifacility;
///
/// let (repair_in, repair_out) = Bifacility::new("Repair");
/// assert_eq!(repair_out.exit_name(), "Repair_OUT");
/// ```
pub struct Bifacility;

impl Bifacility {
    /// Create a linked entry/exit pair over one occupancy record
    ///
    /// The exit half is named `<name>_OUT`.
    pub fn new(name: &str) -> (Arc<InFacility>, Arc<OutFacility>) {
        let shared = Arc::new(Mutex::new(BifacilityState {
            occupant: None,
            pending: HoldingSet::new(),
            captured_facility: None,
            entered_at: 0,
            sum_advance: 0.0,
            cnt_transact: 0,
        }));
        let entry = Arc::new(InFacility {
            base: BlockBase::new(name),
            shared: Arc::clone(&shared),
        });
        let exit = Arc::new(OutFacility {
            base: BlockBase::new(&format!("{}_OUT", name)),
            shared,
        });
        (entry, exit)
    }
}

/// Entry half: claims ownership of the resource
pub struct InFacility {
    base: BlockBase,
    shared: Arc<Mutex<BifacilityState>>,
}

impl InFacility {
    /// Is the resource free?
    pub fn is_empty(&self) -> bool {
        self.shared.lock().occupant.is_none()
    }
}

impl Block for InFacility {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>) {
        self.base.wire(successors, ctx);
    }

    fn append_transact(&self, transact: &TransactionHandle) -> bool {
        let now = self.base.ctx().model_time();
        {
            let mut state = self.shared.lock();
            if state.occupant.is_some() {
                // Facility is busy
                return false;
            }
            trace!("Append transact {} to {}", transact.id(), self.base.name());
            transact.set_holder_name(self.base.name());
            state.captured_facility = transact.parameter("Facility");
            transact.set_parameters(vec![Parameter::assign("Facility", self.base.name())]);
            state.occupant = Some(transact.clone());
            state.pending.push(transact.clone());
            state.cnt_transact += 1;
            state.entered_at = now;
        }
        // Claimed; now push straight into the guarded section.
        transact.print_info(now);
        if self.base.try_forward(transact) {
            self.shared.lock().pending.remove(transact.id());
        }
        true
    }

    fn held_snapshot(&self) -> Vec<TransactionHandle> {
        self.shared.lock().pending.snapshot()
    }

    fn handle_transacts(&self, tick: usize, held: &[TransactionHandle]) {
        // Retry the forward that failed at entry time.
        for transact in held {
            transact.print_info(tick);
            if self.base.try_forward(transact) {
                self.shared.lock().pending.remove(transact.id());
            }
        }
    }

    fn report(&self) -> BlockReport {
        let elapsed = self.base.ctx().model_time();
        let state = self.shared.lock();
        let occupant = state.occupant.as_ref().map(|transact| {
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

/// Exit half: releases ownership of the resource
pub struct OutFacility {
    base: BlockBase,
    shared: Arc<Mutex<BifacilityState>>,
}

impl OutFacility {
    /// Name of the exit half (`<entry name>_OUT`)
    pub fn exit_name(&self) -> &str {
        self.base.name()
    }
}

impl Block for OutFacility {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn wire(&self, successors: Vec<BlockRef>, ctx: &Arc<SimContext>) {
        self.base.wire(successors, ctx);
    }

    fn append_transact(&self, transact: &TransactionHandle) -> bool {
        let now = self.base.ctx().model_time();
        {
            let state = self.shared.lock();
            let holder = state.occupant.as_ref().map(|t| t.id());
            // Only the transaction recorded as the current occupant may exit.
            if holder != Some(transact.id()) {
                return false;
            }
        }
        trace!("Append transact {} to {}", transact.id(), self.base.name());
        transact.print_info(now);
        let captured = self.shared.lock().captured_facility.clone();
        transact.set_parameters(vec![Parameter {
            name: "Facility".to_string(),
            value: captured,
        }]);
        if self.base.try_forward(transact) {
            let mut state = self.shared.lock();
            state.sum_advance += now.saturating_sub(state.entered_at) as f64;
            state.pending.remove(transact.id());
            state.occupant = None;
            true
        } else {
            // Still occupying: re-stamp so the transaction is never seen
            // with a foreign or empty "Facility" parameter while inside.
            transact.set_parameters(vec![Parameter::assign("Facility", self.base.name())]);
            false
        }
    }

    fn report(&self) -> BlockReport {
        BlockReport {
            name: self.base.name().to_string(),
            stats: BlockStats::Silent,
        }
    }
}
