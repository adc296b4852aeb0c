//! Simulation reporting
//!
//! Every block renders its statistics into a [`BlockReport`]; the scheduler
//! assembles them into a [`SimulationReport`], block names in lexicographic
//! order. The structs are the contract (they serialize to JSON); the
//! `Display` impls produce the human-readable summary stream.
//!
//! All ratios are guarded: a block that never saw a transaction reports
//! zeros, not NaN.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Divide, treating an empty denominator as zero
///
/// Statistics over zero transactions are degenerate, not an error.
pub(crate) fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// The transaction currently occupying a resource block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    /// Id of the occupying transaction
    pub transact_id: u64,
    /// Fragment number if the occupant is a split fragment, 0 otherwise
    pub part: usize,
    /// Parent id if the occupant is a split fragment, 0 otherwise
    pub parent_id: u64,
}

/// Per-block statistics, one variant per block kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockStats {
    /// Source block: how many transactions were created
    Generator {
        generated: u64,
    },

    /// Delay block: mean generated delay
    Advance {
        average_advance: f64,
    },

    /// Exclusive resource: mean delay, utilization and throughput
    Facility {
        average_advance: f64,
        utilization_pct: f64,
        entries: u64,
        occupant: Option<Occupant>,
    },

    /// Buffering block: content and waiting-time statistics
    Queue {
        max_content: usize,
        entries: u64,
        zero_entries: u64,
        percent_zero_entries: f64,
        current_content: usize,
        average_content: f64,
        average_time: f64,
        average_time_nonzero: f64,
    },

    /// Predicate gate: outcome counters
    Check {
        cnt_true: u64,
        cnt_false: u64,
    },

    /// Fork block: originals split and fragments created
    Split {
        split: u64,
        parts_created: u64,
    },

    /// Merge block: families merged, pass-throughs, fragments still waiting
    Aggregate {
        merged: u64,
        passed: u64,
        parts_pending: usize,
    },

    /// Terminal sink: killed count and means over the dead
    Hole {
        killed: u64,
        average_advance: f64,
        average_life: f64,
    },

    /// Reports nothing; the paired entry half carries the statistics
    Silent,
}

/// One block's named report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockReport {
    pub name: String,
    pub stats: BlockStats,
}

impl fmt::Display for BlockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if matches!(self.stats, BlockStats::Silent) {
            return Ok(());
        }
        writeln!(f, "Object name \"{}\"", self.name)?;
        match &self.stats {
            BlockStats::Generator { generated } => {
                writeln!(f, "Generated {}", generated)?;
            }
            BlockStats::Advance { average_advance } => {
                writeln!(f, "Average advance {:.2}", average_advance)?;
            }
            BlockStats::Facility {
                average_advance,
                utilization_pct,
                entries,
                occupant,
            } => {
                write!(
                    f,
                    "Average advance {:.2}\tAverage utilization {:.2}%\tNumber entries {}\t",
                    average_advance, utilization_pct, entries
                )?;
                match occupant {
                    Some(occupant) => {
                        write!(f, "Transact {} in facility", occupant.transact_id)?;
                        if occupant.parent_id > 0 {
                            write!(
                                f,
                                ", parent transact {} part {}",
                                occupant.parent_id, occupant.part
                            )?;
                        }
                        writeln!(f)?;
                    }
                    None => writeln!(f, "Facility is empty")?,
                }
            }
            BlockStats::Queue {
                max_content,
                entries,
                zero_entries,
                percent_zero_entries,
                current_content,
                average_content,
                average_time,
                average_time_nonzero,
            } => {
                writeln!(
                    f,
                    "Max content {}\tTotal entries {}\tZero entries {}\t\
                     Percent zero entries {:.2}%",
                    max_content, entries, zero_entries, percent_zero_entries
                )?;
                writeln!(
                    f,
                    "Current contents {}\tAverage content {:.2}\tAverage time/trans {:.2}\t\
                     Average time/trans without zero entries {:.2}",
                    current_content, average_content, average_time, average_time_nonzero
                )?;
            }
            BlockStats::Check { cnt_true, cnt_false } => {
                writeln!(
                    f,
                    "Check result true {}\tCheck result false {}",
                    cnt_true, cnt_false
                )?;
            }
            BlockStats::Split { split, parts_created } => {
                writeln!(
                    f,
                    "Split transacts {}\tParts created {}",
                    split, parts_created
                )?;
            }
            BlockStats::Aggregate {
                merged,
                passed,
                parts_pending,
            } => {
                writeln!(
                    f,
                    "Merged {}\tPassed through {}\tParts pending {}",
                    merged, passed, parts_pending
                )?;
            }
            BlockStats::Hole {
                killed,
                average_advance,
                average_life,
            } => {
                writeln!(
                    f,
                    "Killed transacts {}\tAverage advance {:.2}\tAverage life {:.2}",
                    killed, average_advance, average_life
                )?;
            }
            BlockStats::Silent => {}
        }
        writeln!(f)
    }
}

/// Whole-run report assembled by the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Name of the pipeline that produced this report
    pub pipeline_name: String,
    /// Ticks elapsed when the report was taken
    pub model_time: usize,
    /// Per-block reports, names in lexicographic order
    pub blocks: Vec<BlockReport>,
}

impl SimulationReport {
    /// Serialize to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline \"{}\"", self.pipeline_name)?;
        writeln!(f, "Simulation time {}", self.model_time)?;
        writeln!(f)?;
        for block in &self.blocks {
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}
