//! Discrete-event simulation engine for queueing networks
//!
//! Models a network of blocks (generators, queues, facilities, routers,
//! sinks) that transactions travel through, in the tradition of
//! block-oriented simulation languages. Time is a bare tick counter; all
//! durations and statistics are expressed in ticks.
//!
//! # Architecture
//!
//! * [`models`] - transactions and their shared handles
//! * [`blocks`] - the block types and the [`Block`] contract
//! * [`pipeline`] - the block registry and the tick loop
//! * [`core`] - the shared clock and id source
//! * [`rng`] - deterministic per-block random streams
//! * [`report`] - per-block statistics and report rendering
//!
//! # Determinism
//!
//! A pipeline is reproducible from its master seed: every block derives
//! an independent stream keyed by its own name, so adding a block never
//! shifts the draws of the others.
//!
//! # Example
//!
//! A queue feeding a single exclusive server:
//!
//! ```
//! use queueing_simulator_core_rs::{Facility, Generator, Hole, Pipeline, Queue};
//!
//! let mut pipeline = Pipeline::new("barbershop", 42);
//! let out = Hole::new("Out");
//! let chair = Facility::new("Chair", 16, 4);
//! let line = Queue::new("Line");
//! let source = Generator::new("Clients", 18, 6, 0, 0);
//! pipeline.append(out.clone(), vec![]);
//! pipeline.append(chair.clone(), vec![out]);
//! pipeline.append(line.clone(), vec![chair]);
//! pipeline.append(source, vec![line]);
//!
//! pipeline.start(480).unwrap();
//! let report = pipeline.report();
//! assert_eq!(report.model_time, 480);
//! ```

pub mod blocks;
pub mod core;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod rng;

pub use crate::core::SimContext;

pub use blocks::{
    Advance, Aggregate, Bifacility, Block, BlockRef, Check, CheckPredicate, Facility, Generator,
    Hole, InFacility, OutFacility, Queue, Split, SplitModifier,
};
pub use models::{ParamValue, Parameter, Parts, Transaction, TransactionHandle};
pub use pipeline::{Pipeline, PipelineError};
pub use report::{BlockReport, BlockStats, Occupant, SimulationReport};
pub use rng::RngManager;
