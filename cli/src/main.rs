//! Queueing network simulator CLI
//!
//! Run one of the built-in scenarios for a given horizon and seed.
//!
//! # Example
//!
//! ```bash
//! # A barbershop: one chair, one waiting line, eight hours
//! queueing-sim --scenario barbershop --horizon 480
//!
//! # Same model, different arrival pattern
//! queueing-sim --scenario barbershop --horizon 480 --seed 7
//!
//! # Machine-readable report
//! queueing-sim --scenario assembly --json
//! ```
//!
//! Set `RUST_LOG=queueing_simulator_core_rs=trace` to watch every
//! transaction move.

use clap::Parser;
use queueing_simulator_core_rs::{
    Advance, Aggregate, Bifacility, BlockRef, Check, Facility, Generator, Hole, Parameter,
    Pipeline, Queue, Split,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Queueing network simulator
///
/// Drives a block-structured simulation model for a fixed number of
/// ticks. Given the same seed, produces identical results every run.
#[derive(Parser, Debug)]
#[command(name = "queueing-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario to run (barbershop, workshop, assembly)
    #[arg(short = 'S', long, default_value = "barbershop")]
    scenario: String,

    /// Simulation horizon in ticks
    #[arg(short = 'H', long, default_value = "480")]
    horizon: usize,

    /// Random seed for deterministic simulation
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Emit the report as pretty JSON instead of text
    #[arg(long)]
    json: bool,
}

/// One barber, one chair, a waiting line.
fn barbershop(seed: u64) -> Pipeline {
    let mut pipeline = Pipeline::new("barbershop", seed);
    let out = Hole::new("Out");
    let chair = Facility::new("Chair", 16, 4);
    let line = Queue::new("Line");
    let clients = Generator::new("Clients", 18, 6, 0, 0);
    pipeline.append(out.clone(), vec![]);
    pipeline.append(chair.clone(), vec![out]);
    pipeline.append(line.clone(), vec![chair]);
    pipeline.append(clients, vec![line]);
    pipeline
}

/// A repair bay held from entry to exit while the repair itself runs
/// as a separate delay inside.
fn workshop(seed: u64) -> Pipeline {
    let mut pipeline = Pipeline::new("workshop", seed);
    let done = Hole::new("Done");
    let (bay_in, bay_out) = Bifacility::new("Bay");
    let repair = Advance::new("Repair", 30, 10);
    let yard = Queue::new("Yard");
    let trucks = Generator::new("Trucks", 40, 15, 0, 0);
    pipeline.append(done.clone(), vec![]);
    pipeline.append(bay_out.clone(), vec![done]);
    pipeline.append(repair.clone(), vec![bay_out]);
    pipeline.append(bay_in.clone(), vec![repair]);
    pipeline.append(yard.clone(), vec![bay_in]);
    pipeline.append(trucks, vec![yard]);
    pipeline
}

/// Orders split into three parts; the frame takes the slow mill, the
/// rest take the fast one, and the parts are refitted before shipping.
fn assembly(seed: u64) -> Pipeline {
    let mut pipeline = Pipeline::new("assembly", seed);
    let shipped = Hole::new("Shipped");
    let fit = Aggregate::new("Fit");
    let slow_mill = Advance::new("SlowMill", 12, 3);
    let fast_mill = Advance::new("FastMill", 4, 1);
    let router = Check::new(
        "Router",
        Some(fast_mill.clone() as BlockRef),
        vec![Parameter::assign("Line", "slow")],
    );
    let cut = Split::with_modifier(
        "Cut",
        3,
        0,
        Box::new(|fragment| {
            let line = if fragment.parts().part == 1 { "slow" } else { "fast" };
            fragment.set_parameters(vec![Parameter::assign("Line", line)]);
        }),
    );
    let orders = Generator::new("Orders", 20, 5, 0, 0);
    pipeline.append(shipped.clone(), vec![]);
    pipeline.append(fit.clone(), vec![shipped]);
    pipeline.append(slow_mill.clone(), vec![fit.clone()]);
    pipeline.append(fast_mill.clone(), vec![fit]);
    pipeline.append(router.clone(), vec![slow_mill]);
    pipeline.append(cut.clone(), vec![router]);
    pipeline.append(orders, vec![cut]);
    pipeline
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,queueing_simulator_core_rs=info")),
        )
        .init();

    let args = Args::parse();

    let mut pipeline = match args.scenario.as_str() {
        "barbershop" => barbershop(args.seed),
        "workshop" => workshop(args.seed),
        "assembly" => assembly(args.seed),
        other => {
            eprintln!("Error: unknown scenario '{}'", other);
            eprintln!("Available scenarios: barbershop, workshop, assembly");
            std::process::exit(1);
        }
    };

    info!(
        scenario = args.scenario.as_str(),
        horizon = args.horizon,
        seed = args.seed,
        "Starting simulation"
    );

    if let Err(e) = pipeline.start(args.horizon) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.json {
        match pipeline.report().to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        pipeline.print_report();
    }
}
