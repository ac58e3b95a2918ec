//! Headless runner for the eyeball arena simulation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::LevelFilter;

use eyeball_arena::{SimConfig, Simulation, run_headless};

/// Run the eyeball arena simulation without a window
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Replace the configured balls with this many random ones
    #[arg(short, long)]
    balls: Option<usize>,

    /// Pace the run at the nominal frame rate instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Print the final state as JSON on stdout
    #[arg(long)]
    dump_state: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    let _ = Builder::from_env(env).try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };

    let mut sim = match args.balls {
        Some(count) => Simulation::with_random_balls(&config, args.seed, count),
        None => Simulation::new(&config, args.seed),
    };

    let energy_before = sim.ball_energy();
    let tally = run_headless(&mut sim, args.ticks, args.realtime);

    log::info!(
        "ran {} ticks: {} wall bounces, {} collisions, {} hits, {} deaths, {} respawns",
        tally.ticks,
        tally.count("wall_bounce"),
        tally.count("collision"),
        tally.count("projectile_hit"),
        tally.count("death"),
        tally.count("respawn")
    );
    log::info!(
        "ball kinetic energy {:.1} -> {:.1}",
        energy_before,
        sim.ball_energy()
    );

    if args.dump_state {
        let json = serde_json::to_string_pretty(&sim).context("serializing final state")?;
        println!("{json}");
    }
    Ok(())
}
