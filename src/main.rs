//! Runs the three simulations with default parameters
//!
//! Run with: cargo run --release -- [--json] [--seed N] [--sequential]

use anyhow::Result;
use clap::Parser;
use derivrisk::config::Settings;
use derivrisk::{FxForwardRequest, GbmRequest, OuRequest, SimulatedPaths, Simulator, StatsPoint};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "derivrisk")]
#[command(about = "Monte Carlo path simulation for GBM, OU and FX forward exposure")]
#[command(version)]
struct Cli {
    /// Print the full responses as JSON instead of summaries
    #[arg(long)]
    json: bool,

    /// Root seed, overrides `engine.seed`
    #[arg(long)]
    seed: Option<u64>,

    /// Simulate paths on the calling thread
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if cli.seed.is_some() {
        settings.engine.seed = cli.seed;
    }
    if cli.sequential {
        settings.engine.parallel = false;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(?settings, "Loaded settings");

    let simulator = Simulator::new(settings.engine);

    let gbm = simulator.simulate_gbm(&GbmRequest::default())?;
    let ou = simulator.simulate_ou(&OuRequest::default())?;
    let fx = simulator.simulate_fx_forward(&FxForwardRequest::default())?;

    if cli.json {
        println!("{}", serde_json::to_string(&gbm)?);
        println!("{}", serde_json::to_string(&ou)?);
        println!("{}", serde_json::to_string(&fx)?);
        return Ok(());
    }

    println!("=== Derivatives Risk Path Simulation ===\n");

    println!("--- Geometric Brownian Motion ---");
    println!("S0 = 100, μ = 8%, σ = 20%, T = 1y");
    print_terminal_summary(&gbm);

    println!("--- Ornstein-Uhlenbeck ---");
    println!("X0 = 1.0, κ = 3.0, θ = 1.0, σ = 15%, T = 1y");
    print_terminal_summary(&ou);

    println!("--- FX Forward (GBM spot) ---");
    println!("Spot = 1.10, r_dom = 3%, r_for = 1%, σ = 15%, T = 1y");
    println!("Forward at inception: {:.5}", fx.forward_at_inception);
    println!("\nSpot profile:");
    print_profile(&fx.underlying_stats);
    println!("\nPV profile:");
    print_profile(&fx.pv_stats);

    Ok(())
}

fn print_terminal_summary(out: &SimulatedPaths) {
    let terminals: Vec<f64> = out.paths.iter().filter_map(|p| p.last().copied()).collect();
    let mean = terminals.iter().sum::<f64>() / terminals.len() as f64;
    let min = terminals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = terminals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    println!("Paths: {}, steps: {}", out.paths.len(), out.time_grid.step_count());
    println!("Terminal mean: {:.4}, min: {:.4}, max: {:.4}\n", mean, min, max);
}

fn print_profile(stats: &[StatsPoint]) {
    let stride = (stats.len() / 4).max(1);
    let last = stats.len().saturating_sub(1);
    for (i, point) in stats.iter().enumerate() {
        if i % stride != 0 && i != last {
            continue;
        }
        println!(
            "  t = {:.3}: mean {:+.5}, p5 {:+.5}, p95 {:+.5}",
            point.time, point.mean, point.p5, point.p95
        );
    }
}
