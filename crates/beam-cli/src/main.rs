// ─────────────────────────────────────────────────────────────────────
// SCPN Beamline — Command-Line Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! CLI for SCPN Beamline.
//!
//! Pipeline: generate beam -> write initial -> build line -> transport -> write final.

use beam_diagnostics::run_scenario;
use beam_types::config::SimulationConfig;
use clap::{Parser, Subcommand};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "scpn-beamline",
    version,
    about = "Linear beam transport through drift/quadrupole lines"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a transport scenario and write its artifacts.
    Run {
        /// JSON scenario file; the built-in reference scenario if omitted.
        #[arg(short, long, env = "SCPN_BEAMLINE_CONFIG")]
        config: Option<String>,

        /// Output directory, overrides `output.path`.
        #[arg(short, long)]
        output: Option<String>,

        /// RNG seed, overrides `beam.seed`.
        #[arg(long)]
        seed: Option<u64>,

        /// Transport step in metres, overrides `transport.step_m`.
        #[arg(long)]
        step: Option<f64>,
    },
    /// Print the reference scenario as JSON.
    ReferenceConfig,
}

fn load_config(
    config: Option<String>,
    output: Option<String>,
    seed: Option<u64>,
    step: Option<f64>,
) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let mut cfg = match config {
        Some(path) => {
            tracing::info!(path = %path, "loading scenario");
            SimulationConfig::from_file(&path)?
        }
        None => {
            tracing::info!("no config given, using reference scenario");
            SimulationConfig::reference()
        }
    };
    if let Some(output) = output {
        cfg.output.path = output;
    }
    if seed.is_some() {
        cfg.beam.seed = seed;
    }
    if let Some(step) = step {
        cfg.transport.step_m = step;
    }
    Ok(cfg)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            seed,
            step,
        } => {
            let t0 = Instant::now();
            let cfg = load_config(config, output, seed, step)?;
            let report = run_scenario(&cfg)?;

            tracing::info!(
                scenario = %report.name,
                particles = report.particle_count,
                s_m = report.final_s_m,
                snapshots = report.snapshots,
                elapsed_ms = t0.elapsed().as_millis(),
                "scenario complete"
            );
            println!("Scenario '{}' finished at s = {:.3} m", report.name, report.final_s_m);
            for path in [
                &report.initial.npz,
                &report.initial.summary,
                &report.initial.phase_space_plot,
                &report.final_beam.npz,
                &report.final_beam.summary,
                &report.final_beam.phase_space_plot,
                &report.positions.csv,
                &report.positions.elements,
                &report.positions.envelope_plot,
            ] {
                println!("  {}", path.display());
            }
        }
        Commands::ReferenceConfig => {
            println!(
                "{}",
                serde_json::to_string_pretty(&SimulationConfig::reference())?
            );
        }
    }

    Ok(())
}
