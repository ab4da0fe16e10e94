//! MOLT command-line interface.
//!
//! Run wave simulations from TOML job files:
//! ```sh
//! molt-cli run job.toml
//! molt-cli validate job.toml
//! molt-cli info
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use molt_core::{GridConfig, Solver, TimeOrder};

#[derive(Parser)]
#[command(name = "molt-cli")]
#[command(about = "MOLT: method-of-lines-transpose wave solver")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running the simulation.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Display the supported orders and row executors.
    Info,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("MOLT Wave Solver");
            println!("================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::run_simulation(&job)?;

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_summary {
                let csv_path = out_dir.join("summary.csv");
                runner::write_summary_csv(&result, &csv_path)?;
            }

            if job.output.save_json {
                let json_path = out_dir.join("summary.json");
                runner::write_summary_json(&result, &json_path)?;
            }

            if !result.slices.is_empty() {
                let slice_dir = out_dir.join("slices");
                for slice in &result.slices {
                    let path = slice_dir.join(runner::slice_file_name(slice));
                    runner::write_slice_csv(slice, &result.config, &path)?;
                }
                println!(
                    "{} slices written to: {}",
                    result.slices.len(),
                    slice_dir.display()
                );
            }

            println!("Simulation complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let solver = Solver::sequential(GridConfig::new(job.grid)?)?;
            let grid = solver.config();
            let [nx, ny, nz] = grid.dims();
            println!("Configuration is valid: {}", config.display());
            println!(
                "  {}x{}x{} nodes, {} steps, alpha={:.6e}, workspace {:.1} MiB",
                nx,
                ny,
                nz,
                grid.steps(),
                grid.stability().alpha,
                solver.workspace_bytes() as f64 / (1024.0 * 1024.0)
            );
            Ok(())
        }
        Commands::Info => {
            println!("Time orders:");
            for order in [TimeOrder::First, TimeOrder::Second, TimeOrder::Third] {
                println!("  {}  beta = {}", u8::from(order), order.beta());
            }
            println!();
            println!(
                "Space orders: 1 to {} (local Lagrange stencil of order + 1 nodes)",
                molt_core::config::MAX_SPACE_ORDER
            );
            println!();
            println!("Row executors:");
            println!("  sequential  rows processed on the calling thread");
            #[cfg(feature = "pooled")]
            println!(
                "  pooled      fixed worker pool ({} threads available)",
                std::thread::available_parallelism().map_or(1, |n| n.get())
            );
            #[cfg(not(feature = "pooled"))]
            println!("  pooled      not built (enable --features pooled)");
            Ok(())
        }
    }
}
