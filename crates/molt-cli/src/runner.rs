//! Simulation runner: builds the grid, seeds the components, steps them.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ndarray::Array2;
use serde::Serialize;

use molt_compute::RowExecutor;
use molt_core::config::{GridParams, Stability};
use molt_core::fields::{gaussian, mid_plane};
use molt_core::simulation::{ComponentReport, Simulation};
use molt_core::{GridConfig, Solver};

use crate::config::{ComponentConfig, ExecutionConfig, JobConfig};

/// A mid-plane snapshot of one component.
pub struct SliceRecord {
    pub component: String,
    pub step: usize,
    pub plane: Array2<f64>,
}

/// Results from a simulation run.
pub struct SimulationOutput {
    pub config: GridConfig,
    pub device: String,
    pub reports: Vec<ComponentReport>,
    pub slices: Vec<SliceRecord>,
}

/// Serialised form of a finished run.
#[derive(Serialize)]
pub struct RunSummary<'a> {
    pub version: &'static str,
    pub device: &'a str,
    pub dims: [usize; 3],
    pub dt: f64,
    pub steps: usize,
    pub grid: &'a GridParams,
    pub stability: &'a Stability,
    pub reports: &'a [ComponentReport],
}

impl SimulationOutput {
    pub fn summary(&self) -> RunSummary<'_> {
        RunSummary {
            version: env!("CARGO_PKG_VERSION"),
            device: &self.device,
            dims: self.config.dims(),
            dt: self.config.dt(),
            steps: self.config.steps(),
            grid: self.config.params(),
            stability: self.config.stability(),
            reports: &self.reports,
        }
    }
}

/// Run a full simulation from a parsed job configuration.
pub fn run_simulation(job: &JobConfig) -> Result<SimulationOutput> {
    let config = GridConfig::new(job.grid.clone()).context("Invalid grid configuration")?;
    let [nx, ny, nz] = config.dims();
    println!(
        "Grid: {}x{}x{} nodes, dt={}, {} steps, time order {}, space order {}",
        nx,
        ny,
        nz,
        config.dt(),
        config.steps(),
        u8::from(config.time_order()),
        config.space_order()
    );

    let executor = create_executor(&job.execution)?;
    let solver = Solver::new(config, executor)?;
    let device = solver.device_info().name;
    log::info!(
        "solver workspace: {:.1} MiB",
        solver.workspace_bytes() as f64 / (1024.0 * 1024.0)
    );

    let components = resolve_components(&job.components, solver.config());
    let mut sim = Simulation::new(solver);
    for c in &components {
        let (centre, width) = pulse_shape(c, sim.solver().config());
        let u0 = gaussian(sim.solver().config(), centre, width, c.amplitude);
        let v0 = u0.iter().map(|u| c.velocity * u).collect();
        println!(
            "  Component '{}': centre=[{}, {}, {}], width={}, amplitude={}, velocity={}",
            c.name, centre[0], centre[1], centre[2], width, c.amplitude, c.velocity
        );
        sim.add_component(c.name.clone(), u0, v0)?;
    }

    let steps = sim.solver().config().steps();
    let dims = sim.solver().config().dims();
    let mut reports = Vec::with_capacity(steps * components.len());
    let mut slices = Vec::new();
    if job.output.save_slices {
        take_slices(&sim, 0, dims, &mut slices)?;
    }

    for n in 1..=steps {
        let step_reports = sim
            .step()
            .map_err(|e| anyhow::anyhow!("Solver error at step {}: {}", n, e))?;

        if n % 10 == 0 || n == 1 || n == steps {
            for r in &step_reports {
                println!(
                    "  [{}/{}] t={:.4} {}: rms={:.6e}, max={:.6e}",
                    n, steps, r.report.time, r.component, r.report.rms, r.report.max_abs
                );
            }
        }

        let non_finite = step_reports.iter().find(|r| !r.report.max_abs.is_finite());
        if let Some(r) = non_finite {
            anyhow::bail!(
                "Component '{}' diverged at step {} (check dt against the grid spacing)",
                r.component,
                n
            );
        }

        reports.extend(step_reports);
        if job.output.save_slices && (n % job.output.slice_every == 0 || n == steps) {
            take_slices(&sim, n, dims, &mut slices)?;
        }
    }

    let config = sim.solver().config().clone();
    Ok(SimulationOutput {
        config,
        device,
        reports,
        slices,
    })
}

/// Fall back to a single centred `phi` pulse when no component is configured.
fn resolve_components(components: &[ComponentConfig], config: &GridConfig) -> Vec<ComponentConfig> {
    if !components.is_empty() {
        return components.to_vec();
    }
    let (centre, width) = default_pulse(config);
    vec![ComponentConfig {
        name: "phi".into(),
        centre: Some(centre),
        width: Some(width),
        amplitude: 1.0,
        velocity: 0.0,
    }]
}

fn pulse_shape(component: &ComponentConfig, config: &GridConfig) -> ([f64; 3], f64) {
    let (centre, width) = default_pulse(config);
    (
        component.centre.unwrap_or(centre),
        component.width.unwrap_or(width),
    )
}

fn default_pulse(config: &GridConfig) -> ([f64; 3], f64) {
    let p = config.params();
    let centre = [
        0.5 * (p.x.start + p.x.stop),
        0.5 * (p.y.start + p.y.stop),
        0.5 * (p.z.start + p.z.stop),
    ];
    let shortest = [&p.x, &p.y, &p.z]
        .iter()
        .map(|a| (a.stop - a.start).abs())
        .fold(f64::INFINITY, f64::min);
    (centre, 0.1 * shortest)
}

fn take_slices(
    sim: &Simulation,
    step: usize,
    dims: [usize; 3],
    out: &mut Vec<SliceRecord>,
) -> Result<()> {
    for c in sim.components() {
        let plane = mid_plane(c.integrator().current(), dims)?;
        out.push(SliceRecord {
            component: c.name().to_string(),
            step,
            plane,
        });
    }
    Ok(())
}

/// Write per-step summaries to a CSV file with a metadata header.
pub fn write_summary_csv(output: &SimulationOutput, path: &Path) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;
    let config = &output.config;
    let [nx, ny, nz] = config.dims();
    let stability = config.stability();

    writeln!(file, "# MOLT wave solver: step summary")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# Grid: {}x{}x{}", nx, ny, nz)?;
    writeln!(
        file,
        "# dt: {}, time_order: {}, space_order: {}",
        config.dt(),
        u8::from(config.time_order()),
        config.space_order()
    )?;
    writeln!(
        file,
        "# alpha: {:.6e}, beta: {}",
        stability.alpha, stability.beta
    )?;
    writeln!(file, "# executor: {}", output.device)?;
    writeln!(file, "#")?;
    writeln!(file, "component,step,time,rms,max_abs")?;

    for r in &output.reports {
        writeln!(
            file,
            "{},{},{:.6e},{:.6e},{:.6e}",
            r.component, r.report.step, r.report.time, r.report.rms, r.report.max_abs
        )?;
    }

    println!("Summary written to: {}", path.display());
    Ok(())
}

/// Write the run summary to a JSON file.
pub fn write_summary_json(output: &SimulationOutput, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(&output.summary())
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Summary (JSON) written to: {}", path.display());
    Ok(())
}

/// Write a mid-plane slice to a CSV file, one row per node.
pub fn write_slice_csv(slice: &SliceRecord, config: &GridConfig, path: &Path) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let p = config.params();
    let [nx, ny, nz] = config.dims();
    let k = nz / 2;
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "# MOLT wave solver: mid-plane slice")?;
    writeln!(file, "# component: {}, step: {}", slice.component, slice.step)?;
    writeln!(file, "# Plane: z={} (k={}), {}x{} nodes", p.z.node(k), k, nx, ny)?;
    writeln!(file, "#")?;
    writeln!(file, "x,y,value")?;

    for ((j, i), value) in slice.plane.indexed_iter() {
        writeln!(file, "{:.6},{:.6},{:.6e}", p.x.node(i), p.y.node(j), value)?;
    }

    log::debug!("slice written to {}", path.display());
    Ok(())
}

/// File name for a slice, e.g. `slice_phi_0010.csv`.
pub fn slice_file_name(slice: &SliceRecord) -> String {
    format!("slice_{}_{:04}.csv", slice.component, slice.step)
}

/// Create a row executor from the execution settings.
///
/// - `"sequential"`: always process rows on the calling thread.
/// - `"pooled"`: a fixed worker pool, failing if it cannot be built.
/// - `"auto"` (default): a pooled executor if available, else sequential.
pub fn create_executor(execution: &ExecutionConfig) -> Result<Arc<dyn RowExecutor>> {
    match execution.backend.as_str() {
        "sequential" => {
            println!("Executor: sequential");
            Ok(Arc::new(molt_compute::SequentialExecutor::new()))
        }
        "pooled" => {
            #[cfg(feature = "pooled")]
            {
                let pool = build_pool(execution.threads)
                    .context("Pooled executor requested but could not be built")?;
                println!("Executor: {}", pool.device_info().name);
                Ok(Arc::new(pool))
            }
            #[cfg(not(feature = "pooled"))]
            {
                anyhow::bail!("Pooled executor requested but binary was built without --features pooled")
            }
        }
        other => {
            if other != "auto" {
                log::warn!("unrecognised executor '{}', using auto", other);
            }
            #[cfg(feature = "pooled")]
            {
                match build_pool(execution.threads) {
                    Ok(pool) => {
                        println!("Executor: {} (auto-detected)", pool.device_info().name);
                        return Ok(Arc::new(pool));
                    }
                    Err(e) => {
                        println!("Worker pool not available ({}), using sequential", e);
                    }
                }
            }
            Ok(Arc::new(molt_compute::SequentialExecutor::new()))
        }
    }
}

#[cfg(feature = "pooled")]
fn build_pool(threads: usize) -> Result<molt_compute::PooledExecutor, molt_compute::ComputeError> {
    if threads == 0 {
        molt_compute::PooledExecutor::new()
    } else {
        molt_compute::PooledExecutor::with_threads(threads)
    }
}
