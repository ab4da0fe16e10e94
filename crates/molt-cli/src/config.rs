//! TOML configuration deserialisation for simulation jobs.

use std::collections::HashSet;

use serde::Deserialize;

use molt_core::GridParams;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub grid: GridParams,
    /// Field components to advance. Defaults to a single centred `phi` pulse.
    #[serde(default, rename = "component")]
    pub components: Vec<ComponentConfig>,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Initial condition for one field component: a Gaussian pulse for the field
/// and a scaled copy of it for the time derivative.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    /// Pulse centre; defaults to the centre of the domain.
    #[serde(default)]
    pub centre: Option<[f64; 3]>,
    /// Pulse width; defaults to a tenth of the shortest axis.
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    /// Initial velocity is `velocity * pulse`.
    #[serde(default)]
    pub velocity: f64,
}

fn default_amplitude() -> f64 {
    1.0
}

/// Row executor selection.
#[derive(Debug, Deserialize)]
pub struct ExecutionConfig {
    /// Row executor: "auto", "sequential", or "pooled". Default: "auto".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Worker count for the pooled executor; 0 uses every core.
    #[serde(default)]
    pub threads: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            threads: 0,
        }
    }
}

fn default_backend() -> String {
    "auto".into()
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save per-step summaries as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_summary: bool,
    /// Whether to also save the run summary as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
    /// Whether to save mid-plane slices of each component (default: false).
    #[serde(default)]
    pub save_slices: bool,
    /// Slice every N steps; the final step is always sliced (default: 10).
    #[serde(default = "default_slice_every")]
    pub slice_every: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_summary: true,
            save_json: false,
            save_slices: false,
            slice_every: default_slice_every(),
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}
fn default_slice_every() -> usize {
    10
}

impl JobConfig {
    /// Checks that do not need the grid to be built.
    pub fn check(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for c in &self.components {
            if !seen.insert(c.name.as_str()) {
                anyhow::bail!("Component '{}' is defined more than once", c.name);
            }
            if let Some(w) = c.width {
                if !(w.is_finite() && w > 0.0) {
                    anyhow::bail!("Component '{}': width must be positive, got {}", c.name, w);
                }
            }
        }
        if self.output.slice_every == 0 {
            anyhow::bail!("output.slice_every must be at least 1");
        }
        Ok(())
    }
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: JobConfig = toml::from_str(&content)?;
    config.check()?;
    Ok(config)
}
