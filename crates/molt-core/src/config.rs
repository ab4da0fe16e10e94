//! Grid configuration and derived stability constants.
//!
//! [`GridParams`] is the raw, serialisable description of a run. It is turned
//! into a validated [`GridConfig`] once, before the first step; everything the
//! solver reads afterwards comes from the validated form and is never mutated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Axis, Dims};

/// Highest supported spatial interpolation order.
pub const MAX_SPACE_ORDER: usize = 3;

/// Errors detected while building a configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Unsupported time order {0} (expected 1, 2 or 3)")]
    UnsupportedTimeOrder(u8),

    #[error("Unsupported space order {0} (expected 1..={max})", max = MAX_SPACE_ORDER)]
    UnsupportedSpaceOrder(usize),

    #[error("Axis {axis}: step must be positive and finite, got {step}")]
    InvalidStep { axis: &'static str, step: f64 },

    #[error("Axis {axis}: stop ({stop}) must be greater than start ({start})")]
    EmptyAxis {
        axis: &'static str,
        start: f64,
        stop: f64,
    },

    #[error("Axis {axis}: {points} intervals is fewer than the {required} the stencil needs")]
    TooFewPoints {
        axis: &'static str,
        points: usize,
        required: usize,
    },

    #[error("Scale factor must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("Wave speed must be positive and finite, got {0}")]
    InvalidWaveSpeed(f64),

    #[error("Axis {axis}: boundary weight minimum {d_n} is outside (-1, 1)")]
    BoundaryWeight { axis: &'static str, d_n: f64 },

    #[error("Axis {axis}: decay per interval must be positive and finite, got {nu}")]
    InvalidDecay { axis: &'static str, nu: f64 },

    #[error("Mesh of {dims:?} nodes does not fit in memory addressing")]
    MeshTooLarge { dims: Dims },
}

/// Start, stop and step along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl AxisSpec {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// Axis with `intervals` unit-spaced intervals starting at zero.
    pub fn unit(intervals: usize) -> Self {
        Self::new(0.0, intervals as f64, 1.0)
    }

    /// Number of intervals (exclusive point count).
    pub fn points(&self) -> usize {
        ((self.stop - self.start) / self.step).round() as usize
    }

    /// Number of grid nodes including both boundaries.
    pub fn points_inclusive(&self) -> usize {
        self.points() + 1
    }

    /// Coordinate of node `i`.
    pub fn node(&self, i: usize) -> f64 {
        self.start + i as f64 * self.step
    }

    fn validate(&self, axis: &'static str) -> Result<(), ConfigError> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(ConfigError::InvalidStep {
                axis,
                step: self.step,
            });
        }
        if !(self.stop > self.start) || self.points() == 0 {
            return Err(ConfigError::EmptyAxis {
                axis,
                start: self.start,
                stop: self.stop,
            });
        }
        Ok(())
    }
}

/// Number of correction terms applied by the time integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TimeOrder {
    First,
    Second,
    Third,
}

impl TimeOrder {
    /// Stability constant for this order.
    pub fn beta(self) -> f64 {
        match self {
            TimeOrder::First => 2.0,
            TimeOrder::Second => 1.4657,
            TimeOrder::Third => 1.2225,
        }
    }
}

impl TryFrom<u8> for TimeOrder {
    type Error = ConfigError;

    fn try_from(order: u8) -> Result<Self, Self::Error> {
        match order {
            1 => Ok(TimeOrder::First),
            2 => Ok(TimeOrder::Second),
            3 => Ok(TimeOrder::Third),
            other => Err(ConfigError::UnsupportedTimeOrder(other)),
        }
    }
}

impl From<TimeOrder> for u8 {
    fn from(order: TimeOrder) -> u8 {
        match order {
            TimeOrder::First => 1,
            TimeOrder::Second => 2,
            TimeOrder::Third => 3,
        }
    }
}

/// Shape of the boundary-weight vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightProfile {
    /// `v_left` decays away from the left boundary and `v_right` away from
    /// the right boundary.
    #[default]
    DistanceDependent,
    /// `v_right` is a copy of `v_left`. The boundary correction then shifts
    /// the row by a single decaying profile and does not pin either endpoint.
    Uniform,
}

/// Raw description of a run, as read from a job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    pub x: AxisSpec,
    pub y: AxisSpec,
    pub z: AxisSpec,
    pub t: AxisSpec,
    #[serde(default = "default_space_order")]
    pub space_order: usize,
    #[serde(default = "default_time_order")]
    pub time_order: TimeOrder,
    /// Physical length of one grid unit.
    #[serde(default = "default_one")]
    pub scale: f64,
    #[serde(default = "default_one")]
    pub wave_speed: f64,
    #[serde(default)]
    pub weight_profile: WeightProfile,
    /// Dirichlet targets `[left, right]` per axis `[x, y, z]`.
    #[serde(default)]
    pub boundary: [[f64; 2]; 3],
}

fn default_space_order() -> usize {
    1
}
fn default_time_order() -> TimeOrder {
    TimeOrder::First
}
fn default_one() -> f64 {
    1.0
}

impl GridParams {
    /// Unit-spaced cube with `intervals` intervals per axis and `steps` time
    /// steps of size `dt`.
    pub fn cube(intervals: usize, steps: usize, dt: f64) -> Self {
        Self {
            x: AxisSpec::unit(intervals),
            y: AxisSpec::unit(intervals),
            z: AxisSpec::unit(intervals),
            t: AxisSpec::new(0.0, steps as f64 * dt, dt),
            space_order: default_space_order(),
            time_order: default_time_order(),
            scale: 1.0,
            wave_speed: 1.0,
            weight_profile: WeightProfile::default(),
            boundary: [[0.0; 2]; 3],
        }
    }

    pub fn axis(&self, axis: Axis) -> &AxisSpec {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Constants derived from the time order, wave speed and time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stability {
    pub alpha: f64,
    pub beta: f64,
    pub beta2: f64,
    pub beta4_12: f64,
    pub beta6_360: f64,
}

impl Stability {
    pub fn new(order: TimeOrder, wave_speed: f64, dt: f64) -> Self {
        let beta = order.beta();
        let beta2 = beta * beta;
        Self {
            alpha: beta / (wave_speed * dt),
            beta,
            beta2,
            beta4_12: beta2 * beta2 / 12.0,
            beta6_360: beta2 * beta2 * beta2 / 360.0,
        }
    }
}

/// Validated, immutable grid configuration.
///
/// Every check that depends only on the parameters happens here, including
/// the mesh size and the per-axis boundary weights, so a solver built from a
/// `GridConfig` can only fail for lack of memory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridConfig {
    params: GridParams,
    dims: Dims,
    mesh_len: usize,
    stability: Stability,
}

impl GridConfig {
    /// Validate `params` and derive the stability constants.
    pub fn new(params: GridParams) -> Result<Self, ConfigError> {
        params.x.validate("x")?;
        params.y.validate("y")?;
        params.z.validate("z")?;
        params.t.validate("t")?;

        if !(1..=MAX_SPACE_ORDER).contains(&params.space_order) {
            return Err(ConfigError::UnsupportedSpaceOrder(params.space_order));
        }
        if !(params.scale.is_finite() && params.scale > 0.0) {
            return Err(ConfigError::InvalidScale(params.scale));
        }
        if !(params.wave_speed.is_finite() && params.wave_speed > 0.0) {
            return Err(ConfigError::InvalidWaveSpeed(params.wave_speed));
        }
        for axis in Axis::ALL {
            let points = params.axis(axis).points();
            if points < params.space_order {
                return Err(ConfigError::TooFewPoints {
                    axis: axis.name(),
                    points,
                    required: params.space_order,
                });
            }
        }

        let dims = Axis::ALL.map(|axis| params.axis(axis).points_inclusive());
        let mesh_len = dims
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .filter(|len| {
                len.checked_mul(std::mem::size_of::<f64>())
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or(ConfigError::MeshTooLarge { dims })?;

        let stability = Stability::new(params.time_order, params.wave_speed, params.t.step);
        for axis in Axis::ALL {
            let spec = params.axis(axis);
            let nu = stability.alpha * spec.step * params.scale;
            if !(nu.is_finite() && nu > 0.0) {
                return Err(ConfigError::InvalidDecay {
                    axis: axis.name(),
                    nu,
                });
            }
            // v_left decays monotonically, so its minimum sits at the right end.
            let d_n = (-nu * spec.points() as f64).exp();
            if !(d_n > -1.0 && d_n < 1.0) {
                return Err(ConfigError::BoundaryWeight {
                    axis: axis.name(),
                    d_n,
                });
            }
        }

        Ok(Self {
            params,
            dims,
            mesh_len,
            stability,
        })
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    pub fn axis(&self, axis: Axis) -> &AxisSpec {
        self.params.axis(axis)
    }

    /// Inclusive node counts `[x, y, z]`.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Number of values in one mesh.
    pub fn mesh_len(&self) -> usize {
        self.mesh_len
    }

    pub fn stability(&self) -> &Stability {
        &self.stability
    }

    pub fn time_order(&self) -> TimeOrder {
        self.params.time_order
    }

    pub fn space_order(&self) -> usize {
        self.params.space_order
    }

    pub fn dt(&self) -> f64 {
        self.params.t.step
    }

    /// Number of time steps spanned by the t axis.
    pub fn steps(&self) -> usize {
        self.params.t.points()
    }

    /// Dirichlet targets `[left, right]` for `axis`.
    pub fn boundary(&self, axis: Axis) -> [f64; 2] {
        self.params.boundary[axis.index()]
    }
}
