//! Path ensemble simulation
//!
//! Drives a [`ProcessStepper`] across a uniform time grid for many independent
//! paths. Runs can be sequential over a caller-owned sampler, or parallel with
//! one privately seeded sampler per path.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{validate_finite, validate_positive, Result, SimulationError};
use crate::process::{ProcessModel, ProcessStepper};
use crate::sampler::GaussianSampler;

/// One simulated trajectory, index-aligned with the run's [`TimeGrid`]
pub type Path = Vec<f64>;

/// All paths of one run
pub type PathEnsemble = Vec<Path>;

/// Uniform time grid t_i = i * T / n for i = 0..=n
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeGrid {
    points: Vec<f64>,
}

impl TimeGrid {
    /// Builds the grid; the last point is pinned to `horizon` exactly.
    pub fn new(horizon: f64, step_count: usize) -> Self {
        let dt = horizon / step_count as f64;
        let mut points: Vec<f64> = (0..=step_count).map(|i| i as f64 * dt).collect();
        if let Some(last) = points.last_mut() {
            *last = horizon;
        }
        Self { points }
    }

    /// Uniform step size
    pub fn dt(&self) -> f64 {
        let steps = self.step_count();
        if steps == 0 {
            return 0.0;
        }
        self.horizon() / steps as f64
    }

    /// Number of steps n (one less than the number of points)
    pub fn step_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Last grid point T
    pub fn horizon(&self) -> f64 {
        self.points.last().copied().unwrap_or(0.0)
    }

    /// Grid points in time order
    pub fn as_slice(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Validated inputs of one simulation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    path_count: usize,
    step_count: usize,
    initial_value: f64,
    horizon: f64,
    model: ProcessModel,
}

impl SimulationParameters {
    /// Validates and builds a parameter set
    ///
    /// # Arguments
    /// * `path_count` - Number of independent paths
    /// * `step_count` - Number of time steps per path
    /// * `initial_value` - Starting state shared by every path
    /// * `horizon` - Final time T in years
    /// * `model` - Process variant and its parameters
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidParameter`] when a count is zero,
    /// the horizon is not strictly positive, the step T / n underflows to a
    /// zero or subnormal value, or any float is non-finite.
    pub fn new(
        path_count: usize,
        step_count: usize,
        initial_value: f64,
        horizon: f64,
        model: ProcessModel,
    ) -> Result<Self> {
        if path_count == 0 {
            return Err(SimulationError::InvalidParameter {
                parameter: "paths",
                value: 0.0,
                constraint: "must be at least 1",
            });
        }
        if step_count == 0 {
            return Err(SimulationError::InvalidParameter {
                parameter: "steps",
                value: 0.0,
                constraint: "must be at least 1",
            });
        }
        validate_finite("initial_value", initial_value)?;
        validate_positive("horizon", horizon)?;

        // A subnormal step collapses neighbouring grid points onto each other
        let dt = horizon / step_count as f64;
        if !dt.is_normal() {
            return Err(SimulationError::InvalidParameter {
                parameter: "dt",
                value: dt,
                constraint: "horizon / steps must be a positive normal number",
            });
        }
        model.validate()?;

        Ok(Self {
            path_count,
            step_count,
            initial_value,
            horizon,
            model,
        })
    }

    /// Number of paths in the ensemble
    pub fn path_count(&self) -> usize {
        self.path_count
    }

    /// Number of steps per path
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Value at t = 0 of every path
    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    /// Final time T
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Process variant driving every path
    pub fn model(&self) -> &ProcessModel {
        &self.model
    }

    /// Time step T / n
    pub fn dt(&self) -> f64 {
        self.horizon / self.step_count as f64
    }
}

/// Output of a path simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedPaths {
    pub paths: PathEnsemble,
    #[serde(rename = "timePoints")]
    pub time_grid: TimeGrid,
}

/// Ensemble simulator for GBM and OU runs
#[derive(Debug, Clone, Copy)]
pub struct PathSimulator {
    params: SimulationParameters,
}

impl PathSimulator {
    /// Creates a simulator for an already validated parameter set
    ///
    /// # Example
    /// ```
    /// use derivrisk::{GbmParams, PathSimulator, ProcessModel, SimulationParameters};
    ///
    /// let params = SimulationParameters::new(
    ///     10,
    ///     50,
    ///     100.0,
    ///     1.0,
    ///     ProcessModel::Gbm(GbmParams::new(0.08, 0.2)),
    /// )
    /// .unwrap();
    /// let out = PathSimulator::new(params).simulate_parallel(42);
    /// assert_eq!(out.paths.len(), 10);
    /// ```
    pub fn new(params: SimulationParameters) -> Self {
        Self { params }
    }

    /// Parameters of the run
    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Simulates every path in order from one sampler
    ///
    /// Each step of each path consumes exactly one draw.
    #[instrument(skip_all, fields(model = self.params.model.name(), paths = self.params.path_count, steps = self.params.step_count))]
    pub fn simulate<R: Rng>(&self, sampler: &mut GaussianSampler<R>) -> SimulatedPaths {
        debug!("Starting sequential path simulation");
        let p = &self.params;
        let dt = p.dt();
        let paths = match p.model {
            ProcessModel::Gbm(gbm) => sequential_ensemble(&gbm.stepper(dt), p, sampler),
            ProcessModel::Ou(ou) => sequential_ensemble(&ou.stepper(dt), p, sampler),
        };

        SimulatedPaths {
            paths,
            time_grid: TimeGrid::new(p.horizon, p.step_count),
        }
    }

    /// Simulates paths in parallel
    ///
    /// Per-path seeds are drawn from `root_seed` up front, so the ensemble is
    /// reproducible for a given seed however rayon schedules the work.
    #[instrument(skip_all, fields(model = self.params.model.name(), paths = self.params.path_count, steps = self.params.step_count))]
    pub fn simulate_parallel(&self, root_seed: u64) -> SimulatedPaths {
        debug!(root_seed, "Starting parallel path simulation");
        let p = &self.params;
        let dt = p.dt();
        let paths = match p.model {
            ProcessModel::Gbm(gbm) => parallel_ensemble(&gbm.stepper(dt), p, root_seed),
            ProcessModel::Ou(ou) => parallel_ensemble(&ou.stepper(dt), p, root_seed),
        };

        SimulatedPaths {
            paths,
            time_grid: TimeGrid::new(p.horizon, p.step_count),
        }
    }
}

/// Generates a single path of `n_steps` steps starting from `initial`
///
/// # Arguments
/// * `stepper` - One-step transition of the process
/// * `initial` - State at t = 0
/// * `n_steps` - Number of time steps
/// * `sampler` - Source of one normal draw per step
///
/// # Returns
/// Vector of `n_steps + 1` states, starting with `initial`
pub fn generate_path<S, R>(
    stepper: &S,
    initial: f64,
    n_steps: usize,
    sampler: &mut GaussianSampler<R>,
) -> Path
where
    S: ProcessStepper + ?Sized,
    R: Rng,
{
    let mut path = Vec::with_capacity(n_steps + 1);
    path.push(initial);

    let mut current = initial;
    for _ in 0..n_steps {
        current = stepper.step(current, sampler.sample());
        path.push(current);
    }

    path
}

fn sequential_ensemble<S: ProcessStepper, R: Rng>(
    stepper: &S,
    params: &SimulationParameters,
    sampler: &mut GaussianSampler<R>,
) -> PathEnsemble {
    (0..params.path_count)
        .map(|_| generate_path(stepper, params.initial_value, params.step_count, sampler))
        .collect()
}

fn parallel_ensemble<S: ProcessStepper + Sync>(
    stepper: &S,
    params: &SimulationParameters,
    root_seed: u64,
) -> PathEnsemble {
    let mut root = StdRng::seed_from_u64(root_seed);
    let seeds: Vec<u64> = (0..params.path_count).map(|_| root.gen()).collect();

    seeds
        .into_par_iter()
        .map(|seed| {
            let mut sampler = GaussianSampler::from_seed(seed);
            generate_path(stepper, params.initial_value, params.step_count, &mut sampler)
        })
        .collect()
}
