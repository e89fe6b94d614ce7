//! Request records and the three simulation operations
//!
//! Requests carry raw caller values with the service defaults filled in.
//! Counts are signed so that zero or negative inputs reach validation and are
//! rejected with a descriptive error instead of failing to parse.

use serde::Deserialize;
use tracing::info;

use crate::config::EngineSettings;
use crate::error::{validate_count, Result, SimulationError};
use crate::fx_forward::{
    FxForwardEngine, FxForwardResult, FxModelKind, FxSimulationParameters, FxSpotModel,
};
use crate::process::{GbmParams, OuParams, ProcessModel};
use crate::sampler::GaussianSampler;
use crate::simulation::{PathSimulator, SimulatedPaths, SimulationParameters};

pub const DEFAULT_PATHS: i64 = 100;
pub const DEFAULT_STEPS: i64 = 200;
pub const DEFAULT_HORIZON: f64 = 1.0;

/// Validates raw path and step counts against the engine limits
///
/// # Returns
/// The `(paths, steps)` pair as unsigned counts
///
/// # Errors
/// [`SimulationError::InvalidParameter`] when either count is below one, above
/// its configured maximum, or when the ensemble would hold more than
/// `max_path_points` values.
pub fn validate_counts(paths: i64, steps: i64, limits: &EngineSettings) -> Result<(usize, usize)> {
    let path_count = validate_count("paths", paths, limits.max_paths)?;
    let step_count = validate_count("steps", steps, limits.max_steps)?;

    let points = path_count.checked_mul(step_count + 1);
    if points.map_or(true, |n| n > limits.max_path_points) {
        return Err(SimulationError::InvalidParameter {
            parameter: "paths",
            value: path_count as f64,
            constraint: "paths * (steps + 1) exceeds the configured maximum",
        });
    }
    Ok((path_count, step_count))
}

/// GBM request: `paths, steps, s0, mu, sigma, t`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GbmRequest {
    pub paths: i64,
    pub steps: i64,
    pub s0: f64,
    pub mu: f64,
    pub sigma: f64,
    pub t: f64,
}

impl Default for GbmRequest {
    fn default() -> Self {
        Self {
            paths: DEFAULT_PATHS,
            steps: DEFAULT_STEPS,
            s0: 100.0,
            mu: 0.08,
            sigma: 0.20,
            t: DEFAULT_HORIZON,
        }
    }
}

impl GbmRequest {
    /// Validates the request against `limits` and builds the run parameters
    pub fn into_parameters(&self, limits: &EngineSettings) -> Result<SimulationParameters> {
        let (path_count, step_count) = validate_counts(self.paths, self.steps, limits)?;
        SimulationParameters::new(
            path_count,
            step_count,
            self.s0,
            self.t,
            ProcessModel::Gbm(GbmParams::new(self.mu, self.sigma)),
        )
    }
}

/// OU request: `paths, steps, x0, kappa, theta, sigma, t`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OuRequest {
    pub paths: i64,
    pub steps: i64,
    pub x0: f64,
    pub kappa: f64,
    pub theta: f64,
    pub sigma: f64,
    pub t: f64,
}

impl Default for OuRequest {
    fn default() -> Self {
        Self {
            paths: DEFAULT_PATHS,
            steps: DEFAULT_STEPS,
            x0: 1.0,
            kappa: 3.0,
            theta: 1.0,
            sigma: 0.15,
            t: DEFAULT_HORIZON,
        }
    }
}

impl OuRequest {
    /// Validates the request against `limits` and builds the run parameters
    pub fn into_parameters(&self, limits: &EngineSettings) -> Result<SimulationParameters> {
        let (path_count, step_count) = validate_counts(self.paths, self.steps, limits)?;
        SimulationParameters::new(
            path_count,
            step_count,
            self.x0,
            self.t,
            ProcessModel::Ou(OuParams::new(self.kappa, self.theta, self.sigma)),
        )
    }
}

/// FX forward request
///
/// `sigma_gbm` is used when `model` is `gbm`; `kappa`, `theta` and `sigma_ou`
/// when it is `ou`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FxForwardRequest {
    pub model: String,
    pub paths: i64,
    pub steps: i64,
    pub spot: f64,
    pub maturity: f64,
    pub r_dom: f64,
    pub r_for: f64,
    pub kappa: f64,
    pub theta: f64,
    pub sigma_ou: f64,
    pub sigma_gbm: f64,
}

impl Default for FxForwardRequest {
    fn default() -> Self {
        Self {
            model: "gbm".to_string(),
            paths: DEFAULT_PATHS,
            steps: DEFAULT_STEPS,
            spot: 1.10,
            maturity: DEFAULT_HORIZON,
            r_dom: 0.03,
            r_for: 0.01,
            kappa: 3.0,
            theta: 1.10,
            sigma_ou: 0.12,
            sigma_gbm: 0.15,
        }
    }
}

impl FxForwardRequest {
    /// Checks counts and the model selector and builds the FX parameters
    ///
    /// Rates, spot and maturity are validated once, by [`FxForwardEngine::new`].
    pub fn into_parameters(&self, limits: &EngineSettings) -> Result<FxSimulationParameters> {
        let (path_count, step_count) = validate_counts(self.paths, self.steps, limits)?;
        let model = match self.model.parse::<FxModelKind>()? {
            FxModelKind::Gbm => FxSpotModel::Gbm {
                volatility: self.sigma_gbm,
            },
            FxModelKind::Ou => FxSpotModel::Ou(OuParams::new(self.kappa, self.theta, self.sigma_ou)),
        };

        Ok(FxSimulationParameters {
            path_count,
            step_count,
            spot: self.spot,
            horizon: self.maturity,
            domestic_rate: self.r_dom,
            foreign_rate: self.r_for,
            model,
        })
    }
}

/// Entry point used by the request layer
///
/// Every call gets its own randomness: the configured seed when one is set,
/// otherwise a fresh seed from OS entropy.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    settings: EngineSettings,
}

impl Simulator {
    /// Creates a simulator with the given engine settings
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    /// Engine settings in effect
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// GBM paths and time points
    pub fn simulate_gbm(&self, request: &GbmRequest) -> Result<SimulatedPaths> {
        let params = request.into_parameters(&self.settings)?;
        Ok(self.run_paths(PathSimulator::new(params)))
    }

    /// OU paths and time points
    pub fn simulate_ou(&self, request: &OuRequest) -> Result<SimulatedPaths> {
        let params = request.into_parameters(&self.settings)?;
        Ok(self.run_paths(PathSimulator::new(params)))
    }

    /// FX spot and PV ensembles with their statistics
    pub fn simulate_fx_forward(&self, request: &FxForwardRequest) -> Result<FxForwardResult> {
        let engine = FxForwardEngine::new(request.into_parameters(&self.settings)?)?;
        let seed = self.run_seed();
        info!(
            model = %request.model,
            paths = request.paths,
            steps = request.steps,
            seed,
            "Running FX forward simulation"
        );

        Ok(if self.settings.parallel {
            engine.simulate_forward_parallel(seed)
        } else {
            engine.simulate_forward(&mut GaussianSampler::from_seed(seed))
        })
    }

    fn run_paths(&self, simulator: PathSimulator) -> SimulatedPaths {
        let seed = self.run_seed();
        info!(
            model = simulator.params().model().name(),
            paths = simulator.params().path_count(),
            steps = simulator.params().step_count(),
            seed,
            "Running path simulation"
        );

        if self.settings.parallel {
            simulator.simulate_parallel(seed)
        } else {
            simulator.simulate(&mut GaussianSampler::from_seed(seed))
        }
    }

    fn run_seed(&self) -> u64 {
        self.settings.seed.unwrap_or_else(rand::random)
    }
}
