//! # Derivatives Risk Path Simulation
//!
//! Monte Carlo engine behind exposure profiles for simple derivatives: sample
//! paths of geometric Brownian motion and Ornstein–Uhlenbeck processes, FX
//! forward present values along those paths, and per-time-step summaries.
//!
//! ## Modules
//!
//! - [`sampler`] - Box–Muller standard normal sampler
//! - [`process`] - GBM and OU one-step transitions
//! - [`simulation`] - Path ensembles over a uniform time grid
//! - [`fx_forward`] - FX forward PV along simulated spot paths
//! - [`stats`] - Mean and 5th/95th percentile per time step
//! - [`api`] - Request records with service defaults
//! - [`config`] - Engine and logging settings
//!
//! ## Example
//!
//! ```rust
//! use derivrisk::{GaussianSampler, GbmParams, PathSimulator, ProcessModel, SimulationParameters};
//!
//! let params = SimulationParameters::new(
//!     100,
//!     252,
//!     100.0,
//!     1.0,
//!     ProcessModel::Gbm(GbmParams::new(0.08, 0.2)),
//! )
//! .unwrap();
//!
//! let mut sampler = GaussianSampler::from_seed(42);
//! let out = PathSimulator::new(params).simulate(&mut sampler);
//! assert_eq!(out.paths[0].len(), 253);
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod fx_forward;
pub mod process;
pub mod sampler;
pub mod simulation;
pub mod stats;

pub use api::{FxForwardRequest, GbmRequest, OuRequest, Simulator};
pub use error::{Result, SimulationError};
pub use fx_forward::{FxForwardEngine, FxForwardResult, FxModelKind, FxSimulationParameters, FxSpotModel};
pub use process::{GbmParams, OuParams, ProcessModel, ProcessStepper};
pub use sampler::GaussianSampler;
pub use simulation::{Path, PathEnsemble, PathSimulator, SimulatedPaths, SimulationParameters, TimeGrid};
pub use stats::{StatsAggregator, StatsPoint, StatsSeries};
