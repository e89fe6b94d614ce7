//! Engine and logging settings

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

/// Application settings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Loads settings from files and the environment
    ///
    /// Later sources override earlier ones:
    /// 1. `config/default.toml`
    /// 2. `config/{DERIVRISK_ENV}.toml` (defaults to `development`)
    /// 3. `DERIVRISK__*` environment variables, e.g. `DERIVRISK__ENGINE__SEED=42`
    pub fn load() -> Result<Self> {
        let env = std::env::var("DERIVRISK_ENV").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("DERIVRISK").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Simulation engine settings
#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    /// Simulate paths on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Fixed root seed; every run draws fresh entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
    /// Largest accepted path count per request
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
    /// Largest accepted step count per request
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Largest accepted `paths * (steps + 1)` per request
    #[serde(default = "default_max_path_points")]
    pub max_path_points: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            seed: None,
            max_paths: default_max_paths(),
            max_steps: default_max_steps(),
            max_path_points: default_max_path_points(),
        }
    }
}

fn default_parallel() -> bool {
    true
}

fn default_max_paths() -> usize {
    100_000
}

fn default_max_steps() -> usize {
    10_000
}

fn default_max_path_points() -> usize {
    20_000_000 // 160 MB of f64 per ensemble
}

/// Logging settings
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// Fallback filter when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
