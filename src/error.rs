//! Error types for simulation requests
//!
//! Parameter problems are reported before any path is drawn. Numeric
//! blow-ups during a run (NaN or infinite states) are not errors: they
//! flow through the ensembles as data.

use thiserror::Error;

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors raised while building or configuring a simulation run
#[derive(Error, Debug)]
pub enum SimulationError {
    /// A parameter violates its domain constraint
    #[error("Invalid parameter `{parameter}` = {value}: {constraint}")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// The spot model selector is neither `gbm` nor `ou`
    #[error("Unknown model `{0}`, expected `gbm` or `ou`")]
    UnknownModel(String),

    /// Settings could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Checks that a caller-supplied count (paths or steps) lies in `1..=max`.
pub fn validate_count(parameter: &'static str, value: i64, max: usize) -> Result<usize> {
    if value < 1 {
        return Err(SimulationError::InvalidParameter {
            parameter,
            value: value as f64,
            constraint: "must be at least 1",
        });
    }
    match usize::try_from(value) {
        Ok(count) if count <= max => Ok(count),
        _ => Err(SimulationError::InvalidParameter {
            parameter,
            value: value as f64,
            constraint: "exceeds the configured maximum",
        }),
    }
}

/// Checks that a value is finite and strictly positive.
pub fn validate_positive(parameter: &'static str, value: f64) -> Result<f64> {
    if !(value.is_finite() && value > 0.0) {
        return Err(SimulationError::InvalidParameter {
            parameter,
            value,
            constraint: "must be finite and strictly positive",
        });
    }
    Ok(value)
}

/// Checks that a value is finite.
pub fn validate_finite(parameter: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(SimulationError::InvalidParameter {
            parameter,
            value,
            constraint: "must be finite",
        });
    }
    Ok(value)
}
