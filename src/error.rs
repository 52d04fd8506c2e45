//! Configuration errors.
//!
//! The integration loop itself never fails: out-of-range results are clamped
//! and counted (see [`crate::kinetics::ClampMonitor`]). Everything that can be
//! wrong with a simulation is caught here, at construction.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid simulation configuration or parameter set
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("compartment volume must be positive and finite, got {0} fL")]
    NonPositiveVolume(f64),

    #[error("integration substeps per 1 ms step must be at least 1")]
    NoSubsteps,

    #[error("NMDAR sub-step must be positive and finite, got {0} s")]
    InvalidNmdarSubstep(f64),

    #[error("rate constant {name} must be finite and non-negative, got {value}")]
    InvalidRate { name: String, value: f64 },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reject negative or non-finite constants.
///
/// Zero is accepted: several reactions in the model are deliberately one-way.
pub(crate) fn check_rate(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRate {
            name: name.to_string(),
            value,
        })
    }
}
