//! Per-run simulation configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::kinetics::{ClampPolicy, SpineGeometry};

/// Initial quantities applied at construction and on re-init
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitPolicy {
    /// Total amounts only, everything unbound and unphosphorylated
    Fresh,
    /// Pre-equilibrated resting state (20 s at rest from `Fresh`)
    #[default]
    Baseline,
}

/// Simulation configuration, fixed for the lifetime of a spine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fresh or pre-equilibrated initial values
    pub init: InitPolicy,

    /// Include the DAPK1 module (competes with CaMKII for GluN2B)
    pub use_dapk1: bool,

    /// Explicit Euler ticks per 1 ms step
    /// Calcium buffering runs at ~1e4 s⁻¹, so ticks must stay well under 100 μs.
    pub substeps: u32,

    /// Upper bound on the NMDAR gating sub-step (s)
    pub nmdar_substep_sec: f64,

    /// Cytosol volume (fL)
    pub cyt_volume_fL: f64,

    /// PSD volume (fL)
    pub psd_volume_fL: f64,

    /// Clamp event handling
    pub clamp_policy: ClampPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            init: InitPolicy::Baseline,
            use_dapk1: false,
            substeps: 20,
            nmdar_substep_sec: 3e-5,
            cyt_volume_fL: 0.08,
            psd_volume_fL: 0.02,
            clamp_policy: ClampPolicy::Silent,
        }
    }
}

impl SimConfig {
    /// Validate and build the compartment geometry
    pub fn geometry(&self) -> Result<SpineGeometry, ConfigError> {
        SpineGeometry::new(self.cyt_volume_fL, self.psd_volume_fL)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry()?;
        if self.substeps == 0 {
            return Err(ConfigError::NoSubsteps);
        }
        if !(self.nmdar_substep_sec.is_finite() && self.nmdar_substep_sec > 0.0) {
            return Err(ConfigError::InvalidNmdarSubstep(self.nmdar_substep_sec));
        }
        Ok(())
    }

    /// Integration tick (s)
    pub fn tick_sec(&self) -> f64 {
        crate::STEP_SEC / f64::from(self.substeps.max(1))
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from a JSON file, failing on missing or malformed input
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded simulation config from {:?}", path);
        Ok(config)
    }

    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    log::info!("Loaded simulation config from {:?}", path.as_ref());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse simulation config: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Simulation config file not found, using defaults");
                Self::default()
            }
        }
    }
}
