//! Soft clamp toward a fixed target (unmodeled reservoir).

use serde::Serialize;

use super::{to_quantity, Tick, Volume};
use crate::error::{check_rate, ConfigError};

/// Relaxes a quantity toward `target` at rate `k`
///
/// Not mass conserving: the difference comes from or goes to a reservoir
/// outside the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Buffer {
    /// Relaxation rate (s⁻¹)
    pub k: f64,
    /// Target quantity (N)
    pub target: f64,
}

impl Buffer {
    pub fn new(k: f64, target: f64) -> Self {
        Self { k, target }
    }

    /// Target given as a concentration (μM) in `vol`
    pub fn with_target(k: f64, target_uM: f64, vol: Volume) -> Self {
        Self {
            k,
            target: to_quantity(target_uM, vol),
        }
    }

    /// Fraction of the gap closed per tick, capped at 1
    #[inline]
    pub fn fraction(&self, dt: f64) -> f64 {
        (self.k * dt).min(1.0)
    }

    #[inline]
    pub fn step(&self, tick: &Tick<'_>, n: f64) -> f64 {
        self.fraction(tick.dt) * (self.target - n)
    }

    pub fn check(&self, name: &str) -> Result<(), ConfigError> {
        check_rate(&format!("{}.k", name), self.k)?;
        check_rate(&format!("{}.target", name), self.target)
    }
}
