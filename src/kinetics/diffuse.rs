//! Transport between two compartments.

use serde::Serialize;

use super::{ClampSite, Tick, Volume};
use crate::error::{check_rate, ConfigError};

/// Diffusion between compartments A and B
///
/// Flux A → B = (Kf·[A] − Kb·[B])·dt with concentrations taken from counts and
/// volumes, so molecule count is conserved exactly and equal concentrations
/// give zero net flux when Kf = Kb.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Diffuse {
    /// A → B constant (N·s⁻¹ per μM)
    pub kf: f64,
    /// B → A constant
    pub kb: f64,
}

impl Diffuse {
    pub fn new(kf: f64, kb: f64) -> Self {
        Self { kf, kb }
    }

    pub fn symmetric(k: f64) -> Self {
        Self { kf: k, kb: k }
    }

    /// Returns (ΔA, ΔB).
    pub fn step(&self, tick: &Tick<'_>, na: f64, nb: f64, va: Volume, vb: Volume) -> (f64, f64) {
        let requested =
            (self.kf * na / va.quantity_per_uM() - self.kb * nb / vb.quantity_per_uM()) * tick.dt;
        let flux = if requested > na.max(0.0) {
            tick.record(ClampSite::Diffusion, requested, na.max(0.0));
            na.max(0.0)
        } else if -requested > nb.max(0.0) {
            tick.record(ClampSite::Diffusion, requested, -nb.max(0.0));
            -nb.max(0.0)
        } else {
            requested
        };
        (-flux, flux)
    }

    pub fn check(&self, name: &str) -> Result<(), ConfigError> {
        check_rate(&format!("{}.kf", name), self.kf)?;
        check_rate(&format!("{}.kb", name), self.kb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinetics::{ClampMonitor, SpineGeometry};

    #[test]
    fn test_equal_concentrations_no_flux() {
        let geom = SpineGeometry::default();
        let monitor = ClampMonitor::default();
        let tick = Tick::new(5e-5, &monitor);
        let d = Diffuse::symmetric(130.0 / 0.0225);
        // 2.5 μM in both compartments
        let (da, db) = d.step(&tick, 2.5 * 48.0, 2.5 * 12.0, geom.cyt, geom.psd);
        assert!(da.abs() < 1e-12, "cyt delta {}", da);
        assert!(db.abs() < 1e-12, "psd delta {}", db);
    }

    #[test]
    fn test_flux_conserves_count_and_follows_gradient() {
        let geom = SpineGeometry::default();
        let monitor = ClampMonitor::default();
        let tick = Tick::new(5e-5, &monitor);
        let d = Diffuse::symmetric(6.0 / 0.0225);
        let (da, db) = d.step(&tick, 96.0, 0.0, geom.cyt, geom.psd);
        assert!(da < 0.0 && db > 0.0);
        assert!((da + db).abs() < 1e-15);
    }

    #[test]
    fn test_asymmetric_equilibrium() {
        // Kf = 2·Kb: equilibrium at [B] = 2·[A]
        let geom = SpineGeometry::default();
        let monitor = ClampMonitor::default();
        let tick = Tick::new(1e-3, &monitor);
        let d = Diffuse::new(2.0, 1.0);
        let (da, db) = d.step(&tick, 1.0 * 48.0, 2.0 * 12.0, geom.cyt, geom.psd);
        assert!(da.abs() < 1e-12 && db.abs() < 1e-12);
    }

    #[test]
    fn test_flux_clamped_to_source() {
        let geom = SpineGeometry::default();
        let monitor = ClampMonitor::default();
        let tick = Tick::new(1.0, &monitor);
        let d = Diffuse::symmetric(1e6);
        let (da, db) = d.step(&tick, 10.0, 0.0, geom.cyt, geom.psd);
        assert_eq!(da, -10.0);
        assert_eq!(db, 10.0);
        assert_eq!(monitor.stats().diffusion, 1);
    }
}
