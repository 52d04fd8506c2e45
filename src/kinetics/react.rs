//! Reversible bimolecular reaction A + B ⇌ AB.

use serde::Serialize;

use super::{ClampSite, Tick, Volume};
use crate::error::{check_rate, ConfigError};

/// Reversible binding reaction in count units
///
/// Δ = (k·Kf·A·B − Kb·AB)·dt, applied as A −= Δ, B −= Δ, AB += Δ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct React {
    /// Forward constant (N⁻¹·s⁻¹)
    pub kf: f64,
    /// Backward constant (s⁻¹)
    pub kb: f64,
}

impl React {
    pub fn new(kf: f64, kb: f64) -> Self {
        Self { kf, kb }
    }

    /// Forward constant given in μM⁻¹·s⁻¹ against the reference volume
    pub fn with_volume(kf_per_uM_sec: f64, vol: Volume, kb: f64) -> Self {
        Self {
            kf: kf_per_uM_sec / vol.quantity_per_uM(),
            kb,
        }
    }

    #[inline]
    pub fn step(&self, tick: &Tick<'_>, a: f64, b: f64, ab: f64) -> f64 {
        self.step_k(tick, 1.0, a, b, ab)
    }

    /// Step with a forward-rate multiplier (compartment volume ratio).
    ///
    /// The result never exceeds the smaller reactant when positive and never
    /// exceeds the complex when negative.
    pub fn step_k(&self, tick: &Tick<'_>, k: f64, a: f64, b: f64, ab: f64) -> f64 {
        let requested = (k * self.kf * a * b - self.kb * ab) * tick.dt;
        if requested > 0.0 {
            let limit = a.min(b).max(0.0);
            if requested > limit {
                tick.record(ClampSite::Reaction, requested, limit);
                return limit;
            }
        } else if requested < 0.0 {
            let limit = ab.max(0.0);
            if -requested > limit {
                tick.record(ClampSite::Reaction, requested, -limit);
                return -limit;
            }
        }
        requested
    }

    pub fn check(&self, name: &str) -> Result<(), ConfigError> {
        check_rate(&format!("{}.kf", name), self.kf)?;
        check_rate(&format!("{}.kb", name), self.kb)
    }
}

/// Scale the positive draws on one shared pool so their sum fits in `pool`.
///
/// Each draw was clamped against the pool on its own; together they may
/// still exceed it. Negative entries (releases back into the pool) are left
/// alone.
pub fn limit_shared(tick: &Tick<'_>, pool: f64, draws: &mut [f64]) {
    let total: f64 = draws.iter().filter(|&&d| d > 0.0).sum();
    let limit = pool.max(0.0);
    if total > limit {
        tick.record(ClampSite::Reaction, total, limit);
        let scale = limit / total;
        for d in draws.iter_mut().filter(|d| **d > 0.0) {
            *d *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinetics::{ClampMonitor, SpineGeometry};

    #[test]
    fn test_mass_conservation() {
        let monitor = ClampMonitor::default();
        let tick = Tick::new(5e-5, &monitor);
        let r = React::new(0.5, 3.0);
        for &(a, b, ab) in &[(10.0, 4.0, 1.0), (0.0, 3.0, 2.0), (7.0, 7.0, 0.0), (0.2, 0.1, 50.0)] {
            let d = r.step(&tick, a, b, ab);
            let (a2, b2, ab2) = (a - d, b - d, ab + d);
            assert!(((a2 + ab2) - (a + ab)).abs() < 1e-12);
            assert!(((b2 + ab2) - (b + ab)).abs() < 1e-12);
            assert!(a2 >= 0.0 && b2 >= 0.0 && ab2 >= 0.0);
        }
    }

    #[test]
    fn test_backward_clamp_is_exactly_complex() {
        let monitor = ClampMonitor::default();
        let tick = Tick::new(1e-3, &monitor);
        let r = React::new(0.0, 1e6);
        let ab = 3.25;
        let d = r.step(&tick, 1.0, 1.0, ab);
        assert_eq!(d, -ab);
        assert_eq!(ab + d, 0.0);
        assert_eq!(monitor.stats().reaction, 1);
    }

    #[test]
    fn test_forward_clamp_limited_by_smaller_reactant() {
        let monitor = ClampMonitor::default();
        let tick = Tick::new(1e-3, &monitor);
        let r = React::new(1e6, 0.0);
        let d = r.step(&tick, 5.0, 0.5, 0.0);
        assert_eq!(d, 0.5);
    }

    #[test]
    fn test_volume_scaled_forward_rate() {
        let geom = SpineGeometry::default();
        let r = React::with_volume(48.0, geom.cyt, 0.0);
        assert!((r.kf - 1.0).abs() < 1e-12);

        let monitor = ClampMonitor::default();
        let tick = Tick::new(1e-3, &monitor);
        let cyt = r.step_k(&tick, 1.0, 2.0, 2.0, 0.0);
        let psd = r.step_k(&tick, 4.0, 2.0, 2.0, 0.0);
        assert!((psd - 4.0 * cyt).abs() < 1e-12);
    }

    #[test]
    fn test_limit_shared_scales_combined_draw() {
        let monitor = ClampMonitor::default();
        let tick = Tick::new(1e-3, &monitor);
        let mut draws = [3.0, 1.0, -2.0];
        limit_shared(&tick, 2.0, &mut draws);
        assert!((draws[0] + draws[1] - 2.0).abs() < 1e-12);
        assert!((draws[0] - 3.0 * draws[1]).abs() < 1e-12);
        assert_eq!(draws[2], -2.0);
        assert_eq!(monitor.stats().reaction, 1);

        let mut fits = [0.5, 0.5];
        limit_shared(&tick, 2.0, &mut fits);
        assert_eq!(fits, [0.5, 0.5]);
        assert_eq!(monitor.stats().reaction, 1);
    }

    #[test]
    fn test_check_rejects_negative() {
        assert!(React::new(-1.0, 0.0).check("bad").is_err());
        assert!(React::new(0.0, f64::INFINITY).check("bad").is_err());
        assert!(React::new(0.0, 0.0).check("one_way").is_ok());
    }
}
