//! Michaelis-Menten enzyme S + E ⇌ SE → P + E in closed form.
//!
//! The enzyme-substrate complex is not tracked: the quasi-steady-state rate
//! v = K3·E·S / (Km + S) is applied directly to substrate and product.
//!
//! Reference: Segel IH. Enzyme Kinetics. Wiley-Interscience, 1993

use serde::Serialize;

use super::{ClampSite, Tick, Volume};
use crate::error::{check_rate, ConfigError};

/// Enzyme rate constants in count units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Enzyme {
    /// Binding constant (N⁻¹·s⁻¹)
    pub k1: f64,
    /// Unbinding constant (s⁻¹)
    pub k2: f64,
    /// Catalytic constant (s⁻¹)
    pub k3: f64,
    /// Michaelis constant (N), (k2 + k3) / k1
    pub km: f64,
}

impl Enzyme {
    pub fn new(k1: f64, k2: f64, k3: f64) -> Self {
        let km = if k1 > 0.0 { (k2 + k3) / k1 } else { f64::INFINITY };
        Self { k1, k2, k3, km }
    }

    /// Build from a Michaelis constant in μM against the reference volume
    pub fn with_km(km_uM: f64, vol: Volume, k2: f64, k3: f64) -> Self {
        let km = km_uM * vol.quantity_per_uM();
        let k1 = if km > 0.0 { (k2 + k3) / km } else { 0.0 };
        Self { k1, k2, k3, km }
    }

    #[inline]
    pub fn step(&self, tick: &Tick<'_>, substrate: f64, enzyme: f64) -> f64 {
        self.step_k(tick, 1.0, substrate, enzyme)
    }

    /// Substrate converted to product this tick.
    ///
    /// `kf` is the compartment volume ratio: a smaller compartment lowers the
    /// Michaelis constant in count units. Never negative, never above `substrate`.
    pub fn step_k(&self, tick: &Tick<'_>, kf: f64, substrate: f64, enzyme: f64) -> f64 {
        if substrate <= 0.0 || enzyme <= 0.0 {
            return 0.0;
        }
        let requested = self.k3 * enzyme * substrate / (substrate + self.km / kf) * tick.dt;
        if requested > substrate {
            tick.record(ClampSite::Enzyme, requested, substrate);
            return substrate;
        }
        requested
    }

    pub fn check(&self, name: &str) -> Result<(), ConfigError> {
        check_rate(&format!("{}.k1", name), self.k1)?;
        check_rate(&format!("{}.k2", name), self.k2)?;
        check_rate(&format!("{}.k3", name), self.k3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinetics::{ClampMonitor, SpineGeometry};

    #[test]
    fn test_km_from_rate_constants() {
        let e = Enzyme::new(2.0, 3.0, 1.0);
        assert!((e.km - 2.0).abs() < 1e-12);

        let geom = SpineGeometry::default();
        let e = Enzyme::with_km(11.0, geom.cyt, 1.34, 0.335);
        assert!((e.km - 11.0 * 48.0).abs() < 1e-9);
        assert!((e.k1 * e.km - (1.34 + 0.335)).abs() < 1e-12);
    }

    #[test]
    fn test_substrate_monotone_and_non_negative() {
        let monitor = ClampMonitor::default();
        let tick = Tick::new(1e-3, &monitor);
        let e = Enzyme::new(1.0, 10.0, 500.0);
        for &(s, en) in &[(0.0, 1.0), (0.01, 5.0), (1.0, 1.0), (100.0, 0.5), (3.0, 1000.0)] {
            let d = e.step(&tick, s, en);
            assert!(d >= 0.0, "enzyme step went backwards: {}", d);
            assert!(s - d >= 0.0, "substrate negative: {}", s - d);
        }
    }

    #[test]
    fn test_rate_scales_with_enzyme() {
        let monitor = ClampMonitor::default();
        let tick = Tick::new(1e-4, &monitor);
        let e = Enzyme::new(1.0, 1.0, 1.0);
        let one = e.step(&tick, 10.0, 1.0);
        let two = e.step(&tick, 10.0, 2.0);
        assert!((two - 2.0 * one).abs() < 1e-15);
        assert_eq!(e.step(&tick, 10.0, 0.0), 0.0);
    }
}
