//! Calmodulin Ca²⁺ binding.
//!
//! CaM binds Ca²⁺ in three lumped steps (0 → 1 → 2 → 3 Ca-pairs); 3Ca-CaM is
//! the form that activates CaMKII, CaN and AC1.
//!
//! Reference: Urakubo et al. 2008, Supplementary Table 1

use serde::Serialize;

use super::{Module, SpeciesCounts, StepContext};
use crate::config::{InitPolicy, SimConfig};
use crate::error::ConfigError;
use crate::kinetics::{Compartment, Compartments, Diffuse, React, SpineGeometry, Tick};
use crate::spine::SpineState;

/// Free CaM by number of bound Ca²⁺ pairs (N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CaMVars {
    pub cam: [f64; 4],
}

impl CaMVars {
    fn from_uM(geom: &SpineGeometry, c: Compartment, levels_uM: [f64; 4]) -> Self {
        Self {
            cam: levels_uM.map(|co| geom.to_quantity(c, co)),
        }
    }
}

impl SpeciesCounts for CaMVars {
    fn visit_counts(&mut self, f: &mut dyn FnMut(&mut f64)) {
        self.cam.iter_mut().for_each(|x| f(x));
    }
}

pub(crate) fn initial(geom: &SpineGeometry, config: &SimConfig) -> Compartments<CaMVars> {
    Compartments::from_fn(|c| {
        let levels = match (config.init, config.use_dapk1) {
            (InitPolicy::Fresh, _) => [80.0, 0.0, 0.0, 0.0],
            (InitPolicy::Baseline, false) => {
                let cam3 = match c {
                    Compartment::Cytosol => 3.645e-5,
                    Compartment::Psd => 4.852e-5,
                };
                [89.2, 1.142, 0.007617, cam3]
            }
            (InitPolicy::Baseline, true) => {
                let cam3 = match c {
                    Compartment::Cytosol => 8.372e-6,
                    Compartment::Psd => 8.74e-6,
                };
                [80.2, 1.027, 0.006837, cam3]
            }
        };
        CaMVars::from_uM(geom, c, levels)
    })
}

/// CaM Ca²⁺ binding constants
#[derive(Debug, Clone, Serialize)]
pub struct CaMParams {
    /// Ca + CaM ⇌ 1CaCaM (51.202 μM⁻¹s⁻¹, 200 s⁻¹)
    pub ca_cam01: React,
    /// Ca + 1CaCaM ⇌ 2CaCaM (133.3 μM⁻¹s⁻¹, 1000 s⁻¹)
    pub ca_cam12: React,
    /// Ca + 2CaCaM ⇌ 3CaCaM (25.6 μM⁻¹s⁻¹, 400 s⁻¹)
    pub ca_cam23: React,
    /// Cyt ↔ PSD, D = 130 μm²/s
    pub diffuse: Diffuse,
}

impl CaMParams {
    pub fn new(geom: &SpineGeometry) -> Self {
        Self {
            ca_cam01: React::with_volume(51.202, geom.cyt, 200.0),
            ca_cam12: React::with_volume(133.3, geom.cyt, 1000.0),
            ca_cam23: React::with_volume(25.6, geom.cyt, 400.0),
            diffuse: Diffuse::symmetric(130.0 / 0.0225),
        }
    }

    fn step_region(&self, cx: &StepContext<'_>, c: Compartment, next: &mut SpineState) {
        let rates = [&self.ca_cam01, &self.ca_cam12, &self.ca_cam23];
        let moved = ca_ladder(
            &cx.tick,
            cx.kf(c),
            rates,
            cx.current.cam[c].cam,
            cx.signals.get(c).ca,
        );
        for (i, d) in moved.into_iter().enumerate() {
            next.cam[c].cam[i] -= d;
            next.cam[c].cam[i + 1] += d;
            next.ca[c] -= d;
        }
    }
}

/// Ca²⁺ binding along a 4-level ladder (0 → 1 → 2 → 3).
///
/// Returns the amount moved from level `i` to `i + 1`; each unit also consumes
/// one unit of free Ca²⁺.
pub(crate) fn ca_ladder(
    tick: &Tick<'_>,
    kf: f64,
    rates: [&React; 3],
    levels: [f64; 4],
    ca: f64,
) -> [f64; 3] {
    let mut moved = [0.0; 3];
    for (i, r) in rates.into_iter().enumerate() {
        moved[i] = r.step_k(tick, kf, levels[i], ca, levels[i + 1]);
    }
    moved
}

impl Module for CaMParams {
    fn name(&self) -> &'static str {
        "CaM"
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.ca_cam01.check("CaM.ca_cam01")?;
        self.ca_cam12.check("CaM.ca_cam12")?;
        self.ca_cam23.check("CaM.ca_cam23")?;
        self.diffuse.check("CaM.diffuse")
    }

    fn step(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        for c in Compartment::ALL {
            self.step_region(cx, c, next);
        }
        let cur = &cx.current.cam;
        for i in 0..4 {
            let (d_cyt, d_psd) = self.diffuse.step(
                &cx.tick,
                cur.cyt.cam[i],
                cur.psd.cam[i],
                cx.geometry.cyt,
                cx.geometry.psd,
            );
            next.cam.cyt.cam[i] += d_cyt;
            next.cam.psd.cam[i] += d_psd;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_total_per_compartment() {
        let geom = SpineGeometry::default();
        let cam = initial(&geom, &SimConfig::default());
        let total_uM: f64 = cam.cyt.cam.iter().sum::<f64>() / 48.0;
        assert!((total_uM - 90.35).abs() < 0.01, "total CaM {} μM", total_uM);
        // PSD holds a quarter of the molecules at the same concentration
        assert!((cam.psd.cam[0] * 4.0 - cam.cyt.cam[0]).abs() < 1e-9);
    }

    #[test]
    fn test_fresh_is_all_apo() {
        let geom = SpineGeometry::default();
        let config = SimConfig { init: InitPolicy::Fresh, ..Default::default() };
        let cam = initial(&geom, &config);
        assert!((cam.cyt.cam[0] - 80.0 * 48.0).abs() < 1e-9);
        assert_eq!(cam.psd.cam[3], 0.0);
    }
}
