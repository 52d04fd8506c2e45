//! PP1 inhibition by phosphorylated inhibitor-1.
//!
//! PKA phosphorylates I-1; I-1P sequesters PP1. CaN and cytosolic PP2A
//! dephosphorylate I-1P, releasing active PP1, which is how Ca²⁺ through CaN
//! disinhibits PP1 for LTD.

use serde::Serialize;

use super::{Module, SpeciesCounts, StepContext};
use crate::config::{InitPolicy, SimConfig};
use crate::error::ConfigError;
use crate::kinetics::{Compartment, Compartments, Diffuse, Enzyme, React, SpineGeometry};
use crate::spine::SpineState;

/// PP1 / I-1 state in one compartment (N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PP1Vars {
    pub i1: f64,
    pub i1p: f64,
    /// PP1 held by I-1P
    pub pp1_i1p: f64,
    pub pp1_act: f64,
}

impl PP1Vars {
    /// All PP1 (N)
    pub fn pp1_total(&self) -> f64 {
        self.pp1_i1p + self.pp1_act
    }

    /// All inhibitor-1 (N)
    pub fn i1_total(&self) -> f64 {
        self.i1 + self.i1p + self.pp1_i1p
    }
}

impl SpeciesCounts for PP1Vars {
    fn visit_counts(&mut self, f: &mut dyn FnMut(&mut f64)) {
        f(&mut self.i1);
        f(&mut self.i1p);
        f(&mut self.pp1_i1p);
        f(&mut self.pp1_act);
    }
}

pub(crate) fn initial(geom: &SpineGeometry, config: &SimConfig) -> Compartments<PP1Vars> {
    Compartments::from_fn(|c| {
        // (I-1, I-1P, PP1-I1P, PP1act) in μM
        let uM = match (config.init, config.use_dapk1, c) {
            (InitPolicy::Fresh, _, _) => [2.0, 0.0, 2.0, 0.0],
            (InitPolicy::Baseline, false, Compartment::Cytosol) => [0.9848, 1.019, 0.9899, 0.009715],
            (InitPolicy::Baseline, false, Compartment::Psd) => [0.9848, 1.019, 5.943, 0.05832],
            (InitPolicy::Baseline, true, Compartment::Cytosol) => [0.7067, 1.297, 0.9919, 0.007648],
            (InitPolicy::Baseline, true, Compartment::Psd) => [0.7066, 1.297, 5.955, 0.04591],
        };
        let [i1, i1p, pp1_i1p, pp1_act] = uM.map(|co| geom.to_quantity(c, co));
        PP1Vars {
            i1,
            i1p,
            pp1_i1p,
            pp1_act,
        }
    })
}

/// PP1 / I-1 constants
#[derive(Debug, Clone, Serialize)]
pub struct PP1Params {
    /// I-1P + PP1act ⇌ PP1-I1P (100 μM⁻¹s⁻¹, 1 s⁻¹)
    pub i1_pp1: React,
    /// PKA phosphorylation of I-1 (Km 8.1 μM, 21.2, 5.3)
    pub pka_i1: Enzyme,
    /// CaN dephosphorylation of I-1P (Km 3 μM, 11.2, 2.8)
    pub can_i1p: Enzyme,
    /// PP2A dephosphorylation of I-1P, cytosol only
    pub pp2a_i1p: Enzyme,
    /// I-1 and I-1P, D = 35.9 μm²/s
    pub diffuse_i1: Diffuse,
    /// PP1 is retained in the PSD: 31.4 in, 5.23 out
    pub diffuse_pp1: Diffuse,
}

impl PP1Params {
    pub fn new(geom: &SpineGeometry) -> Self {
        let cyt = geom.cyt;
        Self {
            i1_pp1: React::with_volume(100.0, cyt, 1.0),
            pka_i1: Enzyme::with_km(8.1, cyt, 21.2, 5.3),
            can_i1p: Enzyme::with_km(3.0, cyt, 11.2, 2.8),
            pp2a_i1p: Enzyme::with_km(3.0, cyt, 11.2, 2.8),
            diffuse_i1: Diffuse::symmetric(35.9 / 0.0225),
            diffuse_pp1: Diffuse::new(31.4 / 0.0225, 5.23 / 0.0225),
        }
    }

    fn step_region(&self, cx: &StepContext<'_>, c: Compartment, next: &mut SpineState) {
        let tick = &cx.tick;
        let kf = cx.kf(c);
        let cur = &cx.current.pp1[c];
        let sig = cx.signals.get(c);
        let d = &mut next.pp1[c];

        let x = self.i1_pp1.step_k(tick, kf, cur.i1p, cur.pp1_act, cur.pp1_i1p);
        d.i1p -= x;
        d.pp1_act -= x;
        d.pp1_i1p += x;

        let x = self.pka_i1.step_k(tick, kf, cur.i1, sig.pka_act);
        d.i1 -= x;
        d.i1p += x;
        let x = self.can_i1p.step_k(tick, kf, cur.i1p, sig.can_act);
        d.i1p -= x;
        d.i1 += x;
        let x = self.pp2a_i1p.step_k(tick, kf, cur.i1p, cx.signals.pp2a_in(c));
        d.i1p -= x;
        d.i1 += x;
    }
}

impl Module for PP1Params {
    fn name(&self) -> &'static str {
        "PP1"
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.i1_pp1.check("PP1.i1_pp1")?;
        self.pka_i1.check("PP1.pka_i1")?;
        self.can_i1p.check("PP1.can_i1p")?;
        self.pp2a_i1p.check("PP1.pp2a_i1p")?;
        self.diffuse_i1.check("PP1.diffuse_i1")?;
        self.diffuse_pp1.check("PP1.diffuse_pp1")
    }

    fn step(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        for c in Compartment::ALL {
            self.step_region(cx, c, next);
        }

        let tick = &cx.tick;
        let (vc, vp) = (cx.geometry.cyt, cx.geometry.psd);
        let cur = &cx.current.pp1;
        let d = &mut next.pp1;
        let (a, b) = self.diffuse_i1.step(tick, cur.cyt.i1, cur.psd.i1, vc, vp);
        d.cyt.i1 += a;
        d.psd.i1 += b;
        let (a, b) = self.diffuse_i1.step(tick, cur.cyt.i1p, cur.psd.i1p, vc, vp);
        d.cyt.i1p += a;
        d.psd.i1p += b;
        let (a, b) = self.diffuse_pp1.step(tick, cur.cyt.pp1_i1p, cur.psd.pp1_i1p, vc, vp);
        d.cyt.pp1_i1p += a;
        d.psd.pp1_i1p += b;
        let (a, b) = self.diffuse_pp1.step(tick, cur.cyt.pp1_act, cur.psd.pp1_act, vc, vp);
        d.cyt.pp1_act += a;
        d.psd.pp1_act += b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_pp1_concentrated_in_psd() {
        let geom = SpineGeometry::default();
        let pp1 = initial(&geom, &SimConfig::default());
        let cyt_uM = geom.to_concentration(Compartment::Cytosol, pp1.cyt.pp1_total());
        let psd_uM = geom.to_concentration(Compartment::Psd, pp1.psd.pp1_total());
        // 31.4 / 5.23 retention ratio
        assert!((psd_uM / cyt_uM - 31.4 / 5.23).abs() < 0.05, "ratio {}", psd_uM / cyt_uM);
    }

    #[test]
    fn test_fresh_inhibitor_free() {
        let geom = SpineGeometry::default();
        let config = SimConfig {
            init: InitPolicy::Fresh,
            ..Default::default()
        };
        let pp1 = initial(&geom, &config);
        assert_eq!(pp1.cyt.i1p, 0.0);
        assert!((pp1.cyt.i1_total() - 4.0 * 48.0).abs() < 1e-9);
    }
}
