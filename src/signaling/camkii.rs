//! CaMKII activation, Thr286 autophosphorylation and GluN2B binding.
//!
//! CaM at every Ca²⁺ level binds CaMKII, 3Ca-CaM far more strongly; Thr286
//! phosphorylation traps CaM and, in the PSD, anchors the holoenzyme to GluN2B.
//! Autophosphorylation uses the holoenzyme-level rate from the GENESIS
//! T286Phos extension of the Urakubo model.
//!
//! References:
//! - Urakubo et al. 2008, Supplementary Figure S13
//! - Dupont G, Houart G, De Koninck P. Cell Calcium. 2003;34:485-497
//! - Bayer KU et al. Nature. 2001;411:801-805 (GluN2B binding)

use serde::Serialize;

use super::cam::ca_ladder;
use super::{Module, SpeciesCounts, StepContext};
use crate::config::{InitPolicy, SimConfig};
use crate::error::ConfigError;
use crate::kinetics::{
    limit_shared, transfer, Compartment, Compartments, Diffuse, Enzyme, React, SpineGeometry,
};
use crate::spine::SpineState;

/// Kinase bound to CaM at one Ca²⁺ level (N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CaMBound {
    /// CaM-bound, unphosphorylated (WB in Dupont)
    pub cam: f64,
    /// CaM-bound, phosphorylated (WT, or WP at the top level)
    pub cam_p: f64,
}

impl CaMBound {
    pub fn new(cam: f64, cam_p: f64) -> Self {
        Self { cam, cam_p }
    }
}

/// Derived autophosphorylation state, refreshed at every integration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AutoPhos {
    /// Weighted active kinase (N)
    pub act: f64,
    /// Fraction of the holoenzyme in any activated state (CaMKII), or total N (DAPK1)
    pub total: f64,
    /// Autophosphorylation rate (s⁻¹)
    pub k: f64,
    /// GluN2B-bound kinase (N)
    pub n2b: f64,
}

/// CaMKII states in one compartment (N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CaMKIIVars {
    /// CaM-bound, by Ca²⁺ level
    pub ca: [CaMBound; 4],
    /// CaM-bound and anchored to GluN2B (PSD only)
    pub n2b: [CaMBound; 4],
    /// Free, unphosphorylated (WI)
    pub camkii: f64,
    /// Free, Thr286-phosphorylated (WA)
    pub camkiip: f64,
    /// GluN2B-bound without CaM
    pub n2b_camkii: f64,
    /// GluN2B-bound without CaM, phosphorylated
    pub n2b_camkiip: f64,
    pub auto: AutoPhos,
}

impl CaMKIIVars {
    /// Refresh the activity readout and the autophosphorylation rate.
    ///
    /// Reference: Urakubo et al. 2008, GENESIS T286Phos.c
    pub fn update_auto(&mut self) {
        let wi = self.camkii + self.n2b_camkii;
        let wa = self.camkiip + self.n2b_camkiip;
        let mut n2b = self.n2b_camkii + self.n2b_camkiip;

        let mut wb = 0.0;
        let mut wt = 0.0;
        for i in 0..3 {
            wb += self.ca[i].cam + self.n2b[i].cam;
            wt += self.ca[i].cam_p + self.n2b[i].cam_p;
            n2b += self.n2b[i].cam + self.n2b[i].cam_p;
        }
        wb += self.ca[3].cam + self.n2b[3].cam;
        let wp = self.ca[3].cam_p + self.n2b[3].cam_p;
        n2b += self.n2b[3].cam + self.n2b[3].cam_p;

        let total_w = wi + wb + wp + wt + wa;
        let (fb, fp, ft, fa) = if total_w > 0.0 {
            (wb / total_w, wp / total_w, wt / total_w, wa / total_w)
        } else {
            (0.0, 0.0, 0.0, 0.0)
        };

        const CB: f64 = 0.75;
        const CT: f64 = 0.8;
        const CA: f64 = 0.8;

        let t = fb + fp + ft + fa;
        let rate = t * (-0.22 + 1.826 * t - 0.8 * t * t) * 0.75 * (CB * fb + fp + CT * ft + CA * fa);
        self.auto.k = 0.29 * rate.max(0.0);
        self.auto.act = CB * wb + wp + CT * wt + CA * wa;
        self.auto.total = t;
        self.auto.n2b = n2b;
    }

    /// Total CaMKII in all states (N)
    pub fn total(&self) -> f64 {
        self.count_sum()
    }

    fn scaled(mut self, q: f64) -> Self {
        self.visit_counts(&mut |x| *x *= q);
        self
    }
}

impl SpeciesCounts for CaMKIIVars {
    fn visit_counts(&mut self, f: &mut dyn FnMut(&mut f64)) {
        for b in self.ca.iter_mut().chain(self.n2b.iter_mut()) {
            f(&mut b.cam);
            f(&mut b.cam_p);
        }
        f(&mut self.camkii);
        f(&mut self.camkiip);
        f(&mut self.n2b_camkii);
        f(&mut self.n2b_camkiip);
    }
}

/// Resting-state values (μM) after 500 s at rest
fn baseline_uM(c: Compartment, use_dapk1: bool) -> CaMKIIVars {
    let b = CaMBound::new;
    match (c, use_dapk1) {
        (Compartment::Cytosol, false) => CaMKIIVars {
            ca: [b(0.2962, 0.0), b(0.003792, 0.0), b(2.53e-5, 0.0), b(0.002523, 0.0)],
            camkii: 19.28,
            ..Default::default()
        },
        (Compartment::Psd, false) => CaMKIIVars {
            ca: [b(2.257, 0.0), b(0.02889, 0.0), b(0.0001927, 0.0), b(0.01968, 0.0)],
            camkii: 19.35,
            ..Default::default()
        },
        (Compartment::Cytosol, true) => CaMKIIVars {
            ca: [
                b(0.1345, 4.264e-5),
                b(0.001728, 1.139e-5),
                b(1.277e-5, 1.002e-5),
                b(3.192e-6, 8.221e-6),
            ],
            camkii: 18.86,
            camkiip: 6.744e-9,
            ..Default::default()
        },
        (Compartment::Psd, true) => CaMKIIVars {
            ca: [
                b(0.04955, 4.023e-5),
                b(0.0006401, 1.136e-5),
                b(5.612e-6, 1.033e-5),
                b(3.242e-6, 9.615e-6),
            ],
            n2b: [
                b(4.031, 0.8687),
                b(0.05161, 0.04602),
                b(0.0003437, 0.004259),
                b(0.0007132, 0.001191),
            ],
            camkii: 18.95,
            camkiip: 7.755e-7,
            n2b_camkii: 0.002476,
            n2b_camkiip: 2.156e-6,
            ..Default::default()
        },
    }
}

pub(crate) fn initial(geom: &SpineGeometry, config: &SimConfig) -> Compartments<CaMKIIVars> {
    Compartments::from_fn(|c| {
        let vars_uM = match config.init {
            InitPolicy::Fresh => CaMKIIVars {
                camkii: 20.0,
                ..Default::default()
            },
            InitPolicy::Baseline => baseline_uM(c, config.use_dapk1),
        };
        let mut vars = vars_uM.scaled(geom.volume(c).quantity_per_uM());
        vars.update_auto();
        vars
    })
}

/// CaMKII reaction constants
///
/// Forward constants are given against the cytosol volume unless noted; the
/// PSD scales them by the volume ratio.
#[derive(Debug, Clone, Serialize)]
pub struct CaMKIIParams {
    /// Ca + CaM-CaMKII, 0 → 1 (51.202 μM⁻¹s⁻¹, 200 s⁻¹)
    pub ca_cam01: React,
    /// Ca + CaM-CaMKII, 1 → 2 (133.3, 1000)
    pub ca_cam12: React,
    /// Ca + CaM-CaMKII, 2 → 3 (25.6, 400)
    pub ca_cam23: React,
    /// 2 → 3 when anchored to GluN2B: Ca²⁺ is trapped (25.6, 0.02)
    pub ca_cam23_n2b: React,
    /// CaM (0-2 Ca) + CaMKII (0.0004, 1)
    pub cam_camkii: React,
    /// CaM (0-2 Ca) + GluN2B-bound CaMKII (8, 1)
    pub cam_camkii_n2b: React,
    /// 3Ca-CaM + CaMKII (8, 1)
    pub cam_camkii3: React,
    /// CaM + CaMKIIP, CaM trapping (8, 0.001)
    pub cam_camkiip: React,
    /// Ca + CaM-CaMKIIP at every level (1, 1)
    pub ca_cam_camkiip: React,
    /// CaM-CaMKII + GluN2B, any Ca level (8 against PSD volume, 0.001)
    pub glun2b_cacam: React,
    /// CaMKIIP + GluN2B: retained but not recruited (0, 0.0001)
    pub glun2b_p: React,
    /// CaMKII + GluN2B: no affinity (0, 1000)
    pub glun2b_nop: React,
    /// PP1 dephosphorylation at Thr286 (Km 11 μM, 1.34, 0.335)
    pub pp1_thr286: Enzyme,
    /// PP2A dephosphorylation at Thr286, cytosol only
    pub pp2a_thr286: Enzyme,
    /// Cyt ↔ PSD, D = 6 μm²/s
    pub diffuse: Diffuse,
}

impl CaMKIIParams {
    pub fn new(geom: &SpineGeometry) -> Self {
        let cyt = geom.cyt;
        Self {
            ca_cam01: React::with_volume(51.202, cyt, 200.0),
            ca_cam12: React::with_volume(133.3, cyt, 1000.0),
            ca_cam23: React::with_volume(25.6, cyt, 400.0),
            ca_cam23_n2b: React::with_volume(25.6, cyt, 0.02),
            cam_camkii: React::with_volume(0.0004, cyt, 1.0),
            cam_camkii_n2b: React::with_volume(8.0, cyt, 1.0),
            cam_camkii3: React::with_volume(8.0, cyt, 1.0),
            cam_camkiip: React::with_volume(8.0, cyt, 0.001),
            ca_cam_camkiip: React::with_volume(1.0, cyt, 1.0),
            glun2b_cacam: React::with_volume(8.0, geom.psd, 0.001),
            glun2b_p: React::with_volume(0.0, geom.psd, 0.0001),
            glun2b_nop: React::with_volume(0.0, geom.psd, 1000.0),
            pp1_thr286: Enzyme::with_km(11.0, cyt, 1.34, 0.335),
            pp2a_thr286: Enzyme::with_km(11.0, cyt, 1.34, 0.335),
            diffuse: Diffuse::symmetric(6.0 / 0.0225),
        }
    }

    fn step_region(&self, cx: &StepContext<'_>, c: Compartment, next: &mut SpineState) {
        let tick = &cx.tick;
        let kf = cx.kf(c);
        let cur = &cx.current.camkii[c];
        let cam = cx.current.cam[c].cam;
        let sig = cx.signals.get(c);
        let ca = sig.ca;
        let glun2b = cx.signals.glun2b;

        let SpineState {
            camkii: next_camkii,
            cam: next_cam,
            ca: next_ca,
            nmdar: next_nmdar,
            ..
        } = next;
        let d = &mut next_camkii[c];
        let dm = &mut next_cam[c].cam;
        let dca = &mut next_ca[c];

        // Ca²⁺ binding to CaM-CaMKII
        let moved = ca_ladder(
            tick,
            kf,
            [&self.ca_cam01, &self.ca_cam12, &self.ca_cam23],
            cur.ca.map(|b| b.cam),
            ca,
        );
        for (i, x) in moved.into_iter().enumerate() {
            d.ca[i].cam -= x;
            d.ca[i + 1].cam += x;
            *dca -= x;
        }
        let moved = ca_ladder(
            tick,
            kf,
            [&self.ca_cam_camkiip; 3],
            cur.ca.map(|b| b.cam_p),
            ca,
        );
        for (i, x) in moved.into_iter().enumerate() {
            d.ca[i].cam_p -= x;
            d.ca[i + 1].cam_p += x;
            *dca -= x;
        }

        // CaM binding
        for i in 0..4 {
            let r = if i == 3 { &self.cam_camkii3 } else { &self.cam_camkii };
            let x = r.step_k(tick, kf, cam[i], cur.camkii, cur.ca[i].cam);
            dm[i] -= x;
            d.camkii -= x;
            d.ca[i].cam += x;
        }
        let x = self
            .cam_camkiip
            .step_k(tick, kf, cam[0], cur.camkiip, cur.ca[0].cam_p);
        dm[0] -= x;
        d.camkiip -= x;
        d.ca[0].cam_p += x;

        let psd = c == Compartment::Psd;
        if psd {
            let moved = ca_ladder(
                tick,
                kf,
                [&self.ca_cam01, &self.ca_cam12, &self.ca_cam23_n2b],
                cur.n2b.map(|b| b.cam),
                ca,
            );
            for (i, x) in moved.into_iter().enumerate() {
                d.n2b[i].cam -= x;
                d.n2b[i + 1].cam += x;
                *dca -= x;
            }
            let moved = ca_ladder(
                tick,
                kf,
                [&self.ca_cam_camkiip; 3],
                cur.n2b.map(|b| b.cam_p),
                ca,
            );
            for (i, x) in moved.into_iter().enumerate() {
                d.n2b[i].cam_p -= x;
                d.n2b[i + 1].cam_p += x;
                *dca -= x;
            }

            for i in 0..4 {
                let r = if i == 3 { &self.cam_camkii3 } else { &self.cam_camkii_n2b };
                let x = r.step_k(tick, kf, cam[i], cur.n2b_camkii, cur.n2b[i].cam);
                dm[i] -= x;
                d.n2b_camkii -= x;
                d.n2b[i].cam += x;
            }
            let x = self
                .cam_camkiip
                .step_k(tick, kf, cam[0], cur.n2b_camkiip, cur.n2b[0].cam_p);
            dm[0] -= x;
            d.n2b_camkiip -= x;
            d.n2b[0].cam_p += x;
        }

        // Thr286 dephosphorylation of free CaMKIIP
        let pp2a = cx.signals.pp2a_in(c);
        let mut dephos = [
            self.pp1_thr286.step_k(tick, kf, cur.camkiip, sig.pp1_act),
            // CaM-bound P forms are left to PP1 while GluN2B binding is modeled
            self.pp2a_thr286.step_k(tick, kf, cur.camkiip, pp2a),
        ];
        limit_shared(tick, cur.camkiip, &mut dephos);
        let x = dephos[0] + dephos[1];
        d.camkiip -= x;
        d.camkii += x;

        // Autophosphorylation and dephosphorylation of CaM-bound forms
        for i in 0..4 {
            let x = transfer(tick, cur.auto.k, cur.ca[i].cam);
            d.ca[i].cam -= x;
            d.ca[i].cam_p += x;
            let x = self.pp1_thr286.step_k(tick, kf, cur.ca[i].cam_p, sig.pp1_act);
            d.ca[i].cam_p -= x;
            d.ca[i].cam += x;
        }

        if psd {
            let x = self.pp1_thr286.step_k(tick, kf, cur.n2b_camkiip, sig.pp1_act);
            d.n2b_camkiip -= x;
            d.n2b_camkii += x;

            let dn2b = &mut next_nmdar.glun2b;
            let x = self.glun2b_p.step(tick, cur.camkiip, glun2b, cur.n2b_camkiip);
            d.camkiip -= x;
            *dn2b -= x;
            d.n2b_camkiip += x;
            let x = self.glun2b_nop.step(tick, cur.camkii, glun2b, cur.n2b_camkii);
            d.camkii -= x;
            *dn2b -= x;
            d.n2b_camkii += x;

            for i in 0..4 {
                let x = transfer(tick, cur.auto.k, cur.n2b[i].cam);
                d.n2b[i].cam -= x;
                d.n2b[i].cam_p += x;
                let x = self.pp1_thr286.step_k(tick, kf, cur.n2b[i].cam_p, sig.pp1_act);
                d.n2b[i].cam_p -= x;
                d.n2b[i].cam += x;

                let x = self.glun2b_cacam.step(tick, cur.ca[i].cam, glun2b, cur.n2b[i].cam);
                d.ca[i].cam -= x;
                *dn2b -= x;
                d.n2b[i].cam += x;
                let x = self.glun2b_cacam.step(tick, cur.ca[i].cam_p, glun2b, cur.n2b[i].cam_p);
                d.ca[i].cam_p -= x;
                *dn2b -= x;
                d.n2b[i].cam_p += x;
            }
        }
    }

    /// GluN2B-anchored forms stay in the PSD
    fn step_diffuse(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        let tick = &cx.tick;
        let (vc, vp) = (cx.geometry.cyt, cx.geometry.psd);
        let cur = &cx.current.camkii;
        let d = &mut next.camkii;
        for i in 0..4 {
            let (a, b) = self.diffuse.step(tick, cur.cyt.ca[i].cam, cur.psd.ca[i].cam, vc, vp);
            d.cyt.ca[i].cam += a;
            d.psd.ca[i].cam += b;
            let (a, b) = self.diffuse.step(tick, cur.cyt.ca[i].cam_p, cur.psd.ca[i].cam_p, vc, vp);
            d.cyt.ca[i].cam_p += a;
            d.psd.ca[i].cam_p += b;
        }
        let (a, b) = self.diffuse.step(tick, cur.cyt.camkii, cur.psd.camkii, vc, vp);
        d.cyt.camkii += a;
        d.psd.camkii += b;
        let (a, b) = self.diffuse.step(tick, cur.cyt.camkiip, cur.psd.camkiip, vc, vp);
        d.cyt.camkiip += a;
        d.psd.camkiip += b;
    }
}

impl Module for CaMKIIParams {
    fn name(&self) -> &'static str {
        "CaMKII"
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.ca_cam01.check("CaMKII.ca_cam01")?;
        self.ca_cam12.check("CaMKII.ca_cam12")?;
        self.ca_cam23.check("CaMKII.ca_cam23")?;
        self.ca_cam23_n2b.check("CaMKII.ca_cam23_n2b")?;
        self.cam_camkii.check("CaMKII.cam_camkii")?;
        self.cam_camkii_n2b.check("CaMKII.cam_camkii_n2b")?;
        self.cam_camkii3.check("CaMKII.cam_camkii3")?;
        self.cam_camkiip.check("CaMKII.cam_camkiip")?;
        self.ca_cam_camkiip.check("CaMKII.ca_cam_camkiip")?;
        self.glun2b_cacam.check("CaMKII.glun2b_cacam")?;
        self.glun2b_p.check("CaMKII.glun2b_p")?;
        self.glun2b_nop.check("CaMKII.glun2b_nop")?;
        self.pp1_thr286.check("CaMKII.pp1_thr286")?;
        self.pp2a_thr286.check("CaMKII.pp2a_thr286")?;
        self.diffuse.check("CaMKII.diffuse")
    }

    fn step(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        for c in Compartment::ALL {
            self.step_region(cx, c, next);
        }
        self.step_diffuse(cx, next);
    }
}
