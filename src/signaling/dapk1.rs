//! Death-associated protein kinase 1, competing with CaMKII for GluN2B.
//!
//! DAPK1 is the mirror image of CaMKII: autophosphorylation at Ser308
//! *inactivates* it, and Ca²⁺/CaM through CaN dephosphorylation activates it.
//! Unphosphorylated CaM-DAPK1 binds GluN2B with high affinity, blocking the
//! CaMKII binding site.
//!
//! Reference: Goodell DJ et al. Cell Rep. 2017;19:2231-2243

use serde::Serialize;

use super::cam::ca_ladder;
use super::camkii::{AutoPhos, CaMBound};
use super::{Module, SpeciesCounts, StepContext};
use crate::config::{InitPolicy, SimConfig};
use crate::error::ConfigError;
use crate::kinetics::{transfer, Compartment, Compartments, Diffuse, Enzyme, React, SpineGeometry};
use crate::spine::SpineState;

/// DAPK1 states in one compartment (N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DAPK1Vars {
    /// CaM-bound by Ca²⁺ level
    pub ca: [CaMBound; 4],
    /// CaM-bound and anchored to GluN2B (PSD only)
    pub n2b: [CaMBound; 4],
    /// Free, unphosphorylated (WI)
    pub dapk1: f64,
    /// Free, Ser308-phosphorylated and inactive (WA)
    pub dapk1p: f64,
    pub n2b_dapk1: f64,
    pub n2b_dapk1p: f64,
    pub auto: AutoPhos,
}

impl DAPK1Vars {
    /// Refresh the activity readout and the Ser308 autophosphorylation rate
    /// (`auto_k` scales the rate, 1.0 by default).
    pub fn update_auto(&mut self, auto_k: f64) {
        let wi = self.dapk1 + self.n2b_dapk1;
        let wa = self.dapk1p + self.n2b_dapk1p;
        let mut n2b = self.n2b_dapk1 + self.n2b_dapk1p;

        let mut wb = 0.0;
        let mut wt = 0.0;
        for i in 0..4 {
            wb += self.ca[i].cam + self.n2b[i].cam;
            wt += self.ca[i].cam_p + self.n2b[i].cam_p;
            n2b += self.n2b[i].cam + self.n2b[i].cam_p;
        }

        let total_w = wi + wb + wt + wa;
        let t = if total_w > 0.0 { wa / total_w } else { 0.0 };
        let rate = t * t * (-0.22 + 1.826 * t - 0.8 * t * t);
        self.auto.k = auto_k * rate.max(0.0);
        self.auto.act = wb + 0.75 * wi;
        self.auto.total = total_w;
        self.auto.n2b = n2b;
    }

    pub fn total(&self) -> f64 {
        self.count_sum()
    }

    fn scaled(mut self, q: f64) -> Self {
        self.visit_counts(&mut |x| *x *= q);
        self
    }
}

impl SpeciesCounts for DAPK1Vars {
    fn visit_counts(&mut self, f: &mut dyn FnMut(&mut f64)) {
        for b in self.ca.iter_mut().chain(self.n2b.iter_mut()) {
            f(&mut b.cam);
            f(&mut b.cam_p);
        }
        f(&mut self.dapk1);
        f(&mut self.dapk1p);
        f(&mut self.n2b_dapk1);
        f(&mut self.n2b_dapk1p);
    }
}

fn baseline_uM(c: Compartment) -> DAPK1Vars {
    let b = CaMBound::new;
    match c {
        Compartment::Cytosol => DAPK1Vars {
            ca: [
                b(0.007214, 0.6018),
                b(0.0001168, 0.03415),
                b(5.555e-6, 0.004256),
                b(1.122e-5, 0.001489),
            ],
            dapk1: 1.255,
            dapk1p: 18.07,
            ..Default::default()
        },
        Compartment::Psd => DAPK1Vars {
            ca: [
                b(0.001153, 0.604),
                b(2.148e-5, 0.03418),
                b(2.605e-6, 0.004257),
                b(7.185e-6, 0.001489),
            ],
            n2b: [
                b(0.1105, 6.977e-5),
                b(0.001436, 1.537e-6),
                b(1.231e-5, 6.427e-7),
                b(4.944e-6, 6.374e-7),
            ],
            dapk1: 1.26,
            dapk1p: 18.07,
            n2b_dapk1: 0.01117,
            n2b_dapk1p: 7.047e-7,
            ..Default::default()
        },
    }
}

/// DAPK1 state; all zero unless the module is enabled
pub(crate) fn initial(geom: &SpineGeometry, config: &SimConfig, auto_k: f64) -> Compartments<DAPK1Vars> {
    Compartments::from_fn(|c| {
        if !config.use_dapk1 {
            return DAPK1Vars::default();
        }
        let vars_uM = match config.init {
            InitPolicy::Fresh => DAPK1Vars {
                dapk1p: 20.0,
                ..Default::default()
            },
            InitPolicy::Baseline => baseline_uM(c),
        };
        let mut vars = vars_uM.scaled(geom.volume(c).quantity_per_uM());
        vars.update_auto(auto_k);
        vars
    })
}

/// DAPK1 reaction constants
#[derive(Debug, Clone, Serialize)]
pub struct DAPK1Params {
    /// Ca + CaM-DAPK1 ladder (same as CaMKII, also when GluN2B-bound)
    pub ca_cam01: React,
    pub ca_cam12: React,
    pub ca_cam23: React,
    /// CaM (0-2 Ca) + DAPK1 (0.0004, 1)
    pub cam_dapk1: React,
    /// CaM + DAPK1P (0.0004, 1)
    pub cam_dapk1p: React,
    /// 3Ca-CaM + DAPK1 (400, 1)
    pub cam_dapk13: React,
    /// Ca + CaM-DAPK1P at every level (1, 1)
    pub ca_cam_dapk1p: React,
    /// CaM-DAPK1 + GluN2B (40 against PSD volume, 1)
    pub glun2b_nop_cacam: React,
    /// DAPK1P + GluN2B: no affinity, fast release (0, 1000)
    pub glun2b_p: React,
    /// DAPK1 + GluN2B without CaM (0, 10)
    pub glun2b_nop: React,
    /// CaN dephosphorylation at Ser308 (Km 11 μM, 1.34, 0.335)
    pub can_ser308: Enzyme,
    /// PP2A dephosphorylation at Ser308, cytosol only
    pub pp2a_ser308: Enzyme,
    /// Scale of the autophosphorylation rate
    pub auto_k: f64,
    /// Cyt ↔ PSD, D = 6 μm²/s
    pub diffuse: Diffuse,
}

impl DAPK1Params {
    pub fn new(geom: &SpineGeometry) -> Self {
        let cyt = geom.cyt;
        Self {
            ca_cam01: React::with_volume(51.202, cyt, 200.0),
            ca_cam12: React::with_volume(133.3, cyt, 1000.0),
            ca_cam23: React::with_volume(25.6, cyt, 400.0),
            cam_dapk1: React::with_volume(0.0004, cyt, 1.0),
            cam_dapk1p: React::with_volume(0.0004, cyt, 1.0),
            cam_dapk13: React::with_volume(400.0, cyt, 1.0),
            ca_cam_dapk1p: React::with_volume(1.0, cyt, 1.0),
            glun2b_nop_cacam: React::with_volume(40.0, geom.psd, 1.0),
            glun2b_p: React::with_volume(0.0, geom.psd, 1000.0),
            glun2b_nop: React::with_volume(0.0, geom.psd, 10.0),
            can_ser308: Enzyme::with_km(11.0, cyt, 1.34, 0.335),
            pp2a_ser308: Enzyme::with_km(11.0, cyt, 1.34, 0.335),
            auto_k: 1.0,
            diffuse: Diffuse::symmetric(6.0 / 0.0225),
        }
    }

    /// Ca²⁺ ladders and CaM binding for one family (free or GluN2B-bound)
    #[allow(clippy::too_many_arguments)]
    fn bind_cam(
        &self,
        cx: &StepContext<'_>,
        c: Compartment,
        forms: &[CaMBound; 4],
        free: f64,
        free_p: f64,
        d_forms: &mut [CaMBound; 4],
        d_free: &mut f64,
        d_free_p: &mut f64,
        next_cam: &mut [f64; 4],
        next_ca: &mut f64,
    ) {
        let tick = &cx.tick;
        let kf = cx.kf(c);
        let cam = cx.current.cam[c].cam;
        let ca = cx.signals.get(c).ca;

        let moved = ca_ladder(
            tick,
            kf,
            [&self.ca_cam01, &self.ca_cam12, &self.ca_cam23],
            forms.map(|b| b.cam),
            ca,
        );
        for (i, x) in moved.into_iter().enumerate() {
            d_forms[i].cam -= x;
            d_forms[i + 1].cam += x;
            *next_ca -= x;
        }
        let moved = ca_ladder(tick, kf, [&self.ca_cam_dapk1p; 3], forms.map(|b| b.cam_p), ca);
        for (i, x) in moved.into_iter().enumerate() {
            d_forms[i].cam_p -= x;
            d_forms[i + 1].cam_p += x;
            *next_ca -= x;
        }

        for i in 0..4 {
            let r = if i == 3 { &self.cam_dapk13 } else { &self.cam_dapk1 };
            let x = r.step_k(tick, kf, cam[i], free, forms[i].cam);
            next_cam[i] -= x;
            *d_free -= x;
            d_forms[i].cam += x;
        }
        let x = self.cam_dapk1p.step_k(tick, kf, cam[0], free_p, forms[0].cam_p);
        next_cam[0] -= x;
        *d_free_p -= x;
        d_forms[0].cam_p += x;
    }

    fn step_region(&self, cx: &StepContext<'_>, c: Compartment, next: &mut SpineState) {
        let tick = &cx.tick;
        let kf = cx.kf(c);
        let cur = &cx.current.dapk1[c];
        let can = cx.signals.get(c).can_act;
        let glun2b = cx.signals.glun2b;
        let psd = c == Compartment::Psd;

        let SpineState {
            dapk1: next_dapk1,
            cam: next_cam,
            ca: next_ca,
            nmdar: next_nmdar,
            ..
        } = next;
        let d = &mut next_dapk1[c];
        let dm = &mut next_cam[c].cam;
        let dca = &mut next_ca[c];

        self.bind_cam(
            cx,
            c,
            &cur.ca,
            cur.dapk1,
            cur.dapk1p,
            &mut d.ca,
            &mut d.dapk1,
            &mut d.dapk1p,
            dm,
            dca,
        );
        if psd {
            self.bind_cam(
                cx,
                c,
                &cur.n2b,
                cur.n2b_dapk1,
                cur.n2b_dapk1p,
                &mut d.n2b,
                &mut d.n2b_dapk1,
                &mut d.n2b_dapk1p,
                dm,
                dca,
            );
        }

        // Ser308 dephosphorylation of free DAPK1P
        let x = self.can_ser308.step_k(tick, kf, cur.dapk1p, can);
        d.dapk1p -= x;
        d.dapk1 += x;
        let x = self.pp2a_ser308.step_k(tick, kf, cur.dapk1p, cx.signals.pp2a_in(c));
        d.dapk1p -= x;
        d.dapk1 += x;

        for i in 0..4 {
            let x = transfer(tick, cur.auto.k, cur.ca[i].cam);
            d.ca[i].cam -= x;
            d.ca[i].cam_p += x;
            let x = self.can_ser308.step_k(tick, kf, cur.ca[i].cam_p, can);
            d.ca[i].cam_p -= x;
            d.ca[i].cam += x;
        }

        if psd {
            let x = self.can_ser308.step_k(tick, kf, cur.n2b_dapk1p, can);
            d.n2b_dapk1p -= x;
            d.n2b_dapk1 += x;

            let dn2b = &mut next_nmdar.glun2b;
            let x = self.glun2b_p.step(tick, cur.dapk1p, glun2b, cur.n2b_dapk1p);
            d.dapk1p -= x;
            *dn2b -= x;
            d.n2b_dapk1p += x;
            let x = self.glun2b_nop.step(tick, cur.dapk1, glun2b, cur.n2b_dapk1);
            d.dapk1 -= x;
            *dn2b -= x;
            d.n2b_dapk1 += x;

            for i in 0..4 {
                let x = transfer(tick, cur.auto.k, cur.n2b[i].cam);
                d.n2b[i].cam -= x;
                d.n2b[i].cam_p += x;
                let x = self.can_ser308.step_k(tick, kf, cur.n2b[i].cam_p, can);
                d.n2b[i].cam_p -= x;
                d.n2b[i].cam += x;

                let x = self
                    .glun2b_nop_cacam
                    .step(tick, cur.ca[i].cam, glun2b, cur.n2b[i].cam);
                d.ca[i].cam -= x;
                *dn2b -= x;
                d.n2b[i].cam += x;
                let x = self.glun2b_p.step(tick, cur.ca[i].cam_p, glun2b, cur.n2b[i].cam_p);
                d.ca[i].cam_p -= x;
                *dn2b -= x;
                d.n2b[i].cam_p += x;
            }
        }
    }

    fn step_diffuse(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        let tick = &cx.tick;
        let (vc, vp) = (cx.geometry.cyt, cx.geometry.psd);
        let cur = &cx.current.dapk1;
        let d = &mut next.dapk1;
        for i in 0..4 {
            let (a, b) = self.diffuse.step(tick, cur.cyt.ca[i].cam, cur.psd.ca[i].cam, vc, vp);
            d.cyt.ca[i].cam += a;
            d.psd.ca[i].cam += b;
            let (a, b) = self.diffuse.step(tick, cur.cyt.ca[i].cam_p, cur.psd.ca[i].cam_p, vc, vp);
            d.cyt.ca[i].cam_p += a;
            d.psd.ca[i].cam_p += b;
        }
        let (a, b) = self.diffuse.step(tick, cur.cyt.dapk1, cur.psd.dapk1, vc, vp);
        d.cyt.dapk1 += a;
        d.psd.dapk1 += b;
        let (a, b) = self.diffuse.step(tick, cur.cyt.dapk1p, cur.psd.dapk1p, vc, vp);
        d.cyt.dapk1p += a;
        d.psd.dapk1p += b;
    }
}

impl Module for DAPK1Params {
    fn name(&self) -> &'static str {
        "DAPK1"
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.ca_cam01.check("DAPK1.ca_cam01")?;
        self.ca_cam12.check("DAPK1.ca_cam12")?;
        self.ca_cam23.check("DAPK1.ca_cam23")?;
        self.cam_dapk1.check("DAPK1.cam_dapk1")?;
        self.cam_dapk1p.check("DAPK1.cam_dapk1p")?;
        self.cam_dapk13.check("DAPK1.cam_dapk13")?;
        self.ca_cam_dapk1p.check("DAPK1.ca_cam_dapk1p")?;
        self.glun2b_nop_cacam.check("DAPK1.glun2b_nop_cacam")?;
        self.glun2b_p.check("DAPK1.glun2b_p")?;
        self.glun2b_nop.check("DAPK1.glun2b_nop")?;
        self.can_ser308.check("DAPK1.can_ser308")?;
        self.pp2a_ser308.check("DAPK1.pp2a_ser308")?;
        crate::error::check_rate("DAPK1.auto_k", self.auto_k)?;
        self.diffuse.check("DAPK1.diffuse")
    }

    fn step(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        for c in Compartment::ALL {
            self.step_region(cx, c, next);
        }
        self.step_diffuse(cx, next);
    }
}
