//! PKA activation through the AC1 → cAMP → R2C2 pathway.
//!
//! 3Ca-CaM activates adenylyl cyclase 1, which converts ATP to cAMP; PDE
//! degrades cAMP to AMP. Four cAMP molecules bind the R2C2 holoenzyme (two B
//! sites, then two A sites) and release the two catalytic subunits (PKAact).
//!
//! References:
//! - Urakubo et al. 2008, Supplementary Figure S4 and Tables S1g-h
//! - Kim C, Xuong NH, Taylor SS. Science. 2005;307:690-696

use serde::Serialize;

use super::{Module, SpeciesCounts, StepContext};
use crate::config::{InitPolicy, SimConfig};
use crate::error::ConfigError;
use crate::kinetics::{
    limit_shared, Buffer, Compartment, Compartments, Diffuse, Enzyme, React, SpineGeometry,
};
use crate::spine::SpineState;

/// Relaxation rate used to hold the ATP, AMP and PDE pools fixed (s⁻¹)
const RESERVOIR_K: f64 = 1.0e6;

/// PKA pathway state in one compartment (N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PKAVars {
    pub ac1: f64,
    /// 3Ca-CaM bound AC1
    pub ac1_act: f64,
    /// Active PDE (held at 1 μM)
    pub pde: f64,
    /// ATP (held at 10 mM)
    pub atp: f64,
    pub camp: f64,
    /// AMP (held at 1 mM)
    pub amp: f64,
    pub r2c2: f64,
    pub r2c2_b: f64,
    pub r2c2_bb: f64,
    pub r2c2_ab: f64,
    pub r2c2_abb: f64,
    pub r2c2_4: f64,
    pub r2c_3: f64,
    pub r2c_4: f64,
    pub r2_3: f64,
    pub r2_4: f64,
    /// Free catalytic subunit
    pub pka_act: f64,
}

impl PKAVars {
    /// Regulatory dimers in every form (N)
    pub fn regulatory_total(&self) -> f64 {
        self.r2c2
            + self.r2c2_b
            + self.r2c2_bb
            + self.r2c2_ab
            + self.r2c2_abb
            + self.r2c2_4
            + self.r2c_3
            + self.r2c_4
            + self.r2_3
            + self.r2_4
    }

    /// Catalytic subunits, bound or free (N)
    pub fn catalytic_total(&self) -> f64 {
        2.0 * (self.r2c2 + self.r2c2_b + self.r2c2_bb + self.r2c2_ab + self.r2c2_abb + self.r2c2_4)
            + self.r2c_3
            + self.r2c_4
            + self.pka_act
    }

    fn scaled(mut self, q: f64) -> Self {
        self.visit_counts(&mut |x| *x *= q);
        self
    }
}

impl SpeciesCounts for PKAVars {
    fn visit_counts(&mut self, f: &mut dyn FnMut(&mut f64)) {
        for x in [
            &mut self.ac1,
            &mut self.ac1_act,
            &mut self.pde,
            &mut self.atp,
            &mut self.camp,
            &mut self.amp,
            &mut self.r2c2,
            &mut self.r2c2_b,
            &mut self.r2c2_bb,
            &mut self.r2c2_ab,
            &mut self.r2c2_abb,
            &mut self.r2c2_4,
            &mut self.r2c_3,
            &mut self.r2c_4,
            &mut self.r2_3,
            &mut self.r2_4,
            &mut self.pka_act,
        ] {
            f(x);
        }
    }
}

fn fresh_uM() -> PKAVars {
    PKAVars {
        ac1: 2.0,
        pde: 1.0,
        atp: 10000.0,
        amp: 1000.0,
        r2c2: 2.0,
        pka_act: 0.05,
        ..Default::default()
    }
}

/// Resting-state values (μM), the same in both compartments
fn baseline_uM(use_dapk1: bool) -> PKAVars {
    let base = fresh_uM();
    if use_dapk1 {
        PKAVars {
            ac1_act: 0.0001049,
            camp: 0.003709,
            r2c2: 1.985,
            r2c2_b: 0.01471,
            r2c2_bb: 2.724e-5,
            r2c2_ab: 2.179e-5,
            r2c2_abb: 8.07e-8,
            r2c2_4: 5.973e-11,
            r2c_3: 3.506e-7,
            r2c_4: 2.596e-8,
            r2_3: 3.81e-7,
            r2_4: 2.822e-6,
            pka_act: 0.04599,
            ..base
        }
    } else {
        PKAVars {
            ac1_act: 0.0004371,
            camp: 0.005518,
            r2c2: 1.978,
            r2c2_b: 0.02181,
            r2c2_bb: 6.006e-5,
            r2c2_ab: 4.814e-5,
            r2c2_abb: 2.635e-7,
            r2c2_4: 2.859e-10,
            r2c_3: 1.162e-6,
            r2c_4: 1.271e-7,
            r2_3: 1.295e-6,
            r2_4: 1.423e-5,
            pka_act: 0.04461,
            ..base
        }
    }
}

pub(crate) fn initial(geom: &SpineGeometry, config: &SimConfig) -> Compartments<PKAVars> {
    let vars_uM = match config.init {
        InitPolicy::Fresh => fresh_uM(),
        InitPolicy::Baseline => baseline_uM(config.use_dapk1),
    };
    Compartments::from_fn(|c| vars_uM.scaled(geom.volume(c).quantity_per_uM()))
}

/// PKA pathway constants (forward rates in μM⁻¹s⁻¹ against the cytosol)
#[derive(Debug, Clone, Serialize)]
pub struct PKAParams {
    /// 3Ca-CaM + AC1 ⇌ AC1act (6, 1)
    pub cam_ac1: React,
    /// Basal ATP → cAMP (4e-7 s⁻¹)
    pub atp_camp: React,
    /// R2C2 + cAMP ⇌ R2C2-B (0.2, 0.1)
    pub r2c2_b: React,
    /// R2C2-B + cAMP ⇌ R2C2-BB (0.1, 0.2)
    pub r2c2_b1: React,
    /// R2C2-B + cAMP ⇌ R2C2-AB (2, 5)
    pub r2c2_a1: React,
    /// R2C2-BB + cAMP ⇌ R2C2-ABB (4, 5)
    pub r2c2_a2: React,
    /// R2C2-AB + cAMP ⇌ R2C2-ABB (0.1, 0.1)
    pub r2c2_b2: React,
    /// R2C2-ABB + cAMP ⇌ R2C2-4 (2, 10)
    pub r2c2_a: React,
    /// R2C-3 + cAMP ⇌ R2C-4 (20, 1)
    pub r2c_a3: React,
    /// R2-3 + cAMP ⇌ R2-4 (200, 0.1)
    pub r2_a4: React,
    /// PKAact + R2C-3 ⇌ R2C2-ABB; release is the backward direction (10, 2)
    pub r2c_3: React,
    /// PKAact + R2C-4 ⇌ R2C2-4 (1, 20)
    pub r2c_4: React,
    /// PKAact + R2-3 ⇌ R2C-3 (20, 1)
    pub r2_3: React,
    /// PKAact + R2-4 ⇌ R2C-4 (2, 10)
    pub r2_4: React,
    /// AC1act: ATP → cAMP (Km 40 μM, 40, 10)
    pub ac1_atp: Enzyme,
    /// PDE: cAMP → AMP (Km 10 μM, 80, 20)
    pub pde_camp: Enzyme,
    pub atp_pool: Compartments<Buffer>,
    pub amp_pool: Compartments<Buffer>,
    pub pde_pool: Compartments<Buffer>,
    /// R2C2 chain, D = 32 μm²/s
    pub diffuse_pka: Diffuse,
    /// cAMP and PDE, D = 500 μm²/s
    pub diffuse_camp: Diffuse,
}

impl PKAParams {
    pub fn new(geom: &SpineGeometry) -> Self {
        let cyt = geom.cyt;
        let pool = |uM: f64| Compartments::from_fn(|c| Buffer::with_target(RESERVOIR_K, uM, geom.volume(c)));
        Self {
            cam_ac1: React::with_volume(6.0, cyt, 1.0),
            atp_camp: React::new(4.0e-7, 0.0),
            r2c2_b: React::with_volume(0.2, cyt, 0.1),
            r2c2_b1: React::with_volume(0.1, cyt, 0.2),
            r2c2_a1: React::with_volume(2.0, cyt, 5.0),
            r2c2_a2: React::with_volume(4.0, cyt, 5.0),
            r2c2_b2: React::with_volume(0.1, cyt, 0.1),
            r2c2_a: React::with_volume(2.0, cyt, 10.0),
            r2c_a3: React::with_volume(20.0, cyt, 1.0),
            r2_a4: React::with_volume(200.0, cyt, 0.1),
            r2c_3: React::with_volume(10.0, cyt, 2.0),
            r2c_4: React::with_volume(1.0, cyt, 20.0),
            r2_3: React::with_volume(20.0, cyt, 1.0),
            r2_4: React::with_volume(2.0, cyt, 10.0),
            ac1_atp: Enzyme::with_km(40.0, cyt, 40.0, 10.0),
            pde_camp: Enzyme::with_km(10.0, cyt, 80.0, 20.0),
            atp_pool: pool(10000.0),
            amp_pool: pool(1000.0),
            pde_pool: pool(1.0),
            diffuse_pka: Diffuse::symmetric(32.0 / 0.0225),
            diffuse_camp: Diffuse::symmetric(500.0 / 0.0225),
        }
    }

    fn step_region(&self, cx: &StepContext<'_>, c: Compartment, next: &mut SpineState) {
        let tick = &cx.tick;
        let kf = cx.kf(c);
        let cur = &cx.current.pka[c];
        let cam3 = cx.current.cam[c].cam[3];

        let x = self.cam_ac1.step_k(tick, kf, cur.ac1, cam3, cur.ac1_act);
        next.pka[c].ac1 -= x;
        next.cam[c].cam[3] -= x;
        next.pka[c].ac1_act += x;

        let d = &mut next.pka[c];

        // First order, so no volume scaling
        let x = self.atp_camp.step(tick, cur.atp, 1.0, cur.camp);
        d.atp -= x;
        d.camp += x;

        // cAMP binding: (rate, bound form, product) as (a = cAMP, b, ab)
        let binding = [
            (&self.r2c2_b, cur.r2c2, cur.r2c2_b),
            (&self.r2c2_b1, cur.r2c2_b, cur.r2c2_bb),
            (&self.r2c2_a1, cur.r2c2_b, cur.r2c2_ab),
            (&self.r2c2_a2, cur.r2c2_bb, cur.r2c2_abb),
            (&self.r2c2_b2, cur.r2c2_ab, cur.r2c2_abb),
            (&self.r2c2_a, cur.r2c2_abb, cur.r2c2_4),
            (&self.r2c_a3, cur.r2c_3, cur.r2c_4),
            (&self.r2_a4, cur.r2_3, cur.r2_4),
        ];
        // Last slot is PDE hydrolysis, which draws on the same cAMP
        let mut camp_draw = [0.0; 9];
        for (m, (r, b, ab)) in camp_draw.iter_mut().zip(binding) {
            *m = r.step_k(tick, kf, cur.camp, b, ab);
        }
        camp_draw[8] = self.pde_camp.step_k(tick, kf, cur.camp, cur.pde);
        limit_shared(tick, cur.camp, &mut camp_draw);
        // R2C2_B feeds B1 and A1 and also releases cAMP
        let mut b_draw = [-camp_draw[0], camp_draw[1], camp_draw[2]];
        limit_shared(tick, cur.r2c2_b, &mut b_draw);
        camp_draw[0] = -b_draw[0];
        camp_draw[1] = b_draw[1];
        camp_draw[2] = b_draw[2];

        let moved = &camp_draw[..8];
        d.camp -= camp_draw.iter().sum::<f64>();
        d.amp += camp_draw[8];
        d.r2c2 -= moved[0];
        d.r2c2_b += moved[0] - moved[1] - moved[2];
        d.r2c2_bb += moved[1] - moved[3];
        d.r2c2_ab += moved[2] - moved[4];
        d.r2c2_abb += moved[3] + moved[4] - moved[5];
        d.r2c2_4 += moved[5];
        d.r2c_3 -= moved[6];
        d.r2c_4 += moved[6];
        d.r2_3 -= moved[7];
        d.r2_4 += moved[7];

        // Catalytic subunit rebinding; negative values are releases
        let mut rebind = [
            self.r2c_3.step_k(tick, kf, cur.pka_act, cur.r2c_3, cur.r2c2_abb),
            self.r2c_4.step_k(tick, kf, cur.pka_act, cur.r2c_4, cur.r2c2_4),
            self.r2_3.step_k(tick, kf, cur.pka_act, cur.r2_3, cur.r2c_3),
            self.r2_4.step_k(tick, kf, cur.pka_act, cur.r2_4, cur.r2c_4),
        ];
        limit_shared(tick, cur.pka_act, &mut rebind);
        d.pka_act -= rebind.iter().sum::<f64>();
        d.r2c_3 += rebind[2] - rebind[0];
        d.r2c2_abb += rebind[0];
        d.r2c_4 += rebind[3] - rebind[1];
        d.r2c2_4 += rebind[1];
        d.r2_3 -= rebind[2];
        d.r2_4 -= rebind[3];

        let x = self.ac1_atp.step_k(tick, kf, cur.atp, cur.ac1_act);
        d.atp -= x;
        d.camp += x;

        d.atp += self.atp_pool[c].step(tick, cur.atp);
        d.amp += self.amp_pool[c].step(tick, cur.amp);
        d.pde += self.pde_pool[c].step(tick, cur.pde);
    }

    fn step_diffuse(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        let tick = &cx.tick;
        let (vc, vp) = (cx.geometry.cyt, cx.geometry.psd);
        let cur = &cx.current.pka;
        let d = &mut next.pka;

        macro_rules! diffuse {
            ($rate:expr, $($field:ident),+) => {
                $(
                    let (a, b) = $rate.step(tick, cur.cyt.$field, cur.psd.$field, vc, vp);
                    d.cyt.$field += a;
                    d.psd.$field += b;
                )+
            };
        }

        diffuse!(
            self.diffuse_pka,
            r2c2,
            r2c2_b,
            r2c2_bb,
            r2c2_ab,
            r2c2_abb,
            r2c2_4,
            r2c_3,
            r2c_4,
            r2_3,
            r2_4
        );
        diffuse!(self.diffuse_camp, camp, pde);
    }
}

impl Module for PKAParams {
    fn name(&self) -> &'static str {
        "PKA"
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let reactions = [
            ("PKA.cam_ac1", &self.cam_ac1),
            ("PKA.atp_camp", &self.atp_camp),
            ("PKA.r2c2_b", &self.r2c2_b),
            ("PKA.r2c2_b1", &self.r2c2_b1),
            ("PKA.r2c2_a1", &self.r2c2_a1),
            ("PKA.r2c2_a2", &self.r2c2_a2),
            ("PKA.r2c2_b2", &self.r2c2_b2),
            ("PKA.r2c2_a", &self.r2c2_a),
            ("PKA.r2c_a3", &self.r2c_a3),
            ("PKA.r2_a4", &self.r2_a4),
            ("PKA.r2c_3", &self.r2c_3),
            ("PKA.r2c_4", &self.r2c_4),
            ("PKA.r2_3", &self.r2_3),
            ("PKA.r2_4", &self.r2_4),
        ];
        for (name, r) in reactions {
            r.check(name)?;
        }
        self.ac1_atp.check("PKA.ac1_atp")?;
        self.pde_camp.check("PKA.pde_camp")?;
        for c in Compartment::ALL {
            self.atp_pool[c].check("PKA.atp_pool")?;
            self.amp_pool[c].check("PKA.amp_pool")?;
            self.pde_pool[c].check("PKA.pde_pool")?;
        }
        self.diffuse_pka.check("PKA.diffuse_pka")?;
        self.diffuse_camp.check("PKA.diffuse_camp")
    }

    fn step(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        for c in Compartment::ALL {
            self.step_region(cx, c, next);
        }
        self.step_diffuse(cx, next);
    }
}
