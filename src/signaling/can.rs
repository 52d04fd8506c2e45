//! Calcineurin (PP2B): Ca²⁺ and 3Ca-CaM dependent phosphatase.
//!
//! CaN binds up to two Ca²⁺ pairs on its B subunit and 3Ca-CaM on its
//! catalytic subunit; only the fully loaded form (Ca₂-CaN-CaM) is active.

use serde::Serialize;

use super::ca::CA_REST_UM;
use super::{Module, SpeciesCounts, StepContext};
use crate::config::{InitPolicy, SimConfig};
use crate::error::ConfigError;
use crate::kinetics::{Compartment, Compartments, React, SpineGeometry};
use crate::spine::SpineState;

/// Total calcineurin per compartment (μM)
pub const CAN_TOTAL_UM: f64 = 3.0;

/// One Ca²⁺ level of calcineurin (N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CaNLevel {
    pub can: f64,
    pub can_cam: f64,
}

/// Calcineurin in one compartment (N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CaNVars {
    pub ca: [CaNLevel; 3],
    /// Active CaN = `ca[2].can_cam`, refreshed at integration
    pub act: f64,
}

impl CaNVars {
    pub fn update_act(&mut self) {
        self.act = self.ca[2].can_cam;
    }

    pub fn total(&self) -> f64 {
        self.count_sum()
    }
}

impl SpeciesCounts for CaNVars {
    fn visit_counts(&mut self, f: &mut dyn FnMut(&mut f64)) {
        for lvl in self.ca.iter_mut() {
            f(&mut lvl.can);
            f(&mut lvl.can_cam);
        }
    }
}

/// CaN Ca²⁺ and CaM binding constants (all against the cytosol volume)
#[derive(Debug, Clone, Serialize)]
pub struct CaNParams {
    /// CaN + 3Ca-CaM ⇌ CaN-CaM (40 μM⁻¹s⁻¹, 0.04 s⁻¹)
    pub can_cam: React,
    /// Ca + CaN ⇌ CaCaN (20, 1)
    pub ca_can01: React,
    /// Ca + CaCaN ⇌ 2CaCaN (10, 2)
    pub ca_can12: React,
}

impl CaNParams {
    pub fn new(geom: &SpineGeometry) -> Self {
        Self {
            can_cam: React::with_volume(40.0, geom.cyt, 0.04),
            ca_can01: React::with_volume(20.0, geom.cyt, 1.0),
            ca_can12: React::with_volume(10.0, geom.cyt, 2.0),
        }
    }

    /// Equilibrium distribution of `total_uM` at the given Ca²⁺ and 3Ca-CaM
    /// concentrations (μM), used to seed the baseline state.
    pub fn equilibrium_uM(&self, geom: &SpineGeometry, total_uM: f64, ca_uM: f64, cam3_uM: f64) -> [CaNLevel; 3] {
        // Dissociation constants back in μM
        let q = geom.cyt.quantity_per_uM();
        let kd = |r: &React| if r.kf > 0.0 { r.kb / (r.kf * q) } else { f64::INFINITY };
        let r01 = ca_uM / kd(&self.ca_can01);
        let r12 = ca_uM / kd(&self.ca_can12);
        let rcam = cam3_uM / kd(&self.can_cam);
        let ladder = [1.0, r01, r01 * r12];
        let norm: f64 = ladder.iter().sum::<f64>() * (1.0 + rcam);
        ladder.map(|w| {
            let can = total_uM * w / norm;
            CaNLevel {
                can,
                can_cam: can * rcam,
            }
        })
    }

    fn step_region(&self, cx: &StepContext<'_>, c: Compartment, next: &mut SpineState) {
        let tick = &cx.tick;
        let kf = cx.kf(c);
        let cur = &cx.current.can[c];
        let cam3 = cx.current.cam[c].cam[3];
        let ca = cx.signals.get(c).ca;

        for i in 0..3 {
            let x = self
                .can_cam
                .step_k(tick, kf, cur.ca[i].can, cam3, cur.ca[i].can_cam);
            next.can[c].ca[i].can -= x;
            next.cam[c].cam[3] -= x;
            next.can[c].ca[i].can_cam += x;
        }

        for (i, r) in [&self.ca_can01, &self.ca_can12].into_iter().enumerate() {
            let x = r.step_k(tick, kf, cur.ca[i].can, ca, cur.ca[i + 1].can);
            next.can[c].ca[i].can -= x;
            next.can[c].ca[i + 1].can += x;
            next.ca[c] -= x;
            let x = r.step_k(tick, kf, cur.ca[i].can_cam, ca, cur.ca[i + 1].can_cam);
            next.can[c].ca[i].can_cam -= x;
            next.can[c].ca[i + 1].can_cam += x;
            next.ca[c] -= x;
        }
    }
}

pub(crate) fn initial(
    params: &CaNParams,
    geom: &SpineGeometry,
    config: &SimConfig,
    cam: &Compartments<super::CaMVars>,
) -> Compartments<CaNVars> {
    Compartments::from_fn(|c| {
        let levels_uM = match config.init {
            InitPolicy::Fresh => {
                let mut levels = [CaNLevel::default(); 3];
                levels[0].can = CAN_TOTAL_UM;
                levels
            }
            InitPolicy::Baseline => {
                let cam3_uM = geom.to_concentration(c, cam[c].cam[3]);
                params.equilibrium_uM(geom, CAN_TOTAL_UM, CA_REST_UM, cam3_uM)
            }
        };
        let mut vars = CaNVars {
            ca: levels_uM.map(|l| CaNLevel {
                can: geom.to_quantity(c, l.can),
                can_cam: geom.to_quantity(c, l.can_cam),
            }),
            act: 0.0,
        };
        vars.update_act();
        vars
    })
}

impl Module for CaNParams {
    fn name(&self) -> &'static str {
        "CaN"
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.can_cam.check("CaN.can_cam")?;
        self.ca_can01.check("CaN.ca_can01")?;
        self.ca_can12.check("CaN.ca_can12")
    }

    fn step(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        for c in Compartment::ALL {
            self.step_region(cx, c, next);
        }
    }
}
