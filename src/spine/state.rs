//! One snapshot of every species in the spine.

use serde::Serialize;

use super::SpineParams;
use crate::config::SimConfig;
use crate::kinetics::{ClampMonitor, ClampSite, Compartment, Compartments, SpineGeometry};
use crate::receptors::{AMPARLocation, AMPARState, AMPARVars, NMDARState};
use crate::signaling::{
    ca, cam, camkii, can, dapk1, pka, pp1, pp2a, CaMKIIVars, CaMVars, CaNVars, DAPK1Vars, PKAVars,
    PP1Vars, SpeciesCounts,
};

/// Complete spine state (molecule counts unless noted)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpineState {
    /// Simulated time (s)
    pub time_sec: f64,
    /// Spine membrane potential (mV)
    pub vm_mV: f64,
    /// Free Ca²⁺
    pub ca: Compartments<f64>,
    pub cam: Compartments<CaMVars>,
    pub camkii: Compartments<CaMKIIVars>,
    pub can: Compartments<CaNVars>,
    pub pka: Compartments<PKAVars>,
    pub pp1: Compartments<PP1Vars>,
    /// Cytosolic PP2A
    pub pp2a: f64,
    pub dapk1: Compartments<DAPK1Vars>,
    pub ampar: AMPARState,
    pub nmdar: NMDARState,
}

/// Resting membrane potential (mV)
pub const REST_VM_MV: f64 = -65.0;

impl SpineState {
    /// Initial values for `config.init`
    pub fn init(geom: &SpineGeometry, config: &SimConfig, params: &SpineParams) -> Self {
        let cam = cam::initial(geom, config);
        let can = can::initial(&params.can, geom, config, &cam);
        Self {
            time_sec: 0.0,
            vm_mV: REST_VM_MV,
            ca: ca::initial(geom),
            cam,
            camkii: camkii::initial(geom, config),
            can,
            pka: pka::initial(geom, config),
            pp1: pp1::initial(geom, config),
            pp2a: pp2a::initial(geom, config),
            dapk1: dapk1::initial(geom, config, params.dapk1.auto_k),
            ampar: AMPARState::new(),
            nmdar: NMDARState::new(config),
        }
    }

    /// Zero negative counts and refresh derived values
    pub fn integrate(&mut self, monitor: &ClampMonitor, dapk1_auto_k: f64) {
        self.visit_counts(&mut |x| {
            if *x < 0.0 {
                monitor.record(ClampSite::Integrate, *x, 0.0);
                *x = 0.0;
            }
        });
        for c in Compartment::ALL {
            self.camkii[c].update_auto();
            self.dapk1[c].update_auto(dapk1_auto_k);
            self.can[c].update_act();
        }
        self.nmdar.update_totals();
    }

    /// Conserved totals
    pub fn totals(&self) -> SpeciesTotals {
        let mut totals = SpeciesTotals::default();
        for c in Compartment::ALL {
            let camkii = &self.camkii[c];
            let dapk1 = &self.dapk1[c];
            totals.camkii += camkii.total();
            totals.dapk1 += dapk1.total();
            totals.pp1 += self.pp1[c].pp1_total();
            totals.i1 += self.pp1[c].i1_total();

            let bound_camkii: f64 = camkii.ca.iter().chain(&camkii.n2b).map(|b| b.cam + b.cam_p).sum();
            let bound_dapk1: f64 = dapk1.ca.iter().chain(&dapk1.n2b).map(|b| b.cam + b.cam_p).sum();
            let bound_can: f64 = self.can[c].ca.iter().map(|l| l.can_cam).sum();
            totals.cam += self.cam[c].cam.iter().sum::<f64>()
                + bound_camkii
                + bound_dapk1
                + bound_can
                + self.pka[c].ac1_act;
        }
        totals.ampar = self.ampar.total();
        totals
    }

    /// True if every count is finite
    pub fn is_finite(&self) -> bool {
        let mut copy = self.clone();
        let mut finite = copy.time_sec.is_finite() && copy.vm_mV.is_finite();
        copy.visit_counts(&mut |x| finite &= x.is_finite());
        finite
    }
}

fn visit_ampar(v: &mut AMPARVars, f: &mut dyn FnMut(&mut f64)) {
    f(&mut v.dd);
    f(&mut v.pd);
    f(&mut v.dp);
    f(&mut v.pp);
}

impl SpeciesCounts for SpineState {
    fn visit_counts(&mut self, f: &mut dyn FnMut(&mut f64)) {
        f(&mut self.ca.cyt);
        f(&mut self.ca.psd);
        self.cam.visit_counts(f);
        self.camkii.visit_counts(f);
        self.can.visit_counts(f);
        self.pka.visit_counts(f);
        self.pp1.visit_counts(f);
        f(&mut self.pp2a);
        self.dapk1.visit_counts(f);
        for loc in AMPARLocation::ALL {
            visit_ampar(self.ampar.at_mut(loc), f);
        }
        for class in self.nmdar.gating.states_mut() {
            class.iter_mut().for_each(|x| f(x));
        }
        f(&mut self.nmdar.glun2b);
    }
}

/// Totals of the conserved species (N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpeciesTotals {
    pub camkii: f64,
    /// Free and bound CaM (CaMKII, DAPK1, CaN, AC1)
    pub cam: f64,
    pub pp1: f64,
    /// I-1 in all forms, including the PP1 complex
    pub i1: f64,
    pub ampar: f64,
    pub dapk1: f64,
}

impl SpeciesTotals {
    /// Largest relative change against `reference`, over species present in it
    pub fn max_relative_drift(&self, reference: &SpeciesTotals) -> f64 {
        [
            (self.camkii, reference.camkii),
            (self.cam, reference.cam),
            (self.pp1, reference.pp1),
            (self.i1, reference.i1),
            (self.ampar, reference.ampar),
            (self.dapk1, reference.dapk1),
        ]
        .into_iter()
        .filter(|&(_, r)| r > 0.0)
        .map(|(x, r)| ((x - r) / r).abs())
        .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_zeroes_negatives() {
        let geom = SpineGeometry::default();
        let config = SimConfig::default();
        let params = SpineParams::new(&geom);
        let mut state = SpineState::init(&geom, &config, &params);
        state.ca.psd = -0.5;
        state.pp2a = -1e-3;

        let monitor = ClampMonitor::default();
        state.integrate(&monitor, params.dapk1.auto_k);
        assert_eq!(state.ca.psd, 0.0);
        assert_eq!(state.pp2a, 0.0);
        assert_eq!(monitor.stats().integrate, 2);
    }

    #[test]
    fn test_baseline_totals() {
        let geom = SpineGeometry::default();
        let params = SpineParams::new(&geom);
        let state = SpineState::init(&geom, &SimConfig::default(), &params);
        let totals = state.totals();
        assert!((totals.ampar - 6.0).abs() < 1e-12);
        assert!(totals.camkii > 0.0 && totals.cam > 0.0);
        assert_eq!(totals.dapk1, 0.0);
        assert!(state.is_finite());
        assert_eq!(state.vm_mV, REST_VM_MV);
    }

    #[test]
    fn test_drift_ignores_absent_species() {
        let a = SpeciesTotals { camkii: 100.0, ampar: 6.0, ..Default::default() };
        let b = SpeciesTotals { camkii: 101.0, ampar: 6.0, dapk1: 3.0, ..Default::default() };
        assert!((b.max_relative_drift(&a) - 0.01).abs() < 1e-12);
    }
}
