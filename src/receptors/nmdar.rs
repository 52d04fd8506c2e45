//! NMDA receptor allosteric gating with CaM-dependent inactivation.
//!
//! Each receptor sits in one of five gating states (N0..N3, open) in one of
//! three CaM-occupancy classes: apo, 2Ca-CaM bound and 3Ca-CaM bound. A
//! glutamate release moves receptors N0 → N1 → N2 in closed form; N2 gates
//! into N3 (desensitized) and the open state, whose Ca²⁺ flux is set by the
//! voltage-dependent Mg²⁺ block.
//!
//! References:
//! - Urakubo et al. 2008, GENESIS NMDAR.c
//! - Jahr CE, Stevens CF. J Neurosci. 1990;10:3178-3182 (Mg²⁺ block)

use serde::Serialize;

use crate::config::{InitPolicy, SimConfig};
use crate::error::{check_rate, ConfigError};
use crate::kinetics::{ClampSite, Compartment};
use crate::signaling::{Module, StepContext};
use crate::spine::SpineState;

/// CaM occupancy classes
pub const NMDAR_CLASSES: usize = 3;

/// Receptor counts per gating state, indexed by CaM class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NMDARGating {
    pub n0: [f64; NMDAR_CLASSES],
    pub n1: [f64; NMDAR_CLASSES],
    pub n2: [f64; NMDAR_CLASSES],
    pub n3: [f64; NMDAR_CLASSES],
    pub no: [f64; NMDAR_CLASSES],
}

impl NMDARGating {
    pub fn open(&self) -> f64 {
        self.no.iter().sum()
    }

    pub fn class_total(&self, k: usize) -> f64 {
        self.n0[k] + self.n1[k] + self.n2[k] + self.n3[k] + self.no[k]
    }

    pub fn total(&self) -> f64 {
        (0..NMDAR_CLASSES).map(|k| self.class_total(k)).sum()
    }

    pub fn states_mut(&mut self) -> [&mut [f64; NMDAR_CLASSES]; 5] {
        [
            &mut self.n0,
            &mut self.n1,
            &mut self.n2,
            &mut self.n3,
            &mut self.no,
        ]
    }

    pub fn states(&self) -> [&[f64; NMDAR_CLASSES]; 5] {
        [&self.n0, &self.n1, &self.n2, &self.n3, &self.no]
    }

    /// `self += h * rate`, returning the negative overshoot cut off at zero
    fn add_scaled(&mut self, rate: &NMDARGating, h: f64) -> f64 {
        let mut deficit = 0.0;
        for (dst, src) in self.states_mut().into_iter().zip(rate.states()) {
            for k in 0..NMDAR_CLASSES {
                dst[k] += h * src[k];
                if dst[k] < 0.0 {
                    deficit -= dst[k];
                    dst[k] = 0.0;
                }
            }
        }
        deficit
    }
}

/// NMDAR gating state and channel outputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NMDARState {
    pub gating: NMDARGating,
    /// Free GluN2B binding sites for CaMKII and DAPK1
    pub glun2b: f64,
    /// Mg²⁺ unblock fraction
    pub mg: f64,
    /// Voltage-dependent Ca²⁺ drive, including Mg²⁺ block
    pub vca: f64,
    /// Ca²⁺ flux = Vca·Pca·Nopen
    pub jca: f64,
    /// Conductance = Mg·Gmax·Nopen (nS)
    pub g: f64,
    pub nopen: f64,
    pub ntotal: f64,
}

impl NMDARState {
    /// One receptor per spine; all GluN2B sites free
    pub fn new(config: &SimConfig) -> Self {
        let mut gating = NMDARGating::default();
        match config.init {
            InitPolicy::Fresh => gating.n1[0] = 1.0,
            InitPolicy::Baseline => gating.n0[0] = 1.0,
        }
        let mut state = Self {
            gating,
            ..Default::default()
        };
        state.update_totals();
        state.glun2b = state.ntotal;
        state
    }

    pub fn update_totals(&mut self) {
        self.nopen = self.gating.open();
        self.ntotal = self.gating.total();
    }
}

/// Closed↔open transition rates of one CaM class (s⁻¹)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GatingRates {
    pub n2_n3: f64,
    pub n3_n2: f64,
    pub n2_open: f64,
    pub open_n2: f64,
}

/// NMDAR constants
#[derive(Debug, Clone, Serialize)]
pub struct NMDARParams {
    /// Ca²⁺ flux normalization (1.7927e5 × 0.5)
    pub pca: f64,
    /// Maximal conductance (nS)
    pub gmax: f64,
    /// CaM binding per gating state N0, N1, N2, N3, open (μM⁻¹s⁻¹)
    pub kf_cam: [f64; 5],
    /// CaM unbinding per gating state (s⁻¹)
    pub kb_cam: [f64; 5],
    /// Glutamate binding N0 → N1 (μM⁻¹s⁻¹)
    pub kf1: f64,
    pub kb1: f64,
    /// Glutamate binding N1 → N2 (μM⁻¹s⁻¹)
    pub kf2: f64,
    pub kb2: f64,
    /// Ca²⁺ binding to receptor-bound 2Ca-CaM (μM⁻¹s⁻¹) and release (s⁻¹)
    pub kc2c3: f64,
    pub kc3c2: f64,
    /// Glutamate exposure per release (μM·s)
    pub glu: f64,
    /// Gating of the apo class
    pub gating_apo: GatingRates,
    /// Gating of both CaM-bound classes
    pub gating_cam: GatingRates,
    /// Internal integration sub-step (s)
    pub substep_sec: f64,
}

impl Default for NMDARParams {
    fn default() -> Self {
        Self {
            pca: 1.7927e5 * 0.5,
            gmax: 10.0,
            kf_cam: [400.0, 400.0, 4.0, 3.458, 1.994],
            kb_cam: [34.8, 34.8, 0.348, 0.891, 2.355],
            kf1: 10.0,
            kb1: 25.0,
            kf2: 5.0,
            kb2: 50.0,
            kc2c3: 25.6,
            kc3c2: 400.0,
            glu: 0.4,
            gating_apo: GatingRates {
                n2_n3: 8.0,
                n3_n2: 1.8,
                n2_open: 280.0,
                open_n2: 275.0,
            },
            gating_cam: GatingRates {
                n2_n3: 3.0,
                n3_n2: 2.0,
                n2_open: 150.0,
                open_n2: 2000.0,
            },
            substep_sec: 3.0e-5,
        }
    }
}

impl NMDARParams {
    /// Mg²⁺ unblock at `vm_mV`: 1/(1 + [Mg]/3.57·e^(−0.062·Vm)) with [Mg] = 1.5 mM
    pub fn mg_unblock(vm_mV: f64) -> f64 {
        1.0 / (1.0 + 0.4202 * (-0.062 * vm_mV).exp())
    }

    /// GHK-style Ca²⁺ drive −Vm/(1 − e^(0.0756·Vm)), times the Mg²⁺ unblock
    pub fn ca_drive(vm_mV: f64, mg: f64) -> f64 {
        const A: f64 = 0.0756;
        if vm_mV.abs() < 0.1 {
            // First-order expansion around 0 mV
            (1.0 / A - 0.5 * vm_mV) * mg
        } else {
            -vm_mV / (1.0 - (A * vm_mV).exp()) * mg
        }
    }

    /// Apply one glutamate release in closed form: N0 → N1 → N2 within
    /// every CaM class, for an exposure of `glu` μM·s.
    pub fn release_glutamate(&self, state: &mut NMDARState) {
        let t = self.glu;
        let (k1, k2) = (self.kf1, self.kf2);
        let e1 = (-k1 * t).exp();
        let e2 = (-k2 * t).exp();
        let g = &mut state.gating;
        for k in 0..NMDAR_CLASSES {
            let (n0, n1, n2) = (g.n0[k], g.n1[k], g.n2[k]);
            let new_n0 = n0 * e1;
            let feed = if (k2 - k1).abs() > 1e-12 {
                n0 * k1 / (k2 - k1) * (e1 - e2)
            } else {
                n0 * k1 * t * e1
            };
            let new_n1 = n1 * e2 + feed;
            g.n0[k] = new_n0;
            g.n1[k] = new_n1;
            g.n2[k] = n2 - (new_n1 - n1) - (new_n0 - n0);
        }
        state.update_totals();
    }

    /// Time derivative of the gating counts.
    ///
    /// `ca`, `cam2` and `cam3` are PSD concentrations in μM.
    pub fn gating_rate(&self, s: &NMDARGating, ca: f64, cam2: f64, cam3: f64) -> NMDARGating {
        let mut d = NMDARGating::default();
        for k in 0..NMDAR_CLASSES {
            let r = if k == 0 { &self.gating_apo } else { &self.gating_cam };
            d.n0[k] = s.n1[k] * self.kb1;
            d.n1[k] = s.n2[k] * self.kb2 - s.n1[k] * self.kb1;
            d.n2[k] = s.n3[k] * r.n3_n2 + s.no[k] * r.open_n2 - s.n2[k] * (self.kb2 + r.n2_n3 + r.n2_open);
            d.n3[k] = s.n2[k] * r.n2_n3 - s.n3[k] * r.n3_n2;
            d.no[k] = s.n2[k] * r.n2_open - s.no[k] * r.open_n2;
        }

        // 2Ca-CaM binds apo receptors into class 1, 3Ca-CaM into class 2;
        // Ca²⁺ exchange moves receptors between classes 1 and 2
        let states = s.states();
        let mut flux = [[0.0; 3]; 5];
        for (i, x) in states.iter().enumerate() {
            let to1 = self.kf_cam[i] * x[0] * cam2 - self.kb_cam[i] * x[1];
            let to2 = self.kf_cam[i] * x[0] * cam3 - self.kb_cam[i] * x[2];
            let up = self.kc2c3 * x[1] * ca - self.kc3c2 * x[2];
            flux[i] = [-to1 - to2, to1 - up, to2 + up];
        }
        for (dst, f) in d.states_mut().into_iter().zip(flux) {
            for k in 0..NMDAR_CLASSES {
                dst[k] += f[k];
            }
        }
        d
    }

    /// Explicit Euler over `dt` in sub-steps no longer than `substep_sec`.
    ///
    /// Returns the advanced gating, the mean open count over the interval and
    /// the total negative overshoot clamped away.
    pub fn integrate_gating(
        &self,
        start: &NMDARGating,
        dt: f64,
        ca: f64,
        cam2: f64,
        cam3: f64,
    ) -> (NMDARGating, f64, f64) {
        let n = (dt / self.substep_sec).ceil().max(1.0) as usize;
        let h = dt / n as f64;
        let mut g = *start;
        let mut open_sum = 0.0;
        let mut clamped = 0.0;
        for _ in 0..n {
            let rate = self.gating_rate(&g, ca, cam2, cam3);
            clamped += g.add_scaled(&rate, h);
            open_sum += g.open();
        }
        (g, open_sum / n as f64, clamped)
    }
}

impl Module for NMDARParams {
    fn name(&self) -> &'static str {
        "NMDAR"
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.substep_sec.is_finite() && self.substep_sec > 0.0) {
            return Err(ConfigError::InvalidNmdarSubstep(self.substep_sec));
        }
        let scalars = [
            ("NMDAR.pca", self.pca),
            ("NMDAR.gmax", self.gmax),
            ("NMDAR.kf1", self.kf1),
            ("NMDAR.kb1", self.kb1),
            ("NMDAR.kf2", self.kf2),
            ("NMDAR.kb2", self.kb2),
            ("NMDAR.kc2c3", self.kc2c3),
            ("NMDAR.kc3c2", self.kc3c2),
            ("NMDAR.glu", self.glu),
        ];
        for (name, v) in scalars {
            check_rate(name, v)?;
        }
        for (&kf, &kb) in self.kf_cam.iter().zip(&self.kb_cam) {
            check_rate("NMDAR.kf_cam", kf)?;
            check_rate("NMDAR.kb_cam", kb)?;
        }
        for r in [&self.gating_apo, &self.gating_cam] {
            for v in [r.n2_n3, r.n3_n2, r.n2_open, r.open_n2] {
                check_rate("NMDAR.gating", v)?;
            }
        }
        Ok(())
    }

    fn step(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        let psd = Compartment::Psd;
        let sig = cx.signals.get(psd);
        let to_uM = |n: f64| cx.geometry.to_concentration(psd, n);
        let cur = &cx.current.nmdar;

        let (gating, mean_open, clamped) = self.integrate_gating(
            &cur.gating,
            cx.tick.dt,
            to_uM(sig.ca),
            to_uM(sig.cam2),
            to_uM(sig.cam3),
        );
        if clamped > 0.0 {
            cx.tick.record(ClampSite::Integrate, -clamped, 0.0);
        }

        let vm = cx.signals.vm_mV;
        let mg = Self::mg_unblock(vm);
        let vca = Self::ca_drive(vm, mg);
        let jca = vca * self.pca * mean_open;

        let d = &mut next.nmdar;
        for (dst, (new, old)) in d
            .gating
            .states_mut()
            .into_iter()
            .zip(gating.states().into_iter().zip(cur.gating.states()))
        {
            for k in 0..NMDAR_CLASSES {
                dst[k] += new[k] - old[k];
            }
        }
        d.mg = mg;
        d.vca = vca;
        d.jca = jca;
        d.g = mg * self.gmax * mean_open;

        next.ca.psd += jca * cx.geometry.psd.quantity_per_uM() * cx.tick.dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mg_block_relieved_by_depolarization() {
        let rest = NMDARParams::mg_unblock(-70.0);
        let depol = NMDARParams::mg_unblock(-20.0);
        assert!(rest < 0.05, "Mg unblock at rest {}", rest);
        assert!(depol > rest * 5.0);
    }

    #[test]
    fn test_ca_drive_continuous_near_zero() {
        let mg = 1.0;
        let inside = NMDARParams::ca_drive(0.09, mg);
        let outside = NMDARParams::ca_drive(0.11, mg);
        assert!((inside - outside).abs() < 0.05, "{} vs {}", inside, outside);
        assert!((NMDARParams::ca_drive(0.0, mg) - 1.0 / 0.0756).abs() < 1e-12);
    }

    #[test]
    fn test_release_conserves_receptors() {
        let params = NMDARParams::default();
        let mut state = NMDARState::new(&SimConfig::default());
        params.release_glutamate(&mut state);
        assert!((state.ntotal - 1.0).abs() < 1e-12);
        assert!(state.gating.n2[0] > 0.1, "N2 after release {}", state.gating.n2[0]);
        assert!(state.gating.n0[0] < 0.05);
    }

    #[test]
    fn test_release_with_equal_binding_rates() {
        let params = NMDARParams {
            kf2: 10.0,
            ..Default::default()
        };
        let mut state = NMDARState::new(&SimConfig::default());
        params.release_glutamate(&mut state);
        assert!(state.gating.n1[0].is_finite());
        assert!((state.gating.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gating_conserves_receptors() {
        let params = NMDARParams::default();
        let mut state = NMDARState::new(&SimConfig::default());
        params.release_glutamate(&mut state);
        let (g, mean_open, clamped) = params.integrate_gating(&state.gating, 1e-3, 1.0, 0.5, 0.1);
        assert_eq!(clamped, 0.0);
        assert!(mean_open > 0.0);
        assert!((g.total() - 1.0).abs() < 1e-9, "total {}", g.total());
        assert!(g.class_total(1) > 0.0 && g.class_total(2) > 0.0);
    }

    #[test]
    fn test_no_opening_without_glutamate() {
        let params = NMDARParams::default();
        let state = NMDARState::new(&SimConfig::default());
        let (g, mean_open, _) = params.integrate_gating(&state.gating, 1e-3, 0.05, 0.01, 0.0);
        assert_eq!(mean_open, 0.0);
        assert_eq!(g.open(), 0.0);
    }
}
