//! AMPA receptor phosphorylation and trafficking.
//!
//! Each receptor carries two phosphorylation sites: GluR1 Ser845 (PKA) and the
//! PDZ-binding partner (stargazin / SAP97, CaMKII). Receptors move between four
//! locations: cytosolic stores, the extrasynaptic membrane (Int), the PSD, and
//! PSD scaffold traps (Trp). Trapped receptors are the synaptic strength readout.
//!
//! Naming: the first letter is Ser845, the second the PDZ partner; P is
//! phosphorylated, D dephosphorylated.

use serde::Serialize;

use crate::error::{check_rate, ConfigError};
use crate::kinetics::{transfer, Compartment, Tick};
use crate::signaling::{Module, StepContext};
use crate::spine::SpineState;

/// Receptors at one location by phosphorylation state (N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AMPARVars {
    pub dd: f64,
    /// Ser845 phosphorylated
    pub pd: f64,
    /// PDZ partner phosphorylated
    pub dp: f64,
    pub pp: f64,
}

impl AMPARVars {
    pub fn total(&self) -> f64 {
        self.dd + self.pd + self.dp + self.pp
    }
}

/// Receptor location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AMPARLocation {
    Cyt,
    Int,
    Psd,
    Trp,
}

impl AMPARLocation {
    pub const ALL: [AMPARLocation; 4] = [
        AMPARLocation::Cyt,
        AMPARLocation::Int,
        AMPARLocation::Psd,
        AMPARLocation::Trp,
    ];

    /// Compartment whose kinases and phosphatases act here
    pub fn compartment(self) -> Compartment {
        match self {
            AMPARLocation::Cyt | AMPARLocation::Int => Compartment::Cytosol,
            AMPARLocation::Psd | AMPARLocation::Trp => Compartment::Psd,
        }
    }
}

/// AMPAR state across the four locations
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AMPARState {
    pub cyt: AMPARVars,
    pub int: AMPARVars,
    pub psd: AMPARVars,
    pub trp: AMPARVars,
}

impl AMPARState {
    /// Three unphosphorylated and three Ser845P receptors in the membrane
    pub fn new() -> Self {
        Self {
            int: AMPARVars {
                dd: 3.0,
                pd: 3.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn at(&self, loc: AMPARLocation) -> &AMPARVars {
        match loc {
            AMPARLocation::Cyt => &self.cyt,
            AMPARLocation::Int => &self.int,
            AMPARLocation::Psd => &self.psd,
            AMPARLocation::Trp => &self.trp,
        }
    }

    pub fn at_mut(&mut self, loc: AMPARLocation) -> &mut AMPARVars {
        match loc {
            AMPARLocation::Cyt => &mut self.cyt,
            AMPARLocation::Int => &mut self.int,
            AMPARLocation::Psd => &mut self.psd,
            AMPARLocation::Trp => &mut self.trp,
        }
    }

    pub fn total(&self) -> f64 {
        AMPARLocation::ALL.iter().map(|&l| self.at(l).total()).sum()
    }
}

/// Phosphorylation constants (μM⁻¹s⁻¹ of active enzyme)
#[derive(Debug, Clone, Serialize)]
pub struct AMPARPhosParams {
    /// PKA at Ser845
    pub pka: f64,
    /// CaMKII at the PDZ partner
    pub camkii: f64,
    pub pp1_s845: f64,
    pub pp1_pdz: f64,
    pub can_s845: f64,
    pub can_pdz: f64,
    /// PP2A, cytosolic stores only
    pub pp2a_s845: f64,
    pub pp2a_pdz: f64,
}

impl Default for AMPARPhosParams {
    fn default() -> Self {
        Self {
            pka: 20.0,
            camkii: 1.0,
            pp1_s845: 4.0,
            pp1_pdz: 100.0,
            can_s845: 1.5,
            can_pdz: 1.0,
            pp2a_s845: 100.0,
            pp2a_pdz: 4.0,
        }
    }
}

/// Trafficking rates (s⁻¹)
#[derive(Debug, Clone, Serialize)]
pub struct AMPARTrafficParams {
    /// Ser845P exocytosis Cyt → Int (30 min)
    pub exo_p: f64,
    /// Ser845P endocytosis Int → Cyt (9 min)
    pub endo_p: f64,
    /// Ser845D endocytosis Int → Cyt (1 s)
    pub endo_d: f64,
    /// Int ↔ PSD lateral diffusion
    pub diffuse: f64,
    /// PDZP trapping PSD → Trp
    pub on_p: f64,
    /// PDZD trapping
    pub on_d: f64,
    /// Un-trapping Trp → PSD, any state
    pub off: f64,
}

impl Default for AMPARTrafficParams {
    fn default() -> Self {
        Self {
            exo_p: 1.0 / (30.0 * 60.0),
            endo_p: 1.0 / (9.0 * 60.0),
            endo_d: 1.0,
            diffuse: 1.0 / 0.313,
            on_p: 0.5,
            on_d: 0.03,
            off: 1.0 / 30.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AMPARParams {
    pub phos: AMPARPhosParams,
    pub traffic: AMPARTrafficParams,
}

/// Active enzyme concentrations (μM) acting at one location
#[derive(Debug, Clone, Copy, Default)]
struct Enzymes {
    pka: f64,
    camkii: f64,
    pp1: f64,
    can: f64,
    pp2a: f64,
}

impl AMPARPhosParams {
    /// Per-receptor rates (s⁻¹): (S845 on, S845 off, PDZ on, PDZ off)
    fn rates(&self, e: &Enzymes) -> (f64, f64, f64, f64) {
        (
            self.pka * e.pka,
            self.pp1_s845 * e.pp1 + self.can_s845 * e.can + self.pp2a_s845 * e.pp2a,
            self.camkii * e.camkii,
            self.pp1_pdz * e.pp1 + self.can_pdz * e.can + self.pp2a_pdz * e.pp2a,
        )
    }

    fn step(&self, tick: &Tick<'_>, cur: &AMPARVars, e: &Enzymes, d: &mut AMPARVars) {
        let (s_on, s_off, p_on, p_off) = self.rates(e);

        // Ser845
        let x = transfer(tick, s_on, cur.dd);
        d.dd -= x;
        d.pd += x;
        let x = transfer(tick, s_on, cur.dp);
        d.dp -= x;
        d.pp += x;
        let x = transfer(tick, s_off, cur.pd);
        d.pd -= x;
        d.dd += x;
        let x = transfer(tick, s_off, cur.pp);
        d.pp -= x;
        d.dp += x;

        // PDZ partner
        let x = transfer(tick, p_on, cur.dd);
        d.dd -= x;
        d.dp += x;
        let x = transfer(tick, p_on, cur.pd);
        d.pd -= x;
        d.pp += x;
        let x = transfer(tick, p_off, cur.dp);
        d.dp -= x;
        d.dd += x;
        let x = transfer(tick, p_off, cur.pp);
        d.pp -= x;
        d.pd += x;
    }
}

/// Moves `rate` of the selected states from `src` to `dst`
fn traffic(
    tick: &Tick<'_>,
    rates: [f64; 4],
    src: &AMPARVars,
    d_src: &mut AMPARVars,
    d_dst: &mut AMPARVars,
) {
    let [r_dd, r_pd, r_dp, r_pp] = rates;
    let x = transfer(tick, r_dd, src.dd);
    d_src.dd -= x;
    d_dst.dd += x;
    let x = transfer(tick, r_pd, src.pd);
    d_src.pd -= x;
    d_dst.pd += x;
    let x = transfer(tick, r_dp, src.dp);
    d_src.dp -= x;
    d_dst.dp += x;
    let x = transfer(tick, r_pp, src.pp);
    d_src.pp -= x;
    d_dst.pp += x;
}

impl AMPARTrafficParams {
    fn step(&self, tick: &Tick<'_>, cur: &AMPARState, d: &mut AMPARState) {
        let AMPARState {
            cyt,
            int,
            psd,
            trp,
        } = d;
        // Rates are listed as [DD, PD, DP, PP]
        traffic(tick, [0.0, self.exo_p, 0.0, self.exo_p], &cur.cyt, cyt, int);
        traffic(
            tick,
            [self.endo_d, self.endo_p, self.endo_d, self.endo_p],
            &cur.int,
            int,
            cyt,
        );
        traffic(tick, [self.diffuse; 4], &cur.int, int, psd);
        traffic(tick, [self.diffuse; 4], &cur.psd, psd, int);
        traffic(tick, [self.on_d, self.on_d, self.on_p, self.on_p], &cur.psd, psd, trp);
        traffic(tick, [self.off; 4], &cur.trp, trp, psd);
    }
}

impl Module for AMPARParams {
    fn name(&self) -> &'static str {
        "AMPAR"
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.phos;
        let t = &self.traffic;
        let rates = [
            ("AMPAR.phos.pka", p.pka),
            ("AMPAR.phos.camkii", p.camkii),
            ("AMPAR.phos.pp1_s845", p.pp1_s845),
            ("AMPAR.phos.pp1_pdz", p.pp1_pdz),
            ("AMPAR.phos.can_s845", p.can_s845),
            ("AMPAR.phos.can_pdz", p.can_pdz),
            ("AMPAR.phos.pp2a_s845", p.pp2a_s845),
            ("AMPAR.phos.pp2a_pdz", p.pp2a_pdz),
            ("AMPAR.traffic.exo_p", t.exo_p),
            ("AMPAR.traffic.endo_p", t.endo_p),
            ("AMPAR.traffic.endo_d", t.endo_d),
            ("AMPAR.traffic.diffuse", t.diffuse),
            ("AMPAR.traffic.on_p", t.on_p),
            ("AMPAR.traffic.on_d", t.on_d),
            ("AMPAR.traffic.off", t.off),
        ];
        for (name, v) in rates {
            check_rate(name, v)?;
        }
        Ok(())
    }

    fn step(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        let to_uM = |c: Compartment, n: f64| cx.geometry.to_concentration(c, n);
        for loc in AMPARLocation::ALL {
            let c = loc.compartment();
            let sig = cx.signals.get(c);
            let enzymes = Enzymes {
                pka: to_uM(c, sig.pka_act),
                camkii: to_uM(c, sig.camkii_act),
                pp1: to_uM(c, sig.pp1_act),
                can: to_uM(c, sig.can_act),
                // Only receptors in cytosolic stores meet PP2A
                pp2a: if loc == AMPARLocation::Cyt {
                    to_uM(c, cx.signals.pp2a_in(c))
                } else {
                    0.0
                },
            };
            self.phos
                .step(&cx.tick, cx.current.ampar.at(loc), &enzymes, next.ampar.at_mut(loc));
        }
        self.traffic.step(&cx.tick, &cx.current.ampar, &mut next.ampar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinetics::ClampMonitor;

    #[test]
    fn test_initial_membrane_pool() {
        let state = AMPARState::new();
        assert!((state.total() - 6.0).abs() < 1e-12);
        assert_eq!(state.trp.total(), 0.0);
    }

    #[test]
    fn test_traffic_conserves_receptors() {
        let monitor = ClampMonitor::default();
        let tick = Tick::new(1e-3, &monitor);
        let params = AMPARTrafficParams::default();
        let cur = AMPARState {
            cyt: AMPARVars { dd: 1.0, pd: 2.0, dp: 0.5, pp: 0.1 },
            int: AMPARVars { dd: 3.0, pd: 3.0, dp: 1.0, pp: 1.0 },
            psd: AMPARVars { dd: 0.2, pd: 0.4, dp: 0.6, pp: 0.8 },
            trp: AMPARVars { dd: 1.0, pd: 1.0, dp: 1.0, pp: 1.0 },
        };
        let mut next = cur;
        params.step(&tick, &cur, &mut next);
        assert!((next.total() - cur.total()).abs() < 1e-12);
        assert!(next.trp.dp > cur.trp.dp, "PDZP trapping should dominate");
    }

    #[test]
    fn test_pp2a_only_in_cytosolic_pool() {
        let phos = AMPARPhosParams::default();
        let with = Enzymes { pp2a: 0.03, ..Default::default() };
        let (_, s_off, _, _) = phos.rates(&with);
        assert!((s_off - 3.0).abs() < 1e-12);
        let (_, s_off, _, _) = phos.rates(&Enzymes::default());
        assert_eq!(s_off, 0.0);
    }
}
