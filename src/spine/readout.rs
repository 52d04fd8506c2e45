//! Readouts and diagnostics.

use serde::Serialize;

use super::{SpeciesTotals, SpineState};
use crate::kinetics::{ClampStats, Compartment, Compartments, SpineGeometry};
use crate::receptors::AMPARLocation;

/// Observables of one spine, concentrations in μM
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpineReadout {
    pub time_sec: f64,
    /// Trapped AMPA receptors (N), the synaptic-strength readout
    pub trp_tot: f64,
    pub ca_uM: Compartments<f64>,
    pub camkii_act_uM: Compartments<f64>,
    pub can_act_uM: Compartments<f64>,
    pub pka_act_uM: Compartments<f64>,
    pub pp1_act_uM: Compartments<f64>,
    pub dapk1_act_uM: Compartments<f64>,
    /// NMDAR Ca²⁺ flux (μM/s into the PSD)
    pub nmdar_jca: f64,
    /// NMDAR conductance
    pub nmdar_g: f64,
    pub nmdar_nopen: f64,
    /// Mg²⁺ unblock factor
    pub nmdar_mg: f64,
}

impl SpineReadout {
    pub fn capture(state: &SpineState, geom: &SpineGeometry) -> Self {
        let uM = |f: &dyn Fn(Compartment) -> f64| {
            Compartments::from_fn(|c| geom.to_concentration(c, f(c)))
        };
        Self {
            time_sec: state.time_sec,
            trp_tot: state.ampar.trp.total(),
            ca_uM: uM(&|c| state.ca[c]),
            camkii_act_uM: uM(&|c| state.camkii[c].auto.act),
            can_act_uM: uM(&|c| state.can[c].act),
            pka_act_uM: uM(&|c| state.pka[c].pka_act),
            pp1_act_uM: uM(&|c| state.pp1[c].pp1_act),
            dapk1_act_uM: uM(&|c| state.dapk1[c].auto.act),
            nmdar_jca: state.nmdar.jca,
            nmdar_g: state.nmdar.g,
            nmdar_nopen: state.nmdar.nopen,
            nmdar_mg: state.nmdar.mg,
        }
    }
}

/// Snapshot for the diagnostics binary and `validate_state`
#[derive(Debug, Clone, Serialize)]
pub struct SpineDiagnostics {
    pub readout: SpineReadout,
    pub totals: SpeciesTotals,
    pub initial_totals: SpeciesTotals,
    /// AMPA receptors per location (N): Cyt, Int, PSD, Trp
    pub ampar: [f64; 4],
    /// Free GluN2B sites (N)
    pub glun2b: f64,
    /// PP2A (μM)
    pub pp2a_uM: f64,
    pub clamps: ClampStats,
    pub glutamate_dropped: u64,
}

impl SpineDiagnostics {
    pub fn capture(
        state: &SpineState,
        geom: &SpineGeometry,
        initial_totals: SpeciesTotals,
        clamps: ClampStats,
        glutamate_dropped: u64,
    ) -> Self {
        Self {
            readout: SpineReadout::capture(state, geom),
            totals: state.totals(),
            initial_totals,
            ampar: AMPARLocation::ALL.map(|l| state.ampar.at(l).total()),
            glun2b: state.nmdar.glun2b,
            pp2a_uM: geom.to_concentration(Compartment::Cytosol, state.pp2a),
            clamps,
            glutamate_dropped,
        }
    }

    /// Print a formatted summary
    pub fn print_summary(&self) {
        let r = &self.readout;
        println!("=== Spine State (t = {:.3} s) ===", r.time_sec);
        println!();
        println!("Calcium:");
        println!("  Ca (Cyt):      {:.4} μM (rest: 0.05 μM)", r.ca_uM.cyt);
        println!("  Ca (PSD):      {:.4} μM", r.ca_uM.psd);
        println!();
        println!("Kinases / Phosphatases (Cyt | PSD, μM):");
        println!("  CaMKII act:    {:.4} | {:.4}", r.camkii_act_uM.cyt, r.camkii_act_uM.psd);
        println!("  CaN act:       {:.2e} | {:.2e}", r.can_act_uM.cyt, r.can_act_uM.psd);
        println!("  PKA act:       {:.2e} | {:.2e}", r.pka_act_uM.cyt, r.pka_act_uM.psd);
        println!("  PP1 act:       {:.4} | {:.4}", r.pp1_act_uM.cyt, r.pp1_act_uM.psd);
        println!("  DAPK1 act:     {:.4} | {:.4}", r.dapk1_act_uM.cyt, r.dapk1_act_uM.psd);
        println!("  PP2A (Cyt):    {:.5}", self.pp2a_uM);
        println!();
        println!("AMPA Receptors:");
        println!("  Cyt / Int / PSD / Trp: {:.3} / {:.3} / {:.3} / {:.3}",
            self.ampar[0], self.ampar[1], self.ampar[2], self.ampar[3]);
        println!("  Trapped:       {:.4}", r.trp_tot);
        println!();
        println!("NMDA Receptor:");
        println!("  Open:          {:.4}", r.nmdar_nopen);
        println!("  Mg unblock:    {:.4}", r.nmdar_mg);
        println!("  Jca:           {:.4} μM/s", r.nmdar_jca);
        println!("  G:             {:.4}", r.nmdar_g);
        println!("  GluN2B free:   {:.4}", self.glun2b);
        println!();
        println!("Conservation:");
        println!("  CaMKII drift:  {:.2e}", drift(self.totals.camkii, self.initial_totals.camkii));
        println!("  CaM drift:     {:.2e}", drift(self.totals.cam, self.initial_totals.cam));
        println!("  AMPAR drift:   {:.2e}", drift(self.totals.ampar, self.initial_totals.ampar));
        println!();
        println!("Clamp events:    {} (integrate {}, transfer {})",
            self.clamps.total(), self.clamps.integrate, self.clamps.transfer);
        if self.glutamate_dropped > 0 {
            println!("Glutamate releases dropped: {}", self.glutamate_dropped);
        }
    }

    /// Print a one-line row for time series
    pub fn print_row_header() {
        println!("{:>8} {:>10} {:>10} {:>10} {:>10} {:>8}",
            "Time(s)", "Ca(uM)", "CaMKII", "CaN", "PP1", "Trp");
    }

    pub fn print_row(&self) {
        let r = &self.readout;
        println!("{:8.3} {:10.4} {:10.4} {:10.2e} {:10.4} {:8.4}",
            r.time_sec,
            r.ca_uM.cyt,
            r.camkii_act_uM.cyt,
            r.can_act_uM.cyt,
            r.pp1_act_uM.cyt,
            r.trp_tot);
    }
}

fn drift(now: f64, initial: f64) -> f64 {
    if initial > 0.0 {
        (now - initial) / initial
    } else {
        0.0
    }
}
