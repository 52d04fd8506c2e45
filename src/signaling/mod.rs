//! Ca²⁺-activated signaling species.
//!
//! Every module is a fixed wiring of the kinetic primitives over its own
//! state. Within one integration tick a module reads its own species from the
//! current snapshot, reads everyone else's through [`SharedSignals`] (also taken
//! from the current snapshot) and writes deltas into the next snapshot.
//!
//! References:
//! - Urakubo H, Honda M, Froemke RC, Kuroda S. J Neurosci. 2008;28:3310-3323
//! - Dupont G, Houart G, De Koninck P. Cell Calcium. 2003;34:485-497 (CaMKII)
//! - Bradshaw JM et al. PNAS. 2003;100:10512-10517 (CaMKII autophosphorylation)

pub mod ca;
pub mod cam;
pub mod camkii;
pub mod can;
pub mod dapk1;
pub mod pka;
pub mod pp1;
pub mod pp2a;

pub use ca::CaParams;
pub use cam::{CaMParams, CaMVars};
pub use camkii::{AutoPhos, CaMBound, CaMKIIParams, CaMKIIVars};
pub use can::{CaNParams, CaNVars};
pub use dapk1::{DAPK1Params, DAPK1Vars};
pub use pka::{PKAParams, PKAVars};
pub use pp1::{PP1Params, PP1Vars};
pub use pp2a::PP2AParams;

use crate::error::ConfigError;
use crate::kinetics::{Compartment, Compartments, SpineGeometry, Tick};
use crate::spine::SpineState;

/// Common shape of a species module
pub trait Module {
    fn name(&self) -> &'static str;

    /// Reject negative or non-finite constants
    fn validate(&self) -> Result<(), ConfigError>;

    /// Accumulate this tick's deltas into `next`
    fn step(&self, cx: &StepContext<'_>, next: &mut SpineState);
}

/// Read-only inputs of one integration tick
pub struct StepContext<'a> {
    pub tick: Tick<'a>,
    pub geometry: &'a SpineGeometry,
    pub current: &'a SpineState,
    pub signals: &'a SharedSignals,
}

impl StepContext<'_> {
    /// Forward-rate multiplier of compartment `c`
    pub fn kf(&self, c: Compartment) -> f64 {
        self.geometry.kf(c)
    }
}

/// Molecule counts other modules need from one compartment
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionSignals {
    /// Free Ca²⁺ (N)
    pub ca: f64,
    /// 2Ca-CaM (N)
    pub cam2: f64,
    /// 3Ca-CaM (N)
    pub cam3: f64,
    /// Weighted active CaMKII (N)
    pub camkii_act: f64,
    /// Fully activated calcineurin (N)
    pub can_act: f64,
    /// Free PKA catalytic subunit (N)
    pub pka_act: f64,
    /// Uninhibited PP1 (N)
    pub pp1_act: f64,
    /// Weighted active DAPK1 (N)
    pub dapk1_act: f64,
}

/// Cross-module scalars captured from the current snapshot once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SharedSignals {
    pub region: Compartments<RegionSignals>,
    /// Cytosolic PP2A (N)
    pub pp2a: f64,
    /// Free GluN2B binding sites in the PSD (N)
    pub glun2b: f64,
    /// Membrane potential (mV)
    pub vm_mV: f64,
}

impl SharedSignals {
    pub fn capture(state: &SpineState) -> Self {
        let region = Compartments::new(
            RegionSignals::capture(state, Compartment::Cytosol),
            RegionSignals::capture(state, Compartment::Psd),
        );
        Self {
            region,
            pp2a: state.pp2a,
            glun2b: state.nmdar.glun2b,
            vm_mV: state.vm_mV,
        }
    }

    pub fn get(&self, c: Compartment) -> &RegionSignals {
        &self.region[c]
    }

    /// PP2A available in `c` (cytosol only)
    pub fn pp2a_in(&self, c: Compartment) -> f64 {
        match c {
            Compartment::Cytosol => self.pp2a,
            Compartment::Psd => 0.0,
        }
    }
}

impl RegionSignals {
    fn capture(state: &SpineState, c: Compartment) -> Self {
        Self {
            ca: state.ca[c],
            cam2: state.cam[c].cam[2],
            cam3: state.cam[c].cam[3],
            camkii_act: state.camkii[c].auto.act,
            can_act: state.can[c].act,
            pka_act: state.pka[c].pka_act,
            pp1_act: state.pp1[c].pp1_act,
            dapk1_act: state.dapk1[c].auto.act,
        }
    }
}

/// Visit every integrated count of a species state (derived values excluded)
pub trait SpeciesCounts {
    fn visit_counts(&mut self, f: &mut dyn FnMut(&mut f64));

    /// Sum of all counts
    fn count_sum(&self) -> f64
    where
        Self: Clone,
    {
        let mut copy = self.clone();
        let mut sum = 0.0;
        copy.visit_counts(&mut |x| sum += *x);
        sum
    }
}

impl<T: SpeciesCounts> SpeciesCounts for Compartments<T> {
    fn visit_counts(&mut self, f: &mut dyn FnMut(&mut f64)) {
        self.cyt.visit_counts(f);
        self.psd.visit_counts(f);
    }
}
