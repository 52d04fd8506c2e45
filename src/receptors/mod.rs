//! Glutamate receptors of the spine head.
//!
//! The NMDA receptor is the Ca²⁺ source; AMPA receptors in the PSD trap are
//! the synaptic-strength readout.

pub mod ampar;
pub mod nmdar;

pub use ampar::{AMPARLocation, AMPARParams, AMPARPhosParams, AMPARState, AMPARTrafficParams, AMPARVars};
pub use nmdar::{GatingRates, NMDARGating, NMDARParams, NMDARState};
