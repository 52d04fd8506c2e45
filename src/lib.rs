//! Spine Kinetics - dendritic spine Ca²⁺ signaling engine
//!
//! This library integrates the Ca²⁺/CaM-dependent kinase and phosphatase
//! cascade of a single spine (Urakubo et al. 2008) across cytosol and PSD,
//! ending in AMPA receptor trafficking as the plasticity readout.

// Allow non-snake-case for unit suffixes in field names (uM, fL, mV, etc.)
// This follows the project convention of including units in names.
#![allow(non_snake_case)]

pub mod config;
pub mod error;
pub mod kinetics;
pub mod receptors;
pub mod signaling;
pub mod spine;

/// Externally visible step (s)
pub const STEP_SEC: f64 = 1.0e-3;

pub use config::{InitPolicy, SimConfig};
pub use error::ConfigError;
pub use kinetics::{
    to_concentration, to_quantity, Buffer, ClampMonitor, ClampPolicy, ClampSite, ClampStats,
    Compartment, Compartments, Diffuse, Enzyme, React, SpineGeometry, Tick, Volume,
};
pub use receptors::{AMPARLocation, AMPARState, NMDARParams, NMDARState};
pub use spine::{
    SpeciesTotals, Spine, SpineDiagnostics, SpineParams, SpinePhase, SpinePopulation,
    SpineReadout, SpineState,
};
