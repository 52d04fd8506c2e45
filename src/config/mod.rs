//! Simulation configuration.
//!
//! Rate constants live with their modules as code literals; this is the small
//! per-run surface (initial state policy, optional modules, integration
//! resolution, volumes, clamp handling).

mod sim_config;

pub use sim_config::{InitPolicy, SimConfig};
