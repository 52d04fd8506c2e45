//! Protein phosphatase 2A, cytosol only.
//!
//! PP2A is not itself regulated in this model; it acts as a constant-level
//! phosphatase on CaMKII Thr286, DAPK1 Ser308, I-1P and AMPAR Ser845.

use serde::Serialize;

use super::{Module, StepContext};
use crate::config::{InitPolicy, SimConfig};
use crate::error::ConfigError;
use crate::kinetics::{Buffer, SpineGeometry};
use crate::spine::SpineState;

/// Buffered PP2A level (μM)
pub const PP2A_TARGET_UM: f64 = 0.03;

#[derive(Debug, Clone, Serialize)]
pub struct PP2AParams {
    /// Relaxation toward [`PP2A_TARGET_UM`]
    pub buffer: Buffer,
}

impl PP2AParams {
    pub fn new(geom: &SpineGeometry) -> Self {
        Self {
            buffer: Buffer::with_target(1.0, PP2A_TARGET_UM, geom.cyt),
        }
    }
}

pub(crate) fn initial(geom: &SpineGeometry, config: &SimConfig) -> f64 {
    let uM = match (config.init, config.use_dapk1) {
        (InitPolicy::Fresh, _) => PP2A_TARGET_UM,
        (InitPolicy::Baseline, false) => 0.02239,
        (InitPolicy::Baseline, true) => 0.01849,
    };
    crate::kinetics::to_quantity(uM, geom.cyt)
}

impl Module for PP2AParams {
    fn name(&self) -> &'static str {
        "PP2A"
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.buffer.check("PP2A.buffer")
    }

    fn step(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        next.pp2a += self.buffer.step(&cx.tick, cx.current.pp2a);
    }
}
