//! Free Ca²⁺: extrusion toward rest and Cyt ↔ PSD exchange.
//!
//! Extrusion constants follow the efflux pumps of the Urakubo (2008) GENESIS
//! model: K = 1.0426e5·0.8/12 s⁻¹ (Cyt) and 1.7927e5·0.8/12 s⁻¹ (PSD), both
//! toward 0.05 μM.

use serde::Serialize;

use super::{Module, StepContext};
use crate::error::ConfigError;
use crate::kinetics::{Buffer, Compartment, Compartments, Diffuse, SpineGeometry};
use crate::spine::SpineState;

/// Resting free Ca²⁺ (μM)
pub const CA_REST_UM: f64 = 0.05;

/// Ca²⁺ extrusion and diffusion constants
#[derive(Debug, Clone, Serialize)]
pub struct CaParams {
    /// Soft clamp toward resting Ca²⁺ per compartment
    pub buffer: Compartments<Buffer>,

    /// Free Ca²⁺ diffusion, D ≈ 220 μm²/s over the 0.15 μm neck
    pub diffuse: Diffuse,
}

impl CaParams {
    pub fn new(geom: &SpineGeometry) -> Self {
        Self {
            buffer: Compartments::new(
                Buffer::with_target(1.0426e5 * 0.8 / 12.0, CA_REST_UM, geom.cyt),
                Buffer::with_target(1.7927e5 * 0.8 / 12.0, CA_REST_UM, geom.psd),
            ),
            diffuse: Diffuse::symmetric(220.0 / 0.0225),
        }
    }

    /// Move the extrusion target (μM), e.g. for Ca-target protocols
    pub fn set_target(&mut self, geom: &SpineGeometry, cyt_uM: f64, psd_uM: f64) {
        self.buffer.cyt.target = geom.to_quantity(Compartment::Cytosol, cyt_uM.max(0.0));
        self.buffer.psd.target = geom.to_quantity(Compartment::Psd, psd_uM.max(0.0));
    }
}

pub(crate) fn initial(geom: &SpineGeometry) -> Compartments<f64> {
    Compartments::new(
        geom.to_quantity(Compartment::Cytosol, CA_REST_UM),
        geom.to_quantity(Compartment::Psd, CA_REST_UM),
    )
}

impl Module for CaParams {
    fn name(&self) -> &'static str {
        "Ca"
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.buffer.cyt.check("Ca.buffer.cyt")?;
        self.buffer.psd.check("Ca.buffer.psd")?;
        self.diffuse.check("Ca.diffuse")
    }

    fn step(&self, cx: &StepContext<'_>, next: &mut SpineState) {
        let cur = &cx.current.ca;
        for c in Compartment::ALL {
            next.ca[c] += self.buffer[c].step(&cx.tick, cur[c]);
        }
        let (d_cyt, d_psd) =
            self.diffuse
                .step(&cx.tick, cur.cyt, cur.psd, cx.geometry.cyt, cx.geometry.psd);
        next.ca.cyt += d_cyt;
        next.ca.psd += d_psd;
    }
}
