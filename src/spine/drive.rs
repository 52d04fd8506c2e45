//! External inputs: calcium injection and clamping, glutamate release.

use std::collections::VecDeque;

use crate::kinetics::{Compartment, Compartments, SpineGeometry};

/// Minimum interval between two glutamate releases (ms)
pub const GLUTAMATE_REFRACTORY_MS: f64 = 3.0;

/// Calcium delivered to the spine from outside the kinetic model
#[derive(Debug, Clone, Default)]
pub struct CalciumDrive {
    /// One-off additions folded in at the next step (N)
    pending: Compartments<f64>,
    /// Continuous injection per 1 ms step (μM)
    inject_uM: Compartments<f64>,
    /// Fixed free Ca²⁺ (μM), reapplied after every tick
    clamp_uM: Option<Compartments<f64>>,
}

impl CalciumDrive {
    pub fn add(&mut self, cyt_n: f64, psd_n: f64) {
        self.pending.cyt += cyt_n;
        self.pending.psd += psd_n;
    }

    pub fn set_clamp(&mut self, cyt_uM: f64, psd_uM: f64) {
        self.clamp_uM = Some(Compartments::new(cyt_uM.max(0.0), psd_uM.max(0.0)));
    }

    pub fn clear_clamp(&mut self) {
        self.clamp_uM = None;
    }

    pub fn is_clamped(&self) -> bool {
        self.clamp_uM.is_some()
    }

    pub fn set_inject_rate(&mut self, cyt_uM: f64, psd_uM: f64) {
        self.inject_uM = Compartments::new(cyt_uM, psd_uM);
    }

    pub fn inject_rate_uM(&self) -> Compartments<f64> {
        self.inject_uM
    }

    /// Drain the pending additions
    pub fn take_pending(&mut self) -> Compartments<f64> {
        std::mem::take(&mut self.pending)
    }

    /// Injection for one integration tick (N)
    pub fn per_tick(&self, geom: &SpineGeometry, substeps: u32) -> Compartments<f64> {
        let share = 1.0 / f64::from(substeps.max(1));
        self.inject_uM
            .map(|c, &uM| geom.to_quantity(c, uM) * share)
    }

    /// Overwrite free Ca²⁺ with the clamp values, if a clamp is active
    pub fn apply_clamp(&self, geom: &SpineGeometry, ca: &mut Compartments<f64>) {
        if let Some(clamp) = &self.clamp_uM {
            for c in Compartment::ALL {
                ca[c] = geom.to_quantity(c, clamp[c]);
            }
        }
    }
}

/// Delay-ordered glutamate releases
#[derive(Debug, Clone, Default)]
pub struct GlutamateQueue {
    /// Release times (ms), ascending
    pending: VecDeque<f64>,
    last_release_ms: Option<f64>,
    dropped: u64,
}

impl GlutamateQueue {
    /// Schedule a release `delay_ms` after `now_ms`
    pub fn push(&mut self, now_ms: f64, delay_ms: f64) {
        let at = now_ms + delay_ms.max(0.0);
        let idx = self.pending.partition_point(|&t| t <= at);
        self.pending.insert(idx, at);
    }

    /// Number of releases that fire at `now_ms`: zero or one.
    ///
    /// A due release fires only when strictly more than the refractory
    /// period has passed since the previous one; otherwise it is dropped.
    pub fn take_due(&mut self, now_ms: f64) -> usize {
        let mut fired = 0;
        while let Some(&at) = self.pending.front() {
            if at > now_ms {
                break;
            }
            self.pending.pop_front();
            let ready = self
                .last_release_ms
                .map_or(true, |last| now_ms - last > GLUTAMATE_REFRACTORY_MS);
            if ready && fired == 0 {
                self.last_release_ms = Some(now_ms);
                fired = 1;
            } else {
                self.dropped += 1;
                log::debug!("glutamate release at {:.1} ms dropped (refractory)", at);
            }
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Releases discarded by the refractory period
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.last_release_ms = None;
        self.dropped = 0;
    }
}
