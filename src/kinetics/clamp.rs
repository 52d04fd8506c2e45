//! Clamp event accounting.
//!
//! Explicit Euler steps occasionally ask a primitive to move more than is
//! available. The step is then clamped to the available amount; the tuned
//! parameter sets depend on this, so the default is to count the event and
//! carry on.

use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What to do when a primitive clamps its step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClampPolicy {
    /// Count only
    #[default]
    Silent,
    /// Count and emit a `log::debug!` line per event
    Log,
    /// Panic on the first event (for tests)
    Panic,
}

/// Which primitive clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampSite {
    Reaction,
    Enzyme,
    Diffusion,
    Transfer,
    /// Negative count zeroed during integration
    Integrate,
}

impl fmt::Display for ClampSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClampSite::Reaction => "reaction",
            ClampSite::Enzyme => "enzyme",
            ClampSite::Diffusion => "diffusion",
            ClampSite::Transfer => "transfer",
            ClampSite::Integrate => "integrate",
        };
        f.write_str(name)
    }
}

/// Clamp event counts by site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClampStats {
    pub reaction: u64,
    pub enzyme: u64,
    pub diffusion: u64,
    pub transfer: u64,
    pub integrate: u64,
}

impl ClampStats {
    pub fn total(&self) -> u64 {
        self.reaction + self.enzyme + self.diffusion + self.transfer + self.integrate
    }

    fn bump(&mut self, site: ClampSite) {
        let slot = match site {
            ClampSite::Reaction => &mut self.reaction,
            ClampSite::Enzyme => &mut self.enzyme,
            ClampSite::Diffusion => &mut self.diffusion,
            ClampSite::Transfer => &mut self.transfer,
            ClampSite::Integrate => &mut self.integrate,
        };
        *slot += 1;
    }
}

/// Per-spine clamp counter.
///
/// Interior mutability keeps the primitives' `&self` signatures; a monitor is
/// owned by exactly one spine and never shared across threads.
#[derive(Debug, Default)]
pub struct ClampMonitor {
    policy: ClampPolicy,
    stats: Cell<ClampStats>,
}

impl ClampMonitor {
    pub fn new(policy: ClampPolicy) -> Self {
        Self {
            policy,
            stats: Cell::new(ClampStats::default()),
        }
    }

    pub fn policy(&self) -> ClampPolicy {
        self.policy
    }

    pub fn record(&self, site: ClampSite, requested: f64, applied: f64) {
        let mut stats = self.stats.get();
        stats.bump(site);
        self.stats.set(stats);

        match self.policy {
            ClampPolicy::Silent => {}
            ClampPolicy::Log => {
                log::debug!(
                    "{} clamp: requested {:.4e}, applied {:.4e}",
                    site, requested, applied
                );
            }
            ClampPolicy::Panic => {
                panic!(
                    "{} clamp: requested {:.4e}, applied {:.4e}",
                    site, requested, applied
                );
            }
        }
    }

    pub fn stats(&self) -> ClampStats {
        self.stats.get()
    }

    pub fn reset(&self) {
        self.stats.set(ClampStats::default());
    }
}

/// One integration tick: the time step plus where clamp events go
#[derive(Debug, Clone, Copy)]
pub struct Tick<'a> {
    /// Step size (s)
    pub dt: f64,
    monitor: &'a ClampMonitor,
}

impl<'a> Tick<'a> {
    pub fn new(dt: f64, monitor: &'a ClampMonitor) -> Self {
        Self { dt, monitor }
    }

    #[inline]
    pub fn record(&self, site: ClampSite, requested: f64, applied: f64) {
        self.monitor.record(site, requested, applied);
    }

    pub fn monitor(&self) -> &'a ClampMonitor {
        self.monitor
    }
}
