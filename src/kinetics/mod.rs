//! Kinetic primitives and the compartment volume model.
//!
//! Species are tracked as molecule counts (N). Rate constants given in the
//! literature per μM are converted to count units once, at parameter
//! construction, using the fixed molar-to-count mapping below.
//!
//! References:
//! - Urakubo H, Honda M, Froemke RC, Kuroda S. J Neurosci. 2008;28:3310-3323
//! - Bhalla US, Iyengar R. Science. 1999;283:381-387 (compartmental kinetics)

mod buffer;
mod clamp;
mod diffuse;
mod enzyme;
mod react;

pub use buffer::Buffer;
pub use clamp::{ClampMonitor, ClampPolicy, ClampSite, ClampStats, Tick};
pub use diffuse::Diffuse;
pub use enzyme::Enzyme;
pub use react::{limit_shared, React};

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Molecules per μM per fL (N_A × 10⁻²¹, rounded)
///
/// With the default 0.08 fL cytosol this gives 48 molecules per μM.
pub const MOLECULES_PER_UM_FL: f64 = 600.0;

/// Compartment volume in femtoliters, guaranteed positive and finite
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Volume(f64);

impl Volume {
    pub fn new(fl: f64) -> Result<Self, ConfigError> {
        if fl.is_finite() && fl > 0.0 {
            Ok(Self(fl))
        } else {
            Err(ConfigError::NonPositiveVolume(fl))
        }
    }

    /// Volume in femtoliters
    pub fn fl(self) -> f64 {
        self.0
    }

    /// Molecule count corresponding to 1 μM
    pub fn quantity_per_uM(self) -> f64 {
        self.0 * MOLECULES_PER_UM_FL
    }
}

/// Concentration (μM) to molecule count
#[inline]
pub fn to_quantity(conc_uM: f64, vol: Volume) -> f64 {
    conc_uM * vol.quantity_per_uM()
}

/// Molecule count to concentration (μM)
#[inline]
pub fn to_concentration(n: f64, vol: Volume) -> f64 {
    n / vol.quantity_per_uM()
}

/// Spine sub-compartment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compartment {
    Cytosol,
    Psd,
}

impl Compartment {
    pub const ALL: [Compartment; 2] = [Compartment::Cytosol, Compartment::Psd];

    pub fn name(self) -> &'static str {
        match self {
            Compartment::Cytosol => "Cyt",
            Compartment::Psd => "PSD",
        }
    }
}

/// One value per compartment
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Compartments<T> {
    pub cyt: T,
    pub psd: T,
}

impl<T> Compartments<T> {
    pub fn new(cyt: T, psd: T) -> Self {
        Self { cyt, psd }
    }

    pub fn from_fn(mut f: impl FnMut(Compartment) -> T) -> Self {
        Self {
            cyt: f(Compartment::Cytosol),
            psd: f(Compartment::Psd),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Compartment, &T) -> U) -> Compartments<U> {
        Compartments {
            cyt: f(Compartment::Cytosol, &self.cyt),
            psd: f(Compartment::Psd, &self.psd),
        }
    }
}

impl<T> Index<Compartment> for Compartments<T> {
    type Output = T;

    fn index(&self, c: Compartment) -> &T {
        match c {
            Compartment::Cytosol => &self.cyt,
            Compartment::Psd => &self.psd,
        }
    }
}

impl<T> IndexMut<Compartment> for Compartments<T> {
    fn index_mut(&mut self, c: Compartment) -> &mut T {
        match c {
            Compartment::Cytosol => &mut self.cyt,
            Compartment::Psd => &mut self.psd,
        }
    }
}

/// Cytosol and PSD volumes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpineGeometry {
    pub cyt: Volume,
    pub psd: Volume,
}

impl SpineGeometry {
    pub fn new(cyt_fL: f64, psd_fL: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            cyt: Volume::new(cyt_fL)?,
            psd: Volume::new(psd_fL)?,
        })
    }

    pub fn volume(&self, c: Compartment) -> Volume {
        match c {
            Compartment::Cytosol => self.cyt,
            Compartment::Psd => self.psd,
        }
    }

    /// Forward-rate multiplier for bimolecular reactions in `c`.
    ///
    /// Reaction constants are built against the cytosol volume; a smaller
    /// compartment concentrates the same counts and binds proportionally faster.
    pub fn kf(&self, c: Compartment) -> f64 {
        self.cyt.fl() / self.volume(c).fl()
    }

    pub fn to_quantity(&self, c: Compartment, conc_uM: f64) -> f64 {
        to_quantity(conc_uM, self.volume(c))
    }

    pub fn to_concentration(&self, c: Compartment, n: f64) -> f64 {
        to_concentration(n, self.volume(c))
    }
}

impl Default for SpineGeometry {
    fn default() -> Self {
        Self {
            cyt: Volume(0.08),
            psd: Volume(0.02),
        }
    }
}

/// First-order transfer `src → dst` at `rate_per_sec`, never exceeding `src`
#[inline]
pub fn transfer(tick: &Tick<'_>, rate_per_sec: f64, src: f64) -> f64 {
    let requested = rate_per_sec * src * tick.dt;
    if requested > src {
        tick.record(ClampSite::Transfer, requested, src);
        return src;
    }
    requested.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_conversion() {
        let geom = SpineGeometry::default();
        for c in Compartment::ALL {
            let vol = geom.volume(c);
            for &n in &[0.0, 1e-6, 0.37, 48.0, 12345.678] {
                let back = to_quantity(to_concentration(n, vol), vol);
                assert!((back - n).abs() <= 1e-9 * n.max(1.0), "round trip {} -> {}", n, back);
            }
        }
    }

    #[test]
    fn test_default_counts_per_uM() {
        let geom = SpineGeometry::default();
        assert!((geom.cyt.quantity_per_uM() - 48.0).abs() < 1e-9);
        assert!((geom.psd.quantity_per_uM() - 12.0).abs() < 1e-9);
        assert!((geom.kf(Compartment::Psd) - 4.0).abs() < 1e-12);
        assert!((geom.kf(Compartment::Cytosol) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_volume_rejects_non_positive() {
        assert!(matches!(Volume::new(0.0), Err(ConfigError::NonPositiveVolume(_))));
        assert!(Volume::new(-0.1).is_err());
        assert!(Volume::new(f64::NAN).is_err());
        assert!(SpineGeometry::new(0.08, 0.0).is_err());
    }

    #[test]
    fn test_transfer_clamps_to_source() {
        let monitor = ClampMonitor::default();
        let tick = Tick::new(1e-3, &monitor);
        assert!((transfer(&tick, 10.0, 5.0) - 0.05).abs() < 1e-12);
        assert_eq!(transfer(&tick, 5000.0, 2.0), 2.0);
        assert_eq!(monitor.stats().transfer, 1);
    }

    #[test]
    fn test_compartments_indexing() {
        let mut v = Compartments::new(1.0, 2.0);
        v[Compartment::Psd] += 3.0;
        assert_eq!(v[Compartment::Cytosol], 1.0);
        assert_eq!(v[Compartment::Psd], 5.0);
        let doubled = v.map(|_, x| x * 2.0);
        assert_eq!(doubled.psd, 10.0);
    }
}
