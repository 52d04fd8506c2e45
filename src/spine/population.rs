//! Independent spines stepped in parallel.

use rayon::prelude::*;

use super::{Spine, SpineReadout};
use crate::config::SimConfig;
use crate::error::ConfigError;

/// A set of spines sharing nothing but their configuration
pub struct SpinePopulation {
    spines: Vec<Spine>,
}

impl SpinePopulation {
    /// `count` identical spines built from `config`
    pub fn new(config: &SimConfig, count: usize) -> Result<Self, ConfigError> {
        let spines = (0..count)
            .map(|_| Spine::new(config.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("Spine population: {} spines", count);
        Ok(Self { spines })
    }

    pub fn from_spines(spines: Vec<Spine>) -> Self {
        Self { spines }
    }

    pub fn len(&self) -> usize {
        self.spines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spines.is_empty()
    }

    pub fn spines(&self) -> &[Spine] {
        &self.spines
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Spine> {
        self.spines.get_mut(idx)
    }

    /// Advance every spine by 1 ms
    pub fn step(&mut self) {
        self.spines.par_iter_mut().for_each(|spine| spine.step());
    }

    pub fn run(&mut self, steps: usize) {
        self.spines.par_iter_mut().for_each(|spine| spine.run(steps));
    }

    pub fn readouts(&self) -> Vec<SpineReadout> {
        self.spines.iter().map(Spine::readout).collect()
    }
}
