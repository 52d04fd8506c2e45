//! Spine orchestrator.
//!
//! A [`Spine`] owns two snapshots of the full state. Every integration tick
//! reads `current`, accumulates every module's deltas into a copy of it, clamps
//! the result at zero and swaps. One call to [`Spine::step`] advances 1 ms.

mod drive;
mod population;
mod readout;
mod state;

pub use drive::{CalciumDrive, GlutamateQueue, GLUTAMATE_REFRACTORY_MS};
pub use population::SpinePopulation;
pub use readout::{SpineDiagnostics, SpineReadout};
pub use state::{SpeciesTotals, SpineState, REST_VM_MV};

use serde::Serialize;

use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::kinetics::{ClampMonitor, ClampStats, SpineGeometry, Tick};
use crate::receptors::{AMPARParams, NMDARParams};
use crate::signaling::{
    CaMKIIParams, CaMParams, CaNParams, CaParams, DAPK1Params, Module, PKAParams, PP1Params,
    PP2AParams, SharedSignals, StepContext,
};

/// Rate constants of every module
#[derive(Debug, Clone, Serialize)]
pub struct SpineParams {
    pub ca: CaParams,
    pub cam: CaMParams,
    pub camkii: CaMKIIParams,
    pub can: CaNParams,
    pub pka: PKAParams,
    pub pp1: PP1Params,
    pub pp2a: PP2AParams,
    pub ampar: AMPARParams,
    pub dapk1: DAPK1Params,
    pub nmdar: NMDARParams,
}

impl SpineParams {
    pub fn new(geom: &SpineGeometry) -> Self {
        Self {
            ca: CaParams::new(geom),
            cam: CaMParams::new(geom),
            camkii: CaMKIIParams::new(geom),
            can: CaNParams::new(geom),
            pka: PKAParams::new(geom),
            pp1: PP1Params::new(geom),
            pp2a: PP2AParams::new(geom),
            ampar: AMPARParams::default(),
            dapk1: DAPK1Params::new(geom),
            nmdar: NMDARParams::default(),
        }
    }

    pub fn modules(&self) -> [&dyn Module; 10] {
        [
            &self.cam,
            &self.camkii,
            &self.can,
            &self.pka,
            &self.pp1,
            &self.ampar,
            &self.dapk1,
            &self.pp2a,
            &self.nmdar,
            &self.ca,
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for module in self.modules() {
            module.validate()?;
        }
        Ok(())
    }

    /// One integration tick, modules in fixed order.
    ///
    /// The order matters only through clamping: every module reads the same
    /// snapshot.
    fn step_modules(&self, cx: &StepContext<'_>, next: &mut SpineState, use_dapk1: bool) {
        self.cam.step(cx, next);
        self.camkii.step(cx, next);
        self.can.step(cx, next);
        self.pka.step(cx, next);
        self.pp1.step(cx, next);
        self.ampar.step(cx, next);
        if use_dapk1 {
            self.dapk1.step(cx, next);
        }
        self.pp2a.step(cx, next);
        self.nmdar.step(cx, next);
        self.ca.step(cx, next);
    }
}

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpinePhase {
    /// Initialized, not yet stepped
    Ready,
    Stepping,
}

/// One dendritic spine
pub struct Spine {
    config: SimConfig,
    geometry: SpineGeometry,
    params: SpineParams,
    current: SpineState,
    next: SpineState,
    monitor: ClampMonitor,
    drive: CalciumDrive,
    glutamate: GlutamateQueue,
    phase: SpinePhase,
    steps: u64,
    initial_totals: SpeciesTotals,
}

impl Spine {
    /// Build with the default rate constants
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let geometry = config.geometry()?;
        let params = SpineParams::new(&geometry);
        Self::with_params(config, params)
    }

    /// Build with caller-supplied rate constants
    pub fn with_params(config: SimConfig, mut params: SpineParams) -> Result<Self, ConfigError> {
        config.validate()?;
        let geometry = config.geometry()?;
        params.nmdar.substep_sec = config.nmdar_substep_sec;
        params.validate()?;

        log::info!(
            "Spine: init {:?}, DAPK1 {}, {} substeps/ms, volumes {:.3}/{:.3} fL",
            config.init,
            if config.use_dapk1 { "on" } else { "off" },
            config.substeps,
            config.cyt_volume_fL,
            config.psd_volume_fL
        );

        let current = SpineState::init(&geometry, &config, &params);
        let initial_totals = current.totals();
        Ok(Self {
            monitor: ClampMonitor::new(config.clamp_policy),
            next: current.clone(),
            current,
            config,
            geometry,
            params,
            drive: CalciumDrive::default(),
            glutamate: GlutamateQueue::default(),
            phase: SpinePhase::Ready,
            steps: 0,
            initial_totals,
        })
    }

    /// Reset every species to its initial value.
    ///
    /// Clears the clamp, injection, pending calcium and queued glutamate.
    /// Rate constants, including a moved buffer target, are kept.
    pub fn init(&mut self) {
        self.current = SpineState::init(&self.geometry, &self.config, &self.params);
        self.next = self.current.clone();
        self.initial_totals = self.current.totals();
        self.drive = CalciumDrive::default();
        self.glutamate.clear();
        self.monitor.reset();
        self.phase = SpinePhase::Ready;
        self.steps = 0;
    }

    /// Advance 1 ms
    pub fn step(&mut self) {
        self.phase = SpinePhase::Stepping;
        let now_ms = self.steps as f64;

        let pending = self.drive.take_pending();
        self.current.ca.cyt = (self.current.ca.cyt + pending.cyt).max(0.0);
        self.current.ca.psd = (self.current.ca.psd + pending.psd).max(0.0);
        for _ in 0..self.glutamate.take_due(now_ms) {
            self.params.nmdar.release_glutamate(&mut self.current.nmdar);
        }
        self.drive.apply_clamp(&self.geometry, &mut self.current.ca);

        let inject = self.drive.per_tick(&self.geometry, self.config.substeps);
        let dt = self.config.tick_sec();
        for _ in 0..self.config.substeps {
            let signals = SharedSignals::capture(&self.current);
            self.next.clone_from(&self.current);
            let cx = StepContext {
                tick: Tick::new(dt, &self.monitor),
                geometry: &self.geometry,
                current: &self.current,
                signals: &signals,
            };
            self.params.step_modules(&cx, &mut self.next, self.config.use_dapk1);

            self.next.ca.cyt += inject.cyt;
            self.next.ca.psd += inject.psd;
            self.next.time_sec += dt;
            self.next.integrate(&self.monitor, self.params.dapk1.auto_k);
            self.drive.apply_clamp(&self.geometry, &mut self.next.ca);
            std::mem::swap(&mut self.current, &mut self.next);
        }

        self.steps += 1;
        self.current.time_sec = self.steps as f64 * crate::STEP_SEC;
    }

    /// Advance `steps` ms
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Add Ca²⁺ molecules at the start of the next step
    pub fn add_calcium(&mut self, cyt_n: f64, psd_n: f64) {
        self.drive.add(cyt_n, psd_n);
    }

    /// Hold free Ca²⁺ at fixed concentrations (μM) until [`Spine::clear_clamp`]
    pub fn set_clamp(&mut self, cyt_uM: f64, psd_uM: f64) {
        self.drive.set_clamp(cyt_uM, psd_uM);
    }

    pub fn clear_clamp(&mut self) {
        self.drive.clear_clamp();
    }

    /// Continuous Ca²⁺ injection (μM per 1 ms step)
    pub fn set_inject_rate(&mut self, cyt_uM: f64, psd_uM: f64) {
        self.drive.set_inject_rate(cyt_uM, psd_uM);
    }

    /// Move the Ca²⁺ extrusion target (μM)
    pub fn set_buffer_target(&mut self, cyt_uM: f64, psd_uM: f64) {
        self.params.ca.set_target(&self.geometry, cyt_uM, psd_uM);
    }

    pub fn set_vm(&mut self, vm_mV: f64) {
        self.current.vm_mV = vm_mV;
    }

    /// Queue a glutamate release `delay_ms` from now
    pub fn queue_glutamate(&mut self, delay_ms: f64) {
        self.glutamate.push(self.steps as f64, delay_ms);
    }

    pub fn state(&self) -> &SpineState {
        &self.current
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn geometry(&self) -> &SpineGeometry {
        &self.geometry
    }

    pub fn params(&self) -> &SpineParams {
        &self.params
    }

    pub fn phase(&self) -> SpinePhase {
        self.phase
    }

    /// Completed 1 ms steps since init
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn readout(&self) -> SpineReadout {
        SpineReadout::capture(&self.current, &self.geometry)
    }

    pub fn clamp_stats(&self) -> ClampStats {
        self.monitor.stats()
    }

    pub fn diagnostics(&self) -> SpineDiagnostics {
        SpineDiagnostics::capture(
            &self.current,
            &self.geometry,
            self.initial_totals,
            self.monitor.stats(),
            self.glutamate.dropped(),
        )
    }

    /// Validate state against physiological ranges and conservation
    pub fn validate_state(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.current.is_finite() {
            warnings.push("Non-finite species count".to_string());
            return warnings;
        }

        let diag = self.diagnostics();
        let r = &diag.readout;

        // Free Ca²⁺ (rest 0.05 μM; tens of μM only during a pulse)
        if r.ca_uM.cyt > 50.0 || r.ca_uM.psd > 50.0 {
            warnings.push(format!(
                "Ca2+ very high: {:.2} / {:.2} uM (Cyt / PSD)",
                r.ca_uM.cyt, r.ca_uM.psd
            ));
        }

        // Conserved species (clamped Euler keeps drift small)
        let drift = diag.totals.max_relative_drift(&diag.initial_totals);
        if drift > 1e-3 {
            warnings.push(format!("Conserved species drifted by {:.2e} (relative)", drift));
        }

        // Trapped AMPAR cannot exceed the receptor pool
        if r.trp_tot > diag.totals.ampar {
            warnings.push(format!(
                "Trapped AMPAR {:.4} exceeds total {:.4}",
                r.trp_tot, diag.totals.ampar
            ));
        }

        let clamps = diag.clamps.total();
        if clamps > 0 && self.steps > 0 && clamps > self.steps * u64::from(self.config.substeps) {
            warnings.push(format!(
                "Frequent clamping: {} events in {} steps",
                clamps, self.steps
            ));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitPolicy;

    #[test]
    fn test_new_is_ready() {
        let spine = Spine::new(SimConfig::default()).unwrap();
        assert_eq!(spine.phase(), SpinePhase::Ready);
        assert_eq!(spine.steps(), 0);
        assert_eq!(spine.state().time_sec, 0.0);
    }

    #[test]
    fn test_step_advances_time() {
        let mut spine = Spine::new(SimConfig::default()).unwrap();
        spine.run(3);
        assert_eq!(spine.phase(), SpinePhase::Stepping);
        assert!((spine.state().time_sec - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_init_restores_initial_state() {
        let config = SimConfig { init: InitPolicy::Fresh, ..Default::default() };
        let mut spine = Spine::new(config).unwrap();
        let initial = spine.state().clone();
        spine.add_calcium(200.0, 50.0);
        spine.run(10);
        assert_ne!(spine.state(), &initial);

        spine.init();
        assert_eq!(spine.state(), &initial);
        assert_eq!(spine.phase(), SpinePhase::Ready);
        assert_eq!(spine.clamp_stats().total(), 0);
    }

    #[test]
    fn test_with_params_rejects_negative_rate() {
        let config = SimConfig::default();
        let mut params = SpineParams::new(&config.geometry().unwrap());
        params.pp1.i1_pp1.kf = -1.0;
        assert!(matches!(
            Spine::with_params(config, params),
            Err(ConfigError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_clamp_holds_calcium() {
        let mut spine = Spine::new(SimConfig::default()).unwrap();
        spine.set_clamp(2.0, 1.0);
        spine.run(5);
        let r = spine.readout();
        assert!((r.ca_uM.cyt - 2.0).abs() < 1e-9);
        assert!((r.ca_uM.psd - 1.0).abs() < 1e-9);

        spine.clear_clamp();
        spine.run(50);
        assert!(spine.readout().ca_uM.cyt < 1.0);
    }

    #[test]
    fn test_resting_spine_validates() {
        let mut spine = Spine::new(SimConfig::default()).unwrap();
        spine.run(20);
        let warnings = spine.validate_state();
        assert!(warnings.is_empty(), "warnings: {:?}", warnings);
    }
}
