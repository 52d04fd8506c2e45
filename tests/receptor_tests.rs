//! Integration tests for the NMDA and AMPA receptors
//!
//! Tests validate:
//! - Mg²⁺ unblock and Ca²⁺ drive voltage dependence
//! - Glutamate release and gating conserve the receptor
//! - No NMDAR Ca²⁺ flux without glutamate
//! - AMPAR trafficking conserves receptors and fills the PSD

use spine_kinetics::{AMPARLocation, InitPolicy, NMDARParams, NMDARState, SimConfig, Spine};

// ============================================================================
// NMDAR Voltage Dependence
// ============================================================================

/// Mg²⁺ block is strong at rest and relieved by depolarization
#[test]
fn test_mg_unblock_voltage_dependence() {
    let rest = NMDARParams::mg_unblock(-65.0);
    assert!((rest - 0.0406).abs() < 1e-3, "unblock at -65 mV: {}", rest);

    let mut last = 0.0;
    for vm in [-90.0, -70.0, -40.0, -10.0, 20.0] {
        let mg = NMDARParams::mg_unblock(vm);
        assert!(mg > last && mg < 1.0, "unblock at {} mV: {}", vm, mg);
        last = mg;
    }
}

/// The Ca²⁺ drive is continuous through 0 mV
#[test]
fn test_ca_drive_continuous_at_zero() {
    let inside = NMDARParams::ca_drive(0.05, 1.0);
    let outside = NMDARParams::ca_drive(0.2, 1.0);
    assert!((inside - 1.0 / 0.0756).abs() < 0.1);
    assert!((inside - outside).abs() < 0.1, "{} vs {}", inside, outside);

    let below = NMDARParams::ca_drive(-0.2, 1.0);
    assert!(below > inside && inside > outside);
}

// ============================================================================
// NMDAR Gating
// ============================================================================

/// A release moves receptors out of N0 without changing the total
#[test]
fn test_glutamate_release_conserves_receptor() {
    let params = NMDARParams::default();
    let mut state = NMDARState::new(&SimConfig::default());
    assert_eq!(state.gating.n0[0], 1.0);

    params.release_glutamate(&mut state);
    assert!((state.ntotal - 1.0).abs() < 1e-12);
    assert!(state.gating.n0[0] < 0.05);
    assert!(state.gating.n2[0] > 0.0 && state.gating.n1[0] > 0.0);
}

/// Sub-stepped gating conserves the receptor and opens channels
#[test]
fn test_gating_integration_conserves_receptor() {
    let params = NMDARParams::default();
    let mut state = NMDARState::new(&SimConfig::default());
    params.release_glutamate(&mut state);

    let (gating, mean_open, clamped) = params.integrate_gating(&state.gating, 1e-3, 0.05, 0.0076, 5e-5);
    assert!((gating.total() - 1.0).abs() < 1e-12);
    assert!(mean_open > 0.0 && gating.open() > 0.0);
    assert_eq!(clamped, 0.0);
}

/// Without glutamate the channel never opens at -70 mV
#[test]
fn test_no_flux_without_glutamate() {
    for init in [InitPolicy::Baseline, InitPolicy::Fresh] {
        let config = SimConfig { init, ..Default::default() };
        let mut spine = Spine::new(config).unwrap();
        spine.set_vm(-70.0);
        for _ in 0..1_000 {
            spine.step();
            let r = spine.readout();
            assert_eq!(r.nmdar_jca, 0.0);
            assert_eq!(r.nmdar_nopen, 0.0);
        }
    }
}

/// Glutamate at a depolarized spine produces PSD Ca²⁺ influx
#[test]
fn test_glutamate_opens_channel() {
    let mut spine = Spine::new(SimConfig::default()).unwrap();
    spine.set_vm(-20.0);
    spine.queue_glutamate(0.0);

    let mut peak_jca: f64 = 0.0;
    let mut peak_ca: f64 = 0.0;
    for _ in 0..20 {
        spine.step();
        let r = spine.readout();
        peak_jca = peak_jca.max(r.nmdar_jca);
        peak_ca = peak_ca.max(r.ca_uM.psd);
    }
    assert!(peak_jca > 0.0);
    assert!(peak_ca > 0.06, "peak PSD Ca {} μM", peak_ca);
    assert!((spine.state().nmdar.ntotal - 1.0).abs() < 1e-9);
}

/// Depolarization increases the flux for the same release
#[test]
fn test_depolarization_increases_flux() {
    let peak = |vm: f64| {
        let mut spine = Spine::new(SimConfig::default()).unwrap();
        spine.set_vm(vm);
        spine.queue_glutamate(0.0);
        (0..10)
            .map(|_| {
                spine.step();
                spine.readout().nmdar_jca
            })
            .fold(0.0, f64::max)
    };
    assert!(peak(-20.0) > peak(-70.0));
}

// ============================================================================
// AMPAR
// ============================================================================

/// Receptors start in the extrasynaptic membrane and reach the PSD and traps
#[test]
fn test_ampar_traffic_into_psd() {
    let mut spine = Spine::new(SimConfig::default()).unwrap();
    let start = spine.state().ampar;
    assert_eq!(start.at(AMPARLocation::Psd).total(), 0.0);
    assert!((start.at(AMPARLocation::Int).total() - 6.0).abs() < 1e-12);

    spine.run(200);
    let ampar = spine.state().ampar;
    assert!(ampar.at(AMPARLocation::Psd).total() > 0.1);
    assert!(ampar.at(AMPARLocation::Trp).total() > 0.0);
    assert!((ampar.total() - 6.0).abs() < 1e-6);
}
