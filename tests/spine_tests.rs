//! Integration tests for the spine orchestrator
//!
//! Tests validate:
//! - Resting steady state of trapped AMPA receptors
//! - CaMKII response to a Ca²⁺ pulse and its decay
//! - Conservation of CaMKII, CaM, PP1, I-1 and AMPAR
//! - Determinism, re-init and the calcium drive

use spine_kinetics::{ClampPolicy, InitPolicy, SimConfig, Spine, SpinePhase, SpineReadout};

/// Rest for `steps` ms, then report the last per-step change of Trp.Tot
fn trp_change_after(spine: &mut Spine, steps: usize) -> f64 {
    spine.run(steps - 1);
    let before = spine.readout().trp_tot;
    spine.step();
    (spine.readout().trp_tot - before).abs()
}

// ============================================================================
// Steady State
// ============================================================================

/// With no input, Trp.Tot settles to a near-constant value
#[test]
fn test_resting_trp_settles() {
    let mut spine = Spine::new(SimConfig::default()).unwrap();
    let delta = trp_change_after(&mut spine, 20_000);
    assert!(delta < 5e-4, "Trp.Tot still changing by {} per ms", delta);
    assert!(spine.state().is_finite());
}

/// Resting free Ca²⁺ stays at 0.05 μM
#[test]
fn test_resting_calcium() {
    let mut spine = Spine::new(SimConfig::default()).unwrap();
    spine.run(500);
    let r = spine.readout();
    assert!((r.ca_uM.cyt - 0.05).abs() < 0.01, "Cyt Ca {} μM", r.ca_uM.cyt);
    assert!((r.ca_uM.psd - 0.05).abs() < 0.01, "PSD Ca {} μM", r.ca_uM.psd);
}

// ============================================================================
// LTP Signature
// ============================================================================

/// A 10 μM cytosolic Ca²⁺ pulse doubles CaMKII activity, which then relaxes
#[test]
fn test_calcium_pulse_activates_camkii() {
    let config = SimConfig::default();
    let mut control = Spine::new(config.clone()).unwrap();
    let mut pulsed = Spine::new(config).unwrap();

    let mut peak_ratio: f64 = 0.0;
    for step in 0..50 {
        if step < 3 {
            pulsed.set_clamp(10.0, 0.05);
        } else if step == 3 {
            pulsed.clear_clamp();
        }
        control.step();
        pulsed.step();
        let ratio = pulsed.readout().camkii_act_uM.cyt / control.readout().camkii_act_uM.cyt;
        peak_ratio = peak_ratio.max(ratio);
    }
    assert!(peak_ratio >= 2.0, "peak CaMKII ratio {}", peak_ratio);

    control.run(6_000);
    pulsed.run(6_000);
    let c = control.readout().camkii_act_uM.cyt;
    let p = pulsed.readout().camkii_act_uM.cyt;
    assert!((p - c).abs() <= 0.1 * c, "after decay: {} vs control {}", p, c);
}

/// CaN activity also follows Ca²⁺
#[test]
fn test_calcium_pulse_activates_calcineurin() {
    let mut spine = Spine::new(SimConfig::default()).unwrap();
    let before = spine.readout().can_act_uM.cyt;
    spine.set_clamp(10.0, 10.0);
    spine.run(5);
    let during = spine.readout().can_act_uM.cyt;
    assert!(during > before, "CaN act {} -> {}", before, during);
}

// ============================================================================
// Conservation
// ============================================================================

/// Conserved totals survive rest, a pulse and recovery
#[test]
fn test_conservation_through_pulse() {
    let mut spine = Spine::new(SimConfig::default()).unwrap();
    let initial = spine.state().totals();

    spine.run(100);
    spine.set_clamp(5.0, 5.0);
    spine.run(10);
    spine.clear_clamp();
    spine.run(1_000);

    let totals = spine.state().totals();
    let drift = totals.max_relative_drift(&initial);
    assert!(drift < 1e-4, "relative drift {}: {:?} vs {:?}", drift, totals, initial);
    assert!((totals.ampar - 6.0).abs() < 1e-6);
}

/// Same with DAPK1 enabled
#[test]
fn test_conservation_with_dapk1() {
    let config = SimConfig {
        use_dapk1: true,
        ..Default::default()
    };
    let mut spine = Spine::new(config).unwrap();
    let initial = spine.state().totals();
    assert!(initial.dapk1 > 0.0);

    spine.set_clamp(5.0, 5.0);
    spine.run(10);
    spine.clear_clamp();
    spine.run(500);

    let drift = spine.state().totals().max_relative_drift(&initial);
    assert!(drift < 1e-4, "relative drift {}", drift);
}

// ============================================================================
// Determinism and Lifecycle
// ============================================================================

/// Two spines with the same inputs produce identical trajectories
#[test]
fn test_bit_reproducible() {
    let run = || -> Vec<SpineReadout> {
        let mut spine = Spine::new(SimConfig::default()).unwrap();
        spine.queue_glutamate(5.0);
        spine.set_vm(-30.0);
        (0..40)
            .map(|step| {
                if step == 10 {
                    spine.add_calcium(240.0, 0.0);
                }
                spine.step();
                spine.readout()
            })
            .collect()
    };
    assert_eq!(run(), run());
}

/// Fresh init starts from totals only and re-init restores it
#[test]
fn test_fresh_init_and_reinit() {
    let config = SimConfig {
        init: InitPolicy::Fresh,
        ..Default::default()
    };
    let mut spine = Spine::new(config).unwrap();
    assert_eq!(spine.readout().camkii_act_uM.cyt, 0.0);
    let start = spine.state().clone();

    spine.queue_glutamate(0.0);
    spine.queue_glutamate(0.0);
    spine.run(200);
    assert_eq!(spine.phase(), SpinePhase::Stepping);
    assert_eq!(spine.diagnostics().glutamate_dropped, 1);

    spine.init();
    assert_eq!(spine.state(), &start);
    assert_eq!(spine.steps(), 0);
    assert_eq!(spine.diagnostics().glutamate_dropped, 0);
    assert_eq!(spine.clamp_stats().total(), 0);
}

/// Continuous injection raises Ca²⁺ above rest until switched off
#[test]
fn test_inject_rate() {
    let mut spine = Spine::new(SimConfig::default()).unwrap();
    spine.set_inject_rate(50.0, 0.0);
    spine.run(5);
    assert!(spine.readout().ca_uM.cyt > 0.06);

    spine.set_inject_rate(0.0, 0.0);
    spine.run(100);
    assert!((spine.readout().ca_uM.cyt - 0.05).abs() < 0.01);
}

/// Moving the buffer target moves resting Ca²⁺
#[test]
fn test_buffer_target() {
    let mut spine = Spine::new(SimConfig::default()).unwrap();
    spine.set_buffer_target(1.0, 1.0);
    spine.run(200);
    let r = spine.readout();
    assert!(r.ca_uM.cyt > 0.5, "Cyt Ca {} μM", r.ca_uM.cyt);
    assert!(r.ca_uM.psd > 0.5, "PSD Ca {} μM", r.ca_uM.psd);
}

/// Removing more Ca²⁺ than exists empties the pool, then rest recovers
#[test]
fn test_oversized_removal_empties_pool() {
    let config = SimConfig {
        clamp_policy: ClampPolicy::Silent,
        ..Default::default()
    };
    let mut spine = Spine::new(config).unwrap();
    spine.add_calcium(-1e6, 0.0);
    spine.step();
    assert!(spine.state().ca.cyt >= 0.0);
    assert!(spine.state().is_finite());

    spine.run(100);
    assert!((spine.readout().ca_uM.cyt - 0.05).abs() < 0.01);
}
