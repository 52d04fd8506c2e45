//! Integration tests for the kinetic primitives
//!
//! Tests validate:
//! - Concentration ↔ count conversion
//! - Reaction mass conservation and clamping
//! - Enzyme monotonicity and substrate bound
//! - Diffusion toward equal concentrations

use spine_kinetics::{
    to_concentration, to_quantity, ClampMonitor, ClampPolicy, Compartment, Diffuse, Enzyme,
    React, SpineGeometry, Tick, Volume,
};

// ============================================================================
// Conversion
// ============================================================================

/// 1 μM in the default cytosol is 48 molecules
#[test]
fn test_conversion_default_cytosol() {
    let geom = SpineGeometry::default();
    assert!((to_quantity(1.0, geom.cyt) - 48.0).abs() < 1e-9);
    assert!((to_concentration(12.0, geom.psd) - 1.0).abs() < 1e-9);
    assert!((geom.to_quantity(Compartment::Psd, 0.05) - 0.6).abs() < 1e-12);
}

/// Custom volumes scale linearly
#[test]
fn test_conversion_custom_volume() {
    let vol = Volume::new(0.5).unwrap();
    let n = to_quantity(2.0, vol);
    assert!((n - 600.0).abs() < 1e-9);
    assert!((to_concentration(n, vol) - 2.0).abs() < 1e-12);
}

// ============================================================================
// Reaction
// ============================================================================

/// A + B ⇌ AB conserves A + AB and B + AB over many ticks
#[test]
fn test_reaction_conserves_mass() {
    let monitor = ClampMonitor::default();
    let tick = Tick::new(5e-5, &monitor);
    let r = React::new(0.5, 20.0);

    let (mut a, mut b, mut ab) = (100.0, 40.0, 0.0);
    for _ in 0..20_000 {
        let d = r.step(&tick, a, b, ab);
        a -= d;
        b -= d;
        ab += d;
    }
    assert!((a + ab - 100.0).abs() < 1e-9, "A total {}", a + ab);
    assert!((b + ab - 40.0).abs() < 1e-9, "B total {}", b + ab);
    assert!(ab > 0.0 && a >= 0.0 && b >= 0.0);

    // Close to equilibrium: Kf·A·B ≈ Kb·AB
    let imbalance = (0.5 * a * b - 20.0 * ab).abs() / (20.0 * ab);
    assert!(imbalance < 1e-3, "equilibrium imbalance {}", imbalance);
}

/// An oversized backward step removes exactly the complex
#[test]
fn test_reaction_backward_clamp_is_exact() {
    let monitor = ClampMonitor::default();
    let tick = Tick::new(1.0, &monitor);
    let r = React::new(0.0, 1e4);
    let d = r.step(&tick, 5.0, 5.0, 3.0);
    assert_eq!(d, -3.0);
    assert_eq!(monitor.stats().reaction, 1);
}

/// The forward step never exceeds the scarcer reactant
#[test]
fn test_reaction_forward_clamp() {
    let monitor = ClampMonitor::default();
    let tick = Tick::new(1.0, &monitor);
    let r = React::new(100.0, 0.0);
    assert_eq!(r.step(&tick, 2.0, 7.0, 0.0), 2.0);
    assert_eq!(r.step_k(&tick, 4.0, 9.0, 0.5, 0.0), 0.5);
    assert_eq!(monitor.stats().reaction, 2);
}

// ============================================================================
// Enzyme
// ============================================================================

/// Product formation grows with substrate and saturates
#[test]
fn test_enzyme_monotonic_in_substrate() {
    let geom = SpineGeometry::default();
    let monitor = ClampMonitor::default();
    let tick = Tick::new(5e-5, &monitor);
    let e = Enzyme::with_km(10.0, geom.cyt, 80.0, 20.0);

    let mut last = 0.0;
    for s_uM in [0.1, 1.0, 10.0, 100.0, 1000.0] {
        let v = e.step(&tick, to_quantity(s_uM, geom.cyt), 48.0);
        assert!(v > last, "rate at {} μM: {} <= {}", s_uM, v, last);
        last = v;
    }
    // Vmax·dt = 20 s⁻¹ · 48 · 5e-5
    assert!(last < 20.0 * 48.0 * 5e-5);
    assert_eq!(e.step(&tick, 0.0, 48.0), 0.0);
    assert_eq!(e.step(&tick, 48.0, 0.0), 0.0);
}

/// Km from k1, k2, k3
#[test]
fn test_enzyme_km() {
    let e = Enzyme::new(2.0, 3.0, 1.0);
    assert!((e.km - 2.0).abs() < 1e-12);
}

/// Catalysis cannot remove more substrate than exists
#[test]
fn test_enzyme_substrate_bound() {
    let monitor = ClampMonitor::new(ClampPolicy::Silent);
    let tick = Tick::new(1.0, &monitor);
    let e = Enzyme::new(1.0, 0.0, 1e3);
    assert_eq!(e.step(&tick, 0.3, 100.0), 0.3);
    assert_eq!(monitor.stats().enzyme, 1);
}

// ============================================================================
// Diffusion
// ============================================================================

/// Repeated diffusion equalizes concentration and conserves count
#[test]
fn test_diffusion_reaches_equal_concentration() {
    let geom = SpineGeometry::default();
    let monitor = ClampMonitor::default();
    let tick = Tick::new(5e-5, &monitor);
    let d = Diffuse::symmetric(6.0 / 0.0225);

    let (mut cyt, mut psd) = (480.0, 0.0);
    for _ in 0..200_000 {
        let (dc, dp) = d.step(&tick, cyt, psd, geom.cyt, geom.psd);
        cyt += dc;
        psd += dp;
    }
    assert!((cyt + psd - 480.0).abs() < 1e-6);
    let c_cyt = to_concentration(cyt, geom.cyt);
    let c_psd = to_concentration(psd, geom.psd);
    assert!((c_cyt - c_psd).abs() < 1e-3 * c_cyt, "{} vs {} μM", c_cyt, c_psd);
    assert_eq!(monitor.stats().diffusion, 0);
}

/// Asymmetric rates concentrate the species on the favored side
#[test]
fn test_asymmetric_diffusion() {
    let geom = SpineGeometry::default();
    let monitor = ClampMonitor::default();
    let tick = Tick::new(5e-5, &monitor);
    let d = Diffuse::new(31.4 / 0.0225, 5.23 / 0.0225);

    let (mut cyt, mut psd) = (48.0, 12.0);
    for _ in 0..100_000 {
        let (dc, dp) = d.step(&tick, cyt, psd, geom.cyt, geom.psd);
        cyt += dc;
        psd += dp;
    }
    let ratio = to_concentration(psd, geom.psd) / to_concentration(cyt, geom.cyt);
    assert!((ratio - 31.4 / 5.23).abs() < 0.01, "PSD/Cyt ratio {}", ratio);
}
