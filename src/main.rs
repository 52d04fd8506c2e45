//! Spine Kinetics - Entry point
//!
//! Runs a single spine from its baseline and prints diagnostics.
//!
//! CLI Usage:
//!   cargo run                              # Resting spine, 1000 steps
//!   cargo run -- --pulse 10 -n 2000        # 10 μM Ca²⁺ pulse, then 2 s
//!   cargo run -- --config sim.json --dapk1 # Config file, DAPK1 enabled

#![allow(non_snake_case)]

use std::time::Instant;

use anyhow::Result;
use spine_kinetics::{SimConfig, Spine, SpineDiagnostics};

/// Ca²⁺ pulse length (ms)
const PULSE_STEPS: usize = 3;

struct Args {
    steps: usize,
    pulse_uM: f64,
    config_path: Option<String>,
    dapk1: bool,
    json: bool,
}

/// Run a resting or pulse protocol and print diagnostics
fn run_diagnostics(args: &Args) -> Result<()> {
    println!("=== Spine Kinetics - Diagnostics ===\n");

    let mut config = match &args.config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if args.dapk1 {
        config.use_dapk1 = true;
    }

    let mut spine = Spine::new(config.clone())?;
    println!("Init:        {:?}", config.init);
    println!("DAPK1:       {}", if config.use_dapk1 { "on" } else { "off" });
    println!("Substeps:    {} per ms", config.substeps);
    println!("Volumes:     {:.3} fL (Cyt), {:.3} fL (PSD)", config.cyt_volume_fL, config.psd_volume_fL);
    if args.pulse_uM > 0.0 {
        println!("Pulse:       {:.1} μM Ca²⁺ for {} ms", args.pulse_uM, PULSE_STEPS);
    }

    let initial = spine.diagnostics();
    println!("\nInitial State:");
    println!("  CaMKII act:  {:.4} μM", initial.readout.camkii_act_uM.cyt);
    println!("  PP1 act:     {:.4} μM", initial.readout.pp1_act_uM.cyt);
    println!("  Trapped:     {:.4}", initial.readout.trp_tot);

    println!("\n--- Running {} steps ---\n", args.steps);
    SpineDiagnostics::print_row_header();
    println!("{}", "-".repeat(62));

    let start = Instant::now();
    for step in 0..args.steps {
        if step < PULSE_STEPS && args.pulse_uM > 0.0 {
            spine.set_clamp(args.pulse_uM, args.pulse_uM);
        } else if step == PULSE_STEPS {
            spine.clear_clamp();
        }

        if args.steps >= 10 && step % (args.steps / 10) == 0 {
            spine.diagnostics().print_row();
        }
        spine.step();
    }
    let elapsed = start.elapsed();

    let diag = spine.diagnostics();
    diag.print_row();

    println!("\n=== Results ===");
    println!("Time: {:.2?}", elapsed);
    println!(
        "Steps per second: {:.0}",
        args.steps as f64 / elapsed.as_secs_f64().max(1e-9)
    );
    println!();
    diag.print_summary();

    if args.json {
        println!();
        println!("{}", serde_json::to_string_pretty(&diag)?);
    }

    println!("\n=== Diagnostic Checks ===\n");
    let warnings = spine.validate_state();
    if warnings.is_empty() {
        println!("✓ All values within expected range");
    } else {
        for warning in &warnings {
            println!("⚠️  {}", warning);
        }
    }

    let peak_ratio = diag.readout.camkii_act_uM.cyt / initial.readout.camkii_act_uM.cyt.max(1e-12);
    println!("✓ CaMKII act vs. initial: {:.2}x", peak_ratio);

    Ok(())
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        steps: 1000,
        pulse_uM: 0.0,
        config_path: None,
        dapk1: false,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--steps" => {
                i += 1;
                if i < args.len() {
                    parsed.steps = args[i].parse().unwrap_or(1000);
                }
            }
            "-p" | "--pulse" => {
                i += 1;
                if i < args.len() {
                    parsed.pulse_uM = args[i].parse().unwrap_or(10.0);
                }
            }
            "-c" | "--config" => {
                i += 1;
                if i < args.len() {
                    parsed.config_path = Some(args[i].clone());
                }
            }
            "--dapk1" => parsed.dapk1 = true,
            "--json" => parsed.json = true,
            "--help" | "-h" => {
                println!("Spine Kinetics");
                println!();
                println!("Usage: spine-kinetics [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --steps N      Number of 1 ms steps (default: 1000)");
                println!("  -p, --pulse C      Ca2+ pulse concentration in uM (default: none)");
                println!("  -c, --config FILE  Load simulation config from JSON");
                println!("  --dapk1            Enable the DAPK1 module");
                println!("  --json             Dump final diagnostics as JSON");
                println!("  --help, -h         Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    parsed
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args();
    run_diagnostics(&args)
}
