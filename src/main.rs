//! OncoSim - headless CLI entry point
//!
//! Runs one simulation from a JSON parameter file (or defaults), prints the
//! clinical summary and verification report, and optionally exports the
//! trace.
//!
//! CLI Usage:
//!   cargo run                                # defaults, print summary
//!   cargo run -- --params patient.json      # load parameters from JSON
//!   cargo run -- --protocol ADAPTIVE -n 200 # override protocol and days
//!   cargo run -- --seed 7 --export-json     # seeded run, write exports/

use anyhow::Result;
use oncosim::{simulate_seeded, SimulationParameters, TreatmentProtocol, DEFAULT_SEED};

struct CliOptions {
    params_path: Option<String>,
    seed: u64,
    protocol: Option<TreatmentProtocol>,
    time_steps: Option<u32>,
    export_json: bool,
    export_csv: bool,
}

/// Parse CLI arguments
fn parse_args() -> CliOptions {
    let args: Vec<String> = std::env::args().collect();
    let mut options = CliOptions {
        params_path: None,
        seed: DEFAULT_SEED,
        protocol: None,
        time_steps: None,
        export_json: false,
        export_csv: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--params" | "-p" => {
                i += 1;
                if i < args.len() {
                    options.params_path = Some(args[i].clone());
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    options.seed = args[i].parse().unwrap_or(DEFAULT_SEED);
                }
            }
            "--protocol" => {
                i += 1;
                if i < args.len() {
                    options.protocol = args[i].parse().ok();
                }
            }
            "-n" | "--days" => {
                i += 1;
                if i < args.len() {
                    options.time_steps = args[i].parse().ok();
                }
            }
            "--export-json" => options.export_json = true,
            "--export-csv" => options.export_csv = true,
            "--help" | "-h" => {
                println!("OncoSim");
                println!();
                println!("Usage: oncosim [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --params FILE    Load simulation parameters from JSON");
                println!("  -s, --seed N         RNG seed for the stochastic term (default: {DEFAULT_SEED})");
                println!("      --protocol P     Override protocol (CONTINUOUS/PULSED/METRONOMIC/ADAPTIVE)");
                println!("  -n, --days N         Override simulation horizon in days");
                println!("      --export-json    Write exports/simulation_*.json");
                println!("      --export-csv     Write exports/timeseries_*.csv");
                println!("  -h, --help           Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    options
}

fn main() -> Result<()> {
    env_logger::init();

    let options = parse_args();

    let mut params = match &options.params_path {
        Some(path) => SimulationParameters::load_or_default(path),
        None => SimulationParameters::default(),
    };
    if let Some(protocol) = options.protocol {
        params.treatment_protocol = protocol;
    }
    if let Some(days) = options.time_steps {
        params.time_steps = days;
    }

    log::info!(
        "Running {} protocol for {} days (seed {})",
        params.treatment_protocol,
        params.time_steps,
        options.seed
    );

    let outcome = simulate_seeded(&params, options.seed)?;
    let initial = outcome.trace.initial_tumor_burden();
    let final_burden = outcome.trace.final_tumor_burden();
    let summary = &outcome.summary;

    println!("=== OncoSim Run ===");
    println!("Protocol: {}", params.treatment_protocol);
    println!("Days simulated: {}", params.time_steps);
    println!();
    println!("Tumor burden: {:.1} -> {:.1} cells", initial, final_burden);
    println!("Tumor volume: {:.4} mm3", summary.tumor_volume_mm3);
    println!("Dominant subtype: {}", summary.dominant_subtype);
    println!("Eradicated: {}", summary.eradicated);
    println!();
    println!("=== Clinical Summary ===");
    println!("Response: {}", summary.response_classification);
    println!(
        "Disease control rate: {:.1}%",
        summary.disease_control_rate_percent
    );
    if let Some(rate) = summary.response_rate_percent {
        println!("Response rate (measured): {:.1}%", rate);
    }
    if let Some([lo, hi]) = summary.expected_response_range_percent {
        println!("Expected response range: {:.0}-{:.0}%", lo, hi);
    }
    println!(
        "Survival probability: {:.1}%",
        summary.survival_probability * 100.0
    );
    println!(
        "Median survival estimate: {:.1} months",
        summary.median_survival_months
    );
    println!("Quality of life: {}", summary.quality_of_life);
    println!(
        "Side effects: {} (toxicity index {:.2})",
        summary.side_effects, summary.toxicity_index
    );
    println!(
        "Treatment efficacy score: {:.1}/100",
        summary.treatment_efficacy_score
    );
    println!();
    println!("=== Verification ===");
    let report = &outcome.verification;
    println!(
        "Fitness check: {} (max diff {:.2e})",
        if report.fitness.valid { "ok" } else { "DISCREPANCY" },
        report.fitness.max_difference
    );
    println!(
        "Tumor volume check: {} (diff {:.2e})",
        if report.tumor_volume.valid { "ok" } else { "DISCREPANCY" },
        report.tumor_volume.difference
    );
    println!(
        "Survival check: {} (diff {:.2e})",
        if report.survival_probability.valid { "ok" } else { "DISCREPANCY" },
        report.survival_probability.difference
    );
    println!(
        "Calculations verified: {}",
        report.calculation_verified
    );

    if options.export_json {
        let path = oncosim::export::export_json(&params, &outcome)?;
        println!("\nJSON export: {}", path.display());
    }
    if options.export_csv {
        let path = oncosim::export::export_csv(&outcome.trace)?;
        println!("CSV export: {}", path.display());
    }

    Ok(())
}
