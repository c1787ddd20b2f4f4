//! hes-sim entry point — CLI wiring and config-driven engine construction.

use std::path::Path;
use std::process;

use hes_sim::components::{HeatPump, HotWaterStorage, Weather};
use hes_sim::config::ScenarioConfig;
use hes_sim::io::export::export_csv;
use hes_sim::scenario::build_engine;
use hes_sim::sim::summary::RunSummary;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    days_override: Option<usize>,
    csv_out: Option<String>,
    quiet: bool,
}

fn print_help() {
    eprintln!("hes-sim — Household energy system simulator");
    eprintln!();
    eprintln!("Usage: hes-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>   Load scenario from TOML config file");
    eprintln!("  --preset <name>     Use a built-in preset (baseline)");
    eprintln!("  --seed <u64>        Override random seed");
    eprintln!("  --days <usize>      Override number of simulated days");
    eprintln!("  --out <path>        Export recorded time series to CSV");
    eprintln!("  --quiet             Suppress per-step log lines");
    eprintln!("  --help              Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        days_override: None,
        csv_out: None,
        quiet: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--days" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --days requires a usize argument");
                    process::exit(1);
                }
                if let Ok(d) = args[i].parse::<usize>() {
                    cli.days_override = Some(d);
                } else {
                    eprintln!("error: --days value \"{}\" is not a valid usize", args[i]);
                    process::exit(1);
                }
            }
            "--out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --out requires a path argument");
                    process::exit(1);
                }
                cli.csv_out = Some(args[i].clone());
            }
            "--quiet" => {
                cli.quiet = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // Apply overrides
    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(days) = cli.days_override {
        scenario.simulation.days = days;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Build and run
    let mut engine = match build_engine(&scenario) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    let results = match engine.run() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    // Print per-step results
    if !cli.quiet {
        let ambient = results.series(Weather::NAME, Weather::AMBIENT_TEMPERATURE);
        let storage = results.series(HotWaterStorage::NAME, HotWaterStorage::WATER_TEMPERATURE);
        let thermal = results.series(HeatPump::NAME, HeatPump::THERMAL_OUTPUT_POWER);
        let electric = results.series(HeatPump::NAME, HeatPump::ELECTRICAL_INPUT_POWER);
        if let (Some(ambient), Some(storage), Some(thermal), Some(electric)) =
            (ambient, storage, thermal, electric)
        {
            for t in 0..results.rows.len() {
                println!(
                    "t={:>4} ({:>6.2}h) | outside={:>6.2} °C  tank={:>5.2} °C  \
                     heat={:>8.1} W  electricity={:>7.1} W",
                    t,
                    t as f32 * results.dt_hours,
                    ambient[t],
                    storage[t],
                    thermal[t],
                    electric[t],
                );
            }
        }
    }

    // Print run summary
    let summary = RunSummary::from_results(&results);
    println!("\n{summary}");

    // Export CSV if requested
    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_csv(&results, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Time series written to {path}");
    }
}
