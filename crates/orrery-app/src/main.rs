//! `orrery`: print position, spin and daylight of solar system bodies.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p orrery-app -- --date 2024-03-20 --body earth --body moon`.

mod report;

use std::process::ExitCode;

use clap::Parser;
use orrery_config::{Catalog, CliArgs, Config, default_config_dir};
use orrery_mechanics::{SurfacePoint, julian_date, simulation_time_to_calendar_date};
use tracing::{error, info, warn};

use crate::report::{Sample, build_reports};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| std::path::PathBuf::from(".orrery"));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    orrery_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config, args.days) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, days: Option<f64>) -> Result<(), String> {
    let system = Catalog::load_or_builtin(config.simulation.catalog.as_deref())
        .and_then(Catalog::into_system)
        .map_err(|e| e.to_string())?;

    let t = match days {
        Some(days) => days,
        None => config.simulation.start_time().map_err(|e| e.to_string())?,
    };
    match simulation_time_to_calendar_date(t) {
        Ok(date) => info!(t, jd = julian_date(t), "Evaluating {date}"),
        Err(e) => warn!(t, "No calendar date for this time: {e}"),
    }

    let sample = Sample {
        point: SurfacePoint::new(config.report.longitude_deg, config.report.latitude_deg),
        default_width_deg: config.illumination.default_terminator_width_deg,
    };
    let reports =
        build_reports(&system, t, &config.report.bodies, sample).map_err(|e| e.to_string())?;

    println!(
        "t = {t:.5} d (JD {:.5}), sample at ({:.2}°, {:.2}°)",
        julian_date(t),
        sample.point.longitude,
        sample.point.latitude
    );
    for report in &reports {
        println!("{report}");
    }
    info!(bodies = reports.len(), "Report complete");
    Ok(())
}
