//! Command-line argument parsing for the orrery.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Positions, spin and daylight of solar system bodies")]
pub struct CliArgs {
    /// Date to evaluate, RFC 3339 or YYYY-MM-DD.
    #[arg(long)]
    pub date: Option<String>,

    /// Raw simulation time in days since J2000.0 (wins over --date).
    #[arg(long, allow_negative_numbers = true)]
    pub days: Option<f64>,

    /// Only report this body (repeatable).
    #[arg(long = "body")]
    pub bodies: Vec<String>,

    /// Longitude of the surface sample point in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Latitude of the surface sample point in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Body catalog file (.ron or .json).
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    ///
    /// `--days` is not a config setting; the host reads it directly.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref date) = args.date {
            self.simulation.start_date = Some(date.clone());
        }
        if !args.bodies.is_empty() {
            self.report.bodies = args.bodies.clone();
        }
        if let Some(lon) = args.lon {
            self.report.longitude_deg = lon;
        }
        if let Some(lat) = args.lat {
            self.report.latitude_deg = lat;
        }
        if let Some(ref catalog) = args.catalog {
            self.simulation.catalog = Some(catalog.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
