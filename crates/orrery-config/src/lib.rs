//! Configuration and body catalogs for the orrery.
//!
//! Settings persist to disk as RON and can be overridden from the command
//! line. Body catalogs are RON or JSON lists of body descriptors; a solar
//! system catalog is built in.

mod catalog;
mod cli;
mod config;
mod error;

pub use catalog::{Catalog, CatalogFormat};
pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, IlluminationConfig, ReportConfig, SimulationConfig, default_config_dir,
    parse_date,
};
pub use error::ConfigError;
