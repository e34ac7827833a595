//! Configuration for the skymap tools.
//!
//! Settings persist to disk as a RON file, can be overridden from the
//! command line via clap, and are checked against the pixelization and
//! projection rules before use.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, MapConfig, ProjectionConfig, VectorFieldConfig, config_dir};
pub use error::ConfigError;
