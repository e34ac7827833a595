//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use skymap_map::StorageMode;
use skymap_pixel::PixelOrder;
use skymap_proj::ProjectionKind;

use crate::Config;

/// skymap command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "skymap", about = "Sky map pixelization and projection")]
pub struct CliArgs {
    /// Map resolution (power of two, at most 8192).
    #[arg(long)]
    pub nside: Option<u32>,

    /// Pixel ordering (ring, nested).
    #[arg(long)]
    pub order: Option<PixelOrder>,

    /// Map storage (dense, sparse, auto).
    #[arg(long)]
    pub storage: Option<StorageMode>,

    /// Raster width.
    #[arg(long)]
    pub width: Option<usize>,

    /// Raster height.
    #[arg(long)]
    pub height: Option<usize>,

    /// Projection type (car, sin).
    #[arg(long)]
    pub projection: Option<ProjectionKind>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where to write the projected image.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Seed for the generated sky.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(nside) = args.nside {
            self.map.nside = nside;
        }
        if let Some(order) = args.order {
            self.map.order = order;
        }
        if let Some(storage) = args.storage {
            self.map.storage = storage;
        }
        if let Some(w) = args.width {
            self.projection.width = w;
        }
        if let Some(h) = args.height {
            self.projection.height = h;
        }
        if let Some(kind) = args.projection {
            self.projection.kind = kind;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_args() -> CliArgs {
        CliArgs {
            nside: None,
            order: None,
            storage: None,
            width: None,
            height: None,
            projection: None,
            log_level: None,
            config: None,
            output: None,
            seed: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            nside: Some(128),
            storage: Some(StorageMode::Sparse),
            projection: Some(ProjectionKind::Sin),
            ..no_args()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.map.nside, 128);
        assert_eq!(config.map.storage, StorageMode::Sparse);
        assert_eq!(config.projection.kind, ProjectionKind::Sin);
        // Non-overridden fields retain defaults
        assert_eq!(config.projection.width, 800);
        assert_eq!(config.map.order, PixelOrder::Ring);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&no_args());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = CliArgs::try_parse_from([
            "skymap",
            "--nside",
            "32",
            "--order",
            "nested",
            "--projection",
            "sinusoidal",
            "--seed",
            "7",
        ])
        .unwrap();
        assert_eq!(args.nside, Some(32));
        assert_eq!(args.order, Some(PixelOrder::Nested));
        assert_eq!(args.projection, Some(ProjectionKind::Sin));
        assert_eq!(args.seed, Some(7));
        assert!(CliArgs::try_parse_from(["skymap", "--storage", "banana"]).is_err());
    }
}
