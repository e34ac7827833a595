//! Configuration structs with defaults and RON persistence.

use std::f64::consts::{PI, TAU};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skymap_map::StorageMode;
use skymap_pixel::{CoordFrame, Nside, PixelOrder, SkyError};
use skymap_proj::{ProjectionKind, Window};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Map settings.
    pub map: MapConfig,
    /// Raster projection settings.
    pub projection: ProjectionConfig,
    /// Vector field sampling.
    pub vector_field: VectorFieldConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Resolution, numbering and storage of generated maps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    /// Resolution; a power of two up to 8192.
    pub nside: u32,
    pub order: PixelOrder,
    pub frame: CoordFrame,
    pub storage: StorageMode,
}

/// Raster size and sky window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Raster width in cells.
    pub width: usize,
    /// Raster height in cells.
    pub height: usize,
    pub kind: ProjectionKind,
    /// Colatitude range in radians.
    pub min_theta: f64,
    pub max_theta: f64,
    /// Longitude range in radians. `max_phi < min_phi` wraps through zero.
    pub min_phi: f64,
    pub max_phi: f64,
}

/// Arrow sampling for vector fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VectorFieldConfig {
    /// Resolution the components are resampled to before drawing.
    pub sample_nside: u32,
    /// Magnitude drawn as one cell spacing.
    pub max_magnitude: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            nside: 64,
            order: PixelOrder::Ring,
            frame: CoordFrame::Galactic,
            storage: StorageMode::Dense,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            kind: ProjectionKind::Car,
            min_theta: 0.0,
            max_theta: PI,
            min_phi: 0.0,
            max_phi: TAU,
        }
    }
}

impl Default for VectorFieldConfig {
    fn default() -> Self {
        Self {
            sample_nside: 8,
            max_magnitude: 1.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Typed accessors ---

impl MapConfig {
    pub fn nside(&self) -> Result<Nside, SkyError> {
        Nside::new(self.nside)
    }
}

impl ProjectionConfig {
    pub fn window(&self) -> Result<Window, SkyError> {
        Window::new(self.min_theta, self.max_theta, self.min_phi, self.max_phi)
    }
}

impl VectorFieldConfig {
    pub fn sample_nside(&self) -> Result<Nside, SkyError> {
        Nside::new(self.sample_nside)
    }
}

/// Default per-user config location.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("skymap"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Returns `Some(new_config)` if the file on disk differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Check every value that the typed accessors would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nside = self.map.nside()?;
        let sample = self.vector_field.sample_nside()?;
        if sample > nside {
            return Err(SkyError::OutOfRange(format!(
                "vector field nside {sample} exceeds map nside {nside}"
            ))
            .into());
        }
        if self.vector_field.max_magnitude.is_nan() || self.vector_field.max_magnitude <= 0.0 {
            return Err(SkyError::OutOfRange(format!(
                "max_magnitude {} must be positive",
                self.vector_field.max_magnitude
            ))
            .into());
        }
        if self.projection.width == 0 || self.projection.height == 0 {
            return Err(SkyError::OutOfRange(format!(
                "raster size {} x {} must be non-zero",
                self.projection.width, self.projection.height
            ))
            .into());
        }
        self.projection.window()?;
        Ok(())
    }
}
