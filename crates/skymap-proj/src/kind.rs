use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skymap_pixel::SkyError;

/// Supported plate projections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectionKind {
    /// Equirectangular: x linear in longitude, y linear in colatitude.
    #[default]
    Car,
    /// Sinusoidal: equal-area, x scaled by `sin θ`.
    Sin,
}

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 2] = [ProjectionKind::Car, ProjectionKind::Sin];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectionKind::Car => "CAR",
            ProjectionKind::Sin => "SIN",
        }
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectionKind {
    type Err = SkyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" | "cartesian" | "equirectangular" => Ok(ProjectionKind::Car),
            "sin" | "sinusoidal" => Ok(ProjectionKind::Sin),
            _ => Err(SkyError::ProjectionDomain(format!(
                "unrecognized projection type {s:?}"
            ))),
        }
    }
}
