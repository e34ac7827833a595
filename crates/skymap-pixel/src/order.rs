//! Pixel numbering schemes and coordinate frame tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SkyError;

/// The two numbering schemes over the same set of cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelOrder {
    /// Pixels numbered along iso-latitude rings from north to south.
    #[default]
    Ring,
    /// Pixels numbered hierarchically within each base face.
    Nested,
}

impl PixelOrder {
    /// Both orderings.
    pub const ALL: [PixelOrder; 2] = [PixelOrder::Ring, PixelOrder::Nested];

    /// Name used in table headers (`RING` / `NESTED`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PixelOrder::Ring => "RING",
            PixelOrder::Nested => "NESTED",
        }
    }
}

impl fmt::Display for PixelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelOrder {
    type Err = SkyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ring" => Ok(PixelOrder::Ring),
            "nest" | "nested" => Ok(PixelOrder::Nested),
            _ => Err(SkyError::InvalidOrdering(s.to_string())),
        }
    }
}

/// Coordinate system tag. Carried with a map, never interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordFrame {
    /// Celestial / equatorial (`C`).
    #[default]
    Celestial,
    /// Galactic (`G`).
    Galactic,
    /// Ecliptic (`E`).
    Ecliptic,
    /// Anything else (`O`).
    Other,
}

impl CoordFrame {
    /// Single-letter header code.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            CoordFrame::Celestial => 'C',
            CoordFrame::Galactic => 'G',
            CoordFrame::Ecliptic => 'E',
            CoordFrame::Other => 'O',
        }
    }
}

impl fmt::Display for CoordFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for CoordFrame {
    type Err = SkyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "celestial" | "equatorial" => Ok(CoordFrame::Celestial),
            "g" | "galactic" => Ok(CoordFrame::Galactic),
            "e" | "ecliptic" => Ok(CoordFrame::Ecliptic),
            "o" | "other" => Ok(CoordFrame::Other),
            _ => Err(SkyError::InvalidCoordFrame(s.to_string())),
        }
    }
}
