//! The resolution parameter and the pixel counts derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SkyError;

/// Largest supported nside.
pub const NSIDE_MAX: u32 = 8192;

/// `log2(NSIDE_MAX)`.
pub const MAX_FACTOR: u32 = 13;

/// Number of base faces.
pub const FACES: u64 = 12;

/// A validated resolution: a power of two in `1..=NSIDE_MAX`.
///
/// Each of the 12 faces is split into `nside × nside` cells, so the sphere
/// holds `12·nside²` pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Nside(u32);

impl Nside {
    /// The finest supported resolution.
    pub const MAX: Nside = Nside(NSIDE_MAX);

    /// Validate an nside value.
    pub fn new(nside: u32) -> Result<Self, SkyError> {
        if nside == 0 || nside > NSIDE_MAX || !nside.is_power_of_two() {
            return Err(SkyError::InvalidResolution(u64::from(nside)));
        }
        Ok(Self(nside))
    }

    /// Nside `2^factor`.
    pub fn from_factor(factor: u32) -> Result<Self, SkyError> {
        if factor > MAX_FACTOR {
            return Err(SkyError::InvalidResolution(1u64 << factor.min(63)));
        }
        Ok(Self(1 << factor))
    }

    /// Recover the nside of a full-sky pixel count.
    pub fn from_npix(npix: u64) -> Result<Self, SkyError> {
        if npix == 0 || npix % FACES != 0 {
            return Err(SkyError::InvalidResolution(npix));
        }
        let per_face = npix / FACES;
        let side = (per_face as f64).sqrt().round() as u64;
        if side * side != per_face || side > u64::from(NSIDE_MAX) {
            return Err(SkyError::InvalidResolution(side));
        }
        Self::new(side as u32)
    }

    /// The raw value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// `log2(nside)`.
    #[must_use]
    pub fn factor(self) -> u32 {
        self.0.trailing_zeros()
    }

    /// Total number of pixels, `12·nside²`.
    #[must_use]
    pub fn npix(self) -> u64 {
        FACES * self.face_pixels()
    }

    /// Pixels per base face, `nside²`.
    #[must_use]
    pub fn face_pixels(self) -> u64 {
        let n = u64::from(self.0);
        n * n
    }

    /// Pixels in the north polar cap, `2·(nside² − nside)`.
    #[must_use]
    pub fn ncap(self) -> u64 {
        let n = u64::from(self.0);
        2 * (n * n - n)
    }

    /// Reject pixel indices at or beyond [`Nside::npix`].
    pub fn check_pixel(self, pix: u64) -> Result<(), SkyError> {
        let npix = self.npix();
        if pix >= npix {
            return Err(SkyError::PixelOutOfRange { pix, npix });
        }
        Ok(())
    }
}

impl TryFrom<u32> for Nside {
    type Error = SkyError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Nside::new(value)
    }
}

impl From<Nside> for u32 {
    fn from(nside: Nside) -> Self {
        nside.0
    }
}

impl fmt::Display for Nside {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Nside {
    type Err = SkyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| SkyError::OutOfRange(format!("nside {s:?} is not an integer")))?;
        Nside::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_powers_of_two_are_valid() {
        for factor in 0..=MAX_FACTOR {
            let nside = Nside::new(1 << factor).unwrap();
            assert_eq!(nside.factor(), factor);
            assert_eq!(Nside::from_factor(factor).unwrap(), nside);
        }
    }

    #[test]
    fn test_invalid_values_rejected() {
        for bad in [0, 3, 6, 12, 100, 16384] {
            assert_eq!(
                Nside::new(bad),
                Err(SkyError::InvalidResolution(u64::from(bad))),
                "nside {bad} should be rejected"
            );
        }
        assert!(Nside::from_factor(MAX_FACTOR + 1).is_err());
    }

    #[test]
    fn test_pixel_counts() {
        let nside = Nside::new(4).unwrap();
        assert_eq!(nside.npix(), 192);
        assert_eq!(nside.face_pixels(), 16);
        assert_eq!(nside.ncap(), 24);
        assert_eq!(Nside::new(1).unwrap().npix(), 12);
        assert_eq!(Nside::MAX.npix(), 12 * 8192 * 8192);
    }

    #[test]
    fn test_npix_roundtrip() {
        for factor in 0..=MAX_FACTOR {
            let nside = Nside::from_factor(factor).unwrap();
            assert_eq!(Nside::from_npix(nside.npix()).unwrap(), nside);
        }
        assert!(Nside::from_npix(13).is_err());
        assert!(Nside::from_npix(12 * 9).is_err());
    }

    #[test]
    fn test_check_pixel() {
        let nside = Nside::new(2).unwrap();
        assert!(nside.check_pixel(47).is_ok());
        assert_eq!(
            nside.check_pixel(48),
            Err(SkyError::PixelOutOfRange { pix: 48, npix: 48 })
        );
    }

    #[test]
    fn test_parse_and_display() {
        let nside: Nside = "64".parse().unwrap();
        assert_eq!(nside.get(), 64);
        assert_eq!(nside.to_string(), "64");
        assert!("63".parse::<Nside>().is_err());
        assert!("abc".parse::<Nside>().is_err());
    }
}
