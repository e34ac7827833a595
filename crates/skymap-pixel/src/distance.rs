//! Angular separation between pixel centres.

use crate::angle::pix2vec;
use crate::{Nside, PixelOrder, SkyError};

/// Great-circle angle in radians between the centres of two pixels.
pub fn distance(nside: Nside, order: PixelOrder, a: u64, b: u64) -> Result<f64, SkyError> {
    let va = pix2vec(nside, order, a)?;
    let vb = pix2vec(nside, order, b)?;
    Ok(va.dot(vb).clamp(-1.0, 1.0).acos())
}
