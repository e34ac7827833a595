//! Conversions between orderings and between resolutions.

use crate::face::{nest2xyf, ring2xyf, xyf2nest, xyf2ring};
use crate::{Nside, PixelOrder, SkyError};

/// Nested index to ring index.
pub fn nest2ring(nside: Nside, pix: u64) -> Result<u64, SkyError> {
    Ok(xyf2ring(nside, nest2xyf(nside, pix)?))
}

/// Ring index to nested index.
pub fn ring2nest(nside: Nside, pix: u64) -> Result<u64, SkyError> {
    Ok(xyf2nest(nside, ring2xyf(nside, pix)?))
}

/// Re-express `pix`, given in `from` ordering, in the other ordering.
pub fn convert_ordering(nside: Nside, pix: u64, from: PixelOrder) -> Result<u64, SkyError> {
    match from {
        PixelOrder::Ring => ring2nest(nside, pix),
        PixelOrder::Nested => nest2ring(nside, pix),
    }
}

/// Re-express `pix` from ordering `from` into ordering `to`.
///
/// Identity when the orderings match (after the range check).
pub fn reorder(nside: Nside, pix: u64, from: PixelOrder, to: PixelOrder) -> Result<u64, SkyError> {
    if from == to {
        nside.check_pixel(pix)?;
        return Ok(pix);
    }
    convert_ordering(nside, pix, from)
}

/// The nested index at `new` resolution of the cell containing nested `pix`
/// at `old` resolution. `new` must not be finer than `old`.
pub fn degrade_nest(old: Nside, pix: u64, new: Nside) -> Result<u64, SkyError> {
    old.check_pixel(pix)?;
    if new > old {
        return Err(SkyError::OutOfRange(format!(
            "cannot degrade from nside {old} to finer nside {new}"
        )));
    }
    let old_shift = 2 * old.factor();
    let face = pix >> old_shift;
    let local = pix & (old.face_pixels() - 1);
    let dropped = 2 * (old.factor() - new.factor());
    Ok((local >> dropped) + (face << (2 * new.factor())))
}

/// [`degrade_nest`] for ring indices.
pub fn degrade_ring(old: Nside, pix: u64, new: Nside) -> Result<u64, SkyError> {
    let nested = ring2nest(old, pix)?;
    let coarse = degrade_nest(old, nested, new)?;
    nest2ring(new, coarse)
}

/// [`degrade_nest`] or [`degrade_ring`] depending on `order`.
pub fn degrade(old: Nside, pix: u64, new: Nside, order: PixelOrder) -> Result<u64, SkyError> {
    match order {
        PixelOrder::Ring => degrade_ring(old, pix, new),
        PixelOrder::Nested => degrade_nest(old, pix, new),
    }
}
