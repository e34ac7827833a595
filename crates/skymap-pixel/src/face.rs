//! Face-local `(x, y, face)` coordinates and their link to both orderings.

use crate::tables::{pix2xy, xy2pix};
use crate::{Nside, SkyError};

/// Ring number (in units of nside) of each face's southern-most corner.
pub(crate) const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];

/// Longitude (in units of π/4) of each face's centre.
pub(crate) const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

/// A pixel expressed as a position inside one of the 12 base faces.
///
/// `x` grows towards the north-east, `y` towards the north-west, both in
/// `0..nside`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceXy {
    /// Column within the face.
    pub x: u32,
    /// Row within the face.
    pub y: u32,
    /// Base face, `0..12`.
    pub face: u8,
}

impl FaceXy {
    /// Create a face coordinate, checking it against `nside`.
    pub fn new(nside: Nside, x: u32, y: u32, face: u8) -> Result<Self, SkyError> {
        let n = nside.get();
        if x >= n || y >= n {
            return Err(SkyError::OutOfRange(format!(
                "face position ({x}, {y}) outside {n}x{n} face"
            )));
        }
        if face >= 12 {
            return Err(SkyError::OutOfRange(format!("face {face} is not in 0..12")));
        }
        Ok(Self { x, y, face })
    }
}

/// Integer square root, exact for all pixel counts in range.
pub(crate) fn isqrt(value: u64) -> u64 {
    let mut root = (value as f64).sqrt() as u64;
    while root * root > value {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= value {
        root += 1;
    }
    root
}

/// Nested index to face coordinates.
pub fn nest2xyf(nside: Nside, pix: u64) -> Result<FaceXy, SkyError> {
    nside.check_pixel(pix)?;
    let shift = 2 * nside.factor();
    let face = (pix >> shift) as u8;
    let (x, y) = pix2xy(pix & (nside.face_pixels() - 1));
    Ok(FaceXy { x, y, face })
}

/// Face coordinates to nested index.
#[must_use]
pub fn xyf2nest(nside: Nside, xyf: FaceXy) -> u64 {
    xy2pix(xyf.x, xyf.y) + (u64::from(xyf.face) << (2 * nside.factor()))
}

/// Ring index to face coordinates.
pub fn ring2xyf(nside: Nside, pix: u64) -> Result<FaceXy, SkyError> {
    nside.check_pixel(pix)?;
    let n = i64::from(nside.get());
    let factor = nside.factor();
    let npix = nside.npix() as i64;
    let ncap = nside.ncap() as i64;
    let p = pix as i64;

    let (iring, iphi, kshift, nr, face);
    if p < ncap {
        // North polar cap
        let ir = ((1 + isqrt((1 + 2 * p) as u64)) >> 1) as i64;
        iring = ir;
        iphi = p + 1 - 2 * ir * (ir - 1);
        kshift = 0;
        nr = ir;
        face = ((iphi - 1) / nr) as usize;
    } else if p < npix - ncap {
        // Equatorial belt
        let ip = p - ncap;
        iring = (ip >> (factor + 2)) + n;
        iphi = (ip & (4 * n - 1)) + 1;
        kshift = (iring + n) & 1;
        nr = n;
        let ire = iring - n + 1;
        let irm = 2 * n + 2 - ire;
        let ifm = (iphi - ire / 2 + n - 1) >> factor;
        let ifp = (iphi - irm / 2 + n - 1) >> factor;
        face = if ifp == ifm {
            if ifp == 4 { 4 } else { (ifp + 4) as usize }
        } else if ifp < ifm {
            ifp as usize
        } else {
            (ifm + 8) as usize
        };
    } else {
        // South polar cap
        let ip = npix - p;
        let ir = ((1 + isqrt((2 * ip - 1) as u64)) >> 1) as i64;
        iphi = 4 * ir + 1 - (ip - 2 * ir * (ir - 1));
        kshift = 0;
        nr = ir;
        iring = 4 * n - ir;
        face = ((iphi - 1) / nr + 8) as usize;
    }

    let irt = iring - JRLL[face] * n + 1;
    let mut ipt = 2 * iphi - JPLL[face] * nr - kshift - 1;
    if ipt >= 2 * n {
        ipt -= 8 * n;
    }
    Ok(FaceXy {
        x: ((ipt - irt) >> 1) as u32,
        y: ((-(ipt + irt)) >> 1) as u32,
        face: face as u8,
    })
}

/// Face coordinates to ring index.
#[must_use]
pub fn xyf2ring(nside: Nside, xyf: FaceXy) -> u64 {
    let n = i64::from(nside.get());
    let nl4 = 4 * n;
    let face = usize::from(xyf.face);
    let x = i64::from(xyf.x);
    let y = i64::from(xyf.y);

    let jr = JRLL[face] * n - x - y - 1;
    let (nr, n_before, kshift) = if jr < n {
        (jr, 2 * jr * (jr - 1), 0)
    } else if jr > 3 * n {
        let nr = nl4 - jr;
        (nr, nside.npix() as i64 - 2 * (nr + 1) * nr, 0)
    } else {
        (n, nside.ncap() as i64 + (jr - n) * nl4, (jr - n) & 1)
    };

    let mut jp = (JPLL[face] * nr + x - y + 1 + kshift) / 2;
    if jp > nl4 {
        jp -= nl4;
    } else if jp < 1 {
        jp += nl4;
    }
    (n_before + jp - 1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nside(n: u32) -> Nside {
        Nside::new(n).unwrap()
    }

    #[test]
    fn test_isqrt_exact() {
        for v in [0u64, 1, 2, 3, 4, 15, 16, 17, 99, 100, 1 << 40, (1 << 40) - 1] {
            let r = isqrt(v);
            assert!(r * r <= v && (r + 1) * (r + 1) > v, "isqrt({v}) = {r}");
        }
    }

    #[test]
    fn test_nest_face_roundtrip() {
        for n in [1, 2, 4, 16] {
            let nside = nside(n);
            for pix in 0..nside.npix() {
                let xyf = nest2xyf(nside, pix).unwrap();
                assert!(xyf.x < n && xyf.y < n && xyf.face < 12);
                assert_eq!(xyf2nest(nside, xyf), pix);
            }
        }
    }

    #[test]
    fn test_ring_face_roundtrip() {
        for n in [1, 2, 4, 8, 32] {
            let nside = nside(n);
            for pix in 0..nside.npix() {
                let xyf = ring2xyf(nside, pix).unwrap();
                assert!(
                    xyf.x < n && xyf.y < n && xyf.face < 12,
                    "pix {pix} at nside {n} gave {xyf:?}"
                );
                assert_eq!(xyf2ring(nside, xyf), pix, "nside {n} pix {pix}");
            }
        }
    }

    #[test]
    fn test_nside_one_faces() {
        let nside = nside(1);
        for pix in 0..12 {
            assert_eq!(nest2xyf(nside, pix).unwrap().face, pix as u8);
            assert_eq!(ring2xyf(nside, pix).unwrap().face, pix as u8);
        }
    }

    #[test]
    fn test_face_corners_in_ring_order() {
        let nside = nside(4);
        // The northern-most cell of face 0 is the first ring pixel.
        let top = FaceXy::new(nside, 3, 3, 0).unwrap();
        assert_eq!(xyf2ring(nside, top), 0);
        // The southern-most cell of face 11 is the last ring pixel.
        let bottom = FaceXy::new(nside, 0, 0, 11).unwrap();
        assert_eq!(xyf2ring(nside, bottom), nside.npix() - 1);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let nside = nside(4);
        assert!(ring2xyf(nside, 192).is_err());
        assert!(nest2xyf(nside, 500).is_err());
        assert!(FaceXy::new(nside, 4, 0, 0).is_err());
        assert!(FaceXy::new(nside, 0, 0, 12).is_err());
    }
}
