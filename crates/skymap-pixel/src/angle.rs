//! Conversions between sky positions and pixel indices.
//!
//! Angles follow the usual spherical convention: `theta` is the colatitude in
//! `[0, π]` measured from the north pole, `phi` the longitude in `[0, 2π)`.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::DVec3;

use crate::convert::{degrade_nest, degrade_ring};
use crate::face::{FaceXy, JPLL, JRLL, isqrt, nest2xyf, xyf2nest};
use crate::nside::{MAX_FACTOR, NSIDE_MAX};
use crate::{Nside, PixelOrder, SkyError};

/// Boundary `|cos θ|` between the polar caps and the equatorial belt.
pub const TRANSITION_Z: f64 = 2.0 / 3.0;

/// Below this colatitude a direction is treated as the pole itself.
const POLE_TOLERANCE: f64 = PI / (1000.0 * 4.0 * NSIDE_MAX as f64);

fn check_angles(theta: f64, phi: f64) -> Result<(), SkyError> {
    if !theta.is_finite() || !(0.0..=PI).contains(&theta) {
        return Err(SkyError::OutOfRange(format!(
            "colatitude {theta} not in [0, pi]"
        )));
    }
    if !phi.is_finite() {
        return Err(SkyError::OutOfRange(format!("longitude {phi} is not finite")));
    }
    Ok(())
}

/// Wrap a longitude into `[0, 2π)`.
#[must_use]
pub fn normalize_phi(phi: f64) -> f64 {
    let wrapped = phi.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Edge-line indices `(jp, jm)` of a point in the equatorial belt at
/// `NSIDE_MAX`.
fn belt_lines(z: f64, tt: f64) -> (i64, i64) {
    let n = f64::from(NSIDE_MAX);
    let temp1 = n * (0.5 + tt);
    let temp2 = n * z * 0.75;
    ((temp1 - temp2) as i64, (temp1 + temp2) as i64)
}

/// Edge-line indices `(jp, jm)` of a point in a polar cap at `NSIDE_MAX`,
/// clamped for points on the cap boundary.
fn cap_lines(za: f64, tp: f64) -> (i64, i64) {
    let nmax = i64::from(NSIDE_MAX);
    let tmp = f64::from(NSIDE_MAX) * (3.0 * (1.0 - za)).sqrt();
    let jp = ((tp * tmp) as i64).min(nmax - 1);
    let jm = (((1.0 - tp) * tmp) as i64).min(nmax - 1);
    (jp, jm)
}

fn ang2pix_ring_max(theta: f64, phi: f64) -> u64 {
    let nmax = i64::from(NSIDE_MAX);
    let z = theta.cos();
    let za = z.abs();
    let tt = 2.0 * normalize_phi(phi) / PI;

    let pix = if za <= TRANSITION_Z {
        let (jp, jm) = belt_lines(z, tt);
        // ring number counted from z = 2/3, in 1..=2n+1
        let ir = nmax + 1 + jp - jm;
        let kshift = 1 - (ir & 1);
        let ip = ((jp + jm - nmax + kshift + 1) / 2).rem_euclid(4 * nmax);
        Nside::MAX.ncap() as i64 + (ir - 1) * 4 * nmax + ip
    } else {
        let (jp, jm) = cap_lines(za, tt - tt.floor());
        // ring number counted from the closest pole
        let ir = jp + jm + 1;
        let ip = ((tt * ir as f64) as i64).rem_euclid(4 * ir);
        if z > 0.0 {
            2 * ir * (ir - 1) + ip
        } else {
            Nside::MAX.npix() as i64 - 2 * ir * (ir + 1) + ip
        }
    };
    pix as u64
}

fn ang2pix_nest_max(theta: f64, phi: f64) -> u64 {
    let nmax = i64::from(NSIDE_MAX);
    let z = theta.cos();
    let za = z.abs();
    let tt = 2.0 * normalize_phi(phi) / PI;

    let (face, x, y) = if za <= TRANSITION_Z {
        let (jp, jm) = belt_lines(z, tt);
        let ifp = jp >> MAX_FACTOR;
        let ifm = jm >> MAX_FACTOR;
        let face = if ifp == ifm {
            ifp | 4
        } else if ifp < ifm {
            ifp
        } else {
            ifm + 8
        };
        (face, jm & (nmax - 1), nmax - (jp & (nmax - 1)) - 1)
    } else {
        let ntt = (tt as i64).min(3);
        let (jp, jm) = cap_lines(za, tt - ntt as f64);
        if z >= 0.0 {
            (ntt, nmax - jm - 1, nmax - jp - 1)
        } else {
            (ntt + 8, jp, jm)
        }
    };

    xyf2nest(
        Nside::MAX,
        FaceXy {
            x: x as u32,
            y: y as u32,
            face: face as u8,
        },
    )
}

/// Ring-ordered pixel containing `(theta, phi)`.
///
/// Computed at [`NSIDE_MAX`] and degraded, so rounding does not depend on
/// `nside`.
pub fn ang2pix_ring(nside: Nside, theta: f64, phi: f64) -> Result<u64, SkyError> {
    check_angles(theta, phi)?;
    degrade_ring(Nside::MAX, ang2pix_ring_max(theta, phi), nside)
}

/// Nested pixel containing `(theta, phi)`.
pub fn ang2pix_nest(nside: Nside, theta: f64, phi: f64) -> Result<u64, SkyError> {
    check_angles(theta, phi)?;
    degrade_nest(Nside::MAX, ang2pix_nest_max(theta, phi), nside)
}

/// Pixel containing `(theta, phi)` in the given ordering.
pub fn ang2pix(nside: Nside, order: PixelOrder, theta: f64, phi: f64) -> Result<u64, SkyError> {
    match order {
        PixelOrder::Ring => ang2pix_ring(nside, theta, phi),
        PixelOrder::Nested => ang2pix_nest(nside, theta, phi),
    }
}

/// Centre `(theta, phi)` of a ring-ordered pixel.
pub fn pix2ang_ring(nside: Nside, pix: u64) -> Result<(f64, f64), SkyError> {
    nside.check_pixel(pix)?;
    let n = i64::from(nside.get());
    let nf = f64::from(nside.get());
    let ncap = nside.ncap() as i64;
    let npix = nside.npix() as i64;
    let p = pix as i64;

    if p < ncap {
        let iring = ((1 + isqrt((1 + 2 * p) as u64)) >> 1) as i64;
        let iphi = p + 1 - 2 * iring * (iring - 1);
        let theta = (1.0 - (iring * iring) as f64 / (3.0 * nf * nf)).acos();
        let phi = (iphi as f64 - 0.5) * PI / (2.0 * iring as f64);
        Ok((theta, phi))
    } else if p < npix - ncap {
        let ip = p - ncap;
        let iring = ip / (4 * n) + n;
        let iphi = ip % (4 * n) + 1;
        let fodd = if (iring + n) & 1 == 1 { 1.0 } else { 0.5 };
        let nl2 = 2 * n;
        let theta = ((nl2 - iring) as f64 * 2.0 / (3.0 * nf)).acos();
        let phi = (iphi as f64 - fodd) * PI / nl2 as f64;
        Ok((theta, phi))
    } else {
        let ip = npix - p;
        let iring = ((1 + isqrt((2 * ip - 1) as u64)) >> 1) as i64;
        let iphi = 4 * iring + 1 - (ip - 2 * iring * (iring - 1));
        let theta = (-1.0 + (iring * iring) as f64 / (3.0 * nf * nf)).acos();
        let phi = (iphi as f64 - 0.5) * PI / (2 * iring) as f64;
        Ok((theta, phi))
    }
}

/// Centre `(theta, phi)` of a nested pixel.
pub fn pix2ang_nest(nside: Nside, pix: u64) -> Result<(f64, f64), SkyError> {
    let xyf = nest2xyf(nside, pix)?;
    let n = i64::from(nside.get());
    let nf = f64::from(nside.get());
    let nl4 = 4 * n;
    let face = usize::from(xyf.face);
    let x = i64::from(xyf.x);
    let y = i64::from(xyf.y);

    let jr = JRLL[face] * n - x - y - 1;
    let (nr, z, kshift) = if jr < n {
        (jr, 1.0 - (jr * jr) as f64 / (3.0 * nf * nf), 0)
    } else if jr > 3 * n {
        let nr = nl4 - jr;
        (nr, (nr * nr) as f64 / (3.0 * nf * nf) - 1.0, 0)
    } else {
        (n, (2 * n - jr) as f64 * 2.0 / (3.0 * nf), (jr - n) & 1)
    };

    let mut jp = (JPLL[face] * nr + x - y + 1 + kshift) / 2;
    if jp > nl4 {
        jp -= nl4;
    }
    if jp < 1 {
        jp += nl4;
    }

    let theta = z.acos();
    let phi = (jp as f64 - (kshift + 1) as f64 * 0.5) * FRAC_PI_2 / nr as f64;
    Ok((theta, phi))
}

/// Centre `(theta, phi)` of a pixel in the given ordering.
pub fn pix2ang(nside: Nside, order: PixelOrder, pix: u64) -> Result<(f64, f64), SkyError> {
    match order {
        PixelOrder::Ring => pix2ang_ring(nside, pix),
        PixelOrder::Nested => pix2ang_nest(nside, pix),
    }
}

/// Unit vector pointing at `(theta, phi)`.
#[must_use]
pub fn ang2vec(theta: f64, phi: f64) -> DVec3 {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    DVec3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

/// Direction of `v` as `(theta, phi)`. `v` need not be normalised.
///
/// Longitude is reported as 0 for directions within a tiny tolerance of
/// either pole.
pub fn vec2ang(v: DVec3) -> Result<(f64, f64), SkyError> {
    if !v.is_finite() || v.length_squared() == 0.0 {
        return Err(SkyError::OutOfRange(format!("{v} is not a direction")));
    }
    let theta = v.x.hypot(v.y).atan2(v.z);
    let mut phi = 0.0;
    if theta.abs() > POLE_TOLERANCE {
        phi = v.y.atan2(v.x);
        if phi < 0.0 {
            phi += TAU;
        }
    }
    Ok((theta, phi))
}

/// Unit vector to the centre of a pixel.
pub fn pix2vec(nside: Nside, order: PixelOrder, pix: u64) -> Result<DVec3, SkyError> {
    let (theta, phi) = pix2ang(nside, order, pix)?;
    Ok(ang2vec(theta, phi))
}

/// Pixel containing direction `v`.
pub fn vec2pix(nside: Nside, order: PixelOrder, v: DVec3) -> Result<u64, SkyError> {
    let (theta, phi) = vec2ang(v)?;
    ang2pix(nside, order, theta, phi)
}
