//! Point-wise forward and reverse plate projections.
//!
//! Raster coordinates run from `(0, 0)` to `(nx, ny)`. Row `y = 0` is the
//! window's maximum colatitude and `y = ny` its minimum. Points outside the
//! window map to `None`; inputs outside the sphere are errors.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use skymap_pixel::SkyError;

use crate::kind::ProjectionKind;
use crate::window::{Window, signed_phi, wrap_phi};

fn check_size(nx: usize, ny: usize) -> Result<(), SkyError> {
    if nx == 0 || ny == 0 {
        return Err(SkyError::OutOfRange(format!(
            "raster size {nx} x {ny} must be non-zero"
        )));
    }
    Ok(())
}

fn check_angles(theta: f64, phi: f64) -> Result<(), SkyError> {
    if !(0.0..=PI).contains(&theta) {
        return Err(SkyError::OutOfRange(format!("theta {theta} not in [0, pi]")));
    }
    if !(0.0..=TAU).contains(&phi) {
        return Err(SkyError::OutOfRange(format!("phi {phi} not in [0, 2pi]")));
    }
    Ok(())
}

/// Project `(theta, phi)` onto an `nx` × `ny` raster.
pub fn forward(
    window: &Window,
    nx: usize,
    ny: usize,
    kind: ProjectionKind,
    theta: f64,
    phi: f64,
) -> Result<Option<(f64, f64)>, SkyError> {
    window.validate()?;
    check_size(nx, ny)?;
    check_angles(theta, phi)?;
    let (nx, ny) = (nx as f64, ny as f64);

    if !window.contains_theta(theta) {
        return Ok(None);
    }
    let y = (window.max_theta() - theta) / window.theta_span() * ny;

    match kind {
        ProjectionKind::Car => {
            if !window.contains_phi(phi) {
                return Ok(None);
            }
            let delta = if window.wraps() && phi <= window.max_phi() {
                phi + TAU - window.min_phi()
            } else {
                phi - window.min_phi()
            };
            Ok(Some((delta / window.phi_span() * nx, y)))
        }
        ProjectionKind::Sin => {
            let half = window.sin_half_width();
            let tempx = signed_phi(phi - window.centre_phi()) * (theta - FRAC_PI_2).cos();
            if tempx.abs() > half {
                return Ok(None);
            }
            Ok(Some((0.5 * nx * (tempx / half + 1.0), y)))
        }
    }
}

/// Recover `(theta, phi)` from raster coordinates.
pub fn reverse(
    window: &Window,
    nx: usize,
    ny: usize,
    kind: ProjectionKind,
    x: f64,
    y: f64,
) -> Result<Option<(f64, f64)>, SkyError> {
    window.validate()?;
    check_size(nx, ny)?;
    let (nx, ny) = (nx as f64, ny as f64);

    if !(0.0..=nx).contains(&x) || !(0.0..=ny).contains(&y) {
        return Ok(None);
    }
    let theta = window.max_theta() - (y / ny) * window.theta_span();

    match kind {
        ProjectionKind::Car => {
            let phi = wrap_phi(window.min_phi() + (x / nx) * window.phi_span());
            Ok(Some((theta, phi)))
        }
        ProjectionKind::Sin => {
            let scale = (theta - FRAC_PI_2).cos();
            if theta == 0.0 || theta == PI || scale.abs() <= f64::EPSILON {
                // A pole collapses to the middle column.
                return Ok((x == 0.5 * nx).then(|| (theta, window.centre_phi())));
            }
            let ph = (2.0 * x / nx - 1.0) * window.sin_half_width() / scale;
            if ph.abs() > PI {
                return Ok(None);
            }
            Ok(Some((theta, wrap_phi(ph + window.centre_phi()))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const NX: usize = 360;
    const NY: usize = 180;

    fn angle_close(a: f64, b: f64) -> bool {
        signed_phi(a - b).abs() < 1e-9
    }

    fn cell(p: (f64, f64)) -> (usize, usize) {
        (p.0 as usize, p.1 as usize)
    }

    #[test]
    fn test_car_full_sky_corners() {
        let w = Window::FULL_SKY;
        let k = ProjectionKind::Car;
        assert_eq!(forward(&w, NX, NY, k, PI, 0.0).unwrap(), Some((0.0, 0.0)));
        assert_eq!(
            forward(&w, NX, NY, k, 0.0, TAU).unwrap(),
            Some((NX as f64, NY as f64))
        );
        let (x, y) = forward(&w, NX, NY, k, FRAC_PI_2, PI).unwrap().unwrap();
        assert!((x - 180.0).abs() < 1e-9);
        assert!((y - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_inside_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let windows = [
            Window::FULL_SKY,
            Window::new(0.4, 2.0, 1.0, 3.0).unwrap(),
            Window::new(0.2, 2.9, 5.0, 1.5).unwrap(),
        ];
        for w in windows {
            for kind in ProjectionKind::ALL {
                for _ in 0..500 {
                    let theta = rng.random_range(w.min_theta()..=w.max_theta());
                    let phi = wrap_phi(w.min_phi() + rng.random_range(0.0..w.phi_span()));
                    let Some(xy) = forward(&w, NX, NY, kind, theta, phi).unwrap() else {
                        assert_eq!(kind, ProjectionKind::Sin);
                        continue;
                    };
                    let (t, p) = reverse(&w, NX, NY, kind, xy.0, xy.1).unwrap().unwrap();
                    assert!((t - theta).abs() < 1e-9, "{kind} theta {theta} -> {t}");
                    assert!(angle_close(p, phi), "{kind} phi {phi} -> {p}");

                    // The centre of the landing cell maps back into that cell.
                    let (i, j) = cell(xy);
                    if i < NX && j < NY {
                        let centre = (i as f64 + 0.5, j as f64 + 0.5);
                        if let Some((t, p)) = reverse(&w, NX, NY, kind, centre.0, centre.1).unwrap()
                        {
                            let back = forward(&w, NX, NY, kind, t, p).unwrap().unwrap();
                            assert_eq!(cell(back), (i, j));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_outside_window_is_none() {
        let w = Window::new(0.5, 1.5, 1.0, 2.0).unwrap();
        for kind in ProjectionKind::ALL {
            assert_eq!(forward(&w, NX, NY, kind, 0.2, 1.5).unwrap(), None);
            assert_eq!(forward(&w, NX, NY, kind, 1.0, 4.0).unwrap(), None);
            assert_eq!(reverse(&w, NX, NY, kind, -1.0, 5.0).unwrap(), None);
            assert_eq!(reverse(&w, NX, NY, kind, 5.0, NY as f64 + 0.1).unwrap(), None);
        }
    }

    #[test]
    fn test_car_wrapped_window() {
        let w = Window::new(0.0, PI, 3.0 * FRAC_PI_2, FRAC_PI_2).unwrap();
        let k = ProjectionKind::Car;
        let (x0, _) = forward(&w, NX, NY, k, 1.0, 3.0 * FRAC_PI_2).unwrap().unwrap();
        let (xm, _) = forward(&w, NX, NY, k, 1.0, 0.0).unwrap().unwrap();
        let (x1, _) = forward(&w, NX, NY, k, 1.0, FRAC_PI_2).unwrap().unwrap();
        assert!(x0.abs() < 1e-9);
        assert!((xm - 180.0).abs() < 1e-9);
        assert!((x1 - 360.0).abs() < 1e-9);
        assert_eq!(forward(&w, NX, NY, k, 1.0, PI).unwrap(), None);
    }

    #[test]
    fn test_sin_poles_only_at_centre_column() {
        let w = Window::FULL_SKY;
        let k = ProjectionKind::Sin;
        let mid = NX as f64 / 2.0;
        assert_eq!(reverse(&w, NX, NY, k, mid, 0.0).unwrap(), Some((PI, PI)));
        assert_eq!(reverse(&w, NX, NY, k, mid, NY as f64).unwrap(), Some((0.0, PI)));
        assert_eq!(reverse(&w, NX, NY, k, mid + 1.0, 0.0).unwrap(), None);

        let (x, _) = forward(&w, NX, NY, k, 0.0, 1.0).unwrap().unwrap();
        assert!((x - mid).abs() < 1e-9);
    }

    #[test]
    fn test_sin_corners_are_outside() {
        let w = Window::FULL_SKY;
        let k = ProjectionKind::Sin;
        assert_eq!(reverse(&w, NX, NY, k, 1.0, 5.0).unwrap(), None);
        assert!(reverse(&w, NX, NY, k, 1.0, 90.0).unwrap().is_some());
    }

    #[test]
    fn test_invalid_input() {
        let w = Window::FULL_SKY;
        let k = ProjectionKind::Car;
        assert!(matches!(
            forward(&w, NX, NY, k, -0.1, 0.0),
            Err(SkyError::OutOfRange(_))
        ));
        assert!(matches!(
            forward(&w, NX, NY, k, 1.0, 7.0),
            Err(SkyError::OutOfRange(_))
        ));
        assert!(forward(&w, 0, NY, k, 1.0, 1.0).is_err());
        assert!(reverse(&w, NX, 0, k, 1.0, 1.0).is_err());
    }
}
