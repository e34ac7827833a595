//! The patch of sky a projection covers.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use skymap_pixel::SkyError;

/// A colatitude band and a longitude interval.
///
/// `max_phi < min_phi` means the interval runs eastward from `min_phi`
/// through `2π`/`0` to `max_phi`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    min_theta: f64,
    max_theta: f64,
    min_phi: f64,
    max_phi: f64,
}

impl Default for Window {
    fn default() -> Self {
        Self::FULL_SKY
    }
}

impl Window {
    /// The whole sphere.
    pub const FULL_SKY: Window = Window {
        min_theta: 0.0,
        max_theta: PI,
        min_phi: 0.0,
        max_phi: TAU,
    };

    /// Validate and build a window.
    pub fn new(min_theta: f64, max_theta: f64, min_phi: f64, max_phi: f64) -> Result<Self, SkyError> {
        let window = Self {
            min_theta,
            max_theta,
            min_phi,
            max_phi,
        };
        window.validate()?;
        Ok(window)
    }

    pub(crate) fn validate(&self) -> Result<(), SkyError> {
        let theta_ok = |t: f64| (0.0..=PI).contains(&t);
        let phi_ok = |p: f64| (0.0..=TAU).contains(&p);
        if !theta_ok(self.min_theta) || !theta_ok(self.max_theta) {
            return Err(SkyError::ProjectionDomain(format!(
                "theta range [{}, {}] must lie within [0, pi]",
                self.min_theta, self.max_theta
            )));
        }
        if !phi_ok(self.min_phi) || !phi_ok(self.max_phi) {
            return Err(SkyError::ProjectionDomain(format!(
                "phi range [{}, {}] must lie within [0, 2pi]",
                self.min_phi, self.max_phi
            )));
        }
        if self.max_theta <= self.min_theta {
            return Err(SkyError::ProjectionDomain(
                "maximum theta must be greater than minimum theta".to_string(),
            ));
        }
        if self.max_phi == self.min_phi {
            return Err(SkyError::ProjectionDomain(
                "maximum phi cannot equal minimum phi".to_string(),
            ));
        }
        let span = self.phi_span();
        if !span.is_finite() || span <= 0.0 {
            return Err(SkyError::ProjectionDomain(format!(
                "phi range [{}, {}] covers no longitude",
                self.min_phi, self.max_phi
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn min_theta(&self) -> f64 {
        self.min_theta
    }

    #[must_use]
    pub fn max_theta(&self) -> f64 {
        self.max_theta
    }

    #[must_use]
    pub fn min_phi(&self) -> f64 {
        self.min_phi
    }

    #[must_use]
    pub fn max_phi(&self) -> f64 {
        self.max_phi
    }

    /// Returns true if the longitude interval crosses `φ = 0`.
    #[must_use]
    pub fn wraps(&self) -> bool {
        self.max_phi < self.min_phi
    }

    #[must_use]
    pub fn theta_span(&self) -> f64 {
        self.max_theta - self.min_theta
    }

    /// Width of the longitude interval in radians.
    #[must_use]
    pub fn phi_span(&self) -> f64 {
        if self.wraps() {
            self.max_phi + TAU - self.min_phi
        } else {
            self.max_phi - self.min_phi
        }
    }

    #[must_use]
    pub fn centre_theta(&self) -> f64 {
        0.5 * (self.min_theta + self.max_theta)
    }

    /// Middle of the longitude interval, in `[0, 2π)`.
    #[must_use]
    pub fn centre_phi(&self) -> f64 {
        wrap_phi(self.min_phi + 0.5 * self.phi_span())
    }

    #[must_use]
    pub fn contains_theta(&self, theta: f64) -> bool {
        (self.min_theta..=self.max_theta).contains(&theta)
    }

    #[must_use]
    pub fn contains_phi(&self, phi: f64) -> bool {
        if self.wraps() {
            phi >= self.min_phi || phi <= self.max_phi
        } else {
            (self.min_phi..=self.max_phi).contains(&phi)
        }
    }

    /// Half the projected width of a sinusoidal raster, in radians.
    pub(crate) fn sin_half_width(&self) -> f64 {
        0.5 * self.phi_span() * (self.centre_theta() - FRAC_PI_2).cos()
    }
}

/// Wrap into `[0, 2π)`.
pub(crate) fn wrap_phi(phi: f64) -> f64 {
    let wrapped = phi.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Wrap into `(-π, π]`.
pub(crate) fn signed_phi(delta: f64) -> f64 {
    let wrapped = wrap_phi(delta);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_full_sky_is_valid() {
        assert!(Window::FULL_SKY.validate().is_ok());
        assert!(!Window::FULL_SKY.wraps());
        assert!((Window::FULL_SKY.phi_span() - TAU).abs() < EPSILON);
        assert!((Window::FULL_SKY.centre_phi() - PI).abs() < EPSILON);
    }

    #[test]
    fn test_invalid_windows() {
        let cases = [
            (-0.1, 1.0, 0.0, 1.0),
            (0.0, 3.5, 0.0, 1.0),
            (0.0, 1.0, -0.1, 1.0),
            (0.0, 1.0, 0.0, 7.0),
            (1.0, 1.0, 0.0, 1.0),
            (1.2, 1.0, 0.0, 1.0),
            (0.0, 1.0, 2.0, 2.0),
        ];
        for (a, b, c, d) in cases {
            assert!(
                matches!(Window::new(a, b, c, d), Err(SkyError::ProjectionDomain(_))),
                "({a}, {b}, {c}, {d}) accepted"
            );
        }
    }

    #[test]
    fn test_phi_endpoints_on_the_same_meridian() {
        // 2π and 0 are the same meridian, so this interval is empty.
        assert!(matches!(
            Window::new(0.0, PI, TAU, 0.0),
            Err(SkyError::ProjectionDomain(_))
        ));
        for x in [0.0, 1.0, PI, TAU - 0.25] {
            let far = x + TAU;
            let result = Window::new(0.0, PI, x, far);
            if far <= TAU {
                let w = result.unwrap();
                assert!((w.phi_span() - TAU).abs() < EPSILON);
            } else {
                assert!(matches!(result, Err(SkyError::ProjectionDomain(_))));
            }
        }
        assert!(Window::new(0.0, PI, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_wrapping_window() {
        let w = Window::new(0.5, 2.5, 5.5, 0.5).unwrap();
        assert!(w.wraps());
        let span = 0.5 + TAU - 5.5;
        assert!((w.phi_span() - span).abs() < EPSILON);
        assert!((w.centre_phi() - wrap_phi(5.5 + span / 2.0)).abs() < EPSILON);
        assert!(w.contains_phi(6.0));
        assert!(w.contains_phi(0.2));
        assert!(!w.contains_phi(3.0));
    }

    #[test]
    fn test_phi_wrapping_helpers() {
        assert!((wrap_phi(-0.5) - (TAU - 0.5)).abs() < EPSILON);
        assert!((signed_phi(TAU - 0.5) + 0.5).abs() < EPSILON);
        assert!((signed_phi(0.5) - 0.5).abs() < EPSILON);
        assert!((signed_phi(PI) - PI).abs() < EPSILON);
    }
}
