//! Arrows for tangent vector fields and polarization.

use std::f64::consts::PI;

use skymap_map::{MapScalar, SkyMap};
use skymap_pixel::{Nside, SkyError, distance, neighbors, pix2ang, report};

use crate::raster::Projection;
use crate::window::wrap_phi;

/// One projected vector, in integer raster coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Arrow {
    /// Raster cell the vector points to.
    pub head: (usize, usize),
    /// Raster cell the vector starts from.
    pub tail: (usize, usize),
}

/// Fold a colatitude back into `[0, π]` by whole multiples of `π`.
fn fold_theta(theta: f64) -> f64 {
    if (0.0..=PI).contains(&theta) {
        theta
    } else {
        theta.rem_euclid(PI)
    }
}

impl Projection {
    /// Arrows for the field with components `theta_comp` and `phi_comp`,
    /// sampled at `sample_nside`.
    ///
    /// A component of `max_magnitude` is drawn as long as the mean spacing
    /// between neighbouring sample cells. Samples where either component is
    /// null or not finite, or where either end of the arrow leaves the
    /// projected area, produce no arrow.
    #[track_caller]
    pub fn project_vector_field<T: MapScalar>(
        &self,
        theta_comp: &SkyMap<T>,
        phi_comp: &SkyMap<T>,
        sample_nside: Nside,
        max_magnitude: f64,
    ) -> Result<Vec<Arrow>, SkyError> {
        let result = self.vector_field_inner(theta_comp, phi_comp, sample_nside, max_magnitude);
        report(&**self.error_handler(), result)
    }

    fn vector_field_inner<T: MapScalar>(
        &self,
        theta_comp: &SkyMap<T>,
        phi_comp: &SkyMap<T>,
        sample_nside: Nside,
        max_magnitude: f64,
    ) -> Result<Vec<Arrow>, SkyError> {
        if theta_comp.nside() != phi_comp.nside() {
            return Err(SkyError::ResolutionMismatch {
                left: theta_comp.nside().get(),
                right: phi_comp.nside().get(),
            });
        }
        if theta_comp.order() != phi_comp.order() {
            return Err(SkyError::OrderingMismatch);
        }
        if sample_nside > theta_comp.nside() {
            return Err(SkyError::OutOfRange(format!(
                "sample nside {sample_nside} exceeds component nside {}",
                theta_comp.nside()
            )));
        }
        if max_magnitude.is_nan() || max_magnitude <= 0.0 {
            return Err(SkyError::OutOfRange(format!(
                "maximum magnitude {max_magnitude} must be positive"
            )));
        }

        let theta_samples = theta_comp.xgrade(sample_nside)?;
        let phi_samples = phi_comp.xgrade(sample_nside)?;
        let order = theta_samples.order();

        let mut arrows = Vec::new();
        for (pix, t) in theta_samples.iter_populated() {
            let p = phi_samples.get(pix)?;
            if p.is_null() {
                continue;
            }
            let (theta, phi) = pix2ang(sample_nside, order, pix)?;
            let nearest = neighbors(sample_nside, order, pix)?;
            let mut spacing = 0.0;
            let mut count = 0.0;
            for &other in nearest.iter().take(4) {
                spacing += distance(sample_nside, order, pix, other)?;
                count += 1.0;
            }
            let scale = spacing / count / max_magnitude;
            let dt = 0.5 * t.to_f64() * scale;
            let dp = 0.5 * p.to_f64() * scale;
            if !dt.is_finite() || !dp.is_finite() {
                continue;
            }

            let head = self.forward_unreported(fold_theta(theta + dt), wrap_phi(phi + dp))?;
            let tail = self.forward_unreported(fold_theta(theta - dt), wrap_phi(phi - dp))?;
            if let (Some(h), Some(tl)) = (head, tail) {
                arrows.push(Arrow {
                    head: (h.0 as usize, h.1 as usize),
                    tail: (tl.0 as usize, tl.1 as usize),
                });
            }
        }
        tracing::debug!(
            sample_nside = sample_nside.get(),
            arrows = arrows.len(),
            "vector field projected"
        );
        Ok(arrows)
    }

    /// Headless arrows for the linear polarization given by Stokes `q` and
    /// `u` maps.
    ///
    /// The polarized intensity `√(q² + u²)` at angle `½·atan(u/q)` is split
    /// into colatitude and longitude components and passed to
    /// [`Projection::project_vector_field`].
    #[track_caller]
    pub fn project_polarization<T: MapScalar>(
        &self,
        q: &SkyMap<T>,
        u: &SkyMap<T>,
        sample_nside: Nside,
        max_magnitude: f64,
    ) -> Result<Vec<Arrow>, SkyError> {
        let result = polarization_components(q, u);
        let (theta_comp, phi_comp) = report(&**self.error_handler(), result)?;
        self.project_vector_field(&theta_comp, &phi_comp, sample_nside, max_magnitude)
    }
}

fn polarization_components<T: MapScalar>(
    q: &SkyMap<T>,
    u: &SkyMap<T>,
) -> Result<(SkyMap<f64>, SkyMap<f64>), SkyError> {
    if q.nside() != u.nside() {
        return Err(SkyError::ResolutionMismatch {
            left: q.nside().get(),
            right: u.nside().get(),
        });
    }
    if q.order() != u.order() {
        return Err(SkyError::OrderingMismatch);
    }
    let blank = || {
        SkyMap::<f64>::new(q.nside(), q.order(), q.frame(), q.mode())
            .map(|m| m.with_error_handler(q.error_handler().clone()))
    };
    let mut theta_comp = blank()?;
    let mut phi_comp = blank()?;
    for (pix, qv) in q.iter_populated() {
        let uv = u.get(pix)?;
        if uv.is_null() {
            continue;
        }
        let (qv, uv) = (qv.to_f64(), uv.to_f64());
        let intensity = qv.hypot(uv);
        let angle = if intensity == 0.0 { 0.0 } else { 0.5 * (uv / qv).atan() };
        theta_comp.set(pix, intensity * angle.cos())?;
        phi_comp.set(pix, intensity * angle.sin())?;
    }
    Ok((theta_comp, phi_comp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ProjectionKind;
    use crate::window::Window;
    use skymap_map::StorageMode;
    use skymap_pixel::{CapturingHandler, CoordFrame, ErrorCode, PixelOrder};
    use std::sync::Arc;

    fn nside(n: u32) -> Nside {
        Nside::new(n).unwrap()
    }

    fn filled(n: u32, order: PixelOrder, value: f64) -> SkyMap<f64> {
        let mut m =
            SkyMap::new(nside(n), order, CoordFrame::Galactic, StorageMode::Dense).unwrap();
        m.set_all(value).unwrap();
        m
    }

    fn raster(kind: ProjectionKind) -> Projection {
        Projection::new(720, 360, kind, Window::FULL_SKY).unwrap()
    }

    #[test]
    fn test_fold_theta() {
        assert_eq!(fold_theta(1.0), 1.0);
        assert_eq!(fold_theta(PI), PI);
        assert!((fold_theta(-0.25) - (PI - 0.25)).abs() < 1e-12);
        assert!((fold_theta(PI + 0.25) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_zero_field_gives_points() {
        let p = raster(ProjectionKind::Car);
        let zero = filled(4, PixelOrder::Ring, 0.0);
        let arrows = p.project_vector_field(&zero, &zero, nside(2), 1.0).unwrap();
        assert_eq!(arrows.len(), 48);
        assert!(arrows.iter().all(|a| a.head == a.tail));
    }

    #[test]
    fn test_theta_field_points_south() {
        let p = raster(ProjectionKind::Car);
        let theta = filled(4, PixelOrder::Nested, 1.0);
        let phi = filled(4, PixelOrder::Nested, 0.0);
        let arrows = p.project_vector_field(&theta, &phi, nside(4), 1.0).unwrap();
        assert!(!arrows.is_empty());
        // Larger colatitude is nearer y = 0.
        for a in arrows.iter().filter(|a| a.head.1 > 20 && a.head.1 < 340) {
            assert!(a.head.1 < a.tail.1, "{a:?}");
        }
    }

    #[test]
    fn test_null_samples_are_skipped() {
        let p = raster(ProjectionKind::Sin);
        let theta = filled(2, PixelOrder::Ring, 1.0);
        let mut phi = filled(2, PixelOrder::Ring, 1.0);
        phi.set(5, f64::NULL).unwrap();
        phi.set(30, f64::NULL).unwrap();
        let arrows = p.project_vector_field(&theta, &phi, nside(2), 2.0).unwrap();
        assert!(arrows.len() <= 46);
    }

    #[test]
    fn test_non_finite_samples_are_skipped() {
        let p = raster(ProjectionKind::Car);
        let mut theta = filled(2, PixelOrder::Ring, 0.0);
        let mut phi = filled(2, PixelOrder::Ring, 0.0);
        theta.set(7, f64::NAN).unwrap();
        phi.set(20, f64::INFINITY).unwrap();
        let arrows = p.project_vector_field(&theta, &phi, nside(2), 1.0).unwrap();
        assert_eq!(arrows.len(), 46);
        assert!(arrows.iter().all(|a| a.head == a.tail));
    }

    #[test]
    fn test_mismatched_components() {
        let handler = Arc::new(CapturingHandler::new());
        let p = raster(ProjectionKind::Car).with_error_handler(handler.clone());
        let a = filled(4, PixelOrder::Ring, 1.0);
        let b = filled(2, PixelOrder::Ring, 1.0);
        let c = filled(4, PixelOrder::Nested, 1.0);
        assert_eq!(
            p.project_vector_field(&a, &b, nside(2), 1.0),
            Err(SkyError::ResolutionMismatch { left: 4, right: 2 })
        );
        assert_eq!(
            p.project_vector_field(&a, &c, nside(2), 1.0),
            Err(SkyError::OrderingMismatch)
        );
        assert!(p.project_vector_field(&a, &a, nside(8), 1.0).is_err());
        assert!(p.project_vector_field(&a, &a, nside(2), 0.0).is_err());
        assert_eq!(
            handler.codes(),
            vec![
                ErrorCode::Resolution,
                ErrorCode::Ordering,
                ErrorCode::Range,
                ErrorCode::Range
            ]
        );
    }

    #[test]
    fn test_polarization_components() {
        let q = filled(1, PixelOrder::Ring, 3.0);
        let mut u = filled(1, PixelOrder::Ring, 0.0);
        u.set(1, 4.0).unwrap();
        u.set(2, f64::NULL).unwrap();
        let (t, ph) = polarization_components(&q, &u).unwrap();
        assert_eq!(t.get(0).unwrap(), 3.0);
        assert_eq!(ph.get(0).unwrap(), 0.0);

        let alpha = 0.5 * (4.0f64 / 3.0).atan();
        assert!((t.get(1).unwrap() - 5.0 * alpha.cos()).abs() < 1e-12);
        assert!((ph.get(1).unwrap() - 5.0 * alpha.sin()).abs() < 1e-12);
        assert!(t.get(2).unwrap().is_null());
    }

    #[test]
    fn test_unpolarized_sky_is_degenerate() {
        let p = raster(ProjectionKind::Car);
        let zero = filled(2, PixelOrder::Ring, 0.0);
        let arrows = p.project_polarization(&zero, &zero, nside(1), 1.0).unwrap();
        assert_eq!(arrows.len(), 12);
        assert!(arrows.iter().all(|a| a.head == a.tail));
    }
}
