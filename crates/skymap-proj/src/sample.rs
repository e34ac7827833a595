//! Filling a raster from a map, and locating points and cells on it.

use skymap_map::{MapScalar, NULL_F64, SkyMap, StorageMode};
use skymap_pixel::{CoordFrame, Nside, PixelOrder, SkyError, ang2pix, report};

use crate::raster::Projection;

impl Projection {
    /// Sample `map` at the centre of every raster cell.
    ///
    /// Cells whose centre falls outside the projected area, or on a null map
    /// cell, become null.
    #[track_caller]
    pub fn project_map<T: MapScalar>(&mut self, map: &SkyMap<T>) -> Result<(), SkyError> {
        let result = self.project_map_inner(map);
        report(&**self.error_handler(), result)
    }

    fn project_map_inner<T: MapScalar>(&mut self, map: &SkyMap<T>) -> Result<(), SkyError> {
        let (nx, ny) = (self.nx(), self.ny());
        let mut filled = 0usize;
        for x in 0..nx {
            for y in 0..ny {
                let centre = self.reverse_unreported(x as f64 + 0.5, y as f64 + 0.5)?;
                let value = match centre {
                    Some((theta, phi)) => {
                        let pix = ang2pix(map.nside(), map.order(), theta, phi)?;
                        let value = map.get(pix)?;
                        if value.is_null() {
                            NULL_F64
                        } else {
                            filled += 1;
                            value.to_f64()
                        }
                    }
                    None => NULL_F64,
                };
                self.data_mut()[x * ny + y] = value;
            }
        }
        tracing::debug!(
            kind = %self.kind(),
            nx,
            ny,
            filled,
            "map projected"
        );
        Ok(())
    }

    /// Raster cells containing each `(theta, phi)`. Points outside the
    /// projected area are skipped.
    #[track_caller]
    pub fn project_points(&self, points: &[(f64, f64)]) -> Result<Vec<(usize, usize)>, SkyError> {
        let result = self.project_points_inner(points);
        report(&**self.error_handler(), result)
    }

    fn project_points_inner(&self, points: &[(f64, f64)]) -> Result<Vec<(usize, usize)>, SkyError> {
        let mut cells = Vec::with_capacity(points.len());
        for &(theta, phi) in points {
            if let Some((x, y)) = self.forward_unreported(theta, phi)? {
                cells.push((x as usize, y as usize));
            }
        }
        Ok(cells)
    }

    /// Raster cells whose centre lies in one of `pixels`, given at `nside`
    /// in `order`.
    #[track_caller]
    pub fn project_pixels(
        &self,
        nside: Nside,
        order: PixelOrder,
        pixels: &[u64],
    ) -> Result<Vec<(usize, usize)>, SkyError> {
        let result = self.project_pixels_inner(nside, order, pixels);
        report(&**self.error_handler(), result)
    }

    fn project_pixels_inner(
        &self,
        nside: Nside,
        order: PixelOrder,
        pixels: &[u64],
    ) -> Result<Vec<(usize, usize)>, SkyError> {
        let mut marks: SkyMap<i32> =
            SkyMap::new(nside, order, CoordFrame::Celestial, StorageMode::Auto)?
                .with_error_handler(self.error_handler().clone());
        for &pix in pixels {
            marks.set(pix, 1)?;
        }

        let mut cells = Vec::new();
        for x in 0..self.nx() {
            for y in 0..self.ny() {
                let Some((theta, phi)) = self.reverse_unreported(x as f64 + 0.5, y as f64 + 0.5)?
                else {
                    continue;
                };
                let pix = ang2pix(nside, order, theta, phi)?;
                if !marks.get(pix)?.is_null() {
                    cells.push((x, y));
                }
            }
        }
        Ok(cells)
    }
}
