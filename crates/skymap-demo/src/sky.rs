//! Synthetic skies from fractal simplex noise sampled at cell centres.

use noise::{NoiseFn, Simplex};
use skymap_map::{SkyMap, StorageMode};
use skymap_pixel::{CoordFrame, Nside, PixelOrder, SkyError, pix2vec};

/// Multi-octave noise over the unit sphere.
pub struct SkySampler {
    noise: Simplex,
    octaves: u32,
    base_frequency: f64,
}

impl SkySampler {
    pub fn new(seed: u32) -> Self {
        Self {
            noise: Simplex::new(seed),
            octaves: 5,
            base_frequency: 1.5,
        }
    }

    /// Value at the unit vector `v`, roughly in `[-1, 1]`.
    pub fn sample(&self, v: [f64; 3]) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.base_frequency;
        let mut amplitude = 0.5;
        for _ in 0..self.octaves {
            total += amplitude
                * self
                    .noise
                    .get([v[0] * frequency, v[1] * frequency, v[2] * frequency]);
            frequency *= 2.0;
            amplitude *= 0.5;
        }
        total
    }

    /// A fully populated map of this sky.
    pub fn fill(
        &self,
        nside: Nside,
        order: PixelOrder,
        frame: CoordFrame,
        mode: StorageMode,
    ) -> Result<SkyMap<f64>, SkyError> {
        let mut map = SkyMap::new(nside, order, frame, mode)?;
        for pix in 0..nside.npix() {
            let v = pix2vec(nside, order, pix)?;
            map.set(pix, self.sample([v.x, v.y, v.z]))?;
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skymap_map::MapScalar;

    #[test]
    fn test_same_seed_same_sky() {
        let nside = Nside::new(4).unwrap();
        let a = SkySampler::new(7)
            .fill(nside, PixelOrder::Ring, CoordFrame::Galactic, StorageMode::Dense)
            .unwrap();
        let b = SkySampler::new(7)
            .fill(nside, PixelOrder::Ring, CoordFrame::Galactic, StorageMode::Sparse)
            .unwrap();
        assert_eq!(a.populated() as u64, nside.npix());
        for pix in 0..nside.npix() {
            assert_eq!(a.get(pix).unwrap(), b.get(pix).unwrap());
        }
    }

    #[test]
    fn test_values_are_bounded() {
        let sampler = SkySampler::new(3);
        let nside = Nside::new(8).unwrap();
        let map = sampler
            .fill(nside, PixelOrder::Nested, CoordFrame::Celestial, StorageMode::Auto)
            .unwrap();
        for (_, v) in map.iter_populated() {
            assert!(!v.is_null());
            assert!(v.abs() <= 1.0, "{v}");
        }
    }
}
