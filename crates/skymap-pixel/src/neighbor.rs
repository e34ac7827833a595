//! Neighbouring pixels, including across face edges and corners.

use crate::face::{FaceXy, nest2xyf, ring2xyf, xyf2nest, xyf2ring};
use crate::{Nside, PixelOrder, SkyError};

/// Local `(dx, dy)` steps in output order. The first four share an edge with
/// the centre pixel, the last four only a corner.
const X_OFFSET: [i64; 8] = [-1, 1, 0, 0, -1, -1, 1, 1];
const Y_OFFSET: [i64; 8] = [0, 0, -1, 1, -1, 1, 1, -1];

/// Face reached when stepping off a face. Rows are indexed by
/// `4 + (x overflow) + 3·(y overflow)`: S, SE, E, SW, centre, NE, W, NW, N.
/// `-1` marks a corner with no pixel behind it.
const FACE_ARRAY: [[i8; 12]; 9] = [
    [8, 9, 10, 11, -1, -1, -1, -1, 10, 11, 8, 9],
    [5, 6, 7, 4, 8, 9, 10, 11, 9, 10, 11, 8],
    [-1, -1, -1, -1, 5, 6, 7, 4, -1, -1, -1, -1],
    [4, 5, 6, 7, 11, 8, 9, 10, 11, 8, 9, 10],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
    [1, 2, 3, 0, 0, 1, 2, 3, 5, 6, 7, 4],
    [-1, -1, -1, -1, 7, 4, 5, 6, -1, -1, -1, -1],
    [3, 0, 1, 2, 3, 0, 1, 2, 4, 5, 6, 7],
    [2, 3, 0, 1, -1, -1, -1, -1, 0, 1, 2, 3],
];

/// Axis fix-ups on the target face: bit 1 flips x, bit 2 flips y, bit 4
/// swaps x and y.
const SWAP_ARRAY: [[u8; 12]; 9] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 3, 3, 3, 3],
    [0, 0, 0, 0, 0, 0, 0, 0, 6, 6, 6, 6],
    [0; 12],
    [0, 0, 0, 0, 0, 0, 0, 0, 5, 5, 5, 5],
    [0; 12],
    [5, 5, 5, 5, 0, 0, 0, 0, 0, 0, 0, 0],
    [0; 12],
    [6, 6, 6, 6, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 3, 3, 3, 0, 0, 0, 0, 0, 0, 0, 0],
];

/// All pixels touching `pix`, in the fixed order W, E, S, N, SW, NW, NE, SE
/// of the face-local axes.
///
/// Returns 8 pixels in general and 7 for the pixels at the corners where
/// only three faces meet. At nside 1 every pixel sits on such corners and
/// gets 6. The first four entries always exist.
pub fn neighbors(nside: Nside, order: PixelOrder, pix: u64) -> Result<Vec<u64>, SkyError> {
    let centre = match order {
        PixelOrder::Ring => ring2xyf(nside, pix)?,
        PixelOrder::Nested => nest2xyf(nside, pix)?,
    };
    let to_pixel = |xyf: FaceXy| match order {
        PixelOrder::Ring => xyf2ring(nside, xyf),
        PixelOrder::Nested => xyf2nest(nside, xyf),
    };

    let n = i64::from(nside.get());
    let ix = i64::from(centre.x);
    let iy = i64::from(centre.y);
    let mut result = Vec::with_capacity(8);

    if ix > 0 && ix < n - 1 && iy > 0 && iy < n - 1 {
        for (dx, dy) in X_OFFSET.iter().zip(Y_OFFSET.iter()) {
            result.push(to_pixel(FaceXy {
                x: (ix + dx) as u32,
                y: (iy + dy) as u32,
                face: centre.face,
            }));
        }
        return Ok(result);
    }

    for (dx, dy) in X_OFFSET.iter().zip(Y_OFFSET.iter()) {
        let mut x = ix + dx;
        let mut y = iy + dy;
        let mut row = 4usize;
        if x < 0 {
            x += n;
            row -= 1;
        } else if x >= n {
            x -= n;
            row += 1;
        }
        if y < 0 {
            y += n;
            row -= 3;
        } else if y >= n {
            y -= n;
            row += 3;
        }

        let face = FACE_ARRAY[row][usize::from(centre.face)];
        if face < 0 {
            continue;
        }
        let swap = SWAP_ARRAY[row][usize::from(centre.face)];
        if swap & 1 != 0 {
            x = n - x - 1;
        }
        if swap & 2 != 0 {
            y = n - y - 1;
        }
        if swap & 4 != 0 {
            std::mem::swap(&mut x, &mut y);
        }
        result.push(to_pixel(FaceXy {
            x: x as u32,
            y: y as u32,
            face: face as u8,
        }));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{nest2ring, ring2nest};

    fn nside(n: u32) -> Nside {
        Nside::new(n).unwrap()
    }

    #[test]
    fn test_interior_pixel_has_eight_distinct_neighbours() {
        let nside = nside(8);
        // (3, 3) on face 5
        let pix = xyf2nest(nside, FaceXy::new(nside, 3, 3, 5).unwrap());
        let result = neighbors(nside, PixelOrder::Nested, pix).unwrap();
        assert_eq!(result.len(), 8);
        let mut sorted = result.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 8);
        assert!(!result.contains(&pix));
        // West neighbour is (2, 3) on the same face.
        assert_eq!(result[0], xyf2nest(nside, FaceXy::new(nside, 2, 3, 5).unwrap()));
    }

    #[test]
    fn test_neighbour_counts() {
        for pix in 0..12 {
            assert_eq!(neighbors(nside(1), PixelOrder::Nested, pix).unwrap().len(), 6);
        }
        for n in [2, 4, 16] {
            let nside = nside(n);
            let mut sevens = 0;
            for pix in 0..nside.npix() {
                let result = neighbors(nside, PixelOrder::Nested, pix).unwrap();
                assert!(
                    result.len() == 7 || result.len() == 8,
                    "nside {n} pix {pix} has {} neighbours",
                    result.len()
                );
                assert!(result.iter().all(|&p| p < nside.npix()));
                if result.len() == 7 {
                    sevens += 1;
                }
            }
            // Three pixels around each of the 8 vertices shared by three faces.
            assert_eq!(sevens, 24, "nside {n}");
        }
    }

    #[test]
    fn test_neighbourhood_is_symmetric() {
        let nside = nside(8);
        for pix in 0..nside.npix() {
            for nb in neighbors(nside, PixelOrder::Nested, pix).unwrap() {
                let back = neighbors(nside, PixelOrder::Nested, nb).unwrap();
                assert!(back.contains(&pix), "{pix} -> {nb} but not back");
            }
        }
    }

    #[test]
    fn test_ring_and_nest_agree() {
        let nside = nside(4);
        for ring in 0..nside.npix() {
            let nest = ring2nest(nside, ring).unwrap();
            let from_ring = neighbors(nside, PixelOrder::Ring, ring).unwrap();
            let from_nest = neighbors(nside, PixelOrder::Nested, nest).unwrap();
            let converted: Vec<u64> = from_nest
                .iter()
                .map(|&p| nest2ring(nside, p).unwrap())
                .collect();
            assert_eq!(from_ring, converted, "ring pixel {ring}");
        }
    }

    #[test]
    fn test_out_of_range_pixel() {
        assert!(neighbors(nside(2), PixelOrder::Ring, 48).is_err());
    }
}
