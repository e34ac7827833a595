//! Turning a projection raster into an image.

use image::{GrayImage, Luma};
use skymap_map::MapScalar;
use skymap_proj::{Arrow, Projection};

/// Shade reserved for cells with no data.
pub const BLANK: u8 = 0;
/// Shade for overlays.
pub const INK: u8 = 255;

/// Grayscale image of the raster with north at the top. Data is stretched
/// over `1..=255`; null cells are [`BLANK`].
pub fn grayscale(proj: &Projection) -> GrayImage {
    let (nx, ny) = (proj.nx(), proj.ny());
    let data = proj.data();
    let (lo, hi) = data
        .iter()
        .filter(|v| !v.is_null())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = if hi > lo { hi - lo } else { 1.0 };

    GrayImage::from_fn(nx as u32, ny as u32, |col, row| {
        let (x, y) = (col as usize, ny - 1 - row as usize);
        let v = data[x * ny + y];
        if v.is_null() {
            Luma([BLANK])
        } else {
            Luma([1 + ((v - lo) / range * 254.0).round() as u8])
        }
    })
}

/// Image pixel for raster cell `(x, y)`, if it is on the image.
fn to_pixel(img: &GrayImage, (x, y): (usize, usize)) -> Option<(u32, u32)> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    (x < w && y < h).then(|| (x as u32, (h - 1 - y) as u32))
}

/// Mark raster cells.
pub fn plot_cells(img: &mut GrayImage, cells: &[(usize, usize)], shade: u8) {
    for &cell in cells {
        if let Some((px, py)) = to_pixel(img, cell) {
            img.put_pixel(px, py, Luma([shade]));
        }
    }
}

/// Draw arrows as straight lines from tail to head.
pub fn draw_arrows(img: &mut GrayImage, arrows: &[Arrow], shade: u8) {
    for arrow in arrows {
        let (Some(a), Some(b)) = (to_pixel(img, arrow.tail), to_pixel(img, arrow.head)) else {
            continue;
        };
        draw_line(img, a, b, shade);
    }
}

/// Bresenham line between two on-image points.
fn draw_line(img: &mut GrayImage, from: (u32, u32), to: (u32, u32), shade: u8) {
    let (mut x, mut y) = (i64::from(from.0), i64::from(from.1));
    let (x1, y1) = (i64::from(to.0), i64::from(to.1));
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        img.put_pixel(x as u32, y as u32, Luma([shade]));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
