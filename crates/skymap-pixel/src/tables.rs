//! Bit-interleave lookup tables.
//!
//! Within a face a nested pixel index is the Morton code of its `(x, y)`
//! position: bit `i` of `x` lands on bit `2i`, bit `i` of `y` on bit `2i + 1`.
//! Two 256-entry tables handle a byte at a time. They are built on first use
//! and read-only afterwards.

use std::sync::LazyLock;

struct InterleaveTables {
    /// Spreads the 8 bits of a byte onto the even bits of a 16-bit word.
    utab: [u16; 256],
    /// Compresses an interleaved byte: even bits to the low nibble, odd bits
    /// to bits 8..12.
    ctab: [u16; 256],
}

impl InterleaveTables {
    fn build() -> Self {
        let mut utab = [0u16; 256];
        let mut ctab = [0u16; 256];
        for m in 0..256u16 {
            utab[m as usize] = (m & 0x1)
                | ((m & 0x2) << 1)
                | ((m & 0x4) << 2)
                | ((m & 0x8) << 3)
                | ((m & 0x10) << 4)
                | ((m & 0x20) << 5)
                | ((m & 0x40) << 6)
                | ((m & 0x80) << 7);
            ctab[m as usize] = (m & 0x1)
                | ((m & 0x2) << 7)
                | ((m & 0x4) >> 1)
                | ((m & 0x8) << 6)
                | ((m & 0x10) >> 2)
                | ((m & 0x20) << 5)
                | ((m & 0x40) >> 3)
                | ((m & 0x80) << 4);
        }
        Self { utab, ctab }
    }
}

static TABLES: LazyLock<InterleaveTables> = LazyLock::new(InterleaveTables::build);

/// Interleave `x` (even bits) and `y` (odd bits) into a face-local index.
#[must_use]
pub fn xy2pix(x: u32, y: u32) -> u64 {
    let utab = &TABLES.utab;
    let mut pix = 0u64;
    for byte in 0..4 {
        let shift = 8 * byte;
        let xb = u64::from(utab[((x >> shift) & 0xff) as usize]);
        let yb = u64::from(utab[((y >> shift) & 0xff) as usize]);
        pix |= (xb | (yb << 1)) << (2 * shift);
    }
    pix
}

/// Split a face-local index back into `(x, y)`.
#[must_use]
pub fn pix2xy(pix: u64) -> (u32, u32) {
    let ctab = &TABLES.ctab;
    let mut x = 0u32;
    let mut y = 0u32;
    for chunk in 0..4 {
        let bits = pix >> (16 * chunk);
        let raw = u32::from(ctab[(bits & 0xff) as usize])
            | (u32::from(ctab[((bits >> 8) & 0xff) as usize]) << 4);
        x |= (raw & 0xff) << (8 * chunk);
        y |= (raw >> 8) << (8 * chunk);
    }
    (x, y)
}
