//! Equal-area hierarchical pixelization of the sphere.
//!
//! The sphere is split into 12 base faces, each subdivided into
//! `nside × nside` cells. Cells are numbered either ring by ring from north
//! to south ([`PixelOrder::Ring`]) or along a per-face Z-order curve
//! ([`PixelOrder::Nested`]). This crate holds the index arithmetic: angle and
//! vector conversions, ordering and resolution changes, neighbours and
//! distances, plus the error type shared by the other skymap crates.

mod angle;
mod convert;
mod distance;
mod error;
mod face;
mod neighbor;
mod nside;
mod order;
mod report;
mod tables;

pub use angle::{
    TRANSITION_Z, ang2pix, ang2pix_nest, ang2pix_ring, ang2vec, normalize_phi, pix2ang,
    pix2ang_nest, pix2ang_ring, pix2vec, vec2ang, vec2pix,
};
pub use convert::{
    convert_ordering, degrade, degrade_nest, degrade_ring, nest2ring, reorder, ring2nest,
};
pub use distance::distance;
pub use error::{ErrorCode, SkyError};
pub use face::{FaceXy, nest2xyf, ring2xyf, xyf2nest, xyf2ring};
pub use neighbor::neighbors;
pub use nside::{FACES, MAX_FACTOR, NSIDE_MAX, Nside};
pub use order::{CoordFrame, PixelOrder};
pub use report::{
    AbortHandler, CapturedError, CapturingHandler, ErrorHandler, LogHandler, SharedHandler,
    default_handler, report,
};
pub use tables::{pix2xy, xy2pix};
