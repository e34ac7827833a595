//! Plate projections of sky maps onto 2D rasters.
//!
//! [`Window`] and [`ProjectionKind`] describe the geometry, [`plate`] holds
//! the point-wise transforms and [`Projection`] is the sampled raster with
//! map, point, cell and vector-field projection on top.

mod kind;
pub mod plate;
mod raster;
mod sample;
mod vector_field;
mod window;

pub use kind::ProjectionKind;
pub use plate::{forward, reverse};
pub use raster::Projection;
pub use vector_field::Arrow;
pub use window::Window;
