//! Full-sky maps: null-aware cell storage over the pixelization, with
//! dense or sparse backing, resolution changes and map arithmetic.

mod arithmetic;
mod keys;
mod map;
mod resolution;
mod scalar;
mod sparse_tree;
mod storage;

pub use arithmetic::{MapOp, NullPolicy};
pub use keys::{KeyRecord, MetadataKeys, RESERVED_KEYS};
pub use map::{MapComparison, SkyMap};
pub use scalar::{MapScalar, NULL_EPSILON, NULL_F64, NULL_I32};
pub use sparse_tree::{Iter, SparseTree};
pub use storage::{StorageMode, sparse_threshold};
