//! Backing storage for map payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skymap_pixel::{Nside, SkyError};

use crate::scalar::MapScalar;
use crate::sparse_tree::SparseTree;

/// How a map keeps its cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageMode {
    /// One slot per cell, allocated up front.
    #[default]
    Dense,
    /// Only populated cells, in per-face quadtrees.
    Sparse,
    /// Sparse until the tree would outgrow a dense array, then dense.
    Auto,
}

impl StorageMode {
    /// All modes.
    pub const ALL: [StorageMode; 3] = [StorageMode::Dense, StorageMode::Sparse, StorageMode::Auto];

    /// Lowercase name, as accepted by `FromStr`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageMode::Dense => "dense",
            StorageMode::Sparse => "sparse",
            StorageMode::Auto => "auto",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = SkyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dense" | "full" => Ok(StorageMode::Dense),
            "sparse" | "tree" => Ok(StorageMode::Sparse),
            "auto" => Ok(StorageMode::Auto),
            _ => Err(SkyError::OutOfRange(format!("unknown storage mode {s:?}"))),
        }
    }
}

/// The payload itself. Indices are nested for the tree and in map order for
/// the vector; the map translates before calling in.
#[derive(Debug, Clone)]
pub(crate) enum Storage<T> {
    Dense(Vec<T>),
    Sparse(SparseTree<T>),
}

/// A null-filled vector of `npix` cells, reporting allocation failure
/// instead of aborting.
pub(crate) fn null_filled<T: MapScalar>(nside: Nside) -> Result<Vec<T>, SkyError> {
    let npix = usize::try_from(nside.npix())
        .map_err(|_| SkyError::Allocation(format!("{} cells", nside.npix())))?;
    let mut data = Vec::new();
    data.try_reserve_exact(npix)
        .map_err(|e| SkyError::Allocation(format!("dense map of {npix} cells: {e}")))?;
    data.resize(npix, T::NULL);
    Ok(data)
}

impl<T: MapScalar> Storage<T> {
    pub(crate) fn dense(nside: Nside) -> Result<Self, SkyError> {
        Ok(Storage::Dense(null_filled(nside)?))
    }

    pub(crate) fn sparse(nside: Nside) -> Self {
        Storage::Sparse(SparseTree::new(nside))
    }

    /// The mode actually in use.
    pub(crate) fn mode(&self) -> StorageMode {
        match self {
            Storage::Dense(_) => StorageMode::Dense,
            Storage::Sparse(_) => StorageMode::Sparse,
        }
    }
}

/// Node count above which an auto map switches to dense storage: the point
/// where the tree's nodes take more memory than a dense array would.
#[must_use]
pub fn sparse_threshold<T: MapScalar>(nside: Nside) -> usize {
    let npix = usize::try_from(nside.npix()).unwrap_or(usize::MAX);
    npix.saturating_mul(std::mem::size_of::<T>()) / SparseTree::<T>::node_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_roundtrip() {
        for mode in StorageMode::ALL {
            assert_eq!(mode.to_string().parse::<StorageMode>().unwrap(), mode);
        }
        assert_eq!("FULL".parse::<StorageMode>().unwrap(), StorageMode::Dense);
        assert!("packed".parse::<StorageMode>().is_err());
    }

    #[test]
    fn test_dense_is_null_filled() {
        let nside = Nside::new(2).unwrap();
        match Storage::<i32>::dense(nside).unwrap() {
            Storage::Dense(data) => {
                assert_eq!(data.len(), 48);
                assert!(data.iter().all(|v| v.is_null()));
            }
            Storage::Sparse(_) => panic!("expected dense storage"),
        }
    }

    #[test]
    fn test_threshold_scales_with_npix() {
        let small = sparse_threshold::<f64>(Nside::new(4).unwrap());
        let large = sparse_threshold::<f64>(Nside::new(8).unwrap());
        assert_eq!(large, 4 * small);
        assert!(sparse_threshold::<f32>(Nside::new(8).unwrap()) < large);
    }
}
