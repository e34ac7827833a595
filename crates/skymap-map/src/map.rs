//! The sky map container.

use std::fmt;

use skymap_pixel::{
    CoordFrame, Nside, PixelOrder, SharedHandler, SkyError, default_handler, nest2ring, reorder,
    report, ring2nest,
};

use crate::keys::MetadataKeys;
use crate::scalar::MapScalar;
use crate::storage::{Storage, StorageMode, null_filled, sparse_threshold};

/// Outcome of [`SkyMap::compare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapComparison {
    /// Same cells and same descriptive metadata.
    Identical,
    /// Same cells, but name, units, order or frame differ.
    MetadataDiffers,
    /// Different resolution, or at least one cell differs.
    DataDiffers,
}

/// A full-sky map of `T` values at one resolution and ordering.
///
/// Every cell starts out null. Depending on the storage mode the cells live
/// in a dense vector or in sparse per-face quadtrees; the public interface is
/// the same either way. Errors are returned and also passed to the map's
/// error handler.
#[derive(Debug, Clone)]
pub struct SkyMap<T: MapScalar> {
    nside: Nside,
    order: PixelOrder,
    frame: CoordFrame,
    name: String,
    units: String,
    mode: StorageMode,
    data: Storage<T>,
    keys: MetadataKeys,
    handler: SharedHandler,
}

impl<T: MapScalar> SkyMap<T> {
    /// Create an all-null map.
    #[track_caller]
    pub fn new(
        nside: Nside,
        order: PixelOrder,
        frame: CoordFrame,
        mode: StorageMode,
    ) -> Result<Self, SkyError> {
        let handler = default_handler();
        let data = match mode {
            StorageMode::Dense => report(&*handler, Storage::dense(nside))?,
            StorageMode::Sparse | StorageMode::Auto => Storage::sparse(nside),
        };
        Ok(Self {
            nside,
            order,
            frame,
            name: String::new(),
            units: String::new(),
            mode,
            data,
            keys: MetadataKeys::new(),
            handler,
        })
    }

    /// Replace the error handler.
    #[must_use]
    pub fn with_error_handler(mut self, handler: SharedHandler) -> Self {
        self.handler = handler;
        self
    }

    pub fn set_error_handler(&mut self, handler: SharedHandler) {
        self.handler = handler;
    }

    #[must_use]
    pub fn error_handler(&self) -> &SharedHandler {
        &self.handler
    }

    #[must_use]
    pub fn nside(&self) -> Nside {
        self.nside
    }

    #[must_use]
    pub fn npix(&self) -> u64 {
        self.nside.npix()
    }

    #[must_use]
    pub fn order(&self) -> PixelOrder {
        self.order
    }

    #[must_use]
    pub fn frame(&self) -> CoordFrame {
        self.frame
    }

    pub fn set_frame(&mut self, frame: CoordFrame) {
        self.frame = frame;
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn set_units(&mut self, units: impl Into<String>) {
        self.units = units.into();
    }

    /// The mode requested at construction.
    #[must_use]
    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// The backing currently in use: [`StorageMode::Dense`] or
    /// [`StorageMode::Sparse`].
    #[must_use]
    pub fn storage(&self) -> StorageMode {
        self.data.mode()
    }

    #[must_use]
    pub fn keys(&self) -> &MetadataKeys {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut MetadataKeys {
        &mut self.keys
    }

    /// Index into the tree for a cell given in map order.
    fn tree_index(&self, pix: u64) -> Result<u64, SkyError> {
        match self.order {
            PixelOrder::Nested => Ok(pix),
            PixelOrder::Ring => ring2nest(self.nside, pix),
        }
    }

    pub(crate) fn get_unreported(&self, pix: u64) -> Result<T, SkyError> {
        self.nside.check_pixel(pix)?;
        match &self.data {
            Storage::Dense(data) => Ok(data[pix as usize]),
            Storage::Sparse(tree) => Ok(tree.get(self.tree_index(pix)?)?.unwrap_or(T::NULL)),
        }
    }

    pub(crate) fn set_unreported(&mut self, pix: u64, value: T) -> Result<(), SkyError> {
        self.nside.check_pixel(pix)?;
        let index = match self.data {
            Storage::Dense(_) => pix,
            Storage::Sparse(_) => self.tree_index(pix)?,
        };
        match &mut self.data {
            Storage::Dense(data) => data[pix as usize] = value,
            Storage::Sparse(tree) => {
                let cell = if value.is_null() { None } else { Some(value) };
                tree.set(index, cell)?;
            }
        }
        if self.mode == StorageMode::Auto {
            self.maybe_densify()?;
        }
        Ok(())
    }

    fn maybe_densify(&mut self) -> Result<(), SkyError> {
        let Storage::Sparse(tree) = &self.data else {
            return Ok(());
        };
        let threshold = sparse_threshold::<T>(self.nside);
        if tree.node_count() <= threshold {
            return Ok(());
        }
        let mut dense = null_filled::<T>(self.nside)?;
        for (nest, value) in tree.iter() {
            let pix = match self.order {
                PixelOrder::Nested => nest,
                PixelOrder::Ring => nest2ring(self.nside, nest)?,
            };
            dense[pix as usize] = value;
        }
        tracing::debug!(
            nside = self.nside.get(),
            nodes = tree.node_count(),
            threshold,
            "auto map switched to dense storage"
        );
        self.data = Storage::Dense(dense);
        Ok(())
    }

    /// Value of cell `pix`, the null sentinel if it was never set.
    #[track_caller]
    pub fn get(&self, pix: u64) -> Result<T, SkyError> {
        report(&*self.handler, self.get_unreported(pix))
    }

    /// Store `value` in cell `pix`. Storing the null sentinel empties the
    /// cell.
    #[track_caller]
    pub fn set(&mut self, pix: u64, value: T) -> Result<(), SkyError> {
        let result = self.set_unreported(pix, value);
        report(&*self.handler, result)
    }

    /// Set every cell to `value`.
    ///
    /// Filling a sparse map with a non-null value populates every cell. An
    /// auto map switches to dense storage for that, and goes back to empty
    /// sparse storage when filled with null.
    #[track_caller]
    pub fn set_all(&mut self, value: T) -> Result<(), SkyError> {
        let result = self.fill(value);
        report(&*self.handler, result)
    }

    fn fill(&mut self, value: T) -> Result<(), SkyError> {
        if self.mode == StorageMode::Auto {
            self.data = if value.is_null() {
                Storage::sparse(self.nside)
            } else {
                Storage::dense(self.nside)?
            };
        }
        match &mut self.data {
            Storage::Dense(data) => data.fill(value),
            Storage::Sparse(tree) => {
                tree.clear();
                if !value.is_null() {
                    for pix in 0..self.nside.npix() {
                        tree.set(pix, Some(value))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of non-null cells.
    #[must_use]
    pub fn populated(&self) -> usize {
        match &self.data {
            Storage::Dense(data) => data.iter().filter(|v| !v.is_null()).count(),
            Storage::Sparse(tree) => tree.len(),
        }
    }

    /// Non-null cells as `(pix, value)` in map order.
    ///
    /// Dense maps yield ascending indices. Sparse maps yield ascending nested
    /// indices, so a sparse ring map is not sorted.
    pub fn iter_populated(&self) -> Box<dyn Iterator<Item = (u64, T)> + '_> {
        match &self.data {
            Storage::Dense(data) => Box::new(
                data.iter()
                    .enumerate()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(pix, v)| (pix as u64, *v)),
            ),
            Storage::Sparse(tree) => match self.order {
                PixelOrder::Nested => Box::new(tree.iter()),
                PixelOrder::Ring => {
                    let nside = self.nside;
                    Box::new(
                        tree.iter()
                            .filter_map(move |(nest, v)| Some((nest2ring(nside, nest).ok()?, v))),
                    )
                }
            },
        }
    }

    /// Compare cell contents first, then descriptive metadata.
    ///
    /// Cells are compared index by index; a null matches only a null.
    #[must_use]
    pub fn compare(&self, other: &SkyMap<T>) -> MapComparison {
        if self.nside != other.nside {
            return MapComparison::DataDiffers;
        }
        for pix in 0..self.npix() {
            let (Ok(a), Ok(b)) = (self.get_unreported(pix), other.get_unreported(pix)) else {
                return MapComparison::DataDiffers;
            };
            let same = match (a.is_null(), b.is_null()) {
                (true, true) => true,
                (false, false) => a == b,
                _ => false,
            };
            if !same {
                return MapComparison::DataDiffers;
            }
        }
        if self.name != other.name
            || self.units != other.units
            || self.order != other.order
            || self.frame != other.frame
        {
            return MapComparison::MetadataDiffers;
        }
        MapComparison::Identical
    }

    /// A map of another element kind with the same metadata. Values go through
    /// `f64`; nulls stay null.
    #[track_caller]
    pub fn convert<U: MapScalar>(&self) -> Result<SkyMap<U>, SkyError> {
        let result = self.convert_inner();
        report(&*self.handler, result)
    }

    fn convert_inner<U: MapScalar>(&self) -> Result<SkyMap<U>, SkyError> {
        let mut out = self.empty_like::<U>(self.nside)?;
        for (pix, value) in self.iter_populated() {
            out.set_unreported(pix, U::from_f64(value.to_f64()))?;
        }
        Ok(out)
    }

    /// An all-null map sharing this map's metadata, handler and storage mode,
    /// at resolution `nside`.
    pub(crate) fn empty_like<U: MapScalar>(&self, nside: Nside) -> Result<SkyMap<U>, SkyError> {
        let mut out = SkyMap::<U>::new(nside, self.order, self.frame, self.mode)?
            .with_error_handler(self.handler.clone());
        out.name.clone_from(&self.name);
        out.units.clone_from(&self.units);
        out.keys = self.keys.clone();
        Ok(out)
    }

    /// Renumber the cells into `order`. No-op if already there.
    #[track_caller]
    pub fn to_order(&mut self, order: PixelOrder) -> Result<(), SkyError> {
        let result = self.reorder_inner(order);
        report(&*self.handler, result)
    }

    pub(crate) fn reorder_inner(&mut self, order: PixelOrder) -> Result<(), SkyError> {
        if order == self.order {
            return Ok(());
        }
        match &mut self.data {
            Storage::Dense(data) => {
                let mut moved = null_filled::<T>(self.nside)?;
                for (pix, value) in data.iter().enumerate() {
                    let target = reorder(self.nside, pix as u64, self.order, order)?;
                    moved[target as usize] = *value;
                }
                *data = moved;
            }
            // The tree is keyed by nested index in both orders.
            Storage::Sparse(_) => {}
        }
        tracing::debug!(from = %self.order, to = %order, "map reordered");
        self.order = order;
        Ok(())
    }

    /// Multi-line summary; also available through `Display`.
    #[must_use]
    pub fn info(&self) -> String {
        self.to_string()
    }
}

impl<T: MapScalar> fmt::Display for SkyMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.npix() - 1;
        let first_value = self.get_unreported(0).unwrap_or(T::NULL);
        let last_value = self.get_unreported(last).unwrap_or(T::NULL);
        writeln!(f, "  {} map \"{}\" ({})", T::KIND, self.name, self.units)?;
        writeln!(f, "  nside = {}, npix = {}", self.nside, self.npix())?;
        writeln!(f, "  order = {}, frame = {}", self.order, self.frame)?;
        writeln!(
            f,
            "  storage = {} (requested {}), populated = {}",
            self.storage(),
            self.mode,
            self.populated()
        )?;
        write!(f, "  data = {first_value} ... {last_value}")
    }
}
