//! Changing the resolution of a map.

use rustc_hash::FxHashMap;
use skymap_pixel::{Nside, PixelOrder, SkyError, degrade, nest2ring, report, ring2nest};

use crate::map::SkyMap;
use crate::scalar::MapScalar;

impl<T: MapScalar> SkyMap<T> {
    /// Resample to `nside`: a copy if unchanged, otherwise [`SkyMap::upgrade`]
    /// or [`SkyMap::degrade`].
    #[track_caller]
    pub fn xgrade(&self, nside: Nside) -> Result<SkyMap<T>, SkyError> {
        let result = self.xgrade_inner(nside);
        report(&**self.error_handler(), result)
    }

    /// Resample to a finer `nside`. Each fine cell takes the value of the
    /// coarse cell containing it.
    #[track_caller]
    pub fn upgrade(&self, nside: Nside) -> Result<SkyMap<T>, SkyError> {
        let result = self.upgrade_inner(nside);
        report(&**self.error_handler(), result)
    }

    /// Resample to a coarser `nside`. Each coarse cell takes the mean of its
    /// non-null fine cells, and stays null if there are none.
    #[track_caller]
    pub fn degrade(&self, nside: Nside) -> Result<SkyMap<T>, SkyError> {
        let result = self.degrade_inner(nside);
        report(&**self.error_handler(), result)
    }

    pub(crate) fn xgrade_inner(&self, nside: Nside) -> Result<SkyMap<T>, SkyError> {
        if nside == self.nside() {
            Ok(self.clone())
        } else if nside > self.nside() {
            self.upgrade_inner(nside)
        } else {
            self.degrade_inner(nside)
        }
    }

    fn upgrade_inner(&self, nside: Nside) -> Result<SkyMap<T>, SkyError> {
        let old = self.nside();
        if nside < old {
            return Err(SkyError::OutOfRange(format!(
                "cannot upgrade nside {old} to coarser nside {nside}"
            )));
        }
        let order = self.order();
        let children = nside.npix() / old.npix();
        let mut out = self.empty_like::<T>(nside)?;

        for (pix, value) in self.iter_populated() {
            let nest = match order {
                PixelOrder::Nested => pix,
                PixelOrder::Ring => ring2nest(old, pix)?,
            };
            for child in nest * children..(nest + 1) * children {
                let target = match order {
                    PixelOrder::Nested => child,
                    PixelOrder::Ring => nest2ring(nside, child)?,
                };
                out.set_unreported(target, value)?;
            }
        }
        tracing::debug!(
            from = old.get(),
            to = nside.get(),
            populated = out.populated(),
            "map upgraded"
        );
        Ok(out)
    }

    fn degrade_inner(&self, nside: Nside) -> Result<SkyMap<T>, SkyError> {
        let old = self.nside();
        if nside > old {
            return Err(SkyError::OutOfRange(format!(
                "cannot degrade nside {old} to finer nside {nside}"
            )));
        }
        let order = self.order();
        let mut sums: FxHashMap<u64, (T::Sum, u64)> = FxHashMap::default();
        for (pix, value) in self.iter_populated() {
            let coarse = degrade(old, pix, nside, order)?;
            let entry = sums.entry(coarse).or_insert((T::Sum::default(), 0));
            entry.0 = T::accumulate(entry.0, value);
            entry.1 += 1;
        }

        let mut out = self.empty_like::<T>(nside)?;
        for (pix, (sum, count)) in sums {
            out.set_unreported(pix, T::mean(sum, count))?;
        }
        tracing::debug!(
            from = old.get(),
            to = nside.get(),
            populated = out.populated(),
            "map degraded"
        );
        Ok(out)
    }
}
