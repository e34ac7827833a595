//! Cell-by-cell arithmetic between maps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skymap_pixel::{SkyError, report};

use crate::map::SkyMap;
use crate::scalar::MapScalar;

/// Binary operation applied cell by cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl MapOp {
    pub const ALL: [MapOp; 4] = [MapOp::Add, MapOp::Subtract, MapOp::Multiply, MapOp::Divide];

    /// The value a null operand stands in for under [`NullPolicy::Union`].
    fn identity<T: MapScalar>(self) -> T {
        match self {
            MapOp::Add | MapOp::Subtract => T::ZERO,
            MapOp::Multiply | MapOp::Divide => T::ONE,
        }
    }

    fn apply<T: MapScalar>(self, a: T, b: T) -> T {
        match self {
            MapOp::Add => a.add(b),
            MapOp::Subtract => a.sub(b),
            MapOp::Multiply => a.mul(b),
            MapOp::Divide => a.div(b),
        }
    }
}

impl fmt::Display for MapOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MapOp::Add => "add",
            MapOp::Subtract => "subtract",
            MapOp::Multiply => "multiply",
            MapOp::Divide => "divide",
        };
        f.write_str(name)
    }
}

impl FromStr for MapOp {
    type Err = SkyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" | "+" => Ok(MapOp::Add),
            "subtract" | "sub" | "-" => Ok(MapOp::Subtract),
            "multiply" | "mul" | "*" => Ok(MapOp::Multiply),
            "divide" | "div" | "/" => Ok(MapOp::Divide),
            _ => Err(SkyError::OutOfRange(format!("unknown map operation {s:?}"))),
        }
    }
}

/// What to do where exactly one operand is null.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullPolicy {
    /// Treat the null operand as the operation's identity element.
    #[default]
    Union,
    /// The result is null.
    Intersection,
}

/// Result of one cell. Both-null is always null.
fn combine_cell<T: MapScalar>(a: T, b: T, op: MapOp, policy: NullPolicy) -> T {
    match (a.is_null(), b.is_null(), policy) {
        (false, false, _) => op.apply(a, b),
        (true, true, _) | (_, _, NullPolicy::Intersection) => T::NULL,
        (true, false, NullPolicy::Union) => op.apply(op.identity(), b),
        (false, true, NullPolicy::Union) => op.apply(a, op.identity()),
    }
}

impl<T: MapScalar> SkyMap<T> {
    /// Replace each cell of `self` with `self op other`.
    ///
    /// If `other` has a different nside or ordering, a resampled and
    /// reordered copy of it is used; `other` itself is not touched.
    #[track_caller]
    pub fn combine(
        &mut self,
        other: &SkyMap<T>,
        op: MapOp,
        policy: NullPolicy,
    ) -> Result<(), SkyError> {
        let result = self.combine_inner(other, op, policy);
        report(&**self.error_handler(), result)
    }

    fn combine_inner(
        &mut self,
        other: &SkyMap<T>,
        op: MapOp,
        policy: NullPolicy,
    ) -> Result<(), SkyError> {
        let resampled;
        let second = if other.nside() != self.nside() || other.order() != self.order() {
            let mut copy = other.xgrade_inner(self.nside())?;
            copy.reorder_inner(self.order())?;
            resampled = copy;
            &resampled
        } else {
            other
        };

        // Cells null in both operands stay null, so only populated cells
        // need visiting.
        let mut cells: Vec<u64> = self.iter_populated().map(|(pix, _)| pix).collect();
        if policy == NullPolicy::Union {
            cells.extend(second.iter_populated().map(|(pix, _)| pix));
            cells.sort_unstable();
            cells.dedup();
        }
        for pix in cells {
            let a = self.get_unreported(pix)?;
            let b = second.get_unreported(pix)?;
            self.set_unreported(pix, combine_cell(a, b, op, policy))?;
        }
        tracing::debug!(%op, ?policy, populated = self.populated(), "maps combined");
        Ok(())
    }

    #[track_caller]
    pub fn add(&mut self, other: &SkyMap<T>, policy: NullPolicy) -> Result<(), SkyError> {
        self.combine(other, MapOp::Add, policy)
    }

    #[track_caller]
    pub fn subtract(&mut self, other: &SkyMap<T>, policy: NullPolicy) -> Result<(), SkyError> {
        self.combine(other, MapOp::Subtract, policy)
    }

    #[track_caller]
    pub fn multiply(&mut self, other: &SkyMap<T>, policy: NullPolicy) -> Result<(), SkyError> {
        self.combine(other, MapOp::Multiply, policy)
    }

    #[track_caller]
    pub fn divide(&mut self, other: &SkyMap<T>, policy: NullPolicy) -> Result<(), SkyError> {
        self.combine(other, MapOp::Divide, policy)
    }

    /// Multiply every non-null cell by `k`.
    #[track_caller]
    pub fn scale(&mut self, k: f64) -> Result<(), SkyError> {
        let result = self.map_populated(|v| v.scaled(k));
        report(&**self.error_handler(), result)
    }

    /// Add `k` to every non-null cell.
    #[track_caller]
    pub fn offset(&mut self, k: f64) -> Result<(), SkyError> {
        let result = self.map_populated(|v| v.offset(k));
        report(&**self.error_handler(), result)
    }

    fn map_populated(&mut self, f: impl Fn(T) -> T) -> Result<(), SkyError> {
        let cells: Vec<(u64, T)> = self.iter_populated().collect();
        for (pix, value) in cells {
            self.set_unreported(pix, f(value))?;
        }
        Ok(())
    }
}
