//! Element kinds a map can hold and their null sentinels.

use std::fmt::{Debug, Display};

/// Sentinel stored in empty real-valued cells.
pub const NULL_F64: f64 = -1.6375e30;

/// Tolerance around [`NULL_F64`] within which a real value counts as null.
pub const NULL_EPSILON: f64 = 0.0001e30;

/// Sentinel stored in empty integer cells. Matched exactly.
pub const NULL_I32: i32 = -2_147_483_646;

/// A value type usable as map payload.
///
/// Each kind has a null sentinel and the handful of operations the map
/// arithmetic and resolution code need. Integer operations wrap instead of
/// panicking.
pub trait MapScalar: Copy + Debug + Display + PartialEq + Send + Sync + 'static {
    /// The null sentinel.
    const NULL: Self;
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;
    /// Short name used in summaries.
    const KIND: &'static str;

    /// Running total used when averaging cells.
    type Sum: Copy + Default;

    /// Returns true if this value is the null sentinel (within tolerance for
    /// real kinds).
    fn is_null(self) -> bool;

    /// Widen to `f64`.
    fn to_f64(self) -> f64;

    /// Narrow from `f64`, truncating toward zero for integers.
    fn from_f64(value: f64) -> Self;

    /// `self + other`.
    fn add(self, other: Self) -> Self;
    /// `self - other`.
    fn sub(self, other: Self) -> Self;
    /// `self · other`.
    fn mul(self, other: Self) -> Self;

    /// `self / other`, or null where the kind has no quotient (integer
    /// division by zero).
    fn div(self, other: Self) -> Self;

    /// `-self`.
    fn neg(self) -> Self;

    /// `k · self`.
    fn scaled(self, k: f64) -> Self;

    /// `self + k`.
    fn offset(self, k: f64) -> Self;

    /// Add `value` to a running sum kept in the wider `Sum` type.
    fn accumulate(sum: Self::Sum, value: Self) -> Self::Sum;

    /// `sum / count`, integer division for integer kinds.
    fn mean(sum: Self::Sum, count: u64) -> Self;
}

impl MapScalar for f64 {
    const NULL: Self = NULL_F64;
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const KIND: &'static str = "f64";

    type Sum = f64;

    fn is_null(self) -> bool {
        (self - NULL_F64).abs() <= NULL_EPSILON
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn add(self, other: Self) -> Self {
        self + other
    }

    fn sub(self, other: Self) -> Self {
        self - other
    }

    fn mul(self, other: Self) -> Self {
        self * other
    }

    fn div(self, other: Self) -> Self {
        self / other
    }

    fn neg(self) -> Self {
        -self
    }

    fn scaled(self, k: f64) -> Self {
        k * self
    }

    fn offset(self, k: f64) -> Self {
        self + k
    }

    fn accumulate(sum: f64, value: Self) -> f64 {
        sum + value
    }

    fn mean(sum: f64, count: u64) -> Self {
        sum / count as f64
    }
}

impl MapScalar for f32 {
    const NULL: Self = NULL_F64 as f32;
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const KIND: &'static str = "f32";

    type Sum = f64;

    fn is_null(self) -> bool {
        (f64::from(self) - NULL_F64).abs() <= NULL_EPSILON
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn add(self, other: Self) -> Self {
        self + other
    }

    fn sub(self, other: Self) -> Self {
        self - other
    }

    fn mul(self, other: Self) -> Self {
        self * other
    }

    fn div(self, other: Self) -> Self {
        self / other
    }

    fn neg(self) -> Self {
        -self
    }

    fn scaled(self, k: f64) -> Self {
        (k * f64::from(self)) as f32
    }

    fn offset(self, k: f64) -> Self {
        (f64::from(self) + k) as f32
    }

    fn accumulate(sum: f64, value: Self) -> f64 {
        sum + f64::from(value)
    }

    fn mean(sum: f64, count: u64) -> Self {
        (sum / count as f64) as f32
    }
}

impl MapScalar for i32 {
    const NULL: Self = NULL_I32;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const KIND: &'static str = "i32";

    type Sum = i64;

    fn is_null(self) -> bool {
        self == NULL_I32
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as i32
    }

    fn add(self, other: Self) -> Self {
        self.wrapping_add(other)
    }

    fn sub(self, other: Self) -> Self {
        self.wrapping_sub(other)
    }

    fn mul(self, other: Self) -> Self {
        self.wrapping_mul(other)
    }

    fn div(self, other: Self) -> Self {
        if other == 0 {
            NULL_I32
        } else {
            self.wrapping_div(other)
        }
    }

    fn neg(self) -> Self {
        self.wrapping_neg()
    }

    fn scaled(self, k: f64) -> Self {
        (k * f64::from(self)) as i32
    }

    fn offset(self, k: f64) -> Self {
        (f64::from(self) + k) as i32
    }

    fn accumulate(sum: i64, value: Self) -> i64 {
        sum + i64::from(value)
    }

    fn mean(sum: i64, count: u64) -> Self {
        (sum / count as i64) as i32
    }
}
