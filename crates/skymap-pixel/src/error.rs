//! Error taxonomy shared by every skymap crate.

use std::fmt;

/// Numeric error classes.
///
/// The discriminants are stable and are what [`crate::AbortHandler`] prints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    /// No error.
    None = 0,
    /// Memory could not be obtained.
    Allocation = 1,
    /// Release of something that was never allocated.
    Free = 2,
    /// Illegal nside value.
    Resolution = 3,
    /// Illegal pixel ordering.
    Ordering = 4,
    /// Illegal coordinate frame.
    CoordFrame = 5,
    /// A value is outside its permitted range.
    Range = 6,
    /// Required data is not accessible.
    Access = 7,
    /// Projection window or type error.
    Projection = 8,
    /// Record or table format error.
    Serialization = 9,
}

impl ErrorCode {
    /// Short human-readable description of the error class.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::None => "No error",
            ErrorCode::Allocation => "Memory allocation error",
            ErrorCode::Free => "Memory freeing error",
            ErrorCode::Resolution => "Illegal NSIDE value",
            ErrorCode::Ordering => "Illegal ORDER value",
            ErrorCode::CoordFrame => "Illegal COORDINATE value",
            ErrorCode::Range => "Value is out of range",
            ErrorCode::Access => "Memory is not accessible",
            ErrorCode::Projection => "Projection error",
            ErrorCode::Serialization => "Format error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Errors produced by pixel math, map storage and projection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkyError {
    /// Storage for a map or raster could not be reserved.
    #[error("cannot allocate {0}")]
    Allocation(String),

    /// Release requested for storage that does not exist.
    #[error("{0} not allocated, not freeing")]
    FreeUnallocated(String),

    /// Nside is zero, not a power of two, or above the maximum.
    #[error("invalid nside {0}: must be a power of two between 1 and 8192")]
    InvalidResolution(u64),

    /// Two operands were required to share an nside.
    #[error("nside mismatch: {left} vs {right}")]
    ResolutionMismatch {
        /// Nside of the first operand.
        left: u32,
        /// Nside of the second operand.
        right: u32,
    },

    /// Unknown ordering name.
    #[error("invalid pixel ordering: {0}")]
    InvalidOrdering(String),

    /// Two operands were required to share an ordering.
    #[error("operands must have the same ordering")]
    OrderingMismatch,

    /// Unknown coordinate frame name.
    #[error("invalid coordinate frame: {0}")]
    InvalidCoordFrame(String),

    /// Pixel index beyond `12·nside²`.
    #[error("pixel {pix} out of range (npix = {npix})")]
    PixelOutOfRange {
        /// The rejected pixel index.
        pix: u64,
        /// Number of pixels at the current resolution.
        npix: u64,
    },

    /// Any other value outside its permitted range.
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// Data required by the operation is missing.
    #[error("not accessible: {0}")]
    Inaccessible(String),

    /// Invalid projection window or projection type.
    #[error("projection error: {0}")]
    ProjectionDomain(String),

    /// Malformed or reserved metadata record.
    #[error("format error: {0}")]
    Serialization(String),
}

impl SkyError {
    /// The numeric class this error belongs to.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            SkyError::Allocation(_) => ErrorCode::Allocation,
            SkyError::FreeUnallocated(_) => ErrorCode::Free,
            SkyError::InvalidResolution(_) | SkyError::ResolutionMismatch { .. } => {
                ErrorCode::Resolution
            }
            SkyError::InvalidOrdering(_) | SkyError::OrderingMismatch => ErrorCode::Ordering,
            SkyError::InvalidCoordFrame(_) => ErrorCode::CoordFrame,
            SkyError::PixelOutOfRange { .. } | SkyError::OutOfRange(_) => ErrorCode::Range,
            SkyError::Inaccessible(_) => ErrorCode::Access,
            SkyError::ProjectionDomain(_) => ErrorCode::Projection,
            SkyError::Serialization(_) => ErrorCode::Serialization,
        }
    }
}
