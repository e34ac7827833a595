//! Injectable error reporting.
//!
//! Every fallible operation returns a [`SkyError`]. Containers additionally
//! hand each error to an [`ErrorHandler`] before returning it, so callers can
//! log, collect, or abort without any process-wide state.

use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{ErrorCode, SkyError};

/// Receives every error a container or projection is about to return.
pub trait ErrorHandler: Send + Sync + std::fmt::Debug {
    /// Called once per error, with the source location of the public call
    /// that failed.
    fn handle(&self, error: &SkyError, location: &'static Location<'static>);
}

/// Shared handler handle stored by containers.
pub type SharedHandler = Arc<dyn ErrorHandler>;

/// The handler installed when none is chosen explicitly.
#[must_use]
pub fn default_handler() -> SharedHandler {
    Arc::new(LogHandler)
}

/// Pass `result` through unchanged, reporting an error to `handler` first.
#[track_caller]
pub fn report<T>(handler: &dyn ErrorHandler, result: Result<T, SkyError>) -> Result<T, SkyError> {
    if let Err(error) = &result {
        handler.handle(error, Location::caller());
    }
    result
}

/// Logs errors as `tracing` warnings and carries on.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHandler;

impl ErrorHandler for LogHandler {
    fn handle(&self, error: &SkyError, location: &'static Location<'static>) {
        tracing::warn!(
            code = %error.code(),
            file = location.file(),
            line = location.line(),
            "{}: {error}",
            error.code().description()
        );
    }
}

/// Prints the error and aborts the process.
///
/// Opt-in only. Useful for tools that treat any index or storage error as a
/// programming bug.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbortHandler;

impl ErrorHandler for AbortHandler {
    fn handle(&self, error: &SkyError, location: &'static Location<'static>) {
        eprintln!(
            "SKYMAP ERROR {}:  {} in file {}, line {} -- {}",
            error.code(),
            error.code().description(),
            location.file(),
            location.line(),
            error
        );
        std::process::abort();
    }
}

/// One error recorded by [`CapturingHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedError {
    /// Numeric class of the error.
    pub code: ErrorCode,
    /// Rendered error message.
    pub message: String,
    /// Source file of the failing call.
    pub file: &'static str,
    /// Source line of the failing call.
    pub line: u32,
}

/// Collects errors in memory. Intended for tests.
#[derive(Debug, Default)]
pub struct CapturingHandler {
    records: Mutex<Vec<CapturedError>>,
}

impl CapturingHandler {
    /// Create an empty capturing handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of errors recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Codes of all recorded errors, oldest first.
    #[must_use]
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.lock().iter().map(|r| r.code).collect()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<CapturedError> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CapturedError>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ErrorHandler for CapturingHandler {
    fn handle(&self, error: &SkyError, location: &'static Location<'static>) {
        self.lock().push(CapturedError {
            code: error.code(),
            message: error.to_string(),
            file: location.file(),
            line: location.line(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_passes_ok_through_silently() {
        let handler = CapturingHandler::new();
        let value = report(&handler, Ok::<_, SkyError>(7)).unwrap();
        assert_eq!(value, 7);
        assert!(handler.is_empty());
    }

    #[test]
    fn test_report_records_error_with_caller_location() {
        let handler = CapturingHandler::new();
        let result: Result<(), _> = report(&handler, Err(SkyError::InvalidResolution(3)));
        assert!(result.is_err());
        let records = handler.take();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, ErrorCode::Resolution);
        assert!(records[0].file.ends_with("report.rs"));
        assert!(records[0].message.contains("nside 3"));
        assert!(handler.is_empty());
    }

    #[test]
    fn test_log_handler_does_not_panic() {
        let handler = LogHandler;
        let _ = report(&handler, Err::<(), _>(SkyError::OrderingMismatch));
    }

    #[test]
    fn test_codes_accumulate_in_order() {
        let handler = CapturingHandler::new();
        let _ = report(&handler, Err::<(), _>(SkyError::OrderingMismatch));
        let _ = report(&handler, Err::<(), _>(SkyError::Inaccessible("x".into())));
        assert_eq!(handler.codes(), vec![ErrorCode::Ordering, ErrorCode::Access]);
    }
}
