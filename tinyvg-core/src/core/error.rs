use std::io;

use thiserror::Error;

/// Universal error type for TinyVG operations.
///
/// Every public entry point either succeeds completely or returns the first
/// failure it encountered as one of these variants.
#[derive(Debug, Error)]
pub enum TvgError {
    /// A buffer could not be allocated.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// The output sink failed or accepted fewer bytes than offered.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is malformed, truncated or references data that does not exist.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The input is recognized but uses a feature this crate does not implement.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Interop error codes.
///
/// The numeric values are stable and match the C binding of the format's
/// reference implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    Success = 0,
    OutOfMemory = 1,
    IoError = 2,
    InvalidData = 3,
    Unsupported = 4,
}

impl TvgError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TvgError::InvalidData(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        TvgError::Unsupported(msg.into())
    }

    pub(crate) fn out_of_memory(msg: impl Into<String>) -> Self {
        TvgError::OutOfMemory(msg.into())
    }

    /// Map this error onto the closed interop code set.
    pub fn code(&self) -> ErrorCode {
        match self {
            TvgError::OutOfMemory(_) => ErrorCode::OutOfMemory,
            TvgError::Io(_) => ErrorCode::IoError,
            TvgError::InvalidData(_) => ErrorCode::InvalidData,
            TvgError::Unsupported(_) => ErrorCode::Unsupported,
        }
    }

    pub fn is_invalid_data(&self) -> bool {
        matches!(self, TvgError::InvalidData(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, TvgError::Unsupported(_))
    }
}

impl ErrorCode {
    /// Code for a finished operation: `Success` or the error's code.
    pub fn of<T>(result: &TvgResult<T>) -> ErrorCode {
        match result {
            Ok(_) => ErrorCode::Success,
            Err(e) => e.code(),
        }
    }
}

/// Result type alias for TinyVG operations
pub type TvgResult<T> = Result<T, TvgError>;
