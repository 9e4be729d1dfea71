//! HAL error taxonomy and the error-raising seam.
//!
//! Absence of a sink (no duplicated stream, no network session) is never an
//! error. What remains is bad input at the signed boundary, failures coming
//! back from generic stream objects, and raw OS error codes that adjacent
//! HAL code hands to the runtime.

use crate::console::StreamError;

/// Invalid argument.
pub const EINVAL: i32 = 22;
/// I/O error.
pub const EIO: i32 = 5;
/// Bad file descriptor (closed stream).
pub const EBADF: i32 = 9;

/// HAL-level error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Duration from a signed caller was negative or does not fit in ticks.
    InvalidDuration(i64),
    /// Generic stream object failed.
    Stream(StreamError),
    /// Raw OS error code.
    Os(i32),
}

impl HalError {
    /// POSIX errno for this error.
    pub fn errno(&self) -> i32 {
        match self {
            HalError::InvalidDuration(_) => EINVAL,
            HalError::Stream(err) => err.errno(),
            HalError::Os(errno) => *errno,
        }
    }

    /// Hand the error to the runtime's error sink.
    pub fn raise_into<S: ErrorSink + ?Sized>(self, sink: &S) -> S::Error {
        sink.raise(self.errno())
    }
}

impl From<StreamError> for HalError {
    fn from(err: StreamError) -> Self {
        HalError::Stream(err)
    }
}

impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::InvalidDuration(value) => write!(f, "invalid delay duration: {}", value),
            HalError::Stream(err) => write!(f, "{}", err),
            HalError::Os(errno) => write!(f, "OS error {}", errno),
        }
    }
}

/// Converts a numeric error code into the runtime's error representation.
///
/// Implemented by the language runtime (e.g. building an `OSError` object).
/// The core never calls it on its normal paths.
pub trait ErrorSink {
    /// Runtime error representation.
    type Error;

    /// Build the runtime error for `errno`.
    fn raise(&self, errno: i32) -> Self::Error;
}
