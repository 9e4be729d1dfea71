//! Console stream error types

/// Failure reported by a generic stream object.
///
/// ConsoleMux never retries or swallows these; they reach the caller as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    /// Object reported an OS-level I/O failure (errno)
    Io(i32),
    /// Object has been closed
    Closed,
    /// Read returned something that is not a byte buffer
    BadBuffer,
}

impl StreamError {
    /// Errno equivalent
    pub fn errno(&self) -> i32 {
        match self {
            Self::Io(errno) => *errno,
            Self::Closed => crate::error::EBADF,
            Self::BadBuffer => crate::error::EINVAL,
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Io(_) => "stream I/O error",
            Self::Closed => "stream closed",
            Self::BadBuffer => "object with buffer protocol required",
        }
    }
}

impl core::fmt::Display for StreamError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(errno) => write!(f, "{} ({})", self.message(), errno),
            _ => f.write_str(self.message()),
        }
    }
}
