//! Cooked output: bare `\n` becomes `\r\n`

use core::fmt;

use super::{ConsoleSink, StreamError};

/// Write `bytes` with every `\n` expanded to `\r\n`.
///
/// Each run between line feeds is a separate sub-write followed by a
/// separate `\r\n` write; the whole buffer is not written atomically.
/// Empty runs are skipped.
pub fn write_cooked<S: ConsoleSink + ?Sized>(sink: &mut S, bytes: &[u8]) -> Result<(), StreamError> {
    let mut rest = bytes;

    while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
        if pos > 0 {
            sink.write_bytes(&rest[..pos])?;
        }
        sink.write_bytes(b"\r\n")?;
        rest = &rest[pos + 1..];
    }

    if !rest.is_empty() {
        sink.write_bytes(rest)?;
    }
    Ok(())
}

/// `fmt::Write` adapter producing cooked output.
///
/// `fmt::Error` carries no detail, so the underlying stream error is kept
/// and can be collected with [`Cooked::take_error`].
pub struct Cooked<'s, S: ?Sized> {
    sink: &'s mut S,
    error: Option<StreamError>,
}

impl<'s, S: ConsoleSink + ?Sized> Cooked<'s, S> {
    pub fn new(sink: &'s mut S) -> Self {
        Self { sink, error: None }
    }

    /// Return the first stream error since the last call, if any.
    pub fn take_error(&mut self) -> Result<(), StreamError> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<S: ConsoleSink + ?Sized> fmt::Write for Cooked<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_cooked(&mut *self.sink, s.as_bytes()).map_err(|err| {
            self.error.get_or_insert(err);
            fmt::Error
        })
    }
}
