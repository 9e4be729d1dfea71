//! Collaborators the console multiplexer talks to.
//!
//! None of these are owned or implemented here: the network terminal, the
//! UART-style transport and the generic stream object all come from outside
//! and only expose byte-level send/receive.

use alloc::boxed::Box;
use alloc::vec::Vec;

use super::StreamError;

/// Remote terminal session (e.g. telnet).
///
/// When no client is connected, `rx_any()` is false and `tx()` drops the
/// bytes. Neither is an error.
pub trait NetworkTerminal {
    /// True if at least one input byte is pending.
    fn rx_any(&mut self) -> bool;
    /// Consume one pending input byte. Only called after `rx_any()`.
    fn rx_byte(&mut self) -> u8;
    /// Send bytes to the remote session.
    fn tx(&mut self, bytes: &[u8]);
}

/// Fast-path transport with direct byte I/O (e.g. a UART).
pub trait ByteTransport {
    fn tx(&mut self, bytes: &[u8]);
    fn rx_any(&mut self) -> bool;
    fn rx_byte(&mut self) -> u8;
}

/// Outcome of a generic read request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    /// Object returned data. May be empty.
    Available(Vec<u8>),
    /// Nothing available right now.
    NotReady,
}

/// Generic stream object with byte-oriented write/read.
///
/// Higher overhead than [`ByteTransport`]: every write hands over a freshly
/// allocated buffer.
pub trait StreamObject {
    fn write(&mut self, data: Vec<u8>) -> Result<(), StreamError>;
    /// Request up to `len` bytes without blocking.
    fn read(&mut self, len: usize) -> Result<ReadResult, StreamError>;
}

/// Duplicated stream mirroring console traffic.
///
/// The variant is the capability: fast-path transports never go through the
/// generic object protocol.
pub enum DupStream {
    Transport(Box<dyn ByteTransport>),
    Object(Box<dyn StreamObject>),
}

impl DupStream {
    pub fn transport<T: ByteTransport + 'static>(transport: T) -> Self {
        DupStream::Transport(Box::new(transport))
    }

    pub fn object<O: StreamObject + 'static>(object: O) -> Self {
        DupStream::Object(Box::new(object))
    }

    /// Check if this is the fast-path variant
    pub fn is_transport(&self) -> bool {
        matches!(self, DupStream::Transport(_))
    }
}

impl core::fmt::Debug for DupStream {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DupStream::Transport(_) => f.write_str("DupStream::Transport"),
            DupStream::Object(_) => f.write_str("DupStream::Object"),
        }
    }
}

/// Network terminal with no session attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct Disconnected;

impl NetworkTerminal for Disconnected {
    fn rx_any(&mut self) -> bool {
        false
    }

    fn rx_byte(&mut self) -> u8 {
        0
    }

    fn tx(&mut self, _bytes: &[u8]) {}
}
