//! Console multiplexer
//!
//! # Output
//!
//! ```text
//! write_bytes(buf) ──┬──▶ duplicated stream (if installed)   1st
//!                    └──▶ network terminal                    2nd, always
//! ```
//!
//! # Input
//!
//! ```text
//! loop {
//!     network pending?        → return its byte
//!     duplicated stream byte? → return it
//!     delay(read_poll_ticks)
//! }
//! ```
//!
//! `read_byte()` has no timeout. Run it where blocking forever is fine.

use alloc::vec::Vec;

use super::cooked::write_cooked;
use super::stream::{DupStream, NetworkTerminal, ReadResult};
use super::{InterruptChar, StreamError};
use crate::clock::Ticks;
use crate::config::{HalConfig, TermConfig};
use crate::delay::Delay;

/// Anything raw console bytes can be written to.
pub trait ConsoleSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), StreamError>;
}

/// Routes console traffic between the duplicated stream and the network
/// terminal.
pub struct ConsoleMux<N, D> {
    term: TermConfig,
    net: N,
    delay: D,
    read_poll_ticks: Ticks,
    interrupt: InterruptChar,
}

impl<N: NetworkTerminal, D: Delay> ConsoleMux<N, D> {
    /// Create a multiplexer.
    ///
    /// # Arguments
    /// * `term` - Configuration context owning the duplicated-stream slot
    /// * `net` - Network terminal session
    /// * `delay` - Used between input polling rounds
    /// * `config` - Poll interval and initial interrupt character
    pub fn new(term: TermConfig, net: N, delay: D, config: &HalConfig) -> Self {
        Self {
            term,
            net,
            delay,
            read_poll_ticks: config.read_poll_ticks,
            interrupt: InterruptChar::new(config.interrupt_char),
        }
    }

    pub fn term(&self) -> &TermConfig {
        &self.term
    }

    /// Mutable access to the slot (install/remove the duplicated stream).
    pub fn term_mut(&mut self) -> &mut TermConfig {
        &mut self.term
    }

    /// Install or replace the duplicated stream.
    pub fn set_dup(&mut self, dup: DupStream) -> Option<DupStream> {
        crate::hal_info!("dup stream installed: {:?}", dup);
        self.term.set_dup(dup)
    }

    /// Remove the duplicated stream.
    pub fn clear_dup(&mut self) -> Option<DupStream> {
        let old = self.term.clear_dup();
        if old.is_some() {
            crate::hal_info!("dup stream removed");
        }
        old
    }

    pub fn network(&self) -> &N {
        &self.net
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.net
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn read_poll_ticks(&self) -> Ticks {
        self.read_poll_ticks
    }

    /// Sleep one polling interval, as `read_byte` does between rounds.
    pub fn wait_poll_interval(&self) {
        self.delay.delay(self.read_poll_ticks);
    }

    /// Send `bytes` to every sink.
    ///
    /// The duplicated stream goes first. The network terminal is always
    /// attempted, even if the duplicated stream failed; that failure is then
    /// returned.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        let dup_result = match self.term.dup_mut() {
            Some(DupStream::Transport(transport)) => {
                transport.tx(bytes);
                Ok(())
            }
            Some(DupStream::Object(object)) => object.write(Vec::from(bytes)),
            None => Ok(()),
        };

        if let Err(err) = &dup_result {
            crate::hal_warn!("dup stream write failed: {}", err);
        }

        self.net.tx(bytes);
        dup_result
    }

    /// Send a string as raw bytes.
    pub fn write_text(&mut self, s: &str) -> Result<(), StreamError> {
        self.write_bytes(s.as_bytes())
    }

    /// Send `bytes` with `\n` expanded to `\r\n`.
    pub fn write_cooked(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        write_cooked(self, bytes)
    }

    /// One polling round, network first. Never delays.
    pub fn poll_byte(&mut self) -> Result<Option<u8>, StreamError> {
        if self.net.rx_any() {
            return Ok(Some(self.net.rx_byte()));
        }

        match self.term.dup_mut() {
            Some(DupStream::Transport(transport)) => {
                if transport.rx_any() {
                    return Ok(Some(transport.rx_byte()));
                }
            }
            Some(DupStream::Object(object)) => match object.read(1) {
                Ok(ReadResult::Available(bytes)) => match bytes.first() {
                    Some(&byte) => return Ok(Some(byte)),
                    None => crate::hal_debug!("dup stream read returned 0 bytes"),
                },
                Ok(ReadResult::NotReady) => {}
                Err(err) => {
                    crate::hal_warn!("dup stream read failed: {}", err);
                    return Err(err);
                }
            },
            None => {}
        }

        Ok(None)
    }

    /// Block until one byte arrives from any source.
    ///
    /// A byte matching the interrupt character latches a pending interrupt
    /// and is still returned.
    pub fn read_byte(&mut self) -> Result<u8, StreamError> {
        loop {
            if let Some(byte) = self.poll_byte()? {
                if self.interrupt.check(byte) {
                    crate::hal_debug!("interrupt char 0x{:02x}", byte);
                }
                return Ok(byte);
            }
            self.wait_poll_interval();
        }
    }

    /// Arm the interrupt character, or disarm with `None`.
    pub fn set_interrupt_char(&self, ch: Option<u8>) {
        self.interrupt.set(ch);
    }

    pub fn interrupt(&self) -> &InterruptChar {
        &self.interrupt
    }
}

impl<N: NetworkTerminal, D: Delay> ConsoleSink for ConsoleMux<N, D> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        ConsoleMux::write_bytes(self, bytes)
    }
}

impl<N: NetworkTerminal, D: Delay> core::fmt::Write for ConsoleMux<N, D> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.write_cooked(s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}
