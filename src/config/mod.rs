//! Module: config
//!
//! Purpose: Platform constants and the terminal configuration context.
//!
//! Architecture:
//! - HalConfig: numeric constants chosen once by the platform at startup
//! - TermConfig: owns the duplicated-stream slot; handed to ConsoleMux by
//!   value and only reachable through `ConsoleMux::term_mut()`
//!
//! Safety: TermConfig is mutated only through `&mut`, so the slot can never
//! be swapped while a read or write is in flight.

use crate::console::DupStream;

/// Busy-wait length of one tick, in microseconds.
pub const US_PER_TICK: u32 = 1000;

/// Default keyboard-interrupt character (Ctrl+C).
pub const CHAR_CTRL_C: u8 = 0x03;

/// Platform timing constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalConfig {
    /// Busy-wait increment per tick (microseconds).
    pub us_per_tick: u32,
    /// Scheduler tick period in HAL ticks (milliseconds).
    pub scheduler_tick_ms: u32,
    /// Delay between polling rounds of `read_byte`.
    pub read_poll_ticks: u32,
    /// Initial keyboard-interrupt character, `None` disables it.
    pub interrupt_char: Option<u8>,
}

impl HalConfig {
    pub const DEFAULT: HalConfig = HalConfig {
        us_per_tick: US_PER_TICK,
        scheduler_tick_ms: 1,
        read_poll_ticks: 1,
        interrupt_char: Some(CHAR_CTRL_C),
    };

    /// Defaults for a scheduler ticking at `tick_rate_hz`.
    ///
    /// Rates above 1 kHz still count as one HAL tick per scheduler tick.
    pub const fn for_tick_rate(tick_rate_hz: u32) -> HalConfig {
        let ms = if tick_rate_hz == 0 { 1 } else { 1000 / tick_rate_hz };
        HalConfig {
            scheduler_tick_ms: if ms == 0 { 1 } else { ms },
            ..Self::DEFAULT
        }
    }
}

impl Default for HalConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Terminal configuration context.
///
/// Holds the optional duplicated stream mirroring console traffic. The core
/// observes and calls it but never creates or destroys it on its own.
#[derive(Default)]
pub struct TermConfig {
    dup: Option<DupStream>,
}

impl TermConfig {
    /// No duplicated stream installed.
    pub const fn new() -> Self {
        Self { dup: None }
    }

    /// Start with a duplicated stream installed.
    pub fn with_dup(dup: DupStream) -> Self {
        Self { dup: Some(dup) }
    }

    /// Install or replace the duplicated stream, returning the previous one.
    pub fn set_dup(&mut self, dup: DupStream) -> Option<DupStream> {
        self.dup.replace(dup)
    }

    /// Remove the duplicated stream.
    pub fn clear_dup(&mut self) -> Option<DupStream> {
        self.dup.take()
    }

    /// Check if a duplicated stream is installed.
    pub fn has_dup(&self) -> bool {
        self.dup.is_some()
    }

    pub(crate) fn dup_mut(&mut self) -> Option<&mut DupStream> {
        self.dup.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HalConfig::default();
        assert_eq!(config.us_per_tick, 1000);
        assert_eq!(config.read_poll_ticks, 1);
        assert_eq!(config.interrupt_char, Some(0x03));
    }

    #[test]
    fn test_scheduler_tick_from_rate() {
        assert_eq!(HalConfig::for_tick_rate(100).scheduler_tick_ms, 10);
        assert_eq!(HalConfig::for_tick_rate(1000).scheduler_tick_ms, 1);
        assert_eq!(HalConfig::for_tick_rate(2000).scheduler_tick_ms, 1);
        assert_eq!(HalConfig::for_tick_rate(0).scheduler_tick_ms, 1);
        assert_eq!(HalConfig::for_tick_rate(100).read_poll_ticks, 1);
    }

    #[test]
    fn test_term_config_starts_empty() {
        let term = TermConfig::new();
        assert!(!term.has_dup());
    }
}
