//! Keyboard-interrupt character
//!
//! Any byte matching the armed character latches a pending interrupt that
//! the runtime picks up with `take_pending()`. RX interrupt handlers may call
//! `check()` directly, so state lives in atomics.

use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

const DISARMED: i32 = -1;

/// Armed interrupt character plus pending latch
pub struct InterruptChar {
    ch: AtomicI32,
    pending: AtomicBool,
}

impl InterruptChar {
    pub const fn new(ch: Option<u8>) -> Self {
        Self {
            ch: AtomicI32::new(match ch {
                Some(c) => c as i32,
                None => DISARMED,
            }),
            pending: AtomicBool::new(false),
        }
    }

    /// Arm with a character, or disarm with `None`
    pub fn set(&self, ch: Option<u8>) {
        let raw = ch.map(i32::from).unwrap_or(DISARMED);
        self.ch.store(raw, Ordering::Relaxed);
    }

    /// Currently armed character
    pub fn get(&self) -> Option<u8> {
        u8::try_from(self.ch.load(Ordering::Relaxed)).ok()
    }

    /// Latch a pending interrupt if `byte` is the armed character.
    #[inline]
    pub fn check(&self, byte: u8) -> bool {
        let hit = self.ch.load(Ordering::Relaxed) == byte as i32;
        if hit {
            self.pending.store(true, Ordering::Release);
        }
        hit
    }

    /// Check if an interrupt is pending
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Consume the pending interrupt
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

impl Default for InterruptChar {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disarmed_never_matches() {
        let intr = InterruptChar::new(None);
        for b in 0..=255u8 {
            assert!(!intr.check(b));
        }
        assert!(!intr.is_pending());
    }

    #[test]
    fn test_match_latches_until_taken() {
        let intr = InterruptChar::new(Some(0x03));
        assert!(!intr.check(b'a'));
        assert!(intr.check(0x03));

        assert!(intr.take_pending());
        assert!(!intr.take_pending());
    }

    #[test]
    fn test_rearm() {
        let intr = InterruptChar::new(Some(0x03));
        intr.set(Some(b'q'));
        assert_eq!(intr.get(), Some(b'q'));
        assert!(!intr.check(0x03));
        assert!(intr.check(b'q'));

        intr.set(None);
        assert_eq!(intr.get(), None);
    }
}
