//! Monotonic tick counter driven by the periodic timer interrupt.
//!
//! # Architecture
//!
//! ```text
//! Timer IRQ              TickClock             Any context
//! ─────────              ─────────             ───────────
//!
//! increment() ─────────▶ [AtomicU32] ◀──────── now()
//! single writer           wraps at 2^32         many readers
//! ```
//!
//! # Rules
//!
//! - Only the timer interrupt path calls `increment()`
//! - Readers never compare ticks with `>`; they use [`wrap_sub`]
//! - No locks: increments are serialized by the interrupt controller

use core::sync::atomic::{AtomicU32, Ordering};

/// Raw tick value. Wraps at `u32::MAX`.
pub type Ticks = u32;

/// Elapsed ticks from `earlier` to `later`, correct across one wraparound.
#[inline]
pub const fn wrap_sub(later: Ticks, earlier: Ticks) -> Ticks {
    later.wrapping_sub(earlier)
}

/// Word-sized tick counter.
///
/// The counter is an atomic so a read can never be split into two halves,
/// even though the single-writer discipline means no read-modify-write race
/// is possible. Relaxed ordering is enough: the value carries no payload.
pub struct TickClock {
    ticks: AtomicU32,
}

impl TickClock {
    /// Create a clock at tick 0.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a clock at an arbitrary tick (used to exercise wraparound).
    pub const fn starting_at(ticks: Ticks) -> Self {
        Self {
            ticks: AtomicU32::new(ticks),
        }
    }

    /// Advance by exactly one tick.
    ///
    /// Interrupt handler body: no logging, no allocation, no blocking.
    #[inline]
    pub fn increment(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Current tick value.
    #[inline]
    pub fn now(&self) -> Ticks {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Ticks elapsed since `start`.
    #[inline]
    pub fn elapsed_since(&self, start: Ticks) -> Ticks {
        wrap_sub(self.now(), start)
    }

    /// Zero the counter (tick source initialization).
    ///
    /// Must run before the tick interrupt is enabled.
    pub fn reset(&self) {
        self.ticks.store(0, Ordering::Relaxed);
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide tick clock.
pub static TICK_CLOCK: TickClock = TickClock::new();

/// Entry point wired to the hardware timer vector.
#[inline]
pub fn on_tick_interrupt() {
    TICK_CLOCK.increment();
}

/// Current value of the process-wide clock.
#[inline]
pub fn now() -> Ticks {
    TICK_CLOCK.now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_advances_by_one() {
        let clock = TickClock::new();
        assert_eq!(clock.now(), 0);

        clock.increment();
        clock.increment();
        clock.increment();

        assert_eq!(clock.now(), 3);
    }

    #[test]
    fn test_wraparound_keeps_elapsed_correct() {
        let clock = TickClock::starting_at(u32::MAX - 1);
        let before = clock.now();

        for _ in 0..5 {
            clock.increment();
        }

        assert_eq!(clock.now(), 3);
        assert_eq!(wrap_sub(clock.now(), before), 5);
        assert_eq!(clock.elapsed_since(before), 5);
    }

    #[test]
    fn test_reset() {
        let clock = TickClock::starting_at(1234);
        clock.reset();
        assert_eq!(clock.now(), 0);
    }

    #[test]
    fn test_reader_never_sees_decrease() {
        use std::sync::Arc;
        use std::thread;

        let clock = Arc::new(TickClock::new());
        let writer = {
            let clock = Arc::clone(&clock);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    clock.increment();
                }
            })
        };

        let mut last = clock.now();
        while !writer.is_finished() {
            let current = clock.now();
            assert!(wrap_sub(current, last) <= 10_000);
            last = current;
        }
        writer.join().unwrap();

        assert_eq!(clock.now(), 10_000);
    }
}
