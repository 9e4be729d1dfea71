//! Blocking delay with interrupt-context-aware fallback.
//!
//! # Strategy selection
//!
//! ```text
//!                    delay(n)
//!                       │
//!          in ISR or IRQs masked? ──yes──▶ BusyWaitStrategy (n × us_per_tick)
//!                       │no
//!                       ▼
//!             configured strategy
//!          ┌────────────┴────────────┐
//!   YieldStrategy              SpinWaitStrategy
//!   (scheduler timed yield)    (WFI until TickClock advanced n)
//! ```
//!
//! The configured strategy is fixed at build time by the platform. The
//! interrupt-context guard is evaluated on every call.

mod strategy;

pub use strategy::{BusyWaitStrategy, SpinWaitStrategy, YieldStrategy};

use crate::clock::Ticks;
use crate::error::HalError;

/// Reports the current execution context. Queried, never cached.
pub trait ExecutionContext {
    /// True while running inside an interrupt handler.
    fn in_interrupt(&self) -> bool;
    /// True if interrupts are globally enabled.
    fn interrupts_enabled(&self) -> bool;
}

/// Calibrated busy-wait that never suspends and never needs interrupts.
pub trait BusyWait {
    fn delay_us(&self, us: u32);
}

/// Cooperative scheduler's timed yield.
pub trait TaskYield {
    /// Suspend the calling task for `scheduler_ticks` scheduler ticks.
    fn yield_for(&self, scheduler_ticks: u32);
}

/// Low-power wait until the next interrupt (WFI).
pub trait WaitForInterrupt {
    fn wait_for_interrupt(&self);
}

impl<T: ExecutionContext + ?Sized> ExecutionContext for &T {
    fn in_interrupt(&self) -> bool {
        (**self).in_interrupt()
    }

    fn interrupts_enabled(&self) -> bool {
        (**self).interrupts_enabled()
    }
}

impl<T: BusyWait + ?Sized> BusyWait for &T {
    fn delay_us(&self, us: u32) {
        (**self).delay_us(us)
    }
}

impl<T: TaskYield + ?Sized> TaskYield for &T {
    fn yield_for(&self, scheduler_ticks: u32) {
        (**self).yield_for(scheduler_ticks)
    }
}

impl<T: WaitForInterrupt + ?Sized> WaitForInterrupt for &T {
    fn wait_for_interrupt(&self) {
        (**self).wait_for_interrupt()
    }
}

/// One way of waiting for a number of ticks.
pub trait DelayStrategy {
    fn wait(&self, ticks: Ticks);
}

/// Blocking delay as seen by callers.
pub trait Delay {
    /// Block for `ticks` time units. `delay(0)` returns immediately.
    fn delay(&self, ticks: Ticks);

    /// Delay for a duration coming from a signed caller.
    ///
    /// Negative or out-of-range input is rejected, never clamped.
    fn delay_checked(&self, duration: i64) -> Result<(), HalError> {
        self.delay(checked_duration(duration)?);
        Ok(())
    }
}

impl<T: Delay + ?Sized> Delay for &T {
    fn delay(&self, ticks: Ticks) {
        (**self).delay(ticks)
    }
}

/// Convert a signed duration into ticks.
pub fn checked_duration(duration: i64) -> Result<Ticks, HalError> {
    Ticks::try_from(duration).map_err(|_| HalError::InvalidDuration(duration))
}

/// Configured strategy plus the runtime interrupt-context guard.
pub struct DelayService<S, B, C> {
    strategy: S,
    fallback: BusyWaitStrategy<B>,
    context: C,
}

impl<S, B, C> DelayService<S, B, C>
where
    S: DelayStrategy,
    B: BusyWait,
    C: ExecutionContext,
{
    /// Create a delay service.
    ///
    /// # Arguments
    /// * `strategy` - Default strategy for task context with interrupts on
    /// * `fallback` - Busy-wait used in ISR context or with interrupts masked
    /// * `context` - Interrupt/scheduler state source
    pub fn new(strategy: S, fallback: BusyWaitStrategy<B>, context: C) -> Self {
        Self {
            strategy,
            fallback,
            context,
        }
    }

    /// True if the current context forces the busy-wait fallback.
    #[inline]
    pub fn must_busy_wait(&self) -> bool {
        self.context.in_interrupt() || !self.context.interrupts_enabled()
    }

    /// Configured default strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}

impl<S, B, C> Delay for DelayService<S, B, C>
where
    S: DelayStrategy,
    B: BusyWait,
    C: ExecutionContext,
{
    fn delay(&self, ticks: Ticks) {
        if self.must_busy_wait() {
            self.fallback.wait(ticks);
        } else {
            self.strategy.wait(ticks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_duration_accepts_range() {
        assert_eq!(checked_duration(0), Ok(0));
        assert_eq!(checked_duration(1500), Ok(1500));
        assert_eq!(checked_duration(u32::MAX as i64), Ok(u32::MAX));
    }

    #[test]
    fn test_checked_duration_rejects_negative() {
        assert_eq!(checked_duration(-1), Err(HalError::InvalidDuration(-1)));
        assert_eq!(
            checked_duration(i64::MIN),
            Err(HalError::InvalidDuration(i64::MIN))
        );
    }

    #[test]
    fn test_checked_duration_rejects_overflow() {
        let too_big = u32::MAX as i64 + 1;
        assert_eq!(checked_duration(too_big), Err(HalError::InvalidDuration(too_big)));
    }
}
