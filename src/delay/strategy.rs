//! The three interchangeable delay strategies.

use super::{BusyWait, DelayStrategy, TaskYield, WaitForInterrupt};
use crate::clock::{Ticks, TickClock};
use crate::config::HalConfig;

/// Calls the busy-wait primitive once per tick.
///
/// Safe in interrupt context: never reads the clock, never suspends.
pub struct BusyWaitStrategy<B> {
    busy: B,
    us_per_tick: u32,
}

impl<B: BusyWait> BusyWaitStrategy<B> {
    pub fn new(busy: B, config: &HalConfig) -> Self {
        Self {
            busy,
            us_per_tick: config.us_per_tick,
        }
    }
}

impl<B: BusyWait> DelayStrategy for BusyWaitStrategy<B> {
    fn wait(&self, ticks: Ticks) {
        for _ in 0..ticks {
            self.busy.delay_us(self.us_per_tick);
        }
    }
}

/// Suspends the calling task through the scheduler.
pub struct YieldStrategy<Y> {
    scheduler: Y,
    scheduler_tick_ms: u32,
}

impl<Y: TaskYield> YieldStrategy<Y> {
    pub fn new(scheduler: Y, config: &HalConfig) -> Self {
        Self {
            scheduler,
            scheduler_tick_ms: config.scheduler_tick_ms.max(1),
        }
    }

    /// Scheduler ticks for a delay of `ticks`, rounded up.
    #[inline]
    pub fn scheduler_ticks(&self, ticks: Ticks) -> u32 {
        ticks.div_ceil(self.scheduler_tick_ms)
    }
}

impl<Y: TaskYield> DelayStrategy for YieldStrategy<Y> {
    fn wait(&self, ticks: Ticks) {
        if ticks == 0 {
            return;
        }
        self.scheduler.yield_for(self.scheduler_ticks(ticks));
    }
}

/// Sleeps in WFI until the tick interrupt has advanced the clock far enough.
///
/// Only valid with interrupts enabled: progress depends on the tick IRQ.
pub struct SpinWaitStrategy<'c, W> {
    clock: &'c TickClock,
    wfi: W,
}

impl<'c, W: WaitForInterrupt> SpinWaitStrategy<'c, W> {
    pub fn new(clock: &'c TickClock, wfi: W) -> Self {
        Self { clock, wfi }
    }
}

impl<W: WaitForInterrupt> DelayStrategy for SpinWaitStrategy<'_, W> {
    fn wait(&self, ticks: Ticks) {
        let start = self.clock.now();
        while self.clock.elapsed_since(start) < ticks {
            self.wfi.wait_for_interrupt();
        }
    }
}
