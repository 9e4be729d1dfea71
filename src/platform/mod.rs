//! Platform bindings for the delay and console collaborators.
//!
//! Only ESP-IDF (FreeRTOS, Xtensa cores) is wired up. Other targets supply
//! their own implementations of the `delay` and `console::stream` traits.

#[cfg(all(target_os = "espidf", target_arch = "xtensa"))]
pub mod esp;

use crate::delay::ExecutionContext;

/// Interrupt state sampled at one instant.
///
/// A critical section masks interrupts (raises the interrupt level) without
/// suspending the scheduler, so both facts are needed before a task may
/// suspend itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqSnapshot {
    /// Executing an interrupt handler.
    pub in_isr: bool,
    /// Current interrupt mask level, 0 when all interrupts are accepted.
    pub int_level: u32,
    /// Scheduler started and not suspended.
    pub scheduler_running: bool,
}

impl ExecutionContext for IrqSnapshot {
    fn in_interrupt(&self) -> bool {
        self.in_isr
    }

    fn interrupts_enabled(&self) -> bool {
        self.int_level == 0 && self.scheduler_running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HalConfig;
    use crate::delay::{BusyWait, BusyWaitStrategy, Delay, DelayService, TaskYield, YieldStrategy};
    use core::cell::Cell;

    #[derive(Default)]
    struct Counts {
        busy: Cell<u32>,
        yields: Cell<u32>,
    }

    impl BusyWait for Counts {
        fn delay_us(&self, _us: u32) {
            self.busy.set(self.busy.get() + 1);
        }
    }

    impl TaskYield for Counts {
        fn yield_for(&self, _scheduler_ticks: u32) {
            self.yields.set(self.yields.get() + 1);
        }
    }

    const TASK: IrqSnapshot = IrqSnapshot {
        in_isr: false,
        int_level: 0,
        scheduler_running: true,
    };

    fn delay_once(snapshot: IrqSnapshot) -> (u32, u32) {
        let counts = Counts::default();
        let config = HalConfig::default();
        let service = DelayService::new(
            YieldStrategy::new(&counts, &config),
            BusyWaitStrategy::new(&counts, &config),
            snapshot,
        );
        service.delay(1);
        (counts.busy.get(), counts.yields.get())
    }

    #[test]
    fn test_task_context_may_yield() {
        assert_eq!(delay_once(TASK), (0, 1));
    }

    #[test]
    fn test_critical_section_busy_waits() {
        // Scheduler still running, interrupts masked
        let critical = IrqSnapshot { int_level: 3, ..TASK };
        assert!(!critical.interrupts_enabled());
        assert_eq!(delay_once(critical), (1, 0));
    }

    #[test]
    fn test_suspended_scheduler_busy_waits() {
        let suspended = IrqSnapshot { scheduler_running: false, ..TASK };
        assert_eq!(delay_once(suspended), (1, 0));
    }

    #[test]
    fn test_isr_busy_waits() {
        let isr = IrqSnapshot { in_isr: true, ..TASK };
        assert_eq!(delay_once(isr), (1, 0));
    }
}
