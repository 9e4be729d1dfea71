//! ESP-IDF / FreeRTOS bindings.
//!
//! Thin wrappers only. The scheduler is always present on ESP-IDF, so the
//! configured strategy is `YieldStrategy`; the ROM busy-wait covers ISR
//! context, critical sections (PS.INTLEVEL > 0) and a suspended scheduler.

use core::time::Duration;

use esp_idf_svc::hal::delay::NON_BLOCK;
use esp_idf_svc::hal::uart::UartDriver;
use esp_idf_svc::sys::{self, EspError};
use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};

use crate::clock::{on_tick_interrupt, TICK_CLOCK};
use crate::config::HalConfig;
use crate::console::ByteTransport;
use crate::platform::IrqSnapshot;
use crate::delay::{BusyWait, BusyWaitStrategy, DelayService, ExecutionContext, TaskYield, YieldStrategy};

/// Live interrupt state of the calling core.
///
/// Samples a fresh [`IrqSnapshot`] on every query.
pub struct EspContext;

impl EspContext {
    pub fn snapshot(&self) -> IrqSnapshot {
        // SAFETY: both calls only read scheduler/ISR bookkeeping
        let (in_isr, scheduler_state) =
            unsafe { (sys::xPortInIsrContext() != 0, sys::xTaskGetSchedulerState()) };

        IrqSnapshot {
            in_isr,
            int_level: ps_intlevel(),
            scheduler_running: scheduler_state == sys::taskSCHEDULER_RUNNING as sys::BaseType_t,
        }
    }
}

impl ExecutionContext for EspContext {
    fn in_interrupt(&self) -> bool {
        self.snapshot().in_interrupt()
    }

    fn interrupts_enabled(&self) -> bool {
        self.snapshot().interrupts_enabled()
    }
}

/// PS.INTLEVEL of the current core. Non-zero inside `portENTER_CRITICAL`.
#[inline]
fn ps_intlevel() -> u32 {
    let ps: u32;
    // SAFETY: reading PS has no side effects
    unsafe { core::arch::asm!("rsr.ps {0}", out(reg) ps, options(nomem, nostack)) };
    ps & 0xF
}

/// ROM calibrated busy-wait.
pub struct RomBusyWait;

impl BusyWait for RomBusyWait {
    fn delay_us(&self, us: u32) {
        // SAFETY: ROM function, no preconditions
        unsafe { sys::esp_rom_delay_us(us) }
    }
}

/// `vTaskDelay` yield.
pub struct FreeRtosYield;

impl TaskYield for FreeRtosYield {
    fn yield_for(&self, scheduler_ticks: u32) {
        // SAFETY: only reached from task context (guarded by DelayService)
        unsafe { sys::vTaskDelay(scheduler_ticks) }
    }
}

pub type EspDelay = DelayService<YieldStrategy<FreeRtosYield>, RomBusyWait, EspContext>;

/// HalConfig with the FreeRTOS tick period filled in.
pub fn hal_config() -> HalConfig {
    HalConfig::for_tick_rate(sys::configTICK_RATE_HZ)
}

pub fn delay_service(config: &HalConfig) -> EspDelay {
    DelayService::new(
        YieldStrategy::new(FreeRtosYield, config),
        BusyWaitStrategy::new(RomBusyWait, config),
        EspContext,
    )
}

/// Reset the tick clock and start a 1 ms periodic timer driving it.
///
/// Keep the returned timer alive; dropping it stops the ticks.
pub fn start_tick_timer() -> Result<EspTimer<'static>, EspError> {
    TICK_CLOCK.reset();
    crate::hal_info!("tick clock reset");

    let service = EspTaskTimerService::new()?;
    let timer = service.timer(on_tick_interrupt)?;
    timer.every(Duration::from_millis(1))?;
    Ok(timer)
}

/// UART as fast-path duplicated stream.
pub struct UartTransport {
    uart: UartDriver<'static>,
}

impl UartTransport {
    pub fn new(uart: UartDriver<'static>) -> Self {
        Self { uart }
    }
}

impl ByteTransport for UartTransport {
    fn tx(&mut self, bytes: &[u8]) {
        let _ = self.uart.write(bytes);
    }

    fn rx_any(&mut self) -> bool {
        self.uart.remaining_read().map(|n| n > 0).unwrap_or(false)
    }

    fn rx_byte(&mut self) -> u8 {
        let mut byte = [0u8; 1];
        let _ = self.uart.read(&mut byte, NON_BLOCK);
        byte[0]
    }
}
