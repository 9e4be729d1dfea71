//! console-hal - firmware entry point
//!
//! On ESP-IDF:
//! 1. Start the 1 ms tick timer
//! 2. Install UART0 as duplicated stream
//! 3. Run a line echo loop over the console multiplexer
//!
//! On the host the same loop runs against a scripted network terminal, with
//! a thread standing in for the tick interrupt.

use core::fmt::Write;

use console_hal::console::{ConsoleMux, NetworkTerminal};
use console_hal::delay::Delay;
use console_hal::logging::{drain_to, HAL_LOG};

/// Version string (set by build.rs, includes git hash)
const VERSION: &str = env!("VERSION_STRING");

const LINE_SIZE: usize = 64;

/// Echo input lines back until `exit` is entered.
fn echo_loop<N: NetworkTerminal, D: Delay>(console: &mut ConsoleMux<N, D>) {
    let _ = writeln!(console, "\n{}", VERSION);
    let _ = write!(console, "> ");

    let mut line = [0u8; LINE_SIZE];
    let mut len = 0;

    loop {
        let byte = match console.read_byte() {
            Ok(byte) => byte,
            Err(err) => {
                let _ = writeln!(console, "\nread error: {}", err);
                // A stream stuck in error must not spin the task
                console.wait_poll_interval();
                continue;
            }
        };

        if console.interrupt().take_pending() {
            let _ = writeln!(console, "^C\nKeyboardInterrupt");
            len = 0;
            let _ = write!(console, "> ");
            continue;
        }

        match byte {
            b'\r' | b'\n' => {
                let text = core::str::from_utf8(&line[..len]).unwrap_or("");
                let _ = writeln!(console);
                if text == "exit" {
                    break;
                }
                if !text.is_empty() {
                    let _ = writeln!(console, "echo: {}", text);
                }
                len = 0;
                let _ = drain_to(&HAL_LOG, console);
                let _ = write!(console, "> ");
            }
            0x20..=0x7E if len < LINE_SIZE => {
                line[len] = byte;
                len += 1;
                let _ = console.write_bytes(&[byte]);
            }
            _ => {}
        }
    }

    let _ = drain_to(&HAL_LOG, console);
}

#[cfg(all(target_os = "espidf", target_arch = "xtensa"))]
mod firmware {
    use esp_idf_svc::hal::gpio::AnyIOPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{config::Config, UartDriver};
    use esp_idf_svc::hal::units::Hertz;

    use console_hal::config::TermConfig;
    use console_hal::console::{ConsoleMux, Disconnected, DupStream};
    use console_hal::platform::esp::{delay_service, hal_config, start_tick_timer, UartTransport};

    pub fn run() {
        esp_idf_svc::sys::link_patches();

        let peripherals = Peripherals::take().expect("peripherals already taken");
        let _tick_timer = start_tick_timer().expect("tick timer start failed");

        let uart = UartDriver::new(
            peripherals.uart0,
            peripherals.pins.gpio43,
            peripherals.pins.gpio44,
            Option::<AnyIOPin>::None, // CTS
            Option::<AnyIOPin>::None, // RTS
            &Config::default().baudrate(Hertz(115_200)),
        )
        .expect("UART0 init failed");

        let config = hal_config();
        let term = TermConfig::with_dup(DupStream::transport(UartTransport::new(uart)));
        let mut console = ConsoleMux::new(term, Disconnected, delay_service(&config), &config);

        loop {
            super::echo_loop(&mut console);
        }
    }
}

#[cfg(not(all(target_os = "espidf", target_arch = "xtensa")))]
mod host {
    use std::collections::VecDeque;
    use std::io::Write as _;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use console_hal::clock::{on_tick_interrupt, TICK_CLOCK};
    use console_hal::config::{HalConfig, TermConfig};
    use console_hal::console::{ByteTransport, ConsoleMux, DupStream, NetworkTerminal};
    use console_hal::delay::{
        BusyWait, BusyWaitStrategy, DelayService, ExecutionContext, SpinWaitStrategy,
        WaitForInterrupt,
    };

    /// Network session replaying a script, one byte per `gap` ticks.
    struct ScriptedTerminal {
        script: VecDeque<u8>,
        gap: u32,
        next_at: u32,
    }

    impl NetworkTerminal for ScriptedTerminal {
        fn rx_any(&mut self) -> bool {
            !self.script.is_empty() && TICK_CLOCK.elapsed_since(self.next_at) < u32::MAX / 2
        }

        fn rx_byte(&mut self) -> u8 {
            self.next_at = TICK_CLOCK.now().wrapping_add(self.gap);
            self.script.pop_front().unwrap_or(0)
        }

        fn tx(&mut self, _bytes: &[u8]) {}
    }

    struct Stdout;

    impl ByteTransport for Stdout {
        fn tx(&mut self, bytes: &[u8]) {
            let mut out = std::io::stdout();
            let _ = out.write_all(bytes);
            let _ = out.flush();
        }

        fn rx_any(&mut self) -> bool {
            false
        }

        fn rx_byte(&mut self) -> u8 {
            0
        }
    }

    struct TaskContext;

    impl ExecutionContext for TaskContext {
        fn in_interrupt(&self) -> bool {
            false
        }

        fn interrupts_enabled(&self) -> bool {
            true
        }
    }

    struct SleepBusyWait;

    impl BusyWait for SleepBusyWait {
        fn delay_us(&self, us: u32) {
            thread::sleep(Duration::from_micros(us as u64));
        }
    }

    struct YieldWfi;

    impl WaitForInterrupt for YieldWfi {
        fn wait_for_interrupt(&self) {
            thread::yield_now();
        }
    }

    pub fn run() {
        let running = Arc::new(AtomicBool::new(true));
        TICK_CLOCK.reset();
        let ticker = {
            let running = Arc::clone(&running);
            thread::spawn(move || {
                while running.load(Ordering::Relaxed) {
                    thread::sleep(Duration::from_millis(1));
                    on_tick_interrupt();
                }
            })
        };

        let config = HalConfig::default();
        let delay = DelayService::new(
            SpinWaitStrategy::new(&TICK_CLOCK, YieldWfi),
            BusyWaitStrategy::new(SleepBusyWait, &config),
            TaskContext,
        );
        let net = ScriptedTerminal {
            script: b"help\rstatus\r\x03exit\r".iter().copied().collect(),
            gap: 20,
            next_at: 0,
        };

        let mut console =
            ConsoleMux::new(TermConfig::with_dup(DupStream::transport(Stdout)), net, delay, &config);
        super::echo_loop(&mut console);

        running.store(false, Ordering::Relaxed);
        let _ = ticker.join();
    }
}

fn main() {
    #[cfg(all(target_os = "espidf", target_arch = "xtensa"))]
    firmware::run();

    #[cfg(not(all(target_os = "espidf", target_arch = "xtensa")))]
    host::run();
}
