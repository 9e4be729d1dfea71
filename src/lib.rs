//! # console-hal
//!
//! Console I/O multiplexer and monotonic time service for a microcontroller
//! runtime.
//!
//! ## Architecture
//!
//! ```text
//! timer IRQ ──▶ TickClock ◀── SpinWaitStrategy ─┐
//!                                               ├── DelayService ◀── ConsoleMux::read_byte
//!               YieldStrategy / BusyWait ───────┘
//!
//! runtime ──▶ write_cooked ──▶ ConsoleMux ──┬──▶ duplicated stream
//!                                           └──▶ network terminal
//! ```
//!
//! - Only the tick interrupt writes the clock
//! - Delay picks busy-wait whenever interrupts cannot make progress
//! - Input polls the network terminal first, then the duplicated stream

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "xtensa", feature(asm_experimental_arch))]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod console;
pub mod delay;
pub mod error;
pub mod logging;
pub mod platform;

pub use clock::{on_tick_interrupt, wrap_sub, TickClock, Ticks, TICK_CLOCK};
pub use config::{HalConfig, TermConfig};
pub use console::{ConsoleMux, ConsoleSink, DupStream, ReadResult, StreamError};
pub use delay::{Delay, DelayService};
pub use error::{ErrorSink, HalError};
pub use logging::HAL_LOG;
