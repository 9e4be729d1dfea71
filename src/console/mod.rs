//! Console I/O multiplexer
//!
//! Output fans out to the duplicated stream and the network terminal;
//! input is arbitrated between them, network first.

pub mod cooked;
pub mod error;
pub mod interrupt_char;
pub mod mux;
pub mod stream;

pub use cooked::{write_cooked, Cooked};
pub use error::StreamError;
pub use interrupt_char::InterruptChar;
pub use mux::{ConsoleMux, ConsoleSink};
pub use stream::{ByteTransport, Disconnected, DupStream, NetworkTerminal, ReadResult, StreamObject};
