//! RT-safe logging for the console HAL.
//!
//! # Architecture
//!
//! ```text
//! HAL code              LogStream             Console task
//! ────────              ─────────             ────────────
//!
//! hal_warn!() ────────▶ [L0][L1][L2] ───────▶ drain_to(mux)
//! non-blocking            lock-free            cooked output
//! tick-stamped            ring buffer          blocking ok
//! ```
//!
//! # Rules
//!
//! - Never log from the tick interrupt
//! - Pushing never blocks; messages are dropped and counted when full
//! - Draining goes through the cooked writer, so output uses `\r\n`

use core::cell::UnsafeCell;
use core::fmt::Write;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::clock::Ticks;
use crate::console::{Cooked, ConsoleSink, StreamError};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Tick at which the entry was pushed.
    pub ticks: Ticks,
    pub level: LogLevel,
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: LogEntry = LogEntry {
        ticks: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text.
    pub fn message(&self) -> &[u8] {
        &self.msg[..self.len as usize]
    }
}

/// One ring slot. `seq` says whose turn it is (see [`LogStream`]).
struct Slot {
    seq: AtomicU32,
    entry: UnsafeCell<LogEntry>,
}

impl Slot {
    const EMPTY: Slot = Slot {
        seq: AtomicU32::new(0),
        entry: UnsafeCell::new(LogEntry::EMPTY),
    };
}

/// Lock-free log ring: many producers, one draining consumer.
///
/// Each slot carries a sequence number. For position `pos` mapping to a slot:
/// - `seq == pos`: free, a producer may claim it
/// - `seq == pos + 1`: written and published, the consumer may take it
/// - `seq == pos + N`: consumed, free for the next lap
///
/// Sequences are stored minus the slot index so the zeroed initial state
/// means "slot `i` is free for position `i`".
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    slots: [Slot; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: a slot's entry is touched only by the producer that claimed its
// position (via compare_exchange) or by the single consumer after the
// producer published it with a Release store of `seq`.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");
        assert!(N <= (1 << 30), "Log buffer too large");

        Self {
            slots: [Slot::EMPTY; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    #[inline]
    fn seq(&self, idx: usize) -> u32 {
        self.slots[idx].seq.load(Ordering::Acquire).wrapping_add(idx as u32)
    }

    #[inline]
    fn set_seq(&self, idx: usize, seq: u32) {
        self.slots[idx].seq.store(seq.wrapping_sub(idx as u32), Ordering::Release);
    }

    /// Push an entry. Returns `false` if the ring was full and it was dropped.
    ///
    /// Never blocks: a slot is claimed only when it is free, so a full ring
    /// fails fast without touching `write_idx`.
    #[inline]
    pub fn push(&self, ticks: Ticks, level: LogLevel, msg: &[u8]) -> bool {
        let mut pos = self.write_idx.load(Ordering::Relaxed);

        loop {
            let idx = (pos as usize) & Self::MASK;
            let lag = self.seq(idx).wrapping_sub(pos) as i32;

            if lag == 0 {
                match self.write_idx.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: position `pos` is exclusively ours until published.
                        unsafe {
                            let entry = &mut *self.slots[idx].entry.get();
                            entry.ticks = ticks;
                            entry.level = level;
                            entry.len = msg.len().min(MAX_MSG_LEN) as u8;
                            entry.msg[..entry.len as usize]
                                .copy_from_slice(&msg[..entry.len as usize]);
                        }
                        self.set_seq(idx, pos.wrapping_add(1));
                        return true;
                    }
                    Err(current) => pos = current,
                }
            } else if lag < 0 {
                // Previous lap not consumed yet: full.
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            } else {
                pos = self.write_idx.load(Ordering::Relaxed);
            }
        }
    }

    /// Take the oldest published entry.
    ///
    /// Returns `None` when empty, or when the oldest slot is claimed but its
    /// producer has not finished writing it.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let pos = self.read_idx.load(Ordering::Relaxed);
        let idx = (pos as usize) & Self::MASK;

        if self.seq(idx) != pos.wrapping_add(1) {
            return None;
        }

        // SAFETY: published by its producer, single consumer
        let entry = unsafe { *self.slots[idx].entry.get() };

        self.set_seq(idx, pos.wrapping_add(N as u32));
        self.read_idx.store(pos.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Number of claimed entries not yet drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Acquire);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide HAL log.
pub static HAL_LOG: LogStream = LogStream::new();

/// Format a message into a buffer, truncating on overflow.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl Write for BufWriter<'_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let to_write = bytes.len().min(self.buf.len() - self.pos);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Write every pending entry to `sink` as `[ticks] LEVEL: msg\n`, cooked.
///
/// A dropped-count line follows if anything was lost since the last drain.
/// Returns the number of entries written.
pub fn drain_to<const N: usize, S: ConsoleSink + ?Sized>(
    stream: &LogStream<N>,
    sink: &mut S,
) -> Result<usize, StreamError> {
    let mut out = Cooked::new(sink);
    let mut count = 0;

    while let Some(entry) = stream.drain() {
        let _ = writeln!(
            out,
            "[{:10}] {}: {}",
            entry.ticks,
            entry.level.as_str(),
            core::str::from_utf8(entry.message()).unwrap_or("<invalid utf8>")
        );
        out.take_error()?;
        count += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let _ = writeln!(out, "[WARN] Dropped: {}", dropped);
        out.take_error()?;
        stream.reset_dropped();
    }

    Ok(count)
}

/// Log macro: explicit stream and timestamp.
///
/// ```ignore
/// hal_log!(LogLevel::Info, HAL_LOG, ticks, "dup stream {}", "installed");
/// ```
#[macro_export]
macro_rules! hal_log {
    ($level:expr, $stream:expr, $ticks:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($ticks, $level, &buf[..len]);
    }};
}

/// Info to `HAL_LOG`, stamped with the current tick.
#[macro_export]
macro_rules! hal_info {
    ($($arg:tt)*) => {
        $crate::hal_log!(
            $crate::logging::LogLevel::Info,
            $crate::logging::HAL_LOG,
            $crate::clock::now(),
            $($arg)*
        )
    };
}

/// Warning to `HAL_LOG`, stamped with the current tick.
#[macro_export]
macro_rules! hal_warn {
    ($($arg:tt)*) => {
        $crate::hal_log!(
            $crate::logging::LogLevel::Warn,
            $crate::logging::HAL_LOG,
            $crate::clock::now(),
            $($arg)*
        )
    };
}

/// Debug to `HAL_LOG`, stamped with the current tick.
#[macro_export]
macro_rules! hal_debug {
    ($($arg:tt)*) => {
        $crate::hal_log!(
            $crate::logging::LogLevel::Debug,
            $crate::logging::HAL_LOG,
            $crate::clock::now(),
            $($arg)*
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    struct Capture(Vec<u8>);

    impl ConsoleSink for Capture {
        fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
            self.0.extend_from_slice(bytes);
            Ok(())
        }
    }

    #[test]
    fn test_push_and_drain() {
        let stream = LogStream::<8>::new();

        assert!(stream.push(42, LogLevel::Warn, b"generic write failed"));
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.ticks, 42);
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.message(), b"generic write failed");
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_full_ring_drops() {
        let stream = LogStream::<2>::new();

        assert!(stream.push(1, LogLevel::Info, b"1"));
        assert!(stream.push(2, LogLevel::Info, b"2"));
        assert!(!stream.push(3, LogLevel::Info, b"3"));
        assert_eq!(stream.dropped(), 1);
        assert_eq!(stream.pending(), 2);

        stream.drain();
        assert!(stream.push(4, LogLevel::Info, b"4"));
    }

    #[test]
    fn test_macro_formats_message() {
        let stream = LogStream::<4>::new();
        hal_log!(LogLevel::Debug, stream, 7, "read {} bytes", 0);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.message(), b"read 0 bytes");
        assert_eq!(entry.ticks, 7);
    }

    #[test]
    fn test_drain_to_sink_is_cooked() {
        let stream = LogStream::<4>::new();
        stream.push(1234, LogLevel::Info, b"dup stream installed");

        let mut sink = Capture(Vec::new());
        assert_eq!(drain_to(&stream, &mut sink), Ok(1));

        let text = std::str::from_utf8(&sink.0).unwrap();
        assert!(text.contains("1234"));
        assert!(text.contains("INFO: dup stream installed"));
        assert!(text.ends_with("\r\n"));
    }

    #[test]
    fn test_drain_reports_dropped() {
        let stream = LogStream::<2>::new();
        stream.push(1, LogLevel::Info, b"a");
        stream.push(2, LogLevel::Info, b"b");
        stream.push(3, LogLevel::Info, b"c");

        let mut sink = Capture(Vec::new());
        assert_eq!(drain_to(&stream, &mut sink), Ok(2));

        let text = std::str::from_utf8(&sink.0).unwrap();
        assert!(text.contains("Dropped: 1"));
        assert_eq!(stream.dropped(), 0);
    }

    #[test]
    fn test_format_truncates() {
        let mut buf = [0u8; 4];
        let len = format_to_buffer(&mut buf, format_args!("overflow {}", 99));
        assert_eq!(&buf[..len], b"over");
    }

    #[test]
    fn test_concurrent_producers() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<64>::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let stream = Arc::clone(&stream);
                thread::spawn(move || {
                    for j in 0..10 {
                        let msg = format!("T{} msg {}", i, j);
                        stream.push(j, LogLevel::Info, msg.as_bytes());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let mut count = 0;
        while stream.drain().is_some() {
            count += 1;
        }
        assert_eq!(count, 40);
    }

    #[test]
    fn test_concurrent_producers_with_live_consumer() {
        use std::collections::HashSet;
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;
        use std::thread;

        const PRODUCERS: u32 = 8;
        const PER_PRODUCER: u32 = 2000;

        let stream = Arc::new(LogStream::<4>::new());
        let done = Arc::new(AtomicBool::new(false));

        let consumer = {
            let stream = Arc::clone(&stream);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut seen = HashSet::new();
                loop {
                    let finished = done.load(Ordering::Acquire);
                    while let Some(entry) = stream.drain() {
                        // Every entry is a fully written, never-seen id.
                        assert_ne!(entry.ticks, 0, "unwritten slot drained");
                        assert_eq!(entry.message(), &entry.ticks.to_le_bytes()[..]);
                        assert!(seen.insert(entry.ticks), "entry {} drained twice", entry.ticks);
                    }
                    if finished {
                        return seen.len() as u32;
                    }
                    thread::yield_now();
                }
            })
        };

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let stream = Arc::clone(&stream);
                thread::spawn(move || {
                    for j in 0..PER_PRODUCER {
                        let id = p * PER_PRODUCER + j + 1;
                        stream.push(id, LogLevel::Info, &id.to_le_bytes());
                    }
                })
            })
            .collect();

        for handle in producers {
            handle.join().unwrap();
        }
        done.store(true, Ordering::Release);
        let received = consumer.join().unwrap();

        assert_eq!(received + stream.dropped(), PRODUCERS * PER_PRODUCER);
        assert_eq!(stream.pending(), 0);
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_full_ring_keeps_counters_consistent() {
        let stream = LogStream::<2>::new();

        for round in 1..=100u32 {
            stream.push(round, LogLevel::Info, b"a");
            stream.push(round, LogLevel::Info, b"b");
            assert!(!stream.push(round, LogLevel::Info, b"c"));
            assert_eq!(stream.pending(), 2);

            assert!(stream.drain().is_some());
            assert!(stream.drain().is_some());
            assert!(stream.drain().is_none());
            assert_eq!(stream.pending(), 0);
        }
        assert_eq!(stream.dropped(), 100);
    }
}
