//! Levelled, timestamped log ring owned by the watchface.
//!
//! The core has no logging backend of its own. It records events into a
//! [`LogBuffer`] and the platform drains it after each dispatch: the firmware
//! forwards entries to `defmt`, the simulator prints them.
//!
//! # Usage
//!
//! ```ignore
//! use watchface_common::log::LogLevel;
//!
//! log.record(LogLevel::Info, now_ms, format_args!("mode -> {:?}", mode));
//! while let Some(entry) = log.pop() {
//!     println!("[{:>6}] {} {}", entry.timestamp_ms, entry.level.prefix(), entry.message);
//! }
//! ```

use core::fmt::{self, Write};

use heapless::String;

/// Maximum number of log entries to keep.
pub const LOG_ENTRIES: usize = 16;

/// Maximum characters per log message.
pub const LOG_MSG_LEN: usize = 40;

/// Log severity level.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LogLevel {
    /// Verbose debugging
    Trace = 0,
    /// Debug information
    Debug = 1,
    /// Normal operation
    #[default]
    Info = 2,
    /// Warnings
    Warn = 3,
    /// Errors
    Error = 4,
}

impl LogLevel {
    /// Get the single-character prefix for this level.
    pub const fn prefix(self) -> char {
        match self {
            Self::Trace => 'T',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
        }
    }
}

/// A single log entry with level, message, and timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Log message (truncated to LOG_MSG_LEN).
    pub message: String<LOG_MSG_LEN>,
    /// Milliseconds on the watchface clock.
    pub timestamp_ms: u64,
}

impl LogEntry {
    /// Create a new log entry, truncating the formatted message to fit.
    pub fn new(
        level: LogLevel,
        args: fmt::Arguments<'_>,
        timestamp_ms: u64,
    ) -> Self {
        let mut message: String<LOG_MSG_LEN> = String::new();
        Truncating(&mut message).write_fmt(args).ok();
        Self {
            level,
            message,
            timestamp_ms,
        }
    }
}

/// Writer that silently drops whatever no longer fits.
struct Truncating<'a>(&'a mut String<LOG_MSG_LEN>);

impl Write for Truncating<'_> {
    fn write_str(
        &mut self,
        s: &str,
    ) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Circular buffer of log entries. The oldest entry is dropped when full.
pub struct LogBuffer {
    entries: [Option<LogEntry>; LOG_ENTRIES],
    head: usize, // Next write position
    count: usize,
    dropped: u32,
}

impl LogBuffer {
    /// Create a new empty log buffer.
    pub const fn new() -> Self {
        Self {
            entries: [const { None }; LOG_ENTRIES],
            head: 0,
            count: 0,
            dropped: 0,
        }
    }

    /// Push a new log entry. Oldest entry is dropped if buffer is full.
    pub fn push(
        &mut self,
        entry: LogEntry,
    ) {
        if self.count == LOG_ENTRIES {
            self.dropped = self.dropped.saturating_add(1);
        } else {
            self.count += 1;
        }
        self.entries[self.head] = Some(entry);
        self.head = (self.head + 1) % LOG_ENTRIES;
    }

    /// Format and push a message.
    pub fn record(
        &mut self,
        level: LogLevel,
        timestamp_ms: u64,
        args: fmt::Arguments<'_>,
    ) {
        self.push(LogEntry::new(level, args, timestamp_ms));
    }

    /// Remove and return the oldest entry.
    pub fn pop(&mut self) -> Option<LogEntry> {
        if self.count == 0 {
            return None;
        }
        let tail = (self.head + LOG_ENTRIES - self.count) % LOG_ENTRIES;
        self.count -= 1;
        self.entries[tail].take()
    }

    #[inline]
    pub const fn len(&self) -> usize { self.count }

    #[inline]
    pub const fn is_empty(&self) -> bool { self.count == 0 }

    /// Entries overwritten since the last call. Resets the counter.
    pub fn take_dropped(&mut self) -> u32 { core::mem::take(&mut self.dropped) }

    /// Iterate over entries from oldest to newest without removing them.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        let start = (self.head + LOG_ENTRIES - self.count) % LOG_ENTRIES;
        (0..self.count).filter_map(move |i| self.entries[(start + i) % LOG_ENTRIES].as_ref())
    }
}

impl Default for LogBuffer {
    fn default() -> Self { Self::new() }
}
