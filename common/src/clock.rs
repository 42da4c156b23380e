//! Wall-clock time and the time text shown on the TV screen.
//!
//! The watchface never owns a real-time clock. Platforms supply a
//! [`WallTime`] (the simulator from the system clock, the firmware from a
//! [`SoftClock`] anchored at build time) and [`format_time`] turns it into
//! the text written to the time layer.

use core::fmt::Write;

use heapless::String;

use crate::config::TIME_TEXT_LEN;

/// Seconds in one day.
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Hour display convention.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourFormat {
    /// "09:05", "23:59"
    #[default]
    H24,
    /// "9:05", "12:00"
    H12,
}

/// Hour and minute of the local day.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
}

impl WallTime {
    /// Create a wall time, wrapping out-of-range values into the day.
    pub const fn new(
        hour: u8,
        minute: u8,
    ) -> Self {
        Self {
            hour: ((hour as u16 + minute as u16 / 60) % 24) as u8,
            minute: minute % 60,
        }
    }

    /// Wall time for a number of seconds since local midnight (any day).
    pub const fn from_seconds(seconds: u64) -> Self {
        let of_day = seconds % SECONDS_PER_DAY;
        Self {
            hour: (of_day / 3600) as u8,
            minute: ((of_day % 3600) / 60) as u8,
        }
    }
}

/// Time text as stored in the time layer.
pub type TimeText = String<TIME_TEXT_LEN>;

/// Format a wall time as hour:minute.
pub fn format_time(
    time: WallTime,
    format: HourFormat,
) -> TimeText {
    let mut text = TimeText::new();
    // "12:34" always fits in TIME_TEXT_LEN, so the write cannot fail
    match format {
        HourFormat::H24 => write!(text, "{:02}:{:02}", time.hour, time.minute).ok(),
        HourFormat::H12 => {
            let hour = match time.hour % 12 {
                0 => 12,
                h => h,
            };
            write!(text, "{}:{:02}", hour, time.minute).ok()
        }
    };
    text
}

/// Software clock anchored to a known wall time at a known uptime.
///
/// Used on targets without a battery-backed RTC: the firmware anchors it at
/// boot and reads it with the monotonic uptime.
#[derive(Clone, Copy, Debug)]
pub struct SoftClock {
    anchor_seconds: u64,
    anchor_uptime_ms: u64,
}

impl SoftClock {
    /// Anchor the clock: at `uptime_ms` the local time was `seconds_of_day`.
    pub const fn new(
        seconds_of_day: u64,
        uptime_ms: u64,
    ) -> Self {
        Self {
            anchor_seconds: seconds_of_day % SECONDS_PER_DAY,
            anchor_uptime_ms: uptime_ms,
        }
    }

    /// Wall time at the given uptime. Uptimes before the anchor read as the anchor.
    pub const fn time_at(
        &self,
        uptime_ms: u64,
    ) -> WallTime {
        let elapsed_ms = uptime_ms.saturating_sub(self.anchor_uptime_ms);
        WallTime::from_seconds(self.anchor_seconds + elapsed_ms / 1000)
    }
}

/// Parse a `HH:MM` or `HH:MM:SS` string into seconds since midnight.
///
/// Used to anchor [`SoftClock`] from a build-time timestamp.
pub fn parse_seconds_of_day(text: &str) -> Option<u64> {
    let mut parts = text.trim().split(':');
    let hour: u64 = parts.next()?.parse().ok()?;
    let minute: u64 = parts.next()?.parse().ok()?;
    let second: u64 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    Some(hour * 3600 + minute * 60 + second)
}
