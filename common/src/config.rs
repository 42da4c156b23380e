//! Watchface configuration constants.
//!
//! Timings and layer geometry are compile-time constants. Behaviour switches
//! that have more than one sensible answer are selected with cargo features
//! and collected into [`WatchfaceConfig`] so tests can override them.
//!
//! ```text
//!  0,0 ┌────────────────────────┐
//!      │   \    /   (antennae)   │
//!      │ ┌─────────────────┬──┐  │ 42
//!      │ │ static overlay  │Ch│  │
//!      │ │   ░░▓▓▓▓▓▓▓░░   │ 3│  │ <- inverter bar (rows 42..128)
//!      │ │     12:34       └──┘  │ 56..98 time layer
//!      │ └────────────────────┘  │ 129
//!      │      o        o         │
//!      └────────────────────────┘ 144,168
//! ```

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::clock::HourFormat;
use crate::motion::MotionFilter;

// =============================================================================
// Display Configuration
// =============================================================================

/// Watchface width in pixels.
pub const SCREEN_WIDTH: u32 = 144;

/// Watchface height in pixels.
pub const SCREEN_HEIGHT: u32 = 168;

/// Host panel width (ST7789 on Pimoroni PIM715: 320x240)
pub const PANEL_WIDTH: u32 = 320;

/// Host panel height
pub const PANEL_HEIGHT: u32 = 240;

/// Top-left of the watchface, centered on the panel.
pub const FACE_OFFSET: Point = Point::new(
    ((PANEL_WIDTH - SCREEN_WIDTH) / 2) as i32,
    ((PANEL_HEIGHT - SCREEN_HEIGHT) / 2) as i32,
);

// =============================================================================
// Timing Configuration
// =============================================================================

/// Delay between bar position updates. 71 ms gives roughly one sweep every 5-8 s.
pub const BAR_TICK_MS: u32 = 71;

/// Interval between clock text refreshes.
pub const CLOCK_TICK_MS: u32 = 60_000;

/// How long the time stays visible after a wrist flick.
pub const ACTIVE_DURATION_MS: u32 = 3_000;

// =============================================================================
// Bar Animation Geometry
// =============================================================================

/// Thickness of the scan bar in pixels.
pub const BAR_WIDTH: u32 = 30;

/// Top edge where the bar starts growing.
pub const BAR_START_Y: i32 = 12 + BAR_WIDTH as i32;

/// Once the top edge passes this row the bar starts shrinking.
pub const BAR_SHRINK_Y: i32 = 69 + BAR_WIDTH as i32;

/// Once the top edge passes this row the bar wraps back to [`BAR_START_Y`].
pub const BAR_WRAP_Y: i32 = 98 + BAR_WIDTH as i32;

// =============================================================================
// Layer Geometry
// =============================================================================

/// Full-screen TV background.
pub const BACKGROUND_FRAME: Rectangle = Rectangle::new(Point::zero(), Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));

/// TV screen area covered by the static noise image.
pub const STATIC_FRAME: Rectangle = Rectangle::new(Point::new(14, 42), Size::new(115, 87));

/// Inverter bar starts collapsed at the top of the TV screen.
pub const INVERTER_FRAME: Rectangle = Rectangle::new(Point::new(14, BAR_START_Y), Size::new(115, 0));

/// White filler shown behind the time ("screen on").
pub const SCREEN_ON_FRAME: Rectangle = STATIC_FRAME;

/// Channel label in the top-right corner of the TV screen.
pub const CHANNEL_FRAME: Rectangle = Rectangle::new(Point::new(102, 46), Size::new(24, 14));

/// Time text, centered horizontally across the full width.
pub const TIME_FRAME: Rectangle = Rectangle::new(Point::new(0, 56), Size::new(SCREEN_WIDTH, 42));

/// Channel label text.
pub const CHANNEL_TEXT: &str = "Ch 3";

// =============================================================================
// Capacities
// =============================================================================

/// Maximum pending timers (two repeating plus revert timers).
pub const MAX_TIMERS: usize = 8;

/// Capacity of the time text buffer ("12:34" plus headroom).
pub const TIME_TEXT_LEN: usize = 6;

// =============================================================================
// Behaviour Switches
// =============================================================================

/// What happens when motion arrives while the time is already showing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RevertPolicy {
    /// Cancel the pending revert timer and arm a fresh one.
    Restart,
    /// Arm another independent revert timer; the earliest one wins.
    Overlapping,
}

/// Runtime view of the compile-time configuration.
#[derive(Clone, Copy, Debug)]
pub struct WatchfaceConfig {
    pub bar_tick_ms: u32,
    pub clock_tick_ms: u32,
    pub active_duration_ms: u32,
    pub hour_format: HourFormat,
    pub motion_filter: MotionFilter,
    pub revert_policy: RevertPolicy,
}

impl WatchfaceConfig {
    /// Configuration built from the constants and enabled cargo features.
    pub const fn new() -> Self {
        Self {
            bar_tick_ms: BAR_TICK_MS,
            clock_tick_ms: CLOCK_TICK_MS,
            active_duration_ms: ACTIVE_DURATION_MS,
            hour_format: if cfg!(feature = "clock-12h") { HourFormat::H12 } else { HourFormat::H24 },
            motion_filter: if cfg!(feature = "flick-axis-filter") {
                MotionFilter::VerticalFlick
            } else {
                MotionFilter::AnyAxis
            },
            revert_policy: if cfg!(feature = "overlapping-revert") {
                RevertPolicy::Overlapping
            } else {
                RevertPolicy::Restart
            },
        }
    }

    #[must_use]
    pub const fn with_hour_format(
        mut self,
        hour_format: HourFormat,
    ) -> Self {
        self.hour_format = hour_format;
        self
    }

    #[must_use]
    pub const fn with_motion_filter(
        mut self,
        motion_filter: MotionFilter,
    ) -> Self {
        self.motion_filter = motion_filter;
        self
    }

    #[must_use]
    pub const fn with_revert_policy(
        mut self,
        revert_policy: RevertPolicy,
    ) -> Self {
        self.revert_policy = revert_policy;
        self
    }
}

impl Default for WatchfaceConfig {
    fn default() -> Self { Self::new() }
}
