//! Scan bar animation.
//!
//! The inverter layer is a horizontal band sweeping down the TV screen. Each
//! tick it either grows (while parked at the top), slides one row down, and
//! once past [`BAR_SHRINK_Y`] it shrinks until it wraps back to the top:
//!
//! ```text
//! tick   0..30   grow    y = 42,      h 0 -> 30
//! tick  31..116  slide   y 43 -> 128, h shrinks from y = 100
//! tick 117       wrap    y = 42,      h = 0
//! ```

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::config::{BAR_SHRINK_Y, BAR_START_Y, BAR_WIDTH, BAR_WRAP_Y, INVERTER_FRAME};

/// Ticks in one full sweep, including the wrapping tick.
pub const BAR_CYCLE_TICKS: u32 = BAR_WIDTH + (BAR_WRAP_Y - BAR_START_Y) as u32 + 1;

/// Position and height of the inverter band.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BarAnimator {
    y: i32,
    height: u32,
}

impl BarAnimator {
    pub const fn new() -> Self {
        Self {
            y: BAR_START_Y,
            height: 0,
        }
    }

    /// Top edge of the band.
    #[inline]
    pub const fn y(&self) -> i32 { self.y }

    #[inline]
    pub const fn height(&self) -> u32 { self.height }

    /// Advance one tick and return the new inverter frame.
    pub fn step(&mut self) -> Rectangle {
        if self.height < BAR_WIDTH && self.y == BAR_START_Y {
            self.height += 1;
        } else {
            self.y += 1;
        }

        if self.y > BAR_SHRINK_Y {
            self.height = self.height.saturating_sub(1);
        }
        if self.y > BAR_WRAP_Y {
            self.y = BAR_START_Y;
        }

        self.frame()
    }

    /// Current inverter frame; x and width follow the TV screen.
    pub fn frame(&self) -> Rectangle {
        Rectangle::new(
            Point::new(INVERTER_FRAME.top_left.x, self.y),
            Size::new(INVERTER_FRAME.size.width, self.height),
        )
    }
}

impl Default for BarAnimator {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_collapsed_at_top() {
        let bar = BarAnimator::new();
        assert_eq!(bar.frame(), INVERTER_FRAME);
    }

    #[test]
    fn test_grows_for_bar_width_ticks() {
        let mut bar = BarAnimator::new();
        for expected in 1..=BAR_WIDTH {
            bar.step();
            assert_eq!(bar.y(), BAR_START_Y);
            assert_eq!(bar.height(), expected);
        }
        bar.step();
        assert_eq!(bar.y(), BAR_START_Y + 1);
        assert_eq!(bar.height(), BAR_WIDTH);
    }

    #[test]
    fn test_full_cycle_tick_count() {
        assert_eq!(BAR_CYCLE_TICKS, 117);

        let mut bar = BarAnimator::new();
        for _ in 0..30 {
            bar.step();
        }
        for _ in 0..86 {
            bar.step();
        }
        assert_eq!(bar.y(), BAR_WRAP_Y);
        assert_eq!(bar.height(), 1);

        bar.step();
        assert_eq!(bar.y(), BAR_START_Y);
        assert_eq!(bar.height(), 0);
        assert_eq!(bar, BarAnimator::new());
    }

    #[test]
    fn test_bounds_hold_over_many_cycles() {
        let mut bar = BarAnimator::new();
        for _ in 0..(BAR_CYCLE_TICKS * 5 + 13) {
            let frame = bar.step();
            assert!(frame.size.height <= BAR_WIDTH);
            assert!((BAR_START_Y..=BAR_WRAP_Y).contains(&frame.top_left.y));
        }
    }

    #[test]
    fn test_shrinks_after_shrink_row() {
        let mut bar = BarAnimator::new();
        while bar.y() <= BAR_SHRINK_Y {
            bar.step();
        }
        let height = bar.height();
        assert_eq!(height, BAR_WIDTH - 1);
        bar.step();
        assert_eq!(bar.height(), height - 1);
    }
}
