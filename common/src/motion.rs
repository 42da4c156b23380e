//! Wrist motion events and flick detection.
//!
//! A [`MotionEvent`] is an `(axis, direction)` report, the same shape a tap
//! service delivers. The simulator produces them from key presses; the
//! firmware produces them from raw accelerometer samples via [`FlickDetector`].

/// Accelerometer axis.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    #[inline]
    const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// One motion report: which axis moved and in which direction (+1 / -1).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionEvent {
    pub axis: Axis,
    pub direction: i8,
}

impl MotionEvent {
    pub const fn new(
        axis: Axis,
        direction: i8,
    ) -> Self {
        Self { axis, direction }
    }
}

/// Which motion events switch the watchface to the time view.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionFilter {
    /// Every reported event qualifies.
    #[default]
    AnyAxis,
    /// Only wrist flicks (Y axis) and screen taps (Z axis) qualify.
    VerticalFlick,
}

impl MotionFilter {
    /// Whether `event` should show the time.
    #[inline]
    pub const fn accepts(
        self,
        event: MotionEvent,
    ) -> bool {
        match self {
            Self::AnyAxis => true,
            Self::VerticalFlick => matches!(event.axis, Axis::Y | Axis::Z),
        }
    }
}

// =============================================================================
// Flick Detection
// =============================================================================

/// Raw accelerometer reading in sensor counts.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelSample {
    pub accel: [i16; 3],
}

impl AccelSample {
    pub const fn new(
        x: i16,
        y: i16,
        z: i16,
    ) -> Self {
        Self { accel: [x, y, z] }
    }
}

/// Default change (in counts) between consecutive samples that counts as a flick.
/// Roughly 0.3 g at 4096 counts/g (±8 g range).
pub const DEFAULT_FLICK_THRESHOLD: i32 = 1_200;

/// Default quiet period after a detected flick.
pub const DEFAULT_FLICK_COOLDOWN_MS: u64 = 250;

/// Detects sharp single-axis changes in acceleration.
///
/// Works on sample-to-sample deltas, so the constant gravity component on
/// whatever axis points down cancels out. A flick fires when:
/// - the largest per-axis change is at least the threshold,
/// - it is at least twice as large as each of the other two changes,
/// - the cooldown since the previous flick has elapsed.
pub struct FlickDetector {
    threshold: i32,
    cooldown_ms: u64,
    last_sample: Option<AccelSample>,
    last_trigger_ms: Option<u64>,
}

impl FlickDetector {
    pub const fn new(
        threshold: i32,
        cooldown_ms: u64,
    ) -> Self {
        Self {
            threshold,
            cooldown_ms,
            last_sample: None,
            last_trigger_ms: None,
        }
    }

    /// Feed one sample; returns the flick it completes, if any.
    pub fn update(
        &mut self,
        now_ms: u64,
        sample: AccelSample,
    ) -> Option<MotionEvent> {
        let previous = self.last_sample.replace(sample)?;

        if let Some(last) = self.last_trigger_ms
            && now_ms.saturating_sub(last) < self.cooldown_ms
        {
            return None;
        }

        let mut deltas = [0i32; 3];
        for axis in Axis::ALL {
            let i = axis.index();
            deltas[i] = i32::from(sample.accel[i]) - i32::from(previous.accel[i]);
        }

        let dominant = Axis::ALL
            .into_iter()
            .max_by_key(|axis| deltas[axis.index()].abs())
            .unwrap_or(Axis::X);
        let peak = deltas[dominant.index()];

        if peak.abs() < self.threshold {
            return None;
        }

        // Reject multi-axis jolts (the whole wrist moving, not a flick)
        let dominates = Axis::ALL
            .into_iter()
            .filter(|axis| *axis != dominant)
            .all(|axis| peak.abs() >= deltas[axis.index()].abs() * 2);
        if !dominates {
            return None;
        }

        self.last_trigger_ms = Some(now_ms);
        Some(MotionEvent::new(dominant, if peak > 0 { 1 } else { -1 }))
    }
}

impl Default for FlickDetector {
    fn default() -> Self { Self::new(DEFAULT_FLICK_THRESHOLD, DEFAULT_FLICK_COOLDOWN_MS) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REST: AccelSample = AccelSample::new(0, 0, 4096);

    #[test]
    fn test_any_axis_accepts_everything() {
        for axis in Axis::ALL {
            assert!(MotionFilter::AnyAxis.accepts(MotionEvent::new(axis, 1)));
            assert!(MotionFilter::AnyAxis.accepts(MotionEvent::new(axis, -1)));
        }
    }

    #[test]
    fn test_vertical_flick_rejects_x() {
        let filter = MotionFilter::VerticalFlick;
        assert!(!filter.accepts(MotionEvent::new(Axis::X, 1)));
        assert!(filter.accepts(MotionEvent::new(Axis::Y, -1)));
        assert!(filter.accepts(MotionEvent::new(Axis::Z, 1)));
    }

    #[test]
    fn test_first_sample_only_primes() {
        let mut detector = FlickDetector::default();
        assert_eq!(detector.update(0, AccelSample::new(5_000, 0, 0)), None);
    }

    #[test]
    fn test_gravity_alone_is_not_a_flick() {
        let mut detector = FlickDetector::default();
        for t in 0..50 {
            assert_eq!(detector.update(t * 20, REST), None);
        }
    }

    #[test]
    fn test_single_axis_spike_detected_with_direction() {
        let mut detector = FlickDetector::default();
        detector.update(0, REST);
        let event = detector.update(20, AccelSample::new(0, -2_000, 4_096));
        assert_eq!(event, Some(MotionEvent::new(Axis::Y, -1)));
    }

    #[test]
    fn test_small_change_ignored() {
        let mut detector = FlickDetector::default();
        detector.update(0, REST);
        assert_eq!(detector.update(20, AccelSample::new(500, 0, 4_096)), None);
    }

    #[test]
    fn test_multi_axis_jolt_rejected() {
        let mut detector = FlickDetector::default();
        detector.update(0, REST);
        assert_eq!(detector.update(20, AccelSample::new(2_000, 1_500, 4_096)), None);
    }

    #[test]
    fn test_cooldown_suppresses_repeat() {
        let mut detector = FlickDetector::default();
        detector.update(0, REST);
        assert!(detector.update(20, AccelSample::new(2_000, 0, 4_096)).is_some());
        assert_eq!(detector.update(40, REST), None);
        assert_eq!(detector.update(60, AccelSample::new(2_000, 0, 4_096)), None);
        // Swing back still inside the cooldown, then a fresh flick after it
        assert_eq!(detector.update(250, REST), None);
        assert_eq!(
            detector.update(320, AccelSample::new(0, 0, 6_000)),
            Some(MotionEvent::new(Axis::Z, 1))
        );
    }
}
