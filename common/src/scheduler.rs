//! Cooperative timer scheduler.
//!
//! All watchface timing runs through one [`Scheduler`] polled from the
//! platform's event loop:
//!
//! ```ignore
//! loop {
//!     // sleep until scheduler.next_deadline() or a motion event
//!     while let Some(handle) = scheduler.pop_due(now_ms) {
//!         dispatch(handle.kind());
//!     }
//! }
//! ```
//!
//! Repeating timers are re-armed by the scheduler itself when they fire, so a
//! periodic task cannot stop because a callback forgot to re-register. Running
//! out of timer slots is reported as [`ScheduleError::Full`].

use core::fmt;

use heapless::Vec;

use crate::config::MAX_TIMERS;

/// What a timer is for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerKind {
    /// Advance the scan bar.
    BarTick,
    /// Refresh the time text.
    ClockTick,
    /// Return from the time view to idle.
    Revert,
}

/// Identifies one armed timer. Stale handles are harmless to cancel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerHandle {
    kind: TimerKind,
    seq: u32,
}

impl TimerHandle {
    #[inline]
    pub const fn kind(&self) -> TimerKind { self.kind }
}

/// Reasons a timer could not be armed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    /// All timer slots are in use.
    Full,
    /// A repeating timer needs a non-zero interval.
    ZeroInterval,
}

impl fmt::Display for ScheduleError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Full => write!(f, "timer slots exhausted ({MAX_TIMERS})"),
            Self::ZeroInterval => write!(f, "repeating timer with zero interval"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    handle: TimerHandle,
    deadline_ms: u64,
    interval_ms: Option<u32>,
}

/// Fixed-capacity set of pending one-shot and repeating timers.
pub struct Scheduler {
    entries: Vec<Entry, MAX_TIMERS>,
    next_seq: u32,
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Fire once, `delay_ms` after `now_ms`.
    pub fn schedule_once(
        &mut self,
        kind: TimerKind,
        delay_ms: u32,
        now_ms: u64,
    ) -> Result<TimerHandle, ScheduleError> {
        self.insert(kind, now_ms + u64::from(delay_ms), None)
    }

    /// Fire every `interval_ms`, first time `interval_ms` after `now_ms`.
    pub fn schedule_repeating(
        &mut self,
        kind: TimerKind,
        interval_ms: u32,
        now_ms: u64,
    ) -> Result<TimerHandle, ScheduleError> {
        if interval_ms == 0 {
            return Err(ScheduleError::ZeroInterval);
        }
        self.insert(kind, now_ms + u64::from(interval_ms), Some(interval_ms))
    }

    fn insert(
        &mut self,
        kind: TimerKind,
        deadline_ms: u64,
        interval_ms: Option<u32>,
    ) -> Result<TimerHandle, ScheduleError> {
        let handle = TimerHandle {
            kind,
            seq: self.next_seq,
        };
        self.entries
            .push(Entry {
                handle,
                deadline_ms,
                interval_ms,
            })
            .map_err(|_| ScheduleError::Full)?;
        self.next_seq = self.next_seq.wrapping_add(1);
        Ok(handle)
    }

    /// Cancel one timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(
        &mut self,
        handle: TimerHandle,
    ) -> bool {
        match self.entries.iter().position(|e| e.handle == handle) {
            Some(idx) => {
                self.entries.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer of one kind. Returns how many were removed.
    pub fn cancel_kind(
        &mut self,
        kind: TimerKind,
    ) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle.kind != kind);
        before - self.entries.len()
    }

    /// Cancel everything. Returns how many timers were pending.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Earliest pending deadline, if any timer is armed.
    pub fn next_deadline(&self) -> Option<u64> { self.entries.iter().map(|e| e.deadline_ms).min() }

    /// Number of armed timers of one kind.
    pub fn pending(
        &self,
        kind: TimerKind,
    ) -> usize {
        self.entries.iter().filter(|e| e.handle.kind == kind).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Take the earliest timer due at `now_ms`.
    ///
    /// One-shot timers are removed; repeating timers move to their next
    /// deadline. If the loop fell more than a full interval behind, the next
    /// deadline is measured from `now_ms` instead of replaying missed ticks.
    pub fn pop_due(
        &mut self,
        now_ms: u64,
    ) -> Option<TimerHandle> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline_ms <= now_ms)
            .min_by_key(|(_, e)| (e.deadline_ms, e.handle.seq))
            .map(|(idx, _)| idx)?;

        let entry = &mut self.entries[idx];
        let handle = entry.handle;
        match entry.interval_ms {
            Some(interval) => {
                let next = entry.deadline_ms + u64::from(interval);
                // A tick landing exactly on `now_ms` is still due, only older ones are skipped
                entry.deadline_ms = if next >= now_ms { next } else { now_ms + u64::from(interval) };
            }
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some(handle)
    }
}

impl Default for Scheduler {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once_at_deadline() {
        let mut sched = Scheduler::new();
        let handle = sched.schedule_once(TimerKind::Revert, 3_000, 1_000).unwrap();
        assert_eq!(sched.next_deadline(), Some(4_000));
        assert_eq!(sched.pop_due(3_999), None);
        assert_eq!(sched.pop_due(4_000), Some(handle));
        assert_eq!(sched.pop_due(10_000), None);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_repeating_rearms_without_drift() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(TimerKind::BarTick, 71, 0).unwrap();
        let mut fired = 0;
        for now in 0..=710u64 {
            while sched.pop_due(now).is_some() {
                fired += 1;
            }
        }
        assert_eq!(fired, 10);
        assert_eq!(sched.next_deadline(), Some(781));
    }

    #[test]
    fn test_repeating_skips_missed_ticks() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(TimerKind::BarTick, 100, 0).unwrap();
        assert!(sched.pop_due(1_050).is_some());
        assert_eq!(sched.pop_due(1_050), None);
        assert_eq!(sched.next_deadline(), Some(1_150));
    }

    #[test]
    fn test_repeating_keeps_tick_due_exactly_now() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(TimerKind::BarTick, 100, 0).unwrap();
        let mut fired = 0;
        while sched.pop_due(200).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 2);
        assert_eq!(sched.next_deadline(), Some(300));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut sched = Scheduler::new();
        assert_eq!(
            sched.schedule_repeating(TimerKind::ClockTick, 0, 0),
            Err(ScheduleError::ZeroInterval)
        );
    }

    #[test]
    fn test_capacity_exhaustion_is_reported() {
        let mut sched = Scheduler::new();
        for _ in 0..MAX_TIMERS {
            sched.schedule_once(TimerKind::Revert, 10, 0).unwrap();
        }
        assert_eq!(sched.schedule_once(TimerKind::Revert, 10, 0), Err(ScheduleError::Full));
    }

    #[test]
    fn test_due_order_by_deadline_then_arming() {
        let mut sched = Scheduler::new();
        let late = sched.schedule_once(TimerKind::Revert, 50, 0).unwrap();
        let first = sched.schedule_once(TimerKind::ClockTick, 10, 0).unwrap();
        let second = sched.schedule_once(TimerKind::BarTick, 10, 0).unwrap();
        assert_eq!(sched.pop_due(100), Some(first));
        assert_eq!(sched.pop_due(100), Some(second));
        assert_eq!(sched.pop_due(100), Some(late));
    }

    #[test]
    fn test_cancel_is_noop_for_fired_timer() {
        let mut sched = Scheduler::new();
        let handle = sched.schedule_once(TimerKind::Revert, 5, 0).unwrap();
        assert_eq!(sched.pop_due(5), Some(handle));
        assert!(!sched.cancel(handle));
    }

    #[test]
    fn test_cancel_kind_removes_all_of_kind() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(TimerKind::BarTick, 71, 0).unwrap();
        sched.schedule_once(TimerKind::Revert, 3_000, 0).unwrap();
        sched.schedule_once(TimerKind::Revert, 3_000, 500).unwrap();
        assert_eq!(sched.cancel_kind(TimerKind::Revert), 2);
        assert_eq!(sched.pending(TimerKind::Revert), 0);
        assert_eq!(sched.pending(TimerKind::BarTick), 1);
        assert_eq!(sched.cancel_all(), 1);
        assert_eq!(sched.next_deadline(), None);
    }
}
