//! Watchface lifecycle and event dispatch.
//!
//! [`Watchface`] owns every piece of state: the layer tree, the images, the
//! three timers and the display mode. Platforms drive it from one loop:
//!
//! ```ignore
//! let mut face = Watchface::start(&mut host, WatchfaceConfig::new(), now_ms())?;
//! let mut fb = Framebuffer::new();
//! loop {
//!     // wait for face.next_deadline() or a motion event
//!     if let Some(event) = motion { face.handle_motion(event, now_ms())?; }
//!     face.poll(&mut host, now_ms())?;
//!     if face.render(&mut fb) { fb.draw_into(&mut display, offset, white, black).ok(); }
//! }
//! let report = face.shutdown(&mut host, now_ms());
//! ```
//!
//! Errors are returned to the platform and also recorded in the watchface's
//! [`LogBuffer`].

use core::fmt;

use crate::bar::BarAnimator;
use crate::clock::{WallTime, format_time};
use crate::config::{RevertPolicy, WatchfaceConfig};
use crate::layers::{LAYER_COUNT, LayerId, LayerTree};
use crate::log::{LogBuffer, LogLevel};
use crate::mode::DisplayMode;
use crate::motion::MotionEvent;
use crate::render::Framebuffer;
use crate::resources::Resources;
use crate::scheduler::{ScheduleError, Scheduler, TimerHandle, TimerKind};

// =============================================================================
// Platform Boundary
// =============================================================================

/// Services the platform provides to the watchface.
pub trait Host {
    /// Current local time of day.
    fn wall_time(&mut self) -> WallTime;

    /// Seed for the static noise pattern.
    fn entropy(&mut self) -> u32;

    /// Show the watchface window.
    fn push_window(
        &mut self,
        animated: bool,
    );

    /// Take the watchface window down.
    fn remove_window(
        &mut self,
        animated: bool,
    );

    /// Start delivering motion events.
    fn subscribe_motion(&mut self);

    /// Stop delivering motion events.
    fn unsubscribe_motion(&mut self);
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchfaceError {
    /// A timer could not be armed.
    Schedule(ScheduleError),
    /// The watchface has been shut down.
    NotRunning,
}

impl From<ScheduleError> for WatchfaceError {
    fn from(err: ScheduleError) -> Self { Self::Schedule(err) }
}

impl fmt::Display for WatchfaceError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Schedule(err) => write!(f, "scheduling failed: {err}"),
            Self::NotRunning => write!(f, "watchface is not running"),
        }
    }
}

/// What a call to [`Watchface::shutdown`] released.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShutdownReport {
    pub timers_cancelled: usize,
    pub layers_destroyed: usize,
    pub images_released: usize,
    /// `true` when an earlier call already tore everything down.
    pub already_shut_down: bool,
}

// =============================================================================
// Watchface
// =============================================================================

/// The running watchface.
pub struct Watchface {
    config: WatchfaceConfig,
    scheduler: Scheduler,
    bar_timer: Option<TimerHandle>,
    clock_timer: Option<TimerHandle>,
    revert_timer: Option<TimerHandle>,
    layers: Option<LayerTree>,
    resources: Option<Resources>,
    bar: BarAnimator,
    mode: DisplayMode,
    subscribed: bool,
    running: bool,
    log: LogBuffer,
}

impl Watchface {
    /// Allocate resources, arm the repeating timers, build the window and
    /// subscribe to motion.
    pub fn start<H: Host>(
        host: &mut H,
        config: WatchfaceConfig,
        now_ms: u64,
    ) -> Result<Self, WatchfaceError> {
        let mut log = LogBuffer::new();
        let seed = host.entropy();

        let mut scheduler = Scheduler::new();
        let bar_timer = scheduler.schedule_repeating(TimerKind::BarTick, config.bar_tick_ms, now_ms);
        let clock_timer = scheduler.schedule_repeating(TimerKind::ClockTick, config.clock_tick_ms, now_ms);
        let (bar_timer, clock_timer) = match (bar_timer, clock_timer) {
            (Ok(bar), Ok(clock)) => (bar, clock),
            (Err(err), _) | (_, Err(err)) => {
                log.record(LogLevel::Error, now_ms, format_args!("start: {err}"));
                return Err(err.into());
            }
        };

        host.push_window(false);

        let resources = Resources::load(seed);
        let mut layers = LayerTree::new();
        layers.set_text(LayerId::Time, &format_time(host.wall_time(), config.hour_format));
        DisplayMode::Idle.apply(&mut layers);

        host.subscribe_motion();

        log.record(
            LogLevel::Info,
            now_ms,
            format_args!("started, seed {seed:08x}"),
        );

        Ok(Self {
            config,
            scheduler,
            bar_timer: Some(bar_timer),
            clock_timer: Some(clock_timer),
            revert_timer: None,
            layers: Some(layers),
            resources: Some(resources),
            bar: BarAnimator::new(),
            mode: DisplayMode::Idle,
            subscribed: true,
            running: true,
            log,
        })
    }

    /// Earliest time [`Self::poll`] has work to do.
    #[inline]
    pub fn next_deadline(&self) -> Option<u64> { self.scheduler.next_deadline() }

    /// Run every timer due at `now_ms`. Returns how many fired.
    pub fn poll<H: Host>(
        &mut self,
        host: &mut H,
        now_ms: u64,
    ) -> Result<usize, WatchfaceError> {
        if !self.running {
            return Err(WatchfaceError::NotRunning);
        }

        let mut fired = 0;
        while let Some(handle) = self.scheduler.pop_due(now_ms) {
            fired += 1;
            match handle.kind() {
                TimerKind::BarTick => self.advance_bar(),
                TimerKind::ClockTick => self.refresh_time(host, now_ms),
                TimerKind::Revert => self.revert(handle, now_ms),
            }
        }
        Ok(fired)
    }

    /// Feed one motion event. Returns `true` if it switched to (or extended)
    /// the time view.
    pub fn handle_motion(
        &mut self,
        event: MotionEvent,
        now_ms: u64,
    ) -> Result<bool, WatchfaceError> {
        if !self.subscribed {
            return Ok(false);
        }
        if !self.config.motion_filter.accepts(event) {
            self.log.record(LogLevel::Trace, now_ms, format_args!("ignored {:?}", event.axis));
            return Ok(false);
        }

        if self.config.revert_policy == RevertPolicy::Restart
            && let Some(pending) = self.revert_timer.take()
        {
            self.scheduler.cancel(pending);
        }

        let handle = match self
            .scheduler
            .schedule_once(TimerKind::Revert, self.config.active_duration_ms, now_ms)
        {
            Ok(handle) => handle,
            Err(err) => {
                self.log.record(LogLevel::Error, now_ms, format_args!("revert: {err}"));
                return Err(err.into());
            }
        };
        self.revert_timer = Some(handle);

        self.set_mode(DisplayMode::Active, now_ms);
        Ok(true)
    }

    /// Compose into `fb` if anything changed since the last render.
    pub fn render(
        &mut self,
        fb: &mut Framebuffer,
    ) -> bool {
        let (Some(layers), Some(resources)) = (self.layers.as_mut(), self.resources.as_ref()) else {
            return false;
        };
        if !layers.take_dirty() {
            return false;
        }
        fb.compose(layers, resources);
        true
    }

    /// Tear everything down. Safe to call more than once.
    pub fn shutdown<H: Host>(
        &mut self,
        host: &mut H,
        now_ms: u64,
    ) -> ShutdownReport {
        if !self.running {
            return ShutdownReport {
                already_shut_down: true,
                ..ShutdownReport::default()
            };
        }
        self.running = false;

        if self.subscribed {
            host.unsubscribe_motion();
            self.subscribed = false;
        }

        let mut timers_cancelled = [self.bar_timer.take(), self.clock_timer.take(), self.revert_timer.take()]
            .into_iter()
            .flatten()
            .filter(|handle| self.scheduler.cancel(*handle))
            .count();
        // Overlapping revert timers have no stored handle
        timers_cancelled += self.scheduler.cancel_kind(TimerKind::Revert);
        let stray = self.scheduler.cancel_all();
        if stray > 0 {
            self.log
                .record(LogLevel::Warn, now_ms, format_args!("shutdown: {stray} untracked timers"));
            timers_cancelled += stray;
        }

        let layers_destroyed = self.layers.take().map_or(0, |_| LAYER_COUNT);
        let images_released = self.resources.take().map_or(0, |_| Resources::IMAGE_COUNT);

        host.remove_window(false);

        self.log.record(
            LogLevel::Info,
            now_ms,
            format_args!("shutdown: {timers_cancelled} timers"),
        );

        ShutdownReport {
            timers_cancelled,
            layers_destroyed,
            images_released,
            already_shut_down: false,
        }
    }

    // -------------------------------------------------------------------------
    // Timer handlers
    // -------------------------------------------------------------------------

    fn advance_bar(&mut self) {
        let frame = self.bar.step();
        if let Some(layers) = self.layers.as_mut() {
            layers.set_frame(LayerId::Inverter, frame);
            layers.mark_dirty(LayerId::Static);
        }
    }

    fn refresh_time<H: Host>(
        &mut self,
        host: &mut H,
        now_ms: u64,
    ) {
        let text = format_time(host.wall_time(), self.config.hour_format);
        if let Some(layers) = self.layers.as_mut() {
            layers.set_text(LayerId::Time, &text);
        }
        self.log.record(LogLevel::Debug, now_ms, format_args!("time {text}"));
    }

    fn revert(
        &mut self,
        handle: TimerHandle,
        now_ms: u64,
    ) {
        if self.revert_timer == Some(handle) {
            self.revert_timer = None;
        }
        self.set_mode(DisplayMode::Idle, now_ms);
    }

    fn set_mode(
        &mut self,
        mode: DisplayMode,
        now_ms: u64,
    ) {
        if let Some(layers) = self.layers.as_mut() {
            mode.apply(layers);
        }
        if self.mode != mode {
            self.mode = mode;
            self.log.record(LogLevel::Info, now_ms, format_args!("mode {mode:?}"));
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub const fn mode(&self) -> DisplayMode { self.mode }

    #[inline]
    pub const fn is_running(&self) -> bool { self.running }

    #[inline]
    pub const fn is_subscribed(&self) -> bool { self.subscribed }

    #[inline]
    pub const fn config(&self) -> &WatchfaceConfig { &self.config }

    #[inline]
    pub const fn bar(&self) -> &BarAnimator { &self.bar }

    /// Layer tree, until shutdown destroys it.
    #[inline]
    pub const fn layers(&self) -> Option<&LayerTree> { self.layers.as_ref() }

    /// Text currently in the time layer.
    pub fn time_text(&self) -> Option<&str> { self.layers.as_ref().and_then(|l| l.text(LayerId::Time)) }

    /// Pending revert timers (more than one only with overlapping reverts).
    pub fn pending_reverts(&self) -> usize { self.scheduler.pending(TimerKind::Revert) }

    /// Log entries waiting to be drained by the platform.
    #[inline]
    pub fn log_mut(&mut self) -> &mut LogBuffer { &mut self.log }
}
