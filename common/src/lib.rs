//! Shared core of the TV static watchface.
//!
//! Everything that does not touch real hardware lives here and is shared
//! between the desktop simulator and the Pico 2 firmware:
//!
//! - [`app`]: lifecycle, event dispatch and the [`app::Host`] boundary
//! - [`scheduler`]: one-shot and repeating timers
//! - [`layers`]: the six-layer window tree
//! - [`mode`]: Idle / Active visibility
//! - [`bar`]: scan bar animation
//! - [`clock`]: wall time and time text
//! - [`motion`]: motion events and flick detection
//! - [`resources`]: generated images and fonts
//! - [`render`]: layer composition into a 1bpp framebuffer
//! - [`log`]: levelled log ring drained by the platform
//! - [`config`]: constants and behaviour switches
//!
//! # Testing
//!
//! ```bash
//! cargo test -p watchface-common
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`); the firmware links the
//! crate as `no_std`.

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod app;
pub mod bar;
pub mod clock;
pub mod config;
pub mod layers;
pub mod log;
pub mod mode;
pub mod motion;
pub mod render;
pub mod resources;
pub mod scheduler;

// Re-export commonly used items
pub use app::{Host, ShutdownReport, Watchface, WatchfaceError};
pub use config::WatchfaceConfig;
pub use mode::DisplayMode;
pub use motion::{Axis, MotionEvent};
pub use render::Framebuffer;
