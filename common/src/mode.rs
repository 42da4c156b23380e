//! Idle / Active display mode.
//!
//! Layer visibility is derived from the mode in one place, so the inverter
//! bar and the time view can never be shown together.

use crate::layers::{LayerId, LayerTree};

/// Which view the watchface is showing.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Scan bar sweeping over the static, time hidden.
    #[default]
    Idle,
    /// Time on a white screen, scan bar hidden.
    Active,
}

/// Visibility of the mode-dependent layers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LayerVisibility {
    pub inverter: bool,
    pub screen_on: bool,
    pub time: bool,
}

impl DisplayMode {
    pub const fn visibility(self) -> LayerVisibility {
        let active = matches!(self, Self::Active);
        LayerVisibility {
            inverter: !active,
            screen_on: active,
            time: active,
        }
    }

    /// Show and hide layers for this mode.
    pub fn apply(
        self,
        tree: &mut LayerTree,
    ) {
        let visible = self.visibility();
        tree.set_hidden(LayerId::Inverter, !visible.inverter);
        tree.set_hidden(LayerId::ScreenOn, !visible.screen_on);
        tree.set_hidden(LayerId::Time, !visible.time);
    }
}
