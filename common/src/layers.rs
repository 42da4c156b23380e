//! Layer tree of the watchface window.
//!
//! Six layers, all direct children of the window root, composed back to
//! front in [`LayerId::ALL`] order:
//!
//! | Layer      | Kind     | Frame            | Notes                    |
//! |------------|----------|------------------|--------------------------|
//! | Background | bitmap   | 0, 0, 144x168    | TV image, Assign         |
//! | Static     | bitmap   | 14, 42, 115x87   | noise image, Or          |
//! | Inverter   | inverter | 14, 42, 115x0    | animated scan bar        |
//! | ScreenOn   | fill     | 14, 42, 115x87   | white, hidden at start   |
//! | Channel    | text     | 102, 46, 24x14   | "Ch 3", label font       |
//! | Time       | text     | 0, 56, 144x42    | centered, hidden at start|

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::Alignment;
use heapless::String;

use crate::config::{
    BACKGROUND_FRAME, CHANNEL_FRAME, CHANNEL_TEXT, INVERTER_FRAME, SCREEN_ON_FRAME, STATIC_FRAME,
    TIME_FRAME, TIME_TEXT_LEN,
};

/// Number of layers in the tree.
pub const LAYER_COUNT: usize = 6;

/// Layer identity, in back-to-front order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerId {
    Background,
    Static,
    Inverter,
    ScreenOn,
    Channel,
    Time,
}

impl LayerId {
    /// All layers, back to front.
    pub const ALL: [Self; LAYER_COUNT] = [
        Self::Background,
        Self::Static,
        Self::Inverter,
        Self::ScreenOn,
        Self::Channel,
        Self::Time,
    ];

    #[inline]
    const fn index(self) -> usize { self as usize }
}

/// How a bitmap layer combines with what is already drawn.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompositeMode {
    /// Replace destination pixels.
    Assign,
    /// Set destination pixels where the source is set.
    Or,
}

/// Image resources a bitmap layer can show.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageId {
    TvBackground,
    StaticNoise,
}

/// Fonts a text layer can use.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontId {
    /// Large time digits.
    Time,
    /// Small channel label.
    Label,
}

/// Text held by a text layer.
pub type LayerText = String<TIME_TEXT_LEN>;

/// What a layer draws.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LayerKind {
    Bitmap {
        image: ImageId,
        mode: CompositeMode,
    },
    /// Inverts every pixel under the frame.
    Inverter,
    /// Solid color over the frame.
    Fill(BinaryColor),
    /// Black text on an optional opaque background.
    Text {
        text: LayerText,
        font: FontId,
        alignment: Alignment,
        background: Option<BinaryColor>,
    },
}

/// One positioned layer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Layer {
    pub frame: Rectangle,
    pub hidden: bool,
    pub kind: LayerKind,
    dirty: bool,
}

impl Layer {
    fn new(
        frame: Rectangle,
        kind: LayerKind,
    ) -> Self {
        Self {
            frame,
            hidden: false,
            kind,
            dirty: true,
        }
    }

    #[must_use]
    fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// The window's layers, owned as one unit.
#[derive(Clone, Debug)]
pub struct LayerTree {
    layers: [Layer; LAYER_COUNT],
}

impl LayerTree {
    /// Build all six layers with their fixed geometry. Time text starts empty.
    pub fn new() -> Self {
        let mut channel = LayerText::new();
        channel.push_str(CHANNEL_TEXT).ok();

        Self {
            layers: [
                Layer::new(
                    BACKGROUND_FRAME,
                    LayerKind::Bitmap {
                        image: ImageId::TvBackground,
                        mode: CompositeMode::Assign,
                    },
                ),
                Layer::new(
                    STATIC_FRAME,
                    LayerKind::Bitmap {
                        image: ImageId::StaticNoise,
                        mode: CompositeMode::Or,
                    },
                ),
                Layer::new(INVERTER_FRAME, LayerKind::Inverter),
                Layer::new(SCREEN_ON_FRAME, LayerKind::Fill(BinaryColor::On)).hidden(),
                Layer::new(
                    CHANNEL_FRAME,
                    LayerKind::Text {
                        text: channel,
                        font: FontId::Label,
                        alignment: Alignment::Left,
                        background: None,
                    },
                ),
                Layer::new(
                    TIME_FRAME,
                    LayerKind::Text {
                        text: LayerText::new(),
                        font: FontId::Time,
                        alignment: Alignment::Center,
                        background: None,
                    },
                )
                .hidden(),
            ],
        }
    }

    #[inline]
    pub fn get(
        &self,
        id: LayerId,
    ) -> &Layer {
        &self.layers[id.index()]
    }

    /// Layers back to front.
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Layer)> { LayerId::ALL.into_iter().zip(self.layers.iter()) }

    pub fn set_frame(
        &mut self,
        id: LayerId,
        frame: Rectangle,
    ) {
        let layer = &mut self.layers[id.index()];
        if layer.frame != frame {
            layer.frame = frame;
            layer.dirty = true;
        }
    }

    pub fn set_hidden(
        &mut self,
        id: LayerId,
        hidden: bool,
    ) {
        let layer = &mut self.layers[id.index()];
        if layer.hidden != hidden {
            layer.hidden = hidden;
            layer.dirty = true;
        }
    }

    #[inline]
    pub fn is_hidden(
        &self,
        id: LayerId,
    ) -> bool {
        self.layers[id.index()].hidden
    }

    pub fn mark_dirty(
        &mut self,
        id: LayerId,
    ) {
        self.layers[id.index()].dirty = true;
    }

    #[inline]
    pub fn is_dirty(
        &self,
        id: LayerId,
    ) -> bool {
        self.layers[id.index()].dirty
    }

    /// Whether anything needs redrawing. Clears every dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        let mut any = false;
        for layer in &mut self.layers {
            any |= layer.dirty;
            layer.dirty = false;
        }
        any
    }

    /// Replace a text layer's text (truncated to fit). No-op on other kinds.
    pub fn set_text(
        &mut self,
        id: LayerId,
        value: &str,
    ) {
        let layer = &mut self.layers[id.index()];
        if let LayerKind::Text { text, .. } = &mut layer.kind
            && text.as_str() != value
        {
            text.clear();
            for c in value.chars() {
                if text.push(c).is_err() {
                    break;
                }
            }
            layer.dirty = true;
        }
    }

    /// Text of a text layer.
    pub fn text(
        &self,
        id: LayerId,
    ) -> Option<&str> {
        match &self.layers[id.index()].kind {
            LayerKind::Text { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }
}

impl Default for LayerTree {
    fn default() -> Self { Self::new() }
}
