//! Layer composition into a 1bpp framebuffer.
//!
//! The inverter layer flips whatever lies beneath it, so layers are composed
//! into an owned [`Framebuffer`] first and only then pushed to the display.
//! Platforms map the two colors to their own pixel format in
//! [`Framebuffer::draw_into`].

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PointsIter, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::layers::{CompositeMode, Layer, LayerKind, LayerTree};
use crate::resources::{ImageView, Resources, ScreenBitmap, text_style};

/// Composed watchface image.
pub struct Framebuffer {
    bitmap: ScreenBitmap,
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self {
            bitmap: ScreenBitmap::new(SCREEN_WIDTH, SCREEN_HEIGHT),
        }
    }

    /// Screen bounds.
    #[inline]
    pub fn bounds(&self) -> Rectangle { self.bitmap.bounding_box() }

    #[inline]
    pub fn pixel(
        &self,
        point: Point,
    ) -> BinaryColor {
        if self.bitmap.pixel(point.x, point.y) { BinaryColor::On } else { BinaryColor::Off }
    }

    /// Draw every layer back to front, skipping hidden ones.
    pub fn compose(
        &mut self,
        tree: &LayerTree,
        resources: &Resources,
    ) {
        self.bitmap.fill(false);
        for (_, layer) in tree.iter() {
            if layer.hidden {
                continue;
            }
            self.draw_layer(layer, resources);
        }
    }

    fn draw_layer(
        &mut self,
        layer: &Layer,
        resources: &Resources,
    ) {
        let frame = layer.frame.intersection(&self.bounds());

        match &layer.kind {
            LayerKind::Bitmap { image, mode } => {
                self.blit(resources.image(*image), layer.frame, *mode);
            }
            LayerKind::Inverter => {
                for point in frame.points() {
                    self.bitmap.invert_pixel(point.x, point.y);
                }
            }
            LayerKind::Fill(color) => {
                frame.into_styled(PrimitiveStyle::with_fill(*color)).draw(&mut self.bitmap).ok();
            }
            LayerKind::Text {
                text,
                font,
                alignment,
                background,
            } => {
                if let Some(color) = background {
                    frame.into_styled(PrimitiveStyle::with_fill(*color)).draw(&mut self.bitmap).ok();
                }
                let top = layer.frame.top_left.y;
                let anchor = match alignment {
                    Alignment::Left => layer.frame.top_left,
                    Alignment::Center => Point::new(layer.frame.center().x, top),
                    Alignment::Right => Point::new(layer.frame.top_left.x + layer.frame.size.width as i32 - 1, top),
                };
                let style = TextStyleBuilder::new()
                    .alignment(*alignment)
                    .baseline(Baseline::Top)
                    .build();
                Text::with_text_style(text.as_str(), anchor, text_style(*font), style)
                    .draw(&mut self.bitmap.clipped(&layer.frame))
                    .ok();
            }
        }
    }

    /// Copy an image into `frame`, clipped to the smaller of the two.
    fn blit(
        &mut self,
        image: ImageView<'_>,
        frame: Rectangle,
        mode: CompositeMode,
    ) {
        let width = image.size().width.min(frame.size.width);
        let height = image.size().height.min(frame.size.height);

        for y in 0..height {
            for x in 0..width {
                let on = image.pixel(x, y);
                let dx = frame.top_left.x + x as i32;
                let dy = frame.top_left.y + y as i32;
                match mode {
                    CompositeMode::Assign => self.bitmap.set_pixel(dx, dy, on),
                    CompositeMode::Or => {
                        if on {
                            self.bitmap.set_pixel(dx, dy, true);
                        }
                    }
                }
            }
        }
    }

    /// Push the framebuffer to a display at `offset`, mapping white to `on`
    /// and black to `off`.
    pub fn draw_into<D, C>(
        &self,
        target: &mut D,
        offset: Point,
        on: C,
        off: C,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = C>,
        C: PixelColor,
    {
        let area = Rectangle::new(offset, self.bitmap.size());
        let bitmap = &self.bitmap;
        let colors = (0..SCREEN_HEIGHT as i32).flat_map(move |y| {
            (0..SCREEN_WIDTH as i32).map(move |x| if bitmap.pixel(x, y) { on } else { off })
        });
        target.fill_contiguous(&area, colors)
    }
}

impl Default for Framebuffer {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CHANNEL_FRAME, STATIC_FRAME, TIME_FRAME};
    use crate::layers::LayerId;
    use crate::mode::DisplayMode;
    use crate::resources::StaticBitmap;

    fn white_in(
        fb: &Framebuffer,
        area: Rectangle,
    ) -> usize {
        area.points().filter(|p| fb.pixel(*p).is_on()).count()
    }

    #[test]
    fn test_hidden_layers_are_skipped() {
        let res = Resources::load(3);
        let tree = LayerTree::new();
        let mut fb = Framebuffer::new();
        fb.compose(&tree, &res);
        // Screen-on filler hidden: static leaves some of the screen black
        let screen = Rectangle::new(Point::new(20, 62), Size::new(40, 40));
        let white = white_in(&fb, screen);
        assert!(white > 0 && white < 1600);
    }

    #[test]
    fn test_static_is_ored_over_background() {
        let res = Resources::load(3);
        let mut tree = LayerTree::new();
        tree.set_hidden(LayerId::Inverter, true);
        let mut fb = Framebuffer::new();
        fb.compose(&tree, &res);

        let noise = res.image(crate::layers::ImageId::StaticNoise);
        let mut mismatches = 0;
        for y in 10..70u32 {
            for x in 10..60u32 {
                let expected = noise.pixel(x, y);
                let got = fb.pixel(STATIC_FRAME.top_left + Point::new(x as i32, y as i32)).is_on();
                if expected != got {
                    mismatches += 1;
                }
            }
        }
        // Screen interior is black, so the result equals the noise
        assert_eq!(mismatches, 0);
        // Channel plate below the label text stays white under Or
        let plate_row = Rectangle::new(CHANNEL_FRAME.top_left + Point::new(0, 13), Size::new(24, 1));
        assert_eq!(white_in(&fb, plate_row), 24);
    }

    #[test]
    fn test_inverter_flips_band() {
        let res = Resources::load(9);
        let mut tree = LayerTree::new();
        tree.set_hidden(LayerId::Inverter, true);
        let mut plain = Framebuffer::new();
        plain.compose(&tree, &res);

        let band = Rectangle::new(Point::new(14, 70), Size::new(115, 10));
        tree.set_frame(LayerId::Inverter, band);
        tree.set_hidden(LayerId::Inverter, false);
        let mut inverted = Framebuffer::new();
        inverted.compose(&tree, &res);

        for point in band.points() {
            assert_ne!(plain.pixel(point), inverted.pixel(point));
        }
        let outside = Point::new(20, 100);
        assert_eq!(plain.pixel(outside), inverted.pixel(outside));
    }

    #[test]
    fn test_active_mode_shows_black_time_on_white() {
        let res = Resources::load(5);
        let mut tree = LayerTree::new();
        tree.set_text(LayerId::Time, "12:34");
        DisplayMode::Active.apply(&mut tree);
        let mut fb = Framebuffer::new();
        fb.compose(&tree, &res);

        let time_area = TIME_FRAME.intersection(&STATIC_FRAME);
        let black = time_area.points().filter(|p| !fb.pixel(*p).is_on()).count();
        assert!(black > 0);
        // Screen below the time text is plain white filler
        let below = Rectangle::new(Point::new(20, 110), Size::new(100, 15));
        assert_eq!(white_in(&fb, below), 1500);
    }

    #[test]
    fn test_text_is_clipped_to_frame() {
        let res = Resources::load(5);
        let mut tree = LayerTree::new();
        tree.set_text(LayerId::Time, "88:88");
        DisplayMode::Active.apply(&mut tree);
        let mut fb = Framebuffer::new();
        fb.compose(&tree, &res);
        // Row just below the time frame is still filler white
        let row = Rectangle::new(Point::new(14, TIME_FRAME.top_left.y + TIME_FRAME.size.height as i32), Size::new(115, 1));
        assert_eq!(white_in(&fb, row), 115);
    }

    #[test]
    fn test_draw_into_maps_colors() {
        let res = Resources::load(1);
        let tree = LayerTree::new();
        let mut fb = Framebuffer::new();
        fb.compose(&tree, &res);

        let mut target = StaticBitmap::new(115, 87);
        // Target smaller than the framebuffer: out-of-range pixels are dropped
        fb.draw_into(&mut target, Point::zero(), BinaryColor::Off, BinaryColor::On).ok();
        // Top-left of the TV is white cabinet background, drawn inverted
        assert!(!target.pixel(0, 0));
    }
}
