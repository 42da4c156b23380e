//! Image and font resources.
//!
//! Both images are 1 bit per pixel, rows packed MSB first. They are produced
//! at load time instead of being baked into flash: the TV background is
//! drawn with `embedded-graphics` primitives and the static noise comes from
//! a `SmallRng` seeded at startup, so each launch shows different static.
//! Fonts are `&'static` references and are never released.

use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle};
use profont::PROFONT_24_POINT;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::config::{CHANNEL_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH, STATIC_FRAME};
use crate::layers::{FontId, ImageId};

// =============================================================================
// Bitmaps
// =============================================================================

/// Bytes needed for a packed 1bpp image.
pub const fn bitmap_bytes(
    width: u32,
    height: u32,
) -> usize {
    width.div_ceil(8) as usize * height as usize
}

/// Owned 1bpp bitmap. `On` is white, `Off` is black.
#[derive(Clone)]
pub struct MonoBitmap<const N: usize> {
    width: u32,
    height: u32,
    data: [u8; N],
}

/// Full-screen bitmap (TV background, framebuffer).
pub type ScreenBitmap = MonoBitmap<{ bitmap_bytes(SCREEN_WIDTH, SCREEN_HEIGHT) }>;

/// Bitmap covering the TV screen area.
pub type StaticBitmap = MonoBitmap<{ bitmap_bytes(STATIC_FRAME.size.width, STATIC_FRAME.size.height) }>;

impl<const N: usize> MonoBitmap<N> {
    /// All-black bitmap. `N` must equal `bitmap_bytes(width, height)`.
    pub const fn new(
        width: u32,
        height: u32,
    ) -> Self {
        assert!(bitmap_bytes(width, height) == N);
        Self {
            width,
            height,
            data: [0; N],
        }
    }

    #[inline]
    const fn stride(&self) -> usize { self.width.div_ceil(8) as usize }

    #[inline]
    fn locate(
        &self,
        x: i32,
        y: i32,
    ) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some((y * self.stride() + x / 8, 0x80 >> (x % 8)))
    }

    /// Pixel value; out-of-bounds reads are black.
    #[inline]
    pub fn pixel(
        &self,
        x: i32,
        y: i32,
    ) -> bool {
        self.locate(x, y).is_some_and(|(i, mask)| self.data[i] & mask != 0)
    }

    /// Set a pixel; out-of-bounds writes are ignored.
    #[inline]
    pub fn set_pixel(
        &mut self,
        x: i32,
        y: i32,
        on: bool,
    ) {
        if let Some((i, mask)) = self.locate(x, y) {
            if on {
                self.data[i] |= mask;
            } else {
                self.data[i] &= !mask;
            }
        }
    }

    #[inline]
    pub fn invert_pixel(
        &mut self,
        x: i32,
        y: i32,
    ) {
        if let Some((i, mask)) = self.locate(x, y) {
            self.data[i] ^= mask;
        }
    }

    pub fn fill(
        &mut self,
        on: bool,
    ) {
        self.data.fill(if on { 0xFF } else { 0x00 });
    }

    /// Number of set (white) pixels.
    pub fn count_on(&self) -> u32 {
        (0..self.height as i32)
            .flat_map(|y| (0..self.width as i32).map(move |x| (x, y)))
            .filter(|&(x, y)| self.pixel(x, y))
            .count() as u32
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] { &self.data }
}

impl<const N: usize> OriginDimensions for MonoBitmap<N> {
    fn size(&self) -> Size { Size::new(self.width, self.height) }
}

impl<const N: usize> DrawTarget for MonoBitmap<N> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        self.fill(color.is_on());
        Ok(())
    }
}

// =============================================================================
// Image Generation
// =============================================================================

/// Draw the TV set: cabinet, antennae, black screen, channel plate, knobs.
pub fn draw_tv_background<D>(target: &mut D)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let black_2 = PrimitiveStyle::with_stroke(BinaryColor::Off, 2);
    let black_fill = PrimitiveStyle::with_fill(BinaryColor::Off);

    target.clear(BinaryColor::On).ok();

    // Antennae
    let mount = Point::new(72, 28);
    Line::new(mount, Point::new(42, 4)).into_styled(black_2).draw(target).ok();
    Line::new(mount, Point::new(102, 4)).into_styled(black_2).draw(target).ok();
    Circle::with_center(Point::new(42, 4), 6).into_styled(black_fill).draw(target).ok();
    Circle::with_center(Point::new(102, 4), 6).into_styled(black_fill).draw(target).ok();
    Circle::with_center(mount, 10).into_styled(black_fill).draw(target).ok();

    // Cabinet
    RoundedRectangle::with_equal_corners(
        Rectangle::new(Point::new(4, 30), Size::new(136, 134)),
        Size::new(12, 12),
    )
    .into_styled(PrimitiveStyle::with_stroke(BinaryColor::Off, 3))
    .draw(target)
    .ok();

    // Screen, plus a white plate the channel label sits on
    RoundedRectangle::with_equal_corners(STATIC_FRAME, Size::new(10, 10))
        .into_styled(black_fill)
        .draw(target)
        .ok();
    CHANNEL_FRAME
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(target)
        .ok();

    // Knobs and speaker grille
    let knob_y = 146;
    Circle::with_center(Point::new(34, knob_y), 14).into_styled(black_2).draw(target).ok();
    Circle::with_center(Point::new(110, knob_y), 14).into_styled(black_2).draw(target).ok();
    for y in (138..=154).step_by(4) {
        Line::new(Point::new(56, y), Point::new(88, y))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::Off, 1))
            .draw(target)
            .ok();
    }
}

/// Fill the noise image with random pixels.
pub fn generate_static<R: RngCore>(
    image: &mut StaticBitmap,
    rng: &mut R,
) {
    let width = image.width;
    let stride = image.stride();
    let pad = (stride as u32 * 8 - width) as u8;
    let tail_mask = 0xFFu8 << pad;

    for row in image.data.chunks_exact_mut(stride) {
        rng.fill_bytes(row);
        if let Some(last) = row.last_mut() {
            *last &= tail_mask;
        }
    }
}

// =============================================================================
// Resource Set
// =============================================================================

/// Large time digits (stand-in for a 42px bold face).
pub const TIME_FONT: &MonoFont = &PROFONT_24_POINT;

/// Small channel label font.
pub const LABEL_FONT: &MonoFont = &FONT_6X10;

/// Black text in the time font.
pub const TIME_STYLE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(TIME_FONT, BinaryColor::Off);

/// Black text in the label font.
pub const LABEL_STYLE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(LABEL_FONT, BinaryColor::Off);

/// Text style for a font resource.
pub const fn text_style(font: FontId) -> MonoTextStyle<'static, BinaryColor> {
    match font {
        FontId::Time => TIME_STYLE,
        FontId::Label => LABEL_STYLE,
    }
}

/// Borrowed view of one loaded image.
#[derive(Clone, Copy)]
pub struct ImageView<'a> {
    width: u32,
    height: u32,
    stride: usize,
    data: &'a [u8],
}

impl ImageView<'_> {
    #[inline]
    pub const fn size(&self) -> Size { Size::new(self.width, self.height) }

    /// Pixel inside the image; callers stay within [`Self::size`].
    #[inline]
    pub fn pixel(
        &self,
        x: u32,
        y: u32,
    ) -> bool {
        let byte = self.data[y as usize * self.stride + x as usize / 8];
        byte & (0x80 >> (x % 8)) != 0
    }
}

impl<'a, const N: usize> From<&'a MonoBitmap<N>> for ImageView<'a> {
    fn from(bitmap: &'a MonoBitmap<N>) -> Self {
        Self {
            width: bitmap.width,
            height: bitmap.height,
            stride: bitmap.stride(),
            data: &bitmap.data,
        }
    }
}

/// Images owned by the running watchface.
pub struct Resources {
    tv: ScreenBitmap,
    noise: StaticBitmap,
}

impl Resources {
    /// Number of owned images released on drop.
    pub const IMAGE_COUNT: usize = 2;

    /// Produce both images; `seed` selects the static pattern.
    pub fn load(seed: u32) -> Self {
        let mut tv = ScreenBitmap::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        draw_tv_background(&mut tv);

        let mut noise = StaticBitmap::new(STATIC_FRAME.size.width, STATIC_FRAME.size.height);
        generate_static(&mut noise, &mut SmallRng::seed_from_u64(u64::from(seed)));

        Self { tv, noise }
    }

    pub fn image(
        &self,
        id: ImageId,
    ) -> ImageView<'_> {
        match id {
            ImageId::TvBackground => (&self.tv).into(),
            ImageId::StaticNoise => (&self.noise).into(),
        }
    }
}
