//! Frame compositor.
//!
//! Layers are painted in a fixed order: background, thumbnail, overlay,
//! caption. All randomness comes from the caller's RNG so a seeded RNG
//! reproduces a frame exactly.

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage, imageops};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::images::square_thumbnail;
use crate::layout::{self, CaptionFont, FontSizeRange, LINE_SPACING, TextBox, TextLayout};

/// Square thumbnail placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailBox {
    pub width: u32,
    pub x: u32,
    pub y: u32,
}

impl Default for ThumbnailBox {
    fn default() -> Self {
        Self {
            width: 200,
            x: 110,
            y: 125,
        }
    }
}

/// Speech-bubble area the caption is centered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CaptionBox {
    pub fn text_box(self) -> TextBox {
        TextBox {
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for CaptionBox {
    fn default() -> Self {
        Self {
            x: 75,
            y: 22,
            width: 340,
            height: 110,
        }
    }
}

/// Saturation and lightness bounds for gradient endpoints, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStyle {
    pub saturation: (f32, f32),
    pub lightness: (f32, f32),
}

impl Default for GradientStyle {
    fn default() -> Self {
        Self {
            saturation: (1.0, 1.0),
            lightness: (0.5, 0.5),
        }
    }
}

impl GradientStyle {
    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb<u8> {
        let hue = f32::from(rng.gen_range(0_u16..360));
        let saturation = sample(rng, self.saturation);
        let lightness = sample(rng, self.lightness);
        hsl_to_rgb(hue, saturation, lightness)
    }
}

pub enum Background {
    Gradient(GradientStyle),
    /// Canvas-sized images, one of which is picked per frame.
    Photographic(Vec<RgbaImage>),
}

pub struct Theme<F> {
    pub canvas: (u32, u32),
    pub background: Background,
    pub overlay: Option<RgbaImage>,
    pub thumbnail: ThumbnailBox,
    pub caption_box: CaptionBox,
    pub font: F,
    pub font_sizes: FontSizeRange,
    pub ink: Rgb<u8>,
}

/// Builds one frame at `theme.canvas` size.
pub fn compose<F, R>(photo: &DynamicImage, caption: &str, theme: &Theme<F>, rng: &mut R) -> RgbImage
where
    F: CaptionFont,
    R: Rng + ?Sized,
{
    let (width, height) = theme.canvas;
    let mut canvas = paint_background(&theme.background, width, height, rng);

    let thumb = square_thumbnail(photo, theme.thumbnail.width);
    imageops::replace(
        &mut canvas,
        &thumb,
        i64::from(theme.thumbnail.x),
        i64::from(theme.thumbnail.y),
    );

    if let Some(overlay) = &theme.overlay {
        imageops::overlay(&mut canvas, overlay, 0, 0);
    }

    let text = layout::layout(caption, &theme.font, theme.caption_box.text_box(), theme.font_sizes);
    draw_caption(&mut canvas, &text, &theme.font, theme.caption_box, theme.ink);

    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

fn paint_background<R: Rng + ?Sized>(
    background: &Background,
    width: u32,
    height: u32,
    rng: &mut R,
) -> RgbaImage {
    match background {
        Background::Gradient(style) => diagonal_gradient(style, width, height, rng),
        Background::Photographic(pool) => match pool.choose(rng) {
            Some(image) if image.dimensions() == (width, height) => image.clone(),
            Some(image) => crate::images::resize_rgba(image, width, height),
            None => diagonal_gradient(&GradientStyle::default(), width, height, rng),
        },
    }
}

/// Two random colors blended along `x + y`, top-left to bottom-right.
fn diagonal_gradient<R: Rng + ?Sized>(
    style: &GradientStyle,
    width: u32,
    height: u32,
    rng: &mut R,
) -> RgbaImage {
    let from = style.pick(rng);
    let to = style.pick(rng);
    let steps = (2 * width).max(1) as f32;

    RgbaImage::from_fn(width, height, |x, y| {
        let t = ((x + y) as f32 / steps).min(1.0);
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Rgba([mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2]), 255])
    })
}

fn draw_caption<F: CaptionFont>(
    canvas: &mut RgbaImage,
    text: &TextLayout,
    font: &F,
    area: CaptionBox,
    ink: Rgb<u8>,
) {
    let size = text.font_size as f32;
    let line_height = font.line_height(size);
    let block = layout::block_height(font, text.line_count(), size);
    let top = area.y as f32 + (area.height as f32 - block) / 2.0;

    let mut plot = |x: i32, y: i32, coverage: f32| blend(canvas, x, y, ink, coverage);
    for (index, line) in text.lines().enumerate() {
        let left = area.x as f32 + (area.width as f32 - font.line_width(line, size)) / 2.0;
        let y = top + index as f32 * (line_height + LINE_SPACING);
        font.draw_line(line, size, (left, y), &mut plot);
    }
}

fn blend(canvas: &mut RgbaImage, x: i32, y: i32, ink: Rgb<u8>, coverage: f32) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x, y);
    for channel in 0..3 {
        let base = f32::from(pixel[channel]);
        pixel[channel] = (base + (f32::from(ink[channel]) - base) * alpha).round() as u8;
    }
    pixel[3] = 255;
}

fn sample<R: Rng + ?Sized>(rng: &mut R, (low, high): (f32, f32)) -> f32 {
    if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    }
}

/// HSL to RGB with hue in degrees and saturation/lightness in `0.0..=1.0`.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgb<u8> {
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb([to_byte(r), to_byte(g), to_byte(b)])
}
