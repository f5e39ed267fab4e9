//! Test doubles shared by the unit tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use image::RgbImage;

use crate::display::Display;
use crate::error::FetchError;
use crate::feed::ImageSource;
use crate::font::GlyphFont;
use crate::layout::CaptionFont;

/// DejaVu Sans, checked in under `tests/fixtures`.
pub(crate) const FIXTURE_FONT: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSans.ttf");

pub(crate) fn fixture_font() -> GlyphFont {
    GlyphFont::load(Path::new(FIXTURE_FONT)).unwrap()
}

/// Monospace font whose glyphs are solid blocks half as wide as they are tall.
pub(crate) struct BlockFont;

impl BlockFont {
    const ASPECT: f32 = 0.5;
}

impl CaptionFont for BlockFont {
    fn line_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * Self::ASPECT
    }

    fn line_height(&self, size: f32) -> f32 {
        size
    }

    fn draw_line(
        &self,
        text: &str,
        size: f32,
        origin: (f32, f32),
        plot: &mut dyn FnMut(i32, i32, f32),
    ) {
        let advance = size * Self::ASPECT;
        for (index, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = (origin.0 + index as f32 * advance).round() as i32;
            let right = (origin.0 + (index + 1) as f32 * advance).round() as i32;
            let top = origin.1.round() as i32;
            let bottom = (origin.1 + size).round() as i32;
            for y in top..bottom {
                for x in left..right {
                    plot(x, y, 1.0);
                }
            }
        }
    }
}

/// Records every pushed frame.
#[derive(Clone, Default)]
pub(crate) struct RecordingDisplay {
    pub frames: Arc<Mutex<Vec<RgbImage>>>,
}

impl RecordingDisplay {
    pub fn push_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl Display for RecordingDisplay {
    fn push(&mut self, frame: &RgbImage) -> anyhow::Result<()> {
        self.frames.lock().unwrap().push(frame.clone());
        Ok(())
    }
}

/// Serves one canned response for every URL.
pub(crate) enum StubSource {
    Bytes(Vec<u8>),
    Fail(u16),
    Hang,
}

impl ImageSource for StubSource {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        match self {
            StubSource::Bytes(bytes) => Ok(bytes.clone()),
            StubSource::Fail(status) => Err(FetchError::Status(*status)),
            StubSource::Hang => std::future::pending().await,
        }
    }
}

/// PNG bytes of a solid-colored image.
pub(crate) fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
