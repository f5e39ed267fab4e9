//! Outline font backed by `ab_glyph`.

use std::path::Path;

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use anyhow::{Context, Result};

use crate::layout::CaptionFont;

#[derive(Clone)]
pub struct GlyphFont {
    font: FontArc,
}

impl GlyphFont {
    /// Parses a TrueType/OpenType font.
    ///
    /// # Errors
    /// Returns an error if the data is not a usable font.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(data).context("invalid font data")?;
        Ok(Self { font })
    }

    /// Reads and parses a font file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("read font {}", path.display()))?;
        Self::from_bytes(data)
            .with_context(|| format!("load font {}", path.display()))
    }

    fn glyph_ids<'a>(&'a self, text: &'a str) -> impl Iterator<Item = GlyphId> + 'a {
        text.chars().map(|ch| self.font.glyph_id(ch))
    }
}

impl CaptionFont for GlyphFont {
    fn line_width(&self, text: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut width = 0.0;
        let mut previous: Option<GlyphId> = None;
        for id in self.glyph_ids(text) {
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }

    fn line_height(&self, size: f32) -> f32 {
        self.font.as_scaled(PxScale::from(size)).height()
    }

    fn draw_line(
        &self,
        text: &str,
        size: f32,
        origin: (f32, f32),
        plot: &mut dyn FnMut(i32, i32, f32),
    ) {
        let scale = PxScale::from(size);
        let scaled = self.font.as_scaled(scale);
        let baseline = origin.1 + scaled.ascent();
        let mut caret = origin.0;
        let mut previous: Option<GlyphId> = None;

        for id in self.glyph_ids(text) {
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let (left, top) = (bounds.min.x as i32, bounds.min.y as i32);
                outlined.draw(|gx, gy, coverage| {
                    plot(left + gx as i32, top + gy as i32, coverage);
                });
            }
        }
    }
}
