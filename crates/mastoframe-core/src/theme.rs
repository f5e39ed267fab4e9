//! Loads theme assets named in the config.

use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, Rgb, RgbaImage};

use crate::compose::{Background, Theme};
use crate::config::{BackgroundKind, Config, ThemeConfig};
use crate::font::GlyphFont;
use crate::images::{placeholder_photo, resize_rgba};

fn open_rgba(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("load image {}", path.display()))?;
    Ok(image.to_rgba8())
}

impl Theme<GlyphFont> {
    /// Reads font, overlay and background images for a `canvas`-sized frame.
    ///
    /// Paths are resolved against the directory of `config_path`. Images that
    /// are not canvas-sized are scaled to fit.
    ///
    /// # Errors
    /// Returns an error if any referenced asset is missing or unreadable.
    pub fn load(theme: &ThemeConfig, canvas: (u32, u32), config_path: &Path) -> Result<Self> {
        let resolve = |path: &Path| Config::resolve_path(config_path, path);
        let (width, height) = canvas;
        let open_fitted = |path: &Path| {
            open_rgba(&resolve(path)).map(|img| resize_rgba(&img, width, height))
        };

        let font = GlyphFont::load(&resolve(&theme.font))?;

        let overlay = theme.overlay.as_deref().map(open_fitted).transpose()?;

        let background = match theme.background {
            BackgroundKind::Gradient => Background::Gradient(theme.gradient()),
            BackgroundKind::Photographic => {
                let pool = theme
                    .backgrounds
                    .iter()
                    .map(|path| open_fitted(path.as_path()))
                    .collect::<Result<Vec<_>>>()?;
                tracing::debug!(count = pool.len(), "loaded background images");
                Background::Photographic(pool)
            }
        };

        Ok(Self {
            canvas,
            background,
            overlay,
            thumbnail: theme.thumbnail,
            caption_box: theme.caption_box,
            font,
            font_sizes: theme.font_sizes(),
            ink: Rgb(theme.ink),
        })
    }
}

/// Photo used when a preview cannot be fetched or decoded.
///
/// # Errors
/// Returns an error if a configured fallback image cannot be loaded.
pub fn load_fallback_photo(theme: &ThemeConfig, config_path: &Path) -> Result<DynamicImage> {
    match &theme.fallback_image {
        Some(path) => {
            let path = Config::resolve_path(config_path, path);
            image::open(&path)
                .with_context(|| format!("load fallback image {}", path.display()))
        }
        None => Ok(placeholder_photo(theme.thumbnail.width)),
    }
}
