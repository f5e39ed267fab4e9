//! Offline frame rendering, handy for tuning a theme.

use std::path::Path;

use anyhow::{Context, Result};
use mastoframe_core::compose::{Theme, compose};
use mastoframe_core::config::Config;
use mastoframe_core::display::Display;
use mastoframe_core::font::GlyphFont;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::display::PngDisplay;

pub struct RenderOptions<'a> {
    pub config: &'a Config,
    pub config_path: &'a Path,
    pub image: &'a Path,
    pub caption: Option<&'a str>,
    pub out: &'a Path,
    pub seed: Option<u64>,
}

pub fn run(options: RenderOptions<'_>) -> Result<()> {
    let RenderOptions {
        config,
        config_path,
        image,
        caption,
        out,
        seed,
    } = options;

    let photo = image::open(image)
        .with_context(|| format!("load image {}", image.display()))?;
    let canvas = (config.display.width, config.display.height);
    let theme = Theme::<GlyphFont>::load(&config.theme, canvas, config_path)
        .context("load theme")?;

    let caption = caption
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(&config.caption.fallback);

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let frame = compose(&photo, caption, &theme, &mut rng);

    PngDisplay::new(out.to_path_buf()).push(&frame)?;
    println!("Wrote {}", out.display());
    Ok(())
}
