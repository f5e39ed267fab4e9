//! The photo frame appliance loop.

use std::path::Path;

use anyhow::{Context, Result};
use mastoframe_core::compose::Theme;
use mastoframe_core::config::Config;
use mastoframe_core::font::GlyphFont;
use mastoframe_core::render::FrameRenderer;
use mastoframe_core::theme::load_fallback_photo;
use mastoframe_mastodon::{
    FeedSelection, HttpImageSource, MastodonClient, MastodonFeed, MastodonSettings,
};
use tokio::sync::mpsc;

use crate::runtime::{INBOX_CAPACITY, Runtime};
use crate::{display, panel};

pub async fn run(config: &Config, config_path: &Path) -> Result<()> {
    let settings = MastodonSettings::from_config(&config.mastodon)?;
    let selection = FeedSelection::from_config(&config.mastodon)?;
    let feed = MastodonFeed::new(MastodonClient::new(&settings), selection);

    let canvas = (config.display.width, config.display.height);
    let theme = Theme::<GlyphFont>::load(&config.theme, canvas, config_path)
        .context("load theme")?;
    let fallback = load_fallback_photo(&config.theme, config_path)?;

    let display = display::open(&config.display, config_path);
    let renderer = FrameRenderer::new(
        HttpImageSource::new(),
        display,
        theme,
        config.caption.clone(),
        fallback,
    )
    .with_fetch_timeout(config.mastodon.fetch_timeout());

    let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
    let panel = panel::open(config.panel.backend, tx)?;

    let runtime = Runtime::start(
        feed,
        renderer,
        panel,
        config.navigation.before_first,
        config.mastodon.max_posts,
        rx,
    )
    .await?;
    runtime.run(config.navigation.refresh_interval()).await
}
