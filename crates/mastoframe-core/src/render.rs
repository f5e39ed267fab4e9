//! Turns the attachment under the cursor into a frame on the display.

use std::time::Duration;

use anyhow::{Context, Result};
use image::DynamicImage;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::caption::CaptionStyle;
use crate::compose::{Theme, compose};
use crate::display::Display;
use crate::error::{FetchError, PhotoError};
use crate::feed::{ImageSource, MediaAttachment, Post};
use crate::images::decode_photo;
use crate::layout::CaptionFont;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the photo in a rendered frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoOrigin {
    Fetched,
    Fallback,
}

pub struct FrameRenderer<S, D, F> {
    source: S,
    display: D,
    theme: Theme<F>,
    captions: CaptionStyle,
    fallback: DynamicImage,
    fetch_timeout: Duration,
    rng: StdRng,
}

impl<S, D, F> FrameRenderer<S, D, F>
where
    S: ImageSource,
    D: Display,
    F: CaptionFont,
{
    pub fn new(
        source: S,
        display: D,
        theme: Theme<F>,
        captions: CaptionStyle,
        fallback: DynamicImage,
    ) -> Self {
        Self {
            source,
            display,
            theme,
            captions,
            fallback,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            rng: StdRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Fixes the RNG so backgrounds are reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Renders one attachment and pushes it to the display.
    ///
    /// Photo fetch and decode failures fall back to the local image; only
    /// display errors are returned.
    ///
    /// # Errors
    /// Returns an error if the display rejects the frame.
    pub async fn show(&mut self, post: &Post, media: &MediaAttachment) -> Result<PhotoOrigin> {
        let caption = self.captions.resolve(post, media);

        let (photo, origin) = match self.load_photo(&media.preview_url).await {
            Ok(photo) => (photo, PhotoOrigin::Fetched),
            Err(err) => {
                tracing::warn!(
                    post = %post.id,
                    url = %media.preview_url,
                    error = %err,
                    "using fallback photo"
                );
                (self.fallback.clone(), PhotoOrigin::Fallback)
            }
        };

        let frame = compose(&photo, &caption, &self.theme, &mut self.rng);
        self.display.push(&frame).context("push frame to display")?;
        tracing::info!(post = %post.id, author = %post.acct, ?origin, "frame shown");
        Ok(origin)
    }

    async fn load_photo(&self, url: &str) -> Result<DynamicImage, PhotoError> {
        let bytes = tokio::time::timeout(self.fetch_timeout, self.source.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout(self.fetch_timeout))??;
        Ok(decode_photo(&bytes)?)
    }
}
