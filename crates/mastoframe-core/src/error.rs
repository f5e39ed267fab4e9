//! Error taxonomy for the frame pipeline.
//!
//! Photo problems (`FetchError`, `DecodeError`) are recovered by the renderer
//! with a local fallback image. `EmptyFeedError` ends a render cycle and is
//! surfaced to the caller.

use std::time::Duration;

use thiserror::Error;

/// Failure to fetch the bytes of a preview image.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("image fetch timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("image fetch failed: {0}")]
    Transport(String),

    #[error("image server returned status {0}")]
    Status(u16),
}

/// Image bytes that the codec could not read.
#[derive(Debug, Error)]
#[error("could not decode image: {0}")]
pub struct DecodeError(#[from] pub image::ImageError);

/// Either way a photo can fail to materialise.
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// The feed returned no posts that carry media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("feed returned no posts with media attachments")]
pub struct EmptyFeedError;
