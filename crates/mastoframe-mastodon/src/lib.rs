//! Mastodon REST client: media timelines, account search and image downloads.

mod client;
mod types;

pub use client::{
    FeedSelection, HttpImageSource, MAX_LIMIT, MastodonClient, MastodonFeed, MastodonSettings,
};
pub use types::{Account, Attachment, Status};
