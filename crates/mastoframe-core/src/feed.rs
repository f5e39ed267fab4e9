//! Posts as the frame sees them, plus the seams to the outside world.

use std::future::Future;

use crate::error::{EmptyFeedError, FetchError};
use crate::pagination::Cursor;

/// One image inside a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub preview_url: String,
    /// Accessibility text. `None` and blank strings are treated alike.
    pub description: Option<String>,
}

/// A feed entry with its images, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    /// Display name shown in captions.
    pub author: String,
    /// `user@host` handle, used in logs.
    pub acct: String,
    pub media: Vec<MediaAttachment>,
}

/// Anything that can list recent posts with media.
pub trait FeedSource {
    fn fetch_recent_media_posts(
        &self,
        max_posts: usize,
    ) -> impl Future<Output = anyhow::Result<Vec<Post>>> + Send;
}

/// Anything that can turn an image URL into bytes.
pub trait ImageSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// The posts of one polling session.
///
/// Posts without media are dropped and the list is capped at the configured
/// maximum, so every post has at least one attachment.
#[derive(Debug, Clone)]
pub struct Session {
    posts: Vec<Post>,
}

impl Session {
    /// Builds a session from fetched posts.
    ///
    /// # Errors
    /// Returns `EmptyFeedError` if no post with media remains.
    pub fn new(posts: Vec<Post>, max_posts: usize) -> Result<Self, EmptyFeedError> {
        let posts: Vec<Post> = posts
            .into_iter()
            .filter(|post| !post.media.is_empty())
            .take(max_posts)
            .collect();
        if posts.is_empty() {
            return Err(EmptyFeedError);
        }
        Ok(Self { posts })
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn media_counts(&self) -> Vec<usize> {
        self.posts.iter().map(|post| post.media.len()).collect()
    }

    /// Looks up the post and attachment under `cursor`.
    pub fn get(&self, cursor: Cursor) -> Option<(&Post, &MediaAttachment)> {
        let post = self.posts.get(cursor.post)?;
        let media = post.media.get(cursor.media)?;
        Some((post, media))
    }

    /// True when `other` is the same sequence of post ids.
    pub fn has_same_posts(&self, other: &Session) -> bool {
        self.posts.len() == other.posts.len()
            && self
                .posts
                .iter()
                .zip(&other.posts)
                .all(|(a, b)| a.id == b.id)
    }
}
