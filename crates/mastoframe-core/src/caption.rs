//! Caption text for an attachment.

use serde::{Deserialize, Serialize};

use crate::feed::{MediaAttachment, Post};

pub const DEFAULT_FALLBACK: &str = "Here could be a beautiful ALT description. Maybe next time?";
pub const DEFAULT_AUTHOR_SEPARATOR: &str = "   wrote ";

/// How captions are built from ALT text and the author's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    /// Shown when an attachment has no description.
    pub fallback: String,
    /// Appends `{author_separator}{author}` to every caption.
    pub attribute_author: bool,
    pub author_separator: String,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK.to_string(),
            attribute_author: true,
            author_separator: DEFAULT_AUTHOR_SEPARATOR.to_string(),
        }
    }
}

impl CaptionStyle {
    /// Caption for `media` of `post`. The attachment itself is left untouched.
    pub fn resolve(&self, post: &Post, media: &MediaAttachment) -> String {
        let description = media
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(&self.fallback);

        if self.attribute_author && !post.author.trim().is_empty() {
            format!("{description}{}{}", self.author_separator, post.author)
        } else {
            description.to_string()
        }
    }
}
