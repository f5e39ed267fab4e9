use mastoframe_core::feed::{MediaAttachment, Post};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Status {
    pub id: String,
    pub account: Account,
    #[serde(default)]
    pub media_attachments: Vec<Attachment>,
    /// Boosted status, whose media the wrapper does not repeat.
    #[serde(default)]
    pub reblog: Option<Box<Status>>,
}

#[derive(Debug, Deserialize)]
pub struct Account {
    pub id: String,
    pub acct: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: String,
}

impl Account {
    /// Display name, or the username when the display name is blank.
    pub fn name(&self) -> &str {
        let display = self.display_name.trim();
        if display.is_empty() {
            &self.username
        } else {
            display
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub error: String,
}

impl From<Status> for Post {
    fn from(status: Status) -> Self {
        let status = match status.reblog {
            Some(inner) if status.media_attachments.is_empty() => *inner,
            _ => status,
        };
        let media = status
            .media_attachments
            .into_iter()
            .filter(|attachment| matches!(attachment.kind.as_str(), "image" | "gifv" | ""))
            .filter_map(|attachment| {
                attachment.preview_url.map(|preview_url| MediaAttachment {
                    preview_url,
                    description: attachment.description,
                })
            })
            .collect();
        Post {
            id: status.id,
            author: status.account.name().to_string(),
            acct: status.account.acct,
            media,
        }
    }
}
