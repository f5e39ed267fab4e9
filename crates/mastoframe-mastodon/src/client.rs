use anyhow::{Context, Result, bail};
use mastoframe_core::config::{FeedKind, MastodonConfig};
use mastoframe_core::error::FetchError;
use mastoframe_core::feed::{FeedSource, ImageSource, Post};
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{Account, ApiError, Status};

/// Largest `limit` the Mastodon API accepts.
pub const MAX_LIMIT: usize = 40;

pub struct MastodonSettings {
    pub api_base_url: Url,
    pub access_token: String,
}

impl MastodonSettings {
    /// # Errors
    /// Returns an error if the base URL is missing or invalid, or no token is set.
    pub fn from_config(config: &MastodonConfig) -> Result<Self> {
        let base = config.api_base_url.trim();
        if base.is_empty() {
            bail!("mastodon.api_base_url is required");
        }
        let api_base_url = Url::parse(base)
            .with_context(|| format!("mastodon.api_base_url is not a valid URL: {base}"))?;

        let token = config
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var("MASTOFRAME_ACCESS_TOKEN")
                    .ok()
                    .map(|token| token.trim().to_string())
                    .filter(|token| !token.is_empty())
            })
            .unwrap_or_default();
        if token.is_empty() {
            bail!("mastodon.access_token or MASTOFRAME_ACCESS_TOKEN is required");
        }

        Ok(Self {
            api_base_url,
            access_token: token,
        })
    }
}

#[derive(Clone)]
pub struct MastodonClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl MastodonClient {
    pub fn new(settings: &MastodonSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings
                .api_base_url
                .as_str()
                .trim_end_matches('/')
                .to_string(),
            token: settings.access_token.clone(),
        }
    }

    /// Recent media posts of one account, newest first.
    ///
    /// # Errors
    /// Returns an error on transport failure or an API error response.
    pub async fn account_statuses(&self, account_id: &str, limit: usize) -> Result<Vec<Status>> {
        let path = format!("/api/v1/accounts/{account_id}/statuses");
        self.get(&path, &media_query(limit)).await
    }

    /// Recent media posts on the public timeline.
    ///
    /// # Errors
    /// Returns an error on transport failure or an API error response.
    pub async fn public_timeline(&self, limit: usize) -> Result<Vec<Status>> {
        self.get("/api/v1/timelines/public", &media_query(limit))
            .await
    }

    /// Accounts matching `query`, resolving remote handles through the instance.
    ///
    /// # Errors
    /// Returns an error on transport failure or an API error response.
    pub async fn account_search(&self, query: &str, limit: usize) -> Result<Vec<Account>> {
        self.get(
            "/api/v1/accounts/search",
            &[
                ("q", query.trim().to_string()),
                ("limit", clamp_limit(limit).to_string()),
                ("resolve", "true".into()),
                ("following", "false".into()),
            ],
        )
        .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Mastodon request to {path} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|err| err.error)
                .unwrap_or_else(|_| "Mastodon API error".to_string());
            bail!("{message} (HTTP {})", status.as_u16());
        }

        response
            .json()
            .await
            .context("Failed to decode Mastodon response")
    }
}

fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_LIMIT)
}

fn media_query(limit: usize) -> [(&'static str, String); 2] {
    [
        ("limit", clamp_limit(limit).to_string()),
        ("only_media", "true".to_string()),
    ]
}

/// The timeline to poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSelection {
    Account(String),
    Public,
}

impl FeedSelection {
    /// # Errors
    /// Returns an error if an account feed has no `account_id`.
    pub fn from_config(config: &MastodonConfig) -> Result<Self> {
        match config.feed {
            FeedKind::Public => Ok(Self::Public),
            FeedKind::Account => config
                .account_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| Self::Account(id.to_string()))
                .context(
                    "mastodon.account_id is required when mastodon.feed = \"account\" \
                     (find it with `mastoframe lookup`)",
                ),
        }
    }
}

/// A `FeedSource` over one Mastodon timeline.
#[derive(Clone)]
pub struct MastodonFeed {
    client: MastodonClient,
    selection: FeedSelection,
}

impl MastodonFeed {
    pub fn new(client: MastodonClient, selection: FeedSelection) -> Self {
        Self { client, selection }
    }
}

impl FeedSource for MastodonFeed {
    async fn fetch_recent_media_posts(&self, max_posts: usize) -> Result<Vec<Post>> {
        let statuses = match &self.selection {
            FeedSelection::Account(id) => self.client.account_statuses(id, max_posts).await?,
            FeedSelection::Public => self.client.public_timeline(max_posts).await?,
        };
        let posts: Vec<Post> = statuses
            .into_iter()
            .take(max_posts)
            .map(Post::from)
            .collect();
        tracing::debug!(count = posts.len(), feed = ?self.selection, "fetched posts");
        Ok(posts)
    }
}

/// Downloads preview images over HTTP.
#[derive(Clone, Default)]
pub struct HttpImageSource {
    http: reqwest::Client,
}

impl HttpImageSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}
