//! Frame runtime: owns the session and pager, drains the event inbox, renders.
//!
//! A single task consumes `RuntimeEvent`s. Every wakeup drains whatever is
//! already queued, folds all button presses into the pager, then renders the
//! final cursor once. Presses that arrive while a frame is rendering wait in
//! the channel and collapse into one follow-up render.

use std::time::Duration;

use anyhow::{Context, Result};
use mastoframe_core::display::{Display, LedPanel, show_buttons};
use mastoframe_core::feed::{FeedSource, ImageSource, Session};
use mastoframe_core::layout::CaptionFont;
use mastoframe_core::pagination::{BeforeFirst, Button, ButtonState, Pager};
use mastoframe_core::render::FrameRenderer;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Inbox depth; senders wait when the runtime falls this far behind.
pub const INBOX_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    Button(ButtonState),
    Refresh,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Runtime<Fd, S, D, F, P> {
    /// Dropped before `panel` so a key reader blocked on a full inbox wakes up.
    inbox: mpsc::Receiver<RuntimeEvent>,
    feed: Fd,
    renderer: FrameRenderer<S, D, F>,
    panel: P,
    session: Session,
    pager: Pager,
    max_posts: usize,
}

impl<Fd, S, D, F, P> Runtime<Fd, S, D, F, P>
where
    Fd: FeedSource,
    S: ImageSource,
    D: Display,
    F: CaptionFont,
    P: LedPanel,
{
    /// Fetches the first session. An unreachable or empty feed is fatal.
    pub async fn start(
        feed: Fd,
        renderer: FrameRenderer<S, D, F>,
        panel: P,
        before_first: BeforeFirst,
        max_posts: usize,
        inbox: mpsc::Receiver<RuntimeEvent>,
    ) -> Result<Self> {
        let session = fetch_session(&feed, max_posts).await?;
        let pager = Pager::new(session.media_counts(), before_first)?;
        tracing::info!(posts = session.len(), "session started");
        Ok(Self {
            inbox,
            feed,
            renderer,
            panel,
            session,
            pager,
            max_posts,
        })
    }

    /// Shows `(0, 0)` and then serves events until shutdown.
    pub async fn run(mut self, refresh_every: Option<Duration>) -> Result<()> {
        self.render_current().await?;

        let mut refresh = refresh_every.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut inbox_open = true;

        loop {
            let first = tokio::select! {
                event = self.inbox.recv(), if inbox_open => match event {
                    Some(event) => event,
                    None => {
                        tracing::debug!("input closed");
                        inbox_open = false;
                        continue;
                    }
                },
                () = next_tick(refresh.as_mut()) => RuntimeEvent::Refresh,
                _ = &mut ctrl_c => {
                    tracing::info!("interrupted");
                    return Ok(());
                }
            };

            let mut batch = vec![first];
            while let Ok(event) = self.inbox.try_recv() {
                batch.push(event);
            }

            if self.handle(batch).await? == Flow::Exit {
                tracing::info!("shutting down");
                return Ok(());
            }
        }
    }

    async fn handle(&mut self, batch: Vec<RuntimeEvent>) -> Result<Flow> {
        let mut moved = false;
        let mut refresh = false;

        for event in batch {
            match event {
                RuntimeEvent::Button(state) => {
                    if state.changed {
                        self.light(state);
                    }
                    let Some(button) = Button::from_state(state) else {
                        continue;
                    };
                    if let Some(cursor) = self.pager.apply(button) {
                        tracing::debug!(?button, %cursor, "cursor moved");
                        moved = true;
                    }
                }
                RuntimeEvent::Refresh => refresh = true,
                RuntimeEvent::Shutdown => return Ok(Flow::Exit),
            }
        }

        if refresh && self.refresh().await {
            moved = true;
        }
        if moved {
            self.render_current().await?;
        }
        Ok(Flow::Continue)
    }

    fn light(&mut self, state: ButtonState) {
        if let Err(err) = show_buttons(&mut self.panel, state) {
            tracing::warn!(error = %err, "LED update failed");
        }
    }

    /// Replaces the session when the feed changed. Returns whether it did.
    async fn refresh(&mut self) -> bool {
        let session = match fetch_session(&self.feed, self.max_posts).await {
            Ok(session) => session,
            Err(err) => {
                let error = format!("{err:#}");
                tracing::warn!(%error, "refresh failed, keeping current posts");
                return false;
            }
        };
        if session.has_same_posts(&self.session) {
            tracing::debug!("feed unchanged");
            return false;
        }
        if let Err(err) = self.pager.reset(session.media_counts()) {
            tracing::warn!(error = %err, "refresh returned no posts, keeping current posts");
            return false;
        }
        tracing::info!(posts = session.len(), "session refreshed");
        self.session = session;
        true
    }

    async fn render_current(&mut self) -> Result<()> {
        let cursor = self.pager.cursor();
        let (post, media) = self
            .session
            .get(cursor)
            .with_context(|| format!("cursor {cursor} outside the session"))?;
        self.renderer.show(post, media).await?;
        Ok(())
    }
}

async fn fetch_session<Fd: FeedSource>(feed: &Fd, max_posts: usize) -> Result<Session> {
    let posts = feed
        .fetch_recent_media_posts(max_posts)
        .await
        .context("fetch feed")?;
    Ok(Session::new(posts, max_posts)?)
}

async fn next_tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests;
