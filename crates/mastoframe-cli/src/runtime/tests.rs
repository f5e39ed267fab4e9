use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use mastoframe_core::caption::CaptionStyle;
use mastoframe_core::compose::{Background, CaptionBox, GradientStyle, Theme, ThumbnailBox};
use mastoframe_core::error::FetchError;
use mastoframe_core::feed::{MediaAttachment, Post};
use mastoframe_core::layout::FontSizeRange;
use mastoframe_core::pagination::Cursor;

use super::*;

struct NullFont;

impl CaptionFont for NullFont {
    fn line_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.5
    }

    fn line_height(&self, size: f32) -> f32 {
        size
    }

    fn draw_line(&self, _: &str, _: f32, _: (f32, f32), _: &mut dyn FnMut(i32, i32, f32)) {}
}

struct OfflineImages;

impl ImageSource for OfflineImages {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Status(404))
    }
}

#[derive(Clone, Default)]
struct CountingDisplay {
    pushes: Arc<AtomicUsize>,
}

impl CountingDisplay {
    fn count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }
}

impl Display for CountingDisplay {
    fn push(&mut self, _frame: &RgbImage) -> Result<()> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Latched brightness per LED.
#[derive(Clone, Default)]
struct Leds {
    pending: [u8; 4],
    latched: Arc<Mutex<[u8; 4]>>,
    flushes: Arc<AtomicUsize>,
}

impl Leds {
    fn levels(&self) -> [u8; 4] {
        *self.latched.lock().unwrap()
    }

    fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl LedPanel for Leds {
    fn set_led(&mut self, index: usize, _rgb: [u8; 3], brightness: u8) {
        self.pending[index] = brightness;
    }

    fn flush(&mut self) -> Result<()> {
        *self.latched.lock().unwrap() = self.pending;
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Holds an inbox sender like a key reader does and records whether the
/// inbox was already closed when the panel went away.
struct InputPanel {
    events: mpsc::Sender<RuntimeEvent>,
    inbox_closed_on_drop: Arc<AtomicBool>,
}

impl LedPanel for InputPanel {
    fn set_led(&mut self, _index: usize, _rgb: [u8; 3], _brightness: u8) {}

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Drop for InputPanel {
    fn drop(&mut self) {
        self.inbox_closed_on_drop
            .store(self.events.is_closed(), Ordering::SeqCst);
    }
}

/// Replays canned responses; the last one repeats.
#[derive(Clone)]
struct ScriptedFeed {
    responses: Arc<Mutex<VecDeque<Result<Vec<Post>, String>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedFeed {
    fn new(responses: Vec<Result<Vec<Post>, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            calls: Arc::default(),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FeedSource for ScriptedFeed {
    async fn fetch_recent_media_posts(&self, _max_posts: usize) -> Result<Vec<Post>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        let next = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        match next {
            Some(Ok(posts)) => Ok(posts),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(Vec::new()),
        }
    }
}

fn posts(prefix: &str, counts: &[usize]) -> Vec<Post> {
    counts
        .iter()
        .enumerate()
        .map(|(index, &count)| Post {
            id: format!("{prefix}{index}"),
            author: "Ax".to_string(),
            acct: "ax".to_string(),
            media: (0..count)
                .map(|media| MediaAttachment {
                    preview_url: format!("https://files.example/{prefix}{index}/{media}.png"),
                    description: None,
                })
                .collect(),
        })
        .collect()
}

fn renderer(display: CountingDisplay) -> FrameRenderer<OfflineImages, CountingDisplay, NullFont> {
    let theme = Theme {
        canvas: (120, 90),
        background: Background::Gradient(GradientStyle::default()),
        overlay: None,
        thumbnail: ThumbnailBox {
            width: 40,
            x: 10,
            y: 30,
        },
        caption_box: CaptionBox {
            x: 5,
            y: 5,
            width: 100,
            height: 20,
        },
        font: NullFont,
        font_sizes: FontSizeRange::default(),
        ink: Rgb([0, 0, 0]),
    };
    let fallback = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
    FrameRenderer::new(
        OfflineImages,
        display,
        theme,
        CaptionStyle::default(),
        fallback,
    )
    .with_seed(3)
}

type TestRuntime = Runtime<ScriptedFeed, OfflineImages, CountingDisplay, NullFont, Leds>;

async fn runtime(
    feed: ScriptedFeed,
    display: CountingDisplay,
    leds: Leds,
) -> (TestRuntime, mpsc::Sender<RuntimeEvent>) {
    let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
    let runtime = Runtime::start(feed, renderer(display), leds, BeforeFirst::Wrap, 20, rx)
        .await
        .unwrap();
    (runtime, tx)
}

fn press(button: Button) -> RuntimeEvent {
    RuntimeEvent::Button(ButtonState::pressed(button))
}

#[tokio::test]
async fn empty_feed_is_fatal_at_startup() {
    let feed = ScriptedFeed::new(vec![Ok(posts("p", &[0, 0]))]);
    let (_tx, rx) = mpsc::channel(1);
    let display = CountingDisplay::default();
    let result =
        Runtime::start(feed, renderer(display), Leds::default(), BeforeFirst::Wrap, 20, rx).await;
    let err = result.err().unwrap();
    assert!(err.to_string().contains("no posts with media"));
}

#[tokio::test]
async fn feed_error_is_fatal_at_startup() {
    let feed = ScriptedFeed::new(vec![Err("connection refused".to_string())]);
    let (_tx, rx) = mpsc::channel(1);
    let display = CountingDisplay::default();
    let result =
        Runtime::start(feed, renderer(display), Leds::default(), BeforeFirst::Wrap, 20, rx).await;
    let err = result.err().unwrap();
    assert!(format!("{err:#}").contains("connection refused"));
}

#[tokio::test]
async fn queued_presses_collapse_into_one_render() {
    let display = CountingDisplay::default();
    let leds = Leds::default();
    let feed = ScriptedFeed::new(vec![Ok(posts("p", &[2, 1, 3]))]);
    let (mut runtime, _tx) = runtime(feed, display.clone(), leds.clone()).await;

    let batch = vec![press(Button::NextImage); 3];
    assert_eq!(runtime.handle(batch).await.unwrap(), Flow::Continue);

    assert_eq!(runtime.pager.cursor(), Cursor::new(2, 0));
    assert_eq!(display.count(), 1);
    assert_eq!(leds.levels(), [0, 0, 0, 10]);
    assert_eq!(leds.flushes(), 3);
}

#[tokio::test]
async fn no_op_and_stale_presses_do_not_render() {
    let display = CountingDisplay::default();
    let leds = Leds::default();
    let feed = ScriptedFeed::new(vec![Ok(posts("p", &[2, 1, 3]))]);
    let (mut runtime, _tx) = runtime(feed, display.clone(), leds.clone()).await;

    let stale = ButtonState {
        changed: false,
        ..ButtonState::pressed(Button::NextPost)
    };
    let batch = vec![
        RuntimeEvent::Button(ButtonState::released()),
        press(Button::PrevImage),
        RuntimeEvent::Button(stale),
    ];
    runtime.handle(batch).await.unwrap();

    assert_eq!(runtime.pager.cursor(), Cursor::new(0, 0));
    assert_eq!(display.count(), 0);
    // Both edges reach the LEDs, the stale read does not.
    assert_eq!(leds.levels(), [0, 0, 10, 0]);
    assert_eq!(leds.flushes(), 2);
}

#[tokio::test]
async fn release_edge_turns_the_leds_off() {
    let leds = Leds::default();
    let feed = ScriptedFeed::new(vec![Ok(posts("p", &[2, 1, 3]))]);
    let (mut runtime, _tx) = runtime(feed, CountingDisplay::default(), leds.clone()).await;

    runtime.handle(vec![press(Button::PrevPost)]).await.unwrap();
    runtime.handle(vec![press(Button::NextPost)]).await.unwrap();
    assert_eq!(leds.levels(), [0, 10, 0, 0]);

    let chord = ButtonState {
        a: true,
        b: true,
        changed: true,
        ..ButtonState::default()
    };
    runtime.handle(vec![RuntimeEvent::Button(chord)]).await.unwrap();
    assert_eq!(leds.levels(), [10, 10, 0, 0]);

    let released = RuntimeEvent::Button(ButtonState::released());
    runtime.handle(vec![released]).await.unwrap();
    assert_eq!(leds.levels(), [0, 0, 0, 0]);
}

#[tokio::test]
async fn inbox_closes_before_the_panel_is_dropped() {
    let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
    let closed = Arc::new(AtomicBool::new(false));
    let panel = InputPanel {
        events: tx.clone(),
        inbox_closed_on_drop: closed.clone(),
    };
    let feed = ScriptedFeed::new(vec![Ok(posts("p", &[1]))]);
    let renderer = renderer(CountingDisplay::default());
    let runtime = Runtime::start(feed, renderer, panel, BeforeFirst::Wrap, 20, rx)
        .await
        .unwrap();

    tx.send(RuntimeEvent::Shutdown).await.unwrap();
    runtime.run(None).await.unwrap();

    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn shutdown_stops_before_rendering() {
    let display = CountingDisplay::default();
    let feed = ScriptedFeed::new(vec![Ok(posts("p", &[2]))]);
    let (mut runtime, _tx) = runtime(feed, display.clone(), Leds::default()).await;

    let flow = runtime
        .handle(vec![press(Button::NextImage), RuntimeEvent::Shutdown])
        .await
        .unwrap();
    assert_eq!(flow, Flow::Exit);
    assert_eq!(display.count(), 0);
}

#[tokio::test]
async fn refresh_with_new_posts_resets_to_origin() {
    let display = CountingDisplay::default();
    let feed = ScriptedFeed::new(vec![Ok(posts("p", &[2, 1, 3])), Ok(posts("q", &[1, 1]))]);
    let (mut runtime, _tx) = runtime(feed.clone(), display.clone(), Leds::default()).await;

    runtime.handle(vec![press(Button::NextPost)]).await.unwrap();
    assert_eq!(runtime.pager.cursor(), Cursor::new(1, 0));

    runtime.handle(vec![RuntimeEvent::Refresh]).await.unwrap();
    assert_eq!(runtime.pager.cursor(), Cursor::new(0, 0));
    assert_eq!(runtime.session.posts()[0].id, "q0");
    assert_eq!(runtime.pager.post_count(), 2);
    assert_eq!(display.count(), 2);
    assert_eq!(feed.calls(), 2);
}

#[tokio::test]
async fn refresh_with_same_posts_keeps_the_cursor() {
    let display = CountingDisplay::default();
    let feed = ScriptedFeed::new(vec![Ok(posts("p", &[2, 1, 3]))]);
    let (mut runtime, _tx) = runtime(feed, display.clone(), Leds::default()).await;

    runtime.handle(vec![press(Button::NextPost)]).await.unwrap();
    runtime.handle(vec![RuntimeEvent::Refresh]).await.unwrap();

    assert_eq!(runtime.pager.cursor(), Cursor::new(1, 0));
    assert_eq!(display.count(), 1);
}

#[tokio::test]
async fn failed_or_empty_refresh_keeps_the_session() {
    let display = CountingDisplay::default();
    let feed = ScriptedFeed::new(vec![
        Ok(posts("p", &[2, 1])),
        Err("timeout".to_string()),
        Ok(Vec::new()),
    ]);
    let (mut runtime, _tx) = runtime(feed, display.clone(), Leds::default()).await;
    runtime.handle(vec![press(Button::NextImage)]).await.unwrap();

    runtime.handle(vec![RuntimeEvent::Refresh]).await.unwrap();
    runtime.handle(vec![RuntimeEvent::Refresh]).await.unwrap();

    assert_eq!(runtime.pager.cursor(), Cursor::new(0, 1));
    assert_eq!(runtime.session.len(), 2);
    assert_eq!(display.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn run_serves_events_until_shutdown() {
    let display = CountingDisplay::default();
    let feed = ScriptedFeed::new(vec![Ok(posts("p", &[2, 1])), Ok(posts("q", &[3]))]);
    let (runtime, tx) = runtime(feed.clone(), display.clone(), Leds::default()).await;

    tx.send(press(Button::NextPost)).await.unwrap();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(90)).await;
        let _ = tx.send(RuntimeEvent::Shutdown).await;
    });

    runtime.run(Some(Duration::from_secs(60))).await.unwrap();

    // Initial frame, the press, then the refresh at 60s.
    assert_eq!(display.count(), 3);
    assert_eq!(feed.calls(), 2);
}
