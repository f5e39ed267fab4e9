//! Configuration management for mastoframe.
//!
//! Loads configuration from `${MASTOFRAME_HOME}/config.toml` with sensible
//! defaults. The config is read once at startup and never changes afterwards.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::caption::CaptionStyle;
use crate::compose::{CaptionBox, GradientStyle, ThumbnailBox};
use crate::layout::FontSizeRange;
use crate::pagination::BeforeFirst;

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for the mastoframe config directory.
    //!
    //! Config file resolution order:
    //! 1. `MASTOFRAME_CONFIG` environment variable (if set)
    //! 2. `MASTOFRAME_HOME/config.toml` (if `MASTOFRAME_HOME` is set)
    //! 3. `~/.config/mastoframe/config.toml`

    use std::path::PathBuf;

    /// Returns the mastoframe home directory.
    pub fn mastoframe_home() -> PathBuf {
        if let Ok(home) = std::env::var("MASTOFRAME_HOME") {
            return PathBuf::from(home);
        }

        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mastoframe")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("MASTOFRAME_CONFIG") {
            return PathBuf::from(path);
        }
        mastoframe_home().join("config.toml")
    }
}

/// Which timeline the frame shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Media posts of `account_id`.
    #[default]
    Account,
    /// The instance's public timeline.
    Public,
}

/// Mastodon server and feed selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MastodonConfig {
    /// Instance URL, e.g. `https://fosstodon.org`.
    pub api_base_url: String,
    /// Pre-issued access token. `MASTOFRAME_ACCESS_TOKEN` is used when unset.
    pub access_token: Option<String>,
    pub feed: FeedKind,
    /// Numeric account id; `mastoframe lookup` finds it.
    pub account_id: Option<String>,
    /// Upper bound on posts fetched per session.
    pub max_posts: usize,
    /// Per-image download timeout in seconds.
    pub fetch_timeout_secs: u64,
}

impl MastodonConfig {
    pub const DEFAULT_MAX_POSTS: usize = 20;
    pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}

impl Default for MastodonConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            access_token: None,
            feed: FeedKind::default(),
            account_id: None,
            max_posts: Self::DEFAULT_MAX_POSTS,
            fetch_timeout_secs: Self::DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub before_first: BeforeFirst,
    /// Refetch the feed every N seconds (0 disables).
    pub refresh_interval_secs: u64,
}

impl NavigationConfig {
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0)
            .then(|| Duration::from_secs(self.refresh_interval_secs))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayBackend {
    /// Write each frame to a PNG file.
    #[default]
    Png,
    /// Write raw pixels to a Linux framebuffer device.
    Framebuffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    #[default]
    Rgb565,
    Xrgb8888,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub backend: DisplayBackend,
    pub width: u32,
    pub height: u32,
    /// PNG output path for the `png` backend.
    pub output: PathBuf,
    /// Device node for the `framebuffer` backend.
    pub device: PathBuf,
    pub pixel_format: PixelFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            backend: DisplayBackend::default(),
            width: 600,
            height: 448,
            output: PathBuf::from("frame.png"),
            device: PathBuf::from("/dev/fb0"),
            pixel_format: PixelFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelBackend {
    /// Keyboard in the controlling terminal.
    #[default]
    Terminal,
    /// No buttons and no LEDs.
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub backend: PanelBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundKind {
    #[default]
    Gradient,
    Photographic,
}

/// Look of the frame. Relative paths resolve against the config directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub background: BackgroundKind,
    /// Image pool for `photographic` backgrounds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backgrounds: Vec<PathBuf>,
    /// Saturation range of gradient endpoints.
    pub saturation: [f32; 2],
    /// Lightness range of gradient endpoints.
    pub lightness: [f32; 2],
    /// RGBA layer drawn over the thumbnail.
    pub overlay: Option<PathBuf>,
    /// TrueType/OpenType caption font.
    pub font: PathBuf,
    pub max_font_size: u32,
    pub min_font_size: u32,
    /// Caption color.
    pub ink: [u8; 3],
    /// Shown when a preview image cannot be fetched or decoded.
    pub fallback_image: Option<PathBuf>,
    pub thumbnail: ThumbnailBox,
    pub caption_box: CaptionBox,
}

impl ThemeConfig {
    pub fn font_sizes(&self) -> FontSizeRange {
        FontSizeRange::new(self.max_font_size, self.min_font_size)
    }

    pub fn gradient(&self) -> GradientStyle {
        GradientStyle {
            saturation: (self.saturation[0], self.saturation[1]),
            lightness: (self.lightness[0], self.lightness[1]),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: BackgroundKind::default(),
            backgrounds: Vec::new(),
            saturation: [1.0, 1.0],
            lightness: [0.5, 0.5],
            overlay: None,
            font: PathBuf::from("Robot_Font.otf"),
            max_font_size: FontSizeRange::DEFAULT_MAX,
            min_font_size: FontSizeRange::DEFAULT_MIN,
            ink: [0, 0, 0],
            fallback_image: None,
            thumbnail: ThumbnailBox::default(),
            caption_box: CaptionBox::default(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mastodon: MastodonConfig,
    pub navigation: NavigationConfig,
    pub caption: CaptionStyle,
    pub display: DisplayConfig,
    pub panel: PanelConfig,
    pub theme: ThemeConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Rejects geometry and limits the frame cannot work with.
    ///
    /// # Errors
    /// Returns an error naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        let display = &self.display;
        if display.width == 0 || display.height == 0 {
            bail!("display size must be positive, got {}x{}", display.width, display.height);
        }

        let theme = &self.theme;
        if theme.thumbnail.width == 0 {
            bail!("theme.thumbnail.width must be positive");
        }
        if theme.caption_box.width == 0 || theme.caption_box.height == 0 {
            bail!(
                "theme.caption_box must be positive, got {}x{}",
                theme.caption_box.width,
                theme.caption_box.height
            );
        }
        if theme.min_font_size == 0 {
            bail!("theme.min_font_size must be at least 1");
        }
        if theme.max_font_size < theme.min_font_size {
            bail!(
                "theme.max_font_size ({}) is below theme.min_font_size ({})",
                theme.max_font_size,
                theme.min_font_size
            );
        }
        let ranges = [
            ("saturation", theme.saturation),
            ("lightness", theme.lightness),
        ];
        for (name, [low, high]) in ranges {
            if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
                bail!(
                    "theme.{name} must be an ordered range within 0.0..=1.0, got [{low}, {high}]"
                );
            }
        }
        if theme.background == BackgroundKind::Photographic && theme.backgrounds.is_empty() {
            bail!("theme.backgrounds is empty but theme.background is \"photographic\"");
        }

        if self.mastodon.max_posts == 0 {
            bail!("mastodon.max_posts must be at least 1");
        }
        Ok(())
    }

    /// Resolves `path` against the directory of `config_path`.
    pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}
