//! Display backends.

mod framebuffer;
mod png;

use std::path::Path;

pub use framebuffer::FramebufferDisplay;
use mastoframe_core::config::{Config, DisplayBackend, DisplayConfig};
use mastoframe_core::display::Display;
pub use png::PngDisplay;

/// Opens the configured display.
pub fn open(config: &DisplayConfig, config_path: &Path) -> Box<dyn Display> {
    match config.backend {
        DisplayBackend::Png => {
            let output = Config::resolve_path(config_path, &config.output);
            tracing::info!(path = %output.display(), "writing frames to PNG");
            Box::new(PngDisplay::new(output))
        }
        DisplayBackend::Framebuffer => {
            tracing::info!(
                device = %config.device.display(),
                format = ?config.pixel_format,
                "writing frames to framebuffer"
            );
            Box::new(FramebufferDisplay::new(
                config.device.clone(),
                config.pixel_format,
            ))
        }
    }
}
