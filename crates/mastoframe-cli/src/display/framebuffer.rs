use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use image::RgbImage;
use mastoframe_core::config::PixelFormat;
use mastoframe_core::display::Display;

/// Raw pixels to a Linux framebuffer device such as `/dev/fb0`.
///
/// The frame is written from offset 0 with no row padding, so the device
/// resolution must match the configured display size.
pub struct FramebufferDisplay {
    device: PathBuf,
    format: PixelFormat,
}

impl FramebufferDisplay {
    pub fn new(device: PathBuf, format: PixelFormat) -> Self {
        Self { device, format }
    }
}

impl Display for FramebufferDisplay {
    fn push(&mut self, frame: &RgbImage) -> Result<()> {
        let bytes = encode(frame, self.format);
        let mut device = OpenOptions::new()
            .write(true)
            .open(&self.device)
            .with_context(|| format!("Failed to open framebuffer {}", self.device.display()))?;
        device.seek(SeekFrom::Start(0))?;
        device
            .write_all(&bytes)
            .with_context(|| format!("Failed to write framebuffer {}", self.device.display()))?;
        device.flush()?;
        Ok(())
    }
}

fn encode(frame: &RgbImage, format: PixelFormat) -> Vec<u8> {
    match format {
        PixelFormat::Rgb565 => {
            let mut out = Vec::with_capacity(frame.as_raw().len() / 3 * 2);
            for pixel in frame.pixels() {
                let [r, g, b] = pixel.0;
                let packed =
                    (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
                out.extend_from_slice(&packed.to_le_bytes());
            }
            out
        }
        PixelFormat::Xrgb8888 => {
            let mut out = Vec::with_capacity(frame.as_raw().len() / 3 * 4);
            for pixel in frame.pixels() {
                let [r, g, b] = pixel.0;
                // Little-endian XRGB is B, G, R, X in memory.
                out.extend_from_slice(&[b, g, r, 0xff]);
            }
            out
        }
    }
}
