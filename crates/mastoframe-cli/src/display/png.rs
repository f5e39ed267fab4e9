use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};
use mastoframe_core::display::Display;
use tempfile::NamedTempFile;

/// Writes every frame to one PNG file, replacing it atomically.
pub struct PngDisplay {
    path: PathBuf,
}

impl PngDisplay {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Display for PngDisplay {
    fn push(&mut self, frame: &RgbImage) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            frame
                .write_to(&mut writer, ImageFormat::Png)
                .context("Failed to encode frame")?;
        }
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write frame to {}", self.path.display()))?;
        Ok(())
    }
}
