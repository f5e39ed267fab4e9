//! Button and LED backends.
//!
//! A panel turns input into `RuntimeEvent`s on the runtime's channel and
//! receives LED updates back. Producers never touch the cursor.

mod terminal;

use anyhow::Result;
use mastoframe_core::config::PanelBackend;
use mastoframe_core::display::LedPanel;
use tokio::sync::mpsc;

use crate::runtime::RuntimeEvent;

/// Starts the configured panel, feeding `events`.
pub fn open(
    backend: PanelBackend,
    events: mpsc::Sender<RuntimeEvent>,
) -> Result<Box<dyn LedPanel>> {
    match backend {
        PanelBackend::Terminal => Ok(Box::new(terminal::TerminalPanel::start(events)?)),
        PanelBackend::None => {
            tracing::info!("no input panel; navigation disabled");
            Ok(Box::new(NoPanel))
        }
    }
}

/// Panel with no buttons and no LEDs.
pub struct NoPanel;

impl LedPanel for NoPanel {
    fn set_led(&mut self, _index: usize, _rgb: [u8; 3], _brightness: u8) {}

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
