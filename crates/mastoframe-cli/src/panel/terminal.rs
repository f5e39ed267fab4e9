//! Keyboard stand-in for the four hardware buttons.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use mastoframe_core::display::LedPanel;
use mastoframe_core::pagination::{Button, ButtonState};
use tokio::sync::mpsc;

use crate::runtime::RuntimeEvent;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Press(Button),
    Quit,
}

fn key_action(key: KeyEvent) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let action = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char('a' | 'A') | KeyCode::Up => KeyAction::Press(Button::PrevPost),
        KeyCode::Char('b' | 'B') | KeyCode::Down => KeyAction::Press(Button::NextPost),
        KeyCode::Char('c' | 'C') | KeyCode::Left => KeyAction::Press(Button::PrevImage),
        KeyCode::Char('d' | 'D') | KeyCode::Right => KeyAction::Press(Button::NextImage),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => KeyAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Reads keys in raw mode on a background thread.
pub struct TerminalPanel {
    leds: [([u8; 3], u8); 4],
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl TerminalPanel {
    pub fn start(events: mpsc::Sender<RuntimeEvent>) -> Result<Self> {
        terminal::enable_raw_mode().context("enable terminal raw mode")?;
        tracing::info!(
            "keys: a/Up prev post, b/Down next post, c/Left prev image, d/Right next image, q quit"
        );

        let stop = Arc::new(AtomicBool::new(false));
        let reader_stop = Arc::clone(&stop);
        let reader = std::thread::Builder::new()
            .name("panel-keys".to_string())
            .spawn(move || read_keys(&events, &reader_stop))
            .context("spawn key reader")?;

        Ok(Self {
            leds: [([0; 3], 0); 4],
            stop,
            reader: Some(reader),
        })
    }
}

fn read_keys(events: &mpsc::Sender<RuntimeEvent>, stop: &AtomicBool) {
    while !stop.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(err) => {
                tracing::warn!(%err, "terminal input failed");
                return;
            }
        }
        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(%err, "terminal input failed");
                return;
            }
        };
        let event = match key_action(key) {
            Some(KeyAction::Press(button)) => RuntimeEvent::Button(ButtonState::pressed(button)),
            Some(KeyAction::Quit) => RuntimeEvent::Shutdown,
            None => continue,
        };
        if events.blocking_send(event).is_err() {
            return;
        }
    }
}

impl LedPanel for TerminalPanel {
    fn set_led(&mut self, index: usize, rgb: [u8; 3], brightness: u8) {
        if let Some(led) = self.leds.get_mut(index) {
            *led = (rgb, brightness);
        }
    }

    fn flush(&mut self) -> Result<()> {
        tracing::debug!(leds = ?self.leds, "panel LEDs");
        Ok(())
    }
}

impl Drop for TerminalPanel {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        let _ = terminal::disable_raw_mode();
    }
}
