use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use log::{debug, error};

use crate::{InputError, Key, KeySource};

/// Single keystroke input with the terminal in raw mode.
///
/// Raw mode is enabled on `open` and restored when the value is dropped, whichever way
/// the owner exits.
pub struct RawTerminal {
    _private: (),
}

impl RawTerminal {
    pub fn open() -> Result<Self, InputError> {
        enable_raw_mode().map_err(InputError::RawModeUnavailable)?;
        debug!("Terminal switched to raw mode");
        Ok(RawTerminal { _private: () })
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        match disable_raw_mode() {
            Ok(()) => debug!("Terminal mode restored"),
            Err(err) => error!("Failed to restore terminal mode: {}", err),
        }
    }
}

impl KeySource for RawTerminal {
    fn next_key(&mut self, timeout: Duration) -> Result<Option<Key>, InputError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(None);
            }
            if let Event::Key(key_event) = event::read()? {
                if let Some(key) = key_from_event(&key_event) {
                    return Ok(Some(key));
                }
            }
            if remaining.is_zero() {
                return Ok(None);
            }
        }
    }

    fn name(&self) -> &str {
        "raw terminal"
    }
}

fn key_from_event(key_event: &KeyEvent) -> Option<Key> {
    if key_event.kind == KeyEventKind::Release {
        return None;
    }
    match key_event.code {
        KeyCode::Char('c') | KeyCode::Char('C')
            if key_event.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Key::Interrupt)
        }
        KeyCode::Char(c) => Some(Key::Char(c)),
        _ => None,
    }
}
