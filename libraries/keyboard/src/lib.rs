mod line;
mod raw;

use std::time::Duration;

use log::{info, warn};
use thiserror::Error;

pub use line::LineInput;
pub use raw::RawTerminal;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Raw terminal mode unavailable: {0}")]
    RawModeUnavailable(#[source] std::io::Error),

    #[error("Input I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input closed")]
    Closed,
}

/// A single operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// One character, as typed (case preserved).
    Char(char),
    /// A whole token from the line back-end, lower-cased (e.g. `space`).
    Word(String),
    /// Ctrl-C while the terminal is raw and signals are not generated.
    Interrupt,
}

/// Keyboard or terminal input device.
pub trait KeySource {
    /// Wait for the next key.
    ///
    /// Returns `Ok(None)` when nothing arrived within `timeout`. Back-ends that cannot
    /// time out block until input is available.
    fn next_key(&mut self, timeout: Duration) -> Result<Option<Key>, InputError>;

    fn name(&self) -> &str;
}

impl<S: KeySource + ?Sized> KeySource for Box<S> {
    fn next_key(&mut self, timeout: Duration) -> Result<Option<Key>, InputError> {
        (**self).next_key(timeout)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Input back-end that is only opened when the first key is requested, so the
/// terminal stays in its normal mode until someone is actually listening.
pub struct Keyboard {
    prefer_raw: bool,
    source: Option<Box<dyn KeySource + Send>>,
}

impl Keyboard {
    pub fn new(prefer_raw: bool) -> Self {
        Keyboard {
            prefer_raw,
            source: None,
        }
    }
}

impl KeySource for Keyboard {
    fn next_key(&mut self, timeout: Duration) -> Result<Option<Key>, InputError> {
        let prefer_raw = self.prefer_raw;
        self.source
            .get_or_insert_with(|| open(prefer_raw))
            .next_key(timeout)
    }

    fn name(&self) -> &str {
        self.source.as_ref().map_or("keyboard", |source| source.name())
    }
}

/// Open the preferred input back-end.
///
/// Raw single-key mode is tried first; when the terminal cannot be switched to raw
/// mode the line based prompt is used instead.
pub fn open(prefer_raw: bool) -> Box<dyn KeySource + Send> {
    if prefer_raw {
        match RawTerminal::open() {
            Ok(terminal) => return Box::new(terminal),
            Err(err) => warn!("{}, using line input", err),
        }
    }
    info!("Line input: type a command and press enter");
    Box::new(LineInput::stdin())
}
