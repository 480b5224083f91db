use std::{
    io::{self, BufRead, BufReader, Stdin, Stdout, Write},
    time::Duration,
};

use crate::{InputError, Key, KeySource};

const PROMPT: &str = "Enter command (w/a/s/d/space/z/q/e): ";

/// Prompt driven fallback that reads one token per line.
pub struct LineInput<R, W> {
    reader: R,
    writer: W,
    buffer: String,
}

impl LineInput<BufReader<Stdin>, Stdout> {
    pub fn stdin() -> Self {
        LineInput::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> LineInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        LineInput {
            reader,
            writer,
            buffer: String::new(),
        }
    }
}

impl<R: BufRead, W: Write> KeySource for LineInput<R, W> {
    // Blocks for a whole line; the timeout cannot be honoured.
    fn next_key(&mut self, _timeout: Duration) -> Result<Option<Key>, InputError> {
        self.writer.write_all(PROMPT.as_bytes())?;
        self.writer.flush()?;

        self.buffer.clear();
        if self.reader.read_line(&mut self.buffer)? == 0 {
            return Err(InputError::Closed);
        }

        let token = self.buffer.trim();
        let mut chars = token.chars();
        Ok(match (chars.next(), chars.next()) {
            (None, _) => None,
            (Some(c), None) => Some(Key::Char(c)),
            _ => Some(Key::Word(token.to_lowercase())),
        })
    }

    fn name(&self) -> &str {
        "line input"
    }
}
