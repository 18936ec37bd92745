// src/prompt.rs
use std::io::{BufRead, Write};

use crate::validate::ValidationError;

/// Where route names come from.
pub trait Prompt {
    /// Asks until `validate` accepts the answer. `None` means the user
    /// cancelled.
    fn ask(
        &mut self,
        message: &str,
        validate: &dyn Fn(&str) -> Result<(), ValidationError>,
    ) -> Option<String>;

    /// Shows a message that does not need an answer.
    fn report(&mut self, message: &str);
}

/// Line-oriented prompt over any reader/writer pair, stdin/stderr in the
/// binary. An empty line or end of input cancels.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, text: &str, newline: bool) {
        let written = if newline {
            writeln!(self.output, "{text}")
        } else {
            write!(self.output, "{text} ")
        };
        if let Err(e) = written.and_then(|()| self.output.flush()) {
            log::warn!("failed to write prompt: {e}");
        }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn ask(
        &mut self,
        message: &str,
        validate: &dyn Fn(&str) -> Result<(), ValidationError>,
    ) -> Option<String> {
        loop {
            self.say(message, false);
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    log::warn!("failed to read answer: {e}");
                    return None;
                }
            }
            let answer = line.trim_end_matches(['\r', '\n']);
            if answer.is_empty() {
                return None;
            }
            match validate(answer) {
                Ok(()) => return Some(answer.to_string()),
                Err(reason) => self.say(&format!("✗ {reason}"), true),
            }
        }
    }

    fn report(&mut self, message: &str) {
        self.say(&format!("⚠️ {message}"), true);
    }
}
