//! Interactive input as an explicit capability.
//!
//! Code that needs an answer from the user takes `&mut impl Prompt` instead of
//! reaching for stdin, so tests can script the answers.

use std::io::{BufRead, Write};

use inquire::{Password, PasswordDisplayMode, Text};

use crate::StravaError;

pub trait Prompt {
    /// Shows `question`, then blocks until an answer is available.
    ///
    /// The trailing newline is stripped. End of input yields an empty answer.
    fn ask(&mut self, question: &str) -> Result<String, StravaError>;

    /// Like [`Prompt::ask`], for answers that must not be echoed.
    fn ask_secret(&mut self, question: &str) -> Result<String, StravaError> {
        self.ask(question)
    }
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn ask(&mut self, question: &str) -> Result<String, StravaError> {
        (**self).ask(question)
    }

    fn ask_secret(&mut self, question: &str) -> Result<String, StravaError> {
        (**self).ask_secret(question)
    }
}

/// Prompts on the controlling terminal.
///
/// Ctrl-C or Esc while a prompt is open ends the run with
/// [`StravaError::Interrupted`].
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &str) -> Result<String, StravaError> {
        let message = leading_blank_lines(question);
        Ok(Text::new(message).prompt()?)
    }

    fn ask_secret(&mut self, question: &str) -> Result<String, StravaError> {
        let message = leading_blank_lines(question);
        Ok(Password::new(message)
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()?)
    }
}

/// Prints the question's leading newlines and returns the rest, trimmed.
fn leading_blank_lines(question: &str) -> &str {
    let message = question.trim_start_matches('\n');
    for _ in 0..question.len() - message.len() {
        println!();
    }
    message.trim_end()
}

/// Line-oriented prompt over any reader/writer pair.
#[derive(Debug)]
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
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn ask(&mut self, question: &str) -> Result<String, StravaError> {
        self.output.write_all(question.as_bytes())?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
