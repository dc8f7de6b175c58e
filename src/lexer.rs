//! Line trimming and whitespace tokenization.
//!
//! No quoting, escaping or globbing is performed: a token is any run of
//! non-whitespace characters.

use crate::command::Command;
use tracing::warn;

/// Strips leading spaces/tabs and trailing spaces/tabs/newlines.
///
/// An all-whitespace input yields an empty string.
pub fn trim(s: &str) -> &str {
    s.trim_start_matches([' ', '\t'])
        .trim_end_matches([' ', '\t', '\n'])
}

/// Splits a line into a [`Command`], keeping at most `max_args` arguments.
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    max_args: usize,
}

impl Tokenizer {
    pub fn new(max_args: usize) -> Self {
        Self { max_args }
    }

    /// Tokenizes `input` on runs of whitespace.
    ///
    /// Arguments past the cap are dropped and a warning is logged.
    pub fn tokenize(&self, input: &str) -> Command {
        let mut words = input.split_whitespace();
        let argv: Vec<String> = words.by_ref().take(self.max_args).map(String::from).collect();

        let dropped = words.count();
        if dropped > 0 {
            warn!(
                max_args = self.max_args,
                dropped, "too many arguments, command truncated"
            );
        }

        Command::new(argv)
    }
}
