//! wc — count lines, words and characters.

use std::fmt;

use crate::stage::{StageAbort, StageIo};

/// Running totals for `wc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordCount {
    pub lines: usize,
    pub words: usize,
    pub chars: usize,
}

impl WordCount {
    /// Account for one line.
    pub fn add_line(&mut self, line: &str) {
        self.lines += 1;
        self.words += count_words(line);
        self.chars += line.chars().count();
    }
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lines, self.words, self.chars)
    }
}

/// Words are the pieces between single spaces.
///
/// Empty pieces between consecutive spaces count, trailing empty pieces do
/// not, and a line with no space at all is one word even when empty.
fn count_words(line: &str) -> usize {
    if !line.contains(' ') {
        return 1;
    }
    let pieces: Vec<&str> = line.split(' ').collect();
    pieces.len() - pieces.iter().rev().take_while(|p| p.is_empty()).count()
}

/// Drain the input and emit one summary line.
pub async fn run(io: &mut StageIo) -> Result<(), StageAbort> {
    let mut count = WordCount::default();
    while let Some(line) = io.next_line().await? {
        count.add_line(&line);
    }
    io.emit(count.to_string())
}
