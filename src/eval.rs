//! Round-trip evaluation: re-parse bracketed sentences and count how many come
//! back identical.
//!
//! Input lines look like generator output, `(ROOT (S (NP dog) (VP barks)) .)`.
//! The words are recovered by stripping every non-letter and dropping anything
//! the grammar knows as a category; the best parse rooted at `S` is then
//! wrapped back up as `(ROOT <parse> <mark>)` and compared with the line.

use tracing::debug;

use crate::backtrack::PARSE_ROOT;
use crate::error::ParseError;
use crate::generate::GENERATE_ROOT;
use crate::grammar::Grammar;
use crate::utils::regex_static;

/// Words excluded from the token sequence even if the grammar never defines them
const SENTENCE_MARKS: [&str; 2] = [".", "!"];

/// The terminal tokens of a bracketed line, in order
pub fn sentence_tokens(g: &Grammar, line: &str) -> Vec<String> {
  regex_static!(NON_LETTERS, r"[^a-zA-Z]");

  line
    .split(' ')
    .map(|piece| NON_LETTERS.replace_all(piece, "").into_owned())
    .filter(|word| !word.is_empty())
    .filter(|word| g.is_terminal(word) && !SENTENCE_MARKS.contains(&word.as_str()))
    .collect()
}

/// The sentence-final mark of a bracketed line: the character before its last `)`
pub fn sentence_mark(line: &str) -> Option<char> {
  line.trim_end().chars().rev().nth(1)
}

/// Parses the words of `line` and rebuilds the full bracketed form
pub fn reparse_line(g: &Grammar, line: &str) -> Result<String, ParseError> {
  let tokens = sentence_tokens(g, line);
  let tokens = tokens.iter().map(String::as_str).collect::<Vec<_>>();
  let tree = g.parse_chart(&tokens).best_tree(g, PARSE_ROOT)?;

  Ok(match sentence_mark(line) {
    Some(mark) => format!("({} {} {})", GENERATE_ROOT, tree, mark),
    None => format!("({} {})", GENERATE_ROOT, tree),
  })
}

/// Running tally of exact round trips
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundTrip {
  pub total: usize,
  pub correct: usize,
}

impl RoundTrip {
  pub fn new() -> Self {
    Self::default()
  }

  /// Re-parses one line, counting it as correct only if it reproduces exactly.
  pub fn record(&mut self, g: &Grammar, line: &str) -> Result<String, ParseError> {
    self.total += 1;
    let result = reparse_line(g, line);
    match &result {
      Ok(reparsed) if reparsed == line => self.correct += 1,
      Ok(reparsed) => debug!(%line, %reparsed, "round trip differs"),
      Err(err) => debug!(%line, %err, "round trip failed"),
    }
    result
  }

  /// Fraction of lines reproduced exactly, or `None` before any line
  pub fn accuracy(&self) -> Option<f64> {
    if self.total == 0 {
      None
    } else {
      Some(self.correct as f64 / self.total as f64)
    }
  }
}
