use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems constructing a grammar. There is no partially loaded grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
  #[error("couldn't read grammar {}: {source}", .path.display())]
  Load {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("line {line}: {message}")]
  Format { line: usize, message: String },
}

impl GrammarError {
  pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
    Self::Format {
      line,
      message: message.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  /// `symbol` doesn't derive the tokens `start..=end`
  #[error("no parse: `{symbol}` doesn't cover tokens {start}..={end}")]
  NoParse {
    symbol: String,
    start: usize,
    end: usize,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
  #[error("gave up after {attempts} attempts with {produced} of {wanted} sentences")]
  AttemptsExhausted {
    attempts: usize,
    produced: usize,
    wanted: usize,
  },
}
