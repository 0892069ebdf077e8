use std::error::Error;

/// Boxed static error type
pub type Err = Box<dyn Error + 'static>;

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: regex::Regex = regex::Regex::new($pattern).unwrap();
    }
  };
}

pub(crate) use regex_static;

/// Counts the 1-based line that `rest` starts on, where `rest` is a suffix of `src`
pub(crate) fn line_of(src: &str, rest: &str) -> usize {
  let consumed = src.len().saturating_sub(rest.len());
  src[..consumed].matches('\n').count() + 1
}

#[test]
fn test_line_of() {
  let src = "a\nb\nc";
  assert_eq!(line_of(src, src), 1);
  assert_eq!(line_of(src, &src[2..]), 2);
  assert_eq!(line_of(src, &src[4..]), 3);
  assert_eq!(line_of(src, ""), 3);
}
