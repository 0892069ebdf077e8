//! Simple recursive-descent parsing of grammar files
//!
//! ```text
//! // comment
//! S -> NP VP [0.9];
//! NP -> dog;
//! ```
use crate::error::GrammarError;
use crate::rules::{Rhs, Rule};
use crate::utils::{line_of, regex_static};

type Infallible<'a, T> = (T, &'a str);
type ParseResult<'a, T> = Result<(T, &'a str), String>;

/// Try to consume a regex, returning None if it doesn't match
fn optional_re<'a>(re: &'static regex::Regex, s: &'a str) -> Infallible<'a, Option<&'a str>> {
  if let Some(m) = re.find(s) {
    if m.start() > 0 {
      return (None, s);
    }
    let (_, rest) = s.split_at(m.end());
    (Some(m.as_str()), rest)
  } else {
    (None, s)
  }
}

/// Try to consume a regex, failing if it doesn't match
fn needed_re<'a>(re: &'static regex::Regex, what: &str, s: &'a str) -> ParseResult<'a, &'a str> {
  if let (Some(c), rest) = optional_re(re, s) {
    Ok((c, rest))
  } else {
    Err(format!("expected {} at {}", what, snippet(s)))
  }
}

/// Try to consume a char, returning None if it doesn't match
fn optional_char(c: char, s: &str) -> Infallible<'_, Option<char>> {
  match s.strip_prefix(c) {
    Some(rest) => (Some(c), rest),
    None => (None, s),
  }
}

/// Skips whitespace and // comments
fn skip_whitespace(s: &str) -> &str {
  regex_static!(WHITESPACE_OR_COMMENT, r"^(\s+|//[^\n]*)*");
  optional_re(&WHITESPACE_OR_COMMENT, s).1
}

/// The rest of the current line, for error messages
fn snippet(s: &str) -> String {
  match s.lines().next() {
    Some(line) if !line.is_empty() => format!("`{}`", line.trim_end()),
    _ => "end of input".to_string(),
  }
}

/// Symbols are anything up to whitespace, `;`, or a weight bracket
fn parse_symbol(s: &str) -> ParseResult<'_, &str> {
  regex_static!(SYMBOL, r"^[^\s;\[\]]+");
  needed_re(&SYMBOL, "symbol", s)
}

/// Parses a bracketed non-negative weight: [0.25]
fn parse_weight(s: &str) -> ParseResult<'_, f64> {
  regex_static!(WEIGHT, r"^\[[^\]\n]*\]");
  let (bracketed, rest) = needed_re(&WEIGHT, "closed weight `[...]`", s)?;
  let text = bracketed[1..bracketed.len() - 1].trim();
  let weight = text
    .parse::<f64>()
    .map_err(|_| format!("weight `{}` is not a number", text))?;
  if !weight.is_finite() || weight < 0.0 {
    return Err(format!("weight `{}` must be finite and non-negative", text));
  }
  Ok((weight, rest))
}

/// lhs -> rhs1 [rhs2] [weight];
fn parse_rule(s: &str) -> ParseResult<'_, Rule> {
  #![allow(clippy::trivial_regex)]
  regex_static!(ARROW, "^->");

  let (lhs, s) = parse_symbol(s).map_err(|e| format!("rule lhs: {}", e))?;
  let s = skip_whitespace(s);
  let (_, s) = needed_re(&ARROW, "`->`", s).map_err(|e| format!("rule arrow: {}", e))?;

  let mut rhs = Vec::new();
  let mut weight = 1.0;
  let mut rem = s;
  loop {
    rem = skip_whitespace(rem);
    if let (Some(_), s) = optional_char(';', rem) {
      rem = s;
      break;
    }
    if rem.starts_with('[') {
      let (w, s) = parse_weight(rem).map_err(|e| format!("rule weight: {}", e))?;
      weight = w;
      let s = skip_whitespace(s);
      rem = match optional_char(';', s) {
        (Some(_), s) => s,
        (None, s) => return Err(format!("expected `;` after weight at {}", snippet(s))),
      };
      break;
    }
    if rem.is_empty() {
      return Err(format!("rule for `{}` is missing its closing `;`", lhs));
    }
    let (symbol, s) = parse_symbol(rem).map_err(|e| format!("rule rhs: {}", e))?;
    rhs.push(symbol);
    rem = s;
  }

  let rhs = match rhs.as_slice() {
    [a] => Rhs::Unary(a.to_string()),
    [a, b] => Rhs::Binary(a.to_string(), b.to_string()),
    _ => {
      return Err(format!(
        "rule for `{}` has {} rhs symbols, expected 1 or 2",
        lhs,
        rhs.len()
      ));
    }
  };

  Ok((Rule::new(lhs, rhs, weight), rem))
}

/// Parses every rule in `src`, reporting the line a malformed rule starts on
pub fn parse_rules(src: &str) -> Result<Vec<Rule>, GrammarError> {
  let mut rules = Vec::new();
  let mut rem = src;
  loop {
    rem = skip_whitespace(rem);
    if rem.is_empty() {
      return Ok(rules);
    }
    let (rule, s) = parse_rule(rem).map_err(|e| GrammarError::format(line_of(src, rem), e))?;
    rules.push(rule);
    rem = s;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn format_error(src: &str) -> (usize, String) {
    match parse_rules(src) {
      Err(GrammarError::Format { line, message }) => (line, message),
      other => panic!("expected a format error, got {:?}", other),
    }
  }

  #[test]
  fn test_parse_rules() {
    let rules = parse_rules(
      r#"
      // sentences
      ROOT -> S . [0.8];
      ROOT -> S ! [0.2];  // exclamations
      S -> NP VP;
      N -> dog [ 3 ];
      "#,
    )
    .unwrap();

    assert_eq!(
      rules,
      vec![
        Rule::binary("ROOT", "S", ".", 0.8),
        Rule::binary("ROOT", "S", "!", 0.2),
        Rule::binary("S", "NP", "VP", 1.0),
        Rule::unary("N", "dog", 3.0),
      ]
    );
  }

  #[test]
  fn test_leading_comment_and_no_trailing_newline() {
    let rules = parse_rules("// header\nA -> b;").unwrap();
    assert_eq!(rules, vec![Rule::unary("A", "b", 1.0)]);
  }

  #[test]
  fn test_rhs_arity() {
    let (line, message) = format_error("A -> b;\nA -> b c d;");
    assert_eq!(line, 2);
    assert!(message.contains("3 rhs symbols"), "{}", message);

    let (line, _) = format_error("A -> ;");
    assert_eq!(line, 1);
  }

  #[test]
  fn test_missing_arrow() {
    let (line, message) = format_error("\n\nA b c;");
    assert_eq!(line, 3);
    assert!(message.contains("arrow"), "{}", message);
  }

  #[test]
  fn test_bad_weights() {
    assert!(format_error("A -> b [-1];").1.contains("non-negative"));
    assert!(format_error("A -> b [inf];").1.contains("non-negative"));
    assert!(format_error("A -> b [heavy];").1.contains("not a number"));
    assert!(format_error("A -> b [0.5;").1.contains("weight"));
    assert!(format_error("A -> b [0.5] c;").1.contains("`;`"));
  }

  #[test]
  fn test_unterminated_rule() {
    assert!(format_error("A -> b c").1.contains("closing `;`"));
  }
}
