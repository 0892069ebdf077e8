use std::fmt;

/// Whether a symbol is a literal word or a grammar-defined category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
  Terminal,
  Nonterminal,
}

/// Index of a rule in its grammar's rule list
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RuleIdx(pub u32);

impl RuleIdx {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Right-hand side of a rule. Grammars are restricted to one or two symbols:
/// unary rules emit words (or rename a category), binary rules combine spans.
#[derive(Debug, Clone, PartialEq)]
pub enum Rhs {
  Unary(String),
  Binary(String, String),
}

impl Rhs {
  pub fn first(&self) -> &str {
    match self {
      Self::Unary(s) | Self::Binary(s, _) => s,
    }
  }

  pub fn second(&self) -> Option<&str> {
    match self {
      Self::Unary(_) => None,
      Self::Binary(_, s) => Some(s),
    }
  }

  pub fn is_unary(&self) -> bool {
    matches!(self, Self::Unary(_))
  }

  pub fn is_binary(&self) -> bool {
    matches!(self, Self::Binary(_, _))
  }
}

impl fmt::Display for Rhs {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Unary(a) => write!(f, "{}", a),
      Self::Binary(a, b) => write!(f, "{} {}", a, b),
    }
  }
}

/// A weighted production. Weights are unnormalized; see `Grammar::probability`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
  pub lhs: String,
  pub rhs: Rhs,
  pub weight: f64,
}

impl Rule {
  pub fn new(lhs: impl Into<String>, rhs: Rhs, weight: f64) -> Self {
    Self {
      lhs: lhs.into(),
      rhs,
      weight,
    }
  }

  pub fn unary(lhs: impl Into<String>, word: impl Into<String>, weight: f64) -> Self {
    Self::new(lhs, Rhs::Unary(word.into()), weight)
  }

  pub fn binary(
    lhs: impl Into<String>,
    left: impl Into<String>,
    right: impl Into<String>,
    weight: f64,
  ) -> Self {
    Self::new(lhs, Rhs::Binary(left.into(), right.into()), weight)
  }

  /// True if this is a unary rule emitting exactly `word`
  pub fn emits(&self, word: &str) -> bool {
    matches!(&self.rhs, Rhs::Unary(w) if w == word)
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} -> {} [{}]", self.lhs, self.rhs, self.weight)
  }
}

#[test]
fn test_rule_display() {
  assert_eq!(Rule::binary("S", "NP", "VP", 0.5).to_string(), "S -> NP VP [0.5]");
  assert_eq!(Rule::unary("N", "dog", 1.0).to_string(), "N -> dog [1]");
}

#[test]
fn test_emits() {
  let rule = Rule::unary("N", "dog", 1.0);
  assert!(rule.emits("dog"));
  assert!(!rule.emits("cat"));
  assert!(!Rule::binary("N", "dog", "dog", 1.0).emits("dog"));
}
