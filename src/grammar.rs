use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::GrammarError;
use crate::parse_grammar::parse_rules;
use crate::rules::{Rhs, Rule, RuleIdx, SymbolKind};

/// An immutable, indexed set of weighted rules.
///
/// Rules live in a flat list in declaration order and every index refers into it
/// by `RuleIdx`, so a grammar can be shared between threads and between any
/// number of generate/parse calls.
#[derive(Debug, Clone)]
pub struct Grammar {
  rules: Vec<Rule>,
  /// lhs -> every rule with that lhs, in declaration order
  by_lhs: HashMap<String, Vec<RuleIdx>>,
  /// rhs1 -> rhs2 -> binary rules, at most one per lhs
  by_pair: HashMap<String, HashMap<String, Vec<RuleIdx>>>,
  /// word -> unary rules emitting it, at most one per lhs
  by_word: HashMap<String, Vec<RuleIdx>>,
  /// lhs -> total weight of its rules
  lhs_weight: HashMap<String, f64>,
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "//** nonterminals:")?;
    for nt in self.nonterminals() {
      write!(f, " {}", nt)?;
    }
    writeln!(f)?;

    for rule in self.rules.iter() {
      writeln!(f, "{};", rule)?;
    }

    Ok(())
  }
}

/// Pushes `idx` onto `list`, replacing an earlier rule with the same lhs.
/// A later duplicate declaration wins, though both still count toward the lhs weight.
fn push_last_wins(rules: &[Rule], list: &mut Vec<RuleIdx>, idx: RuleIdx) {
  let lhs = &rules[idx.index()].lhs;
  match list.iter_mut().find(|other| &rules[other.index()].lhs == lhs) {
    Some(existing) => *existing = idx,
    None => list.push(idx),
  }
}

impl Grammar {
  pub fn new(rules: Vec<Rule>) -> Self {
    let mut by_lhs: HashMap<String, Vec<RuleIdx>> = HashMap::new();
    let mut by_pair: HashMap<String, HashMap<String, Vec<RuleIdx>>> = HashMap::new();
    let mut by_word: HashMap<String, Vec<RuleIdx>> = HashMap::new();
    let mut lhs_weight: HashMap<String, f64> = HashMap::new();

    for (idx, rule) in rules.iter().enumerate() {
      let idx = RuleIdx(idx as u32);

      by_lhs.entry(rule.lhs.clone()).or_default().push(idx);
      *lhs_weight.entry(rule.lhs.clone()).or_insert(0.0) += rule.weight;

      match &rule.rhs {
        Rhs::Unary(word) => {
          push_last_wins(&rules, by_word.entry(word.clone()).or_default(), idx);
        }
        Rhs::Binary(left, right) => {
          let list = by_pair
            .entry(left.clone())
            .or_default()
            .entry(right.clone())
            .or_default();
          push_last_wins(&rules, list, idx);
        }
      }
    }

    debug!(
      rules = rules.len(),
      nonterminals = by_lhs.len(),
      "indexed grammar"
    );

    Self {
      rules,
      by_lhs,
      by_pair,
      by_word,
      lhs_weight,
    }
  }

  pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|source| GrammarError::Load {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), "loading grammar");
    src.parse()
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn rule(&self, idx: RuleIdx) -> &Rule {
    &self.rules[idx.index()]
  }

  /// A symbol is a nonterminal iff some rule rewrites it
  pub fn classify(&self, symbol: &str) -> SymbolKind {
    if self.by_lhs.contains_key(symbol) {
      SymbolKind::Nonterminal
    } else {
      SymbolKind::Terminal
    }
  }

  pub fn is_terminal(&self, symbol: &str) -> bool {
    self.classify(symbol) == SymbolKind::Terminal
  }

  /// Nonterminals in sorted order
  pub fn nonterminals(&self) -> BTreeSet<&str> {
    self.by_lhs.keys().map(String::as_str).collect()
  }

  /// All rules rewriting `lhs`, in declaration order. Empty if `lhs` is unproducible.
  pub fn rules_for(&self, lhs: &str) -> Vec<&Rule> {
    self
      .by_lhs
      .get(lhs)
      .map(|idxs| idxs.iter().map(|&idx| self.rule(idx)).collect())
      .unwrap_or_default()
  }

  /// Binary rules whose rhs is exactly `left right`
  pub fn binary_rules(&self, left: &str, right: &str) -> &[RuleIdx] {
    self
      .by_pair
      .get(left)
      .and_then(|rights| rights.get(right))
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  /// Unary rules whose single rhs symbol is exactly `word`
  pub fn lexical_rules(&self, word: &str) -> &[RuleIdx] {
    self.by_word.get(word).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn lhs_candidates_for(&self, left: &str, right: &str) -> Vec<&str> {
    self
      .binary_rules(left, right)
      .iter()
      .map(|&idx| self.rule(idx).lhs.as_str())
      .collect()
  }

  pub fn pre_terminals_for(&self, word: &str) -> Vec<&str> {
    self
      .lexical_rules(word)
      .iter()
      .map(|&idx| self.rule(idx).lhs.as_str())
      .collect()
  }

  /// Sum of the weights of every rule rewriting `lhs`, whatever its rhs
  pub fn lhs_weight(&self, lhs: &str) -> f64 {
    self.lhs_weight.get(lhs).copied().unwrap_or(0.0)
  }

  /// P(rule | lhs): the rule's weight over the total weight of its lhs,
  /// or 0 if every rule for the lhs has zero weight.
  pub fn probability(&self, rule: &Rule) -> f64 {
    let total = self.lhs_weight(&rule.lhs);
    if total > 0.0 { rule.weight / total } else { 0.0 }
  }
}

impl FromStr for Grammar {
  type Err = GrammarError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let rules = parse_rules(s)?;
    if rules.is_empty() {
      return Err(GrammarError::format(1, "empty ruleset"));
    }

    Ok(Self::new(rules))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn toy() -> Grammar {
    r#"
      S -> NP VP [3];
      S -> VP [1];
      NP -> Det N;
      VP -> V NP [2];
      VP -> barks [6];
      Det -> the;
      N -> dog [1];
      N -> cat [3];
      V -> saw;
      V -> barks [3];
    "#
    .parse()
    .unwrap()
  }

  #[test]
  fn smoke_test_fixtures() {
    let fixtures = [("toy.pcfg", include_str!("../grammars/toy.pcfg"))];

    for (filename, src) in fixtures {
      assert!(src.parse::<Grammar>().is_ok(), "failed to parse {filename}");
    }
  }

  #[test]
  fn test_classify() {
    let g = toy();
    assert_eq!(g.classify("S"), SymbolKind::Nonterminal);
    assert_eq!(g.classify("Det"), SymbolKind::Nonterminal);
    assert_eq!(g.classify("dog"), SymbolKind::Terminal);
    assert_eq!(g.classify("unheard"), SymbolKind::Terminal);
  }

  #[test]
  fn test_rules_for() {
    let g = toy();
    let vp = g.rules_for("VP");
    assert_eq!(vp.len(), 2);
    assert_eq!(vp[0].rhs, Rhs::Binary("V".into(), "NP".into()));
    assert_eq!(vp[1].rhs, Rhs::Unary("barks".into()));
    assert!(g.rules_for("dog").is_empty());
  }

  #[test]
  fn test_lookups() {
    let g = toy();
    assert_eq!(g.lhs_candidates_for("NP", "VP"), vec!["S"]);
    assert_eq!(g.lhs_candidates_for("V", "NP"), vec!["VP"]);
    assert!(g.lhs_candidates_for("VP", "NP").is_empty());

    assert_eq!(g.pre_terminals_for("barks"), vec!["VP", "V"]);
    assert_eq!(g.pre_terminals_for("the"), vec!["Det"]);
    assert!(g.pre_terminals_for("meows").is_empty());
  }

  #[test]
  fn test_probability_uses_every_rule_of_lhs() {
    let g = toy();
    assert_eq!(g.lhs_weight("VP"), 8.0);
    let barks = g.rules_for("VP")[1];
    assert_eq!(g.probability(barks), 0.75);
    let cat = g.rules_for("N")[1];
    assert_eq!(g.probability(cat), 0.75);
  }

  #[test]
  fn test_zero_weight_lhs() {
    let g: Grammar = "A -> x [0]; A -> y [0];".parse().unwrap();
    assert_eq!(g.probability(g.rules_for("A")[0]), 0.0);
  }

  #[test]
  fn test_duplicate_rule_last_wins() {
    let g: Grammar = "A -> B C [1]; A -> B C [3]; B -> b; C -> c;".parse().unwrap();
    let idxs = g.binary_rules("B", "C");
    assert_eq!(idxs.len(), 1);
    assert_eq!(g.rule(idxs[0]).weight, 3.0);
    assert_eq!(g.lhs_weight("A"), 4.0);
  }

  #[test]
  fn test_display_round_trips() {
    let g = toy();
    let reparsed: Grammar = g.to_string().parse().unwrap();
    assert_eq!(reparsed.rules(), g.rules());
  }

  #[test]
  fn test_empty_grammar() {
    assert!(matches!(
      "  // nothing here\n".parse::<Grammar>(),
      Err(GrammarError::Format { .. })
    ));
  }

  #[test]
  fn test_missing_file() {
    assert!(matches!(
      Grammar::read_from_file("grammars/does-not-exist.pcfg"),
      Err(GrammarError::Load { .. })
    ));
  }

  #[test]
  fn test_grammar_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Grammar>();
  }
}
