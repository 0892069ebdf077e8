use tracing::debug;

use crate::cyk::{Backpointer, Chart};
use crate::error::ParseError;
use crate::grammar::Grammar;
use crate::rules::Rhs;
use crate::syntree::SynTree;

/// Conventional root label for parse reconstruction. Deliberately differs from
/// `GENERATE_ROOT`: parsed sentences have their `ROOT -> S mark` layer stripped.
pub const PARSE_ROOT: &str = "S";

impl Chart {
  /// Follows the stored best derivations down from `root` over the whole input.
  pub fn best_tree(&self, g: &Grammar, root: &str) -> Result<SynTree<String, String>, ParseError> {
    if self.is_empty() {
      return Err(ParseError::NoParse {
        symbol: root.to_string(),
        start: 0,
        end: 0,
      });
    }

    let tree = self.reconstruct(g, 0, self.len() - 1, root);
    if let Err(err) = &tree {
      debug!(%err, "no parse");
    }
    tree
  }

  fn reconstruct(
    &self,
    g: &Grammar,
    start: usize,
    end: usize,
    symbol: &str,
  ) -> Result<SynTree<String, String>, ParseError> {
    let no_parse = || ParseError::NoParse {
      symbol: symbol.to_string(),
      start,
      end,
    };

    let cell = self.cell(start, end);
    let entry = cell.get(symbol).ok_or_else(no_parse)?;

    match entry.back {
      Backpointer::Word => {
        let word = cell.word.clone().ok_or_else(no_parse)?;
        Ok(SynTree::Branch(symbol.to_string(), vec![SynTree::Leaf(word)]))
      }
      Backpointer::Split { rule, split } => {
        let Rhs::Binary(left, right) = &g.rule(rule).rhs else {
          return Err(no_parse());
        };
        let left = self.reconstruct(g, start, split, left)?;
        let right = self.reconstruct(g, split + 1, end, right)?;
        Ok(SynTree::Branch(symbol.to_string(), vec![left, right]))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cyk::parse_chart;

  #[test]
  fn test_dog_barks() {
    let g: Grammar = "S -> NP VP [1.0]; NP -> dog [1.0]; VP -> barks [1.0];"
      .parse()
      .unwrap();
    let tree = parse_chart(&g, &["dog", "barks"]).best_tree(&g, PARSE_ROOT).unwrap();
    assert_eq!(tree.to_string(), "(S (NP dog) (VP barks))");
  }

  #[test]
  fn test_unknown_word() {
    let g: Grammar = "S -> NP VP; NP -> dog; VP -> barks;".parse().unwrap();
    assert_eq!(
      parse_chart(&g, &["meows"]).best_tree(&g, PARSE_ROOT),
      Err(ParseError::NoParse {
        symbol: "S".to_string(),
        start: 0,
        end: 0,
      })
    );
    assert!(parse_chart(&g, &["dog", "meows"]).best_tree(&g, PARSE_ROOT).is_err());
  }

  #[test]
  fn test_empty_sentence() {
    let g: Grammar = "S -> NP VP; NP -> dog; VP -> barks;".parse().unwrap();
    assert!(parse_chart(&g, &[]).best_tree(&g, PARSE_ROOT).is_err());
  }

  #[test]
  fn test_wrong_root() {
    let g: Grammar = "S -> NP VP; NP -> dog; VP -> barks;".parse().unwrap();
    let chart = parse_chart(&g, &["dog", "barks"]);
    assert!(chart.best_tree(&g, "ROOT").is_err());
    // NP only covers the first word
    assert!(chart.best_tree(&g, "NP").is_err());
  }

  #[test]
  fn test_single_word_root() {
    let g: Grammar = "S -> hello;".parse().unwrap();
    let tree = parse_chart(&g, &["hello"]).best_tree(&g, PARSE_ROOT).unwrap();
    assert_eq!(tree.to_string(), "(S hello)");
  }

  #[test]
  fn test_prefers_heavier_rule() {
    let g: Grammar = r#"
      A -> B C [0.3];
      A -> B D [0.7];
      B -> b;
      C -> x;
      D -> x;
    "#
    .parse()
    .unwrap();
    let tree = parse_chart(&g, &["b", "x"]).best_tree(&g, "A").unwrap();
    assert_eq!(tree.to_string(), "(A (B b) (D x))");
  }

  #[test]
  fn test_pp_attachment() {
    // "saw the dog with the telescope": VP attachment outweighs NP attachment
    let g: Grammar = r#"
      S -> NP VP;
      VP -> V NP [0.6];
      VP -> VP PP [0.4];
      NP -> Det N [0.9];
      NP -> NP PP [0.1];
      PP -> P NP;
      Det -> the;
      N -> dog [0.5];
      N -> telescope [0.5];
      V -> saw;
      P -> with;
    "#
    .parse()
    .unwrap();

    let words = ["the", "dog", "saw", "the", "dog", "with", "the", "telescope"];
    let tree = parse_chart(&g, &words).best_tree(&g, PARSE_ROOT).unwrap();
    assert_eq!(
      tree.to_string(),
      "(S (NP (Det the) (N dog)) (VP (VP (V saw) (NP (Det the) (N dog))) (PP (P with) (NP (Det the) (N telescope)))))"
    );
    assert_eq!(
      tree.leaves().into_iter().cloned().collect::<Vec<_>>(),
      words.to_vec()
    );
  }
}
