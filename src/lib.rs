#[macro_use]
extern crate lazy_static;

pub mod backtrack;
pub mod cyk;
pub mod error;
pub mod eval;
pub mod generate;
pub mod grammar;
pub mod parse_grammar;
pub mod rules;
pub mod syntree;
pub mod utils;

use rand::Rng;

use crate::cyk::{Chart, parse_chart};
pub use crate::backtrack::PARSE_ROOT;
pub use crate::error::{GenerateError, GrammarError, ParseError};
pub use crate::generate::{GENERATE_ROOT, Generator, MAX_DEPTH};
pub use crate::grammar::Grammar;
pub use crate::rules::{Rhs, Rule, SymbolKind};
pub use crate::syntree::SynTree;
pub use crate::utils::Err;

impl Grammar {
  pub fn parse_chart(&self, input: &[&str]) -> Chart {
    parse_chart(self, input)
  }

  /// The most probable derivation of `input` rooted at `PARSE_ROOT`
  pub fn parse(&self, input: &[&str]) -> Result<SynTree<String, String>, ParseError> {
    self.parse_chart(input).best_tree(self, PARSE_ROOT)
  }

  /// `count` random bracketed sentences from `start`
  pub fn generate<R: Rng + ?Sized>(
    &self,
    start: &str,
    count: usize,
    rng: &mut R,
  ) -> Result<Vec<String>, GenerateError> {
    Generator::new(self).with_start(start).generate(count, rng)
  }
}

#[test]
fn test_parse_what_was_generated() {
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  let g: Grammar = r#"
    S -> NP VP;
    NP -> Det N;
    VP -> V NP;
    Det -> the;
    N -> linguist;
    V -> parsed;
  "#
  .parse()
  .unwrap();

  let mut rng = StdRng::seed_from_u64(1);
  let generated = Generator::new(&g)
    .with_start(PARSE_ROOT)
    .generate_trees(1, &mut rng)
    .unwrap()
    .remove(0);
  let words = generated.leaves().into_iter().map(String::as_str).collect::<Vec<_>>();

  assert_eq!(words, vec!["the", "linguist", "parsed", "the", "linguist"]);
  assert_eq!(g.parse(&words).unwrap(), generated);
  assert_eq!(
    g.generate(PARSE_ROOT, 1, &mut rng).unwrap(),
    vec![generated.to_string()]
  );
}

#[test]
fn test_no_parse() {
  let g: Grammar = "S -> NP VP; NP -> dog; VP -> barks;".parse().unwrap();
  assert!(matches!(
    g.parse(&["unicorn"]),
    Err(ParseError::NoParse { .. })
  ));
  assert_eq!(
    g.parse(&["dog", "barks"]).unwrap().to_string(),
    "(S (NP dog) (VP barks))"
  );
}
