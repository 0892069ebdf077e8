/*
    Random top-down generation of derivation trees
*/

use rand::Rng;
use rand::distributions::Standard;
use tracing::{debug, trace};

use crate::error::GenerateError;
use crate::grammar::Grammar;
use crate::rules::Rule;
use crate::syntree::SynTree;

/// Default bound on expansion depth. Deeper attempts are abandoned.
pub const MAX_DEPTH: usize = 100;

/// Conventional start symbol for generation
pub const GENERATE_ROOT: &str = "ROOT";

/// Picks one of `rules` with probability proportional to its weight.
///
/// Draws uniformly from `[0, total weight)` and returns the first rule whose
/// cumulative weight reaches the draw. Returns `None` only for an empty slice.
pub fn choose_rule<'a, R: Rng + ?Sized>(rules: &[&'a Rule], rng: &mut R) -> Option<&'a Rule> {
  let cumulative = rules
    .iter()
    .scan(0.0, |acc, rule| {
      *acc += rule.weight;
      Some(*acc)
    })
    .collect::<Vec<f64>>();
  let total = *cumulative.last()?;

  let unit: f64 = rng.sample(Standard);
  let draw = unit * total;

  cumulative
    .iter()
    .position(|&c| c >= draw)
    .map(|idx| rules[idx])
    // rounding at the top of the range
    .or_else(|| rules.first().copied())
}

#[derive(Debug, Clone)]
pub struct Generator<'g> {
  grammar: &'g Grammar,
  start: String,
  max_depth: usize,
  max_attempts: Option<usize>,
}

impl<'g> Generator<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Self {
      grammar,
      start: GENERATE_ROOT.to_string(),
      max_depth: MAX_DEPTH,
      max_attempts: None,
    }
  }

  pub fn with_start(mut self, start: impl Into<String>) -> Self {
    self.start = start.into();
    self
  }

  pub fn with_max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = max_depth;
    self
  }

  /// Caps the total number of expansion attempts across one `generate` call.
  /// Without a cap a grammar that always fails will loop forever.
  pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
    self.max_attempts = Some(max_attempts);
    self
  }

  pub fn start(&self) -> &str {
    &self.start
  }

  /// Samples a tree below `symbol`. `None` means the attempt hit the depth bound
  /// or a symbol with no rules, and should be thrown away.
  pub fn expand<R: Rng + ?Sized>(
    &self,
    symbol: &str,
    depth: usize,
    rng: &mut R,
  ) -> Option<SynTree<String, String>> {
    if self.grammar.is_terminal(symbol) {
      return Some(SynTree::Leaf(symbol.to_string()));
    }

    if depth >= self.max_depth {
      return None;
    }

    let rules = self.grammar.rules_for(symbol);
    let rule = choose_rule(&rules, rng)?;

    let mut children = Vec::with_capacity(2);
    children.push(self.expand(rule.rhs.first(), depth + 1, rng)?);
    if let Some(second) = rule.rhs.second() {
      children.push(self.expand(second, depth + 1, rng)?);
    }

    Some(SynTree::Branch(symbol.to_string(), children))
  }

  /// Collects `count` trees from the start symbol, resampling failed attempts
  pub fn generate_trees<R: Rng + ?Sized>(
    &self,
    count: usize,
    rng: &mut R,
  ) -> Result<Vec<SynTree<String, String>>, GenerateError> {
    let mut trees = Vec::with_capacity(count);
    let mut attempts = 0;

    while trees.len() < count {
      if let Some(max_attempts) = self.max_attempts {
        if attempts >= max_attempts {
          return Err(GenerateError::AttemptsExhausted {
            attempts,
            produced: trees.len(),
            wanted: count,
          });
        }
      }
      attempts += 1;

      match self.expand(&self.start, 0, rng) {
        Some(tree) => trees.push(tree),
        None => trace!(attempt = attempts, "discarded failed expansion"),
      }
    }

    debug!(count, attempts, start = %self.start, "generated sentences");
    Ok(trees)
  }

  /// Like `generate_trees`, rendered as bracketed strings
  pub fn generate<R: Rng + ?Sized>(
    &self,
    count: usize,
    rng: &mut R,
  ) -> Result<Vec<String>, GenerateError> {
    Ok(
      self
        .generate_trees(count, rng)?
        .iter()
        .map(ToString::to_string)
        .collect(),
    )
  }
}
