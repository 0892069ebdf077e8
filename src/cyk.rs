use std::fmt;

use tracing::{debug, trace};

use crate::grammar::Grammar;
use crate::rules::RuleIdx;

/// How the best derivation of a symbol over a span was built
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backpointer {
  /// The symbol emits the span's single word
  Word,
  /// `rule` combined the cells `start..=split` and `split + 1..=end`
  Split { rule: RuleIdx, split: usize },
}

/// The best derivation of one symbol over one span
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
  pub symbol: String,
  pub prob: f64,
  pub back: Backpointer,
}

/// Everything that derives one span. Entries are kept in first-found order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
  /// The covered token, for single-word spans
  pub word: Option<String>,
  entries: Vec<Entry>,
}

impl Cell {
  pub fn entries(&self) -> &[Entry] {
    &self.entries
  }

  pub fn get(&self, symbol: &str) -> Option<&Entry> {
    self.entries.iter().find(|e| e.symbol == symbol)
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Keeps `entry` if its symbol is new here or it strictly beats the stored one.
  /// Returns whether the cell changed.
  pub fn offer(&mut self, entry: Entry) -> bool {
    match self.entries.iter_mut().find(|e| e.symbol == entry.symbol) {
      None => {
        self.entries.push(entry);
        true
      }
      Some(existing) if existing.prob < entry.prob => {
        *existing = entry;
        true
      }
      Some(_) => false,
    }
  }
}

/// Triangular table of cells over every `start..=end` span of the input,
/// stored flat and row-major by `start`.
#[derive(Debug)]
pub struct Chart {
  len: usize,
  cells: Vec<Cell>,
}

impl Chart {
  pub fn new(length: usize) -> Self {
    Self {
      len: length,
      cells: vec![Cell::default(); length * (length + 1) / 2],
    }
  }

  /// Number of input tokens
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn idx(&self, start: usize, end: usize) -> usize {
    assert!(
      start <= end && end < self.len,
      "span {}..={} outside chart of {}",
      start,
      end,
      self.len
    );
    // rows before `start` hold len, len - 1, ... cells
    start * self.len - start * start.saturating_sub(1) / 2 + (end - start)
  }

  pub fn cell(&self, start: usize, end: usize) -> &Cell {
    &self.cells[self.idx(start, end)]
  }

  fn cell_mut(&mut self, start: usize, end: usize) -> &mut Cell {
    let idx = self.idx(start, end);
    &mut self.cells[idx]
  }

  /// Number of (span, symbol) derivations in the chart
  pub fn entry_count(&self) -> usize {
    self.cells.iter().map(|c| c.entries.len()).sum()
  }
}

impl fmt::Display for Chart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for width in 1..=self.len {
      for start in 0..=self.len - width {
        let end = start + width - 1;
        let cell = self.cell(start, end);
        if cell.is_empty() {
          continue;
        }
        match &cell.word {
          Some(word) => writeln!(f, "{}..={} `{}`:", start, end, word)?,
          None => writeln!(f, "{}..={}:", start, end)?,
        }
        for entry in cell.entries() {
          match entry.back {
            Backpointer::Word => writeln!(f, "  {} {:e}", entry.symbol, entry.prob)?,
            Backpointer::Split { split, .. } => writeln!(
              f,
              "  {} {:e} split {}",
              entry.symbol, entry.prob, split
            )?,
          }
        }
      }
    }
    Ok(())
  }
}

/// Single-word spans: every pre-terminal that can emit the word,
/// weighted by P(pre-terminal -> word)
fn fill_word(g: &Grammar, cell: &mut Cell, word: &str) {
  cell.word = Some(word.to_string());
  for &rule_idx in g.lexical_rules(word) {
    let rule = g.rule(rule_idx);
    cell.offer(Entry {
      symbol: rule.lhs.clone(),
      prob: g.probability(rule),
      back: Backpointer::Word,
    });
  }
}

/// Wider spans: every binary rule over every split, keeping the most probable
/// derivation per symbol. Ties keep whichever was found first.
fn fill_span(g: &Grammar, chart: &Chart, start: usize, end: usize) -> Cell {
  let mut cell = Cell::default();

  for split in start..end {
    let left = chart.cell(start, split);
    let right = chart.cell(split + 1, end);

    for l in left.entries() {
      for r in right.entries() {
        let base = l.prob * r.prob;

        for &rule_idx in g.binary_rules(&l.symbol, &r.symbol) {
          let rule = g.rule(rule_idx);
          let prob = g.probability(rule) * base;
          let improved = cell.offer(Entry {
            symbol: rule.lhs.clone(),
            prob,
            back: Backpointer::Split {
              rule: rule_idx,
              split,
            },
          });
          if improved {
            trace!(start, end, split, symbol = %rule.lhs, prob, "chart improved");
          }
        }
      }
    }
  }

  cell
}

/// Fills a chart for `input` bottom-up, by increasing span width
pub fn parse_chart(g: &Grammar, input: &[&str]) -> Chart {
  let mut chart = Chart::new(input.len());

  for (i, word) in input.iter().enumerate() {
    fill_word(g, chart.cell_mut(i, i), word);
  }

  for width in 2..=chart.len() {
    for start in 0..=chart.len() - width {
      let end = start + width - 1;
      let cell = fill_span(g, &chart, start, end);
      *chart.cell_mut(start, end) = cell;
    }
  }

  debug!(
    tokens = chart.len(),
    entries = chart.entry_count(),
    "filled chart"
  );

  chart
}
