use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pcfg::eval::{RoundTrip, sentence_tokens};
use pcfg::{Err, GENERATE_ROOT, Generator, Grammar, MAX_DEPTH, PARSE_ROOT, SynTree};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print randomly generated bracketed sentences
  Generate {
    /// File containing the grammar
    grammar: PathBuf,

    /// Amount to generate
    #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
    amount: usize,

    /// Start symbol
    #[arg(short, long, value_name = "SYMBOL", default_value = GENERATE_ROOT)]
    start: String,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Abandon expansions deeper than this
    #[arg(long, default_value_t = MAX_DEPTH)]
    max_depth: usize,

    /// Give up after this many expansion attempts
    #[arg(long)]
    max_attempts: Option<usize>,

    /// Indent trees over several lines
    #[arg(short, long)]
    pretty: bool,
  },

  /// Re-parse bracketed sentences from stdin and report how many round trip
  Parse {
    /// File containing the grammar
    grammar: PathBuf,

    /// Root symbol of the reconstructed parse
    #[arg(short, long, value_name = "SYMBOL", default_value = PARSE_ROOT)]
    root: String,

    /// Print the parse chart for each sentence
    #[arg(short, long)]
    chart: bool,

    /// Indent trees over several lines (skips the round-trip comparison)
    #[arg(short, long)]
    pretty: bool,
  },
}

fn render(tree: &SynTree<String, String>, pretty: bool) -> String {
  if pretty { tree.pretty() } else { tree.to_string() }
}

fn generate(
  g: &Grammar,
  amount: usize,
  start: String,
  seed: Option<u64>,
  max_depth: usize,
  max_attempts: Option<usize>,
  pretty: bool,
) -> Result<(), Err> {
  let mut rng = match seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };

  let mut generator = Generator::new(g).with_start(start).with_max_depth(max_depth);
  if let Some(max_attempts) = max_attempts {
    generator = generator.with_max_attempts(max_attempts);
  }

  let mut stdout = io::stdout().lock();
  for tree in generator.generate_trees(amount, &mut rng)? {
    writeln!(stdout, "{}", render(&tree, pretty))?;
  }

  Ok(())
}

fn parse(g: &Grammar, root: &str, print_chart: bool, pretty: bool) -> Result<(), Err> {
  let mut tally = RoundTrip::new();
  let mut stdout = io::stdout().lock();

  for line in io::stdin().lock().lines() {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }

    if print_chart {
      let tokens = sentence_tokens(g, &line);
      let tokens = tokens.iter().map(String::as_str).collect::<Vec<_>>();
      writeln!(stdout, "chart:\n{}", g.parse_chart(&tokens))?;
    }

    if root == PARSE_ROOT && !pretty {
      match tally.record(g, &line) {
        Ok(reparsed) => writeln!(stdout, "{}", reparsed)?,
        Err(err) => writeln!(stdout, "{}", err)?,
      }
    } else {
      // other roots and indented output can't be compared against the input line
      let tokens = sentence_tokens(g, &line);
      let tokens = tokens.iter().map(String::as_str).collect::<Vec<_>>();
      match g.parse_chart(&tokens).best_tree(g, root) {
        Ok(tree) => writeln!(stdout, "{}", render(&tree, pretty))?,
        Err(err) => writeln!(stdout, "{}", err)?,
      }
    }
  }

  if let Some(accuracy) = tally.accuracy() {
    info!(correct = tally.correct, total = tally.total, "round trip");
    writeln!(stdout, "{}", accuracy)?;
  }

  Ok(())
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Command::Generate {
      grammar,
      amount,
      start,
      seed,
      max_depth,
      max_attempts,
      pretty,
    } => {
      let g = Grammar::read_from_file(&grammar)?;
      generate(&g, amount, start, seed, max_depth, max_attempts, pretty)
    }
    Command::Parse {
      grammar,
      root,
      chart,
      pretty,
    } => {
      let g = Grammar::read_from_file(&grammar)?;
      parse(&g, &root, chart, pretty)
    }
  }
}
