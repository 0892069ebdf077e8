use std::fmt;

/// A derivation tree. Branches are labelled with a category, leaves with a word.
///
/// `Display` renders the single-line bracketed form, `(S (NP dog) (VP barks))`;
/// `pretty` renders the same tree indented over several lines.
#[derive(Debug, PartialEq, Clone)]
pub enum SynTree<T, U> {
  Branch(T, Vec<SynTree<T, U>>),
  Leaf(U),
}

impl<T, U> SynTree<T, U> {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn is_branch(&self) -> bool {
    matches!(self, Self::Branch(_, _))
  }

  pub fn get_leaf(&self) -> Option<&U> {
    match self {
      Self::Leaf(w) => Some(w),
      _ => None,
    }
  }

  pub fn get_branch(&self) -> Option<(&T, &Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  /// The words under this tree, left to right
  pub fn leaves(&self) -> Vec<&U> {
    let mut out = Vec::new();
    self.collect_leaves(&mut out);
    out
  }

  fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a U>) {
    match self {
      Self::Leaf(w) => out.push(w),
      Self::Branch(_, children) => {
        for child in children {
          child.collect_leaves(out);
        }
      }
    }
  }

  /// Number of branch levels on the longest root-to-leaf path
  pub fn height(&self) -> usize {
    match self {
      Self::Leaf(_) => 0,
      Self::Branch(_, children) => 1 + children.iter().map(Self::height).max().unwrap_or(0),
    }
  }
}

impl<T, U> SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  /// Multi-line rendering: a branch whose only child is a leaf stays on one line,
  /// everything else puts each child on its own indented line.
  pub fn pretty(&self) -> String {
    match self {
      Self::Leaf(w) => w.to_string(),
      Self::Branch(t, ts) => {
        if let [only] = ts.as_slice() {
          if only.is_leaf() {
            return format!("({} {})", t, only);
          }
        }
        let mut out = format!("({}", t);
        for child in ts.iter() {
          for line in child.pretty().lines() {
            out.push_str("\n  ");
            out.push_str(line);
          }
        }
        out.push(')');
        out
      }
    }
  }
}

impl<T, U> fmt::Display for SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(w) => write!(f, "{}", w),
      Self::Branch(t, ts) => {
        write!(f, "({}", t)?;
        for child in ts.iter() {
          write!(f, " {}", child)?;
        }
        write!(f, ")")
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  type Tree = SynTree<&'static str, &'static str>;

  fn branch(label: &'static str, children: Vec<Tree>) -> Tree {
    SynTree::Branch(label, children)
  }

  fn preterminal(label: &'static str, word: &'static str) -> Tree {
    branch(label, vec![SynTree::Leaf(word)])
  }

  fn dog_barks() -> Tree {
    branch(
      "S",
      vec![preterminal("NP", "dog"), preterminal("VP", "barks")],
    )
  }

  #[test]
  fn test_bracketed() {
    assert_eq!(dog_barks().to_string(), "(S (NP dog) (VP barks))");
    assert_eq!(Tree::Leaf("dog").to_string(), "dog");
  }

  #[test]
  fn test_pretty() {
    assert_eq!(dog_barks().pretty(), "(S\n  (NP dog)\n  (VP barks))");
  }

  #[test]
  fn test_leaves_and_height() {
    let tree = dog_barks();
    assert_eq!(tree.leaves(), vec![&"dog", &"barks"]);
    assert_eq!(tree.height(), 2);
    assert!(tree.is_branch());
    assert_eq!(tree.get_branch().map(|(label, _)| *label), Some("S"));
    assert_eq!(Tree::Leaf("x").get_leaf(), Some(&"x"));
  }
}
