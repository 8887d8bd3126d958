// Pair list — the (person image, garment image) pairs that define the dataset
//
// One pair per line, two whitespace-separated names:
//
//   000001_0.jpg 001744_1.jpg
//   000010_0.jpg 004325_1.jpg
//
// Line order is dataset index order. Blank lines are skipped.

use std::path::Path;

use tryon_core::{Error, Result};

/// One (person, garment) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub person: String,
    pub garment: String,
}

/// All pairs of a subset, in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairList {
    pairs: Vec<Pair>,
}

impl PairList {
    /// Read a pair list file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
        Self::parse(&text).map_err(|reason| Error::malformed(path, reason))
    }

    /// Parse pair list text. The error string names the offending line.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut pairs = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let mut tokens = line.split_whitespace();
            let (person, garment) = match (tokens.next(), tokens.next(), tokens.next()) {
                (None, _, _) => continue,
                (Some(p), Some(g), None) => (p, g),
                _ => {
                    return Err(format!(
                        "line {}: expected 'person_name garment_name', got '{}'",
                        lineno + 1,
                        line.trim()
                    ))
                }
            };
            pairs.push(Pair {
                person: person.to_string(),
                garment: garment.to_string(),
            });
        }
        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The pair at `index`, or `IndexOutOfRange`.
    pub fn get(&self, index: usize) -> Result<&Pair> {
        self.pairs.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.pairs.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.iter()
    }
}
