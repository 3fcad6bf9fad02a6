//! Chromosome size files and chromosome ordering
//!
//! A size file is whitespace-delimited: `name size` per line. Row order
//! defines the rank used to orient contact pairs (upper-triangle shape).

use crate::core::error::{LiftoverError, Result};
use crate::core::mapper::Locus;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

/// Chromosome sizes in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChromSizes {
    entries: Vec<(String, u64)>,
}

impl ChromSizes {
    pub fn new(entries: Vec<(String, u64)>) -> Self {
        Self { entries }
    }

    /// Load sizes from a file (gzip/bzip2 handled transparently)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LiftoverError::FileNotFound(path.to_path_buf()));
        }
        Self::from_reader(crate::core::io::open_text_reader(path)?)
    }

    /// Parse sizes from a reader; blank lines and `#` comments are skipped
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut entries = Vec::new();

        for (line_idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (name, size) = match (fields.next(), fields.next()) {
                (Some(name), Some(size)) => (name, size),
                _ => {
                    return Err(LiftoverError::ChromSizes {
                        line: line_idx + 1,
                        message: "expected two columns: chrom and size".to_string(),
                    })
                }
            };
            let size = size.parse::<u64>().map_err(|_| LiftoverError::ChromSizes {
                line: line_idx + 1,
                message: format!("invalid chromosome size '{}'", size),
            })?;

            entries.push((name.to_string(), size));
        }

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(name, size)| (name.as_str(), *size))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, chrom: &str) -> Option<u64> {
        self.entries.iter().find(|(name, _)| name == chrom).map(|(_, size)| *size)
    }
}

/// Rank of each chromosome by first appearance in an assembly's list
///
/// Used only to compare loci. Names not in the list have no rank; callers
/// drop such loci before asking for an order.
#[derive(Debug, Clone, Default)]
pub struct ChromOrder {
    ranks: HashMap<Arc<str>, usize>,
}

impl ChromOrder {
    /// Build from chromosome names in order; a repeated name keeps its first rank
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ranks = HashMap::new();
        for name in names {
            let next = ranks.len();
            let name: String = name.into();
            ranks.entry(Arc::<str>::from(name)).or_insert(next);
        }
        Self { ranks }
    }

    pub fn from_sizes(sizes: &ChromSizes) -> Self {
        Self::new(sizes.iter().map(|(name, _)| name))
    }

    pub fn rank(&self, chrom: &str) -> Option<usize> {
        self.ranks.get(chrom).copied()
    }

    pub fn contains(&self, chrom: &str) -> bool {
        self.ranks.contains_key(chrom)
    }

    /// Shared handle to the stored name, so output records never copy it
    pub fn resolve(&self, chrom: &str) -> Option<Arc<str>> {
        self.ranks.get_key_value(chrom).map(|(name, _)| Arc::clone(name))
    }

    /// Compare `(rank, pos)` tuples; `None` if either chromosome is unknown
    pub fn compare(&self, a: &Locus<'_>, b: &Locus<'_>) -> Option<Ordering> {
        let ra = self.rank(a.chrom)?;
        let rb = self.rank(b.chrom)?;
        Some((ra, a.pos).cmp(&(rb, b.pos)))
    }

    /// `a <= b` under the chromosome ranking
    ///
    /// Loci on unknown chromosomes are never in correct order.
    pub fn has_correct_order(&self, a: &Locus<'_>, b: &Locus<'_>) -> bool {
        matches!(self.compare(a, b), Some(Ordering::Less | Ordering::Equal))
    }
}
