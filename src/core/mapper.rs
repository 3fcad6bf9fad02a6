//! Coordinate conversion
//!
//! Converts single source positions to target positions:
//! 1. Query the interval index for blocks covering the position
//! 2. Offset the position into each block's target range
//! 3. Flip to forward-strand coordinates for reverse-strand chains
//!
//! Ambiguity is not resolved here: [`LiftOver::convert`] returns every hit
//! and callers treat anything other than exactly one hit as unmapped.

use crate::core::ChainIndex;

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    /// Parse strand from char
    ///
    /// # Examples
    /// ```
    /// use fast_hiclift::core::Strand;
    /// assert_eq!(Strand::from_char('+'), Some(Strand::Plus));
    /// assert_eq!(Strand::from_char('-'), Some(Strand::Minus));
    /// assert_eq!(Strand::from_char('.'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Plus),
            '-' => Some(Strand::Minus),
            _ => None,
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Chromosome ID style applied to input names before lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromStyle {
    /// Keep names as they appear in the input
    #[default]
    AsIs,
    /// Short style without "chr" prefix: "1", "2", "X", "Y", "M"
    Short,
    /// Long style with "chr" prefix: "chr1", "chr2", "chrX", "chrY", "chrM"
    Long,
}

/// Update chromosome ID according to the specified style
///
/// # Examples
/// ```
/// use fast_hiclift::core::{ChromStyle, update_chrom_id};
///
/// assert_eq!(update_chrom_id("chr1", ChromStyle::Short), "1");
/// assert_eq!(update_chrom_id("X", ChromStyle::Long), "chrX");
/// assert_eq!(update_chrom_id("CHR2", ChromStyle::Long), "chr2");
/// assert_eq!(update_chrom_id("chr1", ChromStyle::AsIs), "chr1");
/// ```
pub fn update_chrom_id(chrom: &str, style: ChromStyle) -> String {
    let has_prefix = chrom.len() > 3 && chrom[..3].eq_ignore_ascii_case("chr");
    match style {
        ChromStyle::AsIs => chrom.to_string(),
        ChromStyle::Short if has_prefix => chrom[3..].to_string(),
        ChromStyle::Short => chrom.to_string(),
        ChromStyle::Long if has_prefix => format!("chr{}", &chrom[3..]),
        ChromStyle::Long => format!("chr{}", chrom),
    }
}

/// A position on a named chromosome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locus<'a> {
    pub chrom: &'a str,
    pub pos: u64,
}

impl<'a> Locus<'a> {
    pub fn new(chrom: &'a str, pos: u64) -> Self {
        Self { chrom, pos }
    }
}

/// One converted position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiftedPosition<'a> {
    pub chrom: &'a str,
    /// Forward-strand target position
    pub pos: u64,
    /// Strand of the chain that produced this hit
    pub strand: Strand,
    pub score: u64,
}

/// Anything that can resolve a source position to a unique target locus
///
/// Implemented by [`LiftOver`] (exact interval queries) and by
/// [`MappingTable`](crate::core::MappingTable) (resolution-limited lookup).
/// `None` means unmapped: no hit, several hits, or no table entry.
pub trait CoordinateLookup: Sync {
    fn lift(&self, chrom: &str, pos: u64) -> Option<Locus<'_>>;
}

/// Point-coordinate converter over a chain index
pub struct LiftOver {
    index: ChainIndex,
}

impl LiftOver {
    pub fn new(index: ChainIndex) -> Self {
        Self { index }
    }

    /// Get a reference to the underlying index
    pub fn index(&self) -> &ChainIndex {
        &self.index
    }

    /// Convert a 0-based source position
    ///
    /// Returns one entry per covering block, in index order. Unknown
    /// chromosomes and uncovered positions give an empty vector.
    ///
    /// For a reverse-strand chain the block offset is computed on the
    /// reverse strand, then flipped: `target_size - target - 1`.
    pub fn convert(&self, chrom: &str, pos: u64) -> Vec<LiftedPosition<'_>> {
        self.index
            .query(chrom, pos)
            .into_iter()
            .map(|hit| {
                let chain = hit.chain;
                let target = hit.target_from + (pos - hit.source_from);
                let target = match chain.target_strand {
                    Strand::Plus => target,
                    Strand::Minus => chain.target_size - target - 1,
                };
                LiftedPosition {
                    chrom: chain.target_name.as_str(),
                    pos: target,
                    strand: chain.target_strand,
                    score: chain.score,
                }
            })
            .collect()
    }

    /// Convert a position, keeping it only if exactly one block covers it
    pub fn convert_unique(&self, chrom: &str, pos: u64) -> Option<Locus<'_>> {
        let mut hits = self.convert(chrom, pos);
        if hits.len() != 1 {
            return None;
        }
        hits.pop().map(|hit| Locus::new(hit.chrom, hit.pos))
    }
}

impl CoordinateLookup for LiftOver {
    fn lift(&self, chrom: &str, pos: u64) -> Option<Locus<'_>> {
        self.convert_unique(chrom, pos)
    }
}
