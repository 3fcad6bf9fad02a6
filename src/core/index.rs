//! Interval index over chain blocks
//!
//! Uses rust-lapper for O(log n + k) overlap queries. Blocks from different
//! chains may overlap on the source chromosome, so a query can return
//! several hits.

use crate::core::chain::{parse_chain_file, parse_chain_reader, Chain};
use crate::core::error::{ChromSide, ChromSizeConflictError, LiftoverError};
use rust_lapper::{Interval, Lapper};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// Side-table entry for one indexed block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    /// Target start of the block (target strand coordinates)
    pub target_from: u64,
    /// Position of the owning chain in [`ChainIndex::chains`]
    pub chain: usize,
}

/// Type alias for block intervals; the value is a side-table slot
pub type BlockInterval = Interval<u64, usize>;

/// One block overlapping a queried position
#[derive(Debug, Clone, Copy)]
pub struct IndexHit<'a> {
    pub source_from: u64,
    pub source_to: u64,
    pub target_from: u64,
    pub chain: &'a Chain,
}

/// Interval index organized by source chromosome
#[derive(Debug)]
pub struct ChainIndex {
    chains: Vec<Chain>,
    /// Source chromosome -> block intervals
    maps: HashMap<String, Lapper<u64, usize>>,
    /// Interval value -> (target_from, owning chain)
    blocks: Vec<BlockRef>,
    source_sizes: HashMap<String, u64>,
    target_sizes: HashMap<String, u64>,
}

impl ChainIndex {
    /// Parse and index a chain file (gzip/bzip2 handled transparently)
    ///
    /// # Example
    /// ```ignore
    /// let index = ChainIndex::from_chain_file("hg19ToHg38.over.chain.gz")?;
    /// ```
    pub fn from_chain_file<P: AsRef<Path>>(path: P) -> Result<Self, LiftoverError> {
        let chains = parse_chain_file(path.as_ref())?;
        Ok(Self::from_chains(chains)?)
    }

    /// Parse and index an already-open chain stream
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LiftoverError> {
        let chains = parse_chain_reader(reader)?;
        Ok(Self::from_chains(chains)?)
    }

    /// Build the index from parsed chains
    ///
    /// Fails if two chains disagree on the size of a chromosome, on either
    /// the source or the target side. Nothing is indexed in that case.
    pub fn from_chains(chains: Vec<Chain>) -> Result<Self, ChromSizeConflictError> {
        let mut source_sizes: HashMap<String, u64> = HashMap::new();
        let mut target_sizes: HashMap<String, u64> = HashMap::new();
        let mut intervals_by_chrom: HashMap<String, Vec<BlockInterval>> = HashMap::new();
        let mut blocks = Vec::new();

        for (chain_idx, chain) in chains.iter().enumerate() {
            record_size(&mut source_sizes, &chain.source_name, chain.source_size, ChromSide::Source)?;
            record_size(&mut target_sizes, &chain.target_name, chain.target_size, ChromSide::Target)?;

            let intervals = intervals_by_chrom.entry(chain.source_name.clone()).or_default();
            for block in &chain.blocks {
                intervals.push(Interval {
                    start: block.source_from,
                    stop: block.source_to,
                    val: blocks.len(),
                });
                blocks.push(BlockRef {
                    target_from: block.target_from,
                    chain: chain_idx,
                });
            }
        }

        let maps = intervals_by_chrom
            .into_iter()
            .map(|(chrom, intervals)| (chrom, Lapper::new(intervals)))
            .collect();

        log::debug!("Indexed {} blocks from {} chains", blocks.len(), chains.len());

        Ok(Self {
            chains,
            maps,
            blocks,
            source_sizes,
            target_sizes,
        })
    }

    /// All blocks covering `position` on `chrom`
    ///
    /// Returns an empty vector for unknown chromosomes.
    pub fn query(&self, chrom: &str, position: u64) -> Vec<IndexHit<'_>> {
        match self.maps.get(chrom) {
            Some(lapper) => lapper
                .find(position, position.saturating_add(1))
                .map(|iv| {
                    let block = self.blocks[iv.val];
                    IndexHit {
                        source_from: iv.start,
                        source_to: iv.stop,
                        target_from: block.target_from,
                        chain: &self.chains[block.chain],
                    }
                })
                .collect(),
            None => vec![],
        }
    }

    /// Check if a source chromosome exists in the index
    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.maps.contains_key(chrom)
    }

    /// All parsed chains in file order
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Get total number of indexed blocks
    pub fn total_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn source_chrom_size(&self, chrom: &str) -> Option<u64> {
        self.source_sizes.get(chrom).copied()
    }

    pub fn target_chrom_size(&self, chrom: &str) -> Option<u64> {
        self.target_sizes.get(chrom).copied()
    }
}

fn record_size(
    sizes: &mut HashMap<String, u64>,
    chrom: &str,
    size: u64,
    side: ChromSide,
) -> Result<(), ChromSizeConflictError> {
    match sizes.get(chrom) {
        Some(&first) if first != size => Err(ChromSizeConflictError {
            chrom: chrom.to_string(),
            side,
            first,
            second: size,
        }),
        Some(_) => Ok(()),
        None => {
            sizes.insert(chrom.to_string(), size);
            Ok(())
        }
    }
}
