//! Precomputed resolution-limited mapping table
//!
//! Converts every grid point `0, r, 2r, ... < size` once and keeps only the
//! points with exactly one hit. Lookups floor a raw position to the grid,
//! trading precision for a constant-time probe per coordinate.

use crate::core::genome::ChromSizes;
use crate::core::mapper::{CoordinateLookup, LiftOver, Locus};
use rayon::prelude::*;
use std::collections::HashMap;

/// Grid slot: target chromosome id + target position
type Slot = Option<(u32, u64)>;

/// Mapping `(chrom, grid_pos) -> (target_chrom, target_pos)`
pub struct MappingTable {
    resolution: u64,
    /// Source chromosome -> one slot per grid point
    grids: HashMap<String, Vec<Slot>>,
    /// Target chromosome names, indexed by slot id
    target_names: Vec<String>,
    entries: usize,
}

impl MappingTable {
    /// Build the table for every chromosome in `sizes`
    ///
    /// Chromosomes are converted in parallel; the result does not depend on
    /// scheduling.
    ///
    /// # Panics
    /// Panics if `resolution` is zero.
    pub fn build(sizes: &ChromSizes, liftover: &LiftOver, resolution: u64) -> Self {
        assert!(resolution > 0, "mapping table resolution must be positive");

        let chroms: Vec<(&str, u64)> = sizes.iter().collect();
        let converted: Vec<(&str, Vec<Option<Locus<'_>>>)> = chroms
            .par_iter()
            .map(|&(chrom, size)| {
                let points = (0..size)
                    .step_by(resolution as usize)
                    .map(|grid| liftover.convert_unique(chrom, grid))
                    .collect();
                (chrom, points)
            })
            .collect();

        let mut target_ids: HashMap<&str, u32> = HashMap::new();
        let mut target_names = Vec::new();
        let mut grids = HashMap::with_capacity(converted.len());
        let mut entries = 0;

        for (chrom, points) in converted {
            let slots: Vec<Slot> = points
                .into_iter()
                .map(|point| {
                    point.map(|locus| {
                        let id = *target_ids.entry(locus.chrom).or_insert_with(|| {
                            target_names.push(locus.chrom.to_string());
                            (target_names.len() - 1) as u32
                        });
                        (id, locus.pos)
                    })
                })
                .collect();
            entries += slots.iter().filter(|slot| slot.is_some()).count();
            grids.insert(chrom.to_string(), slots);
        }

        if entries == 0 {
            log::warn!("Mapping table at resolution {} has no entries", resolution);
        }
        log::info!(
            "Mapping table built: {} unique grid points at resolution {}",
            entries,
            resolution
        );

        Self {
            resolution,
            grids,
            target_names,
            entries,
        }
    }

    pub fn resolution(&self) -> u64 {
        self.resolution
    }

    /// Number of stored (uniquely mapped) grid points
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Exact key lookup; `grid_pos` must be a multiple of the resolution
    pub fn get(&self, chrom: &str, grid_pos: u64) -> Option<Locus<'_>> {
        if grid_pos % self.resolution != 0 {
            return None;
        }
        self.slot(chrom, grid_pos / self.resolution)
    }

    pub fn contains_key(&self, chrom: &str, grid_pos: u64) -> bool {
        self.get(chrom, grid_pos).is_some()
    }

    /// Floor `pos` to the grid and look it up
    pub fn lookup(&self, chrom: &str, pos: u64) -> Option<Locus<'_>> {
        self.slot(chrom, pos / self.resolution)
    }

    fn slot(&self, chrom: &str, idx: u64) -> Option<Locus<'_>> {
        let grid = self.grids.get(chrom)?;
        let (target, pos) = (*grid.get(usize::try_from(idx).ok()?)?)?;
        Some(Locus::new(self.target_names[target as usize].as_str(), pos))
    }
}

impl CoordinateLookup for MappingTable {
    fn lift(&self, chrom: &str, pos: u64) -> Option<Locus<'_>> {
        self.lookup(chrom, pos)
    }
}
