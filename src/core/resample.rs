//! Contact conversion: point pairs and aggregated pixels
//!
//! A point pair is lifted axis by axis. A pixel (bin pair with a contact
//! count) is lifted through its four bin boundaries; the bin survives only
//! if both axes move as a rigid translation, and each contact is then
//! placed uniformly at random inside the lifted bins.

use crate::core::genome::ChromOrder;
use crate::core::mapper::{CoordinateLookup, Locus};
use rand::Rng;
use std::borrow::Cow;
use std::sync::Arc;

/// Read ID and strand placeholder for contacts that come from pixels
const UNKNOWN: &str = ".";

/// Aggregated contact count between two bins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel<'a> {
    pub chrom1: &'a str,
    pub start1: u64,
    pub end1: u64,
    pub chrom2: &'a str,
    pub start2: u64,
    pub end2: u64,
    pub count: u64,
}

/// A single read-pair contact at point resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactPair<'a> {
    pub read_id: &'a str,
    pub chrom1: &'a str,
    pub pos1: u64,
    pub chrom2: &'a str,
    pub pos2: u64,
    pub strand1: &'a str,
    pub strand2: &'a str,
}

/// Output record: `readID chrom1 pos1 chrom2 pos2 strand1 strand2`
///
/// Chromosome names are handles into the [`ChromOrder`] that placed the
/// record. `.`, `+` and `-` tokens are static.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRecord {
    pub read_id: Cow<'static, str>,
    pub chrom1: Arc<str>,
    pub pos1: u64,
    pub chrom2: Arc<str>,
    pub pos2: u64,
    pub strand1: Cow<'static, str>,
    pub strand2: Cow<'static, str>,
}

fn token(value: &str) -> Cow<'static, str> {
    match value {
        "." => Cow::Borrowed(UNKNOWN),
        "+" => Cow::Borrowed("+"),
        "-" => Cow::Borrowed("-"),
        other => Cow::Owned(other.to_string()),
    }
}

impl PairRecord {
    /// Build a record with loci in canonical (upper-triangle) order
    ///
    /// Swaps loci and strands together when `locus1` sorts after `locus2`.
    /// `None` if either chromosome is outside `order`.
    pub fn canonical(
        order: &ChromOrder,
        read_id: &str,
        locus1: Locus<'_>,
        strand1: &str,
        locus2: Locus<'_>,
        strand2: &str,
    ) -> Option<Self> {
        let (l1, s1, l2, s2) = if order.has_correct_order(&locus1, &locus2) {
            (locus1, strand1, locus2, strand2)
        } else {
            (locus2, strand2, locus1, strand1)
        };
        Some(Self {
            read_id: token(read_id),
            chrom1: order.resolve(l1.chrom)?,
            pos1: l1.pos,
            chrom2: order.resolve(l2.chrom)?,
            pos2: l2.pos,
            strand1: token(s1),
            strand2: token(s2),
        })
    }

    pub fn locus1(&self) -> Locus<'_> {
        Locus::new(&self.chrom1, self.pos1)
    }

    pub fn locus2(&self) -> Locus<'_> {
        Locus::new(&self.chrom2, self.pos2)
    }
}

impl std::fmt::Display for PairRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.read_id, self.chrom1, self.pos1, self.chrom2, self.pos2, self.strand1, self.strand2
        )
    }
}

/// Lifted bin boundaries of a pixel that passed the rigidity check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiftedBins<'a> {
    pub chrom1: &'a str,
    pub start1: u64,
    pub end1: u64,
    pub chrom2: &'a str,
    pub start2: u64,
    pub end2: u64,
}

/// Lift a pixel's four boundaries and validate them
///
/// Returns `None` when any boundary is unmapped or lands on a chromosome
/// outside `order`, when an axis's two ends land on different chromosomes,
/// or when a lifted span differs from the original bin size.
pub fn lift_pixel_bounds<'l, L>(pixel: &Pixel<'_>, lookup: &'l L, order: &ChromOrder) -> Option<LiftedBins<'l>>
where
    L: CoordinateLookup + ?Sized,
{
    let (c1, s1, e1) = lift_axis(pixel.chrom1, pixel.start1, pixel.end1, lookup, order)?;
    let (c2, s2, e2) = lift_axis(pixel.chrom2, pixel.start2, pixel.end2, lookup, order)?;
    Some(LiftedBins {
        chrom1: c1,
        start1: s1,
        end1: e1,
        chrom2: c2,
        start2: s2,
        end2: e2,
    })
}

fn lift_axis<'l, L>(chrom: &str, start: u64, end: u64, lookup: &'l L, order: &ChromOrder) -> Option<(&'l str, u64, u64)>
where
    L: CoordinateLookup + ?Sized,
{
    let left = lookup.lift(chrom, start)?;
    let right = lookup.lift(chrom, end)?;
    if !order.contains(left.chrom) || !order.contains(right.chrom) || left.chrom != right.chrom {
        return None;
    }
    let bin_size = end.checked_sub(start)?;
    if right.pos.checked_sub(left.pos)? != bin_size {
        return None;
    }
    Some((left.chrom, left.pos, right.pos))
}

/// Resample a pixel into `count` point-pair records
///
/// Each contact draws one position uniformly from `[start1, end1]` and one
/// from `[start2, end2]` of the lifted bins (both ends inclusive). A pixel
/// failing [`lift_pixel_bounds`] yields no records.
pub fn resample_pixel<L, R>(pixel: &Pixel<'_>, lookup: &L, order: &ChromOrder, rng: &mut R) -> Vec<PairRecord>
where
    L: CoordinateLookup + ?Sized,
    R: Rng,
{
    let bins = match lift_pixel_bounds(pixel, lookup, order) {
        Some(bins) => bins,
        None => return Vec::new(),
    };

    (0..pixel.count)
        .filter_map(|_| {
            let p1 = rng.gen_range(bins.start1..=bins.end1);
            let p2 = rng.gen_range(bins.start2..=bins.end2);
            PairRecord::canonical(
                order,
                UNKNOWN,
                Locus::new(bins.chrom1, p1),
                UNKNOWN,
                Locus::new(bins.chrom2, p2),
                UNKNOWN,
            )
        })
        .collect()
}

/// Lift a point pair; `None` if either axis is unmapped or off-assembly
pub fn convert_point_pair<L>(pair: &ContactPair<'_>, lookup: &L, order: &ChromOrder) -> Option<PairRecord>
where
    L: CoordinateLookup + ?Sized,
{
    let hit1 = lookup.lift(pair.chrom1, pair.pos1)?;
    let hit2 = lookup.lift(pair.chrom2, pair.pos2)?;
    PairRecord::canonical(order, pair.read_id, hit1, pair.strand1, hit2, pair.strand2)
}

/// Re-orient a point pair without lifting (same-assembly conversion)
pub fn reorder_point_pair(pair: &ContactPair<'_>, order: &ChromOrder) -> Option<PairRecord> {
    PairRecord::canonical(
        order,
        pair.read_id,
        Locus::new(pair.chrom1, pair.pos1),
        pair.strand1,
        Locus::new(pair.chrom2, pair.pos2),
        pair.strand2,
    )
}

/// Expand a pixel into `count` records at its bin midpoints (no lifting)
///
/// Pixels with an inverted bin or an unknown chromosome yield nothing.
pub fn pixel_midpoints(pixel: &Pixel<'_>, order: &ChromOrder) -> Vec<PairRecord> {
    let (mid1, mid2) = match (midpoint(pixel.start1, pixel.end1), midpoint(pixel.start2, pixel.end2)) {
        (Some(m1), Some(m2)) => (m1, m2),
        _ => return Vec::new(),
    };
    match PairRecord::canonical(
        order,
        UNKNOWN,
        Locus::new(pixel.chrom1, mid1),
        UNKNOWN,
        Locus::new(pixel.chrom2, mid2),
        UNKNOWN,
    ) {
        Some(record) => vec![record; pixel.count as usize],
        None => Vec::new(),
    }
}

fn midpoint(start: u64, end: u64) -> Option<u64> {
    Some(start + end.checked_sub(start)? / 2)
}
