//! Contact record parsing
//!
//! Three whitespace-delimited text shapes are accepted:
//! - pairs (4DN): `readID chrom1 pos1 chrom2 pos2 strand1 strand2 [...]`
//! - HiC-Pro valid pairs: `readID chrom1 pos1 strand1 chrom2 pos2 strand2 [...]`
//! - pixels (`cooler dump --join`): `chrom1 start1 end1 chrom2 start2 end2 count`

use crate::core::{update_chrom_id, ChromStyle, ContactPair, LiftoverError, Pixel, Result};
use std::borrow::Cow;

/// Minimum number of columns for every input shape
const MIN_FIELDS: usize = 7;

/// Input record shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    #[default]
    Pairs,
    HicPro,
    Pixels,
}

impl InputFormat {
    /// Whether records are aggregated bins rather than read pairs
    pub fn is_binned(&self) -> bool {
        matches!(self, InputFormat::Pixels)
    }

    /// Parse one data line (already known not to be blank or a comment)
    pub fn parse_record<'a>(&self, line: &'a str, line_number: usize) -> Result<ContactRecord<'a>> {
        let fields: Vec<&'a str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(invalid(
                line_number,
                format!("expected at least {} columns, found {}", MIN_FIELDS, fields.len()),
            ));
        }

        let record = match self {
            InputFormat::Pairs => ContactRecord::Pair(ContactPair {
                read_id: fields[0],
                chrom1: fields[1],
                pos1: parse_coord(fields[2], "pos1", line_number)?,
                chrom2: fields[3],
                pos2: parse_coord(fields[4], "pos2", line_number)?,
                strand1: fields[5],
                strand2: fields[6],
            }),
            InputFormat::HicPro => ContactRecord::Pair(ContactPair {
                read_id: fields[0],
                chrom1: fields[1],
                pos1: parse_coord(fields[2], "pos1", line_number)?,
                strand1: fields[3],
                chrom2: fields[4],
                pos2: parse_coord(fields[5], "pos2", line_number)?,
                strand2: fields[6],
            }),
            InputFormat::Pixels => ContactRecord::Pixel(Pixel {
                chrom1: fields[0],
                start1: parse_coord(fields[1], "start1", line_number)?,
                end1: parse_coord(fields[2], "end1", line_number)?,
                chrom2: fields[3],
                start2: parse_coord(fields[4], "start2", line_number)?,
                end2: parse_coord(fields[5], "end2", line_number)?,
                count: parse_coord(fields[6], "count", line_number)?,
            }),
        };

        Ok(record)
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Pairs => write!(f, "pairs"),
            InputFormat::HicPro => write!(f, "hic-pro"),
            InputFormat::Pixels => write!(f, "pixels"),
        }
    }
}

/// A parsed input record borrowing from its line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactRecord<'a> {
    Pair(ContactPair<'a>),
    Pixel(Pixel<'a>),
}

impl<'a> ContactRecord<'a> {
    pub fn chroms(&self) -> (&'a str, &'a str) {
        match self {
            ContactRecord::Pair(p) => (p.chrom1, p.chrom2),
            ContactRecord::Pixel(p) => (p.chrom1, p.chrom2),
        }
    }

    /// Number of contacts the record stands for
    pub fn weight(&self) -> u64 {
        match self {
            ContactRecord::Pair(_) => 1,
            ContactRecord::Pixel(p) => p.count,
        }
    }

    /// Same record with both chromosome names replaced
    pub fn with_chroms<'b>(&self, chrom1: &'b str, chrom2: &'b str) -> ContactRecord<'b>
    where
        'a: 'b,
    {
        match *self {
            ContactRecord::Pair(p) => ContactRecord::Pair(ContactPair { chrom1, chrom2, ..p }),
            ContactRecord::Pixel(p) => ContactRecord::Pixel(Pixel { chrom1, chrom2, ..p }),
        }
    }
}

/// Apply a naming style without allocating for [`ChromStyle::AsIs`]
pub fn restyle(chrom: &str, style: ChromStyle) -> Cow<'_, str> {
    match style {
        ChromStyle::AsIs => Cow::Borrowed(chrom),
        _ => Cow::Owned(update_chrom_id(chrom, style)),
    }
}

/// Blank lines and `#` header lines carry no record
pub fn is_data_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

fn parse_coord(value: &str, field: &str, line_number: usize) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| invalid(line_number, format!("invalid {} '{}'", field, value)))
}

fn invalid(line: usize, message: String) -> LiftoverError {
    LiftoverError::InvalidRecord { line, message }
}
