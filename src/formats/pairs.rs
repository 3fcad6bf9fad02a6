//! 4DN pairs output header

use crate::core::ChromSizes;
use std::io::{self, Write};

/// Output column names, in order
pub const PAIRS_COLUMNS: [&str; 7] = ["readID", "chrom1", "pos1", "chrom2", "pos2", "strand1", "strand2"];

/// Header block written before converted records
#[derive(Debug, Clone)]
pub struct PairsHeader<'a> {
    /// Target assembly; printed as `unknown` when absent
    pub assembly: Option<&'a str>,
    /// Target chromosome sizes in rank order
    pub chrom_sizes: &'a ChromSizes,
    /// Source assembly when coordinates were lifted, `None` for a pure
    /// format conversion
    pub lifted_from: Option<&'a str>,
}

impl<'a> PairsHeader<'a> {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.chrom_sizes.len() + 5);
        lines.push("## pairs format v1.0.0".to_string());
        lines.push("#shape: upper triangle".to_string());
        lines.push(format!("#genome_assembly: {}", self.assembly.unwrap_or("unknown")));
        for (chrom, size) in self.chrom_sizes.iter() {
            lines.push(format!("#chromsize: {} {}", chrom, size));
        }
        lines.push(format!("#columns: {}", PAIRS_COLUMNS.join(" ")));
        lines.push(match self.lifted_from {
            Some(source) => format!("#pairLiftOver: coordinates transformed from {}", source),
            None => "#pairLiftOver: pure data format conversion".to_string(),
        });
        lines
    }

    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        for line in self.lines() {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_for_liftover() {
        let sizes = ChromSizes::new(vec![("chr1".to_string(), 1000), ("chr2".to_string(), 500)]);
        let header = PairsHeader {
            assembly: Some("hg38"),
            chrom_sizes: &sizes,
            lifted_from: Some("hg19"),
        };

        assert_eq!(
            header.lines(),
            vec![
                "## pairs format v1.0.0",
                "#shape: upper triangle",
                "#genome_assembly: hg38",
                "#chromsize: chr1 1000",
                "#chromsize: chr2 500",
                "#columns: readID chrom1 pos1 chrom2 pos2 strand1 strand2",
                "#pairLiftOver: coordinates transformed from hg19",
            ]
        );
    }

    #[test]
    fn test_header_for_format_conversion() {
        let sizes = ChromSizes::default();
        let header = PairsHeader {
            assembly: None,
            chrom_sizes: &sizes,
            lifted_from: None,
        };

        let mut out = Vec::new();
        header.write(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("#genome_assembly: unknown\n"));
        assert!(text.ends_with("#pairLiftOver: pure data format conversion\n"));
    }
}
