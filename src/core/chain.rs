//! Chain file parsing
//!
//! Parses UCSC chain format files used for coordinate liftover.
//!
//! # Chain File Format
//!
//! ```text
//! chain score sName sSize + sStart sEnd tName tSize tStrand tStart tEnd [id]
//! size ds dt
//! size ds dt
//! size
//! ```
//!
//! - Header line starts with "chain" and has 12 or 13 fields
//! - Data lines contain: size (ungapped block), ds (source gap), dt (target gap)
//! - Last data line has only size, and must land exactly on sEnd/tEnd

use crate::core::io::open_text_reader;
use crate::core::Strand;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Error type for chain file parsing
///
/// Carries the line number and a truncated copy of the offending line.
#[derive(Debug, Clone)]
pub struct ChainFormatError {
    /// Human-readable error message
    pub message: String,
    /// Line number where the error occurred (1-based)
    pub line_number: Option<usize>,
    /// The kind of error that occurred
    pub kind: ChainFormatErrorKind,
    /// The problematic content (if available)
    pub content: Option<String>,
}

/// Specific kinds of chain parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFormatErrorKind {
    /// Header field count or keyword is wrong
    InvalidHeader,
    /// Block line does not have 1 or 3 fields
    InvalidDataLine,
    /// Source strand not '+', or target strand not '+'/'-'
    InvalidStrand,
    /// Failed to parse a numeric value
    InvalidNumber,
    /// start > end, end > chromosome size, or block offsets overflow
    InvalidCoordinates,
    /// Terminal block does not end at the declared source/target end
    BlockMismatch,
    /// File ended inside a chain's block list
    UnexpectedEof,
    /// I/O error during reading
    IoError,
    /// File not found
    FileNotFound,
}

impl std::fmt::Display for ChainFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line_number {
            Some(line) => write!(f, "Line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ChainFormatError {}

impl ChainFormatError {
    /// Create an error with full context
    pub fn with_context(
        message: impl Into<String>,
        line_number: usize,
        kind: ChainFormatErrorKind,
        content: Option<&str>,
    ) -> Self {
        Self {
            message: message.into(),
            line_number: Some(line_number),
            kind,
            content: content.map(|c| c.chars().take(100).collect()),
        }
    }

    pub fn invalid_header(message: impl Into<String>, line_number: usize, content: &str) -> Self {
        Self::with_context(message, line_number, ChainFormatErrorKind::InvalidHeader, Some(content))
    }

    pub fn invalid_data_line(message: impl Into<String>, line_number: usize, content: &str) -> Self {
        Self::with_context(message, line_number, ChainFormatErrorKind::InvalidDataLine, Some(content))
    }

    pub fn invalid_strand(message: impl Into<String>, line_number: usize) -> Self {
        Self::with_context(message, line_number, ChainFormatErrorKind::InvalidStrand, None)
    }

    pub fn invalid_number(field: &str, value: &str, line_number: usize) -> Self {
        Self::with_context(
            format!("Invalid {} value '{}': expected a non-negative integer", field, value),
            line_number,
            ChainFormatErrorKind::InvalidNumber,
            None,
        )
    }

    pub fn invalid_coordinates(message: impl Into<String>, line_number: usize) -> Self {
        Self::with_context(message, line_number, ChainFormatErrorKind::InvalidCoordinates, None)
    }

    pub fn file_not_found(path: &Path) -> Self {
        Self {
            message: format!("Chain file not found: {}", path.display()),
            line_number: None,
            kind: ChainFormatErrorKind::FileNotFound,
            content: None,
        }
    }

    /// Check if this is a specific kind of error
    pub fn is_kind(&self, kind: ChainFormatErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<std::io::Error> for ChainFormatError {
    fn from(e: std::io::Error) -> Self {
        Self {
            message: format!("IO error: {}", e),
            line_number: None,
            kind: ChainFormatErrorKind::IoError,
            content: None,
        }
    }
}

/// A single ungapped alignment block
///
/// `[source_from, source_to)` maps onto `[target_from, target_from + len)`
/// in the chain's target strand coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub source_from: u64,
    pub source_to: u64,
    pub target_from: u64,
}

impl Block {
    #[inline]
    pub fn len(&self) -> u64 {
        self.source_to - self.source_from
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source_to == self.source_from
    }
}

/// One chain record: a header plus its ordered blocks
///
/// The source strand is always forward. For a reverse target strand the
/// block target coordinates are on the reverse strand and must be flipped
/// (`target_size - pos - 1`) when reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub score: u64,
    pub source_name: String,
    pub source_size: u64,
    pub source_start: u64,
    pub source_end: u64,
    pub target_name: String,
    pub target_size: u64,
    pub target_strand: Strand,
    pub target_start: u64,
    pub target_end: u64,
    pub id: Option<String>,
    pub blocks: Vec<Block>,
}

impl Chain {
    /// Parse a chain header line into a chain with no blocks yet
    pub fn parse_header(line: &str, line_number: usize) -> Result<Self, ChainFormatError> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.len() != 12 && fields.len() != 13 {
            return Err(ChainFormatError::invalid_header(
                format!("Expected 12 or 13 fields, got {}", fields.len()),
                line_number,
                line,
            ));
        }

        if fields[0] != "chain" {
            return Err(ChainFormatError::invalid_header(
                format!("Expected 'chain' keyword, got '{}'", fields[0]),
                line_number,
                line,
            ));
        }

        let number = |idx: usize, name: &str| -> Result<u64, ChainFormatError> {
            fields[idx]
                .parse::<u64>()
                .map_err(|_| ChainFormatError::invalid_number(name, fields[idx], line_number))
        };

        let score = number(1, "score")?;
        let source_name = fields[2].to_string();
        let source_size = number(3, "source size")?;

        if fields[4] != "+" {
            return Err(ChainFormatError::invalid_strand(
                format!("Source strand must be '+', got '{}'", fields[4]),
                line_number,
            ));
        }

        let source_start = number(5, "source start")?;
        let source_end = number(6, "source end")?;
        let target_name = fields[7].to_string();
        let target_size = number(8, "target size")?;

        let target_strand = match fields[9] {
            "+" => Strand::Plus,
            "-" => Strand::Minus,
            other => {
                return Err(ChainFormatError::invalid_strand(
                    format!("Target strand must be '+' or '-', got '{}'", other),
                    line_number,
                ))
            }
        };

        let target_start = number(10, "target start")?;
        let target_end = number(11, "target end")?;

        check_range("Source", source_start, source_end, source_size, line_number)?;
        check_range("Target", target_start, target_end, target_size, line_number)?;

        let id = fields.get(12).map(|s| s.to_string());

        Ok(Self {
            score,
            source_name,
            source_size,
            source_start,
            source_end,
            target_name,
            target_size,
            target_strand,
            target_start,
            target_end,
            id,
            blocks: Vec::new(),
        })
    }
}

fn check_range(side: &str, start: u64, end: u64, size: u64, line_number: usize) -> Result<(), ChainFormatError> {
    if start > end {
        return Err(ChainFormatError::invalid_coordinates(
            format!("{} start ({}) > {} end ({})", side, start, side.to_lowercase(), end),
            line_number,
        ));
    }
    if end > size {
        return Err(ChainFormatError::invalid_coordinates(
            format!("{} end ({}) > {} size ({})", side, end, side.to_lowercase(), size),
            line_number,
        ));
    }
    Ok(())
}

/// Data line in a chain file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataLine {
    /// `size ds dt`
    Gapped { size: u64, source_gap: u64, target_gap: u64 },
    /// Terminal `size`
    Last { size: u64 },
}

impl DataLine {
    fn parse(line: &str, line_number: usize) -> Result<Self, ChainFormatError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let number = |idx: usize, name: &str| -> Result<u64, ChainFormatError> {
            fields[idx]
                .parse::<u64>()
                .map_err(|_| ChainFormatError::invalid_number(name, fields[idx], line_number))
        };

        match fields.len() {
            3 => Ok(DataLine::Gapped {
                size: number(0, "block size")?,
                source_gap: number(1, "source gap")?,
                target_gap: number(2, "target gap")?,
            }),
            1 => Ok(DataLine::Last {
                size: number(0, "block size")?,
            }),
            n => Err(ChainFormatError::invalid_data_line(
                format!("Expected 1 or 3 fields, got {}", n),
                line_number,
                line,
            )),
        }
    }
}

/// Parse chains from a reader
///
/// Blank lines and `#` comments between records are skipped. A chain is
/// only appended once its terminal block line has been validated.
pub fn parse_chain_reader<R: BufRead>(reader: R) -> Result<Vec<Chain>, ChainFormatError> {
    let mut chains = Vec::new();
    let mut current: Option<(Chain, usize)> = None;
    let mut source_pos: u64 = 0;
    let mut target_pos: u64 = 0;
    let mut line_number: usize = 0;

    for line_result in reader.lines() {
        line_number += 1;
        let line = line_result?;
        let trimmed = line.trim();

        if let Some((mut chain, header_line)) = current.take() {
            if trimmed.is_empty() && ends_at_declared_end(&chain, source_pos, target_pos) {
                chains.push(finish_chain(chain));
                continue;
            }
            match DataLine::parse(trimmed, line_number)? {
                DataLine::Gapped { size, source_gap, target_gap } => {
                    chain.blocks.push(Block {
                        source_from: source_pos,
                        source_to: advance(source_pos, &[size], line_number)?,
                        target_from: target_pos,
                    });
                    source_pos = advance(source_pos, &[size, source_gap], line_number)?;
                    target_pos = advance(target_pos, &[size, target_gap], line_number)?;
                    current = Some((chain, header_line));
                }
                DataLine::Last { size } => {
                    let source_to = advance(source_pos, &[size], line_number)?;
                    let target_to = advance(target_pos, &[size], line_number)?;
                    chain.blocks.push(Block {
                        source_from: source_pos,
                        source_to,
                        target_from: target_pos,
                    });
                    if source_to != chain.source_end || target_to != chain.target_end {
                        return Err(ChainFormatError::with_context(
                            format!(
                                "Alignment blocks end at {}/{} but header declares {}/{} (chain at line {})",
                                source_to,
                                target_to,
                                chain.source_end,
                                chain.target_end,
                                header_line
                            ),
                            line_number,
                            ChainFormatErrorKind::BlockMismatch,
                            Some(trimmed),
                        ));
                    }
                    chains.push(finish_chain(chain));
                }
            }
            continue;
        }

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if trimmed.split_whitespace().next() == Some("chain") {
            let chain = Chain::parse_header(trimmed, line_number)?;
            source_pos = chain.source_start;
            target_pos = chain.target_start;
            current = Some((chain, line_number));
        } else {
            log::debug!("Skipping stray line {} outside any chain", line_number);
        }
    }

    if let Some((chain, header_line)) = current {
        if ends_at_declared_end(&chain, source_pos, target_pos) {
            chains.push(finish_chain(chain));
            return Ok(chains);
        }
        return Err(ChainFormatError::with_context(
            format!("File ended before the terminal block of the chain at line {}", header_line),
            line_number,
            ChainFormatErrorKind::UnexpectedEof,
            None,
        ));
    }

    Ok(chains)
}

/// Offset `pos` by each of `steps`, failing on `u64` overflow
fn advance(pos: u64, steps: &[u64], line_number: usize) -> Result<u64, ChainFormatError> {
    steps
        .iter()
        .try_fold(pos, |acc, &step| acc.checked_add(step))
        .ok_or_else(|| ChainFormatError::invalid_coordinates("Block coordinates overflow", line_number))
}

/// A block list cut short by a blank line or EOF is still complete when
/// its last `size 0 0` line already reached the declared ends.
fn ends_at_declared_end(chain: &Chain, source_pos: u64, target_pos: u64) -> bool {
    !chain.blocks.is_empty() && source_pos == chain.source_end && target_pos == chain.target_end
}

fn finish_chain(chain: Chain) -> Chain {
    log::debug!(
        "chain {} {}:{}-{} -> {}:{} ({} blocks)",
        chain.id.as_deref().unwrap_or("-"),
        chain.source_name,
        chain.source_start,
        chain.source_end,
        chain.target_name,
        chain.target_strand,
        chain.blocks.len()
    );
    chain
}

/// Parse a chain file from a path
///
/// Gzip and bzip2 files are detected by extension or magic bytes.
pub fn parse_chain_file(path: &Path) -> Result<Vec<Chain>, ChainFormatError> {
    if !path.exists() {
        return Err(ChainFormatError::file_not_found(path));
    }
    parse_chain_reader(open_text_reader(path)?)
}

/// Parse chains from bytes (for testing)
pub fn parse_chain_bytes(data: &[u8]) -> Result<Vec<Chain>, ChainFormatError> {
    parse_chain_reader(BufReader::new(data))
}
