//! FastHiCLift - Hi-C contact liftover between genome assemblies
//!
//! Converts read pairs and binned contact counts (pixels) from one assembly
//! to another using UCSC chain files.
//!
//! # Features
//!
//! - Interval index over chain blocks with multi-hit queries
//! - Optional resolution-limited mapping table for fast lookups
//! - Pixel resampling with a local-rigidity check and seeded randomness
//! - Parallel conversion with rayon
//! - Compressed chain and contact files (gzip, bzip2)
//!
//! # Example
//!
//! ```ignore
//! use fast_hiclift::{ChainIndex, LiftOver};
//!
//! let index = ChainIndex::from_chain_file("hg19ToHg38.over.chain.gz")?;
//! let liftover = LiftOver::new(index);
//!
//! for hit in liftover.convert("chr1", 1_000_000) {
//!     println!("{}:{}", hit.chrom, hit.pos);
//! }
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use core::{
    convert_point_pair, parse_chain_bytes, parse_chain_file, resample_pixel, ChainFormatError,
    ChainIndex, ChainLocator, ChromOrder, ChromSizeConflictError, ChromSizes, ChromStyle,
    CoordinateLookup, LiftOver, LiftoverError, MappingTable, PairRecord, Strand,
};
pub use formats::{convert_contacts, ConversionStats, ConvertOptions, InputFormat};
