//! Core liftover functionality
//!
//! Chain file parsing, the interval index, point conversion, the
//! resolution-limited mapping table and pixel resampling.

mod chain;
mod error;
mod genome;
mod index;
pub mod io;
mod locate;
mod mapper;
mod resample;
mod table;

pub use chain::{
    parse_chain_bytes, parse_chain_file, parse_chain_reader, Block, Chain, ChainFormatError,
    ChainFormatErrorKind,
};
pub use error::{ChromSide, ChromSizeConflictError, LiftoverError, Result};
pub use genome::{ChromOrder, ChromSizes};
pub use index::{BlockRef, ChainIndex, IndexHit};
pub use io::{CompressionFormat, DEFAULT_BUFFER_SIZE, MMAP_THRESHOLD};
pub use locate::{chain_file_stem, download_url, ChainLocator};
pub use mapper::{update_chrom_id, ChromStyle, CoordinateLookup, LiftOver, LiftedPosition, Locus, Strand};
pub use resample::{
    convert_point_pair, lift_pixel_bounds, pixel_midpoints, reorder_point_pair, resample_pixel,
    ContactPair, LiftedBins, PairRecord, Pixel,
};
pub use table::MappingTable;
