//! Contact file formats
//!
//! Input record shapes (pairs, HiC-Pro, pixels), the pairs output header and
//! the conversion driver.

pub mod contacts;
pub mod convert;
pub mod pairs;

pub use contacts::{ContactRecord, InputFormat};
pub use convert::{
    convert_contacts, sort_records, thread_pool, ContactLookup, ConversionContext, ConversionStats,
    ConvertOptions,
};
pub use pairs::{PairsHeader, PAIRS_COLUMNS};
