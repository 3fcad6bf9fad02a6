//! I/O helpers
//!
//! Opens chain files and contact streams with transparent decompression,
//! and creates (optionally gzip-compressed) output writers.

use flate2::write::GzEncoder;
use flate2::Compression;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Reader/writer buffer capacity
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Plain inputs at least this large are memory-mapped
pub const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Compression format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Plain,
    Gzip,
    Bzip2,
}

/// Compression of `path`, by extension first, then by magic bytes
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => return Ok(CompressionFormat::Gzip),
        Some("bz2") => return Ok(CompressionFormat::Bzip2),
        _ => {}
    }

    let mut magic = Vec::with_capacity(3);
    File::open(path)?.take(3).read_to_end(&mut magic)?;
    Ok(compression_from_magic(&magic))
}

/// Classify a file by its leading bytes
pub fn compression_from_magic(magic: &[u8]) -> CompressionFormat {
    if magic.len() >= 2 && magic[0] == 0x1f && magic[1] == 0x8b {
        CompressionFormat::Gzip
    } else if magic.len() >= 3 && &magic[..3] == b"BZh" {
        CompressionFormat::Bzip2
    } else {
        CompressionFormat::Plain
    }
}

/// Line source backed by a read-only file mapping
pub struct MappedReader {
    mmap: Mmap,
    offset: usize,
}

impl MappedReader {
    pub fn new(file: &File) -> io::Result<Self> {
        // SAFETY: input files are not modified while a conversion runs
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self { mmap, offset: 0 })
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

impl Read for MappedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = (&self.mmap[self.offset..]).read(buf)?;
        self.offset += n;
        Ok(n)
    }
}

impl BufRead for MappedReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(&self.mmap[self.offset..])
    }

    fn consume(&mut self, amt: usize) {
        self.offset = (self.offset + amt).min(self.mmap.len());
    }
}

/// Open a text file for line-oriented reading
///
/// Gzip and bzip2 are decoded on the fly. Plain files above
/// [`MMAP_THRESHOLD`] are memory-mapped.
pub fn open_text_reader(path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
    let format = detect_compression(path)?;
    let file = File::open(path)?;

    let reader: Box<dyn BufRead + Send> = match format {
        CompressionFormat::Gzip => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            flate2::read::MultiGzDecoder::new(file),
        )),
        CompressionFormat::Bzip2 => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            bzip2::read::BzDecoder::new(file),
        )),
        CompressionFormat::Plain => {
            if file.metadata()?.len() >= MMAP_THRESHOLD {
                Box::new(MappedReader::new(&file)?)
            } else {
                Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file))
            }
        }
    };
    Ok(reader)
}

/// Create an output writer, gzip-compressed when the path ends in `.gz`
pub fn create_text_writer(path: &Path) -> io::Result<Box<dyn Write + Send>> {
    let file = File::create(path)?;
    let is_gz = path.extension().and_then(|e| e.to_str()) == Some("gz");

    if is_gz {
        Ok(Box::new(BufWriter::with_capacity(
            DEFAULT_BUFFER_SIZE,
            GzEncoder::new(file, Compression::default()),
        )))
    } else {
        Ok(Box::new(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file)))
    }
}
