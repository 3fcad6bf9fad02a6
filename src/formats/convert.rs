//! Contact stream conversion driver
//!
//! Reads data lines in batches of whole chunks, converts the chunks in
//! parallel and writes the records in input order as each batch finishes.
//! When sorting by `(chrom1, chrom2, pos1, pos2)` is requested the records
//! are held until the input is exhausted.

use crate::core::{
    convert_point_pair, pixel_midpoints, reorder_point_pair, resample_pixel, ChromOrder, ChromSizes,
    ChromStyle, CoordinateLookup, LiftOver, LiftoverError, MappingTable, PairRecord,
};
use crate::formats::contacts::{is_data_line, restyle, ContactRecord, InputFormat};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::io::{BufRead, Write};

/// Chunk size for parallel processing
const CHUNK_SIZE: usize = 10000;

/// Chunks read per batch
const BATCH_CHUNKS: usize = 64;

/// Conversion settings
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input_format: InputFormat,
    /// Mapping table resolution; `None` queries the chain index per coordinate
    pub resolution: Option<u64>,
    /// Worker threads (0 = rayon default)
    pub threads: usize,
    /// Base seed for pixel resampling
    pub seed: u64,
    pub chrom_style: ChromStyle,
    /// Sort output by `(chrom1, chrom2, pos1, pos2)`
    pub sort: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input_format: InputFormat::Pairs,
            resolution: None,
            threads: 1,
            seed: 0,
            chrom_style: ChromStyle::AsIs,
            sort: true,
        }
    }
}

/// Conversion statistics
///
/// Pixels count once per contact, so `total` is the number of contacts read
/// and `mapped` the number written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStats {
    pub total: u64,
    pub mapped: u64,
}

impl ConversionStats {
    fn merge(&mut self, other: ConversionStats) {
        self.total += other.total;
        self.mapped += other.mapped;
    }
}

/// How source coordinates reach the target assembly
pub enum ContactLookup {
    /// Same assembly: no lifting, records are only re-oriented
    Identity,
    /// Per-coordinate chain index queries
    Direct(LiftOver),
    /// Resolution-limited precomputed table
    Table(MappingTable),
}

impl ContactLookup {
    /// Choose direct queries or a mapping table over `source_sizes`
    pub fn prepare(liftover: LiftOver, source_sizes: &ChromSizes, resolution: Option<u64>) -> Self {
        match resolution {
            Some(res) if res > 0 => {
                log::info!("Building the mapping table at resolution {}", res);
                ContactLookup::Table(MappingTable::build(source_sizes, &liftover, res))
            }
            _ => ContactLookup::Direct(liftover),
        }
    }

    fn as_lookup(&self) -> Option<&dyn CoordinateLookup> {
        match self {
            ContactLookup::Identity => None,
            ContactLookup::Direct(lo) => Some(lo as &dyn CoordinateLookup),
            ContactLookup::Table(table) => Some(table as &dyn CoordinateLookup),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, ContactLookup::Identity)
    }
}

/// Everything a conversion reads but never mutates
pub struct ConversionContext {
    pub lookup: ContactLookup,
    /// Target assembly chromosome order
    pub order: ChromOrder,
}

/// Build a rayon pool with `threads` workers (0 = rayon default)
pub fn thread_pool(threads: usize) -> Result<rayon::ThreadPool, LiftoverError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| {
            LiftoverError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to create thread pool: {}", e),
            ))
        })
}

/// Convert all records from `reader` and write them to `writer`
///
/// Header lines are not copied; write a [`PairsHeader`](crate::formats::PairsHeader)
/// first. Chunk `i` resamples with a generator seeded from `seed + i`, so
/// output for a fixed seed does not depend on the thread count.
///
/// Unsorted output is written batch by batch; a malformed record aborts the
/// run after earlier batches have been written.
pub fn convert_contacts<R, W>(
    reader: R,
    writer: &mut W,
    context: &ConversionContext,
    options: &ConvertOptions,
) -> Result<ConversionStats, LiftoverError>
where
    R: BufRead,
    W: Write + ?Sized,
{
    convert_batched(reader, writer, context, options, BATCH_CHUNKS)
}

fn convert_batched<R, W>(
    reader: R,
    writer: &mut W,
    context: &ConversionContext,
    options: &ConvertOptions,
    batch_chunks: usize,
) -> Result<ConversionStats, LiftoverError>
where
    R: BufRead,
    W: Write + ?Sized,
{
    let pool = thread_pool(options.threads)?;
    let mut lines = reader.lines().enumerate();
    let mut stats = ConversionStats::default();
    let mut held = Vec::new();
    let mut chunks_done = 0;

    loop {
        let batch = read_batch(&mut lines, CHUNK_SIZE * batch_chunks)?;
        if batch.is_empty() {
            break;
        }
        log::debug!("Read {} {} records", batch.len(), options.input_format);

        let first_chunk = chunks_done;
        let outputs: Vec<Result<ChunkOutput, LiftoverError>> = pool.install(|| {
            batch
                .par_chunks(CHUNK_SIZE)
                .enumerate()
                .map(|(idx, chunk)| convert_chunk(chunk, first_chunk + idx, context, options))
                .collect()
        });
        chunks_done += outputs.len();

        for output in outputs {
            let output = output?;
            stats.merge(output.stats);
            if options.sort {
                held.extend(output.records);
            } else {
                write_records(writer, &output.records)?;
            }
        }
    }

    if options.sort {
        sort_records(&mut held);
        write_records(writer, &held)?;
    }
    writer.flush()?;

    if context.lookup.is_identity() {
        log::info!("{} / {} pairs were written", stats.mapped, stats.total);
    } else {
        log::info!(
            "{} / {} pairs were uniquely mapped to the target genome",
            stats.mapped,
            stats.total
        );
    }

    Ok(stats)
}

/// Next `limit` data lines with their 1-based line numbers
fn read_batch<I>(lines: &mut I, limit: usize) -> Result<Vec<(usize, String)>, LiftoverError>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    let mut batch = Vec::with_capacity(limit.min(CHUNK_SIZE));
    for (line_idx, line_result) in lines {
        let line = line_result?;
        if is_data_line(&line) {
            batch.push((line_idx + 1, line));
            if batch.len() == limit {
                break;
            }
        }
    }
    Ok(batch)
}

fn write_records<W: Write + ?Sized>(writer: &mut W, records: &[PairRecord]) -> std::io::Result<()> {
    for record in records {
        writeln!(writer, "{}", record)?;
    }
    Ok(())
}

/// Stable sort by `(chrom1, chrom2, pos1, pos2)`, names compared bytewise
pub fn sort_records(records: &mut [PairRecord]) {
    records.sort_by(|a, b| {
        (a.chrom1.as_bytes(), a.chrom2.as_bytes(), a.pos1, a.pos2).cmp(&(
            b.chrom1.as_bytes(),
            b.chrom2.as_bytes(),
            b.pos1,
            b.pos2,
        ))
    });
}

struct ChunkOutput {
    records: Vec<PairRecord>,
    stats: ConversionStats,
}

fn convert_chunk(
    lines: &[(usize, String)],
    chunk_idx: usize,
    context: &ConversionContext,
    options: &ConvertOptions,
) -> Result<ChunkOutput, LiftoverError> {
    let mut rng = SmallRng::seed_from_u64(options.seed.wrapping_add(chunk_idx as u64));
    let mut records = Vec::with_capacity(lines.len());
    let mut stats = ConversionStats::default();
    let lookup = context.lookup.as_lookup();

    for (line_number, line) in lines {
        let parsed = options.input_format.parse_record(line, *line_number)?;
        let (c1, c2) = parsed.chroms();
        let (c1, c2) = (restyle(c1, options.chrom_style), restyle(c2, options.chrom_style));
        let record = parsed.with_chroms(&c1, &c2);

        stats.total += record.weight();
        let before = records.len();
        match (record, lookup) {
            (ContactRecord::Pair(pair), Some(lookup)) => {
                records.extend(convert_point_pair(&pair, lookup, &context.order));
            }
            (ContactRecord::Pair(pair), None) => {
                records.extend(reorder_point_pair(&pair, &context.order));
            }
            (ContactRecord::Pixel(pixel), Some(lookup)) => {
                records.extend(resample_pixel(&pixel, lookup, &context.order, &mut rng));
            }
            (ContactRecord::Pixel(pixel), None) => {
                records.extend(pixel_midpoints(&pixel, &context.order));
            }
        }
        stats.mapped += (records.len() - before) as u64;
    }

    Ok(ChunkOutput { records, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_chain_bytes, ChainIndex};

    const CHAIN: &[u8] = b"\
chain 100 chr1 10000 + 0 5000 chr2 10000 + 1000 6000 1
5000

chain 50 chr3 4000 + 0 1000 chr1 8000 + 0 1000 2
1000
";

    fn liftover() -> LiftOver {
        LiftOver::new(ChainIndex::from_chains(parse_chain_bytes(CHAIN).unwrap()).unwrap())
    }

    fn context(lookup: ContactLookup) -> ConversionContext {
        ConversionContext {
            lookup,
            order: ChromOrder::new(["chr1", "chr2"]),
        }
    }

    fn run(input: &str, context: &ConversionContext, options: &ConvertOptions) -> (String, ConversionStats) {
        let mut out = Vec::new();
        let stats = convert_contacts(input.as_bytes(), &mut out, context, options).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn test_pairs_lifted_and_canonicalized() {
        let ctx = context(ContactLookup::Direct(liftover()));
        let input = "\
## pairs format v1.0.0
#columns: readID chrom1 pos1 chrom2 pos2 strand1 strand2
r1\tchr1\t10\tchr3\t20\t+\t-
r2\tchr1\t9000\tchr1\t10\t+\t+
r3\tchr3\t5\tchr3\t900\t-\t+
";
        let (text, stats) = run(input, &ctx, &ConvertOptions::default());

        assert_eq!(stats, ConversionStats { total: 3, mapped: 2 });
        // sorted by chrom1 then chrom2: chr1/chr1 before chr1/chr2
        assert_eq!(text, "r3\tchr1\t5\tchr1\t900\t-\t+\nr1\tchr1\t20\tchr2\t1010\t-\t+\n");
    }

    #[test]
    fn test_unsorted_output_keeps_input_order() {
        let ctx = context(ContactLookup::Direct(liftover()));
        let input = "r1 chr1 10 chr3 20 + -\nr3 chr3 5 chr3 900 - +\n";
        let options = ConvertOptions {
            sort: false,
            ..ConvertOptions::default()
        };
        let (text, _) = run(input, &ctx, &options);
        let ids: Vec<&str> = text.lines().map(|l| l.split('\t').next().unwrap()).collect();
        assert_eq!(ids, vec!["r1", "r3"]);
    }

    #[test]
    fn test_hicpro_with_chrom_style() {
        let ctx = context(ContactLookup::Direct(liftover()));
        let options = ConvertOptions {
            input_format: InputFormat::HicPro,
            chrom_style: ChromStyle::Long,
            ..ConvertOptions::default()
        };
        let (text, stats) = run("r1 1 100 + 1 200 -\n", &ctx, &options);
        assert_eq!(stats.mapped, 1);
        assert_eq!(text, "r1\tchr2\t1100\tchr2\t1200\t+\t-\n");
    }

    #[test]
    fn test_pixels_resampled_through_table() {
        let lo = liftover();
        let sizes = ChromSizes::new(vec![("chr1".to_string(), 10000), ("chr3".to_string(), 4000)]);
        let ctx = context(ContactLookup::prepare(lo, &sizes, Some(100)));
        let options = ConvertOptions {
            input_format: InputFormat::Pixels,
            seed: 11,
            ..ConvertOptions::default()
        };
        let input = "chr1 0 100 chr1 200 300 4\nchr1 4900 5000 chr1 0 100 3\n";
        let (text, stats) = run(input, &ctx, &options);

        // second pixel: 5000 is past the chain end, so the bin is dropped
        assert_eq!(stats, ConversionStats { total: 7, mapped: 4 });
        for line in text.lines() {
            let cols: Vec<&str> = line.split('\t').collect();
            assert_eq!((cols[0], cols[1], cols[3], cols[5], cols[6]), (".", "chr2", "chr2", ".", "."));
            let p1: u64 = cols[2].parse().unwrap();
            let p2: u64 = cols[4].parse().unwrap();
            assert!((1000..=1100).contains(&p1));
            assert!((1200..=1300).contains(&p2));
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let ctx = context(ContactLookup::Direct(liftover()));
        let options = ConvertOptions {
            input_format: InputFormat::Pixels,
            seed: 5,
            sort: false,
            ..ConvertOptions::default()
        };
        let input = "chr1 0 1000 chr1 2000 3000 25\n";
        assert_eq!(run(input, &ctx, &options).0, run(input, &ctx, &options).0);
    }

    #[test]
    fn test_identity_mode() {
        let ctx = context(ContactLookup::Identity);
        let pairs = "r1 chr2 5 chr1 7 + -\nr2 chrUn 1 chr1 2 + +\n";
        let (text, stats) = run(pairs, &ctx, &ConvertOptions::default());
        assert_eq!(stats, ConversionStats { total: 2, mapped: 1 });
        assert_eq!(text, "r1\tchr1\t7\tchr2\t5\t-\t+\n");

        let options = ConvertOptions {
            input_format: InputFormat::Pixels,
            ..ConvertOptions::default()
        };
        let (text, stats) = run("chr1 0 100 chr2 0 10 2\n", &ctx, &options);
        assert_eq!(stats, ConversionStats { total: 2, mapped: 2 });
        assert_eq!(text, ".\tchr1\t50\tchr2\t5\t.\t.\n.\tchr1\t50\tchr2\t5\t.\t.\n");
    }

    #[test]
    fn test_malformed_record_is_fatal() {
        let ctx = context(ContactLookup::Identity);
        let mut out = Vec::new();
        let err = convert_contacts(
            "#header\nr1 chr1 1 chr1 2 + +\nr2 chr1 x chr1 2 + +\n".as_bytes(),
            &mut out,
            &ctx,
            &ConvertOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LiftoverError::InvalidRecord { line: 3, .. }));
    }

    #[test]
    fn test_sort_is_bytewise_and_stable() {
        let rec = |id: &str, c1: &str, p1: u64| PairRecord {
            read_id: id.to_string().into(),
            chrom1: c1.into(),
            pos1: p1,
            chrom2: "chr1".into(),
            pos2: 0,
            strand1: "+".into(),
            strand2: "+".into(),
        };
        let mut records = vec![rec("a", "chr2", 5), rec("b", "chr10", 9), rec("c", "chr2", 5), rec("d", "chr10", 1)];
        sort_records(&mut records);
        let ids: Vec<&str> = records.iter().map(|r| &*r.read_id).collect();
        assert_eq!(ids, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_coordinate_limit_is_unmapped() {
        let ctx = context(ContactLookup::Direct(liftover()));
        let input = "r1 chr1 18446744073709551615 chr1 10 + +\nr2 chr1 10 chr1 20 + +\n";
        let (text, stats) = run(input, &ctx, &ConvertOptions::default());
        assert_eq!(stats, ConversionStats { total: 2, mapped: 1 });
        assert_eq!(text, "r2\tchr2\t1010\tchr2\t1020\t+\t+\n");
    }

    #[test]
    fn test_streamed_batches_match_single_batch() {
        let ctx = context(ContactLookup::Direct(liftover()));
        let input: String = (0..25_000u64)
            .map(|i| format!("r{} chr1 {} chr3 {} + -\n", i, i % 5000, i % 1000))
            .collect();
        let options = ConvertOptions {
            sort: false,
            threads: 2,
            ..ConvertOptions::default()
        };

        let mut streamed = Vec::new();
        let stats = convert_batched(input.as_bytes(), &mut streamed, &ctx, &options, 1).unwrap();
        let (whole, whole_stats) = run(&input, &ctx, &options);

        assert_eq!(stats, ConversionStats { total: 25_000, mapped: 25_000 });
        assert_eq!(stats, whole_stats);
        assert_eq!(String::from_utf8(streamed).unwrap(), whole);
        assert!(whole.starts_with("r0\t"));
    }
}
