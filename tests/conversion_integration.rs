//! End-to-end conversion through files
//!
//! Writes a gzipped chain file, chromosome size files and contact inputs to
//! a temporary directory, then runs the same steps as the CLI.

use fast_hiclift::core::io::{create_text_writer, open_text_reader};
use fast_hiclift::core::{ChainIndex, ChainLocator, ChromOrder, ChromSizes, LiftOver};
use fast_hiclift::formats::{
    convert_contacts, ContactLookup, ConversionContext, ConversionStats, ConvertOptions, InputFormat,
    PairsHeader,
};
use proptest::prelude::*;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::TempDir;

/// hg19 chr1 shifts by +1000 onto hg38 chr1; hg19 chr2 maps reversed onto hg38 chr2
const CHAIN: &str = "\
chain 1000 chr1 100000 + 0 50000 chr1 120000 + 1000 51000 1
50000

chain 900 chr2 80000 + 0 40000 chr2 90000 - 10000 50000 2
40000
";

fn write_gz(path: &Path, text: &str) {
    let mut encoder = flate2::write::GzEncoder::new(
        std::fs::File::create(path).unwrap(),
        flate2::Compression::default(),
    );
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        write_gz(&dir.path().join("hg19ToHg38.over.chain.gz"), CHAIN);
        std::fs::write(dir.path().join("hg19.sizes"), "chr1\t100000\nchr2\t80000\n").unwrap();
        std::fs::write(dir.path().join("hg38.sizes"), "chr1\t120000\nchr2\t90000\n").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn context(&self, resolution: Option<u64>) -> ConversionContext {
        let chain = ChainLocator::new(Some(self.dir.path().to_path_buf()), None)
            .locate("hg19", "hg38")
            .unwrap();
        let liftover = LiftOver::new(ChainIndex::from_chain_file(&chain).unwrap());
        let in_sizes = ChromSizes::from_file(self.path("hg19.sizes")).unwrap();
        let out_sizes = ChromSizes::from_file(self.path("hg38.sizes")).unwrap();

        ConversionContext {
            lookup: ContactLookup::prepare(liftover, &in_sizes, resolution),
            order: ChromOrder::from_sizes(&out_sizes),
        }
    }

    /// Header + converted body, read back as text
    fn run(&self, input: &str, output: &str, context: &ConversionContext, options: &ConvertOptions) -> (String, ConversionStats) {
        std::fs::write(self.path(input), self.input_text(options.input_format)).unwrap();
        let out_sizes = ChromSizes::from_file(self.path("hg38.sizes")).unwrap();

        let mut writer = create_text_writer(&self.path(output)).unwrap();
        PairsHeader {
            assembly: Some("hg38"),
            chrom_sizes: &out_sizes,
            lifted_from: Some("hg19"),
        }
        .write(&mut writer)
        .unwrap();
        let reader = open_text_reader(&self.path(input)).unwrap();
        let stats = convert_contacts(reader, &mut writer, context, options).unwrap();
        drop(writer);

        let mut text = String::new();
        open_text_reader(&self.path(output)).unwrap().read_to_string(&mut text).unwrap();
        (text, stats)
    }

    fn input_text(&self, format: InputFormat) -> String {
        match format {
            InputFormat::Pairs => "\
## pairs format v1.0.0
#columns: readID chrom1 pos1 chrom2 pos2 strand1 strand2
r1\tchr2\t100\tchr1\t200\t+\t-
r2\tchr1\t60000\tchr1\t10\t+\t+
r3\tchr1\t300\tchr1\t100\t-\t+
"
            .to_string(),
            InputFormat::HicPro => "r1\tchr1\t10\t+\tchr2\t39999\t-\n".to_string(),
            InputFormat::Pixels => (0..25_000u64)
                .map(|i| format!("chr1\t{}\t{}\tchr1\t{}\t{}\t2\n", i, i + 10, i + 100, i + 110))
                .collect(),
        }
    }
}

#[test]
fn test_pairs_end_to_end_with_table() {
    let fx = Fixture::new();
    let context = fx.context(Some(1));
    let (text, stats) = fx.run("in.pairs", "out.pairs.gz", &context, &ConvertOptions::default());

    assert_eq!(stats, ConversionStats { total: 3, mapped: 2 });
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "## pairs format v1.0.0");
    assert_eq!(lines[3], "#chromsize: chr1 120000");
    assert_eq!(lines[6], "#pairLiftOver: coordinates transformed from hg19");
    // chr2:100 -> 90000 - (10000 + 100) - 1 = 79899
    assert_eq!(
        &lines[7..],
        &["r3\tchr1\t1100\tchr1\t1300\t+\t-", "r1\tchr1\t1200\tchr2\t79899\t-\t+"]
    );
}

#[test]
fn test_hicpro_direct_queries() {
    let fx = Fixture::new();
    let context = fx.context(None);
    let options = ConvertOptions {
        input_format: InputFormat::HicPro,
        ..ConvertOptions::default()
    };
    let (text, stats) = fx.run("in.txt", "out.pairs", &context, &options);

    assert_eq!(stats.mapped, 1);
    // chr2:39999 -> 90000 - (10000 + 39999) - 1 = 40000
    assert_eq!(text.lines().last(), Some("r1\tchr1\t1010\tchr2\t40000\t+\t-"));
}

#[test]
fn test_pixel_output_independent_of_thread_count() {
    let fx = Fixture::new();
    let context = fx.context(None);
    let single = ConvertOptions {
        input_format: InputFormat::Pixels,
        threads: 1,
        seed: 99,
        ..ConvertOptions::default()
    };
    let parallel = ConvertOptions { threads: 4, ..single.clone() };

    let (a, stats_a) = fx.run("px.txt", "a.pairs", &context, &single);
    let (b, stats_b) = fx.run("px.txt", "b.pairs", &context, &parallel);

    assert_eq!(stats_a, ConversionStats { total: 50_000, mapped: 50_000 });
    assert_eq!(stats_a, stats_b);
    assert_eq!(a, b);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Table and direct lookups agree at resolution 1
    #[test]
    fn prop_table_matches_direct_at_base_resolution(
        positions in prop::collection::vec((0u64..60_000, 0u64..60_000), 1..50),
    ) {
        let fx = Fixture::new();
        let input: String = positions
            .iter()
            .enumerate()
            .map(|(i, (p1, p2))| format!("r{}\tchr1\t{}\tchr2\t{}\t+\t+\n", i, p1, p2))
            .collect();

        let run = |context: &ConversionContext| {
            let mut out = Vec::new();
            let stats = convert_contacts(input.as_bytes(), &mut out, context, &ConvertOptions::default()).unwrap();
            (String::from_utf8(out).unwrap(), stats)
        };

        prop_assert_eq!(run(&fx.context(Some(1))), run(&fx.context(None)));
    }
}
