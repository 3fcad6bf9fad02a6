//! FastHiCLift CLI entry point
//!
//! Lifts Hi-C contacts between assemblies and writes 4DN pairs.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fast_hiclift::core::io::{create_text_writer, open_text_reader};
use fast_hiclift::core::{ChainIndex, ChainLocator, ChromOrder, ChromSizes, ChromStyle, LiftOver};
use fast_hiclift::formats::{
    convert_contacts, thread_pool, ContactLookup, ConversionContext, ConvertOptions, InputFormat, PairsHeader,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Clone, Copy, ValueEnum)]
enum InputFormatArg {
    /// 4DN pairs: readID chrom1 pos1 chrom2 pos2 strand1 strand2
    #[value(name = "pairs")]
    Pairs,
    /// HiC-Pro valid pairs: readID chrom1 pos1 strand1 chrom2 pos2 strand2
    #[value(name = "hic-pro")]
    HicPro,
    /// Binned counts: chrom1 start1 end1 chrom2 start2 end2 count
    #[value(name = "pixels")]
    Pixels,
}

impl From<InputFormatArg> for InputFormat {
    fn from(arg: InputFormatArg) -> Self {
        match arg {
            InputFormatArg::Pairs => InputFormat::Pairs,
            InputFormatArg::HicPro => InputFormat::HicPro,
            InputFormatArg::Pixels => InputFormat::Pixels,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ChromStyleArg {
    /// Keep chromosome names as-is
    #[value(name = "a")]
    AsIs,
    /// Use short names (1, 2, X)
    #[value(name = "s")]
    Short,
    /// Use long names (chr1, chr2, chrX)
    #[value(name = "l")]
    Long,
}

impl From<ChromStyleArg> for ChromStyle {
    fn from(arg: ChromStyleArg) -> Self {
        match arg {
            ChromStyleArg::AsIs => ChromStyle::AsIs,
            ChromStyleArg::Short => ChromStyle::Short,
            ChromStyleArg::Long => ChromStyle::Long,
        }
    }
}

#[derive(Parser)]
#[command(name = "fast-hiclift")]
#[command(about = "Lift Hi-C contacts between genome assemblies")]
#[command(version)]
struct Cli {
    /// Input contact file (gzip/bzip2 detected automatically)
    #[arg(short = 'i', long)]
    input: PathBuf,
    /// Input record format
    #[arg(long = "input-format", default_value = "pairs")]
    input_format: InputFormatArg,
    /// Output pairs file (gzip-compressed if it ends in .gz)
    #[arg(short = 'o', long)]
    output: PathBuf,
    /// Chromosome sizes of the source assembly
    #[arg(long = "in-chromsizes")]
    in_chromsizes: PathBuf,
    /// Chromosome sizes of the target assembly; row order sets chromosome rank
    #[arg(long = "out-chromsizes")]
    out_chromsizes: PathBuf,
    /// Source assembly name, e.g. hg19
    #[arg(long = "in-assembly")]
    in_assembly: String,
    /// Target assembly name, e.g. hg38
    #[arg(long = "out-assembly")]
    out_assembly: String,
    /// Chain file; located from the assembly names if omitted
    #[arg(short = 'c', long = "chain-file")]
    chain_file: Option<PathBuf>,
    /// Directory searched for <from>To<To>.over.chain[.gz]
    #[arg(long = "chain-dir", default_value = ".")]
    chain_dir: PathBuf,
    /// Cache directory searched for <from>To<To>.over.chain.gz
    #[arg(long = "cache-dir")]
    cache_dir: Option<PathBuf>,
    /// Mapping table resolution in bp (0 = query the chain index directly)
    #[arg(short = 'r', long, default_value = "500")]
    resolution: u64,
    /// Number of threads (0 = number of CPUs)
    #[arg(short = 't', long, default_value = "1")]
    threads: usize,
    /// Seed for pixel resampling
    #[arg(long, default_value = "0")]
    seed: u64,
    /// Chromosome ID style applied to input names: a(as-is), s(short), l(long)
    #[arg(long = "chromid", default_value = "l")]
    chrom_style: ChromStyleArg,
    /// Keep input order instead of sorting by (chrom1, chrom2, pos1, pos2)
    #[arg(long = "no-sort")]
    no_sort: bool,
}

fn load_liftover(cli: &Cli) -> anyhow::Result<LiftOver> {
    let chain_path = match &cli.chain_file {
        Some(path) => path.clone(),
        None => ChainLocator::new(Some(cli.chain_dir.clone()), cli.cache_dir.clone())
            .locate(&cli.in_assembly, &cli.out_assembly)?,
    };

    let start = Instant::now();
    log::info!("Loading chain file: {}", chain_path.display());
    let index = ChainIndex::from_chain_file(&chain_path)
        .with_context(|| format!("Failed to load chain file {}", chain_path.display()))?;
    log::info!(
        "Chain file loaded in {:.2}s: {} chains, {} blocks",
        start.elapsed().as_secs_f64(),
        index.chains().len(),
        index.total_blocks()
    );

    Ok(LiftOver::new(index))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let start = Instant::now();

    let options = ConvertOptions {
        input_format: cli.input_format.into(),
        resolution: (cli.resolution > 0).then_some(cli.resolution),
        threads: cli.threads,
        seed: cli.seed,
        chrom_style: cli.chrom_style.into(),
        sort: !cli.no_sort,
    };

    let out_sizes = ChromSizes::from_file(&cli.out_chromsizes)
        .with_context(|| format!("Failed to read {}", cli.out_chromsizes.display()))?;
    let lifting = cli.in_assembly != cli.out_assembly;

    let lookup = if lifting {
        let liftover = load_liftover(&cli)?;
        let in_sizes = ChromSizes::from_file(&cli.in_chromsizes)
            .with_context(|| format!("Failed to read {}", cli.in_chromsizes.display()))?;
        let pool = thread_pool(options.threads)?;
        pool.install(|| ContactLookup::prepare(liftover, &in_sizes, options.resolution))
    } else {
        log::info!("Dumping contact pairs from {}", cli.input.display());
        ContactLookup::Identity
    };

    let context = ConversionContext {
        lookup,
        order: ChromOrder::from_sizes(&out_sizes),
    };

    let mut writer = create_text_writer(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    log::info!("Writing headers ...");
    PairsHeader {
        assembly: Some(cli.out_assembly.as_str()),
        chrom_sizes: &out_sizes,
        lifted_from: lifting.then_some(cli.in_assembly.as_str()),
    }
    .write(&mut writer)?;

    let reader = open_text_reader(&cli.input)
        .with_context(|| format!("Failed to open {}", cli.input.display()))?;
    let stats = convert_contacts(reader, &mut writer, &context, &options)?;
    writer.flush()?;

    eprintln!("\n=== Conversion Statistics ===");
    eprintln!("Total contacts:  {}", stats.total);
    eprintln!("Written:         {}", stats.mapped);
    eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
