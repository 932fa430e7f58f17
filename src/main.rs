use std::error::Error;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use log::info;

use dbg_assembler::fasta_reader::{write_contigs, write_fasta};
use dbg_assembler::stats::plot_lengths;
use dbg_assembler::{assemble, AssemblyParams};

/// Assembles reads into contigs with a de Bruijn graph.
#[derive(Parser, Debug)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")"))]
struct Args {
    /// Input reads (fasta or fastq, possibly gzipped)
    #[arg(short, long)]
    input: PathBuf,

    /// Size of the k-mers
    #[arg(short, long, default_value_t = 15)]
    kmer_size: usize,

    /// Output fasta file for the contigs (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print assembly statistics to stderr
    #[arg(long)]
    stats: bool,

    /// Plot the histogram of contig lengths to stderr
    #[arg(long)]
    plot: bool,

    /// Output the k-mer graph without collapsing chains
    #[arg(long)]
    no_simplify: bool,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let params = AssemblyParams {
        k: args.kmer_size,
        simplify: !args.no_simplify,
    };
    info!("Kmer-size: {}", params.k);

    let start = Instant::now();
    let graph = assemble(&args.input, &params)?;
    info!("{} built in {:?}", graph, start.elapsed());

    match &args.output {
        Some(path) => write_contigs(&graph, path)?,
        None => {
            let mut stdout = BufWriter::new(std::io::stdout().lock());
            write_fasta(&graph, &mut stdout)?;
            stdout.flush()?;
        }
    }

    if args.stats {
        eprintln!("{}", graph.stats());
    }
    if args.plot {
        eprintln!("{}", plot_lengths(&graph.contig_lengths()));
    }
    Ok(())
}
