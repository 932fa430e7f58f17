//! To read sequencing reads from fasta/fastq files and write contigs back.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info};
use needletail::Sequence;

use crate::graph::Graph;
use crate::kmers::Read;
use crate::GraphError;

/// Reads every record of a fasta/fastq file (possibly compressed).
/// Bases are normalized: uppercase, `U` turned into `T`, anything else outside ACGT into `N`.
pub fn read_reads(path: impl AsRef<Path>) -> Result<Vec<Read>, GraphError> {
    let path = path.as_ref();
    let mut reader = needletail::parse_fastx_file(path)?;
    let mut reads = Vec::new();
    while let Some(record) = reader.next() {
        let record = record?;
        let name = String::from_utf8_lossy(record.id()).into_owned();
        let seq: &[u8] = &record.seq();
        let bases = seq.normalize(false);
        let read = Read::new(&name, &bases);
        debug!("Read {}", read);
        reads.push(read);
    }
    info!("Read {} records from {}", reads.len(), path.display());
    Ok(reads)
}

/// Writes the nodes of the graph as fasta records, one line per sequence.
pub fn write_fasta(graph: &Graph, writer: &mut impl Write) -> std::io::Result<()> {
    for (i, seq) in graph.sequences().enumerate() {
        writeln!(writer, ">contig{}", i + 1)?;
        writeln!(writer, "{}", seq)?;
    }
    writer.flush()
}

/// Writes the contigs to a file.
pub fn write_contigs(graph: &Graph, path: impl AsRef<Path>) -> Result<(), GraphError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_fasta(graph, &mut writer)?;
    info!("Wrote {} contigs to {}", graph.count_nodes(), path.display());
    Ok(())
}
