/*! # dbg_assembler: contig assembly with de Bruijn graphs
This crate builds a weighted de Bruijn graph from the k-mers of a set of reads and
simplifies it by collapsing non-branching chains of nodes into contigs.

```
use dbg_assembler::Graph;

let mut graph = Graph::new();
graph.add_sequence(b"ACGTTGCA", 3).unwrap();
graph.simplify();
assert_eq!(graph.sequences().collect::<Vec<_>>(), vec!["ACGTTGCA"]);
```
*/

pub mod arena;
pub mod fasta_reader;
pub mod graph;
pub mod kmers;
pub mod node;
pub mod stats;

pub use arena::{NodeArena, Retired};
pub use graph::{assemble, build_graph, AssemblyParams, Graph};
pub use kmers::{KmerCounts, Read};
pub use node::{Adjacency, Node, NodeId};
pub use stats::AssemblyStats;

/// The nucleotide alphabet used to generate overlap candidates.
pub const NUCLEOTIDES: [u8; 4] = *b"ACGT";

//####################################################################################
//                                   Sides                                          //
//####################################################################################

/// Side of a node: `Left` looks at predecessors, `Right` at successors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

//####################################################################################
//                              Custom errors                                       //
//####################################################################################

/// Errors raised while building a graph or reading its input.
#[derive(Debug)]
pub enum GraphError {
    /// A k-mer does not have the length fixed by the first ingested k-mer.
    KmerLengthMismatch {
        expected: usize,
        found: usize,
        kmer: String,
    },
    InvalidKmerSize(usize),
    Io(std::io::Error),
    Parse(String),
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::KmerLengthMismatch {
                expected,
                found,
                kmer,
            } => write!(
                f,
                "Incompatible k-mer lengths: {} and {} (k-mer {})",
                expected, found, kmer
            ),
            GraphError::InvalidKmerSize(k) => write!(f, "Invalid k-mer size: {}", k),
            GraphError::Io(err) => write!(f, "I/O error: {}", err),
            GraphError::Parse(msg) => write!(f, "Could not parse input: {}", msg),
        }
    }
}

impl From<std::io::Error> for GraphError {
    fn from(err: std::io::Error) -> Self {
        GraphError::Io(err)
    }
}

impl From<needletail::errors::ParseError> for GraphError {
    fn from(err: needletail::errors::ParseError) -> Self {
        GraphError::Parse(err.to_string())
    }
}
