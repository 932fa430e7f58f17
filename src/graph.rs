//! The de Bruijn graph: ingestion of k-mers, simplification into contigs and statistics.

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::path::Path;

use log::{debug, info, warn};

use crate::arena::{NodeArena, Retired};
use crate::fasta_reader::read_reads;
use crate::kmers::{KmerCounts, Read};
use crate::node::{Node, NodeId};
use crate::stats::{n50, AssemblyStats, NodeKinds};
use crate::{GraphError, Side};

/// A weighted de Bruijn graph.
///
/// Nodes are owned by a [NodeArena] and indexed by their sequence. Once [Graph::simplify]
/// has run, the graph is finalized and further ingestion is ignored.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    arena: NodeArena,
    index: HashMap<String, NodeId>,
    k: Option<usize>,
    finalized: bool,
}

impl Display for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.k {
            Some(k) => write!(f, "DBG({})", k)?,
            None => write!(f, "DBG(-)")?,
        }
        write!(
            f,
            " with {} nodes and {} edges",
            self.count_nodes(),
            self.count_edges()
        )
    }
}

/// Basic methods for graph manipulation
impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph whose k-mer size is already fixed.
    pub fn with_k(k: usize) -> Result<Self, GraphError> {
        if k == 0 {
            return Err(GraphError::InvalidKmerSize(k));
        }
        Ok(Self {
            k: Some(k),
            ..Self::default()
        })
    }

    pub fn k(&self) -> Option<usize> {
        self.k
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn id_of(&self, sequence: &str) -> Option<NodeId> {
        self.index.get(sequence).copied()
    }

    pub fn node(&self, sequence: &str) -> Option<&Node> {
        self.arena.get(self.id_of(sequence)?)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.arena.iter().map(|(_, node)| node)
    }

    /// Weight of the edge between the nodes holding these sequences, 0 if there is none.
    pub fn edge_weight(&self, from: &str, to: &str) -> u32 {
        match (self.id_of(from), self.node(to)) {
            (Some(from), Some(to)) => to.incoming().weight(from),
            _ => 0,
        }
    }

    /// Node sequences, in a stable order.
    pub fn sequences(&self) -> impl Iterator<Item = &str> {
        self.nodes().map(Node::sequence)
    }

    pub fn count_nodes(&self) -> usize {
        self.arena.len()
    }

    /// Number of edges. Parallel observations of an overlap count once.
    pub fn count_edges(&self) -> usize {
        self.arena.edge_count()
    }
}

//####################################################################################
//                                   Ingestion                                      //
//####################################################################################

impl Graph {
    fn get_or_insert(&mut self, kmer: &str) -> NodeId {
        if let Some(&id) = self.index.get(kmer) {
            return id;
        }
        let id = self.arena.insert(Node::new(kmer));
        self.index.insert(kmer.to_string(), id);
        id
    }

    /// Adds k-mers to the graph and links them to the k-mers already present.
    ///
    /// Counts are accepted but not stored: multiplicity shows up as edge weights, which grow by
    /// one for each call in which an overlap is seen. The first k-mer ever added fixes `k`.
    /// Does nothing once the graph is finalized.
    pub fn add_kmers<S, I>(&mut self, kmers: I) -> Result<(), GraphError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, usize)>,
    {
        if self.finalized {
            warn!("Graph is already simplified, k-mers are ignored");
            return Ok(());
        }
        let mut kmers = kmers.into_iter().peekable();
        if kmers.peek().is_none() {
            return Ok(());
        }

        // each (source, target) pair is wired once per call
        let mut wired: HashSet<(NodeId, NodeId)> = HashSet::new();
        let mut nb_kmers = 0;

        for (kmer, _count) in kmers {
            let kmer = kmer.as_ref();
            if self.k.is_none() && kmer.is_empty() {
                return Err(GraphError::InvalidKmerSize(0));
            }
            let k = *self.k.get_or_insert(kmer.len());
            if kmer.len() != k {
                return Err(GraphError::KmerLengthMismatch {
                    expected: k,
                    found: kmer.len(),
                    kmer: kmer.to_string(),
                });
            }

            let id = self.get_or_insert(kmer);
            let node = &self.arena[id];
            let successors = node.successor_candidates();
            let predecessors = node.predecessor_candidates();

            for candidate in successors {
                if let Some(target) = self.id_of(&candidate) {
                    if wired.insert((id, target)) {
                        self.arena.record_edge(id, target);
                    }
                }
            }
            for candidate in predecessors {
                if let Some(source) = self.id_of(&candidate) {
                    if wired.insert((source, id)) {
                        self.arena.record_edge(source, id);
                    }
                }
            }
            nb_kmers += 1;
        }
        debug!("Added {} k-mers, {} overlaps", nb_kmers, wired.len());
        Ok(())
    }

    pub fn add_counts(&mut self, counts: &KmerCounts) -> Result<(), GraphError> {
        self.add_kmers(counts.entries())
    }

    /// Extracts the k-mers of a sequence and adds them.
    pub fn add_sequence(&mut self, seq: &[u8], k: usize) -> Result<(), GraphError> {
        if k == 0 {
            return Err(GraphError::InvalidKmerSize(k));
        }
        if seq.len() < k {
            warn!("Sequence of length {} < k={} has been skipped", seq.len(), k);
            return Ok(());
        }
        self.add_counts(&KmerCounts::from_seq(seq, k))
    }

    pub fn add_read(&mut self, read: &Read, k: usize) -> Result<(), GraphError> {
        debug!("Adding read {}", read);
        self.add_sequence(&read.bases, k)
    }
}

//####################################################################################
//                                 Simplification                                   //
//####################################################################################

impl Graph {
    // Drops the index entry of a node merged into a neighbor.
    fn evict(&mut self, retired: &Retired) {
        if self.index.get(retired.node.sequence()) == Some(&retired.id) {
            self.index.remove(retired.node.sequence());
        }
    }

    // Keys the index by the current sequences of the live nodes.
    fn rebuild_index(&mut self) {
        self.index = self
            .arena
            .iter()
            .map(|(id, node)| (node.sequence().to_string(), id))
            .collect();
    }

    /// Collapses every non-branching chain into a single node, then finalizes the graph.
    /// Returns the number of merges.
    pub fn simplify(&mut self) -> usize {
        let before = self.count_nodes();
        let snapshot: Vec<NodeId> = self.arena.ids().collect();
        // sequences grow during the pass, so remember the key each node was indexed under
        let mut keys: HashMap<NodeId, String> = self
            .index
            .iter()
            .map(|(seq, &id)| (id, seq.clone()))
            .collect();
        let mut nb_merges = 0;
        for id in snapshot {
            // the node may have been absorbed earlier in the pass
            if !self.arena.contains(id) {
                continue;
            }
            while let Some(retired) = self.arena.merge_forward(id) {
                if let Some(key) = keys.remove(&retired.id) {
                    self.index.remove(&key);
                }
                nb_merges += 1;
            }
        }
        self.rebuild_index();
        self.finalized = true;
        info!(
            "Simplified graph from {} to {} nodes ({} merges)",
            before,
            self.count_nodes(),
            nb_merges
        );
        nb_merges
    }

    // Single merge step, keeping the index in sync. Returns the sequence of the absorbed node.
    fn merge_at(&mut self, sequence: &str, side: Side) -> Option<String> {
        let id = self.id_of(sequence)?;
        let retired = self.arena.merge(id, side)?;
        self.index.remove(sequence);
        self.evict(&retired);
        self.index.insert(self.arena[id].sequence().to_string(), id);
        Some(retired.node.sequence().to_string())
    }

    /// Merges the node holding `sequence` with its sole successor.
    /// k-mers added afterwards are not matched against the merged sequence.
    pub fn merge_forward(&mut self, sequence: &str) -> Option<String> {
        self.merge_at(sequence, Side::Right)
    }

    /// Merges the node holding `sequence` with its sole predecessor.
    pub fn merge_backward(&mut self, sequence: &str) -> Option<String> {
        self.merge_at(sequence, Side::Left)
    }
}

//####################################################################################
//                                   Statistics                                     //
//####################################################################################

impl Graph {
    /// Number of contigs, only defined once the graph is simplified.
    pub fn contig_count(&self) -> Option<usize> {
        self.finalized.then(|| self.count_nodes())
    }

    pub fn contig_lengths(&self) -> Vec<usize> {
        self.nodes().map(Node::len).collect()
    }

    /// N50 of the node lengths, `None` for an empty graph.
    pub fn n50(&self) -> Option<usize> {
        n50(&self.contig_lengths())
    }

    /// Counts the nodes by shape: isolated, tips, linear and branching.
    pub fn node_kinds(&self) -> NodeKinds {
        self.nodes().map(NodeKinds::of).sum()
    }

    pub fn stats(&self) -> AssemblyStats {
        let lengths = self.contig_lengths();
        AssemblyStats {
            nodes: self.count_nodes(),
            edges: self.count_edges(),
            contigs: self.contig_count(),
            n50: n50(&lengths),
            total_length: lengths.iter().sum(),
            longest: lengths.iter().max().copied().unwrap_or(0),
            kinds: self.node_kinds(),
        }
    }

    /// One `>contigN` record per node, numbered from 1.
    pub fn to_fasta(&self) -> String {
        self.sequences()
            .enumerate()
            .map(|(i, seq)| format!(">contig{}\n{}", i + 1, seq))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

//####################################################################################
//                                  Construction                                    //
//####################################################################################

/// Parameters of an assembly run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyParams {
    pub k: usize,
    pub simplify: bool,
}

impl Default for AssemblyParams {
    fn default() -> Self {
        Self {
            k: 15,
            simplify: true,
        }
    }
}

/// Builds a graph from every read of a fasta/fastq file.
pub fn build_graph(path: impl AsRef<Path>, k: usize) -> Result<Graph, GraphError> {
    let reads = read_reads(&path)?;
    let mut graph = Graph::with_k(k)?;
    for read in &reads {
        graph.add_read(read, k)?;
    }
    info!("Built {} from {} reads", graph, reads.len());
    Ok(graph)
}

/// Builds the graph of a file and, if requested, simplifies it into contigs.
pub fn assemble(path: impl AsRef<Path>, params: &AssemblyParams) -> Result<Graph, GraphError> {
    let mut graph = build_graph(path, params.k)?;
    if params.simplify {
        graph.simplify();
        info!("Simplified graph: {}", graph);
    }
    Ok(graph)
}
