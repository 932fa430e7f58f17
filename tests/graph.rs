use dbg_assembler::{Graph, GraphError, KmerCounts, Read};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_random_seq_seed(n: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| b"ACGT"[rng.random_range(0..4)]).collect()
}

fn random_reads(seq: &[u8], nb_reads: usize, read_len: usize, seed: u64) -> Vec<Read> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..nb_reads)
        .map(|i| {
            let start = rng.random_range(0..=seq.len() - read_len);
            Read::new(&format!(">read{}", i), &seq[start..start + read_len])
        })
        .collect()
}

#[test]
fn overlapping_reads_accumulate_weights() {
    let mut graph = Graph::new();
    let r1 = Read::new(">r1", b"AAAGGG");
    let r2 = Read::new(">r2", b"AGGGCC");

    graph.add_counts(&r1.kmers(3)).unwrap();
    assert_eq!(graph.edge_weight("AGG", "GGG"), 1);
    graph.add_counts(&r2.kmers(3)).unwrap();
    assert_eq!(graph.edge_weight("AGG", "GGG"), 2);

    assert_eq!(graph.count_nodes(), 6);
    assert!(graph.arena().is_symmetric());
}

#[test]
fn mixed_lengths_are_rejected() {
    let mut graph = Graph::with_k(4).unwrap();
    let err = graph.add_kmers([("ACGT", 1), ("ACG", 1)]).unwrap_err();
    match err {
        GraphError::KmerLengthMismatch {
            expected,
            found,
            kmer,
        } => {
            assert_eq!((expected, found), (4, 3));
            assert_eq!(kmer, "ACG");
        }
        other => panic!("unexpected error: {}", other),
    }
    // the k-mer read before the faulty one is kept
    assert!(graph.node("ACGT").is_some());
}

#[test]
fn edges_are_bounded_and_symmetric() {
    for seed in 0..5 {
        let seq = generate_random_seq_seed(400, seed);
        let mut graph = Graph::new();
        for read in random_reads(&seq, 30, 50, seed + 100) {
            graph.add_read(&read, 7).unwrap();
            assert!(graph.count_edges() <= 4 * graph.count_nodes());
            assert!(graph.arena().is_symmetric());
        }
    }
}

#[test]
fn every_kmer_becomes_a_node() {
    let seq = generate_random_seq_seed(200, 7);
    let counts = KmerCounts::from_seq(&seq, 9);
    let mut graph = Graph::new();
    graph.add_counts(&counts).unwrap();
    assert_eq!(graph.count_nodes(), counts.len());
    for (kmer, _) in counts.entries() {
        assert_eq!(graph.node(kmer).map(|n| n.sequence()), Some(kmer));
    }
    assert_eq!(graph.k(), Some(9));
}
