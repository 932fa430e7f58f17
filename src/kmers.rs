//! Reads and the k-mers they contain.

use std::collections::BTreeMap;
use std::fmt::Display;

use derive_more::{Deref, DerefMut};

use crate::NUCLEOTIDES;

//####################################################################################
//                                     Read                                         //
//####################################################################################

/// A sequencing read: its name and its bases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    pub name: String,
    pub bases: Vec<u8>,
}

impl Read {
    /// The leading '>' of the name is stripped, bases are uppercased and whitespace is removed.
    pub fn new(name: &str, bases: &[u8]) -> Self {
        let name = name.trim().trim_start_matches('>').to_string();
        let bases = bases
            .iter()
            .filter(|b| !b.is_ascii_whitespace())
            .map(|b| b.to_ascii_uppercase())
            .collect();
        Self { name, bases }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn kmers(&self, k: usize) -> KmerCounts {
        KmerCounts::from_seq(&self.bases, k)
    }
}

impl Display for Read {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = &self.bases[..self.bases.len().min(20)];
        let ellipsis = if self.bases.len() > 20 { "..." } else { "" };
        write!(f, "{}: {}{}", self.name, String::from_utf8_lossy(shown), ellipsis)
    }
}

//####################################################################################
//                                  KmerCounts                                      //
//####################################################################################

/// Occurrence count of each k-mer of a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct KmerCounts(pub BTreeMap<String, usize>);

impl KmerCounts {
    /// Counts every window of length `k`. Windows with a base outside of [NUCLEOTIDES] are skipped.
    pub fn from_seq(seq: &[u8], k: usize) -> Self {
        let mut counts = BTreeMap::new();
        if k == 0 || seq.len() < k {
            return Self(counts);
        }
        // number of consecutive valid bases ending at the current position
        let mut valid_run = 0;
        for (end, base) in seq.iter().enumerate() {
            if NUCLEOTIDES.contains(base) {
                valid_run += 1;
            } else {
                valid_run = 0;
            }
            if valid_run >= k {
                let window = &seq[end + 1 - k..=end];
                // only ACGT bytes, always valid utf8
                let kmer = String::from_utf8_lossy(window).into_owned();
                *counts.entry(kmer).or_insert(0) += 1;
            }
        }
        Self(counts)
    }

    /// (k-mer, count) pairs, in lexicographic order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(kmer, &count)| (kmer.as_str(), count))
    }
}
