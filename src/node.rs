//! Nodes of the de Bruijn graph: a sequence and its weighted adjacency.

use derive_more::{Deref, Display, From, Into};
use smallvec::SmallVec;

use crate::{Side, NUCLEOTIDES};

//####################################################################################
//                                   NodeId                                         //
//####################################################################################

/// Stable index of a node inside a [NodeArena](crate::NodeArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
pub struct NodeId(pub usize);

//####################################################################################
//                                  Adjacency                                       //
//####################################################################################

/// Weighted neighbors of a node on one side.
/// A k-mer has at most 4 neighbors per side, so the list is stored inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct Adjacency(SmallVec<[(NodeId, u32); 4]>);

impl Adjacency {
    /// Weight of the edge to `id`, 0 if absent.
    pub fn weight(&self, id: NodeId) -> u32 {
        self.0
            .iter()
            .find(|(neighbor, _)| *neighbor == id)
            .map_or(0, |(_, weight)| *weight)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.0.iter().any(|(neighbor, _)| *neighbor == id)
    }

    /// Adds `weight` to the edge to `id`, creating it if needed.
    pub(crate) fn add(&mut self, id: NodeId, weight: u32) {
        match self.0.iter_mut().find(|(neighbor, _)| *neighbor == id) {
            Some((_, w)) => *w += weight,
            None => self.0.push((id, weight)),
        }
    }

    /// Removes the edge to `id` and returns its weight.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<u32> {
        let pos = self.0.iter().position(|(neighbor, _)| *neighbor == id)?;
        Some(self.0.remove(pos).1)
    }

    /// The neighbor, if there is exactly one.
    pub fn sole(&self) -> Option<NodeId> {
        match self.0.as_slice() {
            [(id, _)] => Some(*id),
            _ => None,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().map(|(id, _)| *id)
    }
}

//####################################################################################
//                                     Node                                         //
//####################################################################################

/// A k-mer, or a contig once neighbors have been merged into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    sequence: String,
    outgoing: Adjacency,
    incoming: Adjacency,
}

impl Node {
    pub fn new(sequence: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            outgoing: Adjacency::default(),
            incoming: Adjacency::default(),
        }
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn outgoing(&self) -> &Adjacency {
        &self.outgoing
    }

    pub fn incoming(&self) -> &Adjacency {
        &self.incoming
    }

    /// Adjacency towards the given side: `Right` is outgoing, `Left` is incoming.
    pub fn edges(&self, side: Side) -> &Adjacency {
        match side {
            Side::Left => &self.incoming,
            Side::Right => &self.outgoing,
        }
    }

    pub(crate) fn edges_mut(&mut self, side: Side) -> &mut Adjacency {
        match side {
            Side::Left => &mut self.incoming,
            Side::Right => &mut self.outgoing,
        }
    }

    pub fn out_degree(&self) -> usize {
        self.outgoing.len()
    }

    pub fn in_degree(&self) -> usize {
        self.incoming.len()
    }

    /// The k-mers that could precede this one: one base prepended, last base dropped.
    pub fn predecessor_candidates(&self) -> [String; 4] {
        let prefix = &self.sequence[..self.sequence.len().saturating_sub(1)];
        NUCLEOTIDES.map(|base| {
            let mut candidate = String::with_capacity(self.sequence.len());
            candidate.push(base as char);
            candidate.push_str(prefix);
            candidate
        })
    }

    /// The k-mers that could follow this one: first base dropped, one base appended.
    pub fn successor_candidates(&self) -> [String; 4] {
        let suffix = self.sequence.get(1..).unwrap_or_default();
        NUCLEOTIDES.map(|base| {
            let mut candidate = String::with_capacity(self.sequence.len());
            candidate.push_str(suffix);
            candidate.push(base as char);
            candidate
        })
    }

    /// Increments the weight of the edge towards `target`.
    /// The caller is responsible for recording the mirror edge on `target`.
    pub fn record_outgoing(&mut self, target: NodeId) {
        self.outgoing.add(target, 1);
    }

    /// Increments the weight of the edge coming from `source`.
    /// The caller is responsible for recording the mirror edge on `source`.
    pub fn record_incoming(&mut self, source: NodeId) {
        self.incoming.add(source, 1);
    }

    /// Glues `other` to the given side of the sequence, skipping their overlap.
    /// Returns the overlap length.
    pub(crate) fn extend(&mut self, other: &str, side: Side) -> usize {
        match side {
            Side::Right => {
                let overlap = overlap_len(&self.sequence, other);
                self.sequence.push_str(&other[overlap..]);
                overlap
            }
            Side::Left => {
                let overlap = overlap_len(other, &self.sequence);
                let mut sequence = String::with_capacity(other.len() + self.sequence.len() - overlap);
                sequence.push_str(&other[..other.len() - overlap]);
                sequence.push_str(&self.sequence);
                self.sequence = sequence;
                overlap
            }
        }
    }
}

/// Length of the longest suffix of `left` that is also a prefix of `right`.
pub fn overlap_len(left: &str, right: &str) -> usize {
    let max = left.len().min(right.len());
    (1..=max)
        .rev()
        .find(|&i| left.ends_with(&right[..i]))
        .unwrap_or(0)
}
