//! Storage of the nodes with stable indices.
//!
//! Every edge lives twice: in the `outgoing` adjacency of its source and in the
//! `incoming` adjacency of its target. [NodeArena::connect] and [NodeArena::disconnect]
//! are the only places where edges are created or destroyed, so both views stay equal.

use std::ops::Index;

use crate::node::{Node, NodeId};
use crate::Side;

/// A node removed from the arena after being merged into a neighbor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retired {
    pub id: NodeId,
    pub node: Node,
}

/// Arena owning all the nodes of a graph. Retired nodes leave an empty slot.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    slots: Vec<Option<Node>>,
    live: usize,
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {} is not in the arena", id),
        }
    }
}

/// Basic methods
impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Some(node));
        self.live += 1;
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.slots.get_mut(id.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("node {} is not in the arena", id),
        }
    }

    /// Live nodes, by increasing id.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (NodeId(i), node)))
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Number of distinct (source, target) pairs, whatever their weight.
    pub fn edge_count(&self) -> usize {
        self.iter().map(|(_, node)| node.out_degree()).sum()
    }

    /// Checks that every outgoing edge is mirrored by an incoming edge of the same weight, and conversely.
    pub fn is_symmetric(&self) -> bool {
        self.iter().all(|(id, node)| {
            node.outgoing().iter().all(|&(target, weight)| {
                self.get(target)
                    .is_some_and(|t| t.incoming().weight(id) == weight)
            }) && node.incoming().iter().all(|&(source, weight)| {
                self.get(source)
                    .is_some_and(|s| s.outgoing().weight(id) == weight)
            })
        })
    }
}

//####################################################################################
//                                Edge choke point                                  //
//####################################################################################

impl NodeArena {
    /// Adds `weight` to the edge `from -> to`, on both endpoints.
    pub fn connect(&mut self, from: NodeId, to: NodeId, weight: u32) {
        self.node_mut(from).edges_mut(Side::Right).add(to, weight);
        self.node_mut(to).edges_mut(Side::Left).add(from, weight);
    }

    /// Records one more observation of the overlap `from -> to`.
    pub fn record_edge(&mut self, from: NodeId, to: NodeId) {
        self.node_mut(from).record_outgoing(to);
        self.node_mut(to).record_incoming(from);
    }

    /// Removes the edge `from -> to` from both endpoints and returns its weight (0 if absent).
    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> u32 {
        let out = self.node_mut(from).edges_mut(Side::Right).remove(to);
        let inc = self.node_mut(to).edges_mut(Side::Left).remove(from);
        debug_assert_eq!(out, inc, "asymmetric edge {} -> {}", from, to);
        out.unwrap_or(0)
    }

    // Same as disconnect, with the edge seen from `id` towards `side`.
    fn disconnect_side(&mut self, id: NodeId, neighbor: NodeId, side: Side) -> u32 {
        match side {
            Side::Right => self.disconnect(id, neighbor),
            Side::Left => self.disconnect(neighbor, id),
        }
    }

    fn connect_side(&mut self, id: NodeId, neighbor: NodeId, side: Side, weight: u32) {
        match side {
            Side::Right => self.connect(id, neighbor, weight),
            Side::Left => self.connect(neighbor, id, weight),
        }
    }

    /// Removes a node from the arena, dropping any edge it still has.
    pub fn retire(&mut self, id: NodeId) -> Option<Retired> {
        let node = self.get(id)?;
        let targets: Vec<NodeId> = node.outgoing().ids().collect();
        let sources: Vec<NodeId> = node.incoming().ids().collect();
        for target in targets {
            self.disconnect(id, target);
        }
        for source in sources {
            self.disconnect(source, id);
        }
        let node = self.slots[id.0].take()?;
        self.live -= 1;
        Some(Retired { id, node })
    }
}

//####################################################################################
//                                    Merging                                       //
//####################################################################################

impl NodeArena {
    /// Neighbor on `side` that can be absorbed into `id` without losing any path:
    /// `id` has a single neighbor on that side, it is not `id` itself, and `id` is its
    /// single neighbor on the opposite side.
    pub fn mergeable_neighbor(&self, id: NodeId, side: Side) -> Option<NodeId> {
        let node = self.get(id)?;
        let neighbor = node.edges(side).sole()?;
        if neighbor == id {
            return None;
        }
        match self.get(neighbor)?.edges(side.opposite()).sole() {
            Some(back) if back == id => Some(neighbor),
            _ => None,
        }
    }

    pub fn can_merge_forward(&self, id: NodeId) -> bool {
        self.mergeable_neighbor(id, Side::Right).is_some()
    }

    pub fn can_merge_backward(&self, id: NodeId) -> bool {
        self.mergeable_neighbor(id, Side::Left).is_some()
    }

    /// Absorbs the sole successor of `id` into it. Returns the retired successor,
    /// or `None` if the merge is not possible.
    pub fn merge_forward(&mut self, id: NodeId) -> Option<Retired> {
        self.merge(id, Side::Right)
    }

    /// Absorbs the sole predecessor of `id` into it. Returns the retired predecessor,
    /// or `None` if the merge is not possible.
    pub fn merge_backward(&mut self, id: NodeId) -> Option<Retired> {
        self.merge(id, Side::Left)
    }

    /// Absorbs the neighbor of `id` on `side`, see [NodeArena::mergeable_neighbor].
    pub fn merge(&mut self, id: NodeId, side: Side) -> Option<Retired> {
        let neighbor = self.mergeable_neighbor(id, side)?;

        let neighbor_seq = self[neighbor].sequence().to_owned();
        self.node_mut(id).extend(&neighbor_seq, side);

        self.disconnect_side(id, neighbor, side);

        // the neighbor's far edges now start from (or end at) `id`
        let far: Vec<NodeId> = self[neighbor].edges(side).ids().collect();
        for other in far {
            let weight = self.disconnect_side(neighbor, other, side);
            self.connect_side(id, other, side, weight);
        }

        self.retire(neighbor)
    }
}

#[cfg(test)]
mod unit_test {
    use super::*;

    fn chain(seqs: &[&str]) -> (NodeArena, Vec<NodeId>) {
        let mut arena = NodeArena::new();
        let ids: Vec<NodeId> = seqs.iter().map(|s| arena.insert(Node::new(*s))).collect();
        for pair in ids.windows(2) {
            arena.record_edge(pair[0], pair[1]);
        }
        (arena, ids)
    }

    #[test]
    fn connect_disconnect() {
        let (mut arena, ids) = chain(&["ACG", "CGT"]);
        arena.connect(ids[0], ids[1], 2);
        assert_eq!(arena[ids[0]].outgoing().weight(ids[1]), 3);
        assert_eq!(arena[ids[1]].incoming().weight(ids[0]), 3);
        assert!(arena.is_symmetric());
        assert_eq!(arena.disconnect(ids[0], ids[1]), 3);
        assert_eq!(arena.disconnect(ids[0], ids[1]), 0);
        assert_eq!(arena.edge_count(), 0);
        assert!(arena.is_symmetric());
    }

    #[test]
    fn merge_forward_rehomes_edges() {
        // ACGT -> CGTA -> {GTAC (w=3), GTAA}
        let mut arena = NodeArena::new();
        let x = arena.insert(Node::new("ACGT"));
        let y = arena.insert(Node::new("CGTA"));
        let z1 = arena.insert(Node::new("GTAC"));
        let z2 = arena.insert(Node::new("GTAA"));
        arena.record_edge(x, y);
        arena.connect(y, z1, 3);
        arena.record_edge(y, z2);

        assert!(arena.can_merge_forward(x));
        let retired = arena.merge_forward(x).expect("merge should happen");
        assert_eq!(retired.id, y);
        assert_eq!(retired.node.out_degree() + retired.node.in_degree(), 0);

        assert_eq!(arena[x].sequence(), "ACGTA");
        assert!(!arena.contains(y));
        assert_eq!(arena.len(), 3);
        assert_eq!(arena[x].outgoing().weight(z1), 3);
        assert_eq!(arena[x].outgoing().weight(z2), 1);
        assert_eq!(arena[z1].incoming().weight(x), 3);
        assert!(!arena[z1].incoming().contains(y));
        assert!(arena.is_symmetric());

        // x now branches
        assert!(arena.merge_forward(x).is_none());
    }

    #[test]
    fn merge_backward_mirrors_forward() {
        // {TACG, CACG} -> ACGT -> CGTA
        let mut arena = NodeArena::new();
        let p1 = arena.insert(Node::new("TACG"));
        let p2 = arena.insert(Node::new("CACG"));
        let x = arena.insert(Node::new("ACGT"));
        let y = arena.insert(Node::new("CGTA"));
        arena.connect(p1, x, 2);
        arena.record_edge(p2, x);
        arena.connect(x, y, 5);

        assert!(!arena.can_merge_backward(x));
        assert!(arena.can_merge_backward(y));
        let retired = arena.merge_backward(y).expect("merge should happen");
        assert_eq!(retired.id, x);
        assert_eq!(arena[y].sequence(), "ACGTA");
        assert_eq!(arena[y].incoming().weight(p1), 2);
        assert_eq!(arena[y].incoming().weight(p2), 1);
        assert_eq!(arena[p1].outgoing().sole(), Some(y));
        assert!(arena.is_symmetric());
    }

    #[test]
    fn precondition_rejects_branches_and_loops() {
        let mut arena = NodeArena::new();
        let a = arena.insert(Node::new("AAA"));
        let b = arena.insert(Node::new("AAC"));
        let c = arena.insert(Node::new("CAA"));
        arena.record_edge(a, a);
        assert!(!arena.can_merge_forward(a));
        arena.record_edge(a, b);
        assert!(!arena.can_merge_forward(a));
        // c -> a, but a also has itself as predecessor
        arena.record_edge(c, a);
        assert!(!arena.can_merge_forward(c));
        assert!(arena.merge_forward(c).is_none());
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn cycle_collapses_to_self_loop() {
        let (mut arena, ids) = chain(&["ACG", "CGA", "GAC"]);
        arena.record_edge(ids[2], ids[0]);
        let mut merges = 0;
        while arena.merge_forward(ids[0]).is_some() {
            merges += 1;
        }
        assert_eq!(merges, 2);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena[ids[0]].sequence(), "ACGAC");
        assert_eq!(arena[ids[0]].outgoing().sole(), Some(ids[0]));
        assert!(arena.is_symmetric());
    }

    #[test]
    fn retire_drops_edges() {
        let (mut arena, ids) = chain(&["ACG", "CGT", "GTT"]);
        let retired = arena.retire(ids[1]).expect("node is live");
        assert_eq!(retired.node.sequence(), "CGT");
        assert_eq!(arena.edge_count(), 0);
        assert!(arena.retire(ids[1]).is_none());
        assert!(arena.is_symmetric());
    }
}
