//! Minor stats about assembled graphs and their contigs

use std::fmt::Display;

use derive_more::with_trait::{Add, AddAssign, Sum};
use textplots::{Chart, Plot, Shape};

use crate::node::Node;

/// N50 of a set of lengths: sorted in increasing order, the length at which the running
/// sum first exceeds half of the total. `None` if there are no lengths.
pub fn n50(lengths: &[usize]) -> Option<usize> {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable();
    let total: usize = sorted.iter().sum();
    let mut cum_sum = 0;
    for length in sorted {
        cum_sum += length;
        if 2 * cum_sum > total {
            return Some(length);
        }
    }
    None
}

//####################################################################################
//                                  Node kinds                                      //
//####################################################################################

/// Number of nodes of each shape.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Add, AddAssign, Sum)]
pub struct NodeKinds {
    /// no edge at all
    pub isolated: usize,
    /// no edge on one side
    pub tips: usize,
    /// exactly one edge on each side
    pub linear: usize,
    /// more than one edge on some side
    pub branching: usize,
}

impl NodeKinds {
    pub fn of(node: &Node) -> Self {
        let mut kinds = Self::default();
        match (node.in_degree(), node.out_degree()) {
            (0, 0) => kinds.isolated = 1,
            (0, _) | (_, 0) => kinds.tips = 1,
            (1, 1) => kinds.linear = 1,
            _ => kinds.branching = 1,
        }
        kinds
    }
}

//####################################################################################
//                                AssemblyStats                                     //
//####################################################################################

/// Summary of a graph, usually taken after simplification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyStats {
    pub nodes: usize,
    pub edges: usize,
    /// `None` until the graph is simplified
    pub contigs: Option<usize>,
    pub n50: Option<usize>,
    pub total_length: usize,
    pub longest: usize,
    pub kinds: NodeKinds,
}

fn or_dash(value: Option<usize>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl Display for AssemblyStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph contains:")?;
        writeln!(f, "  - {} nodes", self.nodes)?;
        writeln!(f, "  - {} edges", self.edges)?;
        writeln!(f, "  - contigs: {}", or_dash(self.contigs))?;
        writeln!(f, "  - N50: {}", or_dash(self.n50))?;
        writeln!(f, "  - total length: {}", self.total_length)?;
        writeln!(f, "  - longest: {}", self.longest)?;
        write!(
            f,
            "  node kinds: {} isolated, {} tips, {} linear, {} branching",
            self.kinds.isolated, self.kinds.tips, self.kinds.linear, self.kinds.branching
        )
    }
}

//####################################################################################
//                                   Plotting                                       //
//####################################################################################

/// Bins the lengths into at most `nb_bins` bins of equal width.
/// Returns (bin start, count) pairs.
pub fn length_histogram(lengths: &[usize], nb_bins: usize) -> Vec<(usize, usize)> {
    let (Some(&min), Some(&max)) = (lengths.iter().min(), lengths.iter().max()) else {
        return Vec::new();
    };
    let step = (max - min + 1).div_ceil(nb_bins.max(1));
    let mut counts = vec![0; (max - min) / step + 1];
    for &length in lengths {
        counts[(length - min) / step] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| (min + i * step, count))
        .collect()
}

/// Renders the contig length histogram as a text plot.
pub fn plot_lengths(lengths: &[usize]) -> String {
    let histogram = length_histogram(lengths, 40);
    let (Some(first), Some(last)) = (histogram.first(), histogram.last()) else {
        return String::new();
    };
    let points: Vec<(f32, f32)> = histogram
        .iter()
        .map(|&(start, count)| (start as f32, count as f32))
        .collect();
    let x_min = first.0 as f32;
    let x_max = (last.0 + 1) as f32;
    let shape = Shape::Bars(&points);
    let mut chart = Chart::new(160, 60, x_min, x_max);
    let chart = chart.lineplot(&shape);
    chart.axis();
    chart.figures();
    chart.to_string()
}

#[cfg(test)]
mod unit_test {
    use super::*;
    use crate::arena::NodeArena;

    #[test]
    fn n50_example() {
        assert_eq!(n50(&[2, 3, 4, 5, 6]), Some(5));
        assert_eq!(n50(&[6, 2, 5, 3, 4]), Some(5));
        assert_eq!(n50(&[10]), Some(10));
        // running sum equal to half is not enough
        assert_eq!(n50(&[1, 1]), Some(1));
        assert_eq!(n50(&[2, 2, 4]), Some(4));
        assert_eq!(n50(&[]), None);
    }

    #[test]
    fn node_kinds() {
        let mut arena = NodeArena::new();
        let a = arena.insert(Node::new("ACG"));
        let b = arena.insert(Node::new("CGT"));
        let c = arena.insert(Node::new("GTA"));
        let d = arena.insert(Node::new("GTC"));
        let e = arena.insert(Node::new("TTT"));
        arena.record_edge(a, b);
        arena.record_edge(b, c);
        arena.record_edge(b, d);
        arena.record_edge(e, e);
        let kinds: NodeKinds = arena.iter().map(|(_, node)| NodeKinds::of(node)).sum();
        assert_eq!(
            kinds,
            NodeKinds {
                isolated: 0,
                tips: 3,
                linear: 1,
                branching: 1
            }
        );
    }

    #[test]
    fn histogram_bins() {
        assert!(length_histogram(&[], 10).is_empty());
        assert_eq!(length_histogram(&[5, 5, 5], 10), vec![(5, 3)]);
        assert_eq!(
            length_histogram(&[1, 2, 3, 4, 10], 5),
            vec![(1, 2), (3, 2), (5, 0), (7, 0), (9, 1)]
        );
    }

    #[test]
    fn plot_is_not_empty() {
        assert!(plot_lengths(&[]).is_empty());
        assert!(!plot_lengths(&[3, 5, 5, 8, 13]).is_empty());
    }
}
