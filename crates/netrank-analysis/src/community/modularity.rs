//! Greedy modularity communities (Clauset–Newman–Moore).
//!
//! # Overview
//!
//! Modularity compares the share of edges inside communities with the share
//! expected if edges were placed at random with the same degrees:
//!
//! ```text
//! Q = Σ_c [ L_c / m  -  (d_c / 2m)² ]
//! ```
//!
//! `L_c` is the number of edges inside community `c`, `d_c` the total
//! degree of its members and `m` the edge count.
//!
//! # Algorithm
//!
//! Start with one community per node. Repeatedly merge the pair of adjacent
//! communities with the largest modularity gain `ΔQ`, updating the gains of
//! their neighbours in place:
//!
//! - neighbour of both:  `ΔQ_vw = ΔQ_iw + ΔQ_jw`
//! - neighbour of `i` only: `ΔQ_vw = ΔQ_iw - 2 a_j a_w`
//! - neighbour of `j` only: `ΔQ_vw = ΔQ_jw - 2 a_i a_w`
//!
//! where `a_x` is the degree share of community `x`. Merging stops at the
//! first negative gain once at most `best_n` communities remain, or when
//! `cutoff` communities remain. If no adjacent pair is left while more than
//! `best_n` communities remain, the two largest are merged until `best_n`
//! remain.
//!
//! Gains are kept in a max-heap with lazy invalidation. Equal gains merge
//! the pair with the smallest node positions first, so results are
//! deterministic.
//!
//! Self-loops and edge weights are ignored.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use netrank_core::{NetrankError, Result};
use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use crate::graph::SimpleGraph;

/// Stop/target community counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunityLimits {
    /// Merging stops once this many communities remain. At least 1.
    pub cutoff: usize,
    /// Merge past negative gains until at most this many remain.
    pub best_n: Option<usize>,
}

impl Default for CommunityLimits {
    fn default() -> Self {
        Self {
            cutoff: 1,
            best_n: None,
        }
    }
}

impl CommunityLimits {
    /// Check the limits against a graph of `n` nodes.
    ///
    /// # Errors
    ///
    /// Returns [`NetrankError::InvalidPartition`] if `cutoff` or `best_n` is
    /// zero or exceeds `n`, or if `best_n < cutoff`.
    pub fn validate(self, n: usize) -> Result<()> {
        if self.cutoff < 1 || self.cutoff > n {
            return Err(NetrankError::InvalidPartition(format!(
                "cutoff={} must be between 1 and the node count ({n})",
                self.cutoff
            )));
        }
        if let Some(best_n) = self.best_n {
            if best_n < 1 || best_n > n {
                return Err(NetrankError::InvalidPartition(format!(
                    "best_n={best_n} must be between 1 and the node count ({n})"
                )));
            }
            if best_n < self.cutoff {
                return Err(NetrankError::InvalidPartition(format!(
                    "best_n={best_n} must not be smaller than cutoff={}",
                    self.cutoff
                )));
            }
        }
        Ok(())
    }
}

/// Communities found and their modularity.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityResult {
    /// Communities by size, largest first; members in node order.
    pub communities: Vec<Vec<String>>,
    /// Modularity `Q` of the partition (0 for a graph without edges).
    pub modularity: f64,
}

impl CommunityResult {
    /// `(node, community index)` for every node.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, usize)> {
        self.communities
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.iter().map(move |node| (node.as_str(), i)))
    }
}

// ---------------------------------------------------------------------------
// Heap entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Candidate {
    dq: f64,
    i: usize,
    j: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Largest gain first; then smallest (i, j).
    fn cmp(&self, other: &Self) -> Ordering {
        self.dq
            .total_cmp(&other.dq)
            .then_with(|| other.i.cmp(&self.i))
            .then_with(|| other.j.cmp(&self.j))
    }
}

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

struct Cnm {
    /// `dq[i][j]`: gain of merging communities `i` and `j` (adjacent only).
    dq: Vec<HashMap<usize, f64>>,
    /// Degree share of each community.
    a: Vec<f64>,
    members: Vec<Vec<usize>>,
    alive: Vec<bool>,
    active: usize,
    heap: BinaryHeap<Candidate>,
}

impl Cnm {
    #[allow(clippy::cast_precision_loss)]
    fn new(neighbors: &[Vec<usize>], m: f64) -> Self {
        let n = neighbors.len();
        let q0 = 1.0 / (2.0 * m);
        let k: Vec<f64> = neighbors.iter().map(|nb| nb.len() as f64).collect();
        let a: Vec<f64> = k.iter().map(|ki| ki * q0).collect();

        let mut dq = vec![HashMap::new(); n];
        let mut heap = BinaryHeap::new();
        for (i, nb) in neighbors.iter().enumerate() {
            for &j in nb {
                let gain = 2.0 * (q0 - k[i] * k[j] * q0 * q0);
                dq[i].insert(j, gain);
                if i < j {
                    heap.push(Candidate { dq: gain, i, j });
                }
            }
        }

        Self {
            dq,
            a,
            members: (0..n).map(|i| vec![i]).collect(),
            alive: vec![true; n],
            active: n,
            heap,
        }
    }

    /// Best current merge, discarding stale heap entries.
    fn peek_best(&mut self) -> Option<Candidate> {
        while let Some(&top) = self.heap.peek() {
            let current = self.dq[top.i].get(&top.j).copied();
            if self.alive[top.i]
                && self.alive[top.j]
                && current.is_some_and(|d| d.to_bits() == top.dq.to_bits())
            {
                return Some(top);
            }
            self.heap.pop();
        }
        None
    }

    /// Merge community `j` into `i`.
    fn merge(&mut self, i: usize, j: usize) {
        let row_i = std::mem::take(&mut self.dq[i]);
        let row_j = std::mem::take(&mut self.dq[j]);

        let mut neighbours: Vec<usize> = row_i.keys().chain(row_j.keys()).copied().collect();
        neighbours.sort_unstable();
        neighbours.dedup();

        let mut new_row = HashMap::with_capacity(neighbours.len());
        for w in neighbours {
            if w == i || w == j {
                continue;
            }
            let gain = match (row_i.get(&w), row_j.get(&w)) {
                (Some(iw), Some(jw)) => iw + jw,
                (Some(iw), None) => iw - 2.0 * self.a[j] * self.a[w],
                (None, Some(jw)) => jw - 2.0 * self.a[i] * self.a[w],
                (None, None) => continue,
            };
            new_row.insert(w, gain);
            self.dq[w].remove(&j);
            self.dq[w].insert(i, gain);
            self.heap.push(Candidate {
                dq: gain,
                i: i.min(w),
                j: i.max(w),
            });
        }
        self.dq[i] = new_row;

        self.a[i] += self.a[j];
        self.a[j] = 0.0;
        let moved = std::mem::take(&mut self.members[j]);
        self.members[i].extend(moved);
        self.alive[j] = false;
        self.active -= 1;
    }

    fn communities(&self) -> Vec<Vec<usize>> {
        let mut out: Vec<Vec<usize>> = self
            .members
            .iter()
            .zip(&self.alive)
            .filter(|(_, alive)| **alive)
            .map(|(m, _)| {
                let mut m = m.clone();
                m.sort_unstable();
                m
            })
            .collect();
        sort_communities(&mut out);
        out
    }
}

/// Size descending, then first member.
fn sort_communities(communities: &mut [Vec<usize>]) {
    communities.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a.first().cmp(&b.first()))
    });
}

/// Loop-free neighbour lists by node position.
fn simple_neighbors(g: &SimpleGraph) -> Vec<Vec<usize>> {
    let mut neighbors = vec![Vec::new(); g.node_count()];
    for edge in g.graph.raw_edges() {
        let (a, b) = (edge.source().index(), edge.target().index());
        if a != b {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
    }
    neighbors
}

/// Modularity `Q` of a partition given as node positions.
#[allow(clippy::cast_precision_loss)]
fn partition_modularity(neighbors: &[Vec<usize>], communities: &[Vec<usize>]) -> f64 {
    let two_m: usize = neighbors.iter().map(Vec::len).sum();
    if two_m == 0 {
        return 0.0;
    }
    let mut label = vec![0usize; neighbors.len()];
    for (c, members) in communities.iter().enumerate() {
        for &v in members {
            label[v] = c;
        }
    }
    let two_m = two_m as f64;
    communities
        .iter()
        .enumerate()
        .map(|(c, members)| {
            // Each internal edge is seen from both ends.
            let internal_ends: usize = members
                .iter()
                .map(|&v| neighbors[v].iter().filter(|&&w| label[w] == c).count())
                .sum();
            let degree: usize = members.iter().map(|&v| neighbors[v].len()).sum();
            let share = degree as f64 / two_m;
            internal_ends as f64 / two_m - share * share
        })
        .sum()
}

/// Greedy modularity communities of `g`.
///
/// # Errors
///
/// Returns [`NetrankError::InvalidPartition`] when `limits` are out of range
/// for the graph (see [`CommunityLimits::validate`]).
#[instrument(skip(g), fields(nodes = g.node_count()))]
pub fn greedy_modularity_communities(
    g: &SimpleGraph,
    limits: CommunityLimits,
) -> Result<CommunityResult> {
    let n = g.node_count();
    if n == 0 {
        return Ok(CommunityResult {
            communities: Vec::new(),
            modularity: 0.0,
        });
    }
    limits.validate(n)?;

    let neighbors = simple_neighbors(g);
    let edge_ends: usize = neighbors.iter().map(Vec::len).sum();

    let positions: Vec<Vec<usize>> = if edge_ends == 0 {
        (0..n).map(|v| vec![v]).collect()
    } else if limits.best_n == Some(1) {
        vec![(0..n).collect()]
    } else {
        #[allow(clippy::cast_precision_loss)]
        let m = edge_ends as f64 / 2.0;
        run_cnm(&neighbors, m, limits)
    };

    let modularity = partition_modularity(&neighbors, &positions);
    debug!(communities = positions.len(), modularity, "greedy modularity finished");

    let communities = positions
        .into_iter()
        .map(|c| {
            c.into_iter()
                .map(|v| g.graph[NodeIndex::new(v)].clone())
                .collect()
        })
        .collect();

    Ok(CommunityResult {
        communities,
        modularity,
    })
}

fn run_cnm(neighbors: &[Vec<usize>], m: f64, limits: CommunityLimits) -> Vec<Vec<usize>> {
    let best_n = limits.best_n.unwrap_or(neighbors.len());
    let mut cnm = Cnm::new(neighbors, m);

    while cnm.active > limits.cutoff {
        let Some(best) = cnm.peek_best() else {
            // No adjacent pair left: fold the largest communities together.
            let mut communities = cnm.communities();
            while communities.len() > best_n {
                let first = communities.remove(0);
                communities[0].extend(first);
                communities[0].sort_unstable();
                sort_communities(&mut communities);
            }
            return communities;
        };
        if best.dq < 0.0 && cnm.active <= best_n {
            break;
        }
        cnm.heap.pop();
        cnm.merge(best.i, best.j);
    }

    cnm.communities()
}

#[cfg(test)]
mod tests {
    use super::*;
    use netrank_core::{Attributes, NetworkData};

    fn make_graph(nodes: &[&str], edges: &[(&str, &str)]) -> SimpleGraph {
        let mut n = NetworkData::new(false);
        for id in nodes {
            n.add_node(*id);
        }
        for (a, b) in edges {
            n.add_edge(*a, *b, Attributes::new());
        }
        SimpleGraph::from_network(&n, true)
    }

    fn two_triangles() -> SimpleGraph {
        make_graph(
            &[],
            &[
                ("A", "B"),
                ("B", "C"),
                ("C", "A"),
                ("D", "E"),
                ("E", "F"),
                ("F", "D"),
                ("C", "D"),
            ],
        )
    }

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn bridged_triangles_split_in_two() {
        let r = greedy_modularity_communities(&two_triangles(), CommunityLimits::default())
            .expect("communities");
        assert_eq!(
            r.communities,
            vec![strings(&["A", "B", "C"]), strings(&["D", "E", "F"])]
        );
        // Q = 2 * (3/7 - (7/14)^2) = 5/14
        assert!((r.modularity - 5.0 / 14.0).abs() < 1e-10);
    }

    #[test]
    fn assignments_cover_every_node() {
        let r = greedy_modularity_communities(&two_triangles(), CommunityLimits::default())
            .expect("communities");
        let mut seen: Vec<(&str, usize)> = r.assignments().collect();
        seen.sort_unstable();
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], ("A", 0));
        assert_eq!(seen[5], ("F", 1));
    }

    #[test]
    fn best_n_forces_merges_past_negative_gain() {
        let limits = CommunityLimits {
            cutoff: 1,
            best_n: Some(1),
        };
        let r = greedy_modularity_communities(&two_triangles(), limits).expect("communities");
        assert_eq!(r.communities.len(), 1);
        assert!(r.modularity.abs() < 1e-10);
    }

    #[test]
    fn cutoff_stops_merging_early() {
        let limits = CommunityLimits {
            cutoff: 4,
            best_n: None,
        };
        let r = greedy_modularity_communities(&two_triangles(), limits).expect("communities");
        assert_eq!(r.communities.len(), 4);
    }

    #[test]
    fn edgeless_graph_gives_singletons() {
        let g = make_graph(&["A", "B", "C"], &[]);
        let r = greedy_modularity_communities(&g, CommunityLimits::default()).expect("communities");
        assert_eq!(r.communities, vec![strings(&["A"]), strings(&["B"]), strings(&["C"])]);
        assert!(r.modularity.abs() < 1e-12);
    }

    #[test]
    fn disconnected_pairs_fold_to_best_n() {
        let g = make_graph(&[], &[("A", "B"), ("C", "D"), ("E", "F")]);
        let limits = CommunityLimits {
            cutoff: 1,
            best_n: Some(2),
        };
        let r = greedy_modularity_communities(&g, limits).expect("communities");
        assert_eq!(r.communities.len(), 2);
        assert_eq!(r.communities[0].len(), 4);
    }

    #[test]
    fn too_many_communities_is_domain_error() {
        let limits = CommunityLimits {
            cutoff: 1,
            best_n: Some(99),
        };
        let err = greedy_modularity_communities(&two_triangles(), limits).expect_err("range");
        assert!(matches!(err, NetrankError::InvalidPartition(_)));
        assert!(err.to_string().contains("best_n=99"));
    }

    #[test]
    fn zero_cutoff_and_inverted_limits_are_rejected() {
        assert!(CommunityLimits { cutoff: 0, best_n: None }.validate(3).is_err());
        assert!(CommunityLimits { cutoff: 4, best_n: None }.validate(3).is_err());
        assert!(CommunityLimits { cutoff: 3, best_n: Some(2) }.validate(3).is_err());
        assert!(CommunityLimits { cutoff: 2, best_n: Some(3) }.validate(3).is_ok());
    }

    #[test]
    fn empty_graph_has_no_communities() {
        let r = greedy_modularity_communities(&make_graph(&[], &[]), CommunityLimits::default())
            .expect("empty");
        assert!(r.communities.is_empty());
    }
}
