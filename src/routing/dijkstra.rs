//! Dijkstra-based shortest paths with deterministic tie-breaking.
//!
//! A request runs Dijkstra twice, once from each endpoint. A link `u-v` lies
//! on some shortest path exactly when
//! `dist(src, u) + w(u, v) + dist(v, dst) == dist(src, dst)`. Walking those
//! links forward from `src`, always trying neighbors in ascending identifier
//! order, yields the lexicographically smallest shortest path; a depth-first
//! walk over the same links yields the full equal-cost set in lexicographic
//! order. Weights are positive, so the walk always makes progress.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use log::debug;

use super::view::TopologyView;
use super::{Path, PathSet};
use crate::error::ControllerError;
use crate::topology::{LinkKey, NodeId, TopologyStore};

/// Single minimum-weight path from `src` to `dst`
pub fn shortest_path(topology: &TopologyStore, src: &str, dst: &str) -> Result<Path, ControllerError> {
    ShortestPathDag::build(&TopologyView::full(topology), src, dst).map(|dag| dag.first_path())
}

/// Every path whose total weight equals the minimum, in lexicographic order
pub fn all_shortest_paths(topology: &TopologyStore, src: &str, dst: &str) -> Result<Vec<Path>, ControllerError> {
    ShortestPathDag::build(&TopologyView::full(topology), src, dst).map(|dag| dag.all_paths())
}

/// Primary path and equal-cost set in one pass
pub fn compute_paths(topology: &TopologyStore, src: &str, dst: &str) -> Result<PathSet, ControllerError> {
    compute_paths_in(&TopologyView::full(topology), src, dst)
}

/// Shortest path on a view of `topology` with `excluded` links hidden.
///
/// Only the listed links are hidden; intermediate switches of the excluded
/// links stay reachable through their other links.
pub fn shortest_path_excluding(
    topology: &TopologyStore,
    src: &str,
    dst: &str,
    excluded: &BTreeSet<LinkKey>,
) -> Result<Path, ControllerError> {
    let view = TopologyView::excluding(topology, excluded.iter().cloned());
    ShortestPathDag::build(&view, src, dst).map(|dag| dag.first_path())
}

/// Primary path and equal-cost set computed on an arbitrary view
pub fn compute_paths_in(view: &TopologyView<'_>, src: &str, dst: &str) -> Result<PathSet, ControllerError> {
    let dag = ShortestPathDag::build(view, src, dst)?;
    let paths = dag.all_paths();
    let primary = paths.first().cloned().unwrap_or_else(|| dag.first_path());
    Ok(PathSet {
        primary,
        paths,
        cost: dag.total,
    })
}

/// Distances from both endpoints, restricted to what a request needs
struct ShortestPathDag<'v, 'a> {
    view: &'v TopologyView<'a>,
    src: &'a NodeId,
    dst: &'a NodeId,
    from_src: HashMap<&'a NodeId, u64>,
    to_dst: HashMap<&'a NodeId, u64>,
    total: u64,
}

impl<'v, 'a> ShortestPathDag<'v, 'a> {
    fn build(view: &'v TopologyView<'a>, src: &str, dst: &str) -> Result<Self, ControllerError> {
        let store = view.store();
        let src = store.node(src)?;
        let dst = store.node(dst)?;

        let from_src = distances(view, src);
        let total = *from_src.get(dst).ok_or_else(|| ControllerError::NoPath {
            src: src.clone(),
            dst: dst.clone(),
        })?;
        let to_dst = distances(view, dst);
        debug!("routing: {} -> {} minimum cost {}", src, dst, total);

        Ok(Self {
            view,
            src,
            dst,
            from_src,
            to_dst,
            total,
        })
    }

    /// True if stepping `u -> v` over a link of `weight` stays on a shortest path
    fn on_shortest(&self, u: &NodeId, v: &NodeId, weight: u32) -> bool {
        match (self.from_src.get(u), self.to_dst.get(v)) {
            (Some(du), Some(dv)) => du + u64::from(weight) + dv == self.total,
            _ => false,
        }
    }

    fn next_hops(&self, node: &'a NodeId) -> impl Iterator<Item = &'a NodeId> + '_ {
        self.view
            .neighbors(node.as_str())
            .filter(move |(next, weight)| self.on_shortest(node, next, *weight))
            .map(|(next, _)| next)
    }

    fn first_path(&self) -> Path {
        let mut nodes = vec![self.src.clone()];
        let mut current = self.src;
        while current != self.dst {
            match self.next_hops(current).next() {
                Some(next) => {
                    nodes.push(next.clone());
                    current = next;
                }
                None => break,
            }
        }
        Path(nodes)
    }

    fn all_paths(&self) -> Vec<Path> {
        if self.src == self.dst {
            return vec![Path::single(self.src.clone())];
        }
        let mut paths = Vec::new();
        let mut prefix = vec![self.src];
        self.extend(&mut prefix, &mut paths);
        paths
    }

    fn extend(&self, prefix: &mut Vec<&'a NodeId>, paths: &mut Vec<Path>) {
        let Some(&last) = prefix.last() else {
            return;
        };
        if last == self.dst {
            paths.push(Path(prefix.iter().map(|node| (*node).clone()).collect()));
            return;
        }
        let next_hops: Vec<&'a NodeId> = self.next_hops(last).collect();
        for next in next_hops {
            prefix.push(next);
            self.extend(prefix, paths);
            prefix.pop();
        }
    }
}

/// Single-source Dijkstra over the visible links of `view`.
///
/// Heap entries carry the node identifier as a secondary key, so nodes at
/// equal distance are settled in ascending identifier order.
fn distances<'a>(view: &TopologyView<'a>, source: &'a NodeId) -> HashMap<&'a NodeId, u64> {
    let mut dist: HashMap<&'a NodeId, u64> = HashMap::new();
    let mut heap = BinaryHeap::new();

    dist.insert(source, 0);
    heap.push(Reverse((0u64, source)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        // Skip stale entries whose distance was already improved
        if dist.get(node).is_some_and(|best| cost > *best) {
            continue;
        }
        for (next, weight) in view.neighbors(node.as_str()) {
            let candidate = cost + u64::from(weight);
            let improved = dist.get(next).map_or(true, |best| candidate < *best);
            if improved {
                dist.insert(next, candidate);
                heap.push(Reverse((candidate, next)));
            }
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology(links: &[(&str, &str, u32)]) -> TopologyStore {
        let mut store = TopologyStore::new();
        for (a, b, weight) in links {
            store.add_node(*a);
            store.add_node(*b);
            store.add_link(a, b, *weight).unwrap();
        }
        store
    }

    fn diamond() -> TopologyStore {
        topology(&[("A", "B", 1), ("B", "D", 1), ("A", "C", 1), ("C", "D", 1)])
    }

    fn names(path: &Path) -> Vec<&str> {
        path.nodes().iter().map(NodeId::as_str).collect()
    }

    #[test]
    fn test_shortest_path_prefers_lower_weight() {
        let store = topology(&[("A", "B", 1), ("B", "C", 1), ("A", "C", 5)]);
        let path = shortest_path(&store, "A", "C").unwrap();
        assert_eq!(names(&path), vec!["A", "B", "C"]);
        assert_eq!(path.cost(&store), Some(2));
    }

    #[test]
    fn test_shortest_path_tie_break_is_lexicographic() {
        let store = diamond();
        let path = shortest_path(&store, "A", "D").unwrap();
        assert_eq!(names(&path), vec!["A", "B", "D"]);

        // insertion order must not matter
        let store = topology(&[("C", "D", 1), ("A", "C", 1), ("B", "D", 1), ("A", "B", 1)]);
        let path = shortest_path(&store, "A", "D").unwrap();
        assert_eq!(names(&path), vec!["A", "B", "D"]);
    }

    #[test]
    fn test_all_shortest_paths_diamond() {
        let store = diamond();
        let paths = all_shortest_paths(&store, "A", "D").unwrap();
        let paths: Vec<Vec<&str>> = paths.iter().map(names).collect();
        assert_eq!(paths, vec![vec!["A", "B", "D"], vec!["A", "C", "D"]]);
    }

    #[test]
    fn test_all_shortest_paths_excludes_longer() {
        let store = topology(&[("A", "B", 1), ("B", "D", 1), ("A", "C", 1), ("C", "D", 2)]);
        let paths = all_shortest_paths(&store, "A", "D").unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(names(&paths[0]), vec!["A", "B", "D"]);
    }

    #[test]
    fn test_equal_cost_with_different_hop_counts() {
        let store = topology(&[("A", "D", 2), ("A", "B", 1), ("B", "D", 1)]);
        let set = compute_paths(&store, "A", "D").unwrap();
        assert_eq!(set.cost, 2);
        assert_eq!(set.paths.len(), 2);
        assert_eq!(names(&set.primary), vec!["A", "B", "D"]);
        assert_eq!(set.paths[0], set.primary);
        assert_eq!(names(&set.paths[1]), vec!["A", "D"]);
    }

    #[test]
    fn test_no_path_between_components() {
        let mut store = topology(&[("A", "B", 1)]);
        store.add_node("Z");
        let err = shortest_path(&store, "A", "Z").unwrap_err();
        assert_eq!(
            err,
            ControllerError::NoPath {
                src: NodeId::from("A"),
                dst: NodeId::from("Z"),
            }
        );
    }

    #[test]
    fn test_missing_endpoint_is_not_found() {
        let store = diamond();
        let err = shortest_path(&store, "A", "Q").unwrap_err();
        assert_eq!(err, ControllerError::NodeNotFound(NodeId::from("Q")));
        assert!(all_shortest_paths(&store, "Q", "A").unwrap_err().is_not_found());
    }

    #[test]
    fn test_same_source_and_destination() {
        let store = diamond();
        let set = compute_paths(&store, "B", "B").unwrap();
        assert_eq!(names(&set.primary), vec!["B"]);
        assert_eq!(set.paths.len(), 1);
        assert_eq!(set.cost, 0);
    }

    #[test]
    fn test_shortest_path_excluding_leaves_topology_intact() {
        let store = diamond();
        let primary = shortest_path(&store, "A", "D").unwrap();
        let excluded: BTreeSet<LinkKey> = primary.links().collect();

        let backup = shortest_path_excluding(&store, "A", "D", &excluded).unwrap();
        assert_eq!(names(&backup), vec!["A", "C", "D"]);
        assert!(store.has_edge("A", "B"));
        assert!(store.has_edge("B", "D"));
    }

    #[test]
    fn test_shortest_path_excluding_may_share_switches() {
        // A-B-C primary; backup A-X-B-C shares switch B but not the A-B link
        let store = topology(&[("A", "B", 1), ("B", "C", 1), ("A", "X", 1), ("X", "B", 1), ("B", "Y", 2), ("Y", "C", 2)]);
        let excluded: BTreeSet<LinkKey> = [LinkKey::new("A", "B"), LinkKey::new("B", "C")].into_iter().collect();
        let backup = shortest_path_excluding(&store, "A", "C", &excluded).unwrap();
        assert_eq!(names(&backup), vec!["A", "X", "B", "Y", "C"]);
    }

    #[test]
    fn test_shortest_path_excluding_can_disconnect() {
        let store = topology(&[("A", "B", 1), ("B", "C", 1)]);
        let excluded: BTreeSet<LinkKey> = [LinkKey::new("A", "B")].into_iter().collect();
        let err = shortest_path_excluding(&store, "A", "C", &excluded).unwrap_err();
        assert!(matches!(err, ControllerError::NoPath { .. }));
    }

    #[test]
    fn test_grid_equal_cost_count() {
        // 3x3 grid with unit weights: C(4,2) = 6 monotone corner-to-corner paths
        let mut links = Vec::new();
        let name = |r: usize, c: usize| format!("n{}{}", r, c);
        for r in 0..3 {
            for c in 0..3 {
                if c + 1 < 3 {
                    links.push((name(r, c), name(r, c + 1)));
                }
                if r + 1 < 3 {
                    links.push((name(r, c), name(r + 1, c)));
                }
            }
        }
        let mut store = TopologyStore::new();
        for (a, b) in &links {
            store.add_node(a.as_str());
            store.add_node(b.as_str());
            store.add_link(a, b, 1).unwrap();
        }

        let paths = all_shortest_paths(&store, "n00", "n22").unwrap();
        assert_eq!(paths.len(), 6);
        assert!(paths.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(paths.iter().all(|p| p.cost(&store) == Some(4)));
        assert_eq!(paths[0], shortest_path(&store, "n00", "n22").unwrap());
    }
}
