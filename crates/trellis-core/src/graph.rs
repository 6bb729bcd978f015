//! Prerequisite graph algorithms.
//!
//! Edges point from prerequisite to dependent ("must happen before"). All
//! functions here are pure: they read an edge list and never touch storage,
//! which lets [`crate::Database::add_dependency`] run the cycle check inside
//! the same write transaction that inserts the edge.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::models::TaskDependency;

/// Adjacency view over a set of prerequisite edges.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// prerequisite -> dependents
    forward: HashMap<u64, Vec<u64>>,
}

impl DependencyGraph {
    /// Builds the graph from `(prerequisite, dependent)` pairs.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let mut forward: HashMap<u64, Vec<u64>> = HashMap::new();
        for (prerequisite, dependent) in edges {
            forward.entry(prerequisite).or_default().push(dependent);
        }
        Self { forward }
    }

    /// Builds the graph from stored dependency edges.
    pub fn from_dependencies(edges: &[TaskDependency]) -> Self {
        Self::from_edges(
            edges
                .iter()
                .map(|edge| (edge.prerequisite_task_id, edge.dependent_task_id)),
        )
    }

    /// Whether `to` can be reached from `from` by following edges forward.
    ///
    /// Breadth-first with a visited set, so each node and edge is expanded at
    /// most once.
    pub fn reaches(&self, from: u64, to: u64) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(dependents) = self.forward.get(&current) {
                queue.extend(dependents.iter().copied().filter(|d| !visited.contains(d)));
            }
        }
        false
    }

    /// Whether adding `prerequisite -> dependent` would close a cycle.
    ///
    /// A self-loop is rejected without traversal. Otherwise the edge closes a
    /// cycle exactly when `prerequisite` is already reachable from
    /// `dependent`.
    pub fn would_create_cycle(&self, prerequisite: u64, dependent: u64) -> bool {
        prerequisite == dependent || self.reaches(dependent, prerequisite)
    }

    /// Whether the graph contains no directed cycle.
    pub fn is_acyclic(&self) -> bool {
        let nodes: BTreeSet<u64> = self
            .forward
            .iter()
            .flat_map(|(from, to)| std::iter::once(*from).chain(to.iter().copied()))
            .collect();
        self.topological_order(nodes).is_some()
    }

    /// Orders `nodes` so that every prerequisite precedes its dependents.
    ///
    /// Kahn's algorithm; ties are broken by ascending ID so the output is
    /// deterministic. Edges touching nodes outside `nodes` are ignored.
    /// Returns `None` when the graph restricted to `nodes` has a cycle.
    pub fn topological_order<I>(&self, nodes: I) -> Option<Vec<u64>>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut in_degree: BTreeMap<u64, usize> = nodes.into_iter().map(|n| (n, 0)).collect();

        for (from, dependents) in &self.forward {
            if !in_degree.contains_key(from) {
                continue;
            }
            for dependent in dependents {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree += 1;
                }
            }
        }

        let mut ready: BTreeSet<u64> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut order = Vec::with_capacity(in_degree.len());

        while let Some(node) = ready.pop_first() {
            order.push(node);
            for dependent in self.forward.get(&node).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        (order.len() == in_degree.len()).then_some(order)
    }
}

/// Pure pre-insertion check for a prospective `prerequisite -> dependent`
/// edge against an existing edge list.
pub fn would_create_cycle(edges: &[TaskDependency], prerequisite: u64, dependent: u64) -> bool {
    if prerequisite == dependent {
        return true;
    }
    DependencyGraph::from_dependencies(edges).would_create_cycle(prerequisite, dependent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(u64, u64)]) -> DependencyGraph {
        DependencyGraph::from_edges(edges.iter().copied())
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let empty = DependencyGraph::default();
        assert!(empty.would_create_cycle(7, 7));
        assert!(would_create_cycle(&[], 42, 42));
    }

    #[test]
    fn test_closing_chain_is_cycle() {
        // A -> B -> C, proposing C -> A
        let g = graph(&[(1, 2), (2, 3)]);
        assert!(g.would_create_cycle(3, 1));
        assert!(g.would_create_cycle(2, 1));
    }

    #[test]
    fn test_parallel_edges_are_not_cycles() {
        let g = graph(&[(1, 2), (2, 3)]);
        assert!(!g.would_create_cycle(1, 3));
        assert!(!g.would_create_cycle(4, 1));
        assert!(!g.would_create_cycle(3, 4));
    }

    #[test]
    fn test_diamond_with_shared_subpaths() {
        // 1 -> {2, 3} -> 4 -> 5
        let g = graph(&[(1, 2), (1, 3), (2, 4), (3, 4), (4, 5)]);
        assert!(g.would_create_cycle(5, 1));
        assert!(!g.would_create_cycle(2, 3));
        assert!(g.is_acyclic());
    }

    #[test]
    fn test_wide_layered_graph_terminates() {
        // Ten layers of ten nodes, fully connected between layers: path count
        // is 10^9 but traversal stays linear in edges.
        let mut edges = Vec::new();
        for layer in 0..9u64 {
            for a in 0..10u64 {
                for b in 0..10u64 {
                    edges.push((layer * 10 + a, (layer + 1) * 10 + b));
                }
            }
        }
        let g = graph(&edges);
        assert!(g.would_create_cycle(95, 0));
        assert!(!g.would_create_cycle(0, 95));
    }

    #[test]
    fn test_topological_order_is_deterministic() {
        let g = graph(&[(3, 1), (3, 2), (1, 2)]);
        assert_eq!(g.topological_order([1, 2, 3]), Some(vec![3, 1, 2]));
        assert_eq!(g.topological_order([5, 4]), Some(vec![4, 5]));
    }

    #[test]
    fn test_topological_order_detects_cycle() {
        let g = graph(&[(1, 2), (2, 1)]);
        assert_eq!(g.topological_order([1, 2]), None);
        assert!(!g.is_acyclic());
    }
}
