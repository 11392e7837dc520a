//! Column assignment by bounded longest-distance relaxation.

use std::collections::{HashMap, VecDeque};

use log::{debug, warn};

use spindle_core::identifier::Id;

use crate::structure::Graph;

/// Column index per node, plus a flag for graphs whose ranks were capped.
#[derive(Debug, Clone, Default)]
pub struct Ranks {
    ranks: HashMap<Id, usize>,
    cycle_detected: bool,
}

impl Ranks {
    /// Returns the rank of a node reachable from an entry node.
    pub fn get(&self, id: Id) -> Option<usize> {
        self.ranks.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Returns true when relaxation hit the rank ceiling.
    ///
    /// That only happens when a cycle is reachable from an entry node; the
    /// ranks along it are then capped rather than exact.
    pub fn cycle_detected(&self) -> bool {
        self.cycle_detected
    }
}

/// Assigns each reachable layout node its longest distance from any entry.
///
/// Entries start at rank 0. A breadth-first queue relaxes `rank(v) =
/// max(rank(v), rank(u) + 1)` along every flow. Ranks never exceed the
/// number of layout nodes and each node is relaxed at most that many times,
/// so the pass terminates on cyclic graphs too.
pub fn assign_ranks(graph: &Graph, entries: &[Id]) -> Ranks {
    let ceiling = graph.layout_nodes().count().max(1);

    let mut ranks: HashMap<Id, usize> = HashMap::new();
    let mut relaxations: HashMap<Id, usize> = HashMap::new();
    let mut queue = VecDeque::new();
    let mut cycle_detected = false;

    for &entry in entries {
        if graph.is_layout_node(entry) && ranks.insert(entry, 0).is_none() {
            queue.push_back(entry);
        }
    }

    while let Some(current) = queue.pop_front() {
        let Some(&rank) = ranks.get(&current) else {
            continue;
        };

        for next in graph.successors(current) {
            if !graph.is_layout_node(next) {
                continue;
            }

            let mut candidate = rank + 1;
            if candidate > ceiling {
                candidate = ceiling;
                cycle_detected = true;
            }
            if ranks.get(&next).is_some_and(|&known| known >= candidate) {
                continue;
            }

            let count = relaxations.entry(next).or_insert(0);
            *count += 1;
            if *count > ceiling {
                cycle_detected = true;
                continue;
            }

            ranks.insert(next, candidate);
            queue.push_back(next);
        }
    }

    if cycle_detected {
        warn!(ceiling; "Cycle reachable from entry nodes, ranks were capped");
    }
    debug!(ranked = ranks.len(), cycle_detected; "Ranks assigned");

    Ranks {
        ranks,
        cycle_detected,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use spindle_core::{
        element::{Element, ElementKind},
        geometry::{Point, Size},
    };

    use super::*;

    fn task(id: &str) -> Element {
        Element::new(Id::new(id), ElementKind::Activity)
            .with_geometry(Point::new(0.0, 0.0), Size::new(40.0, 40.0))
    }

    fn flow(source: &str, target: &str) -> Element {
        Element::flow(
            Id::new(&format!("{source}->{target}")),
            Id::new(source),
            Id::new(target),
        )
    }

    #[test]
    fn test_longest_distance_wins() {
        // a -> b -> c, a -> c
        let graph = Graph::extract(&[
            task("a"),
            task("b"),
            task("c"),
            flow("a", "c"),
            flow("a", "b"),
            flow("b", "c"),
        ]);
        let ranks = assign_ranks(&graph, &[Id::new("a")]);

        assert_eq!(ranks.get(Id::new("a")), Some(0));
        assert_eq!(ranks.get(Id::new("b")), Some(1));
        assert_eq!(ranks.get(Id::new("c")), Some(2));
        assert!(!ranks.cycle_detected());
    }

    #[test]
    fn test_unreachable_nodes_have_no_rank() {
        let graph = Graph::extract(&[task("a"), task("b"), task("lonely"), flow("a", "b")]);
        let ranks = assign_ranks(&graph, &[Id::new("a")]);

        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks.get(Id::new("lonely")), None);
    }

    #[test]
    fn test_cycle_is_capped_and_flagged() {
        let graph = Graph::extract(&[
            task("a"),
            task("b"),
            task("c"),
            flow("a", "b"),
            flow("b", "c"),
            flow("c", "b"),
        ]);
        let ranks = assign_ranks(&graph, &[Id::new("a")]);

        assert!(ranks.cycle_detected());
        for id in ["a", "b", "c"] {
            let rank = ranks.get(Id::new(id)).unwrap();
            assert!(rank <= 3, "{id} rank {rank} above ceiling");
        }
    }

    #[test]
    fn test_self_loop_terminates() {
        let graph = Graph::extract(&[task("a"), flow("a", "a")]);
        let ranks = assign_ranks(&graph, &[Id::new("a")]);

        assert!(ranks.cycle_detected());
        assert_eq!(ranks.get(Id::new("a")), Some(1));
    }

    #[test]
    fn test_no_entries() {
        let graph = Graph::extract(&[task("a")]);
        assert!(assign_ranks(&graph, &[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_ranks_bounded_on_random_graphs(
            edges in prop::collection::vec((0usize..6, 0usize..6), 0..20)
        ) {
            let mut elements: Vec<Element> =
                (0..6).map(|i| task(&format!("n{i}"))).collect();
            for (idx, (from, to)) in edges.iter().enumerate() {
                elements.push(Element::flow(
                    Id::new(&format!("f{idx}")),
                    Id::new(&format!("n{from}")),
                    Id::new(&format!("n{to}")),
                ));
            }
            let graph = Graph::extract(&elements);
            let ranks = assign_ranks(&graph, &[Id::new("n0")]);

            prop_assert_eq!(ranks.get(Id::new("n0")).is_some(), true);
            for i in 0..6 {
                if let Some(rank) = ranks.get(Id::new(&format!("n{i}"))) {
                    prop_assert!(rank <= 6);
                }
            }
        }
    }
}
