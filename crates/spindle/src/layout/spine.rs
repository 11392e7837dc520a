//! Longest-path search for the main spine and for branch extents.
//!
//! The spine is the longest simple path from an entry node to an exit node.
//! The same search, restricted by an avoid set, measures each branch that
//! hangs off the spine.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use spindle_core::{element::NodeKind, identifier::Id};

use crate::structure::{Graph, Node};

/// Returns the nodes that seed both the spine search and rank assignment.
///
/// Start events in registry order. Without any, a single fallback root: the
/// first layout node with no incoming flow, else the first layout node.
pub fn entry_nodes(graph: &Graph) -> Vec<Id> {
    let starts: Vec<Id> = graph
        .layout_nodes()
        .filter(|node| node.kind() == NodeKind::Entry)
        .map(Node::id)
        .collect();
    if !starts.is_empty() {
        return starts;
    }

    let fallback = graph
        .layout_nodes()
        .find(|node| {
            graph
                .incoming(node.id())
                .all(|edge| !graph.is_layout_node(edge.source()))
        })
        .or_else(|| graph.layout_nodes().next())
        .map(Node::id);

    fallback.into_iter().collect()
}

/// Finds the main spine among all `roots`.
///
/// The longest path wins; among equally long paths the first root in the
/// given order wins. When no root reaches an exit, the spine is the roots
/// themselves.
pub fn find_spine(graph: &Graph, roots: &[Id]) -> Vec<Id> {
    let avoid = HashSet::new();
    let mut search = LongestPathSearch::new(graph, &avoid);

    let mut best: Vec<Id> = Vec::new();
    for &root in roots {
        let path = search.path_from(root);
        if path.len() > best.len() {
            best = path;
        }
    }

    if best.is_empty() {
        debug!(roots = roots.len(); "No entry-to-exit path found, using roots as spine");
        return roots.to_vec();
    }

    debug!(length = best.len(); "Main spine found");
    best
}

#[derive(Debug, Clone, Copy)]
struct Score {
    length: usize,
    next: Option<Id>,
}

/// A memoized depth-first longest-path search.
///
/// The memo lives exactly as long as the search value, so two searches with
/// different avoid sets can never observe each other's cached lengths.
///
/// Scoring rules:
/// - a node on the current recursion stack scores 0 (cycle guard);
/// - otherwise `1 + best child` when some child scores above 0;
/// - an exit node (end event, or no eligible successor) scores at least 1;
/// - any other node scores 0, meaning it cannot reach an exit.
///
/// Children are visited in outgoing flow order and the first best child wins.
#[derive(Debug)]
pub struct LongestPathSearch<'g> {
    graph: &'g Graph,
    avoid: &'g HashSet<Id>,
    memo: HashMap<Id, Score>,
    on_stack: HashSet<Id>,
}

impl<'g> LongestPathSearch<'g> {
    /// Creates a search over the layout nodes of `graph`, never entering `avoid`.
    pub fn new(graph: &'g Graph, avoid: &'g HashSet<Id>) -> Self {
        Self {
            graph,
            avoid,
            memo: HashMap::new(),
            on_stack: HashSet::new(),
        }
    }

    /// Returns the longest path starting at `root`, or an empty path when
    /// `root` cannot reach an exit.
    pub fn path_from(&mut self, root: Id) -> Vec<Id> {
        if !self.is_eligible(root) || self.score(root) == 0 {
            return Vec::new();
        }

        let mut path = Vec::new();
        let mut current = Some(root);
        while let Some(id) = current {
            path.push(id);
            // Lengths strictly decrease along `next`, so this walk ends.
            current = self.memo.get(&id).and_then(|score| score.next);
        }
        path
    }

    fn is_eligible(&self, id: Id) -> bool {
        !self.avoid.contains(&id) && self.graph.is_layout_node(id)
    }

    fn score(&mut self, id: Id) -> usize {
        if self.on_stack.contains(&id) {
            trace!(node:% = id; "Node already on the search stack");
            return 0;
        }
        if let Some(score) = self.memo.get(&id) {
            return score.length;
        }

        let children: Vec<Id> = self
            .graph
            .successors(id)
            .filter(|child| self.is_eligible(*child))
            .collect();

        self.on_stack.insert(id);
        let mut best_length = 0;
        let mut best_child = None;
        for child in &children {
            let length = self.score(*child);
            if length > best_length {
                best_length = length;
                best_child = Some(*child);
            }
        }
        self.on_stack.remove(&id);

        let is_exit = children.is_empty()
            || self
                .graph
                .node(id)
                .is_some_and(|node| node.kind() == NodeKind::Exit);

        let score = if best_length > 0 {
            Score {
                length: best_length + 1,
                next: best_child,
            }
        } else if is_exit {
            Score {
                length: 1,
                next: None,
            }
        } else {
            Score {
                length: 0,
                next: None,
            }
        };

        self.memo.insert(id, score);
        score.length
    }
}
