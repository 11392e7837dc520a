//! Target positions for the spine, its branches and any leftover nodes.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace};

use spindle_core::{geometry::Point, identifier::Id};

use super::{rank::Ranks, spine::LongestPathSearch};
use crate::{config::LayoutConfig, structure::Graph};

/// Which side of the spine row a branch occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Above,
    Below,
}

/// A path hanging off a spine node, laid out on its own row.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    parent: Id,
    side: Side,
    row_y: f32,
    nodes: Vec<Id>,
}

impl Branch {
    /// The spine node the branch leaves from.
    pub fn parent(&self) -> Id {
        self.parent
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Top edge shared by every node on the branch row.
    pub fn row_y(&self) -> f32 {
        self.row_y
    }

    /// Nodes placed by this branch, in path order.
    pub fn nodes(&self) -> &[Id] {
        &self.nodes
    }
}

/// The planned top-left position of every layout node.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    targets: IndexMap<Id, Point>,
    spine: Vec<Id>,
    branches: Vec<Branch>,
    stacked: Vec<Id>,
    cycle_detected: bool,
}

impl Placement {
    /// Target top-left positions in placement order.
    pub fn targets(&self) -> impl Iterator<Item = (Id, Point)> + '_ {
        self.targets.iter().map(|(id, point)| (*id, *point))
    }

    pub fn target(&self, id: Id) -> Option<Point> {
        self.targets.get(&id).copied()
    }

    pub fn spine(&self) -> &[Id] {
        &self.spine
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Nodes that no spine or branch reached, stacked below everything else.
    pub fn stacked(&self) -> &[Id] {
        &self.stacked
    }

    pub fn cycle_detected(&self) -> bool {
        self.cycle_detected
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Places spine, branch and leftover nodes onto a column/row grid.
///
/// Column `k` sits at `origin.x + k * column_width`. A row fixes the
/// top-left y of its nodes: the spine row sits at `origin.y`, branches alternate above
/// and below it one `row_height` further out every second branch, and
/// leftovers stack one row at a time below the lowest row in use.
#[derive(Debug, Clone, Copy)]
pub struct BranchPlacer<'c> {
    config: &'c LayoutConfig,
}

impl<'c> BranchPlacer<'c> {
    pub fn new(config: &'c LayoutConfig) -> Self {
        Self { config }
    }

    /// Plans target positions for every layout node of `graph`.
    pub fn place(&self, graph: &Graph, spine: &[Id], ranks: &Ranks) -> Placement {
        let origin = self.config.origin();
        let row_height = self.config.row_height();

        let mut placement = Placement {
            spine: spine.to_vec(),
            cycle_detected: ranks.cycle_detected(),
            ..Placement::default()
        };

        for (index, &id) in spine.iter().enumerate() {
            let rank = ranks.get(id).unwrap_or(index);
            self.place_node(graph, &mut placement, id, rank, origin.y());
        }

        let spine_set: HashSet<Id> = spine.iter().copied().collect();
        let mut lowest_row = origin.y();

        for &parent in spine {
            let parent_rank = ranks.get(parent).unwrap_or(0);
            let targets: Vec<Id> = graph.successors(parent).collect();

            for target in targets {
                if spine_set.contains(&target)
                    || placement.targets.contains_key(&target)
                    || !graph.is_layout_node(target)
                {
                    continue;
                }

                let ordinal = placement.branches.len();
                let level = (ordinal / 2 + 1) as f32 * row_height;
                let (side, row_y) = if ordinal % 2 == 0 {
                    (Side::Above, origin.y() - level)
                } else {
                    (Side::Below, origin.y() + level)
                };

                let mut search = LongestPathSearch::new(graph, &spine_set);
                let mut path = search.path_from(target);
                if path.is_empty() {
                    path.push(target);
                }

                let mut nodes = Vec::with_capacity(path.len());
                for (index, id) in path.into_iter().enumerate() {
                    if placement.targets.contains_key(&id) {
                        continue;
                    }
                    let rank = ranks.get(id).unwrap_or(parent_rank + 1 + index);
                    if self.place_node(graph, &mut placement, id, rank, row_y) {
                        nodes.push(id);
                    }
                }

                trace!(parent:% = parent, ordinal, placed = nodes.len(); "Branch placed");
                lowest_row = lowest_row.max(row_y);
                placement.branches.push(Branch {
                    parent,
                    side,
                    row_y,
                    nodes,
                });
            }
        }

        let leftovers: Vec<Id> = graph
            .layout_nodes()
            .map(|node| node.id())
            .filter(|id| !placement.targets.contains_key(id))
            .collect();
        for id in leftovers {
            lowest_row += row_height;
            if self.place_node(graph, &mut placement, id, 0, lowest_row) {
                placement.stacked.push(id);
            }
        }

        debug!(
            spine = placement.spine.len(),
            branches = placement.branches.len(),
            stacked = placement.stacked.len();
            "Placement planned"
        );
        placement
    }

    /// Records the top-left target of `id` in column `rank` on `row_y`.
    fn place_node(
        &self,
        graph: &Graph,
        placement: &mut Placement,
        id: Id,
        rank: usize,
        row_y: f32,
    ) -> bool {
        if graph.node(id).and_then(|node| node.bounds()).is_none() {
            return false;
        }
        let x = self.config.origin().x() + rank as f32 * self.config.column_width();
        placement.targets.insert(id, Point::new(x, row_y));
        true
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use spindle_core::{
        element::{Element, ElementKind},
        geometry::Size,
    };

    use super::*;
    use crate::layout::{assign_ranks, entry_nodes, find_spine};

    fn shape(id: &str, kind: ElementKind, height: f32) -> Element {
        Element::new(Id::new(id), kind).with_geometry(Point::new(0.0, 0.0), Size::new(100.0, height))
    }

    fn task(id: &str) -> Element {
        shape(id, ElementKind::Activity, 80.0)
    }

    fn flow(source: &str, target: &str) -> Element {
        Element::flow(
            Id::new(&format!("{source}->{target}")),
            Id::new(source),
            Id::new(target),
        )
    }

    fn plan(elements: &[Element]) -> Placement {
        let graph = Graph::extract(elements);
        let entries = entry_nodes(&graph);
        let spine = find_spine(&graph, &entries);
        let ranks = assign_ranks(&graph, &entries);
        BranchPlacer::new(&LayoutConfig::default()).place(&graph, &spine, &ranks)
    }

    #[test]
    fn test_linear_spine_columns() {
        let placement = plan(&[
            shape("s", ElementKind::StartEvent, 36.0),
            task("t"),
            shape("e", ElementKind::EndEvent, 36.0),
            flow("s", "t"),
            flow("t", "e"),
        ]);

        let s = placement.target(Id::new("s")).unwrap();
        let t = placement.target(Id::new("t")).unwrap();
        let e = placement.target(Id::new("e")).unwrap();
        assert_approx_eq!(f32, s.x(), 100.0);
        assert_approx_eq!(f32, t.x(), 280.0);
        assert_approx_eq!(f32, e.x(), 460.0);

        // Shapes of every height share the spine row's top edge.
        assert_approx_eq!(f32, s.y(), 250.0);
        assert_approx_eq!(f32, t.y(), 250.0);
        assert_approx_eq!(f32, e.y(), 250.0);

        assert!(placement.branches().is_empty());
        assert!(placement.stacked().is_empty());
    }

    #[test]
    fn test_branches_alternate_sides() {
        // g -> a (spine), g -> b, g -> c, g -> d
        let placement = plan(&[
            shape("s", ElementKind::StartEvent, 36.0),
            shape("g", ElementKind::Gateway, 50.0),
            task("a"),
            task("b"),
            task("c"),
            task("d"),
            shape("e", ElementKind::EndEvent, 36.0),
            flow("s", "g"),
            flow("g", "a"),
            flow("g", "b"),
            flow("g", "c"),
            flow("g", "d"),
            flow("a", "e"),
        ]);

        assert_eq!(
            placement.spine(),
            &[Id::new("s"), Id::new("g"), Id::new("a"), Id::new("e")]
        );
        let rows: Vec<(Side, f32)> = placement
            .branches()
            .iter()
            .map(|branch| (branch.side(), branch.row_y()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (Side::Above, 130.0),
                (Side::Below, 370.0),
                (Side::Above, 10.0),
            ]
        );

        let b = placement.target(Id::new("b")).unwrap();
        assert_approx_eq!(f32, b.y(), 130.0);
        assert_approx_eq!(f32, b.x(), 100.0 + 2.0 * 180.0);
    }

    #[test]
    fn test_branch_follows_its_longest_path() {
        // s -> g -> e, g -> x -> y -> e
        let placement = plan(&[
            shape("s", ElementKind::StartEvent, 36.0),
            shape("g", ElementKind::Gateway, 50.0),
            task("x"),
            task("y"),
            task("z"),
            shape("e", ElementKind::EndEvent, 36.0),
            flow("s", "g"),
            flow("g", "x"),
            flow("x", "y"),
            flow("y", "z"),
            flow("z", "e"),
            flow("g", "e"),
            flow("s", "e"),
        ]);

        // The spine takes the long route, so the short edge g -> e adds no branch.
        assert_eq!(placement.spine().len(), 6);
        assert!(placement.branches().is_empty());
    }

    #[test]
    fn test_already_placed_targets_are_skipped() {
        // s -> a -> e, s -> b -> e, a -> b
        let placement = plan(&[
            shape("s", ElementKind::StartEvent, 36.0),
            task("a"),
            task("b"),
            task("c"),
            shape("e", ElementKind::EndEvent, 36.0),
            flow("s", "a"),
            flow("a", "e"),
            flow("s", "b"),
            flow("s", "c"),
            flow("b", "c"),
            flow("c", "e"),
        ]);

        // Spine: s b c e. Branch from s via a; no second branch for c.
        assert_eq!(placement.branches().len(), 1);
        assert_eq!(placement.branches()[0].nodes(), &[Id::new("a")]);
    }

    #[test]
    fn test_disconnected_nodes_are_stacked() {
        let placement = plan(&[
            shape("s", ElementKind::StartEvent, 36.0),
            shape("e", ElementKind::EndEvent, 36.0),
            task("island"),
            task("other"),
            flow("s", "e"),
        ]);

        assert_eq!(placement.stacked(), &[Id::new("island"), Id::new("other")]);
        let island = placement.target(Id::new("island")).unwrap();
        let other = placement.target(Id::new("other")).unwrap();
        assert_approx_eq!(f32, island.x(), 100.0);
        assert_approx_eq!(f32, island.y(), 370.0);
        assert_approx_eq!(f32, other.y(), 490.0);
    }

    #[test]
    fn test_every_layout_node_gets_a_target() {
        let placement = plan(&[
            shape("s", ElementKind::StartEvent, 36.0),
            task("a"),
            task("b"),
            task("c"),
            flow("s", "a"),
            flow("a", "b"),
            flow("b", "a"),
            flow("c", "c"),
        ]);

        for id in ["s", "a", "b", "c"] {
            assert!(placement.target(Id::new(id)).is_some(), "{id} not placed");
        }
        assert!(placement.cycle_detected());
    }
}
