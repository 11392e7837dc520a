//! Pre-layout geometry snapshot used to undo an auto-layout pass.

use indexmap::IndexMap;
use log::{debug, trace, warn};

use spindle_core::{geometry::Point, identifier::Id};

use crate::{model::DiagramModel, structure::Graph};

/// Outcome counters of a restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub moved: usize,
    pub rerouted: usize,
    pub failed: usize,
}

/// Node positions and flow waypoints as they were before a layout pass.
///
/// Every layout node and every flow is recorded, including flows that had
/// no route yet. Attached boundary nodes are left to follow their host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSnapshot {
    nodes: IndexMap<Id, Point>,
    edges: IndexMap<Id, Vec<Point>>,
}

impl LayoutSnapshot {
    pub fn capture(graph: &Graph) -> Self {
        let nodes: IndexMap<Id, Point> = graph
            .layout_nodes()
            .filter_map(|node| node.position().map(|position| (node.id(), position)))
            .collect();
        let edges: IndexMap<Id, Vec<Point>> = graph
            .edges()
            .map(|edge| (edge.id(), edge.waypoints().to_vec()))
            .collect();

        debug!(nodes = nodes.len(), edges = edges.len(); "Layout snapshot captured");
        Self { nodes, edges }
    }

    pub fn node_position(&self, id: Id) -> Option<Point> {
        self.nodes.get(&id).copied()
    }

    pub fn edge_waypoints(&self, id: Id) -> Option<&[Point]> {
        self.edges.get(&id).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Moves every recorded node back and resets every recorded route.
    ///
    /// Nodes already at their recorded position are not touched. Flows that
    /// were unrouted when captured are cleared again.
    pub fn restore(self, model: &mut impl DiagramModel) -> RestoreReport {
        let mut report = RestoreReport::default();

        for (id, recorded) in self.nodes {
            let Some(current) = model.element(id).and_then(|element| element.position()) else {
                trace!(node:% = id; "Recorded node no longer has geometry");
                continue;
            };
            let delta = recorded.sub_point(current);
            if delta.is_zero() {
                continue;
            }
            match model.move_node(id, delta) {
                Ok(()) => report.moved += 1,
                Err(err) => {
                    warn!(node:% = id, err:%; "Failed to restore node position");
                    report.failed += 1;
                }
            }
        }

        for (id, waypoints) in self.edges {
            let result = if waypoints.is_empty() {
                model.clear_waypoints(id)
            } else {
                model.set_waypoints(id, waypoints)
            };
            match result {
                Ok(()) => report.rerouted += 1,
                Err(err) => {
                    warn!(flow:% = id, err:%; "Failed to restore flow route");
                    report.failed += 1;
                }
            }
        }

        debug!(moved = report.moved, rerouted = report.rerouted; "Layout snapshot restored");
        report
    }
}
