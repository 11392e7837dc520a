//! Graph view over the diagram element registry.
//!
//! This module turns the flat registry returned by
//! [`DiagramModel::elements`](crate::model::DiagramModel::elements) into a
//! directed graph that the layout passes can walk.
//!
//! # Architecture
//!
//! - [`EdgeIndex`]: Type-safe index into the graph's edge list
//! - [`Node`]: A shape with its kind, geometry and attachment
//! - [`Edge`]: A sequence flow with its waypoints and semantic payload
//! - [`Graph`]: Nodes in registry order plus ordered incoming/outgoing edges per node
//!
//! A graph is built fresh for every operation and dropped when it completes;
//! it is never kept across turns of the event loop.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::trace;

use spindle_core::{
    element::{Element, NodeKind},
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

/// Type-safe index for edges in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeIndex(usize);

/// A shape taking part in the flow graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: Id,
    kind: NodeKind,
    position: Option<Point>,
    size: Option<Size>,
    attached_to: Option<Id>,
}

impl Node {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns the top-left position when it is finite.
    pub fn position(&self) -> Option<Point> {
        self.position.filter(|position| position.is_finite())
    }

    pub fn attached_to(&self) -> Option<Id> {
        self.attached_to
    }

    /// Returns the node bounds when both position and size are finite.
    pub fn bounds(&self) -> Option<Bounds> {
        match (self.position(), self.size) {
            (Some(position), Some(size)) if size.is_finite() => {
                Some(Bounds::new_from_top_left(position, size))
            }
            _ => None,
        }
    }

    /// Returns true when the node participates in primary layout.
    ///
    /// Boundary nodes follow their host and nodes without usable geometry
    /// cannot be moved, so both stay out.
    pub fn is_layout_candidate(&self) -> bool {
        self.attached_to.is_none() && self.bounds().is_some()
    }
}

/// A sequence flow between two graph nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: Id,
    source: Id,
    target: Id,
    waypoints: Vec<Point>,
    name: Option<String>,
    condition: Option<String>,
}

impl Edge {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }
}

/// Directed flow graph extracted from the element registry.
///
/// Nodes keep registry order, which is the discovery order every layout
/// pass relies on for deterministic tie-breaking. Incoming and outgoing
/// edge lists keep flow order.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: IndexMap<Id, Node>,
    edges: Vec<Edge>,
    income_edges: HashMap<Id, Vec<EdgeIndex>>,
    outgoing_edges: HashMap<Id, Vec<EdgeIndex>>,
}

impl Graph {
    /// Builds the graph view for a registry snapshot.
    ///
    /// Labels, containers and flows become no nodes. Flows whose source or
    /// target is not a graph node are dropped.
    pub fn extract(elements: &[Element]) -> Self {
        let mut graph = Self::default();

        for element in elements {
            if let Some(kind) = element.kind().node_kind() {
                graph.add_node(Node {
                    id: element.id(),
                    kind,
                    position: element.position(),
                    size: element.size(),
                    attached_to: element.attached_to(),
                });
            }
        }

        for element in elements.iter().filter(|element| element.kind().is_flow()) {
            let (Some(source), Some(target)) = (element.source(), element.target()) else {
                trace!(flow:% = element.id(); "Skipping flow without endpoints");
                continue;
            };
            if !graph.contains_node(source) || !graph.contains_node(target) {
                trace!(flow:% = element.id(); "Skipping flow with a non-node endpoint");
                continue;
            }
            graph.add_edge(Edge {
                id: element.id(),
                source,
                target,
                waypoints: element.waypoints().to_vec(),
                name: element.name().map(str::to_string),
                condition: element.condition().map(str::to_string),
            });
        }

        graph
    }

    /// Returns the node for the given ID, if it exists.
    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Returns an iterator over all nodes in registry order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns an iterator over nodes that take part in primary layout.
    pub fn layout_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|node| node.is_layout_candidate())
    }

    /// Returns true if `id` is a node taking part in primary layout.
    pub fn is_layout_node(&self, id: Id) -> bool {
        self.node(id).is_some_and(Node::is_layout_candidate)
    }

    /// Returns the total number of nodes in the graph.
    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    /// Checks if a node with the given ID exists in the graph.
    pub fn contains_node(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn edge(&self, idx: EdgeIndex) -> &Edge {
        &self.edges[idx.0]
    }

    /// Returns an iterator over all edges in flow order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Returns the outgoing edges of a node in flow order.
    pub fn outgoing(&self, id: Id) -> impl Iterator<Item = &Edge> {
        self.outgoing_edges
            .get(&id)
            .into_iter()
            .flatten()
            .map(|idx| self.edge(*idx))
    }

    /// Returns the incoming edges of a node in flow order.
    pub fn incoming(&self, id: Id) -> impl Iterator<Item = &Edge> {
        self.income_edges
            .get(&id)
            .into_iter()
            .flatten()
            .map(|idx| self.edge(*idx))
    }

    /// Returns the ids of direct successors, one per outgoing edge.
    pub fn successors(&self, id: Id) -> impl Iterator<Item = Id> {
        self.outgoing(id).map(Edge::target)
    }

    fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    fn add_edge(&mut self, edge: Edge) -> EdgeIndex {
        let idx = EdgeIndex(self.edges.len());
        self.outgoing_edges.entry(edge.source).or_default().push(idx);
        self.income_edges.entry(edge.target).or_default().push(idx);
        self.edges.push(edge);
        idx
    }
}
