//! Element registry records.
//!
//! An [`Element`] is one entry of the live diagram model's element registry: a
//! shape, a sequence flow, a label pseudo-element or a structural container.
//! The layout engine never owns these records; it reads them, derives a graph
//! view from them and issues commands back against the model.

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

/// The semantic type of an element in the diagram registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Root definitions wrapper.
    Definitions,
    /// Process container holding the flow elements.
    Process,
    StartEvent,
    EndEvent,
    /// Any task-like activity.
    Activity,
    Gateway,
    /// An event attached to the boundary of an activity.
    BoundaryEvent,
    SequenceFlow,
    /// Visual label pseudo-element owned by another element.
    Label,
}

impl ElementKind {
    /// Returns true for structural wrappers that never take part in layout or renumbering.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Definitions | Self::Process)
    }

    pub fn is_label(self) -> bool {
        matches!(self, Self::Label)
    }

    pub fn is_flow(self) -> bool {
        matches!(self, Self::SequenceFlow)
    }

    /// Returns true for shapes that become graph nodes.
    pub fn is_shape(self) -> bool {
        self.node_kind().is_some()
    }

    /// Maps the element type to its role in the flow graph.
    ///
    /// Returns `None` for flows, labels and containers.
    pub fn node_kind(self) -> Option<NodeKind> {
        match self {
            Self::StartEvent => Some(NodeKind::Entry),
            Self::EndEvent => Some(NodeKind::Exit),
            Self::Activity | Self::Gateway | Self::BoundaryEvent => Some(NodeKind::Generic),
            Self::Definitions | Self::Process | Self::SequenceFlow | Self::Label => None,
        }
    }
}

/// Role of a node in the flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Entry,
    Exit,
    Generic,
}

/// A single record of the diagram element registry.
///
/// Shapes carry a top-left `position` and a `size`; flows carry `source`,
/// `target` and `waypoints`; labels point at their owner through
/// `label_target`.
///
/// # Examples
///
/// ```
/// use spindle_core::{
///     element::{Element, ElementKind},
///     geometry::{Point, Size},
///     identifier::Id,
/// };
///
/// let task = Element::new(Id::new("_2"), ElementKind::Activity)
///     .with_name("Review")
///     .with_geometry(Point::new(200.0, 80.0), Size::new(100.0, 80.0));
///
/// assert_eq!(task.name(), Some("Review"));
/// assert!(task.bounds().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    id: Id,
    kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<Id>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    waypoints: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attached_to: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label_target: Option<Id>,
}

impl Element {
    pub fn new(id: Id, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            name: None,
            position: None,
            size: None,
            source: None,
            target: None,
            waypoints: Vec::new(),
            condition: None,
            attached_to: None,
            label_target: None,
        }
    }

    /// Creates a sequence flow between two elements.
    pub fn flow(id: Id, source: Id, target: Id) -> Self {
        let mut flow = Self::new(id, ElementKind::SequenceFlow);
        flow.source = Some(source);
        flow.target = Some(target);
        flow
    }

    /// Creates a label pseudo-element for `target`.
    pub fn label(id: Id, target: Id, position: Point, size: Size) -> Self {
        let mut label = Self::new(id, ElementKind::Label).with_geometry(position, size);
        label.label_target = Some(target);
        label
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_geometry(mut self, position: Point, size: Size) -> Self {
        self.position = Some(position);
        self.size = Some(size);
        self
    }

    pub fn with_waypoints(mut self, waypoints: Vec<Point>) -> Self {
        self.waypoints = waypoints;
        self
    }

    pub fn with_condition(mut self, body: impl Into<String>) -> Self {
        self.condition = Some(body.into());
        self
    }

    pub fn with_attached_to(mut self, host: Id) -> Self {
        self.attached_to = Some(host);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn size(&self) -> Option<Size> {
        self.size
    }

    /// Returns the shape bounds when both position and size are present and finite.
    pub fn bounds(&self) -> Option<Bounds> {
        match (self.position, self.size) {
            (Some(position), Some(size)) if position.is_finite() && size.is_finite() => {
                Some(Bounds::new_from_top_left(position, size))
            }
            _ => None,
        }
    }

    pub fn source(&self) -> Option<Id> {
        self.source
    }

    pub fn target(&self) -> Option<Id> {
        self.target
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// Returns the raw condition expression body, if any.
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref().filter(|body| !body.is_empty())
    }

    pub fn attached_to(&self) -> Option<Id> {
        self.attached_to
    }

    pub fn label_target(&self) -> Option<Id> {
        self.label_target
    }

    pub fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = Some(position);
    }

    pub fn set_waypoints(&mut self, waypoints: Vec<Point>) {
        self.waypoints = waypoints;
    }

    /// Rewrites every reference to `old` held by this element.
    ///
    /// Used by models when an element is renamed so flows, attachments and
    /// labels keep pointing at the same element.
    pub fn replace_reference(&mut self, old: Id, new: Id) {
        for slot in [
            &mut self.source,
            &mut self.target,
            &mut self.attached_to,
            &mut self.label_target,
        ] {
            if *slot == Some(old) {
                *slot = Some(new);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roles() {
        assert_eq!(ElementKind::StartEvent.node_kind(), Some(NodeKind::Entry));
        assert_eq!(ElementKind::EndEvent.node_kind(), Some(NodeKind::Exit));
        assert_eq!(ElementKind::Gateway.node_kind(), Some(NodeKind::Generic));
        assert_eq!(ElementKind::SequenceFlow.node_kind(), None);
        assert!(ElementKind::Process.is_container());
        assert!(ElementKind::Definitions.is_container());
        assert!(!ElementKind::Label.is_shape());
        assert!(ElementKind::BoundaryEvent.is_shape());
    }

    #[test]
    fn test_bounds_require_finite_geometry() {
        let id = Id::new("_1");
        let missing = Element::new(id, ElementKind::Activity);
        assert!(missing.bounds().is_none());

        let nan = Element::new(id, ElementKind::Activity)
            .with_geometry(Point::new(f32::NAN, 0.0), Size::new(10.0, 10.0));
        assert!(nan.bounds().is_none());

        let ok = Element::new(id, ElementKind::Activity)
            .with_geometry(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        assert!(ok.bounds().is_some());
    }

    #[test]
    fn test_empty_name_reads_as_none() {
        let element = Element::new(Id::new("_5"), ElementKind::StartEvent).with_name("");
        assert_eq!(element.name(), None);
    }

    #[test]
    fn test_replace_reference() {
        let a = Id::new("a");
        let b = Id::new("b");
        let c = Id::new("c");
        let mut flow = Element::flow(Id::new("f"), a, b);
        flow.replace_reference(a, c);

        assert_eq!(flow.source(), Some(c));
        assert_eq!(flow.target(), Some(b));
    }
}
