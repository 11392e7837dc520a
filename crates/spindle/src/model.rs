//! The diagram model provider interface.
//!
//! The engine does not own the diagram. It reads the element registry through
//! [`DiagramModel::elements`] at the start of every operation and issues
//! synchronous commands back. Any command may fail for an element that is not
//! yet consistent; callers in this crate log such failures and continue.

use spindle_core::{element::Element, geometry::Point, identifier::Id};

use crate::error::ModelError;

/// Notifications raised by the model while commands execute.
///
/// The session drains these through [`DiagramModel::take_events`] and reacts
/// by scheduling deferred work, never by mutating the model inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    /// A document finished importing and its shapes were handed to the renderer.
    ImportCompleted,
    /// The model was reset to a fresh, empty diagram.
    DiagramCreated,
    /// A shape or connection was created by an editing command.
    ElementCreated(Id),
}

/// Live diagram model consumed by the engine.
pub trait DiagramModel {
    /// Returns every registry element, in registry order.
    fn elements(&self) -> Vec<Element>;

    /// Returns a single element by id.
    fn element(&self, id: Id) -> Option<Element> {
        self.elements().into_iter().find(|element| element.id() == id)
    }

    /// Moves a shape by a relative offset.
    fn move_node(&mut self, id: Id, delta: Point) -> Result<(), ModelError>;

    /// Replaces the waypoints of a connection.
    fn set_waypoints(&mut self, id: Id, waypoints: Vec<Point>) -> Result<(), ModelError>;

    /// Drops every waypoint of a connection, leaving it unrouted.
    fn clear_waypoints(&mut self, id: Id) -> Result<(), ModelError>;

    /// Renames an element, keeping every reference to it intact.
    fn set_element_id(&mut self, id: Id, new_id: Id) -> Result<(), ModelError>;

    /// Sets the semantic name of an element.
    fn set_name(&mut self, id: Id, name: &str) -> Result<(), ModelError>;

    /// Removes the visual label owned by `target`.
    fn remove_label(&mut self, target: Id) -> Result<(), ModelError>;

    /// Creates a visual label for `target` at `position`.
    fn create_label(&mut self, target: Id, position: Point) -> Result<(), ModelError>;

    /// Drains pending notifications, oldest first.
    fn take_events(&mut self) -> Vec<ModelEvent>;

    /// Best-effort request to fit all content into the viewport.
    fn fit_viewport(&mut self) {}
}
