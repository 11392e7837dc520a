//! In-memory diagram model.
//!
//! [`MemoryDiagram`] is a complete [`DiagramModel`] backed by a plain element
//! list. It is what the CLI edits and what the tests drive the engine
//! through. Its document form is TOML:
//!
//! ```toml
//! [[elements]]
//! id = "StartEvent_1"
//! kind = "start_event"
//! position = { x = 150.0, y = 100.0 }
//! size = { width = 36.0, height = 36.0 }
//!
//! [[elements]]
//! id = "flow_1"
//! kind = "sequence_flow"
//! source = "StartEvent_1"
//! target = "_2"
//! condition = "${$RESULT_CODE=='0'}"
//! ```

use std::collections::VecDeque;

use log::trace;
use serde::{Deserialize, Serialize};

use spindle_core::{
    element::{Element, ElementKind},
    geometry::{Point, Size},
    identifier::Id,
};

use crate::{
    error::{ModelError, SpindleError},
    model::{DiagramModel, ModelEvent},
};

/// Size given to every label created through [`DiagramModel::create_label`].
pub const LABEL_SIZE: Size = Size::new(100.0, 20.0);

/// Serialized form of a diagram.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A diagram model held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryDiagram {
    elements: Vec<Element>,
    events: VecDeque<ModelEvent>,
    viewport_fits: usize,
}

impl MemoryDiagram {
    /// Loads a set of elements as an imported document.
    ///
    /// Raises [`ModelEvent::ImportCompleted`].
    pub fn import(elements: Vec<Element>) -> Self {
        let mut diagram = Self {
            elements,
            ..Self::default()
        };
        diagram.events.push_back(ModelEvent::ImportCompleted);
        diagram
    }

    /// Parses a TOML document and imports it.
    ///
    /// # Errors
    ///
    /// Returns [`SpindleError::Document`] when the text is not a valid document.
    pub fn from_toml(src: &str) -> Result<Self, SpindleError> {
        let document: Document =
            toml::from_str(src).map_err(|err| SpindleError::new_document_error(err, src))?;
        Ok(Self::import(document.elements))
    }

    /// Creates the editor's empty diagram: a process holding one start event.
    ///
    /// Raises [`ModelEvent::DiagramCreated`].
    pub fn empty() -> Self {
        let start = Element::new(Id::new("StartEvent_1"), ElementKind::StartEvent)
            .with_name("Start Event")
            .with_geometry(Point::new(150.0, 100.0), Size::new(36.0, 36.0));
        let mut diagram = Self {
            elements: vec![
                Element::new(Id::new("_1454043010812"), ElementKind::Definitions),
                Element::new(Id::new("PROCESS_ID"), ElementKind::Process),
                start,
            ],
            ..Self::default()
        };
        diagram.events.push_back(ModelEvent::DiagramCreated);
        diagram
    }

    /// Serializes the current registry to a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SpindleError::Export`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, SpindleError> {
        let document = Document {
            elements: self.elements.clone(),
        };
        toml::to_string_pretty(&document).map_err(|err| SpindleError::Export(err.to_string()))
    }

    /// Adds an element as if an editing command had created it.
    ///
    /// Raises [`ModelEvent::ElementCreated`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateId`] if the id is taken.
    pub fn create_element(&mut self, element: Element) -> Result<(), ModelError> {
        if self.index_of(element.id()).is_some() {
            return Err(ModelError::DuplicateId(element.id()));
        }
        let id = element.id();
        self.elements.push(element);
        self.events.push_back(ModelEvent::ElementCreated(id));
        Ok(())
    }

    /// Returns how many times the viewport was asked to fit its content.
    pub fn viewport_fits(&self) -> usize {
        self.viewport_fits
    }

    /// Returns the label element owned by `target`, if any.
    pub fn label_of(&self, target: Id) -> Option<&Element> {
        self.elements
            .iter()
            .find(|element| element.kind().is_label() && element.label_target() == Some(target))
    }

    fn index_of(&self, id: Id) -> Option<usize> {
        self.elements.iter().position(|element| element.id() == id)
    }

    fn get_mut(&mut self, id: Id) -> Result<&mut Element, ModelError> {
        let index = self.index_of(id).ok_or(ModelError::UnknownElement(id))?;
        Ok(&mut self.elements[index])
    }

    /// Returns `<target>_label`, or the first `<target>_label_<n>` (n ≥ 2) not in use.
    fn unused_label_id(&self, target: Id) -> Id {
        let base = format!("{target}_label");
        let mut candidate = Id::new(&base);
        let mut suffix = 2;
        while self.index_of(candidate).is_some() {
            candidate = Id::new(&format!("{base}_{suffix}"));
            suffix += 1;
        }
        candidate
    }

    fn translate(&mut self, id: Id, delta: Point) -> Result<(), ModelError> {
        let element = self.get_mut(id)?;
        match element.position() {
            Some(position) if position.is_finite() => {
                element.set_position(position.add_point(delta));
                Ok(())
            }
            _ => Err(ModelError::MissingGeometry(id)),
        }
    }
}

impl DiagramModel for MemoryDiagram {
    fn elements(&self) -> Vec<Element> {
        self.elements.clone()
    }

    fn element(&self, id: Id) -> Option<Element> {
        self.index_of(id).map(|index| self.elements[index].clone())
    }

    /// Moves the shape together with its label and any boundary events attached to it.
    fn move_node(&mut self, id: Id, delta: Point) -> Result<(), ModelError> {
        let kind = self.get_mut(id)?.kind();
        if !kind.is_shape() {
            return Err(ModelError::MissingGeometry(id));
        }
        self.translate(id, delta)?;

        let followers: Vec<Id> = self
            .elements
            .iter()
            .filter(|element| {
                element.attached_to() == Some(id)
                    || (element.kind().is_label() && element.label_target() == Some(id))
            })
            .map(Element::id)
            .collect();

        for follower in followers {
            // Attached shapes without geometry simply stay behind.
            if let Err(err) = self.translate(follower, delta) {
                trace!(follower:%, err:%; "Follower not moved");
            }
        }
        Ok(())
    }

    fn set_waypoints(&mut self, id: Id, waypoints: Vec<Point>) -> Result<(), ModelError> {
        let element = self.get_mut(id)?;
        if !element.kind().is_flow() {
            return Err(ModelError::InvalidWaypoints {
                id,
                reason: "element is not a connection".to_string(),
            });
        }
        if waypoints.len() < 2 {
            return Err(ModelError::InvalidWaypoints {
                id,
                reason: format!("expected at least 2 points, got {}", waypoints.len()),
            });
        }
        element.set_waypoints(waypoints);
        Ok(())
    }

    fn clear_waypoints(&mut self, id: Id) -> Result<(), ModelError> {
        let element = self.get_mut(id)?;
        if !element.kind().is_flow() {
            return Err(ModelError::InvalidWaypoints {
                id,
                reason: "element is not a connection".to_string(),
            });
        }
        element.set_waypoints(Vec::new());
        Ok(())
    }

    fn set_element_id(&mut self, id: Id, new_id: Id) -> Result<(), ModelError> {
        if id == new_id {
            return Ok(());
        }
        if self.index_of(new_id).is_some() {
            return Err(ModelError::DuplicateId(new_id));
        }
        self.get_mut(id)?.set_id(new_id);
        for element in &mut self.elements {
            element.replace_reference(id, new_id);
        }
        Ok(())
    }

    fn set_name(&mut self, id: Id, name: &str) -> Result<(), ModelError> {
        self.get_mut(id)?.set_name(name);
        Ok(())
    }

    fn remove_label(&mut self, target: Id) -> Result<(), ModelError> {
        let index = self
            .elements
            .iter()
            .position(|element| {
                element.kind().is_label() && element.label_target() == Some(target)
            })
            .ok_or(ModelError::MissingLabel(target))?;
        self.elements.remove(index);
        Ok(())
    }

    fn create_label(&mut self, target: Id, position: Point) -> Result<(), ModelError> {
        if self.index_of(target).is_none() {
            return Err(ModelError::UnknownElement(target));
        }
        if let Some(index) = self.elements.iter().position(|element| {
            element.kind().is_label() && element.label_target() == Some(target)
        }) {
            self.elements[index].set_position(position);
            return Ok(());
        }

        let label_id = self.unused_label_id(target);
        self.elements
            .push(Element::label(label_id, target, position, LABEL_SIZE));
        Ok(())
    }

    fn take_events(&mut self) -> Vec<ModelEvent> {
        self.events.drain(..).collect()
    }

    fn fit_viewport(&mut self) {
        self.viewport_fits += 1;
    }
}
