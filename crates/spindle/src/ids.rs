//! Sequential identifier allocation.
//!
//! Shapes use `_<n>` and flows use `flow_<n>`. A fresh id is always one
//! above the highest sequence number currently in use for its namespace and
//! never collides with any id in the registry.

use std::{collections::HashSet, sync::OnceLock};

use log::{debug, warn};
use regex::Regex;

use spindle_core::{
    element::{Element, ElementKind},
    identifier::Id,
};

use crate::model::DiagramModel;

/// The two id formats kept sequential by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdNamespace {
    /// `_<n>`, used for every non-flow element.
    Element,
    /// `flow_<n>`, used for sequence flows.
    Flow,
}

impl IdNamespace {
    /// Returns the namespace an element of `kind` is numbered in.
    pub fn for_kind(kind: ElementKind) -> Self {
        if kind.is_flow() { Self::Flow } else { Self::Element }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Element => "_",
            Self::Flow => "flow_",
        }
    }

    fn pattern(self) -> &'static Regex {
        static ELEMENT: OnceLock<Regex> = OnceLock::new();
        static FLOW: OnceLock<Regex> = OnceLock::new();
        match self {
            Self::Element => {
                ELEMENT.get_or_init(|| Regex::new(r"^_(\d+)$").expect("element id pattern is valid"))
            }
            Self::Flow => {
                FLOW.get_or_init(|| Regex::new(r"^flow_(\d+)$").expect("flow id pattern is valid"))
            }
        }
    }

    /// Returns the sequence number of `id` if it belongs to this namespace.
    ///
    /// Numbers too large to represent are treated as not matching.
    pub fn sequence_number(self, id: Id) -> Option<u64> {
        id.with_str(|text| {
            self.pattern()
                .captures(text)
                .and_then(|captures| captures.get(1))
                .and_then(|digits| digits.as_str().parse().ok())
        })
    }

    /// Returns true if `id` is already in canonical form for this namespace.
    pub fn matches(self, id: Id) -> bool {
        self.sequence_number(id).is_some()
    }

    pub fn format(self, number: u64) -> Id {
        Id::new(&format!("{}{number}", self.prefix()))
    }
}

/// Hands out fresh ids for one namespace.
///
/// The highest sequence number is taken from every diagram element, process
/// containers included. The definitions record is the document wrapper rather
/// than a diagram element, so its id is left out of the maximum. Collision
/// checks cover every id in the registry.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    namespace: IdNamespace,
    next: u64,
    used: HashSet<Id>,
}

impl IdAllocator {
    /// Scans the registry for the current high-water mark of `namespace`.
    pub fn scan(elements: &[Element], namespace: IdNamespace) -> Self {
        let highest = elements
            .iter()
            .filter(|element| element.kind() != ElementKind::Definitions)
            .filter_map(|element| namespace.sequence_number(element.id()))
            .max()
            .unwrap_or(0);

        Self {
            namespace,
            next: highest.saturating_add(1),
            used: elements.iter().map(Element::id).collect(),
        }
    }

    /// Returns the next free id and reserves it.
    pub fn allocate(&mut self) -> Id {
        loop {
            let candidate = self.namespace.format(self.next);
            self.next = self.next.saturating_add(1);
            if self.used.insert(candidate) {
                return candidate;
            }
        }
    }
}

/// Returns the next free id of `namespace` for the given registry.
pub fn next_id(elements: &[Element], namespace: IdNamespace) -> Id {
    IdAllocator::scan(elements, namespace).allocate()
}

/// An id change applied by [`canonicalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rename {
    pub from: Id,
    pub to: Id,
}

/// Renames every shape and flow whose id is not in canonical form.
///
/// Containers and labels keep their ids. Elements are visited in registry
/// order, so renumbering is deterministic. A rename the model rejects is
/// logged and skipped.
pub fn canonicalize(model: &mut impl DiagramModel) -> Vec<Rename> {
    let elements = model.elements();
    let mut shapes = IdAllocator::scan(&elements, IdNamespace::Element);
    let mut flows = IdAllocator::scan(&elements, IdNamespace::Flow);

    let mut renames = Vec::new();
    for element in &elements {
        let kind = element.kind();
        if kind.is_container() || kind.is_label() {
            continue;
        }

        let namespace = IdNamespace::for_kind(kind);
        if namespace.matches(element.id()) {
            continue;
        }

        let allocator = match namespace {
            IdNamespace::Element => &mut shapes,
            IdNamespace::Flow => &mut flows,
        };
        let new_id = allocator.allocate();
        match model.set_element_id(element.id(), new_id) {
            Ok(()) => renames.push(Rename {
                from: element.id(),
                to: new_id,
            }),
            Err(err) => {
                warn!(id:% = element.id(), err:%; "Failed to rename element");
            }
        }
    }

    debug!(renamed = renames.len(); "Identifiers canonicalized");
    renames
}

#[cfg(test)]
mod tests {
    use spindle_core::geometry::{Point, Size};

    use super::*;
    use crate::memory::MemoryDiagram;

    fn shape(id: &str, kind: ElementKind) -> Element {
        Element::new(Id::new(id), kind).with_geometry(Point::new(0.0, 0.0), Size::new(40.0, 40.0))
    }

    #[test]
    fn test_sequence_number() {
        assert_eq!(IdNamespace::Element.sequence_number(Id::new("_12")), Some(12));
        assert_eq!(IdNamespace::Element.sequence_number(Id::new("_x")), None);
        assert_eq!(IdNamespace::Element.sequence_number(Id::new("a_1")), None);
        assert_eq!(IdNamespace::Flow.sequence_number(Id::new("flow_3")), Some(3));
        assert_eq!(IdNamespace::Flow.sequence_number(Id::new("_3")), None);
        assert_eq!(
            IdNamespace::Element.sequence_number(Id::new("_99999999999999999999999")),
            None
        );
    }

    #[test]
    fn test_next_id_is_one_above_max() {
        let elements = vec![
            shape("_2", ElementKind::Activity),
            shape("_7", ElementKind::Activity),
            shape("Task_1", ElementKind::Activity),
            Element::flow(Id::new("flow_4"), Id::new("_2"), Id::new("_7")),
        ];

        assert_eq!(next_id(&elements, IdNamespace::Element), Id::new("_8"));
        assert_eq!(next_id(&elements, IdNamespace::Flow), Id::new("flow_5"));
    }

    #[test]
    fn test_next_id_on_empty_registry() {
        assert_eq!(next_id(&[], IdNamespace::Element), Id::new("_1"));
        assert_eq!(next_id(&[], IdNamespace::Flow), Id::new("flow_1"));
    }

    #[test]
    fn test_definitions_do_not_raise_the_high_water_mark() {
        let elements = vec![
            Element::new(Id::new("_1454043010812"), ElementKind::Definitions),
            shape("_3", ElementKind::StartEvent),
        ];
        assert_eq!(next_id(&elements, IdNamespace::Element), Id::new("_4"));
    }

    #[test]
    fn test_process_container_raises_the_high_water_mark() {
        let elements = vec![
            Element::new(Id::new("_9"), ElementKind::Process),
            shape("_3", ElementKind::StartEvent),
        ];
        assert_eq!(next_id(&elements, IdNamespace::Element), Id::new("_10"));
    }

    #[test]
    fn test_allocator_skips_ids_in_use() {
        let elements = vec![
            shape("_1", ElementKind::Activity),
            Element::new(Id::new("_2"), ElementKind::Process),
        ];
        let mut allocator = IdAllocator::scan(&elements, IdNamespace::Element);

        assert_eq!(allocator.allocate(), Id::new("_3"));
        assert_eq!(allocator.allocate(), Id::new("_4"));
    }

    #[test]
    fn test_allocator_jumps_over_non_canonical_collisions() {
        let elements = vec![
            Element::new(Id::new("_2"), ElementKind::Definitions),
            shape("_1", ElementKind::Activity),
        ];
        // The definitions record does not raise the mark but its id is still taken.
        let mut allocator = IdAllocator::scan(&elements, IdNamespace::Element);
        assert_eq!(allocator.allocate(), Id::new("_3"));
    }

    #[test]
    fn test_canonicalize_renames_in_registry_order() {
        let mut model = MemoryDiagram::import(vec![
            Element::new(Id::new("Process_1"), ElementKind::Process),
            shape("StartEvent_1", ElementKind::StartEvent),
            shape("_5", ElementKind::Activity),
            shape("Task_x", ElementKind::Activity),
            Element::flow(Id::new("Flow_a"), Id::new("StartEvent_1"), Id::new("_5")),
            Element::flow(Id::new("flow_2"), Id::new("_5"), Id::new("Task_x")),
        ]);

        let renames = canonicalize(&mut model);
        assert_eq!(
            renames,
            vec![
                Rename {
                    from: Id::new("StartEvent_1"),
                    to: Id::new("_6"),
                },
                Rename {
                    from: Id::new("Task_x"),
                    to: Id::new("_7"),
                },
                Rename {
                    from: Id::new("Flow_a"),
                    to: Id::new("flow_3"),
                },
            ]
        );

        let flow = model.element(Id::new("flow_3")).unwrap();
        assert_eq!(flow.source(), Some(Id::new("_6")));
        let flow = model.element(Id::new("flow_2")).unwrap();
        assert_eq!(flow.target(), Some(Id::new("_7")));
        assert!(model.element(Id::new("Process_1")).is_some());
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let mut model = MemoryDiagram::import(vec![
            shape("a", ElementKind::Activity),
            shape("b", ElementKind::Activity),
            Element::flow(Id::new("f"), Id::new("a"), Id::new("b")),
        ]);

        assert_eq!(canonicalize(&mut model).len(), 3);
        assert!(canonicalize(&mut model).is_empty());
    }
}
