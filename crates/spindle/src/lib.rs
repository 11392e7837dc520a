//! Spindle - A layout and consistency engine for flow diagrams.
//!
//! Spindle sits beside a diagram editor. It reads the editor's element
//! registry through the [`DiagramModel`] trait, computes a left-to-right
//! layout around the main entry-to-exit path, routes every connection
//! orthogonally, keeps identifiers sequential and keeps labels attached to
//! the flows and start events they describe.
//!
//! # Pipeline
//!
//! ```text
//! DiagramModel::elements()
//!     ↓ structure
//! Graph
//!     ↓ layout
//! Placement + routes
//!     ↓ session
//! move_node / set_waypoints commands
//! ```
//!
//! # Examples
//!
//! ```
//! use spindle::{EditorSession, MemoryDiagram, config::AppConfig};
//!
//! let source = r#"
//! [[elements]]
//! id = "_1"
//! kind = "start_event"
//! position = { x = 0.0, y = 0.0 }
//! size = { width = 36.0, height = 36.0 }
//!
//! [[elements]]
//! id = "_2"
//! kind = "end_event"
//! position = { x = 0.0, y = 0.0 }
//! size = { width = 36.0, height = 36.0 }
//!
//! [[elements]]
//! id = "flow_1"
//! kind = "sequence_flow"
//! source = "_1"
//! target = "_2"
//! "#;
//!
//! let mut model = MemoryDiagram::from_toml(source).expect("valid document");
//! let mut session = EditorSession::new(AppConfig::default());
//!
//! let report = session.run_auto_layout(&mut model);
//! assert_eq!(report.spine, 2);
//! assert_eq!(report.rerouted, 1);
//! ```

pub mod config;
pub mod ids;
pub mod labels;
pub mod layout;
pub mod model;
pub mod schedule;
pub mod snapshot;
pub mod structure;

mod error;
mod memory;
mod session;

pub use spindle_core::{condition, element, geometry, identifier};

pub use error::{ModelError, SpindleError};
pub use memory::{Document, LABEL_SIZE, MemoryDiagram};
pub use model::{DiagramModel, ModelEvent};
pub use session::{EditorSession, LayoutReport};
