//! Layout engine for flow diagrams.
//!
//! Turns a [`Graph`] into target positions for every layout node and
//! orthogonal routes for every flow.
//!
//! # Pipeline Position
//!
//! ```text
//! Element registry
//!     ↓ structure
//! Graph
//!     ↓ layout (this module)
//! Placement + routes
//!     ↓ session
//! Model commands
//! ```
//!
//! # Passes
//!
//! - [`entry_nodes`] / [`find_spine`] - Main spine as the longest entry-to-exit path
//! - [`assign_ranks`] - Column index per node by bounded relaxation
//! - [`BranchPlacer`] - Spine row, alternating branch rows and stacked leftovers
//! - [`ConnectionRouter`] - Straight or dogleg waypoints from placed geometry

mod branch;
mod rank;
mod routing;
mod spine;

pub use branch::{Branch, BranchPlacer, Placement, Side};
pub use rank::{Ranks, assign_ranks};
pub use routing::ConnectionRouter;
pub use spine::{LongestPathSearch, entry_nodes, find_spine};

use log::{debug, info};

use crate::{config::LayoutConfig, structure::Graph};

/// Runs the placement passes with a fixed layout configuration.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Plans target positions for every layout node of `graph`.
    ///
    /// An empty graph yields an empty placement.
    pub fn plan(&self, graph: &Graph) -> Placement {
        let entries = entry_nodes(graph);
        if entries.is_empty() {
            debug!("No layout nodes, nothing to place");
            return Placement::default();
        }

        let spine = find_spine(graph, &entries);
        let ranks = assign_ranks(graph, &entries);
        let placement = BranchPlacer::new(&self.config).place(graph, &spine, &ranks);

        info!(
            nodes = placement.targets().count(),
            cycle_detected = placement.cycle_detected();
            "Layout planned"
        );
        placement
    }

    /// Returns a router using the configured straight-line tolerance.
    pub fn router(&self) -> ConnectionRouter {
        ConnectionRouter::new(self.config.straight_tolerance())
    }
}
