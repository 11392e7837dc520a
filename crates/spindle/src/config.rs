//! Configuration types for the Spindle engine.
//!
//! This module provides configuration structures that control how diagrams
//! are laid out, where labels go and how long deferred work waits. All types
//! implement [`serde::Deserialize`] for loading from external sources and
//! fall back to the editor defaults for any field left out.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Grid origin, column/row spacing and routing tolerance.
//! - [`LabelConfig`] - Label offsets and automatic reconciliation.
//! - [`ScheduleConfig`] - Render-settling wait used before label reconciliation.
//!
//! # Example
//!
//! ```
//! # use spindle::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [layout]
//!     column_width = 200.0
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.layout().column_width(), 200.0);
//! assert_eq!(config.layout().row_height(), 120.0);
//! ```

use std::time::Duration;

use serde::Deserialize;

use spindle_core::geometry::Point;

/// Top-level configuration combining layout, label and scheduling settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Label configuration section.
    #[serde(default)]
    labels: LabelConfig,

    /// Deferred work configuration section.
    #[serde(default)]
    schedule: ScheduleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, labels: LabelConfig, schedule: ScheduleConfig) -> Self {
        Self {
            layout,
            labels,
            schedule,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the label configuration.
    pub fn labels(&self) -> &LabelConfig {
        &self.labels
    }

    /// Returns the scheduling configuration.
    pub fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }
}

/// Grid and routing parameters for the auto-layout pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Left edge of column 0.
    base_x: f32,
    /// Centreline of the spine row.
    base_y: f32,
    column_width: f32,
    row_height: f32,
    /// Vertical midpoint gap below which an edge is routed straight.
    straight_tolerance: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_x: 100.0,
            base_y: 250.0,
            column_width: 180.0,
            row_height: 120.0,
            straight_tolerance: 20.0,
        }
    }
}

impl LayoutConfig {
    /// Returns the grid origin: left edge of column 0 and top edge of the spine row.
    pub fn origin(&self) -> Point {
        Point::new(self.base_x, self.base_y)
    }

    pub fn column_width(&self) -> f32 {
        self.column_width
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    pub fn straight_tolerance(&self) -> f32 {
        self.straight_tolerance
    }

    /// Sets the grid origin (builder style).
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.base_x = origin.x();
        self.base_y = origin.y();
        self
    }

    /// Sets the column width (builder style).
    pub fn with_column_width(mut self, column_width: f32) -> Self {
        self.column_width = column_width;
        self
    }

    /// Sets the row height (builder style).
    pub fn with_row_height(mut self, row_height: f32) -> Self {
        self.row_height = row_height;
        self
    }
}

/// Label placement parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Reconcile labels automatically once an import has rendered.
    auto_reconcile: bool,
    /// Offset applied to a flow label from its segment midpoint.
    flow_offset_x: f32,
    flow_offset_y: f32,
    /// Gap between the bottom of a start event and its label.
    start_gap: f32,
    /// Name given to start events created without one.
    default_start_name: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            auto_reconcile: true,
            flow_offset_x: 10.0,
            flow_offset_y: -10.0,
            start_gap: 20.0,
            default_start_name: "Start Event".to_string(),
        }
    }
}

impl LabelConfig {
    pub fn auto_reconcile(&self) -> bool {
        self.auto_reconcile
    }

    /// Returns the offset from a flow's middle segment midpoint to its label.
    pub fn flow_offset(&self) -> Point {
        Point::new(self.flow_offset_x, self.flow_offset_y)
    }

    pub fn start_gap(&self) -> f32 {
        self.start_gap
    }

    pub fn default_start_name(&self) -> &str {
        &self.default_start_name
    }

    /// Enables or disables automatic reconciliation after import (builder style).
    pub fn with_auto_reconcile(mut self, enabled: bool) -> Self {
        self.auto_reconcile = enabled;
        self
    }
}

/// Timing of deferred work that waits for the rendering surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Render frames to wait before the settle delay starts.
    render_frames: u32,
    /// Extra delay after the last frame, in milliseconds.
    settle_delay_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            render_frames: 2,
            settle_delay_ms: 120,
        }
    }
}

impl ScheduleConfig {
    /// Creates a schedule config. Delays beyond `u64::MAX` milliseconds saturate.
    pub fn new(render_frames: u32, settle_delay: Duration) -> Self {
        Self {
            render_frames,
            settle_delay_ms: u64::try_from(settle_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn render_frames(&self) -> u32 {
        self.render_frames
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
