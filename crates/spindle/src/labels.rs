//! Keeps flow and start event labels where the editor expects them.

use log::{debug, trace, warn};

use spindle_core::{
    condition::Condition,
    element::{Element, ElementKind},
    geometry::Point,
    identifier::Id,
};

use crate::{config::LabelConfig, model::DiagramModel};

/// Outcome counters of one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelReport {
    /// Flow names synthesized from their condition.
    pub named: usize,
    /// Labels created or repositioned.
    pub placed: usize,
    /// Elements skipped for lack of geometry or a usable anchor.
    pub skipped: usize,
    /// Model commands that failed.
    pub failed: usize,
}

/// Returns the name a flow should carry: its own, or one derived from its condition.
///
/// The boolean is true when the name was synthesized.
pub fn resolve_flow_name(flow: &Element) -> Option<(String, bool)> {
    if let Some(name) = flow.name() {
        return Some((name.to_string(), false));
    }
    flow.condition()
        .and_then(Condition::parse)
        .map(|condition| (condition.display_value(), true))
}

/// Returns the rounded midpoint of the middle segment of a route.
///
/// `None` for routes with fewer than two points and for a midpoint exactly
/// at the origin, which marks a connection the renderer has not laid out.
pub fn flow_label_anchor(waypoints: &[Point]) -> Option<Point> {
    if waypoints.len() < 2 {
        return None;
    }
    let index = (waypoints.len() - 1) / 2;
    let anchor = waypoints[index].midpoint(waypoints[index + 1]).round();
    if anchor.is_zero() { None } else { Some(anchor) }
}

/// Recreates edge labels and start event labels from current geometry.
#[derive(Debug, Clone, Copy)]
pub struct LabelReconciler<'c> {
    config: &'c LabelConfig,
}

impl<'c> LabelReconciler<'c> {
    pub fn new(config: &'c LabelConfig) -> Self {
        Self { config }
    }

    /// Reconciles every flow label, then every start event label.
    pub fn reconcile(&self, model: &mut impl DiagramModel) -> LabelReport {
        let elements = model.elements();
        let mut report = LabelReport::default();

        for flow in elements.iter().filter(|element| element.kind().is_flow()) {
            self.reconcile_flow(model, &elements, flow, &mut report);
        }
        for start in elements
            .iter()
            .filter(|element| element.kind() == ElementKind::StartEvent)
        {
            self.reconcile_start_event(model, &elements, start, &mut report);
        }

        debug!(
            named = report.named,
            placed = report.placed,
            skipped = report.skipped,
            failed = report.failed;
            "Labels reconciled"
        );
        report
    }

    fn reconcile_flow(
        &self,
        model: &mut impl DiagramModel,
        elements: &[Element],
        flow: &Element,
        report: &mut LabelReport,
    ) {
        let id = flow.id();
        remove_existing_label(model, elements, id, report);

        let Some((name, synthesized)) = resolve_flow_name(flow) else {
            return;
        };
        if synthesized {
            match model.set_name(id, &name) {
                Ok(()) => report.named += 1,
                Err(err) => {
                    warn!(flow:% = id, err:%; "Failed to store synthesized flow name");
                    report.failed += 1;
                }
            }
        }

        let Some(anchor) = flow_label_anchor(flow.waypoints()) else {
            trace!(flow:% = id; "No usable label anchor");
            report.skipped += 1;
            return;
        };
        place_label(model, id, anchor.add_point(self.config.flow_offset()), report);
    }

    fn reconcile_start_event(
        &self,
        model: &mut impl DiagramModel,
        elements: &[Element],
        start: &Element,
        report: &mut LabelReport,
    ) {
        if start.name().is_none() {
            return;
        }
        let id = start.id();
        remove_existing_label(model, elements, id, report);

        let Some(bounds) = start.bounds() else {
            trace!(node:% = id; "Start event without geometry");
            report.skipped += 1;
            return;
        };
        let anchor = Point::new(
            bounds.min_x() + bounds.width() / 2.0,
            bounds.max_y() + self.config.start_gap(),
        )
        .round();
        place_label(model, id, anchor, report);
    }
}

fn remove_existing_label(
    model: &mut impl DiagramModel,
    elements: &[Element],
    target: Id,
    report: &mut LabelReport,
) {
    let has_label = elements
        .iter()
        .any(|element| element.kind().is_label() && element.label_target() == Some(target));
    if !has_label {
        return;
    }
    if let Err(err) = model.remove_label(target) {
        warn!(target:%, err:%; "Failed to remove label");
        report.failed += 1;
    }
}

fn place_label(model: &mut impl DiagramModel, target: Id, position: Point, report: &mut LabelReport) {
    match model.create_label(target, position) {
        Ok(()) => {
            trace!(target:%, position:?; "Label placed");
            report.placed += 1;
        }
        Err(err) => {
            warn!(target:%, err:%; "Failed to create label");
            report.failed += 1;
        }
    }
}
