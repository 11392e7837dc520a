//! The editor-facing entry point.
//!
//! An [`EditorSession`] owns the configuration, the single undo snapshot and
//! the deferred task scheduler. It never owns the diagram: every operation
//! borrows a [`DiagramModel`] for its duration and rebuilds the graph view
//! from the registry.

use log::{debug, info, trace, warn};

use spindle_core::{element::ElementKind, identifier::Id};

use crate::{
    config::AppConfig,
    ids::{self, IdNamespace, Rename},
    labels::{LabelReconciler, LabelReport},
    layout::LayoutEngine,
    model::{DiagramModel, ModelEvent},
    schedule::{DeferredTask, Scheduler, TaskQueue, Trigger},
    snapshot::LayoutSnapshot,
    structure::Graph,
};

/// Outcome of one auto-layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutReport {
    pub spine: usize,
    pub branches: usize,
    pub stacked: usize,
    pub moved: usize,
    pub rerouted: usize,
    pub failed: usize,
    pub cycle_detected: bool,
}

/// Editor session driving layout, undo, identifiers and labels.
///
/// # Examples
///
/// ```
/// use spindle::{EditorSession, MemoryDiagram};
///
/// let mut model = MemoryDiagram::empty();
/// let mut session = EditorSession::default();
///
/// session.pump(&mut model);
/// let report = session.run_auto_layout(&mut model);
/// assert_eq!(report.spine, 1);
///
/// assert!(session.undo_layout(&mut model));
/// assert!(!session.undo_layout(&mut model));
/// ```
#[derive(Debug)]
pub struct EditorSession<S = TaskQueue> {
    config: AppConfig,
    engine: LayoutEngine,
    scheduler: S,
    snapshot: Option<LayoutSnapshot>,
}

impl Default for EditorSession<TaskQueue> {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl EditorSession<TaskQueue> {
    pub fn new(config: AppConfig) -> Self {
        Self::with_scheduler(config, TaskQueue::new())
    }

    /// Drives the queue through one full render settle: a turn, the
    /// configured frame count and delay, then another turn.
    ///
    /// Returns the number of deferred tasks that ran.
    pub fn settle(&mut self, model: &mut impl DiagramModel) -> usize {
        let mut ran = self.pump(model);
        for _ in 0..self.config.schedule().render_frames() {
            self.scheduler.frame();
        }
        self.scheduler.advance(self.config.schedule().settle_delay());
        ran += self.pump(model);
        ran
    }
}

impl<S: Scheduler> EditorSession<S> {
    pub fn with_scheduler(config: AppConfig, scheduler: S) -> Self {
        let engine = LayoutEngine::new(config.layout().clone());
        Self {
            config,
            engine,
            scheduler,
            snapshot: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Returns true if an auto-layout pass can be undone.
    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Recomputes node positions and flow routes for the whole diagram.
    ///
    /// The previous geometry is captured first, replacing any earlier
    /// snapshot. Nodes already at their target are not moved. Routes are
    /// computed from the geometry after all moves.
    pub fn run_auto_layout(&mut self, model: &mut impl DiagramModel) -> LayoutReport {
        info!("Running auto layout");
        let graph = Graph::extract(&model.elements());
        self.snapshot = Some(LayoutSnapshot::capture(&graph));

        let placement = self.engine.plan(&graph);
        let mut report = LayoutReport {
            spine: placement.spine().len(),
            branches: placement.branches().len(),
            stacked: placement.stacked().len(),
            cycle_detected: placement.cycle_detected(),
            ..LayoutReport::default()
        };
        if placement.is_empty() {
            debug!("Empty layout, diagram left untouched");
            return report;
        }

        for (id, target) in placement.targets() {
            let Some(current) = graph.node(id).and_then(|node| node.position()) else {
                continue;
            };
            let delta = target.sub_point(current);
            if delta.is_zero() {
                continue;
            }
            match model.move_node(id, delta) {
                Ok(()) => report.moved += 1,
                Err(err) => {
                    warn!(node:% = id, err:%; "Failed to move node");
                    report.failed += 1;
                }
            }
        }

        let moved = Graph::extract(&model.elements());
        for (id, waypoints) in self.engine.router().route_all(&moved) {
            match model.set_waypoints(id, waypoints) {
                Ok(()) => report.rerouted += 1,
                Err(err) => {
                    warn!(flow:% = id, err:%; "Failed to route flow");
                    report.failed += 1;
                }
            }
        }

        model.fit_viewport();
        info!(report:?; "Auto layout finished");
        report
    }

    /// Restores the geometry captured by the last auto-layout pass.
    ///
    /// Returns false when there is nothing to undo.
    pub fn undo_layout(&mut self, model: &mut impl DiagramModel) -> bool {
        let Some(snapshot) = self.snapshot.take() else {
            debug!("No layout snapshot to restore");
            return false;
        };
        let report = snapshot.restore(model);
        model.fit_viewport();
        info!(report:?; "Auto layout undone");
        true
    }

    /// Renames every non-canonical shape and flow id.
    pub fn canonicalize_ids(&mut self, model: &mut impl DiagramModel) -> Vec<Rename> {
        let renames = ids::canonicalize(model);
        info!(renamed = renames.len(); "Identifiers canonicalized");
        renames
    }

    /// Recreates flow and start event labels from current geometry.
    pub fn reconcile_labels(&mut self, model: &mut impl DiagramModel) -> LabelReport {
        LabelReconciler::new(self.config.labels()).reconcile(model)
    }

    /// Brings the model into export shape: canonical ids everywhere.
    ///
    /// The caller serializes the model afterwards.
    pub fn prepare_export(&mut self, model: &mut impl DiagramModel) -> Vec<Rename> {
        info!("Preparing diagram for export");
        self.canonicalize_ids(model)
    }

    /// Reacts to a model notification by scheduling deferred work.
    pub fn handle_event(&mut self, event: ModelEvent, model: &impl DiagramModel) {
        trace!(event:?; "Handling model event");
        match event {
            ModelEvent::ImportCompleted => {
                self.snapshot = None;
                if self.config.labels().auto_reconcile() {
                    let schedule = self.config.schedule();
                    self.scheduler.schedule(
                        DeferredTask::ReconcileLabels,
                        Trigger::AfterRender {
                            frames: schedule.render_frames(),
                            delay: schedule.settle_delay(),
                        },
                    );
                }
            }
            ModelEvent::DiagramCreated => {
                self.snapshot = None;
            }
            ModelEvent::ElementCreated(id) => self.on_element_created(id, model),
        }
    }

    /// Starts a new turn: drains model events, then runs every due task.
    ///
    /// Returns the number of deferred tasks that ran.
    pub fn pump(&mut self, model: &mut impl DiagramModel) -> usize {
        for event in model.take_events() {
            self.handle_event(event, model);
        }

        self.scheduler.begin_turn();
        let tasks = self.scheduler.take_ready();
        let count = tasks.len();
        for task in tasks {
            self.run_task(task, model);
        }
        count
    }

    fn on_element_created(&mut self, id: Id, model: &impl DiagramModel) {
        let Some(element) = model.element(id) else {
            trace!(id:%; "Created element already gone");
            return;
        };

        match element.kind() {
            ElementKind::SequenceFlow if !IdNamespace::Flow.matches(id) => {
                self.scheduler
                    .schedule(DeferredTask::AssignFlowId(id), Trigger::NextTurn);
            }
            ElementKind::StartEvent => {
                let needs_id = !IdNamespace::Element.matches(id);
                let needs_name = element.name().is_none();
                if needs_id || needs_name {
                    self.scheduler.schedule(
                        DeferredTask::CompleteStartEvent {
                            id,
                            needs_id,
                            needs_name,
                        },
                        Trigger::NextTurn,
                    );
                }
            }
            _ => {}
        }
    }

    fn run_task(&mut self, task: DeferredTask, model: &mut impl DiagramModel) {
        debug!(task:?; "Running deferred task");
        match task {
            DeferredTask::AssignFlowId(id) => {
                if model.element(id).is_none() || IdNamespace::Flow.matches(id) {
                    return;
                }
                let new_id = ids::next_id(&model.elements(), IdNamespace::Flow);
                if let Err(err) = model.set_element_id(id, new_id) {
                    warn!(id:%, err:%; "Failed to assign flow id");
                }
            }
            DeferredTask::CompleteStartEvent {
                id,
                needs_id,
                needs_name,
            } => {
                let Some(element) = model.element(id) else {
                    return;
                };
                let mut current = id;
                if needs_id && !IdNamespace::Element.matches(id) {
                    let new_id = ids::next_id(&model.elements(), IdNamespace::Element);
                    match model.set_element_id(id, new_id) {
                        Ok(()) => current = new_id,
                        Err(err) => warn!(id:%, err:%; "Failed to assign start event id"),
                    }
                }
                if needs_name && element.name().is_none() {
                    let name = self.config.labels().default_start_name();
                    if let Err(err) = model.set_name(current, name) {
                        warn!(id:% = current, err:%; "Failed to name start event");
                    }
                }
            }
            DeferredTask::ReconcileLabels => {
                self.reconcile_labels(model);
            }
        }
    }
}
