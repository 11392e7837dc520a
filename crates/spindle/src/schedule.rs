//! Deferred work and the cooperative scheduler that releases it.
//!
//! Model event handlers never mutate the model inline. They schedule a
//! [`DeferredTask`] with a [`Trigger`] instead, and the session runs due
//! tasks at the start of a later turn.
//!
//! [`TaskQueue`] models the host's event loop with three clocks: a turn
//! counter advanced by [`Scheduler::begin_turn`], a render frame counter
//! advanced by [`TaskQueue::frame`], and virtual time advanced by
//! [`TaskQueue::advance`].

use std::time::Duration;

use log::trace;

use spindle_core::identifier::Id;

/// Work deferred out of an event handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredTask {
    /// Give a freshly created flow a canonical `flow_<n>` id.
    AssignFlowId(Id),
    /// Give a freshly created start event a canonical id and/or default name.
    CompleteStartEvent {
        id: Id,
        needs_id: bool,
        needs_name: bool,
    },
    /// Reconcile every flow and start event label.
    ReconcileLabels,
}

/// When a deferred task becomes due.
///
/// Every trigger waits for at least the next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    NextTurn,
    /// Wait for `frames` render frames, then for `delay` of elapsed time.
    AfterRender { frames: u32, delay: Duration },
}

/// Releases deferred tasks once their trigger has fired.
pub trait Scheduler {
    fn schedule(&mut self, task: DeferredTask, trigger: Trigger);

    /// Marks the start of a new event-loop turn.
    fn begin_turn(&mut self);

    /// Removes and returns every due task, in scheduling order.
    fn take_ready(&mut self) -> Vec<DeferredTask>;

    /// Number of tasks still waiting.
    fn pending(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Pending {
    task: DeferredTask,
    ready_turn: u64,
    frames_left: u32,
    delay: Duration,
    ready_at: Option<Duration>,
}

impl Pending {
    fn is_due(&self, turn: u64, now: Duration) -> bool {
        turn >= self.ready_turn && self.ready_at.is_some_and(|ready_at| now >= ready_at)
    }
}

/// The default in-process [`Scheduler`].
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    turn: u64,
    now: Duration,
    pending: Vec<Pending>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals a render frame boundary.
    ///
    /// Tasks whose frame wait finishes here start their settle delay now.
    pub fn frame(&mut self) {
        let now = self.now;
        for pending in &mut self.pending {
            if pending.frames_left == 0 {
                continue;
            }
            pending.frames_left -= 1;
            if pending.frames_left == 0 {
                pending.ready_at = Some(now + pending.delay);
            }
        }
    }

    /// Advances virtual time.
    pub fn advance(&mut self, elapsed: Duration) {
        self.now += elapsed;
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&mut self, task: DeferredTask, trigger: Trigger) {
        trace!(task:?, trigger:?; "Task scheduled");
        let (frames_left, delay) = match trigger {
            Trigger::NextTurn => (0, Duration::ZERO),
            Trigger::AfterRender { frames, delay } => (frames, delay),
        };
        self.pending.push(Pending {
            task,
            ready_turn: self.turn + 1,
            frames_left,
            delay,
            ready_at: (frames_left == 0).then(|| self.now + delay),
        });
    }

    fn begin_turn(&mut self) {
        self.turn += 1;
    }

    fn take_ready(&mut self) -> Vec<DeferredTask> {
        let (turn, now) = (self.turn, self.now);
        let (ready, waiting): (Vec<Pending>, Vec<Pending>) = self
            .pending
            .drain(..)
            .partition(|pending| pending.is_due(turn, now));
        self.pending = waiting;
        ready.into_iter().map(|pending| pending.task).collect()
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_turn_never_runs_in_the_same_turn() {
        let mut queue = TaskQueue::new();
        queue.schedule(DeferredTask::AssignFlowId(Id::new("f")), Trigger::NextTurn);

        assert!(queue.take_ready().is_empty());
        queue.begin_turn();
        assert_eq!(
            queue.take_ready(),
            vec![DeferredTask::AssignFlowId(Id::new("f"))]
        );
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_after_render_waits_for_frames_then_delay() {
        let mut queue = TaskQueue::new();
        queue.schedule(
            DeferredTask::ReconcileLabels,
            Trigger::AfterRender {
                frames: 2,
                delay: Duration::from_millis(120),
            },
        );

        // Time alone does not release it.
        queue.advance(Duration::from_secs(1));
        queue.begin_turn();
        assert!(queue.take_ready().is_empty());

        queue.frame();
        queue.frame();
        queue.advance(Duration::from_millis(119));
        assert!(queue.take_ready().is_empty());

        queue.advance(Duration::from_millis(1));
        assert_eq!(queue.take_ready(), vec![DeferredTask::ReconcileLabels]);
    }

    #[test]
    fn test_delay_starts_after_last_frame() {
        let mut queue = TaskQueue::new();
        queue.schedule(
            DeferredTask::ReconcileLabels,
            Trigger::AfterRender {
                frames: 1,
                delay: Duration::from_millis(50),
            },
        );
        queue.begin_turn();
        queue.advance(Duration::from_millis(100));
        queue.frame();
        queue.advance(Duration::from_millis(49));
        assert!(queue.take_ready().is_empty());
        queue.advance(Duration::from_millis(1));
        assert_eq!(queue.take_ready().len(), 1);
    }

    #[test]
    fn test_ready_tasks_keep_scheduling_order() {
        let mut queue = TaskQueue::new();
        queue.schedule(DeferredTask::AssignFlowId(Id::new("a")), Trigger::NextTurn);
        queue.schedule(
            DeferredTask::ReconcileLabels,
            Trigger::AfterRender {
                frames: 1,
                delay: Duration::ZERO,
            },
        );
        queue.schedule(DeferredTask::AssignFlowId(Id::new("b")), Trigger::NextTurn);

        queue.begin_turn();
        assert_eq!(
            queue.take_ready(),
            vec![
                DeferredTask::AssignFlowId(Id::new("a")),
                DeferredTask::AssignFlowId(Id::new("b")),
            ]
        );
        assert_eq!(queue.pending(), 1);

        queue.frame();
        assert_eq!(queue.take_ready(), vec![DeferredTask::ReconcileLabels]);
    }
}
