//! Animation driver
//!
//! Owns the active interpolation tasks of one screen and advances them once
//! per display frame.
//!
//! The driver is armed (its [`FrameSource`] delivers ticks) exactly while at
//! least one task is active. Tasks run in registration order within a tick.
//! A task is removed on the tick its elapsed time reaches its duration, and
//! its completion handler then runs once.
//!
//! Sinks and completion handlers cannot borrow the driver. They reach it
//! through a [`DriverHandle`], whose queued commands are applied between
//! tasks of a tick and at the start of every driver call.

use crate::error::{DriverError, Result, SinkError};
use crate::frame::FrameSource;
use crate::task::{Completion, Frame, InterpolationTask, Sink, SlotId, TaskId};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

/// A registered task plus its running clock
struct ActiveTask {
    task: InterpolationTask,
    sink: Sink,
    elapsed: f64,
    pending_delay: f64,
    last_sample: f64,
}

enum Step {
    Waiting,
    Running,
    Finished,
}

impl ActiveTask {
    /// Advance the clock to `now`, sample every channel and feed the sink
    fn advance(&mut self, id: TaskId, now: f64) -> Step {
        let mut delta = (now - self.last_sample).max(0.0);
        self.last_sample = now;

        if self.pending_delay > 0.0 {
            if delta < self.pending_delay {
                self.pending_delay -= delta;
                return Step::Waiting;
            }
            delta -= self.pending_delay;
            self.pending_delay = 0.0;
        }

        let duration = self.task.duration;
        self.elapsed = (self.elapsed + delta).min(duration);
        let finished = self.elapsed >= duration;

        let progress_raw = (self.elapsed / duration) as f32;
        let progress_eased = self.task.easing.apply(progress_raw);
        let values: SmallVec<[f32; 4]> = self
            .task
            .channels
            .iter()
            .map(|c| c.sample(progress_raw, progress_eased))
            .collect();

        let frame = Frame {
            task: id,
            progress_raw,
            progress_eased,
            values: &values,
            finished,
        };

        if let Err(err) = (self.sink)(&frame) {
            tracing::warn!(task = self.task.label, error = %err, "sink failed; continuing");
        }

        if finished {
            Step::Finished
        } else {
            Step::Running
        }
    }
}

enum Command {
    Start(InterpolationTask, Sink),
    Cancel(TaskId),
    CancelSlot(SlotId),
    CancelAll,
}

/// Deferred access to a driver from inside sinks and completion handlers.
///
/// Cloning is cheap. Commands issued after the driver is dropped are
/// discarded.
#[derive(Clone)]
pub struct DriverHandle {
    queue: Rc<RefCell<Vec<Command>>>,
}

impl DriverHandle {
    /// Queue a task start. Validation errors are logged when applied.
    pub fn start<S>(&self, task: InterpolationTask, sink: S)
    where
        S: FnMut(&Frame<'_>) -> std::result::Result<(), SinkError> + 'static,
    {
        self.queue
            .borrow_mut()
            .push(Command::Start(task, Box::new(sink)));
    }

    pub fn cancel(&self, id: TaskId) {
        self.queue.borrow_mut().push(Command::Cancel(id));
    }

    pub fn cancel_slot(&self, slot: SlotId) {
        self.queue.borrow_mut().push(Command::CancelSlot(slot));
    }

    pub fn cancel_all(&self) {
        self.queue.borrow_mut().push(Command::CancelAll);
    }
}

/// Per-screen animation driver
pub struct AnimationDriver {
    source: Box<dyn FrameSource>,
    tasks: SlotMap<TaskId, ActiveTask>,
    /// Registration order; `SlotMap` iteration order is not stable
    order: Vec<TaskId>,
    slots: FxHashMap<SlotId, TaskId>,
    armed: bool,
    commands: Rc<RefCell<Vec<Command>>>,
}

impl AnimationDriver {
    pub fn new(source: impl FrameSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            tasks: SlotMap::with_key(),
            order: Vec::new(),
            slots: FxHashMap::default(),
            armed: false,
            commands: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Handle for sinks and completion handlers
    pub fn handle(&self) -> DriverHandle {
        DriverHandle {
            queue: self.commands.clone(),
        }
    }

    /// Register a task and its sink.
    ///
    /// If the task claims a slot, the slot's current occupant is cancelled
    /// first. The task's clock starts now, so its first delta covers only the
    /// time since registration.
    pub fn start<S>(&mut self, task: InterpolationTask, sink: S) -> Result<TaskId>
    where
        S: FnMut(&Frame<'_>) -> std::result::Result<(), SinkError> + 'static,
    {
        self.flush_commands();
        let id = self.insert(task, Box::new(sink))?;
        self.sync_armed();
        Ok(id)
    }

    /// Remove a task without running its completion handler
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.flush_commands();
        let removed = self.remove(id).is_some();
        if removed {
            tracing::debug!(?id, "task cancelled");
        }
        self.sync_armed();
        removed
    }

    /// Cancel whatever task occupies `slot`
    pub fn cancel_slot(&mut self, slot: SlotId) -> bool {
        self.flush_commands();
        let removed = match self.slots.get(&slot).copied() {
            Some(id) => self.remove(id).is_some(),
            None => false,
        };
        if removed {
            tracing::debug!(slot, "slot cancelled");
        }
        self.sync_armed();
        removed
    }

    /// Drop every task without running completion handlers
    pub fn cancel_all(&mut self) {
        self.flush_commands();
        self.clear();
        self.sync_armed();
    }

    /// Advance every active task to the frame source's current time.
    ///
    /// Ticking an idle driver does nothing.
    pub fn tick(&mut self) {
        self.flush_commands();

        if self.tasks.is_empty() {
            tracing::trace!("tick on idle driver");
            self.sync_armed();
            return;
        }

        let now = self.source.now();
        let snapshot: SmallVec<[TaskId; 8]> = self.order.iter().copied().collect();

        for id in snapshot {
            // Cancelled earlier in this tick
            let Some(active) = self.tasks.get_mut(id) else {
                continue;
            };

            if let Step::Finished = active.advance(id, now) {
                self.complete(id);
            }

            self.flush_commands();
        }

        self.sync_armed();
    }

    /// Apply commands queued through [`DriverHandle`]s
    pub fn flush(&mut self) {
        self.flush_commands();
        self.sync_armed();
    }

    /// Whether the frame source is currently delivering ticks
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Number of active tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn is_slot_active(&self, slot: SlotId) -> bool {
        self.slots.contains_key(&slot)
    }

    /// Task currently occupying `slot`
    pub fn slot_task(&self, slot: SlotId) -> Option<TaskId> {
        self.slots.get(&slot).copied()
    }

    /// Seconds of progress accumulated by a task (excluding delay)
    pub fn elapsed(&self, id: TaskId) -> Option<f64> {
        self.tasks.get(id).map(|t| t.elapsed)
    }

    /// Raw progress of a task in `[0, 1]`
    pub fn progress(&self, id: TaskId) -> Option<f32> {
        self.tasks
            .get(id)
            .map(|t| (t.elapsed / t.task.duration) as f32)
    }

    /// Iterate over active task ids in registration order
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.order.iter().copied()
    }

    fn insert(&mut self, mut task: InterpolationTask, sink: Sink) -> Result<TaskId> {
        // Also rejects NaN
        if !(task.duration > 0.0) || !task.duration.is_finite() {
            return Err(DriverError::InvalidDuration(task.duration));
        }
        if !(task.delay >= 0.0) || !task.delay.is_finite() {
            return Err(DriverError::InvalidDelay(task.delay));
        }

        if let Some(slot) = task.slot {
            if let Some(previous) = self.slots.get(&slot).copied() {
                self.remove(previous);
                tracing::debug!(slot, ?previous, "task preempted");
            }
        }

        task.label = if task.label.is_empty() { "task" } else { task.label };
        let label = task.label;
        let slot = task.slot;
        let pending_delay = task.delay;
        let id = self.tasks.insert(ActiveTask {
            task,
            sink,
            elapsed: 0.0,
            pending_delay,
            last_sample: self.source.now(),
        });
        self.order.push(id);
        if let Some(slot) = slot {
            self.slots.insert(slot, id);
        }

        tracing::debug!(?id, task = label, ?slot, "task started");
        Ok(id)
    }

    fn remove(&mut self, id: TaskId) -> Option<ActiveTask> {
        let active = self.tasks.remove(id)?;
        self.order.retain(|other| *other != id);
        if let Some(slot) = active.task.slot {
            if self.slots.get(&slot) == Some(&id) {
                self.slots.remove(&slot);
            }
        }
        Some(active)
    }

    fn complete(&mut self, id: TaskId) {
        let Some(mut active) = self.remove(id) else {
            return;
        };
        tracing::debug!(?id, task = active.task.label, "task completed");

        let completion: Option<Completion> = active.task.completion.take();
        if let Some(completion) = completion {
            completion();
        }
    }

    fn clear(&mut self) {
        if !self.tasks.is_empty() {
            tracing::debug!(count = self.tasks.len(), "all tasks cancelled");
        }
        self.tasks.clear();
        self.order.clear();
        self.slots.clear();
    }

    fn flush_commands(&mut self) {
        loop {
            let pending = std::mem::take(&mut *self.commands.borrow_mut());
            if pending.is_empty() {
                break;
            }

            for command in pending {
                match command {
                    Command::Start(task, sink) => {
                        if let Err(err) = self.insert(task, sink) {
                            tracing::warn!(error = %err, "queued task rejected");
                        }
                    }
                    Command::Cancel(id) => {
                        if self.remove(id).is_some() {
                            tracing::debug!(?id, "task cancelled");
                        }
                    }
                    Command::CancelSlot(slot) => {
                        if let Some(id) = self.slots.get(&slot).copied() {
                            self.remove(id);
                            tracing::debug!(slot, ?id, "slot cancelled");
                        }
                    }
                    Command::CancelAll => self.clear(),
                }
            }
        }
    }

    /// Re-establish `armed == !tasks.is_empty()`
    fn sync_armed(&mut self) {
        match (self.armed, self.tasks.is_empty()) {
            (false, false) => {
                self.source.arm();
                self.armed = true;
                tracing::debug!("driver armed");
            }
            (true, true) => {
                self.source.disarm();
                self.armed = false;
                tracing::debug!("driver idle");
            }
            _ => {}
        }
    }
}

impl Drop for AnimationDriver {
    fn drop(&mut self) {
        if self.armed {
            self.source.disarm();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::frame::ManualFrameSource;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn recording_sink(
        log: &Rc<RefCell<Vec<f32>>>,
    ) -> impl FnMut(&Frame<'_>) -> std::result::Result<(), SinkError> + 'static {
        let log = log.clone();
        move |frame| {
            log.borrow_mut().push(frame.value(0));
            Ok(())
        }
    }

    fn driver() -> (AnimationDriver, ManualFrameSource) {
        let clock = ManualFrameSource::new();
        (AnimationDriver::new(clock.clone()), clock)
    }

    #[test]
    fn test_linear_quarter_steps() {
        let (mut driver, clock) = driver();
        let log = Rc::new(RefCell::new(Vec::new()));

        let id = driver
            .start(
                InterpolationTask::scalar(0.0, 100.0, 1.0).easing(Easing::Linear),
                recording_sink(&log),
            )
            .unwrap();
        assert!(driver.is_armed());

        for _ in 0..4 {
            clock.advance(0.25);
            driver.tick();
        }

        assert_eq!(*log.borrow(), vec![25.0, 50.0, 75.0, 100.0]);
        assert!(!driver.is_active(id));
        assert!(!driver.is_armed());
        assert!(!clock.is_armed());
    }

    #[test]
    fn test_overshooting_delta_clamps() {
        let (mut driver, clock) = driver();
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = driver
            .start(InterpolationTask::scalar(0.0, 10.0, 1.0), recording_sink(&log))
            .unwrap();

        clock.advance(1.5);
        driver.tick();

        assert_eq!(*log.borrow(), vec![10.0]);
        assert_eq!(driver.elapsed(id), None);
        assert!(driver.is_empty());
    }

    #[test]
    fn test_elapsed_monotonic_and_bounded() {
        let (mut driver, clock) = driver();
        let id = driver
            .start(InterpolationTask::scalar(0.0, 1.0, 1.0), |_: &Frame<'_>| Ok(()))
            .unwrap();

        let mut previous = 0.0;
        for dt in [0.1, 0.0, 0.3, 0.05, 0.2] {
            clock.advance(dt);
            driver.tick();
            let elapsed = driver.elapsed(id).unwrap();
            assert!(elapsed >= previous && elapsed <= 1.0);
            previous = elapsed;
        }
    }

    #[test]
    fn test_first_delta_measured_from_start() {
        let (mut driver, clock) = driver();
        clock.advance(10.0);

        let log = Rc::new(RefCell::new(Vec::new()));
        driver
            .start(InterpolationTask::scalar(0.0, 100.0, 1.0), recording_sink(&log))
            .unwrap();

        clock.advance(0.5);
        driver.tick();
        assert_eq!(*log.borrow(), vec![50.0]);
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let (mut driver, _clock) = driver();

        for duration in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = driver.start(InterpolationTask::scalar(0.0, 1.0, duration), |_: &Frame<'_>| {
                Ok(())
            });
            assert!(matches!(result, Err(DriverError::InvalidDuration(_))));
        }
        assert!(driver.is_empty());
        assert!(!driver.is_armed());
    }

    #[test]
    fn test_rejects_negative_delay() {
        let (mut driver, _clock) = driver();
        let result = driver.start(
            InterpolationTask::scalar(0.0, 1.0, 1.0).delay(-0.1),
            |_: &Frame<'_>| Ok(()),
        );
        assert_eq!(result, Err(DriverError::InvalidDelay(-0.1)));
    }

    #[test]
    fn test_tick_on_idle_driver_is_noop() {
        let (mut driver, clock) = driver();
        for _ in 0..3 {
            clock.advance(0.016);
            driver.tick();
        }
        assert!(!driver.is_armed());
        assert_eq!(clock.arm_count(), 0);
        assert_eq!(clock.disarm_count(), 0);
    }

    #[test]
    fn test_rearms_after_idle() {
        let (mut driver, clock) = driver();
        driver
            .start(InterpolationTask::scalar(0.0, 1.0, 0.1), |_: &Frame<'_>| Ok(()))
            .unwrap();
        clock.advance(0.2);
        driver.tick();
        assert!(!driver.is_armed());

        driver
            .start(InterpolationTask::scalar(0.0, 1.0, 0.1), |_: &Frame<'_>| Ok(()))
            .unwrap();
        assert!(driver.is_armed());
        assert_eq!(clock.arm_count(), 2);
        assert_eq!(clock.disarm_count(), 1);
    }

    #[test]
    fn test_slot_preemption() {
        let (mut driver, clock) = driver();
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));

        let a = driver
            .start(
                InterpolationTask::scalar(0.0, 100.0, 1.0).slot(1),
                recording_sink(&first),
            )
            .unwrap();
        clock.advance(0.25);
        driver.tick();

        let b = driver
            .start(
                InterpolationTask::scalar(100.0, 0.0, 1.0).slot(1),
                recording_sink(&second),
            )
            .unwrap();
        assert!(!driver.is_active(a));
        assert_eq!(driver.slot_task(1), Some(b));
        assert_eq!(driver.elapsed(b), Some(0.0));

        clock.advance(0.25);
        driver.tick();

        assert_eq!(*first.borrow(), vec![25.0]);
        assert_eq!(*second.borrow(), vec![75.0]);
    }

    #[test]
    fn test_cancel_skips_completion() {
        let (mut driver, clock) = driver();
        let completed = Rc::new(Cell::new(false));
        let flag = completed.clone();

        let id = driver
            .start(
                InterpolationTask::scalar(0.0, 1.0, 1.0).on_complete(move || flag.set(true)),
                |_: &Frame<'_>| Ok(()),
            )
            .unwrap();

        assert!(driver.cancel(id));
        assert!(!driver.cancel(id));
        assert!(!driver.is_armed());

        clock.advance(2.0);
        driver.tick();
        assert!(!completed.get());
    }

    #[test]
    fn test_completion_runs_once_after_removal() {
        let (mut driver, clock) = driver();
        let calls = Rc::new(Cell::new(0));
        let handle = driver.handle();
        let calls_in = calls.clone();

        driver
            .start(
                InterpolationTask::scalar(0.0, 1.0, 0.5).slot(3).on_complete(move || {
                    calls_in.set(calls_in.get() + 1);
                    // Restart on the same slot from the completion handler
                    handle.start(InterpolationTask::scalar(1.0, 0.0, 0.5).slot(3), |_: &Frame<'_>| Ok(()));
                }),
                |_: &Frame<'_>| Ok(()),
            )
            .unwrap();

        clock.advance(0.5);
        driver.tick();
        assert_eq!(calls.get(), 1);
        assert!(driver.is_slot_active(3));
        assert!(driver.is_armed());

        clock.advance(0.5);
        driver.tick();
        assert_eq!(calls.get(), 1);
        assert!(driver.is_empty());
    }

    #[test]
    fn test_failing_sink_is_isolated() {
        let (mut driver, clock) = driver();
        let log = Rc::new(RefCell::new(Vec::new()));

        let bad = driver
            .start(InterpolationTask::scalar(0.0, 1.0, 0.5), |_: &Frame<'_>| {
                Err(SinkError::Detached("snapshot"))
            })
            .unwrap();
        driver
            .start(InterpolationTask::scalar(0.0, 10.0, 0.5), recording_sink(&log))
            .unwrap();

        clock.advance(0.25);
        driver.tick();
        assert_eq!(*log.borrow(), vec![5.0]);
        assert!(driver.is_active(bad));

        clock.advance(0.25);
        driver.tick();
        assert!(driver.is_empty());
        assert!(!driver.is_armed());
    }

    #[test]
    fn test_cancel_from_sink_mid_tick() {
        let (mut driver, clock) = driver();
        let victim_log = Rc::new(RefCell::new(Vec::new()));
        let handle = driver.handle();
        let victim_slot: SlotId = 9;

        driver
            .start(InterpolationTask::scalar(0.0, 1.0, 1.0), move |_: &Frame<'_>| {
                handle.cancel_slot(victim_slot);
                Ok(())
            })
            .unwrap();
        driver
            .start(
                InterpolationTask::scalar(0.0, 1.0, 1.0).slot(victim_slot),
                recording_sink(&victim_log),
            )
            .unwrap();

        clock.advance(0.1);
        driver.tick();

        assert!(victim_log.borrow().is_empty());
        assert!(!driver.is_slot_active(victim_slot));
        assert_eq!(driver.len(), 1);
    }

    #[test]
    fn test_delay_holds_clock() {
        let (mut driver, clock) = driver();
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = driver
            .start(
                InterpolationTask::scalar(0.0, 100.0, 1.0).delay(0.5),
                recording_sink(&log),
            )
            .unwrap();

        clock.advance(0.25);
        driver.tick();
        assert!(log.borrow().is_empty());
        assert_eq!(driver.elapsed(id), Some(0.0));

        // 0.25 finishes the delay, the remaining 0.25 counts as progress
        clock.advance(0.5);
        driver.tick();
        assert_eq!(*log.borrow(), vec![25.0]);
    }

    #[test]
    fn test_registration_order() {
        let (mut driver, clock) = driver();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in 0..4 {
            let order = order.clone();
            driver
                .start(InterpolationTask::scalar(0.0, 1.0, 1.0), move |_: &Frame<'_>| {
                    order.borrow_mut().push(tag);
                    Ok(())
                })
                .unwrap();
        }

        clock.advance(0.1);
        driver.tick();
        assert_eq!(*order.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_drop_disarms_source() {
        let clock = ManualFrameSource::new();
        {
            let mut driver = AnimationDriver::new(clock.clone());
            driver
                .start(InterpolationTask::scalar(0.0, 1.0, 1.0), |_: &Frame<'_>| Ok(()))
                .unwrap();
            assert!(clock.is_armed());
        }
        assert!(!clock.is_armed());
    }
}
