//! Interpolation tasks
//!
//! An [`InterpolationTask`] bundles one or more scalar channels behind a
//! single clock. Every channel of a task is sampled from the same raw
//! progress on the same tick, so channels can never drift apart.

use crate::easing::Easing;
use crate::error::SinkError;
use slotmap::new_key_type;
use smallvec::SmallVec;

new_key_type! {
    /// Handle to a task registered with an [`AnimationDriver`](crate::AnimationDriver)
    pub struct TaskId;
}

/// Identifier for a visual element a task writes to.
///
/// At most one task occupies a slot; starting another preempts it.
pub type SlotId = u32;

/// Receives each sampled frame and writes it into presentation state
pub type Sink = Box<dyn FnMut(&Frame<'_>) -> Result<(), SinkError>>;

/// Invoked once after a task completes naturally
pub type Completion = Box<dyn FnOnce()>;

/// A single interpolated quantity
#[derive(Clone, Copy, Debug)]
pub struct Channel {
    pub from: f32,
    pub to: f32,
    /// Per-channel curve; `None` uses the task easing
    pub easing: Option<Easing>,
}

impl Channel {
    pub fn new(from: f32, to: f32) -> Self {
        Self {
            from,
            to,
            easing: None,
        }
    }

    /// Builder: override the task easing for this channel
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Interpolate given the raw progress and the task-level eased progress
    pub fn sample(&self, raw: f32, task_eased: f32) -> f32 {
        let eased = match &self.easing {
            Some(easing) => easing.apply(raw),
            None => task_eased,
        };
        self.from + (self.to - self.from) * eased
    }
}

/// One sampled tick of a task, handed to its sink
#[derive(Debug)]
pub struct Frame<'a> {
    pub task: TaskId,
    /// `elapsed / duration`, in `[0, 1]`
    pub progress_raw: f32,
    /// Task easing applied to `progress_raw`
    pub progress_eased: f32,
    /// Interpolated value per channel, in declaration order
    pub values: &'a [f32],
    /// True on the tick the task reaches its duration
    pub finished: bool,
}

impl<'a> Frame<'a> {
    /// Value of channel `index`, or `0.0` if the task has fewer channels
    pub fn value(&self, index: usize) -> f32 {
        self.values.get(index).copied().unwrap_or(0.0)
    }
}

/// One in-flight animation: channels, timing and an optional completion
pub struct InterpolationTask {
    pub(crate) channels: SmallVec<[Channel; 4]>,
    pub(crate) duration: f64,
    pub(crate) delay: f64,
    pub(crate) easing: Easing,
    pub(crate) slot: Option<SlotId>,
    pub(crate) label: &'static str,
    pub(crate) completion: Option<Completion>,
}

impl InterpolationTask {
    /// Create a task with no channels. Duration is in seconds.
    pub fn new(duration: f64) -> Self {
        Self {
            channels: SmallVec::new(),
            duration,
            delay: 0.0,
            easing: Easing::Linear,
            slot: None,
            label: "task",
            completion: None,
        }
    }

    /// Create a single-channel task
    pub fn scalar(from: f32, to: f32, duration: f64) -> Self {
        Self::new(duration).channel(from, to)
    }

    /// Builder: add a channel using the task easing
    pub fn channel(mut self, from: f32, to: f32) -> Self {
        self.channels.push(Channel::new(from, to));
        self
    }

    /// Builder: add a fully specified channel
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Builder: add one channel per component pair
    pub fn channels<const N: usize>(mut self, from: [f32; N], to: [f32; N]) -> Self {
        self.channels
            .extend(from.into_iter().zip(to).map(|(a, b)| Channel::new(a, b)));
        self
    }

    /// Builder: set the task easing
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Builder: wait this many seconds before the clock starts
    pub fn delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }

    /// Builder: claim a slot, preempting its current occupant on start
    pub fn slot(mut self, slot: SlotId) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Builder: name the task in tracing output
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Builder: run `f` once after the task completes naturally.
    ///
    /// Not invoked when the task is cancelled or preempted.
    pub fn on_complete<F: FnOnce() + 'static>(mut self, f: F) -> Self {
        self.completion = Some(Box::new(f));
        self
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration
    }

    pub fn delay_secs(&self) -> f64 {
        self.delay
    }

    pub fn slot_id(&self) -> Option<SlotId> {
        self.slot
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Sample every channel at `raw` progress without running the task
    pub fn sample(&self, raw: f32) -> SmallVec<[f32; 4]> {
        let raw = raw.clamp(0.0, 1.0);
        let eased = self.easing.apply(raw);
        self.channels.iter().map(|c| c.sample(raw, eased)).collect()
    }
}

impl std::fmt::Debug for InterpolationTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpolationTask")
            .field("label", &self.label)
            .field("channels", &self.channels)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .field("slot", &self.slot)
            .field("has_completion", &self.completion.is_some())
            .finish()
    }
}
