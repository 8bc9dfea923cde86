//! Archive unlock affordance
//!
//! Pulling the chat list past its top reveals a capsule with an arrow. Once
//! the pull crosses the threshold the arrow flips, the mask grows to cover
//! the capsule and the "swipe" label gives way to "release". Releasing
//! while armed settles the affordance into the archive row.
//!
//! Logical state lives in a table-driven [`StateMachine`]. Every visual
//! element owns a driver slot, so a new bundle preempts the element's
//! running task and bundles never queue.

use crate::config::{self, UnlockMotion};
use crate::sink::presentation_sink;
use glide_animation::error::Result;
use glide_animation::{
    AnimationDriver, Easing, FrameSource, InterpolationTask, SlotId, TaskPreset,
};
use glide_core::{Color, Point, Rect, StateMachine};
use std::cell::{Cell, RefCell};
use std::f32::consts::PI;
use std::rc::Rc;

const ARROW: SlotId = 0;
const MASK: SlotId = 1;
const SWIPE_LABEL: SlotId = 2;
const RELEASE_LABEL: SlotId = 3;
const CAPSULE: SlotId = 4;
const ICON: SlotId = 5;

/// Settle tasks that must all finish before the affordance collapses
const SETTLE_TASKS: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnlockState {
    Idle,
    DraggingBelow,
    DraggingAbove,
    Committed,
    Settling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnlockEvent {
    DragBegan,
    CrossedUp,
    CrossedDown,
    Released,
    SettleStarted,
    SettleFinished,
}

/// The unlock transition table
pub fn unlock_machine() -> StateMachine<UnlockState, UnlockEvent> {
    use UnlockEvent::*;
    use UnlockState::*;

    StateMachine::builder(Idle)
        .on(Idle, DragBegan, DraggingBelow)
        .on(DraggingBelow, CrossedUp, DraggingAbove)
        .on(DraggingAbove, CrossedDown, DraggingBelow)
        .on(DraggingAbove, Released, Committed)
        .on(DraggingBelow, Released, Idle)
        .on(Committed, SettleStarted, Settling)
        .on(Settling, SettleFinished, Idle)
        .build()
}

/// A text label that slides and fades
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Label {
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
}

/// Live presentation state written by drag layout and animation sinks
#[derive(Clone, Debug, PartialEq)]
pub struct UnlockPresentation {
    /// Height of the revealed affordance
    pub height: f32,
    pub capsule: Rect,
    pub capsule_hidden: bool,
    pub capsule_color: Color,
    pub arrow_center: Point,
    /// Side of the square the arrow is drawn in
    pub arrow_bounds: f32,
    /// Radians; `PI` points down, `0` points up
    pub arrow_rotation: f32,
    pub mask_position: Point,
    pub mask_scale: f32,
    pub icon_center: Point,
    /// Archive icon animation progress
    pub icon_progress: f32,
    pub swipe_label: Label,
    pub release_label: Label,
}

impl UnlockPresentation {
    fn rest(width: f32, motion: &UnlockMotion) -> Self {
        let center = width / 2.0;
        Self {
            height: 0.0,
            capsule: Rect::ZERO,
            capsule_hidden: false,
            capsule_color: Color::from_hex(motion.disabled_color),
            arrow_center: Point::ZERO,
            arrow_bounds: motion.arrow_bounds,
            arrow_rotation: PI,
            mask_position: Point::ZERO,
            mask_scale: motion.mask_rest_scale,
            icon_center: Point::ZERO,
            icon_progress: 0.0,
            swipe_label: Label {
                x: center,
                y: 0.0,
                opacity: 1.0,
            },
            release_label: Label {
                x: center + motion.label_shift,
                y: 0.0,
                opacity: 0.0,
            },
        }
    }

    /// Follow the pull distance. Animated properties are left alone.
    fn layout(&mut self, height: f32, motion: &UnlockMotion) {
        let capsule_height = (height - 2.0 * motion.bottom_inset).max(motion.capsule_width);
        self.height = height;
        self.capsule = Rect::new(
            motion.capsule_x,
            height - capsule_height - motion.bottom_inset,
            motion.capsule_width,
            capsule_height,
        );
        self.arrow_center = Point::new(
            self.capsule.mid_x(),
            self.capsule.max_y() - motion.capsule_width / 2.0,
        );
        self.mask_position = self.arrow_center;
        self.icon_center = self.arrow_center;
        self.swipe_label.y = height - motion.bottom_inset;
        self.release_label.y = height - motion.bottom_inset;
    }
}

/// Archive unlock controller
pub struct UnlockArchive {
    motion: UnlockMotion,
    width: f32,
    driver: AnimationDriver,
    machine: Rc<RefCell<StateMachine<UnlockState, UnlockEvent>>>,
    presentation: Rc<RefCell<UnlockPresentation>>,
    settle_pending: Rc<Cell<u8>>,
}

impl UnlockArchive {
    /// Create a controller for a list `width` points wide.
    ///
    /// Fails when `motion` carries a duration or divisor the bundles
    /// cannot animate with.
    pub fn new(
        width: f32,
        motion: UnlockMotion,
        source: impl FrameSource + 'static,
    ) -> config::Result<Self> {
        motion.validate()?;
        let presentation = UnlockPresentation::rest(width, &motion);
        Ok(Self {
            width,
            driver: AnimationDriver::new(source),
            machine: Rc::new(RefCell::new(unlock_machine())),
            presentation: Rc::new(RefCell::new(presentation)),
            settle_pending: Rc::new(Cell::new(0)),
            motion,
        })
    }

    pub fn state(&self) -> UnlockState {
        self.machine.borrow().current_state()
    }

    /// Snapshot of the current presentation state
    pub fn presentation(&self) -> UnlockPresentation {
        self.presentation.borrow().clone()
    }

    /// Transitions taken so far
    pub fn history(&self) -> Vec<(UnlockState, UnlockEvent, UnlockState)> {
        self.machine.borrow().history().to_vec()
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    /// Whether any bundle is still in flight
    pub fn is_animating(&self) -> bool {
        !self.driver.is_empty()
    }

    /// Advance running bundles to the frame source's current time
    pub fn tick(&mut self) {
        self.driver.tick();
    }

    /// A drag started at the top of the list
    pub fn drag_began(&mut self) -> UnlockState {
        if self.machine.borrow_mut().try_send(UnlockEvent::DragBegan).is_some() {
            self.driver.cancel_all();
            *self.presentation.borrow_mut() = UnlockPresentation::rest(self.width, &self.motion);
        }
        self.state()
    }

    /// The pull distance changed.
    ///
    /// Lays out the affordance and starts the crossing bundle when the pull
    /// crosses the threshold. A crossing while the arrow is still flipping
    /// is ignored; the next update looks again.
    pub fn drag_update(&mut self, offset: f32) -> Result<UnlockState> {
        let state = self.state();
        if matches!(state, UnlockState::Committed | UnlockState::Settling) {
            tracing::trace!(?state, offset, "drag update ignored while settling");
            return Ok(state);
        }

        let height = offset.max(0.0);
        self.presentation.borrow_mut().layout(height, &self.motion);

        let above = offset >= self.motion.threshold;
        match (state, above) {
            (UnlockState::DraggingBelow, true) => self.cross(UnlockEvent::CrossedUp)?,
            (UnlockState::DraggingAbove, false) => self.cross(UnlockEvent::CrossedDown)?,
            _ => {}
        }
        Ok(self.state())
    }

    /// The finger lifted
    pub fn release(&mut self) -> Result<UnlockState> {
        match self.state() {
            UnlockState::DraggingAbove => {
                if let Err(err) = self.start_settle() {
                    self.abort_settle();
                    return Err(err);
                }
                let mut machine = self.machine.borrow_mut();
                machine.send(UnlockEvent::Released);
                machine.send(UnlockEvent::SettleStarted);
            }
            UnlockState::DraggingBelow => {
                self.machine.borrow_mut().send(UnlockEvent::Released);
                self.driver.cancel_all();
                let rest = UnlockPresentation::rest(self.width, &self.motion);
                *self.presentation.borrow_mut() = rest;
            }
            state => tracing::trace!(?state, "release ignored"),
        }
        Ok(self.state())
    }

    /// Drop whatever part of the settle bundle started; the drag stays armed
    fn abort_settle(&mut self) {
        for slot in [CAPSULE, MASK, ICON, RELEASE_LABEL] {
            self.driver.cancel_slot(slot);
        }
        self.settle_pending.set(0);
        tracing::warn!("settle bundle failed to start");
    }

    fn cross(&mut self, event: UnlockEvent) -> Result<()> {
        if self.driver.is_slot_active(ARROW) {
            tracing::trace!(?event, "crossing ignored while arrow is in flight");
            return Ok(());
        }
        self.machine.borrow_mut().send(event);
        self.start_crossing(event == UnlockEvent::CrossedUp)
    }

    /// Arrow flip, mask scale and label swap
    fn start_crossing(&mut self, armed: bool) -> Result<()> {
        let m = &self.motion;
        let current = self.presentation();
        let center = self.width / 2.0;

        let (rotation, scale, color) = if armed {
            (0.0, self.width / m.mask_cover_divisor, m.enabled_color)
        } else {
            (PI, m.mask_rest_scale, m.disabled_color)
        };
        let (swipe_x, swipe_opacity, release_x, release_opacity) = if armed {
            (center - m.label_shift, 0.0, center, 1.0)
        } else {
            (center, 1.0, center + m.label_shift, 0.0)
        };

        self.presentation.borrow_mut().capsule_color = Color::from_hex(color);

        self.driver.start(
            TaskPreset::rotate(current.arrow_rotation, rotation, m.arrow_rotation).slot(ARROW),
            presentation_sink(&self.presentation, "arrow", |p: &mut UnlockPresentation, f| {
                p.arrow_rotation = f.value(0)
            }),
        )?;
        self.driver.start(
            TaskPreset::scale(current.mask_scale, scale, m.mask_scale).slot(MASK),
            presentation_sink(&self.presentation, "mask", |p: &mut UnlockPresentation, f| {
                p.mask_scale = f.value(0)
            }),
        )?;
        self.driver.start(
            TaskPreset::slide_fade(
                current.swipe_label.x,
                swipe_x,
                current.swipe_label.opacity,
                swipe_opacity,
                m.label_swap,
            )
            .slot(SWIPE_LABEL),
            presentation_sink(&self.presentation, "swipe label", |p: &mut UnlockPresentation, f| {
                p.swipe_label.x = f.value(0);
                p.swipe_label.opacity = f.value(1);
            }),
        )?;
        self.driver.start(
            TaskPreset::slide_fade(
                current.release_label.x,
                release_x,
                current.release_label.opacity,
                release_opacity,
                m.label_swap,
            )
            .slot(RELEASE_LABEL),
            presentation_sink(&self.presentation, "release label", |p: &mut UnlockPresentation, f| {
                p.release_label.x = f.value(0);
                p.release_label.opacity = f.value(1);
            }),
        )?;

        tracing::debug!(armed, "crossing bundle started");
        Ok(())
    }

    /// Capsule collapse, mask settle, icon rise and release label fade
    fn start_settle(&mut self) -> Result<()> {
        let m = &self.motion;
        let current = self.presentation();
        self.settle_pending.set(SETTLE_TASKS);

        // Collapse and rise start above the bottom inset
        let lift = 2.0 * m.bottom_inset;
        let mut capsule_from = current.capsule;
        capsule_from.size.height -= lift;
        let capsule_target = Rect::new(m.capsule_x, m.settle_y, m.capsule_width, m.capsule_width);
        let presentation = self.presentation.clone();
        let capsule_done = self.settle_step();
        let mask_done = self.settle_step();
        let icon_done = self.settle_step();
        let label_done = self.settle_step();

        self.driver.start(
            TaskPreset::frame(capsule_from, capsule_target, m.capsule_collapse)
                .slot(CAPSULE)
                .label("capsule-collapse")
                .on_complete(move || {
                    presentation.borrow_mut().capsule_hidden = true;
                    capsule_done();
                }),
            presentation_sink(&self.presentation, "capsule", |p: &mut UnlockPresentation, f| {
                p.capsule = Rect::from_slice(f.values)
            }),
        )?;

        self.driver.start(
            InterpolationTask::new(m.settle)
                .channels(
                    [current.mask_position.x, current.mask_position.y, current.mask_scale],
                    [m.settle_x, m.settle_y, 1.0],
                )
                .easing(Easing::MEDIA_EASE_IN_OUT)
                .slot(MASK)
                .label("mask-settle")
                .on_complete(mask_done),
            presentation_sink(&self.presentation, "mask", |p: &mut UnlockPresentation, f| {
                p.mask_position = Point::new(f.value(0), f.value(1));
                p.mask_scale = f.value(2);
            }),
        )?;

        self.driver.start(
            InterpolationTask::new(m.settle)
                .channel(current.icon_center.y - lift, m.settle_y)
                .channel(0.0, 1.0 / m.icon_progress_divisor)
                .easing(Easing::MEDIA_EASE_OUT)
                .slot(ICON)
                .label("icon-rise")
                .on_complete(icon_done),
            presentation_sink(&self.presentation, "icon", |p: &mut UnlockPresentation, f| {
                p.icon_center.y = f.value(0);
                p.icon_progress = f.value(1);
            }),
        )?;

        self.driver.start(
            TaskPreset::fade(current.release_label.opacity, 0.0, m.settle)
                .slot(RELEASE_LABEL)
                .on_complete(label_done),
            presentation_sink(&self.presentation, "release label", |p: &mut UnlockPresentation, f| {
                p.release_label.opacity = f.value(0)
            }),
        )?;

        tracing::debug!("settle bundle started");
        Ok(())
    }

    /// Completion for one settle task; the last one collapses the affordance
    fn settle_step(&self) -> impl FnOnce() + 'static {
        let pending = self.settle_pending.clone();
        let presentation = self.presentation.clone();
        let machine = self.machine.clone();
        move || {
            let left = pending.get().saturating_sub(1);
            pending.set(left);
            if left > 0 {
                return;
            }

            {
                let mut p = presentation.borrow_mut();
                p.height = 0.0;
                p.capsule_hidden = true;
            }
            machine.borrow_mut().send(UnlockEvent::SettleFinished);
        }
    }
}
