//! Chat list to chat title transition
//!
//! When a chat opens over the list, the list title is frozen into a
//! snapshot that rides along with the title while it springs into place,
//! and fades out over the first half of the spring. Closing the chat runs
//! the reverse and releases the snapshot.

use crate::config::OverlayMotion;
use crate::sink::presentation_sink;
use crate::snapshot::{SnapshotHost, SnapshotId};
use glide_animation::error::Result;
use glide_animation::{
    AnimationDriver, Easing, FrameSource, InterpolationTask, SlotId, TaskPreset,
};
use glide_core::Rect;
use std::cell::RefCell;
use std::rc::Rc;

const TITLE: SlotId = 0;
const AVATAR: SlotId = 1;
const SNAPSHOT_FRAME: SlotId = 2;
const SNAPSHOT_FADE: SlotId = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct OverlayPresentation {
    pub title_x: f32,
    pub avatar_scale: f32,
    pub snapshot: Option<SnapshotId>,
    pub snapshot_opacity: f32,
    pub snapshot_frame: Rect,
}

impl Default for OverlayPresentation {
    fn default() -> Self {
        Self {
            title_x: 0.0,
            avatar_scale: 1.0,
            snapshot: None,
            snapshot_opacity: 0.0,
            snapshot_frame: Rect::ZERO,
        }
    }
}

pub struct OverlayTitleTransition<H: SnapshotHost + 'static> {
    motion: OverlayMotion,
    driver: AnimationDriver,
    host: Rc<RefCell<H>>,
    presentation: Rc<RefCell<OverlayPresentation>>,
}

impl<H: SnapshotHost + 'static> OverlayTitleTransition<H> {
    pub fn new(motion: OverlayMotion, host: Rc<RefCell<H>>, source: impl FrameSource + 'static) -> Self {
        Self {
            motion,
            driver: AnimationDriver::new(source),
            host,
            presentation: Rc::new(RefCell::new(OverlayPresentation::default())),
        }
    }

    pub fn presentation(&self) -> OverlayPresentation {
        self.presentation.borrow().clone()
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    pub fn tick(&mut self) {
        self.driver.tick();
    }

    /// [`animate_in`](Self::animate_in) with the configured spring
    pub fn animate_in_default(&mut self, source_title_x: f32, target_title_x: f32) -> Result<()> {
        let (duration, damping) = (self.motion.spring_duration, self.motion.spring_damping);
        self.animate_in(source_title_x, target_title_x, duration, damping)
    }

    /// [`animate_out`](Self::animate_out) over the configured duration
    pub fn animate_out_default(
        &mut self,
        target_title_x: f32,
        snapshot_target: Rect,
    ) -> Result<()> {
        self.animate_out(target_title_x, snapshot_target, self.motion.out_duration)
    }

    /// Spring the title from the list position to the chat position.
    ///
    /// Without a snapshot (capture failed) only the title and avatar move.
    pub fn animate_in(
        &mut self,
        source_title_x: f32,
        target_title_x: f32,
        spring_duration: f64,
        spring_damping: f32,
    ) -> Result<()> {
        self.release_snapshot();

        let offset = self.motion.snapshot_offset;
        let snapshot = self.host.borrow_mut().capture("title");
        {
            let mut p = self.presentation.borrow_mut();
            p.title_x = source_title_x;
            p.snapshot = snapshot;
            p.snapshot_opacity = 1.0;
            p.snapshot_frame.origin.x = source_title_x - offset;
            if let Some(id) = snapshot {
                let mut host = self.host.borrow_mut();
                host.set_opacity(id, 1.0);
                host.set_frame(id, p.snapshot_frame);
            }
        }

        let spring = Easing::Spring {
            damping: spring_damping,
            frequency: self.motion.spring_frequency,
        };
        self.driver.start(
            InterpolationTask::scalar(source_title_x, target_title_x, spring_duration)
                .easing(spring)
                .slot(TITLE)
                .label("title-in"),
            presentation_sink(&self.presentation, "title", |p: &mut OverlayPresentation, f| {
                p.title_x = f.value(0)
            }),
        )?;

        self.driver.start(
            TaskPreset::scale(1.0, self.motion.avatar_min_scale, self.motion.avatar_scale)
                .slot(AVATAR),
            presentation_sink(&self.presentation, "avatar", |p: &mut OverlayPresentation, f| {
                p.avatar_scale = f.value(0)
            }),
        )?;

        if snapshot.is_none() {
            tracing::debug!("title snapshot unavailable; animating without it");
            return Ok(());
        }

        // Registered after the title task so it reads this tick's title x
        let host = self.host.clone();
        self.driver.start(
            InterpolationTask::new(spring_duration)
                .slot(SNAPSHOT_FRAME)
                .label("snapshot-track"),
            presentation_sink(&self.presentation, "snapshot", move |p: &mut OverlayPresentation, _| {
                p.snapshot_frame.origin.x = p.title_x - offset;
                if let Some(id) = p.snapshot {
                    host.borrow_mut().set_frame(id, p.snapshot_frame);
                }
            }),
        )?;

        let host = self.host.clone();
        self.driver.start(
            TaskPreset::fade_out(spring_duration / 2.0).slot(SNAPSHOT_FADE),
            presentation_sink(&self.presentation, "snapshot", move |p: &mut OverlayPresentation, f| {
                p.snapshot_opacity = f.value(0);
                if let Some(id) = p.snapshot {
                    host.borrow_mut().set_opacity(id, p.snapshot_opacity);
                }
            }),
        )?;

        tracing::debug!(source_title_x, target_title_x, "title transition in");
        Ok(())
    }

    /// Move the title back, bring the snapshot back to `snapshot_target`
    /// and release it once it lands.
    pub fn animate_out(
        &mut self,
        target_title_x: f32,
        snapshot_target: Rect,
        duration: f64,
    ) -> Result<()> {
        let current = self.presentation();

        self.driver.start(
            InterpolationTask::scalar(current.title_x, target_title_x, duration)
                .easing(Easing::MEDIA_EASE_IN_OUT)
                .slot(TITLE)
                .label("title-out"),
            presentation_sink(&self.presentation, "title", |p: &mut OverlayPresentation, f| {
                p.title_x = f.value(0)
            }),
        )?;

        self.driver.start(
            TaskPreset::scale(self.motion.avatar_out_from, 1.0, duration).slot(AVATAR),
            presentation_sink(&self.presentation, "avatar", |p: &mut OverlayPresentation, f| {
                p.avatar_scale = f.value(0)
            }),
        )?;

        let Some(id) = current.snapshot else {
            tracing::debug!("no title snapshot to bring back");
            return Ok(());
        };

        let release_host = self.host.clone();
        let release_state = self.presentation.clone();
        let host = self.host.clone();
        self.driver.start(
            TaskPreset::frame(current.snapshot_frame, snapshot_target, duration)
                .slot(SNAPSHOT_FRAME)
                .on_complete(move || {
                    let mut p = release_state.borrow_mut();
                    if p.snapshot == Some(id) {
                        p.snapshot = None;
                        release_host.borrow_mut().remove(id);
                        tracing::debug!(?id, "title snapshot released");
                    }
                }),
            presentation_sink(&self.presentation, "snapshot", move |p: &mut OverlayPresentation, f| {
                p.snapshot_frame = Rect::from_slice(f.values);
                host.borrow_mut().set_frame(id, p.snapshot_frame);
            }),
        )?;

        let host = self.host.clone();
        self.driver.start(
            TaskPreset::fade(current.snapshot_opacity, 1.0, duration).slot(SNAPSHOT_FADE),
            presentation_sink(&self.presentation, "snapshot", move |p: &mut OverlayPresentation, f| {
                p.snapshot_opacity = f.value(0);
                host.borrow_mut().set_opacity(id, p.snapshot_opacity);
            }),
        )?;

        tracing::debug!(target_title_x, "title transition out");
        Ok(())
    }

    fn release_snapshot(&mut self) {
        let previous = self.presentation.borrow_mut().snapshot.take();
        if let Some(id) = previous {
            self.driver.cancel_slot(SNAPSHOT_FRAME);
            self.driver.cancel_slot(SNAPSHOT_FADE);
            self.host.borrow_mut().remove(id);
        }
    }
}

impl<H: SnapshotHost + 'static> Drop for OverlayTitleTransition<H> {
    fn drop(&mut self) {
        let previous = self.presentation.borrow_mut().snapshot.take();
        if let Some(id) = previous {
            self.host.borrow_mut().remove(id);
        }
    }
}
