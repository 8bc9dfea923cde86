//! QR share sheet theme switch
//!
//! The sheet content is frozen into a snapshot that fades away over the
//! freshly themed content while the background color crossfades.

use crate::config::CrossfadeMotion;
use crate::sink::presentation_sink;
use crate::snapshot::{SnapshotHost, SnapshotId};
use glide_animation::error::Result;
use glide_animation::{AnimationDriver, FrameSource, SlotId, TaskPreset};
use glide_core::Color;
use std::cell::RefCell;
use std::rc::Rc;

const SNAPSHOT: SlotId = 0;
const BACKGROUND: SlotId = 1;
const PREVIOUS_ICON: SlotId = 2;
const ICON: SlotId = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct ThemePresentation {
    pub background: Color,
    pub icon_opacity: f32,
    pub previous_icon_opacity: f32,
    pub snapshot: Option<SnapshotId>,
    pub snapshot_opacity: f32,
}

pub struct ThemeCrossfade<H: SnapshotHost + 'static> {
    motion: CrossfadeMotion,
    driver: AnimationDriver,
    host: Rc<RefCell<H>>,
    presentation: Rc<RefCell<ThemePresentation>>,
}

impl<H: SnapshotHost + 'static> ThemeCrossfade<H> {
    pub fn new(
        background: Color,
        motion: CrossfadeMotion,
        host: Rc<RefCell<H>>,
        source: impl FrameSource + 'static,
    ) -> Self {
        Self {
            motion,
            driver: AnimationDriver::new(source),
            host,
            presentation: Rc::new(RefCell::new(ThemePresentation {
                background,
                icon_opacity: 1.0,
                previous_icon_opacity: 0.0,
                snapshot: None,
                snapshot_opacity: 0.0,
            })),
        }
    }

    pub fn presentation(&self) -> ThemePresentation {
        self.presentation.borrow().clone()
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    pub fn tick(&mut self) {
        self.driver.tick();
    }

    /// Switch to `new_background`.
    ///
    /// Returns `false` when the content could not be captured and was
    /// updated in place. A switch in flight is cut short and its snapshot
    /// removed before the new one is taken.
    pub fn switch_theme(&mut self, new_background: Color, animate_icon: bool) -> Result<bool> {
        self.driver.cancel_all();
        let previous = self.presentation.borrow_mut().snapshot.take();
        if let Some(id) = previous {
            self.host.borrow_mut().remove(id);
            tracing::debug!(?id, "crossfade preempted");
        }

        let captured = self.host.borrow_mut().capture("content");
        let Some(id) = captured else {
            let mut p = self.presentation.borrow_mut();
            p.background = new_background;
            p.icon_opacity = 1.0;
            p.previous_icon_opacity = 0.0;
            p.snapshot_opacity = 0.0;
            tracing::debug!("content capture failed; switching without crossfade");
            return Ok(false);
        };

        let from = {
            let mut p = self.presentation.borrow_mut();
            p.snapshot = Some(id);
            p.snapshot_opacity = 1.0;
            p.background
        };
        self.host.borrow_mut().set_opacity(id, 1.0);

        let m = &self.motion;
        let release_host = self.host.clone();
        let release_state = self.presentation.clone();
        let host = self.host.clone();
        self.driver.start(
            TaskPreset::fade_out(m.duration)
                .delay(m.delay)
                .slot(SNAPSHOT)
                .label("snapshot-fade")
                .on_complete(move || {
                    let mut p = release_state.borrow_mut();
                    if p.snapshot == Some(id) {
                        p.snapshot = None;
                        release_host.borrow_mut().remove(id);
                    }
                }),
            presentation_sink(&self.presentation, "snapshot", move |p: &mut ThemePresentation, f| {
                p.snapshot_opacity = f.value(0);
                host.borrow_mut().set_opacity(id, p.snapshot_opacity);
            }),
        )?;

        self.driver.start(
            TaskPreset::color(from, new_background, m.duration).slot(BACKGROUND),
            presentation_sink(&self.presentation, "background", |p: &mut ThemePresentation, f| {
                p.background = Color::from_slice(f.values)
            }),
        )?;

        if animate_icon {
            {
                let mut p = self.presentation.borrow_mut();
                p.previous_icon_opacity = 1.0;
                p.icon_opacity = 0.0;
            }
            self.driver.start(
                TaskPreset::fade_out(m.duration).slot(PREVIOUS_ICON),
                presentation_sink(&self.presentation, "previous icon", |p: &mut ThemePresentation, f| {
                    p.previous_icon_opacity = f.value(0)
                }),
            )?;
            self.driver.start(
                TaskPreset::fade_in(m.icon_fade_in).slot(ICON),
                presentation_sink(&self.presentation, "icon", |p: &mut ThemePresentation, f| {
                    p.icon_opacity = f.value(0)
                }),
            )?;
        } else {
            let mut p = self.presentation.borrow_mut();
            p.icon_opacity = 1.0;
            p.previous_icon_opacity = 0.0;
        }

        tracing::debug!(?id, animate_icon, "theme crossfade started");
        Ok(true)
    }
}

impl<H: SnapshotHost + 'static> Drop for ThemeCrossfade<H> {
    fn drop(&mut self) {
        let previous = self.presentation.borrow_mut().snapshot.take();
        if let Some(id) = previous {
            self.host.borrow_mut().remove(id);
        }
    }
}
