//! Frame-by-frame replays against a manual clock

use anyhow::{ensure, Context, Result};
use glide_animation::ManualFrameSource;
use glide_chatlist::{MotionConfig, RecordingHost, ThemeCrossfade, UnlockArchive};
use glide_core::Color;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// Upper bound on how long a replay waits for animations to settle
const MAX_SETTLE_SECONDS: f64 = 10.0;

/// Background the crossfade replay switches to
const DARK_BACKGROUND: u32 = 0x1c1c1e;

/// One frame of the unlock affordance
#[derive(Debug, Clone, Serialize)]
pub struct UnlockFrame {
    pub frame: usize,
    pub time: f64,
    pub state: String,
    pub pull: Option<f32>,
    pub height: f32,
    pub capsule: [f32; 4],
    pub capsule_hidden: bool,
    pub capsule_color: [f32; 4],
    pub arrow_rotation: f32,
    pub mask_position: [f32; 2],
    pub mask_scale: f32,
    pub icon_progress: f32,
    pub swipe_label_opacity: f32,
    pub release_label_opacity: f32,
}

/// One frame of the theme crossfade
#[derive(Debug, Clone, Serialize)]
pub struct CrossfadeFrame {
    pub frame: usize,
    pub time: f64,
    pub background: [f32; 4],
    pub snapshot_opacity: Option<f32>,
    pub icon_opacity: f32,
    pub previous_icon_opacity: f32,
    pub live_snapshots: usize,
}

fn frame_interval(fps: u32) -> Result<f64> {
    ensure!(fps > 0, "fps must be at least 1");
    Ok(1.0 / f64::from(fps))
}

fn record_unlock(archive: &UnlockArchive, frame: usize, time: f64, pull: Option<f32>) -> UnlockFrame {
    let p = archive.presentation();
    UnlockFrame {
        frame,
        time,
        state: format!("{:?}", archive.state()),
        pull,
        height: p.height,
        capsule: p.capsule.to_array(),
        capsule_hidden: p.capsule_hidden,
        capsule_color: p.capsule_color.to_array(),
        arrow_rotation: p.arrow_rotation,
        mask_position: [p.mask_position.x, p.mask_position.y],
        mask_scale: p.mask_scale,
        icon_progress: p.icon_progress,
        swipe_label_opacity: p.swipe_label.opacity,
        release_label_opacity: p.release_label.opacity,
    }
}

/// Replay a drag that reports one pull distance per frame, optionally
/// followed by a release, then run until every animation settles.
pub fn replay_unlock(
    config: &MotionConfig,
    pulls: &[f32],
    release: bool,
    fps: u32,
) -> Result<Vec<UnlockFrame>> {
    let dt = frame_interval(fps)?;
    let clock = ManualFrameSource::new();
    let mut archive = UnlockArchive::new(config.replay.width, config.unlock.clone(), clock.clone())
        .context("Invalid unlock motion")?;
    let mut frames = Vec::new();

    archive.drag_began();
    for &pull in pulls {
        archive
            .drag_update(pull)
            .with_context(|| format!("Drag update to {pull} failed"))?;
        clock.advance(dt);
        archive.tick();
        frames.push(record_unlock(&archive, frames.len(), clock.time(), Some(pull)));
    }

    if release {
        archive.release().context("Release failed")?;
    }

    let limit = (MAX_SETTLE_SECONDS / dt).ceil() as usize;
    for _ in 0..limit {
        if !archive.is_animating() {
            break;
        }
        clock.advance(dt);
        archive.tick();
        frames.push(record_unlock(&archive, frames.len(), clock.time(), None));
    }

    tracing::debug!(frames = frames.len(), state = ?archive.state(), "unlock replay finished");
    Ok(frames)
}

/// Replay a light to dark theme switch with the icon crossfading
pub fn replay_crossfade(config: &MotionConfig, fps: u32) -> Result<Vec<CrossfadeFrame>> {
    let dt = frame_interval(fps)?;
    let clock = ManualFrameSource::new();
    let host = Rc::new(RefCell::new(RecordingHost::new()));
    let mut sheet = ThemeCrossfade::new(
        Color::WHITE,
        config.crossfade.clone(),
        host.clone(),
        clock.clone(),
    );

    let crossfaded = sheet
        .switch_theme(Color::from_hex(DARK_BACKGROUND), true)
        .context("Theme switch failed")?;
    tracing::debug!(crossfaded, "theme switch started");

    let mut frames = Vec::new();
    let limit = (MAX_SETTLE_SECONDS / dt).ceil() as usize;
    for _ in 0..limit {
        if sheet.driver().is_empty() {
            break;
        }
        clock.advance(dt);
        sheet.tick();

        let p = sheet.presentation();
        frames.push(CrossfadeFrame {
            frame: frames.len(),
            time: clock.time(),
            background: p.background.to_array(),
            snapshot_opacity: p.snapshot.map(|_| p.snapshot_opacity),
            icon_opacity: p.icon_opacity,
            previous_icon_opacity: p.previous_icon_opacity,
            live_snapshots: host.borrow().live_count(),
        });
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_fps_rejected() {
        let config = MotionConfig::default();
        assert!(replay_unlock(&config, &[10.0], false, 0).is_err());
        assert!(replay_crossfade(&config, 0).is_err());
    }

    #[test]
    fn test_drag_without_release_settles_dragging() {
        let config = MotionConfig::default();
        let frames = replay_unlock(&config, &[20.0, 60.0, 100.0], false, 60).unwrap();
        let last = frames.last().unwrap();
        assert_eq!(last.state, "DraggingAbove");
        assert_eq!(last.release_label_opacity, 1.0);
    }
}
