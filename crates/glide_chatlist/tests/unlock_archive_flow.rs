//! End-to-end screen flows
//!
//! These tests verify that:
//! - A full pull, cross, release and settle walks the transition table
//! - Rapid re-crossing never queues bundles
//! - Controllers configured from TOML pick up overridden values
//! - Snapshot overlays from several controllers on one host are all released

use glide_animation::ManualFrameSource;
use glide_chatlist::{
    MotionConfig, OverlayTitleTransition, RecordingHost, ThemeCrossfade, UnlockArchive,
    UnlockEvent, UnlockState,
};
use glide_core::{Color, Rect};
use std::cell::RefCell;
use std::rc::Rc;

const FRAME: f64 = 1.0 / 64.0;

fn pump(archive: &mut UnlockArchive, clock: &ManualFrameSource, frames: usize) {
    for _ in 0..frames {
        clock.advance(FRAME);
        archive.tick();
    }
}

#[test]
fn test_full_unlock_gesture() {
    let clock = ManualFrameSource::new();
    let mut archive =
        UnlockArchive::new(390.0, MotionConfig::default().unlock, clock.clone()).unwrap();

    archive.drag_began();
    for offset in [10.0, 30.0, 55.0, 79.0, 81.0, 95.0] {
        archive.drag_update(offset).unwrap();
        pump(&mut archive, &clock, 1);
    }
    assert_eq!(archive.state(), UnlockState::DraggingAbove);

    pump(&mut archive, &clock, 20);
    archive.release().unwrap();
    pump(&mut archive, &clock, 30);

    assert_eq!(archive.state(), UnlockState::Idle);
    assert!(!clock.is_armed());

    let events: Vec<UnlockEvent> = archive.history().iter().map(|(_, e, _)| *e).collect();
    assert_eq!(
        events,
        vec![
            UnlockEvent::DragBegan,
            UnlockEvent::CrossedUp,
            UnlockEvent::Released,
            UnlockEvent::SettleStarted,
            UnlockEvent::SettleFinished,
        ]
    );
}

#[test]
fn test_jitter_across_threshold_does_not_queue() {
    let clock = ManualFrameSource::new();
    let mut archive =
        UnlockArchive::new(390.0, MotionConfig::default().unlock, clock.clone()).unwrap();
    archive.drag_began();

    // Oscillate around the threshold every frame
    for i in 0..40 {
        let offset = if i % 2 == 0 { 90.0 } else { 70.0 };
        archive.drag_update(offset).unwrap();
        assert!(archive.driver().len() <= 4);
        pump(&mut archive, &clock, 1);
    }

    // Each crossing waited for the previous flip: 0.25 s at 64 fps is 16 frames
    let crossings = archive
        .history()
        .iter()
        .filter(|(_, e, _)| matches!(e, UnlockEvent::CrossedUp | UnlockEvent::CrossedDown))
        .count();
    assert!((2..=3).contains(&crossings), "{crossings} crossings");
}

#[test]
fn test_threshold_from_config() {
    let config = MotionConfig::from_toml_str("[unlock]\nthreshold = 150.0\n").unwrap();
    let clock = ManualFrameSource::new();
    let mut archive = UnlockArchive::new(390.0, config.unlock, clock.clone()).unwrap();

    archive.drag_began();
    assert_eq!(archive.drag_update(120.0).unwrap(), UnlockState::DraggingBelow);
    assert_eq!(archive.drag_update(150.0).unwrap(), UnlockState::DraggingAbove);
}

#[test]
fn test_shared_host_releases_everything() {
    let config = MotionConfig::default();
    let host = Rc::new(RefCell::new(RecordingHost::new()));
    let clock = ManualFrameSource::new();

    let mut title =
        OverlayTitleTransition::new(config.overlay.clone(), host.clone(), clock.clone());
    let mut sheet = ThemeCrossfade::new(
        Color::WHITE,
        config.crossfade.clone(),
        host.clone(),
        clock.clone(),
    );

    title.animate_in(16.0, 120.0, 0.5, 6.0).unwrap();
    sheet.switch_theme(Color::from_hex(0x1c1c1e), true).unwrap();
    assert_eq!(host.borrow().live_count(), 2);

    for _ in 0..40 {
        clock.advance(FRAME);
        title.tick();
        sheet.tick();
    }
    assert_eq!(host.borrow().live_count(), 1);

    title
        .animate_out(16.0, Rect::new(16.0, 0.0, 200.0, 44.0), 0.3)
        .unwrap();
    for _ in 0..20 {
        clock.advance(FRAME);
        title.tick();
        sheet.tick();
    }
    assert_eq!(host.borrow().live_count(), 0);
    assert_eq!(host.borrow().removed().len(), 2);
}
