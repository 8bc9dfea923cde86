//! Snapshot overlays
//!
//! Crossfades and title transitions freeze part of the screen into a
//! snapshot overlay, animate it, and release it. The host owns the actual
//! pixels; controllers only hold [`SnapshotId`]s.

use glide_core::Rect;
use rustc_hash::FxHashMap;

/// Handle to a captured snapshot overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotId(pub u64);

/// Platform side of snapshot overlays
pub trait SnapshotHost {
    /// Freeze `surface` into an overlay on top of it.
    ///
    /// Returns `None` when the surface cannot be captured (not laid out, not
    /// on screen). Callers then update content without a crossfade.
    fn capture(&mut self, surface: &str) -> Option<SnapshotId>;

    fn set_opacity(&mut self, id: SnapshotId, opacity: f32);

    fn set_frame(&mut self, id: SnapshotId, frame: Rect);

    /// Detach and free the overlay. Unknown ids are ignored.
    fn remove(&mut self, id: SnapshotId);
}

/// Live state of one overlay in a [`RecordingHost`]
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotRecord {
    pub surface: String,
    pub opacity: f32,
    pub frame: Rect,
}

/// In-memory host that tracks overlays instead of drawing them.
///
/// Used for frame replays and tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    next_id: u64,
    live: FxHashMap<SnapshotId, SnapshotRecord>,
    removed: Vec<SnapshotId>,
    fail_captures: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent capture fail
    pub fn fail_captures(&mut self, fail: bool) {
        self.fail_captures = fail;
    }

    pub fn get(&self, id: SnapshotId) -> Option<&SnapshotRecord> {
        self.live.get(&id)
    }

    /// Number of overlays currently attached
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Overlays released so far, in order
    pub fn removed(&self) -> &[SnapshotId] {
        &self.removed
    }
}

impl SnapshotHost for RecordingHost {
    fn capture(&mut self, surface: &str) -> Option<SnapshotId> {
        if self.fail_captures {
            tracing::debug!(surface, "snapshot capture refused");
            return None;
        }
        self.next_id += 1;
        let id = SnapshotId(self.next_id);
        self.live.insert(
            id,
            SnapshotRecord {
                surface: surface.to_string(),
                opacity: 1.0,
                frame: Rect::ZERO,
            },
        );
        Some(id)
    }

    fn set_opacity(&mut self, id: SnapshotId, opacity: f32) {
        if let Some(record) = self.live.get_mut(&id) {
            record.opacity = opacity;
        }
    }

    fn set_frame(&mut self, id: SnapshotId, frame: Rect) {
        if let Some(record) = self.live.get_mut(&id) {
            record.frame = frame;
        }
    }

    fn remove(&mut self, id: SnapshotId) {
        if self.live.remove(&id).is_some() {
            self.removed.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_remove() {
        let mut host = RecordingHost::new();
        let id = host.capture("content").unwrap();
        host.set_opacity(id, 0.4);
        assert_eq!(host.get(id).unwrap().opacity, 0.4);

        host.remove(id);
        host.remove(id);
        assert_eq!(host.live_count(), 0);
        assert_eq!(host.removed(), &[id]);
    }

    #[test]
    fn test_failing_capture() {
        let mut host = RecordingHost::new();
        host.fail_captures(true);
        assert!(host.capture("content").is_none());
    }
}
