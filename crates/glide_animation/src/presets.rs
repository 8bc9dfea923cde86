//! Task presets for common transitions
//!
//! Pre-built [`InterpolationTask`]s with their channel layouts fixed, so
//! controllers and their sinks agree on which index holds which quantity.

use crate::easing::Easing;
use crate::task::InterpolationTask;
use glide_core::{Color, Rect};

/// Pre-built task presets
pub struct TaskPreset;

impl TaskPreset {
    // ========================================================================
    // Opacity
    // ========================================================================

    /// Opacity from `from` to `to`. Channel 0: opacity.
    pub fn fade(from: f32, to: f32, duration: f64) -> InterpolationTask {
        InterpolationTask::scalar(from, to, duration)
            .easing(Easing::Linear)
            .label("fade")
    }

    /// Transparent to opaque
    pub fn fade_in(duration: f64) -> InterpolationTask {
        Self::fade(0.0, 1.0, duration).label("fade-in")
    }

    /// Opaque to transparent
    pub fn fade_out(duration: f64) -> InterpolationTask {
        Self::fade(1.0, 0.0, duration).label("fade-out")
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Z rotation in radians. Channel 0: angle.
    pub fn rotate(from: f32, to: f32, duration: f64) -> InterpolationTask {
        InterpolationTask::scalar(from, to, duration)
            .easing(Easing::MEDIA_EASE_IN_OUT)
            .label("rotate")
    }

    /// Uniform scale. Channel 0: scale factor.
    pub fn scale(from: f32, to: f32, duration: f64) -> InterpolationTask {
        InterpolationTask::scalar(from, to, duration)
            .easing(Easing::MEDIA_EASE_IN_OUT)
            .label("scale")
    }

    // ========================================================================
    // Slides
    // ========================================================================

    /// Horizontal slide with a simultaneous fade.
    /// Channel 0: x position, channel 1: opacity.
    pub fn slide_fade(
        x_from: f32,
        x_to: f32,
        opacity_from: f32,
        opacity_to: f32,
        duration: f64,
    ) -> InterpolationTask {
        InterpolationTask::new(duration)
            .channel(x_from, x_to)
            .channel(opacity_from, opacity_to)
            .easing(Easing::System)
            .label("slide-fade")
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Frame to frame. Channels: `x, y, width, height`.
    pub fn frame(from: Rect, to: Rect, duration: f64) -> InterpolationTask {
        InterpolationTask::new(duration)
            .channels(from.to_array(), to.to_array())
            .easing(Easing::MEDIA_EASE_IN_OUT)
            .label("frame")
    }

    /// Color crossfade. Channels: `r, g, b, a`.
    pub fn color(from: Color, to: Color, duration: f64) -> InterpolationTask {
        InterpolationTask::new(duration)
            .channels(from.to_array(), to.to_array())
            .easing(Easing::Linear)
            .label("color")
    }
}
