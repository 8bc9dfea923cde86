//! Motion configuration (glide.toml)
//!
//! Every duration, threshold and layout constant the chat list screens
//! animate with. All fields have defaults, so an empty file is a valid
//! configuration and partial files override only what they name.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a [`MotionConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse motion config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize motion config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid motion config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level motion configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MotionConfig {
    #[serde(default)]
    pub unlock: UnlockMotion,
    #[serde(default)]
    pub overlay: OverlayMotion,
    #[serde(default)]
    pub crossfade: CrossfadeMotion,
    #[serde(default)]
    pub replay: ReplayConfig,
}

impl MotionConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: MotionConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "motion config loaded");
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject durations and sizes the controllers cannot animate with
    pub fn validate(&self) -> Result<()> {
        self.unlock.validate()?;
        for (name, value) in [
            ("overlay.avatar_scale", self.overlay.avatar_scale),
            ("overlay.spring_duration", self.overlay.spring_duration),
            ("overlay.out_duration", self.overlay.out_duration),
            ("crossfade.duration", self.crossfade.duration),
            ("crossfade.icon_fade_in", self.crossfade.icon_fade_in),
        ] {
            positive_seconds(name, value)?;
        }

        let delay = self.crossfade.delay;
        if !(delay >= 0.0) || !delay.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "crossfade.delay must be a finite, non-negative number of seconds, got {delay}"
            )));
        }
        positive("overlay.spring_damping", self.overlay.spring_damping)?;
        if self.replay.fps == 0 {
            return Err(ConfigError::Invalid("replay.fps must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn positive_seconds(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(ConfigError::Invalid(format!(
            "{name} must be a positive number of seconds, got {value}"
        )));
    }
    Ok(())
}

fn positive(name: &str, value: f32) -> Result<()> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
    }
    Ok(())
}

/// Archive unlock affordance
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UnlockMotion {
    /// Pull distance at which releasing unlocks the archive
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default = "default_arrow_rotation")]
    pub arrow_rotation: f64,
    #[serde(default = "default_mask_scale")]
    pub mask_scale: f64,
    #[serde(default = "default_label_swap")]
    pub label_swap: f64,
    #[serde(default = "default_capsule_collapse")]
    pub capsule_collapse: f64,
    /// Mask, icon and release label settle time
    #[serde(default = "default_settle")]
    pub settle: f64,
    /// Mask scale while below the threshold
    #[serde(default = "default_mask_rest_scale")]
    pub mask_rest_scale: f32,
    /// Armed mask scale is `width / mask_cover_divisor`
    #[serde(default = "default_mask_cover_divisor")]
    pub mask_cover_divisor: f32,
    /// Icon animation progress is `eased / icon_progress_divisor`
    #[serde(default = "default_icon_progress_divisor")]
    pub icon_progress_divisor: f32,
    #[serde(default = "default_capsule_x")]
    pub capsule_x: f32,
    #[serde(default = "default_capsule_width")]
    pub capsule_width: f32,
    #[serde(default = "default_bottom_inset")]
    pub bottom_inset: f32,
    #[serde(default = "default_arrow_bounds")]
    pub arrow_bounds: f32,
    /// Where the mask and icon come to rest
    #[serde(default = "default_settle_x")]
    pub settle_x: f32,
    #[serde(default = "default_settle_y")]
    pub settle_y: f32,
    /// Horizontal travel of the swipe/release labels during a swap
    #[serde(default = "default_label_shift")]
    pub label_shift: f32,
    #[serde(default = "default_disabled_color")]
    pub disabled_color: u32,
    #[serde(default = "default_enabled_color")]
    pub enabled_color: u32,
}

fn default_threshold() -> f32 {
    80.0
}

fn default_arrow_rotation() -> f64 {
    0.25
}

fn default_mask_scale() -> f64 {
    0.2
}

fn default_label_swap() -> f64 {
    0.25
}

fn default_capsule_collapse() -> f64 {
    0.25
}

fn default_settle() -> f64 {
    0.33
}

fn default_mask_rest_scale() -> f32 {
    0.33
}

fn default_mask_cover_divisor() -> f32 {
    15.0
}

fn default_icon_progress_divisor() -> f32 {
    5.0
}

fn default_capsule_x() -> f32 {
    30.0
}

fn default_capsule_width() -> f32 {
    20.0
}

fn default_bottom_inset() -> f32 {
    8.0
}

fn default_arrow_bounds() -> f32 {
    62.0
}

fn default_settle_x() -> f32 {
    40.0
}

fn default_settle_y() -> f32 {
    38.0
}

fn default_label_shift() -> f32 {
    40.0
}

fn default_disabled_color() -> u32 {
    0xb2b7bd
}

fn default_enabled_color() -> u32 {
    0x3b82ea
}

impl UnlockMotion {
    /// Reject durations and divisors the unlock controller cannot animate with
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("unlock.arrow_rotation", self.arrow_rotation),
            ("unlock.mask_scale", self.mask_scale),
            ("unlock.label_swap", self.label_swap),
            ("unlock.capsule_collapse", self.capsule_collapse),
            ("unlock.settle", self.settle),
        ] {
            positive_seconds(name, value)?;
        }
        positive("unlock.threshold", self.threshold)?;
        positive("unlock.mask_cover_divisor", self.mask_cover_divisor)?;
        positive("unlock.icon_progress_divisor", self.icon_progress_divisor)?;
        Ok(())
    }
}

impl Default for UnlockMotion {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            arrow_rotation: default_arrow_rotation(),
            mask_scale: default_mask_scale(),
            label_swap: default_label_swap(),
            capsule_collapse: default_capsule_collapse(),
            settle: default_settle(),
            mask_rest_scale: default_mask_rest_scale(),
            mask_cover_divisor: default_mask_cover_divisor(),
            icon_progress_divisor: default_icon_progress_divisor(),
            capsule_x: default_capsule_x(),
            capsule_width: default_capsule_width(),
            bottom_inset: default_bottom_inset(),
            arrow_bounds: default_arrow_bounds(),
            settle_x: default_settle_x(),
            settle_y: default_settle_y(),
            label_shift: default_label_shift(),
            disabled_color: default_disabled_color(),
            enabled_color: default_enabled_color(),
        }
    }
}

/// Chat list to chat title transition
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct OverlayMotion {
    #[serde(default = "default_avatar_scale")]
    pub avatar_scale: f64,
    /// Avatar scale at the end of `animate_in`
    #[serde(default = "default_avatar_min_scale")]
    pub avatar_min_scale: f32,
    /// Avatar scale at the start of `animate_out`
    #[serde(default = "default_avatar_out_from")]
    pub avatar_out_from: f32,
    /// Snapshot x is `title_x - snapshot_offset`
    #[serde(default = "default_snapshot_offset")]
    pub snapshot_offset: f32,
    #[serde(default = "default_spring_duration")]
    pub spring_duration: f64,
    #[serde(default = "default_spring_damping")]
    pub spring_damping: f32,
    #[serde(default = "default_spring_frequency")]
    pub spring_frequency: f32,
    #[serde(default = "default_out_duration")]
    pub out_duration: f64,
}

fn default_avatar_scale() -> f64 {
    0.1
}

fn default_avatar_min_scale() -> f32 {
    0.5
}

fn default_avatar_out_from() -> f32 {
    0.1
}

fn default_snapshot_offset() -> f32 {
    80.0
}

fn default_spring_duration() -> f64 {
    0.5
}

fn default_spring_damping() -> f32 {
    6.0
}

fn default_spring_frequency() -> f32 {
    10.0
}

fn default_out_duration() -> f64 {
    0.3
}

impl Default for OverlayMotion {
    fn default() -> Self {
        Self {
            avatar_scale: default_avatar_scale(),
            avatar_min_scale: default_avatar_min_scale(),
            avatar_out_from: default_avatar_out_from(),
            snapshot_offset: default_snapshot_offset(),
            spring_duration: default_spring_duration(),
            spring_damping: default_spring_damping(),
            spring_frequency: default_spring_frequency(),
            out_duration: default_out_duration(),
        }
    }
}

/// QR share sheet theme switch
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CrossfadeMotion {
    #[serde(default = "default_crossfade_duration")]
    pub duration: f64,
    #[serde(default = "default_crossfade_delay")]
    pub delay: f64,
    #[serde(default = "default_icon_fade_in")]
    pub icon_fade_in: f64,
}

fn default_crossfade_duration() -> f64 {
    0.3
}

fn default_crossfade_delay() -> f64 {
    0.05
}

fn default_icon_fade_in() -> f64 {
    0.2
}

impl Default for CrossfadeMotion {
    fn default() -> Self {
        Self {
            duration: default_crossfade_duration(),
            delay: default_crossfade_delay(),
            icon_fade_in: default_icon_fade_in(),
        }
    }
}

/// Frame replay settings used by the command line tool
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ReplayConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Width of the simulated list
    #[serde(default = "default_width")]
    pub width: f32,
}

fn default_fps() -> u32 {
    60
}

fn default_width() -> f32 {
    390.0
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            width: default_width(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = MotionConfig::from_toml_str("").unwrap();
        assert_eq!(config, MotionConfig::default());
        assert_eq!(config.unlock.arrow_rotation, 0.25);
        assert_eq!(config.crossfade.delay, 0.05);
    }

    #[test]
    fn test_partial_override() {
        let config = MotionConfig::from_toml_str(
            r#"
            [unlock]
            threshold = 120.0

            [replay]
            fps = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.unlock.threshold, 120.0);
        assert_eq!(config.unlock.settle, 0.33);
        assert_eq!(config.replay.fps, 120);
        assert_eq!(config.replay.width, 390.0);
    }

    #[test]
    fn test_round_trip() {
        let mut config = MotionConfig::default();
        config.overlay.spring_damping = 4.5;
        let text = config.to_toml().unwrap();
        assert_eq!(MotionConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_zero_duration() {
        let err = MotionConfig::from_toml_str("[crossfade]\nduration = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("crossfade.duration"));
    }

    #[test]
    fn test_rejects_infinite_delay() {
        let err = MotionConfig::from_toml_str("[crossfade]\ndelay = inf\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("crossfade.delay"));

        assert!(MotionConfig::from_toml_str("[crossfade]\ndelay = 0.0\n").is_ok());
    }

    #[test]
    fn test_rejects_non_positive_mask_divisor() {
        for value in ["0.0", "-15.0", "nan"] {
            let source = format!("[unlock]\nmask_cover_divisor = {value}\n");
            let err = MotionConfig::from_toml_str(&source).unwrap_err();
            assert!(err.to_string().contains("unlock.mask_cover_divisor"), "{value}: {err}");
        }
    }

    #[test]
    fn test_unlock_section_validates_alone() {
        let motion = UnlockMotion {
            settle: 0.0,
            ..UnlockMotion::default()
        };
        let err = motion.validate().unwrap_err();
        assert!(err.to_string().contains("unlock.settle"));
        assert!(UnlockMotion::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = MotionConfig::from_toml_str("[unlock\nthreshold = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = MotionConfig::load(Path::new("/nonexistent/glide.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
