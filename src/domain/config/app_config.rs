//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::recording::{ContainerFormat, Duration, DEFAULT_FILE_PREFIX};

/// Platform capture settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub display: Option<String>,
    pub audio_source: Option<String>,
    pub camera_device: Option<String>,
    pub framerate: Option<u32>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub camera: Option<bool>,
    pub microphone: Option<bool>,
    pub output_dir: Option<String>,
    pub file_prefix: Option<String>,
    pub container: Option<String>,
    pub max_duration: Option<String>,
    pub notify: Option<bool>,
    pub audio_cues: Option<bool>,
    pub capture: Option<CaptureConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            camera: Some(false),
            microphone: Some(true),
            output_dir: None,
            file_prefix: Some(DEFAULT_FILE_PREFIX.to_string()),
            container: Some("webm".to_string()),
            max_duration: None,
            notify: Some(false),
            audio_cues: Some(false),
            capture: Some(CaptureConfig {
                display: None,
                audio_source: None,
                camera_device: None,
                framerate: Some(30),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            camera: other.camera.or(self.camera),
            microphone: other.microphone.or(self.microphone),
            output_dir: other.output_dir.or(self.output_dir),
            file_prefix: other.file_prefix.or(self.file_prefix),
            container: other.container.or(self.container),
            max_duration: other.max_duration.or(self.max_duration),
            notify: other.notify.or(self.notify),
            audio_cues: other.audio_cues.or(self.audio_cues),
            capture: Self::merge_capture_config(self.capture, other.capture),
        }
    }

    fn merge_capture_config(
        base: Option<CaptureConfig>,
        other: Option<CaptureConfig>,
    ) -> Option<CaptureConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(CaptureConfig {
                display: o.display.or(b.display),
                audio_source: o.audio_source.or(b.audio_source),
                camera_device: o.camera_device.or(b.camera_device),
                framerate: o.framerate.or(b.framerate),
            }),
        }
    }

    /// Get camera intent, or false if not set
    pub fn camera_or_default(&self) -> bool {
        self.camera.unwrap_or(false)
    }

    /// Get microphone intent, or true if not set
    pub fn microphone_or_default(&self) -> bool {
        self.microphone.unwrap_or(true)
    }

    /// Configured output directory, if any
    pub fn output_dir(&self) -> Option<PathBuf> {
        self.output_dir.as_ref().map(PathBuf::from)
    }

    pub fn file_prefix_or_default(&self) -> &str {
        self.file_prefix
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_FILE_PREFIX)
    }

    /// Get container as parsed ContainerFormat, or webm if not set/invalid
    pub fn container_or_default(&self) -> ContainerFormat {
        self.container
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Parsed max_duration. None means unlimited.
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .filter(|d: &Duration| d.as_secs() > 0)
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    /// Get audio cue setting, or false if not set
    pub fn audio_cues_or_default(&self) -> bool {
        self.audio_cues.unwrap_or(false)
    }

    pub fn display(&self) -> Option<&str> {
        self.capture.as_ref().and_then(|c| c.display.as_deref())
    }

    /// Microphone input name. None selects the platform default.
    pub fn audio_source(&self) -> Option<&str> {
        self.capture.as_ref().and_then(|c| c.audio_source.as_deref())
    }

    pub fn camera_device(&self) -> Option<&str> {
        self.capture.as_ref().and_then(|c| c.camera_device.as_deref())
    }

    /// Get framerate, or 30 if not set/zero
    pub fn framerate_or_default(&self) -> u32 {
        self.capture
            .as_ref()
            .and_then(|c| c.framerate)
            .filter(|f| *f > 0)
            .unwrap_or(30)
    }
}
