//! Media device capability and toggle state

use std::fmt;

use serde::Serialize;

/// Kind of input hardware reported by device enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
}

impl DeviceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VideoInput => "videoinput",
            Self::AudioInput => "audioinput",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single input device as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDevice {
    pub kind: DeviceKind,
    pub label: String,
}

impl InputDevice {
    pub fn new(kind: DeviceKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

/// Capability facts and user intents for camera and microphone.
///
/// `has_*` are populated from device enumeration. `is_*_on` are toggled by
/// the user and only read when the next session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDeviceState {
    pub has_camera: bool,
    pub has_mic: bool,
    pub is_camera_on: bool,
    pub is_mic_on: bool,
}

impl Default for MediaDeviceState {
    fn default() -> Self {
        Self {
            has_camera: false,
            has_mic: false,
            is_camera_on: false,
            is_mic_on: true,
        }
    }
}

impl MediaDeviceState {
    /// Initial state with the given toggle intents
    pub fn with_intents(camera_on: bool, mic_on: bool) -> Self {
        Self {
            is_camera_on: camera_on,
            is_mic_on: mic_on,
            ..Self::default()
        }
    }

    /// Derive capability flags from an enumerated device list
    pub fn apply_inventory(&mut self, devices: &[InputDevice]) {
        self.has_camera = devices.iter().any(|d| d.kind == DeviceKind::VideoInput);
        self.has_mic = devices.iter().any(|d| d.kind == DeviceKind::AudioInput);
    }

    pub fn toggle_camera(&mut self) -> bool {
        self.is_camera_on = !self.is_camera_on;
        self.is_camera_on
    }

    pub fn toggle_mic(&mut self) -> bool {
        self.is_mic_on = !self.is_mic_on;
        self.is_mic_on
    }
}
