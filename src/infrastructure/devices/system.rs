//! Host device enumeration
//!
//! Microphones come from cpal's default host. Cameras are V4L2 device nodes
//! on Linux; other platforms report none.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait};

use crate::application::ports::{DeviceEnumerator, DeviceError};
use crate::domain::media::{DeviceKind, InputDevice};

/// Enumerates microphones through cpal and cameras through `/dev`
pub struct SystemDeviceEnumerator {
    dev_dir: PathBuf,
}

impl SystemDeviceEnumerator {
    pub fn new() -> Self {
        Self {
            dev_dir: PathBuf::from("/dev"),
        }
    }

    /// Scan a different directory for camera nodes
    pub fn with_dev_dir(dev_dir: impl Into<PathBuf>) -> Self {
        Self {
            dev_dir: dev_dir.into(),
        }
    }

    fn microphones() -> Result<Vec<InputDevice>, DeviceError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| DeviceError::EnumerationFailed(e.to_string()))?;

        Ok(devices
            .map(|device| {
                let label = device.name().unwrap_or_else(|_| "Unknown microphone".to_string());
                InputDevice::new(DeviceKind::AudioInput, label)
            })
            .collect())
    }

    fn cameras(dev_dir: &Path) -> Vec<InputDevice> {
        if !cfg!(target_os = "linux") {
            return Vec::new();
        }
        let Ok(entries) = std::fs::read_dir(dev_dir) else {
            return Vec::new();
        };

        let mut nodes: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_video_node(path))
            .collect();
        nodes.sort();

        nodes
            .into_iter()
            .map(|path| InputDevice::new(DeviceKind::VideoInput, path.to_string_lossy()))
            .collect()
    }
}

impl Default for SystemDeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

/// `videoN` device node names
fn is_video_node(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix("video"))
        .is_some_and(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
}

#[async_trait]
impl DeviceEnumerator for SystemDeviceEnumerator {
    async fn enumerate(&self) -> Result<Vec<InputDevice>, DeviceError> {
        let dev_dir = self.dev_dir.clone();
        // cpal probes audio backends synchronously
        tokio::task::spawn_blocking(move || {
            let mut devices = Self::cameras(&dev_dir);
            devices.extend(Self::microphones()?);
            Ok(devices)
        })
        .await
        .map_err(|e| DeviceError::EnumerationFailed(format!("Task join error: {}", e)))?
    }
}
