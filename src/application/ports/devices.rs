//! Device enumeration port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::media::InputDevice;

/// Device enumeration errors
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    #[error("Failed to enumerate devices: {0}")]
    EnumerationFailed(String),
}

/// Port for listing camera and microphone hardware
#[async_trait]
pub trait DeviceEnumerator: Send + Sync {
    async fn enumerate(&self) -> Result<Vec<InputDevice>, DeviceError>;
}
