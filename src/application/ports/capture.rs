//! Capture provider port interface
//!
//! Display and camera capture are requested independently so that a camera
//! failure never affects the display stream.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::media::MediaStream;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// The user or platform refused access
    #[error("Capture permission denied: {0}")]
    Denied(String),

    /// The requested device does not exist
    #[error("Capture device not found: {0}")]
    NotFound(String),

    /// The capture facility is missing or busy
    #[error("Capture unavailable: {0}")]
    Unavailable(String),
}

/// Cursor visibility in the display stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorCapture {
    #[default]
    Always,
    Never,
}

impl CursorCapture {
    pub const fn is_visible(&self) -> bool {
        matches!(self, Self::Always)
    }
}

/// Parameters of a display-capture request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRequest {
    pub cursor: CursorCapture,
    /// Include a microphone audio track
    pub audio: bool,
}

impl DisplayRequest {
    pub fn with_audio(audio: bool) -> Self {
        Self {
            cursor: CursorCapture::Always,
            audio,
        }
    }
}

/// Parameters of a camera-capture request. Always video-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraRequest {
    pub device: Option<String>,
}

/// Port for acquiring live capture streams from the host
#[async_trait]
pub trait CaptureProvider: Send + Sync {
    /// Request a display-capture stream.
    ///
    /// One attempt, no retry. The returned stream carries an audio track
    /// only when `request.audio` is set.
    async fn request_display(&self, request: &DisplayRequest) -> Result<MediaStream, CaptureError>;

    /// Request a video-only camera stream for live preview.
    async fn request_camera(&self, request: &CameraRequest) -> Result<MediaStream, CaptureError>;
}
