//! Encoder port interfaces
//!
//! An encoder is opened once per session against the display stream. Its
//! output arrives on a single event channel owned by the session, so chunk
//! and completion handling is subscribed exactly once.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::media::MediaStream;
use crate::domain::recording::ContainerFormat;

/// Capacity of the per-session encoder event channel
pub const ENCODER_EVENT_CAPACITY: usize = 64;

/// Encoder errors
#[derive(Debug, Clone, Error)]
pub enum EncoderError {
    #[error("Failed to start encoder: {0}")]
    StartFailed(String),

    #[error("Failed to finalize encoder: {0}")]
    FinalizeFailed(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("FFmpeg not found. Please install FFmpeg")]
    FfmpegNotFound,
}

/// Notifications emitted by a running encoder
#[derive(Debug, Clone)]
pub enum EncoderEvent {
    /// A chunk of container bytes, in emission order
    Data(Vec<u8>),
    /// A non-fatal error report. Completion still follows.
    Error(EncoderError),
    /// Encoding has fully ceased. No events follow.
    Stopped,
}

/// Encoder settings chosen by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderOptions {
    pub container: ContainerFormat,
    pub framerate: u32,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            container: ContainerFormat::Webm,
            framerate: 30,
        }
    }
}

/// Lifecycle control of one opened encoder
#[async_trait]
pub trait EncoderControl: Send + Sync {
    /// Begin encoding
    async fn start(&self) -> Result<(), EncoderError>;

    /// Request finalization. `EncoderEvent::Stopped` follows once the
    /// trailing data has been flushed.
    async fn finalize(&self) -> Result<(), EncoderError>;

    fn is_active(&self) -> bool;
}

/// An opened encoder and its event stream
pub struct EncoderSession {
    pub control: Arc<dyn EncoderControl>,
    pub events: mpsc::Receiver<EncoderEvent>,
}

impl EncoderSession {
    /// Create the bounded channel pair an encoder implementation feeds
    pub fn channel() -> (mpsc::Sender<EncoderEvent>, mpsc::Receiver<EncoderEvent>) {
        mpsc::channel(ENCODER_EVENT_CAPACITY)
    }
}

/// Port for creating encoders bound to a capture stream
#[async_trait]
pub trait MediaEncoder: Send + Sync {
    async fn open(
        &self,
        stream: &MediaStream,
        options: &EncoderOptions,
    ) -> Result<EncoderSession, EncoderError>;
}
