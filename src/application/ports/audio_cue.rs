//! Audio cue port for playing sound feedback
//!
//! Provides audible feedback when a recording starts, is saved, or fails.

use async_trait::async_trait;
use thiserror::Error;

/// Types of audio cues that can be played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCueType {
    /// Ascending chime when recording starts
    RecordingStart,
    /// Descending chime when recording stops
    RecordingStop,
    /// Double tap when display capture is refused or saving fails
    RecordingFailed,
}

/// Errors that can occur during audio cue playback
#[derive(Error, Debug)]
pub enum AudioCueError {
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),
}

/// Port trait for audio cue playback
#[async_trait]
pub trait AudioCue: Send + Sync {
    async fn play(&self, cue_type: AudioCueType) -> Result<(), AudioCueError>;
}
