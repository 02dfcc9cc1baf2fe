//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod media;
pub mod recording;
pub mod session;

// Re-export common types
pub use config::{AppConfig, CaptureConfig};
pub use error::*;
pub use media::{DeviceKind, InputDevice, MediaDeviceState, MediaStream, MediaTrack, TrackKind};
pub use recording::{
    format_clock, Artifact, ContainerFormat, Duration, OutputBuffer, RecordingTimer,
    DEFAULT_FILE_PREFIX,
};
pub use session::{InvalidStateTransition, SessionId, SessionState, SessionStatus};
