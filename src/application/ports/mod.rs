//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod audio_cue;
pub mod capture;
pub mod config;
pub mod delivery;
pub mod devices;
pub mod encoder;
pub mod notifier;

// Re-export common types
pub use audio_cue::{AudioCue, AudioCueError, AudioCueType};
pub use capture::{CameraRequest, CaptureError, CaptureProvider, CursorCapture, DisplayRequest};
pub use config::ConfigStore;
pub use delivery::{ArtifactSink, DeliveryError, DeliveryReceipt};
pub use devices::{DeviceEnumerator, DeviceError};
pub use encoder::{
    EncoderControl, EncoderError, EncoderEvent, EncoderOptions, EncoderSession, MediaEncoder,
    ENCODER_EVENT_CAPACITY,
};
pub use notifier::{NotificationError, NotificationIcon, Notifier};
