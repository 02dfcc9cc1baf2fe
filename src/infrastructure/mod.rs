//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like FFmpeg, cpal and the desktop.

pub mod audio_cue;
pub mod capture;
pub mod config;
pub mod delivery;
pub mod devices;
pub mod notification;
pub mod recording;

// Re-export adapters
pub use audio_cue::{create_audio_cue, NoOpAudioCue, RodioAudioCue};
pub use capture::{CaptureBackend, FfmpegCaptureProvider};
pub use config::XdgConfigStore;
pub use delivery::DownloadDirSink;
pub use devices::SystemDeviceEnumerator;
pub use notification::{create_notifier, NoOpNotifier, NotifyRustNotifier};
pub use recording::FfmpegEncoder;
