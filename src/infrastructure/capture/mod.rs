//! Capture infrastructure module
//!
//! Display capture is described to ffmpeg per platform; the camera is shown
//! as a picture-in-picture preview window through ffplay.

mod backend;
mod ffmpeg;

pub use backend::CaptureBackend;
pub use ffmpeg::FfmpegCaptureProvider;
