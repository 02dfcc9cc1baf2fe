//! Recording infrastructure module
//!
//! Provides the ffmpeg encoder that turns a display stream into container
//! chunks.

mod ffmpeg;

pub use ffmpeg::FfmpegEncoder;
