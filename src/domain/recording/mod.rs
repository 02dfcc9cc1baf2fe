//! Recording output and timing value objects

mod artifact;
mod duration;
mod timer;

pub use artifact::{format_size, Artifact, ContainerFormat, OutputBuffer, DEFAULT_FILE_PREFIX};
pub use duration::Duration;
pub use timer::{format_clock, RecordingTimer};
