//! Capture device and stream domain

mod device_state;
mod stream;

pub use device_state::{DeviceKind, InputDevice, MediaDeviceState};
pub use stream::{MediaStream, MediaTrack, TrackKind};
