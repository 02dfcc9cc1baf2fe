//! Devices command handler

use crate::application::ports::{DeviceEnumerator, DeviceError};
use crate::domain::media::{DeviceKind, InputDevice, MediaDeviceState};

use super::presenter::Presenter;

/// List input devices and the capability flags they imply
pub async fn handle_devices_command<D>(enumerator: &D, presenter: &Presenter) -> Result<(), DeviceError>
where
    D: DeviceEnumerator + ?Sized,
{
    let devices = enumerator.enumerate().await?;

    if devices.is_empty() {
        presenter.warn("No input devices found");
    }
    for line in device_lines(&devices) {
        presenter.output(&line);
    }

    let mut media = MediaDeviceState::default();
    media.apply_inventory(&devices);
    presenter.media_summary(&media);
    Ok(())
}

fn device_lines(devices: &[InputDevice]) -> Vec<String> {
    devices
        .iter()
        .map(|device| {
            let kind = match device.kind {
                DeviceKind::VideoInput => "camera",
                DeviceKind::AudioInput => "microphone",
            };
            format!("{:<10} {}", kind, device.label)
        })
        .collect()
}
