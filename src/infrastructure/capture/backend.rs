//! Platform capture backends understood by ffmpeg

use std::env;
use std::fmt;

/// Input devices ffmpeg reads from on each platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureBackend {
    /// X11 screen grab, PulseAudio microphone, V4L2 camera
    X11Grab,
    /// macOS AVFoundation for screen, microphone and camera
    AvFoundation,
    /// Windows GDI screen grab, DirectShow microphone and camera
    GdiGrab,
}

impl CaptureBackend {
    /// Backend for the platform this binary was built for
    pub const fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Self::AvFoundation
        } else if cfg!(target_os = "windows") {
            Self::GdiGrab
        } else {
            Self::X11Grab
        }
    }

    /// ffmpeg `-f` value for the display input
    pub const fn video_format(&self) -> &'static str {
        match self {
            Self::X11Grab => "x11grab",
            Self::AvFoundation => "avfoundation",
            Self::GdiGrab => "gdigrab",
        }
    }

    /// ffmpeg `-f` value for the microphone input
    pub const fn audio_format(&self) -> &'static str {
        match self {
            Self::X11Grab => "pulse",
            Self::AvFoundation => "avfoundation",
            Self::GdiGrab => "dshow",
        }
    }

    /// ffmpeg `-f` value for the camera input
    pub const fn camera_format(&self) -> &'static str {
        match self {
            Self::X11Grab => "v4l2",
            Self::AvFoundation => "avfoundation",
            Self::GdiGrab => "dshow",
        }
    }

    /// Demuxer option that renders the pointer into the display input
    pub const fn cursor_option(&self) -> &'static str {
        match self {
            Self::AvFoundation => "-capture_cursor",
            Self::X11Grab | Self::GdiGrab => "-draw_mouse",
        }
    }

    /// Display input, or None when no display can be reached
    pub fn display_input(&self, configured: Option<&str>) -> Option<String> {
        if let Some(display) = configured.filter(|d| !d.trim().is_empty()) {
            return Some(display.to_string());
        }
        match self {
            Self::X11Grab => env::var("DISPLAY").ok().filter(|d| !d.is_empty()),
            Self::AvFoundation => Some("1:none".to_string()),
            Self::GdiGrab => Some("desktop".to_string()),
        }
    }

    pub fn audio_input(&self, configured: Option<&str>) -> String {
        match (self, configured) {
            (Self::X11Grab, source) => source.unwrap_or("default").to_string(),
            (Self::AvFoundation, source) => format!("none:{}", source.unwrap_or("0")),
            (Self::GdiGrab, Some(source)) => format!("audio={}", source),
            (Self::GdiGrab, None) => "audio=Microphone".to_string(),
        }
    }

    pub fn camera_input(&self, configured: Option<&str>) -> String {
        match (self, configured) {
            (Self::X11Grab, device) => device.unwrap_or("/dev/video0").to_string(),
            (Self::AvFoundation, device) => format!("{}:none", device.unwrap_or("0")),
            (Self::GdiGrab, Some(device)) => format!("video={}", device),
            (Self::GdiGrab, None) => "video=Integrated Camera".to_string(),
        }
    }

    /// Whether the camera input is a filesystem node that can be checked
    pub const fn camera_is_device_node(&self) -> bool {
        matches!(self, Self::X11Grab)
    }
}

impl fmt::Display for CaptureBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.video_format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_display_wins() {
        let backend = CaptureBackend::X11Grab;
        assert_eq!(backend.display_input(Some(":1.0")).as_deref(), Some(":1.0"));
    }

    #[test]
    fn blank_display_is_ignored() {
        let backend = CaptureBackend::GdiGrab;
        assert_eq!(backend.display_input(Some("  ")).as_deref(), Some("desktop"));
    }

    #[test]
    fn x11_inputs() {
        let backend = CaptureBackend::X11Grab;
        assert_eq!(backend.audio_input(None), "default");
        assert_eq!(backend.camera_input(None), "/dev/video0");
        assert_eq!(backend.camera_input(Some("/dev/video2")), "/dev/video2");
        assert_eq!(backend.cursor_option(), "-draw_mouse");
        assert!(backend.camera_is_device_node());
    }

    #[test]
    fn avfoundation_inputs() {
        let backend = CaptureBackend::AvFoundation;
        assert_eq!(backend.audio_input(None), "none:0");
        assert_eq!(backend.camera_input(Some("1")), "1:none");
        assert_eq!(backend.cursor_option(), "-capture_cursor");
    }

    #[test]
    fn dshow_inputs() {
        let backend = CaptureBackend::GdiGrab;
        assert_eq!(backend.audio_input(Some("Headset")), "audio=Headset");
        assert_eq!(backend.camera_format(), "dshow");
    }
}
