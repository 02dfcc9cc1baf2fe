//! FFmpeg-based capture provider adapter

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::debug;

use super::backend::CaptureBackend;
use crate::application::ports::{CameraRequest, CaptureError, CaptureProvider, DisplayRequest};
use crate::domain::media::{MediaStream, MediaTrack, TrackKind};

/// Time an ffplay preview must survive before the camera counts as granted
const PREVIEW_GRACE: Duration = Duration::from_millis(300);

const PREVIEW_TITLE: &str = "vibecam camera";

/// Capture provider that describes ffmpeg inputs and runs the camera preview
pub struct FfmpegCaptureProvider {
    backend: CaptureBackend,
    display: Option<String>,
    audio_source: Option<String>,
}

impl FfmpegCaptureProvider {
    pub fn new(backend: CaptureBackend) -> Self {
        Self {
            backend,
            display: None,
            audio_source: None,
        }
    }

    /// Override the display input (e.g. `:1.0`)
    pub fn with_display(mut self, display: Option<String>) -> Self {
        self.display = display;
        self
    }

    /// Override the microphone source
    pub fn with_audio_source(mut self, source: Option<String>) -> Self {
        self.audio_source = source;
        self
    }

    pub fn backend(&self) -> CaptureBackend {
        self.backend
    }

    /// Check that an executable is on PATH
    async fn probe(binary: &str) -> Result<(), CaptureError> {
        let status = Command::new(binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CaptureError::Unavailable(format!("{} not found. Please install FFmpeg", binary))
                } else {
                    CaptureError::Unavailable(e.to_string())
                }
            })?;

        if !status.success() {
            return Err(CaptureError::Unavailable(format!(
                "{} -version exited with {}",
                binary, status
            )));
        }
        Ok(())
    }

    fn preview_args(&self, input: &str) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            self.backend.camera_format().to_string(),
            "-i".to_string(),
            input.to_string(),
            "-an".to_string(),
            "-window_title".to_string(),
            PREVIEW_TITLE.to_string(),
            "-x".to_string(),
            "320".to_string(),
            "-y".to_string(),
            "240".to_string(),
            "-noborder".to_string(),
            "-alwaysontop".to_string(),
        ]
    }

    fn spawn_preview(&self, input: &str) -> Result<Child, CaptureError> {
        let mut command = Command::new("ffplay");
        command
            .args(self.preview_args(input))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CaptureError::Unavailable("ffplay not found. Please install FFmpeg".to_string())
            } else {
                CaptureError::Unavailable(e.to_string())
            }
        })
    }
}

/// Camera track owning the preview process; stopping the track kills it.
///
/// The runtime reaps the killed child, so release never blocks.
fn preview_track(input: String, mut child: Child) -> MediaTrack {
    MediaTrack::new(TrackKind::Video, "Camera", input).with_release(move || {
        let _ = child.start_kill();
    })
}

impl Default for FfmpegCaptureProvider {
    fn default() -> Self {
        Self::new(CaptureBackend::detect())
    }
}

#[async_trait]
impl CaptureProvider for FfmpegCaptureProvider {
    async fn request_display(&self, request: &DisplayRequest) -> Result<MediaStream, CaptureError> {
        let display = self
            .backend
            .display_input(self.display.as_deref())
            .ok_or_else(|| CaptureError::Denied("no display server reachable".to_string()))?;

        Self::probe("ffmpeg").await?;

        let label = if request.cursor.is_visible() {
            "Screen"
        } else {
            "Screen (no cursor)"
        };
        let mut tracks = vec![MediaTrack::new(TrackKind::Video, label, display)];
        if request.audio {
            let source = self.backend.audio_input(self.audio_source.as_deref());
            tracks.push(MediaTrack::new(TrackKind::Audio, "Microphone", source));
        }

        debug!(backend = %self.backend, tracks = tracks.len(), "Display capture granted");
        Ok(MediaStream::new(tracks))
    }

    async fn request_camera(&self, request: &CameraRequest) -> Result<MediaStream, CaptureError> {
        let input = self.backend.camera_input(request.device.as_deref());
        if self.backend.camera_is_device_node() && !Path::new(&input).exists() {
            return Err(CaptureError::NotFound(input));
        }

        let mut child = self.spawn_preview(&input)?;
        tokio::time::sleep(PREVIEW_GRACE).await;
        match child.try_wait() {
            Ok(Some(status)) => {
                return Err(CaptureError::Unavailable(format!(
                    "camera preview exited with {}",
                    status
                )));
            }
            Ok(None) => {}
            Err(e) => {
                // Dropping the child kills it
                return Err(CaptureError::Unavailable(e.to_string()));
            }
        }

        debug!(device = %input, "Camera preview running");
        let track = preview_track(input, child);
        Ok(MediaStream::new(vec![track]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_video_only() {
        let provider = FfmpegCaptureProvider::new(CaptureBackend::X11Grab);
        let args = provider.preview_args("/dev/video0");
        assert!(args.contains(&"-an".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "-f" && w[1] == "v4l2"));
        assert!(args.windows(2).any(|w| w[0] == "-i" && w[1] == "/dev/video0"));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn stopping_the_camera_track_kills_the_preview() {
        let child = Command::new("sleep")
            .arg("30")
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let pid = child.id().unwrap();
        let track = preview_track("/dev/video0".to_string(), child);

        track.stop();
        assert!(!track.is_live());

        // Gone or a zombie awaiting the reaper
        let stat = format!("/proc/{}/stat", pid);
        let mut exited = false;
        for _ in 0..100 {
            exited = match std::fs::read_to_string(&stat) {
                Err(_) => true,
                Ok(line) => line
                    .rsplit(')')
                    .next()
                    .is_some_and(|rest| rest.trim_start().starts_with(['Z', 'X'])),
            };
            if exited {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(exited);
    }

    #[tokio::test]
    async fn missing_camera_node_is_not_found() {
        let provider = FfmpegCaptureProvider::new(CaptureBackend::X11Grab);
        let request = CameraRequest {
            device: Some("/dev/vibecam-test-missing".to_string()),
        };
        let err = provider.request_camera(&request).await.unwrap_err();
        assert!(matches!(err, CaptureError::NotFound(_)));
    }

    #[tokio::test]
    async fn unreachable_display_is_denied() {
        let provider = FfmpegCaptureProvider::new(CaptureBackend::X11Grab).with_display(None);
        // Only meaningful when no X server is advertised
        if std::env::var("DISPLAY").map(|d| d.is_empty()).unwrap_or(true) {
            let err = provider
                .request_display(&DisplayRequest::with_audio(false))
                .await
                .unwrap_err();
            assert!(matches!(err, CaptureError::Denied(_)));
        }
    }
}
