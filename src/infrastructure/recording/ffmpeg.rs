//! FFmpeg-based encoder adapter
//!
//! Encodes the display stream to VP8/Opus and streams the container bytes
//! from ffmpeg's stdout as encoder chunks.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use tracing::debug;

use crate::application::ports::{
    EncoderControl, EncoderError, EncoderEvent, EncoderOptions, EncoderSession, MediaEncoder,
};
use crate::domain::media::MediaStream;
use crate::infrastructure::capture::CaptureBackend;

/// Read size for ffmpeg's stdout
const CHUNK_SIZE: usize = 64 * 1024;

const VIDEO_BITRATE: &str = "2M";

/// FFmpeg encoder factory
pub struct FfmpegEncoder {
    backend: CaptureBackend,
}

impl FfmpegEncoder {
    pub fn new(backend: CaptureBackend) -> Self {
        Self { backend }
    }

    /// Build FFmpeg args for encoding the given display stream to stdout
    fn build_ffmpeg_args(
        &self,
        stream: &MediaStream,
        options: &EncoderOptions,
    ) -> Result<Vec<String>, EncoderError> {
        let video = stream
            .video_track()
            .ok_or_else(|| EncoderError::StartFailed("stream has no video track".to_string()))?;

        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-nostats".to_string(),
            // Video input
            "-f".to_string(),
            self.backend.video_format().to_string(),
            self.backend.cursor_option().to_string(),
            "1".to_string(),
            "-framerate".to_string(),
            options.framerate.to_string(),
            "-i".to_string(),
            video.source().to_string(),
        ];

        let audio = stream.audio_track();
        if let Some(audio) = audio {
            args.extend([
                "-f".to_string(),
                self.backend.audio_format().to_string(),
                "-i".to_string(),
                audio.source().to_string(),
            ]);
        }

        // VP8 tuned for live capture
        args.extend([
            "-c:v".to_string(),
            "libvpx".to_string(),
            "-deadline".to_string(),
            "realtime".to_string(),
            "-cpu-used".to_string(),
            "8".to_string(),
            "-b:v".to_string(),
            VIDEO_BITRATE.to_string(),
        ]);

        if audio.is_some() {
            args.extend([
                "-c:a".to_string(),
                "libopus".to_string(),
                "-b:a".to_string(),
                "128k".to_string(),
            ]);
        } else {
            args.push("-an".to_string());
        }

        args.extend([
            "-f".to_string(),
            options.container.muxer().to_string(),
            "pipe:1".to_string(),
        ]);

        Ok(args)
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new(CaptureBackend::detect())
    }
}

#[async_trait]
impl MediaEncoder for FfmpegEncoder {
    async fn open(
        &self,
        stream: &MediaStream,
        options: &EncoderOptions,
    ) -> Result<EncoderSession, EncoderError> {
        let args = self.build_ffmpeg_args(stream, options)?;
        let (sender, events) = EncoderSession::channel();
        let control = FfmpegEncoderControl {
            args,
            sender: Mutex::new(Some(sender)),
            pid: Mutex::new(None),
            stdin: tokio::sync::Mutex::new(None),
            active: Arc::new(AtomicBool::new(false)),
            finalizing: Arc::new(AtomicBool::new(false)),
        };
        Ok(EncoderSession {
            control: Arc::new(control),
            events,
        })
    }
}

/// Control handle for one ffmpeg process
struct FfmpegEncoderControl {
    args: Vec<String>,
    /// Taken on start so the process is spawned once
    sender: Mutex<Option<mpsc::Sender<EncoderEvent>>>,
    pid: Mutex<Option<u32>>,
    stdin: tokio::sync::Mutex<Option<ChildStdin>>,
    active: Arc<AtomicBool>,
    finalizing: Arc<AtomicBool>,
}

impl FfmpegEncoderControl {
    fn spawn_ffmpeg(&self) -> Result<Child, EncoderError> {
        let mut command = Command::new("ffmpeg");
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Keep terminal Ctrl+C away from ffmpeg; stopping goes through finalize()
        #[cfg(unix)]
        command.process_group(0);
        command
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EncoderError::FfmpegNotFound
                } else {
                    EncoderError::StartFailed(e.to_string())
                }
            })
    }

    /// Send SIGINT for graceful stop (FFmpeg writes the trailer)
    #[cfg(unix)]
    async fn request_quit(&self) -> Result<(), EncoderError> {
        let pid = *self.pid.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(id) = pid {
            signal::kill(Pid::from_raw(id as i32), Signal::SIGINT)
                .map_err(|e| EncoderError::FinalizeFailed(format!("Signal failed: {}", e)))?;
        }
        Ok(())
    }

    /// Ask ffmpeg to quit through its interactive `q` command
    #[cfg(not(unix))]
    async fn request_quit(&self) -> Result<(), EncoderError> {
        let mut stdin = self.stdin.lock().await;
        if let Some(pipe) = stdin.as_mut() {
            pipe.write_all(b"q")
                .await
                .map_err(|e| EncoderError::FinalizeFailed(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl EncoderControl for FfmpegEncoderControl {
    async fn start(&self) -> Result<(), EncoderError> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| EncoderError::StartFailed("encoder already started".to_string()))?;

        let mut child = self.spawn_ffmpeg()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EncoderError::StartFailed("ffmpeg stdout not captured".to_string()))?;
        let stderr = child.stderr.take();

        *self.stdin.lock().await = child.stdin.take();
        *self.pid.lock().unwrap_or_else(|e| e.into_inner()) = child.id();
        self.active.store(true, Ordering::SeqCst);
        debug!(pid = ?child.id(), "ffmpeg encoder started");

        tokio::spawn(forward_output(
            child,
            stdout,
            stderr,
            sender,
            Arc::clone(&self.active),
            Arc::clone(&self.finalizing),
        ));
        Ok(())
    }

    async fn finalize(&self) -> Result<(), EncoderError> {
        if !self.is_active() || self.finalizing.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.request_quit().await?;
        // Closing stdin also ends ffmpeg's interactive reader
        if let Some(mut pipe) = self.stdin.lock().await.take() {
            let _ = pipe.shutdown().await;
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Stream stdout chunks until ffmpeg exits, then report completion
async fn forward_output(
    mut child: Child,
    mut stdout: ChildStdout,
    stderr: Option<ChildStderr>,
    events: mpsc::Sender<EncoderEvent>,
    active: Arc<AtomicBool>,
    finalizing: Arc<AtomicBool>,
) {
    // ffmpeg blocks if its stderr pipe fills up, so drain it alongside
    let stderr_tail = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_end(&mut buf).await;
        }
        let text = String::from_utf8_lossy(&buf);
        text.lines().last().unwrap_or("unknown error").to_string()
    });

    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if events.send(EncoderEvent::Data(buf[..n].to_vec())).await.is_err() {
                    // Nobody is listening anymore
                    let _ = child.start_kill();
                    break;
                }
            }
            Err(e) => {
                let _ = events
                    .send(EncoderEvent::Error(EncoderError::EncodingFailed(e.to_string())))
                    .await;
                let _ = child.start_kill();
                break;
            }
        }
    }

    let status = child.wait().await;
    let tail = stderr_tail.await.unwrap_or_default();
    match status {
        // SIGINT makes ffmpeg exit non-zero after a clean trailer
        Ok(status) if status.success() || finalizing.load(Ordering::SeqCst) => {
            debug!(%status, "ffmpeg encoder exited");
        }
        Ok(status) => {
            let _ = events
                .send(EncoderEvent::Error(EncoderError::EncodingFailed(format!(
                    "FFmpeg exited with {}: {}",
                    status, tail
                ))))
                .await;
        }
        Err(e) => {
            let _ = events
                .send(EncoderEvent::Error(EncoderError::EncodingFailed(format!(
                    "FFmpeg failed: {}",
                    e
                ))))
                .await;
        }
    }

    active.store(false, Ordering::SeqCst);
    let _ = events.send(EncoderEvent::Stopped).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::{MediaTrack, TrackKind};
    use crate::domain::recording::ContainerFormat;

    fn screen(with_audio: bool) -> MediaStream {
        let mut tracks = vec![MediaTrack::new(TrackKind::Video, "Screen", ":0.0")];
        if with_audio {
            tracks.push(MediaTrack::new(TrackKind::Audio, "Microphone", "default"));
        }
        MediaStream::new(tracks)
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn display_only_args() {
        let encoder = FfmpegEncoder::new(CaptureBackend::X11Grab);
        let args = encoder
            .build_ffmpeg_args(&screen(false), &EncoderOptions::default())
            .unwrap();

        assert!(has_pair(&args, "-f", "x11grab"));
        assert!(has_pair(&args, "-draw_mouse", "1"));
        assert!(has_pair(&args, "-i", ":0.0"));
        assert!(has_pair(&args, "-c:v", "libvpx"));
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"libopus".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
        assert!(has_pair(&args, "-f", "webm"));
    }

    #[test]
    fn microphone_track_adds_audio_input() {
        let encoder = FfmpegEncoder::new(CaptureBackend::X11Grab);
        let args = encoder
            .build_ffmpeg_args(&screen(true), &EncoderOptions::default())
            .unwrap();

        assert!(has_pair(&args, "-f", "pulse"));
        assert!(has_pair(&args, "-i", "default"));
        assert!(has_pair(&args, "-c:a", "libopus"));
        assert!(!args.contains(&"-an".to_string()));
    }

    #[test]
    fn container_and_framerate_follow_options() {
        let encoder = FfmpegEncoder::new(CaptureBackend::X11Grab);
        let options = EncoderOptions {
            container: ContainerFormat::Matroska,
            framerate: 60,
        };
        let args = encoder.build_ffmpeg_args(&screen(false), &options).unwrap();

        assert!(has_pair(&args, "-framerate", "60"));
        assert!(has_pair(&args, "-f", "matroska"));
        assert!(has_pair(&args, "-b:v", "2M"));
    }

    #[test]
    fn stream_without_video_is_rejected() {
        let encoder = FfmpegEncoder::new(CaptureBackend::X11Grab);
        let audio_only = MediaStream::new(vec![MediaTrack::new(TrackKind::Audio, "Mic", "default")]);
        let err = encoder
            .build_ffmpeg_args(&audio_only, &EncoderOptions::default())
            .unwrap_err();
        assert!(matches!(err, EncoderError::StartFailed(_)));
    }

    #[tokio::test]
    async fn finalize_before_start_is_noop() {
        let encoder = FfmpegEncoder::new(CaptureBackend::X11Grab);
        let session = encoder
            .open(&screen(false), &EncoderOptions::default())
            .await
            .unwrap();
        assert!(!session.control.is_active());
        assert!(session.control.finalize().await.is_ok());
    }
}
