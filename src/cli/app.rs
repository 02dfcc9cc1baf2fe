//! Main app runner for interactive record mode

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::application::ports::{ConfigStore, DeviceEnumerator};
use crate::application::{ControllerConfig, RecordingController, SessionEvent};
use crate::domain::config::AppConfig;
use crate::domain::error::DurationParseError;
use crate::domain::recording::{format_size, Duration};
use crate::infrastructure::{
    create_audio_cue, create_notifier, CaptureBackend, DownloadDirSink, FfmpegCaptureProvider,
    FfmpegEncoder, SystemDeviceEnumerator, XdgConfigStore,
};

use super::args::RecordOptions;
use super::feedback::Feedback;
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Upper bound on waiting for the last feedback after saving
const FEEDBACK_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

/// Environment override for the output directory
pub const OUTPUT_DIR_ENV: &str = "VIBECAM_OUTPUT_DIR";

/// Controller wired to the host adapters
pub type AppController = RecordingController<FfmpegCaptureProvider, FfmpegEncoder, DownloadDirSink>;

/// Wire the controller and its adapters for the given options
pub fn build_controller(options: &RecordOptions) -> AppController {
    let backend = CaptureBackend::detect();
    let capture = FfmpegCaptureProvider::new(backend)
        .with_display(options.display.clone())
        .with_audio_source(options.audio_source.clone());
    let encoder = FfmpegEncoder::new(backend);
    let sink = DownloadDirSink::new(options.output_dir.as_ref().map(PathBuf::from));

    let config = ControllerConfig {
        camera: options.camera,
        microphone: options.microphone,
        camera_device: options.camera_device.clone(),
        file_prefix: options.file_prefix.clone(),
        container: options.container,
        framerate: options.framerate,
        max_duration: options.max_duration,
    };
    RecordingController::new(capture, encoder, sink, config)
}

/// Feedback adapters for the given options
pub fn build_feedback(options: &RecordOptions) -> Feedback {
    Feedback::new(
        create_notifier(options.notify),
        create_audio_cue(options.audio_cues),
    )
}

/// Report capability gaps found by device enumeration
pub async fn check_devices<D>(controller: &AppController, enumerator: &D, presenter: &Presenter)
where
    D: DeviceEnumerator + ?Sized,
{
    let media = controller.refresh_devices(enumerator).await;
    if media.is_camera_on && !media.has_camera {
        presenter.warn("No camera detected; the preview may not start");
    }
    if media.is_mic_on && !media.has_mic {
        presenter.warn("No microphone detected; audio capture may fail");
    }
}

/// How an interactive recording ended
#[derive(Debug, Default)]
struct Outcome {
    saved: Option<PathBuf>,
    size: usize,
    failure: Option<String>,
    ended: bool,
}

impl Outcome {
    fn record(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Saved { receipt, .. } => {
                self.saved = Some(receipt.path.clone());
                self.size = receipt.size;
            }
            SessionEvent::DeliveryFailed { reason, .. } => {
                self.failure = Some(reason.clone());
            }
            SessionEvent::Ended { .. } => self.ended = true,
            _ => {}
        }
    }
}

/// Run one interactive recording until Ctrl+C, SIGTERM or the max duration
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let shutdown = ShutdownSignal::new();
    if let Err(e) = shutdown.setup().await {
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let controller = build_controller(&options);
    let feedback = build_feedback(&options).spawn(controller.subscribe());
    let mut events = controller.subscribe();

    check_devices(&controller, &SystemDeviceEnumerator::new(), &presenter).await;

    let started = match controller.start().await {
        Ok(started) => started,
        Err(e) => {
            presenter.error(&format!("Failed to start recording: {}", e));
            drop(controller);
            let _ = tokio::time::timeout(FEEDBACK_GRACE, feedback).await;
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.show_recording_overlay(started.camera, started.audio);
    presenter.info("Press Ctrl+C to stop");

    let mut outcome = Outcome::default();
    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    match &event {
                        SessionEvent::Tick { elapsed_secs, .. } => {
                            presenter.update_recording_overlay(
                                *elapsed_secs,
                                started.camera,
                                started.audio,
                            );
                            if controller.limit_reached() {
                                presenter.warn("Max duration reached, stopping");
                                break;
                            }
                        }
                        SessionEvent::CameraUnavailable { reason } => {
                            presenter.warn(&format!("Camera unavailable: {}", reason));
                        }
                        SessionEvent::EncoderFailed { reason, .. } => {
                            presenter.warn(&format!("Encoder error: {}", reason));
                        }
                        _ => {}
                    }
                    outcome.record(&event);
                    if outcome.ended {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
        }
    }

    presenter.update_spinner("Saving recording...");
    if !outcome.ended {
        if let Err(e) = controller.stop().await {
            presenter.spinner_fail(&format!("Failed to stop recording: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
        controller.settled().await;
    }

    // Saved/DeliveryFailed are emitted before the session settles
    loop {
        match events.try_recv() {
            Ok(event) => outcome.record(&event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }

    let code = match (outcome.saved, outcome.failure) {
        (Some(path), _) => {
            presenter.spinner_success(&format!(
                "Recording saved ({})",
                format_size(outcome.size)
            ));
            presenter.output(&path.to_string_lossy());
            EXIT_SUCCESS
        }
        (None, Some(reason)) => {
            presenter.spinner_fail(&format!("Recording could not be saved: {}", reason));
            EXIT_ERROR
        }
        (None, None) => {
            presenter.spinner_fail("Recording ended without output");
            EXIT_ERROR
        }
    };

    // Let the final chime and notification go out
    drop(controller);
    let _ = tokio::time::timeout(FEEDBACK_GRACE, feedback).await;
    ExitCode::from(code)
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    let env_config = AppConfig {
        output_dir: env::var(OUTPUT_DIR_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// Resolve the merged config into run options
pub fn resolve_options(config: &AppConfig) -> Result<RecordOptions, DurationParseError> {
    // A malformed max_duration is a usage error rather than "unlimited"
    let max_duration = match config.max_duration.as_deref() {
        Some(s) => Some(s.parse::<Duration>()?),
        None => None,
    };

    Ok(RecordOptions {
        camera: config.camera_or_default(),
        microphone: config.microphone_or_default(),
        output_dir: config.output_dir.clone(),
        file_prefix: config.file_prefix_or_default().to_string(),
        container: config.container_or_default(),
        max_duration,
        notify: config.notify_or_default(),
        audio_cues: config.audio_cues_or_default(),
        display: config.display().map(str::to_string),
        audio_source: config.audio_source().map(str::to_string),
        camera_device: config.camera_device().map(str::to_string),
        framerate: config.framerate_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::CaptureConfig;
    use crate::domain::recording::ContainerFormat;

    #[test]
    fn resolves_defaults() {
        let options = resolve_options(&AppConfig::defaults()).unwrap();
        assert!(!options.camera);
        assert!(options.microphone);
        assert_eq!(options.container, ContainerFormat::Webm);
        assert_eq!(options.file_prefix, "vibecam-recording");
        assert_eq!(options.framerate, 30);
        assert!(options.max_duration.is_none());
    }

    #[test]
    fn resolves_capture_section() {
        let config = AppConfig {
            capture: Some(CaptureConfig {
                display: Some(":1.0".to_string()),
                camera_device: Some("/dev/video2".to_string()),
                ..Default::default()
            }),
            max_duration: Some("90s".to_string()),
            ..AppConfig::defaults()
        };
        let options = resolve_options(&config).unwrap();
        assert_eq!(options.display.as_deref(), Some(":1.0"));
        assert_eq!(options.camera_device.as_deref(), Some("/dev/video2"));
        assert_eq!(options.max_duration.map(|d| d.as_secs()), Some(90));
    }

    #[test]
    fn malformed_max_duration_is_rejected() {
        let config = AppConfig {
            max_duration: Some("soon".to_string()),
            ..AppConfig::defaults()
        };
        assert!(resolve_options(&config).is_err());
    }

    #[test]
    fn outcome_tracks_saved_and_ended() {
        use crate::application::ports::DeliveryReceipt;
        use crate::domain::session::SessionId;

        let mut outcome = Outcome::default();
        outcome.record(&SessionEvent::Saved {
            id: SessionId::new(1),
            file_name: "a.webm".to_string(),
            receipt: DeliveryReceipt {
                path: PathBuf::from("/tmp/a.webm"),
                size: 2048,
            },
        });
        outcome.record(&SessionEvent::Ended { id: SessionId::new(1) });
        assert_eq!(outcome.saved, Some(PathBuf::from("/tmp/a.webm")));
        assert!(outcome.ended);
        assert!(outcome.failure.is_none());
    }
}
