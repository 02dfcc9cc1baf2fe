//! Daemon app runner

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::application::ports::{ArtifactSink, CaptureProvider, MediaEncoder};
use crate::application::{RecordingController, SessionEvent};
use crate::domain::session::SessionStatus;
use crate::infrastructure::SystemDeviceEnumerator;

use super::app::{build_controller, build_feedback, check_devices, EXIT_ERROR, EXIT_SUCCESS};
use super::args::RecordOptions;
use super::ipc::{create_ipc_server, StatusFn};
use super::pid_file::{PidFile, PidFileError};
use super::presenter::Presenter;
use super::signals::{DaemonSignal, DaemonSignalHandler};

/// How long shutdown waits for an in-flight recording to be saved
const SHUTDOWN_SAVE_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Run daemon mode
pub async fn run_daemon(options: RecordOptions) -> ExitCode {
    let presenter = Presenter::new();

    let pid_file = PidFile::new();
    if let Err(e) = pid_file.acquire() {
        match e {
            PidFileError::AlreadyRunning(pid) => {
                presenter.error(&format!("Another daemon is already running (PID: {})", pid));
            }
            _ => {
                presenter.error(&e.to_string());
            }
        }
        return ExitCode::from(EXIT_ERROR);
    }

    let controller = build_controller(&options);
    let _feedback = build_feedback(&options).spawn(controller.subscribe());
    check_devices(&controller, &SystemDeviceEnumerator::new(), &presenter).await;

    // Returns handler + sender for the IPC server
    let (mut signals, signal_tx) = match DaemonSignalHandler::new().await {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut server = create_ipc_server();
    if let Err(e) = server.bind() {
        presenter.error(&format!("Failed to bind socket: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }
    let endpoint = server.path();

    let status_controller = controller.clone();
    let status_fn: StatusFn = Arc::new(move || {
        serde_json::to_string(&status_controller.snapshot())
            .unwrap_or_else(|e| format!("error: {}", e))
    });
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.run(signal_tx, status_fn).await {
            warn!(error = %e, "IPC server stopped");
        }
        server.cleanup();
    });

    presenter.daemon_status("Started, waiting for commands...");
    presenter.info(&format!(
        "PID: {} | Socket: {} | SIGINT: exit",
        std::process::id(),
        endpoint
    ));

    let events = controller.subscribe();
    let result = daemon_loop(&controller, &mut signals, events, &presenter).await;

    // Dropping the task drops the server, which removes the socket file
    server_task.abort();
    let _ = server_task.await;
    let _ = pid_file.release();

    if result {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

async fn daemon_loop<P, E, S>(
    controller: &RecordingController<P, E, S>,
    signals: &mut DaemonSignalHandler,
    mut events: broadcast::Receiver<SessionEvent>,
    presenter: &Presenter,
) -> bool
where
    P: CaptureProvider + 'static,
    E: MediaEncoder + 'static,
    S: ArtifactSink + 'static,
{
    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Some(DaemonSignal::Shutdown) => {
                    presenter.info("Processing shutdown");
                    if controller.status() == SessionStatus::Recording {
                        stop(controller, presenter).await;
                    }
                    // A stopped session may still be writing its file
                    if controller.snapshot().session.is_some()
                        && timeout(SHUTDOWN_SAVE_TIMEOUT, controller.settled()).await.is_err()
                    {
                        presenter.warn("Timed out waiting for the recording to be saved");
                    }
                    presenter.daemon_status("Shutting down...");
                    return true;
                }
                Some(signal) => handle_signal(controller, signal, presenter).await,
                // Channel closed
                None => return false,
            },
            event = events.recv() => match event {
                Ok(event) => report_event(controller, &event, presenter).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Daemon lagged behind session events");
                }
                Err(RecvError::Closed) => return false,
            },
        }
    }
}

async fn handle_signal<P, E, S>(
    controller: &RecordingController<P, E, S>,
    signal: DaemonSignal,
    presenter: &Presenter,
)
where
    P: CaptureProvider + 'static,
    E: MediaEncoder + 'static,
    S: ArtifactSink + 'static,
{
    info!(?signal, status = %controller.status(), "Daemon command");
    match signal {
        DaemonSignal::Start => start(controller, presenter).await,
        DaemonSignal::Stop => stop(controller, presenter).await,
        DaemonSignal::Toggle => match controller.status() {
            SessionStatus::Idle => start(controller, presenter).await,
            SessionStatus::Recording => stop(controller, presenter).await,
        },
        DaemonSignal::Camera => {
            let on = controller.toggle_camera();
            presenter.info(&format!(
                "Camera {} for the next recording",
                if on { "on" } else { "off" }
            ));
        }
        DaemonSignal::Mic => {
            let on = controller.toggle_mic();
            presenter.info(&format!(
                "Microphone {} for the next recording",
                if on { "on" } else { "off" }
            ));
        }
        DaemonSignal::Shutdown => {}
    }
}

async fn start<P, E, S>(
    controller: &RecordingController<P, E, S>,
    presenter: &Presenter,
)
where
    P: CaptureProvider + 'static,
    E: MediaEncoder + 'static,
    S: ArtifactSink + 'static,
{
    match controller.start().await {
        Ok(started) => {
            let mut inputs = vec!["screen"];
            if started.audio {
                inputs.push("mic");
            }
            if started.camera {
                inputs.push("camera");
            }
            presenter.daemon_status(&format!("Recording ({})...", inputs.join(" + ")));
        }
        Err(e) => presenter.error(&format!("Failed to start recording: {}", e)),
    }
}

async fn stop<P, E, S>(
    controller: &RecordingController<P, E, S>,
    presenter: &Presenter,
)
where
    P: CaptureProvider + 'static,
    E: MediaEncoder + 'static,
    S: ArtifactSink + 'static,
{
    if controller.status() != SessionStatus::Recording {
        presenter.warn("Not recording, nothing to stop");
        return;
    }
    match controller.stop().await {
        Ok(()) => presenter.daemon_status("Saving..."),
        Err(e) => presenter.error(&format!("Failed to stop recording: {}", e)),
    }
}

async fn report_event<P, E, S>(
    controller: &RecordingController<P, E, S>,
    event: &SessionEvent,
    presenter: &Presenter,
)
where
    P: CaptureProvider + 'static,
    E: MediaEncoder + 'static,
    S: ArtifactSink + 'static,
{
    match event {
        SessionEvent::Tick { .. } => {
            if controller.limit_reached() {
                presenter.warn("Max duration reached, auto-stopping");
                stop(controller, presenter).await;
            }
        }
        SessionEvent::CameraUnavailable { reason } => {
            presenter.warn(&format!("Camera unavailable: {}", reason));
        }
        SessionEvent::EncoderFailed { reason, .. } => {
            presenter.warn(&format!("Encoder error: {}", reason));
        }
        SessionEvent::Saved { receipt, .. } => {
            presenter.output(&receipt.path.to_string_lossy());
        }
        SessionEvent::DeliveryFailed { reason, .. } => {
            presenter.error(&format!("Recording could not be saved: {}", reason));
        }
        SessionEvent::Ended { .. } => presenter.daemon_status("Idle"),
        SessionEvent::Started(_) | SessionEvent::CaptureFailed { .. } => {}
    }
}
