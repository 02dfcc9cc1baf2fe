//! Recording session controller
//!
//! Owns the Idle/Recording state machine, the capture streams of the active
//! session, its encoder and the elapsed-time counter. Every path that ends a
//! session goes through a single teardown routine guarded by session id.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

use crate::domain::media::{MediaDeviceState, MediaStream};
use crate::domain::recording::{
    ContainerFormat, Duration, OutputBuffer, RecordingTimer, DEFAULT_FILE_PREFIX,
};
use crate::domain::session::{InvalidStateTransition, SessionId, SessionState, SessionStatus};

use super::ports::{
    ArtifactSink, CameraRequest, CaptureError, CaptureProvider, DeliveryReceipt,
    DeviceEnumerator, DisplayRequest, EncoderControl, EncoderError, EncoderEvent,
    EncoderOptions, EncoderSession, MediaEncoder,
};

const EVENT_CAPACITY: usize = 64;

/// Errors from the controller
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error("A recording is already being started")]
    StartInProgress,

    #[error("The previous recording is still being saved")]
    Finalizing,

    #[error("Display capture failed: {0}")]
    DisplayCapture(#[from] CaptureError),

    #[error("Encoder failed: {0}")]
    Encoder(#[from] EncoderError),
}

/// Configuration for the controller
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Initial camera intent
    pub camera: bool,
    /// Initial microphone intent
    pub microphone: bool,
    pub camera_device: Option<String>,
    pub file_prefix: String,
    pub container: ContainerFormat,
    pub framerate: u32,
    /// Safety limit checked by [`RecordingController::limit_reached`]
    pub max_duration: Option<Duration>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            camera: false,
            microphone: true,
            camera_device: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            container: ContainerFormat::default(),
            framerate: 30,
            max_duration: None,
        }
    }
}

/// Result of a successful `start()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStarted {
    pub id: SessionId,
    /// Camera preview is running
    pub camera: bool,
    /// Display stream carries a microphone track
    pub audio: bool,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Started(SessionStarted),
    CaptureFailed { reason: String },
    CameraUnavailable { reason: String },
    Tick { id: SessionId, elapsed_secs: u64 },
    EncoderFailed { id: SessionId, reason: String },
    Saved {
        id: SessionId,
        file_name: String,
        receipt: DeliveryReceipt,
    },
    DeliveryFailed { id: SessionId, reason: String },
    Ended { id: SessionId },
}

/// Point-in-time view of the controller, serialized for daemon clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub recording_time: u64,
    pub session: Option<SessionId>,
    pub screen_active: bool,
    pub camera_active: bool,
    pub media: MediaDeviceState,
}

struct ActiveSession {
    id: SessionId,
    screen: MediaStream,
    camera: Option<MediaStream>,
    control: Arc<dyn EncoderControl>,
    timer_task: Option<JoinHandle<()>>,
    finalizing: bool,
}

impl ActiveSession {
    fn release(mut self) {
        if let Some(task) = self.timer_task.take() {
            task.abort();
        }
        self.screen.stop_all();
        if let Some(camera) = self.camera.take() {
            camera.stop_all();
        }
    }
}

struct Shared {
    session: SessionState,
    media: MediaDeviceState,
    timer: RecordingTimer,
    acquiring: bool,
    active: Option<ActiveSession>,
    next_id: SessionId,
}

impl Shared {
    /// Halt the clock and the camera preview and report `Idle`.
    ///
    /// Returns the session and its encoder control on the first call only.
    fn wind_down(&mut self) -> Option<(SessionId, Arc<dyn EncoderControl>)> {
        let active = self.active.as_mut()?;
        if active.finalizing {
            return None;
        }
        active.finalizing = true;
        if let Some(task) = active.timer_task.take() {
            task.abort();
        }
        // The preview is not part of the output
        if let Some(camera) = active.camera.take() {
            camera.stop_all();
        }
        self.session.reset();
        Some((active.id, Arc::clone(&active.control)))
    }
}

struct Inner<P, E, S> {
    capture: P,
    encoder: E,
    sink: S,
    config: ControllerConfig,
    shared: Mutex<Shared>,
    events: broadcast::Sender<SessionEvent>,
    held: watch::Sender<bool>,
}

/// The recording session controller.
///
/// Cheap to clone; clones share the same session.
pub struct RecordingController<P, E, S> {
    inner: Arc<Inner<P, E, S>>,
}

impl<P, E, S> Clone for RecordingController<P, E, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Clears the acquiring flag however `start()` exits
struct AcquireGuard<'a> {
    shared: &'a Mutex<Shared>,
}

impl Drop for AcquireGuard<'_> {
    fn drop(&mut self) {
        self.shared
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .acquiring = false;
    }
}

impl<P, E, S> RecordingController<P, E, S>
where
    P: CaptureProvider + 'static,
    E: MediaEncoder + 'static,
    S: ArtifactSink + 'static,
{
    pub fn new(capture: P, encoder: E, sink: S, config: ControllerConfig) -> Self {
        let media = MediaDeviceState::with_intents(config.camera, config.microphone);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (held, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                capture,
                encoder,
                sink,
                config,
                shared: Mutex::new(Shared {
                    session: SessionState::new(),
                    media,
                    timer: RecordingTimer::new(),
                    acquiring: false,
                    active: None,
                    next_id: SessionId::new(1),
                }),
                events,
                held,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.inner.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Start a new recording session.
    ///
    /// Display capture is mandatory; camera capture is best effort and its
    /// failure leaves the session running display-only.
    pub async fn start(&self) -> Result<SessionStarted, ControllerError> {
        let media = {
            let mut guard = self.lock();
            let shared = &mut *guard;
            if !shared.session.is_idle() {
                return Err(InvalidStateTransition {
                    current_state: shared.session.status(),
                    action: "start recording".to_string(),
                }
                .into());
            }
            if shared.active.is_some() {
                return Err(ControllerError::Finalizing);
            }
            if shared.acquiring {
                return Err(ControllerError::StartInProgress);
            }
            shared.acquiring = true;
            shared.media
        };
        let _acquiring = AcquireGuard {
            shared: &self.inner.shared,
        };

        let display = DisplayRequest::with_audio(media.is_mic_on);
        let screen = match self.inner.capture.request_display(&display).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "Display capture failed");
                self.emit(SessionEvent::CaptureFailed {
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let camera = if media.is_camera_on {
            let request = CameraRequest {
                device: self.inner.config.camera_device.clone(),
            };
            match self.inner.capture.request_camera(&request).await {
                Ok(stream) => Some(stream),
                Err(e) => {
                    warn!(error = %e, "Camera unavailable, recording display only");
                    self.emit(SessionEvent::CameraUnavailable {
                        reason: e.to_string(),
                    });
                    None
                }
            }
        } else {
            None
        };

        let options = EncoderOptions {
            container: self.inner.config.container,
            framerate: self.inner.config.framerate,
        };
        let EncoderSession { control, events } =
            match self.inner.encoder.open(&screen, &options).await {
                Ok(session) => session,
                Err(e) => {
                    release_streams(&screen, camera.as_ref());
                    return Err(e.into());
                }
            };
        if let Err(e) = control.start().await {
            release_streams(&screen, camera.as_ref());
            return Err(e.into());
        }

        let started = {
            let mut guard = self.lock();
            let shared = &mut *guard;
            if let Err(e) = shared.session.begin_recording() {
                release_streams(&screen, camera.as_ref());
                return Err(e.into());
            }
            let id = shared.next_id;
            shared.next_id = id.next();
            shared.timer.reset();

            let started = SessionStarted {
                id,
                camera: camera.is_some(),
                audio: screen.has_audio(),
            };
            shared.active = Some(ActiveSession {
                id,
                screen,
                camera,
                control,
                timer_task: Some(self.spawn_timer(id)),
                finalizing: false,
            });
            self.inner.held.send_replace(true);
            started
        };

        self.spawn_pump(started.id, events);
        info!(
            session = %started.id,
            camera = started.camera,
            audio = started.audio,
            "Recording started"
        );
        self.emit(SessionEvent::Started(started));
        Ok(started)
    }

    /// Request the encoder to finalize.
    ///
    /// Status reads `Idle` as soon as this returns. Teardown and delivery
    /// complete later; await [`settled`](Self::settled) to observe them.
    pub async fn stop(&self) -> Result<(), ControllerError> {
        let (id, control) = {
            let mut shared = self.lock();
            let Some(active) = shared.active.as_ref() else {
                debug!("Stop requested with no active session");
                return Ok(());
            };
            if !active.control.is_active() {
                return Ok(());
            }
            match shared.wind_down() {
                Some(stopping) => stopping,
                None => return Ok(()),
            }
        };

        info!(session = %id, "Stopping recording");
        if let Err(e) = control.finalize().await {
            warn!(session = %id, error = %e, "Finalize failed, forcing teardown");
            self.end_session(id);
            return Err(e.into());
        }
        Ok(())
    }

    /// Resolve once no session resources are held
    pub async fn settled(&self) {
        let mut held = self.inner.held.subscribe();
        // The sender lives in `inner`, so this only ends when the flag clears
        let _ = held.wait_for(|held| !*held).await;
    }

    /// Tear down a session. Runs at most once per session id.
    fn end_session(&self, id: SessionId) -> bool {
        {
            let mut guard = self.lock();
            let shared = &mut *guard;
            if !shared.active.as_ref().is_some_and(|a| a.id == id) {
                return false;
            }
            if let Some(active) = shared.active.take() {
                active.release();
            }
            shared.timer.reset();
            shared.session.reset();
            self.inner.held.send_replace(false);
        }
        info!(session = %id, "Session ended");
        self.emit(SessionEvent::Ended { id });
        true
    }

    fn spawn_timer(&self, id: SessionId) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            let period = std::time::Duration::from_secs(1);
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                let elapsed_secs = {
                    let mut guard = controller.lock();
                    let shared = &mut *guard;
                    let current = shared.session.is_recording()
                        && shared.active.as_ref().is_some_and(|a| a.id == id);
                    if !current {
                        break;
                    }
                    shared.timer.tick()
                };
                debug!(session = %id, elapsed_secs, "Tick");
                controller.emit(SessionEvent::Tick { id, elapsed_secs });
            }
        })
    }

    fn spawn_pump(&self, id: SessionId, mut events: mpsc::Receiver<EncoderEvent>) {
        let controller = self.clone();
        tokio::spawn(async move {
            let mut buffer = OutputBuffer::new();
            // A closed channel counts as completion
            while let Some(event) = events.recv().await {
                match event {
                    EncoderEvent::Data(chunk) => {
                        let len = chunk.len();
                        if buffer.push(chunk) {
                            debug!(session = %id, bytes = len, "Chunk received");
                        }
                    }
                    EncoderEvent::Error(e) => {
                        warn!(session = %id, error = %e, "Encoder reported an error");
                        controller.emit(SessionEvent::EncoderFailed {
                            id,
                            reason: e.to_string(),
                        });
                    }
                    EncoderEvent::Stopped => break,
                }
            }
            controller.complete(id, buffer).await;
        });
    }

    async fn complete(&self, id: SessionId, buffer: OutputBuffer) {
        {
            let mut shared = self.lock();
            if !shared.active.as_ref().is_some_and(|a| a.id == id) {
                debug!(session = %id, "Discarding output of an ended session");
                return;
            }
            // Encoder-initiated completion looks like stop() from outside
            shared.wind_down();
        }

        let config = &self.inner.config;
        let artifact = buffer.assemble(config.container, &config.file_prefix, Utc::now());
        match self.inner.sink.deliver(&artifact).await {
            Ok(receipt) => {
                info!(
                    session = %id,
                    path = %receipt.path.display(),
                    size = %artifact.human_readable_size(),
                    mime = artifact.format().mime_type(),
                    "Recording saved"
                );
                self.emit(SessionEvent::Saved {
                    id,
                    file_name: artifact.file_name().to_string(),
                    receipt,
                });
            }
            Err(e) => {
                warn!(session = %id, error = %e, "Failed to deliver recording");
                self.emit(SessionEvent::DeliveryFailed {
                    id,
                    reason: e.to_string(),
                });
            }
        }

        self.end_session(id);
    }

    /// Flip the camera intent. Only read by the next `start()`.
    pub fn toggle_camera(&self) -> bool {
        self.lock().media.toggle_camera()
    }

    /// Flip the microphone intent. Only read by the next `start()`.
    pub fn toggle_mic(&self) -> bool {
        self.lock().media.toggle_mic()
    }

    /// Update capability flags from the host's device list.
    ///
    /// A failed enumeration keeps the previous flags.
    pub async fn refresh_devices<D>(&self, enumerator: &D) -> MediaDeviceState
    where
        D: DeviceEnumerator + ?Sized,
    {
        match enumerator.enumerate().await {
            Ok(devices) => {
                let mut shared = self.lock();
                shared.media.apply_inventory(&devices);
                debug!(
                    devices = devices.len(),
                    has_camera = shared.media.has_camera,
                    has_mic = shared.media.has_mic,
                    "Device inventory refreshed"
                );
                shared.media
            }
            Err(e) => {
                warn!(error = %e, "Device enumeration failed");
                self.lock().media
            }
        }
    }

    /// True once a configured max duration has elapsed while recording
    pub fn limit_reached(&self) -> bool {
        let Some(max) = self.inner.config.max_duration else {
            return false;
        };
        let shared = self.lock();
        shared.session.is_recording() && shared.timer.elapsed_secs() >= max.as_secs()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().session.status()
    }

    /// Whole seconds elapsed in the current session
    pub fn recording_time(&self) -> u64 {
        self.lock().timer.elapsed_secs()
    }

    pub fn screen_stream(&self) -> Option<MediaStream> {
        self.lock().active.as_ref().map(|a| a.screen.clone())
    }

    pub fn camera_stream(&self) -> Option<MediaStream> {
        self.lock().active.as_ref().and_then(|a| a.camera.clone())
    }

    pub fn media_state(&self) -> MediaDeviceState {
        self.lock().media
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let shared = self.lock();
        let active = shared.active.as_ref();
        SessionSnapshot {
            status: shared.session.status(),
            recording_time: shared.timer.elapsed_secs(),
            session: active.map(|a| a.id),
            screen_active: active.is_some_and(|a| a.screen.is_active()),
            camera_active: active.is_some_and(|a| a.camera.is_some()),
            media: shared.media,
        }
    }
}

fn release_streams(screen: &MediaStream, camera: Option<&MediaStream>) {
    screen.stop_all();
    if let Some(camera) = camera {
        camera.stop_all();
    }
}
