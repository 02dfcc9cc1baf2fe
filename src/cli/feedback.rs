//! Desktop feedback for session events (notifications and audio cues)

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::ports::{AudioCue, AudioCueType, NotificationIcon, Notifier};
use crate::application::SessionEvent;

const TITLE: &str = "vibecam";

/// What to show or play for one event
#[derive(Debug, Clone, PartialEq, Eq)]
struct Cue {
    message: String,
    icon: NotificationIcon,
    sound: Option<AudioCueType>,
}

fn cue_for(event: &SessionEvent) -> Option<Cue> {
    let cue = match event {
        SessionEvent::Started(started) => Cue {
            message: if started.camera {
                "Recording started with camera".to_string()
            } else {
                "Recording started".to_string()
            },
            icon: NotificationIcon::Recording,
            sound: Some(AudioCueType::RecordingStart),
        },
        SessionEvent::CaptureFailed { reason } => Cue {
            message: format!("Could not capture the screen: {}", reason),
            icon: NotificationIcon::Error,
            sound: Some(AudioCueType::RecordingFailed),
        },
        SessionEvent::CameraUnavailable { reason } => Cue {
            message: format!("Camera unavailable, recording screen only ({})", reason),
            icon: NotificationIcon::Warning,
            sound: None,
        },
        SessionEvent::EncoderFailed { reason, .. } => Cue {
            message: format!("Encoder error: {}", reason),
            icon: NotificationIcon::Error,
            sound: Some(AudioCueType::RecordingFailed),
        },
        SessionEvent::Saved { file_name, .. } => Cue {
            message: format!("Saved {}", file_name),
            icon: NotificationIcon::Saved,
            sound: Some(AudioCueType::RecordingStop),
        },
        SessionEvent::DeliveryFailed { reason, .. } => Cue {
            message: format!("Recording could not be saved: {}", reason),
            icon: NotificationIcon::Error,
            sound: Some(AudioCueType::RecordingFailed),
        },
        SessionEvent::Tick { .. } | SessionEvent::Ended { .. } => return None,
    };
    Some(cue)
}

/// Turns session events into notifications and chimes
pub struct Feedback {
    notifier: Box<dyn Notifier>,
    audio_cue: Box<dyn AudioCue>,
}

impl Feedback {
    pub fn new(notifier: Box<dyn Notifier>, audio_cue: Box<dyn AudioCue>) -> Self {
        Self {
            notifier,
            audio_cue,
        }
    }

    /// React to a single event. Failures are logged, never propagated.
    pub async fn handle(&self, event: &SessionEvent) {
        let Some(cue) = cue_for(event) else {
            return;
        };

        if let Some(sound) = cue.sound {
            if let Err(e) = self.audio_cue.play(sound).await {
                warn!(error = %e, "Audio cue failed");
            }
        }
        if let Err(e) = self.notifier.notify(TITLE, &cue.message, cue.icon).await {
            warn!(error = %e, "Notification failed");
        }
    }

    /// Consume events until the controller goes away
    pub fn spawn(self, mut events: broadcast::Receiver<SessionEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => self.handle(&event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Feedback lagged behind session events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
