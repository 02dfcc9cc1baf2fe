//! Live capture streams and their tracks

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Kind of media carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Video,
    Audio,
}

type ReleaseFn = Box<dyn FnOnce() + Send>;

struct TrackState {
    live: AtomicBool,
    release: Mutex<Option<ReleaseFn>>,
}

/// A single live track of a capture stream.
///
/// Clones share state: stopping any clone stops the track everywhere and
/// runs the platform release hook exactly once.
#[derive(Clone)]
pub struct MediaTrack {
    kind: TrackKind,
    label: String,
    source: String,
    state: Arc<TrackState>,
}

impl MediaTrack {
    /// Create a live track with no platform resource attached
    pub fn new(kind: TrackKind, label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            source: source.into(),
            state: Arc::new(TrackState {
                live: AtomicBool::new(true),
                release: Mutex::new(None),
            }),
        }
    }

    /// Attach a hook that frees the platform resource when the track stops
    pub fn with_release(self, release: impl FnOnce() + Send + 'static) -> Self {
        *self
            .state
            .release
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(Box::new(release));
        self
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Platform input descriptor (display name, device path, audio source)
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_live(&self) -> bool {
        self.state.live.load(Ordering::SeqCst)
    }

    /// Stop the track. Idempotent.
    pub fn stop(&self) {
        if self.state.live.swap(false, Ordering::SeqCst) {
            let release = self
                .state
                .release
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .take();
            if let Some(release) = release {
                release();
            }
        }
    }
}

impl fmt::Debug for MediaTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaTrack")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("source", &self.source)
            .field("live", &self.is_live())
            .finish()
    }
}

/// A live capture stream owning one or more tracks
#[derive(Debug, Clone)]
pub struct MediaStream {
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn video_track(&self) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind() == TrackKind::Video)
    }

    pub fn audio_track(&self) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind() == TrackKind::Audio)
    }

    pub fn has_audio(&self) -> bool {
        self.audio_track().is_some()
    }

    /// True while at least one track is live
    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(MediaTrack::is_live)
    }

    /// Stop every track of the stream
    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn new_track_is_live() {
        let track = MediaTrack::new(TrackKind::Video, "Screen", ":0.0");
        assert!(track.is_live());
        assert_eq!(track.source(), ":0.0");
    }

    #[test]
    fn stop_runs_release_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let track = MediaTrack::new(TrackKind::Video, "Camera", "/dev/video0")
            .with_release(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        track.stop();
        track.stop();
        assert!(!track.is_live());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_state() {
        let track = MediaTrack::new(TrackKind::Audio, "Mic", "default");
        let observer = track.clone();
        track.stop();
        assert!(!observer.is_live());
    }

    #[test]
    fn stream_stop_all_stops_every_track() {
        let stream = MediaStream::new(vec![
            MediaTrack::new(TrackKind::Video, "Screen", ":0.0"),
            MediaTrack::new(TrackKind::Audio, "Mic", "default"),
        ]);
        assert!(stream.is_active());
        assert!(stream.has_audio());

        stream.stop_all();
        assert!(!stream.is_active());
        assert!(stream.tracks().iter().all(|t| !t.is_live()));
    }

    #[test]
    fn stream_without_audio() {
        let stream = MediaStream::new(vec![MediaTrack::new(TrackKind::Video, "Screen", ":0.0")]);
        assert!(!stream.has_audio());
        assert!(stream.video_track().is_some());
    }
}
