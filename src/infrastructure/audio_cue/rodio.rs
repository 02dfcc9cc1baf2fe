//! Rodio-based audio cue adapter
//!
//! Plays short synthesized chimes around a recording session.

use std::time::Duration;

use async_trait::async_trait;
use rodio::source::{SineWave, Source, Zero};
use rodio::{OutputStream, Sink};

use crate::application::ports::{AudioCue, AudioCueError, AudioCueType};

const AMP: f32 = 0.3;

/// One step of a cue: a tone, or silence when `freq` is zero
#[derive(Debug, Clone, Copy, PartialEq)]
struct Note {
    freq: f32,
    millis: u64,
}

const fn note(freq: f32, millis: u64) -> Note {
    Note { freq, millis }
}

/// Note sequence for each cue
fn melody(cue_type: AudioCueType) -> &'static [Note] {
    // C5 E5 G5
    const START: [Note; 3] = [note(523.0, 70), note(659.0, 70), note(784.0, 120)];
    // G5 E5 C5
    const STOP: [Note; 3] = [note(784.0, 70), note(659.0, 70), note(523.0, 120)];
    // G4, gap, G4
    const FAILED: [Note; 3] = [note(392.0, 60), note(0.0, 40), note(392.0, 60)];
    match cue_type {
        AudioCueType::RecordingStart => &START,
        AudioCueType::RecordingStop => &STOP,
        AudioCueType::RecordingFailed => &FAILED,
    }
}

/// Audio cue implementation using rodio
#[derive(Debug, Default)]
pub struct RodioAudioCue;

impl RodioAudioCue {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioCue for RodioAudioCue {
    async fn play(&self, cue_type: AudioCueType) -> Result<(), AudioCueError> {
        tokio::task::spawn_blocking(move || play_sync(melody(cue_type)))
            .await
            .map_err(|e| AudioCueError::PlaybackFailed(format!("Task join error: {}", e)))?
    }
}

/// Sine tone with a short fade in
fn gentle_tone(freq: f32, millis: u64) -> impl Source<Item = f32> + Send {
    let fade_ms = (millis / 5).min(30);
    SineWave::new(freq)
        .take_duration(Duration::from_millis(millis))
        .fade_in(Duration::from_millis(fade_ms))
        .amplify(AMP)
}

fn play_sync(notes: &[Note]) -> Result<(), AudioCueError> {
    let (_stream, stream_handle) = OutputStream::try_default()
        .map_err(|e| AudioCueError::DeviceNotAvailable(e.to_string()))?;

    let sink =
        Sink::try_new(&stream_handle).map_err(|e| AudioCueError::PlaybackFailed(e.to_string()))?;

    for step in notes {
        if step.freq > 0.0 {
            sink.append(gentle_tone(step.freq, step.millis));
        } else {
            sink.append(Zero::<f32>::new(1, 44100).take_duration(Duration::from_millis(step.millis)));
        }
    }

    sink.sleep_until_end();
    Ok(())
}
