//! Recording session state machine

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Session status as observed by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Recording,
}

impl SessionStatus {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Monotonic identifier of one recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The id following this one
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionStatus,
    pub action: String,
}

/// Session state entity.
///
/// State machine:
///   IDLE -> RECORDING (begin_recording)
///   RECORDING -> IDLE (end_recording)
#[derive(Debug, Default)]
pub struct SessionState {
    status: SessionStatus,
}

impl SessionState {
    /// Create a new session state in idle
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
        }
    }

    /// Get the current status
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_idle(&self) -> bool {
        self.status == SessionStatus::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.status == SessionStatus::Recording
    }

    /// Transition from IDLE to RECORDING
    pub fn begin_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.status != SessionStatus::Idle {
            return Err(InvalidStateTransition {
                current_state: self.status,
                action: "start recording".to_string(),
            });
        }
        self.status = SessionStatus::Recording;
        Ok(())
    }

    /// Transition from RECORDING to IDLE
    pub fn end_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.status != SessionStatus::Recording {
            return Err(InvalidStateTransition {
                current_state: self.status,
                action: "stop recording".to_string(),
            });
        }
        self.status = SessionStatus::Idle;
        Ok(())
    }

    /// Force IDLE regardless of the current status
    pub fn reset(&mut self) {
        self.status = SessionStatus::Idle;
    }
}
