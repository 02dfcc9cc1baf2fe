//! Application layer - Use cases and port interfaces
//!
//! Contains the recording session controller and trait definitions
//! for external system interactions.

pub mod controller;
pub mod ports;

pub use controller::{
    ControllerConfig, ControllerError, RecordingController, SessionEvent, SessionSnapshot,
    SessionStarted,
};
