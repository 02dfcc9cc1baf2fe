//! vibecam - screen recorder with a camera picture-in-picture preview
//!
//! This crate records the screen (optionally with microphone audio), shows a
//! camera preview while recording, and saves a single WebM file when the
//! recording stops.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Session state machine, media state, recording value objects, errors
//! - **Application**: The recording session controller and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (FFmpeg capture and encoding, devices, delivery, etc.)
//! - **CLI**: Command-line interface, daemon control, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
