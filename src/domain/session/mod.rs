//! Recording session domain

mod state;

pub use state::{InvalidStateTransition, SessionId, SessionState, SessionStatus};
