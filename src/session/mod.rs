//! Session state, the interview controller, and its supporting machinery.

pub mod controller;
pub mod inflight;
pub mod model;
pub mod progress;

pub use controller::{InterviewController, Phase};
pub use model::{MessageOrigin, Session, SessionMode, TranscriptMessage};
