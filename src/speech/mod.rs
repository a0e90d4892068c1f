//! Voice capture
//!
//! This module turns a continuous, interim-enabled speech recognition
//! stream into a single cumulative transcript:
//! - `SpeechBackend` is the seam to the recognition capability
//! - `ScriptedBackend` replays prepared sessions for tests and demos
//! - `VoiceCapture` owns the recording lifecycle, transcript and timer

mod backend;
mod capture;
mod scripted;

pub use backend::{
    CaptureError, RecognitionEvent, RecognitionSegment, SpeechBackend, SpeechBackendFactory,
    SpeechSource, SupportReport,
};
pub use capture::{assemble_transcript, VoiceCapture};
pub use scripted::{ScriptedBackend, ScriptedEvent};
