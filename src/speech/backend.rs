use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::SpeechConfig;

use super::scripted::{ScriptedBackend, ScriptedEvent};

/// One recognized segment within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSegment {
    pub text: String,
    /// Final segments are settled; interim segments may still be revised.
    pub is_final: bool,
}

impl RecognitionSegment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn settled(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Event emitted by a speech backend.
///
/// `Results` carries the complete segment list recognized so far in the
/// current session (cumulative, not a delta). `Ended` and `Error` both
/// terminate the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Results(Vec<RecognitionSegment>),
    Ended,
    Error(String),
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("speech recognition is not supported: {0}")]
    NotSupported(String),

    #[error("microphone access denied")]
    PermissionDenied,

    #[error("speech recognition error: {0}")]
    Recognition(String),
}

/// Speech recognition backend trait
///
/// Implementations wrap a continuous, interim-enabled recognition
/// capability. Each `start` opens one session whose events arrive on the
/// returned channel until `stop` is requested or the recognizer ends on
/// its own.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Start a continuous recognition session.
    ///
    /// Returns a channel receiver that will receive recognition events.
    async fn start(&mut self) -> Result<mpsc::Receiver<RecognitionEvent>, CaptureError>;

    /// Request the current session to end. The session is over once the
    /// event channel yields `Ended` (or closes).
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Check if a session is currently open
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Where recognition events come from.
#[derive(Debug, Clone)]
pub enum SpeechSource {
    /// Timed replay of a prepared script (for testing/demos)
    Scripted(Vec<ScriptedEvent>),
    /// A platform speech engine supplied by the host integration
    Native,
}

/// Result of the one-time capability probe.
#[derive(Debug, Clone)]
pub struct SupportReport {
    pub supported: bool,
    pub reason: Option<String>,
}

/// Speech backend factory
pub struct SpeechBackendFactory;

impl SpeechBackendFactory {
    /// Probe whether a source can produce a working backend.
    ///
    /// Platform combinations known to be unreliable report unsupported here
    /// instead of failing mid-session.
    pub fn probe(source: &SpeechSource) -> SupportReport {
        match source {
            SpeechSource::Scripted(_) => SupportReport {
                supported: true,
                reason: None,
            },
            SpeechSource::Native => SupportReport {
                supported: false,
                reason: Some(
                    "no native speech engine is registered for this platform".to_string(),
                ),
            },
        }
    }

    /// Create a speech backend for the given source.
    pub fn create(
        source: SpeechSource,
        config: SpeechConfig,
    ) -> Result<Box<dyn SpeechBackend>, CaptureError> {
        match source {
            SpeechSource::Scripted(script) => Ok(Box::new(ScriptedBackend::new(script, config))),
            SpeechSource::Native => Err(CaptureError::NotSupported(
                "no native speech engine is registered for this platform".to_string(),
            )),
        }
    }
}
