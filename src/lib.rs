pub mod config;
pub mod http;
pub mod playback;
pub mod session;
pub mod speech;
pub mod webhook;

pub use config::Config;
pub use http::{create_router, AppState};
pub use playback::{
    AudioClip, AudioSource, PlaybackError, PlaybackState, SyncedPlayer, WordCue, WordState,
    WordTiming,
};
pub use session::{ChatMessage, ChatSession, MessageRole, SessionConfig, SessionState, SessionStats};
pub use speech::{
    CaptureError, RecognitionEvent, RecognitionSegment, ScriptedBackend, ScriptedEvent,
    SpeechBackend, SpeechBackendFactory, SpeechSource, SupportReport, VoiceCapture,
};
pub use webhook::{
    AssistantReply, AudioAttachment, DiscoveryRequest, JobMatch, WebhookClient, WebhookError,
    WebhookResponse,
};
