use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub webhook: WebhookConfig,
    pub speech: SpeechConfig,
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Settings for the discovery webhook (the sole network boundary).
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// BCP-47 language tag passed to the recognition capability
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// Largest inline (base64) audio payload accepted before decode.
    /// Oversized payloads are rejected rather than risking a decode stall.
    pub max_inline_audio_bytes: usize,

    /// Base URL that remote audio identifiers resolve against
    pub remote_audio_base_url: String,

    /// Playback clock tick interval in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_inline_audio_bytes: 2 * 1024 * 1024,
            remote_audio_base_url: "https://api.example.com/audio".to_string(),
            tick_interval_ms: 100,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
