use std::io::Cursor;

use base64::Engine;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::info;

use crate::config::PlaybackConfig;

use super::PlaybackError;

/// Audio payload as delivered by the webhook: inline base64 data or a
/// remote identifier resolved against the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    Inline(String),
    Remote(String),
}

/// Decoded audio clip (f32 PCM, interleaved).
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_seconds: f64,
}

/// Resolves an `AudioSource` into a decoded clip.
pub struct SourceResolver {
    http: reqwest::Client,
    base_url: String,
    max_inline_bytes: usize,
}

impl SourceResolver {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.remote_audio_base_url.trim_end_matches('/').to_string(),
            max_inline_bytes: config.max_inline_audio_bytes,
        }
    }

    pub async fn resolve(&self, source: &AudioSource) -> Result<AudioClip, PlaybackError> {
        let bytes = match source {
            AudioSource::Inline(data) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(data)
                    .map_err(|e| PlaybackError::Load(format!("invalid base64 audio payload: {e}")))?;

                if bytes.len() > self.max_inline_bytes {
                    return Err(PlaybackError::UnsupportedFormat {
                        got: bytes.len(),
                        limit: self.max_inline_bytes,
                    });
                }

                bytes
            }
            AudioSource::Remote(id) => {
                let url = format!("{}/{}", self.base_url, id);
                info!("Fetching remote audio: {}", url);

                let response = self
                    .http
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| PlaybackError::Load(format!("failed to fetch {url}: {e}")))?;

                if !response.status().is_success() {
                    return Err(PlaybackError::Load(format!(
                        "audio fetch returned status {}",
                        response.status()
                    )));
                }

                response
                    .bytes()
                    .await
                    .map_err(|e| PlaybackError::Load(format!("failed to read audio body: {e}")))?
                    .to_vec()
            }
        };

        decode_clip(&bytes)
    }
}

/// Decode an audio payload into PCM. WAV goes through hound directly;
/// anything else goes through symphonia's probe.
pub fn decode_clip(bytes: &[u8]) -> Result<AudioClip, PlaybackError> {
    let clip = if bytes.starts_with(b"RIFF") {
        decode_wav(bytes)?
    } else {
        decode_compressed(bytes)?
    };

    info!(
        "Audio decoded: {:.2}s, {} Hz, {} channels",
        clip.duration_seconds, clip.sample_rate, clip.channels
    );

    Ok(clip)
}

fn decode_wav(bytes: &[u8]) -> Result<AudioClip, PlaybackError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| PlaybackError::Load(format!("failed to open WAV payload: {e}")))?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .into_samples::<i16>()
            .map(|s| s.map(|v| f32::from(v) / f32::from(i16::MAX)))
            .collect::<Result<Vec<_>, _>>(),
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect(),
    }
    .map_err(|e| PlaybackError::Load(format!("failed to read WAV samples: {e}")))?;

    Ok(finish_clip(samples, spec.sample_rate, spec.channels))
}

fn decode_compressed(bytes: &[u8]) -> Result<AudioClip, PlaybackError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| PlaybackError::Load(format!("unrecognized audio container: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlaybackError::Load("no decodable audio track".to_string()))?;
    let track_id = track.id;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| PlaybackError::Load("audio track has no sample rate".to_string()))?;
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| PlaybackError::Load(format!("failed to create decoder: {e}")))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(PlaybackError::Load(format!(
                    "failed to read audio packet: {e}"
                )))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| PlaybackError::Load(format!("failed to decode audio: {e}")))?;

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    Ok(finish_clip(samples, sample_rate, channels))
}

fn finish_clip(samples: Vec<f32>, sample_rate: u32, channels: u16) -> AudioClip {
    let duration_seconds = if sample_rate == 0 || channels == 0 {
        0.0
    } else {
        samples.len() as f64 / (f64::from(sample_rate) * f64::from(channels))
    };

    AudioClip {
        samples,
        sample_rate,
        channels,
        duration_seconds,
    }
}
