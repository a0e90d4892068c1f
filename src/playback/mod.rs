//! Synchronized audio playback
//!
//! This module owns single-track playback of webhook audio replies:
//! - `SourceResolver` turns inline/remote payloads into decoded clips
//! - `SyncedPlayer` owns the playback clock and broadcasts time updates
//! - `timing` classifies word spans against the clock for highlighting

mod player;
mod source;
pub mod timing;

use thiserror::Error;

pub use player::{PlaybackState, SyncedPlayer};
pub use source::{decode_clip, AudioClip, AudioSource, SourceResolver};
pub use timing::{active_index, classify, cue_words, WordCue, WordState, WordTiming};

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("inline audio payload is {got} bytes, over the {limit}-byte limit")]
    UnsupportedFormat { got: usize, limit: usize },

    #[error("failed to load audio: {0}")]
    Load(String),

    #[error("no audio loaded")]
    NotLoaded,

    #[error("playback rejected: {0}")]
    Rejected(String),
}
