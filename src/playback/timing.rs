use serde::{Deserialize, Serialize};

/// Word-level timing span from the webhook's audio attachment.
///
/// The span is `[start, end)`: start inclusive, end exclusive. Spans are
/// ordered by `sequence_index`, which is playback order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    #[serde(rename = "start")]
    pub start_seconds: f64,
    #[serde(rename = "end")]
    pub end_seconds: f64,
    #[serde(rename = "index")]
    pub sequence_index: usize,
}

/// Where a word sits relative to the playback clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordState {
    Past,
    Active,
    Upcoming,
}

/// A timing paired with its state at some playback position.
#[derive(Debug, Clone, PartialEq)]
pub struct WordCue {
    pub timing: WordTiming,
    pub state: WordState,
}

/// Classify one timing against the playback clock.
pub fn classify(timing: &WordTiming, current_time: f64) -> WordState {
    if current_time >= timing.end_seconds {
        WordState::Past
    } else if current_time >= timing.start_seconds {
        WordState::Active
    } else {
        WordState::Upcoming
    }
}

/// Re-evaluate every timing against the playback clock. Pure; called on
/// each time notification. An empty input means the consumer has no
/// per-word state and should render the text statically.
pub fn cue_words(timings: &[WordTiming], current_time: f64) -> Vec<WordCue> {
    timings
        .iter()
        .map(|timing| WordCue {
            timing: timing.clone(),
            state: classify(timing, current_time),
        })
        .collect()
}

/// Index of the first active word, if any. Overlapping spans can make more
/// than one word active; that is a data-quality condition, not a player
/// bug, and the first one wins.
pub fn active_index(timings: &[WordTiming], current_time: f64) -> Option<usize> {
    timings
        .iter()
        .position(|timing| classify(timing, current_time) == WordState::Active)
}

/// Check the ordering invariant: each span has `start <= end` and spans
/// are non-decreasing in `sequence_index`.
pub fn is_well_ordered(timings: &[WordTiming]) -> bool {
    timings
        .iter()
        .all(|t| t.start_seconds <= t.end_seconds)
        && timings
            .windows(2)
            .all(|pair| pair[0].sequence_index <= pair[1].sequence_index)
}
