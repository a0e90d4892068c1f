use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::PlaybackConfig;

use super::source::{AudioClip, AudioSource, SourceResolver};
use super::PlaybackError;

/// Snapshot of the player's externally observable state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
    pub is_playing: bool,
}

struct Clock {
    loaded: bool,
    playing: bool,
    duration: f64,
    base_seconds: f64,
    resumed_at: Option<Instant>,
}

impl Clock {
    fn new() -> Self {
        Self {
            loaded: false,
            playing: false,
            duration: 0.0,
            base_seconds: 0.0,
            resumed_at: None,
        }
    }

    fn position(&self) -> f64 {
        let running = self
            .resumed_at
            .map(|at| at.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        (self.base_seconds + running).min(self.duration)
    }
}

/// Single-track audio player that broadcasts its playback position.
///
/// Time updates go out on a watch channel on every clock tick, and
/// immediately on seek; that channel is the sole mechanism by which a
/// word-highlight consumer advances.
pub struct SyncedPlayer {
    resolver: SourceResolver,
    tick_interval: Duration,
    clock: Arc<Mutex<Clock>>,
    clip: Mutex<Option<AudioClip>>,
    time_tx: watch::Sender<f64>,
    // Held so time broadcasts outlive transient subscribers.
    _time_rx: watch::Receiver<f64>,
    ticker: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SyncedPlayer {
    pub fn new(config: &PlaybackConfig) -> Self {
        let (time_tx, time_rx) = watch::channel(0.0);

        Self {
            resolver: SourceResolver::new(config),
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
            clock: Arc::new(Mutex::new(Clock::new())),
            clip: Mutex::new(None),
            time_tx,
            _time_rx: time_rx,
            ticker: std::sync::Mutex::new(None),
        }
    }

    /// Resolve and decode the audio payload. Deferred until the caller's
    /// explicit action; loading again while a clip is held is a no-op.
    pub async fn load(&self, source: &AudioSource) -> Result<(), PlaybackError> {
        let mut clip = self.clip.lock().await;
        if clip.is_some() {
            warn!("Audio already loaded");
            return Ok(());
        }

        let decoded = self.resolver.resolve(source).await?;

        {
            let mut clock = self.clock.lock().await;
            clock.duration = decoded.duration_seconds;
            clock.loaded = true;
        }
        *clip = Some(decoded);

        Ok(())
    }

    /// Begin or resume playback. Fails with `NotLoaded` until `load` has
    /// completed.
    pub async fn play(&self) -> Result<(), PlaybackError> {
        {
            let mut clock = self.clock.lock().await;
            if !clock.loaded {
                return Err(PlaybackError::NotLoaded);
            }
            if clock.playing {
                return Ok(());
            }
            clock.playing = true;
            clock.resumed_at = Some(Instant::now());
        }

        info!("Playback started");
        self.ensure_ticker();
        Ok(())
    }

    /// Pause playback. Safe to call in any state.
    pub async fn pause(&self) {
        let mut clock = self.clock.lock().await;
        if !clock.playing {
            return;
        }
        clock.base_seconds = clock.position();
        clock.resumed_at = None;
        clock.playing = false;
    }

    /// Pause and reset the position to the start.
    pub async fn stop(&self) {
        {
            let mut clock = self.clock.lock().await;
            clock.playing = false;
            clock.base_seconds = 0.0;
            clock.resumed_at = None;
        }
        let _ = self.time_tx.send(0.0);
    }

    /// Seek to a position, clamped into `[0, duration]`. The new time is
    /// pushed to subscribers immediately rather than waiting for the next
    /// tick, so a word-highlight view updates instantly on manual seeks.
    /// Returns the clamped position.
    pub async fn seek(&self, time_seconds: f64) -> f64 {
        let clamped = {
            let mut clock = self.clock.lock().await;
            let clamped = time_seconds.clamp(0.0, clock.duration);
            clock.base_seconds = clamped;
            if clock.playing {
                clock.resumed_at = Some(Instant::now());
            }
            clamped
        };

        let _ = self.time_tx.send(clamped);
        clamped
    }

    pub async fn state(&self) -> PlaybackState {
        let clock = self.clock.lock().await;
        PlaybackState {
            current_time_seconds: clock.position(),
            duration_seconds: clock.duration,
            is_playing: clock.playing,
        }
    }

    /// Subscribe to time updates (one value per clock tick, plus an
    /// immediate value on seek).
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.time_tx.subscribe()
    }

    /// The decoded clip, for hosts that feed an output device themselves.
    pub async fn clip(&self) -> Option<AudioClip> {
        self.clip.lock().await.clone()
    }

    fn ensure_ticker(&self) {
        let mut guard = match self.ticker.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if guard.is_some() {
            return;
        }

        let clock = Arc::clone(&self.clock);
        let time_tx = self.time_tx.clone();
        let tick_interval = self.tick_interval;

        *guard = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            interval.tick().await;
            loop {
                interval.tick().await;

                let mut clock = clock.lock().await;
                if !clock.playing {
                    continue;
                }

                let position = clock.position();
                if clock.duration > 0.0 && position >= clock.duration {
                    // Track ended: back to not-playing at the start. The
                    // state change is the only signal.
                    clock.playing = false;
                    clock.base_seconds = 0.0;
                    clock.resumed_at = None;
                    continue;
                }
                drop(clock);

                let _ = time_tx.send(position);
            }
        }));
    }
}

impl Drop for SyncedPlayer {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.ticker.lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
    }
}
