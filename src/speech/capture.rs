use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::SpeechConfig;

use super::backend::{
    CaptureError, RecognitionEvent, RecognitionSegment, SpeechBackend, SpeechBackendFactory,
    SpeechSource, SupportReport,
};

/// Assemble the cumulative transcript from the latest complete segment
/// list: all final text in index order, then all currently-interim text in
/// index order. Each `Results` event replaces the transcript wholesale, so
/// the transcript never regresses within a session.
pub fn assemble_transcript(segments: &[RecognitionSegment]) -> String {
    let mut transcript = String::new();

    for segment in segments.iter().filter(|s| s.is_final) {
        transcript.push_str(&segment.text);
    }
    for segment in segments.iter().filter(|s| !s.is_final) {
        transcript.push_str(&segment.text);
    }

    transcript
}

struct CaptureShared {
    is_recording: AtomicBool,
    elapsed_seconds: AtomicU64,
    transcript: Mutex<String>,
    last_error: Mutex<Option<String>>,
}

#[derive(Default)]
struct CaptureTasks {
    events: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
}

/// Turns a continuous recognition stream into a single cumulative
/// transcript with explicit lifecycle control.
///
/// The controller owns exactly one backend session at a time: `start`
/// while recording is a no-op, and `stop`/`clear_transcript` are always
/// safe to call regardless of state.
pub struct VoiceCapture {
    backend: Option<Arc<Mutex<Box<dyn SpeechBackend>>>>,
    support: SupportReport,
    shared: Arc<CaptureShared>,
    tasks: Mutex<CaptureTasks>,
}

impl VoiceCapture {
    /// Create a capture controller. The capability probe runs once here;
    /// unsupported sources surface through `is_supported` and a stored
    /// error message rather than failing later mid-session.
    pub fn new(source: SpeechSource, config: SpeechConfig) -> Self {
        let support = SpeechBackendFactory::probe(&source);
        let backend = match SpeechBackendFactory::create(source, config) {
            Ok(backend) => Some(Arc::new(Mutex::new(backend))),
            Err(e) => {
                warn!("Speech capability unavailable: {}", e);
                None
            }
        };

        let last_error = support.reason.clone();

        Self {
            backend,
            support,
            shared: Arc::new(CaptureShared {
                is_recording: AtomicBool::new(false),
                elapsed_seconds: AtomicU64::new(0),
                transcript: Mutex::new(String::new()),
                last_error: Mutex::new(last_error),
            }),
            tasks: Mutex::new(CaptureTasks::default()),
        }
    }

    /// Create a capture controller around a host-supplied backend,
    /// bypassing the factory. The backend is assumed supported.
    pub fn with_backend(backend: Box<dyn SpeechBackend>) -> Self {
        Self {
            backend: Some(Arc::new(Mutex::new(backend))),
            support: SupportReport {
                supported: true,
                reason: None,
            },
            shared: Arc::new(CaptureShared {
                is_recording: AtomicBool::new(false),
                elapsed_seconds: AtomicU64::new(0),
                transcript: Mutex::new(String::new()),
                last_error: Mutex::new(None),
            }),
            tasks: Mutex::new(CaptureTasks::default()),
        }
    }

    /// Start recording.
    ///
    /// Fails with `NotSupported` if the capability probe failed, or
    /// `PermissionDenied` if the backend refuses microphone access;
    /// neither enters the Recording state.
    pub async fn start(&self) -> Result<(), CaptureError> {
        let backend = match &self.backend {
            Some(backend) => Arc::clone(backend),
            None => {
                let reason = self
                    .support
                    .reason
                    .clone()
                    .unwrap_or_else(|| "speech capability unavailable".to_string());
                return Err(CaptureError::NotSupported(reason));
            }
        };

        if self.shared.is_recording.load(Ordering::SeqCst) {
            warn!("Recording already started");
            return Ok(());
        }

        let rx = match backend.lock().await.start().await {
            Ok(rx) => rx,
            Err(e) => {
                *self.shared.last_error.lock().await = Some(e.to_string());
                return Err(e);
            }
        };

        info!("Recording started");

        *self.shared.last_error.lock().await = None;
        self.shared.transcript.lock().await.clear();
        self.shared.elapsed_seconds.store(0, Ordering::SeqCst);
        self.shared.is_recording.store(true, Ordering::SeqCst);

        // Consume recognition events until the session ends. Every Results
        // event replaces the transcript with a fresh assembly of the
        // complete segment list.
        let shared = Arc::clone(&self.shared);
        let events = tokio::spawn(async move {
            let mut rx = rx;
            while let Some(event) = rx.recv().await {
                match event {
                    RecognitionEvent::Results(segments) => {
                        let assembled = assemble_transcript(&segments);
                        *shared.transcript.lock().await = assembled;
                    }
                    RecognitionEvent::Ended => break,
                    RecognitionEvent::Error(code) => {
                        error!("Recognition error: {}", code);
                        *shared.last_error.lock().await =
                            Some(format!("speech recognition error: {code}"));
                        break;
                    }
                }
            }
            shared.is_recording.store(false, Ordering::SeqCst);
        });

        // One-second elapsed counter. The interval's immediate first tick
        // is consumed so second N is counted at t = N; the flag check runs
        // before the increment so no tick lands after teardown.
        let shared = Arc::clone(&self.shared);
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.tick().await;
            loop {
                interval.tick().await;
                if !shared.is_recording.load(Ordering::SeqCst) {
                    break;
                }
                shared.elapsed_seconds.fetch_add(1, Ordering::SeqCst);
            }
        });

        let mut tasks = self.tasks.lock().await;
        tasks.events = Some(events);
        tasks.ticker = Some(ticker);

        Ok(())
    }

    /// Stop recording. No-op when idle; otherwise asks the recognizer to
    /// end and waits for the session to wind down so no timer outlives it.
    pub async fn stop(&self) {
        if !self.shared.is_recording.load(Ordering::SeqCst) {
            return;
        }

        info!("Stopping recording");

        if let Some(backend) = &self.backend {
            if let Err(e) = backend.lock().await.stop().await {
                warn!("Failed to stop speech backend: {}", e);
            }
        }

        let (events, ticker) = {
            let mut tasks = self.tasks.lock().await;
            (tasks.events.take(), tasks.ticker.take())
        };

        if let Some(task) = events {
            if let Err(e) = task.await {
                error!("Recognition event task panicked: {}", e);
            }
        }

        // The ticker only wakes on whole-second boundaries; the recording
        // flag is already down, so aborting cannot lose a valid tick.
        if let Some(task) = ticker {
            task.abort();
        }

        info!(
            "Recording stopped after {}s, transcript {} chars",
            self.shared.elapsed_seconds.load(Ordering::SeqCst),
            self.shared.transcript.lock().await.len()
        );
    }

    /// Reset transcript and elapsed counter. Does not affect recording
    /// state.
    pub async fn clear_transcript(&self) {
        self.shared.transcript.lock().await.clear();
        self.shared.elapsed_seconds.store(0, Ordering::SeqCst);
    }

    pub fn is_recording(&self) -> bool {
        self.shared.is_recording.load(Ordering::SeqCst)
    }

    pub fn is_supported(&self) -> bool {
        self.support.supported
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.shared.elapsed_seconds.load(Ordering::SeqCst)
    }

    pub async fn transcript(&self) -> String {
        self.shared.transcript.lock().await.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.shared.last_error.lock().await.clone()
    }
}
