use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::SpeechConfig;

use super::backend::{CaptureError, RecognitionEvent, RecognitionSegment, SpeechBackend};

/// One step of a recognition script.
///
/// `at_ms` is the offset from session start at which the event fires.
/// `segments` is the complete segment list known at that point, matching
/// the cumulative contract of `RecognitionEvent::Results`.
#[derive(Debug, Clone)]
pub struct ScriptedEvent {
    pub at_ms: u64,
    pub segments: Vec<RecognitionSegment>,
}

impl ScriptedEvent {
    pub fn new(at_ms: u64, segments: Vec<RecognitionSegment>) -> Self {
        Self { at_ms, segments }
    }
}

/// Replays a prepared recognition script on a timer.
///
/// After the script is exhausted the session stays open until `stop` is
/// requested, like a live recognizer waiting for more speech.
pub struct ScriptedBackend {
    script: Vec<ScriptedEvent>,
    language: String,
    capturing: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<ScriptedEvent>, config: SpeechConfig) -> Self {
        Self {
            script,
            language: config.language,
            capturing: Arc::new(AtomicBool::new(false)),
            stop_signal: Arc::new(Notify::new()),
            task: None,
        }
    }
}

#[async_trait]
impl SpeechBackend for ScriptedBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<RecognitionEvent>, CaptureError> {
        if self.capturing.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::Recognition(
                "recognizer is already active".to_string(),
            ));
        }

        info!(
            "Starting scripted recognition session ({} events, lang={})",
            self.script.len(),
            self.language
        );

        let (tx, rx) = mpsc::channel(32);
        let script = self.script.clone();
        let capturing = Arc::clone(&self.capturing);
        let stop_signal = Arc::clone(&self.stop_signal);

        self.task = Some(tokio::spawn(async move {
            let mut last_ms = 0;

            for event in script {
                let delay = Duration::from_millis(event.at_ms.saturating_sub(last_ms));
                last_ms = event.at_ms;

                tokio::select! {
                    _ = stop_signal.notified() => {
                        let _ = tx.send(RecognitionEvent::Ended).await;
                        capturing.store(false, Ordering::SeqCst);
                        return;
                    }
                    _ = tokio::time::sleep(delay) => {
                        if tx.send(RecognitionEvent::Results(event.segments)).await.is_err() {
                            // Listener went away; session is over.
                            capturing.store(false, Ordering::SeqCst);
                            return;
                        }
                    }
                }
            }

            // Script exhausted: stay open until the caller requests the end.
            stop_signal.notified().await;
            let _ = tx.send(RecognitionEvent::Ended).await;
            capturing.store(false, Ordering::SeqCst);
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.capturing.load(Ordering::SeqCst) {
            return Ok(());
        }

        self.stop_signal.notify_one();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Scripted recognition task panicked: {}", e);
            }
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

impl Drop for ScriptedBackend {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
