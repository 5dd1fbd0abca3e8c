//! Ordered, cancellable chunk delivery
//!
//! One generated artifact is delivered to one caller as a paced sequence of
//! chunks. Ordering is structural: a single producer task owns the chunk
//! cursor and the channel sender, so indices are strictly increasing with no
//! gaps regardless of scheduler timing. Cancellation flips a watch flag the
//! producer observes before pacing out each chunk.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

/// Buffered events per session; the producer backpressures beyond this
const CHANNEL_CAPACITY: usize = 64;

/// Events observed by the consumer of one delivery session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeliveryEvent {
    Chunk { index: u64, data: String },
    Complete,
    Cancelled,
    Failed { reason: String },
}

impl DeliveryEvent {
    /// Whether this event ends the session
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Chunk { .. })
    }

    /// SSE event name for this event
    pub fn name(&self) -> &'static str {
        match self {
            Self::Chunk { .. } => "chunk",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Delivery pacing configuration
#[derive(Debug, Clone, Copy)]
pub struct DeliveryConfig {
    /// Characters per chunk
    pub chunk_size: usize,
    /// Pause between chunks
    pub chunk_interval: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            chunk_size: 24,
            chunk_interval: Duration::from_millis(10),
        }
    }
}

/// One in-flight delivery
struct Session {
    /// Claimed exactly once by the consuming endpoint
    events: Option<mpsc::Receiver<DeliveryEvent>>,
    cancel: watch::Sender<bool>,
}

/// Registry of in-flight delivery sessions
#[derive(Clone)]
pub struct DeliveryStreams {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
    config: DeliveryConfig,
}

impl DeliveryStreams {
    /// Create a registry with the given pacing configuration
    pub fn new(config: DeliveryConfig) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Start delivering an artifact; returns the session id.
    ///
    /// Spawns the single producer task that owns the chunk cursor. The
    /// session disappears from the registry once its terminal event is sent.
    pub fn start(&self, artifact: String) -> Uuid {
        let session_id = Uuid::new_v4();
        let (events_tx, events_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let chunks = chunk_artifact(&artifact, self.config.chunk_size);

        self.sessions.lock().unwrap().insert(
            session_id,
            Session {
                events: Some(events_rx),
                cancel: cancel_tx,
            },
        );

        tracing::debug!(
            session_id = %session_id,
            chunks = chunks.len(),
            "Starting delivery session"
        );

        let sessions = self.sessions.clone();
        let interval = self.config.chunk_interval;
        tokio::spawn(async move {
            produce(session_id, chunks, events_tx, cancel_rx, interval).await;
            sessions.lock().unwrap().remove(&session_id);
        });

        session_id
    }

    /// Claim the event stream of a session. Yields `None` on the second
    /// claim, or when the session does not exist.
    pub fn subscribe(&self, session_id: Uuid) -> Option<mpsc::Receiver<DeliveryEvent>> {
        self.sessions
            .lock()
            .unwrap()
            .get_mut(&session_id)
            .and_then(|session| session.events.take())
    }

    /// Whether a session is still in flight
    pub fn contains(&self, session_id: Uuid) -> bool {
        self.sessions.lock().unwrap().contains_key(&session_id)
    }

    /// Cancel a session. Returns false when the session is unknown or has
    /// already reached a terminal event.
    pub fn cancel(&self, session_id: Uuid) -> bool {
        let sessions = self.sessions.lock().unwrap();
        match sessions.get(&session_id) {
            Some(session) => {
                tracing::info!(session_id = %session_id, "Cancelling delivery session");
                session.cancel.send(true).is_ok()
            }
            None => false,
        }
    }
}

impl Default for DeliveryStreams {
    fn default() -> Self {
        Self::new(DeliveryConfig::default())
    }
}

/// Split an artifact into chunks of at most `chunk_size` characters
fn chunk_artifact(artifact: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = artifact.chars().collect();
    chars
        .chunks(chunk_size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// The single producer: walks the cursor, paces chunks, emits one terminal.
async fn produce(
    session_id: Uuid,
    chunks: Vec<String>,
    events: mpsc::Sender<DeliveryEvent>,
    mut cancelled: watch::Receiver<bool>,
    interval: Duration,
) {
    let mut was_cancelled = false;

    for (index, data) in chunks.into_iter().enumerate() {
        tokio::select! {
            biased;
            _ = cancelled.changed() => {
                was_cancelled = true;
            }
            _ = tokio::time::sleep(interval) => {
                if events
                    .send(DeliveryEvent::Chunk {
                        index: index as u64,
                        data,
                    })
                    .await
                    .is_err()
                {
                    // consumer dropped the stream; nothing left to deliver
                    tracing::debug!(session_id = %session_id, "Delivery consumer went away");
                    return;
                }
            }
        }

        if was_cancelled || *cancelled.borrow() {
            was_cancelled = true;
            break;
        }
    }

    let terminal = if was_cancelled {
        DeliveryEvent::Cancelled
    } else {
        DeliveryEvent::Complete
    };

    tracing::debug!(session_id = %session_id, terminal = terminal.name(), "Delivery finished");
    let _ = events.send(terminal).await;
}
