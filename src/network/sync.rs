use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::common::types::placeholder_conversation;
use crate::common::{ChatMessage, ChatResult, SendAck, SendMessageRequest};

use super::transport::ChatBackend;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Handle to the snapshot stream. Dropping it unsubscribes.
pub struct Subscription {
    receiver: watch::Receiver<Vec<ChatMessage>>,
}

impl Subscription {
    /// Latest snapshot, if one arrived since the last call.
    pub fn take_latest(&mut self) -> Option<Vec<ChatMessage>> {
        match self.receiver.has_changed() {
            Ok(true) => Some(self.receiver.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Waits for the next snapshot. `None` once the engine is gone.
    pub async fn changed(&mut self) -> Option<Vec<ChatMessage>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {}
}

struct Shared {
    backend: Arc<dyn ChatBackend>,
    snapshot: watch::Sender<Vec<ChatMessage>>,
}

impl Shared {
    async fn fetch_snapshot(&self) -> Vec<ChatMessage> {
        match self.backend.fetch_messages().await {
            Ok(messages) => {
                log::debug!("Fetched {} messages", messages.len());
                messages
            }
            Err(err) => {
                log::warn!("Error fetching messages ({err}); showing placeholder conversation");
                placeholder_conversation()
            }
        }
    }

    fn publish(&self, snapshot: Vec<ChatMessage>) {
        self.snapshot.send_replace(snapshot);
    }
}

/// Owns the conversation snapshot and keeps it fresh by polling the backend.
pub struct SyncEngine {
    shared: Arc<Shared>,
    config: SyncConfig,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncEngine {
    pub fn new(backend: Arc<dyn ChatBackend>, config: SyncConfig) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            shared: Arc::new(Shared { backend, snapshot }),
            config,
            poll_task: Mutex::new(None),
        }
    }

    /// Starts polling: one fetch right away, then one per interval. Must be
    /// called from within a tokio runtime.
    pub fn start(&self) {
        let mut poll_task = self.poll_task.lock().unwrap_or_else(PoisonError::into_inner);
        if poll_task.as_ref().is_some_and(|task| !task.is_finished()) {
            log::debug!("Sync engine already running");
            return;
        }

        let shared = Arc::clone(&self.shared);
        let period = self.config.poll_interval;
        *poll_task = Some(tokio::spawn(poll_loop(shared, period)));
        log::info!("Sync engine started (every {} ms)", period.as_millis());
    }

    pub fn stop(&self) {
        let task = self
            .poll_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
            log::info!("Sync engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.poll_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// One read against the backend; failures yield the placeholder conversation.
    pub async fn fetch_snapshot(&self) -> Vec<ChatMessage> {
        self.shared.fetch_snapshot().await
    }

    /// Replaces the snapshot and notifies every subscriber.
    pub fn publish(&self, snapshot: Vec<ChatMessage>) {
        self.shared.publish(snapshot);
    }

    /// The current snapshot is replayed as the first notification.
    pub fn subscribe(&self) -> Subscription {
        let mut receiver = self.shared.snapshot.subscribe();
        receiver.mark_changed();
        Subscription { receiver }
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.snapshot.receiver_count()
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.shared.snapshot.borrow().clone()
    }

    pub async fn submit(&self, request: SendMessageRequest) -> ChatResult<SendAck> {
        match self.shared.backend.send_message(&request).await {
            Ok(ack) => {
                log::info!("Message sent, server answered: {}", ack.body);
                Ok(ack)
            }
            Err(err) => {
                log::warn!("Failed to send message: {err}");
                Err(err)
            }
        }
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

// Each fetch is awaited before the next tick, so a tick that comes due while a
// fetch is still running is skipped rather than stacked.
async fn poll_loop(shared: Arc<Shared>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let snapshot = shared.fetch_snapshot().await;
        shared.publish(snapshot);
    }
}
