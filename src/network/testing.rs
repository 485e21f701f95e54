use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Semaphore;

use crate::common::{ChatError, ChatMessage, ChatResult, SendAck, SendMessageRequest};

use super::transport::ChatBackend;

pub fn test_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

pub fn message(id: &str, sender: &str, content: &str) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        content: content.to_string(),
        sender: sender.to_string(),
        timestamp: test_timestamp(),
        is_current_user: false,
    }
}

pub fn server_error() -> ChatError {
    ChatError::Status { status: 500 }
}

/// Scripted backend. Once the fetch script runs out, the last successful
/// list is served again.
#[derive(Default)]
pub struct FakeBackend {
    fetch_script: Mutex<VecDeque<ChatResult<Vec<ChatMessage>>>>,
    last_fetched: Mutex<Vec<ChatMessage>>,
    send_script: Mutex<VecDeque<ChatResult<SendAck>>>,
    sent: Mutex<Vec<SendMessageRequest>>,
    fetch_delay: Mutex<Option<Duration>>,
    send_gate: Mutex<Option<Arc<Semaphore>>>,
    fetch_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_fetch(&self, result: ChatResult<Vec<ChatMessage>>) {
        self.fetch_script.lock().unwrap().push_back(result);
    }

    pub fn push_send(&self, result: ChatResult<SendAck>) {
        self.send_script.lock().unwrap().push_back(result);
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    /// Sends block until `release_sends` is called.
    pub fn hold_sends(&self) {
        *self.send_gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_sends(&self) {
        if let Some(gate) = self.send_gate.lock().unwrap().as_ref() {
            gate.add_permits(64);
        }
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<SendMessageRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn fetch_messages(&self) -> ChatResult<Vec<ChatMessage>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.fetch_script.lock().unwrap().pop_front();
        let result = match next {
            Some(Ok(messages)) => {
                *self.last_fetched.lock().unwrap() = messages.clone();
                Ok(messages)
            }
            Some(Err(err)) => Err(err),
            None => Ok(self.last_fetched.lock().unwrap().clone()),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn send_message(&self, request: &SendMessageRequest) -> ChatResult<SendAck> {
        self.sent.lock().unwrap().push(request.clone());

        let gate = self.send_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        self.send_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SendAck::new(serde_json::Value::Null)))
    }
}
