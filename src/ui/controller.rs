use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::common::{ChatMessage, SendMessageRequest, SendOutcome};
use crate::network::{Subscription, SyncEngine};

use super::state::{ScrollMetrics, ViewSettings, ViewState};

/// Whatever owns the scrollable message container.
pub trait ScrollSurface {
    fn scroll_to_bottom(&mut self);
}

/// Bridges the engine's snapshot stream to renderable state and mediates sends.
pub struct ChatController {
    engine: Arc<SyncEngine>,
    runtime: Handle,
    settings: ViewSettings,
    subscription: Option<Subscription>,
    outcome_sender: Option<mpsc::UnboundedSender<SendOutcome>>,
    outcome_receiver: Option<mpsc::UnboundedReceiver<SendOutcome>>,
    messages: Vec<ChatMessage>,
    echoes: Vec<ChatMessage>,
    state: ViewState,
    scroll: Option<ScrollMetrics>,
}

impl ChatController {
    pub fn new(engine: Arc<SyncEngine>, settings: ViewSettings, runtime: Handle) -> Self {
        let subscription = engine.subscribe();
        let (outcome_sender, outcome_receiver) = mpsc::unbounded_channel();
        Self {
            engine,
            runtime,
            settings,
            subscription: Some(subscription),
            outcome_sender: Some(outcome_sender),
            outcome_receiver: Some(outcome_receiver),
            messages: Vec::new(),
            echoes: Vec::new(),
            state: ViewState::default(),
            scroll: None,
        }
    }

    /// Applies finished sends and the newest snapshot. Called once per frame.
    pub fn poll_events(&mut self) {
        if self.is_disposed() {
            return;
        }

        while let Some(outcome) = self
            .outcome_receiver
            .as_mut()
            .and_then(|receiver| receiver.try_recv().ok())
        {
            self.on_send_completed(outcome);
        }

        if let Some(snapshot) = self.subscription.as_mut().and_then(Subscription::take_latest) {
            self.on_snapshot_received(snapshot);
        }
    }

    pub fn on_snapshot_received(&mut self, snapshot: Vec<ChatMessage>) {
        if self.is_disposed() {
            return;
        }

        let was_at_bottom = self.is_scrolled_to_bottom();
        let first_load = snapshot.len() == 1;

        self.messages = snapshot
            .into_iter()
            .map(|message| message.for_viewer(&self.settings.current_user))
            .collect();
        self.reconcile_echoes();

        if was_at_bottom || first_load {
            self.state.should_auto_scroll = true;
        }
    }

    pub fn on_input_change(&mut self, text: String) {
        if self.is_disposed() || text == self.state.draft_text {
            return;
        }
        self.state.draft_text = text;
        self.state.send_error = None;
    }

    pub fn on_submit(&mut self) -> bool {
        let draft = self.state.draft_text.clone();
        self.send_message(&draft)
    }

    pub fn on_enter_key(&mut self) -> bool {
        self.on_submit()
    }

    /// Returns `false` when nothing was sent: blank text or a send in flight.
    pub fn send_message(&mut self, text: &str) -> bool {
        if self.is_disposed() || self.state.is_sending {
            return false;
        }
        let content = text.trim();
        if content.is_empty() {
            return false;
        }
        let Some(outcomes) = self.outcome_sender.clone() else {
            return false;
        };

        let request = SendMessageRequest {
            content: content.to_string(),
            sender: self.settings.current_user.clone(),
        };
        self.state.draft_text.clear();
        self.state.is_sending = true;
        self.state.send_error = None;
        let echo_id = self.settings.local_echo.then(|| self.push_echo(&request));

        let engine = Arc::clone(&self.engine);
        self.runtime.spawn(async move {
            let result = engine.submit(request).await;
            // A closed channel means the view is gone; the completion is dropped.
            let _ = outcomes.send(SendOutcome { echo_id, result });
        });
        true
    }

    pub fn record_scroll_metrics(&mut self, metrics: ScrollMetrics) {
        if !self.is_disposed() {
            self.scroll = Some(metrics);
        }
    }

    /// Post-render hook: performs at most one pending scroll per qualifying update.
    pub fn after_render(&mut self, surface: &mut impl ScrollSurface) {
        if self.is_disposed() || !self.state.should_auto_scroll {
            return;
        }
        surface.scroll_to_bottom();
        self.state.should_auto_scroll = false;
    }

    pub fn dispose(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            self.outcome_sender = None;
            self.outcome_receiver = None;
            log::debug!("Chat view disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.subscription.is_none()
    }

    /// The latest snapshot followed by any not-yet-confirmed local echoes.
    pub fn visible_messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().chain(self.echoes.iter())
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn draft_text(&self) -> &str {
        &self.state.draft_text
    }

    pub fn is_sending(&self) -> bool {
        self.state.is_sending
    }

    pub fn send_error(&self) -> Option<&str> {
        self.state.send_error.as_deref()
    }

    pub fn can_send(&self) -> bool {
        !self.state.is_sending && !self.state.draft_text.trim().is_empty()
    }

    pub fn current_user(&self) -> &str {
        &self.settings.current_user
    }

    fn on_send_completed(&mut self, outcome: SendOutcome) {
        self.state.is_sending = false;
        match outcome.result {
            Ok(ack) => {
                if let Some(stored) = ack.message() {
                    log::debug!("Server stored message {}", stored.id);
                }
                self.state.should_auto_scroll = true;
            }
            Err(err) => {
                if let Some(echo_id) = outcome.echo_id {
                    self.echoes.retain(|echo| echo.id != echo_id);
                }
                self.state.send_error = Some(format!("Message not sent: {err}"));
            }
        }
    }

    fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll
            .is_some_and(|metrics| metrics.is_near_bottom(self.settings.scroll_threshold))
    }

    fn push_echo(&mut self, request: &SendMessageRequest) -> String {
        let echo = ChatMessage {
            id: format!("local-{}", Uuid::new_v4()),
            content: request.content.clone(),
            sender: request.sender.clone(),
            timestamp: Utc::now(),
            is_current_user: true,
        };
        let id = echo.id.clone();
        self.echoes.push(echo);
        self.state.should_auto_scroll = true;
        id
    }

    // Echoes carry no server id, so they are matched on sender + content within
    // the window. Unmatched echoes older than the window are dropped as well.
    fn reconcile_echoes(&mut self) {
        if self.echoes.is_empty() {
            return;
        }
        let window = TimeDelta::from_std(self.settings.echo_match_window).unwrap_or(TimeDelta::MAX);
        let now = Utc::now();
        let messages = &self.messages;

        self.echoes.retain(|echo| {
            let delivered = messages.iter().any(|message| {
                message.sender == echo.sender
                    && message.content == echo.content
                    && (message.timestamp - echo.timestamp).abs() <= window
            });
            !delivered && now - echo.timestamp <= window
        });
    }
}

impl Drop for ChatController {
    fn drop(&mut self) {
        self.dispose();
    }
}
