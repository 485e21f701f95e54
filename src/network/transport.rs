use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::common::{ChatError, ChatMessage, ChatResult, SendAck, SendMessageRequest};

/// Remote side of the conversation: one read of the full list, one write.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn fetch_messages(&self) -> ChatResult<Vec<ChatMessage>>;

    async fn send_message(&self, request: &SendMessageRequest) -> ChatResult<SendAck>;
}

/// `GET`/`POST` against a single message endpoint.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> ChatResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(endpoint, client)
    }

    pub fn with_client(endpoint: &str, client: Client) -> ChatResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|err| ChatError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ChatError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme `{}`", endpoint.scheme()),
            });
        }

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpTransport {
    async fn fetch_messages(&self) -> ChatResult<Vec<ChatMessage>> {
        let response = self.client.get(self.endpoint.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_message(&self, request: &SendMessageRequest) -> ChatResult<SendAck> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(SendAck::new(parse_ack_body(&body)))
    }
}

// The write endpoint may answer with anything; keep whatever it said.
fn parse_ack_body(body: &str) -> serde_json::Value {
    if body.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|err| {
        log::debug!("Send response is not JSON ({err}); keeping raw text");
        serde_json::Value::String(body.to_string())
    })
}
