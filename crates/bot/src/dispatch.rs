//! Outbound message delivery. The webhook handler hands rendered payloads to
//! a `MessageDispatcher`; the HTTP implementation posts them to the backend
//! endpoint configured for the installation.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("message delivery request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend `{backend_id}` answered {status}")]
    BackendStatus { backend_id: String, status: u16 },
}

#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    async fn deliver(&self, backend_id: &str, payload: &Value) -> Result<(), DispatchError>;
}

/// Posts rendered messages to `{base_url}/{backend_id}` with an optional
/// bearer token.
pub struct HttpDispatcher {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl HttpDispatcher {
    pub fn new(base_url: impl Into<String>, token: Option<SecretString>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into(), token }
    }
}

#[async_trait]
impl MessageDispatcher for HttpDispatcher {
    async fn deliver(&self, backend_id: &str, payload: &Value) -> Result<(), DispatchError> {
        let url = format!("{}/{backend_id}", self.base_url.trim_end_matches('/'));

        let mut request = self.client.post(&url).json(payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::BackendStatus {
                backend_id: backend_id.to_owned(),
                status: status.as_u16(),
            });
        }

        debug!(
            event_name = "dispatch.message_delivered",
            backend_id,
            status = status.as_u16(),
            "delivered outbound message"
        );
        Ok(())
    }
}

/// Records deliveries instead of sending them. Used by the route tests and
/// by local runs without a configured backend endpoint.
#[derive(Default)]
pub struct NoopDispatcher {
    deliveries: Mutex<Vec<(String, Value)>>,
}

impl NoopDispatcher {
    pub async fn deliveries(&self) -> Vec<(String, Value)> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl MessageDispatcher for NoopDispatcher {
    async fn deliver(&self, backend_id: &str, payload: &Value) -> Result<(), DispatchError> {
        let mut deliveries = self.deliveries.lock().await;
        deliveries.push((backend_id.to_owned(), payload.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{MessageDispatcher, NoopDispatcher};

    #[tokio::test]
    async fn noop_dispatcher_records_deliveries_in_order() {
        let dispatcher = NoopDispatcher::default();

        dispatcher
            .deliver("telegram", &json!({ "chat_id": "42", "text": "Приход отмечен" }))
            .await
            .expect("deliver");
        dispatcher
            .deliver("bitrix", &json!({ "DIALOG_ID": "chat17", "MESSAGE": "ok" }))
            .await
            .expect("deliver");

        let deliveries = dispatcher.deliveries().await;
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].0, "telegram");
        assert_eq!(deliveries[1].1["DIALOG_ID"], "chat17");
    }
}
