//! Per-backend webhook adapters. Each adapter plucks fields from its
//! platform's payload into the core's `InboundEvent` and renders a `Reply`
//! back into the platform's outbound message shape.

pub mod bitrix;
pub mod telegram;

use serde_json::Value;
use thiserror::Error;

use tabel_core::resolver::{replies::Reply, InboundEvent};

pub use bitrix::BitrixAdapter;
pub use telegram::TelegramAdapter;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),
}

/// One chat platform. `parse_webhook` returns `Ok(None)` for callbacks that
/// carry no user message (joins, installs, edits); those are acknowledged
/// without touching the resolver.
pub trait ChatBackend: Send + Sync {
    fn id(&self) -> &'static str;

    fn parse_webhook(&self, payload: &Value) -> Result<Option<InboundEvent>, AdapterError>;

    fn render_reply(&self, dialog_id: &str, reply: &Reply) -> Value;
}
