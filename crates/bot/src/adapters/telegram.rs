use serde_json::{json, Value};

use tabel_core::domain::employee::EmployeeId;
use tabel_core::resolver::{replies::Reply, InboundEvent};

use super::{AdapterError, ChatBackend};
use crate::keyboard::telegram_keyboard;

/// Telegram bot API adapter. Updates without a `message` object (callback
/// queries, edits, channel posts) are skipped.
#[derive(Default)]
pub struct TelegramAdapter;

impl ChatBackend for TelegramAdapter {
    fn id(&self) -> &'static str {
        "telegram"
    }

    fn parse_webhook(&self, payload: &Value) -> Result<Option<InboundEvent>, AdapterError> {
        let Some(message) = payload.get("message") else {
            return Ok(None);
        };

        let user_id = message["from"]["id"]
            .as_i64()
            .ok_or_else(|| AdapterError::MalformedPayload("missing message.from.id".to_owned()))?;
        let chat_id = message["chat"]["id"]
            .as_i64()
            .ok_or_else(|| AdapterError::MalformedPayload("missing message.chat.id".to_owned()))?;

        let location = message.get("location").and_then(|location| {
            match (location["latitude"].as_f64(), location["longitude"].as_f64()) {
                (Some(latitude), Some(longitude)) => Some((latitude, longitude)),
                _ => None,
            }
        });

        Ok(Some(InboundEvent {
            user_id: EmployeeId(user_id.to_string()),
            dialog_id: chat_id.to_string(),
            display_name: display_name(&message["from"]),
            email: None,
            text: message["text"].as_str().map(str::to_owned),
            location,
        }))
    }

    fn render_reply(&self, dialog_id: &str, reply: &Reply) -> Value {
        let mut message = json!({
            "chat_id": dialog_id,
            "text": reply.text,
        });
        if !reply.quick_replies.is_empty() {
            message["reply_markup"] = telegram_keyboard(&reply.quick_replies);
        }
        message
    }
}

fn display_name(from: &Value) -> Option<String> {
    let first = from["first_name"].as_str().unwrap_or_default();
    let last = from["last_name"].as_str().unwrap_or_default();
    let full = format!("{first} {last}");
    let full = full.trim();
    if full.is_empty() {
        from["username"].as_str().map(str::to_owned)
    } else {
        Some(full.to_owned())
    }
}
