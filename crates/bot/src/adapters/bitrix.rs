use serde_json::{json, Value};

use tabel_core::domain::employee::EmployeeId;
use tabel_core::resolver::{replies::Reply, InboundEvent};

use super::{AdapterError, ChatBackend};
use crate::keyboard::bitrix_buttons;

/// Bitrix24 imbot adapter. Messages arrive as `ONIMBOTMESSAGEADD` events
/// with the text under `data.PARAMS.MESSAGE`; geolocation shares arrive as
/// `LATITUDE`/`LONGITUDE` params on the same event.
#[derive(Default)]
pub struct BitrixAdapter;

impl ChatBackend for BitrixAdapter {
    fn id(&self) -> &'static str {
        "bitrix"
    }

    fn parse_webhook(&self, payload: &Value) -> Result<Option<InboundEvent>, AdapterError> {
        let event = payload["event"].as_str().unwrap_or_default();
        if event != "ONIMBOTMESSAGEADD" {
            return Ok(None);
        }

        let params = &payload["data"]["PARAMS"];
        let user = &payload["data"]["USER"];

        let user_id = field_as_string(&user["ID"])
            .ok_or_else(|| AdapterError::MalformedPayload("missing data.USER.ID".to_owned()))?;
        let dialog_id = field_as_string(&params["DIALOG_ID"]).ok_or_else(|| {
            AdapterError::MalformedPayload("missing data.PARAMS.DIALOG_ID".to_owned())
        })?;

        let location = match (params["LATITUDE"].as_f64(), params["LONGITUDE"].as_f64()) {
            (Some(latitude), Some(longitude)) => Some((latitude, longitude)),
            _ => None,
        };

        Ok(Some(InboundEvent {
            user_id: EmployeeId(user_id),
            dialog_id,
            display_name: user["NAME"].as_str().map(str::to_owned),
            email: user["EMAIL"].as_str().map(str::to_owned),
            text: params["MESSAGE"].as_str().map(str::to_owned),
            location,
        }))
    }

    fn render_reply(&self, dialog_id: &str, reply: &Reply) -> Value {
        let mut message = json!({
            "DIALOG_ID": dialog_id,
            "MESSAGE": reply.text,
        });
        if !reply.quick_replies.is_empty() {
            message["KEYBOARD"] = bitrix_buttons(&reply.quick_replies);
        }
        message
    }
}

/// Bitrix serializes numeric ids inconsistently between installs.
fn field_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use tabel_core::domain::employee::EmployeeId;
    use tabel_core::resolver::replies;

    use crate::adapters::{BitrixAdapter, ChatBackend};

    #[test]
    fn text_message_parses_into_an_inbound_event() {
        let payload = json!({
            "event": "ONIMBOTMESSAGEADD",
            "data": {
                "PARAMS": { "DIALOG_ID": "chat17", "MESSAGE": "статус" },
                "USER": { "ID": 42, "NAME": "Анна", "EMAIL": "anna@example.com" },
            },
        });

        let inbound = BitrixAdapter
            .parse_webhook(&payload)
            .expect("parse")
            .expect("message event");

        assert_eq!(inbound.user_id, EmployeeId("42".to_owned()));
        assert_eq!(inbound.dialog_id, "chat17");
        assert_eq!(inbound.text.as_deref(), Some("статус"));
        assert_eq!(inbound.display_name.as_deref(), Some("Анна"));
        assert!(inbound.location.is_none());
    }

    #[test]
    fn geolocation_share_parses_into_coordinates() {
        let payload = json!({
            "event": "ONIMBOTMESSAGEADD",
            "data": {
                "PARAMS": {
                    "DIALOG_ID": "chat17",
                    "LATITUDE": 57.1521,
                    "LONGITUDE": 65.5921,
                },
                "USER": { "ID": "42" },
            },
        });

        let inbound = BitrixAdapter
            .parse_webhook(&payload)
            .expect("parse")
            .expect("message event");

        assert_eq!(inbound.location, Some((57.1521, 65.5921)));
        assert!(inbound.text.is_none());
    }

    #[test]
    fn non_message_events_are_skipped() {
        let payload = json!({ "event": "ONIMBOTJOINCHAT", "data": {} });
        let parsed = BitrixAdapter.parse_webhook(&payload).expect("parse");
        assert!(parsed.is_none());
    }

    #[test]
    fn message_without_user_id_is_malformed() {
        let payload = json!({
            "event": "ONIMBOTMESSAGEADD",
            "data": { "PARAMS": { "DIALOG_ID": "chat17", "MESSAGE": "hi" }, "USER": {} },
        });

        assert!(BitrixAdapter.parse_webhook(&payload).is_err());
    }

    #[test]
    fn rendered_reply_carries_the_keyboard() {
        let message = BitrixAdapter.render_reply("chat17", &replies::ready());

        assert_eq!(message["DIALOG_ID"], "chat17");
        assert!(message["MESSAGE"].as_str().expect("text").contains("готов"));
        assert!(message["KEYBOARD"]["BUTTONS"].as_array().is_some());
    }

    #[test]
    fn plain_reply_renders_without_a_keyboard() {
        let message = BitrixAdapter.render_reply("chat17", &replies::already_checked_in());
        assert!(message.get("KEYBOARD").is_none());
    }
}
