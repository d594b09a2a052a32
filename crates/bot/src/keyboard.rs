//! Quick-reply keyboard rendering shared by the chat adapters.

use serde_json::{json, Value};

use tabel_core::resolver::replies::QuickReply;

/// Bitrix keyboard: one flat row of `BUTTONS`. Bitrix has no native
/// request-location button, so that variant degrades to a plain text button.
pub fn bitrix_buttons(quick_replies: &[QuickReply]) -> Value {
    let buttons: Vec<Value> = quick_replies
        .iter()
        .map(|quick_reply| match quick_reply {
            QuickReply::Text { label, payload } => json!({
                "TEXT": label,
                "COMMAND": payload,
                "BLOCK": "Y",
            }),
            QuickReply::RequestLocation { label } => json!({
                "TEXT": label,
                "COMMAND": "location",
                "BLOCK": "Y",
            }),
        })
        .collect();

    json!({ "BUTTONS": buttons })
}

/// Telegram reply keyboard: one button per row, hidden after use.
pub fn telegram_keyboard(quick_replies: &[QuickReply]) -> Value {
    let rows: Vec<Value> = quick_replies
        .iter()
        .map(|quick_reply| match quick_reply {
            QuickReply::Text { label, .. } => json!([{ "text": label }]),
            QuickReply::RequestLocation { label } => {
                json!([{ "text": label, "request_location": true }])
            }
        })
        .collect();

    json!({
        "keyboard": rows,
        "resize_keyboard": true,
        "one_time_keyboard": true,
    })
}

#[cfg(test)]
mod tests {
    use tabel_core::resolver::replies::QuickReply;

    use super::{bitrix_buttons, telegram_keyboard};

    #[test]
    fn telegram_location_button_sets_the_request_flag() {
        let keyboard = telegram_keyboard(&[QuickReply::request_location("Отправить геопозицию")]);

        let row = &keyboard["keyboard"][0][0];
        assert_eq!(row["text"], "Отправить геопозицию");
        assert_eq!(row["request_location"], true);
    }

    #[test]
    fn telegram_text_buttons_render_one_per_row() {
        let keyboard = telegram_keyboard(&[
            QuickReply::text("Пришел", "пришел"),
            QuickReply::text("Статус", "статус"),
        ]);

        assert_eq!(keyboard["keyboard"].as_array().map(Vec::len), Some(2));
        assert_eq!(keyboard["keyboard"][1][0]["text"], "Статус");
        assert!(keyboard["keyboard"][1][0].get("request_location").is_none());
    }

    #[test]
    fn bitrix_buttons_carry_the_command_payload() {
        let keyboard = bitrix_buttons(&[QuickReply::text("Ушел", "ушел")]);

        assert_eq!(keyboard["BUTTONS"][0]["TEXT"], "Ушел");
        assert_eq!(keyboard["BUTTONS"][0]["COMMAND"], "ушел");
    }
}
