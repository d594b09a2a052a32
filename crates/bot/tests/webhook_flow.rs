//! End-to-end flow across the bot crate seam: native webhook payload in,
//! rendered backend message out, with the real in-memory store underneath.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use tabel_bot::adapters::{BitrixAdapter, ChatBackend, TelegramAdapter};
use tabel_core::geo::{Coordinate, Geofence};
use tabel_core::resolver::AttendanceResolver;
use tabel_db::InMemoryAttendanceStore;

const OFFICE_LAT: f64 = 57.1521;
const OFFICE_LON: f64 = 65.5921;

fn resolver() -> AttendanceResolver {
    let office = Coordinate::new(OFFICE_LAT, OFFICE_LON).expect("valid office point");
    AttendanceResolver::new(Geofence::new(office, 100.0), Arc::new(InMemoryAttendanceStore::default()))
}

fn morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .expect("valid date")
        .and_hms_opt(9, 3, 0)
        .expect("valid time")
}

#[tokio::test]
async fn telegram_location_share_checks_in_and_renders_a_confirmation() {
    let adapter = TelegramAdapter;
    let resolver = resolver();

    let payload = json!({
        "message": {
            "from": { "id": 42, "first_name": "Анна" },
            "chat": { "id": 42 },
            "location": { "latitude": OFFICE_LAT, "longitude": OFFICE_LON },
        },
    });

    let inbound = adapter.parse_webhook(&payload).expect("parse").expect("message");
    let decision = resolver.resolve_at(&inbound, morning()).await.expect("resolve");
    let outbound = adapter.render_reply(&inbound.dialog_id, &decision.reply);

    assert!(decision.recorded.is_some());
    assert_eq!(outbound["chat_id"], "42");
    assert_eq!(outbound["text"], "Приход отмечен в 09:03. Хорошего дня!");
}

#[tokio::test]
async fn bitrix_check_in_command_renders_a_location_request_keyboard() {
    let adapter = BitrixAdapter;
    let resolver = resolver();

    let payload = json!({
        "event": "ONIMBOTMESSAGEADD",
        "data": {
            "PARAMS": { "DIALOG_ID": "chat17", "MESSAGE": "пришел" },
            "USER": { "ID": 42, "NAME": "Анна" },
        },
    });

    let inbound = adapter.parse_webhook(&payload).expect("parse").expect("message");
    let decision = resolver.resolve_at(&inbound, morning()).await.expect("resolve");
    let outbound = adapter.render_reply(&inbound.dialog_id, &decision.reply);

    assert!(decision.recorded.is_none());
    assert_eq!(outbound["DIALOG_ID"], "chat17");
    assert!(outbound["MESSAGE"].as_str().expect("text").contains("геопозицию"));
    assert!(outbound["KEYBOARD"]["BUTTONS"].as_array().is_some());
}

#[tokio::test]
async fn second_telegram_location_on_the_same_day_checks_out() {
    let adapter = TelegramAdapter;
    let resolver = resolver();

    let payload = json!({
        "message": {
            "from": { "id": 42, "first_name": "Анна" },
            "chat": { "id": 42 },
            "location": { "latitude": OFFICE_LAT, "longitude": OFFICE_LON },
        },
    });

    let inbound = adapter.parse_webhook(&payload).expect("parse").expect("message");
    resolver.resolve_at(&inbound, morning()).await.expect("first check-in");

    let decision = resolver.resolve_at(&inbound, morning()).await.expect("second submission");
    let outbound = adapter.render_reply(&inbound.dialog_id, &decision.reply);

    // Second location on a checked-in day is a check-out, not a duplicate.
    assert_eq!(outbound["text"], "Уход отмечен в 09:03. До завтра!");
}
