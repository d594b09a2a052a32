//! Outbound reply catalog. The resolver produces backend-agnostic replies;
//! chat adapters translate the quick replies into their native keyboards.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::event::{AttendanceEvent, DayLog, EventKind, EventStatus};

/// Suggested response shown alongside a message. `Text` sends its payload
/// back as a typed command; `RequestLocation` asks the client to share a
/// geolocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuickReply {
    Text { label: String, payload: String },
    RequestLocation { label: String },
}

impl QuickReply {
    pub fn text(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::Text { label: label.into(), payload: payload.into() }
    }

    pub fn request_location(label: impl Into<String>) -> Self {
        Self::RequestLocation { label: label.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), quick_replies: Vec::new() }
    }

    pub fn with_quick_replies(text: impl Into<String>, quick_replies: Vec<QuickReply>) -> Self {
        Self { text: text.into(), quick_replies }
    }
}

fn command_menu() -> Vec<QuickReply> {
    vec![
        QuickReply::text("Пришел", "пришел"),
        QuickReply::text("Ушел", "ушел"),
        QuickReply::text("Статус", "статус"),
    ]
}

pub fn ready() -> Reply {
    Reply::with_quick_replies(
        "Бот учёта рабочего времени готов. Отправьте «помощь» для списка команд.",
        command_menu(),
    )
}

pub fn help() -> Reply {
    Reply::with_quick_replies(
        "Команды:\n\
         «пришел» — отметить приход (потребуется геопозиция)\n\
         «ушел» — отметить уход (потребуется геопозиция)\n\
         «статус» — отметки за сегодня\n\
         «помощь» — это сообщение",
        command_menu(),
    )
}

pub fn unknown_command() -> Reply {
    Reply::with_quick_replies(
        "Не понимаю команду. Отправьте «помощь» для списка команд.",
        command_menu(),
    )
}

pub fn request_location(kind: EventKind) -> Reply {
    let text = match kind {
        EventKind::In => "Отправьте свою геопозицию, чтобы отметить приход.",
        EventKind::Out => "Отправьте свою геопозицию, чтобы отметить уход.",
    };
    Reply::with_quick_replies(text, vec![QuickReply::request_location("Отправить геопозицию")])
}

pub fn check_in_recorded(at: NaiveDateTime) -> Reply {
    Reply::plain(format!("Приход отмечен в {}. Хорошего дня!", at.format("%H:%M")))
}

pub fn check_in_out_of_zone() -> Reply {
    Reply::plain("Вы вне офисной зоны, приход не отмечен. Подойдите ближе к офису и попробуйте снова.")
}

pub fn check_out_recorded(at: NaiveDateTime, status: EventStatus) -> Reply {
    match status {
        EventStatus::Ok => {
            Reply::plain(format!("Уход отмечен в {}. До завтра!", at.format("%H:%M")))
        }
        EventStatus::OutOfZone => {
            Reply::plain(format!("Уход отмечен в {} (вне зоны).", at.format("%H:%M")))
        }
    }
}

pub fn already_checked_in() -> Reply {
    Reply::plain("Приход сегодня уже отмечен.")
}

pub fn already_checked_out() -> Reply {
    Reply::plain("Уход сегодня уже отмечен.")
}

pub fn day_complete() -> Reply {
    Reply::plain("Сегодня уже отмечены и приход, и уход.")
}

pub fn check_in_first() -> Reply {
    Reply::with_quick_replies(
        "Сначала отметьте приход.",
        vec![QuickReply::text("Пришел", "пришел")],
    )
}

pub fn invalid_location() -> Reply {
    Reply::plain("Не удалось распознать геопозицию. Попробуйте отправить её ещё раз.")
}

pub fn apology() -> Reply {
    Reply::plain("Что-то пошло не так. Попробуйте ещё раз чуть позже.")
}

pub fn status_summary(log: &DayLog) -> Reply {
    let check_in = match log.check_in() {
        Some(event) => timestamp_line(event),
        None => "не отмечен".to_owned(),
    };
    let check_out = match (log.check_out(), log.check_in()) {
        (Some(event), _) => timestamp_line(event),
        (None, Some(_)) => "ожидается".to_owned(),
        (None, None) => "не отмечен".to_owned(),
    };

    Reply::with_quick_replies(
        format!("Пришел: {check_in}\nУшел: {check_out}"),
        command_menu(),
    )
}

fn timestamp_line(event: &AttendanceEvent) -> String {
    let time = event.recorded_at.format("%H:%M");
    match event.status {
        EventStatus::Ok => time.to_string(),
        EventStatus::OutOfZone => format!("{time} (вне зоны)"),
    }
}
