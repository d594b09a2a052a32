/// Recognized command vocabulary. Matching is case-insensitive and ignores
/// surrounding whitespace; anything else is `Unknown`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BotCommand {
    CheckIn,
    CheckOut,
    Status,
    Help,
    Unknown,
}

const CHECK_IN_WORDS: &[&str] = &["пришел", "start", "начал"];
const CHECK_OUT_WORDS: &[&str] = &["ушел", "уход", "конец"];
const STATUS_WORDS: &[&str] = &["статус", "status"];
const HELP_WORDS: &[&str] = &["помощь", "help"];

pub fn parse_command(text: &str) -> BotCommand {
    let normalized = text.trim().to_lowercase();

    if CHECK_IN_WORDS.contains(&normalized.as_str()) {
        BotCommand::CheckIn
    } else if CHECK_OUT_WORDS.contains(&normalized.as_str()) {
        BotCommand::CheckOut
    } else if STATUS_WORDS.contains(&normalized.as_str()) {
        BotCommand::Status
    } else if HELP_WORDS.contains(&normalized.as_str()) {
        BotCommand::Help
    } else {
        BotCommand::Unknown
    }
}
