//! Review statuses and the notification text built from them.

use crate::error::BotError;
use serde_json::Value;

/// Review statuses the bot understands, with the verdict text sent to the
/// chat. Any status outside this table is reported as an error instead of
/// being silently forwarded.
pub const VERDICTS: &[(&str, &str)] = &[
    (
        "approved",
        "Работа проверена: ревьюеру всё понравилось. Ура!",
    ),
    ("reviewing", "Работа взята на проверку ревьюером."),
    ("rejected", "Работа проверена: у ревьюера есть замечания."),
];

fn verdict_for(status: &str) -> Option<&'static str> {
    VERDICTS
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, text)| *text)
}

fn require_str<'a>(record: &'a Value, key: &'static str) -> Result<&'a str, BotError> {
    record
        .get(key)
        .ok_or(BotError::MissingKey { key })?
        .as_str()
        .ok_or(BotError::Malformed {
            key,
            expected: "a string",
        })
}

/// Render the notification text for a single homework record.
///
/// # Errors
///
/// Returns [`BotError::MissingKey`] or [`BotError::Malformed`] when the
/// record lacks a usable `homework_name` or `status`, and
/// [`BotError::UnknownStatus`] when the status is not in [`VERDICTS`].
pub fn format_status_message(record: &Value) -> Result<String, BotError> {
    let name = require_str(record, "homework_name")?;
    let status = require_str(record, "status")?;

    let verdict = verdict_for(status).ok_or_else(|| BotError::UnknownStatus {
        status: status.to_string(),
        homework: name.to_string(),
    })?;

    Ok(format!(
        "Изменился статус проверки работы \"{name}\". {verdict}"
    ))
}
