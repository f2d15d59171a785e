//! Error taxonomy for the polling agent.
//!
//! Every fallible step of a poll cycle reports through [`BotError`], so the
//! loop body has a single place to catch, log, and forward failures.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while polling the review API and notifying the chat.
#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The request never produced a usable response: connection failure,
    /// timeout, or a body that is not valid JSON.
    #[error("request to the homework API failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a status other than 200 OK.
    #[error("homework API returned HTTP {status}")]
    HttpStatus {
        /// Status code of the rejected response.
        status: StatusCode,
    },

    /// A required key is absent from the API response.
    #[error("key `{key}` is missing from the API response")]
    MissingKey {
        /// Name of the absent key.
        key: &'static str,
    },

    /// A required key is present but holds a value of the wrong shape.
    #[error("malformed API response: `{key}` is not {expected}")]
    Malformed {
        /// Name of the offending key.
        key: &'static str,
        /// What the value was expected to be.
        expected: &'static str,
    },

    /// A homework carries a status that is not in the verdict table.
    #[error("unknown status `{status}` for homework `{homework}`")]
    UnknownStatus {
        /// The unrecognized status value.
        status: String,
        /// Name of the homework carrying it.
        homework: String,
    },

    /// Telegram refused or failed to deliver a notification.
    #[error("failed to deliver notification: {0}")]
    Delivery(#[from] teloxide::RequestError),
}
