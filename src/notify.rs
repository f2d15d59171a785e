//! Best-effort delivery of notifications to a Telegram chat.
//!
//! Delivery failures are logged and swallowed so a Telegram outage can never
//! stall the polling loop or corrupt its cursor.

use crate::config::Settings;
use crate::error::BotError;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Recipient};
use tracing::{debug, error};

/// Upper bound for one outgoing message, kept below the Bot API hard limit
/// of 4096 characters.
pub const MESSAGE_CHAR_LIMIT: usize = 4000;

/// Outbound channel for status changes and failure reports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to the configured chat, best effort.
    async fn notify(&self, text: &str);
}

/// Notifier backed by the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat: Recipient,
}

impl TelegramNotifier {
    /// Build a notifier for the chat named in the settings.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Config`] when `telegram_chat_id` is neither a
    /// numeric id nor an `@channelname`.
    pub fn new(settings: &Settings) -> Result<Self, BotError> {
        let chat = parse_recipient(&settings.telegram_chat_id).ok_or_else(|| {
            BotError::Config(config::ConfigError::Message(format!(
                "TELEGRAM_CHAT_ID must be a numeric id or @channelname, got `{}`",
                settings.telegram_chat_id
            )))
        })?;

        Ok(Self {
            bot: Bot::new(settings.telegram_token.clone()),
            chat,
        })
    }

    async fn send(&self, text: &str) -> Result<(), BotError> {
        let text = truncate_chars(text, MESSAGE_CHAR_LIMIT);
        self.bot.send_message(self.chat.clone(), text).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) {
        match self.send(text).await {
            Ok(()) => debug!("Notification delivered to Telegram"),
            Err(e) => error!(error = %e, "Failed to deliver notification"),
        }
    }
}

/// Interpret a raw chat id string as a Telegram recipient.
///
/// Accepts a numeric chat id, including the negative ids of groups, or a
/// channel username starting with `@`.
#[must_use]
pub fn parse_recipient(raw: &str) -> Option<Recipient> {
    let raw = raw.trim();
    if let Some(username) = raw.strip_prefix('@') {
        if username.is_empty() {
            return None;
        }
        return Some(Recipient::ChannelUsername(raw.to_string()));
    }
    raw.parse::<i64>().ok().map(|id| Recipient::Id(ChatId(id)))
}

/// Truncates a string to a maximum number of characters, respecting UTF-8
/// boundaries.
fn truncate_chars(input: &str, max_chars: usize) -> &str {
    input
        .char_indices()
        .nth(max_chars)
        .map_or(input, |(idx, _)| &input[..idx])
}
