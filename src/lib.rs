#![deny(missing_docs)]
//! Practicum homework status bot.
//!
//! Polls the Yandex Practicum review API for homework verdicts and forwards
//! every status change to a Telegram chat. The loop never dies on its own:
//! a failed cycle is logged and reported to the same chat, then retried
//! after the usual pause.

/// Review API client and response validation.
pub mod api;
/// Configuration management.
pub mod config;
/// Error taxonomy shared across the crate.
pub mod error;
/// Telegram delivery of notifications.
pub mod notify;
/// Review statuses and verdict texts.
pub mod verdict;
/// The polling loop.
pub mod watcher;
