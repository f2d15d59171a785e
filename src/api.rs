//! Client for the homework review API.
//!
//! [`PracticumClient`] performs the authenticated polling request and
//! [`validate_response`] turns the raw JSON into a [`HomeworkBatch`] the
//! watcher can trust.

use crate::config::{get_request_timeout_secs, Settings};
use crate::error::BotError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Read-only access to the homework review API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch raw status data for homeworks reviewed after `from_date`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Transport`] when the request or body read fails,
    /// and [`BotError::HttpStatus`] when the API answers with anything but
    /// 200 OK.
    async fn fetch_statuses(&self, from_date: i64) -> Result<Value, BotError>;
}

/// HTTP client for the Practicum review API.
#[derive(Debug, Clone)]
pub struct PracticumClient {
    http: Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// Build a client from the loaded settings.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(get_request_timeout_secs()))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            endpoint: settings.endpoint.clone(),
            token: settings.practicum_token.clone(),
        }
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch_statuses(&self, from_date: i64) -> Result<Value, BotError> {
        let response = self
            .http
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await?;

        // Check the status before touching the body, so an HTML error page
        // from a proxy surfaces as HttpStatus rather than a JSON error
        let status = response.status();
        if status != StatusCode::OK {
            return Err(BotError::HttpStatus { status });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Validated payload of one poll cycle.
#[derive(Debug, Clone)]
pub struct HomeworkBatch {
    /// Server timestamp to use as the next `from_date`.
    pub current_date: i64,
    /// Homework records; the last entry is the most recent one.
    pub homeworks: Vec<Value>,
}

/// Check the API response against the documented schema.
///
/// # Errors
///
/// Returns [`BotError::Malformed`] when the payload or one of its keys has
/// the wrong shape, and [`BotError::MissingKey`] when a required key is
/// absent.
pub fn validate_response(payload: &Value) -> Result<HomeworkBatch, BotError> {
    if !payload.is_object() {
        return Err(BotError::Malformed {
            key: "response",
            expected: "a JSON object",
        });
    }

    let homeworks = payload
        .get("homeworks")
        .ok_or(BotError::MissingKey { key: "homeworks" })?
        .as_array()
        .ok_or(BotError::Malformed {
            key: "homeworks",
            expected: "an array",
        })?;

    let current_date = payload
        .get("current_date")
        .ok_or(BotError::MissingKey {
            key: "current_date",
        })?
        .as_i64()
        .ok_or(BotError::Malformed {
            key: "current_date",
            expected: "an integer timestamp",
        })?;

    Ok(HomeworkBatch {
        current_date,
        homeworks: homeworks.clone(),
    })
}
