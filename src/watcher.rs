//! The polling loop that watches for homework status changes.

use crate::api::{validate_response, HomeworkApi};
use crate::error::BotError;
use crate::notify::Notifier;
use crate::verdict::format_status_message;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Periodically fetches review statuses and forwards changes to the chat.
///
/// The watcher keeps a cursor, the `from_date` of the next request. The
/// cursor only moves to the server's `current_date` after a fully successful
/// cycle, so any failure makes the next cycle re-request the same window and
/// no status change can be skipped.
pub struct StatusWatcher<A, N> {
    api: A,
    notifier: N,
    interval: Duration,
    cursor: i64,
}

impl<A, N> StatusWatcher<A, N>
where
    A: HomeworkApi,
    N: Notifier,
{
    /// Create a watcher that starts polling from the `start_from` timestamp.
    pub fn new(api: A, notifier: N, interval: Duration, start_from: i64) -> Self {
        Self {
            api,
            notifier,
            interval,
            cursor: start_from,
        }
    }

    /// Timestamp the next cycle will use as `from_date`.
    #[must_use]
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Poll forever, sleeping for the configured interval between cycles.
    pub async fn run(mut self) {
        loop {
            self.run_cycle().await;
            sleep(self.interval).await;
        }
    }

    /// Run a single poll cycle.
    ///
    /// Any failure is logged and reported to the chat with the
    /// `Сбой в работе программы:` prefix; the cursor is left untouched so
    /// the next cycle retries the same window.
    pub async fn run_cycle(&mut self) {
        match self.poll_once().await {
            Ok(Some(text)) => info!("Reported status change: {text}"),
            Ok(None) => debug!("No new homework statuses"),
            Err(e) => {
                error!(error = %e, "Poll cycle failed");
                let report = format!("Сбой в работе программы: {e}");
                self.notifier.notify(&report).await;
            }
        }
    }

    async fn poll_once(&mut self) -> Result<Option<String>, BotError> {
        let payload = self.api.fetch_statuses(self.cursor).await?;
        let batch = validate_response(&payload)?;

        // The most recent record is the last one
        let text = match batch.homeworks.last() {
            Some(record) => {
                let text = format_status_message(record)?;
                self.notifier.notify(&text).await;
                Some(text)
            }
            None => None,
        };

        self.cursor = batch.current_date;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockHomeworkApi;
    use crate::notify::MockNotifier;
    use mockall::predicate::eq;
    use reqwest::StatusCode;
    use serde_json::json;

    const INTERVAL: Duration = Duration::from_secs(600);

    #[tokio::test]
    async fn test_reports_latest_homework_and_advances_cursor() {
        let mut api = MockHomeworkApi::new();
        api.expect_fetch_statuses()
            .with(eq(100))
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "current_date": 250,
                    "homeworks": [
                        {"homework_name": "hw_old", "status": "approved"},
                        {"homework_name": "hw_new", "status": "reviewing"},
                    ],
                }))
            });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|text| {
                text == "Изменился статус проверки работы \"hw_new\". \
                         Работа взята на проверку ревьюером."
            })
            .times(1)
            .returning(|_| ());

        let mut watcher = StatusWatcher::new(api, notifier, INTERVAL, 100);
        watcher.run_cycle().await;

        assert_eq!(watcher.cursor(), 250);
    }

    #[tokio::test]
    async fn test_empty_batch_is_silent_but_advances_cursor() {
        let mut api = MockHomeworkApi::new();
        api.expect_fetch_statuses()
            .with(eq(100))
            .times(1)
            .returning(|_| Ok(json!({"current_date": 175, "homeworks": []})));

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let mut watcher = StatusWatcher::new(api, notifier, INTERVAL, 100);
        watcher.run_cycle().await;

        assert_eq!(watcher.cursor(), 175);
    }

    #[tokio::test]
    async fn test_http_failure_reports_and_keeps_cursor() {
        let mut api = MockHomeworkApi::new();
        // Both cycles must re-request the same window
        api.expect_fetch_statuses()
            .with(eq(100))
            .times(2)
            .returning(|_| {
                Err(BotError::HttpStatus {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                })
            });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|text| text.starts_with("Сбой в работе программы:") && text.contains("503"))
            .times(2)
            .returning(|_| ());

        let mut watcher = StatusWatcher::new(api, notifier, INTERVAL, 100);
        watcher.run_cycle().await;
        watcher.run_cycle().await;

        assert_eq!(watcher.cursor(), 100);
    }

    #[tokio::test]
    async fn test_unknown_status_reports_failure() {
        let mut api = MockHomeworkApi::new();
        api.expect_fetch_statuses().times(1).returning(|_| {
            Ok(json!({
                "current_date": 300,
                "homeworks": [{"homework_name": "hw1", "status": "lost"}],
            }))
        });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|text| text.starts_with("Сбой в работе программы:") && text.contains("lost"))
            .times(1)
            .returning(|_| ());

        let mut watcher = StatusWatcher::new(api, notifier, INTERVAL, 100);
        watcher.run_cycle().await;

        // A cycle that failed after fetching must not move the cursor
        assert_eq!(watcher.cursor(), 100);
    }

    #[tokio::test]
    async fn test_schema_error_reports_failure() {
        let mut api = MockHomeworkApi::new();
        api.expect_fetch_statuses()
            .times(1)
            .returning(|_| Ok(json!({"current_date": 300})));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|text| text.starts_with("Сбой в работе программы:") && text.contains("homeworks"))
            .times(1)
            .returning(|_| ());

        let mut watcher = StatusWatcher::new(api, notifier, INTERVAL, 100);
        watcher.run_cycle().await;

        assert_eq!(watcher.cursor(), 100);
    }
}
