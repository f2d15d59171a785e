use chrono::Utc;
use dotenvy::dotenv;
use practicum_status_bot::api::PracticumClient;
use practicum_status_bot::config::{get_log_file, get_poll_interval_secs, Settings};
use practicum_status_bot::notify::TelegramNotifier;
use practicum_status_bot::watcher::StatusWatcher;
use regex::Regex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting sensitive data
struct RedactionPatterns {
    token1: Regex,
    token2: Regex,
    token3: Regex,
    oauth1: Regex,
    oauth2: Regex,
    oauth3: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token1: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            token2: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            token3: Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
            oauth1: Regex::new(r"(OAuth )[0-9A-Za-z._-]+")?,
            oauth2: Regex::new(r"y0_[0-9A-Za-z_-]{10,}")?,
            oauth3: Regex::new(r"PRACTICUM_TOKEN=[^\s&]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        output = self
            .token1
            .replace_all(&output, "$1[TELEGRAM_TOKEN]$3")
            .to_string();
        output = self
            .token2
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .token3
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .oauth1
            .replace_all(&output, "$1[PRACTICUM_TOKEN]")
            .to_string();
        output = self
            .oauth2
            .replace_all(&output, "[PRACTICUM_TOKEN]")
            .to_string();
        output = self
            .oauth3
            .replace_all(&output, "PRACTICUM_TOKEN=[MASKED]")
            .to_string();
        output
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // We return the original buffer length to satisfy the contract,
        // even if the redacted string length differs.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Initialize redaction patterns early (before logging)
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    // Setup logging with redaction
    init_logging(patterns);

    info!("Starting Practicum homework status bot...");

    // Load settings
    let settings = init_settings();

    // Initialize Telegram delivery and the API client
    let notifier = init_notifier(&settings);
    let api = PracticumClient::new(&settings);

    // Only statuses published after startup are reported
    let interval = Duration::from_secs(get_poll_interval_secs());
    let start_from = Utc::now().timestamp();

    info!(
        "Bot is running (interval: {}s, from_date: {})",
        interval.as_secs(),
        start_from
    );

    StatusWatcher::new(api, notifier, interval, start_from)
        .run()
        .await;

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_writer = RedactingMakeWriter::new(io::stderr, patterns.clone());

    // The log file gets the same redacted stream; if it cannot be opened the
    // bot still runs with stderr logging alone
    let log_file = get_log_file();
    let file_layer = match open_log_file(&log_file) {
        Ok(file) => {
            let file = Arc::new(file);
            let file_writer = RedactingMakeWriter::new(move || Arc::clone(&file), patterns);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(file_writer),
            )
        }
        Err(e) => {
            eprintln!("Failed to open log file `{log_file}`: {e}. Logging to stderr only.");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stderr_writer))
        .with(file_layer)
        .init();
}

fn open_log_file(path: &str) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn init_settings() -> Settings {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_notifier(settings: &Settings) -> TelegramNotifier {
    match TelegramNotifier::new(settings) {
        Ok(n) => {
            info!("Telegram notifier initialized.");
            n
        }
        Err(e) => {
            error!("Failed to initialize Telegram notifier: {}", e);
            std::process::exit(1);
        }
    }
}
