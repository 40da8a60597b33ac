//! Runtime configuration for a [`Session`](crate::runtime::Session).

use std::time::Duration;

/// Target frame interval of the render worker (60 frames per second).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);
/// Field separator of the input line protocol.
pub const DEFAULT_DELIMITER: &str = ", ";
/// Input line that ends ingestion and shuts the session down.
pub const DEFAULT_END_TOKEN: &str = "exit";

/// Configuration for the workers and the event dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Minimum time between render passes.
    pub frame_interval: Duration,
    /// Separator between fields of an input line.
    pub delimiter: String,
    /// Input line that requests shutdown.
    pub end_token: String,
    /// Re-raise every window when one of them gains focus.
    pub auto_refocus: bool,
    /// Key that toggles pause.
    pub pause_key: char,
    /// How long the ingestion worker waits for a line before re-checking
    /// the run flag.
    pub ingest_poll: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_interval: DEFAULT_FRAME_INTERVAL,
            delimiter: DEFAULT_DELIMITER.to_string(),
            end_token: DEFAULT_END_TOKEN.to_string(),
            auto_refocus: false,
            pause_key: 'p',
            ingest_poll: Duration::from_millis(50),
        }
    }
}

impl RuntimeConfig {
    /// Set the frame interval.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Set the input field delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set the end-of-input token.
    pub fn with_end_token(mut self, token: impl Into<String>) -> Self {
        self.end_token = token.into();
        self
    }

    /// Enable or disable the refocus cascade.
    pub fn with_auto_refocus(mut self, enabled: bool) -> Self {
        self.auto_refocus = enabled;
        self
    }

    /// Set the ingestion poll timeout.
    pub fn with_ingest_poll(mut self, poll: Duration) -> Self {
        self.ingest_poll = poll;
        self
    }
}
