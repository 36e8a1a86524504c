//! # slackbuf
//!
//! Buffered Slack notifications. Messages added from anywhere are collected
//! by a background task and posted as one newline-joined message per
//! interval.
//!
//! ```no_run
//! # async fn demo() -> slackbuf::Result<()> {
//! let slack = slackbuf::SlackBuffer::new("xoxb-token", "#alerts");
//! slack.add_message("disk usage above 90%");
//! slack.send_message("deploy finished").await?;
//! slack.close().await;
//! # Ok(())
//! # }
//! ```

use slackbuf_channels::SlackChannel;
use slackbuf_core::traits::LogSink;
use std::sync::Arc;
use std::time::Duration;

pub use slackbuf_core::config::SlackBufConfig;
pub use slackbuf_core::error::{Result, SlackBufError};
pub use slackbuf_core::traits::{NoopSink, Notifier, StderrSink, TracingSink};
pub use slackbuf_core::types::LifecycleState;
pub use slackbuf_scheduler::{Admission, BufferOptions, BufferService};
pub use tokio_util::sync::CancellationToken;

/// Buffered Slack notifier.
pub struct SlackBuffer {
    service: BufferService,
}

impl SlackBuffer {
    /// Defaults: 1s interval, queue of 10, stderr log sink, 5s timeout.
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::builder(token, channel).start()
    }

    pub fn with_options(
        token: impl Into<String>,
        channel: impl Into<String>,
        options: BufferOptions,
    ) -> Self {
        Self::builder(token, channel).options(options).start()
    }

    /// Build from a loaded configuration file.
    pub fn from_config(config: &SlackBufConfig) -> Result<Self> {
        config.validate()?;
        Ok(SlackBufferBuilder {
            channel: SlackChannel::from_config(&config.slack),
            options: BufferOptions::from_config(&config.buffer),
        }
        .start())
    }

    pub fn builder(token: impl Into<String>, channel: impl Into<String>) -> SlackBufferBuilder {
        SlackBufferBuilder::new(token, channel)
    }

    /// Queue a message for the next batch. Never blocks.
    pub fn add_message(&self, message: impl Into<String>) -> Admission {
        self.service.add_message(message)
    }

    /// Queue a message, waiting up to `wait` for room.
    pub async fn enqueue(&self, message: impl Into<String>, wait: Duration) -> Result<()> {
        self.service.enqueue(message, wait).await
    }

    /// Post immediately, bypassing the buffer.
    pub async fn send_message(&self, message: &str) -> Result<()> {
        self.service.send_message(message).await
    }

    /// Drain, flush once more and stop. Safe to call more than once.
    pub async fn close(&self) {
        self.service.close().await
    }

    pub fn state(&self) -> LifecycleState {
        self.service.state()
    }

    pub fn dropped_count(&self) -> u64 {
        self.service.dropped_count()
    }
}

#[async_trait::async_trait]
impl Notifier for SlackBuffer {
    async fn send_message(&self, message: &str) -> Result<()> {
        self.service.send_message(message).await
    }

    /// The [`Admission`] is discarded here; use
    /// [`SlackBuffer::dropped_count`] to see how many messages were dropped.
    fn add_message(&self, message: String) {
        self.service.add_message(message);
    }

    async fn close(&self) {
        self.service.close().await
    }
}

/// Builder for a [`SlackBuffer`].
pub struct SlackBufferBuilder {
    channel: SlackChannel,
    options: BufferOptions,
}

impl SlackBufferBuilder {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            channel: SlackChannel::new(token, channel),
            options: BufferOptions::default(),
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.options = self.options.interval(interval);
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.options = self.options.queue_capacity(capacity);
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.options = self.options.log_sink(sink);
        self
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.channel = self.channel.with_client(client);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.timeout(timeout);
        self
    }

    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.channel = self.channel.with_api_url(api_url);
        self
    }

    /// Drain and stop when `token` is cancelled, as if `close` was called.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.options = self.options.cancel_on(token);
        self
    }

    pub fn options(mut self, options: BufferOptions) -> Self {
        self.options = options;
        self
    }

    /// Spawn the background service. Must run inside a Tokio runtime.
    pub fn start(self) -> SlackBuffer {
        let options = self.options.normalized();
        let channel = self.channel.with_timeout(options.timeout);
        SlackBuffer {
            service: BufferService::spawn(Arc::new(channel), options),
        }
    }
}
