//! Construction options for the buffer service.

use slackbuf_core::config::{BufferConfig, DEFAULT_INTERVAL_MS, DEFAULT_QUEUE_CAPACITY, DEFAULT_TIMEOUT_MS};
use slackbuf_core::traits::{LogSink, StderrSink};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct BufferOptions {
    /// How often the buffer is flushed. Default 1s.
    pub interval: Duration,
    /// Capacity of the ingress queue. Default 10.
    pub queue_capacity: usize,
    /// Where background failures are reported. Default stderr.
    pub log_sink: Arc<dyn LogSink>,
    /// Bound on every send, scheduled or immediate. Default 5s.
    pub timeout: Duration,
    /// External stop signal. Cancelling it drains and stops the service
    /// exactly like `close`. Default none.
    pub cancel: Option<CancellationToken>,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            log_sink: Arc::new(StderrSink),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            cancel: None,
        }
    }
}

impl BufferOptions {
    pub fn from_config(config: &BufferConfig) -> Self {
        let config = config.clone().normalized();
        Self {
            interval: config.interval(),
            queue_capacity: config.queue_capacity,
            timeout: config.timeout(),
            ..Self::default()
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = sink;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stop the service when `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Replace zero values with defaults.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if self.interval.is_zero() {
            self.interval = defaults.interval;
        }
        if self.queue_capacity == 0 {
            self.queue_capacity = defaults.queue_capacity;
        }
        if self.timeout.is_zero() {
            self.timeout = defaults.timeout;
        }
        self
    }
}

impl std::fmt::Debug for BufferOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferOptions")
            .field("interval", &self.interval)
            .field("queue_capacity", &self.queue_capacity)
            .field("timeout", &self.timeout)
            .field("cancel", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}
