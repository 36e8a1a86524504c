//! Test doubles for the delivery client and log sink.

use async_trait::async_trait;
use slackbuf_core::error::{Result, SlackBufError};
use slackbuf_core::traits::{Delivery, LogSink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every delivery attempt, optionally failing or stalling.
#[derive(Default)]
pub(crate) struct RecordingDelivery {
    attempts: Mutex<Vec<String>>,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl RecordingDelivery {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay: Some(delay), ..Self::default() })
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    fn name(&self) -> &str { "recording" }

    async fn deliver(&self, message: &str) -> Result<()> {
        self.attempts.lock().unwrap().push(message.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(SlackBufError::transport("simulated outage"));
        }
        Ok(())
    }
}

/// Log sink that keeps every record.
#[derive(Default)]
pub(crate) struct RecordingSink {
    records: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn records(&self) -> Vec<String> {
        self.records.lock().unwrap().clone()
    }
}

impl LogSink for RecordingSink {
    fn record(&self, message: &str) {
        self.records.lock().unwrap().push(message.to_string());
    }
}
