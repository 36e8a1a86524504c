//! Handle that producers talk to while the event loop runs behind it.

use async_trait::async_trait;
use slackbuf_core::error::{Result, SlackBufError};
use slackbuf_core::traits::{Delivery, Notifier};
use slackbuf_core::types::LifecycleState;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, watch};

use crate::engine::EventLoop;
use crate::ingress::{Admission, Ingress};
use crate::options::BufferOptions;

/// Handle to a running buffer service.
///
/// Dropping the handle without calling [`close`](Self::close) still drains
/// and flushes, but in the background.
pub struct BufferService {
    ingress: Ingress,
    delivery: Arc<dyn Delivery>,
    timeout: Duration,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    state: watch::Receiver<LifecycleState>,
}

impl BufferService {
    /// Start the event loop on the current Tokio runtime.
    pub fn spawn(delivery: Arc<dyn Delivery>, options: BufferOptions) -> Self {
        let options = options.normalized();
        let (ingress, rx) = Ingress::channel(options.queue_capacity, options.log_sink.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (state_tx, state_rx) = watch::channel(LifecycleState::Running);
        let cancel = options.cancel.clone().unwrap_or_default();

        let event_loop = EventLoop::new(
            rx,
            shutdown_rx,
            cancel,
            delivery.clone(),
            options.log_sink.clone(),
            options.interval,
            options.timeout,
            options.queue_capacity,
            state_tx,
        );
        tokio::spawn(event_loop.run());

        Self {
            ingress,
            delivery,
            timeout: options.timeout,
            shutdown: Mutex::new(Some(shutdown_tx)),
            state: state_rx,
        }
    }

    /// Queue a message for the next flush. Never blocks; if the queue is
    /// full or the service is stopping, the message is dropped and counted.
    pub fn add_message(&self, message: impl Into<String>) -> Admission {
        if !self.state().accepts_messages() {
            return self.ingress.reject_closed();
        }
        self.ingress.push(message.into())
    }

    /// Queue a message, waiting up to `wait` for room.
    pub async fn enqueue(&self, message: impl Into<String>, wait: Duration) -> Result<()> {
        self.ingress.push_timeout(message.into(), wait).await
    }

    /// Send immediately on the caller's task, bypassing the buffer.
    pub async fn send_message(&self, message: &str) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.delivery.deliver(message)).await {
            Ok(result) => result,
            Err(_) => Err(SlackBufError::Timeout(format!(
                "{} did not finish within {:?}",
                self.delivery.name(),
                self.timeout
            ))),
        }
    }

    /// Stop the service: no more ticks, drain the queue, flush once, stop.
    /// Returns when the event loop has stopped. Safe to call more than once
    /// and from several tasks; every caller waits for the same stop.
    pub async fn close(&self) {
        let shutdown = self
            .shutdown
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(tx) = shutdown {
            tracing::debug!("Closing buffer service");
            let _ = tx.send(());
        }

        let mut state = self.state.clone();
        // Err means the loop is gone, which is just as final.
        let _ = state.wait_for(|s| *s == LifecycleState::Stopped).await;
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Messages dropped because the queue was full or closed.
    pub fn dropped_count(&self) -> u64 {
        self.ingress.dropped()
    }
}

#[async_trait]
impl Notifier for BufferService {
    async fn send_message(&self, message: &str) -> Result<()> {
        BufferService::send_message(self, message).await
    }

    /// The [`Admission`] is discarded here. Drops still reach the log sink
    /// and show up in [`BufferService::dropped_count`].
    fn add_message(&self, message: String) {
        BufferService::add_message(self, message);
    }

    async fn close(&self) {
        BufferService::close(self).await
    }
}
