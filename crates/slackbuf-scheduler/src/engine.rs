//! Aggregation event loop. The single task that owns the buffer.

use slackbuf_core::error::{Result, SlackBufError};
use slackbuf_core::traits::{Delivery, LogSink};
use slackbuf_core::types::LifecycleState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::buffer::MessageBuffer;

pub(crate) struct EventLoop {
    buffer: MessageBuffer,
    ingress: mpsc::Receiver<String>,
    shutdown: oneshot::Receiver<()>,
    cancel: CancellationToken,
    delivery: Arc<dyn Delivery>,
    sink: Arc<dyn LogSink>,
    interval: Duration,
    timeout: Duration,
    state: watch::Sender<LifecycleState>,
}

impl EventLoop {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        ingress: mpsc::Receiver<String>,
        shutdown: oneshot::Receiver<()>,
        cancel: CancellationToken,
        delivery: Arc<dyn Delivery>,
        sink: Arc<dyn LogSink>,
        interval: Duration,
        timeout: Duration,
        capacity: usize,
        state: watch::Sender<LifecycleState>,
    ) -> Self {
        Self {
            buffer: MessageBuffer::with_capacity(capacity),
            ingress,
            shutdown,
            cancel,
            delivery,
            sink,
            interval,
            timeout,
            state,
        }
    }

    /// Run until shutdown is signalled, the cancel token fires or the handle
    /// is dropped. Then drain the queue, flush once more and publish `Stopped`.
    pub(crate) async fn run(mut self) {
        tracing::info!(
            "Buffer service started (interval={:?}, delivery={})",
            self.interval,
            self.delivery.name()
        );

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        // A slow flush must not cause a burst of catch-up ticks.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                // Shutdown wins over a pending tick.
                biased;

                _ = &mut self.shutdown => break,
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Cancellation requested, stopping buffer service");
                    break;
                }
                _ = ticker.tick() => self.flush_and_report().await,
                message = self.ingress.recv() => match message {
                    Some(message) => self.buffer.push(message),
                    None => break,
                },
            }
        }

        self.drain_and_stop().await;
    }

    async fn drain_and_stop(mut self) {
        self.state.send_replace(LifecycleState::Draining);
        let drained = self.drain();
        tracing::debug!("Draining: pulled {drained} queued message(s), {} buffered", self.buffer.len());

        self.flush_and_report().await;

        self.state.send_replace(LifecycleState::Stopped);
        tracing::info!("Buffer service stopped");
    }

    /// Pull everything already queued into the buffer without waiting.
    /// Closing first means later producers see a closed queue instead of
    /// filling one nobody reads.
    pub(crate) fn drain(&mut self) -> usize {
        self.ingress.close();
        let mut drained = 0;
        while let Ok(message) = self.ingress.try_recv() {
            self.buffer.push(message);
            drained += 1;
        }
        drained
    }

    async fn flush_and_report(&mut self) {
        if let Err(e) = self.flush().await {
            if e.is_delivery_failure() {
                tracing::warn!("Scheduled flush failed: {e}");
            } else {
                tracing::error!("Scheduled flush could not be sent: {e}");
            }
            self.sink.record(&format!("failed to send message: {e}"));
        }
    }

    /// Send the buffered messages as one batch. Returns how many were sent;
    /// zero means the buffer was empty and nothing went out. The buffer is
    /// cleared before the send and is not restored on failure.
    pub(crate) async fn flush(&mut self) -> Result<usize> {
        let Some(batch) = self.buffer.take_batch() else {
            return Ok(0);
        };

        let result = match tokio::time::timeout(self.timeout, self.delivery.deliver(batch.as_str())).await {
            Ok(result) => result,
            Err(_) => Err(SlackBufError::Timeout(format!(
                "{} did not finish within {:?}",
                self.delivery.name(),
                self.timeout
            ))),
        };

        let age_ms = batch.age().num_milliseconds();
        match result {
            Ok(()) => {
                tracing::debug!(
                    "Flushed {} message(s) via {} in {age_ms}ms",
                    batch.count,
                    self.delivery.name()
                );
                Ok(batch.count)
            }
            Err(e) => {
                tracing::debug!("Dropped batch of {} message(s) after {age_ms}ms", batch.count);
                Err(e)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
