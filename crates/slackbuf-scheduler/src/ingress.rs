//! Message ingress: the only way messages cross into the event loop.
//!
//! The queue is bounded. A producer is never blocked: when the queue is full
//! the newest message is dropped and counted.

use slackbuf_core::error::{Result, SlackBufError};
use slackbuf_core::traits::LogSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};

/// What happened to a pushed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Queued,
    /// Queue was full; message dropped.
    DroppedFull,
    /// Service no longer accepts messages; message dropped.
    DroppedClosed,
}

/// Producer side of the ingress queue. Cheap to clone.
#[derive(Clone)]
pub struct Ingress {
    tx: mpsc::Sender<String>,
    dropped: Arc<AtomicU64>,
    sink: Arc<dyn LogSink>,
}

impl Ingress {
    /// Create the queue. The receiver belongs to the event loop.
    pub fn channel(capacity: usize, sink: Arc<dyn LogSink>) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let ingress = Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
            sink,
        };
        (ingress, rx)
    }

    /// Enqueue without waiting.
    pub fn push(&self, message: String) -> Admission {
        match self.tx.try_send(message) {
            Ok(()) => Admission::Queued,
            Err(TrySendError::Full(_)) => {
                let total = self.record_drop();
                self.sink.record(&format!(
                    "message queue full, dropped message ({total} dropped so far)"
                ));
                Admission::DroppedFull
            }
            Err(TrySendError::Closed(_)) => self.reject_closed(),
        }
    }

    /// Count a message refused because the service is stopping.
    pub fn reject_closed(&self) -> Admission {
        let total = self.record_drop();
        tracing::debug!("Buffer service stopped, dropped message ({total} dropped so far)");
        Admission::DroppedClosed
    }

    /// Enqueue, waiting up to `wait` for room in the queue.
    pub async fn push_timeout(&self, message: String, wait: Duration) -> Result<()> {
        match self.tx.send_timeout(message, wait).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => {
                self.record_drop();
                Err(SlackBufError::QueueFull(format!("no room after {wait:?}")))
            }
            Err(SendTimeoutError::Closed(_)) => {
                self.record_drop();
                Err(SlackBufError::closed("service no longer accepts messages"))
            }
        }
    }

    /// Messages dropped since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn record_drop(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    #[tokio::test]
    async fn test_push_queues_in_order() {
        let (ingress, mut rx) = Ingress::channel(4, RecordingSink::new());
        assert_eq!(ingress.push("a".into()), Admission::Queued);
        assert_eq!(ingress.push("b".into()), Admission::Queued);
        assert_eq!(rx.recv().await.as_deref(), Some("a"));
        assert_eq!(rx.recv().await.as_deref(), Some("b"));
        assert_eq!(ingress.dropped(), 0);
    }

    #[tokio::test]
    async fn test_full_queue_drops_newest_and_counts() {
        let sink = RecordingSink::new();
        let (ingress, mut rx) = Ingress::channel(1, sink.clone());
        assert_eq!(ingress.push("kept".into()), Admission::Queued);
        assert_eq!(ingress.push("lost-1".into()), Admission::DroppedFull);
        assert_eq!(ingress.push("lost-2".into()), Admission::DroppedFull);
        assert_eq!(ingress.dropped(), 2);
        assert_eq!(sink.records().len(), 2);
        assert!(sink.records()[1].contains("2 dropped so far"));

        assert_eq!(rx.recv().await.as_deref(), Some("kept"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_queue_drops_without_panic() {
        let (ingress, mut rx) = Ingress::channel(2, RecordingSink::new());
        rx.close();
        assert_eq!(ingress.push("late".into()), Admission::DroppedClosed);
        assert_eq!(ingress.reject_closed(), Admission::DroppedClosed);
        assert_eq!(ingress.dropped(), 2);
    }

    #[tokio::test]
    async fn test_push_timeout_waits_for_room() {
        let (ingress, mut rx) = Ingress::channel(1, RecordingSink::new());
        ingress.push("first".into());

        let consumer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let first = rx.recv().await;
            let second = rx.recv().await;
            (first, second)
        });

        ingress.push_timeout("second".into(), Duration::from_secs(2)).await.unwrap();
        let (first, second) = consumer.await.unwrap();
        assert_eq!(first.as_deref(), Some("first"));
        assert_eq!(second.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_push_timeout_expires_on_full_queue() {
        let (ingress, _rx) = Ingress::channel(1, RecordingSink::new());
        ingress.push("first".into());
        let err = ingress
            .push_timeout("second".into(), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, SlackBufError::QueueFull(_)));
        assert_eq!(ingress.dropped(), 1);
    }

    #[tokio::test]
    async fn test_push_timeout_on_closed_queue() {
        let (ingress, rx) = Ingress::channel(1, RecordingSink::new());
        drop(rx);
        let err = ingress
            .push_timeout("x".into(), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, SlackBufError::Closed(_)));
    }
}
