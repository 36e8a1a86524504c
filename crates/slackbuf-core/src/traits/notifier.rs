//! Public surface of a buffered sender.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send immediately, bypassing the buffer.
    async fn send_message(&self, message: &str) -> Result<()>;

    /// Queue a message for the next batch. Never blocks.
    ///
    /// There is no return value, so a dropped message is only visible
    /// through the log sink and the implementation's drop counter.
    fn add_message(&self, message: String);

    /// Stop the background service. Returns once drained and stopped.
    async fn close(&self);
}
