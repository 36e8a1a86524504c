//! Delivery client trait.

use async_trait::async_trait;

use crate::error::Result;

/// Sends a fully formed message to a remote endpoint.
///
/// Implementations bound the call by their own timeout and classify
/// failures; callers never retry.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    async fn deliver(&self, message: &str) -> Result<()>;
}
