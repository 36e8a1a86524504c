//! # slackbuf core
//! Shared error type, configuration, traits and data types.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{BufferConfig, SlackBufConfig, SlackConfig};
pub use error::{Result, SlackBufError};
pub use traits::{Delivery, LogSink, Notifier};
pub use types::{Batch, LifecycleState};
