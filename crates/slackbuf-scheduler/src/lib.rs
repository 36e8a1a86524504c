//! # slackbuf scheduler
//!
//! Buffers messages from any number of producers and flushes them as one
//! newline-joined batch on a fixed interval.
//!
//! ## Architecture
//! ```text
//! add_message ──try_send──▶ bounded mpsc ──▶ EventLoop (owns MessageBuffer)
//!                                               ├── tick     → flush → Delivery
//!                                               ├── message  → buffer.push
//!                                               └── shutdown → drain → flush → Stopped
//! ```
//! The buffer never leaves the event loop task, so nothing is locked.

pub mod buffer;
pub mod engine;
pub mod ingress;
pub mod options;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use buffer::MessageBuffer;
pub use ingress::{Admission, Ingress};
pub use options::BufferOptions;
pub use service::BufferService;
