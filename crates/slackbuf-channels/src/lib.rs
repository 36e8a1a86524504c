//! # slackbuf channels
//! Delivery clients that turn a batch into a network call.

pub mod slack;

pub use slack::{SlackChannel, SlackRequest};
