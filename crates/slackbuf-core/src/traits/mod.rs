//! Seams between the buffer service and the outside world.

pub mod delivery;
pub mod log_sink;
pub mod notifier;

pub use delivery::Delivery;
pub use log_sink::{LogSink, NoopSink, StderrSink, TracingSink};
pub use notifier::Notifier;
