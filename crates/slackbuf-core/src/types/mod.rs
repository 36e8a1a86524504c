pub mod message;

pub use message::{BATCH_SEPARATOR, Batch, LifecycleState};
