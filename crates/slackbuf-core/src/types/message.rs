//! Batch and lifecycle types shared by the buffer service and its clients.

use chrono::{DateTime, TimeDelta, Utc};

/// Separator placed between buffered messages when a batch is built.
pub const BATCH_SEPARATOR: &str = "\n";

/// The single payload produced by one flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub text: String,
    pub count: usize,
    /// When the batch was cut from the buffer.
    pub created_at: DateTime<Utc>,
}

impl Batch {
    /// Join messages in order. Returns `None` for an empty slice.
    pub fn join(messages: &[String]) -> Option<Self> {
        if messages.is_empty() {
            return None;
        }
        Some(Self {
            text: messages.join(BATCH_SEPARATOR),
            count: messages.len(),
            created_at: Utc::now(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Time since the batch was cut. Clamped at zero if the clock moved back.
    pub fn age(&self) -> TimeDelta {
        (Utc::now() - self.created_at).max(TimeDelta::zero())
    }
}

/// Lifecycle of the background aggregation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Running,
    Draining,
    Stopped,
}

impl LifecycleState {
    /// Only a running service takes new messages.
    pub fn accepts_messages(self) -> bool {
        self == LifecycleState::Running
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Running => write!(f, "running"),
            LifecycleState::Draining => write!(f, "draining"),
            LifecycleState::Stopped => write!(f, "stopped"),
        }
    }
}
