//! Pending messages owned by the event loop.

use slackbuf_core::types::Batch;

/// Ordered, append-only sequence of messages between flushes.
#[derive(Debug, Default)]
pub struct MessageBuffer {
    messages: Vec<String>,
}

impl MessageBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { messages: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, message: String) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Turn everything buffered into one batch and clear the buffer.
    /// `None` when there is nothing to send.
    pub fn take_batch(&mut self) -> Option<Batch> {
        let batch = Batch::join(&self.messages)?;
        self.messages.clear();
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_batch_joins_in_arrival_order() {
        let mut buffer = MessageBuffer::with_capacity(4);
        for m in ["disk full", "cpu hot", "disk full"] {
            buffer.push(m.to_string());
        }
        let batch = buffer.take_batch().unwrap();
        assert_eq!(batch.text, "disk full\ncpu hot\ndisk full");
        assert_eq!(batch.count, 3);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_take_batch_empty() {
        let mut buffer = MessageBuffer::default();
        assert!(buffer.take_batch().is_none());
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_messages_after_take_start_next_batch() {
        let mut buffer = MessageBuffer::default();
        buffer.push("a".into());
        let first = buffer.take_batch().unwrap();
        buffer.push("b".into());
        let second = buffer.take_batch().unwrap();
        assert_eq!(first.text, "a");
        assert_eq!(second.text, "b");
    }

    #[test]
    fn test_multiline_messages_are_kept_verbatim() {
        let mut buffer = MessageBuffer::default();
        buffer.push("line1\nline2".into());
        buffer.push("".into());
        buffer.push("tail".into());
        assert_eq!(buffer.take_batch().unwrap().text, "line1\nline2\n\ntail");
    }
}
