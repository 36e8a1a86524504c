//! Where operational failures of the background path are reported.
//!
//! Scheduled flushes never return errors to a caller, so this is the only
//! place they surface.

use std::io::Write;

/// Records one operational message.
pub trait LogSink: Send + Sync {
    fn record(&self, message: &str);
}

/// Writes each record as one line on standard error. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn record(&self, message: &str) {
        let _ = writeln!(std::io::stderr().lock(), "{message}");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn record(&self, _message: &str) {}
}

/// Forwards records to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, message: &str) {
        tracing::warn!(target: "slackbuf", "{message}");
    }
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn record(&self, message: &str) {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let captured = seen.clone();
        let sink = move |m: &str| captured.lock().unwrap().push(m.to_string());
        sink.record("failed to send message");
        assert_eq!(seen.lock().unwrap().as_slice(), ["failed to send message"]);
    }

    #[test]
    fn test_builtin_sinks_do_not_panic() {
        let sinks: Vec<Box<dyn LogSink>> = vec![
            Box::new(StderrSink),
            Box::new(NoopSink),
            Box::new(TracingSink),
        ];
        for sink in sinks {
            sink.record("hello");
        }
    }
}
