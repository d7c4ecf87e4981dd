//! Observer interface for pipeline progress and data-quality warnings.

/// Receives informational and warning events from fetch/aggregate stages.
/// Passed by reference through the pipeline so callers decide where events
/// land (a tracing subscriber, a UI log pane, a test buffer).
pub trait EventSink {
    fn info(&self, message: String);
    fn warn(&self, message: String);
}

/// Forwards events to the active `tracing` subscriber.
pub struct TraceSink;

impl EventSink for TraceSink {
    fn info(&self, message: String) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: String) {
        tracing::warn!("{message}");
    }
}

/// Collects events in memory. Intended for tests and batch summaries.
#[derive(Default)]
pub struct BufferSink {
    events: std::sync::Mutex<Vec<SinkEvent>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Info(String),
    Warn(String),
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns recorded warning messages only.
    pub fn warnings(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Warn(message) => Some(message.clone()),
                SinkEvent::Info(_) => None,
            })
            .collect()
    }
}

impl EventSink for BufferSink {
    fn info(&self, message: String) {
        self.events.lock().unwrap().push(SinkEvent::Info(message));
    }

    fn warn(&self, message: String) {
        self.events.lock().unwrap().push(SinkEvent::Warn(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_records_in_order_and_filters_warnings() {
        let sink = BufferSink::new();
        sink.info("fetched page 1".to_string());
        sink.warn("entry 3 has no duration".to_string());

        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::Info("fetched page 1".to_string()),
                SinkEvent::Warn("entry 3 has no duration".to_string()),
            ]
        );
        assert_eq!(sink.warnings(), vec!["entry 3 has no duration".to_string()]);
    }
}
