//! [`CapturedLog`], a log sink that keeps what it receives.

use std::sync::{Arc, Mutex};

use tweaks_core::{LogLevel, LogSink};

/// Records every message sent through [`sink`](Self::sink).
#[derive(Clone, Default)]
pub struct CapturedLog {
    messages: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl CapturedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink appending to this log.
    pub fn sink(&self) -> LogSink {
        let messages = self.messages.clone();
        Arc::new(move |level, message| {
            messages.lock().unwrap().push((level, message.to_string()));
        })
    }

    pub fn messages(&self) -> Vec<(LogLevel, String)> {
        self.messages.lock().unwrap().clone()
    }

    /// Messages at exactly `level`.
    pub fn at(&self, level: LogLevel) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}
