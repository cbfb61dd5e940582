//! Events produced while a process runs.

use chrono::{DateTime, Utc};

/// Pipe a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputSource {
    Stdout,
    Stderr,
}

impl OutputSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSource::Stdout => "stdout",
            OutputSource::Stderr => "stderr",
        }
    }
}

/// One observation of a running process.
///
/// A run yields any number of `Line`s followed by exactly one `Done`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// One line of output, without its terminator.
    Line {
        source: OutputSource,
        text: String,
        at: DateTime<Utc>,
    },
    /// The process exited.
    Done { exit_code: i32 },
}

impl StreamEvent {
    pub fn line(source: OutputSource, text: impl Into<String>) -> Self {
        StreamEvent::Line {
            source,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done { .. })
    }

    /// Line text, if this is a `Line`.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Line { text, .. } => Some(text),
            StreamEvent::Done { .. } => None,
        }
    }
}
