//! Report stream
//!
//! Everything a script run tells the user goes through [`Output`] as a
//! [`Report`]: definition confirmations, print renderings, verdicts,
//! advisories and errors. Reports render either as human-readable text or as
//! JSON lines that can be parsed with jq.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

/// Rendering of the report stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("Unknown report format: {} (expected text or json)", other)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// One entry of the report stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Report {
    /// A definition was validated and bound
    Defined { name: String, automaton: String },

    /// Structural description requested by `Print`
    Printed { name: String, automaton: String },

    /// Outcome of an acceptance check
    Verdict {
        input: String,
        automaton: String,
        accepted: bool,
    },

    /// Non-fatal advisory
    Warning { message: String },

    /// Parse or runtime failure
    Error { message: String },
}

impl Report {
    pub fn warning(message: impl fmt::Display) -> Self {
        Report::Warning {
            message: message.to_string(),
        }
    }

    pub fn error(message: impl fmt::Display) -> Self {
        Report::Error {
            message: message.to_string(),
        }
    }

    /// Render according to `format`, without trailing newline
    pub fn render(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => self.to_string(),
            ReportFormat::Json => serde_json::to_string(self).unwrap_or_else(|e| {
                log::error!("Failed to serialize report: {}", e);
                self.to_string()
            }),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Defined { name, automaton } => {
                write!(f, "Defined automaton {} = {}", name, automaton)
            }
            Report::Printed { name, automaton } => write!(f, "Automaton {} = {}", name, automaton),
            Report::Verdict {
                input,
                automaton,
                accepted: true,
            } => write!(f, "String {} is accepted with the automaton {}", input, automaton),
            Report::Verdict {
                input,
                automaton,
                accepted: false,
            } => write!(f, "String {} is not accepted with the automaton {}", input, automaton),
            Report::Warning { message } => write!(f, "Warning: {}", message),
            Report::Error { message } => f.write_str(message),
        }
    }
}

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicked writer leaves the buffer usable; keep reporting.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Shared, cloneable handle to the report stream.
///
/// Each [`Output::emit`] writes one whole report while holding the lock, so
/// concurrent writers never interleave within a report.
#[derive(Clone)]
pub struct Output {
    sink: Sink,
    format: ReportFormat,
}

impl Output {
    pub fn new<W: Write + Send + 'static>(writer: W, format: ReportFormat) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
            format,
        }
    }

    pub fn stdout(format: ReportFormat) -> Self {
        Self::new(io::stdout(), format)
    }

    /// Output backed by an in-memory buffer, returned alongside it
    pub fn capture(format: ReportFormat) -> (Self, CaptureBuffer) {
        let buffer = CaptureBuffer::default();
        (Self::new(buffer.clone(), format), buffer)
    }

    pub fn emit(&self, report: &Report) {
        let line = report.render(self.format);
        let mut sink = lock(&self.sink);
        if let Err(e) = writeln!(sink, "{}", line).and_then(|_| sink.flush()) {
            log::error!("Failed to write report: {}", e);
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output").field("format", &self.format).finish()
    }
}

/// In-memory report sink
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.0)).into_owned()
    }

    /// Captured text split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
