//! Non-fatal diagnostics emitted while building records
//!
//! Upstream payloads drift: the platform adds fields to its objects without notice.
//! Building a declared record must never fail because of that, so anything the
//! builder drops is reported here instead of being raised as an [`Error`](crate::Error).
//!
//! A [`Diagnostics`] sink is injected into the builder (and, through
//! [`SlackOptions`](crate::SlackOptions), into the client). The default sink discards
//! everything, which keeps the record model free of global side effects in tests.
//!
//! # Examples
//!
//! ```rust
//! use aioslack::{Diagnostic, Diagnostics, RecordBuilder, types::VALUE};
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = {
//!     let seen = Arc::clone(&seen);
//!     Diagnostics::new(move |d: &Diagnostic| seen.lock().unwrap().push(d.clone()))
//! };
//!
//! let data = serde_json::json!({"value": "general chat", "color": "blue"});
//! let topic = RecordBuilder::new(sink).build(&VALUE, data.as_object().unwrap());
//!
//! assert_eq!(topic.str("value"), Some("general chat"));
//! assert_eq!(seen.lock().unwrap().len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

/// A single non-fatal observation made while building records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The input carried a key the declared schema does not know; it was dropped.
    UnknownAttribute {
        /// Declared type being built
        schema: &'static str,
        /// The dropped key
        key: String,
    },

    /// A list entry was not a JSON object and could not be built; it was skipped.
    SkippedEntry {
        /// Declared type of the list
        schema: &'static str,
        /// Position of the entry in the list
        index: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownAttribute { schema, key } => {
                write!(f, "unknown attribute {key} for {schema}")
            }
            Diagnostic::SkippedEntry { schema, index } => {
                write!(f, "skipped non-object entry {index} in {schema} list")
            }
        }
    }
}

/// Type alias for diagnostic handler functions.
///
/// Handlers are synchronous: building a record performs no I/O and must not suspend.
pub type DiagnosticHandler = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

/// Sink receiving [`Diagnostic`]s. Cheap to clone.
#[derive(Clone, Default)]
pub struct Diagnostics {
    handler: Option<DiagnosticHandler>,
}

impl Diagnostics {
    /// A sink that forwards every diagnostic to `handler`.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Diagnostic) + Send + Sync + 'static,
    {
        Self {
            handler: Some(Arc::new(handler)),
        }
    }

    /// A sink that discards everything. This is the default.
    pub fn none() -> Self {
        Self::default()
    }

    /// A sink that writes each diagnostic through the `log` facade at warn level.
    pub fn log() -> Self {
        Self::new(|diagnostic| log::warn!("{}", diagnostic))
    }

    /// Whether a handler is installed.
    pub fn is_enabled(&self) -> bool {
        self.handler.is_some()
    }

    /// Deliver one diagnostic to the handler, if any.
    pub fn emit(&self, diagnostic: Diagnostic) {
        if let Some(handler) = &self.handler {
            handler(&diagnostic);
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field(
                "handler",
                &if self.is_enabled() { "installed" } else { "none" },
            )
            .finish()
    }
}
