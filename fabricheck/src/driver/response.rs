//! Output of one CLI command.

use std::fmt;
use std::time::Duration;

/// What the device printed for one command, between the echo and the next
/// prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub command: String,

    /// Normalised output. Echo and trailing prompt removed.
    pub output: String,

    /// Prompt line that ended the read.
    pub prompt: String,

    pub elapsed: Duration,

    /// Platform failure marker found in the output, e.g. `% Invalid input`.
    pub failure: Option<String>,
}

impl Response {
    pub fn new(
        command: impl Into<String>,
        output: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            output: output.into(),
            prompt: prompt.into(),
            elapsed,
            failure: None,
        }
    }

    pub fn with_failure(mut self, marker: impl Into<String>) -> Self {
        self.failure = Some(marker.into());
        self
    }

    /// Whether the device rejected the command.
    pub fn is_rejected(&self) -> bool {
        self.failure.is_some()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output)
    }
}
