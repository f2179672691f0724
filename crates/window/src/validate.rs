//! Collects every problem of a pooling declaration before reporting.

use crate::error::WindowError;

/// Gathers the messages of every failed check on the pooling axes and
/// reports them as one [`WindowError::Validation`].
pub(crate) struct ValidationCollector {
    errors: Vec<String>,
}

impl ValidationCollector {
    pub(crate) fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Records one message.
    pub(crate) fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Record every error of a fallible check.
    pub(crate) fn check(&mut self, result: Result<(), WindowError>) {
        match result {
            Ok(()) => {}
            Err(WindowError::Validation { details, .. }) => {
                self.errors.extend(details.split("; ").map(str::to_string));
            }
            Err(WindowError::InvalidConfig { reason }) => self.errors.push(reason),
            Err(other) => self.errors.push(other.to_string()),
        }
    }

    /// Returns `true` when no errors have been recorded.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the collected messages joined by `"; "`, if any.
    pub(crate) fn finish(self) -> Result<(), WindowError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(WindowError::Validation {
                count: self.errors.len(),
                details: self.errors.join("; "),
            })
        }
    }
}
