use serde::Deserialize;
use serde_json::Value;

use crate::errors::RetdecError;

/// Common part of every status body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobState {
    pub pending: bool,
    pub running: bool,
    pub finished: bool,
    pub succeeded: bool,
    pub failed: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobState {
    pub fn has_succeeded(&self) -> bool {
        self.finished && !self.failed
    }

    /// Failure message of a failed job (empty when the server sent none).
    pub fn failure_message(&self) -> Option<String> {
        self.failed
            .then(|| self.error.clone().unwrap_or_default())
    }
}

/// A decoded status body of one job kind.
pub trait Snapshot: Sized {
    /// Human-readable job kind, used in `Display`.
    const KIND: &'static str;

    fn from_json(value: Value) -> Result<Self, RetdecError>;

    fn state(&self) -> &JobState;

    /// Progress metric whose changes trigger wait callbacks.
    fn progress(&self) -> Option<u8> {
        None
    }

    /// Error returned by the default failure policy.
    fn failure_error(message: String) -> RetdecError;
}

impl Snapshot for JobState {
    const KIND: &'static str = "resource";

    fn from_json(value: Value) -> Result<Self, RetdecError> {
        serde_json::from_value(value).map_err(|e| RetdecError::ParseError(format!("status: {}", e)))
    }

    fn state(&self) -> &JobState {
        self
    }

    fn failure_error(message: String) -> RetdecError {
        RetdecError::ResourceFailed(message)
    }
}
