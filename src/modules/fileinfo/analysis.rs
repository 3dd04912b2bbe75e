use serde::Deserialize;
use serde_json::Value;

use crate::cores::resource::{JobState, Resource, Snapshot};
use crate::errors::RetdecError;

/// Status of a file analysis; it reports no progress of its own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisStatus {
    #[serde(flatten)]
    pub state: JobState,
}

impl Snapshot for AnalysisStatus {
    const KIND: &'static str = "analysis";

    fn from_json(value: Value) -> Result<Self, RetdecError> {
        serde_json::from_value(value)
            .map_err(|e| RetdecError::ParseError(format!("analysis status: {}", e)))
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    fn failure_error(message: String) -> RetdecError {
        RetdecError::AnalysisFailed(message)
    }
}

/// A running or finished file analysis.
pub type Analysis = Resource<AnalysisStatus>;

impl Analysis {
    /// Text output of the analysis.
    pub fn get_output(&self) -> Result<String, RetdecError> {
        self.get_file("output")?.read_text()
    }
}
