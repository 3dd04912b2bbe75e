use serde_json::Value;

use super::{CfgStatuses, DecompilationPhase, OutputStatus};
use crate::cores::resource::{JobState, Snapshot};
use crate::errors::RetdecError;
use crate::models::DecompilationStatusRecord;

/// Everything one status fetch of a decompilation tells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompilationStatus {
    pub state: JobState,
    pub completion: u8,
    pub phases: Vec<DecompilationPhase>,
    pub archive: OutputStatus,
    pub cg: OutputStatus,
    pub cfgs: CfgStatuses,
}

impl From<DecompilationStatusRecord> for DecompilationStatus {
    fn from(rec: DecompilationStatusRecord) -> Self {
        Self {
            state: rec.state,
            completion: rec.completion,
            phases: rec.phases,
            archive: rec.archive.into(),
            cg: rec.cg.into(),
            cfgs: rec.cfgs.into(),
        }
    }
}

impl Snapshot for DecompilationStatus {
    const KIND: &'static str = "decompilation";

    fn from_json(value: Value) -> Result<Self, RetdecError> {
        serde_json::from_value::<DecompilationStatusRecord>(value)
            .map(Self::from)
            .map_err(|e| RetdecError::ParseError(format!("decompilation status: {}", e)))
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    fn progress(&self) -> Option<u8> {
        Some(self.completion)
    }

    fn failure_error(message: String) -> RetdecError {
        RetdecError::DecompilationFailed(message)
    }
}
