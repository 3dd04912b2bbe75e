// Raw status records as returned by `GET /<id>/status`.
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::cores::resource::JobState;
use crate::modules::decompiler::{DecompilationPhase, OutputGenerationStatus};

/// Status body of a decompilation. Sections for optional outputs are only
/// present when the corresponding output was requested.
#[derive(Debug, Clone, Deserialize)]
pub struct DecompilationStatusRecord {
    #[serde(flatten)]
    pub state: JobState,
    pub completion: u8,
    pub phases: Vec<DecompilationPhase>,
    #[serde(default)]
    pub archive: Option<OutputGenerationStatus>,
    #[serde(default)]
    pub cg: Option<OutputGenerationStatus>,
    #[serde(default)]
    pub cfgs: Option<BTreeMap<String, OutputGenerationStatus>>,
}

/// Body of a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct StartedJobRecord {
    pub id: String,
}

/// Body of a failed API request.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorRecord {
    pub code: serde_json::Value,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: String,
}

impl ApiErrorRecord {
    /// The API sends the code either as a number or as a numeric string.
    pub fn code(&self) -> Option<u16> {
        match &self.code {
            serde_json::Value::Number(n) => n.as_u64().and_then(|c| u16::try_from(c).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
