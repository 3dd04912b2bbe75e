// Generation state of the optional outputs (archive, call graph, CFGs).
use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::RetdecError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputGenerationStatus {
    pub generated: bool,
    pub failed: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl OutputGenerationStatus {
    pub fn finished(&self) -> bool {
        self.generated || self.failed
    }
}

/// Status of a single optional output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStatus {
    NotRequested,
    Requested(OutputGenerationStatus),
}

impl OutputStatus {
    /// The generation status, or `OutputNotRequested` naming `output`.
    pub fn get(&self, output: &str) -> Result<&OutputGenerationStatus, RetdecError> {
        match self {
            OutputStatus::Requested(s) => Ok(s),
            OutputStatus::NotRequested => Err(RetdecError::not_requested(output)),
        }
    }
}

impl From<Option<OutputGenerationStatus>> for OutputStatus {
    fn from(raw: Option<OutputGenerationStatus>) -> Self {
        raw.map_or(OutputStatus::NotRequested, OutputStatus::Requested)
    }
}

/// Per-function control-flow graph statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CfgStatuses {
    NotRequested,
    Requested(BTreeMap<String, OutputGenerationStatus>),
}

impl CfgStatuses {
    /// Checks "not requested" before the function lookup.
    pub fn get(&self, func: &str) -> Result<&OutputGenerationStatus, RetdecError> {
        match self {
            CfgStatuses::NotRequested => Err(RetdecError::not_requested("cfgs")),
            CfgStatuses::Requested(map) => map
                .get(func)
                .ok_or_else(|| RetdecError::NoSuchCfg { func: func.to_string() }),
        }
    }

    /// Sorted function names; empty when CFGs were not requested.
    pub fn funcs(&self) -> Vec<String> {
        match self {
            CfgStatuses::NotRequested => Vec::new(),
            CfgStatuses::Requested(map) => map.keys().cloned().collect(),
        }
    }
}

impl From<Option<BTreeMap<String, OutputGenerationStatus>>> for CfgStatuses {
    fn from(raw: Option<BTreeMap<String, OutputGenerationStatus>>) -> Self {
        raw.map_or(CfgStatuses::NotRequested, CfgStatuses::Requested)
    }
}
