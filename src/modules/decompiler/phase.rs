use serde::Deserialize;

/// One step of a decompilation as reported by the status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecompilationPhase {
    pub name: String,
    #[serde(default)]
    pub part: Option<String>,
    pub description: String,
    pub completion: u8,
    #[serde(default)]
    pub warnings: Vec<String>,
}
