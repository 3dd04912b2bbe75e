// src/errors.rs
use thiserror::Error;

/// Unified error type of the retdec client.
#[derive(Error, Debug)]
pub enum RetdecError {
    // === configuration ===
    #[error("no explicit API key given and environment variable RETDEC_API_KEY is not set")]
    MissingApiKey,

    #[error("missing required parameter: {name}")]
    MissingParameter { name: String },

    #[error("invalid value for parameter '{name}': '{value}'")]
    InvalidValue { name: String, value: String },

    // === transport ===
    #[error("{}", .reason.as_deref().unwrap_or("failed to authenticate with the provided API key (is it valid?)"))]
    Authentication { reason: Option<String> },

    #[error("request to '{url}' failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error {code} ({message}): {description}")]
    UnknownApi {
        code: u16,
        message: String,
        description: String,
    },

    // === job failures ===
    #[error("resource failed: {0}")]
    ResourceFailed(String),

    #[error("decompilation failed: {0}")]
    DecompilationFailed(String),

    #[error("analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("archive generation failed: {0}")]
    ArchiveGenerationFailed(String),

    #[error("call graph generation failed: {0}")]
    CgGenerationFailed(String),

    #[error("control-flow graph generation for '{func}' failed: {error}")]
    CfgGenerationFailed { func: String, error: String },

    // === logical state ===
    #[error("output '{output}' was not requested to be generated")]
    OutputNotRequested { output: String },

    #[error("no control-flow graph for function '{func}'")]
    NoSuchCfg { func: String },

    // === plumbing ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Operation failed: {0}")]
    Generic(String),
}

impl RetdecError {
    pub fn authentication() -> Self {
        RetdecError::Authentication { reason: None }
    }

    pub fn not_requested(output: &str) -> Self {
        RetdecError::OutputNotRequested { output: output.to_string() }
    }
}
