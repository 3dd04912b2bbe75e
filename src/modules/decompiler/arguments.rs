use std::path::{Path, PathBuf};

use crate::errors::RetdecError;
use crate::models::{RequestParams, UploadFile};

pub const MODES: &[&str] = &["c", "bin"];
pub const TARGET_LANGUAGES: &[&str] = &["c", "py"];
pub const ARCHITECTURES: &[&str] = &["x86", "arm", "thumb", "mips", "pic32", "powerpc"];
pub const GRAPH_FORMATS: &[&str] = &["png", "svg", "pdf"];
pub const OPTIMIZATIONS: &[&str] = &["none", "limited", "normal", "aggressive"];

/// Arguments of a new decompilation. Only `input_file` is required; unset
/// parameters are left to the service's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecompilationArguments {
    pub input_file: Option<PathBuf>,
    pub mode: Option<String>,
    pub target_language: Option<String>,
    pub architecture: Option<String>,
    pub graph_format: Option<String>,
    pub decomp_optimizations: Option<String>,
    pub sel_decomp_funcs: Option<String>,
    pub generate_archive: Option<bool>,
    pub generate_cg: Option<bool>,
    pub generate_cfgs: Option<bool>,
}

impl DecompilationArguments {
    pub fn new(input_file: impl AsRef<Path>) -> Self {
        Self {
            input_file: Some(input_file.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn target_language(mut self, lang: impl Into<String>) -> Self {
        self.target_language = Some(lang.into());
        self
    }

    pub fn architecture(mut self, arch: impl Into<String>) -> Self {
        self.architecture = Some(arch.into());
        self
    }

    pub fn graph_format(mut self, format: impl Into<String>) -> Self {
        self.graph_format = Some(format.into());
        self
    }

    pub fn decomp_optimizations(mut self, level: impl Into<String>) -> Self {
        self.decomp_optimizations = Some(level.into());
        self
    }

    pub fn sel_decomp_funcs(mut self, funcs: impl Into<String>) -> Self {
        self.sel_decomp_funcs = Some(funcs.into());
        self
    }

    pub fn generate_archive(mut self, on: bool) -> Self {
        self.generate_archive = Some(on);
        self
    }

    pub fn generate_cg(mut self, on: bool) -> Self {
        self.generate_cg = Some(on);
        self
    }

    pub fn generate_cfgs(mut self, on: bool) -> Self {
        self.generate_cfgs = Some(on);
        self
    }

    /// Validates the arguments and turns them into the upload request.
    pub fn to_request(&self) -> Result<(RequestParams, Vec<UploadFile>), RetdecError> {
        let input = self
            .input_file
            .as_ref()
            .ok_or_else(|| RetdecError::MissingParameter { name: "input_file".into() })?;

        let mut params = RequestParams::new();
        let mode = match &self.mode {
            Some(m) => choice("mode", m, MODES)?,
            None => detect_mode(input).to_string(),
        };
        params.insert("mode", mode);

        let choices = [
            ("target_language", &self.target_language, TARGET_LANGUAGES),
            ("architecture", &self.architecture, ARCHITECTURES),
            ("graph_format", &self.graph_format, GRAPH_FORMATS),
            ("decomp_optimizations", &self.decomp_optimizations, OPTIMIZATIONS),
        ];
        for (name, value, allowed) in choices {
            if let Some(v) = value {
                params.insert(name, choice(name, v, allowed)?);
            }
        }
        if let Some(funcs) = &self.sel_decomp_funcs {
            params.insert("sel_decomp_funcs", funcs.clone());
        }

        let flags = [
            ("generate_archive", self.generate_archive),
            ("generate_cg", self.generate_cg),
            ("generate_cfgs", self.generate_cfgs),
        ];
        for (name, value) in flags {
            if let Some(on) = value {
                params.insert(name, on.to_string());
            }
        }

        Ok((params, vec![UploadFile::new("input", input)]))
    }
}

/// `c` for inputs named `*.c` (any case), `bin` otherwise.
pub fn detect_mode(input: &Path) -> &'static str {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.ends_with(".c") { "c" } else { "bin" }
}

/// Lower-cases `value` and checks it against `allowed`.
pub(crate) fn choice(name: &str, value: &str, allowed: &[&str]) -> Result<String, RetdecError> {
    let value = value.to_lowercase();
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(RetdecError::InvalidValue {
            name: name.to_string(),
            value,
        })
    }
}
