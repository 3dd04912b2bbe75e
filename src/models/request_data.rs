// Request data sent to the API: query parameters and uploaded files.
use std::path::{Path, PathBuf};

/// Ordered query parameters of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing a previous value of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == name) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// A local file uploaded under a multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub field: String,
    pub path: PathBuf,
}

impl UploadFile {
    pub fn new(field: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            field: field.into(),
            path: path.as_ref().to_path_buf(),
        }
    }
}
