use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::RetdecError;

static DISPOSITION_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"filename=("?)([^";\s]+)"#).expect("valid regex"));

/// A file downloaded from the API, readable once.
pub struct RemoteFile {
    name: String,
    reader: Box<dyn Read + Send>,
}

impl RemoteFile {
    pub fn new(name: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(name, Cursor::new(bytes.into()))
    }

    /// Suggested file name (from `Content-Disposition`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read_bytes(mut self) -> Result<Vec<u8>, RetdecError> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub fn read_text(self) -> Result<String, RetdecError> {
        let name = self.name.clone();
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes)
            .map_err(|e| RetdecError::ParseError(format!("'{}' is not valid UTF-8: {}", name, e)))
    }

    /// Streams the file into `dir` under its suggested name and returns the
    /// path it was written to.
    pub fn save_into(mut self, dir: &Path) -> Result<PathBuf, RetdecError> {
        // never let a server-provided name escape `dir`
        let file_name = Path::new(&self.name)
            .file_name()
            .ok_or_else(|| RetdecError::ParseError(format!("invalid file name '{}'", self.name)))?;
        let path = dir.join(file_name);
        let mut dst = File::create(&path)?;
        io::copy(&mut self.reader, &mut dst)?;
        Ok(path)
    }

    /// Extracts the file name from a header like
    /// `attachment; filename=prog.out.c`.
    pub fn name_from_disposition(header: &str) -> Option<String> {
        DISPOSITION_FILENAME
            .captures(header)
            .and_then(|c| c.get(2))
            .map(|m| m.as_str().to_string())
    }
}

impl fmt::Debug for RemoteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteFile").field("name", &self.name).finish_non_exhaustive()
    }
}
