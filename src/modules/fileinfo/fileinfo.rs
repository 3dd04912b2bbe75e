use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use super::Analysis;
use crate::cores::conn::Transport;
use crate::cores::resource::{Clock, SystemClock};
use crate::errors::RetdecError;
use crate::models::{RequestParams, UploadFile};
use crate::services::{Service, start_job};

pub const FILEINFO_PATH: &str = "/fileinfo/analyses";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisArguments {
    pub input_file: Option<PathBuf>,
    pub verbose: Option<bool>,
}

impl AnalysisArguments {
    pub fn new(input_file: impl AsRef<Path>) -> Self {
        Self {
            input_file: Some(input_file.as_ref().to_path_buf()),
            verbose: None,
        }
    }

    pub fn verbose(mut self, on: bool) -> Self {
        self.verbose = Some(on);
        self
    }

    pub fn to_request(&self) -> Result<(RequestParams, Vec<UploadFile>), RetdecError> {
        let input = self
            .input_file
            .as_ref()
            .ok_or_else(|| RetdecError::MissingParameter { name: "input_file".into() })?;
        let mut params = RequestParams::new();
        if let Some(v) = self.verbose {
            params.insert("verbose", v.to_string());
        }
        Ok((params, vec![UploadFile::new("input", input)]))
    }
}

/// Entry point of the file-analysis service.
pub struct Fileinfo {
    conn: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl Fileinfo {
    pub fn new(service: &Service) -> Result<Self, RetdecError> {
        Ok(Self::with_connection(service.connect(FILEINFO_PATH)?))
    }

    pub fn with_connection(conn: Arc<dyn Transport>) -> Self {
        Self {
            conn,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn run_analysis(&self, args: &AnalysisArguments) -> Result<Analysis, RetdecError> {
        let (params, files) = args.to_request()?;
        let id = start_job(self.conn.as_ref(), &params, &files)?;
        info!(%id, "analysis started");
        Ok(Analysis::new(id, self.conn.clone()).with_clock(self.clock.clone()))
    }
}
