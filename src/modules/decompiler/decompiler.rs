use std::sync::Arc;

use tracing::info;

use super::{Decompilation, DecompilationArguments};
use crate::cores::conn::Transport;
use crate::cores::resource::{Clock, SystemClock};
use crate::errors::RetdecError;
use crate::services::{Service, start_job};

pub const DECOMPILER_PATH: &str = "/decompiler/decompilations";

/// Entry point of the decompilation service.
pub struct Decompiler {
    conn: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl Decompiler {
    pub fn new(service: &Service) -> Result<Self, RetdecError> {
        Ok(Self::with_connection(service.connect(DECOMPILER_PATH)?))
    }

    pub fn with_connection(conn: Arc<dyn Transport>) -> Self {
        Self {
            conn,
            clock: Arc::new(SystemClock),
        }
    }

    /// Clock handed to every started decompilation.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validates `args`, uploads the input and returns the new job.
    pub fn run_decompilation(
        &self,
        args: &DecompilationArguments,
    ) -> Result<Decompilation, RetdecError> {
        let (params, files) = args.to_request()?;
        let id = start_job(self.conn.as_ref(), &params, &files)?;
        info!(%id, mode = params.get("mode").unwrap_or_default(), "decompilation started");
        Ok(Decompilation::new(id, self.conn.clone()).with_clock(self.clock.clone()))
    }
}
