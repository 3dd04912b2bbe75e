use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::{Clock, JobState, OnFailure, Snapshot, SystemClock};
use crate::cores::conn::{RemoteFile, Transport};
use crate::errors::RetdecError;
use crate::models::RequestParams;

/// Minimal time between two status fetches of the same job.
pub const STATE_UPDATE_INTERVAL: Duration = Duration::from_millis(500);

/// Handle of one remote job.
///
/// The status is fetched lazily and cached: queries issued within
/// [`STATE_UPDATE_INTERVAL`] of the last fetch are answered from the cache.
/// Queries take `&mut self`, so one handle has at most one caller at a time.
pub struct Resource<S> {
    id: String,
    conn: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    snapshot: Option<S>,
    last_updated: Option<Instant>,
}

impl<S: Snapshot> Resource<S> {
    pub fn new(id: impl Into<String>, conn: Arc<dyn Transport>) -> Self {
        Self {
            id: id.into(),
            conn,
            clock: Arc::new(SystemClock),
            snapshot: None,
            last_updated: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last fetched status, without refreshing it.
    pub fn snapshot(&self) -> Option<&S> {
        self.snapshot.as_ref()
    }

    /// Current status, refreshed first if the interval has elapsed.
    pub fn status(&mut self) -> Result<&S, RetdecError> {
        if self.state_should_be_updated() {
            self.update_state()?;
        } else {
            trace!(id = %self.id, "status is fresh, skipping fetch");
        }
        self.snapshot
            .as_ref()
            .ok_or_else(|| RetdecError::Generic(format!("no status of {}", self.id)))
    }

    fn state(&mut self) -> Result<&JobState, RetdecError> {
        Ok(self.status()?.state())
    }

    pub fn is_pending(&mut self) -> Result<bool, RetdecError> {
        Ok(self.state()?.pending)
    }

    pub fn is_running(&mut self) -> Result<bool, RetdecError> {
        Ok(self.state()?.running)
    }

    pub fn has_finished(&mut self) -> Result<bool, RetdecError> {
        Ok(self.state()?.finished)
    }

    pub fn has_succeeded(&mut self) -> Result<bool, RetdecError> {
        Ok(self.state()?.has_succeeded())
    }

    pub fn has_failed(&mut self) -> Result<bool, RetdecError> {
        Ok(self.state()?.failed)
    }

    pub fn get_error(&mut self) -> Result<Option<String>, RetdecError> {
        Ok(self.state()?.error.clone())
    }

    /// Blocks until the job finishes.
    pub fn wait_until_finished(&mut self, on_failure: OnFailure) -> Result<(), RetdecError> {
        self.wait_until_finished_with(|_| {}, on_failure)
    }

    /// Blocks until the job finishes, calling `callback` whenever the
    /// progress changes between two polls and once more at the end.
    pub fn wait_until_finished_with<F>(
        &mut self,
        mut callback: F,
        on_failure: OnFailure,
    ) -> Result<(), RetdecError>
    where
        F: FnMut(&Self),
    {
        let mut last_progress: Option<Option<u8>> = None;
        let failure = loop {
            let status = self.status()?;
            let state = status.state();
            if state.finished {
                break state.failure_message();
            }
            let progress = status.progress();
            if let Some(prev) = last_progress
                && prev != progress
            {
                callback(&*self);
            }
            last_progress = Some(progress);
            self.wait_until_state_can_be_updated();
        };

        // also covers a job that was already finished on the first check
        callback(&*self);

        match failure {
            Some(message) => on_failure.handle(message, S::failure_error),
            None => Ok(()),
        }
    }

    /// Polls until `done` holds for the status. Errors from `done` end the
    /// wait immediately.
    pub(crate) fn wait_until<P>(&mut self, mut done: P) -> Result<(), RetdecError>
    where
        P: FnMut(&S) -> Result<bool, RetdecError>,
    {
        while !done(self.status()?)? {
            self.wait_until_state_can_be_updated();
        }
        Ok(())
    }

    /// Downloads `/<id>/<path>`.
    pub(crate) fn get_file(&self, path: &str) -> Result<RemoteFile, RetdecError> {
        self.conn
            .get_file(&format!("/{}/{}", self.id, path), &RequestParams::new())
    }

    fn state_should_be_updated(&self) -> bool {
        match self.last_updated {
            None => true,
            Some(at) => self.clock.now().saturating_duration_since(at) >= STATE_UPDATE_INTERVAL,
        }
    }

    fn update_state(&mut self) -> Result<(), RetdecError> {
        debug!(kind = S::KIND, id = %self.id, "fetching status");
        let raw = self
            .conn
            .get_json(&format!("/{}/status", self.id), &RequestParams::new())?;
        self.snapshot = Some(S::from_json(raw)?);
        self.last_updated = Some(self.clock.now());
        Ok(())
    }

    /// Sleeps for the rest of the current refresh interval, if any.
    fn wait_until_state_can_be_updated(&self) {
        let Some(at) = self.last_updated else {
            return;
        };
        let elapsed = self.clock.now().saturating_duration_since(at);
        if let Some(remaining) = STATE_UPDATE_INTERVAL.checked_sub(elapsed)
            && !remaining.is_zero()
        {
            self.clock.sleep(remaining);
        }
    }
}

impl<S: Snapshot> fmt::Display for Resource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} id={}", S::KIND, self.id)
    }
}

impl<S: fmt::Debug> fmt::Debug for Resource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.id)
            .field("base_url", &self.conn.base_url())
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}
