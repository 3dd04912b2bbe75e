//! Polling base shared by every job kind.
pub mod clock;
pub mod failure;
#[allow(clippy::module_inception)]
pub mod resource;
pub mod state;

#[cfg(test)]
mod tests_resource;

pub use clock::{Clock, SystemClock};
pub use failure::OnFailure;
pub use resource::{Resource, STATE_UPDATE_INTERVAL};
pub use state::{JobState, Snapshot};
