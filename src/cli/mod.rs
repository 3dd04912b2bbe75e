#[allow(clippy::module_inception)]
pub mod cli;
pub mod progress;

pub use cli::{Cli, Commands, execute, run, run_from_args};
pub use progress::{
    NoProgressDisplayer, ProgressBarDisplayer, ProgressDisplayer, ProgressLogDisplayer,
};
