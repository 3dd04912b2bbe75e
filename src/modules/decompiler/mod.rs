//! Decompilation service: starting decompilations and following them.
pub mod arguments;
pub mod decompilation;
#[allow(clippy::module_inception)]
pub mod decompiler;
pub mod outputs;
pub mod phase;
pub mod status;

#[cfg(test)]
mod tests_decompilation;

pub use arguments::{DecompilationArguments, detect_mode};
pub use decompilation::Decompilation;
pub use decompiler::{DECOMPILER_PATH, Decompiler};
pub use outputs::{CfgStatuses, OutputGenerationStatus, OutputStatus};
pub use phase::DecompilationPhase;
pub use status::DecompilationStatus;
