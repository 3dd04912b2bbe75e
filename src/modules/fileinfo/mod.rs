//! File-analysis service.
pub mod analysis;
#[allow(clippy::module_inception)]
pub mod fileinfo;

pub use analysis::{Analysis, AnalysisStatus};
pub use fileinfo::{AnalysisArguments, FILEINFO_PATH, Fileinfo};
