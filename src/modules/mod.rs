pub mod decompiler;
pub mod fileinfo;

pub use decompiler::{Decompilation, DecompilationArguments, Decompiler};
pub use fileinfo::{Analysis, AnalysisArguments, Fileinfo};
