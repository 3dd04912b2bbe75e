pub mod cli;
pub mod cores;
pub mod errors;
pub mod models;
pub mod modules;
pub mod services;


// Re-export common items at crate root for benches/tests
pub use cores::resource::{OnFailure, STATE_UPDATE_INTERVAL};
pub use errors::RetdecError;
pub use modules::decompiler::{Decompilation, DecompilationArguments, Decompiler};
pub use modules::fileinfo::{Analysis, AnalysisArguments, Fileinfo};
pub use services::{ApiTester, DEFAULT_API_URL, Service, ServiceConfig};
