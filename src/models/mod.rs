pub mod request_data;
pub mod status_data;

pub use request_data::{RequestParams, UploadFile};
pub use status_data::{ApiErrorRecord, DecompilationStatusRecord, StartedJobRecord};
