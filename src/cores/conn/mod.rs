//! Connection to the REST API.
//!
//! Jobs talk to the service only through [`Transport`], so the polling logic
//! can run against any implementation (the HTTP one below or an in-memory one
//! in tests).
pub mod connection;
pub mod remote_file;

pub use connection::{ApiConnection, ConnectionConfig};
pub use remote_file::RemoteFile;

use serde_json::Value;

use crate::errors::RetdecError;
use crate::models::{RequestParams, UploadFile};

pub trait Transport: Send + Sync {
    /// URL all request paths are appended to.
    fn base_url(&self) -> &str;

    /// Sends a GET request and returns the parsed JSON body.
    fn get_json(&self, path: &str, params: &RequestParams) -> Result<Value, RetdecError>;

    /// Sends a POST request (query parameters plus multipart files) and
    /// returns the parsed JSON body.
    fn post_json(
        &self,
        path: &str,
        params: &RequestParams,
        files: &[UploadFile],
    ) -> Result<Value, RetdecError>;

    /// GETs a file. The body is streamed, not buffered.
    fn get_file(&self, path: &str, params: &RequestParams) -> Result<RemoteFile, RetdecError>;
}
