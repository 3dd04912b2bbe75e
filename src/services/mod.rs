pub mod service;

pub use api_test::{ApiTester, TEST_ECHO_PATH};
pub(crate) use service::start_job;
pub use service::{API_KEY_ENV, API_URL_ENV, DEFAULT_API_URL, Service, ServiceConfig};
