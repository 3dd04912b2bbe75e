pub mod conn;
pub mod resource;
