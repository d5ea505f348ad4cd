//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic.
//! Shared by static file serving and the chat relay endpoint.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_304_response, build_403_response, build_404_response, build_405_response,
    build_413_response, build_file_response, json_response,
};
