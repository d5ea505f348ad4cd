//! Request handler module
//!
//! Responsible for request routing dispatch and business logic processing:
//! static file serving from the public root and the chat relay endpoint.

pub mod chat;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
