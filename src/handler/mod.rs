//! Request handler module
//!
//! Routing of resolution requests and response assembly for resolved files.

pub mod fetch;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
