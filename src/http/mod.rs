//! HTTP protocol layer module
//!
//! Response construction and the common-header middleware, decoupled from
//! routing and resolution logic.

pub mod response;

// Re-export commonly used builders
pub use response::{
    apply_common_headers, build_405_response, build_file_response, build_not_found_response,
    build_options_response,
};
