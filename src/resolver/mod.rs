//! Resolver module
//!
//! Seam between the HTTP surface and the search-path engine. The engine
//! itself (kpathsea's path traversal, ls-R databases, texmf.cnf expansion)
//! lives outside this crate; we only frame queries and accept answers.

mod format;
mod kpsewhich;

pub use format::kpse_format_name;
pub use kpsewhich::KpsewhichResolver;

use std::path::PathBuf;

/// Search-path resolution interface.
///
/// Both operations are pure queries: no mutation, no side effects beyond
/// whatever the underlying engine does to answer. `None` is an expected
/// outcome (the name simply is not on the search path), not an error.
pub trait Resolver: Send + Sync {
    /// Look up a file by name and kpathsea format code.
    fn find_file(&self, name: &str, format: i64) -> Option<PathBuf>;

    /// Look up a PK bitmap font by name and resolution.
    fn find_pk(&self, name: &str, dpi: u32) -> Option<PathBuf>;
}
