//! kpsewhich-backed resolver
//!
//! Delegates every lookup to the `kpsewhich` program of the local TeX
//! installation. A hit is a single path on stdout with exit status 0;
//! anything else is "no match". The process spawn is blocking, so async
//! callers run these queries under `spawn_blocking`.

use std::path::PathBuf;
use std::process::Command;

use crate::logger;
use crate::resolver::{kpse_format_name, Resolver};

/// Resolver shelling out to `kpsewhich`.
pub struct KpsewhichResolver {
    /// Binary to invoke, usually just `kpsewhich` from `PATH`
    program: String,
}

impl KpsewhichResolver {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run one kpsewhich query and return the resolved path, if any.
    fn query(&self, name: &str, args: &[String]) -> Option<PathBuf> {
        let output = match Command::new(&self.program)
            .arg("--progname=pdftex")
            .args(args)
            .arg(name)
            .output()
        {
            Ok(out) => out,
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to spawn '{}': {e}",
                    self.program
                ));
                return None;
            }
        };

        // kpsewhich exits non-zero when the name is not on the search path
        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().next()?.trim();
        if line.is_empty() {
            return None;
        }
        Some(PathBuf::from(line))
    }
}

impl Resolver for KpsewhichResolver {
    fn find_file(&self, name: &str, format: i64) -> Option<PathBuf> {
        let args = match kpse_format_name(format) {
            Some(fmt) => vec![format!("--format={fmt}")],
            None => Vec::new(),
        };
        self.query(name, &args)
    }

    fn find_pk(&self, name: &str, dpi: u32) -> Option<PathBuf> {
        let args = vec!["--format=pk".to_string(), format!("--dpi={dpi}")];
        self.query(name, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_no_match() {
        // Not an error path: an unusable engine just resolves nothing
        let resolver = KpsewhichResolver::new("kpsewhich-definitely-not-installed");
        assert_eq!(resolver.find_file("cmr10.tfm", 3), None);
        assert_eq!(resolver.find_pk("cmr10", 300), None);
    }
}
