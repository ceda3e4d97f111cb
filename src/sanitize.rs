//! Filename sanitization module
//!
//! Strips everything a resource name is not allowed to contain before it is
//! handed to the resolver. Path separators and control characters can never
//! survive, so a request can only ever name a file, not a location.

/// Remove every character outside `[A-Za-z0-9 _.-]` from a filename.
///
/// Total and infallible: any input yields some (possibly empty) output.
/// Idempotent by construction, since the retained characters are exactly
/// the permitted ones.
///
/// # Examples
/// ```text
/// sanitize("cmr10.tfm")        -> "cmr10.tfm"
/// sanitize("../../etc/passwd") -> "....etcpasswd"
/// ```
#[must_use]
pub fn sanitize(raw: &str) -> String {
    raw.chars().filter(|c| is_permitted(*c)).collect()
}

/// Character class accepted in resource names
const fn is_permitted(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-')
}
