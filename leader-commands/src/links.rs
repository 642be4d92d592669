//! First-link scanner for chat lines.
//!
//! Deliberately loose: one match, no host validation, no canonicalisation.
//! `http://` is searched before `https://`, so a plain-http link wins even when
//! a secure one appears earlier in the line.

use thiserror::Error;

const HTTP_MARKER: &str = "http://";
const HTTPS_MARKER: &str = "https://";
/// Anything this short is a scheme with at most a stub of a host.
const MIN_LINK_LEN: usize = 9;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    #[error("no URL found")]
    NoLinkFound,
}

/// Return the first `http://` (else `https://`) token in `text`, cut at the
/// next space.
///
/// ```
/// use leader_commands::links::{extract_url, LinkError};
///
/// assert_eq!(
///     extract_url("check this out http://example.com/page and more"),
///     Ok("http://example.com/page")
/// );
/// assert_eq!(extract_url("see https:// for info"), Err(LinkError::NoLinkFound));
/// ```
pub fn extract_url(text: &str) -> Result<&str, LinkError> {
    let start = text
        .find(HTTP_MARKER)
        .or_else(|| text.find(HTTPS_MARKER))
        .ok_or(LinkError::NoLinkFound)?;

    let candidate = text[start..].split(' ').next().unwrap_or_default();

    if candidate.len() > MIN_LINK_LEN && !candidate.ends_with("://") {
        Ok(candidate)
    } else {
        Err(LinkError::NoLinkFound)
    }
}
