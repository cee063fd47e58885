//! Dotted-decimal version comparison
//!
//! Decides whether a remote plugin version supersedes the locally installed
//! one. Versions are plain numeric components separated by dots; no
//! pre-release or build metadata syntax is supported.

use std::cmp::Ordering;

/// A version component that could not be parsed as an integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version component '{component}' in '{version}'")]
pub struct VersionError {
    pub version: String,
    pub component: String,
}

/// Compare two dotted-decimal version strings component-wise.
///
/// The shorter sequence is padded with zeros, so `"1.2"` equals `"1.2.0"`.
/// An empty string on either side means "no information" and compares as
/// `Equal`; callers must not treat that as proof both sides match.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    if a.is_empty() || b.is_empty() {
        return Ok(Ordering::Equal);
    }

    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();

    for i in 0..left.len().max(right.len()) {
        let l = parse_component(&left, i, a)?;
        let r = parse_component(&right, i, b)?;
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }

    Ok(Ordering::Equal)
}

/// True when `candidate` is strictly newer than `current`.
pub fn is_newer(candidate: &str, current: &str) -> Result<bool, VersionError> {
    Ok(compare_versions(candidate, current)? == Ordering::Greater)
}

fn parse_component(parts: &[&str], index: usize, version: &str) -> Result<u64, VersionError> {
    match parts.get(index) {
        None => Ok(0),
        Some(part) => part.parse::<u64>().map_err(|_| VersionError {
            version: version.to_string(),
            component: part.to_string(),
        }),
    }
}
