//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (content hash)
//!
//! The layout and diff engines treat an [`Oid`] as an opaque, stable lookup
//! key. Only the wire format is fixed-width hex; no algorithm in this crate
//! depends on the hash length, so a SHA-256 object store works unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),
}

/// A validated Git object identifier.
///
/// Normalized to lowercase hex at construction. Accepts 40 hex characters
/// (SHA-1) or 64 (SHA-256); everything else is rejected at the boundary so
/// the engines never see a malformed id.
///
/// # Example
///
/// ```
/// use gitgraph::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890abc123def4567890abc12345").unwrap();
/// assert_eq!(oid.short(7), "abc123d");
/// assert!(Oid::new("not-a-hash").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not 40 or 64 hex
    /// characters.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// The zero/null OID (40 zeros).
    pub fn zero() -> Self {
        Self("0".repeat(40))
    }

    /// Check if this is the zero/null OID.
    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| c == '0')
    }

    /// Get the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form: the first `len` characters, or the full id if
    /// `len` exceeds its length.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "contains non-hex characters".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> String {
        oid.0
    }
}

impl From<git2::Oid> for Oid {
    fn from(oid: git2::Oid) -> Self {
        // git2 always yields well-formed lowercase hex
        Self(oid.to_string())
    }
}

/// Commit messages conventionally open with a title of at most 50 chars.
const SHORT_MESSAGE_LEN: usize = 50;

/// First line of a commit message, truncated at a word boundary.
///
/// Titles longer than the conventional 50 characters are cut at the last
/// space that fits and suffixed with `...`.
///
/// # Example
///
/// ```
/// use gitgraph::core::types::short_message;
///
/// assert_eq!(short_message("Fix the bug\n\nLong body here"), "Fix the bug");
/// ```
pub fn short_message(message: &str) -> String {
    let first_line = message.trim().lines().next().unwrap_or("");
    if first_line.chars().count() <= SHORT_MESSAGE_LEN {
        return first_line.to_string();
    }
    let prefix: String = first_line.chars().take(SHORT_MESSAGE_LEN).collect();
    let cut = prefix.rfind(' ').unwrap_or(prefix.len());
    format!("{}...", &prefix[..cut])
}

/// Render a commit timestamp for row labels, e.g. `03 April 2026 14:07`.
pub fn format_commit_time(when: &chrono::DateTime<chrono::Utc>) -> String {
    when.format("%d %B %Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod oid {
        use super::*;

        #[test]
        fn valid_sha1_accepted() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert_eq!(oid.as_str().len(), 40);
        }

        #[test]
        fn valid_sha256_accepted() {
            let s = "a".repeat(64);
            assert!(Oid::new(s).is_ok());
        }

        #[test]
        fn normalized_to_lowercase() {
            let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
            assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
        }

        #[test]
        fn wrong_length_rejected() {
            assert!(Oid::new("abc123").is_err());
            assert!(Oid::new("a".repeat(41)).is_err());
        }

        #[test]
        fn non_hex_rejected() {
            assert!(Oid::new("g".repeat(40)).is_err());
        }

        #[test]
        fn zero_is_zero() {
            assert!(Oid::zero().is_zero());
            let non_zero = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert!(!non_zero.is_zero());
        }

        #[test]
        fn short_clamps_to_length() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert_eq!(oid.short(7), "abc123d");
            assert_eq!(oid.short(100).len(), 40);
        }

        #[test]
        fn serde_as_transparent_string() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            let json = serde_json::to_string(&oid).unwrap();
            assert_eq!(json, "\"abc123def4567890abc123def4567890abc12345\"");
            let back: Oid = serde_json::from_str(&json).unwrap();
            assert_eq!(back, oid);
        }
    }

    mod messages {
        use super::*;

        #[test]
        fn short_title_kept_whole() {
            assert_eq!(short_message("Add lane reuse"), "Add lane reuse");
        }

        #[test]
        fn only_first_line_used() {
            assert_eq!(short_message("Title\n\nBody text"), "Title");
        }

        #[test]
        fn long_title_cut_at_word_boundary() {
            let msg = "This commit title is quite a bit longer than fifty characters allow";
            let short = short_message(msg);
            assert!(short.ends_with("..."));
            // Never cuts mid-word
            assert_eq!(short, "This commit title is quite a bit longer than...");
        }

        #[test]
        fn leading_whitespace_trimmed() {
            assert_eq!(short_message("\n\n  Title  \n"), "Title");
        }
    }
}
