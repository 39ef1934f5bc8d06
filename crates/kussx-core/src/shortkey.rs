use crate::error::CoreError;
use crate::store::COUNTER_KEY;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The public identifier of a shortened link.
///
/// Keys produced by the codec are always valid. Keys received from callers
/// are opaque store lookups and only checked for shape: 1-64 visible ASCII
/// characters, no `/`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortKey(String);

const MAX_LENGTH: usize = 64;

impl ShortKey {
    /// Creates a `ShortKey` after validating the input.
    pub fn new(key: impl Into<String>) -> Result<Self, CoreError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    /// Creates a `ShortKey` without validation.
    ///
    /// Use this only for keys produced by trusted internal sources
    /// (e.g. the key codec).
    pub fn new_unchecked(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key names the allocation counter rather than a link.
    pub fn is_reserved(&self) -> bool {
        self.0 == COUNTER_KEY
    }

    fn validate(key: &str) -> Result<(), CoreError> {
        if key.is_empty() || key.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortKey(format!(
                "length must be between 1 and {}, got {}",
                MAX_LENGTH,
                key.len()
            )));
        }

        if !key.chars().all(|c| c.is_ascii_graphic() && c != '/') {
            return Err(CoreError::InvalidShortKey(format!(
                "must contain only visible ASCII characters other than '/': '{}'",
                key
            )));
        }

        Ok(())
    }
}

impl Display for ShortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_keys() {
        assert!(ShortKey::new("a").is_ok());
        assert!(ShortKey::new("ab12").is_ok());
        assert!(ShortKey::new("nonexistent-key").is_ok());
        assert!(ShortKey::new("k".repeat(64)).is_ok());
    }

    #[test]
    fn empty_or_too_long() {
        assert!(ShortKey::new("").is_err());
        assert!(ShortKey::new("k".repeat(65)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortKey::new("ab 12").is_err());
        assert!(ShortKey::new("ab/12").is_err());
        assert!(ShortKey::new("ab\n12").is_err());
        assert!(ShortKey::new("clé").is_err());
    }

    #[test]
    fn counter_key_is_reserved() {
        assert!(ShortKey::new(COUNTER_KEY).unwrap().is_reserved());
        assert!(!ShortKey::new("ab12").unwrap().is_reserved());
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = ShortKey::new_unchecked("ab12");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"ab12\"");
        assert_eq!(key.to_string(), "ab12");
    }
}
