//! API key rotation
//!
//! A [`KeyRotator`] owns the ordered credential set for one harvest run and a
//! cursor to the active key. Keys are never dropped on failure; a key that
//! was rate limited is simply tried again once the cursor wraps back to it.

use crate::error::{Error, Result};
use rand::Rng;
use std::fmt;

/// Number of leading characters shown when a key is logged
const KEY_PREFIX_LEN: usize = 8;

/// An opaque API key
///
/// `Debug` and `Display` only reveal the first few characters so keys can be
/// logged safely; use [`ApiKey::expose`] to get the header value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key string
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Full key, for the request header
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn prefix(&self) -> &str {
        match self.0.char_indices().nth(KEY_PREFIX_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}...", self.prefix())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&format_args!("{}", self)).finish()
    }
}

/// Ordered, non-empty credential set with a cyclic cursor
#[derive(Debug, Clone)]
pub struct KeyRotator {
    keys: Vec<ApiKey>,
    cursor: usize,
}

impl KeyRotator {
    /// Build a rotator starting at the first key
    ///
    /// Blank keys are skipped. Fails if no usable key remains.
    pub fn new<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<ApiKey> = keys
            .into_iter()
            .map(Into::into)
            .map(|k: String| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(ApiKey)
            .collect();

        if keys.is_empty() {
            return Err(Error::config(
                "at least one API key is required",
                "api.api_keys",
            ));
        }

        Ok(Self { keys, cursor: 0 })
    }

    /// Build a rotator whose first active key is chosen uniformly at random
    ///
    /// The chosen key is treated as the start of the cycle for the run.
    pub fn with_random_start<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rotator = Self::new(keys)?;
        rotator.cursor = rand::thread_rng().gen_range(0..rotator.keys.len());
        tracing::debug!(start = rotator.cursor, "randomized API key start");
        Ok(rotator)
    }

    /// The active key
    pub fn current(&self) -> &ApiKey {
        &self.keys[self.cursor]
    }

    /// Advance to the next key, wrapping after the last, and return it
    pub fn rotate(&mut self) -> &ApiKey {
        let previous = self.cursor;
        self.cursor = (self.cursor + 1) % self.keys.len();
        tracing::info!(
            from = %self.keys[previous],
            to = %self.keys[self.cursor],
            "rotating API key"
        );
        &self.keys[self.cursor]
    }

    /// Number of keys in the rotation
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; a rotator cannot be built without keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Index of the active key
    pub fn position(&self) -> usize {
        self.cursor
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_first_key() {
        let rotator = KeyRotator::new(["a", "b", "c"]).unwrap();
        assert_eq!(rotator.current().expose(), "a");
        assert_eq!(rotator.position(), 0);
        assert_eq!(rotator.len(), 3);
    }

    #[test]
    fn current_has_no_side_effects() {
        let rotator = KeyRotator::new(["a", "b"]).unwrap();
        assert_eq!(rotator.current().expose(), "a");
        assert_eq!(rotator.current().expose(), "a");
    }

    #[test]
    fn rotate_wraps_cyclically() {
        let mut rotator = KeyRotator::new(["a", "b", "c"]).unwrap();
        assert_eq!(rotator.rotate().expose(), "b");
        assert_eq!(rotator.rotate().expose(), "c");
        assert_eq!(rotator.rotate().expose(), "a");
    }

    #[test]
    fn n_rotations_return_to_start_for_any_size() {
        for n in 1..=7 {
            let keys: Vec<String> = (0..n).map(|i| format!("key-{i}")).collect();
            let mut rotator = KeyRotator::with_random_start(keys).unwrap();
            let start = rotator.current().clone();
            for _ in 0..n {
                rotator.rotate();
            }
            assert_eq!(rotator.current(), &start, "size {n} did not cycle back");
        }
    }

    #[test]
    fn single_key_rotates_onto_itself() {
        let mut rotator = KeyRotator::new(["only"]).unwrap();
        for _ in 0..5 {
            assert_eq!(rotator.rotate().expose(), "only");
        }
    }

    #[test]
    fn empty_and_blank_sets_are_rejected() {
        assert!(KeyRotator::new(Vec::<String>::new()).is_err());
        assert!(KeyRotator::new(["", "   "]).is_err());

        let rotator = KeyRotator::new(["", "real"]).unwrap();
        assert_eq!(rotator.len(), 1);
        assert_eq!(rotator.current().expose(), "real");
    }

    #[test]
    fn random_start_stays_in_range() {
        for _ in 0..50 {
            let rotator = KeyRotator::with_random_start(["a", "b", "c", "d"]).unwrap();
            assert!(rotator.position() < 4);
        }
    }

    #[test]
    fn display_and_debug_redact_key() {
        let key = ApiKey::new("le3yia7EgtawuXKcCXUBSZqUBtSuGzyPyWtwmeUa");
        assert_eq!(key.to_string(), "le3yia7E...");
        let debug = format!("{key:?}");
        assert!(!debug.contains("gtawuXK"), "debug output leaked key: {debug}");

        let short = ApiKey::new("abc");
        assert_eq!(short.to_string(), "abc...");
    }
}
