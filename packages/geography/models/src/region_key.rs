//! Municipality code normalization.
//!
//! Accident tables and boundary maps disagree on how a municipality code
//! is written: `5002704`, `"5002704"`, `5002704.0` and `" 5002704 "` all
//! name the same region. [`RegionKey`] is the one place that collapses
//! those spellings, and both sides of every join go through it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized, string-typed municipality code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionKey(String);

impl RegionKey {
    /// Normalizes a textual code.
    ///
    /// Trims surrounding whitespace and drops an all-zero fractional part
    /// left behind by float formatting (`"5002704.0"` -> `"5002704"`).
    /// Anything else is kept verbatim.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Some((int_part, frac_part)) = trimmed.split_once('.')
            && is_integer_text(int_part)
            && !frac_part.is_empty()
            && frac_part.bytes().all(|b| b == b'0')
        {
            return Self(int_part.to_string());
        }

        Self(trimmed.to_string())
    }

    /// Normalizes a JSON value found in a `GeoJSON` property or feature id.
    ///
    /// Strings go through [`Self::normalize`]; integral numbers are
    /// rendered without a fractional part. Returns `None` for null,
    /// booleans, arrays, objects and blank strings.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let key = match value {
            serde_json::Value::String(s) => Self::normalize(s),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self(i.to_string())
                } else if let Some(u) = n.as_u64() {
                    Self(u.to_string())
                } else {
                    Self::normalize(&n.to_string())
                }
            }
            _ => return None,
        };

        if key.is_empty() { None } else { Some(key) }
    }

    /// Returns the normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for RegionKey {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

fn is_integer_text(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
