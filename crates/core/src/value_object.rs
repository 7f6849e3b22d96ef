//! Value objects: equality by value, not identity.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("email pattern compiles")
});

/// Normalized (trimmed, lower-cased) email address.
///
/// Emails are the login identity and the subject of issued tokens, so every
/// lookup goes through this type to keep comparisons case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse and normalize a user-supplied address.
    pub fn parse(raw: &str) -> Result<Self, &'static str> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("Email field is blank.");
        }
        if !EMAIL_RE.is_match(trimmed) {
            return Err("Invalid email address.");
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Wrap an address that was already normalized (e.g. loaded from storage or
    /// taken from verified token claims).
    pub fn from_trusted(value: impl Into<String>) -> Self {
        Self(value.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Email {}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
