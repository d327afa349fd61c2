//! Strongly-typed migration version.

use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// The ledger's natural key for one migration step (e.g. `"v1.00"`).
///
/// Any non-empty string is accepted. Ordering is plain lexicographic string
/// ordering, so `"10.00"` sorts before `"2.00"`; the ledger's all-versions
/// query orders the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Create a new version, returning an error if it is empty.
    pub fn new(version: impl Into<String>) -> Result<Self, CoreError> {
        let s = version.into();
        if s.is_empty() {
            Err(CoreError::EmptyVersion)
        } else {
            Ok(Self(s))
        }
    }

    /// Return the underlying version as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::new(s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::new(s)
    }
}

impl TryFrom<String> for Version {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Version::new(s)
    }
}

impl TryFrom<&str> for Version {
    type Error = CoreError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Version::new(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Version {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Version {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for Version {
    fn eq(&self, other: &String) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
