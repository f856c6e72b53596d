//! # Stable Names
//!
//! Version-independent `namespace:path` identifiers.
//!
//! A [`StableName`] names a domain concept (a block state, a biome, a
//! registry itself) without reference to any wire id. Wire ids change
//! between protocol revisions; stable names never do, which is what makes
//! them usable as registry keys and as the join point between baked data
//! and remotely synchronized data.

use crate::config::DEFAULT_NAMESPACE;
use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A two-part `namespace:path` identifier, unique within a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StableName {
    namespace: String,
    path: String,
}

impl StableName {
    /// Build a name from pre-validated parts.
    ///
    /// # Panics
    /// Panics if either part contains characters outside the identifier
    /// character set; literals in baked tables are expected to be valid.
    pub fn new(namespace: &str, path: &str) -> Self {
        match Self::try_new(namespace, path) {
            Ok(name) => name,
            Err(err) => panic!("invalid stable name {namespace}:{path}: {err}"),
        }
    }

    /// Fallible form of [`StableName::new`] for untrusted input.
    pub fn try_new(namespace: &str, path: &str) -> Result<Self> {
        if !is_valid_namespace(namespace) || !is_valid_path(path) {
            return Err(ProtocolError::InvalidName(format!("{namespace}:{path}")));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Parse `"namespace:path"`, defaulting the namespace when absent.
    pub fn parse(text: &str) -> Result<Self> {
        match text.split_once(':') {
            Some((namespace, path)) => Self::try_new(namespace, path),
            None => Self::try_new(DEFAULT_NAMESPACE, text),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-'))
}

fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-' | b'/'))
}

impl fmt::Display for StableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for StableName {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StableName {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<StableName> for String {
    fn from(name: StableName) -> Self {
        name.to_string()
    }
}
