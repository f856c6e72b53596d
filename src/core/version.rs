//! # Protocol Versions
//!
//! Points in the ordered sequence of wire-format revisions, plus the
//! half-open ranges the versioned id tables are expressed in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One revision of the wire format.
///
/// The inner value is the ordinal of the revision in the known release
/// sequence; ordering on the ordinal is ordering in time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ProtocolVersion(u32);

impl ProtocolVersion {
    pub const fn new(ordinal: u32) -> Self {
        Self(ordinal)
    }

    pub const fn ordinal(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A half-open span of protocol versions: `[from, until)`.
///
/// `until == None` means the range is open-ended and covers every revision
/// from `from` onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRange {
    from: ProtocolVersion,
    until: Option<ProtocolVersion>,
}

impl VersionRange {
    /// Range covering `[from, until)`.
    ///
    /// # Panics
    /// Panics on an empty range (`until <= from`); ranges come from bundled
    /// build data and an empty one is a corrupted artifact.
    pub fn bounded(from: ProtocolVersion, until: ProtocolVersion) -> Self {
        assert!(from < until, "empty version range {from}..{until}");
        Self {
            from,
            until: Some(until),
        }
    }

    /// Open-ended range covering `[from, ∞)`.
    pub const fn since(from: ProtocolVersion) -> Self {
        Self { from, until: None }
    }

    pub const fn from(&self) -> ProtocolVersion {
        self.from
    }

    pub const fn until(&self) -> Option<ProtocolVersion> {
        self.until
    }

    pub fn contains(&self, version: ProtocolVersion) -> bool {
        version >= self.from && self.until.map_or(true, |until| version < until)
    }

    pub fn overlaps(&self, other: &VersionRange) -> bool {
        match (self.until, other.until) {
            (Some(a_until), Some(b_until)) => self.from < b_until && other.from < a_until,
            (Some(a_until), None) => other.from < a_until,
            (None, Some(b_until)) => self.from < b_until,
            (None, None) => true,
        }
    }
}
