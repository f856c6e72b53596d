//! # Versioned Id Table
//!
//! Per-name records of which wire id a name uses across protocol revisions.
//!
//! Wire ids are not stable: a name may change id between revisions, and an
//! id freed by a removed name may be recycled by a different name in a
//! later revision. The table therefore stores, for each name, an ordered
//! list of non-overlapping `(version range, id)` brackets, and resolves
//! `(version, id)` queries by filtering to brackets alive at the version
//! *before* matching the id — never the reverse.
//!
//! Tables are built once from bundled historical data at load time; a
//! malformed table (overlapping brackets for one name, or one id live for
//! two names at the same version) is a corrupted build artifact and panics.

use crate::core::name::StableName;
use crate::core::version::{ProtocolVersion, VersionRange};
use std::collections::HashMap;

/// One `(version range, id)` bracket of a name's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdBracket {
    pub range: VersionRange,
    pub id: u32,
}

/// All id brackets for one registry, indexed both ways.
#[derive(Debug, Default)]
pub struct VersionedIdTable {
    by_name: HashMap<StableName, Vec<IdBracket>>,
    // id -> names carrying it, with the range each name held it for
    by_id: HashMap<u32, Vec<(VersionRange, StableName)>>,
}

impl VersionedIdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `name` uses `id` across `range`.
    ///
    /// # Panics
    /// Panics if `range` overlaps an existing bracket of the same name, or
    /// if `id` is already live for another name anywhere inside `range`.
    pub fn insert(&mut self, name: StableName, range: VersionRange, id: u32) {
        let brackets = self.by_name.entry(name.clone()).or_default();
        for bracket in brackets.iter() {
            assert!(
                !bracket.range.overlaps(&range),
                "malformed id table: overlapping brackets for '{name}'"
            );
        }
        let holders = self.by_id.entry(id).or_default();
        for (held, holder) in holders.iter() {
            assert!(
                !held.overlaps(&range),
                "malformed id table: id {id} live for both '{holder}' and '{name}'"
            );
        }

        brackets.push(IdBracket { range, id });
        brackets.sort_by_key(|b| b.range.from());
        holders.push((range, name));
    }

    /// The id `name` uses at `version`, if the name exists there.
    pub fn id_of(&self, name: &StableName, version: ProtocolVersion) -> Option<u32> {
        self.by_name.get(name)?.iter().find_map(|bracket| {
            bracket.range.contains(version).then_some(bracket.id)
        })
    }

    /// The name using `id` at `version`, if any.
    ///
    /// Candidates are filtered by liveness at `version` first; id
    /// recycling guarantees at most one survives.
    pub fn name_at(&self, version: ProtocolVersion, id: u32) -> Option<&StableName> {
        self.by_id.get(&id)?.iter().find_map(|(range, name)| {
            range.contains(version).then_some(name)
        })
    }

    /// Whether `name` has any bracket at all.
    pub fn knows(&self, name: &StableName) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
