//! # Baked Registries
//!
//! Registries built once at load time from bundled data.
//!
//! A [`VersionedRegistry`] goes through three phases:
//!
//! 1. **Construction** from a [`RegistryData`] table of historical
//!    `(name, version range, id)` rows — single-threaded, at module
//!    initialization.
//! 2. **Definition**: [`VersionedRegistry::define`] registers each entry's
//!    payload and assigns sequential baked ids. Duplicate names are a
//!    corrupted build artifact and panic immediately.
//! 3. **Freeze**: [`VersionedRegistry::unload_baked_data`] drops the raw
//!    bundled rows to bound steady-state memory and marks the registry
//!    read-only. From then on it is safe for unsynchronized concurrent
//!    reads from any number of packet-processing threads.
//!
//! Callers typically hold the finished registry in a
//! `once_cell::sync::Lazy`, which doubles as the one-time initialization
//! barrier.
//!
//! ## Usage
//! ```
//! use once_cell::sync::Lazy;
//! use registry_protocol::registry::{Registry, RegistryData, VersionedRegistry};
//! use registry_protocol::{ProtocolVersion, StableName, VersionRange};
//!
//! static BIOMES: Lazy<VersionedRegistry<&'static str>> = Lazy::new(|| {
//!     let data = RegistryData::new().row(
//!         StableName::new("game", "plains"),
//!         VersionRange::since(ProtocolVersion::new(1)),
//!         0,
//!     );
//!     let mut registry = VersionedRegistry::new(StableName::new("game", "biome"), data);
//!     registry.define("game:plains", |_| "plains payload");
//!     registry.unload_baked_data();
//!     registry
//! });
//!
//! let plains = BIOMES.get_by_name(&StableName::new("game", "plains")).unwrap();
//! assert_eq!(BIOMES.get_id(&plains, ProtocolVersion::new(1)).unwrap(), 0);
//! ```

use crate::core::entity::{EntityData, Handle, Mapped};
use crate::core::name::StableName;
use crate::core::version::{ProtocolVersion, VersionRange};
use crate::error::{ProtocolError, Result};
use crate::registry::versions::VersionedIdTable;
use crate::registry::Registry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Raw per-version id rows, as parsed from bundled build data.
///
/// Kept only until [`VersionedRegistry::unload_baked_data`]; everything the
/// registry needs afterwards lives in the compiled [`VersionedIdTable`].
#[derive(Debug, Clone, Default)]
pub struct RegistryData {
    rows: Vec<(StableName, VersionRange, u32)>,
}

impl RegistryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, name: StableName, range: VersionRange, id: u32) -> Self {
        self.rows.push((name, range, id));
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A baked registry: name map, versioned id table, sequential baked ids.
#[derive(Debug)]
pub struct VersionedRegistry<T> {
    key: StableName,
    by_name: HashMap<StableName, Handle<T>>,
    entries: Vec<Handle<T>>,
    table: VersionedIdTable,
    // build-only bookkeeping, dropped by unload_baked_data
    raw: Option<RegistryData>,
    frozen: bool,
}

impl<T> VersionedRegistry<T> {
    /// Compile `data` into the versioned id table and start definitions.
    ///
    /// # Panics
    /// Panics if the table is malformed (overlapping brackets, or one id
    /// live for two names at the same version).
    pub fn new(key: StableName, data: RegistryData) -> Self {
        let mut table = VersionedIdTable::new();
        for (name, range, id) in &data.rows {
            table.insert(name.clone(), *range, *id);
        }
        Self {
            key,
            by_name: HashMap::new(),
            entries: Vec::new(),
            table,
            raw: Some(data),
            frozen: false,
        }
    }

    /// Register a baked entry.
    ///
    /// The factory receives the build-assigned identity (name plus the next
    /// sequential baked id) and returns the domain payload.
    ///
    /// # Panics
    /// Panics on a duplicate name or on definition after
    /// [`unload_baked_data`](Self::unload_baked_data); both indicate a
    /// corrupted build, and failing at load beats failing at first use.
    pub fn define(&mut self, name: &str, factory: impl FnOnce(&EntityData) -> T) -> Handle<T> {
        assert!(
            !self.frozen,
            "registry '{}' is frozen, no definitions after unload_baked_data",
            self.key
        );
        let name = match StableName::parse(name) {
            Ok(name) => name,
            Err(err) => panic!("invalid entry name in registry '{}': {err}", self.key),
        };
        assert!(
            !self.by_name.contains_key(&name),
            "duplicate entry '{name}' in registry '{}'",
            self.key
        );

        let data = EntityData::baked(name.clone(), self.entries.len() as u32);
        let payload = factory(&data);
        let handle = Arc::new(Mapped::new(data, payload));
        self.by_name.insert(name, handle.clone());
        self.entries.push(handle.clone());
        handle
    }

    /// Drop build-only bookkeeping and mark the registry read-only.
    pub fn unload_baked_data(&mut self) {
        self.raw = None;
        self.frozen = true;
        debug!(registry = %self.key, entries = self.entries.len(), "froze baked registry");
    }

    /// The versioned id table backing id resolution.
    pub fn id_table(&self) -> &VersionedIdTable {
        &self.table
    }

    /// Whether the raw bundled rows are still held.
    pub fn holds_baked_data(&self) -> bool {
        self.raw.is_some()
    }
}

impl<T: Send + Sync> Registry<T> for VersionedRegistry<T> {
    fn registry_key(&self) -> &StableName {
        &self.key
    }

    fn get_by_name(&self, name: &StableName) -> Option<Handle<T>> {
        self.by_name.get(name).cloned()
    }

    fn get_by_id(&self, version: ProtocolVersion, id: u32) -> Option<Handle<T>> {
        let name = self.table.name_at(version, id)?;
        self.by_name.get(name).cloned()
    }

    fn get_id(&self, entity: &Mapped<T>, version: ProtocolVersion) -> Result<u32> {
        self.table
            .id_of(entity.name(), version)
            .ok_or_else(|| ProtocolError::MissingId {
                registry: self.key.clone(),
                name: entity.name().clone(),
                version,
            })
    }

    fn entries(&self) -> Vec<Handle<T>> {
        self.entries.clone()
    }

    fn size(&self) -> usize {
        self.entries.len()
    }
}
