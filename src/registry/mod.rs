//! # Registries
//!
//! Stable-name ↔ per-version wire id resolution.
//!
//! This module is the identifier resolution engine: baked registries built
//! once from bundled tables, the versioned id table recording which wire id
//! each name uses at each protocol revision, and the synchronized overlay
//! that reconciles remotely pushed registry contents against the baked
//! defaults.
//!
//! ## Components
//! - **Registry** (trait): the lookup contract shared by every registry form
//! - **VersionedRegistry**: baked, load-time built, read-only after freeze
//! - **VersionedIdTable**: per-name `(version range, id)` brackets
//! - **RegistrySynchronizer / SyncedRegistry**: connection-scoped snapshots
//!   built from transmitted element lists, cached per connection key
//!
//! ## Concurrency
//! Baked registries are constructed single-threaded behind a one-time
//! initialization barrier (`once_cell::sync::Lazy` at the call site) and
//! are lock-free to read afterwards. The synchronizer's snapshot cache is
//! compute-once-per-key.

pub mod baked;
pub mod sync;
pub mod versions;

pub use baked::{RegistryData, VersionedRegistry};
pub use sync::{
    ConnectionKey, ElementDecoder, RegistryElement, RegistrySynchronizer, SyncedRegistry,
};
pub use versions::{IdBracket, VersionedIdTable};

use crate::core::entity::{Handle, Mapped};
use crate::core::name::StableName;
use crate::core::version::ProtocolVersion;
use crate::error::{ProtocolError, Result};

/// The lookup contract every registry form honors.
///
/// Implemented by baked registries (ids resolved through the versioned id
/// table) and by synchronized snapshots (ids purely positional). The
/// non-throwing query forms return `Option`; the `_or_err` forms exist for
/// call sites that have already committed to an operation requiring the
/// entry to exist.
pub trait Registry<T>: Send + Sync {
    /// Key naming this registry itself, e.g. `game:biome`.
    fn registry_key(&self) -> &StableName;

    /// Look an entry up by stable name.
    fn get_by_name(&self, name: &StableName) -> Option<Handle<T>>;

    /// Look an entry up by the wire id it carries at `version`.
    fn get_by_id(&self, version: ProtocolVersion, id: u32) -> Option<Handle<T>>;

    /// The wire id `entity` carries at `version`.
    ///
    /// The call site has already assumed validity, so an entry with no id
    /// at `version` is an error, not an absent value.
    fn get_id(&self, entity: &Mapped<T>, version: ProtocolVersion) -> Result<u32>;

    /// Snapshot of all resolved entries, in id order.
    fn entries(&self) -> Vec<Handle<T>>;

    fn size(&self) -> usize;

    fn get_by_name_or_err(&self, name: &StableName) -> Result<Handle<T>> {
        self.get_by_name(name)
            .ok_or_else(|| ProtocolError::UnknownName {
                registry: self.registry_key().clone(),
                name: name.clone(),
            })
    }

    fn get_by_id_or_err(&self, version: ProtocolVersion, id: u32) -> Result<Handle<T>> {
        self.get_by_id(version, id)
            .ok_or_else(|| ProtocolError::UnknownId {
                registry: self.registry_key().clone(),
                version,
                id,
            })
    }
}
