//! # Mapped Entities
//!
//! The handles registries hand out for every lookup.
//!
//! A [`Mapped`] value pairs a domain payload with its registry identity
//! (stable name, wire id, origin). Handles are immutable after
//! construction and shared via `Arc`; the synchronization path relies on
//! two small operations defined here:
//!
//! - [`Mapped::copied_with`] — same payload under a different identity,
//!   used to re-point a baked entry at a positional id;
//! - [`Mapped::content_eq`] — name plus payload equality with ids and
//!   origin excluded, used for delta detection against remote data.

use crate::core::name::StableName;
use crate::registry::Registry;
use std::sync::Arc;

/// Where an entry's definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Defined from bundled build-time data.
    Baked,
    /// Constructed at runtime from remotely transmitted data.
    Dynamic,
}

/// Registry-assigned identity of an entry.
///
/// For baked entries `id` is the sequential baked id; for dynamic entries
/// it is the 0-based transmission position in the synchronized list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityData {
    pub name: StableName,
    pub id: u32,
    pub origin: Origin,
}

impl EntityData {
    pub fn baked(name: StableName, id: u32) -> Self {
        Self {
            name,
            id,
            origin: Origin::Baked,
        }
    }

    pub fn dynamic(name: StableName, id: u32) -> Self {
        Self {
            name,
            id,
            origin: Origin::Dynamic,
        }
    }
}

/// Shared, immutable registry handle.
pub type Handle<T> = Arc<Mapped<T>>;

/// A domain payload bound to its registry identity.
#[derive(Debug)]
pub struct Mapped<T> {
    data: EntityData,
    payload: T,
}

impl<T> Mapped<T> {
    pub fn new(data: EntityData, payload: T) -> Self {
        Self { data, payload }
    }

    pub fn name(&self) -> &StableName {
        &self.data.name
    }

    pub fn id(&self) -> u32 {
        self.data.id
    }

    pub fn origin(&self) -> Origin {
        self.data.origin
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }
}

impl<T: Clone> Mapped<T> {
    /// Copy of this entry under a different identity, payload shared as-is.
    pub fn copied_with(&self, data: EntityData) -> Handle<T> {
        Arc::new(Mapped {
            data,
            payload: self.payload.clone(),
        })
    }
}

impl<T: PartialEq> Mapped<T> {
    /// Content equality: name and payload only.
    ///
    /// Wire ids and origin are deliberately excluded so a baked entry and
    /// its re-pointed dynamic copy compare equal.
    pub fn content_eq(&self, other: &Mapped<T>) -> bool {
        self.data.name == other.data.name && self.payload == other.payload
    }
}

/// Contract every registry payload type fulfills.
///
/// `resolve` is the second phase of two-phase snapshot construction: after
/// a full synchronized snapshot is materialized, every entry is offered a
/// view of the complete registry so payloads that reference peers by name
/// can look them up, breaking forward-reference ordering within one
/// transmitted list. Implementations that need it keep the late-bound
/// reference in interior-mutable storage (e.g. a `OnceLock`); the default
/// is a no-op.
pub trait RegistryPayload: Clone + PartialEq + Send + Sync + 'static {
    fn resolve(&self, _registry: &dyn Registry<Self>) {}
}
