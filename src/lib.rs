//! # registry-protocol
//!
//! Identifier resolution and compact-encoding core for versioned binary
//! game protocols.
//!
//! One logical value — a block state, a biome, a dialog type — is encoded
//! under different wire ids in different protocol revisions, and a remote
//! peer may replace whole registries at runtime. This crate lets a single
//! codebase encode and decode the same logical data across all of them:
//!
//! - **Registries** ([`registry`]): stable `namespace:path` names resolved
//!   to per-version wire ids through baked tables, plus connection-scoped
//!   synchronized snapshots reconciled against the baked defaults.
//! - **Palettes** ([`palette`]): bit-packed array encoding for large
//!   identifier arrays, using the fewest bits that fit the values actually
//!   present and growing on demand without corrupting written data.
//!
//! The crate is a pure, synchronous, in-memory transform between domain
//! values and wire bytes: no sockets, no game logic, no scheduling. The
//! surrounding transport layer hands it framed bytes and a negotiated
//! version.
//!
//! ## Example
//! ```
//! use registry_protocol::core::{ProtocolVersion, StableName, VersionRange};
//! use registry_protocol::registry::{Registry, RegistryData, VersionedRegistry};
//!
//! const V1: ProtocolVersion = ProtocolVersion::new(1);
//! const V3: ProtocolVersion = ProtocolVersion::new(3);
//!
//! let data = RegistryData::new()
//!     .row(StableName::new("game", "plains"), VersionRange::since(V1), 0)
//!     .row(StableName::new("game", "desert"), VersionRange::bounded(V1, V3), 1);
//! let mut biomes = VersionedRegistry::new(StableName::new("game", "biome"), data);
//! biomes.define("game:plains", |_| "plains payload");
//! biomes.define("game:desert", |_| "desert payload");
//! biomes.unload_baked_data();
//!
//! let plains = biomes.get_by_name(&StableName::new("game", "plains")).unwrap();
//! assert_eq!(biomes.get_id(&plains, V3).unwrap(), 0);
//! assert!(biomes.get_by_id(V3, 1).is_none()); // desert removed in v3
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod palette;
pub mod registry;
pub mod wire;

pub use crate::core::{
    EntityData, Handle, Mapped, Origin, ProtocolVersion, RegistryPayload, StableName, VersionRange,
};
pub use crate::error::{ProtocolError, Result};
pub use crate::palette::{BitStorage, ContainerFormat, Palette, PaletteProfile, PalettedContainer};
pub use crate::registry::{
    ConnectionKey, Registry, RegistryData, RegistryElement, RegistrySynchronizer, SyncedRegistry,
    VersionedIdTable, VersionedRegistry,
};
