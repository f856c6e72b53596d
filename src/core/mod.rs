//! # Core Identity Types
//!
//! Names, versions, and the handle type everything else is built on.
//!
//! ## Components
//! - **StableName**: version-independent `namespace:path` identifiers
//! - **ProtocolVersion / VersionRange**: ordered revision points and spans
//! - **Mapped / Handle**: immutable registry handles with delta-detection
//!   support

pub mod entity;
pub mod name;
pub mod version;

pub use entity::{EntityData, Handle, Mapped, Origin, RegistryPayload};
pub use name::StableName;
pub use version::{ProtocolVersion, VersionRange};
