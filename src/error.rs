//! # Error Types
//!
//! Comprehensive error handling for the registry and palette codec core.
//!
//! This module defines all error variants that can occur while resolving
//! identifiers or transcoding packed arrays, from truncated wire input to
//! protocol-level lookup misses.
//!
//! ## Error Categories
//! - **Wire Errors**: Truncated buffers, malformed var-ints, oversized fields
//! - **Lookup Errors**: Names or ids that do not exist at a protocol version
//! - **Sync Errors**: Payloads a registry-specific decoder rejected
//! - **Storage Errors**: Packed word arrays that do not match their declared shape
//!
//! Fatal *configuration* errors (duplicate baked definitions, overlapping id
//! brackets fed from bundled data) are not represented here: they indicate a
//! corrupted build artifact and abort load via panic, never a runtime `Err`.
//!
//! All errors implement `std::error::Error` for interoperability.

use crate::core::name::StableName;
use crate::core::version::ProtocolVersion;
use thiserror::Error;

/// ProtocolError is the primary error type for all codec operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Var-int exceeds 5 bytes")]
    VarIntTooLong,

    #[error("Invalid identifier: {0}")]
    InvalidName(String),

    #[error("String field of {0} bytes exceeds limit")]
    OversizedString(usize),

    #[error("Element payload of {0} bytes exceeds limit")]
    OversizedPayload(usize),

    #[error("Can't resolve '{name}' in '{registry}'")]
    UnknownName {
        registry: StableName,
        name: StableName,
    },

    #[error("Can't resolve #{id} ({version}) in '{registry}'")]
    UnknownId {
        registry: StableName,
        version: ProtocolVersion,
        id: u32,
    },

    #[error("'{name}' has no id at {version} in '{registry}'")]
    MissingId {
        registry: StableName,
        name: StableName,
        version: ProtocolVersion,
    },

    #[error("Failed to decode payload for '{name}': {message}")]
    PayloadDecode { name: StableName, message: String },

    #[error("Invalid storage width: {0} bits")]
    InvalidStorageWidth(u8),

    #[error("Palette of capacity {capacity} received {actual} entries")]
    PaletteOverflow { capacity: usize, actual: usize },

    #[error("Storage of {expected} words received {actual}")]
    StorageLengthMismatch { expected: usize, actual: usize },
}

/// Convenient result wrapper for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
