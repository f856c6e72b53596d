//! # Configuration
//!
//! Centralized limits and global switches for the codec core.
//!
//! The core itself performs no I/O and reads no files; configuration is a
//! small set of wire-safety constants plus one process-wide override that
//! deployments toggle programmatically at startup.
//!
//! ## Security Considerations
//! - String and payload limits bound allocations before they happen, so a
//!   hostile length prefix cannot trigger memory exhaustion.
//! - The per-connection registry override trades memory for isolation on
//!   deployments that must not share snapshots across connections.

use std::sync::atomic::{AtomicBool, Ordering};

/// Default namespace applied when a stable name is written without one.
pub const DEFAULT_NAMESPACE: &str = "game";

/// Max allowed byte length of a namespaced identifier on the wire.
pub const MAX_NAME_LEN: usize = 32_767;

/// Max allowed size of a single synchronized-registry element payload (1 MB).
pub const MAX_ELEMENT_PAYLOAD: usize = 1024 * 1024;

/// Widest packed-storage entry the codec will produce or accept.
pub const MAX_STORAGE_BITS: u8 = 32;

/// When set, every registry-data push builds a fresh snapshot and the
/// connection-key cache is bypassed entirely.
static FORCE_PER_CONNECTION_REGISTRIES: AtomicBool = AtomicBool::new(false);

/// Disable (or re-enable) snapshot sharing across connections.
///
/// Intended to be called once during startup by deployments that cannot
/// guarantee "same cache key implies same registry contents".
pub fn set_force_per_connection_registries(force: bool) {
    FORCE_PER_CONNECTION_REGISTRIES.store(force, Ordering::Relaxed);
}

/// Whether synchronized registry snapshots must be rebuilt per connection.
pub fn force_per_connection_registries() -> bool {
    FORCE_PER_CONNECTION_REGISTRIES.load(Ordering::Relaxed)
}
