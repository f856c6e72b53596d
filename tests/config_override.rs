//! Global per-connection registry override
//!
//! Kept in its own binary: the override is process-wide state and must not
//! race against the cache tests.

#![allow(clippy::unwrap_used)]

use registry_protocol::config;
use registry_protocol::registry::{
    ConnectionKey, RegistryData, RegistryElement, RegistrySynchronizer, VersionedRegistry,
};
use registry_protocol::{EntityData, ProtocolVersion, RegistryPayload, Result, StableName};
use std::sync::Arc;

const V5: ProtocolVersion = ProtocolVersion::new(5);

#[derive(Debug, Clone, PartialEq)]
struct Marker;

impl RegistryPayload for Marker {}

#[test]
fn override_bypasses_the_snapshot_cache() {
    let mut registry = VersionedRegistry::new(
        StableName::new("ex", "thing"),
        RegistryData::new(),
    );
    registry.define("ex:a", |_| Marker);
    registry.unload_baked_data();

    let sync = RegistrySynchronizer::new(
        Arc::new(registry),
        |_: &[u8], _: ProtocolVersion, _: &EntityData| -> Result<Marker> { Ok(Marker) },
    );
    let key = ConnectionKey::new("backend", V5);
    let elements = vec![RegistryElement::new(StableName::new("ex", "a"), None)];

    let cached_a = sync.apply(Some(&key), V5, &elements);
    let cached_b = sync.apply(Some(&key), V5, &elements);
    assert!(Arc::ptr_eq(&cached_a, &cached_b));

    config::set_force_per_connection_registries(true);
    let fresh_a = sync.apply(Some(&key), V5, &elements);
    let fresh_b = sync.apply(Some(&key), V5, &elements);
    assert!(!Arc::ptr_eq(&fresh_a, &fresh_b), "override must rebuild every time");

    config::set_force_per_connection_registries(false);
    let cached_c = sync.apply(Some(&key), V5, &elements);
    assert!(Arc::ptr_eq(&cached_a, &cached_c), "cache entries survive the override");
}
