//! Baked registry resolution across protocol revisions
//!
//! Exercises the versioned id table through the public registry contract:
//! id recycling across disjoint ranges, round-trip identities between
//! `get_id` and `get_by_id`, and the stability of handles after load.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use once_cell::sync::Lazy;
use registry_protocol::registry::{Registry, RegistryData, VersionedRegistry};
use registry_protocol::{ProtocolError, ProtocolVersion, StableName, VersionRange};
use std::sync::Arc;

const V1: ProtocolVersion = ProtocolVersion::new(1);
const V2: ProtocolVersion = ProtocolVersion::new(2);
const V3: ProtocolVersion = ProtocolVersion::new(3);
const V4: ProtocolVersion = ProtocolVersion::new(4);

fn name(text: &str) -> StableName {
    StableName::parse(text).unwrap()
}

/// A registry whose entries move, disappear, and recycle ids over time:
///
/// | name   | v1 | v2 | v3 | v4 |
/// |--------|----|----|----|----|
/// | a      | 0  | 0  | -  | -  |
/// | b      | 1  | 1  | 0  | 0  |
/// | c      | 2  | 2  | 1  | 1  |
/// | d      | -  | -  | 2  | 2  |
static HISTORY: Lazy<VersionedRegistry<u64>> = Lazy::new(|| {
    let data = RegistryData::new()
        .row(name("ex:a"), VersionRange::bounded(V1, V3), 0)
        .row(name("ex:b"), VersionRange::bounded(V1, V3), 1)
        .row(name("ex:b"), VersionRange::since(V3), 0)
        .row(name("ex:c"), VersionRange::bounded(V1, V3), 2)
        .row(name("ex:c"), VersionRange::since(V3), 1)
        .row(name("ex:d"), VersionRange::since(V3), 2);
    let mut registry = VersionedRegistry::new(name("ex:thing"), data);
    registry.define("ex:a", |_| 0xA);
    registry.define("ex:b", |_| 0xB);
    registry.define("ex:c", |_| 0xC);
    registry.define("ex:d", |_| 0xD);
    registry.unload_baked_data();
    registry
});

#[test]
fn id_and_name_resolution_round_trip_at_every_version() {
    let registry = &*HISTORY;
    for version in [V1, V2, V3, V4] {
        // name -> id -> name
        for entry in registry.entries() {
            if let Ok(id) = registry.get_id(&entry, version) {
                let back = registry.get_by_id(version, id).unwrap();
                assert_eq!(back.name(), entry.name(), "at {version}");
            }
        }
        // id -> name -> id
        for id in 0..4 {
            if let Some(entry) = registry.get_by_id(version, id) {
                assert_eq!(registry.get_id(&entry, version).unwrap(), id, "at {version}");
            }
        }
    }
}

#[test]
fn recycled_id_resolves_per_version() {
    // Scenario: 'a' holds id 0 for [v1, v3), 'b' holds id 0 for [v3, ∞)
    let registry = &*HISTORY;
    assert_eq!(registry.get_by_id(V1, 0).unwrap().name(), &name("ex:a"));
    assert_eq!(registry.get_by_id(V2, 0).unwrap().name(), &name("ex:a"));
    assert_eq!(registry.get_by_id(V3, 0).unwrap().name(), &name("ex:b"));
}

#[test]
fn absent_entries_return_none_not_errors() {
    let registry = &*HISTORY;
    // 'd' does not exist before v3
    assert!(registry.get_by_id(V1, 3).is_none());
    assert!(registry.get_by_name(&name("ex:nope")).is_none());
    // 'a' is removed at v3, so nothing holds id 3 there either
    assert!(registry.get_by_id(V3, 3).is_none());
}

#[test]
fn committed_lookups_fail_loudly() {
    let registry = &*HISTORY;
    assert!(matches!(
        registry.get_by_name_or_err(&name("ex:nope")),
        Err(ProtocolError::UnknownName { .. })
    ));
    assert!(matches!(
        registry.get_by_id_or_err(V1, 9),
        Err(ProtocolError::UnknownId { .. })
    ));

    let a = registry.get_by_name(&name("ex:a")).unwrap();
    let err = registry.get_id(&a, V4).unwrap_err();
    assert!(matches!(err, ProtocolError::MissingId { .. }));
    assert!(err.to_string().contains("ex:a"));
}

#[test]
fn handles_are_stable_across_lookups() {
    let registry = &*HISTORY;
    let first = registry.get_by_name(&name("ex:b")).unwrap();
    let second = registry.get_by_name(&name("ex:b")).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let by_id = registry.get_by_id(V1, 1).unwrap();
    assert!(Arc::ptr_eq(&first, &by_id));
}

#[test]
fn baked_ids_follow_definition_order() {
    let registry = &*HISTORY;
    let ids: Vec<u32> = registry.entries().iter().map(|e| e.id()).collect();
    assert_eq!(ids, [0, 1, 2, 3]);
    assert_eq!(registry.size(), 4);
}

#[test]
#[should_panic(expected = "malformed id table")]
fn overlapping_id_holders_abort_load() {
    let data = RegistryData::new()
        .row(name("ex:a"), VersionRange::since(V1), 0)
        .row(name("ex:b"), VersionRange::bounded(V2, V4), 0);
    let _ = VersionedRegistry::<u64>::new(name("ex:thing"), data);
}
