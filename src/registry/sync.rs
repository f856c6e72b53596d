//! # Synchronized Registry Overlay
//!
//! Connection-scoped registry snapshots built from remote data.
//!
//! When a peer pushes registry contents, the ids it will use on the wire
//! are the 0-based *transmission positions* of the elements it sent — the
//! baked ids stop mattering for that connection. This module reconciles
//! such element lists against the baked defaults:
//!
//! - a transmitted payload that decodes to the same content as the baked
//!   entry is discarded in favor of the (re-pointed) baked copy, so
//!   confirmations of known data are never stored twice;
//! - a payload that differs is kept as a dynamic entry;
//! - a name with neither payload nor baked fallback is logged and left
//!   absent, without invalidating the rest of the snapshot.
//!
//! Snapshots are memoized per [`ConnectionKey`] with compute-once-per-key
//! semantics; see [`crate::config::set_force_per_connection_registries`]
//! for the global opt-out.

use crate::config;
use crate::core::entity::{EntityData, Handle, Mapped, RegistryPayload};
use crate::core::name::StableName;
use crate::core::version::ProtocolVersion;
use crate::error::{ProtocolError, Result};
use crate::registry::baked::VersionedRegistry;
use crate::registry::Registry;
use crate::wire;
use bytes::{Buf, BufMut, Bytes};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// One element of a transmitted registry list.
///
/// The payload is opaque at this layer; a registry-specific
/// [`ElementDecoder`] turns it into a domain value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryElement {
    pub name: StableName,
    pub payload: Option<Bytes>,
}

impl RegistryElement {
    pub fn new(name: StableName, payload: Option<Bytes>) -> Self {
        Self { name, payload }
    }

    /// Decode a full element list: var-int count, then per element a
    /// namespaced name, a presence flag, and an optional length-prefixed
    /// payload.
    pub fn read_list(buf: &mut impl Buf) -> Result<Vec<RegistryElement>> {
        let count = wire::read_var_u32(buf)? as usize;
        // every element occupies at least two bytes, so a hostile count
        // cannot force a large allocation from a short buffer
        if count > buf.remaining() {
            return Err(ProtocolError::UnexpectedEof);
        }
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            let name = StableName::parse(&wire::read_string(buf, config::MAX_NAME_LEN)?)?;
            let payload = if read_bool(buf)? {
                let len = wire::read_var_u32(buf)? as usize;
                if len > config::MAX_ELEMENT_PAYLOAD {
                    return Err(ProtocolError::OversizedPayload(len));
                }
                if buf.remaining() < len {
                    return Err(ProtocolError::UnexpectedEof);
                }
                Some(buf.copy_to_bytes(len))
            } else {
                None
            };
            elements.push(RegistryElement { name, payload });
        }
        Ok(elements)
    }

    /// Encode an element list; bit-exact inverse of [`Self::read_list`].
    pub fn write_list(buf: &mut impl BufMut, elements: &[RegistryElement]) {
        wire::write_var_u32(buf, elements.len() as u32);
        for element in elements {
            wire::write_string(buf, &element.name.to_string());
            match &element.payload {
                Some(payload) => {
                    buf.put_u8(1);
                    wire::write_var_u32(buf, payload.len() as u32);
                    buf.put_slice(payload);
                }
                None => buf.put_u8(0),
            }
        }
    }
}

fn read_bool(buf: &mut impl Buf) -> Result<bool> {
    if !buf.has_remaining() {
        return Err(ProtocolError::UnexpectedEof);
    }
    Ok(buf.get_u8() != 0)
}

/// Registry-specific payload decoder, supplied by the owning collaborator.
pub trait ElementDecoder<T>: Send + Sync {
    fn decode(&self, payload: &[u8], version: ProtocolVersion, data: &EntityData) -> Result<T>;
}

impl<T, F> ElementDecoder<T> for F
where
    F: Fn(&[u8], ProtocolVersion, &EntityData) -> Result<T> + Send + Sync,
{
    fn decode(&self, payload: &[u8], version: ProtocolVersion, data: &EntityData) -> Result<T> {
        self(payload, version, data)
    }
}

/// Application-supplied cache key: "identical registry contents for every
/// connection sharing this key".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    /// Upstream identity (backend server, world, shard — whatever the
    /// embedder considers the unit of registry sharing).
    pub scope: String,
    /// Negotiated protocol version for the connection class.
    pub version: ProtocolVersion,
}

impl ConnectionKey {
    pub fn new(scope: impl Into<String>, version: ProtocolVersion) -> Self {
        Self {
            scope: scope.into(),
            version,
        }
    }
}

/// A registry materialized from one transmitted element list.
///
/// Ids are transmission positions; unresolved positions stay absent.
#[derive(Debug)]
pub struct SyncedRegistry<T> {
    key: StableName,
    slots: Vec<Option<Handle<T>>>,
    by_name: HashMap<StableName, Handle<T>>,
}

impl<T> SyncedRegistry<T> {
    fn with_capacity(key: StableName, capacity: usize) -> Self {
        Self {
            key,
            slots: Vec::with_capacity(capacity),
            by_name: HashMap::with_capacity(capacity),
        }
    }

    fn push_resolved(&mut self, handle: Handle<T>) {
        self.by_name.insert(handle.name().clone(), handle.clone());
        self.slots.push(Some(handle));
    }

    fn push_absent(&mut self) {
        self.slots.push(None);
    }

    /// Number of transmitted positions, including unresolved ones.
    pub fn positions(&self) -> usize {
        self.slots.len()
    }
}

impl<T: Send + Sync> Registry<T> for SyncedRegistry<T> {
    fn registry_key(&self) -> &StableName {
        &self.key
    }

    fn get_by_name(&self, name: &StableName) -> Option<Handle<T>> {
        self.by_name.get(name).cloned()
    }

    /// Positional lookup; the version argument is irrelevant for a
    /// synchronized snapshot and is ignored.
    fn get_by_id(&self, _version: ProtocolVersion, id: u32) -> Option<Handle<T>> {
        self.slots.get(id as usize).and_then(Clone::clone)
    }

    fn get_id(&self, entity: &Mapped<T>, version: ProtocolVersion) -> Result<u32> {
        self.by_name
            .get(entity.name())
            .map(|handle| handle.id())
            .ok_or_else(|| ProtocolError::MissingId {
                registry: self.key.clone(),
                name: entity.name().clone(),
                version,
            })
    }

    fn entries(&self) -> Vec<Handle<T>> {
        self.slots.iter().flatten().cloned().collect()
    }

    fn size(&self) -> usize {
        self.by_name.len()
    }
}

/// Builds and caches synchronized snapshots for one registry.
pub struct RegistrySynchronizer<T> {
    base: Arc<VersionedRegistry<T>>,
    decoder: Box<dyn ElementDecoder<T>>,
    cache: RwLock<HashMap<ConnectionKey, Arc<SyncedRegistry<T>>>>,
}

impl<T: RegistryPayload> RegistrySynchronizer<T> {
    pub fn new(base: Arc<VersionedRegistry<T>>, decoder: impl ElementDecoder<T> + 'static) -> Self {
        Self {
            base,
            decoder: Box::new(decoder),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The baked registry this synchronizer reconciles against.
    pub fn base(&self) -> &VersionedRegistry<T> {
        &self.base
    }

    /// Build (or fetch) the snapshot for a transmitted element list.
    ///
    /// With a key, snapshot construction happens at most once per key even
    /// under concurrent calls; hits only take the read lock. A `None` key
    /// or the global per-connection override always rebuilds.
    pub fn apply(
        &self,
        key: Option<&ConnectionKey>,
        version: ProtocolVersion,
        elements: &[RegistryElement],
    ) -> Arc<SyncedRegistry<T>> {
        let key = match key {
            Some(key) if !config::force_per_connection_registries() => key,
            _ => return self.build(version, elements),
        };

        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return hit.clone();
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(key.clone())
            .or_insert_with(|| {
                debug!(registry = %self.base.registry_key(), scope = %key.scope,
                    version = %key.version, "building synchronized registry snapshot");
                self.build(version, elements)
            })
            .clone()
    }

    /// Forget the snapshot cached under `key` (backend identity or
    /// negotiated version changed).
    pub fn invalidate(&self, key: &ConnectionKey) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn build(
        &self,
        version: ProtocolVersion,
        elements: &[RegistryElement],
    ) -> Arc<SyncedRegistry<T>> {
        let mut registry =
            SyncedRegistry::with_capacity(self.base.registry_key().clone(), elements.len());
        for (position, element) in elements.iter().enumerate() {
            self.reconcile(&mut registry, element, position as u32, version);
        }
        let registry = Arc::new(registry);

        // second phase: the snapshot is complete, let entries that
        // reference peers of the same registry re-look them up
        for entry in registry.entries() {
            entry.payload().resolve(registry.as_ref());
        }
        registry
    }

    fn reconcile(
        &self,
        registry: &mut SyncedRegistry<T>,
        element: &RegistryElement,
        position: u32,
        version: ProtocolVersion,
    ) {
        let data = EntityData::dynamic(element.name.clone(), position);

        // baked fallback, re-pointed at the transmission position for both
        // comparison and storage; it keeps its baked provenance
        let repointed = self
            .base
            .get_by_name(&element.name)
            .map(|baked| baked.copied_with(EntityData::baked(element.name.clone(), position)));

        if let Some(payload) = &element.payload {
            match self.decoder.decode(payload, version, &data) {
                Ok(value) => {
                    let decoded = Mapped::new(data, value);
                    let confirms_baked = repointed
                        .as_ref()
                        .is_some_and(|baked| decoded.content_eq(baked));
                    if !confirms_baked {
                        // remote actually overrides; keep the decoded value
                        registry.push_resolved(Arc::new(decoded));
                        return;
                    }
                    // identical content: drop the decoded copy, keep baked
                }
                Err(err) => {
                    // scoped per entry; the baked fallback below may still
                    // cover this position
                    warn!(registry = %registry.key, name = %element.name, error = %err,
                        "discarding undecodable registry element payload");
                }
            }
        }

        match repointed {
            Some(baked) => registry.push_resolved(baked),
            None => {
                warn!(registry = %registry.key, name = %element.name,
                    "unknown registry entry without payload, leaving position unresolved");
                registry.push_absent();
            }
        }
    }
}
