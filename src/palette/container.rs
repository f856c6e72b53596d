//! # Paletted Container
//!
//! One palette plus its bit storage, with the wire codec and the growth
//! path that keeps them consistent.
//!
//! ## Wire Format
//! ```text
//! [width(1)]
//! width == 0            → [value var-u32] [word count 0, if prefixed]
//! width in list/map     → [entry count var-u32] [entries var-u32 ...] [words]
//! width beyond map      → [words]
//! ```
//! The word array is optionally preceded by an explicit var-int count;
//! whether it is is a property of the surrounding container kind
//! ([`ContainerFormat`]) and must be applied consistently on both sides.
//!
//! ## Growth
//! Inserting a value the current palette cannot hold widens the palette by
//! one bit, rebuilds storage at the new width, and re-encodes every slot.
//! The pass is O(len), preserves every decoded value, and runs to
//! completion before the caller can observe the new storage. Containers
//! are exclusively owned by one encode/decode unit; nothing here locks.

use crate::error::Result;
use crate::palette::storage::BitStorage;
use crate::palette::{ListPalette, MapPalette, Palette, PaletteProfile};
use crate::wire;
use bytes::{Buf, BufMut};
use tracing::trace;

/// Per-container-kind wire decisions, fixed for a given surrounding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerFormat {
    /// Whether the packed words carry an explicit var-int count.
    pub length_prefixed: bool,
    /// Whether width 0 encodes the singleton form; pre-singleton protocol
    /// generations always materialize a table palette instead.
    pub allow_singleton: bool,
}

impl ContainerFormat {
    pub const MODERN: Self = Self {
        length_prefixed: true,
        allow_singleton: true,
    };
}

/// A fixed-length array of domain values behind a growable palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalettedContainer {
    profile: PaletteProfile,
    domain_bits: u8,
    palette: Palette,
    storage: Option<BitStorage>,
}

impl PalettedContainer {
    /// Empty container starting at the domain's list width, every slot 0.
    pub fn new(profile: PaletteProfile, domain_bits: u8) -> Self {
        let bits = profile.list_max_bits;
        Self {
            profile,
            domain_bits,
            palette: Palette::List(ListPalette::empty(bits)),
            storage: Some(BitStorage::new(bits, profile.storage_len)),
        }
    }

    /// Fully-uniform container; no backing storage until a second distinct
    /// value appears.
    pub fn filled(profile: PaletteProfile, domain_bits: u8, value: u32) -> Self {
        Self {
            profile,
            domain_bits,
            palette: Palette::Singleton(value),
            storage: None,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn storage(&self) -> Option<&BitStorage> {
        self.storage.as_ref()
    }

    pub fn len(&self) -> usize {
        self.profile.storage_len
    }

    pub fn is_empty(&self) -> bool {
        self.profile.storage_len == 0
    }

    /// Domain value at `index`.
    pub fn get(&self, index: usize) -> u32 {
        match &self.storage {
            Some(storage) => self.palette.value_of(storage.get(index)),
            None => self.palette.value_of(0),
        }
    }

    /// Store `value` at `index`, growing the palette if needed.
    ///
    /// Returns the value previously decoded at `index`.
    pub fn set(&mut self, index: usize, value: u32) -> u32 {
        // decode the old value first; inserting into the palette below can
        // change what existing codes mean
        let old = self.get(index);

        let code = loop {
            if let Some(code) = self.palette.code_for(value) {
                break code;
            }
            self.resize_one_up();
        };

        if let Some(storage) = &mut self.storage {
            storage.set(index, code);
        }
        old
    }

    /// Widen by one bit and re-encode every slot under the new palette.
    fn resize_one_up(&mut self) {
        let old_palette = std::mem::replace(&mut self.palette, Palette::Singleton(0));
        let old_storage = self.storage.take();

        let old_bits = old_storage.as_ref().map_or(0, BitStorage::bits);
        self.palette = self.profile.palette_for(old_bits + 1, self.domain_bits);
        let mut storage = BitStorage::new(self.palette.bits(), self.profile.storage_len);
        trace!(
            from_bits = old_bits,
            to_bits = self.palette.bits(),
            "growing paletted container"
        );

        match old_storage {
            Some(old) => {
                for index in 0..self.profile.storage_len {
                    let value = old_palette.value_of(old.get(index));
                    let code = self
                        .palette
                        .code_for(value)
                        .unwrap_or_else(|| unreachable!("grown palette has spare capacity"));
                    storage.set(index, code);
                }
            }
            // seed the wider palette with the old uniform value; slots are
            // zero which is exactly its code
            None => {
                let seed = old_palette.value_of(0);
                let _ = self.palette.code_for(seed);
            }
        }
        self.storage = Some(storage);
    }

    /// Decode a container; deterministic dual of [`Self::write`].
    pub fn read(
        buf: &mut impl Buf,
        profile: PaletteProfile,
        domain_bits: u8,
        format: ContainerFormat,
    ) -> Result<Self> {
        if !buf.has_remaining() {
            return Err(crate::error::ProtocolError::UnexpectedEof);
        }
        let bits = buf.get_u8();

        if bits == 0 && format.allow_singleton {
            let value = wire::read_var_u32(buf)?;
            if format.length_prefixed {
                // zero-length word marker
                let count = wire::read_var_u32(buf)? as usize;
                wire::read_words(buf, count)?;
            }
            return Ok(Self::filled(profile, domain_bits, value));
        }

        let palette = if bits <= profile.list_max_bits {
            Palette::List(ListPalette::from_entries(bits, read_entries(buf)?)?)
        } else if bits <= profile.map_max_bits {
            Palette::Map(MapPalette::from_entries(bits, read_entries(buf)?)?)
        } else {
            Palette::Global { bits }
        };

        let expected = BitStorage::words_needed(bits, profile.storage_len);
        let count = if format.length_prefixed {
            wire::read_var_u32(buf)? as usize
        } else {
            expected
        };
        let words = wire::read_words(buf, count)?;
        let storage = BitStorage::from_words(bits, profile.storage_len, words)?;

        Ok(Self {
            profile,
            domain_bits,
            palette,
            storage: Some(storage),
        })
    }

    /// Decode the pre-singleton container form: the received width is
    /// clamped up to the domain's list width and the word array always
    /// carries an explicit count.
    pub fn read_legacy(
        buf: &mut impl Buf,
        profile: PaletteProfile,
        domain_bits: u8,
    ) -> Result<Self> {
        if !buf.has_remaining() {
            return Err(crate::error::ProtocolError::UnexpectedEof);
        }
        let bits = buf.get_u8().max(profile.list_max_bits);

        let palette = if bits <= profile.list_max_bits {
            Palette::List(ListPalette::from_entries(bits, read_entries(buf)?)?)
        } else if bits <= profile.map_max_bits {
            Palette::Map(MapPalette::from_entries(bits, read_entries(buf)?)?)
        } else {
            Palette::Global { bits }
        };

        let count = wire::read_var_u32(buf)? as usize;
        let words = wire::read_words(buf, count)?;
        let storage = BitStorage::from_words(bits, profile.storage_len, words)?;

        Ok(Self {
            profile,
            domain_bits,
            palette,
            storage: Some(storage),
        })
    }

    /// Encode this container; bit-exact inverse of [`Self::read`].
    pub fn write(&self, buf: &mut impl BufMut, format: ContainerFormat) {
        if let (Palette::Singleton(value), true) = (&self.palette, format.allow_singleton) {
            buf.put_u8(0);
            wire::write_var_u32(buf, *value);
            if format.length_prefixed {
                wire::write_var_u32(buf, 0);
            }
            return;
        }

        // a singleton container written into a format without the
        // singleton form materializes as its widest-free equivalent
        let materialized;
        let container = match (&self.palette, &self.storage) {
            (Palette::Singleton(value), _) => {
                let mut full = Self::new(self.profile, self.domain_bits);
                for index in 0..self.profile.storage_len {
                    full.set(index, *value);
                }
                materialized = full;
                &materialized
            }
            _ => self,
        };

        let storage = match &container.storage {
            Some(storage) => storage,
            None => unreachable!("non-singleton container always has storage"),
        };
        buf.put_u8(storage.bits());

        match &container.palette {
            Palette::List(list) => write_entries(buf, list.entries()),
            Palette::Map(map) => write_entries(buf, map.entries()),
            Palette::Global { .. } => {}
            Palette::Singleton(_) => unreachable!("singleton handled above"),
        }

        if format.length_prefixed {
            wire::write_var_u32(buf, storage.words().len() as u32);
        }
        wire::write_words(buf, storage.words());
    }
}

fn read_entries(buf: &mut impl Buf) -> Result<Vec<u32>> {
    let count = wire::read_var_u32(buf)? as usize;
    if count > buf.remaining() {
        return Err(crate::error::ProtocolError::UnexpectedEof);
    }
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        entries.push(wire::read_var_u32(buf)?);
    }
    Ok(entries)
}

fn write_entries(buf: &mut impl BufMut, entries: &[u32]) {
    wire::write_var_u32(buf, entries.len() as u32);
    for &entry in entries {
        wire::write_var_u32(buf, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_sequence_assigns_expected_codes() {
        let mut container = PalettedContainer::new(PaletteProfile::BLOCKS, 15);
        for (index, value) in [5u32, 9, 5, 12].into_iter().enumerate() {
            container.set(index, value);
        }
        let storage = container.storage().unwrap();
        let codes: Vec<u32> = (0..4).map(|i| storage.get(i)).collect();
        assert_eq!(codes, [0, 1, 0, 2]);
        let decoded: Vec<u32> = (0..4).map(|i| container.get(i)).collect();
        assert_eq!(decoded, [5, 9, 5, 12]);
    }

    #[test]
    fn set_returns_previous_value() {
        let mut container = PalettedContainer::new(PaletteProfile::BLOCKS, 15);
        assert_eq!(container.set(0, 5), 0);
        assert_eq!(container.set(0, 9), 5);
    }

    #[test]
    fn singleton_grows_into_list_on_second_value() {
        let mut container = PalettedContainer::filled(PaletteProfile::REGIONS, 6, 7);
        assert_eq!(container.get(10), 7);
        assert!(container.storage().is_none());

        container.set(10, 9);
        assert!(matches!(container.palette(), Palette::List(_)));
        assert_eq!(container.get(10), 9);
        for index in 0..10 {
            assert_eq!(container.get(index), 7);
        }
    }

    #[test]
    fn growth_crosses_into_map_then_global() {
        let mut container = PalettedContainer::new(PaletteProfile::BLOCKS, 10);
        // 16 distinct values fill the 4-bit list palette
        for value in 0..16 {
            container.set(value as usize, value * 3 % 1000);
        }
        assert!(matches!(container.palette(), Palette::List(_)));
        container.set(16, 997);
        assert!(matches!(container.palette(), Palette::Map(_)));
        assert_eq!(container.palette().bits(), 5);

        // push past the 8-bit map palette into the global form
        for value in 0..257 {
            container.set(value as usize, value + 100);
        }
        assert!(matches!(container.palette(), Palette::Global { bits: 10 }));
        for value in 0..257 {
            assert_eq!(container.get(value as usize), value as u32 + 100);
        }
    }

    #[test]
    fn modern_wire_round_trip_list() {
        let mut container = PalettedContainer::new(PaletteProfile::BLOCKS, 15);
        for index in 0..container.len() {
            container.set(index, (index % 7) as u32 * 13);
        }
        let mut buf = bytes::BytesMut::new();
        container.write(&mut buf, ContainerFormat::MODERN);

        let mut slice = &buf[..];
        let decoded = PalettedContainer::read(
            &mut slice,
            PaletteProfile::BLOCKS,
            15,
            ContainerFormat::MODERN,
        )
        .unwrap();
        assert!(slice.is_empty(), "decoder must consume the exact encoding");
        assert_eq!(decoded, container);
    }

    #[test]
    fn modern_wire_round_trip_singleton() {
        let container = PalettedContainer::filled(PaletteProfile::REGIONS, 6, 42);
        let mut buf = bytes::BytesMut::new();
        container.write(&mut buf, ContainerFormat::MODERN);
        // width 0, value 42, word count 0
        assert_eq!(&buf[..], &[0, 42, 0]);

        let mut slice = &buf[..];
        let decoded = PalettedContainer::read(
            &mut slice,
            PaletteProfile::REGIONS,
            6,
            ContainerFormat::MODERN,
        )
        .unwrap();
        assert_eq!(decoded, container);
    }

    #[test]
    fn unprefixed_format_derives_word_count() {
        let format = ContainerFormat {
            length_prefixed: false,
            allow_singleton: true,
        };
        let mut container = PalettedContainer::new(PaletteProfile::REGIONS, 6);
        for index in 0..64 {
            container.set(index, (index % 3) as u32);
        }
        let mut buf = bytes::BytesMut::new();
        container.write(&mut buf, format);

        let mut slice = &buf[..];
        let decoded =
            PalettedContainer::read(&mut slice, PaletteProfile::REGIONS, 6, format).unwrap();
        assert!(slice.is_empty());
        assert_eq!(decoded, container);
    }

    #[test]
    fn legacy_read_clamps_width_to_list_maximum() {
        // legacy encoder writes a singleton-free container at width 4
        let mut container = PalettedContainer::new(PaletteProfile::BLOCKS, 15);
        container.set(0, 5);
        let mut buf = bytes::BytesMut::new();
        container.write(
            &mut buf,
            ContainerFormat {
                length_prefixed: true,
                allow_singleton: false,
            },
        );
        // patch the width byte below the clamp
        let mut bytes = buf.to_vec();
        bytes[0] = 2;

        let mut slice = &bytes[..];
        let decoded =
            PalettedContainer::read_legacy(&mut slice, PaletteProfile::BLOCKS, 15).unwrap();
        assert_eq!(decoded.palette().bits(), 4);
        assert_eq!(decoded.get(0), 5);
    }

    #[test]
    fn singleton_written_without_singleton_form_materializes() {
        let format = ContainerFormat {
            length_prefixed: true,
            allow_singleton: false,
        };
        let container = PalettedContainer::filled(PaletteProfile::REGIONS, 6, 3);
        let mut buf = bytes::BytesMut::new();
        container.write(&mut buf, format);

        let mut slice = &buf[..];
        let decoded =
            PalettedContainer::read(&mut slice, PaletteProfile::REGIONS, 6, format).unwrap();
        for index in 0..64 {
            assert_eq!(decoded.get(index), 3);
        }
    }

    #[test]
    fn truncated_container_is_an_error() {
        let mut container = PalettedContainer::new(PaletteProfile::REGIONS, 6);
        container.set(0, 1);
        let mut buf = bytes::BytesMut::new();
        container.write(&mut buf, ContainerFormat::MODERN);

        for cut in 0..buf.len() {
            let mut slice = &buf[..cut];
            assert!(
                PalettedContainer::read(
                    &mut slice,
                    PaletteProfile::REGIONS,
                    6,
                    ContainerFormat::MODERN
                )
                .is_err(),
                "cut at {cut} must fail"
            );
        }
    }
}
