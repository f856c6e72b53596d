//! # Palettes
//!
//! Compact code ↔ domain value translation for packed arrays.
//!
//! A palette maps the small working set of distinct values observed in one
//! array to dense codes of the fewest bits that fit. Four kinds cover the
//! whole width spectrum, selected deterministically from the width and the
//! domain size so encoder and decoder agree without extra signaling:
//!
//! - **Singleton** — width 0, one value, no backing storage
//! - **List** — ordered table, linear scan (small sets beat hashing)
//! - **Map** — same contract with a hash lookup for wider codes
//! - **Global** — code *is* the domain id; local indirection no longer pays
//!
//! ## Components
//! - **Palette**: the four-variant sum type
//! - **PaletteProfile**: per-domain width thresholds and array geometry
//! - **BitStorage**: the packed code array ([`storage`])
//! - **PalettedContainer**: palette + storage + wire codec ([`container`])

pub mod container;
pub mod storage;

pub use container::{ContainerFormat, PalettedContainer};
pub use storage::BitStorage;

use crate::error::{ProtocolError, Result};
use std::collections::HashMap;

/// Width thresholds and array geometry for one palette domain.
///
/// The List↔Map crossover is tuned per domain: block-state arrays are large
/// and dense enough for hashed palettes to pay off, region arrays never
/// grow past the list range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteProfile {
    /// Widest palette still encoded as a List.
    pub list_max_bits: u8,
    /// Widest palette still encoded as a Map; below `list_max_bits` means
    /// the Map form is never used for this domain.
    pub map_max_bits: u8,
    /// log2 of the array's edge length, for 3-D indexing.
    pub index_shift: u32,
    /// Total number of entries in one array of this domain.
    pub storage_len: usize,
}

impl PaletteProfile {
    /// Per-block state arrays: 16×16×16 entries, List up to 4 bits, Map up
    /// to 8, Global beyond.
    pub const BLOCKS: Self = Self {
        list_max_bits: 4,
        map_max_bits: 8,
        index_shift: 4,
        storage_len: 16 * 16 * 16,
    };

    /// Per-region arrays: 4×4×4 entries, List up to 3 bits, no Map form.
    pub const REGIONS: Self = Self {
        list_max_bits: 3,
        map_max_bits: 0,
        index_shift: 2,
        storage_len: 4 * 4 * 4,
    };

    /// Flat index of the `(x, y, z)` cell.
    pub const fn index(&self, x: usize, y: usize, z: usize) -> usize {
        ((y << self.index_shift) | z) << self.index_shift | x
    }

    /// The palette kind used at `bits` — the deterministic selection
    /// function shared by encoder and decoder. `bits` must be at least 1;
    /// width 0 is the singleton form and never reaches here.
    pub fn palette_for(&self, bits: u8, domain_bits: u8) -> Palette {
        if bits <= self.list_max_bits {
            Palette::List(ListPalette::empty(bits))
        } else if bits <= self.map_max_bits {
            Palette::Map(MapPalette::empty(bits))
        } else {
            Palette::Global { bits: domain_bits }
        }
    }
}

/// A bounded working set of domain values mapped to dense codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Palette {
    /// Exactly one value; the whole array is uniform.
    Singleton(u32),
    List(ListPalette),
    Map(MapPalette),
    /// Codes are global domain ids; no local table.
    Global { bits: u8 },
}

impl Palette {
    /// Width of the codes this palette produces.
    pub fn bits(&self) -> u8 {
        match self {
            Palette::Singleton(_) => 0,
            Palette::List(list) => list.bits,
            Palette::Map(map) => map.bits,
            Palette::Global { bits } => *bits,
        }
    }

    /// Number of mapped values; unbounded for the global form.
    pub fn size(&self) -> usize {
        match self {
            Palette::Singleton(_) => 1,
            Palette::List(list) => list.values.len(),
            Palette::Map(map) => map.by_code.len(),
            Palette::Global { bits } => 1usize << *bits,
        }
    }

    /// Code for `value`, inserting it if the palette has room.
    ///
    /// `None` signals overflow: the caller must grow to a wider palette
    /// and retry.
    ///
    /// # Panics
    /// Panics in the global form if `value` does not fit the domain —
    /// more distinct values than the domain permits is a programmer error.
    pub fn code_for(&mut self, value: u32) -> Option<u32> {
        match self {
            Palette::Singleton(existing) => (*existing == value).then_some(0),
            Palette::List(list) => list.code_for(value),
            Palette::Map(map) => map.code_for(value),
            Palette::Global { bits } => {
                assert!(
                    *bits >= 32 || value < (1u32 << *bits),
                    "value {value} outside {bits}-bit domain"
                );
                Some(value)
            }
        }
    }

    /// Domain value for `code`; out-of-range codes decode to 0.
    pub fn value_of(&self, code: u32) -> u32 {
        match self {
            Palette::Singleton(value) => {
                if code == 0 {
                    *value
                } else {
                    0
                }
            }
            Palette::List(list) => list.values.get(code as usize).copied().unwrap_or(0),
            Palette::Map(map) => map.by_code.get(code as usize).copied().unwrap_or(0),
            Palette::Global { .. } => code,
        }
    }
}

/// Ordered table palette; lookup by value is a linear scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPalette {
    bits: u8,
    values: Vec<u32>,
}

impl ListPalette {
    pub fn empty(bits: u8) -> Self {
        Self {
            bits,
            values: Vec::new(),
        }
    }

    /// Rebuild a transmitted palette table.
    pub fn from_entries(bits: u8, values: Vec<u32>) -> Result<Self> {
        let capacity = 1usize << bits;
        if values.len() > capacity {
            return Err(ProtocolError::PaletteOverflow {
                capacity,
                actual: values.len(),
            });
        }
        Ok(Self { bits, values })
    }

    pub fn entries(&self) -> &[u32] {
        &self.values
    }

    fn code_for(&mut self, value: u32) -> Option<u32> {
        for (code, &existing) in self.values.iter().enumerate() {
            if existing == value {
                return Some(code as u32);
            }
        }
        if self.values.len() < 1usize << self.bits {
            self.values.push(value);
            return Some(self.values.len() as u32 - 1);
        }
        None
    }
}

/// Hashed table palette for widths where linear scan stops paying off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPalette {
    bits: u8,
    by_code: Vec<u32>,
    by_value: HashMap<u32, u32>,
}

impl MapPalette {
    pub fn empty(bits: u8) -> Self {
        Self {
            bits,
            by_code: Vec::new(),
            by_value: HashMap::new(),
        }
    }

    /// Rebuild a transmitted palette table.
    pub fn from_entries(bits: u8, values: Vec<u32>) -> Result<Self> {
        let capacity = 1usize << bits;
        if values.len() > capacity {
            return Err(ProtocolError::PaletteOverflow {
                capacity,
                actual: values.len(),
            });
        }
        let by_value = values
            .iter()
            .enumerate()
            .map(|(code, &value)| (value, code as u32))
            .collect();
        Ok(Self {
            bits,
            by_code: values,
            by_value,
        })
    }

    pub fn entries(&self) -> &[u32] {
        &self.by_code
    }

    fn code_for(&mut self, value: u32) -> Option<u32> {
        if let Some(&code) = self.by_value.get(&value) {
            return Some(code);
        }
        if self.by_code.len() < 1usize << self.bits {
            let code = self.by_code.len() as u32;
            self.by_code.push(value);
            self.by_value.insert(value, code);
            return Some(code);
        }
        None
    }
}
