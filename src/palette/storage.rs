//! # Bit Storage
//!
//! A flat packed array of fixed-width unsigned codes.
//!
//! Entry `i` occupies bits `[i*width, i*width + width)` of the word array
//! and may straddle two words. Writes mask exactly the target bit range;
//! neighboring entries are never disturbed, which the property tests pin
//! down across all supported widths.
//!
//! Width 0 has no representation here on purpose — a fully uniform array
//! is a [`Palette::Singleton`](crate::palette::Palette) with no storage.

use crate::config::MAX_STORAGE_BITS;
use crate::error::{ProtocolError, Result};

/// Packed array of `len` entries, `bits` bits each, over u64 words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStorage {
    bits: u8,
    len: usize,
    mask: u64,
    words: Vec<u64>,
}

impl BitStorage {
    /// Zero-filled storage for `len` entries of `bits` bits.
    ///
    /// # Panics
    /// Panics if `bits` is 0 or above [`MAX_STORAGE_BITS`]; widths are
    /// chosen by the palette selection function, so an invalid one is a
    /// programmer error.
    pub fn new(bits: u8, len: usize) -> Self {
        assert!(
            bits >= 1 && bits <= MAX_STORAGE_BITS,
            "unsupported storage width: {bits} bits"
        );
        Self {
            bits,
            len,
            mask: (1u64 << bits) - 1,
            words: vec![0; Self::words_needed(bits, len)],
        }
    }

    /// Wrap words received off the wire, validating the declared shape.
    pub fn from_words(bits: u8, len: usize, words: Vec<u64>) -> Result<Self> {
        if bits == 0 || bits > MAX_STORAGE_BITS {
            return Err(ProtocolError::InvalidStorageWidth(bits));
        }
        let expected = Self::words_needed(bits, len);
        if words.len() != expected {
            return Err(ProtocolError::StorageLengthMismatch {
                expected,
                actual: words.len(),
            });
        }
        Ok(Self {
            bits,
            len,
            mask: (1u64 << bits) - 1,
            words,
        })
    }

    /// Words required for `len` entries of `bits` bits.
    pub fn words_needed(bits: u8, len: usize) -> usize {
        (len * bits as usize + 63) / 64
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub fn into_words(self) -> Vec<u64> {
        self.words
    }

    /// Code stored at `index`.
    pub fn get(&self, index: usize) -> u32 {
        assert!(index < self.len, "index {index} out of {}", self.len);
        let bit = index * self.bits as usize;
        let start = bit >> 6;
        let end = (bit + self.bits as usize - 1) >> 6;
        let offset = (bit & 63) as u32;

        let mut value = self.words[start] >> offset;
        if end != start {
            value |= self.words[end] << (64 - offset);
        }
        (value & self.mask) as u32
    }

    /// Store `value` at `index`, leaving every other entry untouched.
    ///
    /// # Panics
    /// Panics if `value` does not fit in the entry width.
    pub fn set(&mut self, index: usize, value: u32) {
        assert!(index < self.len, "index {index} out of {}", self.len);
        let value = u64::from(value);
        assert!(value <= self.mask, "{value} exceeds {}-bit storage", self.bits);
        let bit = index * self.bits as usize;
        let start = bit >> 6;
        let end = (bit + self.bits as usize - 1) >> 6;
        let offset = (bit & 63) as u32;

        self.words[start] = self.words[start] & !(self.mask << offset) | (value << offset);
        if end != start {
            // bits of the entry that spill into the next word
            let written = 64 - offset;
            self.words[end] = self.words[end] & !(self.mask >> written) | (value >> written);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_entry_round_trip() {
        let mut storage = BitStorage::new(4, 16);
        storage.set(3, 0xA);
        assert_eq!(storage.get(3), 0xA);
        assert_eq!(storage.get(2), 0);
        assert_eq!(storage.get(4), 0);
    }

    #[test]
    fn straddling_entry_spans_two_words() {
        // width 5: entry 12 covers bits 60..65
        let mut storage = BitStorage::new(5, 26);
        storage.set(12, 0b10101);
        assert_eq!(storage.get(12), 0b10101);
        assert_eq!(storage.words()[0] >> 60, 0b0101);
        assert_eq!(storage.words()[1] & 1, 1);
        storage.set(11, 0b11111);
        storage.set(13, 0b11111);
        assert_eq!(storage.get(12), 0b10101);
    }

    #[test]
    fn overwrite_clears_previous_bits() {
        let mut storage = BitStorage::new(5, 26);
        storage.set(12, 0b11111);
        storage.set(12, 0b00001);
        assert_eq!(storage.get(12), 0b00001);
        assert_eq!(storage.words()[1] & 1, 0);
    }

    #[test]
    fn max_width_round_trip() {
        let mut storage = BitStorage::new(32, 5);
        storage.set(1, u32::MAX);
        storage.set(2, 0xDEAD_BEEF);
        assert_eq!(storage.get(1), u32::MAX);
        assert_eq!(storage.get(2), 0xDEAD_BEEF);
        assert_eq!(storage.get(0), 0);
    }

    #[test]
    fn from_words_validates_shape() {
        assert!(BitStorage::from_words(4, 16, vec![0]).is_ok());
        assert!(matches!(
            BitStorage::from_words(4, 16, vec![0, 0]),
            Err(ProtocolError::StorageLengthMismatch {
                expected: 1,
                actual: 2
            })
        ));
        assert!(matches!(
            BitStorage::from_words(0, 16, vec![]),
            Err(ProtocolError::InvalidStorageWidth(0))
        ));
        assert!(matches!(
            BitStorage::from_words(33, 16, vec![0; 9]),
            Err(ProtocolError::InvalidStorageWidth(33))
        ));
    }

    #[test]
    fn words_needed_rounds_up() {
        assert_eq!(BitStorage::words_needed(4, 16), 1);
        assert_eq!(BitStorage::words_needed(4, 17), 2);
        assert_eq!(BitStorage::words_needed(5, 64), 5);
        assert_eq!(BitStorage::words_needed(1, 64), 1);
    }

    #[test]
    #[should_panic(expected = "exceeds 4-bit storage")]
    fn oversized_value_panics() {
        let mut storage = BitStorage::new(4, 4);
        storage.set(0, 16);
    }
}
