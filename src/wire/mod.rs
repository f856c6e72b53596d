//! # Wire Primitives
//!
//! Var-ints, length-prefixed strings, and packed word arrays.
//!
//! Every multi-byte structure in this crate is built from these three
//! primitives, reading from and writing to [`bytes`] buffers.
//!
//! ## Wire Format
//! ```text
//! var-u32:  1-5 bytes, 7 value bits per byte, low group first, MSB = continue
//! string:   var-u32 byte length, then UTF-8 bytes
//! words:    count * 8 bytes, each u64 big-endian
//! ```
//!
//! ## Security
//! - Every read checks `remaining()` before touching the buffer, so
//!   truncated input surfaces as [`ProtocolError::UnexpectedEof`] rather
//!   than a panic.
//! - Length prefixes are validated against caller-supplied limits before
//!   any allocation.

use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut};

/// Read a var-int encoded u32.
pub fn read_var_u32(buf: &mut impl Buf) -> Result<u32> {
    let mut value = 0u32;
    for shift in (0..35).step_by(7) {
        if !buf.has_remaining() {
            return Err(ProtocolError::UnexpectedEof);
        }
        let byte = buf.get_u8();
        value |= u32::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(ProtocolError::VarIntTooLong)
}

/// Write a var-int encoded u32.
pub fn write_var_u32(buf: &mut impl BufMut, mut value: u32) {
    loop {
        if value & !0x7F == 0 {
            buf.put_u8(value as u8);
            return;
        }
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
}

/// Encoded size of a var-int, in bytes.
pub fn var_u32_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}

/// Read a var-int length-prefixed UTF-8 string, bounded by `max_len` bytes.
pub fn read_string(buf: &mut impl Buf, max_len: usize) -> Result<String> {
    let len = read_var_u32(buf)? as usize;
    if len > max_len {
        return Err(ProtocolError::OversizedString(len));
    }
    if buf.remaining() < len {
        return Err(ProtocolError::UnexpectedEof);
    }
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|e| ProtocolError::InvalidName(e.to_string()))
}

/// Write a var-int length-prefixed UTF-8 string.
pub fn write_string(buf: &mut impl BufMut, text: &str) {
    write_var_u32(buf, text.len() as u32);
    buf.put_slice(text.as_bytes());
}

/// Read `count` big-endian u64 words.
pub fn read_words(buf: &mut impl Buf, count: usize) -> Result<Vec<u64>> {
    if buf.remaining() < count * 8 {
        return Err(ProtocolError::UnexpectedEof);
    }
    let mut words = Vec::with_capacity(count);
    for _ in 0..count {
        words.push(buf.get_u64());
    }
    Ok(words)
}

/// Write words as big-endian u64s.
pub fn write_words(buf: &mut impl BufMut, words: &[u64]) {
    for &word in words {
        buf.put_u64(word);
    }
}
