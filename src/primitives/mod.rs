//! The primitive wire-format layer: fixed-width integers, length-prefixed
//! strings/blobs, homogeneous collections, UUIDs, and `[inet]`.
//!
//! Every primitive exposes three functions: `read_*` (decode from a
//! `bytes::Buf`), `write_*` (encode into a `bytes::BufMut`), and
//! `encoded_len_*` (byte count `write_*` would produce, so callers can
//! implement `encoded_length` without re-running `write_*` into a scratch
//! buffer). All multi-byte integers are big-endian, matching `bytes`'
//! default `get_*`/`put_*` methods.

mod inet;
mod value;

pub use inet::{encoded_len_inet, read_inet, write_inet};
pub use value::Value;

use std::collections::HashMap;

use bytes::{Buf, BufMut};
use log::warn;

use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;

/// Fail with [`ProtocolError::ShortRead`] unless at least `needed` bytes
/// remain in `buf`.
fn require(buf: &impl Buf, needed: usize) -> Result<()> {
    let available = buf.remaining();
    if available < needed {
        warn!("short read: needed {} more byte(s), {available} available", needed - available);
        return Err(ProtocolError::ShortRead {
            needed: needed - available,
            available,
        });
    }
    Ok(())
}

fn check_len(field: &'static str, length: i64, limit: u32) -> Result<()> {
    if length < 0 || length as i64 > i64::from(limit) {
        warn!("{field} declared length {length} exceeds limit {limit}");
        return Err(ProtocolError::OverflowedLength {
            field,
            length,
            limit: i64::from(limit),
        });
    }
    Ok(())
}

/// `[byte]`: one unsigned byte.
pub fn read_byte(buf: &mut impl Buf) -> Result<u8> {
    require(buf, 1)?;
    Ok(buf.get_u8())
}

/// Encode a `[byte]`.
pub fn write_byte(buf: &mut impl BufMut, value: u8) {
    buf.put_u8(value);
}

/// `[short]`: a big-endian `u16`.
pub fn read_short(buf: &mut impl Buf) -> Result<u16> {
    require(buf, 2)?;
    Ok(buf.get_u16())
}

/// Encode a `[short]`.
pub fn write_short(buf: &mut impl BufMut, value: u16) {
    buf.put_u16(value);
}

/// `[int]`: a big-endian signed 32-bit integer.
pub fn read_int(buf: &mut impl Buf) -> Result<i32> {
    require(buf, 4)?;
    Ok(buf.get_i32())
}

/// Encode an `[int]`.
pub fn write_int(buf: &mut impl BufMut, value: i32) {
    buf.put_i32(value);
}

/// `[long]`: a big-endian signed 64-bit integer.
pub fn read_long(buf: &mut impl Buf) -> Result<i64> {
    require(buf, 8)?;
    Ok(buf.get_i64())
}

/// Encode a `[long]`.
pub fn write_long(buf: &mut impl BufMut, value: i64) {
    buf.put_i64(value);
}

/// `[string]`: `[short] len` then `len` UTF-8 bytes.
pub fn read_string(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<String> {
    let len = read_short(buf)? as usize;
    check_len("string.len", len as i64, limits.max_blob_len)?;
    require(buf, len)?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|e| ProtocolError::precondition("string", e))
}

/// Encode a `[string]`.
pub fn write_string(buf: &mut impl BufMut, value: &str) {
    write_short(buf, value.len() as u16);
    buf.put_slice(value.as_bytes());
}

/// Byte length of an encoded `[string]`.
pub fn encoded_len_string(value: &str) -> usize {
    2 + value.len()
}

/// `[long string]`: `[int] len` then `len` UTF-8 bytes.
pub fn read_long_string(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<String> {
    let len = read_int(buf)?;
    check_len("long_string.len", i64::from(len), limits.max_blob_len)?;
    let len = len as usize;
    require(buf, len)?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|e| ProtocolError::precondition("long_string", e))
}

/// Encode a `[long string]`.
pub fn write_long_string(buf: &mut impl BufMut, value: &str) {
    write_int(buf, value.len() as i32);
    buf.put_slice(value.as_bytes());
}

/// Byte length of an encoded `[long string]`.
pub fn encoded_len_long_string(value: &str) -> usize {
    4 + value.len()
}

/// `[bytes]`: `[int] len`; `len == -1` means null, otherwise `len` raw
/// bytes (`len == 0` is empty, not null).
pub fn read_bytes(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Option<Vec<u8>>> {
    let len = read_int(buf)?;
    if len == -1 {
        return Ok(None);
    }
    check_len("bytes.len", i64::from(len), limits.max_blob_len)?;
    let len = len as usize;
    require(buf, len)?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(Some(bytes))
}

/// Encode a `[bytes]`. `None` re-encodes to the null sentinel
/// `0xFFFFFFFF`, preserving the null/empty/present distinction on re-encode.
pub fn write_bytes(buf: &mut impl BufMut, value: Option<&[u8]>) {
    match value {
        None => write_int(buf, -1),
        Some(bytes) => {
            write_int(buf, bytes.len() as i32);
            buf.put_slice(bytes);
        }
    }
}

/// Byte length of an encoded `[bytes]`.
pub fn encoded_len_bytes(value: Option<&[u8]>) -> usize {
    4 + value.map_or(0, <[u8]>::len)
}

/// `[short bytes]`: `[short] len` then `len` raw bytes. Never null.
pub fn read_short_bytes(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Vec<u8>> {
    let len = read_short(buf)? as usize;
    check_len("short_bytes.len", len as i64, limits.max_blob_len)?;
    require(buf, len)?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(bytes)
}

/// Encode a `[short bytes]`.
pub fn write_short_bytes(buf: &mut impl BufMut, value: &[u8]) {
    write_short(buf, value.len() as u16);
    buf.put_slice(value);
}

/// Byte length of an encoded `[short bytes]`.
pub fn encoded_len_short_bytes(value: &[u8]) -> usize {
    2 + value.len()
}

/// `[string list]`: `[short] n` then `n` `[string]`s.
pub fn read_string_list(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Vec<String>> {
    let n = read_short(buf)?;
    check_len("string_list.count", i64::from(n), limits.max_collection_len)?;
    (0..n).map(|_| read_string(buf, limits)).collect()
}

/// Encode a `[string list]`.
pub fn write_string_list(buf: &mut impl BufMut, values: &[String]) {
    write_short(buf, values.len() as u16);
    for value in values {
        write_string(buf, value);
    }
}

/// Byte length of an encoded `[string list]`.
pub fn encoded_len_string_list(values: &[String]) -> usize {
    2 + values.iter().map(|v| encoded_len_string(v)).sum::<usize>()
}

/// `[string map]`: `[short] n` then `n` `[string]`/`[string]` pairs.
///
/// Key order is not observable at the protocol level: this
/// decodes into a `HashMap`, whose iteration order callers must not rely on.
pub fn read_string_map(
    buf: &mut impl Buf,
    limits: &DecodeLimits,
) -> Result<HashMap<String, String>> {
    let n = read_short(buf)?;
    check_len("string_map.count", i64::from(n), limits.max_collection_len)?;
    let mut map = HashMap::with_capacity(n as usize);
    for _ in 0..n {
        let key = read_string(buf, limits)?;
        let value = read_string(buf, limits)?;
        map.insert(key, value);
    }
    Ok(map)
}

/// Encode a `[string map]`.
pub fn write_string_map(buf: &mut impl BufMut, values: &HashMap<String, String>) {
    write_short(buf, values.len() as u16);
    for (key, value) in values {
        write_string(buf, key);
        write_string(buf, value);
    }
}

/// Byte length of an encoded `[string map]`.
pub fn encoded_len_string_map(values: &HashMap<String, String>) -> usize {
    2 + values
        .iter()
        .map(|(k, v)| encoded_len_string(k) + encoded_len_string(v))
        .sum::<usize>()
}

/// `[string multimap]`: `[short] n` then `n` `[string]`/`[string list]`
/// pairs.
pub fn read_string_multimap(
    buf: &mut impl Buf,
    limits: &DecodeLimits,
) -> Result<HashMap<String, Vec<String>>> {
    let n = read_short(buf)?;
    check_len(
        "string_multimap.count",
        i64::from(n),
        limits.max_collection_len,
    )?;
    let mut map = HashMap::with_capacity(n as usize);
    for _ in 0..n {
        let key = read_string(buf, limits)?;
        let value = read_string_list(buf, limits)?;
        map.insert(key, value);
    }
    Ok(map)
}

/// Encode a `[string multimap]`.
pub fn write_string_multimap(buf: &mut impl BufMut, values: &HashMap<String, Vec<String>>) {
    write_short(buf, values.len() as u16);
    for (key, value) in values {
        write_string(buf, key);
        write_string_list(buf, value);
    }
}

/// Byte length of an encoded `[string multimap]`.
pub fn encoded_len_string_multimap(values: &HashMap<String, Vec<String>>) -> usize {
    2 + values
        .iter()
        .map(|(k, v)| encoded_len_string(k) + encoded_len_string_list(v))
        .sum::<usize>()
}

/// `[uuid]`: 16 raw bytes.
pub fn read_uuid(buf: &mut impl Buf) -> Result<uuid::Uuid> {
    require(buf, 16)?;
    let mut bytes = [0u8; 16];
    buf.copy_to_slice(&mut bytes);
    Ok(uuid::Uuid::from_bytes(bytes))
}

/// Encode a `[uuid]`.
pub fn write_uuid(buf: &mut impl BufMut, value: uuid::Uuid) {
    buf.put_slice(value.as_bytes());
}

/// Byte length of an encoded `[uuid]`: always 16.
pub fn encoded_len_uuid() -> usize {
    16
}

/// `[reason map]`: `[int] n` then `n` `(inet-address, [short] code)` pairs.
/// The address uses only the address-length-prefixed form; no port.
pub fn read_reason_map(
    buf: &mut impl Buf,
    limits: &DecodeLimits,
) -> Result<Vec<(std::net::IpAddr, u16)>> {
    let n = read_int(buf)?;
    check_len("reason_map.count", i64::from(n), limits.max_collection_len)?;
    (0..n)
        .map(|_| {
            let addr = inet::read_addr(buf)?;
            let code = read_short(buf)?;
            Ok((addr, code))
        })
        .collect()
}

/// Encode a `[reason map]`.
pub fn write_reason_map(buf: &mut impl BufMut, values: &[(std::net::IpAddr, u16)]) {
    write_int(buf, values.len() as i32);
    for (addr, code) in values {
        inet::write_addr(buf, *addr);
        write_short(buf, *code);
    }
}

/// Byte length of an encoded `[reason map]`.
pub fn encoded_len_reason_map(values: &[(std::net::IpAddr, u16)]) -> usize {
    4 + values
        .iter()
        .map(|(addr, _)| inet::encoded_len_addr(*addr) + 2)
        .sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trips() {
        let mut buf = Vec::new();
        write_string(&mut buf, "hello");
        assert_eq!(encoded_len_string("hello"), buf.len());
        let mut slice = &buf[..];
        let decoded = read_string(&mut slice, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, "hello");
    }

    #[test]
    fn bytes_null_vs_empty_vs_present() {
        let limits = DecodeLimits::default();

        let mut null_buf = Vec::new();
        write_bytes(&mut null_buf, None);
        assert_eq!(null_buf, vec![0xFF, 0xFF, 0xFF, 0xFF]);
        let mut slice = &null_buf[..];
        assert_eq!(read_bytes(&mut slice, &limits).unwrap(), None);

        let mut empty_buf = Vec::new();
        write_bytes(&mut empty_buf, Some(&[]));
        assert_eq!(empty_buf, vec![0x00, 0x00, 0x00, 0x00]);
        let mut slice = &empty_buf[..];
        assert_eq!(read_bytes(&mut slice, &limits).unwrap(), Some(Vec::new()));

        let mut present_buf = Vec::new();
        write_bytes(&mut present_buf, Some(&[1, 2, 3, 4]));
        let mut slice = &present_buf[..];
        assert_eq!(
            read_bytes(&mut slice, &limits).unwrap(),
            Some(vec![1, 2, 3, 4])
        );
    }

    #[test]
    fn short_read_reports_needed_bytes() {
        let mut slice: &[u8] = &[0x00];
        let err = read_short(&mut slice).unwrap_err();
        match err {
            ProtocolError::ShortRead { needed, available } => {
                assert_eq!(needed, 1);
                assert_eq!(available, 1);
            }
            other => panic!("expected ShortRead, got {other:?}"),
        }
    }

    #[test]
    fn string_map_round_trips_regardless_of_key_order() {
        let mut values = HashMap::new();
        values.insert("CQL_VERSION".to_string(), "3.0.0".to_string());
        values.insert("COMPRESSION".to_string(), "snappy".to_string());

        let mut buf = Vec::new();
        write_string_map(&mut buf, &values);
        let mut slice = &buf[..];
        let decoded = read_string_map(&mut slice, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, values);
    }
}
