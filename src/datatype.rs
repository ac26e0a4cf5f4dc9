//! The data-type descriptor is an external collaborator: this
//! crate never interprets CQL types, it only carries an opaque descriptor
//! alongside each column so a caller-supplied codec can encode/decode it.
//!
//! [`DataTypeCodec`] is the seam. [`OpaqueDataType`] is the simplest
//! possible implementation — it treats a descriptor as a raw length-prefixed
//! blob — useful for tests and for callers that only need to round-trip
//! column metadata without interpreting it.

use bytes::{Buf, BufMut};

use crate::error::Result;
use crate::limits::DecodeLimits;
use crate::version::ProtocolVersion;

/// Encodes, decodes, and measures one CQL column data-type descriptor.
/// Parameterised by protocol version because the descriptor's own wire
/// shape (e.g. whether UDTs carry field names) varies across versions,
/// just like every other structure in this crate.
pub trait DataTypeCodec {
    /// The in-memory representation of a decoded descriptor.
    type Descriptor: Clone + std::fmt::Debug + PartialEq;

    /// Decode one descriptor.
    fn read(
        &self,
        buf: &mut dyn Buf,
        version: ProtocolVersion,
        limits: &DecodeLimits,
    ) -> Result<Self::Descriptor>;

    /// Encode one descriptor.
    fn write(
        &self,
        buf: &mut dyn BufMut,
        version: ProtocolVersion,
        value: &Self::Descriptor,
    ) -> Result<()>;

    /// Byte length of the encoded descriptor.
    fn encoded_len(&self, version: ProtocolVersion, value: &Self::Descriptor) -> usize;
}

/// A descriptor that is never interpreted, only carried: `[short] len`
/// followed by `len` raw bytes, matching the shape every real CQL type
/// descriptor starts with (a `[short]` type id, optionally followed by
/// type-specific data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueDataType(pub Vec<u8>);

/// The trivial [`DataTypeCodec`] used when a caller has no interest in
/// interpreting column types, only in round-tripping them.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueDataTypeCodec;

impl DataTypeCodec for OpaqueDataTypeCodec {
    type Descriptor = OpaqueDataType;

    fn read(
        &self,
        buf: &mut dyn Buf,
        _version: ProtocolVersion,
        limits: &DecodeLimits,
    ) -> Result<Self::Descriptor> {
        Ok(OpaqueDataType(crate::primitives::read_short_bytes(
            buf, limits,
        )?))
    }

    fn write(
        &self,
        buf: &mut dyn BufMut,
        _version: ProtocolVersion,
        value: &Self::Descriptor,
    ) -> Result<()> {
        crate::primitives::write_short_bytes(buf, &value.0);
        Ok(())
    }

    fn encoded_len(&self, _version: ProtocolVersion, value: &Self::Descriptor) -> usize {
        crate::primitives::encoded_len_short_bytes(&value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_codec_round_trips() {
        let codec = OpaqueDataTypeCodec;
        let value = OpaqueDataType(vec![0x00, 0x09]); // e.g. CQL "int" type id
        let mut buf = Vec::new();
        codec.write(&mut buf, ProtocolVersion::V4, &value).unwrap();
        assert_eq!(codec.encoded_len(ProtocolVersion::V4, &value), buf.len());
        let mut slice = &buf[..];
        let decoded = codec
            .read(&mut slice, ProtocolVersion::V4, &DecodeLimits::default())
            .unwrap();
        assert_eq!(decoded, value);
    }
}
