//! One child statement of a `Batch` request.

use bytes::{Buf, BufMut};

use crate::error::Result;
use crate::limits::DecodeLimits;
use crate::primitives::{
    encoded_len_long_string, encoded_len_short_bytes, read_byte, read_long_string,
    read_short, read_short_bytes, write_byte, write_long_string, write_short, write_short_bytes,
    Value,
};
use crate::version::VersionCapabilities;

/// The statement a batch child names: either an inline query string or a
/// previously prepared statement id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchChildKind {
    /// `[long string]` CQL query text.
    QueryString(String),
    /// `[short bytes]` prepared-statement id. Its length must fit in a
    /// `u16` by construction (`[short bytes]` is always `u16`-prefixed).
    PreparedId(Vec<u8>),
}

/// `[byte] kind`, then either `[long string]` or `[short bytes]`, then
/// `[short] m` values. Batch values are always positional — "named" batch
/// values are not supported by the wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchChild {
    /// Query string or prepared id.
    pub kind: BatchChildKind,
    /// Positional bound values.
    pub values: Vec<Value>,
}

impl BatchChild {
    /// Decode one batch child.
    pub fn read(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Self> {
        let kind_byte = read_byte(buf)?;
        let kind = match kind_byte {
            0 => BatchChildKind::QueryString(read_long_string(buf, limits)?),
            1 => BatchChildKind::PreparedId(read_short_bytes(buf, limits)?),
            other => {
                return Err(crate::error::ProtocolError::precondition(
                    "batch_child.kind",
                    format!("expected 0 (query) or 1 (prepared), got {other}"),
                ))
            }
        };
        let count = read_short(buf)?;
        let values = (0..count)
            .map(|_| Value::read(buf, limits))
            .collect::<Result<Vec<_>>>()?;
        Ok(BatchChild { kind, values })
    }

    /// Encode one batch child.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        match &self.kind {
            BatchChildKind::QueryString(query) => {
                write_byte(buf, 0);
                write_long_string(buf, query);
            }
            BatchChildKind::PreparedId(id) => {
                write_byte(buf, 1);
                write_short_bytes(buf, id);
            }
        }
        write_short(buf, self.values.len() as u16);
        for value in &self.values {
            value.write(buf, caps)?;
        }
        Ok(())
    }

    /// Byte length of the encoded child.
    pub fn encoded_len(&self) -> usize {
        let kind_len = match &self.kind {
            BatchChildKind::QueryString(query) => 1 + encoded_len_long_string(query),
            BatchChildKind::PreparedId(id) => 1 + encoded_len_short_bytes(id),
        };
        kind_len + 2 + self.values.iter().map(Value::encoded_len).sum::<usize>()
    }
}
