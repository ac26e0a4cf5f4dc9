//! `[value]`: the tri-state cell used by positional/named query values and
//! batch-child values.
//!
//! `[int] len` then, depending on `len`: `-1` is null, `-2` is "not set"
//! (v4+ only — a bound parameter the server should leave untouched), any
//! other non-negative value is `len` raw bytes.

use bytes::{Buf, BufMut};

use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::version::VersionCapabilities;

/// One query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Present value.
    Set(Vec<u8>),
    /// Explicit null (`len == -1`).
    Null,
    /// Explicit "not set" (`len == -2`, v4+ only).
    NotSet,
}

impl Value {
    /// Read one `[value]`.
    pub fn read(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Self> {
        let len = crate::primitives::read_int(buf)?;
        match len {
            -1 => Ok(Value::Null),
            -2 => Ok(Value::NotSet),
            len if len >= 0 => {
                let len = len as usize;
                if len as i64 > i64::from(limits.max_blob_len) {
                    return Err(ProtocolError::OverflowedLength {
                        field: "value.len",
                        length: len as i64,
                        limit: i64::from(limits.max_blob_len),
                    });
                }
                if buf.remaining() < len {
                    return Err(ProtocolError::ShortRead {
                        needed: len - buf.remaining(),
                        available: buf.remaining(),
                    });
                }
                let mut bytes = vec![0u8; len];
                buf.copy_to_slice(&mut bytes);
                Ok(Value::Set(bytes))
            }
            other => Err(ProtocolError::precondition(
                "value.len",
                format!("negative length {other} is neither -1 (null) nor -2 (not set)"),
            )),
        }
    }

    /// Write one `[value]`, validating `NotSet` against `caps` first.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        match self {
            Value::Set(bytes) => {
                crate::primitives::write_int(buf, bytes.len() as i32);
                buf.put_slice(bytes);
            }
            Value::Null => crate::primitives::write_int(buf, -1),
            Value::NotSet => {
                if !caps.not_set_values {
                    return Err(ProtocolError::UnsupportedForVersion {
                        field: "value.not_set",
                        version: caps.version,
                    });
                }
                crate::primitives::write_int(buf, -2);
            }
        }
        Ok(())
    }

    /// Byte length of the encoded value.
    pub fn encoded_len(&self) -> usize {
        4 + match self {
            Value::Set(bytes) => bytes.len(),
            Value::Null | Value::NotSet => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::version::ProtocolVersion;

    #[test]
    fn not_set_rejected_pre_v4() {
        let caps = ProtocolVersion::V3.capabilities();
        let mut buf = Vec::new();
        let err = Value::NotSet.write(&mut buf, &caps).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnsupportedForVersion { field: "value.not_set", .. }
        ));
    }

    #[test]
    fn not_set_allowed_on_v4() {
        let caps = ProtocolVersion::V4.capabilities();
        let mut buf = Vec::new();
        Value::NotSet.write(&mut buf, &caps).unwrap();
        assert_eq!(buf, (-2i32).to_be_bytes().to_vec());
    }

    #[test]
    fn round_trips_all_three_states() {
        let limits = DecodeLimits::default();
        let caps = ProtocolVersion::V4.capabilities();
        for value in [
            Value::Set(vec![1, 2, 3, 4]),
            Value::Null,
            Value::NotSet,
        ] {
            let mut buf = Vec::new();
            value.write(&mut buf, &caps).unwrap();
            assert_eq!(value.encoded_len(), buf.len());
            let mut slice = &buf[..];
            assert_eq!(Value::read(&mut slice, &limits).unwrap(), value);
        }
    }

    proptest! {
        #[test]
        fn arbitrary_set_values_round_trip_and_agree_on_length(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let limits = DecodeLimits::default();
            let caps = ProtocolVersion::V4.capabilities();
            let value = Value::Set(bytes);
            let mut buf = Vec::new();
            value.write(&mut buf, &caps).unwrap();
            prop_assert_eq!(value.encoded_len(), buf.len());
            let mut slice = &buf[..];
            prop_assert_eq!(Value::read(&mut slice, &limits).unwrap(), value);
        }
    }
}
