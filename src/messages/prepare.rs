//! `Prepare` request: asks the server to parse and cache a CQL statement.

use bytes::{Buf, BufMut};

use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::primitives::{encoded_len_long_string, encoded_len_string, read_int, read_long_string, read_string, write_int, write_long_string, write_string};
use crate::version::VersionCapabilities;

const FLAG_WITH_KEYSPACE: i32 = 0x01;

/// `[long string] query`; on V5/DSE_V2, additionally a flags word and an
/// optional keyspace override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepare {
    /// CQL statement text to prepare.
    pub query: String,
    /// Keyspace the statement should be prepared against (V5/DSE_V2 only).
    pub keyspace: Option<String>,
}

impl Prepare {
    /// Decode a prepare request.
    pub fn read(buf: &mut impl Buf, caps: &VersionCapabilities, limits: &DecodeLimits) -> Result<Self> {
        let query = read_long_string(buf, limits)?;
        let keyspace = if caps.prepare_flags {
            let flags = read_int(buf)?;
            if flags & FLAG_WITH_KEYSPACE != 0 {
                Some(read_string(buf, limits)?)
            } else {
                None
            }
        } else {
            None
        };
        Ok(Prepare { query, keyspace })
    }

    /// Encode a prepare request, rejecting an empty keyspace override and a
    /// keyspace override on versions that lack the flags word.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        if let Some(keyspace) = &self.keyspace {
            if !caps.prepare_flags {
                return Err(ProtocolError::UnsupportedForVersion {
                    field: "prepare.keyspace",
                    version: caps.version,
                });
            }
            if keyspace.is_empty() {
                return Err(ProtocolError::precondition(
                    "prepare.keyspace",
                    "must be non-empty when present",
                ));
            }
        }

        write_long_string(buf, &self.query);
        if let Some(keyspace) = &self.keyspace {
            write_int(buf, FLAG_WITH_KEYSPACE);
            write_string(buf, keyspace);
        } else if caps.prepare_flags {
            write_int(buf, 0);
        }
        Ok(())
    }

    /// Byte length of the encoded body.
    pub fn encoded_len(&self, caps: &VersionCapabilities) -> Result<usize> {
        if self.keyspace.is_some() && !caps.prepare_flags {
            return Err(ProtocolError::UnsupportedForVersion {
                field: "prepare.keyspace",
                version: caps.version,
            });
        }
        let mut len = encoded_len_long_string(&self.query);
        if caps.prepare_flags {
            len += 4;
        }
        if let Some(keyspace) = &self.keyspace {
            len += encoded_len_string(keyspace);
        }
        Ok(len)
    }
}
