//! The query-options block shared by `Query` (after the query string) and
//! `Execute` (after the prepared id / result-metadata id).

use bytes::{Buf, BufMut};

use crate::continuous_paging::ContinuousPagingOptions;
use crate::enums::ConsistencyLevel;
use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::primitives::{
    encoded_len_bytes, encoded_len_string, read_bytes, read_int, read_long, read_short,
    read_string, write_bytes, write_int, write_long, write_short, write_string, Value,
};
use crate::version::VersionCapabilities;

const FLAG_VALUES: u32 = 0x0001;
const FLAG_SKIP_METADATA: u32 = 0x0002;
const FLAG_PAGE_SIZE: u32 = 0x0004;
const FLAG_PAGING_STATE: u32 = 0x0008;
const FLAG_SERIAL_CONSISTENCY: u32 = 0x0010;
const FLAG_DEFAULT_TIMESTAMP: u32 = 0x0020;
const FLAG_NAMED_VALUES: u32 = 0x0040;
const FLAG_KEYSPACE: u32 = 0x0080;
const FLAG_PAGE_SIZE_IN_BYTES: u32 = 0x0100;
const FLAG_CONTINUOUS_PAGING: u32 = 0x0200;
const FLAG_NOW_IN_SECONDS: u32 = 0x0400;

/// Positional values, named values, or neither. An enum rather than two
/// optional fields, so "both supplied" is unrepresentable instead of a
/// runtime invariant to check (exactly one of positional/named may be
/// supplied, and named requires V3+).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValues {
    /// No bound values.
    None,
    /// `[short] n` then `n` `[value]`s.
    Positional(Vec<Value>),
    /// `[short] n` then `n` `[string] name` + `[value]` pairs. V3+ only.
    Named(Vec<(String, Value)>),
}

/// The query-options block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Consistency level for the statement.
    pub consistency: ConsistencyLevel,
    /// Bound values.
    pub values: QueryValues,
    /// Whether the server should omit result-set metadata on the response.
    pub skip_metadata: bool,
    /// Requested page size, in rows (or bytes, if `page_size_in_bytes`).
    pub page_size: Option<i32>,
    /// Whether `page_size` counts bytes instead of rows (DSE_V1 only).
    pub page_size_in_bytes: bool,
    /// Opaque continuation token from a previous page.
    pub paging_state: Option<Vec<u8>>,
    /// Consistency level for the serial phase of a conditional update.
    pub serial_consistency: Option<ConsistencyLevel>,
    /// Client-supplied write timestamp, in microseconds.
    pub default_timestamp: Option<i64>,
    /// Keyspace the statement should run against (V5/DSE_V2 only).
    pub keyspace: Option<String>,
    /// Server-side "now", in seconds (V5/DSE_V2 only).
    pub now_in_seconds: Option<i32>,
    /// DSE continuous-paging request (DSE only).
    pub continuous_paging: Option<ContinuousPagingOptions>,
}

impl QueryOptions {
    fn flags(&self, caps: &VersionCapabilities) -> Result<u32> {
        let mut flags = 0u32;
        match &self.values {
            QueryValues::None => {}
            QueryValues::Positional(_) => flags |= FLAG_VALUES,
            QueryValues::Named(_) => {
                if !caps.named_values {
                    return Err(ProtocolError::UnsupportedForVersion {
                        field: "query_options.named_values",
                        version: caps.version,
                    });
                }
                flags |= FLAG_NAMED_VALUES;
            }
        }
        if self.skip_metadata {
            flags |= FLAG_SKIP_METADATA;
        }
        if self.page_size.is_some() {
            flags |= FLAG_PAGE_SIZE;
        }
        if self.paging_state.is_some() {
            flags |= FLAG_PAGING_STATE;
        }
        if self.serial_consistency.is_some() {
            flags |= FLAG_SERIAL_CONSISTENCY;
        }
        if self.default_timestamp.is_some() {
            flags |= FLAG_DEFAULT_TIMESTAMP;
        }
        if self.keyspace.is_some() {
            if !caps.keyspace_option {
                return Err(ProtocolError::UnsupportedForVersion {
                    field: "query_options.keyspace",
                    version: caps.version,
                });
            }
            flags |= FLAG_KEYSPACE;
        }
        if self.now_in_seconds.is_some() {
            if !caps.now_in_seconds_option {
                return Err(ProtocolError::UnsupportedForVersion {
                    field: "query_options.now_in_seconds",
                    version: caps.version,
                });
            }
            flags |= FLAG_NOW_IN_SECONDS;
        }
        if self.continuous_paging.is_some() {
            if !caps.continuous_paging {
                return Err(ProtocolError::UnsupportedForVersion {
                    field: "query_options.continuous_paging",
                    version: caps.version,
                });
            }
            flags |= FLAG_CONTINUOUS_PAGING;
        }
        if self.page_size_in_bytes {
            if caps.version != crate::version::ProtocolVersion::DseV1 {
                return Err(ProtocolError::UnsupportedForVersion {
                    field: "query_options.page_size_in_bytes",
                    version: caps.version,
                });
            }
            flags |= FLAG_PAGE_SIZE_IN_BYTES;
        }
        Ok(flags)
    }

    /// Encode into `buf` for `caps`'s version.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        let flags = self.flags(caps)?;

        write_short(buf, self.consistency.to_wire());
        if caps.query_flags_are_int {
            write_int(buf, flags as i32);
        } else {
            crate::primitives::write_byte(buf, flags as u8);
        }

        match &self.values {
            QueryValues::None => {}
            QueryValues::Positional(values) => {
                write_short(buf, values.len() as u16);
                for value in values {
                    value.write(buf, caps)?;
                }
            }
            QueryValues::Named(values) => {
                write_short(buf, values.len() as u16);
                for (name, value) in values {
                    write_string(buf, name);
                    value.write(buf, caps)?;
                }
            }
        }
        if let Some(page_size) = self.page_size {
            write_int(buf, page_size);
        }
        if let Some(paging_state) = &self.paging_state {
            write_bytes(buf, Some(paging_state));
        }
        if let Some(serial_consistency) = self.serial_consistency {
            write_short(buf, serial_consistency.to_wire());
        }
        if let Some(default_timestamp) = self.default_timestamp {
            write_long(buf, default_timestamp);
        }
        if let Some(keyspace) = &self.keyspace {
            write_string(buf, keyspace);
        }
        if let Some(now_in_seconds) = self.now_in_seconds {
            write_int(buf, now_in_seconds);
        }
        if let Some(continuous_paging) = &self.continuous_paging {
            continuous_paging.write(buf, caps)?;
        }
        Ok(())
    }

    /// Decode from `buf` for `version`.
    pub fn read(
        buf: &mut impl Buf,
        version: crate::version::ProtocolVersion,
        limits: &DecodeLimits,
    ) -> Result<Self> {
        let caps = version.capabilities();
        let consistency = ConsistencyLevel::from_wire(read_short(buf)?)?;
        let flags = if caps.query_flags_are_int {
            read_int(buf)? as u32
        } else {
            u32::from(crate::primitives::read_byte(buf)?)
        };

        let values = if flags & FLAG_VALUES != 0 {
            let count = read_short(buf)?;
            let values = (0..count)
                .map(|_| Value::read(buf, limits))
                .collect::<Result<Vec<_>>>()?;
            QueryValues::Positional(values)
        } else if flags & FLAG_NAMED_VALUES != 0 {
            let count = read_short(buf)?;
            let values = (0..count)
                .map(|_| {
                    let name = read_string(buf, limits)?;
                    let value = Value::read(buf, limits)?;
                    Ok((name, value))
                })
                .collect::<Result<Vec<_>>>()?;
            QueryValues::Named(values)
        } else {
            QueryValues::None
        };

        let skip_metadata = flags & FLAG_SKIP_METADATA != 0;
        let page_size = if flags & FLAG_PAGE_SIZE != 0 {
            Some(read_int(buf)?)
        } else {
            None
        };
        let paging_state = if flags & FLAG_PAGING_STATE != 0 {
            read_bytes(buf, limits)?
        } else {
            None
        };
        let serial_consistency = if flags & FLAG_SERIAL_CONSISTENCY != 0 {
            Some(ConsistencyLevel::from_wire(read_short(buf)?)?)
        } else {
            None
        };
        let default_timestamp = if flags & FLAG_DEFAULT_TIMESTAMP != 0 {
            Some(read_long(buf)?)
        } else {
            None
        };
        let keyspace = if flags & FLAG_KEYSPACE != 0 {
            Some(read_string(buf, limits)?)
        } else {
            None
        };
        let now_in_seconds = if flags & FLAG_NOW_IN_SECONDS != 0 {
            Some(read_int(buf)?)
        } else {
            None
        };
        let continuous_paging = if flags & FLAG_CONTINUOUS_PAGING != 0 {
            Some(ContinuousPagingOptions::read(buf, version)?)
        } else {
            None
        };

        Ok(QueryOptions {
            consistency,
            values,
            skip_metadata,
            page_size,
            page_size_in_bytes: flags & FLAG_PAGE_SIZE_IN_BYTES != 0,
            paging_state,
            serial_consistency,
            default_timestamp,
            keyspace,
            now_in_seconds,
            continuous_paging,
        })
    }

    /// Byte length of the encoded block for `caps`'s version.
    pub fn encoded_len(&self, caps: &VersionCapabilities) -> Result<usize> {
        // Validate up front so `encoded_length` and `encode` agree on
        // failure.
        self.flags(caps)?;

        let mut len = 2 + if caps.query_flags_are_int { 4 } else { 1 };
        len += match &self.values {
            QueryValues::None => 0,
            QueryValues::Positional(values) => {
                2 + values.iter().map(Value::encoded_len).sum::<usize>()
            }
            QueryValues::Named(values) => {
                2 + values
                    .iter()
                    .map(|(name, value)| encoded_len_string(name) + value.encoded_len())
                    .sum::<usize>()
            }
        };
        if self.page_size.is_some() {
            len += 4;
        }
        if let Some(paging_state) = &self.paging_state {
            len += encoded_len_bytes(Some(paging_state));
        }
        if self.serial_consistency.is_some() {
            len += 2;
        }
        if self.default_timestamp.is_some() {
            len += 8;
        }
        if let Some(keyspace) = &self.keyspace {
            len += encoded_len_string(keyspace);
        }
        if self.now_in_seconds.is_some() {
            len += 4;
        }
        if self.continuous_paging.is_some() {
            len += ContinuousPagingOptions::encoded_len(caps.version);
        }
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ProtocolVersion;

    fn base_options() -> QueryOptions {
        QueryOptions {
            consistency: ConsistencyLevel::One,
            values: QueryValues::None,
            skip_metadata: false,
            page_size: None,
            page_size_in_bytes: false,
            paging_state: None,
            serial_consistency: None,
            default_timestamp: None,
            keyspace: None,
            now_in_seconds: None,
            continuous_paging: None,
        }
    }

    #[test]
    fn keyspace_and_now_in_seconds_encode_after_values_tail() {
        let caps = ProtocolVersion::V5.capabilities();
        let options = QueryOptions {
            keyspace: Some("ks1".to_string()),
            now_in_seconds: Some(234),
            ..base_options()
        };
        let mut buf = Vec::new();
        options.write(&mut buf, &caps).unwrap();
        let tail = &buf[buf.len() - 9..];
        assert_eq!(
            tail,
            &[0x00, 0x03, 0x6B, 0x73, 0x31, 0x00, 0x00, 0x00, 0xEA]
        );
    }

    #[test]
    fn keyspace_rejected_on_v4() {
        let caps = ProtocolVersion::V4.capabilities();
        let options = QueryOptions {
            keyspace: Some("ks1".to_string()),
            ..base_options()
        };
        let mut buf = Vec::new();
        let err = options.write(&mut buf, &caps).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedForVersion { .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn named_values_require_v3() {
        let caps = ProtocolVersion::V2.capabilities();
        let options = QueryOptions {
            values: QueryValues::Named(vec![("a".to_string(), Value::Null)]),
            ..base_options()
        };
        let mut buf = Vec::new();
        assert!(options.write(&mut buf, &caps).is_err());
    }

    #[test]
    fn round_trips_with_positional_values_on_v4() {
        let caps = ProtocolVersion::V4.capabilities();
        let limits = DecodeLimits::default();
        let options = QueryOptions {
            values: QueryValues::Positional(vec![Value::Set(vec![9, 9])]),
            page_size: Some(100),
            paging_state: Some(vec![1, 2, 3]),
            default_timestamp: Some(42),
            ..base_options()
        };
        let mut buf = Vec::new();
        options.write(&mut buf, &caps).unwrap();
        assert_eq!(options.encoded_len(&caps).unwrap(), buf.len());
        let mut slice = &buf[..];
        let decoded = QueryOptions::read(&mut slice, caps.version, &limits).unwrap();
        assert_eq!(decoded, options);
    }
}
