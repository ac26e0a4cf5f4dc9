//! `Batch` request: executes several statements (queries and/or prepared
//! statements) as one unit.

use bytes::{Buf, BufMut};

use crate::batch::BatchChild;
use crate::continuous_paging::ContinuousPagingOptions;
use crate::enums::{BatchType, ConsistencyLevel};
use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::primitives::{read_byte, read_int, read_short, read_string, write_byte, write_int, write_short, write_string};
use crate::version::{ProtocolVersion, VersionCapabilities};

const FLAG_SERIAL_CONSISTENCY: i32 = 0x10;
const FLAG_DEFAULT_TIMESTAMP: i32 = 0x20;
const FLAG_KEYSPACE: i32 = 0x80;
const FLAG_NOW_IN_SECONDS: i32 = 0x100;
const FLAG_CONTINUOUS_PAGING: i32 = 0x200;

/// `[byte] type`, `[short] n`, `n` batch children, `[short] consistency`,
/// then (V3+) a flags word and the flag-conditional fields it gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchMessage {
    /// Logged, unlogged, or counter.
    pub batch_type: BatchType,
    /// Statements to run together. Must be non-empty on encode.
    pub children: Vec<BatchChild>,
    /// Consistency level for the batch as a whole.
    pub consistency: ConsistencyLevel,
    /// Consistency level for the serial phase, if any statement is
    /// conditional.
    pub serial_consistency: Option<ConsistencyLevel>,
    /// Client-supplied write timestamp, in microseconds.
    pub default_timestamp: Option<i64>,
    /// Keyspace override (V5/DSE_V2 only).
    pub keyspace: Option<String>,
    /// Server-side "now", in seconds (V5/DSE_V2 only).
    pub now_in_seconds: Option<i32>,
    /// DSE continuous-paging request (DSE only).
    pub continuous_paging: Option<ContinuousPagingOptions>,
}

impl BatchMessage {
    fn flags(&self, caps: &VersionCapabilities) -> Result<i32> {
        let mut flags = 0;
        if self.serial_consistency.is_some() {
            flags |= FLAG_SERIAL_CONSISTENCY;
        }
        if self.default_timestamp.is_some() {
            flags |= FLAG_DEFAULT_TIMESTAMP;
        }
        if self.keyspace.is_some() {
            if !caps.keyspace_option {
                return Err(ProtocolError::UnsupportedForVersion {
                    field: "batch.keyspace",
                    version: caps.version,
                });
            }
            flags |= FLAG_KEYSPACE;
        }
        if self.now_in_seconds.is_some() {
            if !caps.now_in_seconds_option {
                return Err(ProtocolError::UnsupportedForVersion {
                    field: "batch.now_in_seconds",
                    version: caps.version,
                });
            }
            flags |= FLAG_NOW_IN_SECONDS;
        }
        if self.continuous_paging.is_some() {
            if !caps.continuous_paging {
                return Err(ProtocolError::UnsupportedForVersion {
                    field: "batch.continuous_paging",
                    version: caps.version,
                });
            }
            flags |= FLAG_CONTINUOUS_PAGING;
        }
        Ok(flags)
    }

    /// Decode a batch request.
    pub fn read(buf: &mut impl Buf, version: ProtocolVersion, limits: &DecodeLimits) -> Result<Self> {
        let caps = version.capabilities();
        let batch_type = BatchType::from_wire(read_byte(buf)?)?;
        let count = read_short(buf)?;
        let children = (0..count)
            .map(|_| BatchChild::read(buf, limits))
            .collect::<Result<Vec<_>>>()?;
        let consistency = ConsistencyLevel::from_wire(read_short(buf)?)?;

        if matches!(version, ProtocolVersion::V2) {
            return Ok(BatchMessage {
                batch_type,
                children,
                consistency,
                serial_consistency: None,
                default_timestamp: None,
                keyspace: None,
                now_in_seconds: None,
                continuous_paging: None,
            });
        }

        let flags = if caps.query_flags_are_int {
            read_int(buf)?
        } else {
            i32::from(read_byte(buf)?)
        };
        let serial_consistency = if flags & FLAG_SERIAL_CONSISTENCY != 0 {
            Some(ConsistencyLevel::from_wire(read_short(buf)?)?)
        } else {
            None
        };
        let default_timestamp = if flags & FLAG_DEFAULT_TIMESTAMP != 0 {
            Some(crate::primitives::read_long(buf)?)
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

        Ok(BatchMessage {
            batch_type,
            children,
            consistency,
            serial_consistency,
            default_timestamp,
            keyspace,
            now_in_seconds,
            continuous_paging,
        })
    }

    /// Encode a batch request, rejecting an empty children list before
    /// writing anything.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        if self.children.is_empty() {
            return Err(ProtocolError::precondition(
                "batch.children",
                "must be non-empty",
            ));
        }
        let flags = self.flags(caps)?;

        write_byte(buf, self.batch_type.to_wire());
        write_short(buf, self.children.len() as u16);
        for child in &self.children {
            child.write(buf, caps)?;
        }
        write_short(buf, self.consistency.to_wire());

        if caps.version == ProtocolVersion::V2 {
            return Ok(());
        }

        if caps.query_flags_are_int {
            write_int(buf, flags);
        } else {
            write_byte(buf, flags as u8);
        }
        if let Some(serial_consistency) = self.serial_consistency {
            write_short(buf, serial_consistency.to_wire());
        }
        if let Some(default_timestamp) = self.default_timestamp {
            crate::primitives::write_long(buf, default_timestamp);
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

    /// Byte length of the encoded body.
    pub fn encoded_len(&self, caps: &VersionCapabilities) -> Result<usize> {
        if self.children.is_empty() {
            return Err(ProtocolError::precondition(
                "batch.children",
                "must be non-empty",
            ));
        }
        self.flags(caps)?;

        let mut len = 1
            + 2
            + self.children.iter().map(BatchChild::encoded_len).sum::<usize>()
            + 2;
        if caps.version == ProtocolVersion::V2 {
            return Ok(len);
        }
        len += if caps.query_flags_are_int { 4 } else { 1 };
        if self.serial_consistency.is_some() {
            len += 2;
        }
        if self.default_timestamp.is_some() {
            len += 8;
        }
        if let Some(keyspace) = &self.keyspace {
            len += crate::primitives::encoded_len_string(keyspace);
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
