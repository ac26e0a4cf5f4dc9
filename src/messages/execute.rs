//! `Execute` request: runs a previously prepared statement.

use bytes::{Buf, BufMut};

use crate::error::Result;
use crate::limits::DecodeLimits;
use crate::primitives::{encoded_len_short_bytes, read_short_bytes, write_short_bytes};
use crate::query_options::QueryOptions;
use crate::version::{ProtocolVersion, VersionCapabilities};

/// `[short bytes] preparedId`; on V5/DSE_V2, `[short bytes]
/// resultMetadataId`; then the query-options block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execute {
    /// Id returned by a prior `Prepared` result.
    pub prepared_id: Vec<u8>,
    /// Result-metadata id echoed back, V5/DSE_V2 only.
    pub result_metadata_id: Option<Vec<u8>>,
    /// Bind values and execution options.
    pub options: QueryOptions,
}

impl Execute {
    /// Decode an execute request.
    pub fn read(buf: &mut impl Buf, version: ProtocolVersion, limits: &DecodeLimits) -> Result<Self> {
        let caps = version.capabilities();
        let prepared_id = read_short_bytes(buf, limits)?;
        let result_metadata_id = if caps.result_metadata_id {
            Some(read_short_bytes(buf, limits)?)
        } else {
            None
        };
        let options = QueryOptions::read(buf, version, limits)?;
        Ok(Execute {
            prepared_id,
            result_metadata_id,
            options,
        })
    }

    /// Encode an execute request.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        write_short_bytes(buf, &self.prepared_id);
        if caps.result_metadata_id {
            write_short_bytes(buf, self.result_metadata_id.as_deref().unwrap_or(&[]));
        }
        self.options.write(buf, caps)?;
        Ok(())
    }

    /// Byte length of the encoded body.
    pub fn encoded_len(&self, caps: &VersionCapabilities) -> Result<usize> {
        let mut len = encoded_len_short_bytes(&self.prepared_id);
        if caps.result_metadata_id {
            len += encoded_len_short_bytes(self.result_metadata_id.as_deref().unwrap_or(&[]));
        }
        len += self.options.encoded_len(caps)?;
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::ConsistencyLevel;
    use crate::query_options::QueryValues;

    fn options() -> QueryOptions {
        QueryOptions {
            consistency: ConsistencyLevel::Quorum,
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
    fn round_trips_with_result_metadata_id_on_v5() {
        let caps = ProtocolVersion::V5.capabilities();
        let limits = DecodeLimits::default();
        let message = Execute {
            prepared_id: vec![0xAB, 0xCD],
            result_metadata_id: Some(vec![0x01, 0x02]),
            options: options(),
        };
        let mut buf = Vec::new();
        message.write(&mut buf, &caps).unwrap();
        assert_eq!(message.encoded_len(&caps).unwrap(), buf.len());
        let mut slice = &buf[..];
        let decoded = Execute::read(&mut slice, caps.version, &limits).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn no_result_metadata_id_field_on_v4() {
        let caps = ProtocolVersion::V4.capabilities();
        let message = Execute {
            prepared_id: vec![0xAB, 0xCD],
            result_metadata_id: None,
            options: options(),
        };
        let mut buf = Vec::new();
        message.write(&mut buf, &caps).unwrap();
        // short_bytes(2) + short_bytes(2) for prepared_id, then options tail.
        assert_eq!(&buf[..4], [0x00, 0x02, 0xAB, 0xCD]);
    }
}
