//! `Query` request: a single CQL statement plus its query-options block.

use bytes::{Buf, BufMut};

use crate::error::Result;
use crate::limits::DecodeLimits;
use crate::primitives::{encoded_len_long_string, read_long_string, write_long_string};
use crate::query_options::QueryOptions;
use crate::version::{ProtocolVersion, VersionCapabilities};

/// `[long string] query` then the query-options block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// CQL statement text.
    pub query: String,
    /// Bind values and execution options.
    pub options: QueryOptions,
}

impl Query {
    /// Decode a query request.
    pub fn read(buf: &mut impl Buf, version: ProtocolVersion, limits: &DecodeLimits) -> Result<Self> {
        let query = read_long_string(buf, limits)?;
        let options = QueryOptions::read(buf, version, limits)?;
        Ok(Query { query, options })
    }

    /// Encode a query request.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        write_long_string(buf, &self.query);
        self.options.write(buf, caps)?;
        Ok(())
    }

    /// Byte length of the encoded body.
    pub fn encoded_len(&self, caps: &VersionCapabilities) -> Result<usize> {
        Ok(encoded_len_long_string(&self.query) + self.options.encoded_len(caps)?)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::enums::ConsistencyLevel;
    use crate::query_options::QueryValues;

    fn options() -> QueryOptions {
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
    fn round_trips_with_keyspace_override_on_v5() {
        let caps = ProtocolVersion::V5.capabilities();
        let limits = DecodeLimits::default();
        let message = Query {
            query: "SELECT * FROM ks1.t".to_string(),
            options: QueryOptions {
                keyspace: Some("ks1".to_string()),
                now_in_seconds: Some(234),
                ..options()
            },
        };
        let mut buf = Vec::new();
        message.write(&mut buf, &caps).unwrap();
        assert_eq!(message.encoded_len(&caps).unwrap(), buf.len());
        let mut slice = &buf[..];
        let decoded = Query::read(&mut slice, caps.version, &limits).unwrap();
        assert_eq!(decoded, message);
    }

    #[rstest]
    #[case(ProtocolVersion::V2)]
    #[case(ProtocolVersion::V3)]
    #[case(ProtocolVersion::V4)]
    #[case(ProtocolVersion::V5)]
    #[case(ProtocolVersion::DseV1)]
    #[case(ProtocolVersion::DseV2)]
    fn round_trips_a_bare_query_on_every_version(#[case] version: ProtocolVersion) {
        let caps = version.capabilities();
        let limits = DecodeLimits::default();
        let message = Query { query: "SELECT * FROM t".to_string(), options: options() };
        let mut buf = Vec::new();
        message.write(&mut buf, &caps).unwrap();
        assert_eq!(message.encoded_len(&caps).unwrap(), buf.len());
        let mut slice = &buf[..];
        let decoded = Query::read(&mut slice, version, &limits).unwrap();
        assert_eq!(decoded, message);
    }

    proptest! {
        #[test]
        fn arbitrary_query_text_round_trips(query in "\\PC{0,64}") {
            let caps = ProtocolVersion::V4.capabilities();
            let limits = DecodeLimits::default();
            let message = Query { query, options: options() };
            let mut buf = Vec::new();
            message.write(&mut buf, &caps).unwrap();
            prop_assert_eq!(message.encoded_len(&caps).unwrap(), buf.len());
            let mut slice = &buf[..];
            let decoded = Query::read(&mut slice, caps.version, &limits).unwrap();
            prop_assert_eq!(decoded, message);
        }
    }
}
