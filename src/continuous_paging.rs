//! DSE continuous-paging options, embedded in query-options/batch-options
//! blocks and referenced by the `Revise` request.

use bytes::{Buf, BufMut};

use crate::error::{ProtocolError, Result};
use crate::primitives::{read_int, write_int};
use crate::version::{ProtocolVersion, VersionCapabilities};

/// `[int] maxPages, [int] pagesPerSecond`, then on DSE_V2 only
/// `[int] nextPages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuousPagingOptions {
    /// Maximum number of pages the server should stream before stopping.
    pub max_pages: i32,
    /// Rate limit, in pages per second (0 means unlimited).
    pub pages_per_second: i32,
    /// Additional pages requested, DSE_V2 only.
    pub next_pages: Option<i32>,
}

impl ContinuousPagingOptions {
    /// Decode from `buf`, consuming the trailing `nextPages` field only on
    /// DSE_V2.
    pub fn read(buf: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        let max_pages = read_int(buf)?;
        let pages_per_second = read_int(buf)?;
        let next_pages = if version == ProtocolVersion::DseV2 {
            Some(read_int(buf)?)
        } else {
            None
        };
        Ok(ContinuousPagingOptions {
            max_pages,
            pages_per_second,
            next_pages,
        })
    }

    /// Encode into `buf`, validating `next_pages` against `caps` first.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        if !caps.continuous_paging {
            return Err(ProtocolError::UnsupportedForVersion {
                field: "continuous_paging",
                version: caps.version,
            });
        }
        if self.next_pages.is_some() && caps.version != ProtocolVersion::DseV2 {
            return Err(ProtocolError::UnsupportedForVersion {
                field: "continuous_paging.next_pages",
                version: caps.version,
            });
        }
        write_int(buf, self.max_pages);
        write_int(buf, self.pages_per_second);
        if caps.version == ProtocolVersion::DseV2 {
            write_int(buf, self.next_pages.unwrap_or(0));
        }
        Ok(())
    }

    /// Byte length of the encoded options for `version`.
    pub fn encoded_len(version: ProtocolVersion) -> usize {
        8 + if version == ProtocolVersion::DseV2 { 4 } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dse_v1_has_no_next_pages_field() {
        let caps = ProtocolVersion::DseV1.capabilities();
        let opts = ContinuousPagingOptions {
            max_pages: 10,
            pages_per_second: 0,
            next_pages: None,
        };
        let mut buf = Vec::new();
        opts.write(&mut buf, &caps).unwrap();
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn dse_v2_round_trips_next_pages() {
        let caps = ProtocolVersion::DseV2.capabilities();
        let opts = ContinuousPagingOptions {
            max_pages: 10,
            pages_per_second: 5,
            next_pages: Some(3),
        };
        let mut buf = Vec::new();
        opts.write(&mut buf, &caps).unwrap();
        assert_eq!(ContinuousPagingOptions::encoded_len(caps.version), buf.len());
        let mut slice = &buf[..];
        let decoded = ContinuousPagingOptions::read(&mut slice, caps.version).unwrap();
        assert_eq!(decoded, opts);
    }

    #[test]
    fn rejected_on_non_dse_version() {
        let caps = ProtocolVersion::V5.capabilities();
        let opts = ContinuousPagingOptions {
            max_pages: 1,
            pages_per_second: 1,
            next_pages: None,
        };
        let mut buf = Vec::new();
        assert!(opts.write(&mut buf, &caps).is_err());
        assert!(buf.is_empty());
    }
}
