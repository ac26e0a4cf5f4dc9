//! `Revise` request (DSE only): cancels or extends an in-progress
//! continuous-paging stream.

use bytes::{Buf, BufMut};

use crate::enums::DseRevisionType;
use crate::error::{ProtocolError, Result};
use crate::primitives::{read_int, write_int};
use crate::version::VersionCapabilities;

/// `[int] revisionType, [int] targetStreamId`, and on DSE_V2 when
/// `revisionType == MORE_CONTINUOUS_PAGES`, `[int] nextPages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revise {
    /// What to do to the target stream.
    pub revision_type: DseRevisionType,
    /// Stream id of the continuous-paging request being revised.
    pub target_stream_id: i32,
    /// Additional pages requested, `MORE_CONTINUOUS_PAGES` on DSE_V2 only.
    pub next_pages: Option<i32>,
}

impl Revise {
    /// Decode a revise request.
    pub fn read(buf: &mut impl Buf, caps: &VersionCapabilities) -> Result<Self> {
        if !caps.continuous_paging {
            return Err(ProtocolError::UnsupportedForVersion {
                field: "revise",
                version: caps.version,
            });
        }
        let revision_type = DseRevisionType::from_wire(read_int(buf)?)?;
        let target_stream_id = read_int(buf)?;
        let next_pages = if caps.version == crate::version::ProtocolVersion::DseV2
            && revision_type == DseRevisionType::MoreContinuousPages
        {
            Some(read_int(buf)?)
        } else {
            None
        };
        Ok(Revise {
            revision_type,
            target_stream_id,
            next_pages,
        })
    }

    /// Encode a revise request. Fails on any non-DSE version.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        if !caps.continuous_paging {
            return Err(ProtocolError::UnsupportedForVersion {
                field: "revise",
                version: caps.version,
            });
        }
        if self.next_pages.is_some()
            && !(caps.version == crate::version::ProtocolVersion::DseV2
                && self.revision_type == DseRevisionType::MoreContinuousPages)
        {
            return Err(ProtocolError::precondition(
                "revise.next_pages",
                "only valid on DSE_V2 with revision_type MORE_CONTINUOUS_PAGES",
            ));
        }
        write_int(buf, self.revision_type.to_wire());
        write_int(buf, self.target_stream_id);
        if caps.version == crate::version::ProtocolVersion::DseV2
            && self.revision_type == DseRevisionType::MoreContinuousPages
        {
            write_int(buf, self.next_pages.unwrap_or(0));
        }
        Ok(())
    }

    /// Byte length of the encoded body.
    pub fn encoded_len(&self, caps: &VersionCapabilities) -> Result<usize> {
        if !caps.continuous_paging {
            return Err(ProtocolError::UnsupportedForVersion {
                field: "revise",
                version: caps.version,
            });
        }
        let mut len = 8;
        if caps.version == crate::version::ProtocolVersion::DseV2
            && self.revision_type == DseRevisionType::MoreContinuousPages
        {
            len += 4;
        }
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ProtocolVersion;

    #[test]
    fn more_pages_round_trips_on_dse_v2() {
        let caps = ProtocolVersion::DseV2.capabilities();
        let message = Revise {
            revision_type: DseRevisionType::MoreContinuousPages,
            target_stream_id: 7,
            next_pages: Some(3),
        };
        let mut buf = Vec::new();
        message.write(&mut buf, &caps).unwrap();
        assert_eq!(message.encoded_len(&caps).unwrap(), buf.len());
        let mut slice = &buf[..];
        let decoded = Revise::read(&mut slice, &caps).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn rejected_on_non_dse_version() {
        let caps = ProtocolVersion::V5.capabilities();
        let message = Revise {
            revision_type: DseRevisionType::CancelContinuousPaging,
            target_stream_id: 1,
            next_pages: None,
        };
        let mut buf = Vec::new();
        assert!(message.write(&mut buf, &caps).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn cancel_has_no_next_pages_field_on_dse_v2() {
        let caps = ProtocolVersion::DseV2.capabilities();
        let message = Revise {
            revision_type: DseRevisionType::CancelContinuousPaging,
            target_stream_id: 1,
            next_pages: None,
        };
        let mut buf = Vec::new();
        message.write(&mut buf, &caps).unwrap();
        assert_eq!(buf.len(), 8);
    }
}
