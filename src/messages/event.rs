//! `Event` response: an unsolicited notification pushed on a connection
//! that issued `Register`.

use std::net::IpAddr;

use bytes::{Buf, BufMut};

use crate::enums::{EventType, StatusChangeType, TopologyChangeType};
use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::primitives::{encoded_len_inet, encoded_len_string, read_inet, read_string, write_inet, write_string};
use crate::schema_change::SchemaChangePayload;
use crate::version::VersionCapabilities;

/// `[string] eventType`, then a payload that depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// A keyspace/table/type/function/aggregate change.
    SchemaChange(SchemaChangePayload),
    /// A node came up or went down.
    StatusChange {
        /// UP or DOWN.
        change_type: StatusChangeType,
        /// The affected node.
        address: IpAddr,
        /// The affected node's port.
        port: i32,
    },
    /// A node joined, left, or (v3+) moved.
    TopologyChange {
        /// NEW_NODE, REMOVED_NODE, or (v3+) MOVED_NODE.
        change_type: TopologyChangeType,
        /// The affected node.
        address: IpAddr,
        /// The affected node's port.
        port: i32,
    },
}

impl EventPayload {
    fn event_type(&self) -> EventType {
        match self {
            EventPayload::SchemaChange(_) => EventType::SchemaChange,
            EventPayload::StatusChange { .. } => EventType::StatusChange,
            EventPayload::TopologyChange { .. } => EventType::TopologyChange,
        }
    }

    /// Decode an event.
    pub fn read(buf: &mut impl Buf, caps: &VersionCapabilities, limits: &DecodeLimits) -> Result<Self> {
        let event_type = EventType::from_wire(&read_string(buf, limits)?)?;
        Ok(match event_type {
            EventType::SchemaChange => {
                EventPayload::SchemaChange(SchemaChangePayload::read(buf, caps, limits)?)
            }
            EventType::StatusChange => {
                let change_type = StatusChangeType::from_wire(&read_string(buf, limits)?)?;
                let (address, port) = read_inet(buf)?;
                EventPayload::StatusChange {
                    change_type,
                    address,
                    port,
                }
            }
            EventType::TopologyChange => {
                let change_type = TopologyChangeType::from_wire(&read_string(buf, limits)?)?;
                if change_type == TopologyChangeType::MovedNode && !caps.topology_change_moved_node {
                    return Err(ProtocolError::UnsupportedForVersion {
                        field: "event.topology_change.moved_node",
                        version: caps.version,
                    });
                }
                let (address, port) = read_inet(buf)?;
                EventPayload::TopologyChange {
                    change_type,
                    address,
                    port,
                }
            }
        })
    }

    /// Encode an event.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        write_string(buf, self.event_type().to_wire());
        match self {
            EventPayload::SchemaChange(payload) => payload.write(buf, caps)?,
            EventPayload::StatusChange {
                change_type,
                address,
                port,
            } => {
                write_string(buf, change_type.to_wire());
                write_inet(buf, *address, *port);
            }
            EventPayload::TopologyChange {
                change_type,
                address,
                port,
            } => {
                if *change_type == TopologyChangeType::MovedNode && !caps.topology_change_moved_node {
                    return Err(ProtocolError::UnsupportedForVersion {
                        field: "event.topology_change.moved_node",
                        version: caps.version,
                    });
                }
                write_string(buf, change_type.to_wire());
                write_inet(buf, *address, *port);
            }
        }
        Ok(())
    }

    /// Byte length of the encoded event.
    pub fn encoded_len(&self, caps: &VersionCapabilities) -> Result<usize> {
        let mut len = encoded_len_string(self.event_type().to_wire());
        len += match self {
            EventPayload::SchemaChange(payload) => payload.encoded_len(caps)?,
            EventPayload::StatusChange {
                change_type,
                address,
                ..
            } => encoded_len_string(change_type.to_wire()) + encoded_len_inet(*address),
            EventPayload::TopologyChange {
                change_type,
                address,
                ..
            } => {
                if *change_type == TopologyChangeType::MovedNode && !caps.topology_change_moved_node {
                    return Err(ProtocolError::UnsupportedForVersion {
                        field: "event.topology_change.moved_node",
                        version: caps.version,
                    });
                }
                encoded_len_string(change_type.to_wire()) + encoded_len_inet(*address)
            }
        };
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::SchemaChangeTarget;
    use crate::enums::SchemaChangeType;
    use crate::version::ProtocolVersion;
    use std::net::Ipv4Addr;

    #[test]
    fn status_change_round_trips() {
        let caps = ProtocolVersion::V4.capabilities();
        let limits = DecodeLimits::default();
        let message = EventPayload::StatusChange {
            change_type: StatusChangeType::Up,
            address: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            port: 9042,
        };
        let mut buf = Vec::new();
        message.write(&mut buf, &caps).unwrap();
        assert_eq!(message.encoded_len(&caps).unwrap(), buf.len());
        let mut slice = &buf[..];
        let decoded = EventPayload::read(&mut slice, &caps, &limits).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn moved_node_rejected_on_v2() {
        let caps = ProtocolVersion::V2.capabilities();
        let message = EventPayload::TopologyChange {
            change_type: TopologyChangeType::MovedNode,
            address: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            port: 9042,
        };
        let mut buf = Vec::new();
        assert!(message.write(&mut buf, &caps).is_err());
    }

    #[test]
    fn schema_change_event_shares_the_result_payload_shape() {
        let caps = ProtocolVersion::V4.capabilities();
        let limits = DecodeLimits::default();
        let message = EventPayload::SchemaChange(SchemaChangePayload {
            change_type: SchemaChangeType::Created,
            target: SchemaChangeTarget::Table,
            keyspace: "ks1".to_string(),
            object: Some("t1".to_string()),
            arguments: None,
        });
        let mut buf = Vec::new();
        message.write(&mut buf, &caps).unwrap();
        let mut slice = &buf[..];
        let decoded = EventPayload::read(&mut slice, &caps, &limits).unwrap();
        assert_eq!(decoded, message);
    }
}
