//! `Register` request: subscribes the connection to a set of server events.

use bytes::{Buf, BufMut};

use crate::enums::EventType;
use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::primitives::{encoded_len_string_list, read_string_list, write_string_list};

/// `[string list]` of event-type names. Must be non-empty on encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    /// Event types this connection wants to receive.
    pub event_types: Vec<EventType>,
}

impl Register {
    /// Decode and validate each event-type name.
    pub fn read(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Self> {
        let names = read_string_list(buf, limits)?;
        let event_types = names
            .iter()
            .map(|name| EventType::from_wire(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Register { event_types })
    }

    /// Encode, rejecting an empty event-type list.
    pub fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        if self.event_types.is_empty() {
            return Err(ProtocolError::precondition(
                "register.event_types",
                "must be non-empty",
            ));
        }
        let names: Vec<String> = self
            .event_types
            .iter()
            .map(|t| t.to_wire().to_string())
            .collect();
        write_string_list(buf, &names);
        Ok(())
    }

    /// Byte length of the encoded body.
    pub fn encoded_len(&self) -> Result<usize> {
        if self.event_types.is_empty() {
            return Err(ProtocolError::precondition(
                "register.event_types",
                "must be non-empty",
            ));
        }
        let names: Vec<String> = self
            .event_types
            .iter()
            .map(|t| t.to_wire().to_string())
            .collect();
        Ok(encoded_len_string_list(&names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_schema_and_status_change() {
        let limits = DecodeLimits::default();
        let message = Register {
            event_types: vec![EventType::SchemaChange, EventType::StatusChange],
        };
        let mut buf = Vec::new();
        message.write(&mut buf).unwrap();
        assert_eq!(message.encoded_len().unwrap(), buf.len());
        let mut slice = &buf[..];
        assert_eq!(Register::read(&mut slice, &limits).unwrap(), message);
    }

    #[test]
    fn empty_event_list_is_rejected_on_encode() {
        let message = Register { event_types: vec![] };
        let mut buf = Vec::new();
        assert!(message.write(&mut buf).is_err());
        assert!(buf.is_empty());
    }
}
