//! The `SchemaChange` payload, shared verbatim by the `Result` response's
//! `SchemaChange` variant and the `Event` response's `SchemaChange` variant.

use bytes::{Buf, BufMut};

use crate::enums::{SchemaChangeTarget, SchemaChangeType};
use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::primitives::{
    encoded_len_string, encoded_len_string_list, read_string, read_string_list, write_string,
    write_string_list,
};
use crate::version::VersionCapabilities;

/// A schema change announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaChangePayload {
    /// What happened to the object (created/updated/dropped).
    pub change_type: SchemaChangeType,
    /// What kind of object changed. Always present in memory; `None` is
    /// never constructed by this type — V2's wire form infers it instead
    /// of carrying it, but the decoded value always fills it in.
    pub target: SchemaChangeTarget,
    /// Keyspace the change occurred in. Must be non-empty on encode.
    pub keyspace: String,
    /// Table/type/function/aggregate name. Absent for `KEYSPACE` targets.
    pub object: Option<String>,
    /// Argument type signatures, function/aggregate targets only.
    pub arguments: Option<Vec<String>>,
}

impl SchemaChangePayload {
    /// Decode, branching on whether `caps` carries an explicit `target`
    /// field (V3+) or must infer it from the object's emptiness (V2).
    pub fn read(buf: &mut impl Buf, caps: &VersionCapabilities, limits: &DecodeLimits) -> Result<Self> {
        let change_type = SchemaChangeType::from_wire(&read_string(buf, limits)?)?;
        if caps.schema_change_explicit_target {
            let target = SchemaChangeTarget::from_wire(&read_string(buf, limits)?)?;
            if matches!(target, SchemaChangeTarget::Function | SchemaChangeTarget::Aggregate)
                && !caps.schema_change_function_aggregate
            {
                return Err(ProtocolError::UnsupportedForVersion {
                    field: "schema_change.target",
                    version: caps.version,
                });
            }
            let keyspace = read_string(buf, limits)?;
            let (object, arguments) = match target {
                SchemaChangeTarget::Keyspace => (None, None),
                SchemaChangeTarget::Table | SchemaChangeTarget::Type => {
                    (Some(read_string(buf, limits)?), None)
                }
                SchemaChangeTarget::Function | SchemaChangeTarget::Aggregate => {
                    let object = read_string(buf, limits)?;
                    let arguments = read_string_list(buf, limits)?;
                    (Some(object), Some(arguments))
                }
            };
            Ok(SchemaChangePayload {
                change_type,
                target,
                keyspace,
                object,
                arguments,
            })
        } else {
            let keyspace = read_string(buf, limits)?;
            let object = read_string(buf, limits)?;
            let (target, object) = if object.is_empty() {
                (SchemaChangeTarget::Keyspace, None)
            } else {
                (SchemaChangeTarget::Table, Some(object))
            };
            Ok(SchemaChangePayload {
                change_type,
                target,
                keyspace,
                object,
                arguments: None,
            })
        }
    }

    /// Encode, validating the keyspace and the target/version combination
    /// before writing anything.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        if self.keyspace.is_empty() {
            return Err(ProtocolError::precondition(
                "schema_change.keyspace",
                "must be non-empty",
            ));
        }
        if matches!(
            self.target,
            SchemaChangeTarget::Function | SchemaChangeTarget::Aggregate
        ) && !caps.schema_change_function_aggregate
        {
            return Err(ProtocolError::UnsupportedForVersion {
                field: "schema_change.target",
                version: caps.version,
            });
        }
        if !caps.schema_change_explicit_target
            && !matches!(self.target, SchemaChangeTarget::Keyspace | SchemaChangeTarget::Table)
        {
            return Err(ProtocolError::UnsupportedForVersion {
                field: "schema_change.target",
                version: caps.version,
            });
        }

        write_string(buf, self.change_type.to_wire());
        if caps.schema_change_explicit_target {
            write_string(buf, self.target.to_wire());
            write_string(buf, &self.keyspace);
            match self.target {
                SchemaChangeTarget::Keyspace => {}
                SchemaChangeTarget::Table | SchemaChangeTarget::Type => {
                    let object = self.object.as_deref().ok_or_else(|| {
                        ProtocolError::precondition("schema_change.object", "required for this target")
                    })?;
                    write_string(buf, object);
                }
                SchemaChangeTarget::Function | SchemaChangeTarget::Aggregate => {
                    let object = self.object.as_deref().ok_or_else(|| {
                        ProtocolError::precondition("schema_change.object", "required for this target")
                    })?;
                    write_string(buf, object);
                    let arguments = self.arguments.as_deref().ok_or_else(|| {
                        ProtocolError::precondition(
                            "schema_change.arguments",
                            "required for function/aggregate targets",
                        )
                    })?;
                    write_string_list(buf, arguments);
                }
            }
        } else {
            write_string(buf, &self.keyspace);
            write_string(buf, self.object.as_deref().unwrap_or(""));
        }
        Ok(())
    }

    /// Byte length of the encoded payload.
    pub fn encoded_len(&self, caps: &VersionCapabilities) -> Result<usize> {
        let mut len = encoded_len_string(self.change_type.to_wire());
        if caps.schema_change_explicit_target {
            len += encoded_len_string(self.target.to_wire()) + encoded_len_string(&self.keyspace);
            match self.target {
                SchemaChangeTarget::Keyspace => {}
                SchemaChangeTarget::Table | SchemaChangeTarget::Type => {
                    len += encoded_len_string(self.object.as_deref().unwrap_or_default());
                }
                SchemaChangeTarget::Function | SchemaChangeTarget::Aggregate => {
                    len += encoded_len_string(self.object.as_deref().unwrap_or_default());
                    len += encoded_len_string_list(self.arguments.as_deref().unwrap_or_default());
                }
            }
        } else {
            len += encoded_len_string(&self.keyspace);
            len += encoded_len_string(self.object.as_deref().unwrap_or(""));
        }
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ProtocolVersion;

    #[test]
    fn table_target_round_trips_on_v3() {
        let caps = ProtocolVersion::V3.capabilities();
        let limits = DecodeLimits::default();
        let payload = SchemaChangePayload {
            change_type: SchemaChangeType::Created,
            target: SchemaChangeTarget::Table,
            keyspace: "ks1".to_string(),
            object: Some("table1".to_string()),
            arguments: None,
        };
        let mut buf = Vec::new();
        payload.write(&mut buf, &caps).unwrap();
        assert_eq!(payload.encoded_len(&caps).unwrap(), buf.len());
        assert_eq!(
            buf,
            [
                0x00, 0x07, b'C', b'R', b'E', b'A', b'T', b'E', b'D',
                0x00, 0x05, b'T', b'A', b'B', b'L', b'E',
                0x00, 0x03, b'k', b's', b'1',
                0x00, 0x06, b't', b'a', b'b', b'l', b'e', b'1',
            ]
        );
        let mut slice = &buf[..];
        let decoded = SchemaChangePayload::read(&mut slice, &caps, &limits).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn v2_infers_keyspace_target_from_empty_object() {
        let caps = ProtocolVersion::V2.capabilities();
        let limits = DecodeLimits::default();
        let payload = SchemaChangePayload {
            change_type: SchemaChangeType::Dropped,
            target: SchemaChangeTarget::Keyspace,
            keyspace: "ks1".to_string(),
            object: None,
            arguments: None,
        };
        let mut buf = Vec::new();
        payload.write(&mut buf, &caps).unwrap();
        let mut slice = &buf[..];
        let decoded = SchemaChangePayload::read(&mut slice, &caps, &limits).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn function_target_rejected_before_v4() {
        let caps = ProtocolVersion::V3.capabilities();
        let payload = SchemaChangePayload {
            change_type: SchemaChangeType::Created,
            target: SchemaChangeTarget::Function,
            keyspace: "ks1".to_string(),
            object: Some("fn1".to_string()),
            arguments: Some(vec!["int".to_string()]),
        };
        let mut buf = Vec::new();
        let err = payload.write(&mut buf, &caps).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedForVersion { .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_keyspace_is_rejected() {
        let caps = ProtocolVersion::V4.capabilities();
        let payload = SchemaChangePayload {
            change_type: SchemaChangeType::Created,
            target: SchemaChangeTarget::Keyspace,
            keyspace: String::new(),
            object: None,
            arguments: None,
        };
        let mut buf = Vec::new();
        assert!(payload.write(&mut buf, &caps).is_err());
    }

    #[test]
    fn function_target_carries_arguments_on_v4() {
        let caps = ProtocolVersion::V4.capabilities();
        let limits = DecodeLimits::default();
        let payload = SchemaChangePayload {
            change_type: SchemaChangeType::Updated,
            target: SchemaChangeTarget::Function,
            keyspace: "ks1".to_string(),
            object: Some("fn1".to_string()),
            arguments: Some(vec!["int".to_string(), "text".to_string()]),
        };
        let mut buf = Vec::new();
        payload.write(&mut buf, &caps).unwrap();
        let mut slice = &buf[..];
        let decoded = SchemaChangePayload::read(&mut slice, &caps, &limits).unwrap();
        assert_eq!(decoded, payload);
    }
}
