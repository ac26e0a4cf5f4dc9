//! [`Message`]: the closed sum type over every request/response body this
//! crate understands, keyed by [`OpCode`].

use std::fmt;

use bytes::{Buf, BufMut};
use log::trace;

use crate::datatype::DataTypeCodec;
use crate::enums::OpCode;
use crate::error::Result;
use crate::limits::DecodeLimits;
use crate::messages::{
    AuthChallenge, AuthResponse, AuthSuccess, Authenticate, BatchMessage, ErrorMessage,
    EventPayload, Execute, Prepare, Query, Register, ResultPayload, Revise, Startup, Supported,
};
use crate::version::{ProtocolVersion, VersionCapabilities};

/// Every message body this crate can encode or decode, generic over `D`,
/// the caller-supplied CQL data-type descriptor used by the `Result`
/// variant's column metadata.
///
/// All variants own their data: cloning a `Message` never shares state
/// with the original, since every field below it is itself an owned
/// `String`/`Vec`/`HashMap` (or `Copy`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<D> {
    /// Request: opens a connection.
    Startup(Startup),
    /// Response: acknowledges `Startup` when no authentication is required.
    Ready,
    /// Response: demands authentication before `Startup` succeeds.
    Authenticate(Authenticate),
    /// Request: asks the server what it supports.
    Options,
    /// Response: answers `Options`.
    Supported(Supported),
    /// Request: runs one CQL statement.
    Query(Query),
    /// Response: the outcome of `Query`/`Prepare`/`Execute`/`Batch`.
    Result(ResultPayload<D>),
    /// Request: parses and caches a CQL statement.
    Prepare(Prepare),
    /// Request: runs a previously prepared statement.
    Execute(Execute),
    /// Request: subscribes to server events.
    Register(Register),
    /// Response: an unsolicited server event.
    Event(EventPayload),
    /// Request: runs several statements as one unit.
    Batch(BatchMessage),
    /// Response: the server's half of a SASL exchange.
    AuthChallenge(AuthChallenge),
    /// Request: the client's half of a SASL exchange.
    AuthResponse(AuthResponse),
    /// Response: terminates a SASL exchange successfully.
    AuthSuccess(AuthSuccess),
    /// Request (DSE only): cancels or extends a continuous-paging stream.
    Revise(Revise),
    /// Response: the outcome of a request the server could not service.
    Error(ErrorMessage),
}

impl<D> Message<D> {
    /// The opcode byte this message would carry in a frame header.
    pub fn op_code(&self) -> OpCode {
        match self {
            Message::Startup(_) => OpCode::Startup,
            Message::Ready => OpCode::Ready,
            Message::Authenticate(_) => OpCode::Authenticate,
            Message::Options => OpCode::Options,
            Message::Supported(_) => OpCode::Supported,
            Message::Query(_) => OpCode::Query,
            Message::Result(_) => OpCode::Result,
            Message::Prepare(_) => OpCode::Prepare,
            Message::Execute(_) => OpCode::Execute,
            Message::Register(_) => OpCode::Register,
            Message::Event(_) => OpCode::Event,
            Message::Batch(_) => OpCode::Batch,
            Message::AuthChallenge(_) => OpCode::AuthChallenge,
            Message::AuthResponse(_) => OpCode::AuthResponse,
            Message::AuthSuccess(_) => OpCode::AuthSuccess,
            Message::Revise(_) => OpCode::Revise,
            Message::Error(_) => OpCode::Error,
        }
    }

    /// Whether this message flows server-to-client.
    pub fn is_response(&self) -> bool {
        self.op_code().is_response()
    }

    /// The variant's name, for use in [`crate::error::ProtocolError::TypeMismatch`].
    pub fn variant_name(&self) -> &'static str {
        self.op_code().name()
    }

    /// Encode this message's body (without the frame header) for `caps`'s
    /// version, using `type_codec` to interpret `Result`'s column
    /// data-type descriptors.
    pub fn encode<C: DataTypeCodec<Descriptor = D>>(
        &self,
        buf: &mut impl BufMut,
        caps: &VersionCapabilities,
        type_codec: &C,
    ) -> Result<()> {
        trace!("encoding {} for {}", self.variant_name(), caps.version);
        match self {
            Message::Startup(m) => {
                m.write(buf);
                Ok(())
            }
            Message::Ready => Ok(()),
            Message::Authenticate(m) => m.write(buf),
            Message::Options => Ok(()),
            Message::Supported(m) => {
                m.write(buf);
                Ok(())
            }
            Message::Query(m) => m.write(buf, caps),
            Message::Result(m) => m.write(buf, caps, type_codec),
            Message::Prepare(m) => m.write(buf, caps),
            Message::Execute(m) => m.write(buf, caps),
            Message::Register(m) => m.write(buf),
            Message::Event(m) => m.write(buf, caps),
            Message::Batch(m) => m.write(buf, caps),
            Message::AuthChallenge(m) => {
                m.write(buf);
                Ok(())
            }
            Message::AuthResponse(m) => {
                m.write(buf);
                Ok(())
            }
            Message::AuthSuccess(m) => {
                m.write(buf);
                Ok(())
            }
            Message::Revise(m) => m.write(buf, caps),
            Message::Error(m) => m.write(buf, caps),
        }
    }

    /// Byte length [`Message::encode`] would produce for this message.
    pub fn encoded_len<C: DataTypeCodec<Descriptor = D>>(
        &self,
        caps: &VersionCapabilities,
        type_codec: &C,
    ) -> Result<usize> {
        Ok(match self {
            Message::Startup(m) => m.encoded_len(),
            Message::Ready => 0,
            Message::Authenticate(m) => m.encoded_len()?,
            Message::Options => 0,
            Message::Supported(m) => m.encoded_len(),
            Message::Query(m) => m.encoded_len(caps)?,
            Message::Result(m) => m.encoded_len(caps, type_codec)?,
            Message::Prepare(m) => m.encoded_len(caps)?,
            Message::Execute(m) => m.encoded_len(caps)?,
            Message::Register(m) => m.encoded_len()?,
            Message::Event(m) => m.encoded_len(caps)?,
            Message::Batch(m) => m.encoded_len(caps)?,
            Message::AuthChallenge(m) => m.encoded_len(),
            Message::AuthResponse(m) => m.encoded_len(),
            Message::AuthSuccess(m) => m.encoded_len(),
            Message::Revise(m) => m.encoded_len(caps)?,
            Message::Error(m) => m.encoded_len(caps)?,
        })
    }

    /// Decode a message body of `op_code` for `version`.
    pub fn decode<C: DataTypeCodec<Descriptor = D>>(
        op_code: OpCode,
        buf: &mut impl Buf,
        version: ProtocolVersion,
        type_codec: &C,
        limits: &DecodeLimits,
    ) -> Result<Self> {
        trace!("decoding {} for {version}", op_code.name());
        let caps = version.capabilities();
        Ok(match op_code {
            OpCode::Startup => Message::Startup(Startup::read(buf, limits)?),
            OpCode::Ready => Message::Ready,
            OpCode::Authenticate => Message::Authenticate(Authenticate::read(buf, limits)?),
            OpCode::Options => Message::Options,
            OpCode::Supported => Message::Supported(Supported::read(buf, limits)?),
            OpCode::Query => Message::Query(Query::read(buf, version, limits)?),
            OpCode::Result => Message::Result(ResultPayload::read(buf, &caps, type_codec, limits)?),
            OpCode::Prepare => Message::Prepare(Prepare::read(buf, &caps, limits)?),
            OpCode::Execute => Message::Execute(Execute::read(buf, version, limits)?),
            OpCode::Register => Message::Register(Register::read(buf, limits)?),
            OpCode::Event => Message::Event(EventPayload::read(buf, &caps, limits)?),
            OpCode::Batch => Message::Batch(BatchMessage::read(buf, version, limits)?),
            OpCode::AuthChallenge => Message::AuthChallenge(AuthChallenge::read(buf, limits)?),
            OpCode::AuthResponse => Message::AuthResponse(AuthResponse::read(buf, limits)?),
            OpCode::AuthSuccess => Message::AuthSuccess(AuthSuccess::read(buf, limits)?),
            OpCode::Revise => Message::Revise(Revise::read(buf, &caps)?),
            OpCode::Error => Message::Error(ErrorMessage::read(buf, &caps, limits)?),
        })
    }
}

impl<D> fmt::Display for Message<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.op_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::OpaqueDataType;

    #[test]
    fn ready_is_a_response_with_the_ready_opcode() {
        let message: Message<OpaqueDataType> = Message::Ready;
        assert_eq!(message.op_code(), OpCode::Ready);
        assert!(message.is_response());
    }

    #[test]
    fn query_is_a_request() {
        let message: Message<OpaqueDataType> = Message::Query(Query {
            query: "SELECT 1".to_string(),
            options: crate::query_options::QueryOptions {
                consistency: crate::enums::ConsistencyLevel::One,
                values: crate::query_options::QueryValues::None,
                skip_metadata: false,
                page_size: None,
                page_size_in_bytes: false,
                paging_state: None,
                serial_consistency: None,
                default_timestamp: None,
                keyspace: None,
                now_in_seconds: None,
                continuous_paging: None,
            },
        });
        assert_eq!(message.op_code(), OpCode::Query);
        assert!(!message.is_response());
    }

    #[test]
    fn encode_then_decode_round_trips_a_ready_message() {
        let caps = ProtocolVersion::V4.capabilities();
        let codec = crate::datatype::OpaqueDataTypeCodec;
        let limits = DecodeLimits::default();
        let message: Message<crate::datatype::OpaqueDataType> = Message::Ready;
        let mut buf = Vec::new();
        message.encode(&mut buf, &caps, &codec).unwrap();
        assert_eq!(message.encoded_len(&caps, &codec).unwrap(), buf.len());
        let mut slice = &buf[..];
        let decoded =
            Message::decode(OpCode::Ready, &mut slice, ProtocolVersion::V4, &codec, &limits)
                .unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn variant_name_matches_op_code_name() {
        let message: Message<OpaqueDataType> = Message::Ready;
        assert_eq!(message.variant_name(), "Ready");
    }

    #[test]
    fn cloning_a_message_deep_clones_its_payload() {
        let original: Message<OpaqueDataType> = Message::Startup(Startup {
            options: std::collections::HashMap::from([(
                "CQL_VERSION".to_string(),
                "3.0.0".to_string(),
            )]),
        });
        let mut cloned = original.clone();
        if let Message::Startup(startup) = &mut cloned {
            startup.options.insert("COMPRESSION".to_string(), "lz4".to_string());
        }
        match (&original, &cloned) {
            (Message::Startup(a), Message::Startup(b)) => assert_ne!(a.options, b.options),
            _ => panic!("expected Startup variants"),
        }
    }
}
