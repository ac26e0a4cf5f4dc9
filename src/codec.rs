//! A polymorphic [`Codec`] shape and an `OpCode -> Codec` lookup table.
//!
//! [`Message`] already carries its own `encode`/`encoded_len`/`decode`
//! dispatch, matched over its variants. This module wraps that dispatch
//! behind one codec per opcode, for callers who hold an [`OpCode`] (read off
//! a frame header) before they know which [`Message`] variant they're
//! about to produce or consume. The registry is a plain `HashMap` built
//! once by [`CodecRegistry::new`] and never mutated afterwards; there is
//! no global or lazily-initialized state.

use std::collections::HashMap;
use std::fmt;

use bytes::{Buf, BufMut};
use log::warn;

use crate::datatype::DataTypeCodec;
use crate::enums::OpCode;
use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::message::Message;
use crate::version::{ProtocolVersion, VersionCapabilities};

/// Encodes, measures, and decodes the [`Message`] variant for one
/// [`OpCode`].
///
/// Implementations assert that the `message` they're handed actually
/// carries their opcode, surfacing a mismatch as
/// [`ProtocolError::TypeMismatch`] rather than silently encoding the wrong
/// shape. `decode` has no such check to make: it builds the variant itself.
pub trait Codec<D> {
    /// The opcode this codec handles.
    fn op_code(&self) -> OpCode;

    /// Encode `message`'s body.
    fn encode(
        &self,
        message: &Message<D>,
        buf: &mut dyn BufMut,
        caps: &VersionCapabilities,
        type_codec: &dyn DataTypeCodec<Descriptor = D>,
    ) -> Result<()>;

    /// Byte length `encode` would produce for `message`.
    fn encoded_length(
        &self,
        message: &Message<D>,
        caps: &VersionCapabilities,
        type_codec: &dyn DataTypeCodec<Descriptor = D>,
    ) -> Result<usize>;

    /// Decode a message body for `version`.
    fn decode(
        &self,
        buf: &mut dyn Buf,
        version: ProtocolVersion,
        type_codec: &dyn DataTypeCodec<Descriptor = D>,
        limits: &DecodeLimits,
    ) -> Result<Message<D>>;
}

impl<D> fmt::Debug for dyn Codec<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec").field("op_code", &self.op_code()).finish()
    }
}

fn mismatch<D>(expected: OpCode, message: &Message<D>) -> ProtocolError {
    warn!("codec for {} handed a {} message", expected.name(), message.variant_name());
    ProtocolError::TypeMismatch { expected: expected.name(), actual: message.variant_name() }
}

macro_rules! message_codec {
    ($name:ident, $op:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl<D> Codec<D> for $name {
            fn op_code(&self) -> OpCode {
                $op
            }

            fn encode(
                &self,
                message: &Message<D>,
                buf: &mut dyn BufMut,
                caps: &VersionCapabilities,
                type_codec: &dyn DataTypeCodec<Descriptor = D>,
            ) -> Result<()> {
                if message.op_code() != $op {
                    return Err(mismatch($op, message));
                }
                message.encode(buf, caps, type_codec)
            }

            fn encoded_length(
                &self,
                message: &Message<D>,
                caps: &VersionCapabilities,
                type_codec: &dyn DataTypeCodec<Descriptor = D>,
            ) -> Result<usize> {
                if message.op_code() != $op {
                    return Err(mismatch($op, message));
                }
                message.encoded_len(caps, type_codec)
            }

            fn decode(
                &self,
                buf: &mut dyn Buf,
                version: ProtocolVersion,
                type_codec: &dyn DataTypeCodec<Descriptor = D>,
                limits: &DecodeLimits,
            ) -> Result<Message<D>> {
                Message::decode($op, buf, version, type_codec, limits)
            }
        }
    };
}

message_codec!(StartupCodec, OpCode::Startup, "Codec for `Startup` requests.");
message_codec!(ReadyCodec, OpCode::Ready, "Codec for `Ready` responses.");
message_codec!(AuthenticateCodec, OpCode::Authenticate, "Codec for `Authenticate` responses.");
message_codec!(OptionsCodec, OpCode::Options, "Codec for `Options` requests.");
message_codec!(SupportedCodec, OpCode::Supported, "Codec for `Supported` responses.");
message_codec!(QueryCodec, OpCode::Query, "Codec for `Query` requests.");
message_codec!(ResultCodec, OpCode::Result, "Codec for `Result` responses.");
message_codec!(PrepareCodec, OpCode::Prepare, "Codec for `Prepare` requests.");
message_codec!(ExecuteCodec, OpCode::Execute, "Codec for `Execute` requests.");
message_codec!(RegisterCodec, OpCode::Register, "Codec for `Register` requests.");
message_codec!(EventCodec, OpCode::Event, "Codec for `Event` responses.");
message_codec!(BatchCodec, OpCode::Batch, "Codec for `Batch` requests.");
message_codec!(AuthChallengeCodec, OpCode::AuthChallenge, "Codec for `AuthChallenge` responses.");
message_codec!(AuthResponseCodec, OpCode::AuthResponse, "Codec for `AuthResponse` requests.");
message_codec!(AuthSuccessCodec, OpCode::AuthSuccess, "Codec for `AuthSuccess` responses.");
message_codec!(ReviseCodec, OpCode::Revise, "Codec for `Revise` requests (DSE only).");
message_codec!(ErrorCodec, OpCode::Error, "Codec for `Error` responses.");

/// An immutable `OpCode -> Codec` lookup table covering every opcode this
/// crate defines.
///
/// Built once with [`CodecRegistry::new`] (or `default()`) and shared
/// thereafter; there is no method to mutate a registry once constructed.
pub struct CodecRegistry<D> {
    codecs: HashMap<OpCode, Box<dyn Codec<D>>>,
}

impl<D: 'static> CodecRegistry<D> {
    /// Build a registry covering every opcode this crate defines.
    pub fn new() -> Self {
        let mut codecs: HashMap<OpCode, Box<dyn Codec<D>>> = HashMap::new();
        codecs.insert(OpCode::Startup, Box::new(StartupCodec));
        codecs.insert(OpCode::Ready, Box::new(ReadyCodec));
        codecs.insert(OpCode::Authenticate, Box::new(AuthenticateCodec));
        codecs.insert(OpCode::Options, Box::new(OptionsCodec));
        codecs.insert(OpCode::Supported, Box::new(SupportedCodec));
        codecs.insert(OpCode::Query, Box::new(QueryCodec));
        codecs.insert(OpCode::Result, Box::new(ResultCodec));
        codecs.insert(OpCode::Prepare, Box::new(PrepareCodec));
        codecs.insert(OpCode::Execute, Box::new(ExecuteCodec));
        codecs.insert(OpCode::Register, Box::new(RegisterCodec));
        codecs.insert(OpCode::Event, Box::new(EventCodec));
        codecs.insert(OpCode::Batch, Box::new(BatchCodec));
        codecs.insert(OpCode::AuthChallenge, Box::new(AuthChallengeCodec));
        codecs.insert(OpCode::AuthResponse, Box::new(AuthResponseCodec));
        codecs.insert(OpCode::AuthSuccess, Box::new(AuthSuccessCodec));
        codecs.insert(OpCode::Revise, Box::new(ReviseCodec));
        codecs.insert(OpCode::Error, Box::new(ErrorCodec));
        CodecRegistry { codecs }
    }

    /// Look up the codec for `op_code`, if one is registered.
    ///
    /// Every [`OpCode`] this crate defines is registered by `new`, so this
    /// only returns `None` for a registry a caller built by hand and left
    /// incomplete.
    pub fn get(&self, op_code: OpCode) -> Option<&dyn Codec<D>> {
        self.codecs.get(&op_code).map(|c| c.as_ref())
    }
}

impl<D: 'static> Default for CodecRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{OpaqueDataType, OpaqueDataTypeCodec};
    use crate::messages::Startup;

    #[test]
    fn registry_covers_every_opcode() {
        let registry: CodecRegistry<OpaqueDataType> = CodecRegistry::new();
        for op in [
            OpCode::Error,
            OpCode::Startup,
            OpCode::Ready,
            OpCode::Authenticate,
            OpCode::Options,
            OpCode::Supported,
            OpCode::Query,
            OpCode::Result,
            OpCode::Prepare,
            OpCode::Execute,
            OpCode::Register,
            OpCode::Event,
            OpCode::Batch,
            OpCode::AuthChallenge,
            OpCode::AuthResponse,
            OpCode::AuthSuccess,
            OpCode::Revise,
        ] {
            let found = registry.get(op).expect("every opcode is registered");
            assert_eq!(found.op_code(), op);
        }
    }

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn startup_codec_round_trips_through_the_registry() {
        init_logging();
        let registry: CodecRegistry<OpaqueDataType> = CodecRegistry::new();
        let codec = registry.get(OpCode::Startup).unwrap();
        let caps = ProtocolVersion::V4.capabilities();
        let type_codec = OpaqueDataTypeCodec;
        let limits = DecodeLimits::default();
        let message = Message::Startup(Startup {
            options: std::collections::HashMap::from([(
                "CQL_VERSION".to_string(),
                "3.0.0".to_string(),
            )]),
        });

        let mut buf = Vec::new();
        codec.encode(&message, &mut buf, &caps, &type_codec).unwrap();
        assert_eq!(codec.encoded_length(&message, &caps, &type_codec).unwrap(), buf.len());

        let mut slice = &buf[..];
        let decoded =
            codec.decode(&mut slice, ProtocolVersion::V4, &type_codec, &limits).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn codec_rejects_a_message_of_the_wrong_variant() {
        init_logging();
        let codec = QueryCodec;
        let caps = ProtocolVersion::V4.capabilities();
        let type_codec = OpaqueDataTypeCodec;
        let message: Message<OpaqueDataType> = Message::Ready;
        let mut buf = Vec::new();
        let err = codec.encode(&message, &mut buf, &caps, &type_codec).unwrap_err();
        match err {
            ProtocolError::TypeMismatch { expected, actual } => {
                assert_eq!(expected, "Query");
                assert_eq!(actual, "Ready");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }
}
