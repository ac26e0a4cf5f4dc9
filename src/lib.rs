//! Wire codec for the Cassandra native protocol: versions v2 through v5,
//! plus the DataStax Enterprise `DSE_V1`/`DSE_V2` dialects.
//!
//! This crate covers the frame *body* — serializing and parsing the
//! request/response structures the protocol defines — and nothing above
//! or below that seam. It does not open sockets, frame/compress/checksum
//! the outer envelope, negotiate a protocol version, pool connections, or
//! interpret CQL result rows beyond treating each cell as an opaque
//! `[bytes]`. Column data-type interpretation is delegated entirely to a
//! caller-supplied [`datatype::DataTypeCodec`].
//!
//! Start at [`message::Message`], the closed sum type over every request
//! and response this crate knows how to encode or decode, and
//! [`version::ProtocolVersion`]/[`version::VersionCapabilities`], which
//! describe how the six dialects differ. [`codec::CodecRegistry`] is the
//! `OpCode -> Codec` lookup table for callers who read an opcode off a
//! frame header before knowing which message variant will follow.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Batch-child entries (query string or prepared-statement id, plus bound
/// values) shared by `Batch` requests.
pub mod batch;
/// A polymorphic [`codec::Codec`] trait and the `OpCode -> Codec` registry.
pub mod codec;
/// DSE continuous-paging options shared by query options and `Revise`.
pub mod continuous_paging;
/// The [`datatype::DataTypeCodec`] seam: how this crate delegates CQL
/// column data-type interpretation to its caller.
pub mod datatype;
/// Wire-level enumerations: opcodes, consistency levels, error codes, and
/// the rest of the protocol's closed vocabularies.
pub mod enums;
/// [`error::ProtocolError`], the single error type returned throughout.
pub mod error;
/// [`limits::DecodeLimits`], the caller-tunable bounds on untrusted
/// collection and blob lengths.
pub mod limits;
/// [`message::Message`], the closed sum type over every request/response.
pub mod message;
/// One module per message body.
pub mod messages;
/// Primitive wire types: `[int]`, `[string]`, `[bytes]`, `[uuid]`, and the
/// rest of the protocol's base vocabulary.
pub mod primitives;
/// `QUERY`/`EXECUTE`/`BATCH` shared options and their version-dependent
/// flag layout.
pub mod query_options;
/// Result-set and prepared-statement metadata: column specs, paging
/// state, and the flags governing their wire layout.
pub mod result_metadata;
/// The `SchemaChange` payload shared by `Result` and `Event`.
pub mod schema_change;
/// [`version::ProtocolVersion`] and [`version::VersionCapabilities`].
pub mod version;

pub use codec::{Codec, CodecRegistry};
pub use datatype::{DataTypeCodec, OpaqueDataType, OpaqueDataTypeCodec};
pub use enums::OpCode;
pub use error::{ProtocolError, Result};
pub use limits::DecodeLimits;
pub use message::Message;
pub use version::{ProtocolVersion, VersionCapabilities};
