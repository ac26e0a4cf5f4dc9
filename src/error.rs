//! Error types for the Cassandra native protocol codec.
//!
//! This module provides a single consolidated error type returned by every
//! `encode`/`decode` call in the crate. Each variant names the field (and,
//! where relevant, the protocol version) involved so a caller can log a
//! useful diagnostic without re-deriving context from a byte offset.

use std::io;

use crate::version::ProtocolVersion;

/// Result type used throughout the codec.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Error type returned by encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The message value handed to a codec's `encode` is a different
    /// variant than the codec expects.
    #[error("type mismatch: codec for {expected} received {actual}")]
    TypeMismatch {
        /// Variant name the codec expects.
        expected: &'static str,
        /// Variant name actually supplied.
        actual: &'static str,
    },

    /// A decoded integer or string tag did not match any member of an
    /// enum validator (consistency level, write type, event type, ...).
    #[error("invalid {enum_name} value: {value}")]
    InvalidEnum {
        /// Name of the enum being validated.
        enum_name: &'static str,
        /// Textual form of the offending raw value.
        value: String,
    },

    /// A field present on the message is not valid for the given
    /// protocol version.
    #[error("{field} is not supported on protocol version {version}")]
    UnsupportedForVersion {
        /// Name of the offending field.
        field: &'static str,
        /// Version that rejected the field.
        version: ProtocolVersion,
    },

    /// A non-version invariant was violated (empty keyspace where
    /// non-empty is required, empty batch children, mismatched
    /// column-count, and so on).
    #[error("{0}")]
    FieldPreconditionFailed(String),

    /// The underlying byte sink or source failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source ended before a declared length was satisfied.
    #[error("short read: needed {needed} more byte(s), {available} available")]
    ShortRead {
        /// Bytes still required to satisfy the declared length.
        needed: usize,
        /// Bytes actually remaining in the source.
        available: usize,
    },

    /// A length prefix exceeds representable bounds, or a declared
    /// count/length would require more bytes than the configured
    /// [`crate::limits::DecodeLimits`] permit.
    #[error("{field} length {length} exceeds the configured limit of {limit}")]
    OverflowedLength {
        /// Name of the length-prefixed field.
        field: &'static str,
        /// Declared length.
        length: i64,
        /// Configured ceiling.
        limit: i64,
    },
}

impl ProtocolError {
    /// Build a [`ProtocolError::FieldPreconditionFailed`] from a field name
    /// and a human-readable reason.
    pub fn precondition(field: &str, reason: impl std::fmt::Display) -> Self {
        ProtocolError::FieldPreconditionFailed(format!("{field}: {reason}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_names_both_variants() {
        let err = ProtocolError::TypeMismatch {
            expected: "Query",
            actual: "Execute",
        };
        assert_eq!(
            err.to_string(),
            "type mismatch: codec for Query received Execute"
        );
    }

    #[test]
    fn unsupported_for_version_names_field_and_version() {
        let err = ProtocolError::UnsupportedForVersion {
            field: "named_values",
            version: ProtocolVersion::V2,
        };
        assert!(err.to_string().contains("named_values"));
        assert!(err.to_string().contains("V2"));
    }
}
