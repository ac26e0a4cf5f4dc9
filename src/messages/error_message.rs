//! `Error` response: the outcome of any request the server could not
//! service, keyed by an `[int]` code whose value selects the payload
//! shape below it.

use std::net::IpAddr;

use bytes::{Buf, BufMut};

use crate::enums::{ConsistencyLevel, ErrorCode, WriteType};
use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::primitives::{
    encoded_len_reason_map, encoded_len_short_bytes, encoded_len_string, encoded_len_string_list,
    read_byte, read_int, read_reason_map, read_short, read_short_bytes, read_string,
    read_string_list, write_byte, write_int, write_reason_map, write_short, write_short_bytes,
    write_string, write_string_list,
};
use crate::version::VersionCapabilities;

/// Per-replica failure reasons, V5/DSE_V2; a bare failure count otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureDetail {
    /// `[int] numFailures` (pre-V5).
    Count(i32),
    /// `[reason map]` (V5/DSE_V2).
    Reasons(Vec<(IpAddr, u16)>),
}

/// The code-specific tail of an error payload. Unit variants carry no
/// fields beyond `code` and `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// `SERVER_ERROR`, `PROTOCOL_ERROR`, `AUTHENTICATION_ERROR`,
    /// `OVERLOADED`, `IS_BOOTSTRAPPING`, `TRUNCATE_ERROR`, `SYNTAX_ERROR`,
    /// `UNAUTHORIZED`, `INVALID`, `CONFIG_ERROR`: nothing beyond the
    /// message.
    None,
    /// `UNAVAILABLE`.
    Unavailable {
        /// Consistency level requested.
        consistency: ConsistencyLevel,
        /// Replicas required to satisfy it.
        required: i32,
        /// Replicas actually known alive.
        alive: i32,
    },
    /// `WRITE_TIMEOUT`.
    WriteTimeout {
        /// Consistency level requested.
        consistency: ConsistencyLevel,
        /// Replicas that acknowledged before the timeout.
        received: i32,
        /// Replicas required to satisfy `consistency`.
        block_for: i32,
        /// What kind of write timed out.
        write_type: WriteType,
        /// CAS contentions encountered, V5/DSE_V2 and `write_type == Cas`
        /// only.
        contentions: Option<i32>,
    },
    /// `READ_TIMEOUT`.
    ReadTimeout {
        /// Consistency level requested.
        consistency: ConsistencyLevel,
        /// Replicas that responded before the timeout.
        received: i32,
        /// Replicas required to satisfy `consistency`.
        block_for: i32,
        /// Whether the replica holding data responded in time.
        data_present: bool,
    },
    /// `READ_FAILURE`.
    ReadFailure {
        /// Consistency level requested.
        consistency: ConsistencyLevel,
        /// Replicas that responded without failing.
        received: i32,
        /// Replicas required to satisfy `consistency`.
        block_for: i32,
        /// Replicas that failed, and why (V5/DSE_V2).
        failures: FailureDetail,
        /// Whether the replica holding data responded without failing.
        data_present: bool,
    },
    /// `WRITE_FAILURE`.
    WriteFailure {
        /// Consistency level requested.
        consistency: ConsistencyLevel,
        /// Replicas that acknowledged without failing.
        received: i32,
        /// Replicas required to satisfy `consistency`.
        block_for: i32,
        /// Replicas that failed, and why (V5/DSE_V2).
        failures: FailureDetail,
        /// What kind of write failed.
        write_type: WriteType,
    },
    /// `FUNCTION_FAILURE`.
    FunctionFailure {
        /// Owning keyspace of the function.
        keyspace: String,
        /// Function name.
        function: String,
        /// Argument CQL type names, as declared.
        arg_types: Vec<String>,
    },
    /// `UNPREPARED`.
    Unprepared {
        /// Id the server no longer recognizes.
        unknown_id: Vec<u8>,
    },
    /// `ALREADY_EXISTS`.
    AlreadyExists {
        /// Keyspace that already exists, or that owns the existing table.
        keyspace: String,
        /// Table that already exists, empty when the conflict is the
        /// keyspace itself.
        table: String,
    },
}

/// `[int] code, [string] message`, then a code-specific tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Selects the payload shape of `detail`.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Code-specific fields.
    pub detail: ErrorDetail,
}

fn mismatch(code: ErrorCode, expected: &'static str) -> ProtocolError {
    ProtocolError::FieldPreconditionFailed(format!(
        "error.detail: code {code:?} requires a {expected} detail"
    ))
}

impl ErrorMessage {
    /// Decode an error response. An unrecognized code fails the whole
    /// decode without consuming any payload beyond the header the caller
    /// already read.
    pub fn read(buf: &mut impl Buf, caps: &VersionCapabilities, limits: &DecodeLimits) -> Result<Self> {
        let code = ErrorCode::from_wire(read_int(buf)?)?;
        let message = read_string(buf, limits)?;
        let detail = match code {
            ErrorCode::ServerError
            | ErrorCode::ProtocolError
            | ErrorCode::AuthenticationError
            | ErrorCode::Overloaded
            | ErrorCode::IsBootstrapping
            | ErrorCode::TruncateError
            | ErrorCode::SyntaxError
            | ErrorCode::Unauthorized
            | ErrorCode::Invalid
            | ErrorCode::ConfigError => ErrorDetail::None,
            ErrorCode::Unavailable => ErrorDetail::Unavailable {
                consistency: ConsistencyLevel::from_wire(read_short(buf)?)?,
                required: read_int(buf)?,
                alive: read_int(buf)?,
            },
            ErrorCode::WriteTimeout => {
                let consistency = ConsistencyLevel::from_wire(read_short(buf)?)?;
                let received = read_int(buf)?;
                let block_for = read_int(buf)?;
                let write_type = WriteType::from_wire(&read_string(buf, limits)?)?;
                let contentions = if caps.write_timeout_contentions && write_type == WriteType::Cas
                {
                    Some(i32::from(read_short(buf)?))
                } else {
                    None
                };
                ErrorDetail::WriteTimeout {
                    consistency,
                    received,
                    block_for,
                    write_type,
                    contentions,
                }
            }
            ErrorCode::ReadTimeout => ErrorDetail::ReadTimeout {
                consistency: ConsistencyLevel::from_wire(read_short(buf)?)?,
                received: read_int(buf)?,
                block_for: read_int(buf)?,
                data_present: read_byte(buf)? != 0,
            },
            ErrorCode::ReadFailure => {
                let consistency = ConsistencyLevel::from_wire(read_short(buf)?)?;
                let received = read_int(buf)?;
                let block_for = read_int(buf)?;
                let failures = if caps.failure_reason_map {
                    FailureDetail::Reasons(read_reason_map(buf, limits)?)
                } else {
                    FailureDetail::Count(read_int(buf)?)
                };
                let data_present = read_byte(buf)? != 0;
                ErrorDetail::ReadFailure {
                    consistency,
                    received,
                    block_for,
                    failures,
                    data_present,
                }
            }
            ErrorCode::WriteFailure => {
                let consistency = ConsistencyLevel::from_wire(read_short(buf)?)?;
                let received = read_int(buf)?;
                let block_for = read_int(buf)?;
                let failures = if caps.failure_reason_map {
                    FailureDetail::Reasons(read_reason_map(buf, limits)?)
                } else {
                    FailureDetail::Count(read_int(buf)?)
                };
                let write_type = WriteType::from_wire(&read_string(buf, limits)?)?;
                ErrorDetail::WriteFailure {
                    consistency,
                    received,
                    block_for,
                    failures,
                    write_type,
                }
            }
            ErrorCode::FunctionFailure => ErrorDetail::FunctionFailure {
                keyspace: read_string(buf, limits)?,
                function: read_string(buf, limits)?,
                arg_types: read_string_list(buf, limits)?,
            },
            ErrorCode::Unprepared => ErrorDetail::Unprepared {
                unknown_id: read_short_bytes(buf, limits)?,
            },
            ErrorCode::AlreadyExists => ErrorDetail::AlreadyExists {
                keyspace: read_string(buf, limits)?,
                table: read_string(buf, limits)?,
            },
        };
        Ok(ErrorMessage {
            code,
            message,
            detail,
        })
    }

    /// Encode an error response.
    pub fn write(&self, buf: &mut impl BufMut, caps: &VersionCapabilities) -> Result<()> {
        write_int(buf, self.code.to_wire());
        write_string(buf, &self.message);
        match (&self.detail, self.code) {
            (
                ErrorDetail::None,
                ErrorCode::ServerError
                | ErrorCode::ProtocolError
                | ErrorCode::AuthenticationError
                | ErrorCode::Overloaded
                | ErrorCode::IsBootstrapping
                | ErrorCode::TruncateError
                | ErrorCode::SyntaxError
                | ErrorCode::Unauthorized
                | ErrorCode::Invalid
                | ErrorCode::ConfigError,
            ) => {}
            (
                ErrorDetail::Unavailable {
                    consistency,
                    required,
                    alive,
                },
                ErrorCode::Unavailable,
            ) => {
                write_short(buf, consistency.to_wire());
                write_int(buf, *required);
                write_int(buf, *alive);
            }
            (
                ErrorDetail::WriteTimeout {
                    consistency,
                    received,
                    block_for,
                    write_type,
                    contentions,
                },
                ErrorCode::WriteTimeout,
            ) => {
                if contentions.is_some()
                    && !(caps.write_timeout_contentions && *write_type == WriteType::Cas)
                {
                    return Err(ProtocolError::precondition(
                        "error.write_timeout.contentions",
                        "only valid on V5/DSE_V2 with write_type CAS",
                    ));
                }
                write_short(buf, consistency.to_wire());
                write_int(buf, *received);
                write_int(buf, *block_for);
                write_string(buf, write_type.to_wire());
                if let Some(contentions) = contentions {
                    write_short(buf, *contentions as u16);
                }
            }
            (
                ErrorDetail::ReadTimeout {
                    consistency,
                    received,
                    block_for,
                    data_present,
                },
                ErrorCode::ReadTimeout,
            ) => {
                write_short(buf, consistency.to_wire());
                write_int(buf, *received);
                write_int(buf, *block_for);
                write_byte(buf, u8::from(*data_present));
            }
            (
                ErrorDetail::ReadFailure {
                    consistency,
                    received,
                    block_for,
                    failures,
                    data_present,
                },
                ErrorCode::ReadFailure,
            ) => {
                check_failure_shape(failures, caps)?;
                write_short(buf, consistency.to_wire());
                write_int(buf, *received);
                write_int(buf, *block_for);
                write_failures(buf, failures);
                write_byte(buf, u8::from(*data_present));
            }
            (
                ErrorDetail::WriteFailure {
                    consistency,
                    received,
                    block_for,
                    failures,
                    write_type,
                },
                ErrorCode::WriteFailure,
            ) => {
                check_failure_shape(failures, caps)?;
                write_short(buf, consistency.to_wire());
                write_int(buf, *received);
                write_int(buf, *block_for);
                write_failures(buf, failures);
                write_string(buf, write_type.to_wire());
            }
            (
                ErrorDetail::FunctionFailure {
                    keyspace,
                    function,
                    arg_types,
                },
                ErrorCode::FunctionFailure,
            ) => {
                write_string(buf, keyspace);
                write_string(buf, function);
                write_string_list(buf, arg_types);
            }
            (ErrorDetail::Unprepared { unknown_id }, ErrorCode::Unprepared) => {
                write_short_bytes(buf, unknown_id);
            }
            (ErrorDetail::AlreadyExists { keyspace, table }, ErrorCode::AlreadyExists) => {
                write_string(buf, keyspace);
                write_string(buf, table);
            }
            (_, code) => return Err(mismatch(code, detail_shape_name(&self.detail))),
        }
        Ok(())
    }

    /// Byte length of the encoded error.
    pub fn encoded_len(&self, caps: &VersionCapabilities) -> Result<usize> {
        let mut len = 4 + encoded_len_string(&self.message);
        len += match (&self.detail, self.code) {
            (
                ErrorDetail::None,
                ErrorCode::ServerError
                | ErrorCode::ProtocolError
                | ErrorCode::AuthenticationError
                | ErrorCode::Overloaded
                | ErrorCode::IsBootstrapping
                | ErrorCode::TruncateError
                | ErrorCode::SyntaxError
                | ErrorCode::Unauthorized
                | ErrorCode::Invalid
                | ErrorCode::ConfigError,
            ) => 0,
            (ErrorDetail::Unavailable { .. }, ErrorCode::Unavailable) => 2 + 4 + 4,
            (
                ErrorDetail::WriteTimeout {
                    write_type,
                    contentions,
                    ..
                },
                ErrorCode::WriteTimeout,
            ) => {
                if contentions.is_some()
                    && !(caps.write_timeout_contentions && *write_type == WriteType::Cas)
                {
                    return Err(ProtocolError::precondition(
                        "error.write_timeout.contentions",
                        "only valid on V5/DSE_V2 with write_type CAS",
                    ));
                }
                2 + 4 + 4 + encoded_len_string(write_type.to_wire())
                    + contentions.map_or(0, |_| 2)
            }
            (ErrorDetail::ReadTimeout { .. }, ErrorCode::ReadTimeout) => 2 + 4 + 4 + 1,
            (ErrorDetail::ReadFailure { failures, .. }, ErrorCode::ReadFailure) => {
                check_failure_shape(failures, caps)?;
                2 + 4 + 4 + failures_encoded_len(failures) + 1
            }
            (
                ErrorDetail::WriteFailure {
                    failures,
                    write_type,
                    ..
                },
                ErrorCode::WriteFailure,
            ) => {
                check_failure_shape(failures, caps)?;
                2 + 4 + 4 + failures_encoded_len(failures) + encoded_len_string(write_type.to_wire())
            }
            (
                ErrorDetail::FunctionFailure {
                    keyspace,
                    function,
                    arg_types,
                },
                ErrorCode::FunctionFailure,
            ) => {
                encoded_len_string(keyspace)
                    + encoded_len_string(function)
                    + encoded_len_string_list(arg_types)
            }
            (ErrorDetail::Unprepared { unknown_id }, ErrorCode::Unprepared) => {
                encoded_len_short_bytes(unknown_id)
            }
            (ErrorDetail::AlreadyExists { keyspace, table }, ErrorCode::AlreadyExists) => {
                encoded_len_string(keyspace) + encoded_len_string(table)
            }
            (_, code) => return Err(mismatch(code, detail_shape_name(&self.detail))),
        };
        Ok(len)
    }
}

fn check_failure_shape(failures: &FailureDetail, caps: &VersionCapabilities) -> Result<()> {
    let wants_reasons = matches!(failures, FailureDetail::Reasons(_));
    if wants_reasons != caps.failure_reason_map {
        return Err(ProtocolError::UnsupportedForVersion {
            field: "error.failures",
            version: caps.version,
        });
    }
    Ok(())
}

fn write_failures(buf: &mut impl BufMut, failures: &FailureDetail) {
    match failures {
        FailureDetail::Count(n) => write_int(buf, *n),
        FailureDetail::Reasons(reasons) => write_reason_map(buf, reasons),
    }
}

fn failures_encoded_len(failures: &FailureDetail) -> usize {
    match failures {
        FailureDetail::Count(_) => 4,
        FailureDetail::Reasons(reasons) => encoded_len_reason_map(reasons),
    }
}

fn detail_shape_name(detail: &ErrorDetail) -> &'static str {
    match detail {
        ErrorDetail::None => "None",
        ErrorDetail::Unavailable { .. } => "Unavailable",
        ErrorDetail::WriteTimeout { .. } => "WriteTimeout",
        ErrorDetail::ReadTimeout { .. } => "ReadTimeout",
        ErrorDetail::ReadFailure { .. } => "ReadFailure",
        ErrorDetail::WriteFailure { .. } => "WriteFailure",
        ErrorDetail::FunctionFailure { .. } => "FunctionFailure",
        ErrorDetail::Unprepared { .. } => "Unprepared",
        ErrorDetail::AlreadyExists { .. } => "AlreadyExists",
    }
}
