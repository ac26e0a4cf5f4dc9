//! Closed enumerations used across the wire format, each with a validated
//! decode (rejecting unknown wire values with
//! [`ProtocolError::InvalidEnum`]) and a plain encode.

use crate::error::{ProtocolError, Result};

fn invalid<T: std::fmt::Display>(enum_name: &'static str, value: T) -> ProtocolError {
    ProtocolError::InvalidEnum {
        enum_name,
        value: value.to_string(),
    }
}

/// The single-byte type tag identifying a message kind. Routing a decoded
/// frame to its codec is the collaborator's job; this crate only
/// validates and carries the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Error response.
    Error,
    /// Startup request.
    Startup,
    /// Ready response.
    Ready,
    /// Authenticate response.
    Authenticate,
    /// Options request.
    Options,
    /// Supported response.
    Supported,
    /// Query request.
    Query,
    /// Result response.
    Result,
    /// Prepare request.
    Prepare,
    /// Execute request.
    Execute,
    /// Register request.
    Register,
    /// Event response.
    Event,
    /// Batch request.
    Batch,
    /// Auth challenge response.
    AuthChallenge,
    /// Auth response request.
    AuthResponse,
    /// Auth success response.
    AuthSuccess,
    /// Revise request (DSE only).
    Revise,
}

impl OpCode {
    /// Decode the single-byte tag.
    pub fn from_wire(value: u8) -> Result<Self> {
        Ok(match value {
            0x00 => OpCode::Error,
            0x01 => OpCode::Startup,
            0x02 => OpCode::Ready,
            0x03 => OpCode::Authenticate,
            0x05 => OpCode::Options,
            0x06 => OpCode::Supported,
            0x07 => OpCode::Query,
            0x08 => OpCode::Result,
            0x09 => OpCode::Prepare,
            0x0A => OpCode::Execute,
            0x0B => OpCode::Register,
            0x0C => OpCode::Event,
            0x0D => OpCode::Batch,
            0x0E => OpCode::AuthChallenge,
            0x0F => OpCode::AuthResponse,
            0x10 => OpCode::AuthSuccess,
            // Assigned outside the v2-v5 range; DSE reserves this byte for
            // continuous-paging revision requests.
            0x20 => OpCode::Revise,
            other => return Err(invalid("OpCode", other)),
        })
    }

    /// Encode to the single-byte tag.
    pub fn to_wire(self) -> u8 {
        match self {
            OpCode::Error => 0x00,
            OpCode::Startup => 0x01,
            OpCode::Ready => 0x02,
            OpCode::Authenticate => 0x03,
            OpCode::Options => 0x05,
            OpCode::Supported => 0x06,
            OpCode::Query => 0x07,
            OpCode::Result => 0x08,
            OpCode::Prepare => 0x09,
            OpCode::Execute => 0x0A,
            OpCode::Register => 0x0B,
            OpCode::Event => 0x0C,
            OpCode::Batch => 0x0D,
            OpCode::AuthChallenge => 0x0E,
            OpCode::AuthResponse => 0x0F,
            OpCode::AuthSuccess => 0x10,
            OpCode::Revise => 0x20,
        }
    }

    /// Whether this opcode names a response (server-to-client) message.
    pub fn is_response(self) -> bool {
        matches!(
            self,
            OpCode::Error
                | OpCode::Ready
                | OpCode::Authenticate
                | OpCode::Supported
                | OpCode::Result
                | OpCode::Event
                | OpCode::AuthChallenge
                | OpCode::AuthSuccess
        )
    }

    /// The variant's name, as used in error messages and codec labels.
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Error => "Error",
            OpCode::Startup => "Startup",
            OpCode::Ready => "Ready",
            OpCode::Authenticate => "Authenticate",
            OpCode::Options => "Options",
            OpCode::Supported => "Supported",
            OpCode::Query => "Query",
            OpCode::Result => "Result",
            OpCode::Prepare => "Prepare",
            OpCode::Execute => "Execute",
            OpCode::Register => "Register",
            OpCode::Event => "Event",
            OpCode::Batch => "Batch",
            OpCode::AuthChallenge => "AuthChallenge",
            OpCode::AuthResponse => "AuthResponse",
            OpCode::AuthSuccess => "AuthSuccess",
            OpCode::Revise => "Revise",
        }
    }
}

/// `[short]`-encoded consistency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsistencyLevel {
    /// ANY.
    Any,
    /// ONE.
    One,
    /// TWO.
    Two,
    /// THREE.
    Three,
    /// QUORUM.
    Quorum,
    /// ALL.
    All,
    /// LOCAL_QUORUM.
    LocalQuorum,
    /// EACH_QUORUM.
    EachQuorum,
    /// SERIAL.
    Serial,
    /// LOCAL_SERIAL.
    LocalSerial,
    /// LOCAL_ONE.
    LocalOne,
}

impl ConsistencyLevel {
    /// Decode a `[short]` consistency code.
    pub fn from_wire(value: u16) -> Result<Self> {
        Ok(match value {
            0x0000 => ConsistencyLevel::Any,
            0x0001 => ConsistencyLevel::One,
            0x0002 => ConsistencyLevel::Two,
            0x0003 => ConsistencyLevel::Three,
            0x0004 => ConsistencyLevel::Quorum,
            0x0005 => ConsistencyLevel::All,
            0x0006 => ConsistencyLevel::LocalQuorum,
            0x0007 => ConsistencyLevel::EachQuorum,
            0x0008 => ConsistencyLevel::Serial,
            0x0009 => ConsistencyLevel::LocalSerial,
            0x000A => ConsistencyLevel::LocalOne,
            other => return Err(invalid("ConsistencyLevel", other)),
        })
    }

    /// Encode to a `[short]` consistency code.
    pub fn to_wire(self) -> u16 {
        match self {
            ConsistencyLevel::Any => 0x0000,
            ConsistencyLevel::One => 0x0001,
            ConsistencyLevel::Two => 0x0002,
            ConsistencyLevel::Three => 0x0003,
            ConsistencyLevel::Quorum => 0x0004,
            ConsistencyLevel::All => 0x0005,
            ConsistencyLevel::LocalQuorum => 0x0006,
            ConsistencyLevel::EachQuorum => 0x0007,
            ConsistencyLevel::Serial => 0x0008,
            ConsistencyLevel::LocalSerial => 0x0009,
            ConsistencyLevel::LocalOne => 0x000A,
        }
    }
}

/// `[byte]`-encoded batch type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchType {
    /// A logged batch (writes to the batch log first).
    Logged,
    /// An unlogged batch.
    Unlogged,
    /// A counter batch.
    Counter,
}

impl BatchType {
    /// Decode a `[byte]` batch type.
    pub fn from_wire(value: u8) -> Result<Self> {
        Ok(match value {
            0 => BatchType::Logged,
            1 => BatchType::Unlogged,
            2 => BatchType::Counter,
            other => return Err(invalid("BatchType", other)),
        })
    }

    /// Encode to a `[byte]` batch type.
    pub fn to_wire(self) -> u8 {
        match self {
            BatchType::Logged => 0,
            BatchType::Unlogged => 1,
            BatchType::Counter => 2,
        }
    }
}

/// `[int]`-encoded error code, keying the payload layout in an `Error`
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Generic server-side error.
    ServerError,
    /// Malformed frame.
    ProtocolError,
    /// Authentication failed.
    AuthenticationError,
    /// Not enough replicas alive.
    Unavailable,
    /// Node is overloaded.
    Overloaded,
    /// Node is bootstrapping.
    IsBootstrapping,
    /// Error during a truncate.
    TruncateError,
    /// Timeout during a write.
    WriteTimeout,
    /// Timeout during a read.
    ReadTimeout,
    /// Non-timeout failure during a read.
    ReadFailure,
    /// A user-defined function failed.
    FunctionFailure,
    /// Non-timeout failure during a write.
    WriteFailure,
    /// Invalid CQL syntax.
    SyntaxError,
    /// Client lacks permission.
    Unauthorized,
    /// Query is invalid (not a syntax error).
    Invalid,
    /// Invalid configuration.
    ConfigError,
    /// Keyspace or table already exists.
    AlreadyExists,
    /// Prepared statement id is unknown.
    Unprepared,
}

impl ErrorCode {
    /// Decode an `[int]` error code.
    pub fn from_wire(value: i32) -> Result<Self> {
        Ok(match value {
            0x0000 => ErrorCode::ServerError,
            0x000A => ErrorCode::ProtocolError,
            0x0100 => ErrorCode::AuthenticationError,
            0x1000 => ErrorCode::Unavailable,
            0x1001 => ErrorCode::Overloaded,
            0x1002 => ErrorCode::IsBootstrapping,
            0x1003 => ErrorCode::TruncateError,
            0x1100 => ErrorCode::WriteTimeout,
            0x1200 => ErrorCode::ReadTimeout,
            0x1300 => ErrorCode::ReadFailure,
            0x1400 => ErrorCode::FunctionFailure,
            0x1500 => ErrorCode::WriteFailure,
            0x2000 => ErrorCode::SyntaxError,
            0x2100 => ErrorCode::Unauthorized,
            0x2200 => ErrorCode::Invalid,
            0x2300 => ErrorCode::ConfigError,
            0x2400 => ErrorCode::AlreadyExists,
            0x2500 => ErrorCode::Unprepared,
            other => return Err(invalid("ErrorCode", other)),
        })
    }

    /// Encode to an `[int]` error code.
    pub fn to_wire(self) -> i32 {
        match self {
            ErrorCode::ServerError => 0x0000,
            ErrorCode::ProtocolError => 0x000A,
            ErrorCode::AuthenticationError => 0x0100,
            ErrorCode::Unavailable => 0x1000,
            ErrorCode::Overloaded => 0x1001,
            ErrorCode::IsBootstrapping => 0x1002,
            ErrorCode::TruncateError => 0x1003,
            ErrorCode::WriteTimeout => 0x1100,
            ErrorCode::ReadTimeout => 0x1200,
            ErrorCode::ReadFailure => 0x1300,
            ErrorCode::FunctionFailure => 0x1400,
            ErrorCode::WriteFailure => 0x1500,
            ErrorCode::SyntaxError => 0x2000,
            ErrorCode::Unauthorized => 0x2100,
            ErrorCode::Invalid => 0x2200,
            ErrorCode::ConfigError => 0x2300,
            ErrorCode::AlreadyExists => 0x2400,
            ErrorCode::Unprepared => 0x2500,
        }
    }
}

/// `[string]`-encoded event type named in a `Register` request and an
/// `Event` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Keyspace/table/type/function/aggregate changes.
    SchemaChange,
    /// Node up/down.
    StatusChange,
    /// Node added/removed/moved.
    TopologyChange,
}

impl EventType {
    /// Decode a `[string]` event type name.
    pub fn from_wire(value: &str) -> Result<Self> {
        Ok(match value {
            "SCHEMA_CHANGE" => EventType::SchemaChange,
            "STATUS_CHANGE" => EventType::StatusChange,
            "TOPOLOGY_CHANGE" => EventType::TopologyChange,
            other => return Err(invalid("EventType", other)),
        })
    }

    /// Encode to the `[string]` event type name.
    pub fn to_wire(self) -> &'static str {
        match self {
            EventType::SchemaChange => "SCHEMA_CHANGE",
            EventType::StatusChange => "STATUS_CHANGE",
            EventType::TopologyChange => "TOPOLOGY_CHANGE",
        }
    }
}

/// `[string]`-encoded kind of schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaChangeType {
    /// Object created.
    Created,
    /// Object altered.
    Updated,
    /// Object dropped.
    Dropped,
}

impl SchemaChangeType {
    /// Decode a `[string]` schema-change-type name.
    pub fn from_wire(value: &str) -> Result<Self> {
        Ok(match value {
            "CREATED" => SchemaChangeType::Created,
            "UPDATED" => SchemaChangeType::Updated,
            "DROPPED" => SchemaChangeType::Dropped,
            other => return Err(invalid("SchemaChangeType", other)),
        })
    }

    /// Encode to the `[string]` schema-change-type name.
    pub fn to_wire(self) -> &'static str {
        match self {
            SchemaChangeType::Created => "CREATED",
            SchemaChangeType::Updated => "UPDATED",
            SchemaChangeType::Dropped => "DROPPED",
        }
    }
}

/// `[string]`-encoded kind of schema object a change targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaChangeTarget {
    /// A keyspace.
    Keyspace,
    /// A table.
    Table,
    /// A user-defined type.
    Type,
    /// A user-defined function (v4+).
    Function,
    /// A user-defined aggregate (v4+).
    Aggregate,
}

impl SchemaChangeTarget {
    /// Decode a `[string]` schema-change-target name.
    pub fn from_wire(value: &str) -> Result<Self> {
        Ok(match value {
            "KEYSPACE" => SchemaChangeTarget::Keyspace,
            "TABLE" => SchemaChangeTarget::Table,
            "TYPE" => SchemaChangeTarget::Type,
            "FUNCTION" => SchemaChangeTarget::Function,
            "AGGREGATE" => SchemaChangeTarget::Aggregate,
            other => return Err(invalid("SchemaChangeTarget", other)),
        })
    }

    /// Encode to the `[string]` schema-change-target name.
    pub fn to_wire(self) -> &'static str {
        match self {
            SchemaChangeTarget::Keyspace => "KEYSPACE",
            SchemaChangeTarget::Table => "TABLE",
            SchemaChangeTarget::Type => "TYPE",
            SchemaChangeTarget::Function => "FUNCTION",
            SchemaChangeTarget::Aggregate => "AGGREGATE",
        }
    }
}

/// `[string]`-encoded write type carried by `WriteTimeout`/`WriteFailure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteType {
    /// A non-batched, non-counter write.
    Simple,
    /// A logged batch write; the batch log was written successfully.
    Batch,
    /// An unlogged batch write.
    UnloggedBatch,
    /// A counter write.
    Counter,
    /// Failure writing to the batch log itself.
    BatchLog,
    /// A compare-and-set (lightweight transaction) write.
    Cas,
    /// A materialized view write.
    View,
    /// A change-data-capture write.
    Cdc,
}

impl WriteType {
    /// Decode a `[string]` write-type name.
    pub fn from_wire(value: &str) -> Result<Self> {
        Ok(match value {
            "SIMPLE" => WriteType::Simple,
            "BATCH" => WriteType::Batch,
            "UNLOGGED_BATCH" => WriteType::UnloggedBatch,
            "COUNTER" => WriteType::Counter,
            "BATCH_LOG" => WriteType::BatchLog,
            "CAS" => WriteType::Cas,
            "VIEW" => WriteType::View,
            "CDC" => WriteType::Cdc,
            other => return Err(invalid("WriteType", other)),
        })
    }

    /// Encode to the `[string]` write-type name.
    pub fn to_wire(self) -> &'static str {
        match self {
            WriteType::Simple => "SIMPLE",
            WriteType::Batch => "BATCH",
            WriteType::UnloggedBatch => "UNLOGGED_BATCH",
            WriteType::Counter => "COUNTER",
            WriteType::BatchLog => "BATCH_LOG",
            WriteType::Cas => "CAS",
            WriteType::View => "VIEW",
            WriteType::Cdc => "CDC",
        }
    }
}

/// `[int]`-encoded `Result` response kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    /// No payload beyond the type itself.
    Void,
    /// A row set.
    Rows,
    /// `USE <keyspace>` acknowledgement.
    SetKeyspace,
    /// A newly-prepared statement's metadata.
    Prepared,
    /// A DDL acknowledgement.
    SchemaChange,
}

impl ResultType {
    /// Decode an `[int]` result-type code.
    pub fn from_wire(value: i32) -> Result<Self> {
        Ok(match value {
            0x0001 => ResultType::Void,
            0x0002 => ResultType::Rows,
            0x0003 => ResultType::SetKeyspace,
            0x0004 => ResultType::Prepared,
            0x0005 => ResultType::SchemaChange,
            other => return Err(invalid("ResultType", other)),
        })
    }

    /// Encode to an `[int]` result-type code.
    pub fn to_wire(self) -> i32 {
        match self {
            ResultType::Void => 0x0001,
            ResultType::Rows => 0x0002,
            ResultType::SetKeyspace => 0x0003,
            ResultType::Prepared => 0x0004,
            ResultType::SchemaChange => 0x0005,
        }
    }
}

/// `[int]`-encoded DSE continuous-paging revision kind, carried by the
/// `Revise` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DseRevisionType {
    /// Cancel an in-progress continuous page stream.
    CancelContinuousPaging,
    /// Request more pages of an in-progress continuous page stream
    /// (DSE_V2 only; carries an extra `nextPages` field).
    MoreContinuousPages,
}

impl DseRevisionType {
    /// Decode an `[int]` DSE revision-type code.
    pub fn from_wire(value: i32) -> Result<Self> {
        Ok(match value {
            1 => DseRevisionType::CancelContinuousPaging,
            2 => DseRevisionType::MoreContinuousPages,
            other => return Err(invalid("DseRevisionType", other)),
        })
    }

    /// Encode to an `[int]` DSE revision-type code.
    pub fn to_wire(self) -> i32 {
        match self {
            DseRevisionType::CancelContinuousPaging => 1,
            DseRevisionType::MoreContinuousPages => 2,
        }
    }
}

/// `[string]`-encoded node status reported by a `StatusChange` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusChangeType {
    /// Node came up.
    Up,
    /// Node went down.
    Down,
}

impl StatusChangeType {
    /// Decode a `[string]` status-change-type name.
    pub fn from_wire(value: &str) -> Result<Self> {
        Ok(match value {
            "UP" => StatusChangeType::Up,
            "DOWN" => StatusChangeType::Down,
            other => return Err(invalid("StatusChangeType", other)),
        })
    }

    /// Encode to the `[string]` status-change-type name.
    pub fn to_wire(self) -> &'static str {
        match self {
            StatusChangeType::Up => "UP",
            StatusChangeType::Down => "DOWN",
        }
    }
}

/// `[string]`-encoded kind of topology change reported by a
/// `TopologyChange` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyChangeType {
    /// A node joined the cluster.
    NewNode,
    /// A node left the cluster.
    RemovedNode,
    /// A node's token range moved (v3+ only).
    MovedNode,
}

impl TopologyChangeType {
    /// Decode a `[string]` topology-change-type name.
    pub fn from_wire(value: &str) -> Result<Self> {
        Ok(match value {
            "NEW_NODE" => TopologyChangeType::NewNode,
            "REMOVED_NODE" => TopologyChangeType::RemovedNode,
            "MOVED_NODE" => TopologyChangeType::MovedNode,
            other => return Err(invalid("TopologyChangeType", other)),
        })
    }

    /// Encode to the `[string]` topology-change-type name.
    pub fn to_wire(self) -> &'static str {
        match self {
            TopologyChangeType::NewNode => "NEW_NODE",
            TopologyChangeType::RemovedNode => "REMOVED_NODE",
            TopologyChangeType::MovedNode => "MOVED_NODE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_code_round_trips() {
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
            assert_eq!(OpCode::from_wire(op.to_wire()).unwrap(), op);
        }
    }

    #[test]
    fn unknown_consistency_level_is_invalid_enum() {
        let err = ConsistencyLevel::from_wire(0xBEEF).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidEnum {
                enum_name: "ConsistencyLevel",
                ..
            }
        ));
    }

    #[test]
    fn local_quorum_wire_code_is_six() {
        assert_eq!(ConsistencyLevel::LocalQuorum.to_wire(), 6);
    }

    #[test]
    fn schema_change_result_type_wire_code_is_five() {
        assert_eq!(ResultType::SchemaChange.to_wire(), 0x0000_0005);
    }
}
