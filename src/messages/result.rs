//! `Result` response: the outcome of a `Query`, `Prepare`, `Execute`, or
//! `Batch` request.

use bytes::{Buf, BufMut};

use crate::datatype::DataTypeCodec;
use crate::enums::ResultType;
use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::primitives::{
    encoded_len_bytes, encoded_len_short_bytes, encoded_len_string, read_bytes, read_int,
    read_short_bytes, read_string, write_bytes, write_int, write_short_bytes, write_string,
};
use crate::result_metadata::{RowsMetadata, VariablesMetadata};
use crate::schema_change::SchemaChangePayload;
use crate::version::VersionCapabilities;

/// A single decoded row: one opaque `[bytes]` cell per column, in the
/// order declared by the accompanying [`RowsMetadata`].
pub type Row = Vec<Option<Vec<u8>>>;

/// `[int] resultType` then a type-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPayload<D> {
    /// No payload beyond the type itself.
    Void,
    /// Acknowledges a `USE <keyspace>` statement.
    SetKeyspace(String),
    /// A newly-prepared statement's id and metadata.
    Prepared {
        /// Id the client echoes back on `Execute`.
        prepared_query_id: Vec<u8>,
        /// Result-metadata id, V5/DSE_V2 only.
        result_metadata_id: Option<Vec<u8>>,
        /// Bind-marker metadata.
        variables_metadata: VariablesMetadata<D>,
        /// Metadata for the rows this statement will eventually produce.
        rows_metadata: RowsMetadata<D>,
    },
    /// A row set.
    Rows {
        /// Column metadata and paging state.
        metadata: RowsMetadata<D>,
        /// Row-major cell data; `rows.len()` is the row count, and every
        /// row's length must equal `metadata.column_count`.
        rows: Vec<Row>,
    },
    /// A DDL acknowledgement.
    SchemaChange(SchemaChangePayload),
}

impl<D> ResultPayload<D> {
    fn result_type(&self) -> ResultType {
        match self {
            ResultPayload::Void => ResultType::Void,
            ResultPayload::SetKeyspace(_) => ResultType::SetKeyspace,
            ResultPayload::Prepared { .. } => ResultType::Prepared,
            ResultPayload::Rows { .. } => ResultType::Rows,
            ResultPayload::SchemaChange(_) => ResultType::SchemaChange,
        }
    }

    /// Decode a result response using `codec` to interpret column
    /// data-type descriptors.
    pub fn read<C: DataTypeCodec<Descriptor = D>>(
        buf: &mut impl Buf,
        caps: &VersionCapabilities,
        codec: &C,
        limits: &DecodeLimits,
    ) -> Result<Self> {
        let result_type = ResultType::from_wire(read_int(buf)?)?;
        Ok(match result_type {
            ResultType::Void => ResultPayload::Void,
            ResultType::SetKeyspace => ResultPayload::SetKeyspace(read_string(buf, limits)?),
            ResultType::Prepared => {
                let prepared_query_id = read_short_bytes(buf, limits)?;
                let result_metadata_id = if caps.result_metadata_id {
                    Some(read_short_bytes(buf, limits)?)
                } else {
                    None
                };
                let variables_metadata =
                    VariablesMetadata::read(buf, caps.version, codec, limits)?;
                let rows_metadata = RowsMetadata::read(buf, caps.version, codec, limits)?;
                ResultPayload::Prepared {
                    prepared_query_id,
                    result_metadata_id,
                    variables_metadata,
                    rows_metadata,
                }
            }
            ResultType::Rows => {
                let metadata = RowsMetadata::read(buf, caps.version, codec, limits)?;
                let row_count = read_int(buf)?;
                if row_count < 0 {
                    return Err(ProtocolError::precondition(
                        "result.rows.row_count",
                        "must not be negative",
                    ));
                }
                let column_count = metadata.column_count as usize;
                let rows = (0..row_count)
                    .map(|_| {
                        (0..column_count)
                            .map(|_| read_bytes(buf, limits))
                            .collect::<Result<Row>>()
                    })
                    .collect::<Result<Vec<_>>>()?;
                ResultPayload::Rows { metadata, rows }
            }
            ResultType::SchemaChange => {
                ResultPayload::SchemaChange(SchemaChangePayload::read(buf, caps, limits)?)
            }
        })
    }

    /// Encode a result response using `codec` to interpret column
    /// data-type descriptors.
    pub fn write<C: DataTypeCodec<Descriptor = D>>(
        &self,
        buf: &mut impl BufMut,
        caps: &VersionCapabilities,
        codec: &C,
    ) -> Result<()> {
        write_int(buf, self.result_type().to_wire());
        match self {
            ResultPayload::Void => {}
            ResultPayload::SetKeyspace(keyspace) => {
                if keyspace.is_empty() {
                    return Err(ProtocolError::precondition(
                        "result.set_keyspace.keyspace",
                        "must be non-empty",
                    ));
                }
                write_string(buf, keyspace);
            }
            ResultPayload::Prepared {
                prepared_query_id,
                result_metadata_id,
                variables_metadata,
                rows_metadata,
            } => {
                write_short_bytes(buf, prepared_query_id);
                if caps.result_metadata_id {
                    write_short_bytes(buf, result_metadata_id.as_deref().unwrap_or(&[]));
                }
                variables_metadata.write(buf, caps, codec)?;
                rows_metadata.write(buf, caps, codec)?;
            }
            ResultPayload::Rows { metadata, rows } => {
                metadata.write(buf, caps, codec)?;
                write_int(buf, rows.len() as i32);
                for row in rows {
                    if row.len() != metadata.column_count as usize {
                        return Err(ProtocolError::precondition(
                            "result.rows.row",
                            format!(
                                "row has {} cells but metadata declares {} columns",
                                row.len(),
                                metadata.column_count
                            ),
                        ));
                    }
                    for cell in row {
                        write_bytes(buf, cell.as_deref());
                    }
                }
            }
            ResultPayload::SchemaChange(payload) => payload.write(buf, caps)?,
        }
        Ok(())
    }

    /// Byte length of the encoded result.
    pub fn encoded_len<C: DataTypeCodec<Descriptor = D>>(
        &self,
        caps: &VersionCapabilities,
        codec: &C,
    ) -> Result<usize> {
        let mut len = 4;
        len += match self {
            ResultPayload::Void => 0,
            ResultPayload::SetKeyspace(keyspace) => {
                if keyspace.is_empty() {
                    return Err(ProtocolError::precondition(
                        "result.set_keyspace.keyspace",
                        "must be non-empty",
                    ));
                }
                encoded_len_string(keyspace)
            }
            ResultPayload::Prepared {
                prepared_query_id,
                result_metadata_id,
                variables_metadata,
                rows_metadata,
            } => {
                let mut n = encoded_len_short_bytes(prepared_query_id);
                if caps.result_metadata_id {
                    n += encoded_len_short_bytes(result_metadata_id.as_deref().unwrap_or(&[]));
                }
                n += variables_metadata.encoded_len(caps, codec);
                n += rows_metadata.encoded_len(caps, codec);
                n
            }
            ResultPayload::Rows { metadata, rows } => {
                for row in rows {
                    if row.len() != metadata.column_count as usize {
                        return Err(ProtocolError::precondition(
                            "result.rows.row",
                            format!(
                                "row has {} cells but metadata declares {} columns",
                                row.len(),
                                metadata.column_count
                            ),
                        ));
                    }
                }
                metadata.encoded_len(caps, codec)
                    + 4
                    + rows
                        .iter()
                        .flat_map(|row| row.iter())
                        .map(|cell| encoded_len_bytes(cell.as_deref()))
                        .sum::<usize>()
            }
            ResultPayload::SchemaChange(payload) => payload.encoded_len(caps)?,
        };
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{OpaqueDataType, OpaqueDataTypeCodec};
    use crate::enums::{SchemaChangeTarget, SchemaChangeType};
    use crate::result_metadata::ColumnSpec;
    use crate::version::ProtocolVersion;

    fn column(name: &str) -> ColumnSpec<OpaqueDataType> {
        ColumnSpec {
            keyspace: "ks".to_string(),
            table: "t".to_string(),
            name: name.to_string(),
            data_type: OpaqueDataType(vec![0x00, 0x09]),
        }
    }

    #[test]
    fn void_round_trips() {
        let caps = ProtocolVersion::V4.capabilities();
        let codec = OpaqueDataTypeCodec;
        let limits = DecodeLimits::default();
        let message: ResultPayload<OpaqueDataType> = ResultPayload::Void;
        let mut buf = Vec::new();
        message.write(&mut buf, &caps, &codec).unwrap();
        assert_eq!(buf, [0x00, 0x00, 0x00, 0x01]);
        let mut slice = &buf[..];
        let decoded = ResultPayload::read(&mut slice, &caps, &codec, &limits).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn rows_round_trip_with_null_and_present_cells() {
        let caps = ProtocolVersion::V4.capabilities();
        let codec = OpaqueDataTypeCodec;
        let limits = DecodeLimits::default();
        let metadata = RowsMetadata {
            column_count: 2,
            paging_state: None,
            new_result_metadata_id: None,
            continuous_page: None,
            columns: Some(vec![column("a"), column("b")]),
        };
        let message = ResultPayload::Rows {
            metadata,
            rows: vec![
                vec![Some(vec![1, 2]), None],
                vec![Some(vec![]), Some(vec![9])],
            ],
        };
        let mut buf = Vec::new();
        message.write(&mut buf, &caps, &codec).unwrap();
        assert_eq!(message.encoded_len(&caps, &codec).unwrap(), buf.len());
        let mut slice = &buf[..];
        let decoded = ResultPayload::read(&mut slice, &caps, &codec, &limits).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn row_with_wrong_cell_count_is_rejected() {
        let caps = ProtocolVersion::V4.capabilities();
        let codec = OpaqueDataTypeCodec;
        let metadata = RowsMetadata {
            column_count: 2,
            paging_state: None,
            new_result_metadata_id: None,
            continuous_page: None,
            columns: None,
        };
        let message = ResultPayload::Rows {
            metadata,
            rows: vec![vec![Some(vec![1])]],
        };
        let mut buf = Vec::new();
        let err = message.write(&mut buf, &caps, &codec).unwrap_err();
        assert!(matches!(err, ProtocolError::FieldPreconditionFailed(_)));
    }

    #[test]
    fn schema_change_result_wire_code_is_five() {
        let caps = ProtocolVersion::V3.capabilities();
        let codec = OpaqueDataTypeCodec;
        let message: ResultPayload<OpaqueDataType> =
            ResultPayload::SchemaChange(SchemaChangePayload {
                change_type: SchemaChangeType::Created,
                target: SchemaChangeTarget::Table,
                keyspace: "ks1".to_string(),
                object: Some("table1".to_string()),
                arguments: None,
            });
        let mut buf = Vec::new();
        message.write(&mut buf, &caps, &codec).unwrap();
        assert_eq!(&buf[..4], [0x00, 0x00, 0x00, 0x05]);
    }
}
