//! Result-set metadata shared by the `Prepared` and `Rows` result variants:
//! [`VariablesMetadata`] describes a prepared statement's bind markers,
//! [`RowsMetadata`] describes a row set's columns.

use bytes::{Buf, BufMut};

use crate::datatype::DataTypeCodec;
use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::primitives::{
    encoded_len_bytes, encoded_len_short_bytes, encoded_len_string, read_bytes, read_int,
    read_short, read_short_bytes, read_string, write_bytes, write_int, write_short,
    write_short_bytes, write_string,
};
use crate::version::{ProtocolVersion, VersionCapabilities};

const GLOBAL_TABLES_SPEC: i32 = 0x0001;
const ROWS_FLAG_PAGING_STATE: i32 = 0x0002;
const ROWS_FLAG_NO_METADATA: i32 = 0x0004;
const ROWS_FLAG_NEW_METADATA_ID: i32 = 0x0008;
const ROWS_FLAG_CONTINUOUS_PAGE: i32 = 0x4000_0000;
const ROWS_FLAG_LAST_CONTINUOUS_PAGE: i32 = -0x8000_0000; // 0x8000_0000 as i32

/// One column's (keyspace, table, name, type) tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec<D> {
    /// Owning keyspace.
    pub keyspace: String,
    /// Owning table.
    pub table: String,
    /// Column name.
    pub name: String,
    /// CQL data-type descriptor, opaque to this crate.
    pub data_type: D,
}

fn shares_table<D>(columns: &[ColumnSpec<D>]) -> bool {
    match columns.split_first() {
        None => false,
        Some((first, rest)) => rest
            .iter()
            .all(|c| c.keyspace == first.keyspace && c.table == first.table),
    }
}

fn write_columns<D, C: DataTypeCodec<Descriptor = D>>(
    buf: &mut impl BufMut,
    columns: &[ColumnSpec<D>],
    global: bool,
    version: ProtocolVersion,
    codec: &C,
) -> Result<()> {
    if global {
        if let Some(first) = columns.first() {
            write_string(buf, &first.keyspace);
            write_string(buf, &first.table);
        }
        for column in columns {
            write_string(buf, &column.name);
            codec.write(buf as &mut dyn BufMut, version, &column.data_type)?;
        }
    } else {
        for column in columns {
            write_string(buf, &column.keyspace);
            write_string(buf, &column.table);
            write_string(buf, &column.name);
            codec.write(buf as &mut dyn BufMut, version, &column.data_type)?;
        }
    }
    Ok(())
}

fn read_columns<D, C: DataTypeCodec<Descriptor = D>>(
    buf: &mut impl Buf,
    count: usize,
    global: bool,
    version: ProtocolVersion,
    codec: &C,
    limits: &DecodeLimits,
) -> Result<Vec<ColumnSpec<D>>> {
    let shared = if global {
        Some((read_string(buf, limits)?, read_string(buf, limits)?))
    } else {
        None
    };
    (0..count)
        .map(|_| {
            let (keyspace, table) = match &shared {
                Some((ks, table)) => (ks.clone(), table.clone()),
                None => (read_string(buf, limits)?, read_string(buf, limits)?),
            };
            let name = read_string(buf, limits)?;
            let data_type = codec.read(buf as &mut dyn Buf, version, limits)?;
            Ok(ColumnSpec {
                keyspace,
                table,
                name,
                data_type,
            })
        })
        .collect()
}

fn columns_encoded_len<D, C: DataTypeCodec<Descriptor = D>>(
    columns: &[ColumnSpec<D>],
    global: bool,
    version: ProtocolVersion,
    codec: &C,
) -> usize {
    let mut len = 0;
    if global {
        if let Some(first) = columns.first() {
            len += encoded_len_string(&first.keyspace) + encoded_len_string(&first.table);
        }
        for column in columns {
            len += encoded_len_string(&column.name) + codec.encoded_len(version, &column.data_type);
        }
    } else {
        for column in columns {
            len += encoded_len_string(&column.keyspace)
                + encoded_len_string(&column.table)
                + encoded_len_string(&column.name)
                + codec.encoded_len(version, &column.data_type);
        }
    }
    len
}

/// Bind-marker metadata for a prepared statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablesMetadata<D> {
    /// Indices of the partition-key bind markers, serialized only V4+.
    pub pk_indices: Vec<u16>,
    /// Bind-marker columns.
    pub columns: Vec<ColumnSpec<D>>,
}

impl<D> VariablesMetadata<D> {
    /// Decode variables metadata.
    pub fn read<C: DataTypeCodec<Descriptor = D>>(
        buf: &mut impl Buf,
        version: ProtocolVersion,
        codec: &C,
        limits: &DecodeLimits,
    ) -> Result<Self> {
        let flags = read_int(buf)?;
        let global = flags & GLOBAL_TABLES_SPEC != 0;
        let column_count = read_int(buf)?;
        let pk_indices_present = matches!(
            version,
            ProtocolVersion::V4 | ProtocolVersion::V5 | ProtocolVersion::DseV1 | ProtocolVersion::DseV2
        );
        let pk_indices = if pk_indices_present {
            let pk_count = read_int(buf)?;
            (0..pk_count)
                .map(|_| read_short(buf))
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };
        let columns = if column_count > 0 {
            read_columns(buf, column_count as usize, global, version, codec, limits)?
        } else {
            Vec::new()
        };
        Ok(VariablesMetadata {
            pk_indices,
            columns,
        })
    }

    /// Encode variables metadata.
    pub fn write<C: DataTypeCodec<Descriptor = D>>(
        &self,
        buf: &mut impl BufMut,
        caps: &VersionCapabilities,
        codec: &C,
    ) -> Result<()> {
        let global = shares_table(&self.columns);
        let flags = if global { GLOBAL_TABLES_SPEC } else { 0 };
        write_int(buf, flags);
        write_int(buf, self.columns.len() as i32);
        if matches!(
            caps.version,
            ProtocolVersion::V4 | ProtocolVersion::V5 | ProtocolVersion::DseV1 | ProtocolVersion::DseV2
        ) {
            write_int(buf, self.pk_indices.len() as i32);
            for index in &self.pk_indices {
                write_short(buf, *index);
            }
        }
        if !self.columns.is_empty() {
            write_columns(buf, &self.columns, global, caps.version, codec)?;
        }
        Ok(())
    }

    /// Byte length of the encoded variables metadata.
    pub fn encoded_len<C: DataTypeCodec<Descriptor = D>>(
        &self,
        caps: &VersionCapabilities,
        codec: &C,
    ) -> usize {
        let global = shares_table(&self.columns);
        let mut len = 8;
        if matches!(
            caps.version,
            ProtocolVersion::V4 | ProtocolVersion::V5 | ProtocolVersion::DseV1 | ProtocolVersion::DseV2
        ) {
            len += 4 + 2 * self.pk_indices.len();
        }
        if !self.columns.is_empty() {
            len += columns_encoded_len(&self.columns, global, caps.version, codec);
        }
        len
    }
}

/// A continuous-page marker embedded in [`RowsMetadata`] (DSE only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuousPage {
    /// Sequence number of this page within the continuous stream.
    pub page_number: i32,
    /// Whether this is the final page of the stream.
    pub last_page: bool,
}

/// Row-set metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowsMetadata<D> {
    /// Declared column count. Must equal `columns.len()` when `columns`
    /// is `Some`; a mismatch is a fatal encode error.
    pub column_count: i32,
    /// Opaque continuation token for the next page.
    pub paging_state: Option<Vec<u8>>,
    /// Server-assigned id for this result's metadata, valid V5/DSE_V2.
    pub new_result_metadata_id: Option<Vec<u8>>,
    /// DSE continuous-paging marker.
    pub continuous_page: Option<ContinuousPage>,
    /// Column descriptors, or `None` when the `NO_METADATA` flag is set
    /// (typical when the client already cached metadata from a prior
    /// `Prepared` response).
    pub columns: Option<Vec<ColumnSpec<D>>>,
}

impl<D> RowsMetadata<D> {
    /// Decode rows metadata.
    pub fn read<C: DataTypeCodec<Descriptor = D>>(
        buf: &mut impl Buf,
        version: ProtocolVersion,
        codec: &C,
        limits: &DecodeLimits,
    ) -> Result<Self> {
        let flags = read_int(buf)?;
        let column_count = read_int(buf)?;
        let paging_state = if flags & ROWS_FLAG_PAGING_STATE != 0 {
            read_bytes(buf, limits)?
        } else {
            None
        };
        let new_result_metadata_id = if flags & ROWS_FLAG_NEW_METADATA_ID != 0 {
            Some(read_short_bytes(buf, limits)?)
        } else {
            None
        };
        let continuous_page = if flags & ROWS_FLAG_CONTINUOUS_PAGE != 0 {
            Some(ContinuousPage {
                page_number: read_int(buf)?,
                last_page: flags & ROWS_FLAG_LAST_CONTINUOUS_PAGE != 0,
            })
        } else {
            None
        };
        let columns = if flags & ROWS_FLAG_NO_METADATA == 0 {
            let global = flags & GLOBAL_TABLES_SPEC != 0;
            Some(read_columns(
                buf,
                column_count as usize,
                global,
                version,
                codec,
                limits,
            )?)
        } else {
            None
        };
        Ok(RowsMetadata {
            column_count,
            paging_state,
            new_result_metadata_id,
            continuous_page,
            columns,
        })
    }

    /// Encode rows metadata.
    pub fn write<C: DataTypeCodec<Descriptor = D>>(
        &self,
        buf: &mut impl BufMut,
        caps: &VersionCapabilities,
        codec: &C,
    ) -> Result<()> {
        if let Some(columns) = &self.columns {
            if columns.len() as i32 != self.column_count {
                return Err(ProtocolError::precondition(
                    "rows_metadata.column_count",
                    format!(
                        "declared {} but {} columns supplied",
                        self.column_count,
                        columns.len()
                    ),
                ));
            }
        }
        if self.new_result_metadata_id.is_some() && !caps.result_metadata_id {
            return Err(ProtocolError::UnsupportedForVersion {
                field: "rows_metadata.new_result_metadata_id",
                version: caps.version,
            });
        }
        if self.continuous_page.is_some() && !caps.continuous_paging {
            return Err(ProtocolError::UnsupportedForVersion {
                field: "rows_metadata.continuous_page",
                version: caps.version,
            });
        }

        let global = self
            .columns
            .as_deref()
            .map(shares_table)
            .unwrap_or(false);

        let mut flags = 0i32;
        if global {
            flags |= GLOBAL_TABLES_SPEC;
        }
        if self.paging_state.is_some() {
            flags |= ROWS_FLAG_PAGING_STATE;
        }
        if self.columns.is_none() {
            flags |= ROWS_FLAG_NO_METADATA;
        }
        if self.new_result_metadata_id.is_some() {
            flags |= ROWS_FLAG_NEW_METADATA_ID;
        }
        if let Some(page) = self.continuous_page {
            flags |= ROWS_FLAG_CONTINUOUS_PAGE;
            if page.last_page {
                flags |= ROWS_FLAG_LAST_CONTINUOUS_PAGE;
            }
        }

        write_int(buf, flags);
        write_int(buf, self.column_count);
        if let Some(paging_state) = &self.paging_state {
            write_bytes(buf, Some(paging_state));
        }
        if let Some(id) = &self.new_result_metadata_id {
            write_short_bytes(buf, id);
        }
        if let Some(page) = self.continuous_page {
            write_int(buf, page.page_number);
        }
        if let Some(columns) = &self.columns {
            write_columns(buf, columns, global, caps.version, codec)?;
        }
        Ok(())
    }

    /// Byte length of the encoded rows metadata.
    pub fn encoded_len<C: DataTypeCodec<Descriptor = D>>(
        &self,
        caps: &VersionCapabilities,
        codec: &C,
    ) -> usize {
        let global = self
            .columns
            .as_deref()
            .map(shares_table)
            .unwrap_or(false);
        let mut len = 8;
        if let Some(paging_state) = &self.paging_state {
            len += encoded_len_bytes(Some(paging_state));
        }
        if let Some(id) = &self.new_result_metadata_id {
            len += encoded_len_short_bytes(id);
        }
        if self.continuous_page.is_some() {
            len += 4;
        }
        if let Some(columns) = &self.columns {
            len += columns_encoded_len(columns, global, caps.version, codec);
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{OpaqueDataType, OpaqueDataTypeCodec};

    fn column(ks: &str, table: &str, name: &str) -> ColumnSpec<OpaqueDataType> {
        ColumnSpec {
            keyspace: ks.to_string(),
            table: table.to_string(),
            name: name.to_string(),
            data_type: OpaqueDataType(vec![0x00, 0x09]),
        }
    }

    #[test]
    fn variables_metadata_round_trips_with_global_spec() {
        let caps = ProtocolVersion::V4.capabilities();
        let codec = OpaqueDataTypeCodec;
        let limits = DecodeLimits::default();
        let metadata = VariablesMetadata {
            pk_indices: vec![0],
            columns: vec![column("ks", "t", "a"), column("ks", "t", "b")],
        };
        let mut buf = Vec::new();
        metadata.write(&mut buf, &caps, &codec).unwrap();
        assert_eq!(metadata.encoded_len(&caps, &codec), buf.len());
        let mut slice = &buf[..];
        let decoded =
            VariablesMetadata::read(&mut slice, caps.version, &codec, &limits).unwrap();
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn pk_indices_absent_before_v4() {
        let caps = ProtocolVersion::V3.capabilities();
        let codec = OpaqueDataTypeCodec;
        let metadata = VariablesMetadata {
            pk_indices: vec![0],
            columns: vec![],
        };
        let mut buf = Vec::new();
        metadata.write(&mut buf, &caps, &codec).unwrap();
        // flags(4) + column_count(4), no pk block on V3.
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn rows_metadata_mismatched_column_count_is_rejected() {
        let caps = ProtocolVersion::V4.capabilities();
        let codec = OpaqueDataTypeCodec;
        let metadata = RowsMetadata {
            column_count: 5,
            paging_state: None,
            new_result_metadata_id: None,
            continuous_page: None,
            columns: Some(vec![column("ks", "t", "a")]),
        };
        let mut buf = Vec::new();
        let err = metadata.write(&mut buf, &caps, &codec).unwrap_err();
        assert!(matches!(err, ProtocolError::FieldPreconditionFailed(_)));
        assert!(buf.is_empty());
    }

    #[test]
    fn rows_metadata_no_metadata_flag_round_trips() {
        let caps = ProtocolVersion::V4.capabilities();
        let codec = OpaqueDataTypeCodec;
        let limits = DecodeLimits::default();
        let metadata = RowsMetadata {
            column_count: 3,
            paging_state: None,
            new_result_metadata_id: None,
            continuous_page: None,
            columns: None,
        };
        let mut buf = Vec::new();
        metadata.write(&mut buf, &caps, &codec).unwrap();
        let mut slice = &buf[..];
        let decoded = RowsMetadata::read(&mut slice, caps.version, &codec, &limits).unwrap();
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn new_result_metadata_id_requires_v5_or_dse_v2() {
        let caps = ProtocolVersion::V4.capabilities();
        let codec = OpaqueDataTypeCodec;
        let metadata = RowsMetadata {
            column_count: 0,
            paging_state: None,
            new_result_metadata_id: Some(vec![1, 2]),
            continuous_page: None,
            columns: Some(vec![]),
        };
        let mut buf = Vec::new();
        assert!(metadata.write(&mut buf, &caps, &codec).is_err());
    }
}
