//! # Schema Wire Messages
//!
//! `SchemaPb` / `ColumnSchemaPb` are the message-level form of a schema. They
//! are plain data: every field is optional or raw so that a message received
//! from a peer can be represented before it is validated. Conversion into a
//! [`Schema`] is where validation happens.
//!
//! ## Conversion Flags
//!
//! | Flag | Effect on `*_to_wire` |
//! |------|-----------------------|
//! | `WITHOUT_IDS` | column ids are left unset (server assigns them later) |
//! | `WITHOUT_STORAGE_ATTRIBUTES` | encoding/compression/block size are left unset |
//!
//! Converting back with `*_from_wire` restores unset storage attributes to
//! their defaults and produces a schema without ids when no ids were sent.

use eyre::{Result, WrapErr};

use super::{
    ColumnId, ColumnSchema, ColumnStorageAttributes, CompressionType, EncodingType, Schema,
    SortingType,
};
use crate::error::WireError;
use crate::types::{ColumnType, DataType, Value};

/// Bitfield values for the `flags` argument of the `*_to_wire` functions.
pub mod schema_flags {
    pub const WITHOUT_IDS: u8 = 1 << 0;
    pub const WITHOUT_STORAGE_ATTRIBUTES: u8 = 1 << 1;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageAttributesPb {
    pub encoding: u8,
    pub compression: u8,
    pub block_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSchemaPb {
    pub id: Option<u32>,
    pub name: String,
    pub data_type: u8,
    pub type_params: Vec<u8>,
    pub is_key: bool,
    pub is_hash_key: bool,
    pub is_nullable: bool,
    pub sorting_type: u8,
    /// CQL-framed value, see `Value::serialize`.
    pub read_default_value: Option<Vec<u8>>,
    pub write_default_value: Option<Vec<u8>>,
    pub storage: Option<StorageAttributesPb>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaPb {
    pub columns: Vec<ColumnSchemaPb>,
}

pub fn column_to_wire(column: &ColumnSchema, flags: u8) -> Result<ColumnSchemaPb> {
    let ty = column.column_type();
    let storage = if flags & schema_flags::WITHOUT_STORAGE_ATTRIBUTES == 0 {
        let attrs = column.storage_attributes();
        Some(StorageAttributesPb {
            encoding: attrs.encoding as u8,
            compression: attrs.compression as u8,
            block_size: attrs.block_size,
        })
    } else {
        None
    };

    Ok(ColumnSchemaPb {
        id: None,
        name: column.name().to_string(),
        data_type: ty.data_type() as u8,
        type_params: ty.params().iter().map(|p| *p as u8).collect(),
        is_key: column.is_key(),
        is_hash_key: column.is_hash_key(),
        is_nullable: column.is_nullable(),
        sorting_type: column.sorting_type() as u8,
        read_default_value: encode_default(column.read_default())?,
        write_default_value: encode_default(column.write_default())?,
        storage,
    })
}

fn encode_default(value: Option<&Value>) -> Result<Option<Vec<u8>>> {
    value
        .map(|v| {
            let mut buf = Vec::new();
            v.serialize(&mut buf)?;
            Ok(buf)
        })
        .transpose()
}

pub fn column_from_wire(pb: &ColumnSchemaPb) -> Result<ColumnSchema> {
    let data_type = DataType::try_from(pb.data_type)
        .wrap_err_with(|| format!("column '{}'", pb.name))?;
    let params = pb
        .type_params
        .iter()
        .map(|p| DataType::try_from(*p))
        .collect::<Result<Vec<_>>>()
        .wrap_err_with(|| format!("column '{}'", pb.name))?;
    let ty = ColumnType::from_parts(data_type, &params)
        .wrap_err_with(|| format!("column '{}'", pb.name))?;

    let mut column = ColumnSchema::new(pb.name.clone(), ty.clone())
        .nullable(pb.is_nullable)
        .sorting(SortingType::try_from(pb.sorting_type)?);
    if pb.is_hash_key {
        column = column.hash_key();
    } else if pb.is_key {
        column = column.key();
    }

    if let Some(storage) = &pb.storage {
        column = column.storage(ColumnStorageAttributes {
            encoding: EncodingType::try_from(storage.encoding)?,
            compression: CompressionType::try_from(storage.compression)?,
            block_size: storage.block_size,
        });
    }
    if let Some(bytes) = &pb.read_default_value {
        column = column.with_read_default(decode_default(&ty, bytes)?)?;
    }
    if let Some(bytes) = &pb.write_default_value {
        column = column.with_write_default(decode_default(&ty, bytes)?)?;
    }
    Ok(column)
}

fn decode_default(ty: &ColumnType, bytes: &[u8]) -> Result<Value> {
    let mut cursor = bytes;
    let value = Value::deserialize(ty, &mut cursor)?;
    if !cursor.is_empty() {
        return Err(WireError::protocol(format!(
            "{} trailing bytes after default value",
            cursor.len()
        )));
    }
    Ok(value)
}

pub fn schema_to_column_pbs(schema: &Schema, flags: u8) -> Result<Vec<ColumnSchemaPb>> {
    let with_ids = flags & schema_flags::WITHOUT_IDS == 0 && schema.has_column_ids();
    schema
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let mut pb = column_to_wire(col, flags)?;
            if with_ids {
                pb.id = schema.column_id(idx).map(|id| id.0);
            }
            Ok(pb)
        })
        .collect()
}

pub fn schema_to_wire(schema: &Schema, flags: u8) -> Result<SchemaPb> {
    Ok(SchemaPb {
        columns: schema_to_column_pbs(schema, flags)?,
    })
}

pub fn schema_to_wire_without_ids(schema: &Schema) -> Result<SchemaPb> {
    schema_to_wire(schema, schema_flags::WITHOUT_IDS)
}

/// Splits wire columns into columns, ids and the key column count, checking
/// key ordering and id completeness on the way.
pub fn column_pbs_to_column_tuple(
    pbs: &[ColumnSchemaPb],
) -> Result<(Vec<ColumnSchema>, Vec<ColumnId>, usize)> {
    let mut columns = Vec::with_capacity(pbs.len());
    let mut column_ids = Vec::with_capacity(pbs.len());
    let mut num_key_columns = 0;
    let mut in_key_prefix = true;

    for (idx, pb) in pbs.iter().enumerate() {
        let is_key = pb.is_key || pb.is_hash_key;
        if is_key {
            if !in_key_prefix {
                return Err(WireError::invalid_schema(format!(
                    "out-of-order key column '{}' at index {}: key columns must be contiguous from index 0",
                    pb.name, idx
                )));
            }
            num_key_columns += 1;
        } else {
            in_key_prefix = false;
        }
        if let Some(id) = pb.id {
            column_ids.push(ColumnId(id));
        }
        columns.push(column_from_wire(pb)?);
    }

    if !column_ids.is_empty() && column_ids.len() != columns.len() {
        return Err(WireError::invalid_schema(format!(
            "mismatched column ids: {} of {} columns carry an id",
            column_ids.len(),
            columns.len()
        )));
    }
    Ok((columns, column_ids, num_key_columns))
}

pub fn column_pbs_to_schema(pbs: &[ColumnSchemaPb]) -> Result<Schema> {
    let (columns, column_ids, _) = column_pbs_to_column_tuple(pbs)?;
    Schema::new(columns, column_ids)
}

pub fn schema_from_wire(pb: &SchemaPb) -> Result<Schema> {
    column_pbs_to_schema(&pb.columns)
}
