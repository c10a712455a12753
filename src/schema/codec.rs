//! # SchemaPb Byte Form
//!
//! Serializes a [`SchemaPb`] with the CQL framing primitives so a schema can
//! travel beside a row block without a separate message format.
//!
//! ```text
//! schema      := collection { count:i32, column* }
//! column      := collection {
//!                  id:            int | null
//!                  name:          bytes
//!                  data_type:     tinyint
//!                  type_params:   bytes (one DataType byte per parameter)
//!                  flags:         tinyint (bit0 key, bit1 hash key, bit2 nullable)
//!                  sorting_type:  tinyint
//!                  read_default:  bytes | null
//!                  write_default: bytes | null
//!                  storage:       collection { encoding:tinyint, compression:tinyint,
//!                                              block_size:int } | null
//!                }
//! ```
//!
//! Every item is length-prefixed, so `decode` validates each length against
//! what remains before reading, and fails on trailing bytes at every level.

use eyre::{Result, WrapErr};

use super::wire::{ColumnSchemaPb, SchemaPb, StorageAttributesPb};
use crate::config::NULL_VALUE_LENGTH;
use crate::encoding::{
    decode_length, decode_num, decode_value_ref, encode_bytes, encode_length, encode_num,
    finish_collection, start_collection,
};
use crate::error::WireError;

const FLAG_KEY: u8 = 1 << 0;
const FLAG_HASH_KEY: u8 = 1 << 1;
const FLAG_NULLABLE: u8 = 1 << 2;

impl SchemaPb {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mark = start_collection(&mut buf);
        let count = i32::try_from(self.columns.len())
            .map_err(|_| WireError::protocol("too many columns"))?;
        encode_length(count, &mut buf);
        for column in &self.columns {
            encode_column(column, &mut buf)
                .wrap_err_with(|| format!("encoding column '{}'", column.name))?;
        }
        finish_collection(mark, &mut buf)?;
        Ok(buf)
    }

    pub fn decode(bytes: &[u8]) -> Result<SchemaPb> {
        let mut cursor = bytes;
        let mut body = expect_value(&mut cursor, "schema")?;
        expect_empty(cursor, "schema message")?;

        let count = decode_length(&mut body)?;
        let count = usize::try_from(count)
            .map_err(|_| WireError::protocol(format!("negative column count: {}", count)))?;
        let mut columns = Vec::with_capacity(count.min(body.len() / 4));
        for idx in 0..count {
            let column =
                decode_column(&mut body).wrap_err_with(|| format!("decoding column {}", idx))?;
            columns.push(column);
        }
        expect_empty(body, "schema")?;
        Ok(SchemaPb { columns })
    }
}

fn encode_column(column: &ColumnSchemaPb, buf: &mut Vec<u8>) -> Result<()> {
    let mark = start_collection(buf);
    match column.id {
        Some(id) => encode_num(id, buf),
        None => encode_length(NULL_VALUE_LENGTH, buf),
    }
    encode_bytes(column.name.as_bytes(), buf)?;
    encode_num(column.data_type, buf);
    encode_bytes(&column.type_params, buf)?;

    let mut flags = 0u8;
    if column.is_key {
        flags |= FLAG_KEY;
    }
    if column.is_hash_key {
        flags |= FLAG_HASH_KEY;
    }
    if column.is_nullable {
        flags |= FLAG_NULLABLE;
    }
    encode_num(flags, buf);
    encode_num(column.sorting_type, buf);

    encode_optional_bytes(column.read_default_value.as_deref(), buf)?;
    encode_optional_bytes(column.write_default_value.as_deref(), buf)?;

    match &column.storage {
        Some(storage) => {
            let storage_mark = start_collection(buf);
            encode_num(storage.encoding, buf);
            encode_num(storage.compression, buf);
            encode_num(storage.block_size, buf);
            finish_collection(storage_mark, buf)?;
        }
        None => encode_length(NULL_VALUE_LENGTH, buf),
    }
    finish_collection(mark, buf)
}

fn encode_optional_bytes(value: Option<&[u8]>, buf: &mut Vec<u8>) -> Result<()> {
    match value {
        Some(bytes) => encode_bytes(bytes, buf),
        None => {
            encode_length(NULL_VALUE_LENGTH, buf);
            Ok(())
        }
    }
}

fn decode_column(data: &mut &[u8]) -> Result<ColumnSchemaPb> {
    let mut body = expect_value(data, "column")?;

    let id = match decode_value_ref(&mut body)? {
        Some(mut bytes) => Some(decode_num::<u32>(bytes.len(), &mut bytes)?),
        None => None,
    };
    let name = expect_value(&mut body, "column name")?;
    let name = std::str::from_utf8(name)
        .map_err(|e| WireError::protocol(format!("invalid UTF-8 in column name: {}", e)))?
        .to_string();
    let data_type = decode_u8_value(&mut body)?;
    let type_params = expect_value(&mut body, "type parameters")?.to_vec();
    let flags = decode_u8_value(&mut body)?;
    let sorting_type = decode_u8_value(&mut body)?;
    let read_default_value = decode_value_ref(&mut body)?.map(<[u8]>::to_vec);
    let write_default_value = decode_value_ref(&mut body)?.map(<[u8]>::to_vec);

    let storage = match decode_value_ref(&mut body)? {
        Some(mut attrs) => {
            let encoding = decode_u8_value(&mut attrs)?;
            let compression = decode_u8_value(&mut attrs)?;
            let len = decode_length(&mut attrs)?;
            let block_size = decode_num::<u32>(len.max(0) as usize, &mut attrs)?;
            expect_empty(attrs, "storage attributes")?;
            Some(StorageAttributesPb {
                encoding,
                compression,
                block_size,
            })
        }
        None => None,
    };
    expect_empty(body, "column")?;

    Ok(ColumnSchemaPb {
        id,
        name,
        data_type,
        type_params,
        is_key: flags & FLAG_KEY != 0,
        is_hash_key: flags & FLAG_HASH_KEY != 0,
        is_nullable: flags & FLAG_NULLABLE != 0,
        sorting_type,
        read_default_value,
        write_default_value,
        storage,
    })
}

fn decode_u8_value(data: &mut &[u8]) -> Result<u8> {
    let mut cursor = *data;
    let len = decode_length(&mut cursor)?;
    let val = decode_num::<u8>(len.max(0) as usize, &mut cursor)?;
    *data = cursor;
    Ok(val)
}

fn expect_value<'a>(data: &mut &'a [u8], what: &str) -> Result<&'a [u8]> {
    decode_value_ref(data)?
        .ok_or_else(|| WireError::protocol(format!("unexpected null {}", what)))
}

fn expect_empty(data: &[u8], what: &str) -> Result<()> {
    if !data.is_empty() {
        return Err(WireError::protocol(format!(
            "{} trailing bytes after {}",
            data.len(),
            what
        )));
    }
    Ok(())
}
