//! Fixed-width cell images. Row blocks store fixed columns in little-endian
//! order, the same bytes a `RowBatch` holds, so serialization is a plain copy.

use eyre::{bail, ensure, Result};

use crate::types::{DataType, Value};

pub(crate) fn write_fixed_cell(value: &Value, dst: &mut [u8]) -> Result<()> {
    let width = value
        .data_type()
        .and_then(|dt| dt.fixed_size())
        .ok_or_else(|| eyre::eyre!("{:?} has no fixed-width image", value))?;
    ensure!(
        dst.len() == width,
        "fixed cell of {} bytes does not fit a {} byte slot",
        width,
        dst.len()
    );

    match value {
        Value::Bool(v) => dst[0] = u8::from(*v),
        Value::Int8(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Int16(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Int32(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Int64(v) | Value::Timestamp(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Float(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Double(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Uuid(v) => dst.copy_from_slice(v),
        other => bail!("{:?} has no fixed-width image", other),
    }
    Ok(())
}

pub(crate) fn read_fixed_cell(data_type: DataType, src: &[u8]) -> Result<Value> {
    let width = data_type
        .fixed_size()
        .ok_or_else(|| eyre::eyre!("{} is not a fixed-width type", data_type.cql_name()))?;
    let bytes = src.get(..width).ok_or_else(|| {
        eyre::eyre!(
            "insufficient data for {}: {} < {}",
            data_type.cql_name(),
            src.len(),
            width
        )
    })?;

    Ok(match data_type {
        DataType::Bool => Value::Bool(bytes[0] != 0),
        DataType::Int8 => Value::Int8(i8::from_le_bytes([bytes[0]])),
        DataType::Int16 => Value::Int16(i16::from_le_bytes(le_array(bytes)?)),
        DataType::Int32 => Value::Int32(i32::from_le_bytes(le_array(bytes)?)),
        DataType::Int64 => Value::Int64(i64::from_le_bytes(le_array(bytes)?)),
        DataType::Timestamp => Value::Timestamp(i64::from_le_bytes(le_array(bytes)?)),
        DataType::Float => Value::Float(f32::from_le_bytes(le_array(bytes)?)),
        DataType::Double => Value::Double(f64::from_le_bytes(le_array(bytes)?)),
        DataType::Uuid => Value::Uuid(le_array(bytes)?),
        _ => bail!("{} is not a fixed-width type", data_type.cql_name()),
    })
}

fn le_array<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| eyre::eyre!("expected {} bytes, found {}", N, bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_cells_are_little_endian() {
        let mut buf = [0u8; 4];
        write_fixed_cell(&Value::Int32(0x01020304), &mut buf).unwrap();
        assert_eq!(buf, [4, 3, 2, 1]);
        assert_eq!(
            read_fixed_cell(DataType::Int32, &buf).unwrap(),
            Value::Int32(0x01020304)
        );
    }

    #[test]
    fn every_fixed_type_reads_back() {
        let values = [
            Value::Bool(true),
            Value::Int8(-3),
            Value::Int16(-300),
            Value::Int64(i64::MIN),
            Value::Timestamp(1_700_000_000_000_000),
            Value::Float(1.5),
            Value::Double(-2.25),
            Value::Uuid([7; 16]),
        ];
        for value in values {
            let dt = value.data_type().unwrap();
            let mut buf = vec![0u8; dt.fixed_size().unwrap()];
            write_fixed_cell(&value, &mut buf).unwrap();
            assert_eq!(read_fixed_cell(dt, &buf).unwrap(), value);
        }
    }

    #[test]
    fn variable_values_have_no_fixed_image() {
        let mut buf = [0u8; 16];
        assert!(write_fixed_cell(&Value::from("x"), &mut buf).is_err());
        assert!(read_fixed_cell(DataType::String, &buf).is_err());
    }
}
