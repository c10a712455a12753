//! Fuzz testing for the length-prefixed value decoder.
//!
//! Feeds arbitrary bytes to `Value::deserialize` under an arbitrary column
//! type. Decoding must either fail cleanly with the cursor untouched, or
//! produce a value that matches the type. Scalars with a single canonical
//! image must re-serialize to exactly the bytes they consumed.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use rowwire::{ColumnType, DataType, Value};

#[derive(Debug, Arbitrary, Clone, Copy)]
enum FuzzScalar {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    Timestamp,
    Uuid,
    String,
    Binary,
}

impl From<FuzzScalar> for DataType {
    fn from(s: FuzzScalar) -> Self {
        match s {
            FuzzScalar::Bool => DataType::Bool,
            FuzzScalar::Int8 => DataType::Int8,
            FuzzScalar::Int16 => DataType::Int16,
            FuzzScalar::Int32 => DataType::Int32,
            FuzzScalar::Int64 => DataType::Int64,
            FuzzScalar::Float => DataType::Float,
            FuzzScalar::Double => DataType::Double,
            FuzzScalar::Timestamp => DataType::Timestamp,
            FuzzScalar::Uuid => DataType::Uuid,
            FuzzScalar::String => DataType::String,
            FuzzScalar::Binary => DataType::Binary,
        }
    }
}

#[derive(Debug, Arbitrary)]
enum FuzzType {
    Scalar(FuzzScalar),
    List(FuzzScalar),
    Set(FuzzScalar),
    Map(FuzzScalar, FuzzScalar),
}

#[derive(Debug, Arbitrary)]
struct ValueInput {
    column_type: FuzzType,
    data: Vec<u8>,
}

fuzz_target!(|input: ValueInput| {
    let ty = match input.column_type {
        FuzzType::Scalar(s) => ColumnType::scalar(s.into()),
        FuzzType::List(s) => ColumnType::list(s.into()),
        FuzzType::Set(s) => ColumnType::set(s.into()),
        FuzzType::Map(k, v) => ColumnType::map(k.into(), v.into()),
    };

    let mut cursor = input.data.as_slice();
    match Value::deserialize(&ty, &mut cursor) {
        Ok(value) => {
            assert!(value.matches_type(&ty));
            let consumed = input.data.len() - cursor.len();
            let mut again = Vec::new();
            value.serialize(&mut again).unwrap();
            if !matches!(
                ty.data_type(),
                DataType::Bool | DataType::Float | DataType::Double
            ) && !ty.is_collection()
            {
                assert_eq!(&again[..], &input.data[..consumed]);
            }
        }
        Err(_) => assert_eq!(cursor.len(), input.data.len()),
    }
});
