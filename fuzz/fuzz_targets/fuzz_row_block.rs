//! Fuzz testing for row block extraction.
//!
//! Builds a schema from arbitrary column kinds and hands arbitrary direct and
//! indirect buffers to `extract_rows_from_row_block`. A rejected block must be
//! left byte-for-byte unchanged; an accepted block must yield views whose
//! variable columns resolve inside the indirect buffer.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use rowwire::{extract_rows_from_row_block, DataType, RowBlockPb, SchemaBuilder};

#[derive(Debug, Arbitrary, Clone, Copy)]
enum FuzzColumn {
    Int32,
    Int64,
    Double,
    Text,
    Blob,
    NullableText,
    NullableInt16,
}

#[derive(Debug, Arbitrary)]
struct RowBlockInput {
    columns: Vec<FuzzColumn>,
    num_rows: u8,
    direct: Vec<u8>,
    indirect: Vec<u8>,
}

fuzz_target!(|input: RowBlockInput| {
    if input.columns.is_empty() || input.columns.len() > 32 {
        return;
    }

    let mut builder = SchemaBuilder::without_ids();
    for (idx, col) in input.columns.iter().enumerate() {
        let name = format!("c{}", idx);
        builder = match col {
            FuzzColumn::Int32 => builder.add_column(&name, DataType::Int32),
            FuzzColumn::Int64 => builder.add_column(&name, DataType::Int64),
            FuzzColumn::Double => builder.add_column(&name, DataType::Double),
            FuzzColumn::Text => builder.add_column(&name, DataType::String),
            FuzzColumn::Blob => builder.add_column(&name, DataType::Binary),
            FuzzColumn::NullableText => builder.add_nullable_column(&name, DataType::String),
            FuzzColumn::NullableInt16 => builder.add_nullable_column(&name, DataType::Int16),
        };
    }
    let schema = builder.build().unwrap();

    let block = RowBlockPb {
        num_rows: u64::from(input.num_rows),
    };
    let mut direct = input.direct.clone();
    let indirect = input.indirect;

    match extract_rows_from_row_block(&schema, &block, &indirect, &mut direct) {
        Ok(views) => {
            for view in &views {
                for (col, column) in schema.columns().iter().enumerate() {
                    assert!(column.is_nullable() || !view.is_null(col));
                }
                for col in schema.var_column_indices() {
                    if !view.is_null(col) {
                        view.get_bytes(col).unwrap();
                    }
                }
                let _ = view.values();
            }
        }
        Err(_) => assert_eq!(direct, input.direct),
    }
});
