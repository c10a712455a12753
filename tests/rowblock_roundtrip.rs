//! # Row Block Round-Trip Tests
//!
//! End-to-end coverage of the row codec through the public API:
//!
//! - Serialize a batch, ship the buffers, extract row views
//! - Projections, selections and nulls
//! - Rejection of corrupt blocks as a whole
//! - Independent blocks processed on parallel threads against a shared schema

use std::sync::Arc;
use std::thread;

use rowwire::error::wire_error;
use rowwire::{
    deserialize_row_block, extract_rows_from_row_block, rewrite_row_block_pointers,
    serialize_row_batch, ColumnType, DataType, LoadedRowBlock, RowBatch, RowBatchBuilder,
    RowBlockPb, Schema, SchemaBuilder, Value, WireError,
};

fn events_schema() -> Arc<Schema> {
    Arc::new(
        SchemaBuilder::new()
            .add_hash_key_column("tenant", DataType::String)
            .add_key_column("seq", DataType::Int64)
            .add_column("kind", DataType::Int8)
            .add_nullable_column("payload", DataType::Binary)
            .add_nullable_column("labels", ColumnType::set(DataType::String))
            .build()
            .unwrap(),
    )
}

fn event(tenant: &str, seq: i64, payload: Option<&[u8]>) -> Vec<Value> {
    vec![
        Value::from(tenant),
        Value::Int64(seq),
        Value::Int8((seq % 3) as i8),
        payload.map_or(Value::Null, |p| Value::Binary(p.to_vec())),
        Value::Set(vec![Value::String(format!("l{}", seq))]),
    ]
}

fn events_batch(schema: &Arc<Schema>, count: i64) -> RowBatch {
    let mut builder = RowBatchBuilder::new(Arc::clone(schema));
    for seq in 0..count {
        let payload = vec![seq as u8; seq as usize % 5];
        let payload = (seq % 4 != 0).then_some(payload.as_slice());
        builder.push_row(&event("acme", seq, payload)).unwrap();
    }
    builder.finish()
}

mod roundtrip_tests {
    use super::*;

    #[test]
    fn every_selected_row_survives_the_wire() {
        let schema = events_schema();
        let batch = events_batch(&schema, 50);

        let mut direct = Vec::new();
        let mut indirect = Vec::new();
        let block = serialize_row_batch(&batch, None, &mut direct, &mut indirect).unwrap();
        assert_eq!(block.num_rows, 50);

        let views = extract_rows_from_row_block(&schema, &block, &indirect, &mut direct).unwrap();
        for (row, view) in views.iter().enumerate() {
            assert_eq!(view.values().unwrap(), batch.row_values(row).unwrap());
        }
    }

    #[test]
    fn batch_can_be_dropped_before_the_block_is_read() {
        let schema = events_schema();
        let expected;
        let mut direct = Vec::new();
        let mut indirect = Vec::new();
        {
            let batch = events_batch(&schema, 3);
            expected = batch.row_values(2).unwrap();
            serialize_row_batch(&batch, None, &mut direct, &mut indirect).unwrap();
        }

        let views = deserialize_row_block(&schema, &mut direct, &indirect).unwrap();
        assert_eq!(views[2].values().unwrap(), expected);
    }

    #[test]
    fn deselected_rows_are_skipped() {
        let schema = events_schema();
        let mut batch = events_batch(&schema, 10);
        for row in (0..10).filter(|r| r % 2 == 1) {
            batch.selection_mut().set(row, false);
        }

        let mut direct = Vec::new();
        let mut indirect = Vec::new();
        let block = serialize_row_batch(&batch, None, &mut direct, &mut indirect).unwrap();
        assert_eq!(block.num_rows, 5);

        let views = extract_rows_from_row_block(&schema, &block, &indirect, &mut direct).unwrap();
        let seqs: Vec<i64> = views.iter().map(|v| v.get_i64(1).unwrap()).collect();
        assert_eq!(seqs, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn loaded_block_can_be_resent_and_loaded_again() {
        let schema = events_schema();
        let batch = events_batch(&schema, 8);

        let mut direct = Vec::new();
        let mut indirect = Vec::new();
        let block = serialize_row_batch(&batch, None, &mut direct, &mut indirect).unwrap();

        let first = LoadedRowBlock::load(Arc::clone(&schema), &block, direct, indirect).unwrap();
        let first_values: Vec<_> = first.rows().map(|r| r.values().unwrap()).collect();
        let (block, direct, indirect) = first.into_wire().unwrap();

        let copied_indirect = indirect.clone();
        drop(indirect);
        let second =
            LoadedRowBlock::load(Arc::clone(&schema), &block, direct, copied_indirect).unwrap();
        let second_values: Vec<_> = second.rows().map(|r| r.values().unwrap()).collect();
        assert_eq!(first_values, second_values);
    }
}

mod rejection_tests {
    use super::*;

    #[test]
    fn truncated_indirect_buffer_rejects_the_block() {
        let schema = events_schema();
        let batch = events_batch(&schema, 6);

        let mut direct = Vec::new();
        let mut indirect = Vec::new();
        let block = serialize_row_batch(&batch, None, &mut direct, &mut indirect).unwrap();
        indirect.truncate(indirect.len() - 1);
        let before = direct.clone();

        let err = extract_rows_from_row_block(&schema, &block, &indirect, &mut direct).unwrap_err();
        assert!(wire_error(&err).is_some_and(WireError::is_corrupt_data));
        assert_eq!(direct, before);
    }

    #[test]
    fn wrong_row_count_rejects_the_block() {
        let schema = events_schema();
        let batch = events_batch(&schema, 2);

        let mut direct = Vec::new();
        let mut indirect = Vec::new();
        serialize_row_batch(&batch, None, &mut direct, &mut indirect).unwrap();

        let block = RowBlockPb { num_rows: 1 };
        let err = extract_rows_from_row_block(&schema, &block, &indirect, &mut direct).unwrap_err();
        assert!(matches!(wire_error(&err), Some(WireError::CorruptData(_))));
    }

    #[test]
    fn garbage_direct_buffer_never_panics() {
        let schema = events_schema();
        let stride = schema.row_stride();
        for seed in 0u8..32 {
            let mut direct: Vec<u8> = (0..stride * 2)
                .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
                .collect();
            let _ = rewrite_row_block_pointers(&schema, &mut direct, b"short");
        }
    }
}

mod concurrency_tests {
    use super::*;

    #[test]
    fn independent_blocks_roundtrip_in_parallel() {
        let schema = events_schema();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let schema = Arc::clone(&schema);
                thread::spawn(move || {
                    let batch = events_batch(&schema, 20 + t);
                    let mut direct = Vec::new();
                    let mut indirect = Vec::new();
                    let block =
                        serialize_row_batch(&batch, None, &mut direct, &mut indirect).unwrap();
                    let views =
                        extract_rows_from_row_block(&schema, &block, &indirect, &mut direct)
                            .unwrap();
                    views.len()
                })
            })
            .collect();

        let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(counts, vec![20, 21, 22, 23]);
    }
}
