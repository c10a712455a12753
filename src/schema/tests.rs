//! Tests for the schema module

use super::*;
use crate::error::{wire_error, WireError};
use crate::types::{ColumnType, DataType, Value};

fn invalid_schema_message(report: &eyre::Report) -> String {
    match wire_error(report) {
        Some(WireError::InvalidSchema(msg)) => msg.clone(),
        other => panic!("expected InvalidSchema, got {:?}", other),
    }
}

fn udt_schema() -> Schema {
    SchemaBuilder::new()
        .add_hash_key_column("keyspace_name", DataType::String)
        .add_key_column("type_name", DataType::String)
        .add_nullable_column("field_names", ColumnType::list(DataType::String))
        .add_nullable_column("field_types", ColumnType::list(DataType::String))
        .build()
        .unwrap()
}

#[test]
fn schema_from_columns_infers_key_count() {
    let (schema, num_keys) = schema_from_columns(vec![
        ColumnSchema::new("id", DataType::Int32).hash_key(),
        ColumnSchema::new("ts", DataType::Timestamp).key(),
        ColumnSchema::new("body", DataType::String).nullable(true),
    ])
    .unwrap();

    assert_eq!(num_keys, 2);
    assert_eq!(schema.num_key_columns(), 2);
    assert_eq!(schema.num_hash_key_columns(), 1);
    assert!(schema.is_key_column(1));
    assert!(!schema.is_key_column(2));
    assert!(!schema.has_column_ids());
}

#[test]
fn nullable_key_column_is_rejected() {
    let err = schema_from_columns(vec![
        ColumnSchema::new("id", DataType::Int32).key().nullable(true),
        ColumnSchema::new("v", DataType::Int32),
    ])
    .unwrap_err();

    assert!(invalid_schema_message(&err).contains("nullable key column"));
}

#[test]
fn non_contiguous_key_columns_are_rejected() {
    let err = schema_from_columns(vec![
        ColumnSchema::new("id", DataType::Int32).key(),
        ColumnSchema::new("v", DataType::Int32),
        ColumnSchema::new("late", DataType::Int32).key(),
    ])
    .unwrap_err();

    let msg = invalid_schema_message(&err);
    assert!(msg.contains("out-of-order key column"));
    assert!(msg.contains("late"));
}

#[test]
fn key_column_not_at_index_zero_is_rejected() {
    let err = schema_from_columns(vec![
        ColumnSchema::new("v", DataType::Int32),
        ColumnSchema::new("id", DataType::Int32).key(),
    ])
    .unwrap_err();

    assert!(invalid_schema_message(&err).contains("contiguous"));
}

#[test]
fn hash_key_after_range_key_is_rejected() {
    let err = schema_from_columns(vec![
        ColumnSchema::new("a", DataType::Int32).key(),
        ColumnSchema::new("b", DataType::Int32).hash_key(),
    ])
    .unwrap_err();

    assert!(invalid_schema_message(&err).contains("follows a range key column"));
}

#[test]
fn duplicate_column_names_are_rejected() {
    let err = schema_from_columns(vec![
        ColumnSchema::new("a", DataType::Int32),
        ColumnSchema::new("a", DataType::String),
    ])
    .unwrap_err();

    assert!(invalid_schema_message(&err).contains("duplicate column name"));
}

#[test]
fn column_ids_must_match_columns() {
    let columns = vec![
        ColumnSchema::new("a", DataType::Int32),
        ColumnSchema::new("b", DataType::Int32),
    ];

    let err = Schema::new(columns.clone(), vec![ColumnId(10)]).unwrap_err();
    assert!(invalid_schema_message(&err).contains("mismatched column ids"));

    let err = Schema::new(columns, vec![ColumnId(10), ColumnId(10)]).unwrap_err();
    assert!(invalid_schema_message(&err).contains("duplicate column id"));
}

#[test]
fn builder_assigns_sequential_ids_from_first_column_id() {
    let schema = udt_schema();

    let ids: Vec<u32> = schema.column_ids().iter().map(|id| id.0).collect();
    assert_eq!(ids, vec![10, 11, 12, 13]);
    assert_eq!(schema.find_column("field_types"), Some(3));
    assert_eq!(schema.find_column("missing"), None);
}

#[test]
fn builder_without_ids_leaves_ids_unset() {
    let schema = SchemaBuilder::without_ids()
        .add_hash_key_column("id", DataType::Int64)
        .build()
        .unwrap();

    assert!(!schema.has_column_ids());
    assert_eq!(schema.column_id(0), None);
}

#[test]
fn builder_honours_custom_first_id() {
    let schema = SchemaBuilder::new()
        .next_id(100)
        .add_hash_key_column("id", DataType::Int64)
        .add_column("v", DataType::Double)
        .build()
        .unwrap();

    assert_eq!(schema.column_id(1), Some(ColumnId(101)));
}

#[test]
fn row_layout_places_var_slots_and_null_bitmap() {
    let schema = SchemaBuilder::new()
        .add_hash_key_column("id", DataType::Int32)
        .add_column("name", DataType::String)
        .add_nullable_column("score", DataType::Double)
        .build()
        .unwrap();

    assert_eq!(schema.column_offset(0), 0);
    assert_eq!(schema.column_offset(1), 4);
    assert_eq!(schema.column_offset(2), 20);
    assert_eq!(schema.byte_size(), 28);
    assert!(schema.has_nullables());
    assert_eq!(schema.null_bitmap_size(), 1);
    assert_eq!(schema.row_stride(), 29);
    assert_eq!(schema.var_column_indices().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn schema_without_nullables_has_no_bitmap() {
    let schema = SchemaBuilder::new()
        .add_hash_key_column("id", DataType::Int32)
        .add_column("name", DataType::String)
        .build()
        .unwrap();

    assert_eq!(schema.null_bitmap_size(), 0);
    assert_eq!(schema.row_stride(), 20);
}

#[test]
fn schema_roundtrips_through_wire_with_ids() {
    let schema = udt_schema();

    let pb = schema_to_wire(&schema, 0).unwrap();
    assert!(pb.columns.iter().all(|c| c.id.is_some()));
    assert!(pb.columns.iter().all(|c| c.storage.is_some()));

    let back = schema_from_wire(&pb).unwrap();
    assert_eq!(back, schema);
}

#[test]
fn without_ids_flag_drops_ids_and_reassignment_restores_equality() {
    let schema = udt_schema();

    let pb = schema_to_wire_without_ids(&schema).unwrap();
    assert!(pb.columns.iter().all(|c| c.id.is_none()));

    let back = schema_from_wire(&pb).unwrap();
    assert!(!back.has_column_ids());
    assert!(back.equals_ignoring_ids(&schema));
    assert_ne!(back, schema);

    let reassigned = back.with_column_ids(schema.column_ids().to_vec()).unwrap();
    assert_eq!(reassigned, schema);
}

#[test]
fn without_storage_attributes_flag_resets_storage_to_defaults() {
    let schema = SchemaBuilder::new()
        .add_column_schema(
            ColumnSchema::new("id", DataType::Int32)
                .hash_key()
                .storage(ColumnStorageAttributes {
                    encoding: EncodingType::Prefix,
                    compression: CompressionType::Lz4,
                    block_size: 8192,
                }),
        )
        .build()
        .unwrap();

    let pb = schema_to_wire(&schema, schema_flags::WITHOUT_STORAGE_ATTRIBUTES).unwrap();
    assert!(pb.columns[0].storage.is_none());
    assert_eq!(pb.columns[0].id, Some(10));

    let back = schema_from_wire(&pb).unwrap();
    assert_eq!(
        *back.columns()[0].storage_attributes(),
        ColumnStorageAttributes::default()
    );

    let full = schema_from_wire(&schema_to_wire(&schema, 0).unwrap()).unwrap();
    assert_eq!(full.columns()[0].storage_attributes().block_size, 8192);
}

#[test]
fn defaults_and_sorting_survive_the_wire() {
    let column = ColumnSchema::new("ts", DataType::Timestamp)
        .key()
        .sorting(SortingType::Descending);
    let body = ColumnSchema::new("body", ColumnType::map(DataType::String, DataType::Int64))
        .nullable(true)
        .with_read_default(Value::Map(vec![(Value::from("n"), Value::Int64(1))]))
        .unwrap()
        .with_write_default(Value::Null)
        .unwrap();

    for col in [column, body] {
        let pb = column_to_wire(&col, 0).unwrap();
        let back = column_from_wire(&pb).unwrap();
        assert_eq!(back, col);
    }
}

#[test]
fn mistyped_default_is_rejected() {
    let err = ColumnSchema::new("n", DataType::Int32)
        .with_read_default(Value::from("text"))
        .unwrap_err();
    assert!(err.to_string().contains("does not match type int"));
}

#[test]
fn column_tuple_reports_keys_and_ids() {
    let pbs = schema_to_column_pbs(&udt_schema(), 0).unwrap();
    let (columns, ids, num_keys) = column_pbs_to_column_tuple(&pbs).unwrap();

    assert_eq!(columns.len(), 4);
    assert_eq!(ids.len(), 4);
    assert_eq!(num_keys, 2);
}

#[test]
fn partially_identified_columns_are_rejected() {
    let mut pbs = schema_to_column_pbs(&udt_schema(), 0).unwrap();
    pbs[2].id = None;

    let err = column_pbs_to_schema(&pbs).unwrap_err();
    assert!(invalid_schema_message(&err).contains("mismatched column ids"));
}

#[test]
fn out_of_order_wire_keys_are_rejected() {
    let mut pbs = schema_to_column_pbs(&udt_schema(), 0).unwrap();
    pbs[3].is_key = true;

    let err = column_pbs_to_column_tuple(&pbs).unwrap_err();
    assert!(invalid_schema_message(&err).contains("out-of-order key column"));
}

#[test]
fn unknown_wire_type_is_a_protocol_error() {
    let mut pbs = schema_to_column_pbs(&udt_schema(), 0).unwrap();
    pbs[2].data_type = 99;

    let err = column_pbs_to_schema(&pbs).unwrap_err();
    assert!(matches!(wire_error(&err), Some(WireError::Protocol(_))));
}

#[test]
fn schema_pb_byte_form_roundtrips_to_equal_schema() {
    let schema = udt_schema();
    let bytes = schema_to_wire(&schema, 0).unwrap().encode().unwrap();

    let back = schema_from_wire(&SchemaPb::decode(&bytes).unwrap()).unwrap();
    assert_eq!(back, schema);
}
