//! # Schema Wire Tests
//!
//! Schema conversion through the public API: flag handling, byte-form
//! transport of `SchemaPb`, and rejection of invalid column lists.

use rowwire::error::wire_error;
use rowwire::schema::{
    column_pbs_to_schema, schema_to_column_pbs, schema_to_wire_without_ids, ColumnStorageAttributes,
    CompressionType, EncodingType, SortingType,
};
use rowwire::{
    schema_flags, schema_from_columns, schema_from_wire, schema_to_wire, ColumnSchema, ColumnType,
    DataType, Schema, SchemaBuilder, SchemaPb, Value, WireError,
};

fn orders_schema() -> Schema {
    SchemaBuilder::new()
        .add_hash_key_column("customer", DataType::Uuid)
        .add_column_schema(
            ColumnSchema::new("placed_at", DataType::Timestamp)
                .key()
                .sorting(SortingType::Descending),
        )
        .add_column_schema(
            ColumnSchema::new("status", DataType::String)
                .with_read_default(Value::from("new"))
                .unwrap()
                .storage(ColumnStorageAttributes {
                    encoding: EncodingType::Prefix,
                    compression: CompressionType::Snappy,
                    block_size: 32 * 1024,
                }),
        )
        .add_nullable_column("items", ColumnType::map(DataType::String, DataType::Int32))
        .add_nullable_column("total", DataType::Double)
        .build()
        .unwrap()
}

mod roundtrip_tests {
    use super::*;

    #[test]
    fn schema_survives_wire_and_byte_form() {
        let schema = orders_schema();

        let bytes = schema_to_wire(&schema, 0).unwrap().encode().unwrap();
        let back = schema_from_wire(&SchemaPb::decode(&bytes).unwrap()).unwrap();

        assert_eq!(back, schema);
        assert_eq!(back.num_key_columns(), 2);
        assert_eq!(back.row_stride(), schema.row_stride());
        assert_eq!(
            back.columns()[2].read_default(),
            Some(&Value::from("new"))
        );
    }

    #[test]
    fn client_authored_schema_drops_ids_and_storage() {
        let schema = orders_schema();
        let flags = schema_flags::WITHOUT_IDS | schema_flags::WITHOUT_STORAGE_ATTRIBUTES;

        let pb = schema_to_wire(&schema, flags).unwrap();
        assert!(pb.columns.iter().all(|c| c.id.is_none() && c.storage.is_none()));

        let back = schema_from_wire(&pb).unwrap();
        assert!(!back.has_column_ids());
        assert_eq!(back.columns()[2].read_default(), Some(&Value::from("new")));
        assert_eq!(
            *back.columns()[2].storage_attributes(),
            ColumnStorageAttributes::default()
        );
    }

    #[test]
    fn server_assigned_ids_restore_equality() {
        let schema = orders_schema();
        let pb = schema_to_wire_without_ids(&schema).unwrap();

        let mut pbs = pb.columns;
        for (pb, id) in pbs.iter_mut().zip(schema.column_ids()) {
            pb.id = Some(id.0);
        }
        assert_eq!(column_pbs_to_schema(&pbs).unwrap(), schema);
    }
}

mod rejection_tests {
    use super::*;

    fn is_invalid_schema(report: &eyre::Report) -> bool {
        matches!(wire_error(report), Some(WireError::InvalidSchema(_)))
    }

    #[test]
    fn nullable_key_in_prefix_is_rejected() {
        let err = schema_from_columns(vec![
            ColumnSchema::new("a", DataType::Int32).hash_key(),
            ColumnSchema::new("b", DataType::Int32).key().nullable(true),
        ])
        .unwrap_err();
        assert!(is_invalid_schema(&err));
        assert!(err.to_string().contains("nullable key column"));
    }

    #[test]
    fn gap_in_key_prefix_is_rejected() {
        let err = schema_from_columns(vec![
            ColumnSchema::new("a", DataType::Int32).hash_key(),
            ColumnSchema::new("b", DataType::Int32),
            ColumnSchema::new("c", DataType::Int32).key(),
        ])
        .unwrap_err();
        assert!(is_invalid_schema(&err));
        assert!(err.to_string().contains("out-of-order key column"));
    }

    #[test]
    fn tampered_byte_form_is_rejected() {
        let schema = orders_schema();
        let pbs = schema_to_column_pbs(&schema, 0).unwrap();
        let mut bytes = SchemaPb { columns: pbs }.encode().unwrap();

        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let tampered = SchemaPb::decode(&bytes).and_then(|pb| schema_from_wire(&pb));
        assert!(tampered.is_err() || tampered.unwrap() != schema);

        bytes.truncate(bytes.len() / 2);
        let err = SchemaPb::decode(&bytes).unwrap_err();
        assert!(matches!(wire_error(&err), Some(WireError::Protocol(_))));
    }
}
