//! Fuzz testing for the schema byte form.
//!
//! Arbitrary bytes go through `SchemaPb::decode` and, when that succeeds,
//! through `schema_from_wire`. Neither step may panic, and any schema that
//! validates must survive another trip through the wire with the same
//! columns and layout.

#![no_main]

use libfuzzer_sys::fuzz_target;

use rowwire::{schema_from_wire, schema_to_wire, SchemaPb};

fuzz_target!(|data: &[u8]| {
    let Ok(pb) = SchemaPb::decode(data) else {
        return;
    };
    let Ok(schema) = schema_from_wire(&pb) else {
        return;
    };

    let bytes = schema_to_wire(&schema, 0).unwrap().encode().unwrap();
    let again = schema_from_wire(&SchemaPb::decode(&bytes).unwrap()).unwrap();
    assert_eq!(again.column_count(), schema.column_count());
    assert_eq!(again.num_key_columns(), schema.num_key_columns());
    assert_eq!(again.row_stride(), schema.row_stride());
    assert_eq!(again.column_ids(), schema.column_ids());
});
