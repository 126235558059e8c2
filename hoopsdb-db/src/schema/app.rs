// Diesel table definition for the optional DB-backed Saved Queries Store
// (see hoopsdb-query::saved_queries). The filesystem backend is the default;
// this table exists so the pluggable-backend contract in SPEC_FULL.md §5.8
// has a real DB-side counterpart.

pub mod app {
    diesel::table! {
        app.saved_queries (id) {
            id -> Text,
            schema_version -> Int4,
            ir_json -> Jsonb,
            ir_sha256 -> Text,
            version -> Int4,
            last_result_row_count -> Nullable<Int8>,
            tombstoned -> Bool,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }
}
