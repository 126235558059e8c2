// Diesel table definitions for the `etl` schema: run bookkeeping, migration
// checksum ledger, and the manifest completion record. Append-only tables
// except for the single status transition on `etl_runs` noted in
// SPEC_FULL.md §4.

pub mod etl {
    diesel::table! {
        etl.etl_runs (id) {
            id -> Int8,
            started_at -> Timestamptz,
            ended_at -> Nullable<Timestamptz>,
            mode -> Text,
            status -> Text,
        }
    }

    diesel::table! {
        etl.etl_run_steps (id) {
            id -> Int8,
            run_id -> Int8,
            step -> Text,
            rows_in -> Int8,
            rows_out -> Int8,
            status -> Text,
            chunk_min_key -> Nullable<Int8>,
            chunk_max_key -> Nullable<Int8>,
            started_at -> Timestamptz,
            ended_at -> Nullable<Timestamptz>,
        }
    }

    diesel::table! {
        etl.etl_run_issues (id) {
            id -> Int8,
            run_id -> Int8,
            step -> Text,
            severity -> Text,
            message -> Text,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        etl.load_manifests (id) {
            id -> Int8,
            file -> Text,
            sha256 -> Text,
            row_count -> Int8,
            loaded_at -> Timestamptz,
            operator -> Nullable<Text>,
        }
    }

    diesel::table! {
        etl.schema_migration_checksums (version) {
            version -> Text,
            sha256 -> Text,
            applied_at -> Timestamptz,
        }
    }

    diesel::joinable!(etl_run_steps -> etl_runs (run_id));
    diesel::joinable!(etl_run_issues -> etl_runs (run_id));

    diesel::allow_tables_to_appear_in_same_query!(
        etl_runs,
        etl_run_steps,
        etl_run_issues,
        load_manifests,
        schema_migration_checksums,
    );
}
