use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::etl::etl::etl_runs)]
pub struct NewEtlRun {
    pub started_at: DateTime<Utc>,
    pub mode: String,
    pub status: String,
}

#[derive(Debug, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::etl::etl::etl_runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbEtlRun {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub mode: String,
    pub status: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::etl::etl::etl_run_steps)]
pub struct NewEtlRunStep<'a> {
    pub run_id: i64,
    pub step: &'a str,
    pub rows_in: i64,
    pub rows_out: i64,
    pub status: &'a str,
    pub chunk_min_key: Option<i64>,
    pub chunk_max_key: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::etl::etl::etl_run_steps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbEtlRunStep {
    pub id: i64,
    pub run_id: i64,
    pub step: String,
    pub rows_in: i64,
    pub rows_out: i64,
    pub status: String,
    pub chunk_min_key: Option<i64>,
    pub chunk_max_key: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::etl::etl::etl_run_issues)]
pub struct NewEtlRunIssue<'a> {
    pub run_id: i64,
    pub step: &'a str,
    pub severity: &'a str,
    pub message: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::etl::etl::etl_run_issues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbEtlRunIssue {
    pub id: i64,
    pub run_id: i64,
    pub step: String,
    pub severity: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::etl::etl::load_manifests)]
pub struct NewLoadManifest<'a> {
    pub file: &'a str,
    pub sha256: &'a str,
    pub row_count: i64,
    pub loaded_at: DateTime<Utc>,
    pub operator: Option<&'a str>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::etl::etl::load_manifests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbLoadManifest {
    pub id: i64,
    pub file: String,
    pub sha256: String,
    pub row_count: i64,
    pub loaded_at: DateTime<Utc>,
    pub operator: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::etl::etl::schema_migration_checksums)]
pub struct NewSchemaMigrationChecksum<'a> {
    pub version: &'a str,
    pub sha256: &'a str,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::etl::etl::schema_migration_checksums)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbSchemaMigrationChecksum {
    pub version: String,
    pub sha256: String,
    pub applied_at: DateTime<Utc>,
}
