//! Per-domain loaders. Every loader has the shape `fn(&ManifestEntry,
//! &Resolver, &mut PgConnection) -> Result<LoadResult, LoadError>`, matches
//! the manifest row count against the post-COPY row count, and runs inside
//! its own transaction so a failure never leaves a half-loaded table.

pub mod awards_draft_supplementary;
pub mod dimensions;
pub mod games;
pub mod pbp;
pub mod player_season;
pub mod team_season;

use crate::errors::LoadError;
use crate::manifest::ManifestEntry;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Debug, Clone)]
pub struct LoadResult {
    pub table: String,
    pub rows_in: i64,
    pub rows_out: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub issues: Vec<String>,
}

/// A loader's expected row count per spec.md §4.4: the manifest's line count
/// minus the CSV header row.
pub fn expected_rows_in(entry: &ManifestEntry) -> i64 {
    entry.line_count.saturating_sub(1) as i64
}

/// Runs `body` inside a transaction, then checks `count_query` against
/// `expected_rows_in(entry)`, producing `LoadError::CountMismatch` if they
/// disagree. `count_query` runs in the same transaction so the count is
/// exactly what `body` just committed (pending the enclosing transaction's
/// own commit by the caller).
pub fn finish_load<F>(
    entry: &ManifestEntry,
    started_at: DateTime<Utc>,
    conn: &mut PgConnection,
    count_query: F,
) -> Result<LoadResult, LoadError>
where
    F: FnOnce(&mut PgConnection) -> QueryResult<i64>,
{
    let expected = expected_rows_in(entry);
    let actual = count_query(conn)?;
    if actual != expected {
        return Err(LoadError::CountMismatch {
            table: entry.target_table.clone(),
            expected,
            actual,
        });
    }

    Ok(LoadResult {
        table: entry.target_table.clone(),
        rows_in: expected,
        rows_out: actual,
        started_at,
        ended_at: Utc::now(),
        issues: Vec::new(),
    })
}

/// Parses `"MM:SS"` clock strings into whole seconds, per spec.md §4.4's
/// transformation rule for time columns.
pub fn parse_clock_to_seconds(raw: &str) -> Result<i32, LoadError> {
    let (minutes, seconds) = raw.split_once(':').ok_or_else(|| LoadError::TypeCoercion {
        table: "pbp_events".into(),
        column: "clock_remaining".into(),
        value: raw.to_string(),
    })?;
    let minutes: i32 = minutes.parse().map_err(|_| LoadError::TypeCoercion {
        table: "pbp_events".into(),
        column: "clock_remaining".into(),
        value: raw.to_string(),
    })?;
    let seconds: i32 = seconds.parse().map_err(|_| LoadError::TypeCoercion {
        table: "pbp_events".into(),
        column: "clock_remaining".into(),
        value: raw.to_string(),
    })?;
    Ok(minutes * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_clock_to_seconds_converts_minutes_and_seconds() {
        assert_eq!(parse_clock_to_seconds("11:45").unwrap(), 705);
        assert_eq!(parse_clock_to_seconds("00:00").unwrap(), 0);
    }

    #[test]
    fn parse_clock_to_seconds_rejects_malformed_input() {
        assert!(parse_clock_to_seconds("garbage").is_err());
    }
}
