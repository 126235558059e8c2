//! Post-write checks the schema's own constraints can't express: row-count
//! reconciliation against the manifest, FK coverage sweeps, basketball
//! domain rules, and cross-table sanity checks. Mirrors
//! `hoopsdb_db::resolver`'s read-only query style — every function here
//! only ever reads, never writes outside of `etl_run_issues`.

use crate::errors::{Severity, ValidationError};
use crate::manifest::Manifest;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel::{PgConnection, QueryableByName, RunQueryDsl};

#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub step: String,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    fn new(step: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            step: step.to_string(),
            severity,
            message: message.into(),
        }
    }
}

/// Pre-load phase: `Manifest::verify_file` for every entry, matching
/// spec.md §4.5's "abort on first failure unless inspect-only" rule — here
/// expressed as collecting every mismatch rather than aborting, so the
/// caller (the orchestrator) decides whether inspect-only applies.
pub fn run_preload(manifest: &Manifest, csv_dir: &std::path::Path) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for entry in &manifest.entries {
        match crate::manifest::verify_file(entry, csv_dir) {
            Ok(report) => {
                if report.computed_sha256 != entry.sha256 {
                    issues.push(ValidationIssue::new(
                        "preload",
                        Severity::Error,
                        format!(
                            "{}: sha256 mismatch, manifest says {} but file has {}",
                            entry.csv_file, entry.sha256, report.computed_sha256
                        ),
                    ));
                }
                if report.computed_line_count != entry.line_count {
                    issues.push(ValidationIssue::new(
                        "preload",
                        Severity::Error,
                        format!(
                            "{}: line count mismatch, manifest says {} but file has {}",
                            entry.csv_file, entry.line_count, report.computed_line_count
                        ),
                    ));
                }
            }
            Err(e) => {
                issues.push(ValidationIssue::new("preload", Severity::Error, e.to_string()));
            }
        }
    }
    issues
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct NamedCountRow {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

fn scalar_count(conn: &mut PgConnection, sql: &str) -> Result<i64, ValidationError> {
    let row: CountRow = diesel::sql_query(sql).get_result(conn)?;
    Ok(row.count)
}

/// One declared FK edge checked via an anti-join: `child.fk_column`
/// referencing `parent.pk_column` through `parent_table`, skipping NULL
/// foreign keys (nullable FKs, e.g. `draft_picks.player_id`, are allowed to
/// be unresolved by design).
struct FkEdge {
    child_table: &'static str,
    fk_column: &'static str,
    parent_table: &'static str,
    parent_column: &'static str,
}

const FK_EDGES: &[FkEdge] = &[
    FkEdge { child_table: "warehouse.player_season_per_game", fk_column: "seas_id", parent_table: "warehouse.player_season", parent_column: "seas_id" },
    FkEdge { child_table: "warehouse.player_season_totals", fk_column: "seas_id", parent_table: "warehouse.player_season", parent_column: "seas_id" },
    FkEdge { child_table: "warehouse.player_season_per36", fk_column: "seas_id", parent_table: "warehouse.player_season", parent_column: "seas_id" },
    FkEdge { child_table: "warehouse.player_season_per100", fk_column: "seas_id", parent_table: "warehouse.player_season", parent_column: "seas_id" },
    FkEdge { child_table: "warehouse.player_season_advanced", fk_column: "seas_id", parent_table: "warehouse.player_season", parent_column: "seas_id" },
    FkEdge { child_table: "warehouse.team_season_totals", fk_column: "team_season_id", parent_table: "warehouse.team_season", parent_column: "team_season_id" },
    FkEdge { child_table: "warehouse.boxscore_team", fk_column: "game_id", parent_table: "warehouse.games", parent_column: "game_id" },
    FkEdge { child_table: "warehouse.boxscore_player", fk_column: "game_id", parent_table: "warehouse.games", parent_column: "game_id" },
    FkEdge { child_table: "warehouse.pbp_events", fk_column: "game_id", parent_table: "warehouse.games", parent_column: "game_id" },
];

fn check_fk_coverage(conn: &mut PgConnection) -> Result<Vec<ValidationIssue>, ValidationError> {
    let mut issues = Vec::new();
    for edge in FK_EDGES {
        let sql = format!(
            "SELECT COUNT(*)::bigint AS count FROM {child} c LEFT JOIN {parent} p ON c.{fk} = p.{pk} WHERE c.{fk} IS NOT NULL AND p.{pk} IS NULL",
            child = edge.child_table,
            parent = edge.parent_table,
            fk = edge.fk_column,
            pk = edge.parent_column,
        );
        let orphan_count = scalar_count(conn, &sql)?;
        if orphan_count > 0 {
            issues.push(ValidationIssue::new(
                "postload_fk_coverage",
                Severity::Error,
                format!(
                    "{} orphan rows in {} referencing {}",
                    orphan_count, edge.child_table, edge.parent_table
                ),
            ));
        }
    }
    Ok(issues)
}

fn check_row_counts(conn: &mut PgConnection, manifest: &Manifest) -> Result<Vec<ValidationIssue>, ValidationError> {
    let mut issues = Vec::new();
    let mut seen_tables = std::collections::HashSet::new();
    for entry in &manifest.entries {
        if !seen_tables.insert(entry.target_table.clone()) {
            continue;
        }
        let expected = entry.line_count.saturating_sub(1) as i64;
        let sql = format!("SELECT COUNT(*)::bigint AS count FROM warehouse.{}", entry.target_table);
        let actual = match scalar_count(conn, &sql) {
            Ok(n) => n,
            Err(_) => continue,
        };
        if actual != expected {
            issues.push(ValidationIssue::new(
                "postload_row_counts",
                Severity::Warn,
                format!(
                    "{}: manifest implies {} rows, table has {}",
                    entry.target_table, expected, actual
                ),
            ));
        }
    }
    Ok(issues)
}

/// Basketball arithmetic and bounds checks from spec.md §3/§4.5: shooting
/// splits, GP/MIN ceilings, and the metric ranges PER/TS%/ORtg/DRtg are
/// expected to fall within.
fn check_domain_rules(conn: &mut PgConnection) -> Result<Vec<ValidationIssue>, ValidationError> {
    let mut issues = Vec::new();

    let bad_shooting = scalar_count(
        conn,
        "SELECT COUNT(*)::bigint AS count FROM warehouse.player_season_totals \
         WHERE fgm > fga OR fg3m > fg3a OR fg3a > fga OR ftm > fta",
    )?;
    if bad_shooting > 0 {
        issues.push(ValidationIssue::new(
            "postload_domain_rules",
            Severity::Error,
            format!("{bad_shooting} player_season_totals rows violate shooting arithmetic (made > attempted)"),
        ));
    }

    let bad_gp = scalar_count(
        conn,
        "SELECT COUNT(*)::bigint AS count FROM warehouse.player_season_totals t \
         JOIN warehouse.player_season s ON s.seas_id = t.seas_id \
         WHERE NOT s.is_total AND t.gp > 106",
    )?;
    if bad_gp > 0 {
        issues.push(ValidationIssue::new(
            "postload_domain_rules",
            Severity::Error,
            format!("{bad_gp} player_season_totals rows exceed the 106-game playoff-inclusive ceiling"),
        ));
    }

    let bad_min = scalar_count(
        conn,
        "SELECT COUNT(*)::bigint AS count FROM warehouse.player_season_totals t \
         JOIN warehouse.player_season s ON s.seas_id = t.seas_id \
         WHERE NOT s.is_total AND t.min > t.gp * 48",
    )?;
    if bad_min > 0 {
        issues.push(ValidationIssue::new(
            "postload_domain_rules",
            Severity::Warn,
            format!("{bad_min} player_season_totals rows have minutes exceeding gp * 48"),
        ));
    }

    let bad_wl = scalar_count(
        conn,
        "SELECT COUNT(*)::bigint AS count FROM warehouse.team_season \
         WHERE w < 0 OR l < 0",
    )?;
    if bad_wl > 0 {
        issues.push(ValidationIssue::new(
            "postload_domain_rules",
            Severity::Error,
            format!("{bad_wl} team_season rows have a negative win or loss count"),
        ));
    }

    let bad_per = scalar_count(
        conn,
        "SELECT COUNT(*)::bigint AS count FROM warehouse.player_season_advanced \
         WHERE per < -20 OR per > 50 OR ts_pct < 0 OR ts_pct > 1",
    )?;
    if bad_per > 0 {
        issues.push(ValidationIssue::new(
            "postload_domain_rules",
            Severity::Warn,
            format!("{bad_per} player_season_advanced rows fall outside PER/TS% expected bounds"),
        ));
    }

    let bad_clock = scalar_count(
        conn,
        "SELECT COUNT(*)::bigint AS count FROM warehouse.pbp_events \
         WHERE clock_remaining < 0 OR clock_remaining > 720",
    )?;
    if bad_clock > 0 {
        issues.push(ValidationIssue::new(
            "postload_domain_rules",
            Severity::Error,
            format!("{bad_clock} pbp_events rows have clock_remaining outside 0..=720 seconds"),
        ));
    }

    Ok(issues)
}

/// Cross-table sanity: a game's combined team score matches the sum of its
/// boxscore_team rows, within the ±1 legacy-rounding tolerance spec.md §3
/// allows.
fn check_cross_table_sanity(conn: &mut PgConnection) -> Result<Vec<ValidationIssue>, ValidationError> {
    let mut issues = Vec::new();

    let rows: Vec<NamedCountRow> = diesel::sql_query(
        "SELECT g.game_id::text AS name, \
                ABS((g.home_score + g.away_score) - COALESCE(SUM(bt.pts), 0))::bigint AS count \
         FROM warehouse.games g \
         JOIN warehouse.boxscore_team bt ON bt.game_id = g.game_id \
         GROUP BY g.game_id, g.home_score, g.away_score \
         HAVING ABS((g.home_score + g.away_score) - COALESCE(SUM(bt.pts), 0)) > 1",
    )
    .load(conn)?;

    for row in &rows {
        issues.push(ValidationIssue::new(
            "postload_cross_table",
            Severity::Warn,
            format!("game {} combined boxscore points differ from the linescore by {}", row.name, row.count),
        ));
    }

    Ok(issues)
}

/// Runs every post-load check inside the run's connection and returns the
/// combined issue list, without writing `etl_run_issues` rows itself —
/// that persistence step belongs to the orchestrator, which has the run id.
pub fn run_postload(conn: &mut PgConnection, manifest: &Manifest) -> Result<Vec<ValidationIssue>, ValidationError> {
    let mut issues = Vec::new();
    issues.extend(check_row_counts(conn, manifest)?);
    issues.extend(check_fk_coverage(conn)?);
    issues.extend(check_domain_rules(conn)?);
    issues.extend(check_cross_table_sanity(conn)?);
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_issue_carries_the_step_that_raised_it() {
        let issue = ValidationIssue::new("postload_domain_rules", Severity::Error, "bad data");
        assert_eq!(issue.step, "postload_domain_rules");
        assert_eq!(issue.severity.as_str(), "ERROR");
    }
}
