//! Stage 3: player_season hub, then its five satellites. The hub loads
//! first so `seas_id` values exist before any satellite row references one,
//! per spec.md §4.4's hub-before-satellite rule.

use super::{LoadResult, finish_load};
use crate::errors::LoadError;
use crate::manifest::ManifestEntry;
use chrono::Utc;
use diesel::prelude::*;
use hoopsdb_db::models::{
    NewPlayerSeason, NewPlayerSeasonAdvanced, NewPlayerSeasonPer36, NewPlayerSeasonPer100,
    NewPlayerSeasonPerGame, NewPlayerSeasonTotals,
};
use hoopsdb_db::schema::warehouse::warehouse::{
    player_season, player_season_advanced, player_season_per36, player_season_per100,
    player_season_per_game, player_season_totals,
};
use hoopsdb_db::{Resolver, seas_id};
use std::path::Path;

const TOTAL_TEAM_MARKER: &str = "TOT";

#[derive(Debug, serde::Deserialize)]
struct PlayerSeasonRow {
    player_key: String,
    season_end_year: i32,
    team: String,
}

/// Loads the hub. `team == "TOT"` (spec.md §4.4) maps to `team_id = NULL`,
/// `is_total = true`; any other value resolves through the abbrev mapping.
pub fn load_player_season_hub(
    entry: &ManifestEntry,
    resolver: &Resolver,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<PlayerSeasonRow>() {
            let row = row?;
            let player_id = resolver.resolve_player(&row.player_key)?;
            let season_id = resolver.resolve_season(row.season_end_year)?;

            let (team_id, is_total) = if row.team == TOTAL_TEAM_MARKER {
                (None, true)
            } else {
                (Some(resolver.resolve_team(&row.team, row.season_end_year)?), false)
            };

            diesel::insert_into(player_season::table)
                .values(NewPlayerSeason {
                    seas_id: seas_id(player_id, season_id, team_id),
                    player_id,
                    season_id,
                    team_id,
                    is_total,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        player_season::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct PerGameRow {
    seas_id: i64,
    gp: i32,
    gs: Option<i32>,
    min: Option<String>,
    pts: Option<String>,
    reb: Option<String>,
    ast: Option<String>,
    stl: Option<String>,
    blk: Option<String>,
    tov: Option<String>,
    fg_pct: Option<String>,
    fg3_pct: Option<String>,
    ft_pct: Option<String>,
}

fn numeric(v: &Option<String>, table: &str, column: &str) -> Result<Option<bigdecimal::BigDecimal>, LoadError> {
    use std::str::FromStr;
    v.as_ref()
        .map(|s| bigdecimal::BigDecimal::from_str(s).map_err(|_| LoadError::TypeCoercion {
            table: table.into(),
            column: column.into(),
            value: s.clone(),
        }))
        .transpose()
}

pub fn load_player_season_per_game(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<PerGameRow>() {
            let row = row?;
            diesel::insert_into(player_season_per_game::table)
                .values(NewPlayerSeasonPerGame {
                    seas_id: row.seas_id,
                    gp: row.gp,
                    gs: row.gs,
                    min: numeric(&row.min, "player_season_per_game", "min")?,
                    pts: numeric(&row.pts, "player_season_per_game", "pts")?,
                    reb: numeric(&row.reb, "player_season_per_game", "reb")?,
                    ast: numeric(&row.ast, "player_season_per_game", "ast")?,
                    stl: numeric(&row.stl, "player_season_per_game", "stl")?,
                    blk: numeric(&row.blk, "player_season_per_game", "blk")?,
                    tov: numeric(&row.tov, "player_season_per_game", "tov")?,
                    fg_pct: numeric(&row.fg_pct, "player_season_per_game", "fg_pct")?,
                    fg3_pct: numeric(&row.fg3_pct, "player_season_per_game", "fg3_pct")?,
                    ft_pct: numeric(&row.ft_pct, "player_season_per_game", "ft_pct")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        player_season_per_game::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct TotalsRow {
    seas_id: i64,
    gp: i32,
    gs: Option<i32>,
    min: Option<i32>,
    fgm: Option<i32>,
    fga: Option<i32>,
    fg3m: Option<i32>,
    fg3a: Option<i32>,
    ftm: Option<i32>,
    fta: Option<i32>,
    reb: Option<i32>,
    ast: Option<i32>,
    stl: Option<i32>,
    blk: Option<i32>,
    tov: Option<i32>,
    pts: Option<i32>,
}

pub fn load_player_season_totals(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<TotalsRow>() {
            let row = row?;

            if let (Some(fgm), Some(fga)) = (row.fgm, row.fga) {
                if fgm > fga {
                    return Err(LoadError::CheckViolation {
                        table: "player_season_totals".into(),
                        detail: format!("fgm {fgm} > fga {fga} for seas_id {}", row.seas_id),
                    });
                }
            }

            diesel::insert_into(player_season_totals::table)
                .values(NewPlayerSeasonTotals {
                    seas_id: row.seas_id,
                    gp: row.gp,
                    gs: row.gs,
                    min: row.min,
                    fgm: row.fgm,
                    fga: row.fga,
                    fg3m: row.fg3m,
                    fg3a: row.fg3a,
                    ftm: row.ftm,
                    fta: row.fta,
                    reb: row.reb,
                    ast: row.ast,
                    stl: row.stl,
                    blk: row.blk,
                    tov: row.tov,
                    pts: row.pts,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        player_season_totals::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct RateRow {
    seas_id: i64,
    pts: Option<String>,
    reb: Option<String>,
    ast: Option<String>,
    stl: Option<String>,
    blk: Option<String>,
    tov: Option<String>,
}

pub fn load_player_season_per36(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<RateRow>() {
            let row = row?;
            diesel::insert_into(player_season_per36::table)
                .values(NewPlayerSeasonPer36 {
                    seas_id: row.seas_id,
                    pts: numeric(&row.pts, "player_season_per36", "pts")?,
                    reb: numeric(&row.reb, "player_season_per36", "reb")?,
                    ast: numeric(&row.ast, "player_season_per36", "ast")?,
                    stl: numeric(&row.stl, "player_season_per36", "stl")?,
                    blk: numeric(&row.blk, "player_season_per36", "blk")?,
                    tov: numeric(&row.tov, "player_season_per36", "tov")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        player_season_per36::table.count().get_result(conn)
    })
}

pub fn load_player_season_per100(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<RateRow>() {
            let row = row?;
            diesel::insert_into(player_season_per100::table)
                .values(NewPlayerSeasonPer100 {
                    seas_id: row.seas_id,
                    pts: numeric(&row.pts, "player_season_per100", "pts")?,
                    reb: numeric(&row.reb, "player_season_per100", "reb")?,
                    ast: numeric(&row.ast, "player_season_per100", "ast")?,
                    stl: numeric(&row.stl, "player_season_per100", "stl")?,
                    blk: numeric(&row.blk, "player_season_per100", "blk")?,
                    tov: numeric(&row.tov, "player_season_per100", "tov")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        player_season_per100::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct AdvancedRow {
    seas_id: i64,
    per: Option<String>,
    ts_pct: Option<String>,
    usg_pct: Option<String>,
    ws: Option<String>,
    bpm: Option<String>,
    vorp: Option<String>,
}

pub fn load_player_season_advanced(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<AdvancedRow>() {
            let row = row?;
            diesel::insert_into(player_season_advanced::table)
                .values(NewPlayerSeasonAdvanced {
                    seas_id: row.seas_id,
                    per: numeric(&row.per, "player_season_advanced", "per")?,
                    ts_pct: numeric(&row.ts_pct, "player_season_advanced", "ts_pct")?,
                    usg_pct: numeric(&row.usg_pct, "player_season_advanced", "usg_pct")?,
                    ws: numeric(&row.ws, "player_season_advanced", "ws")?,
                    bpm: numeric(&row.bpm, "player_season_advanced", "bpm")?,
                    vorp: numeric(&row.vorp, "player_season_advanced", "vorp")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        player_season_advanced::table.count().get_result(conn)
    })
}
