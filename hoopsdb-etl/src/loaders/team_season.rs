//! Stage 4: team_season hub, then its five satellites (totals, per_game,
//! per100, opponent_totals, opponent_per_game, opponent_per100). The hub's
//! surrogate key is a run-local sequence, not a hash, since a team/season
//! pair never splits the way a player/season/team triple can (no TOT rows
//! at the team level).

use super::{LoadResult, finish_load};
use crate::errors::LoadError;
use crate::manifest::ManifestEntry;
use chrono::Utc;
use diesel::prelude::*;
use hoopsdb_db::Resolver;
use hoopsdb_db::models::{
    NewTeamSeason, NewTeamSeasonOpponentPer100, NewTeamSeasonOpponentPerGame,
    NewTeamSeasonOpponentTotals, NewTeamSeasonPer100, NewTeamSeasonPerGame, NewTeamSeasonTotals,
};
use hoopsdb_db::schema::warehouse::warehouse::{
    team_season, team_season_opponent_per100, team_season_opponent_per_game,
    team_season_opponent_totals, team_season_per100, team_season_per_game, team_season_totals,
};
use std::path::Path;

#[derive(Debug, serde::Deserialize)]
struct TeamSeasonRow {
    team_season_id: i64,
    abbrev: String,
    season_end_year: i32,
    w: i32,
    l: i32,
}

pub fn load_team_season_hub(
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
        for row in reader.deserialize::<TeamSeasonRow>() {
            let row = row?;
            let team_id = resolver.resolve_team(&row.abbrev, row.season_end_year)?;
            let season_id = resolver.resolve_season(row.season_end_year)?;

            diesel::insert_into(team_season::table)
                .values(NewTeamSeason {
                    team_season_id: row.team_season_id,
                    team_id,
                    season_id,
                    w: row.w,
                    l: row.l,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        team_season::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct TotalsRow {
    team_season_id: i64,
    pts: Option<i32>,
    reb: Option<i32>,
    ast: Option<i32>,
}

pub fn load_team_season_totals(
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
            diesel::insert_into(team_season_totals::table)
                .values(NewTeamSeasonTotals {
                    team_season_id: row.team_season_id,
                    pts: row.pts,
                    reb: row.reb,
                    ast: row.ast,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        team_season_totals::table.count().get_result(conn)
    })
}

pub fn load_team_season_opponent_totals(
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
            diesel::insert_into(team_season_opponent_totals::table)
                .values(NewTeamSeasonOpponentTotals {
                    team_season_id: row.team_season_id,
                    pts: row.pts,
                    reb: row.reb,
                    ast: row.ast,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        team_season_opponent_totals::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct RateRow {
    team_season_id: i64,
    pts: Option<String>,
    reb: Option<String>,
    ast: Option<String>,
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

pub fn load_team_season_per_game(
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
            diesel::insert_into(team_season_per_game::table)
                .values(NewTeamSeasonPerGame {
                    team_season_id: row.team_season_id,
                    pts: numeric(&row.pts, "team_season_per_game", "pts")?,
                    reb: numeric(&row.reb, "team_season_per_game", "reb")?,
                    ast: numeric(&row.ast, "team_season_per_game", "ast")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        team_season_per_game::table.count().get_result(conn)
    })
}

pub fn load_team_season_per100(
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
            diesel::insert_into(team_season_per100::table)
                .values(NewTeamSeasonPer100 {
                    team_season_id: row.team_season_id,
                    pts: numeric(&row.pts, "team_season_per100", "pts")?,
                    reb: numeric(&row.reb, "team_season_per100", "reb")?,
                    ast: numeric(&row.ast, "team_season_per100", "ast")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        team_season_per100::table.count().get_result(conn)
    })
}

pub fn load_team_season_opponent_per_game(
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
            diesel::insert_into(team_season_opponent_per_game::table)
                .values(NewTeamSeasonOpponentPerGame {
                    team_season_id: row.team_season_id,
                    pts: numeric(&row.pts, "team_season_opponent_per_game", "pts")?,
                    reb: numeric(&row.reb, "team_season_opponent_per_game", "reb")?,
                    ast: numeric(&row.ast, "team_season_opponent_per_game", "ast")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        team_season_opponent_per_game::table.count().get_result(conn)
    })
}

pub fn load_team_season_opponent_per100(
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
            diesel::insert_into(team_season_opponent_per100::table)
                .values(NewTeamSeasonOpponentPer100 {
                    team_season_id: row.team_season_id,
                    pts: numeric(&row.pts, "team_season_opponent_per100", "pts")?,
                    reb: numeric(&row.reb, "team_season_opponent_per100", "reb")?,
                    ast: numeric(&row.ast, "team_season_opponent_per100", "ast")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        team_season_opponent_per100::table.count().get_result(conn)
    })
}
