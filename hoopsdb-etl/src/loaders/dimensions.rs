//! Stage 1 of the loader topology (spec.md §4.4): seasons, teams,
//! team_history, team_abbrev_mappings, players, player_aliases. These
//! loaders populate the very tables the ID Resolution Service reads to
//! build its caches, so they run before a `Resolver` exists.

use super::{LoadResult, finish_load};
use crate::errors::LoadError;
use crate::manifest::ManifestEntry;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use hoopsdb_db::models::{NewPlayer, NewPlayerAlias, NewSeason, NewTeam, NewTeamAbbrevMapping, NewTeamHistory};
use hoopsdb_db::schema::warehouse::warehouse::{player_aliases, players, seasons, team_abbrev_mappings, team_history, teams};
use std::path::Path;

#[derive(Debug, serde::Deserialize)]
struct SeasonRow {
    season_end_year: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    has_playoffs: bool,
}

pub fn load_seasons(
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
        for (i, row) in reader.deserialize::<SeasonRow>().enumerate() {
            let row = row?;
            diesel::insert_into(seasons::table)
                .values(NewSeason {
                    season_id: (i + 1) as i64,
                    season_end_year: row.season_end_year,
                    start_date: row.start_date,
                    end_date: row.end_date,
                    has_playoffs: row.has_playoffs,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        seasons::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct TeamRow {
    team_id: i64,
    canonical_abbrev: String,
    franchise_name: String,
    first_season_end_year: i32,
    last_season_end_year: Option<i32>,
}

pub fn load_teams(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    let rows: Vec<TeamRow> = reader.deserialize().collect::<Result<_, _>>()?;
    let new_teams: Vec<NewTeam> = rows
        .iter()
        .map(|r| NewTeam {
            team_id: r.team_id,
            canonical_abbrev: &r.canonical_abbrev,
            franchise_name: &r.franchise_name,
            first_season_end_year: r.first_season_end_year,
            last_season_end_year: r.last_season_end_year,
        })
        .collect();

    conn.transaction(|conn| {
        diesel::insert_into(teams::table).values(&new_teams).execute(conn)
    })?;

    finish_load(entry, started_at, conn, |conn| teams::table.count().get_result(conn))
}

#[derive(Debug, serde::Deserialize)]
struct TeamHistoryRow {
    team_id: i64,
    season_end_year: i32,
    event: String,
    detail: Option<String>,
}

pub fn load_team_history(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    let rows: Vec<TeamHistoryRow> = reader.deserialize().collect::<Result<_, _>>()?;
    let new_rows: Vec<NewTeamHistory> = rows
        .iter()
        .map(|r| NewTeamHistory {
            team_id: r.team_id,
            season_end_year: r.season_end_year,
            event: &r.event,
            detail: r.detail.as_deref(),
        })
        .collect();

    conn.transaction(|conn| {
        diesel::insert_into(team_history::table).values(&new_rows).execute(conn)
    })?;

    finish_load(entry, started_at, conn, |conn| {
        team_history::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct TeamAbbrevMappingRow {
    abbrev: String,
    season_end_year: i32,
    team_id: i64,
}

pub fn load_team_abbrev_mappings(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    let rows: Vec<TeamAbbrevMappingRow> = reader.deserialize().collect::<Result<_, _>>()?;
    let new_rows: Vec<NewTeamAbbrevMapping> = rows
        .iter()
        .map(|r| NewTeamAbbrevMapping {
            abbrev: &r.abbrev,
            season_end_year: r.season_end_year,
            team_id: r.team_id,
        })
        .collect();

    conn.transaction(|conn| {
        diesel::insert_into(team_abbrev_mappings::table)
            .values(&new_rows)
            .execute(conn)
    })?;

    finish_load(entry, started_at, conn, |conn| {
        team_abbrev_mappings::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct PlayerRow {
    player_id: i64,
    canonical_name: String,
    birthdate: Option<NaiveDate>,
    position: Option<String>,
    height_inches: Option<i32>,
    weight_lbs: Option<i32>,
    career_start_year: Option<i32>,
    career_end_year: Option<i32>,
}

/// Merges `player.csv` with `common_player_info.csv` on `player_id`: the
/// first file is authoritative for identity, the second backfills
/// biographical fields it may be missing, per spec.md §4.4's
/// priority-ordered left join rule.
pub fn load_players(
    entry: &ManifestEntry,
    csv_dir: &Path,
    common_player_info_file: Option<&str>,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;
    let mut rows: Vec<PlayerRow> = reader.deserialize().collect::<Result<_, _>>()?;

    if let Some(common_file) = common_player_info_file {
        let mut backfill_reader =
            csv::Reader::from_path(csv_dir.join(common_file)).map_err(|e| LoadError::Io {
                path: common_file.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
            })?;
        let backfill: Vec<PlayerRow> = backfill_reader.deserialize().collect::<Result<_, _>>()?;
        let by_id: hashbrown::HashMap<i64, PlayerRow> =
            backfill.into_iter().map(|r| (r.player_id, r)).collect();

        for row in &mut rows {
            if let Some(other) = by_id.get(&row.player_id) {
                row.birthdate = row.birthdate.or(other.birthdate);
                row.position = row.position.clone().or_else(|| other.position.clone());
                row.height_inches = row.height_inches.or(other.height_inches);
                row.weight_lbs = row.weight_lbs.or(other.weight_lbs);
            }
        }
    }

    let new_players: Vec<NewPlayer> = rows
        .iter()
        .map(|r| NewPlayer {
            player_id: r.player_id,
            canonical_name: &r.canonical_name,
            birthdate: r.birthdate,
            position: r.position.as_deref(),
            height_inches: r.height_inches,
            weight_lbs: r.weight_lbs,
            career_start_year: r.career_start_year,
            career_end_year: r.career_end_year,
        })
        .collect();

    conn.transaction(|conn| {
        diesel::insert_into(players::table).values(&new_players).execute(conn)
    })?;

    finish_load(entry, started_at, conn, |conn| {
        players::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct PlayerAliasRow {
    player_id: i64,
    alias: String,
    source: String,
}

pub fn load_player_aliases(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    let rows: Vec<PlayerAliasRow> = reader.deserialize().collect::<Result<_, _>>()?;
    let new_rows: Vec<NewPlayerAlias> = rows
        .iter()
        .map(|r| NewPlayerAlias {
            player_id: r.player_id,
            alias: &r.alias,
            source: &r.source,
        })
        .collect();

    conn.transaction(|conn| {
        diesel::insert_into(player_aliases::table)
            .values(&new_rows)
            .execute(conn)
    })?;

    finish_load(entry, started_at, conn, |conn| {
        player_aliases::table.count().get_result(conn)
    })
}
