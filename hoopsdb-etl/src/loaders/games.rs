//! Stage 2 of the loader topology: games, boxscore_team, boxscore_player,
//! game_officials, inactive_players. Each game row must resolve to two
//! distinct, already-loaded teams and one season before it can be inserted.

use super::{LoadResult, finish_load};
use crate::errors::LoadError;
use crate::manifest::ManifestEntry;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use hoopsdb_db::Resolver;
use hoopsdb_db::models::{NewBoxscorePlayer, NewBoxscoreTeam, NewGame, NewGameOfficial, NewInactivePlayer};
use hoopsdb_db::schema::warehouse::warehouse::{boxscore_player, boxscore_team, game_officials, games, inactive_players};
use std::path::Path;

#[derive(Debug, serde::Deserialize)]
struct GameRow {
    game_id: i64,
    season_end_year: i32,
    game_date: NaiveDate,
    home_abbrev: String,
    away_abbrev: String,
    venue: Option<String>,
    attendance: Option<i32>,
    status: String,
    game_type: String,
    home_score: Option<i32>,
    away_score: Option<i32>,
}

pub fn load_games(
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
        for row in reader.deserialize::<GameRow>() {
            let row = row?;
            let season_id = resolver.resolve_season(row.season_end_year)?;
            let home_team_id = resolver.resolve_team(&row.home_abbrev, row.season_end_year)?;
            let away_team_id = resolver.resolve_team(&row.away_abbrev, row.season_end_year)?;

            diesel::insert_into(games::table)
                .values(NewGame {
                    game_id: row.game_id,
                    season_id,
                    game_date: row.game_date,
                    home_team_id,
                    away_team_id,
                    venue: row.venue.as_deref(),
                    attendance: row.attendance,
                    status: &row.status,
                    game_type: &row.game_type,
                    home_score: row.home_score,
                    away_score: row.away_score,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| games::table.count().get_result(conn))
}

#[derive(Debug, serde::Deserialize)]
struct BoxscoreTeamRow {
    game_id: i64,
    abbrev: String,
    season_end_year: i32,
    is_home: bool,
    pts: i32,
    pace: Option<String>,
    off_rtg: Option<String>,
    def_rtg: Option<String>,
}

pub fn load_boxscore_team(
    entry: &ManifestEntry,
    resolver: &Resolver,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<BoxscoreTeamRow>() {
            let row = row?;
            let team_id = resolver.resolve_team(&row.abbrev, row.season_end_year)?;

            let parse_numeric = |v: &Option<String>, column: &str| -> Result<Option<BigDecimal>, LoadError> {
                v.as_ref()
                    .map(|s| BigDecimal::from_str(s).map_err(|_| LoadError::TypeCoercion {
                        table: "boxscore_team".into(),
                        column: column.into(),
                        value: s.clone(),
                    }))
                    .transpose()
            };

            diesel::insert_into(boxscore_team::table)
                .values(NewBoxscoreTeam {
                    game_id: row.game_id,
                    team_id,
                    is_home: row.is_home,
                    pts: row.pts,
                    pace: parse_numeric(&row.pace, "pace")?,
                    off_rtg: parse_numeric(&row.off_rtg, "off_rtg")?,
                    def_rtg: parse_numeric(&row.def_rtg, "def_rtg")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        boxscore_team::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct BoxscorePlayerRow {
    game_id: i64,
    player_key: String,
    abbrev: String,
    season_end_year: i32,
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

pub fn load_boxscore_player(
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
        for row in reader.deserialize::<BoxscorePlayerRow>() {
            let row = row?;
            let player_id = resolver.resolve_player(&row.player_key)?;
            let team_id = resolver.resolve_team(&row.abbrev, row.season_end_year)?;

            if let (Some(fgm), Some(fga)) = (row.fgm, row.fga) {
                if fgm > fga {
                    return Err(LoadError::CheckViolation {
                        table: "boxscore_player".into(),
                        detail: format!("fgm {fgm} > fga {fga} for game {} player {player_id}", row.game_id),
                    });
                }
            }

            diesel::insert_into(boxscore_player::table)
                .values(NewBoxscorePlayer {
                    game_id: row.game_id,
                    player_id,
                    team_id,
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
        boxscore_player::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct GameOfficialRow {
    game_id: i64,
    official_name: String,
}

pub fn load_game_officials(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    let rows: Vec<GameOfficialRow> = reader.deserialize().collect::<Result<_, _>>()?;
    let new_rows: Vec<NewGameOfficial> = rows
        .iter()
        .map(|r| NewGameOfficial {
            game_id: r.game_id,
            official_name: &r.official_name,
        })
        .collect();

    conn.transaction(|conn| {
        diesel::insert_into(game_officials::table)
            .values(&new_rows)
            .execute(conn)
    })?;

    finish_load(entry, started_at, conn, |conn| {
        game_officials::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct InactivePlayerRow {
    game_id: i64,
    player_key: String,
    abbrev: String,
    season_end_year: i32,
}

pub fn load_inactive_players(
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
        for row in reader.deserialize::<InactivePlayerRow>() {
            let row = row?;
            let player_id = resolver.resolve_player(&row.player_key)?;
            let team_id = resolver.resolve_team(&row.abbrev, row.season_end_year)?;

            diesel::insert_into(inactive_players::table)
                .values(NewInactivePlayer {
                    game_id: row.game_id,
                    player_id,
                    team_id,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        inactive_players::table.count().get_result(conn)
    })
}
