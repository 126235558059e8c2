//! Stage 6: the tables with no downstream dependents (spec.md §4.4) —
//! all_star_selections, player_award_shares, end_of_season_teams,
//! end_of_season_voting, draft_picks, draft_combine_stats,
//! player_playbyplay_stats, player_shooting_stats, team_summaries. Order
//! among these nine doesn't matter; they only depend on dimensions and hubs
//! loaded in earlier stages.

use super::{LoadResult, finish_load};
use crate::errors::LoadError;
use crate::manifest::ManifestEntry;
use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use hoopsdb_db::Resolver;
use hoopsdb_db::models::{
    NewAllStarSelection, NewDraftCombineStats, NewDraftPick, NewEndOfSeasonTeam,
    NewEndOfSeasonVoting, NewPlayerAwardShare, NewPlayerPlaybyplayStats, NewPlayerShootingStats,
    NewTeamSummary,
};
use hoopsdb_db::schema::warehouse::warehouse::{
    all_star_selections, draft_combine_stats, draft_picks, end_of_season_teams,
    end_of_season_voting, player_award_shares, player_playbyplay_stats, player_shooting_stats,
    team_summaries,
};
use std::path::Path;
use std::str::FromStr;

fn numeric(v: &Option<String>, table: &str, column: &str) -> Result<Option<BigDecimal>, LoadError> {
    v.as_ref()
        .map(|s| BigDecimal::from_str(s).map_err(|_| LoadError::TypeCoercion {
            table: table.into(),
            column: column.into(),
            value: s.clone(),
        }))
        .transpose()
}

fn open_reader(csv_dir: &Path, file: &str) -> Result<csv::Reader<std::fs::File>, LoadError> {
    csv::Reader::from_path(csv_dir.join(file)).map_err(|e| LoadError::Io {
        path: file.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })
}

#[derive(Debug, serde::Deserialize)]
struct AllStarRow {
    player_key: String,
    season_end_year: i32,
    team_selected_by: Option<String>,
}

pub fn load_all_star_selections(
    entry: &ManifestEntry,
    resolver: &Resolver,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = open_reader(csv_dir, &entry.csv_file)?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<AllStarRow>() {
            let row = row?;
            let player_id = resolver.resolve_player(&row.player_key)?;
            diesel::insert_into(all_star_selections::table)
                .values(NewAllStarSelection {
                    player_id,
                    season_end_year: row.season_end_year,
                    team_selected_by: row.team_selected_by.as_deref(),
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        all_star_selections::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct AwardShareRow {
    player_key: String,
    season_end_year: i32,
    award: String,
    share: String,
}

pub fn load_player_award_shares(
    entry: &ManifestEntry,
    resolver: &Resolver,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = open_reader(csv_dir, &entry.csv_file)?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<AwardShareRow>() {
            let row = row?;
            let player_id = resolver.resolve_player(&row.player_key)?;
            let share = BigDecimal::from_str(&row.share).map_err(|_| LoadError::TypeCoercion {
                table: "player_award_shares".into(),
                column: "share".into(),
                value: row.share.clone(),
            })?;

            diesel::insert_into(player_award_shares::table)
                .values(NewPlayerAwardShare {
                    player_id,
                    season_end_year: row.season_end_year,
                    award: &row.award,
                    share,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        player_award_shares::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct EndOfSeasonTeamRow {
    player_key: String,
    season_end_year: i32,
    team_number: i32,
    voting_body: String,
}

pub fn load_end_of_season_teams(
    entry: &ManifestEntry,
    resolver: &Resolver,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = open_reader(csv_dir, &entry.csv_file)?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<EndOfSeasonTeamRow>() {
            let row = row?;
            let player_id = resolver.resolve_player(&row.player_key)?;
            diesel::insert_into(end_of_season_teams::table)
                .values(NewEndOfSeasonTeam {
                    player_id,
                    season_end_year: row.season_end_year,
                    team_number: row.team_number,
                    voting_body: &row.voting_body,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        end_of_season_teams::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct EndOfSeasonVotingRow {
    player_key: String,
    season_end_year: i32,
    award: String,
    points_won: Option<String>,
    rank: Option<i32>,
}

pub fn load_end_of_season_voting(
    entry: &ManifestEntry,
    resolver: &Resolver,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = open_reader(csv_dir, &entry.csv_file)?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<EndOfSeasonVotingRow>() {
            let row = row?;
            let player_id = resolver.resolve_player(&row.player_key)?;
            diesel::insert_into(end_of_season_voting::table)
                .values(NewEndOfSeasonVoting {
                    player_id,
                    season_end_year: row.season_end_year,
                    award: &row.award,
                    points_won: numeric(&row.points_won, "end_of_season_voting", "points_won")?,
                    rank: row.rank,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        end_of_season_voting::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct DraftPickRow {
    year: i32,
    round: i32,
    pick: i32,
    player_key: Option<String>,
    abbrev: Option<String>,
    season_end_year: Option<i32>,
}

pub fn load_draft_picks(
    entry: &ManifestEntry,
    resolver: &Resolver,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = open_reader(csv_dir, &entry.csv_file)?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<DraftPickRow>() {
            let row = row?;
            let player_id = row
                .player_key
                .as_deref()
                .map(|k| resolver.resolve_player(k))
                .transpose()?;
            let team_id = match (&row.abbrev, row.season_end_year) {
                (Some(abbrev), Some(year)) => Some(resolver.resolve_team(abbrev, year)?),
                _ => None,
            };

            diesel::insert_into(draft_picks::table)
                .values(NewDraftPick {
                    year: row.year,
                    round: row.round,
                    pick: row.pick,
                    player_id,
                    team_id,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        draft_picks::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct DraftCombineRow {
    player_key: Option<String>,
    year: i32,
    height_no_shoes: Option<String>,
    wingspan: Option<String>,
    vertical_leap: Option<String>,
}

pub fn load_draft_combine_stats(
    entry: &ManifestEntry,
    resolver: &Resolver,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = open_reader(csv_dir, &entry.csv_file)?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<DraftCombineRow>() {
            let row = row?;
            let player_id = row
                .player_key
                .as_deref()
                .map(|k| resolver.resolve_player(k))
                .transpose()?;

            diesel::insert_into(draft_combine_stats::table)
                .values(NewDraftCombineStats {
                    player_id,
                    year: row.year,
                    height_no_shoes: numeric(&row.height_no_shoes, "draft_combine_stats", "height_no_shoes")?,
                    wingspan: numeric(&row.wingspan, "draft_combine_stats", "wingspan")?,
                    vertical_leap: numeric(&row.vertical_leap, "draft_combine_stats", "vertical_leap")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        draft_combine_stats::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct PlaybyplayRow {
    seas_id: i64,
    pct_min_at_pg: Option<String>,
    pct_min_at_sg: Option<String>,
    pct_min_at_sf: Option<String>,
    pct_min_at_pf: Option<String>,
    pct_min_at_c: Option<String>,
}

pub fn load_player_playbyplay_stats(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = open_reader(csv_dir, &entry.csv_file)?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<PlaybyplayRow>() {
            let row = row?;
            diesel::insert_into(player_playbyplay_stats::table)
                .values(NewPlayerPlaybyplayStats {
                    seas_id: row.seas_id,
                    pct_min_at_pg: numeric(&row.pct_min_at_pg, "player_playbyplay_stats", "pct_min_at_pg")?,
                    pct_min_at_sg: numeric(&row.pct_min_at_sg, "player_playbyplay_stats", "pct_min_at_sg")?,
                    pct_min_at_sf: numeric(&row.pct_min_at_sf, "player_playbyplay_stats", "pct_min_at_sf")?,
                    pct_min_at_pf: numeric(&row.pct_min_at_pf, "player_playbyplay_stats", "pct_min_at_pf")?,
                    pct_min_at_c: numeric(&row.pct_min_at_c, "player_playbyplay_stats", "pct_min_at_c")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        player_playbyplay_stats::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct ShootingRow {
    seas_id: i64,
    avg_shot_distance: Option<String>,
    pct_fga_2p: Option<String>,
    pct_fga_3p: Option<String>,
}

pub fn load_player_shooting_stats(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = open_reader(csv_dir, &entry.csv_file)?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<ShootingRow>() {
            let row = row?;
            diesel::insert_into(player_shooting_stats::table)
                .values(NewPlayerShootingStats {
                    seas_id: row.seas_id,
                    avg_shot_distance: numeric(&row.avg_shot_distance, "player_shooting_stats", "avg_shot_distance")?,
                    pct_fga_2p: numeric(&row.pct_fga_2p, "player_shooting_stats", "pct_fga_2p")?,
                    pct_fga_3p: numeric(&row.pct_fga_3p, "player_shooting_stats", "pct_fga_3p")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        player_shooting_stats::table.count().get_result(conn)
    })
}

#[derive(Debug, serde::Deserialize)]
struct TeamSummaryRow {
    team_season_id: i64,
    mov: Option<String>,
    sos: Option<String>,
    srs: Option<String>,
    pace: Option<String>,
}

pub fn load_team_summaries(
    entry: &ManifestEntry,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<LoadResult, LoadError> {
    let started_at = Utc::now();
    let mut reader = open_reader(csv_dir, &entry.csv_file)?;

    conn.transaction(|conn| {
        for row in reader.deserialize::<TeamSummaryRow>() {
            let row = row?;
            diesel::insert_into(team_summaries::table)
                .values(NewTeamSummary {
                    team_season_id: row.team_season_id,
                    mov: numeric(&row.mov, "team_summaries", "mov")?,
                    sos: numeric(&row.sos, "team_summaries", "sos")?,
                    srs: numeric(&row.srs, "team_summaries", "srs")?,
                    pace: numeric(&row.pace, "team_summaries", "pace")?,
                })
                .execute(conn)?;
        }
        Ok::<_, LoadError>(())
    })?;

    finish_load(entry, started_at, conn, |conn| {
        team_summaries::table.count().get_result(conn)
    })
}
