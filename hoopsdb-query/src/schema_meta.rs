//! Static table -> column whitelist mirroring `hoopsdb_db::schema::warehouse`.
//! The registry validates every metric's `base_table`/`expression` against
//! this map at load time, and the compiler draws every identifier it
//! interpolates into SQL from here rather than from request content — the
//! one list that keeps both safe.

use hashbrown::{HashMap, HashSet};
use std::sync::OnceLock;

pub struct TableMeta {
    pub columns: &'static [&'static str],
    pub join_key: Option<(&'static str, &'static str)>,
}

fn build() -> HashMap<&'static str, TableMeta> {
    let mut m = HashMap::new();

    m.insert(
        "player_season",
        TableMeta {
            columns: &["seas_id", "player_id", "season_id", "team_id", "is_total"],
            join_key: None,
        },
    );
    m.insert(
        "player_season_per_game",
        TableMeta {
            columns: &[
                "seas_id", "gp", "gs", "min", "pts", "reb", "ast", "stl", "blk", "tov", "fg_pct",
                "fg3_pct", "ft_pct",
            ],
            join_key: Some(("player_season", "seas_id")),
        },
    );
    m.insert(
        "player_season_totals",
        TableMeta {
            columns: &[
                "seas_id", "gp", "gs", "min", "fgm", "fga", "fg3m", "fg3a", "ftm", "fta", "reb",
                "ast", "stl", "blk", "tov", "pts",
            ],
            join_key: Some(("player_season", "seas_id")),
        },
    );
    m.insert(
        "player_season_per36",
        TableMeta {
            columns: &["seas_id", "pts", "reb", "ast", "stl", "blk", "tov"],
            join_key: Some(("player_season", "seas_id")),
        },
    );
    m.insert(
        "player_season_per100",
        TableMeta {
            columns: &["seas_id", "pts", "reb", "ast", "stl", "blk", "tov"],
            join_key: Some(("player_season", "seas_id")),
        },
    );
    m.insert(
        "player_season_advanced",
        TableMeta {
            columns: &["seas_id", "per", "ts_pct", "usg_pct", "ws", "bpm", "vorp"],
            join_key: Some(("player_season", "seas_id")),
        },
    );
    m.insert(
        "team_season",
        TableMeta {
            columns: &["team_season_id", "team_id", "season_id", "w", "l"],
            join_key: None,
        },
    );
    m.insert(
        "team_season_totals",
        TableMeta {
            columns: &["team_season_id", "pts", "reb", "ast"],
            join_key: Some(("team_season", "team_season_id")),
        },
    );
    m.insert(
        "team_season_per_game",
        TableMeta {
            columns: &["team_season_id", "pts", "reb", "ast"],
            join_key: Some(("team_season", "team_season_id")),
        },
    );
    m.insert(
        "team_season_per100",
        TableMeta {
            columns: &["team_season_id", "pts", "reb", "ast"],
            join_key: Some(("team_season", "team_season_id")),
        },
    );
    m.insert(
        "team_season_opponent_totals",
        TableMeta {
            columns: &["team_season_id", "pts", "reb", "ast"],
            join_key: Some(("team_season", "team_season_id")),
        },
    );
    m.insert(
        "team_season_opponent_per_game",
        TableMeta {
            columns: &["team_season_id", "pts", "reb", "ast"],
            join_key: Some(("team_season", "team_season_id")),
        },
    );
    m.insert(
        "team_season_opponent_per100",
        TableMeta {
            columns: &["team_season_id", "pts", "reb", "ast"],
            join_key: Some(("team_season", "team_season_id")),
        },
    );
    m.insert(
        "games",
        TableMeta {
            columns: &[
                "game_id", "season_id", "game_date", "home_team_id", "away_team_id", "venue",
                "attendance", "status", "game_type", "home_score", "away_score",
            ],
            join_key: None,
        },
    );
    m.insert(
        "boxscore_team",
        TableMeta {
            columns: &["id", "game_id", "team_id", "is_home", "pts", "pace", "off_rtg", "def_rtg"],
            join_key: Some(("games", "game_id")),
        },
    );
    m.insert(
        "boxscore_player",
        TableMeta {
            columns: &[
                "id", "game_id", "player_id", "team_id", "min", "fgm", "fga", "fg3m", "fg3a",
                "ftm", "fta", "reb", "ast", "stl", "blk", "tov", "pts",
            ],
            join_key: Some(("games", "game_id")),
        },
    );
    m.insert(
        "pbp_events",
        TableMeta {
            columns: &[
                "id", "game_id", "eventnum", "period", "clock_remaining", "description",
                "home_score", "away_score", "player1_id", "player2_id", "player3_id", "team_id",
                "opponent_team_id", "event_type",
            ],
            join_key: Some(("games", "game_id")),
        },
    );
    m.insert(
        "players",
        TableMeta {
            columns: &[
                "player_id", "canonical_name", "birthdate", "position", "height_inches",
                "weight_lbs", "career_start_year", "career_end_year",
            ],
            join_key: None,
        },
    );
    m.insert(
        "teams",
        TableMeta {
            columns: &[
                "team_id", "canonical_abbrev", "franchise_name", "first_season_end_year",
                "last_season_end_year",
            ],
            join_key: None,
        },
    );
    m.insert(
        "seasons",
        TableMeta {
            columns: &["season_id", "season_end_year", "start_date", "end_date", "has_playoffs"],
            join_key: None,
        },
    );

    m
}

fn table_meta() -> &'static HashMap<&'static str, TableMeta> {
    static META: OnceLock<HashMap<&'static str, TableMeta>> = OnceLock::new();
    META.get_or_init(build)
}

pub fn columns_of(table: &str) -> Option<&'static [&'static str]> {
    table_meta().get(table).map(|m| m.columns)
}

pub fn column_exists(table: &str, column: &str) -> bool {
    columns_of(table).is_some_and(|cols| cols.contains(&column))
}

pub fn join_key_of(table: &str) -> Option<(&'static str, &'static str)> {
    table_meta().get(table).and_then(|m| m.join_key)
}

pub fn known_tables() -> HashSet<&'static str> {
    table_meta().keys().copied().collect()
}
