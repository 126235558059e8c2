use chrono::NaiveDate;
use diesel::prelude::*;

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::games)]
pub struct NewGame<'a> {
    pub game_id: i64,
    pub season_id: i64,
    pub game_date: NaiveDate,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub venue: Option<&'a str>,
    pub attendance: Option<i32>,
    pub status: &'a str,
    pub game_type: &'a str,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

#[derive(Debug, Identifiable, Queryable, Selectable)]
#[diesel(primary_key(game_id))]
#[diesel(table_name = crate::schema::warehouse::warehouse::games)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbGame {
    pub game_id: i64,
    pub season_id: i64,
    pub game_date: NaiveDate,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub venue: Option<String>,
    pub attendance: Option<i32>,
    pub status: String,
    pub game_type: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::boxscore_team)]
pub struct NewBoxscoreTeam {
    pub game_id: i64,
    pub team_id: i64,
    pub is_home: bool,
    pub pts: i32,
    pub pace: Option<bigdecimal::BigDecimal>,
    pub off_rtg: Option<bigdecimal::BigDecimal>,
    pub def_rtg: Option<bigdecimal::BigDecimal>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::boxscore_team)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbBoxscoreTeam {
    pub id: i64,
    pub game_id: i64,
    pub team_id: i64,
    pub is_home: bool,
    pub pts: i32,
    pub pace: Option<bigdecimal::BigDecimal>,
    pub off_rtg: Option<bigdecimal::BigDecimal>,
    pub def_rtg: Option<bigdecimal::BigDecimal>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::boxscore_player)]
pub struct NewBoxscorePlayer {
    pub game_id: i64,
    pub player_id: i64,
    pub team_id: i64,
    pub min: Option<i32>,
    pub fgm: Option<i32>,
    pub fga: Option<i32>,
    pub fg3m: Option<i32>,
    pub fg3a: Option<i32>,
    pub ftm: Option<i32>,
    pub fta: Option<i32>,
    pub reb: Option<i32>,
    pub ast: Option<i32>,
    pub stl: Option<i32>,
    pub blk: Option<i32>,
    pub tov: Option<i32>,
    pub pts: Option<i32>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::boxscore_player)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbBoxscorePlayer {
    pub id: i64,
    pub game_id: i64,
    pub player_id: i64,
    pub team_id: i64,
    pub min: Option<i32>,
    pub fgm: Option<i32>,
    pub fga: Option<i32>,
    pub fg3m: Option<i32>,
    pub fg3a: Option<i32>,
    pub ftm: Option<i32>,
    pub fta: Option<i32>,
    pub reb: Option<i32>,
    pub ast: Option<i32>,
    pub stl: Option<i32>,
    pub blk: Option<i32>,
    pub tov: Option<i32>,
    pub pts: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::pbp_events)]
pub struct NewPbpEvent<'a> {
    pub game_id: i64,
    pub eventnum: i32,
    pub period: i32,
    pub clock_remaining: i32,
    pub description: Option<&'a str>,
    pub home_score: i32,
    pub away_score: i32,
    pub player1_id: Option<i64>,
    pub player2_id: Option<i64>,
    pub player3_id: Option<i64>,
    pub team_id: Option<i64>,
    pub opponent_team_id: Option<i64>,
    pub event_type: &'a str,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::pbp_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbPbpEvent {
    pub id: i64,
    pub game_id: i64,
    pub eventnum: i32,
    pub period: i32,
    pub clock_remaining: i32,
    pub description: Option<String>,
    pub home_score: i32,
    pub away_score: i32,
    pub player1_id: Option<i64>,
    pub player2_id: Option<i64>,
    pub player3_id: Option<i64>,
    pub team_id: Option<i64>,
    pub opponent_team_id: Option<i64>,
    pub event_type: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::game_officials)]
pub struct NewGameOfficial<'a> {
    pub game_id: i64,
    pub official_name: &'a str,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::inactive_players)]
pub struct NewInactivePlayer {
    pub game_id: i64,
    pub player_id: i64,
    pub team_id: i64,
}
