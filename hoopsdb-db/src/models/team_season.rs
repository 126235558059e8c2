use bigdecimal::BigDecimal;
use diesel::prelude::*;

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_season)]
pub struct NewTeamSeason {
    pub team_season_id: i64,
    pub team_id: i64,
    pub season_id: i64,
    pub w: i32,
    pub l: i32,
}

#[derive(Debug, Identifiable, Queryable, Selectable)]
#[diesel(primary_key(team_season_id))]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_season)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbTeamSeason {
    pub team_season_id: i64,
    pub team_id: i64,
    pub season_id: i64,
    pub w: i32,
    pub l: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_season_totals)]
pub struct NewTeamSeasonTotals {
    pub team_season_id: i64,
    pub pts: Option<i32>,
    pub reb: Option<i32>,
    pub ast: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_season_per_game)]
pub struct NewTeamSeasonPerGame {
    pub team_season_id: i64,
    pub pts: Option<BigDecimal>,
    pub reb: Option<BigDecimal>,
    pub ast: Option<BigDecimal>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_season_per100)]
pub struct NewTeamSeasonPer100 {
    pub team_season_id: i64,
    pub pts: Option<BigDecimal>,
    pub reb: Option<BigDecimal>,
    pub ast: Option<BigDecimal>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_season_opponent_totals)]
pub struct NewTeamSeasonOpponentTotals {
    pub team_season_id: i64,
    pub pts: Option<i32>,
    pub reb: Option<i32>,
    pub ast: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_season_opponent_per_game)]
pub struct NewTeamSeasonOpponentPerGame {
    pub team_season_id: i64,
    pub pts: Option<BigDecimal>,
    pub reb: Option<BigDecimal>,
    pub ast: Option<BigDecimal>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_season_opponent_per100)]
pub struct NewTeamSeasonOpponentPer100 {
    pub team_season_id: i64,
    pub pts: Option<BigDecimal>,
    pub reb: Option<BigDecimal>,
    pub ast: Option<BigDecimal>,
}
