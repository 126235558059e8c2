use bigdecimal::BigDecimal;
use diesel::prelude::*;

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::player_season)]
pub struct NewPlayerSeason {
    pub seas_id: i64,
    pub player_id: i64,
    pub season_id: i64,
    pub team_id: Option<i64>,
    pub is_total: bool,
}

#[derive(Debug, Identifiable, Queryable, Selectable)]
#[diesel(primary_key(seas_id))]
#[diesel(table_name = crate::schema::warehouse::warehouse::player_season)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbPlayerSeason {
    pub seas_id: i64,
    pub player_id: i64,
    pub season_id: i64,
    pub team_id: Option<i64>,
    pub is_total: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::player_season_per_game)]
pub struct NewPlayerSeasonPerGame {
    pub seas_id: i64,
    pub gp: i32,
    pub gs: Option<i32>,
    pub min: Option<BigDecimal>,
    pub pts: Option<BigDecimal>,
    pub reb: Option<BigDecimal>,
    pub ast: Option<BigDecimal>,
    pub stl: Option<BigDecimal>,
    pub blk: Option<BigDecimal>,
    pub tov: Option<BigDecimal>,
    pub fg_pct: Option<BigDecimal>,
    pub fg3_pct: Option<BigDecimal>,
    pub ft_pct: Option<BigDecimal>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::player_season_totals)]
pub struct NewPlayerSeasonTotals {
    pub seas_id: i64,
    pub gp: i32,
    pub gs: Option<i32>,
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
#[diesel(table_name = crate::schema::warehouse::warehouse::player_season_totals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbPlayerSeasonTotals {
    pub seas_id: i64,
    pub gp: i32,
    pub gs: Option<i32>,
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
#[diesel(table_name = crate::schema::warehouse::warehouse::player_season_per36)]
pub struct NewPlayerSeasonPer36 {
    pub seas_id: i64,
    pub pts: Option<BigDecimal>,
    pub reb: Option<BigDecimal>,
    pub ast: Option<BigDecimal>,
    pub stl: Option<BigDecimal>,
    pub blk: Option<BigDecimal>,
    pub tov: Option<BigDecimal>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::player_season_per100)]
pub struct NewPlayerSeasonPer100 {
    pub seas_id: i64,
    pub pts: Option<BigDecimal>,
    pub reb: Option<BigDecimal>,
    pub ast: Option<BigDecimal>,
    pub stl: Option<BigDecimal>,
    pub blk: Option<BigDecimal>,
    pub tov: Option<BigDecimal>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::player_season_advanced)]
pub struct NewPlayerSeasonAdvanced {
    pub seas_id: i64,
    pub per: Option<BigDecimal>,
    pub ts_pct: Option<BigDecimal>,
    pub usg_pct: Option<BigDecimal>,
    pub ws: Option<BigDecimal>,
    pub bpm: Option<BigDecimal>,
    pub vorp: Option<BigDecimal>,
}
