use bigdecimal::BigDecimal;
use diesel::prelude::*;

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::player_playbyplay_stats)]
pub struct NewPlayerPlaybyplayStats {
    pub seas_id: i64,
    pub pct_min_at_pg: Option<BigDecimal>,
    pub pct_min_at_sg: Option<BigDecimal>,
    pub pct_min_at_sf: Option<BigDecimal>,
    pub pct_min_at_pf: Option<BigDecimal>,
    pub pct_min_at_c: Option<BigDecimal>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::player_shooting_stats)]
pub struct NewPlayerShootingStats {
    pub seas_id: i64,
    pub avg_shot_distance: Option<BigDecimal>,
    pub pct_fga_2p: Option<BigDecimal>,
    pub pct_fga_3p: Option<BigDecimal>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_summaries)]
pub struct NewTeamSummary {
    pub team_season_id: i64,
    pub mov: Option<BigDecimal>,
    pub sos: Option<BigDecimal>,
    pub srs: Option<BigDecimal>,
    pub pace: Option<BigDecimal>,
}
