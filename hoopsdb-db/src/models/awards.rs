use bigdecimal::BigDecimal;
use diesel::prelude::*;

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::all_star_selections)]
pub struct NewAllStarSelection<'a> {
    pub player_id: i64,
    pub season_end_year: i32,
    pub team_selected_by: Option<&'a str>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::player_award_shares)]
pub struct NewPlayerAwardShare<'a> {
    pub player_id: i64,
    pub season_end_year: i32,
    pub award: &'a str,
    pub share: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::end_of_season_teams)]
pub struct NewEndOfSeasonTeam<'a> {
    pub player_id: i64,
    pub season_end_year: i32,
    pub team_number: i32,
    pub voting_body: &'a str,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::end_of_season_voting)]
pub struct NewEndOfSeasonVoting<'a> {
    pub player_id: i64,
    pub season_end_year: i32,
    pub award: &'a str,
    pub points_won: Option<BigDecimal>,
    pub rank: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::draft_picks)]
pub struct NewDraftPick {
    pub year: i32,
    pub round: i32,
    pub pick: i32,
    pub player_id: Option<i64>,
    pub team_id: Option<i64>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::draft_combine_stats)]
pub struct NewDraftCombineStats {
    pub player_id: Option<i64>,
    pub year: i32,
    pub height_no_shoes: Option<BigDecimal>,
    pub wingspan: Option<BigDecimal>,
    pub vertical_leap: Option<BigDecimal>,
}
