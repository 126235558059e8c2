use chrono::NaiveDate;
use diesel::prelude::*;

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::seasons)]
pub struct NewSeason {
    pub season_id: i64,
    pub season_end_year: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub has_playoffs: bool,
}

#[derive(Debug, Identifiable, Queryable, Selectable)]
#[diesel(primary_key(season_id))]
#[diesel(table_name = crate::schema::warehouse::warehouse::seasons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbSeason {
    pub season_id: i64,
    pub season_end_year: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub has_playoffs: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::teams)]
pub struct NewTeam<'a> {
    pub team_id: i64,
    pub canonical_abbrev: &'a str,
    pub franchise_name: &'a str,
    pub first_season_end_year: i32,
    pub last_season_end_year: Option<i32>,
}

#[derive(Debug, Identifiable, Queryable, Selectable)]
#[diesel(primary_key(team_id))]
#[diesel(table_name = crate::schema::warehouse::warehouse::teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbTeam {
    pub team_id: i64,
    pub canonical_abbrev: String,
    pub franchise_name: String,
    pub first_season_end_year: i32,
    pub last_season_end_year: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_history)]
pub struct NewTeamHistory<'a> {
    pub team_id: i64,
    pub season_end_year: i32,
    pub event: &'a str,
    pub detail: Option<&'a str>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbTeamHistory {
    pub id: i64,
    pub team_id: i64,
    pub season_end_year: i32,
    pub event: String,
    pub detail: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_abbrev_mappings)]
pub struct NewTeamAbbrevMapping<'a> {
    pub abbrev: &'a str,
    pub season_end_year: i32,
    pub team_id: i64,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::team_abbrev_mappings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbTeamAbbrevMapping {
    pub id: i64,
    pub abbrev: String,
    pub season_end_year: i32,
    pub team_id: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::players)]
pub struct NewPlayer<'a> {
    pub player_id: i64,
    pub canonical_name: &'a str,
    pub birthdate: Option<NaiveDate>,
    pub position: Option<&'a str>,
    pub height_inches: Option<i32>,
    pub weight_lbs: Option<i32>,
    pub career_start_year: Option<i32>,
    pub career_end_year: Option<i32>,
}

#[derive(Debug, Identifiable, Queryable, Selectable)]
#[diesel(primary_key(player_id))]
#[diesel(table_name = crate::schema::warehouse::warehouse::players)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbPlayer {
    pub player_id: i64,
    pub canonical_name: String,
    pub birthdate: Option<NaiveDate>,
    pub position: Option<String>,
    pub height_inches: Option<i32>,
    pub weight_lbs: Option<i32>,
    pub career_start_year: Option<i32>,
    pub career_end_year: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::player_aliases)]
pub struct NewPlayerAlias<'a> {
    pub player_id: i64,
    pub alias: &'a str,
    pub source: &'a str,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::warehouse::warehouse::player_aliases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbPlayerAlias {
    pub id: i64,
    pub player_id: i64,
    pub alias: String,
    pub source: String,
}
