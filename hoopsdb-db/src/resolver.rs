//! Immutable natural-key -> surrogate-ID lookup, built once per run from the
//! just-loaded dimension tables (spec.md §4.3). Shaped after the reference
//! codebase's `Taxa` cache: built eagerly, read-only for the rest of the
//! process, safe to share across loader threads behind an `Arc`.

use crate::errors::ResolutionError;
use crate::schema::warehouse::warehouse::{player_aliases, players, seasons, team_abbrev_mappings};
use diesel::prelude::*;
use hashbrown::HashMap;

#[derive(Debug)]
pub struct Resolver {
    players_by_alias: HashMap<String, i64>,
    teams_by_abbrev_season: HashMap<(String, i32), Vec<i64>>,
    seasons_by_end_year: HashMap<i32, i64>,
}

impl Resolver {
    /// Builds every lookup map in one pass over the dimension tables. Must
    /// run after the dimensions loader stage (players, player_aliases,
    /// team_abbrev_mappings, seasons) has committed.
    pub fn build(conn: &mut PgConnection) -> Result<Self, ResolutionError> {
        let alias_rows: Vec<(String, i64)> = player_aliases::table
            .select((player_aliases::alias, player_aliases::player_id))
            .load(conn)?;
        let canonical_rows: Vec<(i64, String)> = players::table
            .select((players::player_id, players::canonical_name))
            .load(conn)?;

        let mut players_by_alias = HashMap::with_capacity(alias_rows.len() + canonical_rows.len());
        for (player_id, canonical_name) in canonical_rows {
            players_by_alias.insert(canonical_name, player_id);
        }
        for (alias, player_id) in alias_rows {
            players_by_alias.insert(alias, player_id);
        }

        let abbrev_rows: Vec<(String, i32, i64)> = team_abbrev_mappings::table
            .select((
                team_abbrev_mappings::abbrev,
                team_abbrev_mappings::season_end_year,
                team_abbrev_mappings::team_id,
            ))
            .load(conn)?;
        let mut teams_by_abbrev_season: HashMap<(String, i32), Vec<i64>> =
            HashMap::with_capacity(abbrev_rows.len());
        for (abbrev, season_end_year, team_id) in abbrev_rows {
            teams_by_abbrev_season
                .entry((abbrev, season_end_year))
                .or_default()
                .push(team_id);
        }

        let season_rows: Vec<(i32, i64)> = seasons::table
            .select((seasons::season_end_year, seasons::season_id))
            .load(conn)?;
        let seasons_by_end_year = season_rows.into_iter().collect();

        Ok(Self {
            players_by_alias,
            teams_by_abbrev_season,
            seasons_by_end_year,
        })
    }

    pub fn resolve_player(&self, key: &str) -> Result<i64, ResolutionError> {
        self.players_by_alias
            .get(key)
            .copied()
            .ok_or_else(|| ResolutionError::UnresolvedPlayer(key.to_string()))
    }

    pub fn resolve_team(&self, abbrev: &str, season_end_year: i32) -> Result<i64, ResolutionError> {
        let key = (abbrev.to_string(), season_end_year);
        match self.teams_by_abbrev_season.get(&key).map(|v| v.as_slice()) {
            None | Some([]) => Err(ResolutionError::UnresolvedTeam {
                abbrev: abbrev.to_string(),
                season_end_year,
            }),
            Some([team_id]) => Ok(*team_id),
            Some(candidates) => Err(ResolutionError::Ambiguous {
                key: format!("{abbrev}@{season_end_year}"),
                candidates: candidates.to_vec(),
            }),
        }
    }

    pub fn resolve_season(&self, season_end_year: i32) -> Result<i64, ResolutionError> {
        self.seasons_by_end_year
            .get(&season_end_year)
            .copied()
            .ok_or(ResolutionError::UnresolvedSeason(season_end_year))
    }
}

/// FNV-1a 64-bit hash over a fixed byte encoding of
/// `(player_id, season_id, team_id)`. Deterministic across processes and
/// platforms: no hasher randomization, no reliance on `Hash`/`Hasher` from
/// `std` (whose algorithm is explicitly unspecified and may change between
/// Rust releases). `team_id = None` (TOT rows) hashes as `-1` so a player's
/// TOT row never collides with a real team row for the same season.
pub fn seas_id(player_id: i64, season_id: i64, team_id: Option<i64>) -> i64 {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    let team_component = team_id.unwrap_or(-1);
    let mut bytes = Vec::with_capacity(24);
    bytes.extend_from_slice(&player_id.to_le_bytes());
    bytes.extend_from_slice(&season_id.to_le_bytes());
    bytes.extend_from_slice(&team_component.to_le_bytes());

    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seas_id_is_deterministic() {
        let a = seas_id(1, 2, Some(3));
        let b = seas_id(1, 2, Some(3));
        assert_eq!(a, b);
    }

    #[test]
    fn seas_id_distinguishes_tot_from_real_team_rows() {
        let tot = seas_id(1, 2, None);
        assert_ne!(tot, seas_id(1, 2, Some(3)));
        assert_ne!(tot, seas_id(1, 2, Some(7)));
    }

    #[test]
    fn seas_id_varies_with_each_component() {
        let base = seas_id(1, 1, Some(1));
        assert_ne!(base, seas_id(2, 1, Some(1)));
        assert_ne!(base, seas_id(1, 2, Some(1)));
        assert_ne!(base, seas_id(1, 1, Some(2)));
    }
}
