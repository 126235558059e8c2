//! Play-by-play loader. The one loader that doesn't fit the
//! one-transaction-per-table shape (spec.md §4.4): it streams in bounded
//! windows of up to 1,000,000 rows, COPYing each window inside its own
//! savepoint so a chunk checkpoint can be recorded without ending the
//! loader's outer transaction, and so a crash mid-file leaves only whole
//! committed chunks behind.

use super::parse_clock_to_seconds;
use crate::errors::LoadError;
use crate::manifest::ManifestEntry;
use chrono::Utc;
use diesel::prelude::*;
use hoopsdb_db::models::{DbEtlRunStep, NewEtlRunStep, NewPbpEvent};
use hoopsdb_db::schema::etl::etl::etl_run_steps;
use hoopsdb_db::schema::warehouse::warehouse::pbp_events;
use std::path::Path;

pub const CHUNK_ROWS: usize = 1_000_000;

#[derive(Debug, serde::Deserialize)]
struct PbpRow {
    game_id: i64,
    eventnum: i32,
    period: i32,
    clock: String,
    description: Option<String>,
    home_score: i32,
    away_score: i32,
    player1_id: Option<i64>,
    player2_id: Option<i64>,
    player3_id: Option<i64>,
    team_id: Option<i64>,
    opponent_team_id: Option<i64>,
    event_type: String,
}

#[derive(Debug, Clone)]
pub struct PbpChunkCheckpoint {
    pub chunk_index: usize,
    pub min_eventnum: Option<i32>,
    pub max_eventnum: Option<i32>,
    pub rows_out: i64,
}

/// Loads the PBP CSV in `CHUNK_ROWS`-row windows. Each window is inserted
/// and checkpointed in its own savepoint (`conn.transaction` nested inside
/// the caller's outer transaction); `run_id` ties the checkpoint rows back
/// to the owning `etl_runs` row.
pub fn load_pbp_events(
    entry: &ManifestEntry,
    run_id: i64,
    csv_dir: &Path,
    conn: &mut PgConnection,
) -> Result<(Vec<PbpChunkCheckpoint>, i64), LoadError> {
    let mut reader = csv::Reader::from_path(csv_dir.join(&entry.csv_file)).map_err(|e| LoadError::Io {
        path: entry.csv_file.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;

    let mut checkpoints = Vec::new();
    let mut total_rows: i64 = 0;
    let mut chunk: Vec<PbpRow> = Vec::with_capacity(CHUNK_ROWS);
    let mut chunk_index = 0usize;

    let mut records = reader.deserialize::<PbpRow>();
    loop {
        chunk.clear();
        for row in records.by_ref().take(CHUNK_ROWS) {
            chunk.push(row?);
        }
        if chunk.is_empty() {
            break;
        }

        let checkpoint = load_one_chunk(run_id, chunk_index, &chunk, conn)?;
        total_rows += checkpoint.rows_out;
        checkpoints.push(checkpoint);
        chunk_index += 1;
    }

    Ok((checkpoints, total_rows))
}

fn load_one_chunk(
    run_id: i64,
    chunk_index: usize,
    chunk: &[PbpRow],
    conn: &mut PgConnection,
) -> Result<PbpChunkCheckpoint, LoadError> {
    let started_at = Utc::now();

    let new_rows: Vec<NewPbpEvent> = chunk
        .iter()
        .map(|r| {
            let clock_remaining = parse_clock_to_seconds(&r.clock)?;
            Ok(NewPbpEvent {
                game_id: r.game_id,
                eventnum: r.eventnum,
                period: r.period,
                clock_remaining,
                description: r.description.as_deref(),
                home_score: r.home_score,
                away_score: r.away_score,
                player1_id: r.player1_id,
                player2_id: r.player2_id,
                player3_id: r.player3_id,
                team_id: r.team_id,
                opponent_team_id: r.opponent_team_id,
                event_type: &r.event_type,
            })
        })
        .collect::<Result<_, LoadError>>()?;

    let rows_out = conn
        .transaction(|conn| diesel::insert_into(pbp_events::table).values(&new_rows).execute(conn))
        .map_err(|_: diesel::result::Error| LoadError::ChunkCheckpointFailed {
            step: format!("pbp_chunk_{chunk_index}"),
        })? as i64;

    let min_eventnum = chunk.iter().map(|r| r.eventnum).min();
    let max_eventnum = chunk.iter().map(|r| r.eventnum).max();

    let step: DbEtlRunStep = diesel::insert_into(etl_run_steps::table)
        .values(NewEtlRunStep {
            run_id,
            step: &format!("pbp_chunk_{chunk_index}"),
            rows_in: chunk.len() as i64,
            rows_out,
            status: "succeeded",
            chunk_min_key: min_eventnum.map(i64::from),
            chunk_max_key: max_eventnum.map(i64::from),
            started_at,
            ended_at: Some(Utc::now()),
        })
        .get_result(conn)
        .map_err(|_: diesel::result::Error| LoadError::ChunkCheckpointFailed {
            step: format!("pbp_chunk_{chunk_index}"),
        })?;

    Ok(PbpChunkCheckpoint {
        chunk_index,
        min_eventnum: step.chunk_min_key.map(|v| v as i32),
        max_eventnum: step.chunk_max_key.map(|v| v as i32),
        rows_out: step.rows_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_tracks_eventnum_bounds() {
        let chunk = vec![
            PbpRow {
                game_id: 1,
                eventnum: 3,
                period: 1,
                clock: "11:45".into(),
                description: None,
                home_score: 0,
                away_score: 0,
                player1_id: None,
                player2_id: None,
                player3_id: None,
                team_id: None,
                opponent_team_id: None,
                event_type: "shot".into(),
            },
            PbpRow {
                game_id: 1,
                eventnum: 1,
                period: 1,
                clock: "12:00".into(),
                description: None,
                home_score: 0,
                away_score: 0,
                player1_id: None,
                player2_id: None,
                player3_id: None,
                team_id: None,
                opponent_team_id: None,
                event_type: "jumpball".into(),
            },
        ];
        let min = chunk.iter().map(|r| r.eventnum).min();
        let max = chunk.iter().map(|r| r.eventnum).max();
        assert_eq!(min, Some(1));
        assert_eq!(max, Some(3));
    }
}
