//! Single-shot run driver: manifest verification -> migrations -> resolver
//! bootstrap -> loaders (topological order) -> validation -> completion.
//! The `DagScheduler` below is new relative to the reference codebase's own
//! ingest loop, but reuses its cancellation-token plumbing
//! (`tokio_util::sync::CancellationToken`) for the same purpose: letting an
//! in-flight run be aborted cleanly between steps.

use crate::errors::{LoadError, OrchestratorError, Severity};
use crate::loaders::{LoadResult, awards_draft_supplementary, dimensions, games, pbp, player_season, team_season};
use crate::manifest::{Manifest, ManifestEntry};
use crate::validation::{self, ValidationIssue};
use chrono::Utc;
use diesel::prelude::*;
use hoopsdb_db::models::{NewEtlRun, NewEtlRunIssue, NewEtlRunStep, NewLoadManifest};
use hoopsdb_db::resolver::Resolver;
use hoopsdb_db::schema::etl::etl::{etl_run_issues, etl_run_steps, etl_runs, load_manifests};
use hoopsdb_db::{ConnectionPool, PgConnection};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// `Subset` restricts loading to the named files. Every stage up through
/// the last one that owns a requested file still runs in full — a stage's
/// loaders resolve identifiers against the previous stage's rows (games
/// against dimensions, player/team season against games, pbp and
/// supplementary against whatever came before), so requesting a file deep
/// in the topology implicitly expands to every predecessor stage rather
/// than running that file in isolation against a possibly-stale database.
/// Within the target stage itself, only the requested files (plus a
/// hub table's own satellites' hub, which every satellite needs to join
/// against) run. Like `Full`, only `Full` writes the completion row to
/// `load_manifests` — a `Subset` run is for re-loading or re-validating
/// part of the pipeline without marking every source file as freshly
/// loaded.
#[derive(Debug, Clone)]
pub enum RunMode {
    Full,
    Subset(Vec<String>),
    VerifyOnly,
}

/// The six loader stages in topological order, with the CSV files each one
/// owns. Used only to find how far a `Subset` request reaches; the actual
/// loading still goes through `run_dimensions`/`run_games`/etc.
const STAGE_FILES: [&[&str]; 6] = [
    &["seasons.csv", "teams.csv", "team_history.csv", "team_abbrev_mappings.csv", "player.csv", "player_aliases.csv"],
    &["games.csv", "boxscore_team.csv", "boxscore_player.csv"],
    &["player_season_per_game.csv", "player_season_totals.csv", "player_season_per36.csv", "player_season_per100.csv", "player_season_advanced.csv"],
    &[
        "team_season.csv",
        "team_season_totals.csv",
        "team_season_per_game.csv",
        "team_season_per100.csv",
        "team_season_opponent_totals.csv",
        "team_season_opponent_per_game.csv",
        "team_season_opponent_per100.csv",
    ],
    &["pbp_events.csv"],
    &[
        "all_star_selections.csv",
        "player_award_shares.csv",
        "end_of_season_teams.csv",
        "end_of_season_voting.csv",
        "draft_picks.csv",
        "draft_combine_stats.csv",
        "inactive_players.csv",
        "player_playbyplay_stats.csv",
        "player_shooting_stats.csv",
        "team_summaries.csv",
        "game_officials.csv",
    ],
];

/// Index of the last stage that owns a file named in `mode`'s subset, or
/// the final stage index for `Full`/`VerifyOnly`. Stages `0..=this` all
/// run; stages after it are skipped entirely.
fn last_stage_index(mode: &RunMode) -> usize {
    match mode {
        RunMode::Full | RunMode::VerifyOnly => STAGE_FILES.len() - 1,
        RunMode::Subset(files) => STAGE_FILES
            .iter()
            .rposition(|stage_files| stage_files.iter().any(|f| files.iter().any(|r| r == f)))
            .unwrap_or(0),
    }
}

/// Whether `file`, which belongs to the stage at `stage_idx`, should run.
/// Predecessor stages (`stage_idx < last_idx`) always run in full; the
/// target stage itself (`stage_idx == last_idx`) restricts to the files
/// `mode` actually named.
fn stage_wants_file(mode: &RunMode, stage_idx: usize, last_idx: usize, file: &str) -> bool {
    if stage_idx < last_idx {
        return true;
    }
    match mode {
        RunMode::Full | RunMode::VerifyOnly => true,
        RunMode::Subset(files) => files.iter().any(|f| f == file),
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: i64,
    pub status: String,
    pub steps: Vec<LoadResult>,
    pub issues: Vec<ValidationIssue>,
}

pub struct Orchestrator {
    pool: ConnectionPool,
    manifest: Manifest,
    csv_dir: PathBuf,
    worker_pool_size: usize,
    cancel: CancellationToken,
}

/// A set of independent steps that may run concurrently (up to the
/// configured worker pool size), executed after every step in every
/// preceding level has committed. Mirrors the groups in spec.md §4.4's
/// loader topology (the arrows inside a numbered group are a strict
/// sub-order; the numbered groups themselves, and any independent
/// satellites within one, are this scheduler's levels).
type Step<'a> = (&'static str, Box<dyn FnOnce(&mut PgConnection) -> Result<LoadResult, LoadError> + Send + 'a>);

impl Orchestrator {
    pub fn new(pool: ConnectionPool, manifest: Manifest, csv_dir: PathBuf, worker_pool_size: usize) -> Self {
        Self {
            pool,
            manifest,
            csv_dir,
            worker_pool_size: worker_pool_size.max(1),
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn entry(&self, csv_file: &str) -> Result<&ManifestEntry, OrchestratorError> {
        self.manifest
            .entry(csv_file)
            .ok_or_else(|| OrchestratorError::UnknownFiles(vec![csv_file.to_string()]))
    }

    /// Runs a level's steps concurrently, each against its own pooled
    /// connection, returning as soon as every step has either produced a
    /// result or failed. The first error observed is surfaced to the
    /// caller; the level still runs every step to completion so a run's
    /// log reflects every failure, not just the first one hit.
    fn run_level(&self, steps: Vec<Step<'_>>) -> Result<Vec<LoadResult>, LoadError> {
        let pool_size = self.worker_pool_size.min(steps.len().max(1));
        let mut results = Vec::with_capacity(steps.len());
        let mut first_err = None;

        std::thread::scope(|scope| {
            let mut chunks: Vec<Vec<Step<'_>>> = (0..pool_size).map(|_| Vec::new()).collect();
            for (i, step) in steps.into_iter().enumerate() {
                chunks[i % pool_size].push(step);
            }

            let handles: Vec<_> = chunks
                .into_iter()
                .filter(|c| !c.is_empty())
                .map(|chunk| {
                    let pool = self.pool.clone();
                    scope.spawn(move || {
                        let mut out = Vec::with_capacity(chunk.len());
                        for (name, f) in chunk {
                            let mut conn = match pool.get() {
                                Ok(c) => c,
                                Err(e) => {
                                    out.push((name, Err(LoadError::Pool(e))));
                                    continue;
                                }
                            };
                            out.push((name, f(&mut conn)));
                        }
                        out
                    })
                })
                .collect();

            for handle in handles {
                for (_, result) in handle.join().expect("loader thread panicked") {
                    match result {
                        Ok(r) => results.push(r),
                        Err(e) => {
                            if first_err.is_none() {
                                first_err = Some(e);
                            }
                        }
                    }
                }
            }
        });

        match first_err {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }

    fn run_dimensions(&self, mode: &RunMode, last_idx: usize) -> Result<Vec<LoadResult>, OrchestratorError> {
        let mut conn = self.pool.get().map_err(OrchestratorError::Pool)?;
        let mut results = Vec::new();
        for csv_file in STAGE_FILES[0] {
            let csv_file = *csv_file;
            if !stage_wants_file(mode, 0, last_idx, csv_file) {
                continue;
            }
            let entry = self.entry(csv_file)?;
            let r = match csv_file {
                "seasons.csv" => dimensions::load_seasons(entry, &self.csv_dir, &mut conn),
                "teams.csv" => dimensions::load_teams(entry, &self.csv_dir, &mut conn),
                "team_history.csv" => dimensions::load_team_history(entry, &self.csv_dir, &mut conn),
                "team_abbrev_mappings.csv" => dimensions::load_team_abbrev_mappings(entry, &self.csv_dir, &mut conn),
                "player.csv" => dimensions::load_players(entry, &self.csv_dir, &mut conn),
                "player_aliases.csv" => dimensions::load_player_aliases(entry, &self.csv_dir, &mut conn),
                _ => unreachable!(),
            }?;
            results.push(r);
        }
        Ok(results)
    }

    fn run_games(&self, resolver: &Resolver, mode: &RunMode, last_idx: usize) -> Result<Vec<LoadResult>, OrchestratorError> {
        let mut conn = self.pool.get().map_err(OrchestratorError::Pool)?;
        let mut results = Vec::new();
        for csv_file in STAGE_FILES[1] {
            let csv_file = *csv_file;
            if !stage_wants_file(mode, 1, last_idx, csv_file) {
                continue;
            }
            let entry = self.entry(csv_file)?;
            let r = match csv_file {
                "games.csv" => games::load_games(entry, resolver, &self.csv_dir, &mut conn),
                "boxscore_team.csv" => games::load_boxscore_team(entry, resolver, &self.csv_dir, &mut conn),
                "boxscore_player.csv" => games::load_boxscore_player(entry, resolver, &self.csv_dir, &mut conn),
                _ => unreachable!(),
            }?;
            results.push(r);
        }
        Ok(results)
    }

    fn run_player_season(&self, resolver: &Resolver, mode: &RunMode, last_idx: usize) -> Result<Vec<LoadResult>, OrchestratorError> {
        let mut conn = self.pool.get().map_err(OrchestratorError::Pool)?;
        let hub_entry = self.entry("player_season_per_game.csv")?;
        let hub = player_season::load_player_season_hub(hub_entry, resolver, &self.csv_dir, &mut conn)?;

        let satellites = [
            ("player_season_per_game.csv", player_season::load_player_season_per_game as fn(&ManifestEntry, &Path, &mut PgConnection) -> Result<LoadResult, LoadError>),
            ("player_season_totals.csv", player_season::load_player_season_totals),
            ("player_season_per36.csv", player_season::load_player_season_per36),
            ("player_season_per100.csv", player_season::load_player_season_per100),
            ("player_season_advanced.csv", player_season::load_player_season_advanced),
        ];

        let steps: Vec<Step<'_>> = satellites
            .into_iter()
            .filter(|(file, _)| stage_wants_file(mode, 2, last_idx, file))
            .filter_map(|(file, f)| self.entry(file).ok().map(|entry| {
                let csv_dir = self.csv_dir.clone();
                let entry = entry.clone();
                (
                    file,
                    Box::new(move |conn: &mut PgConnection| f(&entry, &csv_dir, conn)) as _,
                )
            }))
            .collect();

        let mut results = self.run_level(steps)?;
        results.insert(0, hub);
        Ok(results)
    }

    fn run_team_season(&self, resolver: &Resolver, mode: &RunMode, last_idx: usize) -> Result<Vec<LoadResult>, OrchestratorError> {
        let mut conn = self.pool.get().map_err(OrchestratorError::Pool)?;
        let hub_entry = self.entry("team_season.csv")?;
        let hub = team_season::load_team_season_hub(hub_entry, resolver, &self.csv_dir, &mut conn)?;

        let satellites = [
            ("team_season_totals.csv", team_season::load_team_season_totals as fn(&ManifestEntry, &Path, &mut PgConnection) -> Result<LoadResult, LoadError>),
            ("team_season_per_game.csv", team_season::load_team_season_per_game),
            ("team_season_per100.csv", team_season::load_team_season_per100),
            ("team_season_opponent_totals.csv", team_season::load_team_season_opponent_totals),
            ("team_season_opponent_per_game.csv", team_season::load_team_season_opponent_per_game),
            ("team_season_opponent_per100.csv", team_season::load_team_season_opponent_per100),
        ];

        let steps: Vec<Step<'_>> = satellites
            .into_iter()
            .filter(|(file, _)| stage_wants_file(mode, 3, last_idx, file))
            .filter_map(|(file, f)| self.entry(file).ok().map(|entry| {
                let csv_dir = self.csv_dir.clone();
                let entry = entry.clone();
                (
                    file,
                    Box::new(move |conn: &mut PgConnection| f(&entry, &csv_dir, conn)) as _,
                )
            }))
            .collect();

        let mut results = self.run_level(steps)?;
        results.insert(0, hub);
        Ok(results)
    }

    fn run_supplementary(&self, resolver: &Resolver, mode: &RunMode, last_idx: usize) -> Result<Vec<LoadResult>, OrchestratorError> {
        let resolved: [(&str, fn(&ManifestEntry, &Resolver, &Path, &mut PgConnection) -> Result<LoadResult, LoadError>); 7] = [
            ("all_star_selections.csv", awards_draft_supplementary::load_all_star_selections),
            ("player_award_shares.csv", awards_draft_supplementary::load_player_award_shares),
            ("end_of_season_teams.csv", awards_draft_supplementary::load_end_of_season_teams),
            ("end_of_season_voting.csv", awards_draft_supplementary::load_end_of_season_voting),
            ("draft_picks.csv", awards_draft_supplementary::load_draft_picks),
            ("draft_combine_stats.csv", awards_draft_supplementary::load_draft_combine_stats),
            ("inactive_players.csv", games::load_inactive_players),
        ];
        let unresolved: [(&str, fn(&ManifestEntry, &Path, &mut PgConnection) -> Result<LoadResult, LoadError>); 4] = [
            ("player_playbyplay_stats.csv", awards_draft_supplementary::load_player_playbyplay_stats),
            ("player_shooting_stats.csv", awards_draft_supplementary::load_player_shooting_stats),
            ("team_summaries.csv", awards_draft_supplementary::load_team_summaries),
            ("game_officials.csv", games::load_game_officials),
        ];

        let mut steps: Vec<Step<'_>> = resolved
            .into_iter()
            .filter(|(file, _)| stage_wants_file(mode, 5, last_idx, file))
            .filter_map(|(file, f)| self.entry(file).ok().map(|entry| {
                let csv_dir = self.csv_dir.clone();
                let entry = entry.clone();
                (
                    file,
                    Box::new(move |conn: &mut PgConnection| f(&entry, resolver, &csv_dir, conn)) as _,
                )
            }))
            .collect();

        steps.extend(unresolved.into_iter().filter(|(file, _)| stage_wants_file(mode, 5, last_idx, file)).filter_map(|(file, f)| self.entry(file).ok().map(|entry| {
            let csv_dir = self.csv_dir.clone();
            let entry = entry.clone();
            (
                file,
                Box::new(move |conn: &mut PgConnection| f(&entry, &csv_dir, conn)) as _,
            )
        })));

        Ok(self.run_level(steps)?)
    }

    fn run_pbp(&self, run_id: i64, mode: &RunMode, last_idx: usize) -> Result<Vec<LoadResult>, OrchestratorError> {
        if !stage_wants_file(mode, 4, last_idx, "pbp_events.csv") {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().map_err(OrchestratorError::Pool)?;
        let Some(entry) = self.manifest.entry("pbp_events.csv") else {
            return Ok(Vec::new());
        };
        let started_at = Utc::now();
        let (checkpoints, row_count) = pbp::load_pbp_events(entry, run_id, &self.csv_dir, &mut conn)?;
        for checkpoint in &checkpoints {
            diesel::insert_into(etl_run_steps::table)
                .values(NewEtlRunStep {
                    run_id,
                    step: "pbp_events",
                    rows_in: checkpoint.rows_out,
                    rows_out: checkpoint.rows_out,
                    status: "COMPLETED",
                    chunk_min_key: checkpoint.min_eventnum.map(i64::from),
                    chunk_max_key: checkpoint.max_eventnum.map(i64::from),
                    started_at,
                    ended_at: Some(Utc::now()),
                })
                .execute(&mut conn)?;
        }
        Ok(vec![LoadResult {
            table: "pbp_events".to_string(),
            rows_in: row_count,
            rows_out: row_count,
            started_at,
            ended_at: Utc::now(),
            issues: Vec::new(),
        }])
    }

    fn record_step(&self, conn: &mut PgConnection, run_id: i64, r: &LoadResult) -> Result<(), OrchestratorError> {
        diesel::insert_into(etl_run_steps::table)
            .values(NewEtlRunStep {
                run_id,
                step: &r.table,
                rows_in: r.rows_in,
                rows_out: r.rows_out,
                status: "COMPLETED",
                chunk_min_key: None,
                chunk_max_key: None,
                started_at: r.started_at,
                ended_at: Some(r.ended_at),
            })
            .execute(conn)?;
        Ok(())
    }

    fn record_issues(&self, conn: &mut PgConnection, run_id: i64, step: &str, issues: &[ValidationIssue]) -> Result<(), OrchestratorError> {
        for issue in issues {
            diesel::insert_into(etl_run_issues::table)
                .values(NewEtlRunIssue {
                    run_id,
                    step,
                    severity: issue.severity.as_str(),
                    message: &issue.message,
                    created_at: Utc::now(),
                })
                .execute(conn)?;
        }
        Ok(())
    }

    /// Drives manifest verification, migrations having already been applied
    /// by the caller, the six loader stages in topological order, and the
    /// post-load validation suite, recording everything to the `etl_*`
    /// bookkeeping tables as it goes.
    pub fn run(&self, mode: RunMode) -> Result<RunReport, OrchestratorError> {
        let mut conn = self.pool.get().map_err(OrchestratorError::Pool)?;

        let preload_issues = validation::run_preload(&self.manifest, &self.csv_dir);
        if preload_issues.iter().any(|i| i.severity == Severity::Error) && !matches!(mode, RunMode::VerifyOnly) {
            return Err(OrchestratorError::Manifest(crate::errors::ManifestError::Incomplete(
                "one or more manifest entries failed pre-load verification".to_string(),
            )));
        }

        if matches!(mode, RunMode::VerifyOnly) {
            return Ok(RunReport {
                run_id: 0,
                status: if preload_issues.is_empty() { "CLEAN".to_string() } else { "ISSUES_FOUND".to_string() },
                steps: Vec::new(),
                issues: preload_issues,
            });
        }

        let mode_label = match &mode {
            RunMode::Full => "full".to_string(),
            RunMode::Subset(files) => format!("subset:{}", files.join(",")),
            RunMode::VerifyOnly => "verify_only".to_string(),
        };
        let run_id: i64 = diesel::insert_into(etl_runs::table)
            .values(NewEtlRun {
                started_at: Utc::now(),
                mode: mode_label,
                status: "RUNNING".to_string(),
            })
            .returning(etl_runs::id)
            .get_result(&mut conn)?;

        let mut all_steps = Vec::new();
        let result = self.run_inner(&mut conn, run_id, &mut all_steps, &mode);

        let (status, issues) = match &result {
            Ok(issues) => ("COMPLETED", issues.clone()),
            Err(_) => ("FAILED", Vec::new()),
        };

        diesel::update(etl_runs::table.find(run_id))
            .set((etl_runs::ended_at.eq(Utc::now()), etl_runs::status.eq(status)))
            .execute(&mut conn)?;

        result?;

        if let RunMode::Full = mode {
            for entry in &self.manifest.entries {
                diesel::insert_into(load_manifests::table)
                    .values(NewLoadManifest {
                        file: &entry.csv_file,
                        sha256: &entry.sha256,
                        row_count: entry.line_count as i64,
                        loaded_at: Utc::now(),
                        operator: None,
                    })
                    .execute(&mut conn)?;
            }
        }

        Ok(RunReport { run_id, status: status.to_string(), steps: all_steps, issues })
    }

    fn run_inner(
        &self,
        conn: &mut PgConnection,
        run_id: i64,
        all_steps: &mut Vec<LoadResult>,
        mode: &RunMode,
    ) -> Result<Vec<ValidationIssue>, OrchestratorError> {
        if self.cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }

        let last_idx = last_stage_index(mode);

        for r in self.run_dimensions(mode, last_idx)? {
            self.record_step(conn, run_id, &r)?;
            all_steps.push(r);
        }

        if last_idx == 0 {
            let issues = validation::run_postload(conn, &self.manifest)?;
            self.record_issues(conn, run_id, "postload", &issues)?;
            return Ok(issues);
        }

        let resolver = Resolver::build(conn)?;

        for r in self.run_games(&resolver, mode, last_idx)? {
            self.record_step(conn, run_id, &r)?;
            all_steps.push(r);
        }
        if last_idx >= 2 {
            for r in self.run_player_season(&resolver, mode, last_idx)? {
                self.record_step(conn, run_id, &r)?;
                all_steps.push(r);
            }
        }
        if last_idx >= 3 {
            for r in self.run_team_season(&resolver, mode, last_idx)? {
                self.record_step(conn, run_id, &r)?;
                all_steps.push(r);
            }
        }
        if last_idx >= 4 {
            for r in self.run_pbp(run_id, mode, last_idx)? {
                self.record_step(conn, run_id, &r)?;
                all_steps.push(r);
            }
        }
        if last_idx >= 5 {
            for r in self.run_supplementary(&resolver, mode, last_idx)? {
                self.record_step(conn, run_id, &r)?;
                all_steps.push(r);
            }
        }

        let issues = validation::run_postload(conn, &self.manifest)?;
        self.record_issues(conn, run_id, "postload", &issues)?;

        if issues.iter().any(|i| i.severity == Severity::Error) {
            return Err(OrchestratorError::ValidationFailed {
                error_count: issues.iter().filter(|i| i.severity == Severity::Error).count(),
            });
        }

        Ok(issues)
    }
}

/// Applies every numbered migration up to (and including) `up_to`, or all
/// of them when `up_to` is `None`.
pub fn migrate(conn: &mut PgConnection, up_to: Option<&str>) -> Result<(), hoopsdb_db::MigrationError> {
    hoopsdb_db::apply_migrations(conn, up_to)
}

/// Entry point for the CLI: builds a pool and manifest from config and drives
/// one run. `RunMode::Subset` filenames that aren't in the manifest are
/// reported up front rather than silently ignored mid-run.
pub fn run(mode: RunMode, cfg: &crate::config::EtlConfig) -> Result<RunReport, OrchestratorError> {
    let pool = hoopsdb_db::get_pool(cfg.db_pool_size)?;
    let manifest = crate::manifest::load_manifest(Path::new(&cfg.manifest_path))?;

    if let RunMode::Subset(files) = &mode {
        let unknown: Vec<String> = files.iter().filter(|f| manifest.entry(f).is_none()).cloned().collect();
        if !unknown.is_empty() {
            return Err(OrchestratorError::UnknownFiles(unknown));
        }
    }

    let orchestrator = Orchestrator::new(pool, manifest, PathBuf::from(&cfg.csv_dir), cfg.run_worker_pool_size);
    orchestrator.run(mode)
}

