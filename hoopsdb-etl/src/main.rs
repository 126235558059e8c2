//! Thin command surface over `hoopsdb_etl::orchestrator`. Argument parsing
//! here is deliberately minimal (out of scope per the design notes); the
//! behavior that matters is the exit code each subcommand produces.

use diesel::Connection;
use hoopsdb_etl::orchestrator::{self, RunMode};
use hoopsdb_etl::{errors::OrchestratorError, EtlConfig};
use hoopsdb_query::{FilesystemSavedQueryStore, SavedQueryFilter, SavedQueryStore};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let cfg = match EtlConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("could not load configuration: {e}");
            return ExitCode::from(3);
        }
    };

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "run".to_string());

    match command.as_str() {
        "run" => run_command(&cfg, args.collect()),
        "verify" => verify_command(&cfg),
        "migrate" => migrate_command(&cfg, args.next()),
        "queries" => queries_command(&cfg, args.collect()),
        other => {
            error!("unknown command {other:?}; expected run, verify, migrate, or queries");
            ExitCode::from(3)
        }
    }
}

fn run_command(cfg: &EtlConfig, files: Vec<String>) -> ExitCode {
    let mode = if files.is_empty() { RunMode::Full } else { RunMode::Subset(files) };
    match orchestrator::run(mode, cfg) {
        Ok(report) => {
            log::info!("run {} finished with status {} ({} steps, {} issues)", report.run_id, report.status, report.steps.len(), report.issues.len());
            ExitCode::SUCCESS
        }
        Err(e) => exit_code_for(&e),
    }
}

fn verify_command(cfg: &EtlConfig) -> ExitCode {
    match orchestrator::run(RunMode::VerifyOnly, cfg) {
        Ok(report) => {
            for issue in &report.issues {
                log::warn!("[{}] {}: {}", issue.severity.as_str(), issue.step, issue.message);
            }
            if report.issues.is_empty() { ExitCode::SUCCESS } else { ExitCode::from(2) }
        }
        Err(e) => exit_code_for(&e),
    }
}

fn migrate_command(cfg: &EtlConfig, up_to: Option<String>) -> ExitCode {
    let url = hoopsdb_db::postgres_url_from_environment();
    let mut conn = match hoopsdb_db::PgConnection::establish(&url) {
        Ok(c) => c,
        Err(e) => {
            error!("could not connect to {url}: {e}");
            return ExitCode::from(4);
        }
    };
    let _ = cfg;
    match orchestrator::migrate(&mut conn, up_to.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("migration failed: {e}");
            ExitCode::from(4)
        }
    }
}

fn queries_command(cfg: &EtlConfig, mut args: Vec<String>) -> ExitCode {
    if args.is_empty() {
        error!("queries subcommand requires one of: list, get, delete");
        return ExitCode::from(3);
    }
    let sub = args.remove(0);
    let store = FilesystemSavedQueryStore::new(PathBuf::from(&cfg.saved_queries_path));

    let outcome = match sub.as_str() {
        "list" => store.list(&SavedQueryFilter::default()).map(|qs| {
            for q in qs {
                println!("{}\t{}\t{}", q.id, q.version, q.name);
            }
        }),
        "get" => {
            let Some(id) = args.first() else {
                error!("queries get requires an id");
                return ExitCode::from(3);
            };
            store.get(id).map(|q| println!("{}", serde_json::to_string_pretty(&q).unwrap_or_default()))
        }
        "delete" => {
            let Some(id) = args.first() else {
                error!("queries delete requires an id");
                return ExitCode::from(3);
            };
            store.delete(id)
        }
        other => {
            error!("unknown queries subcommand {other:?}");
            return ExitCode::from(3);
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("queries command failed: {e}");
            ExitCode::from(3)
        }
    }
}

fn exit_code_for(e: &OrchestratorError) -> ExitCode {
    error!("run failed: {e}");
    let code = match e {
        OrchestratorError::ValidationFailed { .. } => 2,
        OrchestratorError::Manifest(_) | OrchestratorError::UnknownFiles(_) => 3,
        OrchestratorError::Migration(_) => 4,
        OrchestratorError::Load(_) | OrchestratorError::Resolution(_) | OrchestratorError::Db(_) | OrchestratorError::Pool(_) => 5,
        OrchestratorError::Cancelled => 7,
    };
    ExitCode::from(code)
}
