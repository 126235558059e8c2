use thiserror::Error;

/// Errors raised while building or querying the ID Resolution Service
/// (SPEC_FULL.md §5.3).
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("could not build resolver caches")]
    Db(#[from] diesel::result::Error),

    #[error("unresolved player: {0}")]
    UnresolvedPlayer(String),

    #[error("unresolved team abbreviation {abbrev:?} for season ending {season_end_year}")]
    UnresolvedTeam { abbrev: String, season_end_year: i32 },

    #[error("unresolved season ending {0}")]
    UnresolvedSeason(i32),

    #[error("ambiguous resolution for {key:?}: candidates {candidates:?}")]
    Ambiguous { key: String, candidates: Vec<i64> },
}

/// Errors raised while applying or verifying schema migrations
/// (SPEC_FULL.md §5.2).
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("could not connect to database")]
    Connection(#[from] diesel::ConnectionError),

    #[error("checksum of already-applied migration {version} no longer matches: expected {expected}, found {found}")]
    ChecksumMismatch {
        version: String,
        expected: String,
        found: String,
    },

    #[error("error applying migrations")]
    Apply(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Db(#[from] diesel::result::Error),

    #[error("could not read migration file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
