use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest entry {file} expected sha256 {expected} but file has {actual}")]
    Mismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("manifest entry {file} expected {expected} data lines but file has {actual}")]
    LineCountMismatch {
        file: String,
        expected: u64,
        actual: u64,
    },

    #[error("manifest entry {0} has no file on disk")]
    MissingFile(String),

    #[error("manifest entry {0} has no target_table")]
    Incomplete(String),

    #[error("could not read manifest file")]
    Io(#[from] std::io::Error),

    #[error("could not parse manifest YAML")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{table}: expected {expected} rows_out after COPY but counted {actual}")]
    CountMismatch {
        table: String,
        expected: i64,
        actual: i64,
    },

    #[error("foreign key violation in {table} on natural key {natural_key}")]
    FkViolation { table: String, natural_key: String },

    #[error("check constraint violation in {table}: {detail}")]
    CheckViolation { table: String, detail: String },

    #[error("could not coerce {column} value {value:?} in {table}")]
    TypeCoercion {
        table: String,
        column: String,
        value: String,
    },

    #[error("failed to record chunk checkpoint for {step}")]
    ChunkCheckpointFailed { step: String },

    #[error(transparent)]
    Resolution(#[from] hoopsdb_db::ResolutionError),

    #[error(transparent)]
    Db(#[from] diesel::result::Error),

    #[error("could not read CSV row")]
    Csv(#[from] csv::Error),

    #[error("could not open source file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pool(#[from] diesel::r2d2::PoolError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("row count mismatch for {table}: manifest says {expected}, db has {actual}")]
    RowCountMismatch {
        table: String,
        expected: i64,
        actual: i64,
    },

    #[error("fk coverage failure: {orphan_count} orphan rows in {child} referencing {parent}")]
    FkCoverageFail {
        child: String,
        parent: String,
        orphan_count: i64,
    },

    #[error("domain rule violation: {0}")]
    DomainRuleViolation(String),

    #[error("cross-table inconsistency: {0}")]
    CrossTableInconsistency(String),

    #[error(transparent)]
    Db(#[from] diesel::result::Error),
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Migration(#[from] hoopsdb_db::MigrationError),

    #[error(transparent)]
    Resolution(#[from] hoopsdb_db::ResolutionError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("run failed validation with {error_count} error-severity issues")]
    ValidationFailed { error_count: usize },

    #[error(transparent)]
    Db(#[from] diesel::result::Error),

    #[error(transparent)]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("run cancelled")]
    Cancelled,

    #[error("requested files {0:?} are not in the manifest")]
    UnknownFiles(Vec<String>),
}
