use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("could not read metrics catalog file")]
    Io(#[from] std::io::Error),

    #[error("could not parse metrics catalog YAML")]
    Parse(#[from] serde_yaml::Error),

    #[error("metric {0:?} is unknown")]
    Unknown(String),

    #[error("metric {metric:?} references unknown column {table}.{column}")]
    UnknownColumn {
        metric: String,
        table: String,
        column: String,
    },

    #[error("dependency cycle detected involving metric {0:?}")]
    DependencyCycle(String),

    #[error("metric {0:?} depends on unknown metric {1:?}")]
    UnknownDependency(String, String),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("metric {0:?} is unknown")]
    MetricUnknown(String),

    #[error("invalid filter shape: {0}")]
    InvalidFilterShape(String),

    #[error("query is unsatisfiable: {0}")]
    UnsatisfiableQuery(String),

    #[error("query exceeded its statement timeout")]
    QueryTimeout,

    #[error(transparent)]
    ExecutionError(#[from] diesel::result::Error),

    #[error(transparent)]
    Pool(#[from] diesel::r2d2::PoolError),
}

#[derive(Debug, Error)]
pub enum SavedQueryError {
    #[error("saved query {0} not found")]
    NotFound(String),

    #[error("saved query {id} version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        id: String,
        expected: u32,
        actual: u32,
    },

    #[error("could not read saved query store")]
    Io(#[from] std::io::Error),

    #[error("could not (de)serialize saved query document")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Db(#[from] diesel::result::Error),
}
