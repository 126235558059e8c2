pub mod compiler;
pub mod errors;
pub mod ir;
pub mod registry;
pub mod saved_queries;
pub mod schema_meta;

pub use compiler::{compile, execute, DynamicQuery, Param, STATEMENT_TIMEOUT_SECONDS};
pub use errors::{QueryError, RegistryError, SavedQueryError};
pub use ir::QueryRequest;
pub use registry::{MetricEntry, MetricFilter, MetricsRegistry};
pub use saved_queries::{FilesystemSavedQueryStore, SavedQuery, SavedQueryFilter, SavedQueryStore};
