pub mod errors;
pub mod migrations;
pub mod models;
pub mod resolver;
pub mod schema;
mod url;

pub use errors::{MigrationError, ResolutionError};
pub use migrations::apply_migrations;
pub use resolver::{Resolver, seas_id};
pub use url::{ConnectionPool, PoolError, get_pool, postgres_url_from_environment};

pub use diesel::{Connection, PgConnection};
