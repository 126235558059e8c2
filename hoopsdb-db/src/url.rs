use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
pub use diesel::r2d2::PoolError;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use std::path::PathBuf;

pub type ConnectionPool = Pool<ConnectionManager<PgConnection>>;

/// Builds the r2d2 pool ETL loaders and the API's sync-pool fairing both
/// draw connections from, sized to the caller's own concurrency (the ETL's
/// worker pool size, or Rocket's configured `pool_size`).
pub fn get_pool(max_size: u32) -> Result<ConnectionPool, PoolError> {
    let manager = ConnectionManager::new(postgres_url_from_environment());

    Pool::builder().max_size(max_size).build(manager)
}

/// Resolves the Postgres connection string per spec.md §6: `DATABASE_URL`
/// wins outright when set; otherwise the individual `PG*` variables are
/// assembled into one.
pub fn postgres_url_from_environment() -> String {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return url;
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct PostgresConfig {
        host: Option<String>,
        port: Option<u16>,
        user: String,
        password: Option<String>,
        password_file: Option<PathBuf>,
        db: String,
    }
    let provider = figment::providers::Env::prefixed("PG_");
    let postgres_config: PostgresConfig = figment::Figment::from(provider)
        .extract()
        .expect("DATABASE_URL or PG_{HOST,PORT,USER,PASSWORD,DB} must be set");

    let password = if let Some(password) = postgres_config.password {
        password
    } else if let Some(password_file) = postgres_config.password_file {
        std::fs::read_to_string(password_file).expect("failed to read PG_PASSWORD_FILE")
    } else {
        panic!("one of PG_PASSWORD or PG_PASSWORD_FILE must be provided");
    };

    // Postgres (or something upstream in a deployment pipeline) may truncate
    // a password at the first newline. Trim a single trailing newline
    // silently, since that convention is common enough that users may not
    // even realize their secret has one, but refuse anything with an
    // embedded newline rather than silently truncate it.
    let password = password.strip_suffix('\n').unwrap_or(&password);
    if password.contains('\n') {
        panic!(
            "postgres password contains a non-terminal newline; refusing to truncate it silently"
        );
    }

    let password = utf8_percent_encode(password, NON_ALPHANUMERIC);
    let host = postgres_config.host.as_deref().unwrap_or("localhost");
    let port = postgres_config.port.unwrap_or(5432);

    format!(
        "postgres://{}:{}@{}:{}/{}",
        postgres_config.user, password, host, port, postgres_config.db
    )
}
