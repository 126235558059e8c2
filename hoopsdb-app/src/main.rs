mod api;

use diesel::prelude::*;
use diesel::PgConnection;
use hoopsdb_query::MetricsRegistry;
use hoopsdb_query::{FilesystemSavedQueryStore, SavedQueryStore};
use rocket::fairing::AdHoc;
use rocket::figment::map;
use rocket::{Build, Rocket, figment, launch};
use rocket_sync_db_pools::database as sync_database;
use rocket_sync_db_pools::diesel::PgConnection as SyncPgConnection;
use std::path::PathBuf;
use std::sync::Arc;

#[sync_database("hoopsdb")]
pub struct Db(SyncPgConnection);

/// Wraps the registry in an `Arc` so `db.run(move |conn| ...)` closures can
/// clone a handle cheaply into the blocking thread pool.
pub struct MetricsRegistryState(pub Arc<MetricsRegistry>);

pub struct SavedQueryStoreState(pub Arc<dyn SavedQueryStore + Send + Sync>);

async fn run_migrations(rocket: Rocket<Build>) -> Rocket<Build> {
    let config: rocket_sync_db_pools::Config = rocket
        .figment()
        .extract_inner("databases.hoopsdb")
        .expect("hoopsdb database connection information was not found in Rocket.toml");

    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&config.url)
            .expect("failed to connect to hoopsdb database during migrations");
        hoopsdb_db::apply_migrations(&mut conn, None).expect("failed to apply migrations");
    })
    .await
    .expect("error joining migrations task");

    rocket
}

fn get_figment_with_constructed_db_url() -> figment::Figment {
    let url = hoopsdb_db::postgres_url_from_environment();
    rocket::Config::figment().merge(("databases", map!["hoopsdb" => map!["url" => url]]))
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let registry_path = std::env::var("REGISTRY_PATH").unwrap_or_else(|_| "docs/metrics_registry.yaml".to_string());
    let registry = MetricsRegistry::load(&PathBuf::from(registry_path)).expect("could not load metrics registry");

    let saved_queries_path = std::env::var("SAVED_QUERIES_PATH").unwrap_or_else(|_| "data/saved_queries".to_string());
    let store = FilesystemSavedQueryStore::new(PathBuf::from(saved_queries_path));

    rocket::custom(get_figment_with_constructed_db_url())
        .mount("/api", api::routes())
        .manage(MetricsRegistryState(Arc::new(registry)))
        .manage(SavedQueryStoreState(Arc::new(store)))
        .attach(Db::fairing())
        .attach(AdHoc::on_ignite("Migrations", run_migrations))
}

#[cfg(test)]
mod tests {
    use super::*;

    pub async fn get_db() -> Db {
        let config = get_figment_with_constructed_db_url()
            .merge(("port", openport::pick_random_unused_port()))
            .merge(("databases", map!["hoopsdb" => map!["pool_size" => 3]]));

        let rocket = rocket::custom(config)
            .attach(Db::fairing())
            .ignite()
            .await
            .expect("Rocket failed to ignite");

        Db::get_one(&rocket)
            .await
            .expect("Failed to get a database connection")
    }

    #[tokio::test]
    async fn connect_to_db() {
        let db = get_db().await;

        db.run(|_| ()).await;
    }
}
