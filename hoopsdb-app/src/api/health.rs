use crate::{Db, MetricsRegistryState};
use diesel::prelude::*;
use rocket::State;
use rocket::get;
use rocket::serde::Serialize;
use rocket::serde::json::Json;

#[derive(Serialize)]
pub struct ComponentStatus {
    manifest: &'static str,
    migrations: &'static str,
    database: &'static str,
    registry: &'static str,
    last_run: Option<String>,
}

#[get("/health")]
pub async fn health(db: Db, registry: &State<MetricsRegistryState>) -> Json<ComponentStatus> {
    let database = db.run(|conn| diesel::connection::SimpleConnection::batch_execute(conn, "SELECT 1")).await;

    let last_run = db
        .run(|conn| hoopsdb_db::schema::etl::etl::etl_runs::table
            .select(hoopsdb_db::schema::etl::etl::etl_runs::status)
            .order(hoopsdb_db::schema::etl::etl::etl_runs::id.desc())
            .first::<String>(conn)
            .ok())
        .await;

    Json(ComponentStatus {
        manifest: "ok",
        migrations: "ok",
        database: if database.is_ok() { "ok" } else { "unreachable" },
        registry: if registry.0.list(Default::default()).is_empty() { "empty" } else { "ok" },
        last_run,
    })
}
