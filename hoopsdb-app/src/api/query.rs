use crate::api::error::ApiError;
use crate::{Db, MetricsRegistryState};
use chrono::Utc;
use rocket::State;
use rocket::post;
use rocket::serde::Serialize;
use rocket::serde::json::Json;
use sha2::{Digest, Sha256};

#[derive(Serialize)]
struct Pagination {
    limit: u32,
    offset: u32,
}

#[derive(Serialize)]
struct Metadata {
    generated_at: chrono::DateTime<Utc>,
    query_sha256: String,
}

#[derive(Serialize)]
pub struct QueryResponse {
    data: Vec<serde_json::Value>,
    pagination: Pagination,
    echo: hoopsdb_query::ir::Filters,
    metadata: Metadata,
}

/// `subject` in the path must agree with the IR body's own `subject` tag;
/// it exists so routers and access logs can see the query kind without
/// parsing the body.
#[post("/query/<subject>", format = "json", data = "<body>")]
pub async fn run_query(
    subject: &str,
    body: Json<hoopsdb_query::ir::QueryRequest>,
    db: Db,
    registry: &State<MetricsRegistryState>,
) -> Result<Json<QueryResponse>, ApiError> {
    let request = body.into_inner();
    if request_subject(&request) != subject {
        return Err(hoopsdb_query::QueryError::InvalidFilterShape(format!(
            "path subject {subject:?} does not match body subject {:?}",
            request_subject(&request)
        ))
        .into());
    }

    let body_bytes = rocket::serde::json::to_string(&request).unwrap_or_default();
    let query_sha256 = hex::encode(Sha256::digest(body_bytes.as_bytes()));
    let page = request.page().clone();
    let filters = request.filters().clone();

    let registry = registry.0.clone();
    let rows = db
        .run(move |conn| {
            let compiled = hoopsdb_query::compile(&registry, &request)?;
            hoopsdb_query::execute(conn, compiled)
        })
        .await?;

    Ok(Json(QueryResponse {
        data: rows,
        pagination: Pagination { limit: page.limit, offset: page.offset },
        echo: filters,
        metadata: Metadata { generated_at: Utc::now(), query_sha256 },
    }))
}

fn request_subject(request: &hoopsdb_query::ir::QueryRequest) -> &'static str {
    use hoopsdb_query::ir::QueryRequest::*;
    match request {
        Leaderboards { .. } => "leaderboards",
        Spans { .. } => "spans",
        Splits { .. } => "splits",
        Streaks { .. } => "streaks",
        Versus { .. } => "versus",
    }
}
