use hoopsdb_query::{QueryError, RegistryError, SavedQueryError};
use log::error;
use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, Response};
use thiserror::Error;
use std::io::Cursor;

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    SavedQuery(#[from] SavedQueryError),

    #[error(transparent)]
    Db(#[from] diesel::result::Error),

    #[error(transparent)]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Query(QueryError::MetricUnknown(_)) => "METRIC_UNKNOWN",
            ApiError::Query(QueryError::InvalidFilterShape(_)) => "INVALID_FILTER_SHAPE",
            ApiError::Query(QueryError::UnsatisfiableQuery(_)) => "UNSATISFIABLE_QUERY",
            ApiError::Query(QueryError::QueryTimeout) => "QUERY_TIMEOUT",
            ApiError::Query(QueryError::ExecutionError(_)) => "EXECUTION_ERROR",
            ApiError::Query(QueryError::Pool(_)) => "EXECUTION_ERROR",
            ApiError::Registry(_) => "REGISTRY_INVALID",
            ApiError::SavedQuery(SavedQueryError::NotFound(_)) => "SAVED_QUERY_NOT_FOUND",
            ApiError::SavedQuery(SavedQueryError::VersionConflict { .. }) => "SAVED_QUERY_CONFLICT",
            ApiError::SavedQuery(_) => "EXECUTION_ERROR",
            ApiError::Db(_) | ApiError::Pool(_) => "EXECUTION_ERROR",
        }
    }

    fn status(&self) -> Status {
        match self {
            ApiError::Query(QueryError::MetricUnknown(_))
            | ApiError::Query(QueryError::InvalidFilterShape(_))
            | ApiError::Query(QueryError::UnsatisfiableQuery(_)) => Status::BadRequest,
            ApiError::Query(QueryError::QueryTimeout) => Status::GatewayTimeout,
            ApiError::SavedQuery(SavedQueryError::NotFound(_)) => Status::NotFound,
            ApiError::SavedQuery(SavedQueryError::VersionConflict { .. }) => Status::Conflict,
            _ => Status::InternalServerError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'o> {
        error!("{self}");
        let status = self.status();
        let body = ErrorBody { code: self.code(), message: self.to_string() };
        let rendered = rocket::serde::json::to_string(&body).unwrap_or_else(|_| "{}".to_string());

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(rendered.len(), Cursor::new(rendered))
            .ok()
    }
}
