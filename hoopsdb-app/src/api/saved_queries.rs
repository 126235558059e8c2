use crate::api::error::ApiError;
use crate::SavedQueryStoreState;
use hoopsdb_query::ir::QueryRequest;
use hoopsdb_query::{SavedQuery, SavedQueryFilter, SavedQueryStore};
use rocket::serde::Deserialize;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};

#[get("/saved-queries")]
pub fn list_saved_queries(store: &State<SavedQueryStoreState>) -> Result<Json<Vec<SavedQuery>>, ApiError> {
    Ok(Json(store.0.list(&SavedQueryFilter::default())?))
}

#[get("/saved-queries/<id>")]
pub fn get_saved_query(id: &str, store: &State<SavedQueryStoreState>) -> Result<Json<SavedQuery>, ApiError> {
    Ok(Json(store.0.get(id)?))
}

#[derive(Deserialize)]
pub struct CreateSavedQuery {
    name: String,
    ir: QueryRequest,
}

#[post("/saved-queries", format = "json", data = "<body>")]
pub fn create_saved_query(
    body: Json<CreateSavedQuery>,
    store: &State<SavedQueryStoreState>,
) -> Result<Json<SavedQuery>, ApiError> {
    let body = body.into_inner();
    Ok(Json(store.0.create(&body.name, &body.ir)?))
}

#[derive(Deserialize)]
pub struct UpdateSavedQuery {
    ir: QueryRequest,
    expected_version: u32,
}

#[put("/saved-queries/<id>", format = "json", data = "<body>")]
pub fn update_saved_query(
    id: &str,
    body: Json<UpdateSavedQuery>,
    store: &State<SavedQueryStoreState>,
) -> Result<Json<SavedQuery>, ApiError> {
    let body = body.into_inner();
    Ok(Json(store.0.update(id, &body.ir, body.expected_version)?))
}

#[delete("/saved-queries/<id>")]
pub fn delete_saved_query(id: &str, store: &State<SavedQueryStoreState>) -> Result<(), ApiError> {
    store.0.delete(id)?;
    Ok(())
}
