mod error;
mod health;
mod metrics;
mod query;
mod saved_queries;

pub fn routes() -> Vec<rocket::Route> {
    rocket::routes![
        health::health,
        metrics::list_metrics,
        query::run_query,
        saved_queries::list_saved_queries,
        saved_queries::get_saved_query,
        saved_queries::create_saved_query,
        saved_queries::update_saved_query,
        saved_queries::delete_saved_query,
    ]
}
