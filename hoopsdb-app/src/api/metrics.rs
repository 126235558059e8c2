use crate::MetricsRegistryState;
use hoopsdb_query::registry::{EntityType, MetricCategory};
use hoopsdb_query::{MetricEntry, MetricFilter};
use rocket::State;
use rocket::get;
use rocket::serde::json::Json;

fn parse_entity_type(s: &str) -> Option<EntityType> {
    match s {
        "player" => Some(EntityType::Player),
        "team" => Some(EntityType::Team),
        "game" => Some(EntityType::Game),
        "pbp" => Some(EntityType::Pbp),
        _ => None,
    }
}

fn parse_category(s: &str) -> Option<MetricCategory> {
    match s {
        "counting" => Some(MetricCategory::Counting),
        "derived" => Some(MetricCategory::Derived),
        "rate" => Some(MetricCategory::Rate),
        _ => None,
    }
}

/// `GET /metrics`, optionally narrowed by `entity_type`/`category`; unknown
/// filter values are treated as "no match" rather than a 400, matching how
/// `MetricFilter::default()` already treats an absent filter.
#[get("/metrics?<entity_type>&<category>")]
pub fn list_metrics(
    entity_type: Option<&str>,
    category: Option<&str>,
    registry: &State<MetricsRegistryState>,
) -> Json<Vec<MetricEntry>> {
    let filter = MetricFilter {
        entity_type: entity_type.and_then(parse_entity_type),
        category: category.and_then(parse_category),
    };
    Json(registry.0.list(filter).into_iter().cloned().collect())
}
