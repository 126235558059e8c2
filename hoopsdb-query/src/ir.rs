//! Query IR: a tagged-union request shape validated at the edge (via serde)
//! before the compiler ever sees it, rather than the inheritance-style
//! filter hierarchy the reference analytics layer grew into over time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Player,
    Team,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricRef {
    pub id: String,
    pub aggregation_override: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SeasonFilter {
    Range { from: i32, to: i32 },
    Discrete { years: Vec<i32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Home,
    Away,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Regular,
    Playoffs,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win,
    Loss,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Gte,
    Lte,
    Eq,
    Gt,
    Lt,
    Between,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimplePredicate {
    pub metric_id: String,
    pub op: CompareOp,
    pub thresholds: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "combinator", rename_all = "snake_case")]
pub enum AdvancedCondition {
    And { conditions: Vec<AdvancedCondition> },
    Or { conditions: Vec<AdvancedCondition> },
    Predicate(SimplePredicate),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Filters {
    pub season: Option<SeasonFilter>,
    pub date_range: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
    pub team_include: Vec<i64>,
    pub team_exclude: Vec<i64>,
    pub player_include: Vec<i64>,
    pub player_exclude: Vec<i64>,
    pub opponent: Option<i64>,
    pub location: Option<Location>,
    pub game_type: Option<GameType>,
    pub result: Option<GameResult>,
    pub advanced_condition: Option<AdvancedCondition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitDimension {
    Season,
    Month,
    Opponent,
    Location,
    Result,
    RestDays,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanMode {
    Games,
    Dates,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpanSpec {
    pub mode: SpanMode,
    pub window_size: u32,
    pub step: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreakSpec {
    pub metric_id: String,
    pub predicate: CompareOp,
    pub thresholds: Vec<f64>,
    pub min_length: u32,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersusMode {
    HeadToHead,
    Parallel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersusSpec {
    pub subject_a: i64,
    pub subject_b: i64,
    pub mode: VersusMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SortSpec {
    pub metric_id: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageSpec {
    pub limit: u32,
    pub offset: u32,
}

pub const MAX_PAGE_LIMIT: u32 = 1000;

impl Default for PageSpec {
    fn default() -> Self {
        Self { limit: 100, offset: 0 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "subject", rename_all = "snake_case")]
pub enum QueryRequest {
    Leaderboards {
        entity_type: EntityType,
        metrics: Vec<MetricRef>,
        filters: Filters,
        sort: Vec<SortSpec>,
        #[serde(default)]
        page: PageSpec,
    },
    Spans {
        entity_type: EntityType,
        metrics: Vec<MetricRef>,
        filters: Filters,
        span_mode: SpanSpec,
        sort: Vec<SortSpec>,
        #[serde(default)]
        page: PageSpec,
    },
    Splits {
        entity_type: EntityType,
        metrics: Vec<MetricRef>,
        filters: Filters,
        split_dimension: SplitDimension,
        sort: Vec<SortSpec>,
        #[serde(default)]
        page: PageSpec,
    },
    Streaks {
        entity_type: EntityType,
        filters: Filters,
        streak_spec: StreakSpec,
        sort: Vec<SortSpec>,
        #[serde(default)]
        page: PageSpec,
    },
    Versus {
        entity_type: EntityType,
        metrics: Vec<MetricRef>,
        filters: Filters,
        versus_spec: VersusSpec,
        sort: Vec<SortSpec>,
        #[serde(default)]
        page: PageSpec,
    },
}

impl QueryRequest {
    pub fn metrics(&self) -> &[MetricRef] {
        match self {
            QueryRequest::Leaderboards { metrics, .. }
            | QueryRequest::Spans { metrics, .. }
            | QueryRequest::Splits { metrics, .. }
            | QueryRequest::Versus { metrics, .. } => metrics,
            QueryRequest::Streaks { .. } => &[],
        }
    }

    pub fn page(&self) -> &PageSpec {
        match self {
            QueryRequest::Leaderboards { page, .. }
            | QueryRequest::Spans { page, .. }
            | QueryRequest::Splits { page, .. }
            | QueryRequest::Streaks { page, .. }
            | QueryRequest::Versus { page, .. } => page,
        }
    }

    pub fn sort(&self) -> &[SortSpec] {
        match self {
            QueryRequest::Leaderboards { sort, .. }
            | QueryRequest::Spans { sort, .. }
            | QueryRequest::Splits { sort, .. }
            | QueryRequest::Streaks { sort, .. }
            | QueryRequest::Versus { sort, .. } => sort,
        }
    }

    pub fn filters(&self) -> &Filters {
        match self {
            QueryRequest::Leaderboards { filters, .. }
            | QueryRequest::Spans { filters, .. }
            | QueryRequest::Splits { filters, .. }
            | QueryRequest::Streaks { filters, .. }
            | QueryRequest::Versus { filters, .. } => filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboards_round_trips_through_json() {
        let req = QueryRequest::Leaderboards {
            entity_type: EntityType::Player,
            metrics: vec![MetricRef {
                id: "pts_per_game".into(),
                aggregation_override: None,
            }],
            filters: Filters {
                season: Some(SeasonFilter::Range { from: 2015, to: 2020 }),
                ..Default::default()
            },
            sort: vec![SortSpec {
                metric_id: "pts_per_game".into(),
                direction: SortDirection::Desc,
            }],
            page: PageSpec::default(),
        };

        let json = serde_json::to_string(&req).unwrap();
        let back: QueryRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metrics().len(), 1);
    }

    #[test]
    fn page_default_respects_hard_max() {
        assert!(PageSpec::default().limit <= MAX_PAGE_LIMIT);
    }
}
