//! Compiles a `QueryRequest` into a parameterized statement against
//! Postgres. Every identifier written into the SQL text (table names,
//! column names, join keys) comes from `schema_meta`, never from request
//! content; every value from the request is carried as a typed `Param` and
//! bound through `DynamicQuery`'s hand-written `QueryFragment` impl, the
//! same push_bind_param/push_sql interleaving pattern diesel generates for
//! its own query DSL, just assembled at runtime instead of compile time.
//!
//! Diesel's `sql_query().bind::<T, _>(..)` chain changes its own type on
//! every call, which makes a dynamic-length bind list impossible to build
//! with it directly (the chain's element count has to be known at compile
//! time). `DynamicQuery` sidesteps that by storing an ordered list of
//! literal/parameter fragments and feeding them to `AstPass` itself.
//!
//! Two table grains feed these statements. `leaderboards` and the
//! `season` split run against the season hub tables (`player_season` /
//! `team_season`). Every other subject — `spans`, `streaks`, `versus`,
//! and the remaining split dimensions — runs against the per-game
//! boxscore tables joined to `games`, since none of those operations are
//! expressible against pre-aggregated season rows.

use crate::errors::QueryError;
use crate::ir::{
    AdvancedCondition, CompareOp, EntityType, Filters, GameResult, GameType, Location,
    QueryRequest, SeasonFilter, SortDirection, SpanMode, SplitDimension, StreakSpec, VersusMode,
    MAX_PAGE_LIMIT,
};
use crate::registry::{MetricEntry, MetricsRegistry};
use crate::schema_meta;
use chrono::NaiveDate;
use diesel::pg::Pg;
use diesel::query_builder::{AstPass, Query, QueryFragment, QueryId};
use diesel::sql_types::Json;
use diesel::{QueryResult, QueryableByName, RunQueryDsl};
use itertools::Itertools;
use std::collections::HashSet;

pub const STATEMENT_TIMEOUT_SECONDS: u32 = 30;

#[derive(Debug, Clone)]
pub enum Param {
    Int8(i64),
    Float8(f64),
    Text(String),
    Date(NaiveDate),
    Bool(bool),
}

#[derive(Debug, Clone)]
enum SqlPart {
    Literal(String),
    Param(Param),
}

/// A fully-built statement: literal SQL fragments interleaved with bound
/// parameters, in emission order. Not `Clone`-cheap by design — each one is
/// built once per request and executed once.
#[derive(Debug, Clone)]
pub struct DynamicQuery {
    parts: Vec<SqlPart>,
}

impl QueryId for DynamicQuery {
    type QueryId = ();
    const HAS_STATIC_QUERY_ID: bool = false;
}

impl Query for DynamicQuery {
    type SqlType = Json;
}

impl QueryFragment<Pg> for DynamicQuery {
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Pg>) -> QueryResult<()> {
        out.unsafe_to_cache_prepared();
        for part in &self.parts {
            match part {
                SqlPart::Literal(s) => out.push_sql(s),
                SqlPart::Param(Param::Int8(v)) => out.push_bind_param::<diesel::sql_types::BigInt, _>(v)?,
                SqlPart::Param(Param::Float8(v)) => out.push_bind_param::<diesel::sql_types::Double, _>(v)?,
                SqlPart::Param(Param::Text(v)) => out.push_bind_param::<diesel::sql_types::Text, _>(v)?,
                SqlPart::Param(Param::Date(v)) => out.push_bind_param::<diesel::sql_types::Date, _>(v)?,
                SqlPart::Param(Param::Bool(v)) => out.push_bind_param::<diesel::sql_types::Bool, _>(v)?,
            }
        }
        Ok(())
    }
}

impl RunQueryDsl<diesel::PgConnection> for DynamicQuery {}

/// Accumulates SQL text and bind parameters in emission order.
#[derive(Default)]
struct Builder {
    parts: Vec<SqlPart>,
}

impl Builder {
    fn sql(&mut self, s: impl Into<String>) -> &mut Self {
        self.parts.push(SqlPart::Literal(s.into()));
        self
    }

    fn bind(&mut self, p: Param) -> &mut Self {
        self.parts.push(SqlPart::Param(p));
        self
    }

    fn finish(self) -> DynamicQuery {
        DynamicQuery { parts: self.parts }
    }
}

type Clause = Box<dyn FnOnce(&mut Builder) -> Result<(), QueryError>>;

fn root_table(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Player => "player_season",
        EntityType::Team => "team_season",
    }
}

/// The per-game grain root: `spans`, `streaks`, `versus`, and every split
/// dimension but `season` all restrict and group at the game level, which
/// only the boxscore tables carry.
fn game_root_table(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Player => "boxscore_player",
        EntityType::Team => "boxscore_team",
    }
}

fn identity_column(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Player => "player_id",
        EntityType::Team => "team_id",
    }
}

/// Win/loss is always evaluated against the team an entity played for in
/// that game, even for player rows — `team_id` is present on both boxscore
/// tables for exactly this reason.
const WIN_EXPR: &str =
    "(CASE WHEN games.home_team_id = root.team_id THEN games.home_score > games.away_score ELSE games.away_score > games.home_score END)";
const OPPONENT_EXPR: &str =
    "(CASE WHEN games.home_team_id = root.team_id THEN games.away_team_id ELSE games.home_team_id END)";

/// Collects the distinct base tables a request's metrics live in, validates
/// every one against the registry and schema metadata, and returns them
/// alongside the resolved `MetricEntry`s in request order.
fn resolve_metrics<'a>(
    registry: &'a MetricsRegistry,
    request: &QueryRequest,
) -> Result<Vec<&'a MetricEntry>, QueryError> {
    if request.metrics().is_empty() && !matches!(request, QueryRequest::Streaks { .. }) {
        return Err(QueryError::InvalidFilterShape("at least one metric is required".into()));
    }

    request
        .metrics()
        .iter()
        .map(|m| registry.get(&m.id).map_err(|_| QueryError::MetricUnknown(m.id.clone())))
        .collect()
}

fn resolve_one_metric<'a>(registry: &'a MetricsRegistry, metric_id: &str) -> Result<&'a MetricEntry, QueryError> {
    registry.get(metric_id).map_err(|_| QueryError::MetricUnknown(metric_id.to_string()))
}

/// Emits ` LEFT JOIN t1 ON ... LEFT JOIN t2 ON ...` for every distinct
/// satellite table a resolved metric set needs beyond `root`. Every table
/// name here is drawn from `schema_meta`, which only contains
/// compile-time-fixed strings, so this can never embed request content as
/// an identifier.
fn emit_satellite_joins(b: &mut Builder, root: &str, metrics: &[&MetricEntry]) {
    let mut joined = HashSet::new();
    joined.insert(root);

    for metric in metrics.iter().sorted_by_key(|m| m.base_table.clone()).dedup_by(|a, b| a.base_table == b.base_table) {
        let table = metric.base_table.as_str();
        if joined.contains(table) {
            continue;
        }
        if let Some((parent, key)) = schema_meta::join_key_of(table) {
            let parent_alias = if parent == root { "root" } else { parent };
            b.sql(format!(" LEFT JOIN {table} ON {table}.{key} = {parent_alias}.{key}"));
            joined.insert(table);
        }
    }
}

fn column_ref(root: &str, metric: &MetricEntry) -> String {
    let table = &metric.base_table;
    let alias = if table == root { "root" } else { table.as_str() };
    format!("{alias}.{}", metric.expression)
}

fn aggregated(root: &str, metric: &MetricEntry) -> String {
    let col = column_ref(root, metric);
    match metric.aggregation.as_sql() {
        Some(agg) => format!("{agg}({col})"),
        None => col,
    }
}

fn emit_select_list_season(b: &mut Builder, entity_type: EntityType, metrics: &[&MetricEntry], split: Option<SplitDimension>) {
    let root = root_table(entity_type);
    let id_col = identity_column(entity_type);
    b.sql(format!("root.{id_col} AS entity_id"));

    if let Some(SplitDimension::Season) = split {
        b.sql(", seasons.season_end_year AS split_key");
    }

    for metric in metrics {
        b.sql(format!(", {} AS \"{}\"", aggregated(root, metric), metric.id));
    }
}

fn apply_compare(b: &mut Builder, lhs: &str, op: CompareOp, thresholds: &[f64]) -> Result<(), QueryError> {
    match (op, thresholds) {
        (CompareOp::Gte, [t]) => { b.sql(format!("{lhs} >= ")).bind(Param::Float8(*t)); }
        (CompareOp::Lte, [t]) => { b.sql(format!("{lhs} <= ")).bind(Param::Float8(*t)); }
        (CompareOp::Eq, [t]) => { b.sql(format!("{lhs} = ")).bind(Param::Float8(*t)); }
        (CompareOp::Gt, [t]) => { b.sql(format!("{lhs} > ")).bind(Param::Float8(*t)); }
        (CompareOp::Lt, [t]) => { b.sql(format!("{lhs} < ")).bind(Param::Float8(*t)); }
        (CompareOp::Between, [lo, hi]) => {
            b.sql(format!("{lhs} BETWEEN ")).bind(Param::Float8(*lo));
            b.sql(" AND ").bind(Param::Float8(*hi));
        }
        _ => return Err(QueryError::InvalidFilterShape(format!("{op:?} needs a different threshold count"))),
    }
    Ok(())
}

fn emit_advanced_condition(b: &mut Builder, registry: &MetricsRegistry, root: &str, cond: &AdvancedCondition) -> Result<(), QueryError> {
    match cond {
        AdvancedCondition::And { conditions } => {
            b.sql("(");
            for (i, c) in conditions.iter().enumerate() {
                if i > 0 {
                    b.sql(" AND ");
                }
                emit_advanced_condition(b, registry, root, c)?;
            }
            b.sql(")");
        }
        AdvancedCondition::Or { conditions } => {
            b.sql("(");
            for (i, c) in conditions.iter().enumerate() {
                if i > 0 {
                    b.sql(" OR ");
                }
                emit_advanced_condition(b, registry, root, c)?;
            }
            b.sql(")");
        }
        AdvancedCondition::Predicate(p) => {
            let metric = resolve_one_metric(registry, &p.metric_id)?;
            let lhs = column_ref(root, metric);
            apply_compare(b, &lhs, p.op, &p.thresholds)?;
        }
    }
    Ok(())
}

/// Filters that only make sense against per-game data. Season-grain
/// requests (leaderboards, the `season` split) have no row-level game to
/// restrict, so they reject these up front rather than silently ignore
/// them.
fn reject_game_scope_filters(filters: &Filters) -> Result<(), QueryError> {
    let game_scoped = filters.date_range.is_some()
        || filters.opponent.is_some()
        || filters.location.is_some()
        || matches!(filters.game_type, Some(GameType::Regular | GameType::Playoffs))
        || matches!(filters.result, Some(GameResult::Win | GameResult::Loss));

    if game_scoped {
        return Err(QueryError::InvalidFilterShape(
            "date_range/opponent/location/game_type/result filters need per-game data; use spans, streaks, versus, or a non-season split".into(),
        ));
    }
    Ok(())
}

/// Season/entity-identity clauses shared by every grain: temporal range,
/// then team/player include/exclude. Deferred as closures that only close
/// over owned, `'static`-safe values (never over `registry`, which keeps
/// these boxes free of the request's own borrow).
fn push_identity_clauses(entity_type: EntityType, filters: &Filters) -> Vec<Clause> {
    let mut clauses: Vec<Clause> = Vec::new();

    if let Some(season) = &filters.season {
        match season {
            SeasonFilter::Range { from, to } => {
                let from = *from;
                let to = *to;
                clauses.push(Box::new(move |b| {
                    b.sql("seasons.season_end_year BETWEEN ").bind(Param::Int8(from as i64));
                    b.sql(" AND ").bind(Param::Int8(to as i64));
                    Ok(())
                }));
            }
            SeasonFilter::Discrete { years } => {
                let years = years.clone();
                clauses.push(Box::new(move |b| {
                    let ids: Vec<i64> = years.iter().map(|y| *y as i64).collect();
                    emit_in_list(b, "seasons.season_end_year", &ids)
                }));
            }
        }
    }

    let id_col = identity_column(entity_type);
    if !filters.player_include.is_empty() && entity_type == EntityType::Player {
        let ids = filters.player_include.clone();
        clauses.push(Box::new(move |b| emit_in_list(b, &format!("root.{id_col}"), &ids)));
    }
    if !filters.team_include.is_empty() && entity_type == EntityType::Team {
        let ids = filters.team_include.clone();
        clauses.push(Box::new(move |b| emit_in_list(b, &format!("root.{id_col}"), &ids)));
    }
    if !filters.player_exclude.is_empty() && entity_type == EntityType::Player {
        let ids = filters.player_exclude.clone();
        clauses.push(Box::new(move |b| emit_not_in_list(b, &format!("root.{id_col}"), &ids)));
    }
    if !filters.team_exclude.is_empty() && entity_type == EntityType::Team {
        let ids = filters.team_exclude.clone();
        clauses.push(Box::new(move |b| emit_not_in_list(b, &format!("root.{id_col}"), &ids)));
    }

    clauses
}

/// Appends `date_range`, `opponent`, `location`, `game_type`, and `result`
/// clauses — the five filters only meaningful at the game grain.
fn push_game_scope_clauses(clauses: &mut Vec<Clause>, filters: &Filters) -> Result<(), QueryError> {
    if let Some((from, to)) = filters.date_range {
        clauses.push(Box::new(move |b| {
            b.sql("games.game_date BETWEEN ").bind(Param::Date(from));
            b.sql(" AND ").bind(Param::Date(to));
            Ok(())
        }));
    }

    if let Some(opponent) = filters.opponent {
        clauses.push(Box::new(move |b| {
            b.sql(format!("{OPPONENT_EXPR} = ")).bind(Param::Int8(opponent));
            Ok(())
        }));
    }

    if let Some(location) = filters.location {
        match location {
            Location::Home => clauses.push(Box::new(|b| {
                b.sql("games.home_team_id = root.team_id");
                Ok(())
            })),
            Location::Away => clauses.push(Box::new(|b| {
                b.sql("games.home_team_id <> root.team_id");
                Ok(())
            })),
            Location::Neutral => {
                return Err(QueryError::InvalidFilterShape(
                    "location=neutral has no representation in the boxscore schema".into(),
                ));
            }
        }
    }

    if let Some(game_type) = filters.game_type {
        let literal = match game_type {
            GameType::Regular => Some("regular"),
            GameType::Playoffs => Some("playoffs"),
            GameType::Both => None,
        };
        if let Some(literal) = literal {
            clauses.push(Box::new(move |b| {
                b.sql("games.game_type = ").bind(Param::Text(literal.to_string()));
                Ok(())
            }));
        }
    }

    if let Some(result) = filters.result {
        match result {
            GameResult::Win => clauses.push(Box::new(|b| {
                b.sql(WIN_EXPR);
                Ok(())
            })),
            GameResult::Loss => clauses.push(Box::new(|b| {
                b.sql(format!("NOT {WIN_EXPR}"));
                Ok(())
            })),
            GameResult::Any => {}
        }
    }

    Ok(())
}

fn emit_in_list(b: &mut Builder, column: &str, ids: &[i64]) -> Result<(), QueryError> {
    b.sql(format!("{column} IN ("));
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            b.sql(",");
        }
        b.bind(Param::Int8(*id));
    }
    b.sql(")");
    Ok(())
}

fn emit_not_in_list(b: &mut Builder, column: &str, ids: &[i64]) -> Result<(), QueryError> {
    b.sql(format!("{column} NOT IN ("));
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            b.sql(",");
        }
        b.bind(Param::Int8(*id));
    }
    b.sql(")");
    Ok(())
}

/// Writes ` WHERE <clauses>` (or nothing, returning `false`, if there are
/// none) joining every clause with `AND`, the advanced condition last.
fn assemble_where(
    b: &mut Builder,
    registry: &MetricsRegistry,
    root: &str,
    clauses: Vec<Clause>,
    advanced_condition: &Option<AdvancedCondition>,
) -> Result<bool, QueryError> {
    if clauses.is_empty() && advanced_condition.is_none() {
        return Ok(false);
    }

    b.sql(" WHERE ");
    let mut first = true;
    for clause in clauses {
        if !first {
            b.sql(" AND ");
        }
        clause(b)?;
        first = false;
    }
    if let Some(cond) = advanced_condition {
        if !first {
            b.sql(" AND ");
        }
        emit_advanced_condition(b, registry, root, cond)?;
    }
    Ok(true)
}

/// Appends ` AND <clauses>` to a WHERE that has already been opened with at
/// least one predicate.
fn append_clauses(
    b: &mut Builder,
    registry: &MetricsRegistry,
    root: &str,
    clauses: Vec<Clause>,
    advanced_condition: &Option<AdvancedCondition>,
) -> Result<(), QueryError> {
    for clause in clauses {
        b.sql(" AND ");
        clause(b)?;
    }
    if let Some(cond) = advanced_condition {
        b.sql(" AND ");
        emit_advanced_condition(b, registry, root, cond)?;
    }
    Ok(())
}

fn emit_where_clause_season(b: &mut Builder, registry: &MetricsRegistry, entity_type: EntityType, filters: &Filters) -> Result<bool, QueryError> {
    reject_game_scope_filters(filters)?;
    let clauses = push_identity_clauses(entity_type, filters);
    assemble_where(b, registry, root_table(entity_type), clauses, &filters.advanced_condition)
}

fn emit_where_clause_game(b: &mut Builder, registry: &MetricsRegistry, entity_type: EntityType, filters: &Filters) -> Result<bool, QueryError> {
    let mut clauses = push_identity_clauses(entity_type, filters);
    push_game_scope_clauses(&mut clauses, filters)?;
    assemble_where(b, registry, game_root_table(entity_type), clauses, &filters.advanced_condition)
}

/// Only the `Season` split dimension has a column available at the
/// season-grain hub tables this path targets; the rest run at the game
/// grain (see `compile_game_split`).
fn emit_group_by_season(b: &mut Builder, entity_type: EntityType, split: Option<SplitDimension>) {
    let id_col = identity_column(entity_type);
    b.sql(format!(" GROUP BY root.{id_col}"));
    if let Some(SplitDimension::Season) = split {
        b.sql(", seasons.season_end_year");
    }
}

fn validate_and_bind_page(b: &mut Builder, request: &QueryRequest) -> Result<(), QueryError> {
    let page = request.page();
    if page.limit == 0 || page.limit > MAX_PAGE_LIMIT {
        return Err(QueryError::InvalidFilterShape(format!("page.limit must be in 1..={MAX_PAGE_LIMIT}")));
    }
    b.sql(" LIMIT ").bind(Param::Int8(page.limit as i64));
    b.sql(" OFFSET ").bind(Param::Int8(page.offset as i64));
    Ok(())
}

/// Every select list in this compiler aliases the grouping key `entity_id`
/// regardless of grain, so ordering and pagination never need to know
/// which table it actually came from.
fn emit_order_and_page(b: &mut Builder, request: &QueryRequest) -> Result<(), QueryError> {
    let sort = request.sort();
    if sort.is_empty() {
        b.sql(" ORDER BY entity_id ASC");
    } else {
        b.sql(" ORDER BY ");
        for (i, s) in sort.iter().enumerate() {
            if i > 0 {
                b.sql(", ");
            }
            let dir = match s.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            b.sql(format!("\"{}\" {dir}", s.metric_id));
        }
        b.sql(", entity_id ASC");
    }

    validate_and_bind_page(b, request)
}

fn is_season_grain_split(split: SplitDimension) -> bool {
    matches!(split, SplitDimension::Season)
}

/// Compiles `request` into a runnable statement. The statement always
/// shapes its result as `row_to_json(...)`, since the column set varies
/// per request and diesel's `QueryableByName` needs a type known at compile
/// time — wrapping in `row_to_json` gives a single, uniformly-typed `Json`
/// column regardless of how many metrics were requested.
pub fn compile(registry: &MetricsRegistry, request: &QueryRequest) -> Result<DynamicQuery, QueryError> {
    match request {
        QueryRequest::Leaderboards { entity_type, filters, .. } => {
            let metrics = resolve_metrics(registry, request)?;
            compile_season_grain(registry, *entity_type, &metrics, filters, None, request)
        }
        QueryRequest::Splits { entity_type, filters, split_dimension, .. } if is_season_grain_split(*split_dimension) => {
            let metrics = resolve_metrics(registry, request)?;
            compile_season_grain(registry, *entity_type, &metrics, filters, Some(*split_dimension), request)
        }
        QueryRequest::Splits { entity_type, filters, split_dimension, .. } => {
            let metrics = resolve_metrics(registry, request)?;
            compile_game_split(registry, *entity_type, &metrics, filters, *split_dimension, request)
        }
        QueryRequest::Spans { entity_type, filters, span_mode, .. } => {
            let metrics = resolve_metrics(registry, request)?;
            compile_spans(registry, *entity_type, &metrics, filters, span_mode, request)
        }
        QueryRequest::Streaks { entity_type, filters, streak_spec, .. } => {
            compile_streaks(registry, *entity_type, filters, streak_spec, request)
        }
        QueryRequest::Versus { entity_type, filters, versus_spec, .. } => {
            let metrics = resolve_metrics(registry, request)?;
            compile_versus(registry, *entity_type, &metrics, filters, versus_spec, request)
        }
    }
}

fn compile_season_grain(
    registry: &MetricsRegistry,
    entity_type: EntityType,
    metrics: &[&MetricEntry],
    filters: &Filters,
    split: Option<SplitDimension>,
    request: &QueryRequest,
) -> Result<DynamicQuery, QueryError> {
    let root = root_table(entity_type);
    let dim_table = match entity_type {
        EntityType::Player => "players",
        EntityType::Team => "teams",
    };
    let id_col = identity_column(entity_type);

    let mut b = Builder::default();
    b.sql("SELECT row_to_json(result_row) AS js FROM (SELECT ");
    emit_select_list_season(&mut b, entity_type, metrics, split);
    b.sql(format!(" FROM {root} root"));
    emit_satellite_joins(&mut b, root, metrics);
    b.sql(format!(" LEFT JOIN {dim_table} ON {dim_table}.{id_col} = root.{id_col}"));
    b.sql(" LEFT JOIN seasons ON seasons.season_id = root.season_id");
    emit_where_clause_season(&mut b, registry, entity_type, filters)?;
    emit_group_by_season(&mut b, entity_type, split);
    emit_order_and_page(&mut b, request)?;
    b.sql(") result_row");

    Ok(b.finish())
}

/// Joins the game-grain root to `games` (and, since season filtering still
/// needs it, `seasons`) via the join key `schema_meta` declares for it.
fn emit_game_from_clause(b: &mut Builder, root: &str, metrics: &[&MetricEntry]) {
    let (_, key) = schema_meta::join_key_of(root).expect("game-grain root must join to games");
    b.sql(format!("FROM {root} root"));
    b.sql(format!(" JOIN games ON games.{key} = root.{key}"));
    b.sql(" LEFT JOIN seasons ON seasons.season_id = games.season_id");
    emit_satellite_joins(b, root, metrics);
}

/// Spans: a rolling window over an entity's game log. `games` mode windows
/// by row count (`ROWS BETWEEN n-1 PRECEDING AND CURRENT ROW`); `dates`
/// mode windows by calendar range (`RANGE BETWEEN interval PRECEDING AND
/// CURRENT ROW`). `step` thins the output to every `step`-th qualifying
/// row once a full window exists, so a 10-game window with step 5 reports
/// a rolling average every 5 games rather than after every single game.
fn compile_spans(
    registry: &MetricsRegistry,
    entity_type: EntityType,
    metrics: &[&MetricEntry],
    filters: &Filters,
    span: &crate::ir::SpanSpec,
    request: &QueryRequest,
) -> Result<DynamicQuery, QueryError> {
    validate_span_mode(span)?;
    let root = game_root_table(entity_type);
    let id_col = identity_column(entity_type);
    let order_col = match span.mode {
        SpanMode::Games => "games.game_id",
        SpanMode::Dates => "games.game_date",
    };

    let mut b = Builder::default();
    b.sql("WITH scoped AS (SELECT ");
    b.sql(format!("root.{id_col} AS entity_id, games.game_id AS game_id, games.game_date AS game_date"));
    for metric in metrics {
        b.sql(format!(", {} AS \"{}__raw\"", column_ref(root, metric), metric.id));
    }
    b.sql(" ");
    emit_game_from_clause(&mut b, root, metrics);
    emit_where_clause_game(&mut b, registry, entity_type, filters)?;
    b.sql(")");

    b.sql(", windowed AS (SELECT entity_id, game_id, game_date");
    b.sql(format!(", ROW_NUMBER() OVER (PARTITION BY entity_id ORDER BY {order_col}) AS span_seq"));
    for metric in metrics {
        let frame = match span.mode {
            SpanMode::Games => format!("ROWS BETWEEN {} PRECEDING AND CURRENT ROW", span.window_size.saturating_sub(1)),
            SpanMode::Dates => format!("RANGE BETWEEN interval '{} days' PRECEDING AND CURRENT ROW", span.window_size),
        };
        let agg = metric.aggregation.as_sql().unwrap_or("SUM");
        b.sql(format!(
            ", {agg}(\"{0}__raw\") OVER (PARTITION BY entity_id ORDER BY {order_col} {frame}) AS \"{0}\"",
            metric.id
        ));
    }
    b.sql(" FROM scoped)");

    b.sql(" SELECT row_to_json(result_row) AS js FROM (SELECT entity_id, game_id, game_date");
    for metric in metrics {
        b.sql(format!(", \"{0}\"", metric.id));
    }
    b.sql(" FROM windowed WHERE span_seq >= ").bind(Param::Int8(span.window_size as i64));
    b.sql(" AND MOD(span_seq - ").bind(Param::Int8(span.window_size as i64));
    b.sql(", ").bind(Param::Int8(span.step.max(1) as i64));
    b.sql(") = 0");
    emit_order_and_page(&mut b, request)?;
    b.sql(") result_row");

    Ok(b.finish())
}

/// Splits other than `season`: a CTE computes the split key per game row
/// (month, opponent, location, win/loss, or rest days since the entity's
/// previous game via `LAG`), then the outer query aggregates metrics
/// grouped by `(entity_id, split_key)`.
fn compile_game_split(
    registry: &MetricsRegistry,
    entity_type: EntityType,
    metrics: &[&MetricEntry],
    filters: &Filters,
    dim: SplitDimension,
    request: &QueryRequest,
) -> Result<DynamicQuery, QueryError> {
    let root = game_root_table(entity_type);
    let id_col = identity_column(entity_type);
    let split_key_expr = match dim {
        SplitDimension::Month => "EXTRACT(MONTH FROM games.game_date)::int".to_string(),
        SplitDimension::Opponent => OPPONENT_EXPR.to_string(),
        SplitDimension::Location => "(CASE WHEN games.home_team_id = root.team_id THEN 'home' ELSE 'away' END)".to_string(),
        SplitDimension::Result => format!("(CASE WHEN {WIN_EXPR} THEN 'win' ELSE 'loss' END)"),
        SplitDimension::RestDays => format!(
            "(games.game_date - LAG(games.game_date) OVER (PARTITION BY root.{id_col} ORDER BY games.game_date))"
        ),
        SplitDimension::Season => unreachable!("season split runs at the season grain"),
    };

    let mut b = Builder::default();
    b.sql("WITH scoped AS (SELECT ");
    b.sql(format!("root.{id_col} AS entity_id, ({split_key_expr}) AS split_key"));
    for metric in metrics {
        b.sql(format!(", {} AS \"{}__raw\"", column_ref(root, metric), metric.id));
    }
    b.sql(" ");
    emit_game_from_clause(&mut b, root, metrics);
    emit_where_clause_game(&mut b, registry, entity_type, filters)?;
    b.sql(")");

    b.sql(" SELECT row_to_json(result_row) AS js FROM (SELECT entity_id, split_key");
    for metric in metrics {
        let expr = match metric.aggregation.as_sql() {
            Some(agg) => format!("{agg}(\"{0}__raw\")", metric.id),
            None => format!("\"{0}__raw\"", metric.id),
        };
        b.sql(format!(", {expr} AS \"{}\"", metric.id));
    }
    b.sql(" FROM scoped GROUP BY entity_id, split_key");
    emit_order_and_page(&mut b, request)?;
    b.sql(") result_row");

    Ok(b.finish())
}

/// Streaks: gaps-and-islands over the per-game predicate. `LAG(hit)`
/// detects the first game of each run; a running `SUM` of those markers
/// gives every row in a run the same group id; islands where the predicate
/// held are aggregated into `(start_game_id, end_game_id, length)` and
/// filtered by `min_length`. `direction` orders the returned islands by
/// length — `desc` surfaces the longest streaks first.
fn compile_streaks(
    registry: &MetricsRegistry,
    entity_type: EntityType,
    filters: &Filters,
    spec: &StreakSpec,
    request: &QueryRequest,
) -> Result<DynamicQuery, QueryError> {
    let root = game_root_table(entity_type);
    let id_col = identity_column(entity_type);
    let metric = resolve_one_metric(registry, &spec.metric_id)?;

    let mut b = Builder::default();
    b.sql("WITH scoped AS (SELECT ");
    b.sql(format!("root.{id_col} AS entity_id, games.game_id AS game_id, games.game_date AS game_date, ("));
    apply_compare(&mut b, &column_ref(root, metric), spec.predicate, &spec.thresholds)?;
    b.sql(") AS hit ");
    emit_game_from_clause(&mut b, root, std::slice::from_ref(&metric));
    emit_where_clause_game(&mut b, registry, entity_type, filters)?;
    b.sql(")");

    b.sql(
        ", flagged AS (SELECT entity_id, game_id, game_date, hit, \
         CASE WHEN hit AND LAG(hit) OVER (PARTITION BY entity_id ORDER BY game_date, game_id) IS DISTINCT FROM true \
         THEN 1 ELSE 0 END AS island_start FROM scoped)",
    );
    b.sql(
        ", grouped AS (SELECT entity_id, game_id, game_date, hit, \
         SUM(island_start) OVER (PARTITION BY entity_id ORDER BY game_date, game_id) AS grp FROM flagged)",
    );
    b.sql(" , islands AS (SELECT entity_id, grp, MIN(game_id) AS start_game_id, MAX(game_id) AS end_game_id, COUNT(*) AS length");
    b.sql(" FROM grouped WHERE hit GROUP BY entity_id, grp HAVING COUNT(*) >= ").bind(Param::Int8(spec.min_length as i64));
    b.sql(")");

    let order_dir = match spec.direction {
        SortDirection::Desc => "DESC",
        SortDirection::Asc => "ASC",
    };
    b.sql(" SELECT row_to_json(result_row) AS js FROM (SELECT entity_id, start_game_id, end_game_id, length FROM islands");
    b.sql(format!(" ORDER BY length {order_dir}, entity_id ASC"));
    validate_and_bind_page(&mut b, request)?;
    b.sql(") result_row");

    Ok(b.finish())
}

/// Head-to-head restricts to games where both subjects appear (an `EXISTS`
/// self-join on `game_id`, symmetric in which subject is `root`); parallel
/// runs both subjects' independent aggregates grouped by
/// `(entity_id, season, game_type)` so the two series line up for
/// comparison without requiring they ever shared a game.
fn compile_versus(
    registry: &MetricsRegistry,
    entity_type: EntityType,
    metrics: &[&MetricEntry],
    filters: &Filters,
    versus: &crate::ir::VersusSpec,
    request: &QueryRequest,
) -> Result<DynamicQuery, QueryError> {
    validate_versus(versus)?;
    let root = game_root_table(entity_type);
    let id_col = identity_column(entity_type);

    let mut b = Builder::default();
    b.sql("SELECT row_to_json(result_row) AS js FROM (SELECT ");
    b.sql(format!("root.{id_col} AS entity_id"));
    if versus.mode == VersusMode::Parallel {
        b.sql(", seasons.season_end_year AS split_key, games.game_type AS game_type_key");
    }
    for metric in metrics {
        b.sql(format!(", {} AS \"{}\"", aggregated(root, metric), metric.id));
    }
    b.sql(" ");
    emit_game_from_clause(&mut b, root, metrics);

    b.sql(" WHERE ");
    emit_in_list(&mut b, &format!("root.{id_col}"), &[versus.subject_a, versus.subject_b])?;

    if versus.mode == VersusMode::HeadToHead {
        b.sql(format!(" AND EXISTS (SELECT 1 FROM {root} other WHERE other.game_id = root.game_id AND other.{id_col} = "));
        b.sql("CASE WHEN root.");
        b.sql(id_col);
        b.sql(" = ");
        b.bind(Param::Int8(versus.subject_a));
        b.sql(" THEN ");
        b.bind(Param::Int8(versus.subject_b));
        b.sql(" ELSE ");
        b.bind(Param::Int8(versus.subject_a));
        b.sql(" END)");
    }

    let mut extra = push_identity_clauses(entity_type, filters);
    push_game_scope_clauses(&mut extra, filters)?;
    append_clauses(&mut b, registry, root, extra, &filters.advanced_condition)?;

    b.sql(format!(" GROUP BY root.{id_col}"));
    if versus.mode == VersusMode::Parallel {
        b.sql(", seasons.season_end_year, games.game_type");
    }
    emit_order_and_page(&mut b, request)?;
    b.sql(") result_row");

    Ok(b.finish())
}

fn validate_span_mode(span: &crate::ir::SpanSpec) -> Result<(), QueryError> {
    if span.window_size == 0 {
        return Err(QueryError::InvalidFilterShape("span window_size must be positive".into()));
    }
    match span.mode {
        SpanMode::Games | SpanMode::Dates => Ok(()),
    }
}

fn validate_versus(spec: &crate::ir::VersusSpec) -> Result<(), QueryError> {
    if spec.subject_a == spec.subject_b {
        return Err(QueryError::UnsatisfiableQuery("versus subjects must differ".into()));
    }
    match spec.mode {
        VersusMode::HeadToHead | VersusMode::Parallel => Ok(()),
    }
}

/// Executes a compiled query, applying the statement timeout and
/// max-rows guard from spec.md §4.7.
pub fn execute(
    conn: &mut diesel::PgConnection,
    query: DynamicQuery,
) -> Result<Vec<serde_json::Value>, QueryError> {
    use diesel::connection::SimpleConnection;

    conn.batch_execute(&format!("SET statement_timeout = {}", STATEMENT_TIMEOUT_SECONDS * 1000))
        .map_err(QueryError::ExecutionError)?;

    let rows: Vec<serde_json::Value> = query.get_results(conn).map_err(|e| match e {
        diesel::result::Error::DatabaseError(diesel::result::DatabaseErrorKind::Unknown, ref info)
            if info.message().contains("statement timeout") =>
        {
            QueryError::QueryTimeout
        }
        other => QueryError::ExecutionError(other),
    })?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EntityType, Filters, MetricRef, PageSpec, QueryRequest, SeasonFilter, SortSpec};
    use crate::registry::{Aggregation, EntityType as RegistryEntityType, MetricCategory, MetricEntry, MetricLevel, MetricsRegistry};

    fn registry_with(entries: Vec<MetricEntry>) -> MetricsRegistry {
        MetricsRegistry::from_entries(entries)
    }

    fn pts_per_game() -> MetricEntry {
        MetricEntry {
            id: "pts_per_game".into(),
            description: String::new(),
            category: MetricCategory::Rate,
            entity_type: RegistryEntityType::Player,
            level: MetricLevel::Season,
            base_table: "player_season_per_game".into(),
            expression: "pts".into(),
            aggregation: Aggregation::Avg,
            unit: None,
            soft_bounds: None,
            hard_bounds: None,
            dependencies: vec![],
        }
    }

    fn pts_per_game_boxscore() -> MetricEntry {
        MetricEntry {
            id: "pts_per_game".into(),
            description: String::new(),
            category: MetricCategory::Counting,
            entity_type: RegistryEntityType::Player,
            level: MetricLevel::Game,
            base_table: "boxscore_player".into(),
            expression: "pts".into(),
            aggregation: Aggregation::Avg,
            unit: None,
            soft_bounds: None,
            hard_bounds: None,
            dependencies: vec![],
        }
    }

    fn rendered_sql(query: &DynamicQuery) -> String {
        query
            .parts
            .iter()
            .map(|p| match p {
                SqlPart::Literal(s) => s.clone(),
                SqlPart::Param(_) => "$".to_string(),
            })
            .collect()
    }

    fn bind_count(query: &DynamicQuery) -> usize {
        query.parts.iter().filter(|p| matches!(p, SqlPart::Param(_))).count()
    }

    #[test]
    fn leaderboards_compiles_into_a_single_statement_group() {
        let registry = registry_with(vec![pts_per_game()]);
        let request = QueryRequest::Leaderboards {
            entity_type: EntityType::Player,
            metrics: vec![MetricRef { id: "pts_per_game".into(), aggregation_override: None }],
            filters: Filters {
                season: Some(SeasonFilter::Range { from: 2015, to: 2020 }),
                ..Default::default()
            },
            sort: vec![SortSpec { metric_id: "pts_per_game".into(), direction: SortDirection::Desc }],
            page: PageSpec::default(),
        };

        let query = compile(&registry, &request).unwrap();
        let sql = rendered_sql(&query);

        assert!(sql.starts_with("SELECT row_to_json(result_row)"));
        assert!(sql.contains("FROM player_season root"));
        assert!(sql.contains("LEFT JOIN player_season_per_game"));
        assert!(sql.contains("WHERE seasons.season_end_year BETWEEN"));
        assert!(sql.contains("GROUP BY root.player_id"));
        assert!(sql.contains("ORDER BY \"pts_per_game\" DESC"));
        // two season bounds + limit + offset
        assert_eq!(bind_count(&query), 4);
    }

    #[test]
    fn leaderboards_rejects_game_scope_filters() {
        let registry = registry_with(vec![pts_per_game()]);
        let request = QueryRequest::Leaderboards {
            entity_type: EntityType::Player,
            metrics: vec![MetricRef { id: "pts_per_game".into(), aggregation_override: None }],
            filters: Filters { opponent: Some(7), ..Default::default() },
            sort: vec![],
            page: PageSpec::default(),
        };

        assert!(matches!(compile(&registry, &request), Err(QueryError::InvalidFilterShape(_))));
    }

    #[test]
    fn opponent_split_compiles_at_the_game_grain() {
        let registry = registry_with(vec![pts_per_game_boxscore()]);
        let request = QueryRequest::Splits {
            entity_type: EntityType::Player,
            metrics: vec![MetricRef { id: "pts_per_game".into(), aggregation_override: None }],
            filters: Filters::default(),
            split_dimension: SplitDimension::Opponent,
            sort: vec![],
            page: PageSpec::default(),
        };

        let query = compile(&registry, &request).unwrap();
        let sql = rendered_sql(&query);
        assert!(sql.starts_with("WITH scoped AS"));
        assert!(sql.contains("FROM boxscore_player root"));
        assert!(sql.contains("JOIN games ON games.game_id = root.game_id"));
        assert!(sql.contains("GROUP BY entity_id, split_key"));
    }

    #[test]
    fn spans_emits_a_window_function_over_the_requested_game_count() {
        let registry = registry_with(vec![pts_per_game_boxscore()]);
        let request = QueryRequest::Spans {
            entity_type: EntityType::Player,
            metrics: vec![MetricRef { id: "pts_per_game".into(), aggregation_override: None }],
            filters: Filters::default(),
            span_mode: crate::ir::SpanSpec { mode: SpanMode::Games, window_size: 10, step: 5 },
            sort: vec![],
            page: PageSpec::default(),
        };

        let query = compile(&registry, &request).unwrap();
        let sql = rendered_sql(&query);
        assert!(sql.contains("ROWS BETWEEN 9 PRECEDING AND CURRENT ROW"));
        assert!(sql.contains("OVER (PARTITION BY entity_id ORDER BY games.game_id"));
    }

    #[test]
    fn spans_rejects_a_zero_window() {
        let registry = registry_with(vec![pts_per_game_boxscore()]);
        let request = QueryRequest::Spans {
            entity_type: EntityType::Player,
            metrics: vec![MetricRef { id: "pts_per_game".into(), aggregation_override: None }],
            filters: Filters::default(),
            span_mode: crate::ir::SpanSpec { mode: SpanMode::Games, window_size: 0, step: 1 },
            sort: vec![],
            page: PageSpec::default(),
        };

        assert!(matches!(compile(&registry, &request), Err(QueryError::InvalidFilterShape(_))));
    }

    #[test]
    fn streaks_builds_the_gaps_and_islands_chain() {
        let registry = registry_with(vec![pts_per_game_boxscore()]);
        let request = QueryRequest::Streaks {
            entity_type: EntityType::Player,
            filters: Filters::default(),
            streak_spec: StreakSpec {
                metric_id: "pts_per_game".into(),
                predicate: CompareOp::Gte,
                thresholds: vec![30.0],
                min_length: 3,
                direction: SortDirection::Desc,
            },
            sort: vec![],
            page: PageSpec::default(),
        };

        let query = compile(&registry, &request).unwrap();
        let sql = rendered_sql(&query);
        assert!(sql.contains("LAG(hit) OVER"));
        assert!(sql.contains("HAVING COUNT(*) >="));
        assert!(sql.contains("ORDER BY length DESC"));
    }

    #[test]
    fn rejects_page_limit_over_the_hard_max() {
        let registry = registry_with(vec![pts_per_game()]);
        let request = QueryRequest::Leaderboards {
            entity_type: EntityType::Player,
            metrics: vec![MetricRef { id: "pts_per_game".into(), aggregation_override: None }],
            filters: Filters::default(),
            sort: vec![],
            page: PageSpec { limit: MAX_PAGE_LIMIT + 1, offset: 0 },
        };

        assert!(matches!(compile(&registry, &request), Err(QueryError::InvalidFilterShape(_))));
    }

    #[test]
    fn versus_requires_distinct_subjects() {
        let registry = registry_with(vec![pts_per_game_boxscore()]);
        let request = QueryRequest::Versus {
            entity_type: EntityType::Player,
            metrics: vec![MetricRef { id: "pts_per_game".into(), aggregation_override: None }],
            filters: Filters::default(),
            versus_spec: crate::ir::VersusSpec { subject_a: 1, subject_b: 1, mode: VersusMode::HeadToHead },
            sort: vec![],
            page: PageSpec::default(),
        };

        assert!(matches!(compile(&registry, &request), Err(QueryError::UnsatisfiableQuery(_))));
    }

    #[test]
    fn versus_head_to_head_restricts_to_shared_games() {
        let registry = registry_with(vec![pts_per_game_boxscore()]);
        let request = QueryRequest::Versus {
            entity_type: EntityType::Player,
            metrics: vec![MetricRef { id: "pts_per_game".into(), aggregation_override: None }],
            filters: Filters::default(),
            versus_spec: crate::ir::VersusSpec { subject_a: 1, subject_b: 2, mode: VersusMode::HeadToHead },
            sort: vec![],
            page: PageSpec::default(),
        };

        let query = compile(&registry, &request).unwrap();
        let sql = rendered_sql(&query);
        assert!(sql.contains("EXISTS (SELECT 1 FROM boxscore_player other"));
    }

    #[test]
    fn versus_parallel_groups_by_season_and_game_type() {
        let registry = registry_with(vec![pts_per_game_boxscore()]);
        let request = QueryRequest::Versus {
            entity_type: EntityType::Player,
            metrics: vec![MetricRef { id: "pts_per_game".into(), aggregation_override: None }],
            filters: Filters::default(),
            versus_spec: crate::ir::VersusSpec { subject_a: 1, subject_b: 2, mode: VersusMode::Parallel },
            sort: vec![],
            page: PageSpec::default(),
        };

        let query = compile(&registry, &request).unwrap();
        let sql = rendered_sql(&query);
        assert!(sql.contains("GROUP BY root.player_id, seasons.season_end_year, games.game_type"));
    }
}
