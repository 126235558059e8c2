//! Declarative metrics catalog: a YAML file parsed once at process start
//! into a `HashMap<id, MetricEntry>`, validated against the schema metadata
//! and checked for dependency cycles before the process ever serves a
//! query. Mirrors the immutable, build-once-read-many `Resolver` shape in
//! `hoopsdb_db::resolver`.

use crate::errors::RegistryError;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Counting,
    Derived,
    Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Player,
    Team,
    Game,
    Pbp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricLevel {
    Season,
    Career,
    Game,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    None,
}

impl Aggregation {
    pub fn as_sql(self) -> Option<&'static str> {
        match self {
            Aggregation::Sum => Some("SUM"),
            Aggregation::Avg => Some("AVG"),
            Aggregation::Min => Some("MIN"),
            Aggregation::Max => Some("MAX"),
            Aggregation::Count => Some("COUNT"),
            Aggregation::None => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricEntry {
    pub id: String,
    pub description: String,
    pub category: MetricCategory,
    pub entity_type: EntityType,
    pub level: MetricLevel,
    pub base_table: String,
    pub expression: String,
    pub aggregation: Aggregation,
    pub unit: Option<String>,
    pub soft_bounds: Option<(f64, f64)>,
    pub hard_bounds: Option<(f64, f64)>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    metrics: Vec<MetricEntry>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MetricFilter {
    pub entity_type: Option<EntityType>,
    pub category: Option<MetricCategory>,
}

pub struct MetricsRegistry {
    entries: HashMap<String, MetricEntry>,
}

impl MetricsRegistry {
    /// Builds a registry directly from entries, skipping the YAML load and
    /// schema validation `load` does. Used by other modules' tests to
    /// exercise the compiler against a fixed metric set.
    #[cfg(test)]
    pub(crate) fn from_entries(entries: Vec<MetricEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let raw = std::fs::read_to_string(path)?;
        let catalog: CatalogFile = serde_yaml::from_str(&raw)?;

        let mut entries = HashMap::with_capacity(catalog.metrics.len());
        for metric in catalog.metrics {
            validate_against_schema(&metric)?;
            entries.insert(metric.id.clone(), metric);
        }

        let registry = Self { entries };
        registry.check_acyclic()?;
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Result<&MetricEntry, RegistryError> {
        self.entries.get(id).ok_or_else(|| RegistryError::Unknown(id.to_string()))
    }

    pub fn list(&self, filter: MetricFilter) -> Vec<&MetricEntry> {
        self.entries
            .values()
            .filter(|m| filter.entity_type.is_none_or(|t| m.entity_type == t))
            .filter(|m| filter.category.is_none_or(|c| m.category == c))
            .collect()
    }

    /// Returns `id`'s dependencies in topological order (dependencies of
    /// dependencies first), so a caller can build required joins bottom-up.
    pub fn resolve_dependencies(&self, id: &str) -> Result<Vec<String>, RegistryError> {
        let mut visited = HashSet::new();
        let mut ordered = Vec::new();
        self.visit(id, &mut visited, &mut HashSet::new(), &mut ordered)?;
        ordered.pop();
        Ok(ordered)
    }

    fn check_acyclic(&self) -> Result<(), RegistryError> {
        for id in self.entries.keys() {
            self.visit(id, &mut HashSet::new(), &mut HashSet::new(), &mut Vec::new())?;
        }
        Ok(())
    }

    fn visit(
        &self,
        id: &str,
        visited: &mut HashSet<String>,
        in_progress: &mut HashSet<String>,
        ordered: &mut Vec<String>,
    ) -> Result<(), RegistryError> {
        if visited.contains(id) {
            return Ok(());
        }
        if !in_progress.insert(id.to_string()) {
            return Err(RegistryError::DependencyCycle(id.to_string()));
        }

        let metric = self.get(id)?;
        for dep in &metric.dependencies {
            if !self.entries.contains_key(dep) {
                return Err(RegistryError::UnknownDependency(id.to_string(), dep.clone()));
            }
            self.visit(dep, visited, in_progress, ordered)?;
        }

        in_progress.remove(id);
        visited.insert(id.to_string());
        ordered.push(id.to_string());
        Ok(())
    }
}

fn validate_against_schema(metric: &MetricEntry) -> Result<(), RegistryError> {
    let column = metric.expression.trim();
    if crate::schema_meta::columns_of(&metric.base_table).is_none() {
        return Err(RegistryError::UnknownColumn {
            metric: metric.id.clone(),
            table: metric.base_table.clone(),
            column: column.to_string(),
        });
    }
    if column.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !crate::schema_meta::column_exists(&metric.base_table, column)
    {
        return Err(RegistryError::UnknownColumn {
            metric: metric.id.clone(),
            table: metric.base_table.clone(),
            column: column.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(id: &str, deps: &[&str]) -> MetricEntry {
        MetricEntry {
            id: id.to_string(),
            description: String::new(),
            category: MetricCategory::Derived,
            entity_type: EntityType::Player,
            level: MetricLevel::Season,
            base_table: "player_season_totals".to_string(),
            expression: "pts".to_string(),
            aggregation: Aggregation::Sum,
            unit: None,
            soft_bounds: None,
            hard_bounds: None,
            dependencies: deps.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn resolve_dependencies_orders_transitively() {
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), metric("a", &["b"]));
        entries.insert("b".to_string(), metric("b", &["c"]));
        entries.insert("c".to_string(), metric("c", &[]));
        let registry = MetricsRegistry { entries };

        let deps = registry.resolve_dependencies("a").unwrap();
        assert_eq!(deps, vec!["c".to_string(), "b".to_string()]);
    }

    #[test]
    fn detects_dependency_cycle() {
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), metric("a", &["b"]));
        entries.insert("b".to_string(), metric("b", &["a"]));
        let registry = MetricsRegistry { entries };

        assert!(matches!(
            registry.check_acyclic(),
            Err(RegistryError::DependencyCycle(_))
        ));
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), metric("a", &["missing"]));
        let registry = MetricsRegistry { entries };

        assert!(matches!(
            registry.check_acyclic(),
            Err(RegistryError::UnknownDependency(_, _))
        ));
    }
}
