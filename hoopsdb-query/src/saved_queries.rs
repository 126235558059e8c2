//! Saved Queries Store: normalized Query IR documents kept for
//! reproducibility. Two backends behind one trait, selected once at binary
//! startup from config — there is no runtime backend switch, matching the
//! "pluggable but not runtime-polymorphic" shape spec.md asks for.

use crate::errors::SavedQueryError;
use crate::ir::QueryRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use ulid::Ulid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQuery {
    pub id: String,
    pub name: String,
    pub ir: QueryRequest,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
}

#[derive(Debug, Default, Clone)]
pub struct SavedQueryFilter {
    pub name_contains: Option<String>,
    pub include_deleted: bool,
}

pub trait SavedQueryStore {
    fn create(&self, name: &str, ir: &QueryRequest) -> Result<SavedQuery, SavedQueryError>;
    fn get(&self, id: &str) -> Result<SavedQuery, SavedQueryError>;
    fn list(&self, filter: &SavedQueryFilter) -> Result<Vec<SavedQuery>, SavedQueryError>;
    fn update(&self, id: &str, ir: &QueryRequest, expected_version: u32) -> Result<SavedQuery, SavedQueryError>;
    fn delete(&self, id: &str) -> Result<(), SavedQueryError>;
}

/// One canonical JSON file per ID (sorted keys, UTF-8, LF-terminated), plus
/// an append-only `.versions/<id>/<version>.json` history directory so an
/// `update` never destroys the prior document.
pub struct FilesystemSavedQueryStore {
    root: PathBuf,
}

impl FilesystemSavedQueryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn doc_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn version_path(&self, id: &str, version: u32) -> PathBuf {
        self.root.join(".versions").join(id).join(format!("{version}.json"))
    }

    fn write_canonical(&self, path: &Path, doc: &SavedQuery) -> Result<(), SavedQueryError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut body = serde_json::to_string_pretty(doc)?;
        body.push('\n');
        fs::write(path, body)?;
        Ok(())
    }

    fn read(&self, id: &str) -> Result<SavedQuery, SavedQueryError> {
        let path = self.doc_path(id);
        let raw = fs::read_to_string(&path).map_err(|_| SavedQueryError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl SavedQueryStore for FilesystemSavedQueryStore {
    fn create(&self, name: &str, ir: &QueryRequest) -> Result<SavedQuery, SavedQueryError> {
        let id = Ulid::new().to_string();
        let now = Utc::now();
        let doc = SavedQuery {
            id: id.clone(),
            name: name.to_string(),
            ir: ir.clone(),
            version: 1,
            created_at: now,
            updated_at: now,
            deleted: false,
        };
        self.write_canonical(&self.doc_path(&id), &doc)?;
        self.write_canonical(&self.version_path(&id, 1), &doc)?;
        Ok(doc)
    }

    fn get(&self, id: &str) -> Result<SavedQuery, SavedQueryError> {
        let doc = self.read(id)?;
        if doc.deleted {
            return Err(SavedQueryError::NotFound(id.to_string()));
        }
        Ok(doc)
    }

    fn list(&self, filter: &SavedQueryFilter) -> Result<Vec<SavedQuery>, SavedQueryError> {
        let mut out = Vec::new();
        if !self.root.exists() {
            return Ok(out);
        }
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read_to_string(&path)?;
            let doc: SavedQuery = serde_json::from_str(&raw)?;
            if doc.deleted && !filter.include_deleted {
                continue;
            }
            if let Some(needle) = &filter.name_contains {
                if !doc.name.contains(needle.as_str()) {
                    continue;
                }
            }
            out.push(doc);
        }
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    fn update(&self, id: &str, ir: &QueryRequest, expected_version: u32) -> Result<SavedQuery, SavedQueryError> {
        let mut doc = self.read(id)?;
        if doc.version != expected_version {
            return Err(SavedQueryError::VersionConflict {
                id: id.to_string(),
                expected: expected_version,
                actual: doc.version,
            });
        }
        doc.ir = ir.clone();
        doc.version += 1;
        doc.updated_at = Utc::now();
        self.write_canonical(&self.doc_path(id), &doc)?;
        self.write_canonical(&self.version_path(id, doc.version), &doc)?;
        Ok(doc)
    }

    fn delete(&self, id: &str) -> Result<(), SavedQueryError> {
        let mut doc = self.read(id)?;
        doc.deleted = true;
        doc.updated_at = Utc::now();
        self.write_canonical(&self.doc_path(id), &doc)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EntityType, Filters, PageSpec};

    fn sample_ir() -> QueryRequest {
        QueryRequest::Leaderboards {
            entity_type: EntityType::Player,
            metrics: vec![],
            filters: Filters::default(),
            sort: vec![],
            page: PageSpec::default(),
        }
    }

    #[test]
    fn create_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemSavedQueryStore::new(dir.path());
        let created = store.create("top scorers", &sample_ir()).unwrap();

        let fetched = store.get(&created.id).unwrap();
        assert_eq!(fetched.name, "top scorers");
        assert_eq!(fetched.version, 1);
    }

    #[test]
    fn update_rejects_stale_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemSavedQueryStore::new(dir.path());
        let created = store.create("q", &sample_ir()).unwrap();

        let err = store.update(&created.id, &sample_ir(), 99).unwrap_err();
        assert!(matches!(err, SavedQueryError::VersionConflict { .. }));
    }

    #[test]
    fn delete_is_a_tombstone_not_a_removal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemSavedQueryStore::new(dir.path());
        let created = store.create("q", &sample_ir()).unwrap();

        store.delete(&created.id).unwrap();
        assert!(matches!(store.get(&created.id), Err(SavedQueryError::NotFound(_))));

        let all = store.list(&SavedQueryFilter { include_deleted: true, ..Default::default() }).unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].deleted);
    }
}
