//! Canonical source-of-truth for every CSV artifact the loaders consume.
//! Verification streams each file once, in fixed-size chunks, so memory use
//! stays constant even for the 2+ GB play-by-play export.

use crate::errors::ManifestError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const VERIFY_CHUNK_BYTES: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestStatus {
    Pending,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub csv_file: String,
    pub target_table: String,
    pub description: String,
    pub line_count: u64,
    pub size_bytes: u64,
    pub sha256: String,
    pub status: ManifestStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entry(&self, csv_file: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.csv_file == csv_file)
    }
}

#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub csv_file: String,
    pub computed_sha256: String,
    pub computed_line_count: u64,
    pub computed_size_bytes: u64,
}

/// Loads and structurally validates the manifest: every entry must name a
/// target table, per spec.md §4.1's `MANIFEST_INCOMPLETE` condition.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let contents = std::fs::read_to_string(path)?;
    let manifest: Manifest = serde_yaml::from_str(&contents)?;

    for entry in &manifest.entries {
        if entry.target_table.trim().is_empty() {
            return Err(ManifestError::Incomplete(entry.csv_file.clone()));
        }
    }

    Ok(manifest)
}

/// Streams `csv_dir/entry.csv_file` once, hashing in 8 KiB chunks and
/// counting newlines, so this function's memory footprint never depends on
/// file size.
pub fn verify_file(entry: &ManifestEntry, csv_dir: &Path) -> Result<VerifyReport, ManifestError> {
    let path = csv_dir.join(&entry.csv_file);
    let file = File::open(&path).map_err(|_| ManifestError::MissingFile(entry.csv_file.clone()))?;
    let mut reader = BufReader::new(file);

    let mut hasher = Sha256::new();
    let mut buf = [0u8; VERIFY_CHUNK_BYTES];
    let mut line_count: u64 = 0;
    let mut size_bytes: u64 = 0;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        line_count += buf[..n].iter().filter(|&&b| b == b'\n').count() as u64;
        size_bytes += n as u64;
    }

    let computed_sha256 = hex::encode(hasher.finalize());

    let report = VerifyReport {
        csv_file: entry.csv_file.clone(),
        computed_sha256: computed_sha256.clone(),
        computed_line_count: line_count,
        computed_size_bytes: size_bytes,
    };

    if computed_sha256 != entry.sha256 {
        return Err(ManifestError::Mismatch {
            file: entry.csv_file.clone(),
            expected: entry.sha256.clone(),
            actual: computed_sha256,
        });
    }
    if line_count != entry.line_count {
        return Err(ManifestError::LineCountMismatch {
            file: entry.csv_file.clone(),
            expected: entry.line_count,
            actual: line_count,
        });
    }

    Ok(report)
}

/// Verifies every manifest entry, collecting rather than short-circuiting on
/// the first failure, so `verify_only` mode can report everything wrong with
/// a CSV directory in one pass.
pub fn verify_all(
    manifest: &Manifest,
    csv_dir: &Path,
) -> Vec<(String, Result<VerifyReport, ManifestError>)> {
    manifest
        .entries
        .iter()
        .map(|entry| (entry.csv_file.clone(), verify_file(entry, csv_dir)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(dir: &Path, name: &str, contents: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn verify_file_matches_sha_and_line_count() {
        let dir = tempfile::tempdir().unwrap();
        write_temp_csv(dir.path(), "teams.csv", "id,abbrev\n1,BOS\n2,LAL\n");

        let mut hasher = Sha256::new();
        hasher.update(b"id,abbrev\n1,BOS\n2,LAL\n");
        let sha256 = hex::encode(hasher.finalize());

        let entry = ManifestEntry {
            csv_file: "teams.csv".into(),
            target_table: "teams".into(),
            description: "teams".into(),
            line_count: 3,
            size_bytes: 24,
            sha256,
            status: ManifestStatus::Pending,
        };

        let report = verify_file(&entry, dir.path()).unwrap();
        assert_eq!(report.computed_line_count, 3);
    }

    #[test]
    fn verify_file_reports_mismatch_on_wrong_hash() {
        let dir = tempfile::tempdir().unwrap();
        write_temp_csv(dir.path(), "teams.csv", "id,abbrev\n1,BOS\n");

        let entry = ManifestEntry {
            csv_file: "teams.csv".into(),
            target_table: "teams".into(),
            description: "teams".into(),
            line_count: 2,
            size_bytes: 14,
            sha256: "0".repeat(64),
            status: ManifestStatus::Pending,
        };

        let err = verify_file(&entry, dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Mismatch { .. }));
    }

    #[test]
    fn verify_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let entry = ManifestEntry {
            csv_file: "nope.csv".into(),
            target_table: "teams".into(),
            description: "teams".into(),
            line_count: 0,
            size_bytes: 0,
            sha256: String::new(),
            status: ManifestStatus::Pending,
        };

        let err = verify_file(&entry, dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::MissingFile(_)));
    }

    #[test]
    fn load_manifest_rejects_entry_without_target_table() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("manifest.yaml");
        std::fs::write(
            &manifest_path,
            "entries:\n  - csv_file: teams.csv\n    target_table: \"\"\n    description: x\n    line_count: 1\n    size_bytes: 1\n    sha256: abc\n    status: pending\n",
        )
        .unwrap();

        let err = load_manifest(&manifest_path).unwrap_err();
        assert!(matches!(err, ManifestError::Incomplete(_)));
    }
}
