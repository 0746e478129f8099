use crate::error::{MergeUpError, Result};
use crate::manifest::Manifest;
use crate::source::RepositorySource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Branches, tags and manifest of a repository captured at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySnapshot {
    pub repository: String,
    pub default_branch: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub manifest: Option<Manifest>,
}

impl RepositorySnapshot {
    fn check(&self) -> Result<()> {
        let parts: Vec<&str> = self.repository.split('/').collect();
        if parts.len() != 2 || parts.iter().any(|part| part.is_empty()) {
            return Err(MergeUpError::snapshot(format!(
                "'{}' is not an org/name repository reference",
                self.repository
            )));
        }
        if self.default_branch.trim().is_empty() {
            return Err(MergeUpError::snapshot(format!(
                "Snapshot of {} has an empty default branch",
                self.repository
            )));
        }
        Ok(())
    }
}

/// Repository source backed by a JSON snapshot document
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: RepositorySnapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: RepositorySnapshot) -> Result<Self> {
        snapshot.check()?;
        Ok(SnapshotSource { snapshot })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: RepositorySnapshot = serde_json::from_str(json)
            .map_err(|e| MergeUpError::snapshot(format!("Could not parse snapshot: {}", e)))?;
        SnapshotSource::new(snapshot)
    }

    /// Read a snapshot file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            MergeUpError::snapshot(format!("Could not read {}: {}", path.display(), e))
        })?;
        SnapshotSource::from_json_str(&contents)
    }

    pub fn snapshot(&self) -> &RepositorySnapshot {
        &self.snapshot
    }
}

impl RepositorySource for SnapshotSource {
    fn repository(&self) -> &str {
        &self.snapshot.repository
    }

    fn default_branch(&self) -> Result<String> {
        Ok(self.snapshot.default_branch.clone())
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        Ok(self.snapshot.branches.clone())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.snapshot.tags.clone())
    }

    fn manifest(&self) -> Result<Option<Manifest>> {
        Ok(self.snapshot.manifest.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_json() {
        let source = SnapshotSource::from_json_str(
            r#"{
                "repository": "silverstripe/silverstripe-mfa",
                "defaultBranch": "5",
                "tags": ["5.0.0", "4.13.1"],
                "branches": ["4", "4.13", "5", "main"],
                "manifest": {"name": "silverstripe/mfa", "require": {"php": "^8.1"}}
            }"#,
        )
        .unwrap();

        assert_eq!(source.repository(), "silverstripe/silverstripe-mfa");
        assert_eq!(source.default_branch().unwrap(), "5");
        assert_eq!(source.list_branches().unwrap().len(), 4);
        assert_eq!(source.list_tags().unwrap().len(), 2);
        let manifest = source.manifest().unwrap().unwrap();
        assert_eq!(manifest.requirement("php"), Some("^8.1"));
    }

    #[test]
    fn test_snapshot_optional_fields() {
        let source =
            SnapshotSource::from_json_str(r#"{"repository": "a/b", "defaultBranch": "main"}"#)
                .unwrap();
        assert!(source.list_branches().unwrap().is_empty());
        assert!(source.list_tags().unwrap().is_empty());
        assert!(source.manifest().unwrap().is_none());

        let null_manifest = SnapshotSource::from_json_str(
            r#"{"repository": "a/b", "defaultBranch": "1", "manifest": null}"#,
        )
        .unwrap();
        assert!(null_manifest.manifest().unwrap().is_none());

        let empty_require = SnapshotSource::from_json_str(
            r#"{"repository": "a/b", "defaultBranch": "1", "manifest": {"require": []}}"#,
        )
        .unwrap();
        assert!(empty_require.manifest().unwrap().unwrap().require.is_empty());
    }

    #[test]
    fn test_snapshot_rejects_bad_reference() {
        let result =
            SnapshotSource::from_json_str(r#"{"repository": "framework", "defaultBranch": "5"}"#);
        assert!(matches!(result, Err(MergeUpError::Snapshot(_))));
    }

    #[test]
    fn test_snapshot_rejects_empty_default_branch() {
        let result = SnapshotSource::from_json_str(r#"{"repository": "a/b", "defaultBranch": ""}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SnapshotSource::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(MergeUpError::Snapshot(_))));
    }
}
