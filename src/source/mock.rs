use crate::error::{MergeUpError, Result};
use crate::manifest::Manifest;
use crate::source::RepositorySource;

/// In-memory repository source for tests
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    repository: String,
    default_branch: Option<String>,
    branches: Vec<String>,
    tags: Vec<String>,
    manifest: Option<Manifest>,
}

impl MockSource {
    /// Create an empty source for a repository
    pub fn new(repository: impl Into<String>) -> Self {
        MockSource {
            repository: repository.into(),
            ..Default::default()
        }
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = Some(branch.into());
        self
    }

    pub fn with_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches = branches.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Add a single branch
    pub fn add_branch(&mut self, name: impl Into<String>) {
        self.branches.push(name.into());
    }

    /// Add a single tag
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.push(name.into());
    }
}

impl RepositorySource for MockSource {
    fn repository(&self) -> &str {
        &self.repository
    }

    fn default_branch(&self) -> Result<String> {
        self.default_branch.clone().ok_or_else(|| {
            MergeUpError::snapshot(format!("No default branch for {}", self.repository))
        })
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        Ok(self.branches.clone())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.tags.clone())
    }

    fn manifest(&self) -> Result<Option<Manifest>> {
        Ok(self.manifest.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_basic() {
        let source = MockSource::new("silverstripe/silverstripe-admin")
            .with_default_branch("2")
            .with_branches(["1", "2"])
            .with_tags(["2.0.0"]);

        assert_eq!(source.repository(), "silverstripe/silverstripe-admin");
        assert_eq!(source.default_branch().unwrap(), "2");
        assert_eq!(source.list_branches().unwrap(), vec!["1", "2"]);
        assert_eq!(source.list_tags().unwrap(), vec!["2.0.0"]);
        assert!(source.manifest().unwrap().is_none());
    }

    #[test]
    fn test_mock_source_add() {
        let mut source = MockSource::new("a/b");
        source.add_branch("5");
        source.add_tag("5.0.0");
        assert_eq!(source.list_branches().unwrap(), vec!["5"]);
        assert_eq!(source.list_tags().unwrap(), vec!["5.0.0"]);
    }

    #[test]
    fn test_mock_source_missing_default_branch() {
        let source = MockSource::default();
        assert!(source.default_branch().is_err());
        assert!(source.list_tags().unwrap().is_empty());
    }

    #[test]
    fn test_mock_source_manifest() {
        let source = MockSource::new("a/b").with_manifest(Manifest::new("a/b"));
        assert_eq!(
            source.manifest().unwrap().and_then(|m| m.name),
            Some("a/b".to_string())
        );
    }
}
