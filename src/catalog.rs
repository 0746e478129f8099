//! Read-only catalog of per-repository metadata
//!
//! The catalog document is a JSON object keyed by category, each holding a list of
//! repository records. Category order and record order are both significant: the
//! dependency scan of the resolver returns the first match in document order, so the
//! document is deserialized into ordered vectors rather than hash or sorted maps.

use crate::error::{MergeUpError, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

pub const CATEGORY_SUPPORTED: &str = "supportedModules";
pub const CATEGORY_WORKFLOW: &str = "workflow";
pub const CATEGORY_TOOLING: &str = "tooling";
pub const CATEGORY_MISC: &str = "misc";

pub const KNOWN_CATEGORIES: [&str; 4] = [
    CATEGORY_SUPPORTED,
    CATEGORY_WORKFLOW,
    CATEGORY_TOOLING,
    CATEGORY_MISC,
];

/// Mapping key that applies to every platform major
pub const WILDCARD: &str = "*";

/// JSON object read as a list of entries in document order
struct OrderedEntries<V>(Vec<(String, V)>);

struct OrderedEntriesVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedEntriesVisitor<V> {
    type Value = OrderedEntries<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            if entries.iter().any(|(existing, _): &(String, V)| *existing == key) {
                return Err(de::Error::custom(format!("duplicate key '{}'", key)));
            }
            entries.push((key, value));
        }
        Ok(OrderedEntries(entries))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedEntriesVisitor(PhantomData))
    }
}

/// Platform major label (or `*`) to the repository's branch majors for that release line
///
/// Entries keep document order. When the wildcard key is present it is the only key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MajorVersionMapping {
    entries: Vec<(String, Vec<String>)>,
}

impl MajorVersionMapping {
    /// Build a mapping from entries in order
    pub fn new<K, B>(entries: impl IntoIterator<Item = (K, Vec<B>)>) -> Result<Self>
    where
        K: Into<String>,
        B: Into<String>,
    {
        let entries: Vec<(String, Vec<String>)> = entries
            .into_iter()
            .map(|(key, majors)| (key.into(), majors.into_iter().map(Into::into).collect()))
            .collect();
        check_wildcard(&entries).map_err(MergeUpError::catalog)?;
        Ok(MajorVersionMapping { entries })
    }

    /// Platform major whose branch-major list contains `branch_major`, first in document order
    ///
    /// Only numeric platform keys take part; the wildcard never resolves directly.
    pub fn platform_major_for(&self, branch_major: u64) -> Option<&str> {
        self.entries
            .iter()
            .filter(|(key, _)| is_numeric_label(key))
            .find(|(_, majors)| {
                majors
                    .iter()
                    .any(|major| major.trim().parse::<u64>().ok() == Some(branch_major))
            })
            .map(|(key, _)| key.as_str())
    }

    pub fn has_wildcard(&self) -> bool {
        self.entries.iter().any(|(key, _)| key == WILDCARD)
    }

    /// Branch majors listed for a platform major label
    pub fn get(&self, platform_major: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(key, _)| key == platform_major)
            .map(|(_, majors)| majors.as_slice())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, majors)| (key.as_str(), majors.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn is_numeric_label(label: &str) -> bool {
    !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit())
}

fn check_wildcard(entries: &[(String, Vec<String>)]) -> std::result::Result<(), String> {
    if entries.len() > 1 && entries.iter().any(|(key, _)| key == WILDCARD) {
        return Err(format!(
            "wildcard '{}' must be the only key of majorVersionMapping",
            WILDCARD
        ));
    }
    Ok(())
}

impl<'de> Deserialize<'de> for MajorVersionMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let OrderedEntries(entries) = OrderedEntries::<Vec<String>>::deserialize(deserializer)?;
        check_wildcard(&entries).map_err(de::Error::custom)?;
        Ok(MajorVersionMapping { entries })
    }
}

impl Serialize for MajorVersionMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, majors) in &self.entries {
            map.serialize_entry(key, majors)?;
        }
        map.end()
    }
}

/// Kind of repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    Module,
    Recipe,
    Theme,
    #[default]
    #[serde(other)]
    Other,
}

/// Metadata for one repository
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMetadata {
    /// `org/name` reference of the source repository
    pub github: String,

    /// Package registry name, for repositories that are published as packages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packagist: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_id: Option<u64>,

    #[serde(default)]
    pub is_core: bool,

    /// Released in lock-step with platform minor releases
    #[serde(default)]
    pub lockstepped: bool,

    #[serde(default, rename = "type")]
    pub repository_type: RepositoryType,

    #[serde(default)]
    pub major_version_mapping: MajorVersionMapping,
}

impl RepositoryMetadata {
    /// Record with only a github reference and a mapping
    pub fn new(github: impl Into<String>, major_version_mapping: MajorVersionMapping) -> Self {
        RepositoryMetadata {
            github: github.into(),
            packagist: None,
            github_id: None,
            is_core: false,
            lockstepped: false,
            repository_type: RepositoryType::Other,
            major_version_mapping,
        }
    }

    pub fn with_packagist(mut self, packagist: impl Into<String>) -> Self {
        self.packagist = Some(packagist.into());
        self
    }

    /// Repository part of the github reference
    pub fn repository_name(&self) -> &str {
        self.github
            .split_once('/')
            .map_or(self.github.as_str(), |(_, name)| name)
    }

    /// Platform major for a branch major, from this record's mapping
    pub fn platform_major_for(&self, branch_major: u64) -> Option<&str> {
        self.major_version_mapping.platform_major_for(branch_major)
    }
}

/// The injected metadata table, immutable once constructed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataCatalog {
    categories: Vec<(String, Vec<RepositoryMetadata>)>,
}

impl MetadataCatalog {
    /// Build a catalog from categories in order
    pub fn new(categories: Vec<(String, Vec<RepositoryMetadata>)>) -> Self {
        MetadataCatalog { categories }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let OrderedEntries(categories) =
            serde_json::from_str::<OrderedEntries<Vec<RepositoryMetadata>>>(json)
                .map_err(|e| MergeUpError::catalog(format!("Could not parse catalog data: {}", e)))?;
        Ok(MetadataCatalog { categories })
    }

    /// Read the catalog document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            MergeUpError::catalog(format!("Could not read {}: {}", path.display(), e))
        })?;
        MetadataCatalog::from_json_str(&contents)
    }

    /// Every record in document order
    pub fn iter(&self) -> impl Iterator<Item = &RepositoryMetadata> {
        self.categories.iter().flat_map(|(_, records)| records.iter())
    }

    /// Category names in document order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }

    pub fn category(&self, name: &str) -> Option<&[RepositoryMetadata]> {
        self.categories
            .iter()
            .find(|(category, _)| category == name)
            .map(|(_, records)| records.as_slice())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Metadata for an `org/name` repository reference
    ///
    /// An exact match wins. With `allow_partial_match`, a record whose repository name
    /// matches under a different organisation is accepted; the last such record wins.
    pub fn metadata_for_repository(
        &self,
        github_ref: &str,
        allow_partial_match: bool,
    ) -> Result<Option<&RepositoryMetadata>> {
        let name = match github_ref.split('/').collect::<Vec<_>>().as_slice() {
            [_, name] => *name,
            _ => {
                return Err(MergeUpError::invalid_reference(format!(
                    "'{}' must be a valid org/repo reference",
                    github_ref
                )))
            }
        };

        let mut candidate = None;
        for record in self.iter() {
            if record.github == github_ref {
                return Ok(Some(record));
            }
            if record.repository_name() == name {
                candidate = Some(record);
            }
        }

        Ok(if allow_partial_match { candidate } else { None })
    }

    /// Metadata for a package registry name such as `silverstripe/framework`
    pub fn metadata_by_packagist_name(
        &self,
        packagist_name: &str,
    ) -> Result<Option<&RepositoryMetadata>> {
        if !packagist_name.contains('/') {
            return Err(MergeUpError::invalid_reference(format!(
                "'{}' must be a valid org/repo reference",
                packagist_name
            )));
        }

        Ok(self
            .iter()
            .find(|record| record.packagist.as_deref() == Some(packagist_name)))
    }

    /// Packages released in lock-step with the platform, with their mappings
    pub fn lockstepped_repositories(&self) -> Vec<(&str, &MajorVersionMapping)> {
        self.category(CATEGORY_SUPPORTED)
            .unwrap_or_default()
            .iter()
            .filter(|record| record.lockstepped)
            .filter_map(|record| {
                record
                    .packagist
                    .as_deref()
                    .filter(|packagist| !packagist.is_empty())
                    .map(|packagist| (packagist, &record.major_version_mapping))
            })
            .collect()
    }

    /// Every schema problem found in the catalog
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut github_refs = HashSet::new();
        let mut packagist_names = HashSet::new();
        let mut github_ids = HashSet::new();

        for (category, records) in &self.categories {
            if !KNOWN_CATEGORIES.contains(&category.as_str()) {
                problems.push(format!("unknown category '{}'", category));
            }

            for record in records {
                let github = record.github.as_str();
                if github.split('/').count() != 2 || github.split('/').any(str::is_empty) {
                    problems.push(format!("'{}' is not an org/repo github reference", github));
                }
                if !github_refs.insert(github) {
                    problems.push(format!("duplicate github reference '{}'", github));
                }

                if let Some(packagist) = record.packagist.as_deref() {
                    if !packagist.contains('/') {
                        problems.push(format!(
                            "{}: packagist name '{}' is not an org/name reference",
                            github, packagist
                        ));
                    }
                    if !packagist_names.insert(packagist) {
                        problems.push(format!("duplicate packagist name '{}'", packagist));
                    }
                }

                if let Some(id) = record.github_id {
                    if !github_ids.insert(id) {
                        problems.push(format!("duplicate githubId {}", id));
                    }
                }

                let mapping = &record.major_version_mapping;
                if mapping.is_empty() {
                    problems.push(format!("{}: majorVersionMapping is empty", github));
                }
                for (key, majors) in mapping.entries() {
                    if key != WILDCARD && !is_numeric_label(key) {
                        problems.push(format!(
                            "{}: majorVersionMapping key '{}' is not a major version",
                            github, key
                        ));
                    }
                    if majors.is_empty() {
                        problems.push(format!(
                            "{}: majorVersionMapping entry '{}' lists no branch majors",
                            github, key
                        ));
                    }
                    for major in majors {
                        if !is_numeric_label(major) {
                            problems.push(format!(
                                "{}: branch major '{}' for '{}' is not a major version",
                                github, major, key
                            ));
                        }
                    }
                }
            }
        }

        problems
    }

    /// Checks the catalog schema, reporting every problem found
    pub fn validate(&self) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(MergeUpError::catalog(problems.join("; ")))
        }
    }
}
