use crate::domain::Version;
use crate::error::{MergeUpError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Represents the complete configuration for merge-up.
///
/// Contains the catalog location, the platform release constants and the per-repository
/// merge-up overrides.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_catalog")]
    pub catalog: String,

    #[serde(default)]
    pub platform: PlatformConfig,

    #[serde(default)]
    pub merge_up: MergeUpConfig,
}

fn default_catalog() -> String {
    "repositories.json".to_string()
}

fn default_lowest_supported_major() -> u64 {
    4
}

fn default_highest_stable_major() -> u64 {
    5
}

fn default_runtime_requirement() -> String {
    "php".to_string()
}

/// Returns the default table of runtime versions supported by each platform release, ascending.
fn default_runtime_versions() -> Vec<RuntimeSupport> {
    let table: [(&str, &[&str]); 9] = [
        ("4.9", &["7.1", "7.2", "7.3", "7.4"]),
        ("4.10", &["7.3", "7.4", "8.0"]),
        ("4.11", &["7.4", "8.0", "8.1"]),
        ("4", &["7.4", "8.0", "8.1"]),
        ("5.0", &["8.1", "8.2"]),
        ("5.1", &["8.1", "8.2"]),
        ("5.2", &["8.1", "8.2", "8.3"]),
        ("5", &["8.1", "8.2", "8.3"]),
        ("6", &["8.1", "8.2", "8.3"]),
    ];

    table
        .iter()
        .map(|(release, versions)| RuntimeSupport {
            release: release.to_string(),
            versions: versions.iter().map(|v| v.to_string()).collect(),
        })
        .collect()
}

fn default_skip() -> Vec<String> {
    vec!["silverstripe/cow".to_string()]
}

/// Returns the default merge-up floors: majors at or below these are never merged up.
fn default_do_not_merge_up_from_major() -> BTreeMap<String, u64> {
    let mut floors = BTreeMap::new();
    floors.insert(
        "bringyourownideas/silverstripe-composer-update-checker".to_string(),
        2,
    );
    floors.insert("silverstripe/silverstripe-graphql".to_string(), 3);
    floors.insert("silverstripe/silverstripe-linkfield".to_string(), 3);
    floors.insert("tractorcow-farm/silverstripe-fluent".to_string(), 4);
    floors
}

/// Platform release constants.
///
/// `runtime_versions` must be listed in ascending release order; the first entry whose
/// lowest runtime version satisfies a manifest wins.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PlatformConfig {
    #[serde(default = "default_lowest_supported_major")]
    pub lowest_supported_major: u64,

    #[serde(default = "default_highest_stable_major")]
    pub highest_stable_major: u64,

    #[serde(default = "default_runtime_requirement")]
    pub runtime_requirement: String,

    #[serde(default = "default_runtime_versions")]
    pub runtime_versions: Vec<RuntimeSupport>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        PlatformConfig {
            lowest_supported_major: default_lowest_supported_major(),
            highest_stable_major: default_highest_stable_major(),
            runtime_requirement: default_runtime_requirement(),
            runtime_versions: default_runtime_versions(),
        }
    }
}

/// Runtime versions supported by one platform release
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RuntimeSupport {
    pub release: String,
    pub versions: Vec<String>,
}

impl RuntimeSupport {
    /// The release label as a bare major, if it is one ("5" yes, "5.1" no)
    pub fn release_major(&self) -> Option<u64> {
        if !self.release.is_empty() && self.release.bytes().all(|b| b.is_ascii_digit()) {
            self.release.parse().ok()
        } else {
            None
        }
    }

    /// Lowest supported runtime version
    pub fn lowest_version(&self) -> Option<&str> {
        self.versions.first().map(String::as_str)
    }
}

/// Per-repository merge-up overrides.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MergeUpConfig {
    #[serde(default = "default_skip")]
    pub skip: Vec<String>,

    #[serde(default = "default_do_not_merge_up_from_major")]
    pub do_not_merge_up_from_major: BTreeMap<String, u64>,
}

impl Default for MergeUpConfig {
    fn default() -> Self {
        MergeUpConfig {
            skip: default_skip(),
            do_not_merge_up_from_major: default_do_not_merge_up_from_major(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            catalog: default_catalog(),
            platform: PlatformConfig::default(),
            merge_up: MergeUpConfig::default(),
        }
    }
}

impl Config {
    /// Whether merge-up is never performed for this repository
    pub fn is_skipped(&self, repository: &str) -> bool {
        self.merge_up.skip.iter().any(|r| r == repository)
    }

    /// Highest branch major of this repository excluded from merge-up
    pub fn merge_up_floor(&self, repository: &str) -> Option<u64> {
        self.merge_up.do_not_merge_up_from_major.get(repository).copied()
    }

    /// Validates the configuration.
    ///
    /// # Returns
    /// * `Ok(())` - The configuration is usable
    /// * `Err(MergeUpError::Config)` - Describes the first problem found
    pub fn validate(&self) -> Result<()> {
        let platform = &self.platform;
        if platform.lowest_supported_major > platform.highest_stable_major {
            return Err(MergeUpError::config(format!(
                "lowest_supported_major ({}) is above highest_stable_major ({})",
                platform.lowest_supported_major, platform.highest_stable_major
            )));
        }

        if platform.runtime_requirement.trim().is_empty() {
            return Err(MergeUpError::config("runtime_requirement must not be empty"));
        }

        for support in &platform.runtime_versions {
            if support.release.trim().is_empty() {
                return Err(MergeUpError::config("runtime_versions entry has an empty release"));
            }
            if support.versions.is_empty() {
                return Err(MergeUpError::config(format!(
                    "runtime_versions entry for release {} lists no versions",
                    support.release
                )));
            }
            for version in &support.versions {
                Version::parse(version).map_err(|_| {
                    MergeUpError::config(format!(
                        "runtime version '{}' for release {} is not a version",
                        version, support.release
                    ))
                })?;
            }
        }

        for repository in self
            .merge_up
            .skip
            .iter()
            .chain(self.merge_up.do_not_merge_up_from_major.keys())
        {
            if !repository.contains('/') {
                return Err(MergeUpError::config(format!(
                    "'{}' is not an org/name repository reference",
                    repository
                )));
            }
        }

        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `mergeup.toml` in current directory
/// 3. `.mergeup.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded and validated, or default, configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./mergeup.toml").exists() {
        fs::read_to_string("./mergeup.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".mergeup.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config =
        toml::from_str(&config_str).map_err(|e| MergeUpError::config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.catalog, "repositories.json");
        assert_eq!(config.platform.lowest_supported_major, 4);
        assert_eq!(config.platform.highest_stable_major, 5);
        assert_eq!(config.platform.runtime_requirement, "php");
        assert_eq!(config.platform.runtime_versions.len(), 9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_skip_and_floors() {
        let config = Config::default();
        assert!(config.is_skipped("silverstripe/cow"));
        assert!(!config.is_skipped("silverstripe/silverstripe-framework"));
        assert_eq!(config.merge_up_floor("silverstripe/silverstripe-graphql"), Some(3));
        assert_eq!(config.merge_up_floor("tractorcow-farm/silverstripe-fluent"), Some(4));
        assert_eq!(config.merge_up_floor("silverstripe/silverstripe-admin"), None);
    }

    #[test]
    fn test_release_major() {
        let support = |release: &str| RuntimeSupport {
            release: release.to_string(),
            versions: vec!["8.1".to_string()],
        };
        assert_eq!(support("5").release_major(), Some(5));
        assert_eq!(support("5.1").release_major(), None);
        assert_eq!(support("").release_major(), None);
        assert_eq!(support("5").lowest_version(), Some("8.1"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [platform]
            highest_stable_major = 6
            "#,
        )
        .unwrap();
        assert_eq!(config.platform.highest_stable_major, 6);
        assert_eq!(config.platform.lowest_supported_major, 4);
        assert_eq!(config.platform.runtime_versions.len(), 9);
        assert!(config.is_skipped("silverstripe/cow"));
    }

    #[test]
    fn test_validate_rejects_inverted_majors() {
        let mut config = Config::default();
        config.platform.lowest_supported_major = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_runtime_versions() {
        let mut config = Config::default();
        config.platform.runtime_versions[0].versions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_runtime_version() {
        let mut config = Config::default();
        config.platform.runtime_versions[0].versions = vec!["latest".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bare_repository_names() {
        let mut config = Config::default();
        config.merge_up.skip.push("cow".to_string());
        assert!(config.validate().is_err());
    }
}
