//! Platform major-line resolution
//!
//! Works out which platform release line a branch belongs to, trying in turn:
//! 1. the repository's own `majorVersionMapping`
//! 2. the constraint the manifest places on any catalogued package
//! 3. the minimum runtime version the manifest requires (opt-in)

use crate::catalog::{MetadataCatalog, RepositoryMetadata};
use crate::config::Config;
use crate::constraint::Constraint;
use crate::domain::{Branch, Version};
use crate::error::{MergeUpError, Result};
use crate::manifest::Manifest;
use tracing::{debug, warn};

/// Resolves platform major lines against an injected catalog
#[derive(Debug, Clone, Copy)]
pub struct VersionResolver<'a> {
    catalog: &'a MetadataCatalog,
    config: &'a Config,
}

impl<'a> VersionResolver<'a> {
    pub fn new(catalog: &'a MetadataCatalog, config: &'a Config) -> Self {
        VersionResolver { catalog, config }
    }

    pub fn catalog(&self) -> &'a MetadataCatalog {
        self.catalog
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Platform major line a branch belongs to
    ///
    /// # Arguments
    /// * `metadata` - Catalog record of the repository, if it has one
    /// * `branch` - Branch name such as "5", "5.1" or "main"
    /// * `manifest` - Manifest of the branch; enables the dependency fallbacks
    /// * `allow_runtime_fallback` - Also infer the line from the runtime requirement
    ///
    /// # Returns
    /// * `Some(label)` - Platform major label, e.g. "5"
    /// * `None` - Nothing could be inferred
    pub fn major_line(
        &self,
        metadata: Option<&RepositoryMetadata>,
        branch: &str,
        manifest: Option<&Manifest>,
        allow_runtime_fallback: bool,
    ) -> Option<String> {
        if let Some(major) = major_line_from_branch(metadata, branch) {
            return Some(major.to_string());
        }

        manifest.and_then(|manifest| self.major_line_from_manifest(manifest, allow_runtime_fallback))
    }

    /// Infer the platform major line from a manifest's requirements alone
    pub fn major_line_from_manifest(
        &self,
        manifest: &Manifest,
        allow_runtime_fallback: bool,
    ) -> Option<String> {
        if let Some(major) = self.major_line_from_dependencies(manifest) {
            return Some(major);
        }

        if allow_runtime_fallback {
            return self.major_line_from_runtime(manifest);
        }

        None
    }

    /// First catalogued package required by the manifest whose constraint floor maps to a
    /// platform major, in catalog order
    fn major_line_from_dependencies(&self, manifest: &Manifest) -> Option<String> {
        for record in self.catalog.iter() {
            let Some(package) = record.packagist.as_deref() else {
                continue;
            };
            let Some(requirement) = manifest.requirement(package) else {
                continue;
            };

            let constraint = match Constraint::parse(requirement) {
                Ok(constraint) => constraint,
                Err(e) => {
                    warn!(package, requirement, error = %e, "Ignoring unparsable dependency constraint");
                    continue;
                }
            };

            let floor_major = constraint.lower_bound().major();
            // Branch constraints and open-ended ranges have no usable floor
            if floor_major == 0 {
                debug!(package, requirement, "Dependency constraint has no numeric floor");
                continue;
            }

            if let Some(platform_major) = record.platform_major_for(floor_major) {
                debug!(
                    package,
                    requirement,
                    platform_major,
                    "Resolved platform major from dependency"
                );
                return Some(platform_major.to_string());
            }
        }

        None
    }

    /// Lowest platform release whose lowest supported runtime satisfies the manifest
    fn major_line_from_runtime(&self, manifest: &Manifest) -> Option<String> {
        let platform = &self.config.platform;
        let requirement = manifest.requirement(&platform.runtime_requirement)?;
        let constraint = match Constraint::parse(requirement) {
            Ok(constraint) => constraint,
            Err(e) => {
                warn!(requirement, error = %e, "Ignoring unparsable runtime constraint");
                return None;
            }
        };

        for support in &platform.runtime_versions {
            if support.release_major().is_none() {
                continue;
            }
            let Some(lowest) = support.lowest_version().and_then(|v| Version::parse(v).ok()) else {
                continue;
            };
            if constraint.matches(&lowest) {
                debug!(
                    requirement,
                    release = support.release.as_str(),
                    "Resolved platform major from runtime requirement"
                );
                return Some(support.release.clone());
            }
        }

        None
    }

    /// Offset to add to a branch major to get its platform major
    ///
    /// # Arguments
    /// * `metadata` - Catalog record of the repository, if it has one
    /// * `major_branches` - Bare major branches, newest first
    /// * `default_branch` - Default branch; its major is tried last
    /// * `manifest` - Manifest of the default branch
    ///
    /// # Errors
    /// * `MergeUpError::UnresolvableMajor` - No inference path produced an answer
    pub fn major_offset(
        &self,
        metadata: Option<&RepositoryMetadata>,
        major_branches: &[u64],
        default_branch: &str,
        manifest: Option<&Manifest>,
    ) -> Result<i64> {
        let default_major = Branch::new(default_branch).major();

        let mut candidates = major_branches.to_vec();
        if let Some(default_major) = default_major {
            if !candidates.contains(&default_major) {
                candidates.push(default_major);
            }
        }

        for branch_major in candidates {
            let platform_major = metadata
                .and_then(|m| m.platform_major_for(branch_major))
                .and_then(|label| label.parse::<i64>().ok())
                .unwrap_or(0);
            if platform_major == 0 {
                continue;
            }
            if let Some(offset) = offset_between(platform_major, branch_major) {
                debug!(branch_major, platform_major, "Major offset from mapping");
                return Ok(offset);
            }
        }

        if let (Some(manifest), Some(default_major)) = (manifest, default_major) {
            let platform_major = self
                .major_line_from_manifest(manifest, true)
                .and_then(|label| label.parse::<i64>().ok())
                .unwrap_or(0);
            if platform_major != 0 {
                if let Some(offset) = offset_between(platform_major, default_major) {
                    debug!(default_major, platform_major, "Major offset from manifest");
                    return Ok(offset);
                }
            }
        }

        if let Some(default_major) = default_major {
            let wildcard = metadata.is_some_and(|m| m.major_version_mapping.has_wildcard());
            if manifest.is_none() || wildcard {
                let highest = self.config.platform.highest_stable_major;
                let offset = i64::try_from(highest)
                    .ok()
                    .and_then(|highest| offset_between(highest, default_major));
                if let Some(offset) = offset {
                    debug!(default_major, highest, "Major offset from highest stable platform major");
                    return Ok(offset);
                }
            }
        }

        Err(MergeUpError::unresolvable_major(display_name(metadata, manifest)))
    }
}

/// `platform_major - branch_major`, or `None` when it does not fit an `i64`
fn offset_between(platform_major: i64, branch_major: u64) -> Option<i64> {
    i64::try_from(branch_major)
        .ok()
        .and_then(|branch_major| platform_major.checked_sub(branch_major))
}

/// Platform major for a branch looked up directly in the repository's mapping
pub fn major_line_from_branch<'m>(
    metadata: Option<&'m RepositoryMetadata>,
    branch: &str,
) -> Option<&'m str> {
    let branch_major = Branch::new(branch).major()?;
    metadata?.platform_major_for(branch_major)
}

/// Name used when reporting a repository: manifest name, then package name, then github reference
fn display_name(metadata: Option<&RepositoryMetadata>, manifest: Option<&Manifest>) -> String {
    manifest
        .and_then(|m| m.name.as_deref())
        .or_else(|| metadata.and_then(|m| m.packagist.as_deref()))
        .or_else(|| metadata.map(|m| m.github.as_str()))
        .filter(|name| !name.is_empty())
        .unwrap_or("this module")
        .to_string()
}
