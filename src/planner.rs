//! Merge-up planning
//!
//! Turns the raw branch and tag lists of a repository into the ordered chain of
//! branches that fixes are merged up through, oldest first.

use crate::boundary::PlanNote;
use crate::catalog::{MetadataCatalog, RepositoryMetadata};
use crate::config::Config;
use crate::domain::{Branch, BranchKind, StableMinorIndex, Version};
use crate::error::Result;
use crate::manifest::Manifest;
use crate::resolver::{major_line_from_branch, VersionResolver};
use crate::source::RepositorySource;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Minor and patch used to build the inclusive ceiling of a merge-up floor
const FLOOR_CEILING: u64 = 999_999;

/// Ordered merge-up chain for one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeUpPlan {
    pub repository: String,
    /// Branches to merge up through, oldest first
    pub branches: Vec<String>,
    /// The repository is configured to never be merged up
    pub skipped: bool,
    /// Every branch left out of the plan, with the reason
    pub dropped: Vec<PlanNote>,
}

impl MergeUpPlan {
    fn empty(repository: &str) -> Self {
        MergeUpPlan {
            repository: repository.to_string(),
            branches: Vec::new(),
            skipped: false,
            dropped: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

/// Plans merge-up chains using a resolver over the injected catalog
#[derive(Debug, Clone, Copy)]
pub struct MergeUpPlanner<'a> {
    resolver: VersionResolver<'a>,
}

impl<'a> MergeUpPlanner<'a> {
    pub fn new(catalog: &'a MetadataCatalog, config: &'a Config) -> Self {
        MergeUpPlanner {
            resolver: VersionResolver::new(catalog, config),
        }
    }

    /// Plan the merge-up chain of a repository
    ///
    /// # Arguments
    /// * `repository` - `org/name` reference, used for the skip list and floors
    /// * `metadata` - Catalog record of the repository, if it has one
    /// * `default_branch` - Default branch of the repository
    /// * `tags` - Every tag of the repository
    /// * `branches` - Every branch of the repository
    /// * `manifest` - Manifest of the default branch
    ///
    /// # Errors
    /// * `MergeUpError::UnresolvableMajor` - The branch-to-platform offset could not be inferred
    pub fn plan<T, B>(
        &self,
        repository: &str,
        metadata: Option<&RepositoryMetadata>,
        default_branch: &str,
        tags: &[T],
        branches: &[B],
        manifest: Option<&Manifest>,
    ) -> Result<MergeUpPlan>
    where
        T: AsRef<str>,
        B: AsRef<str>,
    {
        let config = self.resolver.config();
        let mut plan = MergeUpPlan::empty(repository);

        if config.is_skipped(repository) {
            debug!(repository, "Repository is skipped for merge-up");
            plan.skipped = true;
            return Ok(plan);
        }

        let mut candidates = Vec::new();
        for name in branches {
            let branch = Branch::new(name.as_ref());
            if branch.is_numeric() {
                candidates.push(branch);
            } else {
                plan.dropped.push(PlanNote::NonNumeric { branch: branch.name });
            }
        }

        if candidates.is_empty() {
            debug!(repository, "No release branches to merge up");
            return Ok(plan);
        }

        // Newest first, so the offset is taken from the newest major branch that resolves
        candidates.sort_by(|a, b| b.cmp(a));

        let major_branches: Vec<u64> = candidates
            .iter()
            .filter_map(|branch| match branch.kind {
                BranchKind::Major(major) => Some(major),
                _ => None,
            })
            .collect();
        let offset =
            self.resolver
                .major_offset(metadata, &major_branches, default_branch, manifest)?;
        debug!(repository, offset, "Resolved branch to platform major offset");

        let stable_minors = StableMinorIndex::from_tags(tags);
        let lowest_supported = config.platform.lowest_supported_major;

        let mut supported = Vec::with_capacity(candidates.len());
        for branch in candidates {
            let platform_major = major_line_from_branch(metadata, &branch.name)
                .and_then(|label| label.parse::<i64>().ok())
                .filter(|major| *major != 0)
                .or_else(|| {
                    branch
                        .major()
                        .and_then(|major| i64::try_from(major).ok())
                        .and_then(|major| major.checked_add(offset))
                })
                .unwrap_or(0);

            if platform_major < lowest_supported as i64 {
                plan.dropped.push(PlanNote::BelowLowestSupported {
                    branch: branch.name,
                    platform_major,
                    lowest_supported,
                });
            } else {
                supported.push(branch);
            }
        }

        supported.sort_by(|a, b| b.cmp(a));

        let mut kept = prune_minors(supported, &stable_minors, &mut plan.dropped);

        if let Some(floor) = config.merge_up_floor(repository) {
            let ceiling = Version::new([floor, FLOOR_CEILING, FLOOR_CEILING]);
            kept.retain(|branch| {
                let above = branch.version().is_some_and(|version| version > ceiling);
                if !above {
                    plan.dropped.push(PlanNote::BelowMergeUpFloor {
                        branch: branch.name.clone(),
                        floor,
                    });
                }
                above
            });
        }

        plan.branches = kept.into_iter().rev().map(|branch| branch.name).collect();
        debug!(
            repository,
            branches = ?plan.branches,
            dropped = plan.dropped.len(),
            "Planned merge-up"
        );
        Ok(plan)
    }

    /// Just the ordered branch list of [`plan`](Self::plan)
    pub fn branches_for_merge_up<T, B>(
        &self,
        repository: &str,
        metadata: Option<&RepositoryMetadata>,
        default_branch: &str,
        tags: &[T],
        branches: &[B],
        manifest: Option<&Manifest>,
    ) -> Result<Vec<String>>
    where
        T: AsRef<str>,
        B: AsRef<str>,
    {
        self.plan(repository, metadata, default_branch, tags, branches, manifest)
            .map(|plan| plan.branches)
    }

    /// Plan a repository read from a source, looking its metadata up in the catalog
    pub fn plan_for_source(&self, source: &dyn RepositorySource) -> Result<MergeUpPlan> {
        let repository = source.repository();
        let metadata = self
            .resolver
            .catalog()
            .metadata_for_repository(repository, false)?;
        if metadata.is_none() {
            debug!(repository, "Repository is not in the catalog");
        }

        let default_branch = source.default_branch()?;
        let tags = source.list_tags()?;
        let branches = source.list_branches()?;
        let manifest = source.manifest()?;

        self.plan(
            repository,
            metadata,
            &default_branch,
            tags.as_slice(),
            branches.as_slice(),
            manifest.as_ref(),
        )
    }
}

/// Keep, per major, minors down to and including the newest minor with a stable tag
///
/// `branches` must be newest first. Bare majors are always kept.
fn prune_minors(
    branches: Vec<Branch>,
    stable_minors: &StableMinorIndex,
    dropped: &mut Vec<PlanNote>,
) -> Vec<Branch> {
    let mut with_stable_tag: HashSet<u64> = HashSet::new();
    let mut last_kept_minor: HashMap<u64, String> = HashMap::new();
    let mut kept = Vec::with_capacity(branches.len());

    for branch in branches {
        let BranchKind::Minor { major, minor } = branch.kind else {
            kept.push(branch);
            continue;
        };

        if with_stable_tag.contains(&major) {
            if let Some(by) = last_kept_minor.get(&major) {
                dropped.push(PlanNote::Superseded {
                    branch: branch.name,
                    by: by.clone(),
                });
                continue;
            }
        }

        if stable_minors.contains(major, minor) {
            with_stable_tag.insert(major);
        }
        last_kept_minor.insert(major, branch.name.clone());
        kept.push(branch);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branches(names: &[&str]) -> Vec<Branch> {
        let mut branches: Vec<Branch> = names.iter().map(|name| Branch::new(*name)).collect();
        branches.sort_by(|a, b| b.cmp(a));
        branches
    }

    fn names(branches: &[Branch]) -> Vec<&str> {
        branches.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn test_prune_keeps_newest_stable_minor() {
        let index = StableMinorIndex::from_tags(&["4.12.0", "4.13.11", "4.11.3"]);
        let mut dropped = Vec::new();
        let kept = prune_minors(branches(&["4.11", "4.12", "4.13", "4"]), &index, &mut dropped);
        assert_eq!(names(&kept), vec!["4", "4.13"]);
        assert_eq!(dropped.len(), 2);
        assert_eq!(
            dropped[0],
            PlanNote::Superseded {
                branch: "4.12".to_string(),
                by: "4.13".to_string()
            }
        );
    }

    #[test]
    fn test_prune_keeps_unreleased_minors_above_stable() {
        let index = StableMinorIndex::from_tags(&["5.0.1", "5.1.0-beta1"]);
        let mut dropped = Vec::new();
        let kept = prune_minors(branches(&["5.0", "5.1", "5.2", "5"]), &index, &mut dropped);
        assert_eq!(names(&kept), vec!["5", "5.2", "5.1", "5.0"]);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_prune_without_stable_tags_keeps_everything() {
        let index = StableMinorIndex::default();
        let mut dropped = Vec::new();
        let kept = prune_minors(branches(&["4.10", "4.11", "4"]), &index, &mut dropped);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_prune_tracks_majors_separately() {
        let index = StableMinorIndex::from_tags(&["5.1.0", "4.13.0"]);
        let mut dropped = Vec::new();
        let kept = prune_minors(
            branches(&["4.12", "4.13", "5.0", "5.1", "4", "5"]),
            &index,
            &mut dropped,
        );
        assert_eq!(names(&kept), vec!["5", "5.1", "4", "4.13"]);
        let dropped_branches: Vec<&str> = dropped.iter().map(PlanNote::branch).collect();
        assert_eq!(dropped_branches, vec!["5.0", "4.12"]);
    }

    #[test]
    fn test_plan_skipped_repository() {
        let catalog = MetadataCatalog::default();
        let config = Config::default();
        let planner = MergeUpPlanner::new(&catalog, &config);
        let plan = planner
            .plan::<&str, &str>("silverstripe/cow", None, "main", &[], &["1", "2"], None)
            .unwrap();
        assert!(plan.skipped);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_without_release_branches() {
        let catalog = MetadataCatalog::default();
        let config = Config::default();
        let planner = MergeUpPlanner::new(&catalog, &config);
        let plan = planner
            .plan::<&str, &str>("a/b", None, "main", &[], &["main", "pulls/1/fix"], None)
            .unwrap();
        assert!(plan.is_empty());
        assert!(!plan.skipped);
        assert_eq!(plan.dropped.len(), 2);
    }

    #[test]
    fn test_plan_serializes_camel_case() {
        let plan = MergeUpPlan {
            repository: "a/b".to_string(),
            branches: vec!["1".to_string()],
            skipped: false,
            dropped: vec![PlanNote::NonNumeric {
                branch: "main".to_string(),
            }],
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["repository"], "a/b");
        assert_eq!(json["dropped"][0]["reason"], "nonNumeric");
    }
}
