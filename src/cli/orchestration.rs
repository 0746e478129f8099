//! Main workflow orchestration logic
//!
//! Holds the workflows behind each `merge-up` subcommand, separated from CLI argument
//! parsing so they can be called programmatically without depending on clap.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::catalog::MetadataCatalog;
use crate::config::Config;
use crate::manifest::Manifest;
use crate::planner::{MergeUpPlan, MergeUpPlanner};
use crate::resolver::VersionResolver;
use crate::source::SnapshotSource;

/// Arguments for the plan workflow
#[derive(Debug, Clone, PartialEq)]
pub struct PlanWorkflowArgs {
    /// Catalog file overriding the configured one
    pub catalog_path: Option<String>,

    /// Repository snapshot to plan
    pub snapshot_path: String,
}

/// Arguments for the major-line lookup workflow
#[derive(Debug, Clone, PartialEq)]
pub struct MajorWorkflowArgs {
    /// Catalog file overriding the configured one
    pub catalog_path: Option<String>,

    /// `org/name` repository reference
    pub repository: String,

    /// Branch to resolve
    pub branch: String,

    /// Manifest file of the branch
    pub manifest_path: Option<String>,

    /// Also infer the line from the runtime requirement
    pub runtime_fallback: bool,

    /// Accept a catalog record of a same-named repository in another organisation
    pub partial_match: bool,
}

/// Result of a major-line lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorLineResult {
    pub repository: String,
    pub branch: String,
    pub major_line: Option<String>,
}

/// Catalog path to use: explicit argument, else the configured one
pub fn catalog_path(catalog_arg: Option<&str>, config: &Config) -> PathBuf {
    PathBuf::from(catalog_arg.unwrap_or(&config.catalog))
}

/// Load the catalog named by the argument or the configuration
pub fn load_catalog(catalog_arg: Option<&str>, config: &Config) -> Result<MetadataCatalog> {
    let path = catalog_path(catalog_arg, config);
    let catalog = MetadataCatalog::load(&path)
        .with_context(|| format!("Failed to load catalog from {}", path.display()))?;
    info!(path = %path.display(), repositories = catalog.len(), "Loaded catalog");
    Ok(catalog)
}

/// Plan workflow
///
/// 1. Load the catalog
/// 2. Read the repository snapshot
/// 3. Plan the merge-up chain
pub fn run_plan_workflow(args: &PlanWorkflowArgs, config: &Config) -> Result<MergeUpPlan> {
    let catalog = load_catalog(args.catalog_path.as_deref(), config)?;
    let source = SnapshotSource::load(&args.snapshot_path)
        .with_context(|| format!("Failed to read snapshot {}", args.snapshot_path))?;

    let planner = MergeUpPlanner::new(&catalog, config);
    let plan = planner.plan_for_source(&source)?;
    info!(
        repository = plan.repository.as_str(),
        branches = plan.branches.len(),
        "Planned merge-up"
    );
    Ok(plan)
}

/// Major-line lookup workflow
pub fn run_major_workflow(args: &MajorWorkflowArgs, config: &Config) -> Result<MajorLineResult> {
    let catalog = load_catalog(args.catalog_path.as_deref(), config)?;
    let metadata = catalog.metadata_for_repository(&args.repository, args.partial_match)?;

    let manifest = match &args.manifest_path {
        Some(path) => Some(
            Manifest::load(path).with_context(|| format!("Failed to read manifest {}", path))?,
        ),
        None => None,
    };

    let resolver = VersionResolver::new(&catalog, config);
    let major_line = resolver.major_line(
        metadata,
        &args.branch,
        manifest.as_ref(),
        args.runtime_fallback,
    );

    Ok(MajorLineResult {
        repository: args.repository.clone(),
        branch: args.branch.clone(),
        major_line,
    })
}
