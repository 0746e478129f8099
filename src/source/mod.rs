//! Repository input abstraction layer
//!
//! The planner works on plain lists of branch and tag names plus an optional
//! dependency manifest. Whatever obtains those (a source-control API client, a CI job
//! dumping a snapshot, a test) implements [RepositorySource].
//!
//! - [snapshot::SnapshotSource]: reads a JSON snapshot file
//! - [mock::MockSource]: in-memory source for tests
//!
//! ```rust
//! # use merge_up::source::{MockSource, RepositorySource};
//! let source = MockSource::new("silverstripe/silverstripe-admin")
//!     .with_default_branch("2")
//!     .with_branches(["1", "2", "2.1"]);
//! assert_eq!(source.list_branches().unwrap().len(), 3);
//! ```

pub mod mock;
pub mod snapshot;

pub use mock::MockSource;
pub use snapshot::{RepositorySnapshot, SnapshotSource};

use crate::error::Result;
use crate::manifest::Manifest;

/// Read-only view of one repository's branches, tags and manifest
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync` to allow safe sharing across threads.
///
/// ## Error Handling
///
/// Implementations map their underlying failures to [crate::error::MergeUpError]
/// variants. Returned lists are owned copies; the planner never mutates a source.
pub trait RepositorySource: Send + Sync {
    /// `org/name` reference of the repository
    fn repository(&self) -> &str;

    /// Name of the default branch
    fn default_branch(&self) -> Result<String>;

    /// Every branch name, in any order
    fn list_branches(&self) -> Result<Vec<String>>;

    /// Every tag name, in any order
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Dependency manifest of the default branch, if the repository has one
    fn manifest(&self) -> Result<Option<Manifest>>;
}
