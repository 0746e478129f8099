//! Domain logic - pure value types for versions, branches and tags

pub mod branch;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::{Branch, BranchKind};
pub use prerelease::{PreRelease, PreReleaseType};
pub use tag::{StableMinorIndex, Tag};
pub use version::Version;
