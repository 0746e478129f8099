use serde::Serialize;
use std::fmt;

/// Reasons a branch was left out of a merge-up plan.
/// These are non-fatal and are reported to the user on request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PlanNote {
    /// Branch name is neither a bare major nor `major.minor`
    NonNumeric { branch: String },
    /// Branch belongs to a platform release line that is no longer supported
    BelowLowestSupported {
        branch: String,
        platform_major: i64,
        lowest_supported: u64,
    },
    /// A newer minor of the same major has a stable release and is already kept
    Superseded { branch: String, by: String },
    /// Branch major is at or below the repository's configured floor
    BelowMergeUpFloor { branch: String, floor: u64 },
}

impl PlanNote {
    /// Branch the note is about
    pub fn branch(&self) -> &str {
        match self {
            PlanNote::NonNumeric { branch }
            | PlanNote::BelowLowestSupported { branch, .. }
            | PlanNote::Superseded { branch, .. }
            | PlanNote::BelowMergeUpFloor { branch, .. } => branch,
        }
    }
}

impl fmt::Display for PlanNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanNote::NonNumeric { branch } => {
                write!(f, "Branch '{}' is not a release branch", branch)
            }
            PlanNote::BelowLowestSupported {
                branch,
                platform_major,
                lowest_supported,
            } => write!(
                f,
                "Branch '{}' is for platform major {}, below lowest supported {}",
                branch, platform_major, lowest_supported
            ),
            PlanNote::Superseded { branch, by } => {
                write!(f, "Branch '{}' is superseded by '{}'", branch, by)
            }
            PlanNote::BelowMergeUpFloor { branch, floor } => write!(
                f,
                "Branch '{}' is at or below major {}, which is not merged up",
                branch, floor
            ),
        }
    }
}
