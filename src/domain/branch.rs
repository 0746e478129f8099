use crate::domain::version::Version;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Shape of a branch name as far as release lines are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    /// Bare major branch such as "5"
    Major(u64),
    /// Minor branch such as "5.1"
    Minor { major: u64, minor: u64 },
    /// Anything else: "main", "pulls/5/fix", ...
    Other,
}

/// A source-control branch with its parsed release-line shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub kind: BranchKind,
}

fn numeric_branch_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)(?:\.(\d+))?$").expect("branch regex is valid"))
}

impl Branch {
    /// Create a branch, classifying its name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = numeric_branch_regex()
            .captures(&name)
            .and_then(|captures| {
                let major = captures[1].parse::<u64>().ok()?;
                match captures.get(2) {
                    Some(minor) => Some(BranchKind::Minor {
                        major,
                        minor: minor.as_str().parse::<u64>().ok()?,
                    }),
                    None => Some(BranchKind::Major(major)),
                }
            })
            .unwrap_or(BranchKind::Other);

        Branch { name, kind }
    }

    /// Whether this branch takes part in merge-up planning
    pub fn is_numeric(&self) -> bool {
        !matches!(self.kind, BranchKind::Other)
    }

    pub fn is_major_only(&self) -> bool {
        matches!(self.kind, BranchKind::Major(_))
    }

    /// Major component of a numeric branch
    pub fn major(&self) -> Option<u64> {
        match self.kind {
            BranchKind::Major(major) | BranchKind::Minor { major, .. } => Some(major),
            BranchKind::Other => None,
        }
    }

    /// The branch name read as a version ("5" -> 5, "5.1" -> 5.1)
    pub fn version(&self) -> Option<Version> {
        match self.kind {
            BranchKind::Major(major) => Some(Version::new([major])),
            BranchKind::Minor { major, minor } => Some(Version::new([major, minor])),
            BranchKind::Other => None,
        }
    }

    /// Sort key where a bare major sits after every minor of the same major
    fn merge_up_key(&self) -> Option<(u64, u64)> {
        match self.kind {
            BranchKind::Major(major) => Some((major, u64::MAX)),
            BranchKind::Minor { major, minor } => Some((major, minor)),
            BranchKind::Other => None,
        }
    }
}

/// Merge-up order: non-numeric branches first, then numeric branches oldest to newest
impl Ord for Branch {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.merge_up_key(), other.merge_up_key()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.name.cmp(&other.name)),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => self.name.cmp(&other.name),
        }
    }
}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
