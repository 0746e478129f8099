use crate::domain::version::Version;
use crate::error::Result;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Represents a release tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

fn stable_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").expect("tag regex is valid"))
}

impl Tag {
    /// Create a new tag from a string
    pub fn new(name: impl Into<String>) -> Self {
        Tag { name: name.into() }
    }

    /// Parse the tag name as a version
    pub fn version(&self) -> Result<Version> {
        Version::parse(&self.name)
    }

    /// `(major, minor)` for a tag written exactly as `major.minor.patch`
    pub fn stable_minor(&self) -> Option<(u64, u64)> {
        let captures = stable_tag_regex().captures(&self.name)?;
        let major = captures[1].parse::<u64>().ok()?;
        let minor = captures[2].parse::<u64>().ok()?;
        Some((major, minor))
    }

    pub fn is_stable(&self) -> bool {
        self.stable_minor().is_some()
    }
}

/// Minors that have at least one stable tag, grouped by major
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StableMinorIndex {
    minors: BTreeMap<u64, BTreeSet<u64>>,
}

impl StableMinorIndex {
    /// Build the index from raw tag names; pre-release and malformed tags are ignored
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        let mut minors: BTreeMap<u64, BTreeSet<u64>> = BTreeMap::new();
        for tag in tags {
            if let Some((major, minor)) = Tag::new(tag.as_ref()).stable_minor() {
                minors.entry(major).or_default().insert(minor);
            }
        }
        StableMinorIndex { minors }
    }

    pub fn contains(&self, major: u64, minor: u64) -> bool {
        self.minors
            .get(&major)
            .is_some_and(|minors| minors.contains(&minor))
    }

    pub fn is_empty(&self) -> bool {
        self.minors.is_empty()
    }
}
