use crate::domain::prerelease::PreRelease;
use crate::error::{MergeUpError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Dotted numeric version with an optional pre-release suffix
///
/// Components compare numerically; a missing component counts as zero, so `5`, `5.0`
/// and `5.0.0` are equal. A stable version ranks above any pre-release sharing its
/// numbers.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
    pre: Option<PreRelease>,
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[vV]?(\d+(?:\.\d+)*)(?:[-.]?([A-Za-z][A-Za-z0-9.-]*))?$")
            .expect("version regex is valid")
    })
}

impl Version {
    /// Create a stable version from its components
    pub fn new(components: impl Into<Vec<u64>>) -> Self {
        let mut components = components.into();
        if components.is_empty() {
            components.push(0);
        }
        Version {
            components,
            pre: None,
        }
    }

    /// The lowest version there is, `0-dev`
    pub fn zero() -> Self {
        Version::new([0]).with_pre(Some(PreRelease::dev()))
    }

    /// Replace the pre-release suffix
    pub fn with_pre(mut self, pre: Option<PreRelease>) -> Self {
        self.pre = pre;
        self
    }

    /// Parse a version such as "5", "4.13", "5.1.0" or "5.1.0-beta1"
    pub fn parse(s: &str) -> Result<Self> {
        let captures = version_regex()
            .captures(s.trim())
            .ok_or_else(|| MergeUpError::version(format!("Invalid version: '{}'", s)))?;

        let components = captures[1]
            .split('.')
            .map(|part| {
                part.parse::<u64>().map_err(|_| {
                    MergeUpError::version(format!("Invalid version component: '{}'", part))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let pre = match captures.get(2).map(|m| m.as_str()) {
            None => None,
            Some(suffix) if suffix.eq_ignore_ascii_case("stable") => None,
            Some(suffix) => Some(PreRelease::parse(suffix)?),
        };

        Ok(Version { components, pre })
    }

    /// First component
    pub fn major(&self) -> u64 {
        self.components[0]
    }

    /// Component at `index`, zero when absent
    pub fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }

    /// All explicitly given components
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Pre-release suffix, if any
    pub fn pre(&self) -> Option<&PreRelease> {
        self.pre.as_ref()
    }

    pub fn is_stable(&self) -> bool {
        self.pre.is_none()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            match self.component(i).cmp(&other.component(i)) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }

        match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = MergeUpError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", numbers.join("."))?;
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}
