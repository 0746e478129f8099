//! Pre-release suffix handling for release tags and version constraints
//!
//! Supports the stability identifiers found on module tags (`dev`, `alpha`, `beta`, `rc`
//! and custom) with an optional iteration number, written either as `beta1` or `beta.1`.
//! Precedence runs custom < dev < alpha < beta < rc; every pre-release ranks below the
//! stable release with the same numbers.

use crate::error::{MergeUpError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Pre-release identifier type, ordered from least to most stable
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreReleaseType {
    /// Unknown identifier, ranks below every known stability
    Custom(String),
    /// Development snapshot (branch aliases and constraint floors)
    Dev,
    /// Alpha pre-release
    Alpha,
    /// Beta pre-release
    Beta,
    /// Release candidate
    ReleaseCandidate,
}

impl PreReleaseType {
    /// Parse a pre-release type from a string
    ///
    /// Accepts: "dev", "alpha", "a", "beta", "b", "rc", or any custom alphanumeric-hyphen string
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl FromStr for PreReleaseType {
    type Err = MergeUpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(PreReleaseType::Dev),
            "alpha" | "a" => Ok(PreReleaseType::Alpha),
            "beta" | "b" => Ok(PreReleaseType::Beta),
            "rc" => Ok(PreReleaseType::ReleaseCandidate),
            other => {
                if !other.is_empty() && other.chars().all(|c| c.is_alphanumeric() || c == '-') {
                    Ok(PreReleaseType::Custom(other.to_string()))
                } else {
                    Err(MergeUpError::version(format!(
                        "Invalid pre-release identifier: '{}'",
                        s
                    )))
                }
            }
        }
    }
}

impl fmt::Display for PreReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreReleaseType::Custom(s) => write!(f, "{}", s),
            PreReleaseType::Dev => write!(f, "dev"),
            PreReleaseType::Alpha => write!(f, "alpha"),
            PreReleaseType::Beta => write!(f, "beta"),
            PreReleaseType::ReleaseCandidate => write!(f, "rc"),
        }
    }
}

/// Pre-release suffix with optional iteration number
///
/// # Examples
/// - "alpha" -> PreRelease { identifier: Alpha, iteration: None }
/// - "beta1" -> PreRelease { identifier: Beta, iteration: Some(1) }
/// - "rc.3" -> PreRelease { identifier: ReleaseCandidate, iteration: Some(3) }
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PreRelease {
    /// The pre-release identifier
    pub identifier: PreReleaseType,
    /// Optional iteration number; a missing iteration ranks below any number
    pub iteration: Option<u64>,
}

fn pre_release_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z][A-Za-z-]*?)[.-]?(\d+)?$").expect("pre-release regex is valid")
    })
}

impl PreRelease {
    /// Create a new pre-release suffix
    pub fn new(identifier: PreReleaseType, iteration: Option<u64>) -> Self {
        PreRelease {
            identifier,
            iteration,
        }
    }

    /// The `dev` stability suffix, used for inclusive constraint floors
    pub fn dev() -> Self {
        PreRelease::new(PreReleaseType::Dev, None)
    }

    /// Parse a pre-release suffix from a string
    ///
    /// Accepts formats like "beta", "beta1", "beta.1", "RC2" or "custom-id.5"
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(MergeUpError::version("Empty pre-release identifier"));
        }

        let captures = pre_release_regex().captures(s).ok_or_else(|| {
            MergeUpError::version(format!("Invalid pre-release identifier: '{}'", s))
        })?;

        let identifier = PreReleaseType::parse(&captures[1])?;
        let iteration = match captures.get(2) {
            Some(m) => Some(m.as_str().parse::<u64>().map_err(|_| {
                MergeUpError::version(format!("Invalid iteration number: '{}'", m.as_str()))
            })?),
            None => None,
        };

        Ok(PreRelease {
            identifier,
            iteration,
        })
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)?;
        if let Some(iter) = self.iteration {
            write!(f, "{}", iter)?;
        }
        Ok(())
    }
}
