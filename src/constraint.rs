//! Dependency version constraints as written in module manifests
//!
//! Supports the constraint grammar used by manifest `require` entries:
//! - exact versions (`5.1.2`) and comparison operators (`>=4.1`, `<6`, `!=5.0.1`)
//! - caret (`^5.1`), tilde (`~1.2`) and wildcard (`5.*`, `5.1.x`) ranges
//! - hyphen ranges (`1.0 - 2.0`)
//! - branch aliases (`5.x-dev`, `5.0.x-dev`) and dev branches (`dev-main`)
//! - AND (space or comma separated) and OR (`||`) composition
//! - `@stability` flags and inline aliases (`dev-main as 5.x-dev`), which are ignored
//!
//! Inclusive floors and exclusive ceilings are placed at the `-dev` end of the version
//! so that pre-releases of the floor are admitted and pre-releases of the ceiling are not.

use crate::domain::{PreRelease, Version};
use crate::error::{MergeUpError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Number used for the open-ended components of a branch alias such as `5.x-dev`
const BRANCH_ALIAS_COMPONENT: u64 = 9_999_999;

/// Comparison operator of a single version comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    Greater,
    GreaterEq,
    Less,
    LessEq,
}

impl Operator {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "" | "=" | "==" => Some(Operator::Equal),
            "!=" | "<>" => Some(Operator::NotEqual),
            ">" => Some(Operator::Greater),
            ">=" => Some(Operator::GreaterEq),
            "<" => Some(Operator::Less),
            "<=" => Some(Operator::LessEq),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Greater => ">",
            Operator::GreaterEq => ">=",
            Operator::Less => "<",
            Operator::LessEq => "<=",
        };
        write!(f, "{}", symbol)
    }
}

/// One primitive condition; every range form is expanded into these
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparator {
    /// Matches every version
    Any,
    /// A named dev branch such as `dev-main`; matches no numbered version
    Branch(String),
    /// Compare against a version
    Version { op: Operator, version: Version },
}

impl Comparator {
    fn version(op: Operator, version: Version) -> Self {
        Comparator::Version { op, version }
    }

    /// Check if a version satisfies this comparator
    pub fn matches(&self, candidate: &Version) -> bool {
        match self {
            Comparator::Any => true,
            Comparator::Branch(_) => false,
            Comparator::Version { op, version } => match op {
                Operator::Equal => candidate == version,
                Operator::NotEqual => candidate != version,
                Operator::Greater => candidate > version,
                Operator::GreaterEq => candidate >= version,
                Operator::Less => candidate < version,
                Operator::LessEq => candidate <= version,
            },
        }
    }

    /// Lowest version this comparator admits; `Version::zero()` when there is no floor
    pub fn lower_bound(&self) -> Version {
        match self {
            Comparator::Version {
                op: Operator::Equal | Operator::Greater | Operator::GreaterEq,
                version,
            } => version.clone(),
            _ => Version::zero(),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Any => write!(f, "*"),
            Comparator::Branch(name) => write!(f, "{}", name),
            Comparator::Version { op, version } => write!(f, "{} {}", op, version),
        }
    }
}

/// A parsed constraint: OR of alternatives, each an AND of comparators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    raw: String,
    alternatives: Vec<Vec<Comparator>>,
}

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("constraint regex is valid"))
        }
    };
}

cached_regex!(alias_regex, r"^(\S+)\s+as\s+\S+$");
cached_regex!(or_regex, r"\s*\|\|?\s*");
cached_regex!(hyphen_regex, r"^(\S+)\s+-\s+(\S+)$");
cached_regex!(operator_space_regex, r"(<>|!=|[<>]=?|==?|\^|~>?)\s+");
cached_regex!(and_regex, r"[\s,]+");
cached_regex!(any_regex, r"^[vV]?[xX*](?:\.[xX*])*$");
cached_regex!(
    branch_alias_regex,
    r"^[vV]?(\d+(?:\.\d+)*(?:\.[xX*])+)[.-]?(?i:dev)$"
);
cached_regex!(
    wildcard_regex,
    r"^[vV]?(\d+)(?:\.(\d+))?(?:\.(\d+))?\.[xX*]$"
);
cached_regex!(operator_regex, r"^(<>|!=|>=|<=|>|<|==|=)?(.+)$");

impl Constraint {
    /// Parse a constraint string
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(MergeUpError::constraint("Empty constraint"));
        }

        let unaliased = match alias_regex().captures(raw) {
            Some(captures) => captures[1].to_string(),
            None => raw.to_string(),
        };

        let alternatives = or_regex()
            .split(&unaliased)
            .map(parse_alternative)
            .collect::<Result<Vec<_>>>()?;

        Ok(Constraint {
            raw: raw.to_string(),
            alternatives,
        })
    }

    /// Check if a version satisfies any alternative
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|alternative| alternative.iter().all(|c| c.matches(version)))
    }

    /// Lowest version admitted by the constraint
    ///
    /// The floor of an AND is its highest comparator floor; the floor of an OR is its
    /// lowest alternative floor.
    pub fn lower_bound(&self) -> Version {
        self.alternatives
            .iter()
            .map(|alternative| {
                alternative
                    .iter()
                    .map(Comparator::lower_bound)
                    .max()
                    .unwrap_or_else(Version::zero)
            })
            .min()
            .unwrap_or_else(Version::zero)
    }
}

impl FromStr for Constraint {
    type Err = MergeUpError;

    fn from_str(s: &str) -> Result<Self> {
        Constraint::parse(s)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn parse_alternative(alternative: &str) -> Result<Vec<Comparator>> {
    let alternative = alternative.trim();
    if alternative.is_empty() {
        return Err(MergeUpError::constraint("Empty alternative in constraint"));
    }

    if let Some(captures) = hyphen_regex().captures(alternative) {
        return parse_hyphen_range(&captures[1], &captures[2]);
    }

    let collapsed = operator_space_regex().replace_all(alternative, "${1}");
    let mut comparators = Vec::new();
    for token in and_regex().split(&collapsed).filter(|t| !t.is_empty()) {
        comparators.extend(parse_atom(token)?);
    }
    Ok(comparators)
}

fn parse_atom(token: &str) -> Result<Vec<Comparator>> {
    // Stability flags only widen what the solver may install; they do not move bounds
    let token = match token.find('@') {
        Some(index) => &token[..index],
        None => token,
    };

    if token.is_empty() || any_regex().is_match(token) {
        return Ok(vec![Comparator::Any]);
    }

    if token.len() > 4 && token.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("dev-")) {
        return Ok(vec![Comparator::Branch(token.to_string())]);
    }

    if let Some(captures) = branch_alias_regex().captures(token) {
        let mut components: Vec<u64> = captures[1]
            .split('.')
            .map(|part| part.parse::<u64>().unwrap_or(BRANCH_ALIAS_COMPONENT))
            .collect();
        while components.len() < 4 {
            components.push(BRANCH_ALIAS_COMPONENT);
        }
        let version = Version::new(components).with_pre(Some(PreRelease::dev()));
        return Ok(vec![Comparator::version(Operator::Equal, version)]);
    }

    if let Some(captures) = wildcard_regex().captures(token) {
        let components = captures
            .iter()
            .skip(1)
            .flatten()
            .map(|m| parse_component(m.as_str()))
            .collect::<Result<Vec<_>>>()?;
        return range(floor(Version::new(components.clone())), &components, components.len() - 1);
    }

    if let Some(rest) = token.strip_prefix('~') {
        let version = parse_version(rest.trim_start_matches('>'), token)?;
        let given = version.components().len().min(4);
        let position = given.saturating_sub(1).max(1) - 1;
        let components = version.components().to_vec();
        return range(floor(version), &components, position);
    }

    if let Some(rest) = token.strip_prefix('^') {
        let version = parse_version(rest, token)?;
        let given = version.components().len();
        let position = if version.component(0) != 0 || given == 1 {
            0
        } else if version.component(1) != 0 || given == 2 {
            1
        } else {
            2
        };
        let components = version.components().to_vec();
        return range(floor(version), &components, position);
    }

    let captures = operator_regex()
        .captures(token)
        .ok_or_else(|| MergeUpError::constraint(format!("Invalid constraint: '{}'", token)))?;
    let op = Operator::parse(captures.get(1).map_or("", |m| m.as_str()))
        .ok_or_else(|| MergeUpError::constraint(format!("Invalid operator in '{}'", token)))?;
    let version = parse_version(&captures[2], token)?;
    let version = match op {
        Operator::GreaterEq | Operator::Less => floor(version),
        _ => version,
    };
    Ok(vec![Comparator::version(op, version)])
}

fn parse_hyphen_range(from: &str, to: &str) -> Result<Vec<Comparator>> {
    let lower = floor(parse_version(from, from)?);
    let upper = parse_version(to, to)?;
    let given = upper.components().len();
    let ceiling = if given < 3 {
        Comparator::version(Operator::Less, increment(upper.components(), given - 1)?)
    } else {
        Comparator::version(Operator::LessEq, upper)
    };
    Ok(vec![Comparator::version(Operator::GreaterEq, lower), ceiling])
}

/// `>= lower, < components with the one at position bumped`
fn range(lower: Version, components: &[u64], position: usize) -> Result<Vec<Comparator>> {
    Ok(vec![
        Comparator::version(Operator::GreaterEq, lower),
        Comparator::version(Operator::Less, increment(components, position)?),
    ])
}

fn increment(components: &[u64], position: usize) -> Result<Version> {
    let mut bumped: Vec<u64> = (0..=position)
        .map(|i| components.get(i).copied().unwrap_or(0))
        .collect();
    bumped[position] = bumped[position].checked_add(1).ok_or_else(|| {
        MergeUpError::constraint(format!(
            "Version component {} is too large to bound",
            bumped[position]
        ))
    })?;
    Ok(Version::new(bumped).with_pre(Some(PreRelease::dev())))
}

/// Moves an unqualified version to the dev end so its own pre-releases are admitted
fn floor(version: Version) -> Version {
    if version.is_stable() {
        version.with_pre(Some(PreRelease::dev()))
    } else {
        version
    }
}

fn parse_version(s: &str, token: &str) -> Result<Version> {
    Version::parse(s).map_err(|_| {
        MergeUpError::constraint(format!("Invalid version '{}' in constraint '{}'", s, token))
    })
}

fn parse_component(s: &str) -> Result<u64> {
    s.parse::<u64>()
        .map_err(|_| MergeUpError::constraint(format!("Invalid version component: '{}'", s)))
}
