//! Dependency manifest of a repository branch (`composer.json` shape)

use crate::error::Result;
use serde::de::{Error as _, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The parts of a dependency manifest used for major-line inference
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_require")]
    pub require: BTreeMap<String, String>,
}

/// An empty `require` may be written as `[]`
fn deserialize_require<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Require {
        Packages(BTreeMap<String, String>),
        List(Vec<IgnoredAny>),
    }

    match Require::deserialize(deserializer)? {
        Require::Packages(packages) => Ok(packages),
        Require::List(list) if list.is_empty() => Ok(BTreeMap::new()),
        Require::List(_) => Err(D::Error::custom(
            "expected `require` to be an object of package constraints",
        )),
    }
}

impl Manifest {
    /// Create a manifest with a name and no requirements
    pub fn new(name: impl Into<String>) -> Self {
        Manifest {
            name: Some(name.into()),
            require: BTreeMap::new(),
        }
    }

    /// Add a requirement, replacing any existing constraint for the package
    pub fn with_requirement(mut self, package: impl Into<String>, constraint: impl Into<String>) -> Self {
        self.require.insert(package.into(), constraint.into());
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a manifest file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Manifest::from_json_str(&contents)
    }

    /// Constraint string required for a package, if any
    pub fn requirement(&self, package: &str) -> Option<&str> {
        self.require.get(package).map(String::as_str)
    }

    pub fn requires(&self, package: &str) -> bool {
        self.require.contains_key(package)
    }
}
