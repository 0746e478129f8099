//! Shared helpers for integration tests
#![allow(dead_code)]

use merge_up::{Config, Manifest, MetadataCatalog};
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The fixture catalog under tests/fixtures
pub fn catalog() -> MetadataCatalog {
    MetadataCatalog::load(fixture_path("repositories.json")).expect("fixture catalog loads")
}

pub fn config() -> Config {
    Config::default()
}

/// Manifest requiring each `(package, constraint)` pair
pub fn manifest(requirements: &[(&str, &str)]) -> Manifest {
    requirements
        .iter()
        .fold(Manifest::default(), |manifest, (package, constraint)| {
            manifest.with_requirement(*package, *constraint)
        })
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
