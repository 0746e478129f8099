pub mod boundary;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constraint;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod planner;
pub mod resolver;
pub mod source;
pub mod ui;

pub use catalog::{MajorVersionMapping, MetadataCatalog, RepositoryMetadata};
pub use config::Config;
pub use error::{MergeUpError, Result};
pub use manifest::Manifest;
pub use planner::{MergeUpPlan, MergeUpPlanner};
pub use resolver::VersionResolver;
