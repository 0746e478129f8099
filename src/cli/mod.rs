//! Command-line workflows of the `merge-up` binary

pub mod orchestration;
