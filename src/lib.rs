//! SoulHarness library
//!
//! Configuration, diagnostics sinks and the CLI, exposed for integration testing

pub mod cli;
pub mod config;
pub mod diagnostics;

pub use config::{HarnessConfig, LoadedConfig};
pub use diagnostics::{ArtifactDirSink, TracingSink};
