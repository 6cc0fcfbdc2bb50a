//! Scaffold new projects from remote blueprints.
//!
//! A [`blueprint::Blueprint`] clones a template, stamps the application name
//! into it, installs its dependencies and initializes a git repository,
//! reporting each step through a [`reporter::Reporter`].

pub mod log;

pub mod args;
pub mod blueprint;
pub mod config;
pub mod error;
pub mod process;
pub mod reporter;
pub mod source;
pub mod transport;
pub mod version;

pub use blueprint::{Blueprint, BlueprintOptions, PipelineResult, PipelineState};
pub use error::BlueprintError;
