pub use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use crate::{
    blueprint::{check_app_name, BlueprintOptions},
    error::BlueprintError,
};

pub const USAGE_BANNER: &str = "Hi, I'm Gavin! 👋\nUsage: gavin [command] [options]";

#[derive(Parser, Debug)]
#[command(
    name = "gavin",
    version,
    before_help = USAGE_BANNER,
    override_usage = "gavin [command] [options]",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Run with verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Args {
    /// Parses the process arguments, reporting `version` for `--version`.
    #[must_use]
    pub fn parse_with_version(version: &str) -> Self {
        Self::try_parse_with_version(std::env::args_os(), version).unwrap_or_else(|e| e.exit())
    }

    /// # Errors
    ///
    /// Returns the [`clap::Error`] for invalid arguments, `--help` and
    /// `--version`.
    pub fn try_parse_with_version<I, T>(args: I, version: &str) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut matches = Self::command()
            .version(version.to_string())
            .try_get_matches_from(args)?;
        Self::from_arg_matches_mut(&mut matches)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project from a blueprint
    Create {
        #[command(subcommand)]
        blueprint: Blueprints,
    },
}

#[derive(Subcommand, Debug)]
pub enum Blueprints {
    /// Create a new React application
    ReactApp {
        /// The internal name of the application
        #[arg(value_name = "app-name", value_parser = parse_app_name)]
        app_name: String,

        /// Don't install yarn dependencies
        #[arg(long)]
        skip_yarn: bool,

        /// Don't initialize a new git repository
        #[arg(long)]
        skip_git: bool,

        /// A tag, branch, or commit to use when cloning the blueprint repo
        #[arg(long, value_name = "REF")]
        git_tag: Option<String>,
    },
}

fn parse_app_name(name: &str) -> Result<String, BlueprintError> {
    check_app_name(name)?;
    Ok(name.to_string())
}

impl Blueprints {
    /// Manifest key of the blueprint.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReactApp { .. } => "react-app",
        }
    }

    #[must_use]
    pub fn app_name(&self) -> &str {
        match self {
            Self::ReactApp { app_name, .. } => app_name,
        }
    }

    #[must_use]
    pub fn options(&self, verbose: bool) -> BlueprintOptions {
        match self {
            Self::ReactApp {
                skip_yarn,
                skip_git,
                git_tag,
                ..
            } => BlueprintOptions {
                skip_dependency_install: *skip_yarn,
                skip_vcs_init: *skip_git,
                template_ref: git_tag.clone(),
                verbose,
            },
        }
    }
}
