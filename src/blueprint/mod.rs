//! The blueprint pipeline: clone, set the app name, install, `git init`.
//!
//! Steps run strictly one after the other. The first failure stops the run
//! and nothing already done is undone: a partially created project stays on
//! disk for inspection.

mod fetch;
mod install;
mod options;
mod rewrite;
pub mod step;
mod vcs;

use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
    sync::Arc,
};

use derive_builder::Builder;

pub use install::{workspaces, APP_WORKSPACE, PACKAGE_MANAGER};
pub use options::{BlueprintOptions, BlueprintOptionsBuilder};
pub use rewrite::{replace, rewrite_tree, RewriteSummary, APP_NAME_TOKEN, IGNORED_DIRS};

use crate::{
    error::{BlueprintError, Result},
    process::CommandRunner,
    reporter::Reporter,
    trace,
    transport::ArchiveTransport,
};

pub const SUCCESS_BANNER: &str = "🍻 Your brand spankin' new React app is ready!";
pub const FAILURE_BANNER: &str = "🙁 Sorry, there was a problem creating the React app.";

/// A runnable blueprint together with everything it talks to.
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct Blueprint {
    /// Template source identifier, as declared in the manifest.
    #[builder(setter(into))]
    source: String,
    /// Directory new projects are created in.
    #[builder(setter(into))]
    cwd: PathBuf,
    reporter: Arc<dyn Reporter>,
    transport: Arc<dyn ArchiveTransport>,
    runner: Arc<dyn CommandRunner>,
}

/// Where a run is. `Failed` is absorbing and no state is entered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Fetching,
    Rewriting,
    Installing,
    InitializingVcs,
    Done,
    Failed,
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Rewriting => "rewriting",
            Self::Installing => "installing",
            Self::InitializingVcs => "initializing vcs",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum PipelineResult {
    Success,
    Failure {
        /// State the run was in when it failed.
        stage: PipelineState,
        error: BlueprintError,
        verbose: bool,
        /// Project directory this run created and left behind, if any.
        leftover: Option<PathBuf>,
    },
}

impl PipelineResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    #[must_use]
    pub const fn failed_stage(&self) -> Option<PipelineState> {
        match self {
            Self::Success => None,
            Self::Failure { stage, .. } => Some(*stage),
        }
    }
}

impl Blueprint {
    /// Create a new [`Blueprint`] builder
    #[must_use]
    pub fn builder() -> BlueprintBuilder {
        BlueprintBuilder::default()
    }

    /// The directory `app_name` is created in. Only meaningful for names
    /// accepted by [`check_app_name`].
    #[must_use]
    pub fn target(&self, app_name: &str) -> PathBuf {
        self.cwd.join(app_name)
    }

    /// Runs the whole pipeline. Never fails: every error ends up in the
    /// returned [`PipelineResult`] and in the final banner.
    pub async fn run(&self, app_name: &str, options: &BlueprintOptions) -> PipelineResult {
        let mut state = PipelineState::Idle;

        match self.run_steps(app_name, options, &mut state).await {
            Ok(()) => {
                transition(&mut state, PipelineState::Done);
                self.reporter.done(SUCCESS_BANNER);
                PipelineResult::Success
            }
            Err(error) => {
                let stage = state;
                transition(&mut state, PipelineState::Failed);

                let diagnostics = options.verbose.then(|| cause_chain(&error));
                self.reporter.failed(FAILURE_BANNER, diagnostics.as_deref());

                let target = self.target(app_name);
                let created = !matches!(
                    error,
                    BlueprintError::DirectoryExists { .. } | BlueprintError::InvalidAppName { .. }
                );
                let leftover = (created && target.symlink_metadata().is_ok()).then_some(target);

                PipelineResult::Failure {
                    stage,
                    error,
                    verbose: options.verbose,
                    leftover,
                }
            }
        }
    }

    async fn run_steps(
        &self,
        app_name: &str,
        options: &BlueprintOptions,
        state: &mut PipelineState,
    ) -> Result<()> {
        transition(state, PipelineState::Fetching);
        self.fetch_template(app_name, options).await?;

        transition(state, PipelineState::Rewriting);
        self.rewrite_tokens(app_name, options).await?;

        transition(state, PipelineState::Installing);
        self.install_dependencies(app_name, options).await?;

        transition(state, PipelineState::InitializingVcs);
        self.init_repo(app_name, options).await
    }
}

/// Accepts `name` only if it is one plain path component, so the project
/// always lands directly inside the working directory.
///
/// # Errors
///
/// Returns [`BlueprintError::InvalidAppName`] for empty, absolute, nested,
/// `.`/`..` names and names with a trailing separator.
pub fn check_app_name(name: &str) -> Result<()> {
    if Path::new(name).file_name().is_some_and(|file| file == name) {
        Ok(())
    } else {
        Err(BlueprintError::InvalidAppName {
            name: name.to_string(),
        })
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    trace!("Pipeline: {state} -> {next}");
    *state = next;
}

/// The error followed by its chain of causes.
fn cause_chain(error: &BlueprintError) -> String {
    let mut out = format!("{error}");
    let mut source = std::error::Error::source(error);

    if source.is_some() {
        out.push_str("\n\nCaused by:");
    }
    while let Some(cause) = source {
        out.push_str(&format!("\n    {cause}"));
        source = cause.source();
    }

    out
}
