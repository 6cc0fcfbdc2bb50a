use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the individual blueprint steps.
///
/// Each variant belongs to exactly one step. The orchestrator is the only
/// place these are caught.
#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("invalid app name \"{name}\": expected a single directory name")]
    InvalidAppName { name: String },

    #[error("target directory already exists: {}", path.display())]
    DirectoryExists { path: PathBuf },

    #[error("{message}")]
    Transfer {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("failed to rewrite {}: {source}", path.display())]
    Rewrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed in {}: {detail}", workspace.display())]
    Install {
        command: String,
        workspace: PathBuf,
        detail: String,
    },

    #[error("`git init` failed: {detail}")]
    VcsInit { detail: String },
}

impl BlueprintError {
    pub fn transfer(message: impl Into<String>) -> Self {
        Self::Transfer {
            message: message.into(),
            source: None,
        }
    }

    pub fn transfer_caused_by(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transfer {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

pub type Result<T, E = BlueprintError> = std::result::Result<T, E>;
