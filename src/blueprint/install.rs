use std::path::{Path, PathBuf};

use super::{step, Blueprint, BlueprintOptions};
use crate::error::{BlueprintError, Result};

pub const PACKAGE_MANAGER: &str = "yarn";

/// Sub-workspace installed after the project root.
pub const APP_WORKSPACE: &str = "app";

/// Lines of installer output kept in an error.
const ERROR_TAIL: usize = 20;

/// Workspaces to install, in order. The root comes first because the
/// sub-workspace relies on what it hoists.
#[must_use]
pub fn workspaces(root: &Path) -> [PathBuf; 2] {
    [root.to_path_buf(), root.join(APP_WORKSPACE)]
}

impl Blueprint {
    /// Runs `yarn install` in every workspace, one after the other. Does
    /// nothing, and reports nothing, when installs are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::Install`] for the first workspace whose
    /// install can not start or exits unsuccessfully.
    pub async fn install_dependencies(&self, app_name: &str, options: &BlueprintOptions) -> Result<()> {
        if options.skip_dependency_install {
            return Ok(());
        }

        let root = self.target(app_name);
        let root = root.as_path();

        step::run_step(self.reporter.as_ref(), &step::INSTALL, || async move {
            for workspace in workspaces(root) {
                self.install_in(&workspace).await?;
            }
            Ok(())
        })
        .await
    }

    async fn install_in(&self, workspace: &Path) -> Result<()> {
        let command = format!("{PACKAGE_MANAGER} install");
        let failed = |detail: String| BlueprintError::Install {
            command: command.clone(),
            workspace: workspace.to_path_buf(),
            detail,
        };

        let output = self
            .runner
            .run(PACKAGE_MANAGER, &["install"], workspace)
            .await
            .map_err(|e| failed(e.to_string()))?;

        if output.success {
            Ok(())
        } else {
            Err(failed(format!("{}\n{}", output.describe_status(), output.tail(ERROR_TAIL))
                .trim_end()
                .to_string()))
        }
    }
}
