use super::{step, Blueprint, BlueprintOptions};
use crate::error::{BlueprintError, Result};

impl Blueprint {
    /// Runs `git init` at the project root unless skipped. A skipped init
    /// reports nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::VcsInit`] if git can not start or fails.
    pub async fn init_repo(&self, app_name: &str, options: &BlueprintOptions) -> Result<()> {
        if options.skip_vcs_init {
            return Ok(());
        }

        let dir = self.target(app_name);
        let dir = dir.as_path();

        step::run_step(self.reporter.as_ref(), &step::GIT_INIT, || async move {
            let output = self
                .runner
                .run("git", &["init"], dir)
                .await
                .map_err(|e| BlueprintError::VcsInit {
                    detail: e.to_string(),
                })?;

            if output.success {
                Ok(())
            } else {
                Err(BlueprintError::VcsInit {
                    detail: format!("{}: {}", output.describe_status(), output.tail(5)),
                })
            }
        })
        .await
    }
}
