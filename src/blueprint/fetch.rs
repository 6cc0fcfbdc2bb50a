use std::path::Path;

use super::{step, Blueprint, BlueprintOptions};
use crate::{
    error::{BlueprintError, Result},
    source::SourceRef,
    trace,
};

impl Blueprint {
    /// Resolves the template reference for this run: the manifest source, at
    /// `options.template_ref` when one was asked for.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::Transfer`] if the manifest source can not be
    /// parsed.
    pub fn resolve_source(&self, options: &BlueprintOptions) -> Result<SourceRef> {
        let source = SourceRef::parse(&self.source)?;

        Ok(match &options.template_ref {
            Some(reference) => source.with_reference(reference.as_str()),
            None => source,
        })
    }

    /// Downloads the template into the project target.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::InvalidAppName`] or
    /// [`BlueprintError::DirectoryExists`] before touching the network, and
    /// [`BlueprintError::Transfer`] if the download fails.
    pub async fn fetch_template(&self, app_name: &str, options: &BlueprintOptions) -> Result<()> {
        let dir = self.target(app_name);
        let dir = dir.as_path();

        step::run_step(self.reporter.as_ref(), &step::CLONE, || async move {
            super::check_app_name(app_name)?;
            ensure_absent(dir)?;

            let source = self.resolve_source(options)?;
            trace!("Cloning {source} into {}", dir.display());

            let on_info = |message: &str| {
                if options.verbose {
                    self.reporter.info(message);
                }
            };

            self.transport.fetch(&source, dir, &on_info).await
        })
        .await
    }
}

fn ensure_absent(dir: &Path) -> Result<()> {
    // `symlink_metadata` so a dangling link still counts as taken.
    if dir.symlink_metadata().is_ok() {
        return Err(BlueprintError::DirectoryExists {
            path: dir.to_path_buf(),
        });
    }

    Ok(())
}
