//! Placeholder substitution over a project tree.
//!
//! Substitution is literal. Running it twice with the same name changes
//! nothing the second time as long as the name does not itself contain
//! [`APP_NAME_TOKEN`]; that is assumed, not checked.

use std::{
    fs,
    path::{Path, PathBuf},
};

use walkdir::{DirEntry, WalkDir};

use super::{step, Blueprint, BlueprintOptions};
use crate::{
    error::{BlueprintError, Result},
    trace,
};

pub const APP_NAME_TOKEN: &str = "{{APP_NAME}}";

/// Directories never descended into.
pub const IGNORED_DIRS: [&str; 3] = ["node_modules", ".git", ".yarn"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    pub scanned: usize,
    pub changed: usize,
    pub replacements: usize,
}

/// Replaces every `from` in `source` with `to`.
///
/// Returns [`None`] when `source` has no occurrence, so callers can skip the
/// write.
#[must_use]
pub fn replace(source: &[u8], from: &[u8], to: &[u8]) -> Option<(Vec<u8>, usize)> {
    if from.is_empty() || source.len() < from.len() {
        return None;
    }

    let mut result = Vec::with_capacity(source.len());
    let mut count = 0;
    let mut i = 0;

    while i < source.len() {
        if source[i..].starts_with(from) {
            result.extend_from_slice(to);
            i += from.len();
            count += 1;
        } else {
            result.push(source[i]);
            i += 1;
        }
    }

    (count > 0).then_some((result, count))
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
}

/// Rewrites every regular file below `root`, dotfiles included.
///
/// Symlinks are not followed.
///
/// # Errors
///
/// Returns [`BlueprintError::Rewrite`] on the first file that can not be
/// walked, read or written.
pub fn rewrite_tree(root: &Path, token: &str, value: &str) -> Result<RewriteSummary> {
    let mut summary = RewriteSummary::default();

    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !is_ignored(e)) {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            BlueprintError::Rewrite {
                path,
                source: e.into(),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        summary.scanned += 1;
        let path = entry.path();
        let contents = fs::read(path).map_err(rewrite_error(path))?;

        if let Some((rewritten, count)) = replace(&contents, token.as_bytes(), value.as_bytes()) {
            fs::write(path, rewritten).map_err(rewrite_error(path))?;
            trace!("Replaced {count} occurrence(s) in {}", path.display());
            summary.changed += 1;
            summary.replacements += count;
        }
    }

    Ok(summary)
}

fn rewrite_error(path: &Path) -> impl FnOnce(std::io::Error) -> BlueprintError {
    let path = PathBuf::from(path);
    move |source| BlueprintError::Rewrite { path, source }
}

impl Blueprint {
    /// Replaces [`APP_NAME_TOKEN`] with `app_name` everywhere in the project.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::Rewrite`] on the first file that can not be
    /// read or written.
    pub async fn rewrite_tokens(
        &self,
        app_name: &str,
        _options: &BlueprintOptions,
    ) -> Result<RewriteSummary> {
        let dir = self.target(app_name);
        let dir = dir.as_path();

        step::run_step(self.reporter.as_ref(), &step::SET_APP_NAME, || async move {
            let root = dir.to_path_buf();
            let value = app_name.to_string();

            let summary = tokio::task::spawn_blocking(move || {
                rewrite_tree(&root, APP_NAME_TOKEN, &value)
            })
            .await
            .map_err(|e| BlueprintError::Rewrite {
                path: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            })??;

            trace!(
                "Scanned {} files, rewrote {} ({} replacements)",
                summary.scanned,
                summary.changed,
                summary.replacements
            );
            Ok(summary)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn read(root: &Path, relative: &str) -> String {
        fs::read_to_string(root.join(relative)).unwrap()
    }

    #[test]
    fn replace_counts_every_occurrence() {
        let (out, count) = replace(b"a {{X}} b {{X}}", b"{{X}}", b"demo").unwrap();

        assert_eq!(out, b"a demo b demo");
        assert_eq!(count, 2);
        assert_eq!(replace(b"nothing here", b"{{X}}", b"demo"), None);
        assert_eq!(replace(b"abc", b"", b"demo"), None);
    }

    #[test]
    fn rewrites_dotfiles_and_nested_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "package.json", r#"{"name": "{{APP_NAME}}"}"#);
        write(root, ".env", "APP={{APP_NAME}}");
        write(root, "app/src/title.txt", "{{APP_NAME}} / {{APP_NAME}}");
        write(root, "README.md", "no token");

        let summary = rewrite_tree(root, APP_NAME_TOKEN, "demo-app").unwrap();

        assert_eq!(read(root, "package.json"), r#"{"name": "demo-app"}"#);
        assert_eq!(read(root, ".env"), "APP=demo-app");
        assert_eq!(read(root, "app/src/title.txt"), "demo-app / demo-app");
        assert_eq!(
            summary,
            RewriteSummary {
                scanned: 4,
                changed: 3,
                replacements: 4,
            }
        );
    }

    #[test]
    fn skips_dependency_and_vcs_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        for dir in IGNORED_DIRS {
            write(root, &format!("{dir}/file"), "{{APP_NAME}}");
        }
        write(root, "app/node_modules/pkg/index.js", "{{APP_NAME}}");

        let summary = rewrite_tree(root, APP_NAME_TOKEN, "demo-app").unwrap();

        assert_eq!(summary.scanned, 0);
        for dir in IGNORED_DIRS {
            assert_eq!(read(root, &format!("{dir}/file")), "{{APP_NAME}}");
        }
        assert_eq!(read(root, "app/node_modules/pkg/index.js"), "{{APP_NAME}}");
    }

    #[test]
    fn second_run_changes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "index.html", "<title>{{APP_NAME}}</title>");

        rewrite_tree(root, APP_NAME_TOKEN, "demo-app").unwrap();
        let first = read(root, "index.html");
        let summary = rewrite_tree(root, APP_NAME_TOKEN, "demo-app").unwrap();

        assert_eq!(summary.changed, 0);
        assert_eq!(read(root, "index.html"), first);
    }

    #[test]
    fn binary_files_are_handled_as_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let mut bytes = vec![0xff, 0x00, 0xfe];
        bytes.extend_from_slice(APP_NAME_TOKEN.as_bytes());
        fs::write(root.join("blob.bin"), &bytes).unwrap();

        rewrite_tree(root, APP_NAME_TOKEN, "x").unwrap();

        assert_eq!(fs::read(root.join("blob.bin")).unwrap(), vec![0xff, 0x00, 0xfe, b'x']);
    }
}
