//! Downloading template archives.

use std::{
    fs,
    io::{self, Cursor},
    path::{Component, Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use fs_extra::dir::CopyOptions;
use zip::ZipArchive;

use crate::{
    error::{BlueprintError, Result},
    source::SourceRef,
    trace,
};

/// Directory inside the destination where an archive is unpacked before its
/// contents are moved into place.
pub const STAGING_DIR: &str = ".gavin-download";

const FILE_TYPE_MASK: u32 = 0o170_000;
const SYMLINK_TYPE: u32 = 0o120_000;

/// Something that can materialize a [`SourceRef`] into a directory.
#[async_trait]
pub trait ArchiveTransport: Send + Sync {
    /// Writes the contents of `source` into `dest`, creating it.
    ///
    /// Informational messages about the transfer are handed to `on_info`.
    async fn fetch(
        &self,
        source: &SourceRef,
        dest: &Path,
        on_info: &(dyn for<'m> Fn(&'m str) + Send + Sync),
    ) -> Result<()>;
}

/// Fetches `.zip` snapshots over HTTPS. Nothing is cached between runs.
pub struct HttpArchive {
    client: reqwest::Client,
}

impl HttpArchive {
    /// # Errors
    ///
    /// Returns [`BlueprintError::Transfer`] if the HTTP client can not be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gavin/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BlueprintError::transfer_caused_by("could not create HTTP client", e))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ArchiveTransport for HttpArchive {
    async fn fetch(
        &self,
        source: &SourceRef,
        dest: &Path,
        on_info: &(dyn for<'m> Fn(&'m str) + Send + Sync),
    ) -> Result<()> {
        let url = source.archive_url();
        trace!("Archive URL for {source}: {url}");
        on_info(&format!("downloading {url}"));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BlueprintError::transfer_caused_by(format!("could not download {url}"), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BlueprintError::transfer(format!(
                "could not find commit hash for {} ({status} from {url})",
                source.reference
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BlueprintError::transfer_caused_by(format!("could not download {url}"), e))?;
        on_info(&format!("downloaded {} bytes", bytes.len()));

        let subdir = source.subdir.clone();
        let target = dest.to_path_buf();
        let written = tokio::task::spawn_blocking(move || {
            unpack(Cursor::new(bytes), subdir.as_deref(), &target)
        })
        .await
        .map_err(|e| BlueprintError::transfer_caused_by("archive extraction was interrupted", e))??;

        on_info(&format!("extracted {written} files to {}", dest.display()));
        Ok(())
    }
}

/// Unpacks a repository snapshot into `dest`.
///
/// The single top-level directory every host wraps snapshots in is stripped.
/// When `subdir` is set only that directory's contents are kept. Files left
/// over in `dest` from an earlier partial extraction are overwritten.
///
/// Symlink entries are recreated as links once every regular file is in
/// place, so no file is ever written through one.
///
/// Returns the number of files and links written.
///
/// # Errors
///
/// Returns [`BlueprintError::Transfer`] if the archive is unreadable, holds
/// nothing under `subdir`, or if any IO error occurs.
pub fn unpack<R>(reader: R, subdir: Option<&str>, dest: &Path) -> Result<usize>
where
    R: io::Read + io::Seek,
{
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| BlueprintError::transfer_caused_by("downloaded archive is not a valid zip", e))?;

    let staging = dest.join(STAGING_DIR);
    fs::create_dir_all(&staging).map_err(io_error(&staging))?;

    let prefix = subdir.map(PathBuf::from);
    let mut written = 0;
    let mut links = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| BlueprintError::transfer_caused_by("corrupt archive entry", e))?;

        let Some(name) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(BlueprintError::transfer(format!(
                "archive entry {} escapes the target directory",
                entry.name()
            )));
        };

        let Some(relative) = strip_root(&name, prefix.as_deref()) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let out = staging.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(io_error(&out))?;
            continue;
        }

        if entry.unix_mode().is_some_and(|mode| mode & FILE_TYPE_MASK == SYMLINK_TYPE) {
            let mut target = String::new();
            io::Read::read_to_string(&mut entry, &mut target).map_err(io_error(&out))?;
            links.push((relative, target));
            continue;
        }

        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let mut file = fs::File::create(&out).map_err(io_error(&out))?;
        io::copy(&mut entry, &mut file).map_err(io_error(&out))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out, fs::Permissions::from_mode(mode & 0o777)).map_err(io_error(&out))?;
        }

        written += 1;
    }

    if written == 0 && links.is_empty() {
        fs::remove_dir_all(&staging).map_err(io_error(&staging))?;
        return Err(BlueprintError::transfer(match subdir {
            Some(subdir) => format!("could not find directory {subdir}"),
            None => "downloaded archive is empty".to_string(),
        }));
    }

    promote(&staging, dest)?;

    for (relative, target) in &links {
        if let Some((outer, _)) = links
            .iter()
            .find(|(other, _)| other != relative && relative.starts_with(other))
        {
            return Err(BlueprintError::transfer(format!(
                "archive entry {} is inside symlink {}",
                relative.display(),
                outer.display()
            )));
        }
        link(dest, relative, target)?;
    }

    Ok(written + links.len())
}

#[cfg(unix)]
fn link(dest: &Path, relative: &Path, target: &str) -> Result<()> {
    let out = dest.join(relative);
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    if out.symlink_metadata().is_ok() {
        fs::remove_file(&out).map_err(io_error(&out))?;
    }
    std::os::unix::fs::symlink(target, &out).map_err(io_error(&out))
}

/// Without symlink support the link is written as a file holding its target.
#[cfg(not(unix))]
fn link(dest: &Path, relative: &Path, target: &str) -> Result<()> {
    let out = dest.join(relative);
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    fs::write(&out, target).map_err(io_error(&out))
}

/// Drops the snapshot's top-level directory and, if given, `prefix`.
fn strip_root(name: &Path, prefix: Option<&Path>) -> Option<PathBuf> {
    let mut components = name.components();
    match components.next() {
        Some(Component::Normal(_)) => {}
        _ => return None,
    }
    let rest = components.as_path();

    match prefix {
        Some(prefix) => rest.strip_prefix(prefix).ok().map(Path::to_path_buf),
        None => Some(rest.to_path_buf()),
    }
}

/// Moves everything in `staging` up into `dest` and removes `staging`.
fn promote(staging: &Path, dest: &Path) -> Result<()> {
    let items: Vec<PathBuf> = fs::read_dir(staging)
        .map_err(io_error(staging))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()
        .map_err(io_error(staging))?;

    let options = CopyOptions {
        overwrite: true,
        ..CopyOptions::new()
    };
    fs_extra::move_items(&items, dest, &options).map_err(|e| {
        BlueprintError::transfer_caused_by(format!("could not move files into {}", dest.display()), e)
    })?;

    fs::remove_dir_all(staging).map_err(io_error(staging))
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> BlueprintError + '_ {
    move |e| BlueprintError::transfer_caused_by(format!("could not write {}", path.display()), e)
}
