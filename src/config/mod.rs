use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::trace;

/// Manifest compiled into the binary.
pub const BUILTIN_MANIFEST: &str = include_str!("../../manifest.toml");

/// Environment variable pointing at a manifest that overrides every other one.
pub const MANIFEST_VAR: &str = "GAVIN_MANIFEST";

pub const MANIFEST_FILE: &str = "manifest.toml";

/// Persisted tool configuration: the minimum Node.js major, the blueprint
/// sources and the tool version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default = "default_version")]
    pub version: String,
    pub minimum_node_major: u64,
    #[serde(default)]
    pub blueprints: BTreeMap<String, String>,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Manifest {
    /// Parses a manifest from its TOML text.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if `contents` is not a valid manifest. `origin` is
    /// only used in the error message.
    pub fn from_toml(contents: &str, origin: &Path) -> anyhow::Result<Self> {
        toml::from_str(contents)
            .with_context(|| format!("Failed to parse manifest {}", origin.display()))
    }

    /// Loads the manifest in effect for this process.
    ///
    /// Looks, in order, for:
    /// - the file named by `$GAVIN_MANIFEST`
    /// - `manifest.toml` in the user config directory (e.g. `~/.config/gavin`)
    /// - the built-in manifest
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if `$GAVIN_MANIFEST` names a file that can not be
    /// read, or if any manifest found is malformed.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = std::env::var_os(MANIFEST_VAR).map(PathBuf::from) {
            trace!("Reading manifest from ${MANIFEST_VAR}: {}", path.display());
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read manifest {}", path.display()))?;
            return Self::from_toml(&contents, &path);
        }

        if let Some(path) = Self::user_manifest_path().filter(|p| p.is_file()) {
            trace!("Reading user manifest: {}", path.display());
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read manifest {}", path.display()))?;
            return Self::from_toml(&contents, &path);
        }

        trace!("Using built-in manifest");
        Self::from_toml(BUILTIN_MANIFEST, Path::new("<built-in>"))
    }

    /// Returns where a user manifest would live on this platform, if a home
    /// directory can be determined.
    #[must_use]
    pub fn user_manifest_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gavin").map(|dirs| dirs.config_dir().join(MANIFEST_FILE))
    }

    /// Returns the source identifier registered for `blueprint`.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the manifest declares no such blueprint.
    pub fn blueprint_source(&self, blueprint: &str) -> anyhow::Result<&str> {
        self.blueprints
            .get(blueprint)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("No source declared for blueprint \"{blueprint}\" in manifest"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_manifest_declares_react_app() {
        let manifest = Manifest::from_toml(BUILTIN_MANIFEST, Path::new("<built-in>")).unwrap();

        assert_eq!(manifest.minimum_node_major, 18);
        assert_eq!(manifest.version, env!("CARGO_PKG_VERSION"));
        assert!(manifest.blueprint_source("react-app").is_ok());
    }

    #[test]
    fn explicit_version_wins() {
        let manifest = Manifest::from_toml(
            r#"
            version = "9.9.9"
            minimum_node_major = 20

            [blueprints]
            react-app = "acme/blueprint"
            "#,
            Path::new("test.toml"),
        )
        .unwrap();

        assert_eq!(manifest.version, "9.9.9");
        assert_eq!(manifest.minimum_node_major, 20);
        assert_eq!(manifest.blueprint_source("react-app").unwrap(), "acme/blueprint");
    }

    #[test]
    fn unknown_blueprint_is_an_error() {
        let manifest = Manifest::from_toml("minimum_node_major = 18", Path::new("t.toml")).unwrap();

        let err = manifest.blueprint_source("vue-app").unwrap_err();
        assert!(err.to_string().contains("vue-app"));
    }

    #[test]
    fn malformed_manifest_names_its_origin() {
        let err = Manifest::from_toml("minimum_node_major = \"x\"", Path::new("bad.toml"))
            .unwrap_err();

        assert!(err.to_string().contains("bad.toml"));
    }
}
