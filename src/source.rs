//! Remote template references.
//!
//! A reference looks like `[host:]owner/repo[/sub/dir][#ref]`. `host` is one of
//! `github`, `gitlab` or `bitbucket` and defaults to `github`. Full
//! `https://<host>.<tld>/owner/repo` URLs are accepted too.

use std::fmt::{Display, Formatter};

use crate::error::{BlueprintError, Result};

/// Symbolic revision used when no ref is requested.
pub const DEFAULT_REF: &str = "HEAD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    GitHub,
    GitLab,
    Bitbucket,
}

impl Host {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "github" | "github.com" => Some(Self::GitHub),
            "gitlab" | "gitlab.com" => Some(Self::GitLab),
            "bitbucket" | "bitbucket.org" => Some(Self::Bitbucket),
            _ => None,
        }
    }

    #[must_use]
    pub const fn domain(self) -> &'static str {
        match self {
            Self::GitHub => "github.com",
            Self::GitLab => "gitlab.com",
            Self::Bitbucket => "bitbucket.org",
        }
    }

    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::Bitbucket => "bitbucket",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub host: Host,
    pub owner: String,
    pub repo: String,
    pub subdir: Option<String>,
    pub reference: String,
}

impl SourceRef {
    /// Parses `source`. A `#ref` suffix in `source` wins over no ref at all,
    /// and [`DEFAULT_REF`] is used when neither is present.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::Transfer`] if `source` is not a recognizable
    /// reference.
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = || BlueprintError::transfer(format!("could not parse template source \"{source}\""));

        let (path, reference) = match source.split_once('#') {
            Some((path, reference)) if !reference.is_empty() => (path, reference),
            Some(_) => return Err(invalid()),
            None => (source, DEFAULT_REF),
        };

        let (host, path) = if let Some(rest) = path.strip_prefix("https://") {
            let (domain, rest) = rest.split_once('/').ok_or_else(invalid)?;
            (Host::from_prefix(domain).ok_or_else(invalid)?, rest)
        } else if let Some((prefix, rest)) = path.split_once(':') {
            (Host::from_prefix(prefix).ok_or_else(invalid)?, rest)
        } else {
            (Host::GitHub, path)
        };

        let mut segments = path.trim_end_matches('/').split('/');
        let owner = segments.next().filter(|s| is_name(s)).ok_or_else(invalid)?;
        let repo = segments
            .next()
            .map(|s| s.trim_end_matches(".git"))
            .filter(|s| is_name(s))
            .ok_or_else(invalid)?;

        let rest: Vec<&str> = segments.collect();
        if rest.iter().any(|s| s.is_empty() || *s == "..") {
            return Err(invalid());
        }
        let subdir = (!rest.is_empty()).then(|| rest.join("/"));

        Ok(Self {
            host,
            owner: owner.to_string(),
            repo: repo.to_string(),
            subdir,
            reference: reference.to_string(),
        })
    }

    /// Replaces the revision to fetch.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    /// URL of a `.zip` snapshot of the repository at [`SourceRef::reference`].
    #[must_use]
    pub fn archive_url(&self) -> String {
        let Self {
            owner,
            repo,
            reference,
            ..
        } = self;
        let base = format!("https://{}/{owner}/{repo}", self.host.domain());

        match self.host {
            Host::GitHub => format!("{base}/archive/{reference}.zip"),
            Host::GitLab => format!("{base}/-/archive/{reference}/{repo}-{reference}.zip"),
            Host::Bitbucket => format!("{base}/get/{reference}.zip"),
        }
    }
}

impl Display for SourceRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.host.prefix(), self.owner, self.repo)?;
        if let Some(subdir) = &self.subdir {
            write!(f, "/{subdir}")?;
        }
        write!(f, "#{}", self.reference)
    }
}

fn is_name(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
