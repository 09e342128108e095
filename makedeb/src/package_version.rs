// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Debian package version string handling. */

use {
    std::{
        fmt::{Display, Formatter},
        num::ParseIntError,
        str::FromStr,
    },
    thiserror::Error,
};

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VersionError {
    #[error("version string is empty")]
    Empty,

    #[error("error parsing epoch to integer: {0}")]
    ParseInt(#[from] ParseIntError),

    #[error("the epoch component has non-digit characters")]
    EpochNonNumeric,

    #[error("upstream_version component is empty")]
    UpstreamVersionEmpty,

    #[error("upstream_version component does not start with a digit")]
    UpstreamVersionNoLeadingDigit,

    #[error("upstream_version component has illegal character {0:?}")]
    UpstreamVersionIllegalChar(char),

    #[error("debian_revision component is empty")]
    DebianRevisionEmpty,

    #[error("debian_revision component has illegal character {0:?}")]
    DebianRevisionIllegalChar(char),
}

pub type Result<T> = std::result::Result<T, VersionError>;

/// A Debian package version.
///
/// The semantics are defined at
/// <https://www.debian.org/doc/debian-policy/ch-controlfields.html#version>.
///
/// The concise version is the format is `[epoch:]upstream_version[-debian_revision]`
/// and each component has rules about what characters are allowed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PackageVersion {
    epoch: Option<u32>,
    upstream_version: String,
    debian_revision: Option<String>,
}

impl PackageVersion {
    /// Construct an instance by parsing a version string.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(VersionError::Empty);
        }

        // Epoch is the part before a colon, if present.
        // upstream_version and debian_revision are discovered by splitting on last hyphen.
        let (epoch, remainder) = if let Some(pos) = s.find(':') {
            (Some(&s[0..pos]), &s[pos + 1..])
        } else {
            (None, s)
        };

        let (upstream, debian) = if let Some(pos) = remainder.rfind('-') {
            (&remainder[0..pos], Some(&remainder[pos + 1..]))
        } else {
            (remainder, None)
        };

        let epoch = if let Some(epoch) = epoch {
            if epoch.is_empty() || !epoch.chars().all(|c| c.is_ascii_digit()) {
                return Err(VersionError::EpochNonNumeric);
            }

            Some(u32::from_str(epoch)?)
        } else {
            None
        };

        // The upstream_version must contain only alphanumerics and the characters . + - ~ (full stop,
        // plus, hyphen, tilde) and should start with a digit. If there is no debian_revision then
        // hyphens are not allowed.
        if upstream.is_empty() {
            return Err(VersionError::UpstreamVersionEmpty);
        }
        if let Some(c) = upstream.chars().find(|c| match c {
            c if c.is_ascii_alphanumeric() => false,
            '.' | '+' | '~' | '-' => false,
            _ => true,
        }) {
            return Err(VersionError::UpstreamVersionIllegalChar(c));
        }
        if !upstream.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(VersionError::UpstreamVersionNoLeadingDigit);
        }

        let debian_revision = if let Some(debian) = debian {
            if debian.is_empty() {
                return Err(VersionError::DebianRevisionEmpty);
            }

            // It must contain only alphanumerics and the characters + . ~ (plus, full stop, tilde)
            if let Some(c) = debian.chars().find(|c| match c {
                c if c.is_ascii_alphanumeric() => false,
                '+' | '.' | '~' => false,
                _ => true,
            }) {
                return Err(VersionError::DebianRevisionIllegalChar(c));
            }

            Some(debian.to_string())
        } else {
            None
        };

        Ok(Self {
            epoch,
            upstream_version: upstream.to_string(),
            debian_revision,
        })
    }

    /// The `epoch` component of the version string.
    pub fn epoch(&self) -> Option<u32> {
        self.epoch
    }

    /// `upstream` component of the version string.
    pub fn upstream_version(&self) -> &str {
        &self.upstream_version
    }

    /// `debian_revision` component of the version string.
    pub fn debian_revision(&self) -> Option<&str> {
        self.debian_revision.as_deref()
    }

    /// The version as it appears in `.deb` file names.
    ///
    /// This is the full version string minus the epoch.
    pub fn filename_version(&self) -> String {
        match &self.debian_revision {
            Some(revision) => format!("{}-{}", self.upstream_version, revision),
            None => self.upstream_version.clone(),
        }
    }
}

impl Display for PackageVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(epoch) = self.epoch {
            write!(f, "{}:", epoch)?;
        }

        write!(f, "{}", self.filename_version())
    }
}

impl FromStr for PackageVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
