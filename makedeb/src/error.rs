// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Error handling. */

use {
    crate::{dependency::DependencyError, package_version::VersionError},
    std::path::PathBuf,
    thiserror::Error,
};

/// Broad classification of a [DebError].
///
/// Validation errors are always raised before any archive bytes are produced.
/// Format errors indicate a violated internal invariant and are not expected
/// to be recoverable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    Io,
    Format,
}

/// Primary crate error type.
#[derive(Debug, Error)]
pub enum DebError {
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    #[error("I/O error on path {0}: {1:?}")]
    IoPath(PathBuf, std::io::Error),

    #[error("error walking directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("invalid package name: {0}")]
    InvalidPackageName(String),

    #[error("invalid version {0}: {1}")]
    InvalidVersion(String, VersionError),

    #[error("invalid dependency: {0}")]
    InvalidDependency(#[from] DependencyError),

    #[error("invalid architecture: {0}")]
    InvalidArchitecture(String),

    #[error("invalid value for control field {0}: {1:?}")]
    InvalidFieldValue(&'static str, String),

    #[error("destination path must not be absolute: {0}")]
    AbsoluteDestination(String),

    #[error("destination path escapes the package root: {0}")]
    DestinationEscapesRoot(String),

    #[error("destination path is empty for source {0}")]
    EmptyDestination(String),

    #[error("source is neither a regular file nor a directory: {0}")]
    UnsupportedSource(PathBuf),

    #[error("duplicate destination path: {0}")]
    DuplicateDestination(String),

    #[error("invalid control archive member name: {0}")]
    InvalidControlMemberName(String),

    #[error("invalid exclude pattern: {0}")]
    ExcludePattern(#[from] glob::PatternError),

    #[error("ar member name exceeds 16 bytes: {0}")]
    ArMemberNameTooLong(String),

    #[error("ar header field {0} value {1} does not fit in {2} bytes")]
    ArHeaderFieldOverflow(&'static str, u64, usize),

    #[error("timestamp predates the UNIX epoch")]
    TimestampBeforeEpoch,
}

impl DebError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::IoPath(_, _) | Self::WalkDir(_) => ErrorKind::Io,
            Self::ArMemberNameTooLong(_) | Self::ArHeaderFieldOverflow(_, _, _) => {
                ErrorKind::Format
            }
            _ => ErrorKind::Validation,
        }
    }
}

/// Result wrapper for this crate.
pub type Result<T> = std::result::Result<T, DebError>;
