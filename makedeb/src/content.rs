// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Resolution of package content.

Callers describe content as (source, destination) pairs. A source is either a
file or a directory; directories are expanded recursively into one entry per
file. Destinations are relative to the root of the installed filesystem.
*/

use {
    crate::error::{DebError, Result},
    log::{debug, warn},
    std::{
        collections::BTreeSet,
        path::{Component, Path, PathBuf},
    },
};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[cfg(unix)]
pub fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    metadata.permissions().mode() & 0o7777
}

#[cfg(windows)]
pub fn file_mode(_metadata: &std::fs::Metadata) -> u32 {
    0o644
}

/// A mapping from a path on disk to a path inside the package.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentEntry {
    /// Path of a file or directory on the local filesystem.
    pub source: PathBuf,
    /// Destination relative to the root of the installed filesystem.
    pub destination: PathBuf,
}

impl ContentEntry {
    pub fn new(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
        }
    }
}

impl<S: AsRef<Path>, D: AsRef<Path>> From<(S, D)> for ContentEntry {
    fn from((source, destination): (S, D)) -> Self {
        Self::new(source, destination)
    }
}

impl<S: AsRef<Path>, D: AsRef<Path>> From<&(S, D)> for ContentEntry {
    fn from((source, destination): &(S, D)) -> Self {
        Self::new(source, destination)
    }
}

/// Normalize a destination path, ensuring it stays within the package root.
///
/// `.` components are dropped. Absolute paths and `..` components are rejected.
/// The result may be empty, meaning the package root itself.
pub fn normalize_destination(path: &Path) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(c) => normalized.push(c),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(DebError::DestinationEscapesRoot(path.display().to_string()))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(DebError::AbsoluteDestination(path.display().to_string()))
            }
        }
    }

    Ok(normalized)
}

/// A regular file that will be installed by the package.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedFile {
    /// Where the content is read from.
    pub source: PathBuf,
    /// Normalized path relative to the filesystem root.
    pub destination: PathBuf,
    /// Size in bytes when the content was resolved.
    pub size: u64,
    /// Permission bits of the source file.
    pub mode: u32,
}

impl ResolvedFile {
    fn from_source(source: &Path, destination: PathBuf, metadata: &std::fs::Metadata) -> Self {
        Self {
            source: source.to_path_buf(),
            destination,
            size: metadata.len(),
            mode: file_mode(metadata),
        }
    }
}

fn is_excluded(path: &Path, exclude: &[glob::Pattern]) -> bool {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => exclude.iter().any(|pattern| pattern.matches(name)),
        None => false,
    }
}

/// Expand a directory source into files, in path-sorted order.
fn expand_directory(
    root: &Path,
    destination: &Path,
    exclude: &[glob::Pattern],
) -> Result<Vec<ResolvedFile>> {
    let mut files = vec![];

    // The tar crate isn't deterministic when iterating directories. So we
    // do the iteration ourselves.
    let walk = walkdir::WalkDir::new(root)
        .follow_links(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() > 0 && is_excluded(entry.path(), exclude) {
                debug!("excluding {}", entry.path().display());
                false
            } else {
                true
            }
        });

    for entry in walk {
        let entry = entry?;

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if !entry.file_type().is_file() {
            warn!("skipping {}: not a regular file", path.display());
            continue;
        }

        let rel_path = path
            .strip_prefix(root)
            .map_err(|_| DebError::DestinationEscapesRoot(path.display().to_string()))?;
        let metadata = entry
            .metadata()
            .map_err(|e| DebError::IoPath(path.to_path_buf(), e.into()))?;

        let file = ResolvedFile::from_source(path, destination.join(rel_path), &metadata);
        debug!(
            "resolved {} to {}",
            file.source.display(),
            file.destination.display()
        );
        files.push(file);
    }

    if files.is_empty() {
        warn!("directory {} contains no files to package", root.display());
    }

    Ok(files)
}

/// Resolve content mappings into the full, ordered list of files to install.
///
/// Files are emitted in the order of `entries`. Directory sources expand in
/// path-sorted order, skipping anything whose name matches an `exclude`
/// pattern. Every destination is validated before any content is read, and a
/// destination may only be claimed once.
pub fn resolve_content<'a>(
    entries: impl IntoIterator<Item = &'a ContentEntry>,
    exclude: &[glob::Pattern],
) -> Result<Vec<ResolvedFile>> {
    let entries = entries
        .into_iter()
        .map(|entry| Ok((entry, normalize_destination(&entry.destination)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut files = vec![];

    for (entry, destination) in entries {
        let metadata = std::fs::metadata(&entry.source)
            .map_err(|e| DebError::IoPath(entry.source.clone(), e))?;

        if metadata.is_dir() {
            files.extend(expand_directory(&entry.source, &destination, exclude)?);
        } else if metadata.is_file() {
            if destination.as_os_str().is_empty() {
                return Err(DebError::EmptyDestination(
                    entry.source.display().to_string(),
                ));
            }

            files.push(ResolvedFile::from_source(
                &entry.source,
                destination,
                &metadata,
            ));
        } else {
            return Err(DebError::UnsupportedSource(entry.source.clone()));
        }
    }

    let mut seen = BTreeSet::new();
    for file in &files {
        if !seen.insert(&file.destination) {
            return Err(DebError::DuplicateDestination(
                file.destination.display().to_string(),
            ));
        }
    }

    Ok(files)
}
