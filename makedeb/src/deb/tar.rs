// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Tar archives suitable for inclusion in `.deb` files.

Entries are written with `./` prefixed paths, owned by `root:root`, and stamped
with a caller-provided modification time, so identical inputs produce identical
archives.
*/

use {
    crate::{
        checksum::{Md5Reader, Md5Sums},
        content::normalize_destination,
        deb::DebCompression,
        error::{DebError, Result},
    },
    log::debug,
    os_str_bytes::OsStrBytes,
    std::{
        collections::BTreeSet,
        fs::File,
        io::{Cursor, Read, Write},
        path::{Path, PathBuf},
    },
};

/// Where the content of a [TarEntry] comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TarEntryData {
    /// Content held in memory.
    Memory(Vec<u8>),
    /// Content streamed from a file of a known size when the archive is written.
    File { source: PathBuf, size: u64 },
    /// A directory marker.
    Directory,
}

/// An item in a tar archive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TarEntry {
    path: PathBuf,
    mode: u32,
    data: TarEntryData,
}

impl TarEntry {
    /// A regular file with in-memory content.
    pub fn memory(path: impl AsRef<Path>, data: impl Into<Vec<u8>>, mode: u32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mode,
            data: TarEntryData::Memory(data.into()),
        }
    }

    /// A regular file whose content is read from `source` while archiving.
    pub fn file(path: impl AsRef<Path>, source: impl AsRef<Path>, size: u64, mode: u32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mode,
            data: TarEntryData::File {
                source: source.as_ref().to_path_buf(),
                size,
            },
        }
    }

    /// A directory.
    pub fn directory(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mode: 0o755,
            data: TarEntryData::Directory,
        }
    }

    /// Path relative to the archive root, without the `./` prefix.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn data(&self) -> &TarEntryData {
        &self.data
    }

    fn size(&self) -> u64 {
        match &self.data {
            TarEntryData::Memory(data) => data.len() as u64,
            TarEntryData::File { size, .. } => *size,
            TarEntryData::Directory => 0,
        }
    }
}

fn new_tar_header(mtime: u64) -> Result<tar::Header> {
    let mut header = tar::Header::new_gnu();
    header.set_uid(0);
    header.set_gid(0);
    header.set_username("root")?;
    header.set_groupname("root")?;
    header.set_mtime(mtime);

    Ok(header)
}

fn set_header_path(
    builder: &mut tar::Builder<impl Write>,
    header: &mut tar::Header,
    path: &Path,
    is_directory: bool,
) -> Result<()> {
    // Debian archives in the wild have filenames beginning with `./`. And
    // paths ending with `/` are directories. However, we cannot call
    // `header.set_path()` with `./` on anything except the root directory
    // because it will normalize away the `./` bit. So we set the header field
    // directly when adding directories and files.

    // We should only be dealing with GNU headers, which simplifies our code a bit.
    assert!(header.as_ustar().is_none());

    let mut value = b"./".to_vec();
    value.extend_from_slice(&path.to_raw_bytes());
    if is_directory {
        value.push(b'/');
    }
    let value_bytes = value.as_slice();

    let name_buffer = &mut header.as_old_mut().name;

    if value_bytes.len() <= name_buffer.len() {
        name_buffer[0..value_bytes.len()].copy_from_slice(value_bytes);
    } else {
        // Names that don't fit are preceded by a GNU long name entry.
        let mut header2 = tar::Header::new_gnu();
        let name = b"././@LongLink";
        header2.as_old_mut().name[..name.len()].clone_from_slice(&name[..]);
        header2.set_mode(0o644);
        header2.set_uid(0);
        header2.set_gid(0);
        header2.set_mtime(0);
        header2.set_size(value_bytes.len() as u64 + 1);
        header2.set_entry_type(tar::EntryType::GNULongName);
        header2.set_cksum();
        let mut data = value_bytes.chain(std::io::repeat(0).take(1));
        builder.append(&header2, &mut data)?;

        let truncated_bytes = &value_bytes[0..name_buffer.len()];
        name_buffer[0..truncated_bytes.len()].copy_from_slice(truncated_bytes);
    }

    Ok(())
}

/// Builds a tar archive from an ordered sequence of [TarEntry].
///
/// Entries are written in insertion order. When directory entries are enabled,
/// the root `./` comes first and every parent directory of an entry is written
/// before the entry itself.
#[derive(Clone, Debug)]
pub struct TarArchiveBuilder {
    entries: Vec<TarEntry>,
    paths: BTreeSet<PathBuf>,
    mtime: u64,
    directory_entries: bool,
}

impl TarArchiveBuilder {
    /// Create an empty archive whose entries use the given modification time.
    pub fn new(mtime: u64) -> Self {
        Self {
            entries: vec![],
            paths: BTreeSet::new(),
            mtime,
            directory_entries: false,
        }
    }

    /// Whether to emit explicit directory entries.
    #[must_use]
    pub fn directory_entries(mut self, enabled: bool) -> Self {
        self.directory_entries = enabled;
        self
    }

    /// Add an entry.
    ///
    /// The path must be relative, stay within the archive root, and be unique.
    pub fn add_entry(&mut self, mut entry: TarEntry) -> Result<()> {
        let path = normalize_destination(&entry.path)?;
        if path.as_os_str().is_empty() {
            return Err(DebError::EmptyDestination(entry.path.display().to_string()));
        }
        if !self.paths.insert(path.clone()) {
            return Err(DebError::DuplicateDestination(path.display().to_string()));
        }

        entry.path = path;
        self.entries.push(entry);

        Ok(())
    }

    /// Obtain the registered entries.
    pub fn entries(&self) -> &[TarEntry] {
        &self.entries
    }

    fn append_directory(
        &self,
        builder: &mut tar::Builder<impl Write>,
        path: Option<&Path>,
    ) -> Result<()> {
        let mut header = new_tar_header(self.mtime)?;
        match path {
            Some(path) => set_header_path(builder, &mut header, path, true)?,
            None => header.set_path(Path::new("./"))?,
        }
        header.set_entry_type(tar::EntryType::Directory);
        header.set_mode(0o755);
        header.set_size(0);
        header.set_cksum();
        builder.append(&header, std::io::empty())?;

        Ok(())
    }

    /// Write the uncompressed archive to a writer.
    ///
    /// Returns the MD5 digest of every regular file, computed from the exact bytes
    /// that went into the archive.
    pub fn write<W: Write>(&self, writer: W) -> Result<Md5Sums> {
        let mut builder = tar::Builder::new(writer);
        let mut written_directories = BTreeSet::new();
        let mut md5sums = Md5Sums::default();

        if self.directory_entries {
            self.append_directory(&mut builder, None)?;
        }

        for entry in &self.entries {
            if self.directory_entries {
                let mut parents = entry
                    .path
                    .ancestors()
                    .skip(1)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect::<Vec<_>>();
                parents.reverse();

                for parent in parents {
                    if written_directories.insert(parent.to_path_buf()) {
                        self.append_directory(&mut builder, Some(parent))?;
                    }
                }
            }

            if let TarEntryData::Directory = entry.data {
                if written_directories.insert(entry.path.clone()) {
                    self.append_directory(&mut builder, Some(&entry.path))?;
                }
                continue;
            }

            debug!("archiving ./{}", entry.path.display());

            let mut header = new_tar_header(self.mtime)?;
            set_header_path(&mut builder, &mut header, &entry.path, false)?;
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(entry.mode);
            header.set_size(entry.size());
            header.set_cksum();

            match &entry.data {
                TarEntryData::Memory(data) => {
                    let mut reader = Md5Reader::new(Cursor::new(data));
                    builder.append(&header, &mut reader)?;
                    md5sums.add(&entry.path, reader.hex_digest());
                }
                TarEntryData::File { source, size } => {
                    let fh = File::open(source).map_err(|e| DebError::IoPath(source.clone(), e))?;
                    let mut reader = Md5Reader::new(fh.take(*size));
                    builder
                        .append(&header, &mut reader)
                        .map_err(|e| DebError::IoPath(source.clone(), e))?;

                    if reader.get_ref().limit() != 0 {
                        return Err(DebError::IoPath(
                            source.clone(),
                            std::io::Error::new(
                                std::io::ErrorKind::UnexpectedEof,
                                "file shrank while it was being archived",
                            ),
                        ));
                    }

                    md5sums.add(&entry.path, reader.hex_digest());
                }
                TarEntryData::Directory => {}
            }
        }

        builder.finish()?;

        Ok(md5sums)
    }

    /// Write the archive and compress it.
    ///
    /// Digests of the archived files are returned alongside the compressed data.
    pub fn to_compressed(&self, compression: DebCompression) -> Result<(Vec<u8>, Md5Sums)> {
        let mut buffer = vec![];
        let md5sums = self.write(&mut buffer)?;

        Ok((compression.compress(&mut Cursor::new(buffer))?, md5sums))
    }
}
