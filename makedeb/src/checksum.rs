// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Content digests for the `md5sums` control member. */

use {
    md5::Digest,
    os_str_bytes::OsStrBytes,
    std::{
        io::Read,
        path::{Path, PathBuf},
    },
};

/// A reader computing the MD5 digest of everything read through it.
pub struct Md5Reader<R> {
    inner: R,
    context: md5::Md5,
}

impl<R: Read> Md5Reader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            context: md5::Md5::new(),
        }
    }

    /// Obtain a reference to the wrapped reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// The lowercase hex digest of the bytes read so far.
    pub fn hex_digest(self) -> String {
        hex::encode(self.context.finalize())
    }
}

impl<R: Read> Read for Md5Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let count = self.inner.read(buf)?;
        self.context.update(&buf[0..count]);

        Ok(count)
    }
}

/// The `md5sums` manifest of a binary package.
///
/// Entries are kept in insertion order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Md5Sums {
    entries: Vec<(PathBuf, String)>,
}

impl Md5Sums {
    /// Record the digest of a file installed at `path`.
    ///
    /// `path` is relative to the filesystem root, e.g. `usr/bin/myapp`.
    pub fn add(&mut self, path: impl AsRef<Path>, hex_digest: impl Into<String>) {
        self.entries
            .push((path.as_ref().to_path_buf(), hex_digest.into()));
    }

    /// Render the manifest as `<digest>  <path>` lines.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();

        for (path, digest) in &self.entries {
            data.extend_from_slice(digest.as_bytes());
            data.extend_from_slice(b"  ");
            data.extend_from_slice(path.to_raw_bytes().as_ref());
            data.push(b'\n');
        }

        data
    }
}
