// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Build Debian binary packages.

This crate produces `.deb` files from an ordered list of (source, destination) mappings
plus package metadata. The full package is assembled in-process: no `dpkg-deb`, `ar` or
`tar` executable is invoked.

# Determinism

Given the same inputs and a fixed modification time ([DebOptions::mtime()]), output is
byte-for-byte identical across runs. All archive entries are owned by `root:root`, the
gzip header carries no timestamp, and directory sources are walked in sorted order.

# A Tour of Functionality

The main entry point is [make_deb()], which validates its inputs, writes
`<name>_<version>_<arch>.deb` and returns the path of the written file. For finer control,
[deb::builder::DebBuilder] exposes the individual steps.

Package names and versions are validated by the [metadata] module. Version strings are
parsed by [package_version::PackageVersion]. Relationship fields such as `Depends` use the
dependency language implemented by [dependency].

Mappings are resolved into individual files by [content]. Directory sources are expanded
recursively and files are placed below the destination.

The `control` file is rendered by [control], `md5sums` by [checksum]. The inner tar
archives and the outer `ar` container live in [deb::tar] and [deb::ar].

Errors are represented by [error::DebError]. [error::DebError::kind()] distinguishes
validation failures, which are raised before any output is produced, from I/O and
format failures.
*/

pub mod checksum;
pub mod content;
pub mod control;
pub mod deb;
pub mod dependency;
pub mod error;
pub mod metadata;
pub mod package_version;

pub use crate::{
    content::ContentEntry,
    deb::{
        builder::{make_deb, DebBuilder},
        DebCompression,
    },
    error::{DebError, ErrorKind, Result},
    metadata::DebOptions,
};
