// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! The outer `ar` container of `.deb` files.

`dpkg` only accepts the common `!<arch>` variant with member names of at most
16 bytes and no symbol table. Longer names would make the `ar` crate fall back
to a BSD style extended name, so they are rejected up front.
*/

use {
    crate::error::{DebError, Result},
    std::io::Write,
};

/// Maximum length of a member name.
pub const MAX_NAME_LENGTH: usize = 16;

/// Width of the decimal mtime field of a member header.
const MTIME_WIDTH: usize = 12;

/// Width of the decimal size field of a member header.
const SIZE_WIDTH: usize = 10;

/// A member of an `ar` archive.
///
/// Members are owned by `root:root` with mode `100644`, as written by `dpkg-deb`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArMember {
    name: String,
    mtime: u64,
    data: Vec<u8>,
}

impl ArMember {
    pub fn new(name: impl Into<String>, mtime: u64, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mtime,
            data: data.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Ensure the member can be described by a plain 60 byte header.
    fn validate(&self) -> Result<()> {
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(DebError::ArMemberNameTooLong(self.name.clone()));
        }

        for (field, value, width) in [
            ("mtime", self.mtime, MTIME_WIDTH),
            ("size", self.data.len() as u64, SIZE_WIDTH),
        ] {
            if value.to_string().len() > width {
                return Err(DebError::ArHeaderFieldOverflow(field, value, width));
            }
        }

        Ok(())
    }

    fn header(&self) -> ar::Header {
        let mut header = ar::Header::new(self.name.as_bytes().to_vec(), self.data.len() as _);
        header.set_mode(0o100644);
        header.set_mtime(self.mtime);
        header.set_uid(0);
        header.set_gid(0);

        header
    }
}

/// Write an `ar` archive holding `members`, in order.
///
/// Every member is validated before anything is written.
pub fn write_ar_archive<W: Write>(writer: &mut W, members: &[ArMember]) -> Result<()> {
    for member in members {
        member.validate()?;
    }

    let mut builder = ar::Builder::new(writer);

    for member in members {
        builder.append(&member.header(), member.data())?;
    }

    Ok(())
}
