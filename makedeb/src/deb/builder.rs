// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Create .deb package files and their components. */

use {
    crate::{
        checksum::Md5Sums,
        content::{file_mode, resolve_content, ContentEntry, ResolvedFile},
        control::{binary_control_paragraph, installed_size_kib, ControlParagraph},
        deb::{
            ar::{write_ar_archive, ArMember},
            tar::{TarArchiveBuilder, TarEntry},
            DebCompression, DEBIAN_BINARY,
        },
        error::{DebError, Result},
        metadata::{ControlFileSource, DebOptions, PackageMetadata},
    },
    log::{debug, info},
    std::{
        collections::BTreeSet,
        io::{BufWriter, Write},
        path::{Path, PathBuf},
        time::SystemTime,
    },
};

/// Control archive members generated by the builder itself.
const RESERVED_CONTROL_NAMES: &[&str] = &["control", "md5sums"];

/// A resolved extra member of the control archive.
#[derive(Clone, Debug, Eq, PartialEq)]
struct ControlMember {
    name: String,
    source: PathBuf,
    size: u64,
    mode: u32,
}

fn resolve_control_files(sources: &[ControlFileSource]) -> Result<Vec<ControlMember>> {
    let mut names = BTreeSet::new();

    // Validate every name before touching the filesystem.
    for source in sources {
        let name = source.name.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
            || RESERVED_CONTROL_NAMES.contains(&name)
            || !names.insert(name)
        {
            return Err(DebError::InvalidControlMemberName(name.to_string()));
        }
    }

    sources
        .iter()
        .map(|source| {
            let metadata = std::fs::metadata(&source.source)
                .map_err(|e| DebError::IoPath(source.source.clone(), e))?;
            if !metadata.is_file() {
                return Err(DebError::UnsupportedSource(source.source.clone()));
            }

            Ok(ControlMember {
                name: source.name.clone(),
                source: source.source.clone(),
                size: metadata.len(),
                mode: file_mode(&metadata),
            })
        })
        .collect()
}

fn resolve_mtime(time: Option<SystemTime>) -> Result<u64> {
    Ok(time
        .unwrap_or_else(SystemTime::now)
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|_| DebError::TimestampBeforeEpoch)?
        .as_secs())
}

/// A builder for a `.deb` package file.
///
/// Construction validates the metadata and resolves the content into individual
/// files. Nothing is read or written until [Self::write()] or [Self::build()] is
/// called. File digests for `md5sums` are computed from the bytes streamed into
/// the data archive.
#[derive(Clone, Debug)]
pub struct DebBuilder {
    metadata: PackageMetadata,
    files: Vec<ResolvedFile>,
    control_files: Vec<ControlMember>,
    compression: DebCompression,
    mtime: u64,
    directory_entries: bool,
    output_path: PathBuf,
}

impl DebBuilder {
    /// Prepare a package build.
    ///
    /// `content` is an ordered sequence of (source, destination) pairs. Sources may be
    /// files or directories; destinations are relative to the filesystem root.
    pub fn new<I>(name: &str, version: &str, content: I, options: &DebOptions) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<ContentEntry>,
    {
        let metadata = options.to_metadata(name, version)?;
        let exclude = options.exclude_patterns()?;
        let mtime = resolve_mtime(options.get_mtime())?;
        let content = content.into_iter().map(Into::into).collect::<Vec<_>>();

        info!(
            "building {} {} ({})",
            metadata.name(),
            metadata.version(),
            metadata.architecture()
        );

        let files = resolve_content(&content, &exclude)?;
        let control_files = resolve_control_files(options.get_control_files())?;

        let output_path = options.resolve_output_path(&metadata);

        Ok(Self {
            metadata,
            files,
            control_files,
            compression: options.get_compression(),
            mtime,
            directory_entries: options.get_directory_entries(),
            output_path,
        })
    }

    /// The validated package metadata.
    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    /// Files that will be installed, in archive order.
    pub fn files(&self) -> &[ResolvedFile] {
        &self.files
    }

    /// Where [Self::build()] writes the package.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// The `Installed-Size` value, in KiB.
    pub fn installed_size_kib(&self) -> u64 {
        installed_size_kib(
            self.files.iter().map(|f| f.size).sum(),
            self.files.len(),
        )
    }

    /// The `control` file paragraph.
    pub fn control_paragraph(&self) -> ControlParagraph<'_> {
        binary_control_paragraph(&self.metadata, self.installed_size_kib())
    }

    /// Describe the `control.tar` archive.
    ///
    /// `md5sums` holds the digests of the data archive content.
    pub fn control_tar(&self, md5sums: &Md5Sums) -> Result<TarArchiveBuilder> {
        let mut builder =
            TarArchiveBuilder::new(self.mtime).directory_entries(self.directory_entries);

        let mut control = vec![];
        self.control_paragraph().write(&mut control)?;

        builder.add_entry(TarEntry::memory("control", control, 0o644))?;
        builder.add_entry(TarEntry::memory("md5sums", md5sums.to_bytes(), 0o644))?;

        for member in &self.control_files {
            debug!(
                "adding control member {} from {}",
                member.name,
                member.source.display()
            );
            builder.add_entry(TarEntry::file(
                &member.name,
                &member.source,
                member.size,
                member.mode,
            ))?;
        }

        Ok(builder)
    }

    /// Describe the `data.tar` archive.
    pub fn data_tar(&self) -> Result<TarArchiveBuilder> {
        let mut builder =
            TarArchiveBuilder::new(self.mtime).directory_entries(self.directory_entries);

        for file in &self.files {
            builder.add_entry(TarEntry::file(
                &file.destination,
                &file.source,
                file.size,
                file.mode,
            ))?;
        }

        Ok(builder)
    }

    /// Write `.deb` file content to a writer.
    ///
    /// This effectively materializes the `.deb` package somewhere.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let (data_tar, md5sums) = self.data_tar()?.to_compressed(self.compression)?;
        let (control_tar, _) = self.control_tar(&md5sums)?.to_compressed(self.compression)?;

        let members = [
            ArMember::new("debian-binary", self.mtime, DEBIAN_BINARY),
            ArMember::new(
                format!("control.tar{}", self.compression.extension()),
                self.mtime,
                control_tar,
            ),
            ArMember::new(
                format!("data.tar{}", self.compression.extension()),
                self.mtime,
                data_tar,
            ),
        ];

        write_ar_archive(writer, &members)
    }

    /// Write the package to [Self::output_path()].
    ///
    /// Content is staged in a temporary file next to the destination and renamed into
    /// place once complete. On error the temporary file is removed and no output exists.
    pub fn build(&self) -> Result<PathBuf> {
        let directory = match self.output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = tempfile::Builder::new()
            .prefix(".makedeb-")
            .suffix(".tmp")
            .tempfile_in(directory)
            .map_err(|e| DebError::IoPath(directory.to_path_buf(), e))?;

        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            self.write(&mut writer)?;
            writer.flush()?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))?;
        }

        staged
            .persist(&self.output_path)
            .map_err(|e| DebError::IoPath(self.output_path.clone(), e.error))?;

        info!("wrote {}", self.output_path.display());

        Ok(self.output_path.clone())
    }
}

/// Create a `.deb` package and return the path it was written to.
///
/// This validates `name` and `version`, resolves `content` (a sequence of
/// (source, destination) pairs), and writes `<name>_<version>_<arch>.deb` into
/// the configured output directory, or to the configured output path.
pub fn make_deb<I>(name: &str, version: &str, content: I, options: &DebOptions) -> Result<PathBuf>
where
    I: IntoIterator,
    I::Item: Into<ContentEntry>,
{
    DebBuilder::new(name, version, content, options)?.build()
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{dependency::BinaryDependency, error::ErrorKind},
        indoc::indoc,
        md5::Digest,
        std::{
            fs,
            io::{Cursor, Read},
        },
    };

    struct Unpacked {
        members: Vec<(String, Vec<u8>)>,
    }

    impl Unpacked {
        fn from_path(path: &Path) -> Result<Self> {
            Self::from_bytes(fs::read(path)?)
        }

        fn from_bytes(data: Vec<u8>) -> Result<Self> {
            let mut archive = ar::Archive::new(Cursor::new(data));
            let mut members = vec![];

            while let Some(entry) = archive.next_entry() {
                let mut entry = entry?;
                let name = String::from_utf8_lossy(entry.header().identifier()).to_string();
                let mut data = vec![];
                entry.read_to_end(&mut data)?;
                members.push((name, data));
            }

            Ok(Self { members })
        }

        fn names(&self) -> Vec<&str> {
            self.members.iter().map(|(n, _)| n.as_str()).collect()
        }

        fn member(&self, name: &str) -> &[u8] {
            &self
                .members
                .iter()
                .find(|(n, _)| n == name)
                .expect("member present")
                .1
        }

        fn tar_gz(&self, name: &str) -> Result<Vec<(PathBuf, u32, Vec<u8>)>> {
            let decoder = libflate::gzip::Decoder::new(Cursor::new(self.member(name)))?;
            let mut archive = tar::Archive::new(decoder);
            let mut res = vec![];

            for entry in archive.entries()? {
                let mut entry = entry?;
                let mut data = vec![];
                entry.read_to_end(&mut data)?;
                res.push((entry.path()?.to_path_buf(), entry.header().mode()?, data));
            }

            Ok(res)
        }

        fn control_member(&self, path: &str) -> Result<Vec<u8>> {
            Ok(self
                .tar_gz("control.tar.gz")?
                .into_iter()
                .find(|(p, _, _)| p == Path::new(path))
                .expect("control member present")
                .2)
        }

        fn control(&self) -> Result<String> {
            Ok(String::from_utf8(self.control_member("./control")?).expect("UTF-8 control"))
        }
    }

    fn fixed_options(out: &Path) -> DebOptions {
        DebOptions::default()
            .output_directory(out)
            .mtime(SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_600_000_000))
    }

    #[test]
    fn readme_scenario() -> Result<()> {
        let td = tempfile::tempdir()?;
        let readme = td.path().join("README");
        fs::write(&readme, b"Read me, please.\n")?;

        let path = make_deb(
            "pkg",
            "1.0",
            [(&readme, "usr/share/doc/pkg/README")],
            &DebOptions::default().output_directory(td.path()),
        )?;
        assert_eq!(path, td.path().join("pkg_1.0_all.deb"));
        assert!(path.is_file());

        let deb = Unpacked::from_path(&path)?;
        assert_eq!(
            deb.names(),
            vec!["debian-binary", "control.tar.gz", "data.tar.gz"]
        );
        assert_eq!(deb.member("debian-binary"), b"2.0\n");

        let control = deb.control()?;
        assert!(control.starts_with("Package: pkg\n"));
        assert!(control.contains("\nVersion: 1.0\n"));
        assert!(control.contains("\nArchitecture: all\n"));
        assert!(control.contains("\nInstalled-Size: 1\n"));
        assert!(!control.contains("Maintainer"));
        assert!(!control.contains("Description"));

        let control_paths = deb
            .tar_gz("control.tar.gz")?
            .into_iter()
            .map(|(p, m, _)| (p, m))
            .collect::<Vec<_>>();
        assert_eq!(
            control_paths,
            vec![
                (PathBuf::from("./control"), 0o644),
                (PathBuf::from("./md5sums"), 0o644)
            ]
        );

        let data = deb.tar_gz("data.tar.gz")?;
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].0, Path::new("./usr/share/doc/pkg/README"));
        assert_eq!(data[0].2, b"Read me, please.\n");
        assert_eq!(data[0].1, file_mode(&fs::metadata(&readme)?));

        let md5sums = String::from_utf8(deb.control_member("./md5sums")?).expect("UTF-8");
        assert_eq!(
            md5sums,
            format!(
                "{}  usr/share/doc/pkg/README\n",
                hex::encode(md5::Md5::digest(b"Read me, please.\n"))
            )
        );

        Ok(())
    }

    #[test]
    fn full_control_file() -> Result<()> {
        let td = tempfile::tempdir()?;
        let bin = td.path().join("hello");
        fs::write(&bin, vec![0u8; 2049])?;

        let options = fixed_options(td.path())
            .architecture("amd64")
            .maintainer("Jane Doe <jane@example.com>")
            .homepage("https://example.com/hello")
            .section("utils")
            .priority("optional")
            .depends("libc6 (>= 2.4)")
            .relationship(BinaryDependency::PreDepends, "dpkg (>= 1.15.6~)")
            .description("Say hello\nA friendly program.\n\nIt greets you.");

        let path = make_deb("hello", "1:2.0-1", [(&bin, "usr/bin/hello")], &options)?;
        assert_eq!(path, td.path().join("hello_2.0-1_amd64.deb"));

        assert_eq!(
            Unpacked::from_path(&path)?.control()?,
            indoc! {"
                Package: hello
                Version: 1:2.0-1
                Architecture: amd64
                Maintainer: Jane Doe <jane@example.com>
                Installed-Size: 3
                Pre-Depends: dpkg (>= 1.15.6~)
                Depends: libc6 (>= 2.4)
                Homepage: https://example.com/hello
                Section: utils
                Priority: optional
                Description: Say hello
                 A friendly program.
                 .
                 It greets you.
            "}
        );

        Ok(())
    }

    #[test]
    fn builds_are_deterministic() -> Result<()> {
        let td = tempfile::tempdir()?;
        let src = td.path().join("src");
        fs::create_dir_all(src.join("sub"))?;
        fs::write(src.join("sub/b"), b"b")?;
        fs::write(src.join("a"), b"a")?;

        let build = |out: &str| -> Result<Vec<u8>> {
            let out = td.path().join(out);
            fs::create_dir(&out)?;
            let path = make_deb("pkg", "1.0", [(&src, "opt/pkg")], &fixed_options(&out))?;
            Ok(fs::read(path)?)
        };

        assert_eq!(build("one")?, build("two")?);

        Ok(())
    }

    #[test]
    fn directory_sources_and_entries() -> Result<()> {
        let td = tempfile::tempdir()?;
        let usr_root = td.path().join("usr_root");
        let etc_root = td.path().join("etc_root");
        fs::create_dir_all(usr_root.join("dir"))?;
        fs::create_dir_all(etc_root.join("dir1"))?;
        fs::write(usr_root.join("file"), b"testfile1")?;
        fs::write(usr_root.join("dir/file"), b"testfile2")?;
        fs::write(etc_root.join("dir1/conf"), b"config")?;

        let content = vec![
            ContentEntry::new(&usr_root, "usr"),
            ContentEntry::new(etc_root.join("dir1/conf"), "etc/conf"),
        ];
        let path = make_deb(
            "helloworld",
            "0.1",
            content,
            &fixed_options(td.path()).directory_entries(true),
        )?;

        let deb = Unpacked::from_path(&path)?;
        let data_paths = deb
            .tar_gz("data.tar.gz")?
            .into_iter()
            .map(|(p, _, _)| p)
            .collect::<Vec<_>>();
        assert_eq!(
            data_paths,
            vec![
                PathBuf::from("./"),
                PathBuf::from("./usr/"),
                PathBuf::from("./usr/dir/"),
                PathBuf::from("./usr/dir/file"),
                PathBuf::from("./usr/file"),
                PathBuf::from("./etc/"),
                PathBuf::from("./etc/conf"),
            ]
        );

        let md5sums = String::from_utf8(deb.control_member("./md5sums")?).expect("UTF-8");
        assert!(md5sums.contains(&format!(
            "{}  usr/file\n",
            hex::encode(md5::Md5::digest(b"testfile1"))
        )));
        assert_eq!(md5sums.lines().count(), 3);

        // 9 + 9 + 6 bytes.
        assert!(deb.control()?.contains("Installed-Size: 1\n"));

        Ok(())
    }

    #[test]
    fn empty_package() -> Result<()> {
        let td = tempfile::tempdir()?;
        let content: Vec<ContentEntry> = vec![];

        let path = make_deb("empty", "1.0", content, &fixed_options(td.path()))?;
        let deb = Unpacked::from_path(&path)?;

        assert!(deb.control()?.contains("Installed-Size: 0\n"));
        assert!(deb.tar_gz("data.tar.gz")?.is_empty());
        assert!(deb.control_member("./md5sums")?.is_empty());

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn modes_are_preserved() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let td = tempfile::tempdir()?;
        let tool = td.path().join("tool");
        fs::write(&tool, b"#!/bin/sh\necho hi\n")?;
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755))?;
        let secret = td.path().join("secret");
        fs::write(&secret, b"s")?;
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o600))?;

        let path = make_deb(
            "modes",
            "1.0",
            [(&tool, "usr/bin/tool"), (&secret, "etc/modes/secret")],
            &fixed_options(td.path()),
        )?;

        let data = Unpacked::from_path(&path)?.tar_gz("data.tar.gz")?;
        assert_eq!(data[0].1, 0o755);
        assert_eq!(data[1].1, 0o600);
        assert_eq!(
            fs::metadata(&path)?.permissions().mode() & 0o777,
            0o644
        );

        Ok(())
    }

    #[test]
    fn control_files() -> Result<()> {
        let td = tempfile::tempdir()?;
        let preinst = td.path().join("preinst.sh");
        let postrm = td.path().join("postrm.sh");
        fs::write(&preinst, "#!/bin/sh\necho preinst\n")?;
        fs::write(&postrm, "#!/bin/sh\necho postrm\n")?;
        let content: Vec<ContentEntry> = vec![];

        let options = fixed_options(td.path())
            .control_file(&preinst, "preinst")
            .control_file(&postrm, "postrm");
        let path = make_deb("scripts", "1.0", content, &options)?;

        let deb = Unpacked::from_path(&path)?;
        let names = deb
            .tar_gz("control.tar.gz")?
            .into_iter()
            .map(|(p, _, _)| p)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                PathBuf::from("./control"),
                PathBuf::from("./md5sums"),
                PathBuf::from("./preinst"),
                PathBuf::from("./postrm"),
            ]
        );
        assert_eq!(
            deb.control_member("./preinst")?,
            b"#!/bin/sh\necho preinst\n"
        );

        Ok(())
    }

    #[test]
    fn control_file_names_are_validated() -> Result<()> {
        let td = tempfile::tempdir()?;
        let script = td.path().join("script");
        fs::write(&script, "#!/bin/sh\n")?;

        for name in ["control", "md5sums", "", "../postinst", "a/b"] {
            let content: Vec<ContentEntry> = vec![];
            let res = DebBuilder::new(
                "pkg",
                "1.0",
                content,
                &fixed_options(td.path()).control_file(&script, name),
            );
            assert!(
                matches!(res, Err(DebError::InvalidControlMemberName(_))),
                "{:?} rejected",
                name
            );
        }

        Ok(())
    }

    #[test]
    fn alternate_compression() -> Result<()> {
        let td = tempfile::tempdir()?;
        let f = td.path().join("f");
        fs::write(&f, b"data")?;

        let mut buffer = vec![];
        DebBuilder::new(
            "pkg",
            "1.0",
            [(&f, "opt/f")],
            &fixed_options(td.path()).compression(DebCompression::Xz(6)),
        )?
        .write(&mut buffer)?;

        let deb = Unpacked::from_bytes(buffer)?;
        assert_eq!(
            deb.names(),
            vec!["debian-binary", "control.tar.xz", "data.tar.xz"]
        );

        let mut data = vec![];
        xz2::read::XzDecoder::new(Cursor::new(deb.member("data.tar.xz"))).read_to_end(&mut data)?;
        let mut archive = tar::Archive::new(Cursor::new(data));
        let entry = archive.entries()?.next().expect("one entry")?;
        assert_eq!(entry.path()?, Path::new("./opt/f"));

        Ok(())
    }

    #[test]
    fn output_path_override() -> Result<()> {
        let td = tempfile::tempdir()?;
        let f = td.path().join("f");
        fs::write(&f, b"data")?;
        let target = td.path().join("custom-name.deb");

        let path = make_deb(
            "pkg",
            "1.0",
            [(&f, "opt/f")],
            &fixed_options(td.path()).output_path(&target),
        )?;
        assert_eq!(path, target);
        assert!(target.is_file());
        assert!(!td.path().join("pkg_1.0_all.deb").exists());

        Ok(())
    }

    fn dir_entries(path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        Ok(entries)
    }

    #[test]
    fn validation_errors_write_nothing() -> Result<()> {
        let td = tempfile::tempdir()?;
        let f = td.path().join("f");
        fs::write(&f, b"data")?;
        let out = td.path().join("out");
        fs::create_dir(&out)?;

        for (name, version, destination) in [
            ("Pkg", "1.0", "opt/f"),
            ("my pkg", "1.0", "opt/f"),
            ("pkg", "1.0 beta", "opt/f"),
            ("pkg", "", "opt/f"),
            ("pkg", "1.0", "../../etc/passwd"),
            ("pkg", "1.0", "/etc/passwd"),
        ] {
            let err = make_deb(name, version, [(&f, destination)], &fixed_options(&out))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{} {} {}", name, version, destination);
        }

        assert!(dir_entries(&out)?.is_empty());

        Ok(())
    }

    #[test]
    fn io_errors_leave_no_output() -> Result<()> {
        let td = tempfile::tempdir()?;
        let out = td.path().join("out");
        fs::create_dir(&out)?;

        let err = make_deb(
            "pkg",
            "1.0",
            [(td.path().join("missing"), "opt/f")],
            &fixed_options(&out),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(dir_entries(&out)?.is_empty());

        // A source that shrinks after resolution fails while archiving.
        let f = td.path().join("f");
        fs::write(&f, b"some data")?;
        let builder = DebBuilder::new("pkg", "1.0", [(&f, "opt/f")], &fixed_options(&out))?;
        fs::write(&f, b"")?;
        let err = builder.build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(dir_entries(&out)?.is_empty());

        Ok(())
    }

    #[test]
    fn missing_output_directory() -> Result<()> {
        let td = tempfile::tempdir()?;
        let f = td.path().join("f");
        fs::write(&f, b"data")?;

        let err = make_deb(
            "pkg",
            "1.0",
            [(&f, "opt/f")],
            &fixed_options(&td.path().join("does/not/exist")),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);

        Ok(())
    }

    #[test]
    fn md5sums_match_archived_content() -> Result<()> {
        let td = tempfile::tempdir()?;
        let f = td.path().join("f");
        fs::write(&f, b"AAAA")?;

        let builder = DebBuilder::new("pkg", "1.0", [(&f, "opt/f")], &fixed_options(td.path()))?;
        // Same size, different content.
        fs::write(&f, b"BBBB")?;
        let path = builder.build()?;

        let deb = Unpacked::from_path(&path)?;
        assert_eq!(deb.tar_gz("data.tar.gz")?[0].2, b"BBBB");
        assert_eq!(
            deb.control_member("./md5sums")?,
            format!("{}  opt/f\n", hex::encode(md5::Md5::digest(b"BBBB"))).into_bytes()
        );

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_file_names() -> Result<()> {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let td = tempfile::tempdir()?;
        let src = td.path().join("src");
        fs::create_dir(&src)?;
        let name = OsStr::from_bytes(b"caf\xe9");
        fs::write(src.join(name), b"coffee")?;

        let path = make_deb("pkg", "1.0", [(&src, "opt/x")], &fixed_options(td.path()))?;
        let deb = Unpacked::from_path(&path)?;

        let data = deb.tar_gz("data.tar.gz")?;
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].0, Path::new("./opt/x").join(name));

        let mut expected = hex::encode(md5::Md5::digest(b"coffee")).into_bytes();
        expected.extend_from_slice(b"  opt/x/caf\xe9\n");
        assert_eq!(deb.control_member("./md5sums")?, expected);

        Ok(())
    }
}
