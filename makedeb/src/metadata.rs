// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Package metadata and build options.

[DebOptions] enumerates everything a caller can tune about a build. [PackageMetadata]
is the validated subset of it that ends up in the `control` file.
*/

use {
    crate::{
        deb::DebCompression,
        dependency::{BinaryDependency, DependencyList, PackageDependencyFields},
        error::{DebError, Result},
        package_version::PackageVersion,
    },
    once_cell::sync::Lazy,
    regex::Regex,
    std::{
        path::{Path, PathBuf},
        time::SystemTime,
    },
};

/// Grammar of a package name, without anchors.
///
/// Package names consist of lower case letters, digits, `+`, `-` and `.`, are at least
/// two characters long, and start with an alphanumeric character.
pub const PACKAGE_NAME_PATTERN: &str = r"[a-z0-9][a-z0-9+.\-]+";

static RE_PACKAGE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{}$", PACKAGE_NAME_PATTERN)).expect("package name regex is valid")
});

static RE_ARCHITECTURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*$").expect("architecture regex is valid"));

/// The architecture used when none is specified.
pub const DEFAULT_ARCHITECTURE: &str = "all";

/// Validate a package name against the Debian package name grammar.
pub fn validate_package_name(name: &str) -> Result<()> {
    if RE_PACKAGE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(DebError::InvalidPackageName(name.to_string()))
    }
}

/// Validate a version string against the Debian version grammar.
pub fn validate_version(version: &str) -> Result<PackageVersion> {
    PackageVersion::parse(version).map_err(|e| DebError::InvalidVersion(version.to_string(), e))
}

/// Ensure a single-line field value can't break out of its control field.
fn validate_single_line(field: &'static str, value: &str) -> Result<()> {
    if value.chars().any(|c| c.is_control() && c != '\t') {
        Err(DebError::InvalidFieldValue(field, value.to_string()))
    } else {
        Ok(())
    }
}

/// Normalize an optional text field so blank values count as absent.
fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// Validated metadata describing a binary package.
///
/// Instances can only be obtained through validation, so a [PackageMetadata] always holds
/// a legal name, version and architecture.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageMetadata {
    name: String,
    version: PackageVersion,
    architecture: String,
    maintainer: Option<String>,
    homepage: Option<String>,
    description: Option<String>,
    section: Option<String>,
    priority: Option<String>,
    relationships: PackageDependencyFields,
}

impl PackageMetadata {
    /// Construct metadata with only a name and version.
    pub fn new(name: &str, version: &str) -> Result<Self> {
        DebOptions::default().to_metadata(name, version)
    }

    /// The package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package version.
    pub fn version(&self) -> &PackageVersion {
        &self.version
    }

    /// The package architecture.
    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    pub fn maintainer(&self) -> Option<&str> {
        self.maintainer.as_deref()
    }

    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    /// The description. The first line is the synopsis.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }

    /// Relationships to other packages.
    pub fn relationships(&self) -> &PackageDependencyFields {
        &self.relationships
    }

    /// The conventional file name of this package: `<name>_<version>_<arch>.deb`.
    ///
    /// The version epoch is not part of the file name.
    pub fn deb_filename(&self) -> String {
        format!(
            "{}_{}_{}.deb",
            self.name,
            self.version.filename_version(),
            self.architecture
        )
    }
}

/// An extra file to place in the `control.tar` archive.
///
/// These are typically maintainer scripts like `preinst` and `postrm`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControlFileSource {
    /// Where the content is read from.
    pub source: PathBuf,
    /// The member name inside the control archive.
    pub name: String,
}

/// Options controlling a package build.
///
/// Every option has a default, so `DebOptions::default()` yields a usable configuration:
///
/// | Option | Default |
/// |--------|---------|
/// | `architecture` | `all` |
/// | `maintainer`, `homepage`, `description`, `section`, `priority` | absent |
/// | relationship fields (`depends` etc.) | empty, not rendered |
/// | `output_directory` | the current directory |
/// | `output_path` | `<output_directory>/<name>_<version>_<arch>.deb` |
/// | `mtime` | the time the build starts |
/// | `compression` | gzip |
/// | `control_files` | none |
/// | `exclude` | none |
/// | `directory_entries` | `false` |
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebOptions {
    architecture: Option<String>,
    maintainer: Option<String>,
    homepage: Option<String>,
    description: Option<String>,
    section: Option<String>,
    priority: Option<String>,
    relationships: Vec<(BinaryDependency, String)>,
    output_directory: Option<PathBuf>,
    output_path: Option<PathBuf>,
    mtime: Option<SystemTime>,
    compression: DebCompression,
    control_files: Vec<ControlFileSource>,
    exclude: Vec<String>,
    directory_entries: bool,
}

impl DebOptions {
    /// Set the package architecture, e.g. `amd64`.
    #[must_use]
    pub fn architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = Some(architecture.into());
        self
    }

    /// Set the free-form `Maintainer` field, typically `Name <email>`.
    #[must_use]
    pub fn maintainer(mut self, maintainer: impl Into<String>) -> Self {
        self.maintainer = Some(maintainer.into());
        self
    }

    /// Set the `Homepage` URL.
    #[must_use]
    pub fn homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    /// Set the description.
    ///
    /// The first line becomes the synopsis. Any following lines form the extended
    /// description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Add an entry to a relationship field.
    ///
    /// `expression` uses the control file syntax, e.g. `libc6 (>= 2.4)` or
    /// `default-mta | mail-transport-agent`. It may also hold a comma-separated list.
    /// Expressions are validated when the build starts.
    #[must_use]
    pub fn relationship(mut self, field: BinaryDependency, expression: impl Into<String>) -> Self {
        self.relationships.push((field, expression.into()));
        self
    }

    /// Add a `Depends` entry.
    #[must_use]
    pub fn depends(self, expression: impl Into<String>) -> Self {
        self.relationship(BinaryDependency::Depends, expression)
    }

    /// Add multiple `Depends` entries.
    #[must_use]
    pub fn dependencies<S: Into<String>>(self, expressions: impl IntoIterator<Item = S>) -> Self {
        expressions
            .into_iter()
            .fold(self, |options, expression| options.depends(expression))
    }

    /// Set the directory the `.deb` is written to.
    #[must_use]
    pub fn output_directory(mut self, path: impl AsRef<Path>) -> Self {
        self.output_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the full path of the `.deb` to write.
    ///
    /// This takes precedence over [Self::output_directory()].
    #[must_use]
    pub fn output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the modified time to use on archive members.
    ///
    /// Builds with the same inputs and the same mtime are byte-for-byte identical.
    #[must_use]
    pub fn mtime(mut self, time: SystemTime) -> Self {
        self.mtime = Some(time);
        self
    }

    /// Set the compression applied to the inner archives.
    #[must_use]
    pub fn compression(mut self, compression: DebCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Add an extra file to the control archive under `name`.
    #[must_use]
    pub fn control_file(mut self, source: impl AsRef<Path>, name: impl Into<String>) -> Self {
        self.control_files.push(ControlFileSource {
            source: source.as_ref().to_path_buf(),
            name: name.into(),
        });
        self
    }

    /// Exclude files whose name matches a glob pattern, e.g. `*.pyc`.
    ///
    /// Patterns apply to files and directories found while expanding directory sources.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Emit explicit entries for the root and every parent directory in the archives.
    #[must_use]
    pub fn directory_entries(mut self, enabled: bool) -> Self {
        self.directory_entries = enabled;
        self
    }

    pub fn get_compression(&self) -> DebCompression {
        self.compression
    }

    pub fn get_mtime(&self) -> Option<SystemTime> {
        self.mtime
    }

    pub fn get_control_files(&self) -> &[ControlFileSource] {
        &self.control_files
    }

    pub fn get_directory_entries(&self) -> bool {
        self.directory_entries
    }

    /// Compile the exclude patterns.
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.exclude
            .iter()
            .map(|p| glob::Pattern::new(p).map_err(DebError::from))
            .collect()
    }

    /// Resolve where the `.deb` for the given metadata is written.
    pub fn resolve_output_path(&self, metadata: &PackageMetadata) -> PathBuf {
        if let Some(path) = &self.output_path {
            path.clone()
        } else {
            self.output_directory
                .clone()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(metadata.deb_filename())
        }
    }

    /// Validate all metadata options and produce [PackageMetadata].
    pub fn to_metadata(&self, name: &str, version: &str) -> Result<PackageMetadata> {
        validate_package_name(name)?;
        let version = validate_version(version)?;

        let architecture = non_blank(self.architecture.as_ref())
            .unwrap_or_else(|| DEFAULT_ARCHITECTURE.to_string());
        if !RE_ARCHITECTURE.is_match(&architecture) {
            return Err(DebError::InvalidArchitecture(architecture));
        }

        let maintainer = non_blank(self.maintainer.as_ref());
        let homepage = non_blank(self.homepage.as_ref());
        let section = non_blank(self.section.as_ref());
        let priority = non_blank(self.priority.as_ref());

        for (field, value) in [
            ("Maintainer", &maintainer),
            ("Homepage", &homepage),
            ("Section", &section),
            ("Priority", &priority),
        ] {
            if let Some(value) = value {
                validate_single_line(field, value)?;
            }
        }

        let description = non_blank(self.description.as_ref());
        if let Some(description) = &description {
            for line in description.lines() {
                validate_single_line("Description", line)?;
            }
        }

        let mut relationships = PackageDependencyFields::default();
        for (field, expression) in &self.relationships {
            let parsed = DependencyList::parse(expression)?;
            let list = relationships.binary_dependency_mut(*field);
            for requirement in parsed.requirements() {
                list.push(requirement.clone());
            }
        }

        Ok(PackageMetadata {
            name: name.to_string(),
            version,
            architecture,
            maintainer,
            homepage,
            description,
            section,
            priority,
            relationships,
        })
    }
}
