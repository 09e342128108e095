// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Debian package dependency syntax handling.

See <https://www.debian.org/doc/debian-policy/ch-relationships.html> for the specification.

Only the subset of the syntax that is legal in binary package control files is
supported: architecture and build profile restrictions are source package constructs
and are rejected.
 */

use {
    crate::{
        metadata::PACKAGE_NAME_PATTERN,
        package_version::{PackageVersion, VersionError},
    },
    once_cell::sync::Lazy,
    regex::Regex,
    std::{
        fmt::{Display, Formatter},
        ops::Deref,
        str::FromStr,
    },
    thiserror::Error,
};

/// Regular expression to parse a single dependency expression.
static RE_DEPENDENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?x)
        ^
        # Package name, with an optional architecture qualifier like `:any`.
        (?P<package>{}(?::[a-z0-9-]+)?)
        \s*
        # Relationships are within an optional parenthesis.
        (?:\(
            \s*
            (?P<relop><<|<=|=|>=|>>)
            \s*
            # Version string is everything up to space or closing parenthesis.
            (?P<version>[^\s)]+)
            \s*
        \))?
        $
        "#,
        PACKAGE_NAME_PATTERN
    ))
    .expect("dependency regex is valid")
});

/// Errors related to dependency handling.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DependencyError {
    #[error("failed to parse dependency expression: {0:?}")]
    Parse(String),

    #[error("invalid version in dependency expression {0:?}: {1}")]
    Version(String, VersionError),
}

/// Result type for dependency handling.
pub type Result<T> = std::result::Result<T, DependencyError>;

/// The operator in a versioned dependency.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VersionRelationship {
    StrictlyEarlier,
    EarlierOrEqual,
    ExactlyEqual,
    LaterOrEqual,
    StrictlyLater,
}

impl Display for VersionRelationship {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::StrictlyEarlier => write!(f, "<<"),
            Self::EarlierOrEqual => write!(f, "<="),
            Self::ExactlyEqual => write!(f, "="),
            Self::LaterOrEqual => write!(f, ">="),
            Self::StrictlyLater => write!(f, ">>"),
        }
    }
}

impl FromStr for VersionRelationship {
    type Err = DependencyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "<<" => Ok(Self::StrictlyEarlier),
            "<=" => Ok(Self::EarlierOrEqual),
            "=" => Ok(Self::ExactlyEqual),
            ">=" => Ok(Self::LaterOrEqual),
            ">>" => Ok(Self::StrictlyLater),
            _ => Err(DependencyError::Parse(s.to_string())),
        }
    }
}

/// Represents a version constraint on a given package.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DependencyVersionConstraint {
    pub relationship: VersionRelationship,
    pub version: PackageVersion,
}

impl Display for DependencyVersionConstraint {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.relationship, self.version)
    }
}

/// A dependency on a single package.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SingleDependency {
    /// Package the dependency is on.
    pub package: String,
    pub version_constraint: Option<DependencyVersionConstraint>,
}

impl Display for SingleDependency {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.package)?;
        if let Some(constraint) = &self.version_constraint {
            write!(f, " ({})", constraint)?;
        }

        Ok(())
    }
}

impl SingleDependency {
    /// Parse a single package dependency expression into a [SingleDependency].
    ///
    /// Accepts `name` and `name (op version)`.
    pub fn parse(s: &str) -> Result<Self> {
        let caps = RE_DEPENDENCY
            .captures(s.trim())
            .ok_or_else(|| DependencyError::Parse(s.to_string()))?;

        let package = caps["package"].to_string();
        let version_constraint = match (caps.name("relop"), caps.name("version")) {
            (Some(relop), Some(version)) => Some(DependencyVersionConstraint {
                relationship: VersionRelationship::from_str(relop.as_str())?,
                version: PackageVersion::parse(version.as_str())
                    .map_err(|e| DependencyError::Version(s.to_string(), e))?,
            }),
            _ => None,
        };

        Ok(Self {
            package,
            version_constraint,
        })
    }
}

impl FromStr for SingleDependency {
    type Err = DependencyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Alternative dependencies, delimited by `|`.
///
/// Any one of the variants satisfies the requirement.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DependencyVariants(Vec<SingleDependency>);

impl Display for DependencyVariants {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .iter()
                .map(|x| format!("{}", x))
                .collect::<Vec<_>>()
                .join(" | ")
        )
    }
}

impl Deref for DependencyVariants {
    type Target = Vec<SingleDependency>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<SingleDependency> for DependencyVariants {
    fn from(dependency: SingleDependency) -> Self {
        Self(vec![dependency])
    }
}

impl DependencyVariants {
    /// Parse a `|` delimited list of alternatives.
    pub fn parse(s: &str) -> Result<Self> {
        s.split('|')
            .map(SingleDependency::parse)
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

/// Represents an ordered list of dependencies, delimited by commas (`,`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DependencyList {
    dependencies: Vec<DependencyVariants>,
}

impl Display for DependencyList {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.dependencies
                .iter()
                .map(|x| format!("{}", x))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl DependencyList {
    /// Parse a dependency list from a string.
    ///
    /// A dependency list is a comma-delimited list of expressions. Each expression is a
    /// `|` delimited list of expressions of the form `package (version_relationship version)`.
    pub fn parse(s: &str) -> Result<Self> {
        s.split(',')
            .map(DependencyVariants::parse)
            .collect::<Result<Vec<_>>>()
            .map(|dependencies| Self { dependencies })
    }

    /// Whether the list holds no requirements.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Append a requirement to the list.
    pub fn push(&mut self, requirement: impl Into<DependencyVariants>) {
        self.dependencies.push(requirement.into());
    }

    /// Obtain the individual requirements constituting this list of dependencies.
    ///
    /// Each requirement is itself a set of alternatives. The length of this set is
    /// commonly 1.
    pub fn requirements(&self) -> impl Iterator<Item = &DependencyVariants> {
        self.dependencies.iter()
    }
}

impl FromStr for DependencyList {
    type Err = DependencyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Relationship fields of a binary package control file.
///
/// Variants are declared in the order the fields are rendered.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BinaryDependency {
    PreDepends,
    Depends,
    Recommends,
    Suggests,
    Breaks,
    Conflicts,
    Provides,
    Replaces,
}

impl BinaryDependency {
    /// Obtain all variants of this enum, in rendering order.
    pub fn values() -> &'static [Self] {
        &[
            Self::PreDepends,
            Self::Depends,
            Self::Recommends,
            Self::Suggests,
            Self::Breaks,
            Self::Conflicts,
            Self::Provides,
            Self::Replaces,
        ]
    }

    /// The control file field name.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::PreDepends => "Pre-Depends",
            Self::Depends => "Depends",
            Self::Recommends => "Recommends",
            Self::Suggests => "Suggests",
            Self::Breaks => "Breaks",
            Self::Conflicts => "Conflicts",
            Self::Provides => "Provides",
            Self::Replaces => "Replaces",
        }
    }
}

/// Holds all relationship fields of a binary package.
///
/// See <https://www.debian.org/doc/debian-policy/ch-relationships.html> for a list of all the
/// fields and what they mean.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PackageDependencyFields {
    /// `Pre-Depends`.
    pub pre_depends: DependencyList,

    /// `Depends`.
    pub depends: DependencyList,

    /// `Recommends`.
    pub recommends: DependencyList,

    /// `Suggests`.
    pub suggests: DependencyList,

    /// `Breaks`.
    pub breaks: DependencyList,

    /// `Conflicts`.
    pub conflicts: DependencyList,

    /// `Provides`.
    pub provides: DependencyList,

    /// `Replaces`.
    pub replaces: DependencyList,
}

impl PackageDependencyFields {
    /// Resolve the value of a given [BinaryDependency] field.
    pub fn binary_dependency(&self, field: BinaryDependency) -> &DependencyList {
        match field {
            BinaryDependency::PreDepends => &self.pre_depends,
            BinaryDependency::Depends => &self.depends,
            BinaryDependency::Recommends => &self.recommends,
            BinaryDependency::Suggests => &self.suggests,
            BinaryDependency::Breaks => &self.breaks,
            BinaryDependency::Conflicts => &self.conflicts,
            BinaryDependency::Provides => &self.provides,
            BinaryDependency::Replaces => &self.replaces,
        }
    }

    /// Mutable access to a given [BinaryDependency] field.
    pub fn binary_dependency_mut(&mut self, field: BinaryDependency) -> &mut DependencyList {
        match field {
            BinaryDependency::PreDepends => &mut self.pre_depends,
            BinaryDependency::Depends => &mut self.depends,
            BinaryDependency::Recommends => &mut self.recommends,
            BinaryDependency::Suggests => &mut self.suggests,
            BinaryDependency::Breaks => &mut self.breaks,
            BinaryDependency::Conflicts => &mut self.conflicts,
            BinaryDependency::Provides => &mut self.provides,
            BinaryDependency::Replaces => &mut self.replaces,
        }
    }

    /// Iterate over non-empty fields in rendering order.
    pub fn iter_populated(&self) -> impl Iterator<Item = (BinaryDependency, &DependencyList)> {
        BinaryDependency::values()
            .iter()
            .map(move |field| (*field, self.binary_dependency(*field)))
            .filter(|(_, list)| !list.is_empty())
    }
}
