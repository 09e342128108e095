// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Control file generation.

See <https://www.debian.org/doc/debian-policy/ch-controlfields.html>
for the canonical source of truth for how control files work.
*/

use {
    crate::metadata::PackageMetadata,
    std::{borrow::Cow, io::Write},
};

/// A field in a control file.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ControlField<'a> {
    name: Cow<'a, str>,
    value: Cow<'a, str>,
}

impl<'a> ControlField<'a> {
    /// Construct an instance from a field name and value.
    pub fn new(name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Construct a multiline field from an iterable of lines.
    ///
    /// The first line is written after the field name. Every following line is
    /// indented by a single space and blank lines become ` .`, since a truly empty
    /// line would terminate the paragraph.
    pub fn from_lines<'l>(name: impl Into<Cow<'a, str>>, lines: impl Iterator<Item = &'l str>) -> Self {
        let value = lines
            .enumerate()
            .map(|(i, line)| {
                let line = line.trim_end();
                if i == 0 {
                    line.to_string()
                } else if line.is_empty() {
                    " .".to_string()
                } else {
                    format!(" {}", line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        Self::new(name, value)
    }

    /// The name of this field.
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Obtain the value as a [&str].
    ///
    /// The value's file formatting (including newlines and leading whitespace)
    /// is included.
    pub fn value_str(&self) -> &str {
        self.value.as_ref()
    }

    /// Write the contents of this field to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.name.as_bytes())?;
        writer.write_all(b":")?;
        if !self.value.is_empty() && !self.value.starts_with('\n') {
            writer.write_all(b" ")?;
        }
        writer.write_all(self.value.as_ref().as_bytes())?;
        writer.write_all(b"\n")
    }
}

/// A paragraph in a control file.
///
/// A paragraph is an ordered series of control fields. Fields are written in
/// insertion order.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ControlParagraph<'a> {
    fields: Vec<ControlField<'a>>,
}

impl<'a> ControlParagraph<'a> {
    /// Set the value of a field via a [ControlField].
    ///
    /// If a field with the same name (case insensitive compare) already exists, the old value
    /// will be replaced by the incoming value.
    pub fn set_field(&mut self, field: ControlField<'a>) {
        self.fields
            .retain(|cf| cf.name.to_lowercase() != field.name.to_lowercase());
        self.fields.push(field);
    }

    /// Set the value of a field defined via strings.
    pub fn set_field_from_string(
        &mut self,
        name: impl Into<Cow<'a, str>>,
        value: impl Into<Cow<'a, str>>,
    ) {
        self.set_field(ControlField::new(name, value));
    }

    /// Iterate over fields in this paragraph.
    pub fn iter_fields(&self) -> impl Iterator<Item = &ControlField<'a>> {
        self.fields.iter()
    }

    /// Obtain the field with a given name in this paragraph.
    pub fn field(&self, name: &str) -> Option<&'_ ControlField<'a>> {
        self.fields
            .iter()
            .find(|f| f.name.as_ref().to_lowercase() == name.to_lowercase())
    }

    /// Obtain the raw string value of the named field.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.value_str())
    }

    /// Serialize the paragraph to a writer.
    ///
    /// A trailing newline is written after the last field.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for field in &self.fields {
            field.write(writer)?;
        }

        Ok(())
    }
}

/// Compute the `Installed-Size` value in KiB.
///
/// This is `ceil(total_bytes / 1024)`, but at least 1 when the package has any file.
pub fn installed_size_kib(total_bytes: u64, file_count: usize) -> u64 {
    if file_count == 0 {
        0
    } else {
        ((total_bytes + 1023) / 1024).max(1)
    }
}

/// Render the `control` file of a binary package.
///
/// Fields are emitted in a fixed order: `Package`, `Version`, `Architecture`,
/// `Maintainer`, `Installed-Size`, the relationship fields, `Homepage`, `Section`,
/// `Priority`, `Description`. Absent optional fields are omitted entirely.
pub fn binary_control_paragraph(
    metadata: &PackageMetadata,
    installed_size_kib: u64,
) -> ControlParagraph<'_> {
    let mut para = ControlParagraph::default();

    para.set_field_from_string("Package", metadata.name());
    para.set_field_from_string("Version", metadata.version().to_string());
    para.set_field_from_string("Architecture", metadata.architecture());
    if let Some(maintainer) = metadata.maintainer() {
        para.set_field_from_string("Maintainer", maintainer);
    }
    para.set_field_from_string("Installed-Size", installed_size_kib.to_string());

    for (field, list) in metadata.relationships().iter_populated() {
        para.set_field_from_string(field.field_name(), list.to_string());
    }

    if let Some(homepage) = metadata.homepage() {
        para.set_field_from_string("Homepage", homepage);
    }
    if let Some(section) = metadata.section() {
        para.set_field_from_string("Section", section);
    }
    if let Some(priority) = metadata.priority() {
        para.set_field_from_string("Priority", priority);
    }
    if let Some(description) = metadata.description() {
        para.set_field(ControlField::from_lines(
            "Description",
            description.trim_end().lines(),
        ));
    }

    para
}
