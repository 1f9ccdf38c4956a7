//! Schema path <-> form field name conversion
//!
//! The JSON editor addresses a field by a dot-separated schema path
//! (`root.label.0.text`) but renders its inputs with bracket-style names
//! (`root[label][0][text]`). Property checkboxes use a third form where only
//! the last separator becomes a dash (`root-orderer`).
//!
//! The free functions are total: they never fail and leave malformed input
//! in whatever shape the string rewrites produce. [`SchemaPath`] is the
//! validated form used where a path is parsed from user input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// First segment of every schema path
pub const ROOT: &str = "root";

/// Convert a dot-separated schema path to a form field name.
///
/// ```
/// use osw_common::schema_path_to_name;
/// assert_eq!(schema_path_to_name("root.label.0.text"), "root[label][0][text]");
/// assert_eq!(schema_path_to_name("root"), "root");
/// ```
pub fn schema_path_to_name(path: &str) -> String {
    let mut segments = path.split('.');
    let mut name = String::with_capacity(path.len() + 2);

    if let Some(first) = segments.next() {
        name.push_str(first);
    }
    for segment in segments {
        name.push('[');
        name.push_str(segment);
        name.push(']');
    }

    name
}

/// Convert a form field name back to a dot-separated schema path.
///
/// ```
/// use osw_common::name_to_schema_path;
/// assert_eq!(name_to_schema_path("root[label][0][text]"), "root.label.0.text");
/// assert_eq!(name_to_schema_path("root"), "root");
/// ```
pub fn name_to_schema_path(name: &str) -> String {
    name.replace("][", ".").replace('[', ".").replace(']', "")
}

/// Derive the id of the "additional property" checkbox for a schema path.
///
/// Only the last `.` is replaced; a path without any `.` is returned as is.
pub fn schema_path_to_property_checkbox_id(path: &str) -> String {
    match path.rfind('.') {
        Some(idx) => format!("{}-{}", &path[..idx], &path[idx + 1..]),
        None => path.to_string(),
    }
}

/// A validated schema path.
///
/// Invariants: the first segment is `root`, no segment is empty and no
/// segment contains `.`, `[` or `]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaPath(String);

impl SchemaPath {
    /// The root path (`root`)
    pub fn root() -> Self {
        SchemaPath(ROOT.to_string())
    }

    /// Parse and validate a dot-separated path
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSchemaPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = path.split('.');
        match segments.next() {
            Some(ROOT) => {}
            _ => return Err(invalid("first segment must be 'root'")),
        }
        for segment in segments {
            check_segment(segment).map_err(|reason| invalid(reason))?;
        }

        Ok(SchemaPath(path.to_string()))
    }

    /// Parse a bracket-style field name into a validated path
    pub fn from_field_name(name: &str) -> Result<Self> {
        if name.matches('[').count() != name.matches(']').count() {
            return Err(Error::InvalidSchemaPath {
                path: name.to_string(),
                reason: "unbalanced brackets".to_string(),
            });
        }
        Self::parse(&name_to_schema_path(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segments in order, starting with `root`
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Nesting depth below `root`
    pub fn depth(&self) -> usize {
        self.0.matches('.').count()
    }

    /// Append a field name or array index
    pub fn child(&self, segment: impl fmt::Display) -> Result<Self> {
        let segment = segment.to_string();
        check_segment(&segment).map_err(|reason| Error::InvalidSchemaPath {
            path: format!("{}.{}", self.0, segment),
            reason: reason.to_string(),
        })?;
        Ok(SchemaPath(format!("{}.{}", self.0, segment)))
    }

    /// Parent path, `None` for `root`
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rfind('.')
            .map(|idx| SchemaPath(self.0[..idx].to_string()))
    }

    pub fn to_field_name(&self) -> String {
        schema_path_to_name(&self.0)
    }

    pub fn to_property_checkbox_id(&self) -> String {
        schema_path_to_property_checkbox_id(&self.0)
    }
}

fn check_segment(segment: &str) -> std::result::Result<(), &'static str> {
    if segment.is_empty() {
        return Err("empty segment");
    }
    if segment.contains(['.', '[', ']']) {
        return Err("segment contains '.', '[' or ']'");
    }
    Ok(())
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SchemaPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SchemaPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SchemaPath> for String {
    fn from(path: SchemaPath) -> Self {
        path.0
    }
}

impl AsRef<str> for SchemaPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("root.label.0.text", "root[label][0][text]" ; "nested array item")]
    #[test_case("root.label", "root[label]" ; "single child")]
    #[test_case("root.orderer", "root[orderer]" ; "property")]
    #[test_case("root", "root" ; "root only")]
    fn test_schema_path_to_name(path: &str, name: &str) {
        assert_eq!(schema_path_to_name(path), name);
        assert_eq!(name_to_schema_path(name), path);
    }

    #[test_case("root.orderer", "root-orderer")]
    #[test_case("root.actionees", "root-actionees")]
    #[test_case("root.label.0.text", "root.label.0-text")]
    #[test_case("root", "root")]
    fn test_property_checkbox_id(path: &str, id: &str) {
        assert_eq!(schema_path_to_property_checkbox_id(path), id);
    }

    #[test]
    fn test_name_only_has_brackets_for_children() {
        assert!(!schema_path_to_name("root").contains('['));
        let name = schema_path_to_name("root.a.b");
        assert_eq!(name.matches('[').count(), name.matches(']').count());
    }

    #[test]
    fn test_parse_rejects_invalid_paths() {
        assert!(SchemaPath::parse("label.text").is_err());
        assert!(SchemaPath::parse("root..text").is_err());
        assert!(SchemaPath::parse("root.").is_err());
        assert!(SchemaPath::parse("root.a[0]").is_err());
        assert!(SchemaPath::parse("").is_err());
    }

    #[test]
    fn test_child_and_parent() {
        let path = SchemaPath::root().child("actionees").unwrap().child(0).unwrap();
        assert_eq!(path.as_str(), "root.actionees.0");
        assert_eq!(path.depth(), 2);
        assert_eq!(path.parent().unwrap().as_str(), "root.actionees");
        assert_eq!(SchemaPath::root().parent(), None);
        assert!(SchemaPath::root().child("a.b").is_err());
    }

    #[test]
    fn test_from_field_name() {
        let path = SchemaPath::from_field_name("root[label][0][text]").unwrap();
        assert_eq!(path.segments().collect::<Vec<_>>(), ["root", "label", "0", "text"]);
        assert_eq!(path.to_field_name(), "root[label][0][text]");
        assert!(SchemaPath::from_field_name("root[label").is_err());
    }

    #[test]
    fn test_serde_validates() {
        #[derive(Deserialize)]
        struct Wrapper {
            path: SchemaPath,
        }

        let ok: Wrapper = toml::from_str(r#"path = "root.orderer""#).unwrap();
        assert_eq!(ok.path.to_property_checkbox_id(), "root-orderer");
        assert!(toml::from_str::<Wrapper>(r#"path = "orderer""#).is_err());
    }
}
