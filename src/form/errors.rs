use gpui::SharedString;
use indexmap::IndexMap;
use serde::Serialize;

use super::value::FieldName;

/// The failing validator reported for a field.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ErrorEntry {
    #[serde(rename = "type", serialize_with = "serialize_shared")]
    pub kind: SharedString,
    #[serde(serialize_with = "serialize_shared")]
    pub message: SharedString,
}

impl ErrorEntry {
    pub fn new(kind: impl Into<SharedString>, message: impl Into<SharedString>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Field name to its single current failure.
///
/// A field has an entry exactly while its last validation pass failed. Entries
/// keep the order in which fields first failed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorTable {
    entries: IndexMap<FieldName, ErrorEntry>,
}

impl ErrorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ErrorEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether `name` has an error, and when `kind` is given, whether that
    /// error came from a validator of that kind. Drives per-kind messages.
    pub fn matches(&self, name: &str, kind: Option<&str>) -> bool {
        self.entries
            .get(name)
            .is_some_and(|entry| kind.is_none_or(|kind| &*entry.kind == kind))
    }

    /// The first name in `priority` that has an error, for showing one
    /// message out of several related fields.
    pub fn first_errored<'a>(&self, priority: &[&'a str]) -> Option<&'a str> {
        priority.iter().copied().find(|name| self.contains(name))
    }

    pub fn set(&mut self, name: FieldName, entry: ErrorEntry) {
        self.entries.insert(name, entry);
    }

    pub fn remove(&mut self, name: &str) -> Option<ErrorEntry> {
        self.entries.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &ErrorEntry)> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &FieldName> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn serialize_shared<S>(value: &SharedString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(value.as_ref())
}
