use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use gpui::SharedString;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Name of a field, unique within one form.
///
/// Equality, ordering and hashing all go through the string content, so maps
/// keyed by `FieldName` can be queried with a plain `&str`.
#[derive(Clone, Debug)]
pub struct FieldName(SharedString);

impl FieldName {
    pub fn new(name: impl Into<SharedString>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }

    pub fn shared(&self) -> SharedString {
        self.0.clone()
    }
}

impl PartialEq for FieldName {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for FieldName {}

impl PartialEq<str> for FieldName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for FieldName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialOrd for FieldName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for FieldName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Display for FieldName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FieldName {
    fn from(value: &str) -> Self {
        Self(SharedString::from(value.to_owned()))
    }
}

impl From<String> for FieldName {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<SharedString> for FieldName {
    fn from(value: SharedString) -> Self {
        Self(value)
    }
}

impl From<&FieldName> for FieldName {
    fn from(value: &FieldName) -> Self {
        value.clone()
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A value as handed over by an input before it is stored.
///
/// Inputs disagree on shape: text boxes yield strings, number inputs yield
/// decimals, checkboxes yield booleans and multi-selects yield lists. The store
/// keeps none of these; everything is normalized to a string on the way in.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawValue {
    #[default]
    Absent,
    Text(SharedString),
    Number(Decimal),
    Bool(bool),
    List(Vec<SharedString>),
}

impl RawValue {
    /// Absent and falsy values (empty text, zero, `false`) become `""`,
    /// lists are comma-joined and everything else is rendered as text.
    pub fn normalize(&self) -> SharedString {
        match self {
            RawValue::Absent | RawValue::Bool(false) => SharedString::default(),
            RawValue::Text(text) => text.clone(),
            RawValue::Number(number) if number.is_zero() => SharedString::default(),
            RawValue::Number(number) => number.normalize().to_string().into(),
            RawValue::Bool(true) => SharedString::from("true"),
            RawValue::List(items) => items
                .iter()
                .map(|item| item.as_ref())
                .collect::<Vec<&str>>()
                .join(",")
                .into(),
        }
    }
}

pub fn normalize(value: impl Into<RawValue>) -> SharedString {
    value.into().normalize()
}

impl From<&'static str> for RawValue {
    fn from(value: &'static str) -> Self {
        RawValue::Text(value.into())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value.into())
    }
}

impl From<SharedString> for RawValue {
    fn from(value: SharedString) -> Self {
        RawValue::Text(value)
    }
}

impl From<Decimal> for RawValue {
    fn from(value: Decimal) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(Decimal::from(value))
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        RawValue::Number(Decimal::from(value))
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<Vec<&'static str>> for RawValue {
    fn from(value: Vec<&'static str>) -> Self {
        RawValue::List(value.into_iter().map(SharedString::from).collect())
    }
}

impl From<Vec<String>> for RawValue {
    fn from(value: Vec<String>) -> Self {
        RawValue::List(value.into_iter().map(SharedString::from).collect())
    }
}

impl From<Vec<SharedString>> for RawValue {
    fn from(value: Vec<SharedString>) -> Self {
        RawValue::List(value)
    }
}

impl<T> From<Option<T>> for RawValue
where
    T: Into<RawValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Absent, Into::into)
    }
}
