//! Typed attribute map with accessors for the reserved keys.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Logical identifier used for template matching and sibling counting.
pub const KEY_NAME: &str = "name";
/// Marks a template definition rather than live data.
pub const KEY_TEMPLATE: &str = "isTemplate";
/// Marks a template whose kind must keep one live instance.
pub const KEY_MANDATORY: &str = "isMandatory";

/// Attribute bag of a tree node, semantically a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Logical name; missing reads as empty, non-string scalars by their text.
    pub fn name(&self) -> Cow<'_, str> {
        match self.0.get(KEY_NAME) {
            Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
            Some(Value::Number(n)) => Cow::Owned(n.to_string()),
            Some(Value::Bool(b)) => Cow::Owned(b.to_string()),
            _ => Cow::Borrowed(""),
        }
    }

    pub fn is_template(&self) -> bool {
        self.flag(KEY_TEMPLATE)
    }

    pub fn is_mandatory(&self) -> bool {
        self.flag(KEY_MANDATORY)
    }

    /// Reads `key` as a boolean flag.
    ///
    /// JSON `true`, non-zero numbers and any string other than `""`, `"0"`
    /// and `"false"` (any case) count as set.
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(value_as_flag)
    }

    /// Removes both template markers, returning whether anything was stripped.
    pub fn strip_template_flags(&mut self) -> bool {
        let template = self.0.remove(KEY_TEMPLATE).is_some();
        let mandatory = self.0.remove(KEY_MANDATORY).is_some();
        template || mandatory
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        if name.is_empty() {
            write!(f, "<unnamed>")
        } else {
            write!(f, "{}", name)
        }
    }
}

/// Case-insensitive name comparison.
///
/// Both sides are folded with Unicode lowercase mapping, which does not
/// depend on the process locale.
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

fn value_as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        _ => false,
    }
}
