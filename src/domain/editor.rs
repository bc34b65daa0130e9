//! Per-field editing hints stored alongside a node's data.
//!
//! A node describes how its field `f` is edited through companion
//! attributes: `_widget_:f`, `_valuemin_:f`, `_valuemax_:f`,
//! `_valuelist_:f`, `_regexp_:f` and `_readonly_:f`.

use regex::Regex;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::attributes::Attributes;
use crate::domain::error::{DomainError, DomainResult};

const WIDGET_PREFIX: &str = "_widget_:";
const MIN_PREFIX: &str = "_valuemin_:";
const MAX_PREFIX: &str = "_valuemax_:";
const LIST_PREFIX: &str = "_valuelist_:";
const REGEXP_PREFIX: &str = "_regexp_:";
const READONLY_PREFIX: &str = "_readonly_:";

#[derive(Debug, Clone)]
pub enum EditorHint {
    CheckBox,
    SpinBox { min: i64, max: i64 },
    ComboBox { choices: Vec<String> },
    LineEdit { pattern: Option<Regex> },
}

impl PartialEq for EditorHint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EditorHint::CheckBox, EditorHint::CheckBox) => true,
            (EditorHint::SpinBox { min: a, max: b }, EditorHint::SpinBox { min: c, max: d }) => {
                a == c && b == d
            }
            (EditorHint::ComboBox { choices: a }, EditorHint::ComboBox { choices: b }) => a == b,
            (EditorHint::LineEdit { pattern: a }, EditorHint::LineEdit { pattern: b }) => {
                a.as_ref().map(Regex::as_str) == b.as_ref().map(Regex::as_str)
            }
            _ => false,
        }
    }
}

impl EditorHint {
    /// Hint for `field`, `None` when no (known) widget is declared.
    pub fn for_field(attributes: &Attributes, field: &str) -> DomainResult<Option<Self>> {
        let Some(widget) = attributes.get(&meta_key(WIDGET_PREFIX, field)).and_then(Value::as_str)
        else {
            return Ok(None);
        };

        let hint = match widget.to_ascii_lowercase().as_str() {
            "qcheckbox" => EditorHint::CheckBox,
            "qspinbox" => {
                let min = int_attribute(attributes, &meta_key(MIN_PREFIX, field));
                let max = int_attribute(attributes, &meta_key(MAX_PREFIX, field));
                // A maximum below the minimum drags the minimum down with it
                EditorHint::SpinBox {
                    min: min.min(max),
                    max,
                }
            }
            "qcombobox" => EditorHint::ComboBox {
                choices: list_attribute(attributes, &meta_key(LIST_PREFIX, field)),
            },
            "qlineedit" => {
                let pattern = match attributes
                    .get(&meta_key(REGEXP_PREFIX, field))
                    .and_then(Value::as_str)
                    .filter(|p| !p.is_empty())
                {
                    Some(p) => Some(Regex::new(&format!("^(?:{})$", p)).map_err(|e| {
                        DomainError::InvalidDocument {
                            reason: format!("bad pattern for field '{}': {}", field, e),
                        }
                    })?),
                    None => None,
                };
                EditorHint::LineEdit { pattern }
            }
            _ => return Ok(None),
        };
        Ok(Some(hint))
    }

    /// Converts raw user input into the value stored for `field`.
    pub fn commit(&self, field: &str, raw: &str) -> DomainResult<Value> {
        let reject = |reason: String| DomainError::RejectedValue {
            field: field.to_string(),
            reason,
        };
        match self {
            EditorHint::CheckBox => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "off" => Ok(Value::Bool(false)),
                other => Err(reject(format!("'{}' is not a boolean", other))),
            },
            EditorHint::SpinBox { min, max } => {
                let n: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| reject(format!("'{}' is not an integer", raw)))?;
                Ok(Value::from(n.clamp(*min, *max)))
            }
            EditorHint::ComboBox { choices } => {
                if choices.iter().any(|c| c == raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(reject(format!("'{}' is not one of {:?}", raw, choices)))
                }
            }
            EditorHint::LineEdit { pattern } => match pattern {
                Some(re) if !re.is_match(raw) => {
                    Err(reject(format!("'{}' does not match {}", raw, re.as_str())))
                }
                _ => Ok(Value::String(raw.to_string())),
            },
        }
    }
}

pub fn is_read_only(attributes: &Attributes, field: &str) -> bool {
    attributes.flag(&meta_key(READONLY_PREFIX, field))
}

/// Validates `raw` through the field's hint and stores it on `node`.
///
/// Returns the stored value. Fields without a hint take the raw string.
#[instrument(level = "debug", skip(tree))]
pub fn set_field(
    tree: &mut TreeArena,
    node: NodeId,
    field: &str,
    raw: &str,
    honor_read_only: bool,
) -> DomainResult<Value> {
    let attributes = &tree.node(node)?.data.attributes;
    if honor_read_only && is_read_only(attributes, field) {
        return Err(DomainError::ReadOnlyField {
            field: field.to_string(),
        });
    }

    let value = match EditorHint::for_field(attributes, field)? {
        Some(hint) => hint.commit(field, raw)?,
        None => Value::String(raw.to_string()),
    };

    tree.node_mut(node)?
        .data
        .attributes
        .insert(field, value.clone());
    debug!(%node, field, %value, "field updated");
    Ok(value)
}

fn meta_key(prefix: &str, field: &str) -> String {
    format!("{}{}", prefix, field)
}

fn int_attribute(attributes: &Attributes, key: &str) -> i64 {
    match attributes.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn list_attribute(attributes: &Attributes, key: &str) -> Vec<String> {
    match attributes.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.split(',').map(str::to_string).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
