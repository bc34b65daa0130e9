//! JSON document <-> arena conversion.
//!
//! A document node is a JSON object. The configured children key holds an
//! array of child objects; every other key is an attribute.

use serde_json::{Map, Value};
use tracing::instrument;

use crate::domain::arena::{NodeData, NodeId, TreeArena};
use crate::domain::attributes::Attributes;
use crate::domain::error::{DomainError, DomainResult};

pub const DEFAULT_CHILDREN_KEY: &str = "children";

impl TreeArena {
    /// Builds an arena from a parsed JSON document.
    #[instrument(level = "debug", skip(document))]
    pub fn from_json(document: &Value, children_key: &str) -> DomainResult<Self> {
        let mut tree = TreeArena::new();
        let mut stack: Vec<(&Value, Option<NodeId>, String)> =
            vec![(document, None, "/".to_string())];

        while let Some((value, parent, location)) = stack.pop() {
            let Value::Object(object) = value else {
                return Err(invalid(format!("node at {} is not an object", location)));
            };

            let mut attributes = Attributes::new();
            let mut children: &[Value] = &[];
            let mut children_slot = None;
            for (slot, (key, value)) in object.iter().enumerate() {
                if key == children_key {
                    children_slot = Some(slot);
                    children = value.as_array().map(Vec::as_slice).ok_or_else(|| {
                        invalid(format!("'{}' at {} is not an array", children_key, location))
                    })?;
                } else {
                    attributes.insert(key.clone(), value.clone());
                }
            }

            let mut data = NodeData::new(attributes);
            if let Some(slot) = children_slot {
                data = data.with_children_slot(slot);
            }
            let id = tree.insert_node(data, parent)?;
            for (index, child) in children.iter().enumerate().rev() {
                let child_location = if location == "/" {
                    format!("/{}", index)
                } else {
                    format!("{}/{}", location, index)
                };
                stack.push((child, Some(id), child_location));
            }
        }

        Ok(tree)
    }

    /// Serializes the arena back into a JSON document.
    ///
    /// An empty arena yields `null`. The children key is written back at its
    /// loaded position; nodes that never had one get it only once they have
    /// children, appended last.
    #[instrument(level = "debug", skip(self))]
    pub fn to_json(&self, children_key: &str) -> Value {
        match self.root() {
            Some(root) => self.node_to_json(root, children_key),
            None => Value::Null,
        }
    }

    /// Serializes the subtree rooted at `id`.
    pub fn node_to_json(&self, id: NodeId, children_key: &str) -> Value {
        let Some(node) = self.get_node(id) else {
            return Value::Null;
        };
        if node.children.is_empty() && node.data.children_slot.is_none() {
            return Value::Object(node.data.attributes.clone().into_map());
        }

        let children = Value::Array(
            node.children
                .iter()
                .map(|&child| self.node_to_json(child, children_key))
                .collect(),
        );
        let slot = node.data.children_slot.unwrap_or(usize::MAX);
        let mut object = Map::new();
        let mut children = Some(children);
        for (position, (key, value)) in node.data.attributes.iter().enumerate() {
            if position == slot {
                if let Some(children) = children.take() {
                    object.insert(children_key.to_string(), children);
                }
            }
            object.insert(key.clone(), value.clone());
        }
        if let Some(children) = children {
            object.insert(children_key.to_string(), children);
        }
        Value::Object(object)
    }
}

fn invalid(reason: String) -> DomainError {
    DomainError::InvalidDocument { reason }
}
