use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::attributes::Attributes;
use crate::domain::error::{DomainError, DomainResult};

/// Handle to a node in a [`TreeArena`].
///
/// Generational: once a node is removed its id never resolves again, even if
/// the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}.{}", slot, generation)
    }
}

/// Data payload for tree nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    pub attributes: Attributes,
    /// Key position of the children array in the source object, if it had one
    pub children_slot: Option<usize>,
}

impl NodeData {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            children_slot: None,
        }
    }

    pub fn with_children_slot(mut self, slot: usize) -> Self {
        self.children_slot = Some(slot);
        self
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.attributes)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    /// Attribute payload of this node
    pub data: NodeData,
    /// Parent node in the arena, None for the root
    pub parent: Option<NodeId>,
    /// Child nodes in order; the parent owns them
    pub children: Vec<NodeId>,
}

/// Arena-based tree of JSON nodes.
///
/// Parent links are plain ids into the arena, so dropping a subtree can never
/// leave a dangling upward reference: stale ids simply stop resolving.
#[derive(Debug)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    root: Option<NodeId>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Inserts a node, appending it to `parent`'s children.
    ///
    /// With no parent the node becomes the root.
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<NodeId>) -> DomainResult<NodeId> {
        if let Some(parent_id) = parent {
            if !self.contains(parent_id) {
                return Err(DomainError::NodeNotFound(parent_id));
            }
        }
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_id = NodeId(self.arena.insert(node));

        match parent {
            Some(parent_id) => {
                if let Some(parent) = self.arena.get_mut(parent_id.0) {
                    parent.children.push(node_id);
                }
            }
            None => self.root = Some(node_id),
        }

        Ok(node_id)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id.0)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.arena.get_mut(id.0)
    }

    /// Like [`get_node`](Self::get_node) but stale ids are an error.
    pub fn node(&self, id: NodeId) -> DomainResult<&TreeNode> {
        self.get_node(id).ok_or(DomainError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut TreeNode> {
        self.get_node_mut(id).ok_or(DomainError::NodeNotFound(id))
    }

    pub fn attributes(&self, id: NodeId) -> Option<&Attributes> {
        self.get_node(id).map(|n| &n.data.attributes)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.parent)
    }

    /// Children of `id` in order; empty for unknown ids.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.get_node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.children_of(parent).iter().position(|&c| c == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    /// Number of nodes stored, templates included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order walk of the subtree rooted at `id`.
    pub fn iter_from(&self, id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, Some(id))
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, self.root)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        if let Some(node) = self.get_node(id) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Deep-copies the subtree at `source` and appends the copy to `new_parent`.
    ///
    /// Returns the id of the copied subtree root.
    #[instrument(level = "debug", skip(self))]
    pub fn copy_subtree(&mut self, source: NodeId, new_parent: NodeId) -> DomainResult<NodeId> {
        self.node(source)?;
        self.node(new_parent)?;

        // Snapshot first: the target may lie inside the source subtree
        let snapshot: Vec<(NodeId, NodeData, Option<NodeId>)> = self
            .iter_from(source)
            .map(|(id, node)| {
                let parent = if id == source { None } else { node.parent };
                (id, node.data.clone(), parent)
            })
            .collect();

        let mut copies: HashMap<NodeId, NodeId> = HashMap::with_capacity(snapshot.len());
        for (original, data, original_parent) in snapshot {
            let parent = match original_parent {
                None => new_parent,
                Some(p) => *copies.get(&p).ok_or(DomainError::NodeNotFound(p))?,
            };
            let copy = self.insert_node(data, Some(parent))?;
            copies.insert(original, copy);
        }

        copies
            .get(&source)
            .copied()
            .ok_or(DomainError::NodeNotFound(source))
    }

    /// Detaches `id` from its parent and frees it with all descendants.
    ///
    /// Returns the number of nodes freed.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, id: NodeId) -> DomainResult<usize> {
        let parent = self.node(id)?.parent;

        match parent {
            Some(parent_id) => {
                if let Some(parent) = self.get_node_mut(parent_id) {
                    parent.children.retain(|&c| c != id);
                }
            }
            None => self.root = None,
        }

        let doomed: Vec<NodeId> = PostOrderIterator::new(self, Some(id))
            .map(|(node_id, _)| node_id)
            .collect();
        for node_id in &doomed {
            self.arena.remove(node_id.0);
        }

        Ok(doomed.len())
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena, start: Option<NodeId>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena, start: Option<NodeId>) -> Self {
        Self {
            arena,
            stack: start.map(|id| (id, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                if !visited {
                    self.stack.push((current, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current, node));
                }
            }
        }
        None
    }
}
