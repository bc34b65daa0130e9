//! Node addressing by child indices: `/` is the root, `/0/2` the third child
//! of the root's first child.

use std::fmt;
use std::str::FromStr;

use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the parent, `None` for the root.
    pub fn parent(&self) -> Option<(NodePath, usize)> {
        let (&last, rest) = self.0.split_last()?;
        Some((NodePath(rest.to_vec()), last))
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn resolve(&self, tree: &TreeArena) -> DomainResult<NodeId> {
        let mut current = tree.root().ok_or_else(|| self.error("document is empty"))?;
        for (depth, &index) in self.0.iter().enumerate() {
            current = *tree.children_of(current).get(index).ok_or_else(|| {
                let prefix = NodePath(self.0[..=depth].to_vec());
                self.error(&format!("no node at {}", prefix))
            })?;
        }
        Ok(current)
    }

    /// Path of `id` within `tree`, `None` for stale ids.
    pub fn of(tree: &TreeArena, id: NodeId) -> Option<Self> {
        if !tree.contains(id) {
            return None;
        }
        let mut indices = Vec::new();
        let mut current = id;
        while let Some(parent) = tree.parent_of(current) {
            indices.push(tree.index_in_parent(current)?);
            current = parent;
        }
        indices.reverse();
        Some(Self(indices))
    }

    fn error(&self, reason: &str) -> DomainError {
        DomainError::InvalidPath {
            path: self.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if body.is_empty() {
            return Ok(Self::root());
        }
        body.trim_end_matches('/')
            .split('/')
            .map(|segment| {
                segment.parse::<usize>().map_err(|_| DomainError::InvalidPath {
                    path: s.to_string(),
                    reason: format!("'{}' is not a child index", segment),
                })
            })
            .collect::<DomainResult<Vec<_>>>()
            .map(Self)
    }
}
