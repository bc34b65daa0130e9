//! Add/remove actions a presentation layer can offer for a node.

use std::fmt;

use tracing::instrument;

use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::mutator::TemplateTreeMutator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextAction {
    /// Instantiate `template` as a new child of the node.
    Add { template: NodeId, name: String },
    /// Remove the node itself; disabled when it is the last mandatory one.
    Remove {
        template: NodeId,
        name: String,
        enabled: bool,
    },
}

impl ContextAction {
    pub fn name(&self) -> &str {
        match self {
            ContextAction::Add { name, .. } | ContextAction::Remove { name, .. } => name,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            ContextAction::Add { .. } => true,
            ContextAction::Remove { enabled, .. } => *enabled,
        }
    }
}

impl fmt::Display for ContextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextAction::Add { name, .. } => write!(f, "Add '{}'", name),
            ContextAction::Remove { name, .. } => write!(f, "Remove '{}'", name),
        }
    }
}

/// Result of applying an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Added(NodeId),
    Removed,
}

impl TemplateTreeMutator {
    /// Actions for `node`: one `Add` per own template, otherwise a single
    /// `Remove` if a sibling template produced it, otherwise nothing.
    #[instrument(level = "trace", skip(self, tree))]
    pub fn context_actions(&self, tree: &TreeArena, node: NodeId) -> Vec<ContextAction> {
        let own = self.templates_of(tree, node);
        if !own.is_empty() {
            return own
                .into_iter()
                .map(|template| ContextAction::Add {
                    template,
                    name: template_name(tree, template),
                })
                .collect();
        }

        let Some(attributes) = tree.attributes(node) else {
            return Vec::new();
        };
        match self.template_by_name(tree, node, &attributes.name()) {
            Some(template) => vec![ContextAction::Remove {
                template,
                name: template_name(tree, template),
                enabled: self.can_remove(tree, node),
            }],
            None => Vec::new(),
        }
    }

    /// Performs `action` on `node`.
    ///
    /// The mandatory guard is re-checked even if the action was disabled.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn apply_action(
        &self,
        tree: &mut TreeArena,
        node: NodeId,
        action: &ContextAction,
    ) -> DomainResult<ActionOutcome> {
        match action {
            ContextAction::Add { template, .. } => {
                self.insert_child(tree, node, *template).map(ActionOutcome::Added)
            }
            ContextAction::Remove { .. } => {
                tree.node(node)?;
                let parent = tree.parent_of(node).ok_or(DomainError::NodeNotFound(node))?;
                let index = tree
                    .index_in_parent(node)
                    .ok_or(DomainError::NodeNotFound(node))?;
                self.remove_child(tree, parent, index)?;
                Ok(ActionOutcome::Removed)
            }
        }
    }
}

fn template_name(tree: &TreeArena, template: NodeId) -> String {
    tree.attributes(template)
        .map(|a| a.name().into_owned())
        .unwrap_or_default()
}
