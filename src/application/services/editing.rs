//! Editing service
//!
//! Drives the template mutator on a loaded tree under the configured
//! editing policy. Nodes are addressed by [`NodePath`].

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{
    names_match, set_field, ActionOutcome, ContextAction, DomainError, NodePath,
    TemplateTreeMutator, TreeArena,
};

/// Action listing entry, resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    pub label: String,
    pub enabled: bool,
    pub action: ContextAction,
}

/// Service for template-driven edits of a tree.
pub struct EditingService {
    settings: Arc<Settings>,
    mutator: TemplateTreeMutator,
}

impl EditingService {
    pub fn new(settings: Arc<Settings>) -> Self {
        let mutator =
            TemplateTreeMutator::new().with_strip_nested_flags(settings.template.strip_nested_flags);
        Self { settings, mutator }
    }

    pub fn mutator(&self) -> &TemplateTreeMutator {
        &self.mutator
    }

    fn ensure_enabled(&self) -> ApplicationResult<()> {
        if self.settings.editing.enabled {
            Ok(())
        } else {
            Err(DomainError::EditingDisabled.into())
        }
    }

    /// Actions available at `path`; none while editing is disabled.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn actions(&self, tree: &TreeArena, path: &NodePath) -> ApplicationResult<Vec<ActionEntry>> {
        let node = path.resolve(tree)?;
        if !self.settings.editing.enabled {
            debug!("actions: editing disabled");
            return Ok(Vec::new());
        }
        Ok(self
            .mutator
            .context_actions(tree, node)
            .into_iter()
            .map(|action| ActionEntry {
                label: action.to_string(),
                enabled: action.is_enabled(),
                action,
            })
            .collect())
    }

    /// Instantiate the template called `template_name` under `path`.
    ///
    /// Returns the path of the new node.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn add(
        &self,
        tree: &mut TreeArena,
        path: &NodePath,
        template_name: &str,
    ) -> ApplicationResult<NodePath> {
        self.ensure_enabled()?;
        let parent = path.resolve(tree)?;
        let template = self
            .mutator
            .templates_of(tree, parent)
            .into_iter()
            .find(|&t| {
                tree.attributes(t)
                    .is_some_and(|a| names_match(&a.name(), template_name))
            })
            .ok_or_else(|| ApplicationError::TemplateNotFound {
                path: path.to_string(),
                name: template_name.to_string(),
            })?;

        let outcome = self.mutator.apply_action(
            tree,
            parent,
            &ContextAction::Add {
                template,
                name: template_name.to_string(),
            },
        )?;
        let ActionOutcome::Added(child) = outcome else {
            return Err(ApplicationError::InvalidOperation(format!(
                "adding '{}' under {} produced no node",
                template_name, path
            )));
        };

        let child_path = path.child(tree.children_of(parent).len() - 1);
        info!("added '{}' at {}", template_name, child_path);
        debug_assert_eq!(child_path.resolve(tree).ok(), Some(child));
        Ok(child_path)
    }

    /// Remove the node at `path`, honoring the mandatory guard.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn remove(&self, tree: &mut TreeArena, path: &NodePath) -> ApplicationResult<()> {
        self.ensure_enabled()?;
        let Some((parent_path, index)) = path.parent() else {
            return Err(ApplicationError::InvalidOperation(
                "the root node cannot be removed".to_string(),
            ));
        };
        let parent = parent_path.resolve(tree)?;
        self.mutator.remove_child(tree, parent, index)?;
        info!("removed {}", path);
        Ok(())
    }

    /// Set `field` on the node at `path` through its editor hint.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn set(
        &self,
        tree: &mut TreeArena,
        path: &NodePath,
        field: &str,
        raw: &str,
    ) -> ApplicationResult<Value> {
        self.ensure_enabled()?;
        let node = path.resolve(tree)?;
        let value = set_field(tree, node, field, raw, self.settings.editing.honor_read_only)?;
        info!("set {}.{} = {}", path, field, value);
        Ok(value)
    }
}
