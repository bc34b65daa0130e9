//! Template-driven mutation of a [`TreeArena`].
//!
//! Templates are children flagged `isTemplate`. A node's own templates
//! describe the kinds of children that may be added under it; the templates
//! stored next to a live node (in its parent) describe the kind it was
//! created from, and decide whether it may be removed.

use tracing::{debug, instrument, trace};

use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::attributes::names_match;
use crate::domain::error::{DomainError, DomainResult};

/// Validated insert/remove of template-derived children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateTreeMutator {
    strip_nested_flags: bool,
}

impl TemplateTreeMutator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also strip `isTemplate`/`isMandatory` from descendants of new copies.
    ///
    /// Off by default: only the copy's own markers are removed, so templates
    /// nested inside a template survive instantiation.
    pub fn with_strip_nested_flags(mut self, strip: bool) -> Self {
        self.strip_nested_flags = strip;
        self
    }

    /// Direct children of `node` flagged as templates, in child order.
    #[instrument(level = "trace", skip(self, tree))]
    pub fn templates_of(&self, tree: &TreeArena, node: NodeId) -> Vec<NodeId> {
        tree.children_of(node)
            .iter()
            .copied()
            .filter(|&child| tree.attributes(child).is_some_and(|a| a.is_template()))
            .collect()
    }

    /// First template among `node`'s siblings whose name matches `name`.
    ///
    /// `None` at the root, where there are no siblings to look at.
    #[instrument(level = "trace", skip(self, tree))]
    pub fn template_by_name(&self, tree: &TreeArena, node: NodeId, name: &str) -> Option<NodeId> {
        let parent = tree.parent_of(node)?;
        tree.children_of(parent).iter().copied().find(|&sibling| {
            tree.attributes(sibling)
                .is_some_and(|a| a.is_template() && names_match(&a.name(), name))
        })
    }

    /// Live (non-template) children of `node`'s parent named `name`.
    #[instrument(level = "trace", skip(self, tree))]
    pub fn count_siblings_by_name(&self, tree: &TreeArena, node: NodeId, name: &str) -> usize {
        let Some(parent) = tree.parent_of(node) else {
            return 0;
        };
        tree.children_of(parent)
            .iter()
            .filter_map(|&sibling| tree.attributes(sibling))
            .filter(|a| !a.is_template() && names_match(&a.name(), name))
            .count()
    }

    /// Whether `node` may be removed without emptying a mandatory kind.
    pub fn can_remove(&self, tree: &TreeArena, node: NodeId) -> bool {
        let Some(attributes) = tree.attributes(node) else {
            return false;
        };
        let name = attributes.name();
        let mandatory = self
            .template_by_name(tree, node, &name)
            .and_then(|t| tree.attributes(t))
            .is_some_and(|t| t.is_mandatory());

        let allowed = !(mandatory && self.count_siblings_by_name(tree, node, &name) == 1);
        trace!(%node, %name, mandatory, allowed, "can_remove");
        allowed
    }

    /// Instantiates `template` as a new last child of `parent`.
    ///
    /// The copy loses its template markers; any number of instances may be
    /// added.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn insert_child(
        &self,
        tree: &mut TreeArena,
        parent: NodeId,
        template: NodeId,
    ) -> DomainResult<NodeId> {
        tree.node(parent)?;
        if !tree.node(template)?.data.attributes.is_template() {
            return Err(DomainError::NotATemplate(template));
        }

        let copy = tree.copy_subtree(template, parent)?;

        let stripped: Vec<NodeId> = if self.strip_nested_flags {
            tree.iter_from(copy).map(|(id, _)| id).collect()
        } else {
            vec![copy]
        };
        for id in stripped {
            tree.node_mut(id)?.data.attributes.strip_template_flags();
        }

        debug!(%parent, %template, %copy, "inserted child from template");
        Ok(copy)
    }

    /// Removes the child at `index` of `parent` together with its subtree.
    ///
    /// The tree is left untouched on error.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn remove_child(&self, tree: &mut TreeArena, parent: NodeId, index: usize) -> DomainResult<()> {
        let children = tree.children_of(parent);
        if !tree.contains(parent) {
            return Err(DomainError::NodeNotFound(parent));
        }
        let Some(&child) = children.get(index) else {
            return Err(DomainError::IndexOutOfRange {
                index,
                len: children.len(),
            });
        };

        if !self.can_remove(tree, child) {
            let name = tree.node(child)?.data.attributes.name().into_owned();
            return Err(DomainError::MandatoryViolation { name });
        }

        let freed = tree.remove_subtree(child)?;
        debug!(%parent, index, freed, "removed child");
        Ok(())
    }
}
