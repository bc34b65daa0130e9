use termtree::Tree;

use crate::domain::arena::{NodeId, TreeArena};

/// Renders a tree for terminal display.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for TreeArena {
    fn to_tree_string(&self) -> Tree<String> {
        fn label(arena: &TreeArena, id: NodeId, index: Option<usize>) -> String {
            let Some(attributes) = arena.attributes(id) else {
                return "<stale>".to_string();
            };
            let mut label = match index {
                Some(i) => format!("[{}] {}", i, attributes),
                None => attributes.to_string(),
            };
            if attributes.is_template() {
                label.push_str(if attributes.is_mandatory() {
                    " (template, mandatory)"
                } else {
                    " (template)"
                });
            }
            label
        }

        fn build_tree(arena: &TreeArena, id: NodeId, parent_tree: &mut Tree<String>) {
            for (index, &child) in arena.children_of(id).iter().enumerate() {
                let mut child_tree = Tree::new(label(arena, child, Some(index)));
                build_tree(arena, child, &mut child_tree);
                parent_tree.push(child_tree);
            }
        }

        match self.root() {
            Some(root) => {
                let mut tree = Tree::new(label(self, root, None));
                build_tree(self, root, &mut tree);
                tree
            }
            None => Tree::new("Empty tree".to_string()),
        }
    }
}
