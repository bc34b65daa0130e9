//! Domain layer: the node tree and its template rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod actions;
pub mod arena;
pub mod attributes;
pub mod document;
pub mod editor;
pub mod error;
pub mod mutator;
pub mod path;
pub mod tree_traits;

pub use actions::{ActionOutcome, ContextAction};
pub use arena::{NodeData, NodeId, TreeArena, TreeNode};
pub use attributes::{names_match, Attributes, KEY_MANDATORY, KEY_NAME, KEY_TEMPLATE};
pub use document::DEFAULT_CHILDREN_KEY;
pub use editor::{set_field, EditorHint};
pub use error::{DomainError, DomainResult};
pub use mutator::TemplateTreeMutator;
pub use path::NodePath;
pub use tree_traits::TreeNodeConvert;
