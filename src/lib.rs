//! Template-driven editing of hierarchical JSON documents.
//!
//! Nodes flagged `isTemplate` describe the kinds of children a node accepts;
//! [`domain::TemplateTreeMutator`] instantiates them and guards removal of
//! the last live instance of an `isMandatory` kind.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    ContextAction, DomainError, NodeId, NodePath, TemplateTreeMutator, TreeArena,
};
