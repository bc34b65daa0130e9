//! Document service
//!
//! Reads JSON documents into arena trees and writes them back.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::TreeArena;
use crate::infrastructure::traits::FileSystem;

/// Service for loading and saving tree documents.
pub struct DocumentService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl DocumentService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Parse a JSON document file into a tree.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<TreeArena> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read document", path)?;
        let value: Value =
            serde_json::from_str(&content).with_path_context("parse document", path)?;
        let tree = TreeArena::from_json(&value, &self.settings.document.children_key)?;
        debug!("load: {} nodes from {}", tree.len(), path.display());
        Ok(tree)
    }

    /// Serialize a tree to document text (newline-terminated).
    pub fn render(&self, tree: &TreeArena) -> ApplicationResult<String> {
        let value = tree.to_json(&self.settings.document.children_key);
        let rendered = if self.settings.document.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        let mut text = rendered.map_err(|e| ApplicationError::OperationFailed {
            context: "serialize document".to_string(),
            source: Box::new(e),
        })?;
        text.push('\n');
        Ok(text)
    }

    /// Write a tree back to `path`.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(&self, path: &Path, tree: &TreeArena) -> ApplicationResult<()> {
        let content = self.render(tree)?;
        self.fs
            .write(path, &content)
            .with_path_context("write document", path)?;
        debug!("save: {} nodes to {}", tree.len(), path.display());
        Ok(())
    }
}
