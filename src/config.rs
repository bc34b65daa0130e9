//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/jtree/jtree.toml`
//! 3. Local config: `.jtree.toml` next to the edited document
//! 4. Environment variables: `JTREE_*` prefix, `__` between section and key

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_CHILDREN_KEY;

/// Editing policy applied by the editing service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditingConfig {
    /// Master switch; when off no actions are offered and nothing is mutated
    pub enabled: bool,
    /// Refuse edits of fields flagged `_readonly_:<field>`
    pub honor_read_only: bool,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            honor_read_only: true,
        }
    }
}

/// Template instantiation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TemplateConfig {
    /// Strip template markers from nested descendants of a new copy too
    pub strip_nested_flags: bool,
}

/// Document format settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DocumentConfig {
    /// Key holding a node's child array
    pub children_key: String,
    /// Pretty-print when writing documents back
    pub pretty: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            children_key: DEFAULT_CHILDREN_KEY.to_string(),
            pretty: true,
        }
    }
}

/// Raw sections for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawEditingConfig {
    pub enabled: Option<bool>,
    pub honor_read_only: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTemplateConfig {
    pub strip_nested_flags: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDocumentConfig {
    pub children_key: Option<String>,
    pub pretty: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub editing: RawEditingConfig,
    pub template: RawTemplateConfig,
    pub document: RawDocumentConfig,
}

/// Unified configuration for jtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub editing: EditingConfig,
    pub template: TemplateConfig,
    pub document: DocumentConfig,
}

/// Get the XDG config directory for jtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "jtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("jtree.toml"))
}

/// Get the path to the local config file in a document directory.
pub fn local_config_path(document_dir: &Path) -> PathBuf {
    document_dir.join(".jtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            editing: EditingConfig {
                enabled: overlay.editing.enabled.unwrap_or(self.editing.enabled),
                honor_read_only: overlay
                    .editing
                    .honor_read_only
                    .unwrap_or(self.editing.honor_read_only),
            },
            template: TemplateConfig {
                strip_nested_flags: overlay
                    .template
                    .strip_nested_flags
                    .unwrap_or(self.template.strip_nested_flags),
            },
            document: DocumentConfig {
                children_key: overlay
                    .document
                    .children_key
                    .clone()
                    .unwrap_or_else(|| self.document.children_key.clone()),
                pretty: overlay.document.pretty.unwrap_or(self.document.pretty),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `document_dir` - Directory of the edited document, for local config
    pub fn load(document_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), document_dir)
    }

    /// Load settings from an explicit global config file (missing is fine).
    pub fn load_layers(
        global_path: Option<&Path>,
        document_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config next to the document
        if let Some(dir) = document_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        if current.document.children_key.is_empty() {
            return Err(ApplicationError::Config {
                message: "document.children_key must not be empty".to_string(),
            });
        }

        Ok(current)
    }

    /// Apply JTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("JTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("editing.enabled") {
            settings.editing.enabled = val;
        }
        if let Ok(val) = config.get_bool("editing.honor_read_only") {
            settings.editing.honor_read_only = val;
        }
        if let Ok(val) = config.get_bool("template.strip_nested_flags") {
            settings.template.strip_nested_flags = val;
        }
        if let Ok(val) = config.get_string("document.children_key") {
            settings.document.children_key = val;
        }
        if let Ok(val) = config.get_bool("document.pretty") {
            settings.document.pretty = val;
        }

        Ok(settings)
    }

    /// Render as TOML (for `jtree config show`).
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
