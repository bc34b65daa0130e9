//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Template-driven editing of hierarchical JSON documents
#[derive(Parser, Debug)]
#[command(name = "jtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the document as a tree
    Show {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// List add/remove actions for a node
    Actions {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node path, e.g. /0/2 (default: root)
        #[arg(default_value = "/")]
        path: String,
    },

    /// Add a child from one of the node's templates
    Add {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node path of the parent
        path: String,
        /// Template name (case-insensitive)
        template: String,
    },

    /// Remove a node (refused for the last mandatory instance)
    Remove {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node path
        path: String,
    },

    /// Set a field, validated by the node's editor hints
    Set {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node path
        path: String,
        /// Field name
        field: String,
        /// New value
        value: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show {
        /// Document whose directory may hold a local .jtree.toml
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },
    /// Show config file locations
    Path,
}
