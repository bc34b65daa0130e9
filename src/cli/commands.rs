//! Command dispatch

use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{NodePath, TreeNodeConvert};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show { file }) => cmd_show(file),
        Some(Commands::Actions { file, path }) => cmd_actions(file, path),
        Some(Commands::Add {
            file,
            path,
            template,
        }) => cmd_add(file, path, template),
        Some(Commands::Remove { file, path }) => cmd_remove(file, path),
        Some(Commands::Set {
            file,
            path,
            field,
            value,
        }) => cmd_set(file, path, field, value),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show { file } => cmd_config_show(file.as_deref()),
            ConfigCommands::Path => cmd_config_path(),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "jtree", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run 'jtree --help'".to_string(),
        )),
    }
}

/// Build services with settings layered for the document's directory.
fn container_for(file: &Path) -> CliResult<ServiceContainer> {
    let container = ServiceContainer::new(Settings::load(file.parent())?);
    if !container.fs.exists(file) {
        return Err(CliError::NoInput(file.to_path_buf()));
    }
    Ok(container)
}

fn parse_path(path: &str) -> CliResult<NodePath> {
    path.parse::<NodePath>()
        .map_err(|e| CliError::InvalidArgs(e.to_string()))
}

#[instrument]
fn cmd_show(file: &Path) -> CliResult<()> {
    let container = container_for(file)?;
    let tree = container.documents.load(file)?;
    debug!("show: depth {}", tree.depth());

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", tree.to_tree_string())
        .and_then(|_| stdout.flush())
        .map_err(|e| InfraError::io("write tree", e))?;
    Ok(())
}

#[instrument]
fn cmd_actions(file: &Path, path: &str) -> CliResult<()> {
    let container = container_for(file)?;
    let node_path = parse_path(path)?;
    let tree = container.documents.load(file)?;
    let entries = container.editing.actions(&tree, &node_path)?;

    output::header(&format!("Actions at {}", node_path));
    if entries.is_empty() {
        output::detail(&"(none)");
    }
    for entry in entries {
        if entry.enabled {
            output::enabled(&entry.label);
        } else {
            output::disabled(&entry.label);
        }
    }
    Ok(())
}

#[instrument]
fn cmd_add(file: &Path, path: &str, template: &str) -> CliResult<()> {
    let container = container_for(file)?;
    let node_path = parse_path(path)?;
    let mut tree = container.documents.load(file)?;
    let child = container.editing.add(&mut tree, &node_path, template)?;
    container.documents.save(file, &tree)?;
    output::success(&format!("Added '{}' at {}", template, child));
    Ok(())
}

#[instrument]
fn cmd_remove(file: &Path, path: &str) -> CliResult<()> {
    let container = container_for(file)?;
    let node_path = parse_path(path)?;
    let mut tree = container.documents.load(file)?;
    container.editing.remove(&mut tree, &node_path)?;
    container.documents.save(file, &tree)?;
    output::success(&format!("Removed {}", node_path));
    Ok(())
}

#[instrument]
fn cmd_set(file: &Path, path: &str, field: &str, value: &str) -> CliResult<()> {
    let container = container_for(file)?;
    let node_path = parse_path(path)?;
    let mut tree = container.documents.load(file)?;
    let stored = container.editing.set(&mut tree, &node_path, field, value)?;
    container.documents.save(file, &tree)?;
    output::success(&format!("{}.{} = {}", node_path, field, stored));
    Ok(())
}

fn cmd_config_show(file: Option<&Path>) -> CliResult<()> {
    let settings = Settings::load(file.and_then(Path::parent))?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path() -> CliResult<()> {
    match global_config_path() {
        Some(path) => output::action("global", &path.display()),
        None => output::action("global", &"(no config directory)"),
    }
    output::action("local", &local_config_path(Path::new(".")).display());
    Ok(())
}
