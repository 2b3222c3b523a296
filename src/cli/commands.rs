//! Command dispatch

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::TreeService;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, OutputFormat, Settings};
use crate::infrastructure::{InfraError, RealFileSystem};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show {
            file,
            format,
            no_positions,
        }) => cmd_show(file, *format, *no_positions),
        Some(Commands::Depth { file, name }) => cmd_depth(file, name),
        Some(Commands::Ancestors { file, name }) => cmd_ancestors(file, name),
        Some(Commands::Next { file, parent }) => cmd_next(file, parent.as_deref()),
        Some(Commands::Compact { file, dry_run }) => cmd_compact(file, *dry_run),
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            let mut stdout = io::stdout();
            generate(*shell, &mut cmd, name, &mut stdout);
            stdout
                .flush()
                .map_err(|e| InfraError::io("write completion script", e))?;
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `leaftree --help`".to_string(),
        )),
    }
}

fn tree_service() -> TreeService {
    TreeService::new(Arc::new(RealFileSystem))
}

/// Settings with the document's directory as local config layer.
fn settings_for(file: &Path) -> CliResult<Settings> {
    Ok(Settings::load(file.parent())?)
}

#[instrument]
fn cmd_show(file: &Path, format: Option<OutputFormat>, no_positions: bool) -> CliResult<()> {
    let settings = settings_for(file)?;
    let format = format.unwrap_or(settings.format);
    debug!("format: {:?}", format);

    let service = tree_service();
    let text = match format {
        OutputFormat::Tree => service.render(file, settings.show_positions && !no_positions)?,
        OutputFormat::Toml => service.render_toml(file)?,
    };
    output::info(text.trim_end());
    Ok(())
}

#[instrument]
fn cmd_depth(file: &Path, name: &str) -> CliResult<()> {
    let depth = tree_service().depth(file, name)?;
    output::info(&depth);
    Ok(())
}

#[instrument]
fn cmd_ancestors(file: &Path, name: &str) -> CliResult<()> {
    let ancestors = tree_service().ancestors(file, name)?;
    if ancestors.is_empty() {
        output::detail(&format!("{} is a root", name));
    } else {
        output::info(&ancestors.join(" > "));
    }
    Ok(())
}

#[instrument]
fn cmd_next(file: &Path, parent: Option<&str>) -> CliResult<()> {
    let next = tree_service().next_position(file, parent)?;
    output::info(&next);
    Ok(())
}

#[instrument]
fn cmd_compact(file: &Path, dry_run: bool) -> CliResult<()> {
    let report = tree_service().compact(file, dry_run)?;
    let summary = format!(
        "{} of {} leaves moved across {} sibling groups",
        report.moved, report.leaves, report.groups
    );
    if report.written {
        output::success(&summary);
        output::action("Updated", &file.display());
    } else if dry_run {
        output::action("Dry run", &summary);
    } else {
        output::success("positions already compact");
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show { dir } => {
            let settings = Settings::load(dir.as_deref())?;
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => {
                return Err(CliError::Usage(
                    "no config directory available on this platform".to_string(),
                ))
            }
        },
        ConfigCommands::Template => output::info(Settings::template().trim_end()),
    }
    Ok(())
}
