//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Inspect leaf forests: render, query ancestry, compact sibling positions
#[derive(Parser, Debug)]
#[command(name = "leaftree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a forest document
    Show {
        /// Forest document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Hide sibling positions
        #[arg(long)]
        no_positions: bool,
    },

    /// Print the depth of a leaf (0 for a root)
    Depth {
        /// Forest document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Leaf name
        name: String,
    },

    /// Print the ancestors of a leaf, root first
    Ancestors {
        /// Forest document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Leaf name
        name: String,
    },

    /// Print the next free position of a sibling group
    Next {
        /// Forest document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Parent leaf name (roots when omitted)
        parent: Option<String>,
    },

    /// Reassign integer positions to every sibling group
    Compact {
        /// Forest document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Report without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
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

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show {
        /// Directory holding a local .leaftree.toml
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Show global config path
    Path,

    /// Print a config template
    Template,
}
