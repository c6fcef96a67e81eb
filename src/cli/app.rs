//! Main CLI application structure

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::editor::LineEditor;
use super::node::{self, NewNode, NodeChanges};
use super::output::{Output, OutputFormat};
use super::shell::Shell;
use crate::storage::{Config, NodeStore};

#[derive(Parser)]
#[command(name = "manu")]
#[command(author, version, about = "Manage manufacturing nodes stored in a local JSON file")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding the node file
    #[arg(long, global = true, env = "MANU_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive shell (default)
    Shell,

    /// Create a new manufacturing node
    Create {
        /// Node title (must be unique, case-insensitive)
        title: String,

        /// Free-text description
        #[arg(long, short)]
        description: Option<String>,

        /// Comma-separated operations
        #[arg(long, short)]
        operations: Option<String>,

        /// UNS address (e.g., Site/Area/Line/Cell)
        #[arg(long, short)]
        address: Option<String>,
    },

    /// List all nodes
    List,

    /// Show details of a node
    View {
        /// Node ID or title
        identifier: String,
    },

    /// Update a node; omitted fields keep their values
    Update {
        /// Node ID or title
        identifier: String,

        /// New title
        #[arg(long, short)]
        title: Option<String>,

        /// New description
        #[arg(long, short)]
        description: Option<String>,

        /// New comma-separated operations
        #[arg(long, short)]
        operations: Option<String>,

        /// New UNS address
        #[arg(long, short)]
        address: Option<String>,
    },

    /// Delete a node
    Delete {
        /// Node ID or title
        identifier: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let format = cli.format.unwrap_or(config.global.default_format);
    let output = Output::new(format, cli.verbose, config.global.color && !cli.no_color);

    let data_dir = config.data_dir(cli.data_dir.as_deref());
    output.verbose_ctx(
        "config",
        &format!("Data directory: {}, file: {}", data_dir.display(), config.file_name()),
    );

    let store = NodeStore::open(&data_dir, config.file_name())
        .context("Failed to initialize storage")?;
    output.verbose_ctx("store", &format!("Using node file: {}", store.path().display()));

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let stdout = io::stdout().lock();
            if io::stdin().is_terminal() {
                let editor = LineEditor::new(&store)?;
                output.verbose_ctx(
                    "shell",
                    &format!("Line editing on, history in {}", editor.history().display()),
                );
                Shell::new(&store, &output, editor, stdout).run()?
            } else {
                Shell::new(&store, &output, io::stdin().lock(), stdout).run()?
            }
        }

        Commands::Create {
            title,
            description,
            operations,
            address,
        } => node::create(
            &output,
            &store,
            NewNode {
                title,
                description,
                operations,
                address,
            },
        )?,

        Commands::List => node::list(&output, &store)?,
        Commands::View { identifier } => node::view(&output, &store, &identifier)?,

        Commands::Update {
            identifier,
            title,
            description,
            operations,
            address,
        } => node::update(
            &output,
            &store,
            &identifier,
            NodeChanges {
                title,
                description,
                operations,
                address,
            },
        )?,

        Commands::Delete { identifier, yes } => node::delete(&output, &store, &identifier, yes)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
