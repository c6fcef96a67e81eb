//! # Command-Line Interface
//!
//! User-facing commands, the interactive shell and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `shell` (default) | Interactive prompt with `create`, `list`, `view`, `update`, `delete` |
//! | `create` | Create a node from flags |
//! | `list` | Table of all nodes |
//! | `view` | Details of one node, by ID or title |
//! | `update` | Change selected fields of a node |
//! | `delete` | Remove a node after confirmation |
//!
//! ## Shell Line Editing
//!
//! On a terminal the shell keeps command history in `.history` next to the
//! node file and completes commands, node IDs and titles with Tab. Piped
//! input is read line by line.
//!
//! ## Output Formats
//!
//! One-shot commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! manu --verbose list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod editor;
mod node;
mod output;
mod render;
mod shell;

pub use app::{run, Cli, Commands};
pub use editor::{completions, LineEditor, NodeHelper};
pub use output::{Output, OutputFormat, Palette};
pub use shell::{LineSource, Shell};
