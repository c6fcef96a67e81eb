//! Interactive shell
//!
//! Reads one command per line, runs it against the store and keeps going
//! after any error. End of input leaves the shell.
//!
//! Lines come from a [`LineSource`]: any buffered reader when input is piped,
//! or the line editor (history and completion) on a terminal.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

use super::node::{is_yes, require_field, require_unique_title};
use super::output::{Output, Palette};
use super::render;
use crate::domain::{check_title, parse_operations, InputError, Node};
use crate::storage::NodeStore;

const BANNER: &str = "=== Manufacturing Node Manager CLI ===";
const PROMPT: &str = ">>> ";

/// Every command the shell understands
pub(super) const COMMANDS: [&str; 10] = [
    "help", "create", "list", "view", "update", "delete", "clear", "cls", "exit", "quit",
];

const HELP: &str = "
Available commands:
  create  - Create a new manufacturing node
  list    - List all nodes
  view    - View details of a specific node
  update  - Update a node
  delete  - Delete a node
  clear   - Clear the screen
  help    - Show this help message
  exit    - Exit the program
";

/// Where the shell reads its lines from
pub trait LineSource {
    /// Shows `prompt` and reads one line without its line ending
    ///
    /// Returns `None` at end of input.
    fn next_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<Option<String>>;

    /// Records a command line for later recall
    fn remember(&mut self, _line: &str) {}
}

impl<R: BufRead> LineSource for R {
    fn next_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<Option<String>> {
        write!(out, "{}", prompt)?;
        out.flush()?;

        let mut buf = Vec::new();
        if self.read_until(b'\n', &mut buf).context("Failed to read input")? == 0 {
            return Ok(None);
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }

        // The bad line is already consumed, so the caller can carry on
        let line = String::from_utf8(buf).map_err(|_| InputError::InvalidEncoding)?;
        Ok(Some(line))
    }
}

/// What the loop does after a command
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Line-oriented shell over any line source and output
pub struct Shell<'a, L, W> {
    store: &'a NodeStore,
    log: &'a Output,
    lines: L,
    out: W,
    palette: Palette,
}

impl<'a, L: LineSource, W: Write> Shell<'a, L, W> {
    pub fn new(store: &'a NodeStore, log: &'a Output, lines: L, out: W) -> Self {
        Self {
            store,
            log,
            lines,
            out,
            palette: log.palette(),
        }
    }

    /// Runs until `exit`, `quit` or end of input
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "{}", self.palette.header(BANNER))?;
        writeln!(self.out, "Type 'help' for available commands")?;
        writeln!(self.out)?;

        loop {
            let prompt = self.palette.success(PROMPT);
            let line = match self.ask(&prompt) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) if e.is::<InputError>() => {
                    self.report(&e)?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            if !line.trim().is_empty() {
                self.lines.remember(line.trim());
            }

            match self.dispatch(&line) {
                Ok(Flow::Exit) => {
                    writeln!(self.out, "{}", self.palette.warn("Goodbye!"))?;
                    break;
                }
                Ok(Flow::Continue) => {}
                Err(e) => self.report(&e)?,
            }
        }

        self.out.flush()?;
        Ok(())
    }

    fn report(&mut self, e: &anyhow::Error) -> Result<()> {
        self.log.verbose_ctx("shell", &format!("Command failed: {:?}", e));
        writeln!(self.out, "{}: {:#}", self.palette.error("Error"), e)?;
        Ok(())
    }

    /// Writes `label` and reads one line; `None` at end of input
    fn ask(&mut self, label: &str) -> Result<Option<String>> {
        self.lines.next_line(label, &mut self.out)
    }

    fn cancelled(&mut self) -> Result<Flow> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", self.palette.error("Cancelled"))?;
        Ok(Flow::Continue)
    }

    fn dispatch(&mut self, line: &str) -> Result<Flow> {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Ok(Flow::Continue);
        };
        let argument = parts.collect::<Vec<_>>().join(" ");
        self.log.verbose_ctx("shell", &format!("Running '{}'", command));

        match command {
            "help" => {
                writeln!(self.out, "{}", HELP)?;
                Ok(Flow::Continue)
            }
            "create" => self.create(),
            "list" => self.list(),
            "view" | "update" | "delete" if argument.is_empty() => {
                let usage = format!("Usage: {} <node-id or title>", command);
                writeln!(self.out, "{}", self.palette.error(&usage))?;
                Ok(Flow::Continue)
            }
            "view" => self.view(&argument),
            "update" => self.update(&argument),
            "delete" => self.delete(&argument),
            "clear" | "cls" => {
                execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
                Ok(Flow::Continue)
            }
            "exit" | "quit" => Ok(Flow::Exit),
            other => {
                writeln!(
                    self.out,
                    "Unknown command: {}. Type 'help' for available commands.",
                    other
                )?;
                Ok(Flow::Continue)
            }
        }
    }

    fn create(&mut self) -> Result<Flow> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", self.palette.warn("Creating new node (end input to cancel)"))?;

        let Some(title) = self.ask("Node title: ")? else {
            return self.cancelled();
        };
        let title = check_title(&title)?.to_string();
        require_unique_title(self.store, &title, "")?;

        let Some(description) = self.ask("Description: ")? else {
            return self.cancelled();
        };
        let description = require_field("Description", &description)?;

        let Some(operations) = self.ask("Operations (comma-separated): ")? else {
            return self.cancelled();
        };
        let operations = parse_operations(&operations)?;

        let Some(address) = self.ask("UNS Address (e.g., Site/Area/Line/Cell): ")? else {
            return self.cancelled();
        };
        let address = require_field("UNS Address", &address)?;

        let node = Node::create(title, description, operations, address);
        self.store.save_node(&node).context("Failed to save node")?;
        self.log.verbose_ctx("create", &format!("Saved node {}", node.id));

        writeln!(self.out)?;
        writeln!(self.out, "{} Node created successfully!", self.palette.success("✓"))?;
        writeln!(self.out, "ID: {}", node.id)?;
        writeln!(self.out, "Title: {}", node.title)?;
        writeln!(self.out)?;
        Ok(Flow::Continue)
    }

    fn list(&mut self) -> Result<Flow> {
        let nodes = self.store.load().context("Failed to load nodes")?;
        render::write_table(&mut self.out, &nodes, self.palette)?;
        Ok(Flow::Continue)
    }

    fn view(&mut self, identifier: &str) -> Result<Flow> {
        let node = self.store.get_node_by_id_or_title(identifier)?;
        render::write_details(&mut self.out, &node, self.palette)?;
        Ok(Flow::Continue)
    }

    fn update(&mut self, identifier: &str) -> Result<Flow> {
        let existing = self.store.get_node_by_id_or_title(identifier)?;

        writeln!(self.out)?;
        writeln!(self.out, "Updating node: {}", existing.title)?;
        writeln!(self.out, "{}", self.palette.warn("Press Enter to keep current value"))?;

        let Some(title) = self.ask(&format!("Title [{}]: ", existing.title))? else {
            return self.cancelled();
        };
        let title = match title.trim() {
            "" => existing.title.clone(),
            changed => {
                let changed = check_title(changed)?.to_string();
                if changed != existing.title {
                    require_unique_title(self.store, &changed, existing.id.as_str())?;
                }
                changed
            }
        };

        let Some(description) = self.ask(&format!("Description [{}]: ", existing.description))?
        else {
            return self.cancelled();
        };
        let description = match description.trim() {
            "" => existing.description.clone(),
            changed => require_field("Description", changed)?,
        };

        let current_ops = existing.operations.join(", ");
        let Some(operations) = self.ask(&format!("Operations [{}]: ", current_ops))? else {
            return self.cancelled();
        };
        let operations = match operations.trim() {
            "" => existing.operations.clone(),
            changed => parse_operations(changed)?,
        };

        let Some(address) = self.ask(&format!("UNS Address [{}]: ", existing.address))? else {
            return self.cancelled();
        };
        let address = match address.trim() {
            "" => existing.address.clone(),
            changed => require_field("UNS Address", changed)?,
        };

        let revised = existing.revise(title, description, operations, address);
        self.store
            .update_node(existing.id.as_str(), revised)
            .context("Failed to update node")?;

        writeln!(self.out)?;
        writeln!(self.out, "{} Node updated successfully!", self.palette.success("✓"))?;
        Ok(Flow::Continue)
    }

    fn delete(&mut self, identifier: &str) -> Result<Flow> {
        let node = self.store.get_node_by_id_or_title(identifier)?;

        let question = format!(
            "\n{} Delete node '{}' (ID: {})? [y/N]: ",
            self.palette.warn("Warning:"),
            node.title,
            node.id
        );
        let confirmed = match self.ask(&question)? {
            Some(answer) => is_yes(&answer),
            None => {
                writeln!(self.out)?;
                false
            }
        };
        if !confirmed {
            writeln!(self.out, "Deletion cancelled.")?;
            return Ok(Flow::Continue);
        }

        self.store
            .delete_node(node.id.as_str())
            .context("Failed to delete node")?;

        writeln!(self.out)?;
        writeln!(self.out, "{} Node deleted successfully!", self.palette.success("✓"))?;
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeId;
    use crate::storage::OutputFormat;
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Runs a shell session over `script` and returns everything it printed
    fn session(store: &NodeStore, script: &str) -> String {
        session_bytes(store, script.as_bytes())
    }

    fn session_bytes(store: &NodeStore, script: &[u8]) -> String {
        let log = Output::new(OutputFormat::Text, false, false);
        let mut out = Vec::new();
        Shell::new(store, &log, Cursor::new(script.to_vec()), &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn seeded(dir: &TempDir) -> NodeStore {
        let store = NodeStore::new(dir.path().join("nodes.json"));
        let mut pump = Node::create("Pump A", "Feed pump", ["prime", "pump"], "Site/Area/Line");
        pump.id = NodeId::from("node1");
        let mut valve = Node::create("Valve B", "", Vec::<String>::new(), "Site/Area");
        valve.id = NodeId::from("node2");
        store.save(&[pump, valve]).unwrap();
        store
    }

    #[test]
    fn banner_and_exit() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path().join("nodes.json"));

        let text = session(&store, "exit\nlist\n");
        assert!(text.contains(BANNER));
        assert!(text.contains("Goodbye!"));
        assert!(!text.contains("No nodes found"));
    }

    #[test]
    fn end_of_input_leaves_quietly() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path().join("nodes.json"));

        let text = session(&store, "help\n");
        assert!(text.contains("Available commands:"));
        assert!(!text.contains("Goodbye!"));
    }

    #[test]
    fn unknown_command_and_usage_hints() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path().join("nodes.json"));

        let text = session(&store, "frobnicate\nview\n\nquit\n");
        assert!(text.contains("Unknown command: frobnicate. Type 'help' for available commands."));
        assert!(text.contains("Usage: view <node-id or title>"));
    }

    #[test]
    fn create_then_list() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path().join("nodes.json"));

        let text = session(
            &store,
            "create\nPump A\nMain pump\nprime, , pump\nSite/Area/Line\nlist\nexit\n",
        );

        assert!(text.contains("Node created successfully!"));
        assert!(text.contains("Title: Pump A"));
        assert!(text.contains("Manufacturing Nodes:"));

        let nodes = store.load().unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].description, "Main pump");
        assert_eq!(nodes[0].operations, vec!["prime", "pump"]);
        assert_eq!(nodes[0].address, "Site/Area/Line");
    }

    #[test]
    fn create_rejects_empty_and_duplicate_titles() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        let text = session(&store, "create\n   \ncreate\npump a\nexit\n");

        assert!(text.contains("Error: Title cannot be empty"));
        assert!(text.contains("Error: A node with title 'pump a' already exists"));
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn create_rejects_control_characters() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path().join("nodes.json"));

        let text = session(&store, "create\nPump\u{1b}[2J\nexit\n");

        assert!(text.contains("Error: Title contains invalid characters"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn create_cancelled_at_end_of_input() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path().join("nodes.json"));

        let text = session(&store, "create\nPump A\n");

        assert!(text.contains("Cancelled"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn view_by_id_and_title() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        let text = session(&store, "view node2\nview pump a\nview Nothing Here\nexit\n");

        assert!(text.contains("Title:       Valve B"));
        assert!(text.contains("Title:       Pump A"));
        assert!(text.contains("Operations:  prime, pump"));
        assert!(text.contains("Error: node with title 'Nothing Here' not found"));
    }

    #[test]
    fn update_keeps_values_on_enter() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);
        let before = store.get_node("node1").unwrap();

        let text = session(&store, "update Pump A\n\nNew description\n\nSite/Area/Line/Cell\nexit\n");

        assert!(text.contains("Title [Pump A]: "));
        assert!(text.contains("Operations [prime, pump]: "));
        assert!(text.contains("Node updated successfully!"));

        let after = store.get_node("node1").unwrap();
        assert_eq!(after.title, "Pump A");
        assert_eq!(after.description, "New description");
        assert_eq!(after.operations, before.operations);
        assert_eq!(after.address, "Site/Area/Line/Cell");
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[test]
    fn update_rejects_title_of_other_node() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        let text = session(&store, "update node1\nVALVE B\nexit\n");

        assert!(text.contains("Error: A node with title 'VALVE B' already exists"));
        assert_eq!(store.get_node("node1").unwrap().title, "Pump A");
    }

    #[test]
    fn update_allows_recasing_own_title() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        session(&store, "update node1\nPUMP A\n\n\n\nexit\n");

        assert_eq!(store.get_node("node1").unwrap().title, "PUMP A");
    }

    #[test]
    fn delete_requires_confirmation() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        let text = session(&store, "delete node1\nn\ndelete Valve B\nyes\nexit\n");

        assert!(text.contains("Delete node 'Pump A' (ID: node1)? [y/N]: "));
        assert!(text.contains("Deletion cancelled."));
        assert!(text.contains("Node deleted successfully!"));

        let ids: Vec<_> = store.load().unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![NodeId::from("node1")]);
    }

    #[test]
    fn undecodable_line_is_reported_and_skipped() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        let text = session_bytes(&store, b"help\nview \xff\xfe\nlist\nexit\n");

        assert!(text.contains("Error: Input is not valid UTF-8"));
        assert!(text.contains("Manufacturing Nodes:"));
        assert!(text.contains("Goodbye!"));
    }

    #[test]
    fn undecodable_field_cancels_only_that_command() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path().join("nodes.json"));

        let text = session_bytes(&store, b"create\nPump \xc3\nlist\nexit\n");

        assert!(text.contains("Error: Input is not valid UTF-8"));
        assert!(text.contains("No nodes found"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path().join("nodes.json"));
        std::fs::write(store.path(), "not json").unwrap();

        let text = session(&store, "list\nhelp\nexit\n");

        assert!(text.contains("Error: Failed to load nodes"));
        assert!(text.contains("Available commands:"));
        assert!(text.contains("Goodbye!"));
    }
}
