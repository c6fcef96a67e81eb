//! Line editing for the shell on a terminal
//!
//! Wraps rustyline with a history file kept next to the node file and tab
//! completion of commands, and of node IDs and titles after `view`, `update`
//! and `delete`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use super::shell::{LineSource, COMMANDS};
use crate::domain::Node;
use crate::storage::NodeStore;

/// History file name, stored in the data directory
pub const HISTORY_FILE: &str = ".history";

/// Commands whose argument is a node ID or title
const NODE_COMMANDS: [&str; 3] = ["view", "update", "delete"];

/// Returns where completion starts in `before` and the candidates for it
///
/// `before` is the line up to the cursor. The first word completes to a
/// command; the argument of a node command completes to IDs and titles,
/// ignoring case.
pub fn completions(before: &str, nodes: &[Node]) -> (usize, Vec<String>) {
    let start = before.len() - before.trim_start().len();
    let rest = &before[start..];

    match rest.split_once(char::is_whitespace) {
        None => {
            let found = COMMANDS
                .iter()
                .filter(|c| c.starts_with(rest))
                .map(|c| c.to_string())
                .collect();
            (start, found)
        }
        Some((command, argument)) if NODE_COMMANDS.contains(&command) => {
            let arg_start = before.len() - argument.trim_start().len();
            let prefix = before[arg_start..].to_lowercase();

            let mut found: Vec<String> = Vec::new();
            for node in nodes {
                for candidate in [node.id.as_str(), node.title.as_str()] {
                    if candidate.to_lowercase().starts_with(&prefix)
                        && !found.iter().any(|f| f == candidate)
                    {
                        found.push(candidate.to_string());
                    }
                }
            }
            (arg_start, found)
        }
        Some(_) => (before.len(), Vec::new()),
    }
}

/// Completion helper reading candidates from the store on every request
pub struct NodeHelper<'a> {
    store: &'a NodeStore,
}

impl<'a> NodeHelper<'a> {
    pub fn new(store: &'a NodeStore) -> Self {
        Self { store }
    }

    /// Candidates for the line up to the cursor; an unreadable file offers
    /// no node names
    pub fn candidates(&self, before: &str) -> (usize, Vec<String>) {
        let nodes = self.store.load().unwrap_or_default();
        completions(before, &nodes)
    }
}

impl Completer for NodeHelper<'_> {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = line.get(..pos).unwrap_or(line);
        let (start, found) = self.candidates(before);
        let pairs = found
            .into_iter()
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for NodeHelper<'_> {
    type Hint = String;
}

impl Highlighter for NodeHelper<'_> {}

impl Validator for NodeHelper<'_> {}

impl Helper for NodeHelper<'_> {}

/// Path of the history file for `store`
pub fn history_path(store: &NodeStore) -> PathBuf {
    store.path().with_file_name(HISTORY_FILE)
}

/// Terminal line source with history and completion
pub struct LineEditor<'a> {
    editor: Editor<NodeHelper<'a>, DefaultHistory>,
    history: PathBuf,
}

impl<'a> LineEditor<'a> {
    pub fn new(store: &'a NodeStore) -> Result<Self> {
        let mut editor = Editor::new().context("Failed to initialize line editor")?;
        editor.set_helper(Some(NodeHelper::new(store)));

        let history = history_path(store);
        // No history file yet on first start
        let _ = editor.load_history(&history);

        Ok(Self { editor, history })
    }

    pub fn history(&self) -> &Path {
        &self.history
    }
}

impl LineSource for LineEditor<'_> {
    fn next_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<Option<String>> {
        out.flush()?;

        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl-C cancels like Ctrl-D
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(e).context("Failed to read input"),
        }
    }

    fn remember(&mut self, line: &str) {
        if matches!(self.editor.add_history_entry(line), Ok(true)) {
            let _ = self.editor.save_history(&self.history);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeId;
    use tempfile::TempDir;

    fn nodes() -> Vec<Node> {
        let mut pump = Node::create("Pump A", "", Vec::<String>::new(), "");
        pump.id = NodeId::from("20250101000000");
        let mut press = Node::create("Press Line 2", "", Vec::<String>::new(), "");
        press.id = NodeId::from("20250102000000");
        vec![pump, press]
    }

    #[test]
    fn first_word_completes_commands() {
        assert_eq!(completions("", &[]).1.len(), COMMANDS.len());
        assert_eq!(completions("de", &[]), (0, vec!["delete".to_string()]));
        assert_eq!(
            completions("  c", &[]),
            (2, vec!["create".to_string(), "clear".to_string(), "cls".to_string()])
        );
        assert!(completions("zz", &[]).1.is_empty());
    }

    #[test]
    fn node_commands_complete_ids_and_titles() {
        let nodes = nodes();

        let (start, found) = completions("view p", &nodes);
        assert_eq!(start, 5);
        assert_eq!(found, vec!["Pump A", "Press Line 2"]);

        let (start, found) = completions("update  2025010", &nodes);
        assert_eq!(start, 8);
        assert_eq!(found, vec!["20250101000000", "20250102000000"]);

        let (_, found) = completions("delete press l", &nodes);
        assert_eq!(found, vec!["Press Line 2"]);
    }

    #[test]
    fn other_commands_offer_no_arguments() {
        let (start, found) = completions("list p", &nodes());
        assert_eq!(start, 6);
        assert!(found.is_empty());
    }

    #[test]
    fn helper_reads_candidates_from_store() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path().join("nodes.json"));
        store.save(&nodes()).unwrap();

        let helper = NodeHelper::new(&store);
        assert_eq!(helper.candidates("view pu").1, vec!["Pump A"]);

        std::fs::write(store.path(), "not json").unwrap();
        assert!(helper.candidates("view pu").1.is_empty());
    }

    #[test]
    fn history_lives_next_to_node_file() {
        let store = NodeStore::new(Path::new("data").join("nodes.json"));
        assert_eq!(history_path(&store), Path::new("data").join(".history"));
    }
}
