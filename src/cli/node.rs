//! Node CLI commands
//!
//! One-shot counterparts of the shell commands. Input rules are shared with
//! the shell through the `require_*` helpers below.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

use super::output::Output;
use super::render;
use crate::domain::{check_field, check_title, parse_operations, Node};
use crate::storage::NodeStore;

/// Field values for `create`
pub struct NewNode {
    pub title: String,
    pub description: Option<String>,
    pub operations: Option<String>,
    pub address: Option<String>,
}

/// Field changes for `update`; `None` keeps the current value
#[derive(Default)]
pub struct NodeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub operations: Option<String>,
    pub address: Option<String>,
}

/// Fails unless no other node uses `title`
pub(super) fn require_unique_title(store: &NodeStore, title: &str, exclude_id: &str) -> Result<()> {
    let unique = store
        .is_title_unique(title, exclude_id)
        .context("Failed to check title uniqueness")?;
    if !unique {
        bail!("A node with title '{}' already exists", title);
    }
    Ok(())
}

/// Trims and validates an optional free-text field
pub(super) fn require_field(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    check_field(field, value)?;
    Ok(value.to_string())
}

pub fn create(output: &Output, store: &NodeStore, new: NewNode) -> Result<()> {
    let title = check_title(&new.title)?;
    require_unique_title(store, title, "")?;

    let description = require_field("Description", new.description.as_deref().unwrap_or(""))?;
    let operations = parse_operations(new.operations.as_deref().unwrap_or(""))?;
    let address = require_field("UNS Address", new.address.as_deref().unwrap_or(""))?;

    let node = Node::create(title, description, operations, address);
    store.save_node(&node).context("Failed to save node")?;
    output.verbose_ctx("create", &format!("Saved node {} to {}", node.id, store.path().display()));

    if output.is_json() {
        output.data(&node);
    } else {
        output.success(&format!("Created node: {} - {}", node.id, node.title));
    }

    Ok(())
}

pub fn list(output: &Output, store: &NodeStore) -> Result<()> {
    let nodes = store.load().context("Failed to load nodes")?;
    output.verbose_ctx("list", &format!("Loaded {} nodes", nodes.len()));

    if output.is_json() {
        output.data(&nodes);
    } else {
        render::write_table(&mut io::stdout().lock(), &nodes, output.palette())?;
    }

    Ok(())
}

pub fn view(output: &Output, store: &NodeStore, identifier: &str) -> Result<()> {
    let node = store.get_node_by_id_or_title(identifier)?;

    if output.is_json() {
        output.data(&node);
    } else {
        render::write_details(&mut io::stdout().lock(), &node, output.palette())?;
    }

    Ok(())
}

pub fn update(
    output: &Output,
    store: &NodeStore,
    identifier: &str,
    changes: NodeChanges,
) -> Result<()> {
    let existing = store.get_node_by_id_or_title(identifier)?;
    output.verbose_ctx("update", &format!("Resolved '{}' to node {}", identifier, existing.id));

    let title = match changes.title {
        Some(title) => {
            let title = check_title(&title)?.to_string();
            if title != existing.title {
                require_unique_title(store, &title, existing.id.as_str())?;
            }
            title
        }
        None => existing.title.clone(),
    };
    let description = match changes.description {
        Some(description) => require_field("Description", &description)?,
        None => existing.description.clone(),
    };
    let operations = match changes.operations {
        Some(operations) => parse_operations(&operations)?,
        None => existing.operations.clone(),
    };
    let address = match changes.address {
        Some(address) => require_field("UNS Address", &address)?,
        None => existing.address.clone(),
    };

    let revised = existing.revise(title, description, operations, address);
    let stored = store
        .update_node(existing.id.as_str(), revised)
        .context("Failed to update node")?;

    if output.is_json() {
        output.data(&stored);
    } else {
        output.success(&format!("Updated node: {} - {}", stored.id, stored.title));
    }

    Ok(())
}

pub fn delete(output: &Output, store: &NodeStore, identifier: &str, yes: bool) -> Result<()> {
    let node = store.get_node_by_id_or_title(identifier)?;

    if !yes {
        if output.is_json() {
            bail!("Refusing to delete without --yes when using JSON output");
        }
        let question = format!(
            "{} Delete node '{}' (ID: {})? [y/N]: ",
            output.palette().warn("Warning:"),
            node.title,
            node.id
        );
        if !confirm(&mut io::stdin().lock(), &mut io::stdout().lock(), &question)? {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    store.delete_node(node.id.as_str()).context("Failed to delete node")?;
    output.verbose_ctx("delete", &format!("Removed node {}", node.id));

    if output.is_json() {
        output.data(&serde_json::json!({
            "deleted": node.id,
            "title": node.title,
        }));
    } else {
        output.success(&format!("Deleted node: {} - {}", node.id, node.title));
    }

    Ok(())
}

/// Asks a yes/no question; only `y` or `yes` confirm, end of input declines
pub(super) fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<bool> {
    write!(out, "{}", question)?;
    out.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(out)?;
        return Ok(false);
    }

    Ok(is_yes(&answer))
}

/// Only `y` or `yes` (any case) confirm
pub(super) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
